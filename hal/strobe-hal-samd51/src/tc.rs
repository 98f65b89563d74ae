//! TC3 as the low-power cycle counter
//!
//! The counter runs in 8-bit mode from the 32 kHz generator routed by
//! [`crate::clock::route_to_tc3`]. PER sets the rollover point and CC0 the
//! short point; both raise an interrupt on TC3's vector.

use cortex_m::peripheral::NVIC;
use strobe_hal::{CycleEvent, CycleSettings, CycleTimer};

use crate::pac;

/// CTRLA bits
const CTRLA_SWRST: u32 = 1 << 0;
const CTRLA_ENABLE: u32 = 1 << 1;
const CTRLA_MODE_COUNT8: u32 = 0x1 << 2;
const CTRLA_RUNSTDBY: u32 = 1 << 6;
const CTRLA_PRESCALER_POS: u32 = 8;

/// SYNCBUSY bits
const SYNCBUSY_SWRST: u32 = 1 << 0;
const SYNCBUSY_ENABLE: u32 = 1 << 1;
const SYNCBUSY_PER: u32 = 1 << 5;
const SYNCBUSY_CC0: u32 = 1 << 6;

/// INTFLAG / INTENSET bits
const INT_OVF: u8 = 1 << 0;
const INT_MC0: u8 = 1 << 4;

/// Largest value PER and CC0 hold in 8-bit mode
const COUNT8_MAX: u16 = u8::MAX as u16;

fn event_mask(event: CycleEvent) -> u8 {
    match event {
        CycleEvent::Short => INT_MC0,
        CycleEvent::Rollover => INT_OVF,
    }
}

/// TC3 in 8-bit counter mode
pub struct Tc3Counter {
    tc: pac::Tc3,
}

impl Tc3Counter {
    /// Take ownership of TC3
    ///
    /// The bus and generic clocks must already be running, see
    /// [`crate::clock::route_to_tc3`].
    pub fn new(tc: pac::Tc3) -> Self {
        Self { tc }
    }

    fn wait_sync(&self, mask: u32) {
        while self.tc.count8().syncbusy().read().bits() & mask != 0 {}
    }
}

impl CycleTimer for Tc3Counter {
    fn arm(&mut self, settings: &CycleSettings) {
        let top = settings.top().min(COUNT8_MAX) as u8;
        let short = settings.short_ticks.min(COUNT8_MAX) as u8;
        let count = self.tc.count8();

        count.ctrla().write(|w| unsafe { w.bits(CTRLA_SWRST) });
        self.wait_sync(SYNCBUSY_SWRST);

        let prescaler = (settings.prescaler.field() as u32) << CTRLA_PRESCALER_POS;
        count
            .ctrla()
            .write(|w| unsafe { w.bits(CTRLA_MODE_COUNT8 | CTRLA_RUNSTDBY | prescaler) });

        count.per().write(|w| unsafe { w.bits(top) });
        count.cc(0).write(|w| unsafe { w.bits(short) });
        self.wait_sync(SYNCBUSY_PER | SYNCBUSY_CC0);

        count.intflag().write(|w| unsafe { w.bits(INT_OVF | INT_MC0) });
        count.intenset().write(|w| unsafe { w.bits(INT_OVF | INT_MC0) });

        NVIC::unpend(pac::Interrupt::TC3);
        // SAFETY: the TC3 handler only touches state behind a critical
        // section, so unmasking cannot break another critical section
        unsafe { NVIC::unmask(pac::Interrupt::TC3) };

        count
            .ctrla()
            .modify(|r, w| unsafe { w.bits(r.bits() | CTRLA_ENABLE) });
        self.wait_sync(SYNCBUSY_ENABLE);

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "tc3: armed, per={} cc0={} prescaler={}",
            top,
            short,
            settings.prescaler
        );
    }

    fn is_pending(&self, event: CycleEvent) -> bool {
        self.tc.count8().intflag().read().bits() & event_mask(event) != 0
    }

    fn acknowledge(&mut self, event: CycleEvent) {
        // write-one-to-clear
        self.tc
            .count8()
            .intflag()
            .write(|w| unsafe { w.bits(event_mask(event)) });
    }
}
