//! 32 kHz clock routing for the cycle counter
//!
//! TC3 is clocked from generic clock generator 3, which in turn runs from
//! one of the two 32.768 kHz sources. Everything on that path is set to
//! keep running in standby.

use crate::pac;

/// GENCTRL.SRC values
const GENCTRL_SRC_OSCULP32K: u32 = 0x4;
const GENCTRL_SRC_XOSC32K: u32 = 0x5;
const GENCTRL_GENEN: u32 = 1 << 8;
const GENCTRL_RUNSTDBY: u32 = 1 << 13;

/// PCHCTRL.CHEN
const PCHCTRL_CHEN: u32 = 1 << 6;

/// Peripheral channel of TC2/TC3
const PCHCTRL_TC2_TC3: usize = 26;

/// Generic clock generator feeding the counter
pub const COUNTER_GENERATOR: u8 = 3;

/// MCLK APBBMASK.TC3
const APBBMASK_TC3: u32 = 1 << 14;

/// XOSC32K bits
const XOSC32K_ENABLE: u16 = 1 << 1;
const XOSC32K_XTALEN: u16 = 1 << 2;
const XOSC32K_EN32K: u16 = 1 << 3;
const XOSC32K_RUNSTDBY: u16 = 1 << 6;
const XOSC32K_ONDEMAND: u16 = 1 << 7;

/// OSCULP32K.EN32K
const OSCULP32K_EN32K: u32 = 1 << 1;

/// OSC32KCTRL STATUS.XOSC32KRDY
const STATUS_XOSC32KRDY: u32 = 1 << 0;

/// Source of the 32.768 kHz counter clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LowPowerClock {
    /// External 32.768 kHz crystal (XOSC32K)
    Crystal,
    /// Internal ultra-low-power oscillator, for boards without a crystal
    UltraLowPower,
}

/// XOSC32K value that starts the crystal now and keeps it in standby
///
/// ONDEMAND resets to 1, which holds the oscillator off until a clock
/// request arrives. Nothing requests it before GCLK3 is switched over, so
/// it must be cleared or the ready flag never sets.
const fn xosc32k_start(current: u16) -> u16 {
    (current | XOSC32K_ENABLE | XOSC32K_XTALEN | XOSC32K_EN32K | XOSC32K_RUNSTDBY)
        & !XOSC32K_ONDEMAND
}

/// Bring up the 32 kHz source and route it to TC3
///
/// Blocks until the crystal oscillator reports ready. Leaves the TC3 bus
/// clock enabled, so the counter registers are accessible afterwards.
pub fn route_to_tc3(
    osc: &pac::Osc32kctrl,
    gclk: &pac::Gclk,
    mclk: &pac::Mclk,
    source: LowPowerClock,
) {
    let src = match source {
        LowPowerClock::Crystal => {
            osc.xosc32k()
                .modify(|r, w| unsafe { w.bits(xosc32k_start(r.bits())) });
            while osc.status().read().bits() & STATUS_XOSC32KRDY == 0 {}
            GENCTRL_SRC_XOSC32K
        }
        LowPowerClock::UltraLowPower => {
            osc.osculp32k()
                .modify(|r, w| unsafe { w.bits(r.bits() | OSCULP32K_EN32K) });
            GENCTRL_SRC_OSCULP32K
        }
    };

    let generator = COUNTER_GENERATOR as usize;
    gclk.genctrl(generator)
        .write(|w| unsafe { w.bits(src | GENCTRL_GENEN | GENCTRL_RUNSTDBY) });
    while gclk.syncbusy().read().bits() & (1 << (generator + 2)) != 0 {}

    gclk.pchctrl(PCHCTRL_TC2_TC3)
        .write(|w| unsafe { w.bits(COUNTER_GENERATOR as u32 | PCHCTRL_CHEN) });
    while gclk.pchctrl(PCHCTRL_TC2_TC3).read().bits() & PCHCTRL_CHEN == 0 {}

    mclk.apbbmask()
        .modify(|r, w| unsafe { w.bits(r.bits() | APBBMASK_TC3) });
}
