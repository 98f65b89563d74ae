//! Strobe - heartbeat status LED firmware
//!
//! Drives a single WS2812-style LED on a SAMD51 board from the TC3
//! interrupt: the configured idle color one tick into each period, a
//! white flash at the end of it. Between interrupts the core sleeps in
//! standby; the counter keeps running from the 32 kHz clock.

#![no_std]
#![no_main]

use core::cell::RefCell;

use cortex_m_rt::{entry, exception, ExceptionFrame};
use critical_section::Mutex;
use defmt::*;
use {defmt_rtt as _, panic_probe as _};

use strobe_core::{IdleColor, Strobe};
use strobe_hal_samd51::clock;
use strobe_hal_samd51::gpio::PortPin;
use strobe_hal_samd51::pac::{self, interrupt};
use strobe_hal_samd51::power::{self, SleepMode};
use strobe_hal_samd51::ram::RamLed;
use strobe_hal_samd51::tc::Tc3Counter;

/// Constants generated from strobe.toml
mod config {
    include!(concat!(env!("OUT_DIR"), "/strobe_config.rs"));
}

type Led = RamLed<{ config::LED_GROUP }, { config::LED_PIN }>;
type Heartbeat = Strobe<'static, Tc3Counter, Led>;

/// Color shown between flashes, readable from the TC3 handler
static IDLE_COLOR: IdleColor = IdleColor::new(config::IDLE_COLOR);

/// Running strobe, owned by the TC3 handler once started
static STROBE: Mutex<RefCell<Option<Heartbeat>>> = Mutex::new(RefCell::new(None));

#[entry]
fn main() -> ! {
    info!("Strobe firmware starting...");
    info!(
        "CPU {} Hz, LED on {}, idle color {}",
        strobe_hal_samd51::CPU_SPEED.hz(),
        config::LED_NAME,
        config::IDLE_COLOR
    );

    let dp = unwrap!(pac::Peripherals::take());

    power::disable_usb(&dp.usb);
    power::set_sleep_mode(&dp.pm, SleepMode::Standby);

    clock::route_to_tc3(&dp.osc32kctrl, &dp.gclk, &dp.mclk, config::CLOCK_SOURCE);
    info!("32 kHz clock: {}", config::CLOCK_SOURCE);

    let led = Led::new(PortPin::new(&dp.port));
    let timer = Tc3Counter::new(dp.tc3);

    // Armed with interrupts masked: the first event waits until the
    // strobe is in place
    critical_section::with(|cs| {
        let strobe = Strobe::start(timer, led, &IDLE_COLOR, config::IDLE_COLOR, &config::CYCLE);
        STROBE.borrow_ref_mut(cs).replace(strobe);
    });

    info!(
        "Strobe running: period {} ms, idle after {} ms",
        config::CYCLE.period_ms(),
        config::CYCLE.short_ms()
    );

    loop {
        cortex_m::asm::wfe();
    }
}

#[interrupt]
fn TC3() {
    let event = critical_section::with(|cs| {
        STROBE
            .borrow_ref_mut(cs)
            .as_mut()
            .and_then(|strobe| strobe.on_interrupt())
    });

    match event {
        Some(event) => trace!("tc3: {}", event),
        None => warn!("tc3: no event pending"),
    }
}

#[exception]
unsafe fn HardFault(frame: &ExceptionFrame) -> ! {
    error!("HardFault at pc={:#010x}", frame.pc());
    park()
}

#[exception]
unsafe fn DefaultHandler(irqn: i16) {
    error!("Unhandled interrupt {}", irqn);
    park()
}

/// Stop doing anything, at the lowest power the core allows
fn park() -> ! {
    loop {
        cortex_m::asm::wfi();
    }
}
