//! GPIO output for the SAMD51 PORT peripheral
//!
//! Pins are addressed by group (A = 0, B = 1, ...) and index at compile
//! time, so every edge is one store of a constant mask to a constant
//! address.

use crate::pac;

/// A single PORT pin driven as a push-pull output
pub struct PortPin<const GROUP: u8, const PIN: u8> {
    _port: (),
}

impl<const GROUP: u8, const PIN: u8> PortPin<GROUP, PIN> {
    const MASK: u32 = {
        assert!(GROUP < 4, "SAMD51 PORT has groups A to D");
        assert!(PIN < 32, "PORT groups have 32 pins");
        1 << PIN
    };

    /// Take the pin
    ///
    /// Borrowing the PORT peripheral ties pin creation to ownership of
    /// the peripherals; the pin itself writes through the set/clear
    /// registers only, which never disturb other pins.
    pub fn new(_port: &pac::Port) -> Self {
        Self { _port: () }
    }

    #[inline(always)]
    fn port() -> &'static pac::port::RegisterBlock {
        // SAFETY: DIRSET/OUTSET/OUTCLR are write-one-to-act registers
        // touching only the bits written
        unsafe { &*pac::Port::ptr() }
    }
}

impl<const GROUP: u8, const PIN: u8> strobe_hal::OutputPin for PortPin<GROUP, PIN> {
    #[inline(always)]
    fn enable_output(&mut self) {
        Self::port()
            .group(GROUP as usize)
            .dirset()
            .write(|w| unsafe { w.bits(Self::MASK) });
    }

    #[inline(always)]
    fn set_high(&mut self) {
        Self::port()
            .group(GROUP as usize)
            .outset()
            .write(|w| unsafe { w.bits(Self::MASK) });
    }

    #[inline(always)]
    fn set_low(&mut self) {
        Self::port()
            .group(GROUP as usize)
            .outclr()
            .write(|w| unsafe { w.bits(Self::MASK) });
    }
}
