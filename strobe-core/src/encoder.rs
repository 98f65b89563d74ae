//! Pulse encoder for a single addressable LED
//!
//! Sends one 24-bit color, most-significant bit first. Each bit is a
//! rising edge, a high hold, a falling edge and a low hold; the hold
//! lengths come from [`crate::timing`] and are burned into the code as
//! const generic unit counts, so the loop body is straight-line code with
//! no arithmetic between edges.
//!
//! The whole bit loop runs inside [`InterruptMask::masked`]. Hardware
//! implementations must also run it from wait-state-free memory; see the
//! chip crate for where the monomorphized routine is placed.

use strobe_hal::{InterruptMask, OutputPin, UnitDelay};

use crate::color::{Grb, COLOR_BITS};
use crate::timing::{ONE_HIGH_UNITS, ONE_LOW_UNITS, ZERO_HIGH_UNITS, ZERO_LOW_UNITS};

/// Something that can show a color on the LED
///
/// The scheduler talks to the LED only through this trait.
pub trait Transmit {
    /// Put the data line into its idle state (output, driven low)
    fn prepare(&mut self);

    /// Send one color
    fn transmit(&mut self, color: Grb);
}

/// Bit-banged single-wire LED encoder
pub struct PulseEncoder<P, D, M> {
    pin: P,
    delay: D,
    mask: M,
}

impl<P, D, M> PulseEncoder<P, D, M>
where
    P: OutputPin,
    D: UnitDelay,
    M: InterruptMask,
{
    /// Create an encoder
    ///
    /// Does not touch the pin; call [`Transmit::prepare`] before the first
    /// transmission.
    pub fn new(pin: P, delay: D, mask: M) -> Self {
        Self { pin, delay, mask }
    }

    /// Send `color` on the data line
    ///
    /// Interrupts are masked for the whole transmission. Returns with the
    /// line low.
    #[inline(always)]
    pub fn send(&mut self, color: Grb) {
        let Self { pin, delay, mask } = self;
        let grb = color.into_u32();

        mask.masked(|| {
            let mut bit = 1u32 << (COLOR_BITS - 1);
            while bit != 0 {
                if grb & bit != 0 {
                    pin.set_high();
                    delay.delay_units::<ONE_HIGH_UNITS>();
                    pin.set_low();
                    delay.delay_units::<ONE_LOW_UNITS>();
                } else {
                    pin.set_high();
                    delay.delay_units::<ZERO_HIGH_UNITS>();
                    pin.set_low();
                    delay.delay_units::<ZERO_LOW_UNITS>();
                }
                bit >>= 1;
            }
        });
    }
}

impl<P, D, M> Transmit for PulseEncoder<P, D, M>
where
    P: OutputPin,
    D: UnitDelay,
    M: InterruptMask,
{
    fn prepare(&mut self) {
        self.pin.set_low();
        self.pin.enable_output();
    }

    #[inline(always)]
    fn transmit(&mut self, color: Grb) {
        self.send(color);
    }
}
