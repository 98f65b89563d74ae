//! Pulse encoder placed in SRAM
//!
//! Flash fetches on the SAMD51 insert wait states that vary with cache
//! state, which is enough to push a 333 ns pulse out of its band. The bit
//! loop is therefore compiled into a function linked into `.data`, which
//! the runtime copies to RAM before `main`.

use strobe_core::{Grb, PulseEncoder, Transmit};

use crate::delay::NopDelay;
use crate::gpio::PortPin;
use crate::irq::PrimaskMask;

/// Pulse encoder on a PORT pin with the `nop` delay and PRIMASK masking
pub type PortEncoder<const GROUP: u8, const PIN: u8> =
    PulseEncoder<PortPin<GROUP, PIN>, NopDelay, PrimaskMask>;

/// Status LED on `P{GROUP}{PIN}`, transmitting from RAM
pub struct RamLed<const GROUP: u8, const PIN: u8> {
    encoder: PortEncoder<GROUP, PIN>,
}

impl<const GROUP: u8, const PIN: u8> RamLed<GROUP, PIN> {
    pub fn new(pin: PortPin<GROUP, PIN>) -> Self {
        Self {
            encoder: PulseEncoder::new(pin, NopDelay, PrimaskMask),
        }
    }
}

impl<const GROUP: u8, const PIN: u8> Transmit for RamLed<GROUP, PIN> {
    fn prepare(&mut self) {
        self.encoder.prepare();
    }

    fn transmit(&mut self, color: Grb) {
        send_from_ram(&mut self.encoder, color);
    }
}

/// Never inlined, so the whole masked bit loop lives in this RAM copy
#[inline(never)]
#[link_section = ".data.strobe_send"]
fn send_from_ram<const GROUP: u8, const PIN: u8>(encoder: &mut PortEncoder<GROUP, PIN>, color: Grb) {
    encoder.send(color);
}
