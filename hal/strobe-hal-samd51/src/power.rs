//! Power manager and USB setup

use crate::pac;

/// USB CTRLA.ENABLE
const USB_CTRLA_ENABLE: u8 = 1 << 1;

/// Sleep modes selectable through PM SLEEPCFG
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SleepMode {
    Idle = 0x2,
    Standby = 0x4,
    Hibernate = 0x5,
    Backup = 0x6,
    Off = 0x7,
}

/// Select the mode entered by `wfi`/`wfe` with SLEEPDEEP clear
///
/// SLEEPCFG is read back until it reflects the new mode, as the power
/// manager requires before the next sleep instruction.
pub fn set_sleep_mode(pm: &pac::Pm, mode: SleepMode) {
    pm.sleepcfg().write(|w| unsafe { w.bits(mode as u8) });
    while pm.sleepcfg().read().bits() != mode as u8 {}
}

/// CTRLA value that turns USB off, or `None` if it is already off
const fn usb_ctrla_disabled(ctrla: u8) -> Option<u8> {
    if ctrla & USB_CTRLA_ENABLE != 0 {
        Some(ctrla & !USB_CTRLA_ENABLE)
    } else {
        None
    }
}

/// Turn off the USB peripheral if the bootloader left it running
///
/// An enabled USB module keeps its clocks requested and prevents the chip
/// from reaching standby. A disabled one is left alone: its generic clock
/// may be stopped, and an ENABLE write would then never finish syncing.
pub fn disable_usb(usb: &pac::Usb) {
    let ctrla = usb.device().ctrla();
    if let Some(bits) = usb_ctrla_disabled(ctrla.read().bits()) {
        ctrla.write(|w| unsafe { w.bits(bits) });
        while usb.device().syncbusy().read().bits() != 0 {}
    }
}
