//! Counted `nop` unit delay
//!
//! The number of `nop`s in one unit comes straight from
//! [`strobe_core::timing::unit_cycles`] for the CPU speed selected by
//! feature, so both supported speeds share one delay block definition.

use core::arch::asm;

use strobe_core::timing::{unit_cycles, CpuSpeed, MAX_HOLD_UNITS};
use strobe_hal::UnitDelay;

#[cfg(all(feature = "cpu-48mhz", feature = "cpu-120mhz"))]
compile_error!("features `cpu-48mhz` and `cpu-120mhz` are mutually exclusive");

#[cfg(not(any(feature = "cpu-48mhz", feature = "cpu-120mhz")))]
compile_error!("select a CPU speed with feature `cpu-48mhz` or `cpu-120mhz`");

/// CPU speed this build is timed for
#[cfg(feature = "cpu-120mhz")]
pub const CPU_SPEED: CpuSpeed = CpuSpeed::Mhz120;

/// CPU speed this build is timed for
#[cfg(all(feature = "cpu-48mhz", not(feature = "cpu-120mhz")))]
pub const CPU_SPEED: CpuSpeed = CpuSpeed::Mhz48;

/// `nop` instructions per unit delay
pub const UNIT_NOPS: u32 = unit_cycles(CPU_SPEED);

/// One unit delay
///
/// The block is a single `asm!` statement, so the compiler can neither
/// drop nor split it, and consecutive blocks stay back to back.
#[inline(always)]
fn unit() {
    // SAFETY: only `nop`s, no memory, stack or flag effects
    unsafe {
        asm!(
            ".rept {n}",
            "nop",
            ".endr",
            n = const UNIT_NOPS,
            options(nomem, nostack, preserves_flags)
        );
    }
}

/// Unit delay built from counted `nop`s
///
/// Nominal, not measured: a Cortex-M4 may retire a `nop` in less than a
/// cycle's worth of wall time, and instruction fetch from flash adds wait
/// states. Both effects shorten or stretch pulses, which is why the
/// encoder must run from SRAM and why the targets sit inside their bands
/// with margin.
#[derive(Debug, Default, Clone, Copy)]
pub struct NopDelay;

impl UnitDelay for NopDelay {
    #[inline(always)]
    fn delay_units<const N: usize>(&mut self) {
        const { assert!(N <= MAX_HOLD_UNITS, "no unrolled delay block for this many units") };

        // N is a constant, so only one arm survives
        match N {
            0 => {}
            1 => unit(),
            2 => {
                unit();
                unit();
            }
            3 => {
                unit();
                unit();
                unit();
            }
            _ => {
                unit();
                unit();
                unit();
                unit();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_block_sized_for_cpu_speed() {
        let expected = match CPU_SPEED {
            CpuSpeed::Mhz120 => 20,
            CpuSpeed::Mhz48 => 8,
        };
        assert_eq!(UNIT_NOPS, expected);
    }

    #[test]
    fn test_every_hold_length_is_available() {
        let mut delay = NopDelay;
        delay.delay_units::<0>();
        delay.delay_units::<1>();
        delay.delay_units::<2>();
        delay.delay_units::<3>();
        delay.delay_units::<MAX_HOLD_UNITS>();
    }
}
