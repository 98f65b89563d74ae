//! PRIMASK interrupt masking

use cortex_m::interrupt;
use cortex_m::register::primask;
use strobe_hal::InterruptMask;

/// Masks all configurable interrupts through PRIMASK
///
/// Unlike `cortex_m::interrupt::free`, the closure is called from an
/// always-inlined body, so the masked section ends up in the caller's
/// code (and the caller's memory section).
#[derive(Debug, Default, Clone, Copy)]
pub struct PrimaskMask;

impl InterruptMask for PrimaskMask {
    #[inline(always)]
    fn masked<R>(&mut self, f: impl FnOnce() -> R) -> R {
        let was_active = primask::read().is_active();
        interrupt::disable();

        let r = f();

        if was_active {
            // SAFETY: interrupts were enabled on entry; not inside a
            // critical section owned by someone else
            unsafe { interrupt::enable() }
        }
        r
    }
}
