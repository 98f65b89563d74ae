//! Interrupt masking

/// Scoped interrupt masking
///
/// A transmission must never be preempted, so the encoder runs its whole
/// bit loop inside [`InterruptMask::masked`].
pub trait InterruptMask {
    /// Run `f` with interrupts disabled
    ///
    /// The previous mask state is restored when `f` returns: if interrupts
    /// were already disabled on entry they stay disabled.
    fn masked<R>(&mut self, f: impl FnOnce() -> R) -> R;
}
