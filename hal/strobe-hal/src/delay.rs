//! Instruction-counted delays
//!
//! Pulse widths on the LED data line are built from a single fixed-length
//! block of no-op instructions, the "unit". Every hold the protocol needs is
//! a small whole number of units.

/// Busy-wait in multiples of one unit delay
pub trait UnitDelay {
    /// Spin for exactly `N` unit delays
    ///
    /// Hardware implementations must emit `N` copies of the unit block with
    /// no loop counter between them, and the block must not be reordered,
    /// merged or removed by the compiler.
    fn delay_units<const N: usize>(&mut self);
}
