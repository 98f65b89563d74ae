//! GPIO pin abstractions
//!
//! The pulse encoder drives exactly one output. Implementations must make
//! `set_high`/`set_low` a single store to the port's set/clear register so
//! that the cost of an edge is constant.

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Switch the pin direction to output
    ///
    /// Called once before the first transmission. The driven level is
    /// whatever was last written with `set_high`/`set_low`.
    fn enable_output(&mut self);

    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);
}
