//! Strobe Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the pulse encoder and the
//! periodic scheduler are written against. Chip-specific crates implement
//! them; the core crate only ever sees these traits, which is what lets the
//! protocol timing and the interrupt logic be tested on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  strobe-firmware (entry point, vectors) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  strobe-core (encoder, scheduler)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  strobe-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │  strobe-hal-  │
//!             │    samd51     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - The single data line driving the LED
//! - [`delay::UnitDelay`] - Instruction-counted busy wait
//! - [`irq::InterruptMask`] - Scoped interrupt masking
//! - [`timer::CycleTimer`] - Free-running counter with two events per period

#![no_std]
#![deny(unsafe_code)]

pub mod delay;
pub mod gpio;
pub mod irq;
pub mod timer;

// Re-export key traits at crate root for convenience
pub use delay::UnitDelay;
pub use gpio::OutputPin;
pub use irq::InterruptMask;
pub use timer::{CycleEvent, CycleSettings, CycleTimer, Prescaler};
