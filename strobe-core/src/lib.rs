//! Board-agnostic core logic for the status strobe
//!
//! This crate contains everything that does not depend on a specific chip:
//!
//! - Packed GRB color values
//! - Single-wire LED protocol timing, derived per CPU speed at compile time
//! - The pulse encoder
//! - The periodic scheduler and its shared idle color
//! - Waveform capture and decoding for host-side verification
//! - Configuration types and validation

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod color;
pub mod config;
pub mod encoder;
pub mod scheduler;
pub mod timing;
pub mod waveform;

pub use color::Grb;
pub use config::{ConfigError, PinId, StrobeConfig};
pub use encoder::{PulseEncoder, Transmit};
pub use scheduler::{IdleColor, Strobe, FLASH_COLOR};
pub use timing::CpuSpeed;
