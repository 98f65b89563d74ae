//! SAMD51-specific HAL for the Strobe firmware
//!
//! Implements the `strobe-hal` traits on top of the SAMD51 peripheral
//! access crate:
//!
//! - [`gpio::PortPin`] - PORT group output via OUTSET/OUTCLR
//! - [`delay::NopDelay`] - unit delay of counted `nop` instructions
//! - [`irq::PrimaskMask`] - PRIMASK-based interrupt masking
//! - [`tc::Tc3Counter`] - TC3 in 8-bit mode as the cycle counter
//! - [`ram::RamLed`] - the pulse encoder, executed from SRAM
//!
//! plus the bits of clock and power setup the strobe itself depends on.
//!
//! # Features
//!
//! - `cpu-120mhz` / `cpu-48mhz` - CPU speed the unit delay is sized for
//! - `defmt` - Enable debug formatting and logging

#![cfg_attr(not(test), no_std)]

pub use atsamd51j as pac;

pub mod clock;
pub mod delay;
pub mod gpio;
pub mod irq;
pub mod power;
pub mod ram;
pub mod tc;

pub use delay::CPU_SPEED;
