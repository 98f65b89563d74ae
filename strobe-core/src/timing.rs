//! Single-wire LED protocol timing
//!
//! A bit is a high phase followed by a low phase; the receiver tells a 1
//! from a 0 by how long the line stays high. Each of the four holds is a
//! whole number of unit delays, and the unit itself is the greatest common
//! divisor of the four holds expressed in CPU cycles. Recomputing the unit
//! per CPU speed keeps the same multiples valid at both supported clocks.
//!
//! All the arithmetic here is `const` and checked at compile time: a hold
//! that lands outside its band is a build failure, not a runtime error.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Supported CPU clock speeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
pub enum CpuSpeed {
    /// 48 MHz (DFLL, the reset clock)
    Mhz48,
    /// 120 MHz (DPLL)
    Mhz120,
}

impl CpuSpeed {
    /// Both supported speeds
    pub const ALL: [CpuSpeed; 2] = [CpuSpeed::Mhz48, CpuSpeed::Mhz120];

    /// Core clock in Hz
    pub const fn hz(self) -> u32 {
        match self {
            CpuSpeed::Mhz48 => 48_000_000,
            CpuSpeed::Mhz120 => 120_000_000,
        }
    }
}

impl TryFrom<u32> for CpuSpeed {
    type Error = ConfigError;

    fn try_from(hz: u32) -> Result<Self, Self::Error> {
        match hz {
            48_000_000 => Ok(CpuSpeed::Mhz48),
            120_000_000 => Ok(CpuSpeed::Mhz120),
            _ => Err(ConfigError::UnsupportedCpuSpeed(hz)),
        }
    }
}

impl From<CpuSpeed> for u32 {
    fn from(speed: CpuSpeed) -> Self {
        speed.hz()
    }
}

/// Allowed range for one phase of a bit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Band {
    /// Shortest accepted duration
    pub min_ns: u32,
    /// Longest accepted duration
    pub max_ns: u32,
}

impl Band {
    const fn new(min_ns: u32, max_ns: u32) -> Self {
        Self { min_ns, max_ns }
    }

    /// Whether a duration in picoseconds lies inside the band
    pub const fn contains_ps(&self, ps: u64) -> bool {
        ps >= self.min_ns as u64 * 1000 && ps <= self.max_ns as u64 * 1000
    }
}

/// High phase of a 1 bit
pub const ONE_HIGH: Band = Band::new(550, 850);
/// Low phase of a 1 bit (receivers tolerate much shorter in practice)
pub const ONE_LOW: Band = Band::new(450, 750);
/// High phase of a 0 bit
///
/// The first bits after waking from standby run slow, so the target sits
/// well below the 500 ns limit.
pub const ZERO_HIGH: Band = Band::new(35, 500);
/// Low phase of a 0 bit
pub const ZERO_LOW: Band = Band::new(650, 950);

/// Hold targets actually aimed for, in nanoseconds
pub const ONE_HIGH_TARGET_NS: u32 = 667;
pub const ONE_LOW_TARGET_NS: u32 = 500;
pub const ZERO_HIGH_TARGET_NS: u32 = 333;
pub const ZERO_LOW_TARGET_NS: u32 = 667;

/// Hold lengths in unit delays
pub const ONE_HIGH_UNITS: usize = 4;
pub const ONE_LOW_UNITS: usize = 3;
pub const ZERO_HIGH_UNITS: usize = 2;
pub const ZERO_LOW_UNITS: usize = 4;

/// Longest hold in unit delays; hardware delays unroll up to this many
pub const MAX_HOLD_UNITS: usize = 4;

/// Greatest common divisor
pub const fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Nanoseconds to CPU cycles at `speed`, rounded to nearest
pub const fn cycles(ns: u32, speed: CpuSpeed) -> u32 {
    ((ns as u64 * speed.hz() as u64 + 500_000_000) / 1_000_000_000) as u32
}

/// No-op instructions in one unit delay at `speed`
pub const fn unit_cycles(speed: CpuSpeed) -> u32 {
    gcd(
        gcd(
            cycles(ONE_HIGH_TARGET_NS, speed),
            cycles(ONE_LOW_TARGET_NS, speed),
        ),
        gcd(
            cycles(ZERO_HIGH_TARGET_NS, speed),
            cycles(ZERO_LOW_TARGET_NS, speed),
        ),
    )
}

/// Unit delays needed for a hold target at `speed`
pub const fn units_for(ns: u32, speed: CpuSpeed) -> usize {
    (cycles(ns, speed) / unit_cycles(speed)) as usize
}

/// Resolved bit timing for one CPU speed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitTiming {
    pub speed: CpuSpeed,
    /// Cycles per unit delay
    pub unit_cycles: u32,
    /// Length of one unit delay in picoseconds (truncated)
    pub unit_ps: u64,
}

impl BitTiming {
    pub const fn for_speed(speed: CpuSpeed) -> Self {
        let unit_cycles = unit_cycles(speed);
        Self {
            speed,
            unit_cycles,
            unit_ps: unit_cycles as u64 * 1_000_000_000_000 / speed.hz() as u64,
        }
    }

    /// Duration of `units` unit delays in picoseconds
    pub const fn hold_ps(&self, units: usize) -> u64 {
        self.unit_ps * units as u64
    }

    /// High and low hold of a bit, in picoseconds
    pub const fn phases_ps(&self, bit: bool) -> (u64, u64) {
        if bit {
            (self.hold_ps(ONE_HIGH_UNITS), self.hold_ps(ONE_LOW_UNITS))
        } else {
            (self.hold_ps(ZERO_HIGH_UNITS), self.hold_ps(ZERO_LOW_UNITS))
        }
    }

    /// Upper bound on the busy-wait time of one full color
    pub const fn max_color_ps(&self) -> u64 {
        let (h1, l1) = self.phases_ps(true);
        let (h0, l0) = self.phases_ps(false);
        let one = h1 + l1;
        let zero = h0 + l0;
        let worst = if one > zero { one } else { zero };
        worst * crate::color::COLOR_BITS as u64
    }
}

const fn check_speed(speed: CpuSpeed) {
    let unit = unit_cycles(speed);
    assert!(unit > 0);

    assert!(cycles(ONE_HIGH_TARGET_NS, speed) % unit == 0);
    assert!(cycles(ONE_LOW_TARGET_NS, speed) % unit == 0);
    assert!(cycles(ZERO_HIGH_TARGET_NS, speed) % unit == 0);
    assert!(cycles(ZERO_LOW_TARGET_NS, speed) % unit == 0);

    assert!(units_for(ONE_HIGH_TARGET_NS, speed) == ONE_HIGH_UNITS);
    assert!(units_for(ONE_LOW_TARGET_NS, speed) == ONE_LOW_UNITS);
    assert!(units_for(ZERO_HIGH_TARGET_NS, speed) == ZERO_HIGH_UNITS);
    assert!(units_for(ZERO_LOW_TARGET_NS, speed) == ZERO_LOW_UNITS);

    assert!(ONE_HIGH_UNITS <= MAX_HOLD_UNITS);
    assert!(ONE_LOW_UNITS <= MAX_HOLD_UNITS);
    assert!(ZERO_HIGH_UNITS <= MAX_HOLD_UNITS);
    assert!(ZERO_LOW_UNITS <= MAX_HOLD_UNITS);

    let t = BitTiming::for_speed(speed);
    assert!(ONE_HIGH.contains_ps(t.hold_ps(ONE_HIGH_UNITS)));
    assert!(ONE_LOW.contains_ps(t.hold_ps(ONE_LOW_UNITS)));
    assert!(ZERO_HIGH.contains_ps(t.hold_ps(ZERO_HIGH_UNITS)));
    assert!(ZERO_LOW.contains_ps(t.hold_ps(ZERO_LOW_UNITS)));
}

const _: () = {
    let mut i = 0;
    while i < CpuSpeed::ALL.len() {
        check_speed(CpuSpeed::ALL[i]);
        i += 1;
    }
};
