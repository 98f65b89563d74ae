//! Configuration types
//!
//! The strobe is configured entirely at build time. The firmware's build
//! script deserializes `strobe.toml` into [`StrobeConfig`] (with the `serde`
//! feature), validates it here and emits constants; nothing is parsed on
//! the target.
//!
//! The TOML deserialization tests need the feature too:
//! `cargo test -p strobe-core --features serde`.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{de, Deserialize, Deserializer};

use strobe_hal::timer::{CycleSettings, Prescaler};

use crate::color::Grb;
use crate::timing::CpuSpeed;

/// Ticks an 8-bit counter can count before wrapping
pub const COUNTER_MAX_TICKS: u16 = 256;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// CPU frequency is not one of the supported speeds
    UnsupportedCpuSpeed(u32),
    /// Counter clock frequency is zero
    ZeroClock,
    /// Prescaler divisor is not available on the counter
    InvalidPrescaler(u32),
    /// Period does not fit the 8-bit counter
    PeriodOutOfRange(u16),
    /// Short event is not strictly inside the period
    ShortOutOfRange { short_ticks: u16, period_ticks: u16 },
    /// Pin name could not be parsed
    InvalidPin,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnsupportedCpuSpeed(hz) => {
                write!(f, "unsupported CPU speed {hz} Hz (use 48000000 or 120000000)")
            }
            ConfigError::ZeroClock => f.write_str("counter clock must be non-zero"),
            ConfigError::InvalidPrescaler(div) => write!(f, "invalid prescaler divisor {div}"),
            ConfigError::PeriodOutOfRange(ticks) => {
                write!(f, "period of {ticks} ticks does not fit in 2..={COUNTER_MAX_TICKS}")
            }
            ConfigError::ShortOutOfRange {
                short_ticks,
                period_ticks,
            } => write!(
                f,
                "short event at tick {short_ticks} must be in 1..{period_ticks}"
            ),
            ConfigError::InvalidPin => f.write_str("invalid pin name (expected e.g. \"PB03\")"),
        }
    }
}

/// A port pin: group (A = 0, B = 1, ...) and pin number within the group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinId {
    pub group: u8,
    pub pin: u8,
}

impl PinId {
    pub const fn new(group: u8, pin: u8) -> Self {
        Self { group, pin }
    }

    /// Parse a pin name
    ///
    /// Supports formats:
    /// - "PB03" -> (group 1, pin 3)
    /// - "PA2" -> (group 0, pin 2)
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let s = s.trim();
        let rest = s.strip_prefix('P').ok_or(ConfigError::InvalidPin)?;

        let mut chars = rest.chars();
        let port = chars.next().ok_or(ConfigError::InvalidPin)?;
        if !('A'..='D').contains(&port) {
            return Err(ConfigError::InvalidPin);
        }

        let digits = chars.as_str();
        if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConfigError::InvalidPin);
        }
        let pin: u8 = digits.parse().map_err(|_| ConfigError::InvalidPin)?;
        if pin > 31 {
            return Err(ConfigError::InvalidPin);
        }

        Ok(Self {
            group: port as u8 - b'A',
            pin,
        })
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}{:02}", (b'A' + self.group) as char, self.pin)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for PinId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PinVisitor;

        impl<'de> de::Visitor<'de> for PinVisitor {
            type Value = PinId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a port pin such as \"PB03\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<PinId, E> {
                PinId::parse(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(PinVisitor)
    }
}

/// `[cpu]` section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct CpuConfig {
    /// Core clock the firmware runs at; selects the unit delay length
    pub frequency_hz: CpuSpeed,
}

/// `[clock]` section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct ClockConfig {
    /// Use the internal ultra-low-power 32 kHz oscillator instead of the crystal
    #[cfg_attr(feature = "serde", serde(default))]
    pub crystalless: bool,
}

/// `[cycle]` section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct CycleConfig {
    /// Counter clock in Hz
    #[cfg_attr(feature = "serde", serde(default = "default_clock_hz"))]
    pub clock_hz: u32,
    /// Prescaler divisor
    pub prescaler: u32,
    /// Ticks per full period
    pub period_ticks: u16,
    /// Tick at which the idle color is shown
    pub short_ticks: u16,
}

#[cfg(feature = "serde")]
fn default_clock_hz() -> u32 {
    CycleSettings::REFERENCE.clock_hz
}

impl CycleConfig {
    /// Validate and convert into counter settings
    pub fn settings(&self) -> Result<CycleSettings, ConfigError> {
        if self.clock_hz == 0 {
            return Err(ConfigError::ZeroClock);
        }

        let prescaler = Prescaler::from_divisor(self.prescaler)
            .ok_or(ConfigError::InvalidPrescaler(self.prescaler))?;

        if self.period_ticks < 2 || self.period_ticks > COUNTER_MAX_TICKS {
            return Err(ConfigError::PeriodOutOfRange(self.period_ticks));
        }

        if self.short_ticks == 0 || self.short_ticks >= self.period_ticks {
            return Err(ConfigError::ShortOutOfRange {
                short_ticks: self.short_ticks,
                period_ticks: self.period_ticks,
            });
        }

        Ok(CycleSettings {
            clock_hz: self.clock_hz,
            prescaler,
            period_ticks: self.period_ticks,
            short_ticks: self.short_ticks,
        })
    }
}

impl From<CycleSettings> for CycleConfig {
    fn from(s: CycleSettings) -> Self {
        Self {
            clock_hz: s.clock_hz,
            prescaler: s.prescaler.divisor(),
            period_ticks: s.period_ticks,
            short_ticks: s.short_ticks,
        }
    }
}

/// `[led]` section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct LedConfig {
    /// Data pin of the LED
    pub pin: PinId,
    /// Color shown between flashes
    #[cfg_attr(feature = "serde", serde(default))]
    pub idle_color: Grb,
}

/// Complete strobe configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct StrobeConfig {
    pub cpu: CpuConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    pub clock: ClockConfig,
    pub cycle: CycleConfig,
    pub led: LedConfig,
}

impl StrobeConfig {
    /// Feather M4 defaults: 120 MHz, crystal, 4 s cycle, LED on PB03, idle black
    pub const REFERENCE: Self = Self {
        cpu: CpuConfig {
            frequency_hz: CpuSpeed::Mhz120,
        },
        clock: ClockConfig { crystalless: false },
        cycle: CycleConfig {
            clock_hz: CycleSettings::REFERENCE.clock_hz,
            prescaler: 1024,
            period_ticks: CycleSettings::REFERENCE.period_ticks,
            short_ticks: CycleSettings::REFERENCE.short_ticks,
        },
        led: LedConfig {
            pin: PinId::new(1, 3),
            idle_color: Grb::BLACK,
        },
    };

    /// Check the whole configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cycle.settings()?;
        if self.led.pin.group > 3 || self.led.pin.pin > 31 {
            return Err(ConfigError::InvalidPin);
        }
        Ok(())
    }
}

impl Default for StrobeConfig {
    fn default() -> Self {
        Self::REFERENCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pin() {
        assert_eq!(PinId::parse("PB03"), Ok(PinId::new(1, 3)));
        assert_eq!(PinId::parse("PA2"), Ok(PinId::new(0, 2)));
        assert_eq!(PinId::parse(" PD31 "), Ok(PinId::new(3, 31)));
    }

    #[test]
    fn test_parse_pin_rejects_garbage() {
        assert_eq!(PinId::parse(""), Err(ConfigError::InvalidPin));
        assert_eq!(PinId::parse("P"), Err(ConfigError::InvalidPin));
        assert_eq!(PinId::parse("PB"), Err(ConfigError::InvalidPin));
        assert_eq!(PinId::parse("PE01"), Err(ConfigError::InvalidPin));
        assert_eq!(PinId::parse("PB32"), Err(ConfigError::InvalidPin));
        assert_eq!(PinId::parse("PB123"), Err(ConfigError::InvalidPin));
        assert_eq!(PinId::parse("PB+1"), Err(ConfigError::InvalidPin));
        assert_eq!(PinId::parse("B03"), Err(ConfigError::InvalidPin));
    }

    #[test]
    fn test_reference_config_is_valid() {
        let config = StrobeConfig::REFERENCE;
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.cycle.settings(), Ok(CycleSettings::REFERENCE));
        assert_eq!(CycleConfig::from(CycleSettings::REFERENCE), config.cycle);
    }

    #[test]
    fn test_cycle_validation() {
        let base = StrobeConfig::REFERENCE.cycle;

        let bad = CycleConfig { prescaler: 3, ..base };
        assert_eq!(bad.settings(), Err(ConfigError::InvalidPrescaler(3)));

        let bad = CycleConfig { clock_hz: 0, ..base };
        assert_eq!(bad.settings(), Err(ConfigError::ZeroClock));

        let bad = CycleConfig { period_ticks: 257, ..base };
        assert_eq!(bad.settings(), Err(ConfigError::PeriodOutOfRange(257)));

        let bad = CycleConfig { period_ticks: 1, ..base };
        assert_eq!(bad.settings(), Err(ConfigError::PeriodOutOfRange(1)));

        let bad = CycleConfig { short_ticks: 0, ..base };
        assert!(matches!(
            bad.settings(),
            Err(ConfigError::ShortOutOfRange { short_ticks: 0, .. })
        ));

        let bad = CycleConfig { short_ticks: 128, ..base };
        assert!(matches!(
            bad.settings(),
            Err(ConfigError::ShortOutOfRange { short_ticks: 128, period_ticks: 128 })
        ));

        let ok = CycleConfig { period_ticks: 256, short_ticks: 255, ..base };
        assert!(ok.settings().is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_full_config() {
        let config: StrobeConfig = toml::from_str(
            r#"
            [cpu]
            frequency_hz = 48_000_000

            [clock]
            crystalless = true

            [cycle]
            prescaler = 1024
            period_ticks = 64
            short_ticks = 2

            [led]
            pin = "PA17"
            idle_color = 0x00FF00
            "#,
        )
        .unwrap();

        assert_eq!(config.cpu.frequency_hz, CpuSpeed::Mhz48);
        assert!(config.clock.crystalless);
        assert_eq!(config.cycle.clock_hz, 32768);
        assert_eq!(config.cycle.period_ticks, 64);
        assert_eq!(config.led.pin, PinId::new(0, 17));
        assert_eq!(config.led.idle_color, Grb::new(0x00, 0xFF, 0x00));
        assert_eq!(config.validate(), Ok(()));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_defaults() {
        let config: StrobeConfig = toml::from_str(
            r#"
            cpu = { frequency_hz = 120_000_000 }
            cycle = { prescaler = 1024, period_ticks = 128, short_ticks = 1 }
            led = { pin = "PB03" }
            "#,
        )
        .unwrap();

        assert_eq!(config, StrobeConfig::REFERENCE);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_rejects_bad_values() {
        let bad_speed = r#"
            cpu = { frequency_hz = 100_000_000 }
            cycle = { prescaler = 1024, period_ticks = 128, short_ticks = 1 }
            led = { pin = "PB03" }
        "#;
        assert!(toml::from_str::<StrobeConfig>(bad_speed).is_err());

        let bad_pin = r#"
            cpu = { frequency_hz = 120_000_000 }
            cycle = { prescaler = 1024, period_ticks = 128, short_ticks = 1 }
            led = { pin = "PZ03" }
        "#;
        assert!(toml::from_str::<StrobeConfig>(bad_pin).is_err());
    }
}
