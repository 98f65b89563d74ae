//! Periodic counter abstraction
//!
//! The scheduler needs a free-running hardware counter, clocked from a
//! low-power oscillator that keeps running in sleep, which raises two
//! distinguishable events per period: a compare match shortly after the
//! counter restarts, and the rollover itself.

#[cfg(feature = "defmt")]
use defmt::Format;

/// Events a [`CycleTimer`] can raise within one period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub enum CycleEvent {
    /// Count reached the short compare value
    Short,
    /// Count wrapped from the top value back to zero
    Rollover,
}

/// Counter clock prescaler
///
/// The divisors match the usual 3-bit prescaler field of small MCU timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub enum Prescaler {
    Div1,
    Div2,
    Div4,
    Div8,
    Div16,
    Div64,
    Div256,
    Div1024,
}

impl Prescaler {
    /// All prescalers, in register field order
    pub const ALL: [Prescaler; 8] = [
        Prescaler::Div1,
        Prescaler::Div2,
        Prescaler::Div4,
        Prescaler::Div8,
        Prescaler::Div16,
        Prescaler::Div64,
        Prescaler::Div256,
        Prescaler::Div1024,
    ];

    /// Clock divisor
    pub const fn divisor(self) -> u32 {
        match self {
            Prescaler::Div1 => 1,
            Prescaler::Div2 => 2,
            Prescaler::Div4 => 4,
            Prescaler::Div8 => 8,
            Prescaler::Div16 => 16,
            Prescaler::Div64 => 64,
            Prescaler::Div256 => 256,
            Prescaler::Div1024 => 1024,
        }
    }

    /// Value of the 3-bit prescaler register field
    pub const fn field(self) -> u8 {
        self as u8
    }

    /// Look up a prescaler by its divisor
    pub fn from_divisor(divisor: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.divisor() == divisor)
    }
}

/// Counter configuration for one strobe cycle
///
/// A period is `period_ticks` counter ticks long; the counter counts
/// `0..period_ticks` and then wraps. The short event fires when the count
/// equals `short_ticks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub struct CycleSettings {
    /// Frequency of the low-power counter clock in Hz
    pub clock_hz: u32,
    /// Prescaler applied to `clock_hz`
    pub prescaler: Prescaler,
    /// Ticks per full period
    pub period_ticks: u16,
    /// Tick at which the short event fires
    pub short_ticks: u16,
}

impl CycleSettings {
    /// 32 kHz clock divided by 1024: 32 ticks per second, 4 s period,
    /// short event one tick after rollover.
    pub const REFERENCE: Self = Self {
        clock_hz: 32_768,
        prescaler: Prescaler::Div1024,
        period_ticks: 128,
        short_ticks: 1,
    };

    /// Counter tick rate in Hz (truncated)
    pub const fn tick_hz(&self) -> u32 {
        self.clock_hz / self.prescaler.divisor()
    }

    /// Counter top value (the period register)
    pub const fn top(&self) -> u16 {
        self.period_ticks.saturating_sub(1)
    }

    /// Full period in milliseconds
    pub const fn period_ms(&self) -> u32 {
        self.ticks_to_ms(self.period_ticks)
    }

    /// Time from rollover to the short event in milliseconds
    pub const fn short_ms(&self) -> u32 {
        self.ticks_to_ms(self.short_ticks)
    }

    const fn ticks_to_ms(&self, ticks: u16) -> u32 {
        if self.clock_hz == 0 {
            return 0;
        }
        let ms = ticks as u64 * self.prescaler.divisor() as u64 * 1000 / self.clock_hz as u64;
        ms as u32
    }
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Free-running counter with a short compare event and a rollover event
///
/// Both events latch a flag in hardware and request the same interrupt.
/// There is no software state: which half of the cycle the system is in is
/// determined entirely by the counter.
pub trait CycleTimer {
    /// Reset the counter to zero, clear both flags, apply `settings`,
    /// unmask both events and start counting
    fn arm(&mut self, settings: &CycleSettings);

    /// Check whether the flag for `event` is set
    fn is_pending(&self, event: CycleEvent) -> bool;

    /// Clear the flag for `event` so the interrupt does not re-fire
    fn acknowledge(&mut self, event: CycleEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_cycle() {
        let s = CycleSettings::REFERENCE;
        assert_eq!(s.tick_hz(), 32);
        assert_eq!(s.period_ms(), 4000);
        assert_eq!(s.short_ms(), 31);
        assert_eq!(s.top(), 127);
    }

    #[test]
    fn test_prescaler_fields() {
        for (i, p) in Prescaler::ALL.iter().enumerate() {
            assert_eq!(p.field() as usize, i);
            assert_eq!(Prescaler::from_divisor(p.divisor()), Some(*p));
        }
        assert_eq!(Prescaler::from_divisor(32), None);
        assert_eq!(Prescaler::from_divisor(0), None);
    }

    #[test]
    fn test_zero_clock_does_not_divide_by_zero() {
        let s = CycleSettings {
            clock_hz: 0,
            ..CycleSettings::REFERENCE
        };
        assert_eq!(s.period_ms(), 0);
    }
}
