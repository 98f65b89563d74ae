//! Waveform capture and decoding
//!
//! Plays the part of a logic analyzer for host-side checks: takes the pin
//! edges seen during one transmission, rebuilds the high/low pulse pairs
//! and classifies each against the protocol bands. A waveform that decodes
//! is one a compliant receiver would accept.

use heapless::Vec;

use crate::color::{Grb, COLOR_BITS};
use crate::timing::{ONE_HIGH, ONE_LOW, ZERO_HIGH, ZERO_LOW};

/// Edges in one well-formed color
pub const EDGES_PER_COLOR: usize = 2 * COLOR_BITS as usize;

/// A pin transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Edge {
    /// Level after the transition
    pub level: bool,
    /// Time of the transition in picoseconds
    pub at_ps: u64,
}

/// One bit on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pulse {
    pub high_ps: u64,
    pub low_ps: u64,
}

/// Reasons a capture cannot be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaveformError {
    /// Not exactly one rising and one falling edge per bit
    WrongEdgeCount(usize),
    /// Edge at this index does not alternate with its predecessor
    NotAlternating(usize),
    /// The line was not low when the transmission ended
    EndedHigh,
    /// High phase fits neither the 0 nor the 1 band
    HighOutOfBand { bit: u8, ns: u32 },
    /// Low phase is outside the band for the bit its high phase selected
    LowOutOfBand { bit: u8, ns: u32 },
}

/// The 24 pulses of one transmission, first bit on the wire first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulseTrain {
    pulses: Vec<Pulse, { COLOR_BITS as usize }>,
}

impl PulseTrain {
    /// Rebuild pulses from recorded edges
    ///
    /// `end_ps` is the time the transmitter returned; it closes the low
    /// phase of the last bit.
    pub fn capture(edges: &[Edge], end_ps: u64) -> Result<Self, WaveformError> {
        if let Some(last) = edges.last() {
            if last.level {
                return Err(WaveformError::EndedHigh);
            }
        }
        if edges.len() != EDGES_PER_COLOR {
            return Err(WaveformError::WrongEdgeCount(edges.len()));
        }
        if let Some(i) = edges
            .iter()
            .enumerate()
            .position(|(i, e)| e.level != (i % 2 == 0))
        {
            return Err(WaveformError::NotAlternating(i));
        }

        let mut pulses = Vec::new();
        for (i, pair) in edges.chunks_exact(2).enumerate() {
            let (rise, fall) = (pair[0], pair[1]);
            let next_rise = edges.get(2 * i + 2).map_or(end_ps, |e| e.at_ps);
            let pulse = Pulse {
                high_ps: fall.at_ps.saturating_sub(rise.at_ps),
                low_ps: next_rise.saturating_sub(fall.at_ps),
            };
            // Capacity equals the number of pairs checked above
            let _ = pulses.push(pulse);
        }

        Ok(Self { pulses })
    }

    /// Pulses in wire order
    pub fn pulses(&self) -> &[Pulse] {
        &self.pulses
    }

    /// Classify every pulse and reassemble the color
    pub fn decode(&self) -> Result<Grb, WaveformError> {
        let mut packed = 0u32;
        for (i, pulse) in self.pulses.iter().enumerate() {
            let bit = (COLOR_BITS as usize - 1 - i) as u8;
            let value = classify(pulse, bit)?;
            packed = packed << 1 | value as u32;
        }
        Ok(Grb::from_u32(packed))
    }
}

fn classify(pulse: &Pulse, bit: u8) -> Result<bool, WaveformError> {
    let (value, low_band) = if ONE_HIGH.contains_ps(pulse.high_ps) {
        (true, ONE_LOW)
    } else if ZERO_HIGH.contains_ps(pulse.high_ps) {
        (false, ZERO_LOW)
    } else {
        return Err(WaveformError::HighOutOfBand {
            bit,
            ns: to_ns(pulse.high_ps),
        });
    };

    if !low_band.contains_ps(pulse.low_ps) {
        return Err(WaveformError::LowOutOfBand {
            bit,
            ns: to_ns(pulse.low_ps),
        });
    }
    Ok(value)
}

fn to_ns(ps: u64) -> u32 {
    (ps / 1000).min(u32::MAX as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build edges for `bits` with the given (high, low) durations in ns
    fn edges(bits: &[(u64, u64)]) -> (std::vec::Vec<Edge>, u64) {
        let mut out = std::vec::Vec::new();
        let mut t = 0;
        for &(high, low) in bits {
            out.push(Edge { level: true, at_ps: t });
            t += high * 1000;
            out.push(Edge { level: false, at_ps: t });
            t += low * 1000;
        }
        (out, t)
    }

    #[test]
    fn test_decode_datasheet_nominals() {
        let mut bits = [(350, 800); 24];
        bits[0] = (700, 600);
        bits[23] = (700, 600);
        let (e, end) = edges(&bits);
        let train = PulseTrain::capture(&e, end).unwrap();
        assert_eq!(train.decode(), Ok(Grb::from_u32(0x80_00_01)));
    }

    #[test]
    fn test_wrong_edge_count() {
        let (e, end) = edges(&[(350, 800); 23]);
        assert_eq!(
            PulseTrain::capture(&e, end),
            Err(WaveformError::WrongEdgeCount(46))
        );
    }

    #[test]
    fn test_ended_high() {
        let (mut e, end) = edges(&[(350, 800); 24]);
        e.push(Edge { level: true, at_ps: end });
        assert_eq!(PulseTrain::capture(&e, end), Err(WaveformError::EndedHigh));
    }

    #[test]
    fn test_not_alternating() {
        let (mut e, end) = edges(&[(350, 800); 24]);
        e[2].level = false;
        assert_eq!(
            PulseTrain::capture(&e, end),
            Err(WaveformError::NotAlternating(2))
        );
    }

    #[test]
    fn test_high_between_bands() {
        let mut bits = [(350, 800); 24];
        bits[5] = (520, 800);
        let (e, end) = edges(&bits);
        let train = PulseTrain::capture(&e, end).unwrap();
        assert_eq!(
            train.decode(),
            Err(WaveformError::HighOutOfBand { bit: 18, ns: 520 })
        );
    }

    #[test]
    fn test_low_out_of_band() {
        let mut bits = [(350, 800); 24];
        bits[23] = (700, 900);
        let (e, end) = edges(&bits);
        let train = PulseTrain::capture(&e, end).unwrap();
        assert_eq!(
            train.decode(),
            Err(WaveformError::LowOutOfBand { bit: 0, ns: 900 })
        );
    }
}
