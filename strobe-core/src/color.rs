//! Packed 24-bit colors
//!
//! The LED takes its three channels green first, then red, then blue, each
//! most-significant bit first. [`Grb`] stores them in exactly that order in
//! the low 24 bits of a word, so transmitting a color is a walk from bit 23
//! down to bit 0.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mask of the bits that carry color
pub const COLOR_MASK: u32 = 0x00FF_FFFF;

/// Number of bits sent per color
pub const COLOR_BITS: u32 = 24;

/// A 24-bit GRB color value
///
/// Every bit pattern is a legal color. Values are never corrected or scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "u32", into = "u32"))]
pub struct Grb(u32);

impl Grb {
    /// All channels off
    pub const BLACK: Self = Self(0);

    /// All channels at full brightness
    pub const WHITE: Self = Self(COLOR_MASK);

    /// Build a color from its channels
    #[inline]
    pub const fn new(green: u8, red: u8, blue: u8) -> Self {
        Self((green as u32) << 16 | (red as u32) << 8 | blue as u32)
    }

    /// Build a color from a packed word, ignoring the top 8 bits
    #[inline]
    pub const fn from_u32(packed: u32) -> Self {
        Self(packed & COLOR_MASK)
    }

    /// Packed word, top 8 bits clear
    #[inline(always)]
    pub const fn into_u32(self) -> u32 {
        self.0
    }

    /// Green channel
    #[inline]
    pub const fn green(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Red channel
    #[inline]
    pub const fn red(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Blue channel
    #[inline]
    pub const fn blue(self) -> u8 {
        self.0 as u8
    }
}

impl From<u32> for Grb {
    fn from(packed: u32) -> Self {
        Self::from_u32(packed)
    }
}

impl From<Grb> for u32 {
    fn from(color: Grb) -> Self {
        color.into_u32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_order() {
        let c = Grb::new(0x12, 0x34, 0x56);
        assert_eq!(c.into_u32(), 0x12_34_56);
        assert_eq!(c.green(), 0x12);
        assert_eq!(c.red(), 0x34);
        assert_eq!(c.blue(), 0x56);
    }

    #[test]
    fn test_top_byte_ignored() {
        assert_eq!(Grb::from_u32(0xAB00_FF00), Grb::new(0x00, 0xFF, 0x00));
        assert_eq!(Grb::from(0xFFFF_FFFF), Grb::WHITE);
    }

    #[test]
    fn test_constants() {
        assert_eq!(Grb::BLACK.into_u32(), 0);
        assert_eq!(Grb::WHITE, Grb::new(0xFF, 0xFF, 0xFF));
        assert_eq!(Grb::default(), Grb::BLACK);
    }
}
