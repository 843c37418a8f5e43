//! Task color parsing.
//!
//! Stored colors are free-form strings; anything that does not parse falls back
//! to a neutral gray instead of failing.

use anyhow::{bail, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Neutral gray used when a stored color cannot be parsed.
    pub const FALLBACK: Rgba = Rgba::rgb(128, 128, 128);

    /// Base color of idle timeline blocks.
    pub const IDLE: Rgba = Rgba::rgb(200, 200, 200);

    /// Parse `#RGB`, `#ARGB`, `#RRGGBB` or `#AARRGGBB`.
    pub fn parse_hex(value: &str) -> Result<Self> {
        let Some(digits) = value.trim().strip_prefix('#') else {
            bail!("Invalid color format '{value}'. Must be hex (#RRGGBB)");
        };
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            bail!("Invalid color format '{value}'. Must be hex (#RRGGBB)");
        }

        let nibble = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).map(|n| n * 17);
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);

        let color = match digits.len() {
            3 => Rgba { r: nibble(0)?, g: nibble(1)?, b: nibble(2)?, a: 255 },
            4 => Rgba { a: nibble(0)?, r: nibble(1)?, g: nibble(2)?, b: nibble(3)? },
            6 => Rgba { r: byte(0)?, g: byte(2)?, b: byte(4)?, a: 255 },
            8 => Rgba { a: byte(0)?, r: byte(2)?, g: byte(4)?, b: byte(6)? },
            _ => bail!("Invalid color format '{value}'. Must be hex (#RRGGBB)"),
        };
        Ok(color)
    }

    pub fn from_hex_or_fallback(value: &str) -> Self {
        Self::parse_hex(value).unwrap_or_else(|err| {
            log::debug!("{err}; using fallback color");
            Self::FALLBACK
        })
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.a, self.r, self.g, self.b)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_six_digit_hex() {
        assert_eq!(Rgba::parse_hex("#FD5A70").unwrap(), Rgba::rgb(0xFD, 0x5A, 0x70));
    }

    #[test]
    fn parses_short_and_alpha_forms() {
        assert_eq!(Rgba::parse_hex("#0f8").unwrap(), Rgba::rgb(0x00, 0xFF, 0x88));
        assert_eq!(
            Rgba::parse_hex("#80FF0000").unwrap(),
            Rgba { r: 0xFF, g: 0, b: 0, a: 0x80 }
        );
    }

    #[test]
    fn malformed_colors_fall_back_to_gray() {
        assert_eq!(Rgba::from_hex_or_fallback("red"), Rgba::FALLBACK);
        assert_eq!(Rgba::from_hex_or_fallback("#12345"), Rgba::FALLBACK);
        assert_eq!(Rgba::from_hex_or_fallback("#GGGGGG"), Rgba::FALLBACK);
        assert_eq!(Rgba::from_hex_or_fallback(""), Rgba::FALLBACK);
    }

    #[test]
    fn hex_output_is_uppercase() {
        assert_eq!(Rgba::rgb(0x05, 0x80, 0xb0).to_hex(), "#0580B0");
    }
}
