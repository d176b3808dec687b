//! Color representation

use std::fmt;

use crate::error::{Error, Result};

/// Color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Automatic/default color
    #[default]
    Auto,

    /// RGB color (no alpha)
    Rgb { r: u8, g: u8, b: u8 },

    /// ARGB color with alpha channel
    Argb { a: u8, r: u8, g: u8, b: u8 },

    /// Theme color, kept as-is from loaded documents
    Theme {
        /// Theme color index (0-9)
        index: u8,
        /// Tint value as a percentage (-100 to 100)
        tint: i8,
    },

    /// Indexed color (legacy Excel palette)
    Indexed(u8),
}

impl Color {
    /// Black
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    /// Create an RGB color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb { r, g, b }
    }

    /// Create from a hex string (e.g., "#FF0000", "FF0000" or "80FF0000")
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }

        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Color::Rgb { r, g, b })
            }
            8 => {
                let a = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let r = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let g = u8::from_str_radix(&hex[4..6], 16).ok()?;
                let b = u8::from_str_radix(&hex[6..8], 16).ok()?;
                Some(Color::Argb { a, r, g, b })
            }
            _ => None,
        }
    }

    /// Like [`Color::from_hex`] but reports the offending input
    pub fn parse_hex(hex: &str) -> Result<Self> {
        Self::from_hex(hex).ok_or_else(|| Error::InvalidColor(hex.to_string()))
    }

    /// RGB hex string without prefix, if this is an explicit color
    pub fn to_hex(&self) -> Option<String> {
        match self {
            Color::Rgb { r, g, b } | Color::Argb { r, g, b, .. } => {
                Some(format!("{:02X}{:02X}{:02X}", r, g, b))
            }
            _ => None,
        }
    }

    /// Check if color is automatic/default
    pub fn is_auto(&self) -> bool {
        matches!(self, Color::Auto)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Auto => write!(f, "auto"),
            Color::Rgb { r, g, b } => write!(f, "#{:02X}{:02X}{:02X}", r, g, b),
            Color::Argb { a, r, g, b } => write!(f, "#{:02X}{:02X}{:02X}{:02X}", a, r, g, b),
            Color::Theme { index, tint } => write!(f, "theme({}, {})", index, tint),
            Color::Indexed(i) => write!(f, "indexed({})", i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Color::from_hex("#E6E6FA"), Some(Color::rgb(0xE6, 0xE6, 0xFA)));
        assert_eq!(Color::from_hex("000000"), Some(Color::BLACK));
        assert_eq!(
            Color::from_hex("80FF0000"),
            Some(Color::Argb {
                a: 0x80,
                r: 0xFF,
                g: 0,
                b: 0
            })
        );
        assert_eq!(Color::from_hex("GG0000"), None);
        assert_eq!(Color::from_hex("FFF"), None);
        assert_eq!(Color::from_hex("ÉÉÉ"), None);
    }

    #[test]
    fn test_parse_hex_error() {
        assert!(matches!(Color::parse_hex("red"), Err(Error::InvalidColor(_))));
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(Color::rgb(1, 2, 255).to_hex().as_deref(), Some("0102FF"));
        assert_eq!(Color::Auto.to_hex(), None);
    }
}
