use imageproc::image::Rgba;
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// An 8-bit RGBA color
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Color { a, ..self }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// `#rrggbb` for opaque colors, `#rrggbbaa` otherwise
    pub fn to_hex(&self) -> String {
        if self.is_opaque() {
            self.to_rgb_hex()
        } else {
            format!("{}{:02x}", self.to_rgb_hex(), self.a)
        }
    }

    /// `#rrggbb`, alpha dropped
    pub fn to_rgb_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// CSS `rgba(...)` with alpha as a 0-1 fraction
    pub fn to_css(&self) -> String {
        let alpha = self.a as f64 / 255.0;
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
    }

    /// Parse a hex string of the form `#RRGGBB` or `#RRGGBBAA`
    pub fn from_hex(s: &str) -> Result<Self, ParseColorError> {
        let err = || ParseColorError(s.to_string());

        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return Err(err());
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());

        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Color::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }

    /// Parse a CSS `rgb(r, g, b)` or `rgba(r, g, b, a)` string, `a` in 0-1
    pub fn from_css(s: &str) -> Result<Self, ParseColorError> {
        let err = || ParseColorError(s.to_string());

        let trimmed = s.trim();
        let args = trimmed
            .strip_prefix("rgba(")
            .or_else(|| trimmed.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(err)?;

        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return Err(err());
        }

        let channel = |part: &str| part.parse::<u8>().map_err(|_| err());

        let a = match parts.get(3) {
            Some(alpha) => {
                let alpha: f64 = alpha.parse().map_err(|_| err())?;
                if !alpha.is_finite() {
                    return Err(err());
                }
                (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
            }
            None => 255,
        };

        Ok(Color::rgba(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
            a,
        ))
    }

    /// Lenient parse: anything unrecognised becomes opaque black
    pub fn parse_or_black(s: &str) -> Self {
        s.parse().unwrap_or(Color::BLACK)
    }

    /// Perceived brightness below the midpoint
    pub fn is_dark(&self) -> bool {
        let brightness =
            (self.r as u32 * 299 + self.g as u32 * 587 + self.b as u32 * 114) as f64 / 1000.0;
        brightness < 128.0
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim_start().starts_with('#') {
            Color::from_hex(s)
        } else {
            Color::from_css(s)
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<Rgba<u8>> for Color {
    fn from(Rgba([r, g, b, a]): Rgba<u8>) -> Self {
        Color { r, g, b, a }
    }
}

impl From<Color> for Rgba<u8> {
    fn from(c: Color) -> Self {
        Rgba([c.r, c.g, c.b, c.a])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Invalid color: ")?;
        f.write_str(&self.0)
    }
}

impl std::error::Error for ParseColorError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_with_and_without_alpha() {
        assert_eq!(Color::from_hex("#3b82f6"), Ok(Color::rgb(0x3b, 0x82, 0xf6)));
        assert_eq!(
            Color::from_hex("#FF000080"),
            Ok(Color::rgba(255, 0, 0, 0x80))
        );
        assert_eq!(Color::rgb(16, 185, 129).to_hex(), "#10b981");
        assert_eq!(Color::rgba(16, 185, 129, 1).to_hex(), "#10b98101");
        assert!(Color::from_hex("3b82f6").is_err());
        assert!(Color::from_hex("#3b82f").is_err());
        assert!(Color::from_hex("#zz82f6").is_err());
    }

    #[test]
    fn css_alpha_is_a_fraction() {
        let shadow: Color = "rgba(0, 0, 0, 0.3)".parse().unwrap();
        assert_eq!(shadow, Color::rgba(0, 0, 0, 77));

        assert_eq!(Color::rgba(1, 2, 3, 51).to_css(), "rgba(1, 2, 3, 0.2)");
        assert_eq!(Color::rgb(1, 2, 3).to_css(), "rgba(1, 2, 3, 1)");
        assert_eq!("rgb(1,2,3)".parse::<Color>(), Ok(Color::rgb(1, 2, 3)));
        assert!("rgba(256, 0, 0, 1)".parse::<Color>().is_err());
    }

    #[test]
    fn unknown_strings_fall_back_to_black() {
        assert_eq!(Color::parse_or_black("cornflowerblue"), Color::BLACK);
        assert_eq!(Color::parse_or_black("#ffffff"), Color::rgb(255, 255, 255));
    }

    #[test]
    fn darkness() {
        assert!(Color::from_hex("#1e293b").unwrap().is_dark());
        assert!(!Color::from_hex("#f59e0b").unwrap().is_dark());
    }

    #[test]
    fn serializes_as_hex() {
        let json = serde_json::to_string(&Color::rgba(0, 0, 0, 77)).unwrap();
        assert_eq!(json, "\"#0000004d\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::rgba(0, 0, 0, 77));
        let css: Color = serde_json::from_str("\"rgba(255, 0, 0, 1)\"").unwrap();
        assert_eq!(css, Color::rgb(255, 0, 0));
    }
}
