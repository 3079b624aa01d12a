//! RGBA colors with hex and CSS string conversion

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Color parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("invalid hex color '{0}'")]
    InvalidHex(String),

    #[error("invalid css color '{0}'")]
    InvalidCss(String),
}

/// An RGBA color, each channel in [0, 255]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);

    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 255,
        }
    }

    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Same color with a different alpha
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self { alpha, ..self }
    }

    /// Same color with the rgb channels replaced, alpha kept
    pub const fn with_rgb(self, red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: self.alpha,
        }
    }

    /// Multiply alpha by `factor` (clamped to [0, 1])
    pub fn scale_alpha(self, factor: f32) -> Self {
        let factor = if factor.is_nan() { 0.0 } else { factor.clamp(0.0, 1.0) };
        self.with_alpha((self.alpha as f32 * factor).round() as u8)
    }

    /// Alpha as a [0, 1] opacity
    pub fn opacity(&self) -> f32 {
        self.alpha as f32 / 255.0
    }

    /// `#rrggbb`, or `#rrggbbaa` when not fully opaque
    pub fn to_hex(&self) -> String {
        if self.alpha == 255 {
            format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                self.red, self.green, self.blue, self.alpha
            )
        }
    }

    /// Parse `rrggbb` or `rrggbbaa`, with an optional leading `#`
    pub fn parse_hex(value: &str) -> Result<Self, ColorError> {
        let invalid = || ColorError::InvalidHex(value.to_string());
        let digits = value.strip_prefix('#').unwrap_or(value);
        if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
            return Err(invalid());
        }

        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        let alpha = if digits.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, alpha))
    }

    /// CSS `rgb(r, g, b)` or `rgba(r, g, b, a)` with `a` as a [0, 1] opacity
    pub fn to_css(&self) -> String {
        if self.alpha == 255 {
            format!("rgb({}, {}, {})", self.red, self.green, self.blue)
        } else {
            let opacity = (self.opacity() * 1000.0).round() / 1000.0;
            format!(
                "rgba({}, {}, {}, {})",
                self.red, self.green, self.blue, opacity
            )
        }
    }

    /// Parse CSS `rgb(...)` / `rgba(...)`
    pub fn parse_css(value: &str) -> Result<Self, ColorError> {
        let invalid = || ColorError::InvalidCss(value.to_string());
        let trimmed = value.trim();
        let (body, has_alpha) = if let Some(rest) = trimmed.strip_prefix("rgba(") {
            (rest, true)
        } else if let Some(rest) = trimmed.strip_prefix("rgb(") {
            (rest, false)
        } else {
            return Err(invalid());
        };
        let body = body.strip_suffix(')').ok_or_else(invalid)?;

        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != if has_alpha { 4 } else { 3 } {
            return Err(invalid());
        }
        let channel = |s: &str| s.parse::<u8>().map_err(|_| invalid());
        let alpha = if has_alpha {
            let opacity: f32 = parts[3].parse().map_err(|_| invalid())?;
            if !(0.0..=1.0).contains(&opacity) {
                return Err(invalid());
            }
            (opacity * 255.0).round() as u8
        } else {
            255
        };

        Ok(Self::rgba(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
            alpha,
        ))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim_start().starts_with("rgb") {
            Self::parse_css(s)
        } else {
            Self::parse_hex(s)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hex_omits_alpha_when_opaque() {
        assert_eq!(Color::rgb(255, 0, 16).to_hex(), "#ff0010");
        assert_eq!(Color::rgba(255, 0, 16, 128).to_hex(), "#ff001080");
    }

    #[test]
    fn test_parse_hex_without_hash() {
        assert_eq!(Color::parse_hex("0a0b0c").unwrap(), Color::rgb(10, 11, 12));
        assert_eq!(
            Color::parse_hex("#0a0b0c0d").unwrap(),
            Color::rgba(10, 11, 12, 13)
        );
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(Color::parse_hex("#12345").is_err());
        assert!(Color::parse_hex("#zzzzzz").is_err());
        assert!(Color::parse_hex("").is_err());
    }

    #[test]
    fn test_css_round_trip() {
        assert_eq!(Color::WHITE.to_css(), "rgb(255, 255, 255)");
        let translucent = Color::rgba(1, 2, 3, 0);
        assert_eq!(translucent.to_css(), "rgba(1, 2, 3, 0)");
        assert_eq!(Color::parse_css(&translucent.to_css()).unwrap(), translucent);
        assert_eq!("rgb(4, 5, 6)".parse::<Color>().unwrap(), Color::rgb(4, 5, 6));
        assert!(Color::parse_css("rgb(1, 2)").is_err());
    }

    #[test]
    fn test_scale_alpha() {
        assert_eq!(Color::WHITE.scale_alpha(0.5).alpha, 128);
        assert_eq!(Color::WHITE.scale_alpha(-3.0).alpha, 0);
        assert_eq!(Color::WHITE.scale_alpha(7.0).alpha, 255);
    }

    proptest! {
        #[test]
        fn prop_hex_round_trip_opaque(r: u8, g: u8, b: u8) {
            let color = Color::rgb(r, g, b);
            prop_assert_eq!(Color::parse_hex(&color.to_hex()).unwrap(), color);
        }

        #[test]
        fn prop_hex_round_trip_translucent(r: u8, g: u8, b: u8, a in 0u8..255) {
            let color = Color::rgba(r, g, b, a);
            prop_assert_eq!(Color::parse_hex(&color.to_hex()).unwrap(), color);
        }
    }
}
