use std::str::FromStr;

use palette::{FromColor, Hsl, Srgb};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors produced when parsing a color literal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("invalid hex color `{input}`: expected 6 hex digits, got {len}")]
    Length { input: String, len: usize },

    #[error("invalid hex color `{0}`: non-hex digit")]
    Digit(String),
}

/// Core color type used by palettes.
/// Wraps sRGB u8 components; the wire form is always `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Hue/saturation/lightness triple rounded for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HslTriple {
    /// Degrees in [0, 360).
    pub hue: u16,
    /// Percent.
    pub saturation: u8,
    /// Percent.
    pub lightness: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color string like `#ff8800` or `#FF8800`.
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 {
            return Err(ColorError::Length {
                input: hex.to_string(),
                len: digits.len(),
            });
        }
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorError::Digit(hex.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| ColorError::Digit(hex.to_string()))
        };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    /// Serialize to lowercase hex `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Uppercase `#RRGGBB`, the form shown to users.
    pub fn to_hex_upper(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Convert to `palette::Srgb<u8>`.
    pub fn to_srgb_u8(self) -> Srgb<u8> {
        Srgb::new(self.r, self.g, self.b)
    }

    /// Convert to HSL for human-readable export annotations.
    pub fn to_hsl(self) -> HslTriple {
        let srgb: Srgb<f32> = self.to_srgb_u8().into_format();
        let hsl: Hsl = Hsl::from_color(srgb);
        let hue = hsl.hue.into_positive_degrees().round() as u16 % 360;
        HslTriple {
            hue,
            saturation: (hsl.saturation.clamp(0.0, 1.0) * 100.0).round() as u8,
            lightness: (hsl.lightness.clamp(0.0, 1.0) * 100.0).round() as u8,
        }
    }

    /// WCAG 2.0 relative luminance.
    ///
    /// Linearizes each sRGB channel, then computes the weighted sum.
    pub fn relative_luminance(self) -> f32 {
        fn linearize(c: u8) -> f32 {
            let c = c as f32 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * linearize(self.r) + 0.7152 * linearize(self.g) + 0.0722 * linearize(self.b)
    }

    /// WCAG 2.0 contrast ratio between two colors.
    ///
    /// Returns a value in [1, 21]. Higher means more contrast.
    pub fn contrast_ratio(c1: &Color, c2: &Color) -> f32 {
        let l1 = c1.relative_luminance();
        let l2 = c2.relative_luminance();
        let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };
        (lighter + 0.05) / (darker + 0.05)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::from_hex(s)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Color::from_hex(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let original = Color::from_hex("#ff8800").unwrap();
        assert_eq!(original.r, 255);
        assert_eq!(original.g, 136);
        assert_eq!(original.b, 0);
        assert_eq!(original.to_hex(), "#ff8800");
    }

    #[test]
    fn hex_uppercase_input() {
        let color = Color::from_hex("#3B82F6").unwrap();
        assert_eq!(color.to_hex(), "#3b82f6");
        assert_eq!(color.to_hex_upper(), "#3B82F6");
    }

    #[test]
    fn hex_without_hash() {
        let color = Color::from_hex("aabbcc").unwrap();
        assert_eq!(color.to_hex(), "#aabbcc");
    }

    #[test]
    fn hex_invalid_length() {
        assert_eq!(
            Color::from_hex("#fff"),
            Err(ColorError::Length {
                input: "#fff".into(),
                len: 3
            })
        );
    }

    #[test]
    fn hex_invalid_chars() {
        assert!(matches!(Color::from_hex("#gggggg"), Err(ColorError::Digit(_))));
        // A sign would slip through from_str_radix on its own.
        assert!(Color::from_hex("#+1+1+1").is_err());
    }

    #[test]
    fn serde_uses_hex_strings() {
        let color = Color::new(16, 185, 129);
        let json = serde_json::to_string(&color).unwrap();
        assert_eq!(json, "\"#10b981\"");
        let back: Color = serde_json::from_str("\"#10B981\"").unwrap();
        assert_eq!(back, color);
        assert!(serde_json::from_str::<Color>("\"teal\"").is_err());
    }

    #[test]
    fn hsl_of_primaries() {
        let red = Color::new(255, 0, 0).to_hsl();
        assert_eq!(red, HslTriple { hue: 0, saturation: 100, lightness: 50 });

        let blue = Color::from_hex("#3B82F6").unwrap().to_hsl();
        assert!((215..=219).contains(&blue.hue), "hue was {}", blue.hue);
        assert_eq!(Color::WHITE.to_hsl().lightness, 100);
    }

    #[test]
    fn contrast_ratio_black_white() {
        let ratio = Color::contrast_ratio(&Color::BLACK, &Color::WHITE);
        assert!(
            (ratio - 21.0).abs() < 0.1,
            "black/white contrast should be ~21:1, got {ratio}"
        );
    }

    #[test]
    fn contrast_ratio_same_color() {
        let gray = Color::new(128, 128, 128);
        let ratio = Color::contrast_ratio(&gray, &gray);
        assert!((ratio - 1.0).abs() < 0.001);
    }

    #[test]
    fn contrast_ratio_is_symmetric() {
        let a = Color::new(200, 50, 50);
        let b = Color::new(50, 200, 50);
        let ratio_ab = Color::contrast_ratio(&a, &b);
        let ratio_ba = Color::contrast_ratio(&b, &a);
        assert!((ratio_ab - ratio_ba).abs() < 0.001);
    }

    #[test]
    fn contrast_ratio_mid_gray_vs_black() {
        // sRGB(119,119,119) has relative luminance ~0.184
        let gray = Color::new(119, 119, 119);
        let ratio = Color::contrast_ratio(&gray, &Color::BLACK);
        assert!(
            ratio > 4.5 && ratio < 5.0,
            "mid-gray vs black should be ~4.7:1, got {ratio}"
        );
    }

    #[test]
    fn relative_luminance_bounds() {
        assert!(Color::BLACK.relative_luminance() < 0.001);
        assert!((Color::WHITE.relative_luminance() - 1.0).abs() < 0.001);
    }

    #[test]
    fn display_matches_to_hex() {
        let color = Color::new(171, 205, 239);
        assert_eq!(format!("{color}"), color.to_hex());
    }
}
