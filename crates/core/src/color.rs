//! Fog tints and translucent colors.
//!
//! The engine only ever paints shades of one fog tint at varying alpha, so
//! there is no color-space machinery here: [`Srgb`] is an opaque tint that
//! round-trips through `"#rrggbb"` in configs, and [`Rgba`] is a
//! straight-alpha color as handed to a surface.

use crate::error::EngineError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// sRGB tint with components in [0, 1].
///
/// Serializes as a hex string. The round trip is 8-bit quantized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Srgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Straight (non-premultiplied) RGBA color with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Srgb {
    /// Builds a tint from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: f64::from(r) / 255.0,
            g: f64::from(g) / 255.0,
            b: f64::from(b) / 255.0,
        }
    }

    /// Parses `"#rrggbb"` or `"rrggbb"`, case insensitive.
    pub fn from_hex(hex: &str) -> Result<Srgb, EngineError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(EngineError::InvalidColor(format!(
                "expected 6 hex digits, got '{hex}'"
            )));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|e| EngineError::InvalidColor(format!("'{hex}': {e}")))
        };
        Ok(Srgb::from_rgb8(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Quantizes to 8-bit channels, clamping out-of-range components.
    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// This tint at the given alpha, clamped to [0, 1].
    pub fn with_alpha(self, a: f64) -> Rgba {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a: a.clamp(0.0, 1.0),
        }
    }

    /// Linear blend: `t = 0` gives `self`, `t = 1` gives `other`.
    pub fn mix(self, other: Srgb, t: f64) -> Srgb {
        let t = t.clamp(0.0, 1.0);
        Srgb {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    /// CSS `rgba(r, g, b, a)` with 8-bit channels, for canvas fill styles.
    pub fn to_css(self) -> String {
        let [r, g, b] = Srgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
        .to_rgb8();
        format!("rgba({r}, {g}, {b}, {:.4})", self.a.clamp(0.0, 1.0))
    }
}

impl Serialize for Srgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Srgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Srgb::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hex_accepts_with_and_without_hash() {
        let a = Srgb::from_hex("#d2dae6").unwrap();
        let b = Srgb::from_hex("D2DAE6").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_rgb8(), [210, 218, 230]);
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(Srgb::from_hex("#fff").is_err());
        assert!(Srgb::from_hex("#gg0000").is_err());
        assert!(Srgb::from_hex("#ééé").is_err());
    }

    #[test]
    fn to_hex_clamps() {
        let c = Srgb {
            r: 1.4,
            g: -0.2,
            b: 0.5,
        };
        assert_eq!(c.to_hex(), "#ff0080");
    }

    #[test]
    fn with_alpha_clamps_alpha() {
        let tint = Srgb::from_rgb8(200, 210, 225);
        assert_eq!(tint.with_alpha(1.7).a, 1.0);
        assert_eq!(tint.with_alpha(-0.1).a, 0.0);
    }

    #[test]
    fn mix_endpoints() {
        let low = Srgb::from_rgb8(0, 0, 0);
        let high = Srgb::from_rgb8(255, 255, 255);
        assert_eq!(low.mix(high, 0.0), low);
        assert_eq!(low.mix(high, 1.0), high);
        assert!((low.mix(high, 0.5).g - 0.5).abs() < 1e-12);
    }

    #[test]
    fn css_string_uses_8_bit_channels() {
        let css = Srgb::from_rgb8(190, 200, 220).with_alpha(0.25).to_css();
        assert_eq!(css, "rgba(190, 200, 220, 0.2500)");
    }

    #[test]
    fn serde_uses_hex_strings() {
        let tint = Srgb::from_rgb8(138, 148, 166);
        let json = serde_json::to_string(&tint).unwrap();
        assert_eq!(json, "\"#8a94a6\"");
        let back: Srgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tint);
        assert!(serde_json::from_str::<Srgb>("\"nope\"").is_err());
    }
}
