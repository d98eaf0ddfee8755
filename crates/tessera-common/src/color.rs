//! RGB color values used for biome backgrounds and object tints.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error parsing a `#rrggbb` color string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid color '{0}', expected #rrggbb")]
pub struct ParseColorError(pub String);

/// 8-bit RGB color.
///
/// Serialized as a `"#rrggbb"` string so data tables stay readable.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Pure black.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// Pure white.
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Creates a new color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linearly interpolates towards `other` by `t` (0.0 = self, 1.0 = other).
    ///
    /// Each channel is computed in `f32` and rounded to the nearest integer.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 {
            let a = f32::from(a);
            let b = f32::from(b);
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        };
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }

    /// Returns the channels as an array.
    #[must_use]
    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Parses a `#rrggbb` (or `rrggbb`) hex string.
    pub fn from_hex(s: &str) -> Result<Self, ParseColorError> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(ParseColorError(s.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| ParseColorError(s.to_string()))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Formats as `#rrggbb`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl std::str::FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let c = Rgb::from_hex("#4a7f2c").expect("valid hex");
        assert_eq!(c, Rgb::new(0x4a, 0x7f, 0x2c));
        assert_eq!(c.to_hex(), "#4a7f2c");
        assert_eq!(Rgb::from_hex("FFFFFF"), Ok(Rgb::WHITE));
    }

    #[test]
    fn test_hex_rejects_garbage() {
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("#zz0000").is_err());
        assert!(Rgb::from_hex("#ééé").is_err());
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Rgb::new(10, 20, 30);
        let b = Rgb::new(110, 220, 30);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Rgb::new(60, 120, 30));
    }

    #[test]
    fn test_lerp_small_factor_rounds() {
        // 0 + 100 * 0.12 = 12
        assert_eq!(Rgb::BLACK.lerp(Rgb::new(100, 100, 100), 0.12), Rgb::new(12, 12, 12));
        // 200 + (0 - 200) * 0.12 = 176
        assert_eq!(Rgb::new(200, 0, 0).lerp(Rgb::BLACK, 0.12), Rgb::new(176, 0, 0));
    }

    proptest::proptest! {
        #[test]
        fn prop_lerp_stays_between(
            a in proptest::array::uniform3(0u8..=255),
            b in proptest::array::uniform3(0u8..=255),
            t in 0.0f32..=1.0,
        ) {
            let out = Rgb::from(a).lerp(Rgb::from(b), t).to_array();
            for i in 0..3 {
                let lo = a[i].min(b[i]);
                let hi = a[i].max(b[i]);
                proptest::prop_assert!(out[i] >= lo && out[i] <= hi);
            }
        }
    }
}
