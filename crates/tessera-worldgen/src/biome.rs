//! Biome identifiers and elevation/moisture classification.
//!
//! The decision tree is ordered: earlier branches win. Thresholds are part of
//! the world format, so changing any of them changes every generated world.

use serde::{Deserialize, Serialize};

/// Terrain category of a cell.
///
/// Stored as a byte in chunk cell-type arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum BiomeId {
    /// Deep water.
    Ocean = 0,
    /// Sand along coasts.
    Beach = 1,
    /// Dry high peaks.
    Scorched = 2,
    /// Rocky high ground.
    Bare = 3,
    /// Cold high plains.
    Tundra = 4,
    /// Snow caps.
    Snow = 5,
    /// Mid-latitude woods.
    TemperateForest = 6,
    /// Wet highlands.
    Swamp = 7,
    /// Boreal forest.
    Taiga = 8,
    /// Dry mid-elevation plains.
    TemperateDesert = 9,
    /// Open grass.
    Grassland = 10,
    /// Very wet mid-elevation forest.
    TemperateRainForest = 11,
    /// Dry lowlands.
    SubtropicalDesert = 12,
    /// Lowland forest.
    TropicalForest = 13,
    /// Very wet lowland forest.
    TropicalRainForest = 14,
    /// Chunk outline used by the debug border mode.
    Border = 15,
    /// Placeholder for "no biome"; never produced by classification.
    None = 16,
}

impl BiomeId {
    /// Every biome the classifier can produce.
    pub const CLASSIFIABLE: [Self; 15] = [
        Self::Ocean,
        Self::Beach,
        Self::Scorched,
        Self::Bare,
        Self::Tundra,
        Self::Snow,
        Self::TemperateForest,
        Self::Swamp,
        Self::Taiga,
        Self::TemperateDesert,
        Self::Grassland,
        Self::TemperateRainForest,
        Self::SubtropicalDesert,
        Self::TropicalForest,
        Self::TropicalRainForest,
    ];

    /// Returns the byte stored in cell-type arrays.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Looks up a biome by its byte value.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0 => Self::Ocean,
            1 => Self::Beach,
            2 => Self::Scorched,
            3 => Self::Bare,
            4 => Self::Tundra,
            5 => Self::Snow,
            6 => Self::TemperateForest,
            7 => Self::Swamp,
            8 => Self::Taiga,
            9 => Self::TemperateDesert,
            10 => Self::Grassland,
            11 => Self::TemperateRainForest,
            12 => Self::SubtropicalDesert,
            13 => Self::TropicalForest,
            14 => Self::TropicalRainForest,
            15 => Self::Border,
            16 => Self::None,
            _ => return None,
        })
    }

    /// Returns the identifier as written in the biome table.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ocean => "Ocean",
            Self::Beach => "Beach",
            Self::Scorched => "Scorched",
            Self::Bare => "Bare",
            Self::Tundra => "Tundra",
            Self::Snow => "Snow",
            Self::TemperateForest => "TemperateForest",
            Self::Swamp => "Swamp",
            Self::Taiga => "Taiga",
            Self::TemperateDesert => "TemperateDesert",
            Self::Grassland => "Grassland",
            Self::TemperateRainForest => "TemperateRainForest",
            Self::SubtropicalDesert => "SubtropicalDesert",
            Self::TropicalForest => "TropicalForest",
            Self::TropicalRainForest => "TropicalRainForest",
            Self::Border => "Border",
            Self::None => "None",
        }
    }
}

impl std::fmt::Display for BiomeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Maps normalized elevation and moisture (both in `[0, 1]`) to a biome.
///
/// Total over its domain and never returns [`BiomeId::Border`] or
/// [`BiomeId::None`]. Out-of-range inputs fall into the nearest branch.
#[must_use]
pub fn classify(elevation: f64, moisture: f64) -> BiomeId {
    if elevation < 0.05 || (moisture > 0.95 && elevation < 0.2) {
        return BiomeId::Ocean;
    }
    if elevation < 0.2 {
        return BiomeId::Beach;
    }

    if elevation > 0.9 {
        return match moisture {
            m if m < 0.1 => BiomeId::Scorched,
            m if m < 0.25 => BiomeId::Bare,
            m if m < 0.6 => BiomeId::Tundra,
            _ => BiomeId::Snow,
        };
    }

    if elevation > 0.7 {
        return match moisture {
            m if m < 0.4 => BiomeId::TemperateForest,
            m if m < 0.75 => BiomeId::Swamp,
            _ => BiomeId::Taiga,
        };
    }

    if elevation > 0.4 {
        return match moisture {
            m if m < 0.2 => BiomeId::TemperateDesert,
            m if m < 0.55 => BiomeId::Grassland,
            m if m < 0.8 => BiomeId::TemperateForest,
            _ => BiomeId::TemperateRainForest,
        };
    }

    match moisture {
        m if m < 0.2 => BiomeId::SubtropicalDesert,
        m if m < 0.4 => BiomeId::Grassland,
        m if m < 0.7 => BiomeId::TropicalForest,
        _ => BiomeId::TropicalRainForest,
    }
}

/// Returns true if `(x, y)` lies on the outermost ring of a `width` × `height` chunk.
#[must_use]
pub const fn is_chunk_edge(x: u32, y: u32, width: u32, height: u32) -> bool {
    x == 0 || y == 0 || x + 1 == width || y + 1 == height
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_documented_examples() {
        assert_eq!(classify(0.02, 0.5), BiomeId::Ocean);
        assert_eq!(classify(0.5, 0.1), BiomeId::TemperateDesert);
        assert_eq!(classify(0.95, 0.05), BiomeId::Scorched);
    }

    #[test]
    fn test_wet_lowland_is_ocean() {
        assert_eq!(classify(0.15, 0.96), BiomeId::Ocean);
        assert_eq!(classify(0.15, 0.95), BiomeId::Beach);
        assert_eq!(classify(0.2, 0.99), BiomeId::TropicalRainForest);
    }

    #[test]
    fn test_band_boundaries() {
        // Boundaries are strict comparisons: 0.9 is not "above 0.9".
        assert_eq!(classify(0.9, 0.0), BiomeId::TemperateForest);
        assert_eq!(classify(0.91, 0.0), BiomeId::Scorched);
        assert_eq!(classify(0.7, 0.0), BiomeId::TemperateDesert);
        assert_eq!(classify(0.4, 0.0), BiomeId::SubtropicalDesert);
        assert_eq!(classify(0.2, 0.3), BiomeId::Grassland);
    }

    #[test]
    fn test_high_band() {
        assert_eq!(classify(0.95, 0.2), BiomeId::Bare);
        assert_eq!(classify(0.95, 0.5), BiomeId::Tundra);
        assert_eq!(classify(0.95, 0.6), BiomeId::Snow);
    }

    #[test]
    fn test_upper_mid_band() {
        assert_eq!(classify(0.8, 0.3), BiomeId::TemperateForest);
        assert_eq!(classify(0.8, 0.5), BiomeId::Swamp);
        assert_eq!(classify(0.8, 0.9), BiomeId::Taiga);
    }

    #[test]
    fn test_mid_and_low_bands() {
        assert_eq!(classify(0.5, 0.3), BiomeId::Grassland);
        assert_eq!(classify(0.5, 0.6), BiomeId::TemperateForest);
        assert_eq!(classify(0.5, 0.85), BiomeId::TemperateRainForest);
        assert_eq!(classify(0.3, 0.1), BiomeId::SubtropicalDesert);
        assert_eq!(classify(0.3, 0.5), BiomeId::TropicalForest);
        assert_eq!(classify(0.3, 0.75), BiomeId::TropicalRainForest);
    }

    #[test]
    fn test_byte_round_trip() {
        for byte in 0..=16u8 {
            let biome = BiomeId::from_byte(byte).expect("defined byte");
            assert_eq!(biome.as_byte(), byte);
        }
        assert_eq!(BiomeId::from_byte(17), None);
    }

    #[test]
    fn test_chunk_edge() {
        assert!(is_chunk_edge(0, 3, 8, 8));
        assert!(is_chunk_edge(7, 3, 8, 8));
        assert!(is_chunk_edge(3, 7, 8, 8));
        assert!(!is_chunk_edge(3, 3, 8, 8));
    }

    proptest! {
        #[test]
        fn prop_classification_is_total(e in 0.0f64..=1.0, m in 0.0f64..=1.0) {
            let biome = classify(e, m);
            prop_assert!(BiomeId::CLASSIFIABLE.contains(&biome));
        }
    }
}
