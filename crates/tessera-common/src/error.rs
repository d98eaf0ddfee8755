//! Error types for Tessera.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for world generation.
#[derive(Debug, Error)]
pub enum WorldGenError {
    /// Biome/object tables are inconsistent
    #[error("Config integrity error: {0}")]
    ConfigIntegrity(#[from] ConfigIntegrityError),

    /// Caller passed unusable parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(#[from] InvalidParameterError),

    /// Data tables or settings could not be read
    #[error("Config load error: {0}")]
    Load(#[from] ConfigLoadError),
}

/// The biome/object configuration does not describe a consistent world.
///
/// Never recoverable at generation time: retrying with the same seed and
/// coordinate reproduces the same failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigIntegrityError {
    /// A biome id has no entry in the biome table
    #[error("Biome '{0}' is not defined in the biome table")]
    MissingBiome(String),

    /// A biome rule names an object absent from the object table
    #[error("Biome '{biome}' references unknown object '{object}'")]
    MissingObject {
        /// Biome declaring the rule
        biome: String,
        /// Object name that failed to resolve
        object: String,
    },

    /// No world object has the given id
    #[error("No world object with id {0}")]
    UnknownObjectId(u8),

    /// An object has no glyphs to choose from
    #[error("Object '{0}' has an empty glyph set")]
    EmptyGlyphSet(String),

    /// An object has no colors to choose from
    #[error("Object '{0}' has an empty color set")]
    EmptyColorSet(String),

    /// A biome is defined twice
    #[error("Biome '{0}' is defined more than once")]
    DuplicateBiome(String),

    /// An object is defined twice
    #[error("Object '{0}' is defined more than once")]
    DuplicateObject(String),

    /// Object ids are bytes; the table is too long
    #[error("Object table has {0} entries, at most 256 are supported")]
    ObjectIdOverflow(usize),
}

/// Parameters that cannot produce a chunk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidParameterError {
    /// Chunk width or height is zero
    #[error("Chunk dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// A chunk dimension does not fit the local coordinate range
    #[error("Chunk dimension {0} exceeds the maximum of 65535")]
    DimensionTooLarge(u32),

    /// A per-cell grid does not match the chunk dimensions
    #[error("Grid has {actual} cells, expected {expected}")]
    GridSizeMismatch {
        /// Cells implied by the dimensions
        expected: usize,
        /// Cells supplied
        actual: usize,
    },

    /// A noise layer is configured with unusable values
    #[error("Invalid noise layer: {0}")]
    InvalidNoiseLayer(String),
}

/// Failure reading a data table or settings file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// Failed to read file
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type alias for world generation.
pub type WorldGenResult<T> = Result<T, WorldGenError>;
