//! # Tessera Worldgen
//!
//! Chunk content generation for Tessera.
//!
//! This crate handles:
//! - Layered fBm elevation and moisture noise
//! - Biome classification
//! - Rarity-weighted object seeding
//! - Cellular-automaton growth and thinning of objects
//! - Background color blending across biome borders
//!
//! Biome and object tables are loaded once into a read-only [`WorldConfig`]
//! and shared between generators.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod automaton;
pub mod biome;
pub mod blend;
pub mod chunk;
pub mod config;
pub mod generator;
pub mod noise_field;
pub mod seed;
pub mod seeder;
pub mod settings;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::automaton::{CellularAutomaton, Neighborhood};
    pub use crate::biome::{classify, BiomeId};
    pub use crate::blend::{BlendSettings, ChunkColorBlender};
    pub use crate::chunk::*;
    pub use crate::config::*;
    pub use crate::generator::*;
    pub use crate::noise_field::{NoiseField, NoiseLayerConfig, NoiseSettings, Normalization};
    pub use crate::settings::GeneratorSettings;
}

pub use prelude::*;
