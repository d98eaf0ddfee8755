//! Chunk generation pipeline.
//!
//! A chunk is produced in one synchronous call that runs every stage in
//! order: noise sampling, biome classification, object seeding, automaton
//! refinement and color blending. Generation is a pure function of the world
//! seed, chunk coordinate and dimensions; all mutable state is local to the
//! call, so generators can be shared freely between threads.

use std::fmt;
use std::sync::Arc;

use fastrand::Rng;
use tessera_common::{ChunkCoord, InvalidParameterError, WorldGenResult};
use tracing::{debug, info, warn};

use crate::automaton::CellularAutomaton;
use crate::biome::{classify, is_chunk_edge, BiomeId};
use crate::blend::ChunkColorBlender;
use crate::chunk::{Cell, Chunk};
use crate::config::WorldConfig;
use crate::noise_field::NoiseField;
use crate::seed::chunk_seed;
use crate::seeder::seed_objects;
use crate::settings::GeneratorSettings;

/// Largest supported chunk side, bounded by [`tessera_common::LocalCoord`].
pub const MAX_CHUNK_DIMENSION: u32 = u16::MAX as u32;

/// Pipeline stage a chunk has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    /// Elevation and moisture sampled
    NoiseSampled,
    /// Biomes assigned
    Classified,
    /// Initial objects placed
    Seeded,
    /// Automaton passes applied
    Refined,
    /// Background colors computed
    ColorBlended,
    /// Chunk assembled
    Ready,
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoiseSampled => "noise-sampled",
            Self::Classified => "classified",
            Self::Seeded => "seeded",
            Self::Refined => "refined",
            Self::ColorBlended => "color-blended",
            Self::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// Entry point for chunk generation.
///
/// Holds the shared, read-only biome/object tables and pipeline settings.
#[derive(Debug, Clone)]
pub struct ChunkGenerator {
    config: Arc<WorldConfig>,
    settings: Arc<GeneratorSettings>,
}

impl ChunkGenerator {
    /// Creates a generator over `config`.
    #[must_use]
    pub fn new(config: Arc<WorldConfig>, settings: GeneratorSettings) -> Self {
        let missing = config.missing_biomes();
        if !missing.is_empty() {
            warn!(
                "World config lacks {} biome(s): {:?}; chunks containing them will fail",
                missing.len(),
                missing
            );
        }
        info!(
            "Chunk generator ready: {} biomes, {} objects, {} automaton passes",
            config.biome_count(),
            config.object_count(),
            settings.automaton_passes
        );
        Self {
            config,
            settings: Arc::new(settings),
        }
    }

    /// Creates a generator over the built-in tables with default settings.
    pub fn with_defaults() -> WorldGenResult<Self> {
        Ok(Self::new(
            Arc::new(WorldConfig::builtin()?),
            GeneratorSettings::default(),
        ))
    }

    /// Returns the biome/object tables.
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Returns the pipeline settings.
    #[must_use]
    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Builds the noise field for `seed` once, for repeated generation.
    pub fn for_seed(&self, seed: u64) -> WorldGenResult<SeededGenerator> {
        let noise = NoiseField::new(seed, &self.settings.noise)?;
        Ok(SeededGenerator {
            config: Arc::clone(&self.config),
            settings: Arc::clone(&self.settings),
            noise,
        })
    }

    /// Generates one chunk.
    ///
    /// Returns the biome byte of every cell, row-major, alongside the chunk.
    pub fn generate(
        &self,
        seed: u64,
        width: u32,
        height: u32,
        coord: ChunkCoord,
    ) -> WorldGenResult<(Vec<u8>, Chunk)> {
        self.for_seed(seed)?.generate(width, height, coord)
    }
}

/// A [`ChunkGenerator`] bound to one world seed.
///
/// Safe to share across threads; every call owns its scratch buffers and RNG.
#[derive(Debug, Clone)]
pub struct SeededGenerator {
    config: Arc<WorldConfig>,
    settings: Arc<GeneratorSettings>,
    noise: NoiseField,
}

impl SeededGenerator {
    /// World seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.noise.seed()
    }

    /// The noise field shared by every chunk of this seed.
    #[must_use]
    pub const fn noise(&self) -> &NoiseField {
        &self.noise
    }

    /// Generates one chunk; see [`ChunkGenerator::generate`].
    pub fn generate(
        &self,
        width: u32,
        height: u32,
        coord: ChunkCoord,
    ) -> WorldGenResult<(Vec<u8>, Chunk)> {
        let chunk = self.generate_chunk(width, height, coord)?;
        Ok((chunk.cell_types(), chunk))
    }

    /// Generates one chunk without the separate cell type array.
    pub fn generate_chunk(&self, width: u32, height: u32, coord: ChunkCoord) -> WorldGenResult<Chunk> {
        validate_dimensions(width, height)?;
        let seed = self.seed();
        let settings = &*self.settings;
        let config = &*self.config;

        let origin = coord.to_world_coord(width, height);
        let elevation = self.noise.elevation_map(origin, width, height);
        let moisture = self.noise.moisture_map(origin, width, height);
        debug!(x = coord.x, y = coord.y, stage = %GenerationStage::NoiseSampled, "Chunk stage");

        let biomes: Vec<BiomeId> = elevation
            .iter()
            .zip(&moisture)
            .enumerate()
            .map(|(index, (&e, &m))| {
                let x = (index % width as usize) as u32;
                let y = (index / width as usize) as u32;
                if settings.debug_border && is_chunk_edge(x, y, width, height) {
                    BiomeId::Border
                } else {
                    classify(e, m)
                }
            })
            .collect();
        debug!(x = coord.x, y = coord.y, stage = %GenerationStage::Classified, "Chunk stage");

        let mut rng = Rng::with_seed(chunk_seed(seed, coord));
        let mut objects = seed_objects(&mut rng, config, &biomes)?;
        debug!(x = coord.x, y = coord.y, stage = %GenerationStage::Seeded, "Chunk stage");

        let automaton =
            CellularAutomaton::new(config, settings.neighborhood, settings.automaton_passes);
        let passes = automaton.run(&mut rng, &biomes, &mut objects, width, height)?;
        debug!(x = coord.x, y = coord.y, passes, stage = %GenerationStage::Refined, "Chunk stage");

        let colors = ChunkColorBlender::new(config, settings.blend).blend(&biomes, width, height)?;
        debug!(x = coord.x, y = coord.y, stage = %GenerationStage::ColorBlended, "Chunk stage");

        let cells = biomes
            .into_iter()
            .zip(colors)
            .zip(objects)
            .map(|((biome, color), object)| Cell::new(biome, color, object))
            .collect();
        let chunk = Chunk::from_cells(coord, width, height, seed, cells);
        debug!(x = coord.x, y = coord.y, stage = %GenerationStage::Ready, "Chunk stage");

        Ok(chunk)
    }
}

fn validate_dimensions(width: u32, height: u32) -> Result<(), InvalidParameterError> {
    if width == 0 || height == 0 {
        return Err(InvalidParameterError::ZeroDimension { width, height });
    }
    for side in [width, height] {
        if side > MAX_CHUNK_DIMENSION {
            return Err(InvalidParameterError::DimensionTooLarge(side));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blend::DEFAULT_BORDER_COLOR;
    use crate::config::Biome;
    use tessera_common::{ConfigIntegrityError, Rgb, WorldGenError};

    fn generator() -> ChunkGenerator {
        ChunkGenerator::with_defaults().expect("builtin config")
    }

    #[test]
    fn test_generate_is_deterministic() {
        let generator = generator();
        let coord = ChunkCoord::new(3, -2);
        let (types_a, chunk_a) = generator.generate(42, 32, 24, coord).expect("generate");
        let (types_b, chunk_b) = generator.generate(42, 32, 24, coord).expect("generate");
        assert_eq!(types_a, types_b);
        assert_eq!(chunk_a, chunk_b);
        assert_eq!(types_a.len(), 32 * 24);
        assert_eq!(chunk_a.colors().len(), 32 * 24);
    }

    #[test]
    fn test_seeded_generator_matches_one_shot() {
        let generator = generator();
        let seeded = generator.for_seed(7).expect("seeded");
        let coord = ChunkCoord::new(-1, 4);
        assert_eq!(
            seeded.generate(16, 16, coord).expect("seeded generate"),
            generator.generate(7, 16, 16, coord).expect("one-shot generate")
        );
        assert_eq!(seeded.seed(), 7);
    }

    #[test]
    fn test_chunk_metadata() {
        let (types, chunk) = generator()
            .generate(9, 20, 10, ChunkCoord::new(1, 2))
            .expect("generate");
        assert_eq!(chunk.coord(), ChunkCoord::new(1, 2));
        assert_eq!((chunk.width(), chunk.height(), chunk.seed()), (20, 10, 9));
        assert_eq!(types, chunk.cell_types());
    }

    #[test]
    fn test_objects_belong_to_their_biome() {
        let generator = generator();
        for x in 0..4 {
            let (_, chunk) = generator
                .generate(1234, 32, 32, ChunkCoord::new(x, 0))
                .expect("generate");
            for cell in chunk.cells() {
                if let Some(object) = cell.object {
                    let biome = generator.config().biome(cell.biome).expect("biome");
                    assert!(biome.rule_for(object.object_id).is_some());
                }
            }
        }
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let err = generator()
            .generate(1, 0, 16, ChunkCoord::default())
            .expect_err("zero width");
        assert!(matches!(
            err,
            WorldGenError::InvalidParameter(InvalidParameterError::ZeroDimension { width: 0, height: 16 })
        ));
    }

    #[test]
    fn test_oversized_dimension_rejected() {
        let err = generator()
            .generate(1, 8, 70_000, ChunkCoord::default())
            .expect_err("too tall");
        assert!(matches!(
            err,
            WorldGenError::InvalidParameter(InvalidParameterError::DimensionTooLarge(70_000))
        ));
    }

    #[test]
    fn test_single_cell_chunk() {
        let (types, chunk) = generator()
            .generate(5, 1, 1, ChunkCoord::new(10, 10))
            .expect("generate");
        assert_eq!(types.len(), 1);
        assert!(chunk.cell(0, 0).is_some());
    }

    #[test]
    fn test_debug_border_ring() {
        let settings = GeneratorSettings {
            debug_border: true,
            ..GeneratorSettings::default()
        };
        let config = Arc::new(WorldConfig::builtin().expect("builtin"));
        let generator = ChunkGenerator::new(config, settings);
        let (_, chunk) = generator
            .generate(77, 8, 6, ChunkCoord::new(0, 0))
            .expect("generate");
        for y in 0..6 {
            for x in 0..8 {
                let cell = chunk.cell(x, y).expect("in bounds");
                if is_chunk_edge(x, y, 8, 6) {
                    assert_eq!(cell.biome, BiomeId::Border);
                    assert_eq!(cell.background, DEFAULT_BORDER_COLOR);
                    assert!(cell.object.is_none());
                } else {
                    assert_ne!(cell.biome, BiomeId::Border);
                }
            }
        }
    }

    #[test]
    fn test_missing_biome_is_fatal() {
        // Only ocean is defined, so any land cell fails.
        let config = WorldConfig::new(vec![Biome::new(BiomeId::Ocean, Rgb::new(0, 0, 128))], Vec::new())
            .expect("config");
        let generator = ChunkGenerator::new(Arc::new(config), GeneratorSettings::default());
        let err = generator
            .generate(3, 32, 32, ChunkCoord::new(0, 0))
            .expect_err("land biome is undefined");
        assert!(matches!(
            err,
            WorldGenError::ConfigIntegrity(ConfigIntegrityError::MissingBiome(_))
        ));
    }

    #[test]
    fn test_invalid_noise_settings_rejected() {
        let mut settings = GeneratorSettings::default();
        settings.noise.moisture.clear();
        let config = Arc::new(WorldConfig::builtin().expect("builtin"));
        let generator = ChunkGenerator::new(config, settings);
        assert!(matches!(
            generator.for_seed(1),
            Err(WorldGenError::InvalidParameter(InvalidParameterError::InvalidNoiseLayer(_)))
        ));
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(GenerationStage::NoiseSampled.to_string(), "noise-sampled");
        assert_eq!(GenerationStage::Ready.to_string(), "ready");
    }
}
