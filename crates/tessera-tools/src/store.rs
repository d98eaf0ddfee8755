//! In-memory chunk store.
//!
//! Generates chunks on demand from one [`SeededGenerator`] and keeps them
//! keyed by coordinate. Cells stay behind a lock so a field-of-view layer can
//! update their explored and visible flags after generation.

use std::num::NonZeroUsize;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tessera_common::{ChunkCoord, WorldGenResult};
use tessera_worldgen::{Chunk, SeededGenerator};
use tracing::{debug, info};

/// Shared handle to a stored chunk.
pub type ChunkHandle = Arc<RwLock<Chunk>>;

/// Chunks generated so far, by coordinate.
pub struct ChunkStore {
    /// World generator
    generator: SeededGenerator,
    /// Chunk width in cells
    width: u32,
    /// Chunk height in cells
    height: u32,
    /// Loaded chunks
    chunks: DashMap<ChunkCoord, ChunkHandle>,
}

impl ChunkStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(generator: SeededGenerator, width: u32, height: u32) -> Self {
        Self {
            generator,
            width,
            height,
            chunks: DashMap::new(),
        }
    }

    /// Chunk width in cells.
    #[must_use]
    pub const fn chunk_width(&self) -> u32 {
        self.width
    }

    /// Chunk height in cells.
    #[must_use]
    pub const fn chunk_height(&self) -> u32 {
        self.height
    }

    /// World seed of the generator.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.generator.seed()
    }

    /// Gets a loaded chunk or generates it.
    ///
    /// If two callers race on the same coordinate, both receive the chunk that
    /// was stored first.
    pub fn get_or_generate(&self, coord: ChunkCoord) -> WorldGenResult<ChunkHandle> {
        if let Some(chunk) = self.chunks.get(&coord) {
            return Ok(Arc::clone(chunk.value()));
        }

        let chunk = self.generator.generate_chunk(self.width, self.height, coord)?;
        debug!("Generated chunk {coord}");
        let entry = self
            .chunks
            .entry(coord)
            .or_insert_with(|| Arc::new(RwLock::new(chunk)));
        Ok(Arc::clone(entry.value()))
    }

    /// Gets a chunk if it is loaded.
    #[must_use]
    pub fn get(&self, coord: ChunkCoord) -> Option<ChunkHandle> {
        self.chunks.get(&coord).map(|c| Arc::clone(c.value()))
    }

    /// Generates every missing chunk within `radius` of `center` in parallel.
    ///
    /// Returns the number of chunks generated.
    pub fn prefetch(&self, center: ChunkCoord, radius: u32) -> WorldGenResult<usize> {
        let missing: Vec<ChunkCoord> = center
            .square_around(radius)
            .filter(|c| !self.is_loaded(*c))
            .collect();
        if missing.is_empty() {
            return Ok(0);
        }

        let workers = std::thread::available_parallelism()
            .map_or(1, NonZeroUsize::get)
            .min(missing.len());
        let per_worker = missing.len().div_ceil(workers);

        std::thread::scope(|scope| {
            let handles: Vec<_> = missing
                .chunks(per_worker)
                .map(|batch| {
                    scope.spawn(move || -> WorldGenResult<()> {
                        for &coord in batch {
                            self.get_or_generate(coord)?;
                        }
                        Ok(())
                    })
                })
                .collect();
            handles.into_iter().try_for_each(|h| match h.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            })
        })?;

        info!(
            "Prefetched {} chunks around {center} using {workers} workers",
            missing.len()
        );
        Ok(missing.len())
    }

    /// Drops a chunk so the next access regenerates it.
    pub fn invalidate(&self, coord: ChunkCoord) -> bool {
        self.chunks.remove(&coord).is_some()
    }

    /// Drops every chunk.
    pub fn clear(&self) {
        self.chunks.clear();
    }

    /// Checks if a chunk is loaded.
    #[must_use]
    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// Returns the number of loaded chunks.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.chunks.len()
    }
}
