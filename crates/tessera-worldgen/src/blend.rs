//! Background color blending across biome borders.
//!
//! A cell starts from its biome color and is pulled a fixed fraction towards
//! each distinct, differing color among its left, right, up and down
//! neighbors, in that order. Neighbors outside the chunk contribute nothing.

use serde::{Deserialize, Serialize};
use tessera_common::{Rgb, WorldGenResult};

use crate::automaton::check_grid;
use crate::biome::BiomeId;
use crate::config::WorldConfig;

/// Default pull towards each differing neighbor color.
pub const DEFAULT_BLEND_FACTOR: f32 = 0.12;

/// Default color of debug border cells.
pub const DEFAULT_BORDER_COLOR: Rgb = Rgb::new(255, 0, 255);

/// Blend parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendSettings {
    /// Interpolation factor per distinct neighbor color.
    pub factor: f32,
    /// Fixed color of `Border` cells.
    pub border_color: Rgb,
    /// Skip the first distinct neighbor color, matching older renders.
    pub legacy_skip_first: bool,
}

impl Default for BlendSettings {
    fn default() -> Self {
        Self {
            factor: DEFAULT_BLEND_FACTOR,
            border_color: DEFAULT_BORDER_COLOR,
            legacy_skip_first: false,
        }
    }
}

/// Computes per-cell background colors.
#[derive(Debug, Clone, Copy)]
pub struct ChunkColorBlender<'a> {
    config: &'a WorldConfig,
    settings: BlendSettings,
}

impl<'a> ChunkColorBlender<'a> {
    /// Creates a blender.
    #[must_use]
    pub fn new(config: &'a WorldConfig, settings: BlendSettings) -> Self {
        Self { config, settings }
    }

    /// Blends a row-major biome grid into background colors.
    pub fn blend(
        &self,
        biomes: &[BiomeId],
        width: u32,
        height: u32,
    ) -> WorldGenResult<Vec<Rgb>> {
        check_grid(biomes.len(), width, height)?;

        let base = biomes
            .iter()
            .map(|&id| self.config.biome(id).map(|b| b.color))
            .collect::<Result<Vec<_>, _>>()?;

        let w = width as usize;
        let h = height as usize;
        let mut colors = Vec::with_capacity(base.len());
        let mut distinct: Vec<Rgb> = Vec::with_capacity(4);

        for y in 0..h {
            for x in 0..w {
                let index = y * w + x;
                if biomes[index] == BiomeId::Border {
                    colors.push(self.settings.border_color);
                    continue;
                }

                let own = base[index];
                let neighbors = [
                    (x > 0).then(|| index - 1),
                    (x + 1 < w).then(|| index + 1),
                    (y > 0).then(|| index - w),
                    (y + 1 < h).then(|| index + w),
                ];

                distinct.clear();
                for n in neighbors.into_iter().flatten() {
                    let color = base[n];
                    if color != own && !distinct.contains(&color) {
                        distinct.push(color);
                    }
                }

                let skip = usize::from(self.settings.legacy_skip_first);
                let blended = distinct
                    .iter()
                    .skip(skip)
                    .fold(own, |acc, &c| acc.lerp(c, self.settings.factor));
                colors.push(blended);
            }
        }

        Ok(colors)
    }
}
