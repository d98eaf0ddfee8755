//! Multi-octave noise sampling for elevation and moisture.
//!
//! Each channel is a weighted average of independently seeded fractal
//! Brownian motion layers. A sampled block is remapped to `[0, 1]` either by
//! its own observed min/max ([`Normalization::Block`]) or by the theoretical
//! noise range ([`Normalization::Fixed`]).
//!
//! A [`NoiseField`] is immutable once built and is shared by every chunk
//! generated for the same world seed.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::{Deserialize, Serialize};
use tessera_common::{InvalidParameterError, WorldCoord};

use crate::seed::{noise_seed, ELEVATION_SALT, MOISTURE_SALT};

/// Upper bound on octaves per layer.
pub const MAX_OCTAVES: u32 = 16;

/// Parameters of one fBm layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseLayerConfig {
    /// Number of octaves summed.
    pub octaves: u32,
    /// World cells per noise unit at the base octave (larger = smoother).
    pub scale: f64,
    /// Amplitude multiplier per octave.
    pub persistence: f64,
    /// Frequency multiplier per octave.
    pub lacunarity: f64,
    /// Weight in the channel average.
    pub weight: f64,
    /// Added to the layer seed so stacked layers decorrelate.
    pub seed_offset: u32,
}

impl Default for NoiseLayerConfig {
    fn default() -> Self {
        Self {
            octaves: 4,
            scale: 64.0,
            persistence: 0.5,
            lacunarity: 2.0,
            weight: 1.0,
            seed_offset: 0,
        }
    }
}

impl NoiseLayerConfig {
    /// Creates a layer with unit weight.
    #[must_use]
    pub fn new(octaves: u32, scale: f64, persistence: f64, lacunarity: f64) -> Self {
        Self {
            octaves,
            scale,
            persistence,
            lacunarity,
            ..Self::default()
        }
    }

    /// Sets the channel weight.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Sets the seed offset.
    #[must_use]
    pub fn with_seed_offset(mut self, offset: u32) -> Self {
        self.seed_offset = offset;
        self
    }

    /// Rejects layers that cannot produce finite values.
    pub fn validate(&self) -> Result<(), InvalidParameterError> {
        if self.octaves == 0 || self.octaves > MAX_OCTAVES {
            return Err(InvalidParameterError::InvalidNoiseLayer(format!(
                "octaves must be in 1..={MAX_OCTAVES}, got {}",
                self.octaves
            )));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(InvalidParameterError::InvalidNoiseLayer(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        if !(self.weight.is_finite() && self.weight >= 0.0) {
            return Err(InvalidParameterError::InvalidNoiseLayer(format!(
                "weight must be non-negative, got {}",
                self.weight
            )));
        }
        if !self.persistence.is_finite() || !self.lacunarity.is_finite() {
            return Err(InvalidParameterError::InvalidNoiseLayer(
                "persistence and lacunarity must be finite".into(),
            ));
        }
        Ok(())
    }
}

/// How a sampled block is remapped to `[0, 1]`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Normalization {
    /// Linear remap by the block's observed min and max.
    #[default]
    Block,
    /// Linear remap of the nominal `[-1, 1]` range, clamped.
    Fixed,
}

/// Radial falloff subtracted from elevation to push block edges towards ocean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandGradient {
    /// Elevation removed at the corners.
    pub strength: f64,
    /// Falloff curve exponent (1 = linear).
    pub exponent: f64,
}

impl Default for IslandGradient {
    fn default() -> Self {
        Self {
            strength: 0.6,
            exponent: 2.0,
        }
    }
}

impl IslandGradient {
    /// Applies the mask to a normalized `width` × `height` block in place.
    pub fn apply(&self, values: &mut [f64], width: u32, height: u32) {
        let half_w = (f64::from(width) - 1.0).max(1.0) / 2.0;
        let half_h = (f64::from(height) - 1.0).max(1.0) / 2.0;
        for (index, value) in values.iter_mut().enumerate() {
            let x = (index % width as usize) as f64;
            let y = (index / width as usize) as f64;
            let nx = (x - half_w) / half_w;
            let ny = (y - half_h) / half_h;
            let distance = ((nx * nx + ny * ny) / 2.0).sqrt().min(1.0);
            *value = (*value - self.strength * distance.powf(self.exponent)).clamp(0.0, 1.0);
        }
    }
}

/// Noise configuration for both channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
    /// Elevation layers.
    pub elevation: Vec<NoiseLayerConfig>,
    /// Moisture layers.
    pub moisture: Vec<NoiseLayerConfig>,
    /// Block remap mode.
    pub normalization: Normalization,
    /// Optional edge falloff on elevation.
    pub island_gradient: Option<IslandGradient>,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            elevation: vec![
                NoiseLayerConfig::new(5, 96.0, 0.5, 2.0),
                NoiseLayerConfig::new(3, 24.0, 0.5, 2.0)
                    .with_weight(0.25)
                    .with_seed_offset(1),
            ],
            moisture: vec![NoiseLayerConfig::new(4, 128.0, 0.55, 2.0)],
            normalization: Normalization::Block,
            island_gradient: None,
        }
    }
}

/// One seeded fBm layer.
#[derive(Debug, Clone)]
pub struct NoiseLayer {
    fbm: Fbm<Perlin>,
    weight: f64,
}

impl NoiseLayer {
    /// Builds a layer from its configuration and a seed.
    pub fn new(config: &NoiseLayerConfig, seed: u32) -> Result<Self, InvalidParameterError> {
        config.validate()?;
        let fbm = Fbm::<Perlin>::new(seed)
            .set_octaves(config.octaves as usize)
            .set_frequency(1.0 / config.scale)
            .set_persistence(config.persistence)
            .set_lacunarity(config.lacunarity);
        Ok(Self {
            fbm,
            weight: config.weight,
        })
    }

    /// Samples the layer at world coordinates. Roughly in `[-1, 1]`.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        self.fbm.get([x, y])
    }

    /// Samples a `width` × `height` block starting at `origin`, normalized.
    #[must_use]
    pub fn generate_map(
        &self,
        origin: WorldCoord,
        width: u32,
        height: u32,
        normalization: Normalization,
    ) -> Vec<f64> {
        let mut values = sample_block(origin, width, height, |x, y| self.sample(x, y));
        normalize(&mut values, normalization);
        values
    }
}

/// A weighted stack of layers producing one scalar field.
#[derive(Debug, Clone)]
pub struct NoiseChannel {
    layers: Vec<NoiseLayer>,
    total_weight: f64,
}

impl NoiseChannel {
    /// Builds every layer, seeding each from the world seed, salt, and layer offset.
    pub fn new(
        configs: &[NoiseLayerConfig],
        world_seed: u64,
        salt: u64,
    ) -> Result<Self, InvalidParameterError> {
        if configs.is_empty() {
            return Err(InvalidParameterError::InvalidNoiseLayer(
                "channel has no layers".into(),
            ));
        }
        let layers = configs
            .iter()
            .map(|c| NoiseLayer::new(c, noise_seed(world_seed, salt, c.seed_offset)))
            .collect::<Result<Vec<_>, _>>()?;
        let total_weight: f64 = layers.iter().map(|l| l.weight).sum();
        if total_weight <= 0.0 {
            return Err(InvalidParameterError::InvalidNoiseLayer(
                "channel layer weights sum to zero".into(),
            ));
        }
        Ok(Self {
            layers,
            total_weight,
        })
    }

    /// Weighted average of all layers at world coordinates.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let sum: f64 = self
            .layers
            .iter()
            .map(|l| l.sample(x, y) * l.weight)
            .sum();
        sum / self.total_weight
    }

    /// Samples a block and remaps it to `[0, 1]`.
    #[must_use]
    pub fn generate_map(
        &self,
        origin: WorldCoord,
        width: u32,
        height: u32,
        normalization: Normalization,
    ) -> Vec<f64> {
        let mut values = sample_block(origin, width, height, |x, y| self.sample(x, y));
        normalize(&mut values, normalization);
        values
    }
}

/// Elevation and moisture fields for one world seed.
#[derive(Debug, Clone)]
pub struct NoiseField {
    seed: u64,
    elevation: NoiseChannel,
    moisture: NoiseChannel,
    normalization: Normalization,
    island_gradient: Option<IslandGradient>,
}

impl NoiseField {
    /// Builds both channels for `seed`.
    pub fn new(seed: u64, settings: &NoiseSettings) -> Result<Self, InvalidParameterError> {
        Ok(Self {
            seed,
            elevation: NoiseChannel::new(&settings.elevation, seed, ELEVATION_SALT)?,
            moisture: NoiseChannel::new(&settings.moisture, seed, MOISTURE_SALT)?,
            normalization: settings.normalization,
            island_gradient: settings.island_gradient,
        })
    }

    /// World seed this field was built for.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Raw elevation at a world position.
    #[must_use]
    pub fn sample_elevation(&self, x: f64, y: f64) -> f64 {
        self.elevation.sample(x, y)
    }

    /// Normalized elevation for a block, with the island gradient applied.
    #[must_use]
    pub fn elevation_map(&self, origin: WorldCoord, width: u32, height: u32) -> Vec<f64> {
        let mut values = self
            .elevation
            .generate_map(origin, width, height, self.normalization);
        if let Some(gradient) = &self.island_gradient {
            gradient.apply(&mut values, width, height);
        }
        values
    }

    /// Normalized moisture for a block.
    #[must_use]
    pub fn moisture_map(&self, origin: WorldCoord, width: u32, height: u32) -> Vec<f64> {
        self.moisture
            .generate_map(origin, width, height, self.normalization)
    }
}

fn sample_block(
    origin: WorldCoord,
    width: u32,
    height: u32,
    sample: impl Fn(f64, f64) -> f64,
) -> Vec<f64> {
    let mut values = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            let wx = (origin.x + i64::from(x)) as f64;
            let wy = (origin.y + i64::from(y)) as f64;
            values.push(sample(wx, wy));
        }
    }
    values
}

/// Remaps values to `[0, 1]` in place.
///
/// A flat block under [`Normalization::Block`] maps to 0.5 everywhere.
pub fn normalize(values: &mut [f64], mode: Normalization) {
    match mode {
        Normalization::Block => {
            let (min, max) = values
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                });
            let range = max - min;
            if !range.is_finite() || range <= f64::EPSILON {
                values.iter_mut().for_each(|v| *v = 0.5);
                return;
            }
            for v in values.iter_mut() {
                *v = (*v - min) / range;
            }
        },
        Normalization::Fixed => {
            for v in values.iter_mut() {
                *v = ((*v + 1.0) / 2.0).clamp(0.0, 1.0);
            }
        },
    }
}
