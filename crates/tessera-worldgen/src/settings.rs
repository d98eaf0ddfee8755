//! Generator settings.
//!
//! Tunable parameters of the chunk pipeline. Settings can be loaded from and
//! saved to a TOML file; missing fields take their defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{info, warn};

use crate::automaton::{Neighborhood, DEFAULT_PASSES};
use crate::blend::BlendSettings;
use crate::noise_field::{NoiseLayerConfig, NoiseSettings, MAX_OCTAVES};

/// Settings file name.
pub const SETTINGS_FILE: &str = "worldgen.toml";

/// Upper bound for automaton passes.
pub const MAX_AUTOMATON_PASSES: u32 = 64;

/// Chunk pipeline parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    // === Terrain ===
    /// Elevation and moisture noise
    pub noise: NoiseSettings,
    /// Force the outermost ring of every chunk to `Border`
    pub debug_border: bool,

    // === Objects ===
    /// Automaton passes (0 is raised to 1)
    pub automaton_passes: u32,
    /// Neighbors counted by the automaton
    pub neighborhood: Neighborhood,

    // === Colors ===
    /// Background blending
    pub blend: BlendSettings,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            noise: NoiseSettings::default(),
            debug_border: false,

            automaton_passes: DEFAULT_PASSES,
            neighborhood: Neighborhood::Moore,

            blend: BlendSettings::default(),
        }
    }
}

impl GeneratorSettings {
    /// Load settings from a specific path.
    /// Returns defaults if the file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Settings file not found, using defaults");
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read settings file: {e}");
                return Self::default();
            },
        };

        match toml::from_str::<Self>(&contents) {
            Ok(mut settings) => {
                settings.validate();
                info!("Loaded settings from {}", path.display());
                settings
            },
            Err(e) => {
                warn!("Failed to parse settings file: {e}");
                Self::default()
            },
        }
    }

    /// Save settings to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Clamp values to usable ranges.
    pub fn validate(&mut self) {
        // Terrain
        for layer in self
            .noise
            .elevation
            .iter_mut()
            .chain(self.noise.moisture.iter_mut())
        {
            clamp_layer(layer);
        }
        if self.noise.elevation.is_empty() {
            warn!("No elevation layers configured, using defaults");
            self.noise.elevation = NoiseSettings::default().elevation;
        }
        if self.noise.moisture.is_empty() {
            warn!("No moisture layers configured, using defaults");
            self.noise.moisture = NoiseSettings::default().moisture;
        }
        if let Some(gradient) = &mut self.noise.island_gradient {
            gradient.strength = gradient.strength.clamp(0.0, 1.0);
            gradient.exponent = gradient.exponent.clamp(0.1, 8.0);
        }

        // Objects
        if self.automaton_passes == 0 {
            warn!("Automaton pass count 0 is not allowed, using 1");
        }
        self.automaton_passes = self.automaton_passes.clamp(1, MAX_AUTOMATON_PASSES);

        // Colors
        self.blend.factor = if self.blend.factor.is_finite() {
            self.blend.factor.clamp(0.0, 1.0)
        } else {
            BlendSettings::default().factor
        };
    }
}

fn clamp_layer(layer: &mut NoiseLayerConfig) {
    let defaults = NoiseLayerConfig::default();
    layer.octaves = layer.octaves.clamp(1, MAX_OCTAVES);
    if !(layer.scale.is_finite() && layer.scale > 0.0) {
        layer.scale = defaults.scale;
    }
    if !(layer.weight.is_finite() && layer.weight >= 0.0) {
        layer.weight = defaults.weight;
    }
    if !layer.persistence.is_finite() {
        layer.persistence = defaults.persistence;
    }
    if !layer.lacunarity.is_finite() {
        layer.lacunarity = defaults.lacunarity;
    }
}
