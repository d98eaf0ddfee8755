//! Biome and world object tables.
//!
//! Two TOML files describe the world's content:
//! - `objects.toml`: decorative objects (glyphs, colors, visibility, walkability)
//! - `biomes.toml`: biomes with a base color and the object rules they spawn
//!
//! Both are loaded once into a [`WorldConfig`], which is immutable afterwards and
//! shared between generator threads behind an `Arc`.

use std::fs;
use std::path::{Path, PathBuf};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tessera_common::{ConfigIntegrityError, ConfigLoadError, Rgb, WorldGenResult};
use tracing::{debug, info};

use crate::biome::BiomeId;

/// Default asset path for the data tables.
pub const DEFAULT_CONFIG_PATH: &str = "assets/worldgen";

/// File name of the biome table.
pub const BIOMES_FILE: &str = "biomes.toml";

/// File name of the object table.
pub const OBJECTS_FILE: &str = "objects.toml";

/// Object ids are bytes, so a table holds at most this many objects.
pub const MAX_OBJECTS: usize = u8::MAX as usize + 1;

const BUILTIN_BIOMES: &str = include_str!("../assets/worldgen/biomes.toml");
const BUILTIN_OBJECTS: &str = include_str!("../assets/worldgen/objects.toml");

/// Spawn rarity of an object rule.
///
/// Higher rarities roll against a larger ceiling, so the same `spawn_chance`
/// succeeds less often.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    /// Ceiling 100.
    #[default]
    Normal,
    /// Ceiling 200.
    Uncommon,
    /// Ceiling 300.
    Rare,
    /// Ceiling 500.
    Epic,
    /// Ceiling 750.
    Legendary,
    /// Ceiling 1000.
    Mythical,
}

impl Rarity {
    /// Exclusive upper bound of the spawn roll.
    #[must_use]
    pub const fn roll_ceiling(self) -> u32 {
        match self {
            Self::Normal => 100,
            Self::Uncommon => 200,
            Self::Rare => 300,
            Self::Epic => 500,
            Self::Legendary => 750,
            Self::Mythical => 1000,
        }
    }
}

/// A decorative object that can be placed on a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldObject {
    /// Byte id, assigned from table order on load.
    #[serde(skip)]
    pub id: u8,
    /// Unique name referenced by biome rules.
    pub name: String,
    /// Human-readable name.
    #[serde(default)]
    pub display_name: String,
    /// Glyphs an instance may be drawn with.
    pub glyphs: Vec<char>,
    /// Colors an instance may be tinted with.
    pub colors: Vec<Rgb>,
    /// Whether the object blocks line of sight.
    #[serde(default)]
    pub blocks_view: bool,
    /// Whether actors can walk over the object.
    #[serde(default = "default_walkable")]
    pub walkable: bool,
    /// Whether instances may be mirrored horizontally.
    #[serde(default)]
    pub mirror: bool,
}

const fn default_walkable() -> bool {
    true
}

impl WorldObject {
    /// Creates a walkable, see-through object.
    #[must_use]
    pub fn new(name: impl Into<String>, glyphs: Vec<char>, colors: Vec<Rgb>) -> Self {
        let name = name.into();
        Self {
            id: 0,
            display_name: name.clone(),
            name,
            glyphs,
            colors,
            blocks_view: false,
            walkable: true,
            mirror: false,
        }
    }

    /// Sets the view/walk flags.
    #[must_use]
    pub fn with_flags(mut self, blocks_view: bool, walkable: bool) -> Self {
        self.blocks_view = blocks_view;
        self.walkable = walkable;
        self
    }
}

/// How a biome spawns one object, and how the object spreads afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRule {
    /// Name of the [`WorldObject`] this rule places.
    pub object: String,
    /// Resolved object id, filled in on load.
    #[serde(skip)]
    pub object_id: u8,
    /// Accepted when a roll in `[0, rarity ceiling)` is below this.
    pub spawn_chance: u32,
    /// Selects the roll ceiling.
    #[serde(default)]
    pub rarity: Rarity,
    /// Empty cells adopt this object when at least this many neighbors carry it.
    #[serde(default)]
    pub min_neighbors_growth: Option<u32>,
    /// Instances die when fewer than this many neighbors carry the same object.
    #[serde(default)]
    pub min_neighbors_survival: Option<u32>,
    /// Tint instances with the biome color instead of an object color.
    #[serde(default)]
    pub copy_biome_color: Option<bool>,
}

impl ObjectRule {
    /// Creates a static rule (no automaton behavior).
    #[must_use]
    pub fn new(object: impl Into<String>, spawn_chance: u32, rarity: Rarity) -> Self {
        Self {
            object: object.into(),
            object_id: 0,
            spawn_chance,
            rarity,
            min_neighbors_growth: None,
            min_neighbors_survival: None,
            copy_biome_color: None,
        }
    }

    /// Sets the growth threshold.
    #[must_use]
    pub fn with_growth(mut self, min_neighbors: u32) -> Self {
        self.min_neighbors_growth = Some(min_neighbors);
        self
    }

    /// Sets the survival threshold.
    #[must_use]
    pub fn with_survival(mut self, min_neighbors: u32) -> Self {
        self.min_neighbors_survival = Some(min_neighbors);
        self
    }

    /// Tints instances with the biome color.
    #[must_use]
    pub fn with_biome_color(mut self) -> Self {
        self.copy_biome_color = Some(true);
        self
    }

    /// Whether the cellular automaton acts on this rule at all.
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        self.min_neighbors_growth.is_some() || self.min_neighbors_survival.is_some()
    }

    /// Whether instances take the biome color.
    #[must_use]
    pub fn copies_biome_color(&self) -> bool {
        self.copy_biome_color.unwrap_or(false)
    }
}

/// A terrain category with its color and spawnable objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Biome {
    /// Biome identifier.
    pub id: BiomeId,
    /// Human-readable name.
    #[serde(default)]
    pub display_name: String,
    /// Background color before border blending.
    pub color: Rgb,
    /// Spawn rules, in declaration order.
    #[serde(default)]
    pub objects: Vec<ObjectRule>,
}

impl Biome {
    /// Creates a biome without objects.
    #[must_use]
    pub fn new(id: BiomeId, color: Rgb) -> Self {
        Self {
            id,
            display_name: id.name().to_string(),
            color,
            objects: Vec::new(),
        }
    }

    /// Appends a spawn rule.
    #[must_use]
    pub fn with_rule(mut self, rule: ObjectRule) -> Self {
        self.objects.push(rule);
        self
    }

    /// Finds the rule placing `object_id`, if this biome declares it.
    #[must_use]
    pub fn rule_for(&self, object_id: u8) -> Option<&ObjectRule> {
        self.objects.iter().find(|r| r.object_id == object_id)
    }
}

/// On-disk layout of `biomes.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BiomeTable {
    /// Biomes in this file.
    #[serde(default)]
    pub biomes: Vec<Biome>,
}

/// On-disk layout of `objects.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectTable {
    /// Objects in this file, in id order.
    #[serde(default)]
    pub objects: Vec<WorldObject>,
}

/// Validated, read-only biome and object registry.
#[derive(Debug, Clone)]
pub struct WorldConfig {
    /// Biomes by id.
    biomes: AHashMap<BiomeId, Biome>,
    /// Objects by name.
    objects: AHashMap<String, WorldObject>,
    /// Object names indexed by id.
    names_by_id: Vec<String>,
}

impl WorldConfig {
    /// Builds a registry, assigning object ids in order and resolving every rule.
    pub fn new(biomes: Vec<Biome>, objects: Vec<WorldObject>) -> WorldGenResult<Self> {
        if objects.len() > MAX_OBJECTS {
            return Err(ConfigIntegrityError::ObjectIdOverflow(objects.len()).into());
        }

        let mut object_map = AHashMap::with_capacity(objects.len());
        let mut names_by_id = Vec::with_capacity(objects.len());
        for (index, mut object) in objects.into_iter().enumerate() {
            if object.glyphs.is_empty() {
                return Err(ConfigIntegrityError::EmptyGlyphSet(object.name).into());
            }
            if object.colors.is_empty() {
                return Err(ConfigIntegrityError::EmptyColorSet(object.name).into());
            }
            if object_map.contains_key(&object.name) {
                return Err(ConfigIntegrityError::DuplicateObject(object.name).into());
            }
            if object.display_name.is_empty() {
                object.display_name.clone_from(&object.name);
            }
            object.id = index as u8;
            names_by_id.push(object.name.clone());
            object_map.insert(object.name.clone(), object);
        }

        let mut biome_map = AHashMap::with_capacity(biomes.len());
        for mut biome in biomes {
            if biome_map.contains_key(&biome.id) {
                return Err(ConfigIntegrityError::DuplicateBiome(biome.id.to_string()).into());
            }
            for rule in &mut biome.objects {
                let object: &WorldObject =
                    object_map
                        .get(&rule.object)
                        .ok_or_else(|| ConfigIntegrityError::MissingObject {
                            biome: biome.id.to_string(),
                            object: rule.object.clone(),
                        })?;
                rule.object_id = object.id;
            }
            if biome.display_name.is_empty() {
                biome.display_name = biome.id.name().to_string();
            }
            biome_map.insert(biome.id, biome);
        }

        debug!(
            "World config built: {} biomes, {} objects",
            biome_map.len(),
            object_map.len()
        );

        Ok(Self {
            biomes: biome_map,
            objects: object_map,
            names_by_id,
        })
    }

    /// Parses both tables from TOML text.
    pub fn from_toml_str(biomes: &str, objects: &str) -> WorldGenResult<Self> {
        let biomes: BiomeTable = toml::from_str(biomes).map_err(ConfigLoadError::from)?;
        let objects: ObjectTable = toml::from_str(objects).map_err(ConfigLoadError::from)?;
        Self::new(biomes.biomes, objects.objects)
    }

    /// Loads `biomes.toml` and `objects.toml` from a directory.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> WorldGenResult<Self> {
        let dir = dir.as_ref();
        let biomes = read_table(dir.join(BIOMES_FILE))?;
        let objects = read_table(dir.join(OBJECTS_FILE))?;
        let config = Self::from_toml_str(&biomes, &objects)?;
        info!(
            "Loaded world config from {}: {} biomes, {} objects",
            dir.display(),
            config.biome_count(),
            config.object_count()
        );
        Ok(config)
    }

    /// The tables shipped with the crate.
    pub fn builtin() -> WorldGenResult<Self> {
        Self::from_toml_str(BUILTIN_BIOMES, BUILTIN_OBJECTS)
    }

    /// Gets a biome, failing if the table does not define it.
    pub fn biome(&self, id: BiomeId) -> Result<&Biome, ConfigIntegrityError> {
        self.biomes
            .get(&id)
            .ok_or_else(|| ConfigIntegrityError::MissingBiome(id.to_string()))
    }

    /// Gets an object by name.
    pub fn object(&self, name: &str) -> Result<&WorldObject, ConfigIntegrityError> {
        self.objects
            .get(name)
            .ok_or_else(|| ConfigIntegrityError::MissingObject {
                biome: String::new(),
                object: name.to_string(),
            })
    }

    /// Gets an object by its byte id.
    pub fn object_by_id(&self, id: u8) -> Result<&WorldObject, ConfigIntegrityError> {
        self.names_by_id
            .get(usize::from(id))
            .and_then(|name| self.objects.get(name))
            .ok_or(ConfigIntegrityError::UnknownObjectId(id))
    }

    /// Biomes the classifier can produce (plus `Border`) that this table lacks.
    #[must_use]
    pub fn missing_biomes(&self) -> Vec<BiomeId> {
        BiomeId::CLASSIFIABLE
            .iter()
            .chain(std::iter::once(&BiomeId::Border))
            .filter(|id| !self.biomes.contains_key(id))
            .copied()
            .collect()
    }

    /// Number of biomes.
    #[must_use]
    pub fn biome_count(&self) -> usize {
        self.biomes.len()
    }

    /// Number of objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

fn read_table(path: PathBuf) -> Result<String, ConfigLoadError> {
    fs::read_to_string(&path).map_err(|source| ConfigLoadError::Io { path, source })
}
