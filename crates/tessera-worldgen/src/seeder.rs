//! Rarity-weighted initial object placement.
//!
//! Every rule of a cell's biome rolls independently against its rarity
//! ceiling; one of the accepted rules is then picked uniformly.

use fastrand::Rng;
use tessera_common::{ConfigIntegrityError, Rgb};

use crate::biome::BiomeId;
use crate::chunk::ObjectInstance;
use crate::config::{Biome, ObjectRule, WorldConfig, WorldObject};

/// Rolls the spawn gate of one rule.
///
/// Draws uniformly from `[0, ceiling)` and accepts when the draw is below
/// `spawn_chance`, so a Normal rule with chance 100 always passes.
pub fn roll_rule(rng: &mut Rng, rule: &ObjectRule) -> bool {
    rng.u32(0..rule.rarity.roll_ceiling()) < rule.spawn_chance
}

/// Picks at most one rule from a biome.
pub fn pick_rule<'a>(rng: &mut Rng, biome: &'a Biome) -> Option<&'a ObjectRule> {
    if biome.objects.is_empty() {
        return None;
    }
    let accepted: Vec<&ObjectRule> = biome
        .objects
        .iter()
        .filter(|rule| roll_rule(rng, rule))
        .collect();
    if accepted.is_empty() {
        return None;
    }
    Some(accepted[rng.usize(..accepted.len())])
}

/// Creates a concrete placement of `object` under `rule`.
pub fn instantiate(
    rng: &mut Rng,
    object: &WorldObject,
    rule: &ObjectRule,
    biome_color: Rgb,
) -> Result<ObjectInstance, ConfigIntegrityError> {
    let glyph = rng
        .choice(object.glyphs.iter().copied())
        .ok_or_else(|| ConfigIntegrityError::EmptyGlyphSet(object.name.clone()))?;
    let color = if rule.copies_biome_color() {
        biome_color
    } else {
        rng.choice(object.colors.iter().copied())
            .ok_or_else(|| ConfigIntegrityError::EmptyColorSet(object.name.clone()))?
    };
    let mirrored = object.mirror && rng.bool();
    Ok(ObjectInstance {
        object_id: object.id,
        glyph,
        color,
        mirrored,
        blocks_view: object.blocks_view,
        walkable: object.walkable,
    })
}

/// Seeds one object slot per cell, row-major.
pub fn seed_objects(
    rng: &mut Rng,
    config: &WorldConfig,
    biomes: &[BiomeId],
) -> Result<Vec<Option<ObjectInstance>>, ConfigIntegrityError> {
    let mut objects = Vec::with_capacity(biomes.len());
    for &id in biomes {
        let biome = config.biome(id)?;
        let placed = match pick_rule(rng, biome) {
            Some(rule) => {
                let object = config.object_by_id(rule.object_id)?;
                Some(instantiate(rng, object, rule, biome.color)?)
            },
            None => None,
        };
        objects.push(placed);
    }
    Ok(objects)
}
