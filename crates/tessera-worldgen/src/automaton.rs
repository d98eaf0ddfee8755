//! Cellular-automaton refinement of seeded objects.
//!
//! Each pass reads a frozen copy of the previous grid and writes a new one, so
//! updates within a pass never observe each other. Only neighbors in the same
//! biome are counted, and biome ids are never modified.

use fastrand::Rng;
use serde::{Deserialize, Serialize};
use tessera_common::{InvalidParameterError, WorldGenResult};
use tracing::{debug, warn};

use crate::biome::BiomeId;
use crate::chunk::ObjectInstance;
use crate::config::WorldConfig;
use crate::seeder::instantiate;

/// Default number of passes.
pub const DEFAULT_PASSES: u32 = 3;

/// Which neighbors a cell counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Neighborhood {
    /// All 8 surrounding cells.
    #[default]
    Moore,
    /// The 4 axis-adjacent cells.
    VonNeumann,
}

impl Neighborhood {
    const MOORE: [(i32, i32); 8] = [
        (-1, -1),
        (0, -1),
        (1, -1),
        (-1, 0),
        (1, 0),
        (-1, 1),
        (0, 1),
        (1, 1),
    ];
    const VON_NEUMANN: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

    /// Neighbor offsets in enumeration order.
    #[must_use]
    pub const fn offsets(self) -> &'static [(i32, i32)] {
        match self {
            Self::Moore => &Self::MOORE,
            Self::VonNeumann => &Self::VON_NEUMANN,
        }
    }
}

/// Grows and thins objects according to their biome rules.
#[derive(Debug, Clone, Copy)]
pub struct CellularAutomaton<'a> {
    config: &'a WorldConfig,
    neighborhood: Neighborhood,
    passes: u32,
}

impl<'a> CellularAutomaton<'a> {
    /// Creates an automaton. A pass count of zero is raised to one.
    #[must_use]
    pub fn new(config: &'a WorldConfig, neighborhood: Neighborhood, passes: u32) -> Self {
        let passes = if passes == 0 {
            warn!("Automaton pass count 0 is not allowed, using 1");
            1
        } else {
            passes
        };
        Self {
            config,
            neighborhood,
            passes,
        }
    }

    /// Configured maximum number of passes.
    #[must_use]
    pub const fn passes(&self) -> u32 {
        self.passes
    }

    /// Refines `objects` in place and returns the number of passes run.
    ///
    /// Stops early once a pass changes nothing.
    pub fn run(
        &self,
        rng: &mut Rng,
        biomes: &[BiomeId],
        objects: &mut Vec<Option<ObjectInstance>>,
        width: u32,
        height: u32,
    ) -> WorldGenResult<u32> {
        check_grid(biomes.len(), width, height)?;
        check_grid(objects.len(), width, height)?;

        for pass in 1..=self.passes {
            let previous = objects.clone();
            let (next, changed) = self.step(rng, biomes, &previous, width, height)?;
            *objects = next;
            if !changed {
                debug!(pass, "Automaton reached a fixed point");
                return Ok(pass);
            }
        }
        Ok(self.passes)
    }

    /// Runs one synchronous pass over `previous`.
    ///
    /// Returns the new grid and whether any cell differs from `previous`.
    pub fn step(
        &self,
        rng: &mut Rng,
        biomes: &[BiomeId],
        previous: &[Option<ObjectInstance>],
        width: u32,
        height: u32,
    ) -> WorldGenResult<(Vec<Option<ObjectInstance>>, bool)> {
        check_grid(biomes.len(), width, height)?;
        check_grid(previous.len(), width, height)?;
        let mut next = previous.to_vec();
        let mut changed = false;
        let mut counts: Vec<(u8, u32)> = Vec::with_capacity(8);

        for y in 0..height {
            for x in 0..width {
                let index = (y * width + x) as usize;
                let biome_id = biomes[index];
                let biome = self.config.biome(biome_id)?;

                // Objects whose rule sets neither threshold are static.
                let current = match previous[index] {
                    Some(current) => match biome.rule_for(current.object_id) {
                        Some(rule) if rule.is_dynamic() => Some((current, rule)),
                        _ => continue,
                    },
                    None => None,
                };

                counts.clear();
                for (nx, ny) in self.neighbors(x, y, width, height) {
                    let n = (ny * width + nx) as usize;
                    if biomes[n] != biome_id {
                        continue;
                    }
                    if let Some(neighbor) = previous[n] {
                        match counts.iter_mut().find(|(id, _)| *id == neighbor.object_id) {
                            Some((_, count)) => *count += 1,
                            None => counts.push((neighbor.object_id, 1)),
                        }
                    }
                }

                match current {
                    None => {
                        let Some((object_id, count)) = most_frequent(&counts) else {
                            continue;
                        };
                        let Some(rule) = biome.rule_for(object_id).filter(|r| r.is_dynamic()) else {
                            continue;
                        };
                        if rule.min_neighbors_growth.is_some_and(|min| count >= min) {
                            let object = self.config.object_by_id(object_id)?;
                            next[index] = Some(instantiate(rng, object, rule, biome.color)?);
                            changed = true;
                        }
                    },
                    Some((current, rule)) => {
                        let same = counts
                            .iter()
                            .find(|(id, _)| *id == current.object_id)
                            .map_or(0, |(_, c)| *c);
                        if rule.min_neighbors_survival.is_some_and(|min| same < min) {
                            next[index] = None;
                            changed = true;
                        }
                    },
                }
            }
        }

        Ok((next, changed))
    }

    fn neighbors(
        &self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> impl Iterator<Item = (u32, u32)> + 'static {
        let (x, y) = (x as i64, y as i64);
        let (w, h) = (i64::from(width), i64::from(height));
        self.neighborhood
            .offsets()
            .iter()
            .map(move |&(dx, dy)| (x + i64::from(dx), y + i64::from(dy)))
            .filter(move |&(nx, ny)| nx >= 0 && ny >= 0 && nx < w && ny < h)
            .map(|(nx, ny)| (nx as u32, ny as u32))
    }
}

/// Rejects a grid whose length does not match `width` × `height`.
pub(crate) fn check_grid(len: usize, width: u32, height: u32) -> Result<(), InvalidParameterError> {
    let expected = width as usize * height as usize;
    if len == expected {
        Ok(())
    } else {
        Err(InvalidParameterError::GridSizeMismatch {
            expected,
            actual: len,
        })
    }
}

/// Highest count, ties resolved by first appearance in neighbor order.
fn most_frequent(counts: &[(u8, u32)]) -> Option<(u8, u32)> {
    counts
        .iter()
        .copied()
        .fold(None, |best: Option<(u8, u32)>, entry| match best {
            Some(b) if b.1 >= entry.1 => Some(b),
            _ => Some(entry),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Biome, ObjectRule, Rarity, WorldObject};
    use crate::seeder::seed_objects;
    use tessera_common::{ConfigIntegrityError, Rgb, WorldGenError};

    const TREE: u8 = 0;
    const ROCK: u8 = 1;

    fn config(tree_rule: ObjectRule) -> WorldConfig {
        let objects = vec![
            WorldObject::new("tree", vec!['T'], vec![Rgb::new(0, 100, 0)]),
            WorldObject::new("rock", vec!['o'], vec![Rgb::new(100, 100, 100)]),
        ];
        let forest = Biome::new(BiomeId::TemperateForest, Rgb::new(50, 90, 40))
            .with_rule(tree_rule)
            .with_rule(ObjectRule::new("rock", 10, Rarity::Normal));
        let grass = Biome::new(BiomeId::Grassland, Rgb::new(90, 150, 60))
            .with_rule(ObjectRule::new("tree", 10, Rarity::Normal).with_growth(1));
        WorldConfig::new(vec![forest, grass], objects).expect("config")
    }

    fn instance(config: &WorldConfig, id: u8) -> ObjectInstance {
        let object = config.object_by_id(id).expect("object");
        ObjectInstance {
            object_id: id,
            glyph: object.glyphs[0],
            color: object.colors[0],
            mirrored: false,
            blocks_view: object.blocks_view,
            walkable: object.walkable,
        }
    }

    fn grid(config: &WorldConfig, rows: &[&str]) -> Vec<Option<ObjectInstance>> {
        rows.iter()
            .flat_map(|row| row.chars())
            .map(|c| match c {
                'T' => Some(instance(config, TREE)),
                'o' => Some(instance(config, ROCK)),
                _ => None,
            })
            .collect()
    }

    fn render(objects: &[Option<ObjectInstance>], width: usize) -> Vec<String> {
        objects
            .chunks(width)
            .map(|row| row.iter().map(|o| o.map_or('.', |i| i.glyph)).collect())
            .collect()
    }

    #[test]
    fn test_growth_fills_adjacent_cells() {
        let config = config(ObjectRule::new("tree", 10, Rarity::Normal).with_growth(3));
        let biomes = vec![BiomeId::TemperateForest; 25];
        let mut objects = grid(&config, &["TTTTT", "TTTTT", ".....", ".....", "....."]);
        let automaton = CellularAutomaton::new(&config, Neighborhood::Moore, 1);
        let mut rng = Rng::with_seed(1);
        automaton
            .run(&mut rng, &biomes, &mut objects, 5, 5)
            .expect("run");
        assert_eq!(
            render(&objects, 5),
            vec!["TTTTT", "TTTTT", ".TTT.", ".....", "....."]
        );
    }

    #[test]
    fn test_survival_clears_sparse_cells_in_same_pass() {
        let config = config(
            ObjectRule::new("tree", 10, Rarity::Normal)
                .with_growth(3)
                .with_survival(2),
        );
        let biomes = vec![BiomeId::TemperateForest; 25];
        let mut objects = grid(&config, &["TTT..", "TTT..", ".....", "....T", "....."]);
        let automaton = CellularAutomaton::new(&config, Neighborhood::Moore, 1);
        let mut rng = Rng::with_seed(2);
        automaton
            .run(&mut rng, &biomes, &mut objects, 5, 5)
            .expect("run");
        // (1,2) sees three trees above; (3,1) sees (2,0),(2,1) only; the lone tree dies.
        assert_eq!(
            render(&objects, 5),
            vec!["TTT..", "TTT..", ".T...", ".....", "....."]
        );
    }

    #[test]
    fn test_static_objects_are_conserved() {
        let config = config(
            ObjectRule::new("tree", 10, Rarity::Normal)
                .with_growth(1)
                .with_survival(8),
        );
        let biomes = vec![BiomeId::TemperateForest; 36];
        let mut objects = grid(
            &config,
            &["o.....", "..o...", "......", "o.o.o.", "......", ".....o"],
        );
        let before = objects.clone();
        let automaton = CellularAutomaton::new(&config, Neighborhood::Moore, 10);
        let mut rng = Rng::with_seed(3);
        let passes = automaton
            .run(&mut rng, &biomes, &mut objects, 6, 6)
            .expect("run");
        assert_eq!(objects, before);
        assert_eq!(passes, 1);
    }

    #[test]
    fn test_rocks_survive_while_trees_change() {
        let config = config(ObjectRule::new("tree", 10, Rarity::Normal).with_survival(1));
        let biomes = vec![BiomeId::TemperateForest; 9];
        let mut objects = grid(&config, &["o..", "...", "..T"]);
        let automaton = CellularAutomaton::new(&config, Neighborhood::Moore, 3);
        let mut rng = Rng::with_seed(4);
        automaton
            .run(&mut rng, &biomes, &mut objects, 3, 3)
            .expect("run");
        assert_eq!(render(&objects, 3), vec!["o..", "...", "..."]);
    }

    #[test]
    fn test_other_biomes_are_masked() {
        let config = config(ObjectRule::new("tree", 10, Rarity::Normal).with_growth(3));
        // Left column is grassland; its trees must not feed forest growth.
        let biomes: Vec<BiomeId> = (0..9)
            .map(|i| {
                if i % 3 == 0 {
                    BiomeId::Grassland
                } else {
                    BiomeId::TemperateForest
                }
            })
            .collect();
        let mut objects = grid(&config, &["TT.", "...", "TT."]);
        let automaton = CellularAutomaton::new(&config, Neighborhood::Moore, 1);
        let mut rng = Rng::with_seed(5);
        automaton
            .run(&mut rng, &biomes, &mut objects, 3, 3)
            .expect("run");
        // (1,1) counts only (1,0) and (1,2): two same-biome trees, below the threshold.
        // (0,1) is grassland (growth 1) and grows from (0,0) and (0,2).
        assert_eq!(render(&objects, 3), vec!["TT.", "T..", "TT."]);
    }

    #[test]
    fn test_von_neumann_ignores_diagonals() {
        let config = config(ObjectRule::new("tree", 10, Rarity::Normal).with_growth(2));
        let biomes = vec![BiomeId::TemperateForest; 9];
        let mut moore = grid(&config, &["T.T", "...", "..."]);
        let mut von_neumann = moore.clone();
        let mut rng = Rng::with_seed(6);
        CellularAutomaton::new(&config, Neighborhood::Moore, 1)
            .run(&mut rng, &biomes, &mut moore, 3, 3)
            .expect("run");
        CellularAutomaton::new(&config, Neighborhood::VonNeumann, 1)
            .run(&mut rng, &biomes, &mut von_neumann, 3, 3)
            .expect("run");
        assert_eq!(render(&moore, 3), vec!["TTT", ".T.", "..."]);
        assert_eq!(render(&von_neumann, 3), vec!["TTT", "...", "..."]);
    }

    #[test]
    fn test_most_frequent_neighbor_wins() {
        let config = config(ObjectRule::new("tree", 10, Rarity::Normal).with_growth(1));
        let biomes = vec![BiomeId::TemperateForest; 9];
        // Centre sees two rocks and one tree: rocks win, and rocks never grow.
        let mut objects = grid(&config, &["oo.", "...", "T.."]);
        let automaton = CellularAutomaton::new(&config, Neighborhood::Moore, 1);
        let mut rng = Rng::with_seed(7);
        let (next, _) = automaton
            .step(&mut rng, &biomes, &objects, 3, 3)
            .expect("step");
        assert!(next[4].is_none());
        objects[1] = None;
        let (next, _) = automaton
            .step(&mut rng, &biomes, &objects, 3, 3)
            .expect("step");
        // One rock, one tree: tie goes to the first seen (rock at (0,0)).
        assert!(next[4].is_none());
    }

    #[test]
    fn test_stable_grid_is_a_fixed_point() {
        // Growth-only rules never remove cells, so the grid must settle.
        let config = config(ObjectRule::new("tree", 10, Rarity::Normal).with_growth(3));
        let biomes = vec![BiomeId::TemperateForest; 16 * 16];
        let mut rng = Rng::with_seed(8);
        let mut objects = seed_objects(&mut rng, &config, &biomes).expect("seed");
        let automaton = CellularAutomaton::new(&config, Neighborhood::Moore, 300);
        let passes = automaton
            .run(&mut rng, &biomes, &mut objects, 16, 16)
            .expect("run");
        assert!(passes < 300, "did not settle");
        let settled = objects.clone();
        let rerun = automaton
            .run(&mut rng, &biomes, &mut objects, 16, 16)
            .expect("rerun");
        assert_eq!(rerun, 1);
        assert_eq!(objects, settled);
    }

    #[test]
    fn test_rule_without_thresholds_is_static() {
        let config = config(ObjectRule::new("tree", 10, Rarity::Normal));
        assert!(!config
            .biome(BiomeId::TemperateForest)
            .expect("forest")
            .rule_for(TREE)
            .expect("tree rule")
            .is_dynamic());
        let biomes = vec![BiomeId::TemperateForest; 9];
        // A lone tree and a dense cluster both stay as they are.
        let mut objects = grid(&config, &["T..", "...", ".TT"]);
        let before = objects.clone();
        let mut rng = Rng::with_seed(11);
        let passes = CellularAutomaton::new(&config, Neighborhood::Moore, 5)
            .run(&mut rng, &biomes, &mut objects, 3, 3)
            .expect("run");
        assert_eq!(objects, before);
        assert_eq!(passes, 1);
    }

    #[test]
    fn test_zero_passes_clamped_to_one() {
        let config = config(ObjectRule::new("tree", 10, Rarity::Normal));
        assert_eq!(CellularAutomaton::new(&config, Neighborhood::Moore, 0).passes(), 1);
    }

    #[test]
    fn test_missing_biome_is_fatal() {
        let config = config(ObjectRule::new("tree", 10, Rarity::Normal));
        let biomes = vec![BiomeId::Snow; 4];
        let mut objects = vec![None; 4];
        let mut rng = Rng::with_seed(9);
        let err = CellularAutomaton::new(&config, Neighborhood::Moore, 1)
            .run(&mut rng, &biomes, &mut objects, 2, 2)
            .expect_err("undefined biome");
        assert!(matches!(
            err,
            WorldGenError::ConfigIntegrity(ConfigIntegrityError::MissingBiome(name)) if name == "Snow"
        ));
    }

    #[test]
    fn test_mismatched_grid_is_rejected() {
        let config = config(ObjectRule::new("tree", 10, Rarity::Normal).with_growth(1));
        let automaton = CellularAutomaton::new(&config, Neighborhood::Moore, 1);
        let mut rng = Rng::with_seed(10);
        let biomes = vec![BiomeId::TemperateForest; 6];

        let mut short = vec![None; 4];
        let err = automaton
            .run(&mut rng, &biomes, &mut short, 3, 2)
            .expect_err("objects too short");
        assert!(matches!(
            err,
            WorldGenError::InvalidParameter(InvalidParameterError::GridSizeMismatch {
                expected: 6,
                actual: 4
            })
        ));

        let objects = vec![None; 6];
        assert!(automaton.step(&mut rng, &biomes, &objects, 4, 2).is_err());
        assert!(automaton.step(&mut rng, &biomes[..5], &objects, 3, 2).is_err());
    }
}
