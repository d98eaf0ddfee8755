//! Generated chunk data.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tessera_common::{ChunkCoord, LocalCoord, Rgb};

use crate::biome::BiomeId;

/// A placed decorative object.
///
/// Equality is structural, so identical placements de-duplicate in sets and
/// maps regardless of which cell they came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectInstance {
    /// Id of the [`WorldObject`](crate::config::WorldObject) placed.
    pub object_id: u8,
    /// Glyph picked from the object's glyph set.
    pub glyph: char,
    /// Tint picked from the object's colors, or the biome color.
    pub color: Rgb,
    /// Drawn flipped horizontally.
    pub mirrored: bool,
    /// Copied from the object.
    pub blocks_view: bool,
    /// Copied from the object.
    pub walkable: bool,
}

/// One generated cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Biome classification.
    pub biome: BiomeId,
    /// Blended background color.
    pub background: Rgb,
    /// Decorative object, if any.
    pub object: Option<ObjectInstance>,
    /// Set by the field-of-view layer once the cell has been seen.
    pub explored: bool,
    /// Set by the field-of-view layer while the cell is in view.
    pub visible: bool,
}

impl Cell {
    /// Creates an unexplored, invisible cell.
    #[must_use]
    pub const fn new(biome: BiomeId, background: Rgb, object: Option<ObjectInstance>) -> Self {
        Self {
            biome,
            background,
            object,
            explored: false,
            visible: false,
        }
    }
}

/// A fully generated, rectangular block of cells.
///
/// Content is fixed after generation; only the `explored`/`visible` flags may
/// change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Chunk coordinate
    coord: ChunkCoord,
    /// Width in cells
    width: u32,
    /// Height in cells
    height: u32,
    /// World seed the chunk was generated from
    seed: u64,
    /// Cell data, row-major
    cells: Vec<Cell>,
}

impl Chunk {
    /// Wraps generated cells. `cells.len()` must equal `width * height`.
    pub(crate) fn from_cells(
        coord: ChunkCoord,
        width: u32,
        height: u32,
        seed: u64,
        cells: Vec<Cell>,
    ) -> Self {
        debug_assert_eq!(cells.len(), width as usize * height as usize);
        Self {
            coord,
            width,
            height,
            seed,
            cells,
        }
    }

    /// Returns the chunk coordinate.
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Returns the width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Returns the world seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(LocalCoord::new(x as u16, y as u16).to_index(self.width))
    }

    /// Gets a cell at local coordinates.
    #[must_use]
    pub fn cell(&self, x: u32, y: u32) -> Option<&Cell> {
        self.index(x, y).and_then(|i| self.cells.get(i))
    }

    /// Marks a cell as explored. Returns false if out of bounds.
    pub fn set_explored(&mut self, x: u32, y: u32, explored: bool) -> bool {
        match self.index(x, y).and_then(|i| self.cells.get_mut(i)) {
            Some(cell) => {
                cell.explored = explored;
                true
            },
            None => false,
        }
    }

    /// Marks a cell as visible. Returns false if out of bounds.
    pub fn set_visible(&mut self, x: u32, y: u32, visible: bool) -> bool {
        match self.index(x, y).and_then(|i| self.cells.get_mut(i)) {
            Some(cell) => {
                cell.visible = visible;
                true
            },
            None => false,
        }
    }

    /// Clears the visible flag on every cell.
    pub fn clear_visible(&mut self) {
        for cell in &mut self.cells {
            cell.visible = false;
        }
    }

    /// Returns a slice of all cells.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Biome bytes, row-major.
    #[must_use]
    pub fn cell_types(&self) -> Vec<u8> {
        self.cells.iter().map(|c| c.biome.as_byte()).collect()
    }

    /// Background colors, row-major.
    #[must_use]
    pub fn colors(&self) -> Vec<Rgb> {
        self.cells.iter().map(|c| c.background).collect()
    }

    /// Objects, row-major.
    #[must_use]
    pub fn objects(&self) -> Vec<Option<ObjectInstance>> {
        self.cells.iter().map(|c| c.object).collect()
    }

    /// Every distinct placed object.
    #[must_use]
    pub fn unique_objects(&self) -> HashSet<ObjectInstance> {
        self.cells.iter().filter_map(|c| c.object).collect()
    }

    /// One line per row: object glyphs, `.` for empty cells.
    #[must_use]
    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width as usize + 1) * self.height as usize);
        for row in self.cells.chunks(self.width as usize) {
            out.extend(row.iter().map(|c| c.object.map_or('.', |o| o.glyph)));
            out.push('\n');
        }
        out
    }
}
