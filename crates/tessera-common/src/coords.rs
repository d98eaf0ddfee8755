//! Coordinate types for world, chunk, and local positions.
//!
//! Chunks are rectangular (`width` × `height` cells), so every conversion
//! takes both dimensions. Cell arrays are row-major: `index = y * width + x`.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// World coordinate in cells (global position).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct WorldCoord {
    /// X coordinate in world space
    pub x: i64,
    /// Y coordinate in world space
    pub y: i64,
}

impl WorldCoord {
    /// Creates a new world coordinate.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Converts to the coordinate of the chunk containing this cell.
    #[must_use]
    pub const fn to_chunk_coord(self, width: u32, height: u32) -> ChunkCoord {
        ChunkCoord {
            x: self.x.div_euclid(width as i64) as i32,
            y: self.y.div_euclid(height as i64) as i32,
        }
    }

    /// Converts to the local coordinate within its chunk.
    #[must_use]
    pub const fn to_local_coord(self, width: u32, height: u32) -> LocalCoord {
        LocalCoord {
            x: self.x.rem_euclid(width as i64) as u16,
            y: self.y.rem_euclid(height as i64) as u16,
        }
    }
}

/// Chunk coordinate (identifies a chunk in the world grid).
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable,
)]
#[repr(C)]
pub struct ChunkCoord {
    /// X coordinate in chunk space
    pub x: i32,
    /// Y coordinate in chunk space
    pub y: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Converts to world coordinate (top-left corner of chunk).
    #[must_use]
    pub const fn to_world_coord(self, width: u32, height: u32) -> WorldCoord {
        WorldCoord {
            x: (self.x as i64) * (width as i64),
            y: (self.y as i64) * (height as i64),
        }
    }

    /// Iterates over every chunk coordinate within `radius` chunks of this one
    /// (a square, row by row).
    pub fn square_around(self, radius: u32) -> impl Iterator<Item = ChunkCoord> {
        let r = radius as i32;
        (-r..=r).flat_map(move |dy| (-r..=r).map(move |dx| ChunkCoord::new(self.x + dx, self.y + dy)))
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Local coordinate within a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct LocalCoord {
    /// X coordinate within chunk
    pub x: u16,
    /// Y coordinate within chunk
    pub y: u16,
}

impl LocalCoord {
    /// Creates a new local coordinate.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Converts to linear index for array access.
    #[must_use]
    pub const fn to_index(self, width: u32) -> usize {
        (self.y as usize) * (width as usize) + (self.x as usize)
    }

    /// Creates from linear index.
    #[must_use]
    pub const fn from_index(index: usize, width: u32) -> Self {
        let w = width as usize;
        Self {
            x: (index % w) as u16,
            y: (index / w) as u16,
        }
    }
}
