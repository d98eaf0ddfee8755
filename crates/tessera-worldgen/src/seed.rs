//! Seed derivation.
//!
//! All randomness in a chunk flows from the world seed and the chunk
//! coordinate, so regenerating a chunk reproduces it bit for bit.

use tessera_common::ChunkCoord;

/// Salt mixed into the elevation noise seed.
pub const ELEVATION_SALT: u64 = 0x00E1_E7A7_10A0;
/// Salt mixed into the moisture noise seed.
pub const MOISTURE_SALT: u64 = 0x0000_4D01_5700;

/// SplitMix64 finalizer.
#[must_use]
pub const fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed of the per-chunk RNG.
#[must_use]
pub const fn chunk_seed(world_seed: u64, coord: ChunkCoord) -> u64 {
    let x = coord.x as u32 as u64;
    let y = coord.y as u32 as u64;
    mix(mix(world_seed) ^ mix((x << 32) | y))
}

/// Seed of one noise layer.
#[must_use]
pub const fn noise_seed(world_seed: u64, salt: u64, layer_offset: u32) -> u32 {
    let mixed = mix(world_seed ^ mix(salt.wrapping_add(layer_offset as u64)));
    (mixed >> 32) as u32
}
