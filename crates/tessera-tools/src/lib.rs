//! # Tessera Tools
//!
//! Development tools for the Tessera world generator:
//! - In-memory chunk store with parallel prefetch
//! - PNG preview rendering

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod preview;
pub mod store;

pub use preview::{render_region, DEFAULT_CELL_PIXELS};
pub use store::{ChunkHandle, ChunkStore};
