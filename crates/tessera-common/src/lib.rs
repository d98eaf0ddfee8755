//! # Tessera Common
//!
//! Common types shared by the Tessera world generator and its tools:
//! - Coordinate types (world, chunk, local)
//! - RGB colors with `#rrggbb` serialization
//! - The world generation error taxonomy
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod color;
pub mod coords;
pub mod error;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::color::*;
    pub use crate::coords::*;
    pub use crate::error::*;
}

pub use prelude::*;
