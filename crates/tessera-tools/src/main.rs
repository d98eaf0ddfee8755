//! # Tessera Preview
//!
//! Generates a square of chunks and writes a PNG preview and/or prints the
//! object glyphs of the center chunk.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tessera_common::ChunkCoord;
use tessera_tools::{render_region, ChunkStore, DEFAULT_CELL_PIXELS};
use tessera_worldgen::{ChunkGenerator, GeneratorSettings, WorldConfig};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "tessera-preview", about = "Tessera chunk generation preview")]
struct CliOptions {
    /// World seed
    #[arg(long, default_value_t = 12345)]
    seed: u64,
    /// Chunk width in cells
    #[arg(long, default_value_t = 64)]
    width: u32,
    /// Chunk height in cells
    #[arg(long, default_value_t = 64)]
    height: u32,
    /// Center chunk x
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    x: i32,
    /// Center chunk y
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    y: i32,
    /// Chunks to render around the center
    #[arg(long, default_value_t = 1)]
    radius: u32,
    /// Directory holding biomes.toml and objects.toml (built-in tables if omitted)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Generator settings file (defaults if omitted)
    #[arg(long)]
    settings: Option<PathBuf>,
    /// PNG output path
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Pixels per cell in the PNG
    #[arg(long, default_value_t = DEFAULT_CELL_PIXELS)]
    scale: u32,
    /// Print the center chunk's object glyphs
    #[arg(long)]
    ascii: bool,
    /// Force chunk edges to the border biome
    #[arg(long)]
    debug_border: bool,
}

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("tessera=info".parse()?))
        .init();

    let cli = CliOptions::parse();
    info!("Tessera preview {}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(dir) => WorldConfig::load_from_dir(dir)
            .with_context(|| format!("loading world config from {}", dir.display()))?,
        None => WorldConfig::builtin().context("loading built-in world config")?,
    };
    let mut settings = cli
        .settings
        .as_ref()
        .map_or_else(GeneratorSettings::default, GeneratorSettings::load_from);
    settings.debug_border |= cli.debug_border;

    let generator = ChunkGenerator::new(Arc::new(config), settings)
        .for_seed(cli.seed)
        .context("building noise field")?;
    let store = ChunkStore::new(generator, cli.width, cli.height);
    let center = ChunkCoord::new(cli.x, cli.y);

    store
        .prefetch(center, cli.radius)
        .with_context(|| format!("generating chunks around {center}"))?;

    if let Some(path) = &cli.output {
        let image = render_region(&store, center, cli.radius, cli.scale)?;
        image
            .save(path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("Wrote {}x{} preview to {}", image.width(), image.height(), path.display());
    }

    let handle = store.get_or_generate(center)?;
    let chunk = handle.read();
    info!(
        "Chunk {center}: {} objects placed, {} distinct",
        chunk.objects().iter().flatten().count(),
        chunk.unique_objects().len()
    );
    if cli.ascii {
        print!("{}", chunk.render_ascii());
    }

    Ok(())
}
