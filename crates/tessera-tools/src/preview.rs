//! PNG rendering of generated chunks.

use image::{Rgb as Pixel, RgbImage};
use tessera_common::{ChunkCoord, Rgb, WorldGenResult};
use tessera_worldgen::Chunk;

use crate::store::ChunkStore;

/// Pixels per cell used when none is given.
pub const DEFAULT_CELL_PIXELS: u32 = 4;

/// Renders the square of chunks within `radius` of `center`.
///
/// Each cell is a `cell_pixels` square of its background color; cells with an
/// object get an inset square of the object color. Missing chunks are
/// generated through the store.
pub fn render_region(
    store: &ChunkStore,
    center: ChunkCoord,
    radius: u32,
    cell_pixels: u32,
) -> WorldGenResult<RgbImage> {
    let cell_pixels = cell_pixels.max(1);
    let side = 2 * radius + 1;
    let chunk_w = store.chunk_width() * cell_pixels;
    let chunk_h = store.chunk_height() * cell_pixels;
    let mut image = RgbImage::new(side * chunk_w, side * chunk_h);

    for coord in center.square_around(radius) {
        let handle = store.get_or_generate(coord)?;
        let chunk = handle.read();
        let offset_x = (coord.x - center.x + radius as i32) as u32 * chunk_w;
        let offset_y = (coord.y - center.y + radius as i32) as u32 * chunk_h;
        draw_chunk(&mut image, &chunk, offset_x, offset_y, cell_pixels);
    }

    Ok(image)
}

fn draw_chunk(image: &mut RgbImage, chunk: &Chunk, offset_x: u32, offset_y: u32, cell_pixels: u32) {
    let inset = cell_pixels / 4;
    for y in 0..chunk.height() {
        for x in 0..chunk.width() {
            let Some(cell) = chunk.cell(x, y) else {
                continue;
            };
            let px = offset_x + x * cell_pixels;
            let py = offset_y + y * cell_pixels;
            fill(image, px, py, cell_pixels, cell.background);
            if let Some(object) = cell.object {
                let size = cell_pixels - 2 * inset;
                fill(image, px + inset, py + inset, size, object.color);
            }
        }
    }
}

fn fill(image: &mut RgbImage, x: u32, y: u32, size: u32, color: Rgb) {
    let pixel = Pixel(color.to_array());
    for dy in 0..size {
        for dx in 0..size {
            image.put_pixel(x + dx, y + dy, pixel);
        }
    }
}
