use std::path::Path;

use image::{DynamicImage, GenericImageView, RgbaImage, imageops};
use log::{debug, info};

use crate::model::{RelPixelCoord, TileConstraints, Viewport};
use crate::{MapStitchError, StatusOr};

/// Size every fetched tile must have, and the footer to drop from it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGeometry {
    pub width: u32,
    pub height: u32,
    pub footer_height: u32,
}

impl TileGeometry {
    pub fn new(constraints: &TileConstraints, scale: u32) -> Self {
        let (width, height) = constraints.tile_size(scale);
        Self {
            width,
            height,
            footer_height: constraints.footer_height,
        }
    }
}

/// Blank canvas the size of the stitched image
pub fn new_canvas(viewport: &Viewport) -> RgbaImage {
    RgbaImage::new(viewport.canvas_width(), viewport.canvas_height())
}

/// Paste tiles into the canvas at their planned placements.
///
/// The bottom `footer_height` rows of every tile are dropped. Anything hanging
/// past the canvas edge is clipped. Where trimmed tiles overlap, the later one
/// wins. A tile of the wrong size aborts the composite before anything is
/// pasted, leaving the canvas untouched.
pub fn composite<I>(canvas: &mut RgbaImage, tiles: I, geometry: &TileGeometry) -> StatusOr<()>
where
    I: IntoIterator<Item = (DynamicImage, RelPixelCoord)>,
{
    if geometry.width == 0 || geometry.footer_height >= geometry.height {
        return Err(MapStitchError::InvalidViewport(format!(
            "{}x{} tiles with a {} pixel footer leave nothing to paste",
            geometry.width, geometry.height, geometry.footer_height
        )));
    }
    let pasted_height = geometry.height - geometry.footer_height;

    let tiles: Vec<_> = tiles.into_iter().collect();
    for (tile, placement) in &tiles {
        let (width, height) = tile.dimensions();
        if (width, height) != (geometry.width, geometry.height) {
            return Err(MapStitchError::DimensionMismatch {
                x: placement.x,
                y: placement.y,
                actual_width: width,
                actual_height: height,
                expected_width: geometry.width,
                expected_height: geometry.height,
            });
        }
    }

    for (tile, placement) in tiles {
        let width = geometry.width;
        let tile = tile.to_rgba8();
        let trimmed = imageops::crop_imm(&tile, 0, 0, width, pasted_height).to_image();
        imageops::replace(canvas, &trimmed, placement.x.round() as i64, placement.y.round() as i64);

        debug!("Pasted {}x{} tile at ({}, {})", width, pasted_height, placement.x, placement.y);
    }

    Ok(())
}

/// Write the stitched image; the format follows the file extension
pub fn save_canvas<P: AsRef<Path>>(canvas: RgbaImage, path: P) -> StatusOr<()> {
    let path = path.as_ref();
    let is_jpeg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false);

    // JPEG has no alpha channel
    let image = if is_jpeg {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8())
    } else {
        DynamicImage::ImageRgba8(canvas)
    };

    image.save(path)?;
    info!("Wrote {}x{} map to {}", image.width(), image.height(), path.display());
    Ok(())
}
