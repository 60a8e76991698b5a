use log::debug;

use crate::model::{MAX_ZOOM, RelPixelCoord, SubRequest, TileConstraints, Viewport};
use crate::projection::rel_to_geo;
use crate::{MapStitchError, StatusOr};

/// Step between neighbouring requests, in output pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridStride {
    pub x: u32,
    pub y: u32,
}

impl GridStride {
    /// Rows step by the tile height minus the footer, so each row re-covers
    /// the band trimmed from the row above.
    pub fn new(constraints: &TileConstraints, scale: u32) -> Self {
        let (tile_width, tile_height) = constraints.tile_size(scale);
        Self {
            x: tile_width,
            y: tile_height - constraints.footer_height,
        }
    }
}

/// Check that a viewport and the provider limits describe a plannable grid
pub fn validate(viewport: &Viewport, constraints: &TileConstraints) -> StatusOr<()> {
    if viewport.width == 0 || viewport.height == 0 {
        return Err(MapStitchError::InvalidViewport(format!(
            "dimensions must be positive, got {}x{}",
            viewport.width, viewport.height
        )));
    }
    if viewport.scale == 0 {
        return Err(MapStitchError::InvalidViewport("scale must be positive".to_string()));
    }
    if viewport.zoom > MAX_ZOOM {
        return Err(MapStitchError::InvalidViewport(format!(
            "zoom {} is above the maximum of {}",
            viewport.zoom, MAX_ZOOM
        )));
    }
    if !viewport.center.lat.is_finite() || !viewport.center.lng.is_finite() {
        return Err(MapStitchError::InvalidViewport(format!(
            "center ({}, {}) is not a finite coordinate",
            viewport.center.lat, viewport.center.lng
        )));
    }
    if constraints.max_request_width == 0 || constraints.footer_height >= constraints.max_request_height {
        return Err(MapStitchError::InvalidViewport(format!(
            "tile limits {}x{} with a {} pixel footer leave nothing to paste",
            constraints.max_request_width, constraints.max_request_height, constraints.footer_height
        )));
    }

    let too_large = |what: &str| {
        MapStitchError::InvalidViewport(format!(
            "{} overflows at scale {} ({}x{} output, {}x{} tiles)",
            what,
            viewport.scale,
            viewport.width,
            viewport.height,
            constraints.max_request_width,
            constraints.max_request_height
        ))
    };
    let canvas_width = viewport.width.checked_mul(viewport.scale).ok_or_else(|| too_large("canvas width"))?;
    let canvas_height = viewport.height.checked_mul(viewport.scale).ok_or_else(|| too_large("canvas height"))?;
    constraints
        .max_request_width
        .checked_mul(viewport.scale)
        .ok_or_else(|| too_large("tile width"))?;
    constraints
        .max_request_height
        .checked_mul(viewport.scale)
        .ok_or_else(|| too_large("tile height"))?;

    // RGBA canvas buffer must be addressable
    (canvas_width as u64)
        .checked_mul(canvas_height as u64)
        .and_then(|pixels| pixels.checked_mul(4))
        .and_then(|bytes| usize::try_from(bytes).ok())
        .ok_or_else(|| too_large("canvas buffer"))?;

    Ok(())
}

/// Determine all the requests needed to cover the viewport.
///
/// Requests come out column by column, top to bottom within a column. The
/// last column and row may hang past the edge of the output image.
pub fn compute_requests(viewport: &Viewport, constraints: &TileConstraints) -> StatusOr<Vec<SubRequest>> {
    validate(viewport, constraints)?;

    let stride = GridStride::new(constraints, viewport.scale);
    let (tile_width, tile_height) = constraints.tile_size(viewport.scale);
    let canvas_width = viewport.canvas_width();
    let canvas_height = viewport.canvas_height();

    // u64 so stepping past the last column or row cannot wrap
    let mut requests = Vec::new();
    let mut x = 0u64;
    while x < canvas_width as u64 {
        let center_x = x as f64 + tile_width as f64 / 2.0;

        let mut y = 0u64;
        while y < canvas_height as u64 {
            // Center of the full tile, footer included
            let center_y = y as f64 + tile_height as f64 / 2.0;
            let center = rel_to_geo(RelPixelCoord::new(center_x, center_y), viewport);

            requests.push(SubRequest {
                center,
                placement: RelPixelCoord::new(x as f64, y as f64),
            });

            y += stride.y as u64;
        }

        x += stride.x as u64;
    }

    debug!(
        "Planned {} requests for a {}x{} image",
        requests.len(),
        canvas_width,
        canvas_height
    );

    Ok(requests)
}
