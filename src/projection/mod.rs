//! Conversions between the coordinate frames used to plan tile requests.
//!
//! geo (degrees) <-> world (zoom 0 tile units) <-> absolute pixels (global
//! grid at a zoom) <-> output relative pixels (the stitched image).

use std::f64::consts::PI;

use crate::model::{AbsPixelCoord, GeoCoord, RelPixelCoord, Viewport, WorldCoord};

/// Pixel size of the single tile covering the world at zoom 0
pub const TILE_SIZE: f64 = 256.0;

// Limits latitude to about 89.189 degrees, a third of a tile past the edge
// of the world tile, so the logarithm below stays finite.
const SIN_LAT_LIMIT: f64 = 0.9999;

fn zoom_factor(zoom: u32) -> f64 {
    2f64.powi(zoom as i32)
}

/// Forward spherical Mercator projection
pub fn geo_to_world(geo: GeoCoord) -> WorldCoord {
    let sin_lat = (geo.lat * PI / 180.0).sin().clamp(-SIN_LAT_LIMIT, SIN_LAT_LIMIT);

    WorldCoord {
        x: TILE_SIZE * (0.5 + geo.lng / 360.0),
        y: TILE_SIZE * (0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI)),
    }
}

/// Inverse of [`geo_to_world`]
pub fn world_to_geo(world: WorldCoord) -> GeoCoord {
    let lng = 360.0 * (world.x / TILE_SIZE - 0.5);
    let exp = (4.0 * PI * (world.y / TILE_SIZE - 0.5)).exp();
    let lat = -180.0 / PI * (1.0 - 2.0 / (1.0 + exp)).asin();

    GeoCoord { lat, lng }
}

pub fn world_to_abs_pixel(world: WorldCoord, zoom: u32) -> AbsPixelCoord {
    let factor = zoom_factor(zoom);
    AbsPixelCoord {
        x: world.x * factor,
        y: world.y * factor,
    }
}

pub fn abs_pixel_to_world(abs: AbsPixelCoord, zoom: u32) -> WorldCoord {
    let factor = zoom_factor(zoom);
    WorldCoord {
        x: abs.x / factor,
        y: abs.y / factor,
    }
}

/// Locates a pixel of the output image in the global pixel grid.
///
/// Offsets are taken from the viewport's own center, so every point of the
/// output image shares whatever error the center projection carries.
pub fn rel_to_abs_pixel(rel: RelPixelCoord, viewport: &Viewport) -> AbsPixelCoord {
    let center = world_to_abs_pixel(geo_to_world(viewport.center), viewport.zoom);
    let scale = viewport.scale as f64;
    let dx = rel.x / scale - viewport.width as f64 / 2.0;
    let dy = rel.y / scale - viewport.height as f64 / 2.0;

    AbsPixelCoord {
        x: center.x + dx,
        y: center.y + dy,
    }
}

/// Geographic point shown at a pixel of the output image
pub fn rel_to_geo(rel: RelPixelCoord, viewport: &Viewport) -> GeoCoord {
    world_to_geo(abs_pixel_to_world(rel_to_abs_pixel(rel, viewport), viewport.zoom))
}
