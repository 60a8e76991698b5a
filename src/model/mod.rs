use serde::{Deserialize, Serialize};

/// Widest image the provider returns for a single request, in pixels at scale 1
pub const MAX_REQ_WIDTH: u32 = 640;

/// Tallest image the provider returns for a single request, in pixels at scale 1
pub const MAX_REQ_HEIGHT: u32 = 640;

/// Rows at the bottom of every provider tile taken up by the attribution footer
pub const FOOTER_HEIGHT: u32 = 20;

/// Highest zoom level the provider serves
pub const MAX_ZOOM: u32 = 22;

/// A point on the globe, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoord {
    pub lat: f64,
    pub lng: f64,
}

impl GeoCoord {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Zoom invariant projected coordinate, in units of the zoom 0 tile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldCoord {
    pub x: f64,
    pub y: f64,
}

/// Pixel coordinate in the provider's global pixel grid for a particular zoom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsPixelCoord {
    pub x: f64,
    pub y: f64,
}

/// Pixel coordinate relative to the output image.
///
/// The top left corner of the output image is (0, 0) and the bottom right
/// corner is (scale * width, scale * height).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelPixelCoord {
    pub x: f64,
    pub y: f64,
}

impl RelPixelCoord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The output image the user asked for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Output width in logical pixels (before scale)
    pub width: u32,

    /// Output height in logical pixels (before scale)
    pub height: u32,

    pub zoom: u32,

    /// Device pixel ratio multiplier passed to the provider
    pub scale: u32,

    /// Geographic point at the middle of the output image
    pub center: GeoCoord,
}

impl Viewport {
    /// Width of the stitched image in actual pixels
    pub fn canvas_width(&self) -> u32 {
        self.width * self.scale
    }

    /// Height of the stitched image in actual pixels
    pub fn canvas_height(&self) -> u32 {
        self.height * self.scale
    }
}

/// Fixed limits of the tile provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileConstraints {
    pub max_request_width: u32,
    pub max_request_height: u32,

    /// Attribution rows discarded from the bottom of every tile
    pub footer_height: u32,
}

impl TileConstraints {
    pub fn new(max_request_width: u32, max_request_height: u32, footer_height: u32) -> Self {
        Self {
            max_request_width,
            max_request_height,
            footer_height,
        }
    }

    /// Size of the image the provider returns for one request at `scale`
    pub fn tile_size(&self, scale: u32) -> (u32, u32) {
        (self.max_request_width * scale, self.max_request_height * scale)
    }
}

impl Default for TileConstraints {
    fn default() -> Self {
        Self::new(MAX_REQ_WIDTH, MAX_REQ_HEIGHT, FOOTER_HEIGHT)
    }
}

/// One planned provider call and where its tile goes in the output image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubRequest {
    /// Geographic center the provider must render the tile around
    pub center: GeoCoord,

    /// Top left corner of the output image region the tile is pasted at
    pub placement: RelPixelCoord,
}
