use thiserror::Error;

pub mod config;
pub mod download;
pub mod model;
pub mod planner;
pub mod projection;
pub mod query;
pub mod render;
pub mod stitch;

#[derive(Error, Debug)]
pub enum MapStitchError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ConfigError(#[from] serde_json::Error),

    #[error("Invalid viewport: {0}")]
    InvalidViewport(String),

    #[error("Malformed {param}: {reason}")]
    OverlayError { param: String, reason: String },

    #[error("Failed to fetch {url}: {reason}")]
    FetchError { url: String, reason: String },

    #[error(
        "Tile for placement ({x}, {y}) is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}"
    )]
    DimensionMismatch {
        x: f64,
        y: f64,
        actual_width: u32,
        actual_height: u32,
        expected_width: u32,
        expected_height: u32,
    },

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),
}

pub type StatusOr<T> = Result<T, MapStitchError>;
