use std::fs;
use std::path::Path;

use log::{info, warn};
use serde_json::{Map, Value};

use crate::StatusOr;
use crate::model::{GeoCoord, Viewport};

/// Settings used for any key the config file leaves out
pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 640;
pub const DEFAULT_ZOOM: u32 = 1;
pub const DEFAULT_SCALE: u32 = 1;
pub const DEFAULT_CENTER: GeoCoord = GeoCoord {
    lat: 40.7128,
    lng: -74.0060,
};

/// Parsed map configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub width: u32,
    pub height: u32,
    pub zoom: u32,
    pub scale: u32,
    pub center: GeoCoord,

    /// Extra provider parameters, passed through to the query builder
    pub options: Map<String, Value>,

    /// Keys that were missing or unusable and fell back to defaults
    pub defaulted: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            zoom: DEFAULT_ZOOM,
            scale: DEFAULT_SCALE,
            center: DEFAULT_CENTER,
            options: Map::new(),
            defaulted: Vec::new(),
        }
    }
}

impl Config {
    /// Parse a config from JSON text.
    ///
    /// Text that is not a JSON object is an error. Individual fields that are
    /// missing, zero, or of the wrong type are replaced with defaults and
    /// listed in `defaulted`.
    pub fn from_json_str(text: &str) -> StatusOr<Self> {
        let data: Map<String, Value> = serde_json::from_str(text)?;
        let mut config = Config::default();

        match positive_u32(&data, "width") {
            Some(width) => config.width = width,
            None => config.defaulted.push("width".to_string()),
        }
        match positive_u32(&data, "height") {
            Some(height) => config.height = height,
            None => config.defaulted.push("height".to_string()),
        }
        match data.get("zoom").and_then(Value::as_u64).and_then(|z| u32::try_from(z).ok()) {
            Some(zoom) => config.zoom = zoom,
            None => config.defaulted.push("zoom".to_string()),
        }
        match positive_u32(&data, "scale") {
            Some(scale) => config.scale = scale,
            None => config.defaulted.push("scale".to_string()),
        }
        // Object form only; `[lat, lng]` arrays are defaulted
        let center = match data.get("center") {
            Some(center @ Value::Object(_)) => serde_json::from_value::<GeoCoord>(center.clone()).ok(),
            _ => None,
        };
        match center {
            Some(center) => config.center = center,
            None => config.defaulted.push("center".to_string()),
        }

        match data.get("options") {
            Some(Value::Object(options)) => config.options = options.clone(),
            Some(Value::Null) | None => {}
            Some(other) => warn!("Ignoring options, expected an object but found {}", other),
        }

        Ok(config)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.width,
            height: self.height,
            zoom: self.zoom,
            scale: self.scale,
            center: self.center,
        }
    }
}

fn positive_u32(data: &Map<String, Value>, key: &str) -> Option<u32> {
    data.get(key)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .filter(|v| *v > 0)
}

/// Load a config file, telling the user about any keys that were defaulted
pub fn load_config<P: AsRef<Path>>(path: P) -> StatusOr<Config> {
    let path = path.as_ref();
    info!("Loading config from {}", path.display());

    let text = fs::read_to_string(path)?;
    let config = Config::from_json_str(&text)?;

    if !config.defaulted.is_empty() {
        warn!(
            "The following keys were unspecified and are being defaulted: {}",
            config.defaulted.join(", ")
        );
    }

    Ok(config)
}
