use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::model::{GeoCoord, TileConstraints, Viewport};
use crate::{MapStitchError, StatusOr};

pub mod overlay;

use overlay::{Marker, Path, StyleRule, serialize_marker, serialize_path, serialize_style};

pub const STATIC_MAP_URL: &str = "https://maps.googleapis.com/maps/api/staticmap";

/// Decode one overlay option and turn every element into a query value
fn overlay_values<T, F>(param: &str, data: &Value, serialize: F) -> StatusOr<Vec<String>>
where
    T: DeserializeOwned,
    F: Fn(&T) -> Result<String, String>,
{
    let malformed = |reason: String| MapStitchError::OverlayError {
        param: param.to_string(),
        reason,
    };

    let items: Vec<T> = serde_json::from_value(data.clone()).map_err(|e| malformed(e.to_string()))?;
    items
        .iter()
        .map(|item| serialize(item).map(|s| s.replace("color:#", "color:0x")).map_err(malformed))
        .collect()
}

fn option_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Build the provider URL for a tile centred on `center`.
///
/// The full request size is always asked for; `options` are appended after
/// the fixed parameters, with `style`, `markers` and `path` serialized as
/// overlays and everything else passed through unchanged.
pub fn build_query(
    center: GeoCoord,
    viewport: &Viewport,
    options: &Map<String, Value>,
    constraints: &TileConstraints,
) -> StatusOr<Url> {
    let mut url = Url::parse(STATIC_MAP_URL).map_err(|e| MapStitchError::OverlayError {
        param: "url".to_string(),
        reason: e.to_string(),
    })?;

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("center", &format!("{:.6},{:.6}", center.lat, center.lng))
            .append_pair("zoom", &viewport.zoom.to_string())
            .append_pair("scale", &viewport.scale.to_string())
            .append_pair(
                "size",
                &format!("{}x{}", constraints.max_request_width, constraints.max_request_height),
            );

        for (key, value) in options {
            let values = match key.as_str() {
                "style" => overlay_values::<StyleRule, _>(key, value, serialize_style)?,
                "markers" => overlay_values::<Marker, _>(key, value, serialize_marker)?,
                "path" => overlay_values::<Path, _>(key, value, serialize_path)?,
                _ => vec![option_value(value)],
            };
            for value in values {
                query.append_pair(key, &value);
            }
        }
    }

    Ok(url)
}
