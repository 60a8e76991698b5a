//! Serialization of the style, marker and path overlays accepted by the
//! static map API.
//!
//! Each overlay option is an array in the config; every element becomes one
//! query parameter made of `key:value` pairs joined with `|`.

use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::model::GeoCoord;

/// A marker or path vertex: either coordinates or a free text address
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Location {
    Coord(GeoCoord),
    Address(String),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Coord(coord) => write!(f, "{},{}", coord.lat, coord.lng),
            Location::Address(address) => write!(f, "{}", address),
        }
    }
}

/// One map styling rule
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRule {
    pub feature_type: Option<String>,
    pub element_type: Option<String>,
    pub stylers: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Top,
    Bottom,
    Left,
    Right,
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Anchor {
    fn as_str(&self) -> &'static str {
        match self {
            Anchor::Top => "top",
            Anchor::Bottom => "bottom",
            Anchor::Left => "left",
            Anchor::Right => "right",
            Anchor::Center => "center",
            Anchor::TopLeft => "topleft",
            Anchor::TopRight => "topright",
            Anchor::BottomLeft => "bottomleft",
            Anchor::BottomRight => "bottomright",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerSize {
    Tiny,
    Mid,
    Small,
}

impl MarkerSize {
    fn as_str(&self) -> &'static str {
        match self {
            MarkerSize::Tiny => "tiny",
            MarkerSize::Mid => "mid",
            MarkerSize::Small => "small",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IconMarker {
    pub icon: String,
    pub anchor: Option<Anchor>,
}

/// Built-in pin. Unknown keys are rejected so a broken icon marker cannot
/// quietly turn into a plain pin.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyledMarker {
    pub size: Option<MarkerSize>,
    pub color: Option<String>,
    pub label: Option<String>,
}

/// Marker appearance. Custom icons take precedence over the styled form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MarkerStyle {
    Icon(IconMarker),
    Styled(StyledMarker),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Marker {
    pub style: Option<MarkerStyle>,
    pub locations: Vec<Location>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Path {
    pub weight: Option<f64>,
    pub color: Option<String>,
    pub fillcolor: Option<String>,
    pub geodesic: Option<bool>,
    pub locations: Vec<Location>,
}

/// Collects `key:value` pairs and locations into one `|` separated string
#[derive(Default)]
struct Params {
    parts: Vec<String>,
}

impl Params {
    fn push(&mut self, key: &str, value: impl fmt::Display) {
        self.parts.push(format!("{}:{}", key, value));
    }

    fn push_opt(&mut self, key: &str, value: Option<impl fmt::Display>) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    fn push_locations(&mut self, locations: &[Location]) {
        self.parts.extend(locations.iter().map(Location::to_string));
    }

    fn finish(self) -> String {
        self.parts.join("|")
    }
}

fn styler_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn serialize_style(rule: &StyleRule) -> Result<String, String> {
    let mut params = Params::default();
    params.push_opt("feature", rule.feature_type.as_deref());
    params.push_opt("element", rule.element_type.as_deref());

    for styler in &rule.stylers {
        for (key, value) in styler {
            params.push(key, styler_value(value));
        }
    }

    Ok(params.finish())
}

/// Marker labels are a single upper case letter or digit
fn validate_label(label: &str) -> Result<(), String> {
    let mut chars = label.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_uppercase() || c.is_ascii_digit() => Ok(()),
        _ => Err(format!(
            "marker label {:?} must be a single upper-case letter or digit",
            label
        )),
    }
}

pub fn serialize_marker(marker: &Marker) -> Result<String, String> {
    let mut params = Params::default();

    match &marker.style {
        Some(MarkerStyle::Icon(icon)) => {
            params.push("icon", &icon.icon);
            params.push_opt("anchor", icon.anchor.map(|a| a.as_str()));
        }
        Some(MarkerStyle::Styled(styled)) => {
            params.push_opt("size", styled.size.map(|s| s.as_str()));
            params.push_opt("color", styled.color.as_deref());
            if let Some(label) = &styled.label {
                validate_label(label)?;
                params.push("label", label);
            }
        }
        None => {}
    }

    params.push_locations(&marker.locations);
    Ok(params.finish())
}

pub fn serialize_path(path: &Path) -> Result<String, String> {
    let mut params = Params::default();
    params.push_opt("weight", path.weight);
    params.push_opt("color", path.color.as_deref());
    params.push_opt("fillcolor", path.fillcolor.as_deref());
    params.push_opt("geodesic", path.geodesic);
    params.push_locations(&path.locations);
    Ok(params.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<T: for<'de> Deserialize<'de>>(json: &str) -> T {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_locations() {
        let locations: Vec<Location> = parse(r#"[{ "lat": 40.5, "lng": -74.25 }, "Brooklyn Bridge"]"#);
        assert_eq!(locations[0].to_string(), "40.5,-74.25");
        assert_eq!(locations[1].to_string(), "Brooklyn Bridge");
    }

    #[test]
    fn test_style_rule() {
        let rule: StyleRule = parse(
            r##"{ "featureType": "road", "elementType": "geometry", "stylers": [{ "color": "#ff0000" }, { "visibility": "simplified" }] }"##,
        );
        assert_eq!(
            serialize_style(&rule).unwrap(),
            "feature:road|element:geometry|color:#ff0000|visibility:simplified"
        );

        let rule: StyleRule = parse(r#"{ "stylers": [{ "saturation": -100 }] }"#);
        assert_eq!(serialize_style(&rule).unwrap(), "saturation:-100");
    }

    #[test]
    fn test_icon_marker() {
        let marker: Marker = parse(
            r#"{ "style": { "icon": "https://example.com/pin.png", "anchor": "bottomleft" }, "locations": ["Times Square"] }"#,
        );
        assert_eq!(
            serialize_marker(&marker).unwrap(),
            "icon:https://example.com/pin.png|anchor:bottomleft|Times Square"
        );
    }

    #[test]
    fn test_styled_marker() {
        let marker: Marker = parse(
            r#"{ "style": { "size": "mid", "color": "blue", "label": "S" }, "locations": [{ "lat": 1.5, "lng": 2.5 }, { "lat": 3, "lng": 4 }] }"#,
        );
        assert_eq!(
            serialize_marker(&marker).unwrap(),
            "size:mid|color:blue|label:S|1.5,2.5|3,4"
        );
    }

    #[test]
    fn test_marker_without_style() {
        let marker: Marker = parse(r#"{ "locations": ["Paris"] }"#);
        assert_eq!(serialize_marker(&marker).unwrap(), "Paris");
    }

    #[test]
    fn test_bad_marker_label() {
        for label in ["s", "AB", "", "!"] {
            let marker = Marker {
                style: Some(MarkerStyle::Styled(StyledMarker {
                    size: None,
                    color: None,
                    label: Some(label.to_string()),
                })),
                locations: vec![],
            };
            assert!(serialize_marker(&marker).is_err(), "label {:?} should be rejected", label);
        }
    }

    #[test]
    fn test_unknown_anchor_is_rejected() {
        assert!(serde_json::from_str::<Anchor>(r#""middle""#).is_err());
        assert_eq!(parse::<Anchor>(r#""topright""#), Anchor::TopRight);
    }

    #[test]
    fn test_icon_marker_with_bad_anchor_does_not_lose_its_icon() {
        let result = serde_json::from_str::<Marker>(
            r#"{ "style": { "icon": "https://example.com/pin.png", "anchor": "middle" }, "locations": ["Paris"] }"#,
        );
        assert!(result.is_err(), "marker parsed as {:?}", result);
    }

    #[test]
    fn test_styled_marker_rejects_unknown_keys() {
        assert!(serde_json::from_str::<MarkerStyle>(r#"{ "colour": "red" }"#).is_err());
        assert_eq!(
            parse::<MarkerStyle>(r#"{ "color": "red" }"#),
            MarkerStyle::Styled(StyledMarker { size: None, color: Some("red".to_string()), label: None })
        );
    }

    #[test]
    fn test_path_skips_absent_fields() {
        let path: Path = parse(
            r#"{ "weight": 5, "geodesic": true, "locations": [{ "lat": 0, "lng": 0 }, "Lagos"] }"#,
        );
        assert_eq!(serialize_path(&path).unwrap(), "weight:5|geodesic:true|0,0|Lagos");
    }
}
