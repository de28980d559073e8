use geojson::{Geometry, JsonObject};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Property names a ZIP polygon may carry its code under, in priority order
pub const ZIP_ALIASES: [&str; 3] = ["zip_code", "ZIPCODE", "name"];

/// Label used when a polygon carries none of the ZIP aliases
pub const UNKNOWN_ZIP: &str = "Unknown";

/// Geographic position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build from a GeoJSON position (`[lon, lat, ...]`)
    pub fn from_position(position: &[f64]) -> Option<Self> {
        match position {
            [lng, lat, ..] if lng.is_finite() && lat.is_finite() => Some(Self::new(*lat, *lng)),
            _ => None,
        }
    }
}

/// Axis-aligned lat/lng box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn from_point(p: LatLng) -> Self {
        Self {
            south: p.lat,
            west: p.lng,
            north: p.lat,
            east: p.lng,
        }
    }

    pub fn extend(&mut self, p: LatLng) {
        self.south = self.south.min(p.lat);
        self.west = self.west.min(p.lng);
        self.north = self.north.max(p.lat);
        self.east = self.east.max(p.lng);
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            south: self.south.min(other.south),
            west: self.west.min(other.west),
            north: self.north.max(other.north),
            east: self.east.max(other.east),
        }
    }

    pub fn center(&self) -> LatLng {
        LatLng::new((self.south + self.north) / 2.0, (self.west + self.east) / 2.0)
    }

    /// Bounds of a set of GeoJSON positions; `None` when no position is valid
    pub fn from_positions<'a>(positions: impl IntoIterator<Item = &'a [f64]>) -> Option<Bounds> {
        let mut bounds: Option<Bounds> = None;
        for p in positions.into_iter().filter_map(LatLng::from_position) {
            match bounds.as_mut() {
                Some(b) => b.extend(p),
                None => bounds = Some(Bounds::from_point(p)),
            }
        }
        bounds
    }
}

/// ZIP code boundary polygon
#[derive(Debug, Clone)]
pub struct ZipFeature {
    pub zip: String,
    pub geometry: Geometry,
    pub bounds: Bounds,
    pub properties: JsonObject,
}

impl ZipFeature {
    /// Popup label shown when the ZIP is selected
    pub fn label(&self) -> String {
        zip_label(&self.zip)
    }
}

pub fn zip_label(zip: &str) -> String {
    format!("<b>{}</b>", crate::render::escape_html(zip))
}

/// Resolve the ZIP code of a polygon: first non-empty alias wins
pub fn zip_from_properties(properties: &JsonObject) -> String {
    ZIP_ALIASES
        .iter()
        .filter_map(|alias| properties.get(*alias))
        .map(value_to_string)
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_ZIP.to_string())
}

/// Bar point with its merged attributes
#[derive(Debug, Clone, PartialEq)]
pub struct VenueFeature {
    pub barid: String,
    pub position: LatLng,
    pub properties: JsonObject,
}

impl VenueFeature {
    /// Attribute lookup; exact key first, then case-insensitive
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.properties.get(key).or_else(|| {
            self.properties
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })
    }

    /// String attribute, empty when missing or null
    pub fn text(&self, key: &str) -> String {
        self.attr(key).map(value_to_string).unwrap_or_default()
    }

    /// Numeric attribute, 0 when missing or unparseable
    pub fn number(&self, key: &str) -> f64 {
        let n = match self.attr(key) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => parse_leading_float(s).unwrap_or(0.0),
            _ => 0.0,
        };
        if n.is_finite() {
            n
        } else {
            0.0
        }
    }
}

/// One row of the remote attribute sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeRow {
    fields: Vec<(String, String)>,
}

impl AttributeRow {
    pub fn from_pairs<K: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == header)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, v)| v.trim().is_empty())
    }
}

/// Render a JSON value the way it reads in a popup
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Parse the longest numeric prefix of `s` ("6 visits" -> 6.0)
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = if matches!(bytes.first(), Some(b'+' | b'-')) { 1 } else { 0 };
    let int_end = digits_from(end);
    let mut seen_digit = int_end > end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        seen_digit |= frac_end > end + 1;
        end = frac_end;
    }
    if !seen_digit {
        return None;
    }

    // Exponent only counts when at least one digit follows it
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    s[..end].trim_end_matches('.').parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn venue(props: Value) -> VenueFeature {
        VenueFeature {
            barid: "a1".into(),
            position: LatLng::new(37.77, -122.42),
            properties: props.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn test_zip_alias_priority() {
        let props = json!({"zip_code": "", "ZIPCODE": 94103, "name": "Mission"});
        assert_eq!(zip_from_properties(props.as_object().unwrap()), "94103");

        let props = json!({"name": "94110"});
        assert_eq!(zip_from_properties(props.as_object().unwrap()), "94110");

        let props = json!({"other": "x"});
        assert_eq!(zip_from_properties(props.as_object().unwrap()), UNKNOWN_ZIP);
    }

    #[test]
    fn test_numeric_attribute_defaults() {
        let v = venue(json!({
            "CountOfAttendees": "6",
            "bad": "n/a",
            "num": 3.5,
            "nil": null,
            "flag": true,
            "sci": "1e3"
        }));
        assert_eq!(v.number("CountOfAttendees"), 6.0);
        assert_eq!(v.number("countofattendees"), 6.0);
        assert_eq!(v.number("bad"), 0.0);
        assert_eq!(v.number("num"), 3.5);
        assert_eq!(v.number("nil"), 0.0);
        assert_eq!(v.number("flag"), 0.0);
        assert_eq!(v.number("sci"), 1000.0);
        assert_eq!(v.number("missing"), 0.0);
    }

    #[test]
    fn test_text_attribute_defaults() {
        let v = venue(json!({"Bar Name": "Irish Tavern", "nil": null, "n": 4}));
        assert_eq!(v.text("bar name"), "Irish Tavern");
        assert_eq!(v.text("nil"), "");
        assert_eq!(v.text("missing"), "");
        assert_eq!(v.text("n"), "4");
    }

    #[test]
    fn test_parse_leading_float() {
        assert_eq!(parse_leading_float("6 visits"), Some(6.0));
        assert_eq!(parse_leading_float("  -2.5x"), Some(-2.5));
        assert_eq!(parse_leading_float("3."), Some(3.0));
        assert_eq!(parse_leading_float(".5"), Some(0.5));
        assert_eq!(parse_leading_float("1e3"), Some(1000.0));
        assert_eq!(parse_leading_float("2.5E-1 stars"), Some(0.25));
        assert_eq!(parse_leading_float("4e"), Some(4.0));
        assert_eq!(parse_leading_float("-"), None);
        assert_eq!(parse_leading_float("abc"), None);
        assert_eq!(parse_leading_float(""), None);
    }

    #[test]
    fn test_bounds_from_positions() {
        let ring = [vec![-122.5, 37.7], vec![-122.4, 37.8], vec![-122.45, 37.75]];
        let b = Bounds::from_positions(ring.iter().map(Vec::as_slice)).unwrap();
        assert_eq!(b.south, 37.7);
        assert_eq!(b.north, 37.8);
        assert_eq!(b.west, -122.5);
        assert_eq!(b.east, -122.4);

        let empty: [Vec<f64>; 0] = [];
        assert!(Bounds::from_positions(empty.iter().map(Vec::as_slice)).is_none());
    }
}
