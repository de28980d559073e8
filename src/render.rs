//! Layer construction and the map surface abstraction
//!
//! [`LayerManager`] guarantees at most one polygon layer and one point layer
//! on a [`MapView`]: attaching a replacement always detaches the old handle
//! first.

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use serde::Serialize;
use serde_json::json;

use crate::config::{FieldNames, MapConfig};
use crate::filter::{fill_color, is_visible, FilterState};
use crate::models::{Bounds, LatLng, VenueFeature, ZipFeature};

pub type LayerId = u64;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolygonStyle {
    pub color: &'static str,
    pub weight: u8,
    pub fill_color: &'static str,
    pub fill_opacity: f32,
}

impl PolygonStyle {
    pub fn base() -> Self {
        Self {
            color: "#3388ff",
            weight: 2,
            fill_color: "#66ccff",
            fill_opacity: 0.5,
        }
    }

    pub fn highlighted() -> Self {
        Self {
            color: "#666",
            weight: 4,
            fill_color: "#ffcc00",
            fill_opacity: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub radius: u8,
    pub color: &'static str,
    pub fill_color: &'static str,
    pub fill_opacity: f32,
    pub weight: u8,
}

impl MarkerStyle {
    pub fn for_count(count: f64) -> Self {
        Self {
            radius: 6,
            color: "#222",
            fill_color: fill_color(count),
            fill_opacity: 0.85,
            weight: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub barid: String,
    pub position: LatLng,
    pub style: MarkerStyle,
    pub popup: String,
    pub properties: JsonObject,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointLayer {
    pub markers: Vec<Marker>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZipShape {
    pub zip: String,
    pub geometry: Geometry,
    pub bounds: Bounds,
    pub popup: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonLayer {
    pub shapes: Vec<ZipShape>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Polygons(PolygonLayer),
    Points(PointLayer),
}

/// Map surface the controller draws on
pub trait MapView {
    fn add_layer(&mut self, layer: Layer) -> LayerId;
    fn remove_layer(&mut self, id: LayerId);
    fn set_view(&mut self, center: LatLng, zoom: u8);
    fn fit_bounds(&mut self, bounds: Bounds);
    /// Restyle one ZIP polygon of an attached polygon layer
    fn set_polygon_style(&mut self, layer: LayerId, zip: &str, style: PolygonStyle);
    fn open_popup(&mut self, at: LatLng, html: String);
    fn set_sidebar_hidden(&mut self, hidden: bool);
}

/// Owner of the active layer handles
#[derive(Debug, Default)]
pub struct LayerManager {
    polygon_layer: Option<LayerId>,
    point_layer: Option<LayerId>,
}

impl LayerManager {
    pub fn polygon_layer(&self) -> Option<LayerId> {
        self.polygon_layer
    }

    pub fn point_layer(&self) -> Option<LayerId> {
        self.point_layer
    }

    pub fn replace_polygons<V: MapView>(&mut self, view: &mut V, layer: PolygonLayer) -> LayerId {
        if let Some(old) = self.polygon_layer.take() {
            view.remove_layer(old);
        }
        let id = view.add_layer(Layer::Polygons(layer));
        self.polygon_layer = Some(id);
        id
    }

    pub fn replace_points<V: MapView>(&mut self, view: &mut V, layer: PointLayer) -> LayerId {
        if let Some(old) = self.point_layer.take() {
            view.remove_layer(old);
        }
        let id = view.add_layer(Layer::Points(layer));
        self.point_layer = Some(id);
        id
    }
}

pub fn build_polygon_layer(zips: &[ZipFeature]) -> PolygonLayer {
    PolygonLayer {
        shapes: zips
            .iter()
            .map(|z| ZipShape {
                zip: z.zip.clone(),
                geometry: z.geometry.clone(),
                bounds: z.bounds,
                popup: z.label(),
            })
            .collect(),
    }
}

/// Markers for exactly the venues the filters let through, in input order
pub fn build_point_layer(venues: &[VenueFeature], filters: &FilterState, config: &MapConfig) -> PointLayer {
    PointLayer {
        markers: venues
            .iter()
            .filter(|v| is_visible(v, filters, &config.fields))
            .map(|v| Marker {
                barid: v.barid.clone(),
                position: v.position,
                style: MarkerStyle::for_count(v.number(&config.fields.count)),
                popup: render_popup(v, &config.fields, &config.person_columns),
                properties: v.properties.clone(),
            })
            .collect(),
    }
}

pub fn render_popup(venue: &VenueFeature, fields: &FieldNames, person_columns: &[String]) -> String {
    let field = |key: &str, fallback: &str| {
        let value = venue.text(key);
        escape_html(if value.is_empty() { fallback } else { &value })
    };

    let mut lines = vec![
        format!("<b>{}</b>", field(&fields.name, "Unnamed Bar")),
        format!("<b>Address:</b> {}", field(&fields.address, "N/A")),
        format!("<b>Neighborhood:</b> {}", field(&fields.neighborhood, "N/A")),
        format!("<b>Happy Hour:</b> {}", field(&fields.happy_hour, "None")),
        format!("<b>Style:</b> {}", field(&fields.style, "N/A")),
    ];
    for person in person_columns {
        lines.push(format!("<b>{}:</b> {}", escape_html(person), field(person, "no")));
    }
    lines.push(format!("<b>Comments:</b> {}", field(&fields.comments, "")));

    lines.join("<br>\n")
}

/// Distinct non-empty styles, sorted, for the category selector
pub fn style_options(venues: &[VenueFeature], fields: &FieldNames) -> Vec<String> {
    let mut styles: Vec<String> = venues
        .iter()
        .map(|v| v.text(&fields.style))
        .filter(|s| !s.is_empty())
        .collect();
    styles.sort();
    styles.dedup();
    styles
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

impl PointLayer {
    pub fn to_geojson(&self) -> GeoJson {
        let features = self
            .markers
            .iter()
            .map(|m| {
                let mut properties = m.properties.clone();
                properties.insert("marker".to_string(), json!(m.style));
                properties.insert("popup".to_string(), json!(m.popup));
                Feature {
                    bbox: None,
                    geometry: Some(Geometry::new(Value::Point(vec![m.position.lng, m.position.lat]))),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();
        collection(features)
    }
}

impl PolygonLayer {
    pub fn to_geojson(&self, style_for: impl Fn(&str) -> PolygonStyle) -> GeoJson {
        let features = self
            .shapes
            .iter()
            .map(|s| {
                let mut properties = JsonObject::new();
                properties.insert("zip".to_string(), json!(s.zip));
                properties.insert("popup".to_string(), json!(s.popup));
                properties.insert("style".to_string(), json!(style_for(&s.zip)));
                Feature {
                    bbox: None,
                    geometry: Some(s.geometry.clone()),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();
        collection(features)
    }
}

fn collection(features: Vec<Feature>) -> GeoJson {
    GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::join::join_attributes;
    use crate::view::SessionView;

    #[test]
    fn test_popup_placeholders() {
        let config = MapConfig::default();
        let venue = &fixtures::venues()[2];
        let popup = render_popup(venue, &config.fields, &config.person_columns);
        assert!(popup.starts_with("<b>Unnamed Bar</b>"));
        assert!(popup.contains("<b>Address:</b> N/A"));
        assert!(popup.contains("<b>Neighborhood:</b> Tenderloin"));
        assert!(popup.contains("<b>Happy Hour:</b> None"));
        assert!(popup.contains("<b>Allison:</b> no"));
        assert!(popup.ends_with("<b>Comments:</b> "));
    }

    #[test]
    fn test_popup_escapes_sheet_values() {
        let config = MapConfig::default();
        let mut venue = fixtures::venues()[0].clone();
        venue.properties.insert("Bar Name".into(), json!("<script>Tom & Jerry's</script>"));
        let popup = render_popup(&venue, &config.fields, &[]);
        assert!(popup.starts_with("<b>&lt;script&gt;Tom &amp; Jerry&#39;s&lt;/script&gt;</b>"));
    }

    #[test]
    fn test_point_layer_colors_and_filtering() {
        let config = MapConfig::default();
        let venues = join_attributes(fixtures::venues(), &fixtures::rows(), "barid");

        let layer = build_point_layer(&venues, &FilterState::default(), &config);
        assert_eq!(layer.markers.len(), 3);
        assert_eq!(layer.markers[0].style.fill_color, "#FC4E2A");
        assert_eq!(layer.markers[2].style.fill_color, "#800026");

        let filters = FilterState {
            style: "wine".into(),
            ..Default::default()
        };
        let layer = build_point_layer(&venues, &filters, &config);
        assert_eq!(layer.markers.len(), 1);
        assert_eq!(layer.markers[0].barid, "b2");
    }

    #[test]
    fn test_style_options_sorted_and_distinct() {
        let config = MapConfig::default();
        let venues = join_attributes(fixtures::venues(), &fixtures::rows(), "barid");
        assert_eq!(style_options(&venues, &config.fields), vec!["Dive", "Wine"]);
    }

    #[test]
    fn test_layer_manager_replaces_handles() {
        let mut view = SessionView::new(&MapConfig::default());
        let mut layers = LayerManager::default();

        let first = layers.replace_points(&mut view, PointLayer::default());
        let second = layers.replace_points(&mut view, PointLayer::default());
        assert_ne!(first, second);
        assert_eq!(layers.point_layer(), Some(second));
        assert_eq!(view.point_layer_count(), 1);

        layers.replace_polygons(&mut view, build_polygon_layer(&fixtures::zips()));
        layers.replace_polygons(&mut view, build_polygon_layer(&fixtures::zips()));
        assert_eq!(view.polygon_layer_count(), 1);
    }

    #[test]
    fn test_point_layer_geojson() {
        let config = MapConfig::default();
        let layer = build_point_layer(&fixtures::venues(), &FilterState::default(), &config);
        let GeoJson::FeatureCollection(fc) = layer.to_geojson() else {
            panic!("expected a feature collection");
        };
        assert_eq!(fc.features.len(), 3);
        let props = fc.features[0].properties.as_ref().unwrap();
        assert_eq!(props["marker"]["fill_color"], "#FFEDA0");
        assert!(props["popup"].as_str().unwrap().contains("Mission"));
    }
}
