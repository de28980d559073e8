//! Headless map surface
//!
//! Records the viewport, the attached layers and per-ZIP style overrides so the
//! HTTP layer can hand them to a browser, and so tests can assert on them.

use std::collections::{BTreeMap, HashMap};

use geojson::GeoJson;
use serde::Serialize;

use crate::config::MapConfig;
use crate::models::{Bounds, LatLng};
use crate::render::{Layer, LayerId, MapView, PointLayer, PolygonLayer, PolygonStyle};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Viewport {
    Center { center: LatLng, zoom: u8 },
    Bounds { bounds: Bounds },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub at: LatLng,
    pub html: String,
}

#[derive(Debug)]
pub struct SessionView {
    min_zoom: u8,
    max_zoom: u8,
    next_id: LayerId,
    layers: BTreeMap<LayerId, Layer>,
    styles: HashMap<(LayerId, String), PolygonStyle>,
    viewport: Viewport,
    popup: Option<Popup>,
    sidebar_hidden: bool,
}

impl SessionView {
    pub fn new(config: &MapConfig) -> Self {
        Self {
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            next_id: 1,
            layers: BTreeMap::new(),
            styles: HashMap::new(),
            viewport: Viewport::Center {
                center: config.default_center,
                zoom: config.default_zoom,
            },
            popup: None,
            sidebar_hidden: false,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    pub fn sidebar_hidden(&self) -> bool {
        self.sidebar_hidden
    }

    pub fn point_layers(&self) -> impl Iterator<Item = &PointLayer> {
        self.layers.values().filter_map(|l| match l {
            Layer::Points(p) => Some(p),
            _ => None,
        })
    }

    fn polygon_layers(&self) -> impl Iterator<Item = (LayerId, &PolygonLayer)> {
        self.layers.iter().filter_map(|(id, l)| match l {
            Layer::Polygons(p) => Some((*id, p)),
            _ => None,
        })
    }

    pub fn point_layer_count(&self) -> usize {
        self.point_layers().count()
    }

    pub fn polygon_layer_count(&self) -> usize {
        self.polygon_layers().count()
    }

    /// Current style of a ZIP polygon on the attached polygon layer
    pub fn polygon_style(&self, zip: &str) -> Option<PolygonStyle> {
        let (id, layer) = self.polygon_layers().next()?;
        layer.shapes.iter().find(|s| s.zip == zip)?;
        Some(
            self.styles
                .get(&(id, zip.to_string()))
                .cloned()
                .unwrap_or_else(PolygonStyle::base),
        )
    }

    pub fn points_geojson(&self) -> GeoJson {
        self.point_layers()
            .next()
            .cloned()
            .unwrap_or_default()
            .to_geojson()
    }

    pub fn polygons_geojson(&self) -> GeoJson {
        match self.polygon_layers().next() {
            Some((id, layer)) => layer.to_geojson(|zip| {
                self.styles
                    .get(&(id, zip.to_string()))
                    .cloned()
                    .unwrap_or_else(PolygonStyle::base)
            }),
            None => PolygonLayer::default().to_geojson(|_| PolygonStyle::base()),
        }
    }
}

impl MapView for SessionView {
    fn add_layer(&mut self, layer: Layer) -> LayerId {
        let id = self.next_id;
        self.next_id += 1;
        self.layers.insert(id, layer);
        id
    }

    fn remove_layer(&mut self, id: LayerId) {
        self.layers.remove(&id);
        self.styles.retain(|(layer, _), _| *layer != id);
    }

    fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.viewport = Viewport::Center {
            center,
            zoom: zoom.clamp(self.min_zoom, self.max_zoom),
        };
        self.popup = None;
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        self.viewport = Viewport::Bounds { bounds };
        self.popup = None;
    }

    fn set_polygon_style(&mut self, layer: LayerId, zip: &str, style: PolygonStyle) {
        if !self.layers.contains_key(&layer) {
            return;
        }
        if style == PolygonStyle::base() {
            self.styles.remove(&(layer, zip.to_string()));
        } else {
            self.styles.insert((layer, zip.to_string()), style);
        }
    }

    fn open_popup(&mut self, at: LatLng, html: String) {
        self.popup = Some(Popup { at, html });
    }

    fn set_sidebar_hidden(&mut self, hidden: bool) {
        self.sidebar_hidden = hidden;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_is_clamped() {
        let config = MapConfig::default();
        let mut view = SessionView::new(&config);
        view.set_view(LatLng::new(37.0, -122.0), 22);
        assert_eq!(
            view.viewport(),
            Viewport::Center {
                center: LatLng::new(37.0, -122.0),
                zoom: config.max_zoom,
            }
        );
    }

    #[test]
    fn test_viewport_change_closes_popup() {
        let mut view = SessionView::new(&MapConfig::default());
        view.open_popup(LatLng::new(37.0, -122.0), "<b>94110</b>".into());
        assert!(view.popup().is_some());
        view.fit_bounds(Bounds::from_point(LatLng::new(37.0, -122.0)));
        assert!(view.popup().is_none());
    }

    #[test]
    fn test_styles_dropped_with_layer() {
        let mut view = SessionView::new(&MapConfig::default());
        let id = view.add_layer(Layer::Polygons(PolygonLayer::default()));
        view.set_polygon_style(id, "94110", PolygonStyle::highlighted());
        view.remove_layer(id);
        assert!(view.styles.is_empty());

        view.set_polygon_style(id, "94110", PolygonStyle::highlighted());
        assert!(view.styles.is_empty());
    }
}
