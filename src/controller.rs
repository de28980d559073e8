//! Map controller
//!
//! Holds every piece of per-session state: the view, the active layer
//! handles, the ZIP index, the merged venues and the filter inputs. Loads
//! report in through `on_*_loaded` in any order; UI input arrives as
//! [`UiEvent`]s. Events touching data that has not arrived yet are no-ops.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MapConfig;
use crate::filter::FilterState;
use crate::models::{LatLng, VenueFeature, ZipFeature};
use crate::nav::{NavigationIndex, Selection};
use crate::render::{build_point_layer, build_polygon_layer, style_options, LayerManager, MapView, PolygonStyle};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "value", rename_all = "snake_case")]
pub enum UiEvent {
    ZipHoverEnter(String),
    ZipHoverExit(String),
    ZipClick(String),
    ZipSelected(String),
    MinCountChanged(u32),
    StyleChanged(String),
    SearchChanged(String),
    SidebarToggled,
    FiltersCleared,
}

pub struct MapController<V: MapView> {
    config: MapConfig,
    view: V,
    layers: LayerManager,
    nav: NavigationIndex,
    venues: Option<Vec<VenueFeature>>,
    styles: Vec<String>,
    filters: FilterState,
    sidebar_hidden: bool,
    hovered_zip: Option<String>,
    visible_count: usize,
}

impl<V: MapView> MapController<V> {
    /// Attach to `view` and show the default city-wide viewport
    pub fn new(config: MapConfig, mut view: V) -> Self {
        view.set_view(config.default_center, config.default_zoom);
        Self {
            config,
            view,
            layers: LayerManager::default(),
            nav: NavigationIndex::default(),
            venues: None,
            styles: Vec::new(),
            filters: FilterState::default(),
            sidebar_hidden: false,
            hovered_zip: None,
            visible_count: 0,
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn nav(&self) -> &NavigationIndex {
        &self.nav
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Merged venues, `None` until the point layer has loaded
    pub fn venues(&self) -> Option<&[VenueFeature]> {
        self.venues.as_deref()
    }

    pub fn style_options(&self) -> &[String] {
        &self.styles
    }

    pub fn sidebar_hidden(&self) -> bool {
        self.sidebar_hidden
    }

    pub fn hovered_zip(&self) -> Option<&str> {
        self.hovered_zip.as_deref()
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    pub fn on_zip_polygons_loaded(&mut self, zips: Vec<ZipFeature>) {
        self.nav = NavigationIndex::build(&zips);
        self.hovered_zip = None;
        self.layers.replace_polygons(&mut self.view, build_polygon_layer(&zips));
        debug!("ZIP layer attached with {} codes", self.nav.len());
    }

    pub fn on_venues_loaded(&mut self, venues: Vec<VenueFeature>) {
        self.styles = style_options(&venues, &self.config.fields);
        self.venues = Some(venues);
        self.render_points();
    }

    pub fn handle(&mut self, event: UiEvent) {
        debug!("UI event: {:?}", event);
        match event {
            UiEvent::ZipHoverEnter(zip) => self.hover_enter(&zip),
            UiEvent::ZipHoverExit(zip) => self.hover_exit(&zip),
            UiEvent::ZipClick(zip) => {
                if let Some(entry) = self.nav.get(&zip) {
                    self.view.fit_bounds(entry.bounds);
                }
            }
            UiEvent::ZipSelected(zip) => self.select_zip(&zip),
            UiEvent::MinCountChanged(n) => {
                self.filters.min_count = n;
                self.render_points();
            }
            UiEvent::StyleChanged(style) => {
                self.filters.style = style;
                self.render_points();
            }
            UiEvent::SearchChanged(search) => {
                let had_search = self.filters.has_search();
                self.filters.search = search;
                self.render_points();
                if had_search && !self.filters.has_search() {
                    self.reset_view();
                }
            }
            UiEvent::SidebarToggled => {
                self.sidebar_hidden = !self.sidebar_hidden;
                self.view.set_sidebar_hidden(self.sidebar_hidden);
            }
            UiEvent::FiltersCleared => {
                self.filters = FilterState::default();
                self.render_points();
                self.reset_view();
            }
        }
    }

    pub fn reset_view(&mut self) {
        self.view.set_view(self.config.default_center, self.config.default_zoom);
    }

    /// Rebuild the point layer from the merged venues and current filters
    pub fn render_points(&mut self) {
        let Some(venues) = self.venues.as_deref() else {
            return;
        };
        let layer = build_point_layer(venues, &self.filters, &self.config);
        let first_match: Option<LatLng> = layer.markers.first().map(|m| m.position);
        self.visible_count = layer.markers.len();
        self.layers.replace_points(&mut self.view, layer);

        if self.filters.has_search() {
            if let Some(position) = first_match {
                self.view.set_view(position, self.config.search_zoom);
            }
        }
    }

    fn select_zip(&mut self, zip: &str) {
        let target = match self.nav.select(zip) {
            Selection::Zip { entry, .. } => Some((entry.bounds, entry.label.clone())),
            Selection::Reset => None,
        };
        match target {
            Some((bounds, label)) => {
                self.view.fit_bounds(bounds);
                self.view.open_popup(bounds.center(), label);
            }
            None => self.reset_view(),
        }
    }

    fn hover_enter(&mut self, zip: &str) {
        let Some(layer) = self.layers.polygon_layer() else {
            return;
        };
        if !self.nav.contains(zip) {
            return;
        }
        if let Some(previous) = self.hovered_zip.take() {
            self.view.set_polygon_style(layer, &previous, PolygonStyle::base());
        }
        self.view.set_polygon_style(layer, zip.trim(), PolygonStyle::highlighted());
        self.hovered_zip = Some(zip.trim().to_string());
    }

    fn hover_exit(&mut self, zip: &str) {
        let Some(layer) = self.layers.polygon_layer() else {
            return;
        };
        if !self.nav.contains(zip) {
            return;
        }
        self.view.set_polygon_style(layer, zip.trim(), PolygonStyle::base());
        if self.hovered_zip.as_deref() == Some(zip.trim()) {
            self.hovered_zip = None;
        }
    }
}
