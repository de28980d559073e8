//! Shared map session behind the REST handlers
//!
//! One controller per server, guarded by a tokio `RwLock`. Every event runs
//! under the write lock, so each render pass is a full rebuild that never
//! interleaves with another.

use std::sync::Arc;

use geojson::GeoJson;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::config::MapConfig;
use crate::controller::{MapController, UiEvent};
use crate::filter::FilterState;
use crate::loader::{load_venue_layer, load_zip_layer, LoadReport};
use crate::view::{Popup, SessionView, Viewport};

/// Everything the page needs to redraw its chrome
#[derive(Debug, Clone, Serialize)]
pub struct ViewState {
    pub viewport: Viewport,
    pub popup: Option<Popup>,
    pub sidebar_hidden: bool,
    pub filters: FilterState,
    pub hovered_zip: Option<String>,
    pub zips_loaded: bool,
    pub venues_loaded: bool,
    pub visible_venues: usize,
}

/// Partial filter update; absent fields keep their current value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterUpdate {
    pub min_count: Option<u32>,
    pub style: Option<String>,
    pub search: Option<String>,
}

impl FilterUpdate {
    fn into_events(self) -> Vec<UiEvent> {
        let mut events = Vec::new();
        if let Some(n) = self.min_count {
            events.push(UiEvent::MinCountChanged(n));
        }
        if let Some(style) = self.style {
            events.push(UiEvent::StyleChanged(style));
        }
        if let Some(search) = self.search {
            events.push(UiEvent::SearchChanged(search));
        }
        events
    }
}

pub struct MapService {
    client: reqwest::Client,
    controller: Arc<RwLock<MapController<SessionView>>>,
    report: Arc<RwLock<LoadReport>>,
}

impl MapService {
    pub fn new(config: MapConfig) -> Self {
        let view = SessionView::new(&config);
        Self::from_controller(MapController::new(config, view))
    }

    pub fn from_controller(controller: MapController<SessionView>) -> Self {
        Self {
            client: reqwest::Client::new(),
            controller: Arc::new(RwLock::new(controller)),
            report: Arc::new(RwLock::new(LoadReport::default())),
        }
    }

    /// Load both layers concurrently; each is applied as soon as it resolves
    pub async fn load(&self) {
        let config = self.controller.read().await.config().clone();

        let zip_branch = async {
            let result = load_zip_layer(&config, &self.client).await;
            self.report.write().await.record_zips(&result);
            if let Ok(zips) = result {
                self.controller.write().await.on_zip_polygons_loaded(zips);
            }
        };

        let venue_branch = async {
            let result = load_venue_layer(&config, &self.client).await;
            self.report.write().await.record_venues(&result);
            if let Ok(load) = result {
                self.controller.write().await.on_venues_loaded(load.venues);
            }
        };

        tokio::join!(zip_branch, venue_branch);
        info!("Map data load finished");
    }

    pub async fn status(&self) -> LoadReport {
        self.report.read().await.clone()
    }

    pub async fn view_state(&self) -> ViewState {
        let controller = self.controller.read().await;
        snapshot(&controller)
    }

    pub async fn dispatch(&self, event: UiEvent) -> ViewState {
        let mut controller = self.controller.write().await;
        controller.handle(event);
        snapshot(&controller)
    }

    pub async fn update_filters(&self, update: FilterUpdate) -> ViewState {
        let mut controller = self.controller.write().await;
        for event in update.into_events() {
            controller.handle(event);
        }
        snapshot(&controller)
    }

    pub async fn has_zip(&self, zip: &str) -> bool {
        self.controller.read().await.nav().contains(zip)
    }

    pub async fn zips(&self) -> Vec<String> {
        self.controller.read().await.nav().sorted_zips()
    }

    pub async fn search_zips(&self, query: &str) -> Vec<String> {
        self.controller.read().await.nav().search(query)
    }

    pub async fn styles(&self) -> Vec<String> {
        self.controller.read().await.style_options().to_vec()
    }

    pub async fn venues_geojson(&self) -> GeoJson {
        self.controller.read().await.view().points_geojson()
    }

    pub async fn zips_geojson(&self) -> GeoJson {
        self.controller.read().await.view().polygons_geojson()
    }
}

fn snapshot(controller: &MapController<SessionView>) -> ViewState {
    let view = controller.view();
    ViewState {
        viewport: view.viewport(),
        popup: view.popup().cloned(),
        sidebar_hidden: controller.sidebar_hidden(),
        filters: controller.filters().clone(),
        hovered_zip: controller.hovered_zip().map(str::to_string),
        zips_loaded: !controller.nav().is_empty(),
        venues_loaded: controller.venues().is_some(),
        visible_venues: controller.visible_count(),
    }
}
