//! Page-load sequence
//!
//! Two independent branches: the ZIP layer, and the sheet-then-points chain.
//! Each failure is isolated to its own layer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::MapConfig;
use crate::controller::MapController;
use crate::error::LoadError;
use crate::join::{join_with_stats, JoinStats};
use crate::models::{VenueFeature, ZipFeature};
use crate::render::MapView;
use crate::sheet::fetch_attribute_rows;
use crate::store::{load_venue_points, load_zip_polygons, DataSource};

/// Outcome of the point branch
#[derive(Debug, Clone)]
pub struct VenueLoad {
    pub venues: Vec<VenueFeature>,
    /// `None` when the join did not run
    pub join: Option<JoinStats>,
    pub sheet_error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub zip_count: Option<usize>,
    pub zip_error: Option<String>,
    pub zips_loaded_at: Option<DateTime<Utc>>,
    pub venue_count: Option<usize>,
    pub venue_error: Option<String>,
    pub sheet_error: Option<String>,
    pub join: Option<JoinStats>,
    pub venues_loaded_at: Option<DateTime<Utc>>,
}

impl LoadReport {
    pub fn record_zips(&mut self, result: &Result<Vec<ZipFeature>, LoadError>) {
        match result {
            Ok(zips) => self.zip_count = Some(zips.len()),
            Err(e) => self.zip_error = Some(e.to_string()),
        }
        self.zips_loaded_at = Some(Utc::now());
    }

    pub fn record_venues(&mut self, result: &Result<VenueLoad, LoadError>) {
        match result {
            Ok(load) => {
                self.venue_count = Some(load.venues.len());
                self.join = load.join;
                self.sheet_error = load.sheet_error.clone();
            }
            Err(e) => self.venue_error = Some(e.to_string()),
        }
        self.venues_loaded_at = Some(Utc::now());
    }
}

pub async fn load_zip_layer(config: &MapConfig, client: &reqwest::Client) -> Result<Vec<ZipFeature>, LoadError> {
    let source = DataSource::parse(&config.zip_source);
    load_zip_polygons(&source, client).await.inspect_err(|e| {
        error!("Error loading ZIP layer from {}: {}", source, e);
    })
}

/// Sheet first, then points, then the join. A sheet failure only skips the
/// join; a point failure fails the branch.
pub async fn load_venue_layer(config: &MapConfig, client: &reqwest::Client) -> Result<VenueLoad, LoadError> {
    let id_field = &config.fields.id;

    let (rows, sheet_error) = match config.sheet_source.as_deref() {
        Some(sheet) => {
            let source = DataSource::parse(sheet);
            match fetch_attribute_rows(&source, client, id_field).await {
                Ok(rows) => (Some(rows), None),
                Err(e) => {
                    warn!("Error loading attribute sheet from {}: {}; bars keep static attributes", source, e);
                    (None, Some(e.to_string()))
                }
            }
        }
        None => (None, None),
    };

    let source = DataSource::parse(&config.venue_source);
    let points = load_venue_points(&source, client, id_field).await.inspect_err(|e| {
        error!("Error loading bar layer from {}: {}", source, e);
    })?;

    let (venues, join) = match rows {
        Some(rows) => {
            let (venues, stats) = join_with_stats(points, &rows, id_field);
            info!(
                "Joined sheet onto bars: {} matched, {} without a row, {} unused rows",
                stats.matched, stats.unmatched_points, stats.unused_rows
            );
            (venues, Some(stats))
        }
        None => (points, None),
    };

    Ok(VenueLoad {
        venues,
        join,
        sheet_error,
    })
}

/// Run both branches concurrently and hand the results to `controller`
pub async fn load_into<V: MapView>(
    controller: &mut MapController<V>,
    client: &reqwest::Client,
) -> LoadReport {
    let config = controller.config().clone();
    let (zips, venues) = tokio::join!(load_zip_layer(&config, client), load_venue_layer(&config, client));

    let mut report = LoadReport::default();
    report.record_zips(&zips);
    report.record_venues(&venues);

    if let Ok(zips) = zips {
        controller.on_zip_polygons_loaded(zips);
    }
    if let Ok(load) = venues {
        controller.on_venues_loaded(load.venues);
    }
    report
}
