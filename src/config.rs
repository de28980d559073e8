//! Map configuration
//!
//! Defaults reproduce the city-wide San Francisco view and the field names of
//! the published bar sheet. `MapConfig::from_env` and [`SourceArgs`] let the
//! binaries point at other data.

use clap::Args;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::models::LatLng;

pub const DEFAULT_ZIP_SOURCE: &str = "data/sfzipcodes.geojson";
pub const DEFAULT_VENUE_SOURCE: &str = "data/sfbars_coordsandneighborhoods_20250502.geojson";
pub const DEFAULT_SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vQfR6CgMCiafL-VEP3oSbIqTDmfHXkPF4VgZfLKe0ZW_Zt3DI56JuulaSEPnHLDSHsgLisTRPxmq1AG/pub?output=csv";

/// Attribute names the filters and popups read from a venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldNames {
    pub id: String,
    pub count: String,
    pub style: String,
    pub name: String,
    pub address: String,
    pub neighborhood: String,
    pub happy_hour: String,
    pub comments: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            id: "barid".to_string(),
            count: "CountOfAttendees".to_string(),
            style: "Style".to_string(),
            name: "Bar Name".to_string(),
            address: "St Address".to_string(),
            neighborhood: "Neighborhood".to_string(),
            happy_hour: "Happy Hour".to_string(),
            comments: "Comments".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub zip_source: String,
    pub venue_source: String,
    /// `None` skips the join; points keep their static attributes
    pub sheet_source: Option<String>,
    pub default_center: LatLng,
    pub default_zoom: u8,
    pub min_zoom: u8,
    pub max_zoom: u8,
    /// Zoom used when recentering on a search match
    pub search_zoom: u8,
    pub fields: FieldNames,
    /// Yes/no sheet columns listed in every popup
    pub person_columns: Vec<String>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zip_source: DEFAULT_ZIP_SOURCE.to_string(),
            venue_source: DEFAULT_VENUE_SOURCE.to_string(),
            sheet_source: Some(DEFAULT_SHEET_URL.to_string()),
            default_center: LatLng::new(37.7749, -122.4194),
            default_zoom: 12,
            min_zoom: 11,
            max_zoom: 18,
            search_zoom: 16,
            fields: FieldNames::default(),
            person_columns: ["Allison", "Ben", "Kyle", "Christina", "Brian"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl MapConfig {
    /// Defaults overridden by `SFMAP_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(v) = lookup("SFMAP_ZIP_SOURCE") {
            config.zip_source = v;
        }
        if let Some(v) = lookup("SFMAP_VENUE_SOURCE") {
            config.venue_source = v;
        }
        if let Some(v) = lookup("SFMAP_SHEET_URL") {
            config.sheet_source = if v.trim().is_empty() { None } else { Some(v) };
        }
        if let Some(v) = lookup("SFMAP_COUNT_FIELD") {
            config.fields.count = v;
        }
        config
    }
}

/// Log filter for the binaries: `RUST_LOG` when set, otherwise `info`
pub fn log_filter() -> EnvFilter {
    EnvFilter::new(log_directive(|key| std::env::var(key).ok()))
}

fn log_directive(lookup: impl Fn(&str) -> Option<String>) -> String {
    lookup("RUST_LOG")
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "info".into())
}

/// Data source flags shared by the binaries
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// ZIP polygon GeoJSON (path or http(s) URL)
    #[arg(long)]
    pub zip_source: Option<String>,

    /// Bar point GeoJSON (path or http(s) URL)
    #[arg(long)]
    pub venue_source: Option<String>,

    /// CSV sheet with bar attributes (path or http(s) URL)
    #[arg(long)]
    pub sheet_url: Option<String>,

    /// Skip the sheet join entirely
    #[arg(long)]
    pub no_sheet: bool,

    /// Attribute holding the visit count
    #[arg(long)]
    pub count_field: Option<String>,
}

impl SourceArgs {
    pub fn apply(self, mut config: MapConfig) -> MapConfig {
        if let Some(v) = self.zip_source {
            config.zip_source = v;
        }
        if let Some(v) = self.venue_source {
            config.venue_source = v;
        }
        if let Some(v) = self.sheet_url {
            config.sheet_source = Some(v);
        }
        if self.no_sheet {
            config.sheet_source = None;
        }
        if let Some(v) = self.count_field {
            config.fields.count = v;
        }
        config
    }
}
