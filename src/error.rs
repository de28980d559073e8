//! Load failures for the static layers and the attribute sheet

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("expected a FeatureCollection, found a {0}")]
    NotFeatureCollection(&'static str),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV header has no `{0}` column")]
    MissingHeader(String),
}
