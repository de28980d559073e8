//! Geometry store: ZIP polygons and bar points from static GeoJSON

use std::fmt;
use std::path::PathBuf;

use geojson::{FeatureCollection, GeoJson, Value};
use tracing::{debug, info};

use crate::error::LoadError;
use crate::models::{value_to_string, Bounds, LatLng, VenueFeature, ZipFeature, zip_from_properties};

/// Where a data file lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Path(PathBuf),
    Url(String),
}

impl DataSource {
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.starts_with("http://") || s.starts_with("https://") {
            DataSource::Url(s.to_string())
        } else {
            DataSource::Path(PathBuf::from(s))
        }
    }

    pub async fn read_to_string(&self, client: &reqwest::Client) -> Result<String, LoadError> {
        match self {
            DataSource::Path(path) => tokio::fs::read_to_string(path).await.map_err(|source| LoadError::Io {
                path: path.display().to_string(),
                source,
            }),
            DataSource::Url(url) => {
                let http_err = |source| LoadError::Http {
                    url: url.clone(),
                    source,
                };
                client
                    .get(url)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(http_err)?
                    .text()
                    .await
                    .map_err(http_err)
            }
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Path(path) => write!(f, "{}", path.display()),
            DataSource::Url(url) => f.write_str(url),
        }
    }
}

pub async fn load_zip_polygons(source: &DataSource, client: &reqwest::Client) -> Result<Vec<ZipFeature>, LoadError> {
    let text = source.read_to_string(client).await?;
    let zips = parse_zip_polygons(&text)?;
    info!("Loaded {} ZIP polygons from {}", zips.len(), source);
    Ok(zips)
}

pub async fn load_venue_points(
    source: &DataSource,
    client: &reqwest::Client,
    id_field: &str,
) -> Result<Vec<VenueFeature>, LoadError> {
    let text = source.read_to_string(client).await?;
    let venues = parse_venue_points(&text, id_field)?;
    info!("Loaded {} bar points from {}", venues.len(), source);
    Ok(venues)
}

/// Polygon and MultiPolygon features become ZIP features; anything else is skipped
pub fn parse_zip_polygons(text: &str) -> Result<Vec<ZipFeature>, LoadError> {
    let collection = feature_collection(text)?;
    let mut zips = Vec::with_capacity(collection.features.len());

    for (i, feature) in collection.features.into_iter().enumerate() {
        let Some(geometry) = feature.geometry else {
            debug!("ZIP feature {} has no geometry, skipping", i);
            continue;
        };
        let Some(bounds) = polygon_bounds(&geometry.value) else {
            debug!("ZIP feature {} is not a polygon, skipping", i);
            continue;
        };
        let properties = feature.properties.unwrap_or_default();
        zips.push(ZipFeature {
            zip: zip_from_properties(&properties),
            geometry,
            bounds,
            properties,
        });
    }

    Ok(zips)
}

/// Point features become venues; anything else is skipped
pub fn parse_venue_points(text: &str, id_field: &str) -> Result<Vec<VenueFeature>, LoadError> {
    let collection = feature_collection(text)?;
    let mut venues = Vec::with_capacity(collection.features.len());

    for (i, feature) in collection.features.into_iter().enumerate() {
        let position = match feature.geometry.as_ref().map(|g| &g.value) {
            Some(Value::Point(p)) => LatLng::from_position(p),
            _ => None,
        };
        let Some(position) = position else {
            debug!("Bar feature {} has no point geometry, skipping", i);
            continue;
        };
        let properties = feature.properties.unwrap_or_default();
        let barid = properties.get(id_field).map(value_to_string).unwrap_or_default();
        venues.push(VenueFeature {
            barid,
            position,
            properties,
        });
    }

    Ok(venues)
}

fn feature_collection(text: &str) -> Result<FeatureCollection, LoadError> {
    match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        GeoJson::Feature(_) => Err(LoadError::NotFeatureCollection("Feature")),
        GeoJson::Geometry(_) => Err(LoadError::NotFeatureCollection("Geometry")),
    }
}

fn polygon_bounds(value: &Value) -> Option<Bounds> {
    match value {
        Value::Polygon(rings) => Bounds::from_positions(rings.iter().flatten().map(Vec::as_slice)),
        Value::MultiPolygon(polygons) => {
            Bounds::from_positions(polygons.iter().flatten().flatten().map(Vec::as_slice))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use std::io::Write;

    #[test]
    fn test_parse_zip_polygons() {
        let zips = parse_zip_polygons(fixtures::ZIPS_GEOJSON).unwrap();
        let codes: Vec<&str> = zips.iter().map(|z| z.zip.as_str()).collect();
        assert_eq!(codes, vec!["94110", "94103", "94102"]);

        let mission = &zips[0];
        assert_eq!(mission.bounds.south, 37.74);
        assert_eq!(mission.bounds.north, 37.76);
        assert_eq!(mission.bounds.west, -122.43);
        assert_eq!(mission.bounds.east, -122.40);
        assert_eq!(mission.label(), "<b>94110</b>");
    }

    #[test]
    fn test_parse_venue_points() {
        let venues = parse_venue_points(fixtures::VENUES_GEOJSON, "barid").unwrap();
        assert_eq!(venues.len(), 3);
        assert_eq!(venues[0].barid, " A1 ");
        assert_eq!(venues[0].position, LatLng::new(37.759, -122.419));
        assert_eq!(venues[0].text("Neighborhood"), "Mission");
    }

    #[test]
    fn test_rejects_non_collection() {
        let err = parse_zip_polygons(r#"{"type": "Point", "coordinates": [0.0, 0.0]}"#).unwrap_err();
        assert!(matches!(err, LoadError::NotFeatureCollection("Geometry")));

        let err = parse_zip_polygons("not json").unwrap_err();
        assert!(matches!(err, LoadError::GeoJson(_)));
    }

    #[test]
    fn test_data_source_parse() {
        assert_eq!(
            DataSource::parse("https://example.com/a.csv"),
            DataSource::Url("https://example.com/a.csv".into())
        );
        assert_eq!(
            DataSource::parse("data/zips.geojson"),
            DataSource::Path(PathBuf::from("data/zips.geojson"))
        );
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(fixtures::ZIPS_GEOJSON.as_bytes()).unwrap();

        let source = DataSource::Path(file.path().to_path_buf());
        let zips = load_zip_polygons(&source, &reqwest::Client::new()).await.unwrap();
        assert_eq!(zips.len(), 3);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = DataSource::Path(dir.path().join("missing.geojson"));
        let err = load_zip_polygons(&source, &reqwest::Client::new()).await.unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
