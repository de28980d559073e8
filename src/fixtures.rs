//! Small in-memory datasets shared by the unit tests

use crate::models::{AttributeRow, VenueFeature, ZipFeature};
use crate::store::{parse_venue_points, parse_zip_polygons};

pub const ZIPS_GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": {"zip_code": "94110"},
      "geometry": {"type": "Polygon", "coordinates": [[[-122.43, 37.74], [-122.40, 37.74], [-122.40, 37.76], [-122.43, 37.76], [-122.43, 37.74]]]}
    },
    {
      "type": "Feature",
      "properties": {"ZIPCODE": "94103"},
      "geometry": {"type": "Polygon", "coordinates": [[[-122.42, 37.76], [-122.40, 37.76], [-122.40, 37.78], [-122.42, 37.78], [-122.42, 37.76]]]}
    },
    {
      "type": "Feature",
      "properties": {"name": "94102"},
      "geometry": {"type": "MultiPolygon", "coordinates": [[[[-122.43, 37.77], [-122.41, 37.77], [-122.41, 37.79], [-122.43, 37.77]]]]}
    },
    {
      "type": "Feature",
      "properties": {"zip_code": "94999"},
      "geometry": {"type": "Point", "coordinates": [-122.4, 37.7]}
    }
  ]
}"#;

pub const VENUES_GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": {"barid": " A1 ", "Neighborhood": "Mission"},
      "geometry": {"type": "Point", "coordinates": [-122.419, 37.759]}
    },
    {
      "type": "Feature",
      "properties": {"barid": "b2", "Neighborhood": "SoMa"},
      "geometry": {"type": "Point", "coordinates": [-122.405, 37.778]}
    },
    {
      "type": "Feature",
      "properties": {"barid": "X1", "Neighborhood": "Tenderloin", "countofattendees": 6},
      "geometry": {"type": "Point", "coordinates": [-122.414, 37.784]}
    },
    {
      "type": "Feature",
      "properties": {"barid": "nowhere"},
      "geometry": null
    }
  ]
}"#;

pub const SHEET_CSV: &str = "\
barid,Bar Name,St Address,Style,CountOfAttendees,Happy Hour,Allison,Ben,Comments
a1,Irish Tavern,3200 24th St,Dive,3,4-7pm,yes,,Great jukebox
B2,Wine Bar,500 Howard St,Wine,1,,no,yes,
zz9,Ghost Bar,1 Nowhere,Dive,9,,,,
";

pub fn zips() -> Vec<ZipFeature> {
    parse_zip_polygons(ZIPS_GEOJSON).expect("zip fixture parses")
}

pub fn venues() -> Vec<VenueFeature> {
    parse_venue_points(VENUES_GEOJSON, "barid").expect("venue fixture parses")
}

pub fn rows() -> Vec<AttributeRow> {
    crate::sheet::parse_attribute_rows(SHEET_CSV, "barid").expect("sheet fixture parses")
}
