//! Left outer join of sheet rows onto bar points
//!
//! Keys are compared trimmed and lower-cased. The first row for a key wins;
//! its values overwrite same-named point properties. Points without a row
//! pass through untouched and rows without a point are dropped.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::models::{AttributeRow, VenueFeature};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JoinStats {
    pub matched: usize,
    pub unmatched_points: usize,
    pub unused_rows: usize,
}

pub fn normalize_id(id: &str) -> String {
    id.trim().to_lowercase()
}

pub fn join_attributes(points: Vec<VenueFeature>, rows: &[AttributeRow], id_field: &str) -> Vec<VenueFeature> {
    join_with_stats(points, rows, id_field).0
}

pub fn join_with_stats(
    mut points: Vec<VenueFeature>,
    rows: &[AttributeRow],
    id_field: &str,
) -> (Vec<VenueFeature>, JoinStats) {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let key = normalize_id(row.get(id_field).unwrap_or_default());
        if !key.is_empty() {
            index.entry(key).or_insert(i);
        }
    }

    let mut stats = JoinStats::default();
    let mut used = vec![false; rows.len()];

    for point in points.iter_mut() {
        let key = normalize_id(&point.barid);
        match index.get(&key).filter(|_| !key.is_empty()) {
            Some(&i) => {
                for (header, value) in rows[i].iter() {
                    point.properties.insert(header.to_string(), Value::String(value.to_string()));
                }
                used[i] = true;
                stats.matched += 1;
            }
            None => stats.unmatched_points += 1,
        }
    }

    stats.unused_rows = used.iter().filter(|u| !**u).count();
    if stats.unused_rows > 0 {
        debug!("{} sheet rows matched no bar point", stats.unused_rows);
    }

    (points, stats)
}
