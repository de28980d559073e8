//! Venue visibility and the count colour scale

use serde::{Deserialize, Serialize};

use crate::config::FieldNames;
use crate::models::VenueFeature;

/// Current filter inputs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub min_count: u32,
    /// Empty means any style
    pub style: String,
    /// Empty means no name search
    pub search: String,
}

impl FilterState {
    /// Normalized search text; empty when no search is active
    pub fn search_term(&self) -> String {
        self.search.trim().to_lowercase()
    }

    pub fn has_search(&self) -> bool {
        !self.search.trim().is_empty()
    }
}

/// A venue is visible when all three conditions hold
pub fn is_visible(venue: &VenueFeature, filters: &FilterState, fields: &FieldNames) -> bool {
    meets_min_count(venue, filters, fields) && matches_style(venue, filters, fields) && matches_search(venue, filters, fields)
}

fn meets_min_count(venue: &VenueFeature, filters: &FilterState, fields: &FieldNames) -> bool {
    venue.number(&fields.count) >= f64::from(filters.min_count)
}

fn matches_style(venue: &VenueFeature, filters: &FilterState, fields: &FieldNames) -> bool {
    filters.style.is_empty() || venue.text(&fields.style).to_lowercase() == filters.style.to_lowercase()
}

fn matches_search(venue: &VenueFeature, filters: &FilterState, fields: &FieldNames) -> bool {
    let term = filters.search_term();
    term.is_empty() || venue.text(&fields.name).to_lowercase().contains(&term)
}

/// Lower bounds (exclusive) of the colour buckets, darkest first
pub const COLOR_STEPS: [(f64, &str); 6] = [
    (5.0, "#800026"),
    (4.0, "#BD0026"),
    (3.0, "#E31A1C"),
    (2.0, "#FC4E2A"),
    (1.0, "#FD8D3C"),
    (0.0, "#FEB24C"),
];

pub const ZERO_COLOR: &str = "#FFEDA0";

pub fn fill_color(count: f64) -> &'static str {
    COLOR_STEPS
        .iter()
        .find(|(floor, _)| count > *floor)
        .map(|(_, color)| *color)
        .unwrap_or(ZERO_COLOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LatLng;
    use serde_json::json;

    fn venue(name: &str, style: &str, count: serde_json::Value) -> VenueFeature {
        VenueFeature {
            barid: "v".into(),
            position: LatLng::new(37.77, -122.42),
            properties: json!({"Bar Name": name, "Style": style, "CountOfAttendees": count})
                .as_object()
                .cloned()
                .unwrap(),
        }
    }

    fn filters(min_count: u32, style: &str, search: &str) -> FilterState {
        FilterState {
            min_count,
            style: style.into(),
            search: search.into(),
        }
    }

    #[test]
    fn test_default_filters_show_everything() {
        let fields = FieldNames::default();
        let v = venue("", "", json!(null));
        assert!(is_visible(&v, &FilterState::default(), &fields));
    }

    #[test]
    fn test_min_count_condition() {
        let fields = FieldNames::default();
        let v = venue("Irish Tavern", "Dive", json!("3"));
        assert!(is_visible(&v, &filters(3, "", ""), &fields));
        assert!(!is_visible(&v, &filters(4, "", ""), &fields));

        let unparseable = venue("Irish Tavern", "Dive", json!("lots"));
        assert!(is_visible(&unparseable, &filters(0, "", ""), &fields));
        assert!(!is_visible(&unparseable, &filters(1, "", ""), &fields));
    }

    #[test]
    fn test_style_condition() {
        let fields = FieldNames::default();
        let v = venue("Irish Tavern", "Dive", json!(3));
        assert!(is_visible(&v, &filters(0, "dive", ""), &fields));
        assert!(is_visible(&v, &filters(0, "DIVE", ""), &fields));
        assert!(!is_visible(&v, &filters(0, "Wine", ""), &fields));
        assert!(!is_visible(&v, &filters(0, "Div", ""), &fields));
    }

    #[test]
    fn test_search_condition() {
        let fields = FieldNames::default();
        let v = venue("Irish Tavern", "Dive", json!(3));
        assert!(is_visible(&v, &filters(0, "", "tavern"), &fields));
        assert!(is_visible(&v, &filters(0, "", "  IRISH "), &fields));
        assert!(!is_visible(&v, &filters(0, "", "wine"), &fields));
    }

    #[test]
    fn test_conditions_combine_with_and() {
        let fields = FieldNames::default();
        let v = venue("Irish Tavern", "Dive", json!(3));
        assert!(is_visible(&v, &filters(2, "dive", "irish"), &fields));
        assert!(!is_visible(&v, &filters(5, "dive", "irish"), &fields));
        assert!(!is_visible(&v, &filters(2, "wine", "irish"), &fields));
        assert!(!is_visible(&v, &filters(2, "dive", "wine"), &fields));
    }

    #[test]
    fn test_color_steps_darken_with_count() {
        assert_eq!(fill_color(6.0), "#800026");
        assert_eq!(fill_color(5.0), "#BD0026");
        assert_eq!(fill_color(1.5), "#FD8D3C");
        assert_eq!(fill_color(0.5), "#FEB24C");
        assert_eq!(fill_color(0.0), ZERO_COLOR);
        assert_eq!(fill_color(-1.0), ZERO_COLOR);

        let counts = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let buckets: Vec<usize> = counts
            .iter()
            .map(|c| COLOR_STEPS.iter().position(|(_, col)| *col == fill_color(*c)).unwrap_or(COLOR_STEPS.len()))
            .collect();
        assert!(buckets.windows(2).all(|w| w[0] >= w[1]));
    }
}
