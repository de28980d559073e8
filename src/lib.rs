//! SF bar map
//!
//! Filterable map state for San Francisco ZIP code boundaries and a curated
//! list of bars. ZIP polygons and bar points are loaded from static GeoJSON,
//! bar attributes are joined in from a remote CSV sheet, and a single
//! [`controller::MapController`] drives a [`render::MapView`] from UI events.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod join;
pub mod loader;
pub mod models;
pub mod nav;
pub mod render;
pub mod sheet;
pub mod store;
pub mod view;

#[cfg(test)]
pub(crate) mod fixtures;
