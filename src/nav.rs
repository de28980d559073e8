//! ZIP code navigation index

use std::collections::BTreeMap;

use crate::models::{zip_label, Bounds, ZipFeature};

#[derive(Debug, Clone, PartialEq)]
pub struct ZipEntry {
    pub bounds: Bounds,
    pub label: String,
}

/// Outcome of selecting a ZIP from the dropdown or list
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<'a> {
    Zip { zip: &'a str, entry: &'a ZipEntry },
    Reset,
}

#[derive(Debug, Clone, Default)]
pub struct NavigationIndex {
    entries: BTreeMap<String, ZipEntry>,
}

impl NavigationIndex {
    /// Features sharing a ZIP code merge into one entry covering all of them
    pub fn build(zips: &[ZipFeature]) -> Self {
        let mut entries: BTreeMap<String, ZipEntry> = BTreeMap::new();
        for z in zips {
            entries
                .entry(z.zip.clone())
                .and_modify(|e| e.bounds = e.bounds.union(&z.bounds))
                .or_insert_with(|| ZipEntry {
                    bounds: z.bounds,
                    label: zip_label(&z.zip),
                });
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, zip: &str) -> Option<&ZipEntry> {
        self.entries.get(zip.trim())
    }

    pub fn contains(&self, zip: &str) -> bool {
        self.get(zip).is_some()
    }

    /// Lexicographic ZIP list for the selector
    pub fn sorted_zips(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// ZIPs containing `query`; an empty query lists them all
    pub fn search(&self, query: &str) -> Vec<String> {
        let query = query.trim().to_lowercase();
        self.entries
            .keys()
            .filter(|zip| zip.to_lowercase().contains(&query))
            .cloned()
            .collect()
    }

    pub fn select(&self, zip: &str) -> Selection<'_> {
        match self.entries.get_key_value(zip.trim()) {
            Some((zip, entry)) => Selection::Zip { zip: zip.as_str(), entry },
            None => Selection::Reset,
        }
    }
}
