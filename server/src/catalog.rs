use std::path::Path;

use bytes::Bytes;
use tracing::{info, warn};
use visitmap_shared::FeatureCollection;

/// Region GeoJSON and the names that may be marked visited.
#[derive(Debug, Clone)]
pub struct RegionCatalog {
    pub area_property: String,
    /// Raw GeoJSON served to the client untouched.
    pub geojson: Bytes,
    /// Sorted names found under `area_property`.
    pub available: Vec<String>,
}

impl RegionCatalog {
    pub fn empty(area_property: impl Into<String>) -> Self {
        Self {
            area_property: area_property.into(),
            geojson: Bytes::from_static(br#"{"type":"FeatureCollection","features":[]}"#),
            available: Vec::new(),
        }
    }

    pub fn from_bytes(geojson: Bytes, area_property: impl Into<String>) -> Result<Self, String> {
        let area_property = area_property.into();
        let collection: FeatureCollection =
            serde_json::from_slice(&geojson).map_err(|e| format!("invalid GeoJSON: {e}"))?;
        let available = collection.area_names(&area_property);
        Ok(Self {
            area_property,
            geojson,
            available,
        })
    }

    /// Load the catalog, degrading to an empty one when the file is missing or invalid.
    pub async fn load_or_empty(path: &Path, area_property: &str) -> Self {
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, path = %path.display(), "GeoJSON file not readable, serving an empty map");
                return Self::empty(area_property);
            }
        };

        match Self::from_bytes(Bytes::from(raw), area_property) {
            Ok(catalog) => {
                if catalog.available.is_empty() {
                    warn!(
                        area_property,
                        "no area names found in GeoJSON under the configured property"
                    );
                } else {
                    info!(areas = catalog.available.len(), "loaded region catalog");
                }
                catalog
            }
            Err(e) => {
                warn!(error = %e, path = %path.display(), "failed to load GeoJSON, serving an empty map");
                Self::empty(area_property)
            }
        }
    }

    pub fn contains(&self, area_name: &str) -> bool {
        self.available
            .binary_search_by(|candidate| candidate.as_str().cmp(area_name))
            .is_ok()
    }
}
