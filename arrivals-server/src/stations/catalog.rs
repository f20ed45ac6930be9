//! Static station topology and the stop → station index.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::domain::{StationId, StationInfo};

use super::error::CatalogError;

/// Immutable station topology.
///
/// Loaded once at startup and shared read-only for the lifetime of the
/// process. The stop index is derived at construction and never changes.
#[derive(Debug)]
pub struct StationCatalog {
    stations: BTreeMap<StationId, StationInfo>,
    stop_index: HashMap<String, StationId>,
}

impl StationCatalog {
    /// Load the topology from a JSON file mapping station id to station info.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let catalog = Self::from_json(&contents)?;
        tracing::info!(
            path = %path.display(),
            stations = catalog.len(),
            stops = catalog.stop_count(),
            "loaded station topology"
        );

        Ok(catalog)
    }

    /// Parse the topology from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let stations: BTreeMap<StationId, StationInfo> = serde_json::from_str(json)?;
        Self::from_stations(stations)
    }

    /// Build a catalog from already-parsed stations.
    pub fn from_stations(
        mut stations: BTreeMap<StationId, StationInfo>,
    ) -> Result<Self, CatalogError> {
        if stations.is_empty() {
            return Err(CatalogError::Empty);
        }

        // The map key is the identifier; a duplicate in the body would be
        // emitted twice when the station is serialized.
        for info in stations.values_mut() {
            info.extra.remove("id");
        }

        let stop_index = build_stop_index(&stations);

        Ok(Self {
            stations,
            stop_index,
        })
    }

    /// Look up a station by id.
    pub fn station(&self, id: &str) -> Option<&StationInfo> {
        self.stations.get(id)
    }

    /// All stations, ordered by id.
    pub fn stations(&self) -> impl Iterator<Item = (&StationId, &StationInfo)> {
        self.stations.iter()
    }

    /// Resolve a feed stop id to the station that owns it.
    pub fn station_for_stop(&self, stop_id: &str) -> Option<&StationId> {
        self.stop_index.get(stop_id)
    }

    /// Number of stations.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Whether the catalog has no stations.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Number of distinct stop ids in the index.
    pub fn stop_count(&self) -> usize {
        self.stop_index.len()
    }
}

/// Invert every station's stop list.
///
/// A stop listed under two stations resolves to whichever comes last in id
/// order; topology files are expected to be stop-unique.
fn build_stop_index(stations: &BTreeMap<StationId, StationInfo>) -> HashMap<String, StationId> {
    let mut index = HashMap::new();
    for (station_id, info) in stations {
        for stop_id in &info.stops {
            if let Some(previous) = index.insert(stop_id.clone(), station_id.clone()) {
                tracing::debug!(
                    %stop_id,
                    %previous,
                    %station_id,
                    "stop listed under two stations"
                );
            }
        }
    }
    index
}
