//! Private store of exact station coordinates.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{ExactCoordinate, StationId};

use super::error::StoreError;
use super::{read_file, write_file};

/// Mapping of station id to exact coordinate.
///
/// Append-only: an id, once stored, keeps its coordinate forever. The
/// only way to add an entry is [`LocationStore::insert_new`], which
/// refuses to overwrite.
///
/// Persisted as a JSON object ordered by id:
/// `{"HR0001": ["15.9790", "45.8150"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationStore {
    entries: BTreeMap<StationId, ExactCoordinate>,
}

impl LocationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store from disk.
    ///
    /// A missing file is an empty store (first run); an unreadable or
    /// malformed file is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let Some(contents) = read_file(path)? else {
            info!(path = %path.display(), "no location store yet, starting empty");
            return Ok(Self::new());
        };

        serde_json::from_str(&contents).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the whole store to disk.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        let mut json = serde_json::to_vec_pretty(self).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        json.push(b'\n');
        write_file(path, &json)
    }

    /// Add a coordinate for a station not yet in the store.
    ///
    /// Returns `false`, leaving the stored value untouched, if the station
    /// already has a coordinate.
    pub fn insert_new(&mut self, id: StationId, coordinate: ExactCoordinate) -> bool {
        match self.entries.entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(coordinate);
                true
            }
        }
    }

    /// Look up a station's exact coordinate.
    pub fn get(&self, id: &StationId) -> Option<&ExactCoordinate> {
        self.entries.get(id)
    }

    /// Check whether a station is known.
    pub fn contains(&self, id: &StationId) -> bool {
        self.entries.contains_key(id)
    }

    /// Iterate over all entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&StationId, &ExactCoordinate)> {
        self.entries.iter()
    }

    /// Number of stations in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(StationId, ExactCoordinate)> for LocationStore {
    fn from_iter<I: IntoIterator<Item = (StationId, ExactCoordinate)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (id, coordinate) in iter {
            store.insert_new(id, coordinate);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn id(s: &str) -> StationId {
        StationId::parse(s).unwrap()
    }

    fn coord(lon: &str, lat: &str) -> ExactCoordinate {
        ExactCoordinate::new(lon, lat).unwrap()
    }

    #[test]
    fn insert_new_never_overwrites() {
        let mut store = LocationStore::new();
        assert!(store.insert_new(id("AB0001"), coord("10.000", "45.000")));
        assert!(!store.insert_new(id("AB0001"), coord("11.000", "46.000")));
        assert_eq!(store.get(&id("AB0001")), Some(&coord("10.000", "45.000")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("exact_locations.json");

        let store: LocationStore = [
            (id("HR0001"), coord("15.9790", "45.8150")),
            (id("NL0001"), coord("5.1214", "52.0907")),
        ]
        .into_iter()
        .collect();

        store.save(&path).unwrap();
        let loaded = LocationStore::load(&path).unwrap();
        assert_eq!(loaded, store);
        assert_eq!(loaded.get(&id("NL0001")).unwrap().lat_str(), "52.0907");
    }

    #[test]
    fn file_format_is_id_keyed_object() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("exact_locations.json");
        let store: LocationStore = [(id("AB0001"), coord("10.000", "45.000"))]
            .into_iter()
            .collect();
        store.save(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["AB0001"], serde_json::json!(["10.000", "45.000"]));
    }

    #[test]
    fn missing_file_is_empty_store() {
        let dir = tempdir().unwrap();
        let store = LocationStore::load(dir.path().join("absent.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("exact_locations.json");
        std::fs::write(&path, r#"{"AB0001": ["east", "45.0"]}"#).unwrap();
        assert!(matches!(
            LocationStore::load(&path),
            Err(StoreError::Json { .. })
        ));
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("exact_locations.json");
        LocationStore::new().save(&path).unwrap();
        assert!(path.exists());
    }
}
