//! Public site list rendered by the meteor map.
//!
//! The file is a JSON array of GeoJSON-like features:
//!
//! ```json
//! {
//!     "type": "Feature",
//!     "geometry": {"type": "Point", "coordinates": [15.98, 45.81]},
//!     "properties": {"id": "HR0001,HR0002", "name": "Zagreb", "lens": "4mm", "link": "..."}
//! }
//! ```
//!
//! Records are addressed by position, so removal helpers always delete
//! from the highest index down.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use tracing::{info, warn};

use crate::domain::{ApproxCoordinate, StationId};

use super::error::StoreError;
use super::{read_file, write_file};

/// One published map marker, possibly covering several co-located stations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Feature", into = "Feature")]
pub struct PublicRecord {
    /// Ids at this site as published; the first one owns the record.
    ///
    /// Kept as written: legacy entries need not be valid station ids, and
    /// only the valid ones take part in lookups.
    pub ids: Vec<String>,
    /// Jittered location shown on the map.
    pub location: ApproxCoordinate,
    /// Human-readable station name.
    pub name: String,
    /// Lens description, if known.
    pub lens: Option<String>,
    /// Link to the station's page, if known.
    pub link: Option<String>,
    /// Any other properties found in the file, written back unchanged.
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PublicRecord {
    /// Create a record for a single station with empty metadata.
    pub fn new(id: StationId, location: ApproxCoordinate) -> Self {
        Self {
            ids: vec![id.to_string()],
            location,
            name: String::new(),
            lens: None,
            link: None,
            extra: serde_json::Map::new(),
        }
    }

    /// The comma-joined id string as published.
    pub fn id_string(&self) -> String {
        self.ids.join(",")
    }

    /// The ids that are valid station ids, in order.
    pub fn station_ids(&self) -> impl Iterator<Item = StationId> + '_ {
        self.ids.iter().filter_map(|id| StationId::parse(id).ok())
    }
}

#[derive(Serialize, Deserialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: String,
    geometry: Geometry,
    properties: Properties,
}

#[derive(Serialize, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    coordinates: ApproxCoordinate,
}

#[derive(Serialize, Deserialize)]
struct Properties {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lens: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    link: Option<String>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl From<Feature> for PublicRecord {
    fn from(feature: Feature) -> Self {
        let props = feature.properties;
        Self {
            ids: props
                .id
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect(),
            location: feature.geometry.coordinates,
            name: props.name,
            lens: props.lens,
            link: props.link,
            extra: props.extra,
        }
    }
}

impl From<PublicRecord> for Feature {
    fn from(record: PublicRecord) -> Self {
        Feature {
            kind: "Feature".to_string(),
            geometry: Geometry {
                kind: "Point".to_string(),
                coordinates: record.location,
            },
            properties: Properties {
                id: record.ids.join(","),
                name: record.name,
                lens: record.lens,
                link: record.link,
                extra: record.extra,
            },
        }
    }
}

/// Ordered list of public records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicDataset {
    records: Vec<PublicRecord>,
}

impl PublicDataset {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the dataset from disk.
    ///
    /// A missing file is an empty dataset.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let Some(contents) = read_file(path)? else {
            info!(path = %path.display(), "no site list yet, starting empty");
            return Ok(Self::new());
        };

        let dataset: Self = serde_json::from_str(&contents).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        for (index, record) in dataset.records.iter().enumerate() {
            for id in record.ids.iter().filter(|id| StationId::parse(id).is_err()) {
                warn!(record = index, id = %id, "public id is not a station id, left as is");
            }
        }
        Ok(dataset)
    }

    /// Write the whole dataset to disk.
    ///
    /// Pretty-printed with four-space indentation, non-ASCII kept as-is,
    /// and a trailing newline.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        let mut json = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut json, formatter);
        self.serialize(&mut serializer)
            .map_err(|source| StoreError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        json.push(b'\n');
        write_file(path, &json)
    }

    /// All records in order.
    pub fn records(&self) -> &[PublicRecord] {
        &self.records
    }

    /// Mutable access to all records, for in-place metadata updates.
    pub fn records_mut(&mut self) -> &mut [PublicRecord] {
        &mut self.records
    }

    /// Append a record at the end.
    pub fn push(&mut self, record: PublicRecord) {
        self.records.push(record);
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every station id that has a public record.
    pub fn published_ids(&self) -> HashSet<StationId> {
        self.records
            .iter()
            .flat_map(|r| r.station_ids())
            .collect()
    }

    /// Map each published station id to the index of its record.
    ///
    /// If an id appears in more than one record the later record wins.
    pub fn record_index(&self) -> HashMap<StationId, usize> {
        self.records
            .iter()
            .enumerate()
            .flat_map(|(i, r)| r.station_ids().map(move |id| (id, i)))
            .collect()
    }

    /// Approximate location of every published station id.
    pub fn approx_locations(&self) -> Vec<(StationId, ApproxCoordinate)> {
        self.records
            .iter()
            .flat_map(|r| r.station_ids().map(|id| (id, r.location)))
            .collect()
    }

    /// Remove the records at the given indices.
    ///
    /// Indices are deleted highest first so earlier removals do not shift
    /// later ones. Duplicates and out-of-range indices are ignored.
    pub fn remove_indices(&mut self, indices: &[usize]) -> Vec<PublicRecord> {
        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let mut removed = Vec::new();
        for &i in sorted.iter().rev() {
            if i < self.records.len() {
                removed.push(self.records.remove(i));
            }
        }
        removed
    }
}
