//! Reconciliation of remote stations with the exact location store.
//!
//! Each run lists the station directories on the remote, works out which
//! stations the [`LocationStore`] has never seen, and reads their
//! coordinates from the newest observation directory's `.config` file.
//! A station that cannot be read is logged and retried on the next run;
//! only a remote that cannot be listed, or lists nothing, stops the run.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::config::IgnoreList;
use crate::domain::{ExactCoordinate, InvalidCoordinate, STATION_ID_LEN, StationId};
use crate::remote::{ConfigFile, ConfigFileError, RemoteError, RemoteSource, join_path};
use crate::store::LocationStore;

/// Name of the per-observation configuration file.
pub const CONFIG_FILE_NAME: &str = ".config";

/// Config section holding the station location.
const LOCATION_SECTION: &str = "System";

/// Errors that abort a reconciliation run.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The station root could not be listed
    #[error("cannot list stations under {root}: {source}")]
    ListStations {
        root: String,
        #[source]
        source: RemoteError,
    },

    /// The remote answered but reported no stations at all
    #[error("remote reports no stations under {root}")]
    NoStations { root: String },
}

/// Why one station's coordinate could not be fetched.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Listing or reading failed
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The station directory holds no observation directories
    #[error("no observation directories under {0}")]
    NoObservations(String),

    /// The config file is malformed or lacks a location
    #[error("{path}: {source}")]
    Config {
        path: String,
        #[source]
        source: ConfigFileError,
    },

    /// The location values are not valid coordinates
    #[error("{path}: {source}")]
    Coordinate {
        path: String,
        #[source]
        source: InvalidCoordinate,
    },
}

/// Outcome of a reconciliation run.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    /// Every station id the remote lists (ignored ones included)
    pub remote_ids: BTreeSet<StationId>,
    /// Stations added to the location store this run
    pub added: Vec<StationId>,
    /// New stations whose coordinate could not be fetched
    pub failed: Vec<(StationId, FetchError)>,
    /// New stations skipped because they are on the ignore-list
    pub ignored: Vec<StationId>,
}

/// Brings the location store up to date with the remote.
pub struct Reconciler<'a, S: RemoteSource + ?Sized> {
    source: &'a S,
    root: &'a str,
    ignore: &'a IgnoreList,
}

impl<'a, S: RemoteSource + ?Sized> Reconciler<'a, S> {
    /// Create a reconciler reading station directories under `root`.
    pub fn new(source: &'a S, root: &'a str, ignore: &'a IgnoreList) -> Self {
        Self {
            source,
            root,
            ignore,
        }
    }

    /// List the station ids present on the remote.
    ///
    /// Only six-character entries that parse as station ids count.
    pub fn remote_stations(&self) -> Result<BTreeSet<StationId>, ReconcileError> {
        let names = self
            .source
            .list_dir(self.root)
            .map_err(|source| ReconcileError::ListStations {
                root: self.root.to_string(),
                source,
            })?;

        let ids: BTreeSet<StationId> = names
            .iter()
            .filter(|name| name.len() == STATION_ID_LEN)
            .filter_map(|name| match StationId::parse(name) {
                Ok(id) => Some(id),
                Err(e) => {
                    debug!(error = %e, "ignoring non-station entry");
                    None
                }
            })
            .collect();

        if ids.is_empty() {
            return Err(ReconcileError::NoStations {
                root: self.root.to_string(),
            });
        }

        Ok(ids)
    }

    /// Read a station's exact coordinate from its newest observation.
    pub fn fetch_coordinate(&self, id: &StationId) -> Result<ExactCoordinate, FetchError> {
        let station_path = join_path(&[self.root, id.as_str()]);
        let latest = self
            .source
            .list_dir(&station_path)?
            .into_iter()
            .max()
            .ok_or_else(|| FetchError::NoObservations(station_path.clone()))?;

        let config_path = join_path(&[station_path.as_str(), latest.as_str(), CONFIG_FILE_NAME]);
        let reader = self.source.open_file(&config_path)?;

        let config_err = |source| FetchError::Config {
            path: config_path.clone(),
            source,
        };
        let config = ConfigFile::from_reader(reader).map_err(config_err)?;
        let longitude = config
            .require(LOCATION_SECTION, "Longitude")
            .map_err(config_err)?;
        let latitude = config
            .require(LOCATION_SECTION, "Latitude")
            .map_err(config_err)?;

        ExactCoordinate::new(longitude, latitude).map_err(|source| FetchError::Coordinate {
            path: config_path.clone(),
            source,
        })
    }

    /// Fetch coordinates for every remote station missing from `store`.
    ///
    /// Existing entries are never touched. Fails before modifying the
    /// store if the remote cannot be listed or lists no stations.
    pub fn run(&self, store: &mut LocationStore) -> Result<ReconcileReport, ReconcileError> {
        let remote_ids = self.remote_stations()?;
        let new_ids: Vec<StationId> = remote_ids
            .iter()
            .filter(|id| !store.contains(id))
            .copied()
            .collect();

        info!(
            remote = remote_ids.len(),
            known = store.len(),
            new = new_ids.len(),
            "reconciling stations"
        );

        let mut report = ReconcileReport {
            remote_ids,
            ..Default::default()
        };

        for id in new_ids {
            if self.ignore.contains(&id) {
                debug!(station = %id, "station is on the ignore-list");
                report.ignored.push(id);
                continue;
            }

            match self.fetch_coordinate(&id) {
                Ok(coordinate) => {
                    debug!(station = %id, %coordinate, "fetched exact location");
                    store.insert_new(id, coordinate);
                    report.added.push(id);
                }
                Err(e) => {
                    warn!(station = %id, error = %e, "could not fetch station location");
                    report.failed.push((id, e));
                }
            }
        }

        info!(
            added = report.added.len(),
            failed = report.failed.len(),
            ignored = report.ignored.len(),
            "reconciliation finished"
        );

        Ok(report)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::remote::MemorySource;
    use proptest::prelude::*;

    proptest! {
        /// Known stations keep their coordinate whatever the remote says
        #[test]
        fn known_coordinates_are_immutable(
            lon in -180.0f64..180.0,
            lat in -90.0f64..90.0,
            remote_lon in -180.0f64..180.0,
            remote_lat in -90.0f64..90.0,
        ) {
            let station = StationId::parse("AB0001").unwrap();
            let src = MemorySource::new().with_file(
                "root/AB0001/AB0001_20240101/.config",
                format!("[System]\nlongitude = {remote_lon}\nlatitude = {remote_lat}\n"),
            );
            let original = ExactCoordinate::new(format!("{lon}"), format!("{lat}")).unwrap();
            let mut store = LocationStore::new();
            store.insert_new(station, original.clone());

            let ignore = IgnoreList::new();
            let report = Reconciler::new(&src, "root", &ignore).run(&mut store).unwrap();

            prop_assert!(report.added.is_empty());
            prop_assert_eq!(store.get(&station), Some(&original));
        }
    }
}
