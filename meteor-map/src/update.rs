//! The update run: reconcile with the remote, then publish new stations.

use rand::Rng;
use tracing::info;

use crate::config::AppConfig;
use crate::obfuscate::{ObfuscateReport, obfuscate};
use crate::reconcile::{ReconcileError, ReconcileReport, Reconciler};
use crate::remote::{RemoteError, RemoteSource};
use crate::store::{LocationStore, PublicDataset, StoreError};

/// Errors that stop an update run.
///
/// Every variant is raised before either store is written, except a
/// failure to save the public dataset after the location store was saved.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    /// A store could not be read or written
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The remote could not be opened
    #[error("cannot open remote: {0}")]
    Remote(#[from] RemoteError),

    /// The remote could not be listed or lists nothing
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

/// Outcome of an update run.
#[derive(Debug)]
pub struct UpdateReport {
    pub reconcile: ReconcileReport,
    pub obfuscate: ObfuscateReport,
}

/// Run one update against the stores named in `config`.
///
/// The remote is opened with `open` and closed again once reconciliation
/// is done. The location store is saved before publishing starts.
pub fn update_stations<S, F, R>(
    config: &AppConfig,
    open: F,
    rng: &mut R,
) -> Result<UpdateReport, UpdateError>
where
    S: RemoteSource,
    F: FnOnce() -> Result<S, RemoteError>,
    R: Rng + ?Sized,
{
    let mut store = LocationStore::load(&config.locations_path)?;
    let mut dataset = PublicDataset::load(&config.sites_path)?;
    info!(
        exact = store.len(),
        published = dataset.len(),
        "loaded stores"
    );

    let reconcile = {
        let source = open()?;
        Reconciler::new(&source, &config.remote_root, &config.ignore).run(&mut store)?
    };
    store.save(&config.locations_path)?;

    let obfuscate = obfuscate(
        &reconcile.remote_ids,
        &store,
        &mut dataset,
        &config.ignore,
        rng,
    );
    dataset.save(&config.sites_path)?;

    info!(
        added = reconcile.added.len(),
        failed = reconcile.failed.len(),
        published = obfuscate.published.len(),
        "update complete"
    );
    Ok(UpdateReport {
        reconcile,
        obfuscate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MirrorSource;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::path::Path;
    use tempfile::tempdir;

    const LOCATIONS: &str = "{\n  \"AB0001\": [\"1.0\", \"2.0\"]\n}\n";
    const SITES: &str = "[\n    {\n        \"type\": \"Feature\",\n        \"geometry\": {\"type\": \"Point\", \"coordinates\": [1.01, 2.01]},\n        \"properties\": {\"id\": \"AB0001\", \"name\": \"\"}\n    }\n]\n";

    fn config_in(dir: &Path) -> AppConfig {
        AppConfig {
            remote_root: "data".to_string(),
            locations_path: dir.join("exact_locations.json"),
            sites_path: dir.join("rms-sites.json"),
            ..AppConfig::default()
        }
    }

    fn write_stores(config: &AppConfig) {
        std::fs::write(&config.locations_path, LOCATIONS).unwrap();
        std::fs::write(&config.sites_path, SITES).unwrap();
    }

    fn add_station(mirror: &Path, id: &str, lon: &str, lat: &str) {
        let obs = mirror.join("data").join(id).join(format!("{id}_20240101"));
        std::fs::create_dir_all(&obs).unwrap();
        std::fs::write(
            obs.join(".config"),
            format!("[System]\nlongitude: {lon}\nlatitude: {lat}\n"),
        )
        .unwrap();
    }

    #[test]
    fn empty_remote_writes_nothing() {
        let dir = tempdir().unwrap();
        let mirror = tempdir().unwrap();
        std::fs::create_dir(mirror.path().join("data")).unwrap();
        let config = config_in(dir.path());
        write_stores(&config);

        let result = update_stations(
            &config,
            || Ok(MirrorSource::new(mirror.path())),
            &mut StdRng::seed_from_u64(1),
        );

        assert!(matches!(
            result,
            Err(UpdateError::Reconcile(ReconcileError::NoStations { .. }))
        ));
        assert_eq!(std::fs::read_to_string(&config.locations_path).unwrap(), LOCATIONS);
        assert_eq!(std::fs::read_to_string(&config.sites_path).unwrap(), SITES);
    }

    #[test]
    fn unopenable_remote_writes_nothing() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        write_stores(&config);

        let result = update_stations(
            &config,
            || -> Result<MirrorSource, RemoteError> {
                Err(RemoteError::Connect("refused".to_string()))
            },
            &mut StdRng::seed_from_u64(1),
        );

        assert!(matches!(result, Err(UpdateError::Remote(_))));
        assert_eq!(std::fs::read_to_string(&config.locations_path).unwrap(), LOCATIONS);
        assert_eq!(std::fs::read_to_string(&config.sites_path).unwrap(), SITES);
    }

    #[test]
    fn corrupt_store_aborts_before_opening_remote() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        std::fs::write(&config.sites_path, "not json").unwrap();

        let mut opened = false;
        let result = update_stations(
            &config,
            || {
                opened = true;
                Ok(MirrorSource::new(dir.path()))
            },
            &mut StdRng::seed_from_u64(1),
        );

        assert!(matches!(result, Err(UpdateError::Store(_))));
        assert!(!opened);
        assert!(!config.locations_path.exists());
    }

    #[test]
    fn new_station_is_stored_and_published() {
        let dir = tempdir().unwrap();
        let mirror = tempdir().unwrap();
        add_station(mirror.path(), "AB0001", "1.0", "2.0");
        add_station(mirror.path(), "AB0002", "10.000", "45.000");
        let config = config_in(dir.path());
        write_stores(&config);

        let report = update_stations(
            &config,
            || Ok(MirrorSource::new(mirror.path())),
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap();

        assert_eq!(report.reconcile.added.len(), 1);
        assert_eq!(report.obfuscate.published.len(), 1);

        let store = LocationStore::load(&config.locations_path).unwrap();
        assert_eq!(store.len(), 2);
        let dataset = PublicDataset::load(&config.sites_path).unwrap();
        let ids: Vec<String> = dataset.records().iter().map(|r| r.id_string()).collect();
        assert_eq!(ids, vec!["AB0001", "AB0002"]);
    }
}
