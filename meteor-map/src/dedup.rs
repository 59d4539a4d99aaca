//! Merging of public records that describe the same physical site.
//!
//! Two records are duplicates when stations in them share an identical
//! exact coordinate. Each call to [`deduplicate`] merges exactly one such
//! cluster and is meant to be run repeatedly until none remain: a wrong
//! merge then affects a single site and is easy to spot in the diff.
//!
//! Before merging, every published station whose public location has
//! drifted more than [`FAR_THRESHOLD_KM`] from its exact location is
//! reported. Those reports never change the dataset.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use tracing::{info, warn};

use crate::domain::{ApproxCoordinate, ExactCoordinate, StationId};
use crate::store::{LocationStore, PublicDataset};

/// Distance beyond which a public location is reported as suspicious.
pub const FAR_THRESHOLD_KM: f64 = 3.5;

/// A station published too far from its true position.
#[derive(Debug, Clone, PartialEq)]
pub struct FarStation {
    pub id: StationId,
    pub approx: ApproxCoordinate,
    pub exact: ExactCoordinate,
    pub distance_km: f64,
}

impl fmt::Display for FarStation {
    /// Tab-separated: id, approx, exact, distance in km.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{:.3}",
            self.id, self.approx, self.exact, self.distance_km
        )
    }
}

/// One merge performed by [`deduplicate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Merge {
    /// The shared exact coordinate
    pub location: ExactCoordinate,
    /// Record indices and id strings of the cluster, before merging
    pub members: Vec<(usize, String)>,
    /// Index of the record that absorbed the others
    pub survivor: usize,
    /// Ids appended to the survivor, as published
    pub appended: Vec<String>,
}

/// Outcome of a deduplication run.
#[derive(Debug, Default, PartialEq)]
pub struct DedupReport {
    /// Stations whose public location is far from the exact one
    pub far: Vec<FarStation>,
    /// Published stations with no exact location on record
    pub unknown: Vec<StationId>,
    /// Duplicate clusters found before merging
    pub clusters: usize,
    /// The merge performed, if any cluster was found
    pub merge: Option<Merge>,
}

/// Published stations whose public location lies more than
/// `threshold_km` from their exact location, in record order.
pub fn find_far_stations(
    dataset: &PublicDataset,
    store: &LocationStore,
    threshold_km: f64,
) -> Vec<FarStation> {
    dataset
        .approx_locations()
        .into_iter()
        .filter_map(|(id, approx)| {
            let exact = store.get(&id)?;
            let distance_km = approx.distance_km(exact);
            (distance_km > threshold_km).then(|| FarStation {
                id,
                approx,
                exact: exact.clone(),
                distance_km,
            })
        })
        .collect()
}

/// A set of records whose stations share one exact coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub location: ExactCoordinate,
    /// Record indices, ascending, at least two
    pub indices: Vec<usize>,
}

/// Group records by the exact coordinates of their stations.
///
/// Returns the duplicate clusters ordered by their lowest record index,
/// and the published ids that have no exact coordinate.
pub fn find_clusters(
    dataset: &PublicDataset,
    store: &LocationStore,
) -> (Vec<Cluster>, Vec<StationId>) {
    let mut groups: HashMap<&ExactCoordinate, BTreeSet<usize>> = HashMap::new();
    let mut unknown = Vec::new();

    for (id, index) in dataset.record_index() {
        match store.get(&id) {
            Some(location) => {
                groups.entry(location).or_default().insert(index);
            }
            None => unknown.push(id),
        }
    }
    unknown.sort();

    let mut clusters: Vec<Cluster> = groups
        .into_iter()
        .filter(|(_, indices)| indices.len() > 1)
        .map(|(location, indices)| Cluster {
            location: location.clone(),
            indices: indices.into_iter().collect(),
        })
        .collect();
    clusters.sort_by_key(|c| c.indices[0]);

    (clusters, unknown)
}

/// Fold every record of `cluster` into its lowest-indexed record.
///
/// The survivor keeps its own ids and gains the other members' ids in
/// ascending record order; the other members are removed. Returns `None`
/// for a cluster with fewer than two records.
pub fn merge_cluster(dataset: &mut PublicDataset, cluster: &Cluster) -> Option<Merge> {
    let [survivor, absorbed @ ..] = cluster.indices.as_slice() else {
        return None;
    };
    if absorbed.is_empty() {
        return None;
    }
    let survivor = *survivor;

    let members: Vec<(usize, String)> = cluster
        .indices
        .iter()
        .map(|&i| (i, dataset.records()[i].id_string()))
        .collect();

    let appended: Vec<String> = absorbed
        .iter()
        .flat_map(|&i| dataset.records()[i].ids.clone())
        .collect();

    dataset.records_mut()[survivor]
        .ids
        .extend(appended.iter().cloned());
    dataset.remove_indices(absorbed);

    Some(Merge {
        location: cluster.location.clone(),
        members,
        survivor,
        appended,
    })
}

/// Report far stations, then merge the first duplicate cluster.
pub fn deduplicate(dataset: &mut PublicDataset, store: &LocationStore) -> DedupReport {
    let far = find_far_stations(dataset, store, FAR_THRESHOLD_KM);
    for station in &far {
        warn!(
            station = %station.id,
            distance_km = station.distance_km,
            "public location is far from exact location"
        );
    }

    let (clusters, unknown) = find_clusters(dataset, store);
    for id in &unknown {
        warn!(station = %id, "published station has no exact location");
    }

    let merge = clusters
        .first()
        .and_then(|cluster| merge_cluster(dataset, cluster));
    if let Some(merge) = &merge {
        info!(
            survivor = merge.survivor,
            merged = merge.members.len() - 1,
            remaining_clusters = clusters.len() - 1,
            "merged duplicate records"
        );
    } else {
        info!("no duplicate records");
    }

    DedupReport {
        far,
        unknown,
        clusters: clusters.len(),
        merge,
    }
}
