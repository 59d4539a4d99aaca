//! Publication of new stations at jittered locations.
//!
//! A station's exact location is private. When a station first appears
//! on the remote it is published at a random point within
//! [`JITTER_RADIUS_M`] of its true position, drawn uniformly over the
//! disk. The point is drawn once and kept forever, so repeated runs do
//! not leak the true position by averaging.

use std::collections::{BTreeSet, HashMap};

use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::IgnoreList;
use crate::domain::{ApproxCoordinate, ExactCoordinate, StationId};
use crate::store::{LocationStore, PublicDataset, PublicRecord};

/// Radius of the jitter disk in metres.
pub const JITTER_RADIUS_M: f64 = 2000.0;

/// Local scale used to convert metres to degrees of latitude.
pub const METRES_PER_DEGREE: f64 = 111_300.0;

/// Offset a coordinate by polar sample `(u, v)`, both in `[0, 1)`.
///
/// `u` picks the radius as `r·√u`, so points are uniform over the disk
/// area; `v` picks the bearing. The longitude offset is stretched by
/// `1/cos(lat)` so the disk is round on the ground. Not rounded.
pub fn jitter(exact: &ExactCoordinate, u: f64, v: f64) -> (f64, f64) {
    let r = JITTER_RADIUS_M / METRES_PER_DEGREE;
    let w = r * u.sqrt();
    let t = 2.0 * std::f64::consts::PI * v;

    let lon = exact.lon() + w * t.cos() / exact.lat().to_radians().cos();
    let lat = exact.lat() + w * t.sin();
    (lon, lat)
}

/// Draw a public location for a station, rounded to 3 decimals.
pub fn random_offset<R: Rng + ?Sized>(exact: &ExactCoordinate, rng: &mut R) -> ApproxCoordinate {
    let u: f64 = rng.random();
    let v: f64 = rng.random();
    let (lon, lat) = jitter(exact, u, v);
    ApproxCoordinate::rounded(lon, lat)
}

/// Outcome of an obfuscation run.
#[derive(Debug, Default, PartialEq)]
pub struct ObfuscateReport {
    /// Stations given a new public record
    pub published: Vec<StationId>,
    /// New stations at the exact location of an existing one: (new, existing)
    pub matched: Vec<(StationId, StationId)>,
    /// New stations with no exact location to publish
    pub missing: Vec<StationId>,
}

/// Publish every remote station that has no public record yet.
///
/// Stations are handled in id order. A station whose exact coordinate is
/// identical to that of a station already known (published, or earlier
/// in this batch) gets no record of its own; it is most likely the same
/// camera under a new id and should be merged by hand.
pub fn obfuscate<R: Rng + ?Sized>(
    remote_ids: &BTreeSet<StationId>,
    store: &LocationStore,
    dataset: &mut PublicDataset,
    ignore: &IgnoreList,
    rng: &mut R,
) -> ObfuscateReport {
    let published = dataset.published_ids();
    let candidates: BTreeSet<StationId> = remote_ids
        .iter()
        .filter(|id| !published.contains(*id) && !ignore.contains(id))
        .copied()
        .collect();

    // First id (in id order) wins when several share a coordinate.
    let mut by_location: HashMap<&ExactCoordinate, StationId> = HashMap::new();
    for (id, coordinate) in store.iter() {
        if !candidates.contains(id) && !ignore.contains(id) {
            by_location.entry(coordinate).or_insert(*id);
        }
    }

    info!(candidates = candidates.len(), "publishing new stations");

    let mut report = ObfuscateReport::default();
    for id in candidates {
        let Some(exact) = store.get(&id) else {
            warn!(station = %id, "no exact location, not publishing");
            report.missing.push(id);
            continue;
        };

        if let Some(existing) = by_location.get(exact) {
            warn!(station = %id, matches = %existing, "station is at the exact location of another");
            report.matched.push((id, *existing));
            continue;
        }

        let location = random_offset(exact, rng);
        debug!(station = %id, %location, "publishing station");
        dataset.push(PublicRecord::new(id, location));
        by_location.insert(exact, id);
        report.published.push(id);
    }

    info!(
        published = report.published.len(),
        matched = report.matched.len(),
        missing = report.missing.len(),
        "obfuscation finished"
    );

    report
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::haversine_km;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    proptest! {
        /// Rounded public locations are within the radius plus rounding slack
        #[test]
        fn approx_within_radius(
            lon in -179.0f64..179.0,
            lat in -80.0f64..80.0,
            seed in any::<u64>(),
        ) {
            let exact = ExactCoordinate::new(format!("{lon}"), format!("{lat}")).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            let approx = random_offset(&exact, &mut rng);
            let metres = approx.distance_km(&exact) * 1000.0;
            // 3-decimal rounding moves a point by under 80 m.
            prop_assert!(metres <= JITTER_RADIUS_M + 100.0, "{} m", metres);
        }

        /// Unrounded offsets never leave the disk
        #[test]
        fn jitter_within_radius(
            lat in -80.0f64..80.0,
            u in 0.0f64..1.0,
            v in 0.0f64..1.0,
        ) {
            let exact = ExactCoordinate::new("0.0", format!("{lat}")).unwrap();
            let (lon2, lat2) = jitter(&exact, u, v);
            let metres = haversine_km(lat2, lon2, exact.lat(), exact.lon()) * 1000.0;
            prop_assert!(metres <= JITTER_RADIUS_M, "{} m", metres);
        }

        /// Two stations at one exact location never both get a record
        #[test]
        fn no_duplicate_records_per_location(
            count in 2usize..6,
            seed in any::<u64>(),
        ) {
            let ids: BTreeSet<StationId> = (0..count)
                .map(|i| StationId::parse(&format!("AB{i:04}")).unwrap())
                .collect();
            let store: LocationStore = ids
                .iter()
                .map(|id| (*id, ExactCoordinate::new("5.0", "50.0").unwrap()))
                .collect();
            let mut dataset = PublicDataset::new();
            let mut rng = StdRng::seed_from_u64(seed);

            let report = obfuscate(&ids, &store, &mut dataset, &IgnoreList::new(), &mut rng);

            prop_assert_eq!(dataset.len(), 1);
            prop_assert_eq!(report.matched.len(), count - 1);
        }
    }
}
