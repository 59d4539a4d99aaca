//! Public map of meteor-camera stations.
//!
//! Keeps a private store of exact station locations in step with the
//! camera network's server and publishes jittered, deduplicated and
//! named markers for the public map.

pub mod config;
pub mod dedup;
pub mod domain;
pub mod enrich;
pub mod listing;
pub mod logging;
pub mod obfuscate;
pub mod reconcile;
pub mod remote;
pub mod store;
pub mod update;
