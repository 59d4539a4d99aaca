//! Merge one group of co-located public records.
//!
//! Prints stations whose public marker has drifted from their exact
//! location, then merges the first group of records sharing an exact
//! location. Run repeatedly until it reports nothing left to merge.

use std::process::ExitCode;

use tracing::error;

use meteor_map::config::AppConfig;
use meteor_map::dedup::deduplicate;
use meteor_map::logging::init_logging;
use meteor_map::store::{LocationStore, PublicDataset};

fn main() -> ExitCode {
    init_logging();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "deduplication failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let store = LocationStore::load(&config.locations_path)?;
    let mut dataset = PublicDataset::load(&config.sites_path)?;

    let report = deduplicate(&mut dataset, &store);

    for far in &report.far {
        println!("{far}");
    }

    if let Some(merge) = &report.merge {
        println!("---");
        for (index, ids) in &merge.members {
            println!("{index}\t{ids}");
        }
        dataset.save(&config.sites_path)?;
    }

    Ok(())
}
