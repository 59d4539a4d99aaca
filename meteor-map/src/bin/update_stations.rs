//! Pull new stations from the camera network and publish them.
//!
//! Adds every station not yet in the exact location store, then gives each
//! unpublished station a jittered public marker.

use std::process::ExitCode;

use tracing::error;

use meteor_map::config::AppConfig;
use meteor_map::logging::init_logging;
use meteor_map::update::update_stations;

fn main() -> ExitCode {
    init_logging();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "update failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let report = update_stations(&config, || config.remote.open(), &mut rand::rng())?;

    for (id, e) in &report.reconcile.failed {
        println!("{id}\tno location\t{e}");
    }
    for (new, existing) in &report.obfuscate.matched {
        println!("{new}\tsame location as\t{existing}");
    }
    Ok(())
}
