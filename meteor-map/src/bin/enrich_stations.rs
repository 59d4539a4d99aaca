//! Copy station names and lenses from the public listing page onto the map.

use std::process::ExitCode;

use tracing::{error, info};

use meteor_map::config::AppConfig;
use meteor_map::enrich::{MetadataTable, enrich};
use meteor_map::listing::ListingClient;
use meteor_map::logging::init_logging;
use meteor_map::store::{LocationStore, PublicDataset};

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "enrichment failed, nothing written");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let store = LocationStore::load(&config.locations_path)?;
    let mut dataset = PublicDataset::load(&config.sites_path)?;

    let client = ListingClient::new(&config.listing)?;
    let rows = client.fetch_all().await?;
    let table = MetadataTable::from_listing(rows, &store);
    info!(listed = table.len(), "matched listing rows to known stations");

    enrich(&mut dataset, &table, &config.listing);
    dataset.save(&config.sites_path)?;

    Ok(())
}
