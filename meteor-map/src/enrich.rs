//! Attaching listing metadata to public records.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::domain::StationId;
use crate::listing::{ListingConfig, ListingEntry};
use crate::store::{LocationStore, PublicDataset};

/// Name and lens of one station, as listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationMetadata {
    pub name: String,
    pub lens: String,
}

/// Listing metadata for stations we hold exact locations for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataTable {
    entries: HashMap<StationId, StationMetadata>,
}

impl MetadataTable {
    /// Build the table from listing rows, dropping stations unknown to
    /// `store`. A station listed twice keeps its later row.
    pub fn from_listing(rows: Vec<ListingEntry>, store: &LocationStore) -> Self {
        let entries = rows
            .into_iter()
            .filter(|row| store.contains(&row.id))
            .map(|row| {
                (
                    row.id,
                    StationMetadata {
                        name: row.name,
                        lens: row.lens,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, id: &StationId) -> Option<&StationMetadata> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(StationId, StationMetadata)> for MetadataTable {
    fn from_iter<I: IntoIterator<Item = (StationId, StationMetadata)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Outcome of an enrichment run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EnrichReport {
    /// Records updated, with the id whose metadata was used
    pub updated: Vec<(usize, StationId)>,
    /// Records with no listed station
    pub unmatched: usize,
}

/// Overwrite name, lens and link of every record with a listed station.
///
/// When several of a record's ids are listed, the last one in the record
/// decides. Records without a match keep whatever metadata they had.
pub fn enrich(
    dataset: &mut PublicDataset,
    table: &MetadataTable,
    listing: &ListingConfig,
) -> EnrichReport {
    let mut report = EnrichReport::default();

    for (index, record) in dataset.records_mut().iter_mut().enumerate() {
        let found = record
            .ids
            .iter()
            .rev()
            .filter_map(|raw| StationId::parse(raw).ok())
            .find_map(|id| table.get(&id).map(|meta| (id, meta)));

        let Some((id, meta)) = found else {
            report.unmatched += 1;
            continue;
        };

        debug!(record = index, station = %id, name = %meta.name, "enriching record");
        record.name = meta.name.clone();
        record.lens = Some(meta.lens.clone());
        record.link = Some(listing.link_for(id.as_str()));
        report.updated.push((index, id));
    }

    info!(
        updated = report.updated.len(),
        unmatched = report.unmatched,
        "enriched public records"
    );
    report
}
