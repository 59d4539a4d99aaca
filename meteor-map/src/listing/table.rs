//! Station table extraction from the listing page.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::domain::StationId;

use super::error::ListingError;

/// Error returned when parsing a column mapping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid column mapping {input:?}: expected three cell offsets \"id,name,lens\"")]
pub struct InvalidColumnMapping {
    input: String,
}

/// Cell offsets (0-based, counted over a row's `td`/`th` cells) of the
/// fields we read from each listing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    pub id: usize,
    pub name: usize,
    pub lens: usize,
}

impl ColumnMapping {
    /// Create a mapping from explicit offsets.
    pub fn new(id: usize, name: usize, lens: usize) -> Self {
        Self { id, name, lens }
    }

    /// Parse `"id,name,lens"`, e.g. `"3,5,7"`.
    pub fn parse(s: &str) -> Result<Self, InvalidColumnMapping> {
        let invalid = || InvalidColumnMapping {
            input: s.to_string(),
        };
        let offsets: Vec<usize> = s
            .split(',')
            .map(|part| part.trim().parse().map_err(|_| invalid()))
            .collect::<Result<_, _>>()?;

        match offsets.as_slice() {
            [id, name, lens] => Ok(Self::new(*id, *name, *lens)),
            _ => Err(invalid()),
        }
    }

    /// Number of cells a row needs for every offset to exist.
    fn min_cells(&self) -> usize {
        self.id.max(self.name).max(self.lens) + 1
    }
}

impl Default for ColumnMapping {
    /// Offsets used by the current page layout.
    fn default() -> Self {
        Self::new(5, 7, 9)
    }
}

/// One row of the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub id: StationId,
    pub name: String,
    pub lens: String,
}

/// Extract station rows from the listing page.
///
/// Every `tr` in the document is a candidate row except the last one,
/// which the page uses as a footer. Rows with too few cells or whose id
/// cell is not a station id are skipped.
pub fn parse_listing(html: &str, columns: &ColumnMapping) -> Result<Vec<ListingEntry>, ListingError> {
    let row_selector = selector("tr")?;
    let cell_selector = selector("td, th")?;

    let document = Html::parse_document(html);
    let rows: Vec<ElementRef<'_>> = document.select(&row_selector).collect();
    let body = rows.split_last().map(|(_, rest)| rest).unwrap_or_default();

    let mut entries = Vec::new();
    for row in body {
        let cells: Vec<String> = row.select(&cell_selector).map(cell_text).collect();
        if cells.len() < columns.min_cells() {
            continue;
        }

        let id = match StationId::parse(&cells[columns.id]) {
            Ok(id) => id,
            Err(e) => {
                debug!(error = %e, "skipping listing row");
                continue;
            }
        };

        entries.push(ListingEntry {
            id,
            name: cells[columns.name].clone(),
            lens: cells[columns.lens].clone(),
        });
    }

    Ok(entries)
}

fn selector(css: &str) -> Result<Selector, ListingError> {
    Selector::parse(css).map_err(|e| ListingError::Parse {
        message: format!("bad selector {css:?}: {e}"),
    })
}

/// Cell text with runs of whitespace collapsed to single spaces.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
