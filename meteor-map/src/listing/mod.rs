//! Third-party station listing.
//!
//! A public web page lists stations in an HTML table with the station id,
//! a human-readable name and the lens in fixed cell positions. Those
//! positions have moved between page versions, so they are configured
//! through a [`ColumnMapping`] rather than hardcoded.

mod client;
mod error;
mod table;

pub use client::{ListingClient, ListingConfig};
pub use error::ListingError;
pub use table::{ColumnMapping, InvalidColumnMapping, ListingEntry, parse_listing};
