//! Station listing error types.

/// Errors that can occur when fetching or parsing the station listing.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("listing error {status}: {message}")]
    Api { status: u16, message: String },

    /// Page could not be interpreted as a station table
    #[error("listing parse error: {message}")]
    Parse { message: String },
}
