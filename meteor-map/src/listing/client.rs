//! HTTP client for the station listing page.

use tracing::info;

use super::error::ListingError;
use super::table::{ColumnMapping, ListingEntry, parse_listing};

/// Default URL of the station listing page.
const DEFAULT_URL: &str = "https://istrastream.com/rms-gmn/";

/// Default prefix for per-station links; the station id is appended.
const DEFAULT_LINK_BASE: &str = "https://istrastream.com/rms-gmn/?id=";

/// Configuration for the listing client.
#[derive(Debug, Clone)]
pub struct ListingConfig {
    /// Listing page URL
    pub url: String,
    /// Prefix for record links
    pub link_base: String,
    /// Where the fields sit in each table row
    pub columns: ColumnMapping,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ListingConfig {
    /// Create a config for the given listing URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            link_base: DEFAULT_LINK_BASE.to_string(),
            columns: ColumnMapping::default(),
            timeout_secs: 30,
        }
    }

    /// Set a custom listing URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the link prefix.
    pub fn with_link_base(mut self, base: impl Into<String>) -> Self {
        self.link_base = base.into();
        self
    }

    /// Set the cell offsets.
    pub fn with_columns(mut self, columns: ColumnMapping) -> Self {
        self.columns = columns;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Link to a station's page.
    pub fn link_for(&self, id: &str) -> String {
        format!("{}{}", self.link_base, id)
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

/// Client for the station listing page.
#[derive(Debug, Clone)]
pub struct ListingClient {
    http: reqwest::Client,
    url: String,
    columns: ColumnMapping,
}

impl ListingClient {
    /// Create a new listing client.
    pub fn new(config: &ListingConfig) -> Result<Self, ListingError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: config.url.clone(),
            columns: config.columns,
        })
    }

    /// Fetch the page and extract every station row.
    pub async fn fetch_all(&self) -> Result<Vec<ListingEntry>, ListingError> {
        let response = self.http.get(&self.url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ListingError::Api {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }

        let body = response.text().await?;
        let entries = parse_listing(&body, &self.columns)?;
        info!(url = %self.url, rows = entries.len(), "fetched station listing");

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = ListingConfig::default();
        assert_eq!(config.url, DEFAULT_URL);
        assert_eq!(config.link_base, DEFAULT_LINK_BASE);
        assert_eq!(config.columns, ColumnMapping::new(5, 7, 9));
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn config_builder() {
        let config = ListingConfig::default()
            .with_url("http://localhost:8080/stations")
            .with_link_base("http://localhost:8080/s/")
            .with_columns(ColumnMapping::new(3, 5, 7))
            .with_timeout(5);

        assert_eq!(config.url, "http://localhost:8080/stations");
        assert_eq!(config.link_for("HR0001"), "http://localhost:8080/s/HR0001");
        assert_eq!(config.columns.id, 3);
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn client_creation() {
        assert!(ListingClient::new(&ListingConfig::default()).is_ok());
    }
}
