//! Run configuration.
//!
//! Every tool runs without arguments; the few things that vary between
//! deployments come from environment variables, with defaults matching
//! the camera network's public server.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::domain::{InvalidStationId, StationId};
use crate::listing::{ColumnMapping, InvalidColumnMapping, ListingConfig};
use crate::remote::{MirrorSource, RemoteError, RemoteSource};
use crate::store::{LOCATIONS_FILE, SITES_FILE};

/// Default directory on the server holding one directory per station.
pub const DEFAULT_REMOTE_ROOT: &str = "files/extracted_data";

/// Default SFTP host.
pub const DEFAULT_SFTP_HOST: &str = "gmn.uwo.ca";

/// Errors in the environment configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Ignore-list contains something that is not a station id
    #[error("METEOR_MAP_IGNORE: {0}")]
    IgnoreList(#[from] InvalidStationId),

    /// Column mapping is malformed
    #[error("METEOR_MAP_COLUMNS: {0}")]
    Columns(#[from] InvalidColumnMapping),

    /// A numeric setting is not a number
    #[error("{var}: {value:?} is not a valid number")]
    Number { var: &'static str, value: String },
}

/// Station ids that are never reconciled or published.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreList(HashSet<StationId>);

impl IgnoreList {
    /// An empty ignore-list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated list of station ids.
    pub fn parse(s: &str) -> Result<Self, InvalidStationId> {
        crate::domain::parse_id_list(s).map(|ids| ids.into_iter().collect())
    }

    /// Check whether a station is ignored.
    pub fn contains(&self, id: &StationId) -> bool {
        self.0.contains(id)
    }

    /// Number of ignored stations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if nothing is ignored.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<StationId> for IgnoreList {
    fn from_iter<I: IntoIterator<Item = StationId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Where station configuration files are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteLocation {
    /// A local copy of the server tree
    Mirror(PathBuf),
    /// The live server over SFTP
    Sftp {
        host: String,
        username: Option<String>,
        private_key: Option<PathBuf>,
    },
}

impl RemoteLocation {
    /// Open the configured remote source.
    pub fn open(&self) -> Result<Box<dyn RemoteSource>, RemoteError> {
        match self {
            RemoteLocation::Mirror(dir) => {
                if !dir.is_dir() {
                    return Err(RemoteError::Connect(format!(
                        "mirror directory {} does not exist",
                        dir.display()
                    )));
                }
                Ok(Box::new(MirrorSource::new(dir.clone())))
            }
            RemoteLocation::Sftp {
                host,
                username,
                private_key,
            } => open_sftp(host, username.as_deref(), private_key.as_deref()),
        }
    }
}

#[cfg(feature = "sftp")]
fn open_sftp(
    host: &str,
    username: Option<&str>,
    private_key: Option<&std::path::Path>,
) -> Result<Box<dyn RemoteSource>, RemoteError> {
    use crate::remote::{SftpConfig, SftpSource};

    let username = username
        .ok_or_else(|| RemoteError::Connect("METEOR_MAP_SFTP_USER is not set".to_string()))?;
    let private_key = private_key
        .ok_or_else(|| RemoteError::Connect("METEOR_MAP_SFTP_KEY is not set".to_string()))?;
    let config = SftpConfig::new(host, username, private_key);
    Ok(Box::new(SftpSource::connect(&config)?))
}

#[cfg(not(feature = "sftp"))]
fn open_sftp(
    host: &str,
    _username: Option<&str>,
    _private_key: Option<&std::path::Path>,
) -> Result<Box<dyn RemoteSource>, RemoteError> {
    Err(RemoteError::Connect(format!(
        "{host}: built without SFTP support; enable the `sftp` feature or set METEOR_MAP_MIRROR_DIR"
    )))
}

/// Configuration shared by all tools.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Where to read station configs from
    pub remote: RemoteLocation,
    /// Directory of station directories, relative to the remote root
    pub remote_root: String,
    /// Stations to skip entirely
    pub ignore: IgnoreList,
    /// Station listing page settings
    pub listing: ListingConfig,
    /// Exact location store file
    pub locations_path: PathBuf,
    /// Public site list file
    pub sites_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            remote: RemoteLocation::Sftp {
                host: DEFAULT_SFTP_HOST.to_string(),
                username: None,
                private_key: None,
            },
            remote_root: DEFAULT_REMOTE_ROOT.to_string(),
            ignore: IgnoreList::new(),
            listing: ListingConfig::default(),
            locations_path: PathBuf::from(LOCATIONS_FILE),
            sites_path: PathBuf::from(SITES_FILE),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        config.remote = match var("METEOR_MAP_MIRROR_DIR") {
            Some(dir) => RemoteLocation::Mirror(PathBuf::from(dir)),
            None => RemoteLocation::Sftp {
                host: var("METEOR_MAP_SFTP_HOST").unwrap_or_else(|| DEFAULT_SFTP_HOST.to_string()),
                username: var("METEOR_MAP_SFTP_USER"),
                private_key: var("METEOR_MAP_SFTP_KEY").map(PathBuf::from),
            },
        };

        if let Some(root) = var("METEOR_MAP_REMOTE_ROOT") {
            config.remote_root = root;
        }
        if let Some(ignore) = var("METEOR_MAP_IGNORE") {
            config.ignore = IgnoreList::parse(&ignore)?;
        }
        if let Some(url) = var("METEOR_MAP_LISTING_URL") {
            config.listing = config.listing.with_url(url);
        }
        if let Some(base) = var("METEOR_MAP_LINK_BASE") {
            config.listing = config.listing.with_link_base(base);
        }
        if let Some(columns) = var("METEOR_MAP_COLUMNS") {
            config.listing = config.listing.with_columns(ColumnMapping::parse(&columns)?);
        }
        if let Some(timeout) = var("METEOR_MAP_HTTP_TIMEOUT") {
            let secs = timeout.trim().parse().map_err(|_| ConfigError::Number {
                var: "METEOR_MAP_HTTP_TIMEOUT",
                value: timeout.clone(),
            })?;
            config.listing = config.listing.with_timeout(secs);
        }

        Ok(config)
    }
}
