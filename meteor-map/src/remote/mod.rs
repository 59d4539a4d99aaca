//! Remote file-retrieval service.
//!
//! Station configuration lives on the camera network's data server in a
//! fixed layout:
//!
//! ```text
//! <root>/<STATION>/<STATION>_<date>_<time>_<n>/.config
//! ```
//!
//! The [`RemoteSource`] trait is the only thing the reconciler needs from
//! that server. Implementations cover a local mirror of the tree, an
//! in-memory tree for tests, and (with the `sftp` feature) a live SFTP
//! session.

mod config_file;
mod error;
mod memory;
mod mirror;
#[cfg(feature = "sftp")]
mod sftp;

use std::io::Read;

pub use config_file::{ConfigFile, ConfigFileError};
pub use error::RemoteError;
pub use memory::MemorySource;
pub use mirror::MirrorSource;
#[cfg(feature = "sftp")]
pub use sftp::{SftpConfig, SftpSource};

/// Read access to a remote directory tree.
///
/// Paths are `/`-separated and relative to the source's own root.
pub trait RemoteSource {
    /// List the entry names (not full paths) in a directory.
    fn list_dir(&self, path: &str) -> Result<Vec<String>, RemoteError>;

    /// Open a file for reading.
    fn open_file(&self, path: &str) -> Result<Box<dyn Read + '_>, RemoteError>;
}

impl<T: RemoteSource + ?Sized> RemoteSource for Box<T> {
    fn list_dir(&self, path: &str) -> Result<Vec<String>, RemoteError> {
        (**self).list_dir(path)
    }

    fn open_file(&self, path: &str) -> Result<Box<dyn Read + '_>, RemoteError> {
        (**self).open_file(path)
    }
}

/// Join remote path segments with `/`, ignoring empty segments.
pub fn join_path(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
