//! Remote source backed by a local mirror of the server tree.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::RemoteSource;
use super::error::RemoteError;

/// Reads a directory tree copied from the data server (rsync, sshfs, ...).
#[derive(Debug, Clone)]
pub struct MirrorSource {
    base: PathBuf,
}

impl MirrorSource {
    /// Serve the tree rooted at `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// The local directory this source reads from.
    pub fn base(&self) -> &Path {
        &self.base
    }

    fn resolve(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|s| !s.is_empty())
            .fold(self.base.clone(), |acc, part| acc.join(part))
    }
}

impl RemoteSource for MirrorSource {
    fn list_dir(&self, path: &str) -> Result<Vec<String>, RemoteError> {
        let entries =
            std::fs::read_dir(self.resolve(path)).map_err(|e| RemoteError::from_io(path, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| RemoteError::from_io(path, e))?;
            // Non-UTF-8 names cannot be station ids or config files.
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn open_file(&self, path: &str) -> Result<Box<dyn Read + '_>, RemoteError> {
        let file = File::open(self.resolve(path)).map_err(|e| RemoteError::from_io(path, e))?;
        Ok(Box::new(BufReader::new(file)))
    }
}
