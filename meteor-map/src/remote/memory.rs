//! In-memory remote tree for testing without server access.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Read};

use super::error::RemoteError;
use super::{RemoteSource, join_path};

/// Remote source backed by an in-memory map of file paths to contents.
///
/// Directories exist implicitly for every prefix of a file path, or
/// explicitly via [`MemorySource::with_dir`] for empty ones.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<String, String>,
    dirs: BTreeSet<String>,
}

impl MemorySource {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating its parent directories.
    pub fn with_file(mut self, path: &str, contents: impl Into<String>) -> Self {
        let path = join_path(&[path]);
        self.add_parents(&path);
        self.files.insert(path, contents.into());
        self
    }

    /// Add an empty directory.
    pub fn with_dir(mut self, path: &str) -> Self {
        let path = join_path(&[path]);
        self.add_parents(&path);
        self.dirs.insert(path);
        self
    }

    fn add_parents(&mut self, path: &str) {
        let mut prefix = String::new();
        let parts: Vec<&str> = path.split('/').collect();
        for part in &parts[..parts.len().saturating_sub(1)] {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(part);
            self.dirs.insert(prefix.clone());
        }
    }
}

impl RemoteSource for MemorySource {
    fn list_dir(&self, path: &str) -> Result<Vec<String>, RemoteError> {
        let path = join_path(&[path]);
        if !path.is_empty() && !self.dirs.contains(&path) {
            return Err(RemoteError::NotFound(path));
        }

        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{path}/")
        };

        let children: BTreeSet<String> = self
            .files
            .keys()
            .chain(self.dirs.iter())
            .filter_map(|p| p.strip_prefix(&prefix))
            .filter_map(|rest| rest.split('/').next())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        Ok(children.into_iter().collect())
    }

    fn open_file(&self, path: &str) -> Result<Box<dyn Read + '_>, RemoteError> {
        let path = join_path(&[path]);
        let contents = self
            .files
            .get(&path)
            .ok_or_else(|| RemoteError::NotFound(path.clone()))?;
        Ok(Box::new(Cursor::new(contents.as_bytes())))
    }
}
