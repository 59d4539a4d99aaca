//! On-disk stores.
//!
//! Two files make up all state carried between runs: the private
//! [`LocationStore`] of exact coordinates and the public
//! [`PublicDataset`] that the map renders. Both are read fully at the
//! start of a run and rewritten fully at the end.

mod error;
mod locations;
mod sites;

use std::path::Path;

pub use error::StoreError;
pub use locations::LocationStore;
pub use sites::{PublicDataset, PublicRecord};

/// Default file name of the exact location store.
pub const LOCATIONS_FILE: &str = "exact_locations.json";

/// Default file name of the public site list.
pub const SITES_FILE: &str = "rms-sites.json";

fn read_file(path: &Path) -> Result<Option<String>, StoreError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Write a whole file, creating parent directories if needed.
fn write_file(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    std::fs::write(path, contents).map_err(io_err)
}
