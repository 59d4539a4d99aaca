//! Persistence error types.

use std::path::PathBuf;

/// Errors that can occur when reading or writing a persisted store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// File could not be read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File contents are not a valid store
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StoreError::Io {
            path: PathBuf::from("rms-sites.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "I/O error on rms-sites.json: missing");

        let source = serde_json::from_str::<u32>("x").unwrap_err();
        let err = StoreError::Json {
            path: PathBuf::from("exact_locations.json"),
            source,
        };
        assert!(err.to_string().starts_with("invalid JSON in exact_locations.json"));
    }
}
