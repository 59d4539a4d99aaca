//! Remote source error types.

/// Errors from the remote file-retrieval service.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// Path does not exist on the remote
    #[error("not found: {0}")]
    NotFound(String),

    /// Local or transport I/O failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Could not establish or authenticate the session
    #[error("connection failed: {0}")]
    Connect(String),

    /// Session-level protocol failure
    #[error("session error on {path}: {message}")]
    Session { path: String, message: String },
}

impl RemoteError {
    /// Wrap an I/O error, mapping `NotFound` to [`RemoteError::NotFound`].
    pub fn from_io(path: &str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            RemoteError::NotFound(path.to_string())
        } else {
            RemoteError::Io {
                path: path.to_string(),
                source,
            }
        }
    }
}
