//! Live SFTP session against the camera network's data server.

use std::io::Read;
use std::net::TcpStream;
use std::path::{Path, PathBuf};

use ssh2::{ErrorCode, Session, Sftp};
use tracing::info;

use super::RemoteSource;
use super::error::RemoteError;

/// SFTP status code for a missing file or directory.
const SFTP_NO_SUCH_FILE: i32 = 2;

/// Connection settings for the SFTP server.
#[derive(Debug, Clone)]
pub struct SftpConfig {
    /// Server host name
    pub host: String,
    /// Server port
    pub port: u16,
    /// Login name
    pub username: String,
    /// Private key file used for authentication
    pub private_key: PathBuf,
    /// Session timeout in seconds (0 disables the timeout)
    pub timeout_secs: u64,
}

impl SftpConfig {
    /// Create a config with the default port and no timeout.
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        private_key: impl Into<PathBuf>,
    ) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: username.into(),
            private_key: private_key.into(),
            timeout_secs: 0,
        }
    }

    /// Set a session timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// An authenticated SFTP session.
///
/// The session is closed when this value is dropped.
pub struct SftpSource {
    sftp: Sftp,
    _session: Session,
}

impl SftpSource {
    /// Connect and authenticate with the configured private key.
    pub fn connect(config: &SftpConfig) -> Result<Self, RemoteError> {
        let connect_err = |e: &dyn std::fmt::Display| {
            RemoteError::Connect(format!("{}@{}: {e}", config.username, config.host))
        };

        let tcp = TcpStream::connect((config.host.as_str(), config.port))
            .map_err(|e| connect_err(&e))?;
        let mut session = Session::new().map_err(|e| connect_err(&e))?;
        session.set_tcp_stream(tcp);
        if config.timeout_secs > 0 {
            session.set_timeout(u32::try_from(config.timeout_secs * 1000).unwrap_or(u32::MAX));
        }
        session.handshake().map_err(|e| connect_err(&e))?;
        session
            .userauth_pubkey_file(&config.username, None, &config.private_key, None)
            .map_err(|e| connect_err(&e))?;
        if !session.authenticated() {
            return Err(connect_err(&"authentication rejected"));
        }

        let sftp = session.sftp().map_err(|e| connect_err(&e))?;
        info!(host = %config.host, user = %config.username, "SFTP session established");

        Ok(Self {
            sftp,
            _session: session,
        })
    }
}

fn map_ssh_error(path: &str, err: ssh2::Error) -> RemoteError {
    if err.code() == ErrorCode::SFTP(SFTP_NO_SUCH_FILE) {
        RemoteError::NotFound(path.to_string())
    } else {
        RemoteError::Session {
            path: path.to_string(),
            message: err.to_string(),
        }
    }
}

impl RemoteSource for SftpSource {
    fn list_dir(&self, path: &str) -> Result<Vec<String>, RemoteError> {
        let entries = self
            .sftp
            .readdir(Path::new(path))
            .map_err(|e| map_ssh_error(path, e))?;

        let mut names: Vec<String> = entries
            .iter()
            .filter_map(|(p, _)| p.file_name()?.to_str().map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }

    fn open_file(&self, path: &str) -> Result<Box<dyn Read + '_>, RemoteError> {
        let file = self
            .sftp
            .open(Path::new(path))
            .map_err(|e| map_ssh_error(path, e))?;
        Ok(Box::new(file))
    }
}
