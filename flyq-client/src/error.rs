use std::io;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Settings that cannot be turned into a client configuration. Raised before any network I/O.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("IoError: {0}")]
    Io(#[from] io::Error),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Connection is closed")]
    Closed,

    #[error("TLS requested but this client has no TLS transport")]
    TlsUnavailable,

    #[error("Rejected by broker client: {0}")]
    Rejected(String),
}

impl ClientError {
    pub fn is_invalid_settings(&self) -> bool {
        matches!(self, ClientError::InvalidSettings(_))
    }
}
