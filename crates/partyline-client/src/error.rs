//! Client-side error types.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to {host}:{port}: {error}")]
    Connect {
        host: String,
        port: u16,
        error: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
