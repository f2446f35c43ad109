use std::path::PathBuf;
use std::time::Duration;

/// Errors that can occur on the FIFO endpoints.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to create a FIFO at the specified path.
    #[error("failed to create fifo at {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The path already exists but is not a FIFO.
    #[error("existing path is not a fifo: {path}")]
    NotAFifo { path: PathBuf },

    /// No reader attached to the write side before the deadline expired.
    #[error("no reader attached to {path} after {waited:?}")]
    Rendezvous { path: PathBuf, waited: Duration },

    /// Failed to open an endpoint.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on an open endpoint.
    #[error("fifo I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
