/// Errors that can occur on an established link.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Endpoint-level error.
    #[error("transport error: {0}")]
    Transport(#[from] memlink_transport::TransportError),

    /// Record-level error.
    #[error("wire error: {0}")]
    Wire(#[from] memlink_wire::WireError),

    /// An I/O error occurred on an open endpoint.
    #[error("link I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The responder detached mid-record.
    #[error("responder disconnected")]
    Disconnected,

    /// The link was already closed.
    #[error("link is closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, LinkError>;
