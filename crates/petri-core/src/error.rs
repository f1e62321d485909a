//! Per-connection error taxonomy.

use petri_types::DiffError;

use crate::transport::TransportError;

/// Everything that can end a connection.
///
/// Exactly one of these is published on the connection's
/// [`ErrorSignal`](crate::signal::ErrorSignal). The writer task reads
/// it back on its exit path to decide the teardown steps: whether to
/// unregister from the hub and whether to send a close frame.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// The peer closed the connection. Expected; teardown sends no
    /// close frame back.
    #[error("peer closed the connection")]
    PeerClosed,

    /// An unexpected transport read or write failure.
    #[error("transport failure: {0}")]
    Transport(String),

    /// An inbound frame did not decode as a diff.
    #[error("malformed frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),

    /// An inbound diff failed validation.
    #[error("invalid diff: {0}")]
    InvalidDiff(#[from] DiffError),

    /// The listener's outbound queue was full at broadcast time. The
    /// hub has already removed the listener when this fires.
    #[error("outbound buffer overflowed")]
    BufferOverflow,
}

impl ConnectionError {
    /// Whether teardown may skip the hub unregister.
    pub const fn is_buffer_overflow(&self) -> bool {
        matches!(self, Self::BufferOverflow)
    }

    /// Whether teardown should suppress the close frame.
    pub const fn is_peer_closed(&self) -> bool {
        matches!(self, Self::PeerClosed)
    }
}

impl From<TransportError> for ConnectionError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::PeerClosed => Self::PeerClosed,
            TransportError::Io(detail) => Self::Transport(detail),
        }
    }
}
