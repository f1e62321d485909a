//! Transport abstraction consumed by the per-connection pumps.
//!
//! The pipeline never touches a socket directly; it reads and writes
//! through these two traits. The host maps them onto its `WebSocket`
//! library, and the test harness onto in-memory channels.

use std::future::Future;

/// The kinds of frame the core writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// A binary data frame carrying one wire message.
    Data,
    /// A close frame announcing shutdown to the peer.
    Close,
}

/// Errors surfaced by a transport endpoint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The remote peer closed the connection. Distinguished so
    /// teardown can skip the answering close frame.
    #[error("peer closed the connection")]
    PeerClosed,

    /// Any other transport failure.
    #[error("transport i/o: {0}")]
    Io(String),
}

/// The read half of one connection.
///
/// Only the connection's reader task calls `read`, preserving the
/// one-reader-per-connection rule.
pub trait TransportReader: Send + 'static {
    /// Receive the next inbound frame, blocking until one arrives or
    /// the transport fails. Closing the transport from the write half
    /// must eventually make a pending `read` return an error.
    fn read(&mut self) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;
}

/// The write half of one connection.
///
/// Only the connection's writer task calls these, preserving the
/// one-writer-per-connection rule.
pub trait TransportWriter: Send + 'static {
    /// Send one frame of the given kind.
    fn write(
        &mut self,
        kind: FrameKind,
        data: &[u8],
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Close the transport. Idempotent from the core's standpoint.
    fn close(&mut self) -> impl Future<Output = Result<(), TransportError>> + Send;
}
