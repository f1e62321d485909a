//! Listener handles for connected clients.

use std::fmt;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

use crate::signal::ErrorSignal;

/// Opaque identity of one connected client.
///
/// There is no client-visible name; the id exists so the hub can key
/// its set and so teardown can address its own listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    /// Mint a fresh id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Server-side handle for one connected client's outbound path.
///
/// Owns a clone of the connection's bounded outbound sender and its
/// [`ErrorSignal`]. The hub keeps one clone in its fan-out set; the
/// model briefly holds another while preparing the newcomer snapshot.
#[derive(Debug, Clone)]
pub struct Listener {
    id: ListenerId,
    outbound: mpsc::Sender<Vec<u8>>,
    signal: ErrorSignal,
}

impl Listener {
    /// Wrap a connection's outbound sender and error signal.
    pub fn new(outbound: mpsc::Sender<Vec<u8>>, signal: ErrorSignal) -> Self {
        Self {
            id: ListenerId::new(),
            outbound,
            signal,
        }
    }

    /// The listener's identity.
    pub const fn id(&self) -> ListenerId {
        self.id
    }

    /// The connection's error signal.
    pub const fn signal(&self) -> &ErrorSignal {
        &self.signal
    }

    /// Queue `message` without blocking.
    pub(crate) fn enqueue(&self, message: Vec<u8>) -> Result<(), TrySendError<Vec<u8>>> {
        self.outbound.try_send(message)
    }
}
