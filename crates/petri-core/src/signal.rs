//! One-shot error broadcast for a single connection.

use std::sync::{Arc, OnceLock};

use tokio::sync::watch;

use crate::error::ConnectionError;

/// Broadcasts a connection's fatal error to every task wired to it.
///
/// [`fire`](ErrorSignal::fire) stores the error and wakes all waiters;
/// the first caller wins and later fires are silent no-ops. Once
/// fired, the signal stays fired forever: [`done`](ErrorSignal::done)
/// completes immediately for any number of waiters, and
/// [`err`](ErrorSignal::err) keeps returning the stored error. All
/// operations are safe under concurrent callers.
#[derive(Debug, Clone)]
pub struct ErrorSignal {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    /// The published error; the single atomic transition point.
    error: OnceLock<ConnectionError>,
    /// Wakes waiters after the error is published.
    fired: watch::Sender<bool>,
}

impl ErrorSignal {
    /// Create an unfired signal.
    pub fn new() -> Self {
        let (fired, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                error: OnceLock::new(),
                fired,
            }),
        }
    }

    /// Publish `error` and wake every waiter.
    ///
    /// The first caller wins; errors from later calls are dropped.
    pub fn fire(&self, error: ConnectionError) {
        if self.inner.error.set(error).is_ok() {
            // send_replace stores the value even when no waiter is
            // currently subscribed, so a later `done` still sees it.
            self.inner.fired.send_replace(true);
        }
    }

    /// Wait until the signal has fired.
    ///
    /// May be awaited any number of times, by any number of tasks,
    /// before or after the fire; observing the transition never
    /// consumes it.
    pub async fn done(&self) {
        let mut fired = self.inner.fired.subscribe();
        // wait_for only fails when the sender is dropped, and the
        // sender lives inside self.
        let _ = fired.wait_for(|has_fired| *has_fired).await;
    }

    /// Whether the signal has fired.
    pub fn fired(&self) -> bool {
        self.inner.error.get().is_some()
    }

    /// Read the stored error; `None` until the signal fires.
    pub fn err(&self) -> Option<&ConnectionError> {
        self.inner.error.get()
    }
}

impl Default for ErrorSignal {
    fn default() -> Self {
        Self::new()
    }
}
