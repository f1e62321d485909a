//! Listener registry and broadcast fan-out.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::error::ConnectionError;
use crate::listener::{Listener, ListenerId};

/// Input messages for the hub task.
#[derive(Debug)]
pub enum HubMessage {
    /// Add a listener to the fan-out set. Idempotent.
    Register(Listener),
    /// Drop a listener from the set. Idempotent.
    Unregister(ListenerId),
    /// Queue a message onto every listener.
    Broadcast(Vec<u8>),
    /// Queue a message onto one listener.
    Forward(ListenerId, Vec<u8>),
}

/// Run the hub: the sole owner of the listener set.
///
/// The hub is strictly serial — one input message is processed to
/// completion before the next — and never blocks on any listener:
/// every enqueue is a `try_send`. A listener whose queue is full at
/// the instant of delivery is evicted, with
/// [`ConnectionError::BufferOverflow`] fired on its signal so that
/// connection's teardown knows not to unregister again.
///
/// Returns when the inbox closes, dropping whatever listeners remain.
pub async fn run_hub(mut inbox: mpsc::Receiver<HubMessage>) {
    let mut listeners: HashMap<ListenerId, Listener> = HashMap::new();

    while let Some(message) = inbox.recv().await {
        match message {
            HubMessage::Register(listener) => {
                debug!(listener = %listener.id(), "listener registered");
                listeners.insert(listener.id(), listener);
            }
            HubMessage::Unregister(id) => {
                if listeners.remove(&id).is_some() {
                    debug!(listener = %id, "listener unregistered");
                }
            }
            HubMessage::Broadcast(bytes) => {
                listeners.retain(|_, listener| deliver(listener, bytes.clone()));
            }
            HubMessage::Forward(id, bytes) => {
                let keep = listeners
                    .get(&id)
                    .is_none_or(|listener| deliver(listener, bytes));
                if !keep {
                    listeners.remove(&id);
                }
            }
        }
    }
    debug!(remaining = listeners.len(), "hub inbox closed, shutting down");
}

/// Try to queue `bytes` onto one listener; report whether the listener
/// should stay in the set.
fn deliver(listener: &Listener, bytes: Vec<u8>) -> bool {
    match listener.enqueue(bytes) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            warn!(listener = %listener.id(), "outbound queue full, evicting listener");
            listener.signal().fire(ConnectionError::BufferOverflow);
            false
        }
        Err(TrySendError::Closed(_)) => {
            // The writer is already gone; its own teardown handles the
            // unregister, so nothing fires here.
            debug!(listener = %listener.id(), "outbound queue closed, dropping listener");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;
    use crate::signal::ErrorSignal;

    const STEP: Duration = Duration::from_secs(2);

    struct Harness {
        hub: mpsc::Sender<HubMessage>,
        listener: Listener,
        outbound: mpsc::Receiver<Vec<u8>>,
    }

    /// Spawn a hub with one registered listener whose queue holds
    /// `capacity` messages.
    async fn harness(capacity: usize) -> Harness {
        let (hub, inbox) = mpsc::channel(8);
        tokio::spawn(run_hub(inbox));

        let (tx, outbound) = mpsc::channel(capacity);
        let listener = Listener::new(tx, ErrorSignal::new());
        hub.send(HubMessage::Register(listener.clone()))
            .await
            .unwrap();
        Harness {
            hub,
            listener,
            outbound,
        }
    }

    #[tokio::test]
    async fn broadcast_reaches_a_registered_listener() {
        let mut h = harness(4).await;
        h.hub
            .send(HubMessage::Broadcast(b"hello".to_vec()))
            .await
            .unwrap();

        let message = timeout(STEP, h.outbound.recv()).await.unwrap().unwrap();
        assert_eq!(message, b"hello");
    }

    #[tokio::test]
    async fn forward_reaches_only_the_addressed_listener() {
        let mut h = harness(4).await;
        let (other_tx, mut other_rx) = mpsc::channel(4);
        let other = Listener::new(other_tx, ErrorSignal::new());
        h.hub
            .send(HubMessage::Register(other.clone()))
            .await
            .unwrap();

        h.hub
            .send(HubMessage::Forward(other.id(), b"init".to_vec()))
            .await
            .unwrap();

        let message = timeout(STEP, other_rx.recv()).await.unwrap().unwrap();
        assert_eq!(message, b"init");
        assert!(h.outbound.try_recv().is_err());
    }

    #[tokio::test]
    async fn overflow_fires_the_signal_and_evicts() {
        let h = harness(1).await;
        h.hub
            .send(HubMessage::Broadcast(b"first".to_vec()))
            .await
            .unwrap();
        h.hub
            .send(HubMessage::Broadcast(b"second".to_vec()))
            .await
            .unwrap();

        timeout(STEP, h.listener.signal().done()).await.unwrap();
        assert!(matches!(
            h.listener.signal().err(),
            Some(ConnectionError::BufferOverflow)
        ));
    }

    #[tokio::test]
    async fn unregister_is_idempotent() {
        let mut h = harness(4).await;
        h.hub
            .send(HubMessage::Unregister(h.listener.id()))
            .await
            .unwrap();
        h.hub
            .send(HubMessage::Unregister(h.listener.id()))
            .await
            .unwrap();
        h.hub
            .send(HubMessage::Broadcast(b"gone".to_vec()))
            .await
            .unwrap();

        // The queue never sees the broadcast; the sender side is still
        // open, so recv would block rather than return None.
        assert!(
            timeout(Duration::from_millis(100), h.outbound.recv())
                .await
                .is_err()
        );
    }
}
