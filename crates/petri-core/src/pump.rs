//! Per-connection reader and writer tasks.

use petri_types::Diff;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::ConnectionError;
use crate::hub::HubMessage;
use crate::listener::ListenerId;
use crate::model::ModelMessage;
use crate::signal::ErrorSignal;
use crate::transport::{FrameKind, TransportReader, TransportWriter};

/// Pump frames from the transport into the model.
///
/// Each frame must decode to a valid diff; the first failure of any
/// kind fires the connection's signal and ends the task. The reader
/// never watches the signal itself — teardown closes the transport,
/// and that closure surfaces here as a read error.
pub(crate) async fn read_pump<R: TransportReader>(
    signal: ErrorSignal,
    model: mpsc::Sender<ModelMessage>,
    mut transport: R,
) {
    loop {
        let frame = match transport.read().await {
            Ok(frame) => frame,
            Err(error) => {
                signal.fire(error.into());
                return;
            }
        };
        let diff: Diff = match serde_json::from_slice(&frame) {
            Ok(diff) => diff,
            Err(error) => {
                signal.fire(ConnectionError::MalformedFrame(error));
                return;
            }
        };
        if let Err(error) = diff.validate() {
            signal.fire(ConnectionError::InvalidDiff(error));
            return;
        }
        if model.send(ModelMessage::Merge(diff)).await.is_err() {
            signal.fire(ConnectionError::Transport(String::from(
                "model inbox closed",
            )));
            return;
        }
    }
}

/// Pump queued messages to the transport until the connection errors.
///
/// Waits on whichever comes first — the error signal or the next
/// outbound message — then loops. There is no timeout on the wait; the
/// shared signal is the single path to termination. On exit the
/// teardown routine runs exactly once, in this task.
pub(crate) async fn write_pump<W: TransportWriter>(
    signal: ErrorSignal,
    id: ListenerId,
    hub: mpsc::Sender<HubMessage>,
    mut outbound: mpsc::Receiver<Vec<u8>>,
    mut transport: W,
) {
    loop {
        tokio::select! {
            () = signal.done() => break,
            message = outbound.recv() => match message {
                Some(bytes) => {
                    if let Err(error) = transport.write(FrameKind::Data, &bytes).await {
                        signal.fire(error.into());
                        break;
                    }
                }
                None => {
                    // The hub shut down and dropped the sender.
                    signal.fire(ConnectionError::Transport(String::from(
                        "outbound queue closed",
                    )));
                    break;
                }
            },
        }
    }
    tear_down(&signal, id, &hub, &mut transport).await;
}

/// The per-connection error-handling routine.
///
/// Every exit from the writer loop has fired the signal, so the stored
/// error decides the steps: unregister from the hub unless the hub
/// already evicted this listener on overflow; send a close frame
/// unless the peer is the one who closed; then close the transport,
/// which is what unblocks a reader still waiting on a read. Secondary
/// failures are logged and dropped.
async fn tear_down<W: TransportWriter>(
    signal: &ErrorSignal,
    id: ListenerId,
    hub: &mpsc::Sender<HubMessage>,
    transport: &mut W,
) {
    let Some(error) = signal.err() else {
        return;
    };
    if error.is_peer_closed() {
        info!(listener = %id, "peer closed the connection");
    } else {
        warn!(listener = %id, error = %error, "connection failed");
    }
    if !error.is_buffer_overflow() && hub.send(HubMessage::Unregister(id)).await.is_err() {
        debug!(listener = %id, "hub inbox closed during teardown");
    }
    if !error.is_peer_closed() {
        if let Err(secondary) = transport.write(FrameKind::Close, &[]).await {
            debug!(listener = %id, error = %secondary, "close frame write failed");
        }
    }
    if let Err(secondary) = transport.close().await {
        debug!(listener = %id, error = %secondary, "transport close failed");
    }
}
