//! In-memory transport for pipeline tests.
//!
//! [`mock_conn`] builds one fake connection: the pipeline side gets a
//! reader and writer implementing the core's transport traits, and the
//! test keeps the [`Remote`] — the peer's end — to inject frames or
//! read errors and to observe everything the server writes.
//!
//! The observed-frame channel holds a single frame, so a test that
//! does not drain it blocks the writer exactly like a stalled socket.

#![allow(dead_code, clippy::unwrap_used, clippy::panic)]

use std::time::Duration;

use petri_core::{FrameKind, TransportError, TransportReader, TransportWriter};
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;

/// Timeout for any single blocking step in a test.
pub const STEP: Duration = Duration::from_secs(2);

/// A frame the server wrote, as seen by the remote peer.
pub type OutFrame = (FrameKind, Vec<u8>);

/// The pipeline-side read half.
pub struct MockReader {
    inbound: mpsc::Receiver<Result<Vec<u8>, TransportError>>,
    closed: watch::Receiver<bool>,
}

/// The pipeline-side write half.
pub struct MockWriter {
    outbound: mpsc::Sender<OutFrame>,
    closed: watch::Sender<bool>,
}

/// The test-controlled peer end of the connection.
pub struct Remote {
    inbound: mpsc::Sender<Result<Vec<u8>, TransportError>>,
    outbound: mpsc::Receiver<OutFrame>,
    closed: watch::Receiver<bool>,
}

/// Build one fake connection.
pub fn mock_conn() -> (MockReader, MockWriter, Remote) {
    let (inbound_tx, inbound_rx) = mpsc::channel(8);
    let (outbound_tx, outbound_rx) = mpsc::channel(1);
    let (closed_tx, closed_rx) = watch::channel(false);
    (
        MockReader {
            inbound: inbound_rx,
            closed: closed_rx.clone(),
        },
        MockWriter {
            outbound: outbound_tx,
            closed: closed_tx,
        },
        Remote {
            inbound: inbound_tx,
            outbound: outbound_rx,
            closed: closed_rx,
        },
    )
}

impl TransportReader for MockReader {
    fn read(&mut self) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send {
        async move {
            let mut closed = self.closed.clone();
            tokio::select! {
                frame = self.inbound.recv() => match frame {
                    Some(result) => result,
                    None => Err(TransportError::PeerClosed),
                },
                _ = closed.wait_for(|closed| *closed) => {
                    Err(TransportError::Io(String::from("connection closed locally")))
                }
            }
        }
    }
}

impl TransportWriter for MockWriter {
    fn write(
        &mut self,
        kind: FrameKind,
        data: &[u8],
    ) -> impl Future<Output = Result<(), TransportError>> + Send {
        let frame = (kind, data.to_vec());
        async move {
            if self.outbound.send(frame).await.is_err() {
                return Err(TransportError::Io(String::from("remote end dropped")));
            }
            Ok(())
        }
    }

    fn close(&mut self) -> impl Future<Output = Result<(), TransportError>> + Send {
        async move {
            self.closed.send_replace(true);
            Ok(())
        }
    }
}

impl Remote {
    /// Inject one inbound frame, as if the client had sent `json`.
    pub async fn send(&self, json: &str) {
        self.inbound
            .send(Ok(json.as_bytes().to_vec()))
            .await
            .unwrap();
    }

    /// Make the server's next read fail with `error`.
    pub async fn send_error(&self, error: TransportError) {
        self.inbound.send(Err(error)).await.unwrap();
    }

    /// Receive the next frame the server wrote.
    pub async fn recv(&mut self) -> OutFrame {
        timeout(STEP, self.outbound.recv())
            .await
            .unwrap()
            .unwrap()
    }

    /// Receive the next frame and return its payload as text,
    /// asserting it is a data frame.
    pub async fn recv_data(&mut self) -> String {
        let (kind, bytes) = self.recv().await;
        assert_eq!(kind, FrameKind::Data);
        String::from_utf8(bytes).unwrap()
    }

    /// Drain frames until the close frame arrives, returning the data
    /// frames that preceded it.
    pub async fn recv_until_close(&mut self) -> Vec<Vec<u8>> {
        let mut drained = Vec::new();
        loop {
            let (kind, bytes) = self.recv().await;
            if kind == FrameKind::Close {
                return drained;
            }
            drained.push(bytes);
        }
    }

    /// Assert that no frame is written for `window`. A writer that has
    /// already exited counts as silent.
    pub async fn expect_silence(&mut self, window: Duration) {
        match timeout(window, self.outbound.recv()).await {
            Err(_) | Ok(None) => {}
            Ok(Some((kind, _))) => panic!("expected no frame from the server, got {kind:?}"),
        }
    }

    /// Wait until the server closes the transport.
    pub async fn wait_closed(&mut self) {
        timeout(STEP, self.closed.wait_for(|closed| *closed))
            .await
            .unwrap()
            .unwrap();
    }

    /// Whether the server has closed the transport.
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}
