//! `WebSocket` endpoint: upgrades sockets and adapts them onto the
//! pipeline's transport traits.
//!
//! Each accepted socket is split into its sink and stream halves; the
//! halves become the connection's [`TransportWriter`] and
//! [`TransportReader`], and the pipeline's own reader and writer tasks
//! take over from there.

use std::future::Future;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use petri_core::{FrameKind, Pipeline, TransportError, TransportReader, TransportWriter};
use tracing::{debug, warn};

/// Upgrade `GET /ws` and hand the socket to the pipeline.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(pipeline): State<Pipeline>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, pipeline))
}

/// Split the socket, attach it, and wait out the connection.
async fn handle_socket(socket: WebSocket, pipeline: Pipeline) {
    debug!("client connected");
    let (sink, stream) = socket.split();
    let reader = SocketReader { stream };
    let writer = SocketWriter { sink };
    match pipeline.attach(reader, writer).await {
        Ok(handle) => handle.finished().await,
        Err(error) => warn!(error = %error, "could not attach connection"),
    }
    debug!("client connection finished");
}

/// Read half of one client socket.
struct SocketReader {
    stream: SplitStream<WebSocket>,
}

impl TransportReader for SocketReader {
    fn read(&mut self) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send {
        async move {
            loop {
                match self.stream.next().await {
                    None => return Err(TransportError::PeerClosed),
                    Some(Err(error)) => return Err(TransportError::Io(error.to_string())),
                    Some(Ok(Message::Binary(data))) => return Ok(data.to_vec()),
                    Some(Ok(Message::Text(text))) => return Ok(text.as_bytes().to_vec()),
                    Some(Ok(Message::Close(_))) => return Err(TransportError::PeerClosed),
                    // Axum answers pings itself; skip control frames.
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

/// Write half of one client socket.
struct SocketWriter {
    sink: SplitSink<WebSocket, Message>,
}

impl TransportWriter for SocketWriter {
    fn write(
        &mut self,
        kind: FrameKind,
        data: &[u8],
    ) -> impl Future<Output = Result<(), TransportError>> + Send {
        let message = match kind {
            FrameKind::Data => Message::Binary(data.to_vec().into()),
            FrameKind::Close => Message::Close(None),
        };
        async move { self.sink.send(message).await.map_err(into_io) }
    }

    fn close(&mut self) -> impl Future<Output = Result<(), TransportError>> + Send {
        async move { self.sink.close().await.map_err(into_io) }
    }
}

/// Map a socket error into the transport taxonomy.
fn into_io(error: axum::Error) -> TransportError {
    TransportError::Io(error.to_string())
}
