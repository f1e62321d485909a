//! Pipeline wiring: startup and connection attach.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::clock;
use crate::hub::{self, HubMessage};
use crate::listener::Listener;
use crate::model::{Model, ModelMessage};
use crate::pump;
use crate::signal::ErrorSignal;
use crate::transport::{TransportReader, TransportWriter};

/// Capacity of each listener's outbound queue.
///
/// This is the sole bound that defines a "slow client": a listener
/// whose queue is full at broadcast time is deterministically evicted.
pub const SEND_BUFFER_LEN: usize = 256;

/// Capacity of the model and hub inboxes.
const STAGE_INBOX_LEN: usize = 64;

/// Errors surfaced by [`Pipeline::attach`] and [`Pipeline::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AttachError {
    /// The model or hub task is no longer receiving.
    #[error("pipeline stage is not running")]
    StageDown,
}

/// Handle to a running pipeline.
///
/// Cheap to clone; every clone can attach connections. Dropping the
/// last clone closes the stage inboxes, which winds down the model,
/// hub, and clock tasks.
#[derive(Debug, Clone)]
pub struct Pipeline {
    model: mpsc::Sender<ModelMessage>,
    hub: mpsc::Sender<HubMessage>,
}

/// Handle to one attached connection.
#[derive(Debug)]
pub struct ConnectionHandle {
    signal: ErrorSignal,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl ConnectionHandle {
    /// The connection's one-shot error signal.
    pub const fn signal(&self) -> &ErrorSignal {
        &self.signal
    }

    /// Wait until both the reader and writer tasks have stopped.
    pub async fn finished(self) {
        if self.writer.await.is_err() {
            debug!("writer task aborted");
        }
        if self.reader.await.is_err() {
            debug!("reader task aborted");
        }
    }
}

impl Pipeline {
    /// Spawn the model, hub, and clock tasks and return the attach
    /// capability.
    pub fn start() -> Self {
        let pipeline = Self::start_manual();
        tokio::spawn(clock::run_clock(pipeline.model.clone()));
        pipeline
    }

    /// Spawn the model and hub without a clock.
    ///
    /// The caller drives the simulation explicitly through
    /// [`Pipeline::tick`]. This is the seam the test harness uses, and
    /// it suits any embedding host with its own pacing.
    pub fn start_manual() -> Self {
        let (model_tx, model_rx) = mpsc::channel(STAGE_INBOX_LEN);
        let (hub_tx, hub_rx) = mpsc::channel(STAGE_INBOX_LEN);
        tokio::spawn(hub::run_hub(hub_rx));
        tokio::spawn(Model::new(hub_tx.clone()).run(model_rx));
        Self {
            model: model_tx,
            hub: hub_tx,
        }
    }

    /// Inject one simulation step.
    pub async fn tick(&self) -> Result<(), AttachError> {
        if self.model.send(ModelMessage::Tick).await.is_err() {
            return Err(AttachError::StageDown);
        }
        Ok(())
    }

    /// Connect one transport to the pipeline.
    ///
    /// Creates the connection's error signal and bounded outbound
    /// queue, registers a listener with the hub, asks the model for
    /// the initial snapshot, and spawns the reader and writer tasks.
    ///
    /// The register and init sends block, which is acceptable because
    /// model and hub are live receivers at all times during normal
    /// operation. Their order matters: the hub observes `Register`
    /// before the model can possibly forward the snapshot, so a
    /// newcomer's snapshot is always its first message, ahead of any
    /// later broadcast.
    pub async fn attach<R, W>(&self, reader: R, writer: W) -> Result<ConnectionHandle, AttachError>
    where
        R: TransportReader,
        W: TransportWriter,
    {
        let signal = ErrorSignal::new();
        let (outbound_tx, outbound_rx) = mpsc::channel(SEND_BUFFER_LEN);
        let listener = Listener::new(outbound_tx, signal.clone());
        let id = listener.id();

        if self
            .hub
            .send(HubMessage::Register(listener.clone()))
            .await
            .is_err()
        {
            return Err(AttachError::StageDown);
        }
        if self
            .model
            .send(ModelMessage::InitListener(listener))
            .await
            .is_err()
        {
            return Err(AttachError::StageDown);
        }

        let writer_task = tokio::spawn(pump::write_pump(
            signal.clone(),
            id,
            self.hub.clone(),
            outbound_rx,
            writer,
        ));
        let reader_task = tokio::spawn(pump::read_pump(
            signal.clone(),
            self.model.clone(),
            reader,
        ));

        Ok(ConnectionHandle {
            signal,
            reader: reader_task,
            writer: writer_task,
        })
    }
}
