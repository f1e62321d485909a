//! The simulation task: sole owner of the grid and pending diff.

use petri_types::{Diff, Grid};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::hub::HubMessage;
use crate::life;
use crate::listener::Listener;

/// Input messages for the model task.
#[derive(Debug)]
pub enum ModelMessage {
    /// Fold a client's paint request into the pending diff.
    Merge(Diff),
    /// A newly attached listener needs the initial snapshot.
    InitListener(Listener),
    /// Advance the simulation one step.
    Tick,
}

/// The simulation state machine behind the model task.
///
/// The model is a strictly serial consumer: a merge is fully folded in
/// before the next tick is seen, and a newcomer's snapshot is captured
/// between ticks, so no observer ever sees a torn grid. Being the one
/// writer of the grid and the pending diff removes all locking.
pub struct Model {
    grid: Grid,
    pending: Diff,
    steady_state_announced: bool,
    rng: SmallRng,
    hub: mpsc::Sender<HubMessage>,
}

impl Model {
    /// Create a model that publishes through `hub`, starting from an
    /// all-empty grid.
    pub fn new(hub: mpsc::Sender<HubMessage>) -> Self {
        Self {
            grid: Grid::new(),
            pending: Diff::new(),
            steady_state_announced: false,
            rng: SmallRng::from_os_rng(),
            hub,
        }
    }

    /// Run the model loop until the inbox closes or the hub goes away.
    pub async fn run(mut self, mut inbox: mpsc::Receiver<ModelMessage>) {
        while let Some(message) = inbox.recv().await {
            let hub_alive = match message {
                ModelMessage::Merge(diff) => {
                    self.pending.merge(diff);
                    true
                }
                ModelMessage::InitListener(listener) => self.init_listener(&listener).await,
                ModelMessage::Tick => self.tick().await,
            };
            if !hub_alive {
                debug!("hub inbox closed, model stopping");
                return;
            }
        }
        debug!("model inbox closed, model stopping");
    }

    /// Send a newcomer the full grid snapshot, and — if evolution has
    /// already halted — the empty diff announcing that.
    async fn init_listener(&mut self, listener: &Listener) -> bool {
        let Some(snapshot) = encode(&self.grid) else {
            return true;
        };
        if self
            .hub
            .send(HubMessage::Forward(listener.id(), snapshot))
            .await
            .is_err()
        {
            return false;
        }
        if self.steady_state_announced {
            let Some(halted) = encode(&Diff::new()) else {
                return true;
            };
            if self
                .hub
                .send(HubMessage::Forward(listener.id(), halted))
                .await
                .is_err()
            {
                return false;
            }
        }
        true
    }

    /// Advance one step: publish the pending diff, fold it into the
    /// grid, and compute the next generation's diff.
    ///
    /// When the pending diff is empty, one empty broadcast announces
    /// the steady state; after that, ticks are silent until a client
    /// paints again.
    async fn tick(&mut self) -> bool {
        if !self.pending.is_empty() {
            let Some(bytes) = encode(&self.pending) else {
                return true;
            };
            if self.hub.send(HubMessage::Broadcast(bytes)).await.is_err() {
                return false;
            }
            let step = std::mem::take(&mut self.pending);
            self.grid.apply(&step);
            self.pending = life::next_state(&self.grid, &mut self.rng);
            self.steady_state_announced = false;
        } else if !self.steady_state_announced {
            let Some(bytes) = encode(&Diff::new()) else {
                return true;
            };
            if self.hub.send(HubMessage::Broadcast(bytes)).await.is_err() {
                return false;
            }
            self.steady_state_announced = true;
        }
        true
    }
}

/// JSON-encode a wire value, logging and skipping on failure.
fn encode<T: serde::Serialize>(value: &T) -> Option<Vec<u8>> {
    match serde_json::to_vec(value) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            error!(error = %e, "failed to encode wire message");
            None
        }
    }
}
