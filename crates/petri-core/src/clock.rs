//! The tick source.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use crate::model::ModelMessage;

/// Wall-clock cadence of the simulation.
pub const TICK_INTERVAL: Duration = Duration::from_millis(170);

/// Run the clock: send the model a tick every [`TICK_INTERVAL`].
///
/// The cadence is approximate monotonic; a late tick delays the
/// following ones rather than bunching them. The task has no
/// cancellation of its own — it stops only when the model inbox
/// closes.
pub async fn run_clock(model: mpsc::Sender<ModelMessage>) {
    let mut interval = time::interval(TICK_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        if model.send(ModelMessage::Tick).await.is_err() {
            debug!("model inbox closed, clock stopping");
            return;
        }
    }
}
