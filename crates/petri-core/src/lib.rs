//! The concurrent pipeline behind the Petri server.
//!
//! A small fixed set of long-lived tasks cooperate over bounded
//! channels to run one shared cellular-automaton world for many
//! clients:
//!
//! - **model** — sole owner of the grid and the pending diff; folds in
//!   client paints, advances the automaton on ticks, and publishes
//!   snapshots and per-tick diffs ([`model`])
//! - **hub** — sole owner of the listener set; fans broadcasts out to
//!   every client without ever blocking on any of them ([`hub`])
//! - **clock** — emits a tick every 170 ms ([`clock`])
//! - **reader / writer** — one pair per connection, bridging the
//!   transport to the model and the hub's fan-out queues
//!
//! Data flows reader → model → hub → writer. Per-connection failures
//! are published on a one-shot [`ErrorSignal`] and never touch the
//! shared stages; a slow client costs only that client its
//! connection.
//!
//! [`Pipeline::start`] wires everything up; [`Pipeline::attach`]
//! plugs in one connection's transport halves.

pub mod clock;
pub mod error;
pub mod hub;
pub mod life;
pub mod listener;
pub mod model;
pub mod pipeline;
mod pump;
pub mod signal;
pub mod transport;

// Re-export the primary surface at crate root for convenience.
pub use error::ConnectionError;
pub use listener::{Listener, ListenerId};
pub use pipeline::{AttachError, ConnectionHandle, Pipeline, SEND_BUFFER_LEN};
pub use signal::ErrorSignal;
pub use transport::{FrameKind, TransportError, TransportReader, TransportWriter};
