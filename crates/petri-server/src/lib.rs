//! Axum host for the Petri multiplayer automaton.
//!
//! This crate maps the pipeline's transport abstraction onto HTTP +
//! `WebSocket` and serves the embedded painting client:
//!
//! - `GET /` -- the single-page canvas client
//! - `GET /main.js` -- its script
//! - `GET /ws` -- the `WebSocket` feeding the pipeline
//!
//! The pipeline itself (model, hub, clock, per-connection pumps) lives
//! in `petri-core`; everything here is the host-side plumbing the core
//! treats as an external collaborator.

pub mod handlers;
pub mod ws;

pub use handlers::build_router;
