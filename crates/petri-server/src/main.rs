//! Host binary for the Petri server.
//!
//! # Startup sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Start the pipeline (model, hub, clock)
//! 3. Build the router (page, script, `WebSocket`)
//! 4. Bind and serve until the process is killed
//!
//! There is no config file: the grid size, tick cadence, and send
//! buffer are compile-time constants of the core. Only the bind
//! address is adjustable, through the `PETRI_ADDR` environment
//! variable.

use std::net::SocketAddr;

use petri_core::Pipeline;
use petri_server::build_router;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Default bind address; override with `PETRI_ADDR`.
const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("petri-server starting");

    let pipeline = Pipeline::start();
    let router = build_router(pipeline);

    let addr: SocketAddr = std::env::var("PETRI_ADDR")
        .unwrap_or_else(|_| String::from(DEFAULT_ADDR))
        .parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, router).await?;
    Ok(())
}
