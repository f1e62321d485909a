//! Router construction and the embedded single-page client.

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use axum::routing::get;
use petri_core::Pipeline;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::ws;

/// Build the complete router: the page, its script, and the socket.
///
/// CORS allows any origin for development use; restrict it when
/// fronting this with anything real.
pub fn build_router(pipeline: Pipeline) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/main.js", get(main_js))
        .route("/ws", get(ws::ws_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(pipeline)
}

/// Serve the embedded painting page.
async fn index() -> Html<&'static str> {
    Html(include_str!("../assets/index.html"))
}

/// Serve the embedded client script.
async fn main_js() -> ([(axum::http::HeaderName, &'static str); 1], &'static str) {
    (
        [(CONTENT_TYPE, "application/javascript")],
        include_str!("../assets/main.js"),
    )
}
