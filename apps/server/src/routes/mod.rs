//! HTTP route handlers.

mod agents;
mod execute;
mod health;
mod stream;

use axum::Router;
use axum::routing::{get, post};

use crate::AppState;

pub use agents::agents;
pub use execute::{execute, parse_request};
pub use health::health;
pub use stream::execute_stream;

/// API routes, without state or middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/execute", post(execute))
        // Path used by the first version of the web frontend.
        .route("/execute-orchestration", post(execute))
        .route("/execute/stream", post(execute_stream))
        .route("/health", get(health))
        .route("/agents", get(agents))
}

/// Plain-text landing page when no static frontend is configured.
pub async fn banner() -> &'static str {
    concat!(
        "Conductor agent orchestrator ",
        env!("CARGO_PKG_VERSION"),
        "\nPOST /execute with a multipart `query` and optional `files`.\n"
    )
}
