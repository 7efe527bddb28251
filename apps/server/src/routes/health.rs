use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    agents: Vec<String>,
    version: &'static str,
}

/// Liveness check listing the enabled agents.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let agents = state
        .orchestrator
        .registry()
        .describe()
        .into_iter()
        .filter(|agent| agent.enabled)
        .map(|agent| agent.id.id().to_string())
        .collect();

    Json(HealthResponse { status: "healthy", agents, version: env!("CARGO_PKG_VERSION") })
}
