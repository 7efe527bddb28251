use axum::Json;
use axum::extract::State;
use conductor_orchestrator::AgentDescriptor;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct AgentsResponse {
    agents: Vec<AgentDescriptor>,
}

/// Describes every registered agent, including disabled ones.
pub async fn agents(State(state): State<AppState>) -> Json<AgentsResponse> {
    Json(AgentsResponse { agents: state.orchestrator.registry().describe() })
}
