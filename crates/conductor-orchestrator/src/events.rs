//! Orchestration event model for streaming progress to clients.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::AgentKind;
use crate::registry::Selection;
use crate::result::{AgentInvocation, OrchestrationResult};

/// Per-request lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestrationState {
    Received,
    AgentsSelected,
    AgentsInvoked,
    Aggregated,
    Responded,
    Rejected,
}

/// Progress events emitted during one orchestration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrchestrationEvent {
    /// Agents were selected and are about to run.
    OrchestrationStarted {
        query: String,
        agents: Vec<AgentKind>,
        selection: Vec<Selection>,
    },

    /// One agent task was spawned.
    AgentStarted { agent: AgentKind },

    /// One agent finished, in completion order.
    AgentCompleted { invocation: AgentInvocation },

    /// The final result.
    OrchestrationCompleted { result: Box<OrchestrationResult> },

    /// The request failed validation; no agent ran.
    OrchestrationRejected { error: String },
}

impl OrchestrationEvent {
    /// The lifecycle state this event reports.
    pub const fn state(&self) -> OrchestrationState {
        match self {
            Self::OrchestrationStarted { .. } => OrchestrationState::AgentsSelected,
            Self::AgentStarted { .. } | Self::AgentCompleted { .. } => OrchestrationState::AgentsInvoked,
            Self::OrchestrationCompleted { .. } => OrchestrationState::Responded,
            Self::OrchestrationRejected { .. } => OrchestrationState::Rejected,
        }
    }

    /// Short name, used as the SSE event name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OrchestrationStarted { .. } => "orchestration_started",
            Self::AgentStarted { .. } => "agent_started",
            Self::AgentCompleted { .. } => "agent_completed",
            Self::OrchestrationCompleted { .. } => "orchestration_completed",
            Self::OrchestrationRejected { .. } => "orchestration_rejected",
        }
    }
}

/// An event tagged with its request and state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub request_id: String,
    pub state: OrchestrationState,
    #[serde(flatten)]
    pub event: OrchestrationEvent,
}

impl ProgressEvent {
    /// Wraps `event` with the state it reports.
    pub fn new(request_id: &str, event: OrchestrationEvent) -> Self {
        Self { request_id: request_id.to_string(), state: event.state(), event }
    }
}

/// Receives progress events. Closed receivers are ignored.
pub type EventSink = mpsc::UnboundedSender<ProgressEvent>;

pub(crate) fn emit(sink: Option<&EventSink>, request_id: &str, event: OrchestrationEvent) {
    if let Some(sink) = sink {
        // The receiver may be gone when a streaming client disconnects.
        let _ = sink.send(ProgressEvent::new(request_id, event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_type_and_state() {
        let event = ProgressEvent::new("req-1", OrchestrationEvent::AgentStarted { agent: AgentKind::Research });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "request_id": "req-1",
                "state": "agents_invoked",
                "type": "agent_started",
                "agent": "research"
            })
        );
    }

    #[test]
    fn test_rejected_event_state() {
        let event = OrchestrationEvent::OrchestrationRejected { error: "Query must not be empty".to_string() };
        assert_eq!(event.state(), OrchestrationState::Rejected);
        assert_eq!(event.name(), "orchestration_rejected");
    }
}
