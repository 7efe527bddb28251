//! Result types returned to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AgentKind;
use crate::registry::Selection;

/// Outcome of one agent invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationStatus {
    Succeeded,
    Failed,
}

/// Why a failed invocation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// External call or agent logic error.
    Error,
    /// Agent timeout or request deadline.
    Timeout,
    /// Request was dropped.
    Cancelled,
    /// The agent task panicked.
    Panicked,
}

impl FailureKind {
    /// Short phrase used in narrative summaries.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Error => "failed",
            Self::Timeout => "timed out",
            Self::Cancelled => "cancelled",
            Self::Panicked => "crashed",
        }
    }
}

/// Record of one agent's execution within an orchestration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentInvocation {
    /// Agent identifier.
    pub agent: AgentKind,
    pub status: InvocationStatus,
    /// Agent summary, or the error message on failure.
    pub summary: String,
    /// Structured payload, present only on success.
    #[serde(rename = "results", skip_serializing_if = "Option::is_none", default)]
    pub payload: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error_kind: Option<FailureKind>,
    pub duration_ms: u64,
}

impl AgentInvocation {
    /// Returns `true` for a succeeded invocation.
    pub fn succeeded(&self) -> bool {
        self.status == InvocationStatus::Succeeded
    }
}

/// Overall status; only `Success` is ever produced once agents were dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestrationStatus {
    Success,
}

/// Bookkeeping about one orchestration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationMetadata {
    pub request_id: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub attachment_count: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub timed_out: usize,
    /// Why each agent was selected, in selection order.
    pub selection: Vec<Selection>,
}

/// Final result of an orchestration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationResult {
    /// The query, echoed back.
    pub query: String,
    /// Invoked agents in selection order.
    pub agents_executed: Vec<AgentKind>,
    pub status: OrchestrationStatus,
    /// Narrative built from succeeded invocations.
    pub final_summary: String,
    /// Same text as `final_summary`, kept for older clients.
    pub summary: String,
    /// One entry per invoked agent, in selection order.
    pub agent_results: Vec<AgentInvocation>,
    pub orchestration_metadata: OrchestrationMetadata,
}
