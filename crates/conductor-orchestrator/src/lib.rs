//! Agent orchestrator for Conductor.
//!
//! This crate defines the core agent trait, the registry that selects agents
//! for a query, the invoker that runs them in isolation, and the aggregator
//! that merges their outcomes into one `OrchestrationResult`.

pub mod agents;
pub mod aggregator;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod invoker;
pub mod registry;
pub mod request;
pub mod result;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use agents::{AnalysisAgent, CalendarAgent, FileAgent, MailAgent, ResearchAgent};
pub use aggregator::Aggregator;
pub use config::{AgentSettings, OrchestratorConfig};
pub use engine::Orchestrator;
pub use error::{AgentError, OrchestrationError, ValidationError};
pub use events::{EventSink, OrchestrationEvent, OrchestrationState, ProgressEvent};
pub use invoker::AgentInvoker;
pub use registry::{AgentDescriptor, AgentRegistry, Selection, SelectionReason};
pub use request::{Attachment, OrchestrationRequest, RequestLimits};
pub use result::{
    AgentInvocation, FailureKind, InvocationStatus, OrchestrationMetadata, OrchestrationResult,
    OrchestrationStatus,
};

/// The fixed set of agents known to the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    /// Document text extraction.
    File,
    /// Web research.
    Research,
    /// Language-model synthesis; the fallback agent.
    Analysis,
    /// Email drafting and triage.
    Mail,
    /// Meeting scheduling.
    Calendar,
}

impl AgentKind {
    /// Every agent, in registry order.
    pub const ALL: [Self; 5] = [Self::File, Self::Research, Self::Analysis, Self::Mail, Self::Calendar];

    /// The agent selected when nothing else matches.
    pub const FALLBACK: Self = Self::Analysis;

    /// Stable lowercase identifier used on the wire and in configuration.
    pub const fn id(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Research => "research",
            Self::Analysis => "analysis",
            Self::Mail => "mail",
            Self::Calendar => "calendar",
        }
    }

    /// Name used in narrative summaries.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::File => "File",
            Self::Research => "Research",
            Self::Analysis => "Analysis",
            Self::Mail => "Mail",
            Self::Calendar => "Calendar",
        }
    }

    /// Selection priority, lower runs first in the result ordering.
    pub const fn priority(self) -> u8 {
        match self {
            Self::Mail | Self::Calendar => 1,
            Self::File => 2,
            Self::Research => 3,
            Self::Analysis => 4,
        }
    }

    /// Built-in trigger keywords, matched as lowercase substrings.
    pub const fn default_keywords(self) -> &'static [&'static str] {
        match self {
            Self::File => &["pdf", "document", "file", "upload"],
            Self::Research => &["research", "competitor", "market", "find"],
            Self::Analysis => &["analyze", "insights", "summary", "report"],
            Self::Mail => &["email", "mail", "draft", "send", "action items"],
            Self::Calendar => &["schedule", "meeting", "calendar", "available", "time"],
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for AgentKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|k| k.id().eq_ignore_ascii_case(s.trim())).ok_or(())
    }
}

/// Request-scoped input shared by every agent of one orchestration.
#[derive(Debug, Clone)]
pub struct TaskContext {
    /// Identifier of the orchestration run.
    pub request_id: String,
    /// The trimmed user query.
    pub query: String,
    /// Uploaded files, dropped with the context at the end of the request.
    pub attachments: Arc<[Attachment]>,
    /// When the request was received.
    pub received_at: DateTime<Utc>,
}

/// What an agent produced on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentOutput {
    /// One-line human readable summary.
    pub summary: String,
    /// Structured payload, passed through to the client untouched.
    pub payload: Option<serde_json::Value>,
}

impl AgentOutput {
    /// Creates an output with a summary only.
    pub fn new(summary: impl Into<String>) -> Self {
        Self { summary: summary.into(), payload: None }
    }

    /// Attaches a JSON payload.
    #[must_use]
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// A trait that defines the interface for an orchestrated agent.
///
/// Agents run as independent tokio tasks, so implementations must be
/// `Send + Sync + 'static`. Any failure is returned as an `AgentError` and
/// recorded on that agent's invocation only.
/// `count` followed by `noun`, pluralised with `s` unless `count` is 1.
pub(crate) fn counted(count: usize, noun: &str) -> String {
    if count == 1 { format!("1 {noun}") } else { format!("{count} {noun}s") }
}

#[async_trait]
pub trait Agent: Send + Sync {
    /// Which registry slot this agent fills.
    fn kind(&self) -> AgentKind;

    /// Returns a description of the agent's purpose and capabilities.
    fn description(&self) -> &str;

    /// Executes the agent against the shared task context.
    ///
    /// # Errors
    /// Returns an `AgentError` if an external call fails or its output is unusable.
    async fn execute(&self, context: &TaskContext) -> Result<AgentOutput, AgentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_kind_round_trips_through_id() {
        for kind in AgentKind::ALL {
            assert_eq!(kind.id().parse::<AgentKind>(), Ok(kind));
        }
        assert_eq!("Research".parse::<AgentKind>(), Ok(AgentKind::Research));
        assert!("planner".parse::<AgentKind>().is_err());
    }

    #[test]
    fn test_agent_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&AgentKind::Calendar).unwrap(), "\"calendar\"");
    }

    #[test]
    fn test_priorities_match_dispatch_order() {
        assert!(AgentKind::Mail.priority() < AgentKind::File.priority());
        assert!(AgentKind::File.priority() < AgentKind::Research.priority());
        assert!(AgentKind::Research.priority() < AgentKind::Analysis.priority());
    }
}
