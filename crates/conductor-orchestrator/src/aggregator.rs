//! Result aggregation and summary synthesis.
//!
//! The aggregation is deterministic: the same invocations always produce the
//! same narrative. Only succeeded invocations contribute to it.

use chrono::{DateTime, Utc};

use crate::{TaskContext, counted};
use crate::registry::Selection;
use crate::result::{
    AgentInvocation, FailureKind, OrchestrationMetadata, OrchestrationResult, OrchestrationStatus,
};

/// Merges agent invocations into an `OrchestrationResult`.
pub struct Aggregator;

impl Aggregator {
    /// Builds the final result. `invocations` must already be in selection order.
    pub fn aggregate(
        context: &TaskContext,
        selection: Vec<Selection>,
        invocations: Vec<AgentInvocation>,
        completed_at: DateTime<Utc>,
    ) -> OrchestrationResult {
        let final_summary = Self::synthesize(&context.query, &invocations);

        let succeeded = invocations.iter().filter(|i| i.succeeded()).count();
        let timed_out = invocations.iter().filter(|i| i.error_kind == Some(FailureKind::Timeout)).count();
        let duration_ms = (completed_at - context.received_at).num_milliseconds().max(0) as u64;

        OrchestrationResult {
            query: context.query.clone(),
            agents_executed: invocations.iter().map(|i| i.agent).collect(),
            status: OrchestrationStatus::Success,
            summary: final_summary.clone(),
            final_summary,
            orchestration_metadata: OrchestrationMetadata {
                request_id: context.request_id.clone(),
                started_at: context.received_at,
                completed_at,
                duration_ms,
                attachment_count: context.attachments.len(),
                succeeded,
                failed: invocations.len() - succeeded,
                timed_out,
                selection,
            },
            agent_results: invocations,
        }
    }

    /// Writes the narrative summary from succeeded invocations.
    pub fn synthesize(query: &str, invocations: &[AgentInvocation]) -> String {
        let total = invocations.len();
        let (succeeded, failed): (Vec<&AgentInvocation>, Vec<&AgentInvocation>) =
            invocations.iter().partition(|i| i.succeeded());

        if succeeded.is_empty() {
            let who = if total == 1 { "the only agent".to_string() } else { format!("all {total} agents") };
            return format!("Orchestration produced no usable results for \"{query}\": {who} failed.");
        }

        let mut sentences = vec![format!("Completed {} of {} for \"{query}\".", succeeded.len(), counted(total, "agent"))];

        sentences.extend(succeeded.iter().map(|i| {
            format!("{}: {}.", i.agent.display_name(), i.summary.trim().trim_end_matches('.'))
        }));

        if !failed.is_empty() {
            let names: Vec<String> = failed
                .iter()
                .map(|i| {
                    let kind = i.error_kind.unwrap_or(FailureKind::Error);
                    format!("{} ({})", i.agent.display_name(), kind.describe())
                })
                .collect();
            sentences.push(format!("Unavailable: {}.", names.join(", ")));
        }

        sentences.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AgentKind;
    use crate::registry::SelectionReason;
    use crate::result::InvocationStatus;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn ok(agent: AgentKind, summary: &str) -> AgentInvocation {
        AgentInvocation {
            agent,
            status: InvocationStatus::Succeeded,
            summary: summary.to_string(),
            payload: None,
            error_kind: None,
            duration_ms: 5,
        }
    }

    fn failed(agent: AgentKind, kind: FailureKind) -> AgentInvocation {
        AgentInvocation {
            agent,
            status: InvocationStatus::Failed,
            summary: "backend unavailable".to_string(),
            payload: None,
            error_kind: Some(kind),
            duration_ms: 5,
        }
    }

    #[test]
    fn test_narrative_uses_only_successes() {
        let summary = Aggregator::synthesize(
            "Analyze uploaded PDFs",
            &[failed(AgentKind::File, FailureKind::Timeout), ok(AgentKind::Analysis, "Generated analysis with 3 key insights")],
        );
        assert_eq!(
            summary,
            "Completed 1 of 2 agents for \"Analyze uploaded PDFs\". \
             Analysis: Generated analysis with 3 key insights. \
             Unavailable: File (timed out)."
        );
        assert!(!summary.contains("backend unavailable"));
    }

    #[test]
    fn test_all_failed_has_no_usable_results() {
        let summary = Aggregator::synthesize(
            "q",
            &[failed(AgentKind::Research, FailureKind::Error), failed(AgentKind::Analysis, FailureKind::Panicked)],
        );
        assert_eq!(summary, "Orchestration produced no usable results for \"q\": all 2 agents failed.");
    }

    #[test]
    fn test_single_agent_wording() {
        assert_eq!(
            Aggregator::synthesize("q", &[failed(AgentKind::Research, FailureKind::Error)]),
            "Orchestration produced no usable results for \"q\": the only agent failed."
        );
        assert_eq!(
            Aggregator::synthesize("q", &[ok(AgentKind::Calendar, "Proposed 3 meeting slots")]),
            "Completed 1 of 1 agent for \"q\". Calendar: Proposed 3 meeting slots."
        );
    }

    #[test]
    fn test_aggregate_metadata_and_order() {
        let received_at = Utc::now();
        let context = TaskContext {
            request_id: "req-1".to_string(),
            query: "market research report".to_string(),
            attachments: Arc::from(Vec::new()),
            received_at,
        };
        let selection = vec![
            Selection { agent: AgentKind::Research, reason: SelectionReason::Keyword("research".to_string()) },
            Selection { agent: AgentKind::Analysis, reason: SelectionReason::Keyword("report".to_string()) },
        ];
        let invocations = vec![
            failed(AgentKind::Research, FailureKind::Timeout),
            ok(AgentKind::Analysis, "Generated analysis with 2 key insights"),
        ];

        let result = Aggregator::aggregate(
            &context,
            selection.clone(),
            invocations,
            received_at + chrono::Duration::milliseconds(120),
        );

        assert_eq!(result.agents_executed, vec![AgentKind::Research, AgentKind::Analysis]);
        assert_eq!(result.status, OrchestrationStatus::Success);
        assert_eq!(result.final_summary, result.summary);
        assert_eq!(result.orchestration_metadata.duration_ms, 120);
        assert_eq!(result.orchestration_metadata.succeeded, 1);
        assert_eq!(result.orchestration_metadata.failed, 1);
        assert_eq!(result.orchestration_metadata.timed_out, 1);
        assert_eq!(result.orchestration_metadata.selection, selection);
    }
}
