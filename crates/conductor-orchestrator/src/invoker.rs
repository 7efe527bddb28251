//! Isolated, concurrent agent invocation.
//!
//! Each selected agent runs in its own tokio task under a timeout and the
//! request's cancellation token. Errors, timeouts, cancellation and panics are
//! all turned into a failed `AgentInvocation` for that agent alone.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::AgentError;
use crate::events::{EventSink, OrchestrationEvent, emit};
use crate::result::{AgentInvocation, InvocationStatus};
use crate::{Agent, AgentKind, AgentOutput, TaskContext};

/// Runs agents concurrently with failure isolation.
#[derive(Debug, Clone, Copy)]
pub struct AgentInvoker {
    agent_timeout: Duration,
}

impl AgentInvoker {
    /// Creates an invoker applying `agent_timeout` to every agent.
    pub const fn new(agent_timeout: Duration) -> Self {
        Self { agent_timeout }
    }

    /// Invokes every agent and returns one invocation per agent, in input order.
    ///
    /// Each agent gets the smaller of the agent timeout and the time left
    /// until `deadline`. Cancelling `cancel` stops all outstanding agents.
    pub async fn invoke_all(
        &self,
        agents: Vec<Arc<dyn Agent>>,
        context: Arc<TaskContext>,
        deadline: Instant,
        cancel: &CancellationToken,
        sink: Option<&EventSink>,
    ) -> Vec<AgentInvocation> {
        let fan_out_started = Instant::now();
        let total = agents.len();

        let mut pending: FuturesUnordered<_> = agents
            .into_iter()
            .enumerate()
            .map(|(index, agent)| {
                let kind = agent.kind();
                let limit = self.agent_timeout.min(deadline.saturating_duration_since(Instant::now()));
                let token = cancel.child_token();
                let ctx = Arc::clone(&context);

                emit(sink, &context.request_id, OrchestrationEvent::AgentStarted { agent: kind });

                let handle = tokio::spawn(async move {
                    let started = Instant::now();
                    let outcome = tokio::select! {
                        result = tokio::time::timeout(limit, agent.execute(&ctx)) => {
                            match result {
                                Ok(outcome) => outcome,
                                Err(_) => Err(AgentError::Timeout(limit)),
                            }
                        }
                        () = token.cancelled() => Err(AgentError::Cancelled),
                    };
                    (outcome, started.elapsed())
                });

                async move { (index, kind, handle.await) }
            })
            .collect();

        let mut slots: Vec<Option<AgentInvocation>> = vec![None; total];

        while let Some((index, kind, joined)) = pending.next().await {
            let invocation = match joined {
                Ok((outcome, elapsed)) => record(kind, outcome, elapsed),
                Err(join_error) => {
                    let error = if join_error.is_panic() {
                        AgentError::Panicked(panic_message(join_error.into_panic()))
                    } else {
                        AgentError::Cancelled
                    };
                    record(kind, Err(error), fan_out_started.elapsed())
                }
            };

            if invocation.succeeded() {
                info!(
                    request_id = %context.request_id,
                    agent = %kind,
                    duration_ms = invocation.duration_ms,
                    "Agent succeeded"
                );
            } else {
                warn!(
                    request_id = %context.request_id,
                    agent = %kind,
                    duration_ms = invocation.duration_ms,
                    error_kind = ?invocation.error_kind,
                    error = %invocation.summary,
                    "Agent failed"
                );
            }

            emit(sink, &context.request_id, OrchestrationEvent::AgentCompleted { invocation: invocation.clone() });
            if let Some(slot) = slots.get_mut(index) {
                *slot = Some(invocation);
            }
        }

        slots.into_iter().flatten().collect()
    }
}

fn record(kind: AgentKind, outcome: Result<AgentOutput, AgentError>, elapsed: Duration) -> AgentInvocation {
    let duration_ms = elapsed.as_millis() as u64;
    match outcome {
        Ok(output) => AgentInvocation {
            agent: kind,
            status: InvocationStatus::Succeeded,
            summary: output.summary,
            payload: output.payload,
            error_kind: None,
            duration_ms,
        },
        Err(error) => AgentInvocation {
            agent: kind,
            status: InvocationStatus::Failed,
            summary: error.to_string(),
            payload: None,
            error_kind: Some(error.kind()),
            duration_ms,
        },
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
