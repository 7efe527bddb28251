//! The orchestration engine.
//!
//! Drives one request through `received → agents_selected → agents_invoked →
//! aggregated → responded`, or `rejected` when validation fails.

use std::sync::Arc;

use chrono::Utc;
use conductor_abstraction::{DocumentExtractor, Model, WebSearch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::aggregator::Aggregator;
use crate::config::OrchestratorConfig;
use crate::error::{OrchestrationError, Result, ValidationError};
use crate::events::{EventSink, OrchestrationEvent, OrchestrationState, emit};
use crate::invoker::AgentInvoker;
use crate::registry::AgentRegistry;
use crate::request::{OrchestrationRequest, RequestLimits};
use crate::result::OrchestrationResult;
use crate::{Agent, TaskContext};

/// Selects, invokes and aggregates agents for each request.
///
/// Holds no per-request state, so one instance serves concurrent requests.
pub struct Orchestrator {
    registry: Arc<AgentRegistry>,
    extractor: Arc<dyn DocumentExtractor>,
    invoker: AgentInvoker,
    config: OrchestratorConfig,
    limits: RequestLimits,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Creates an orchestrator over an existing registry.
    ///
    /// `extractor` is used to reject unsupported attachments up front.
    #[must_use]
    pub fn new(
        registry: AgentRegistry,
        extractor: Arc<dyn DocumentExtractor>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            extractor,
            invoker: AgentInvoker::new(config.effective_agent_timeout()),
            config,
            limits: RequestLimits::default(),
        }
    }

    /// Creates an orchestrator with the five built-in agents.
    #[must_use]
    pub fn standard(
        model: Arc<dyn Model>,
        search: Arc<dyn WebSearch>,
        extractor: Arc<dyn DocumentExtractor>,
        config: OrchestratorConfig,
    ) -> Self {
        let registry = AgentRegistry::standard(model, search, Arc::clone(&extractor), &config);
        Self::new(registry, extractor, config)
    }

    /// Sets the attachment limits checked during validation.
    #[must_use]
    pub fn with_limits(mut self, limits: RequestLimits) -> Self {
        self.limits = limits;
        self
    }

    /// The agent registry.
    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// The active configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Checks a request without running it.
    ///
    /// # Errors
    /// Returns the first `ValidationError` found.
    pub fn validate(&self, request: &OrchestrationRequest) -> std::result::Result<(), ValidationError> {
        request.validate(&self.limits, self.extractor.as_ref())
    }

    /// Runs one orchestration.
    ///
    /// # Errors
    /// Returns `OrchestrationError::Validation` when the request is rejected
    /// before dispatch. Agent failures never produce an error here.
    pub async fn execute(&self, request: OrchestrationRequest) -> Result<OrchestrationResult> {
        self.run(request, None).await
    }

    /// Runs one orchestration, emitting progress events to `sink`.
    ///
    /// # Errors
    /// Same as [`Orchestrator::execute`].
    pub async fn execute_with_events(
        &self,
        request: OrchestrationRequest,
        sink: &EventSink,
    ) -> Result<OrchestrationResult> {
        self.run(request, Some(sink)).await
    }

    async fn run(
        &self,
        request: OrchestrationRequest,
        sink: Option<&EventSink>,
    ) -> Result<OrchestrationResult> {
        let request_id = request.request_id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
        let received_at = Utc::now();
        let deadline = Instant::now() + self.config.request_deadline();

        debug!(
            request_id = %request_id,
            state = ?OrchestrationState::Received,
            attachments = request.attachments.len(),
            "Orchestration request received"
        );

        if let Err(error) = self.validate(&request) {
            warn!(request_id = %request_id, state = ?OrchestrationState::Rejected, error = %error, "Request rejected");
            emit(sink, &request_id, OrchestrationEvent::OrchestrationRejected { error: error.to_string() });
            return Err(error.into());
        }

        let query = request.query.trim().to_string();
        let selection = self.registry.select(&query, &request.attachments);
        let agents: Vec<Arc<dyn Agent>> = selection.iter().filter_map(|s| self.registry.get(s.agent)).collect();

        if agents.is_empty() {
            let error = OrchestrationError::Other("no agents are registered".to_string());
            emit(sink, &request_id, OrchestrationEvent::OrchestrationRejected { error: error.to_string() });
            return Err(error);
        }

        info!(
            request_id = %request_id,
            state = ?OrchestrationState::AgentsSelected,
            agents = ?selection.iter().map(|s| s.agent).collect::<Vec<_>>(),
            "Agents selected"
        );
        emit(
            sink,
            &request_id,
            OrchestrationEvent::OrchestrationStarted {
                query: query.clone(),
                agents: selection.iter().map(|s| s.agent).collect(),
                selection: selection.clone(),
            },
        );

        let context = Arc::new(TaskContext {
            request_id: request_id.clone(),
            query,
            attachments: Arc::from(request.attachments),
            received_at,
        });

        // Dropping this future (client gone) cancels every outstanding agent.
        let cancel = CancellationToken::new();
        let _guard = cancel.clone().drop_guard();

        let invocations = self.invoker.invoke_all(agents, Arc::clone(&context), deadline, &cancel, sink).await;
        debug!(request_id = %request_id, state = ?OrchestrationState::AgentsInvoked, "All agents finished");

        let result = Aggregator::aggregate(&context, selection, invocations, Utc::now());
        debug!(request_id = %request_id, state = ?OrchestrationState::Aggregated, "Results aggregated");

        info!(
            request_id = %request_id,
            state = ?OrchestrationState::Responded,
            succeeded = result.orchestration_metadata.succeeded,
            failed = result.orchestration_metadata.failed,
            duration_ms = result.orchestration_metadata.duration_ms,
            "Orchestration completed"
        );
        emit(sink, &request_id, OrchestrationEvent::OrchestrationCompleted { result: Box::new(result.clone()) });

        Ok(result)
    }
}
