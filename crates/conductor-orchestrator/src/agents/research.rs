//! Web research agent.

use std::sync::Arc;

use async_trait::async_trait;
use conductor_abstraction::WebSearch;
use serde_json::json;
use tracing::debug;

use crate::{Agent, AgentError, AgentKind, AgentOutput, TaskContext, counted};

/// Searches the web for the query and reports findings with their sources.
pub struct ResearchAgent {
    search: Arc<dyn WebSearch>,
}

impl ResearchAgent {
    /// Creates a new `ResearchAgent` backed by `search`.
    #[must_use]
    pub fn new(search: Arc<dyn WebSearch>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl Agent for ResearchAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Research
    }

    fn description(&self) -> &str {
        "Finds market, competitor and background information on the web"
    }

    async fn execute(&self, context: &TaskContext) -> Result<AgentOutput, AgentError> {
        let hits = self.search.search(&context.query).await?;
        debug!(backend = %self.search.name(), hits = hits.len(), "Research search finished");

        if hits.is_empty() {
            return Err(AgentError::Unusable("Search returned no results".to_string()));
        }

        let findings: Vec<&str> = hits
            .iter()
            .map(|h| if h.snippet.trim().is_empty() { h.title.as_str() } else { h.snippet.as_str() })
            .collect();
        let sources: Vec<&str> = hits.iter().map(|h| h.url.as_str()).collect();

        Ok(AgentOutput::new(format!("Found {}", counted(hits.len(), "research insight"))).with_payload(json!({
            "query": context.query,
            "backend": self.search.name(),
            "findings": findings,
            "sources": sources,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use conductor_abstraction::{SearchError, SearchHit};
    use conductor_providers::OfflineSearch;

    struct EmptySearch;

    #[async_trait]
    impl WebSearch for EmptySearch {
        fn name(&self) -> &str {
            "empty"
        }

        async fn search(&self, _query: &str) -> Result<Vec<SearchHit>, SearchError> {
            Ok(Vec::new())
        }
    }

    fn context() -> TaskContext {
        TaskContext {
            request_id: "req".to_string(),
            query: "EV competitor landscape".to_string(),
            attachments: Arc::from(Vec::new()),
            received_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_findings_and_sources() {
        let output = ResearchAgent::new(Arc::new(OfflineSearch)).execute(&context()).await.unwrap();
        assert_eq!(output.summary, "Found 3 research insights");
        let payload = output.payload.unwrap();
        assert_eq!(payload["sources"].as_array().unwrap().len(), 3);
        assert_eq!(payload["backend"], "offline");
    }

    #[tokio::test]
    async fn test_empty_results_fail() {
        let err = ResearchAgent::new(Arc::new(EmptySearch)).execute(&context()).await.unwrap_err();
        assert_eq!(err.to_string(), "Search returned no results");
    }
}
