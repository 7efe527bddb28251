//! Web search abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a web search backend.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchError {
    /// The backend could not be reached.
    #[error("Search network error: {0}")]
    Network(String),

    /// The backend did not answer in time.
    #[error("Search timed out after {0}s")]
    Timeout(u64),

    /// The backend answered with a non-success status.
    #[error("Search backend returned status {status}: {message}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Invalid search response: {0}")]
    InvalidResponse(String),
}

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Page title.
    pub title: String,
    /// Target URL.
    pub url: String,
    /// Content snippet.
    pub snippet: String,
    /// Backend relevance score, higher is better.
    #[serde(default)]
    pub score: f32,
}

/// Performs web searches.
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Returns the backend name used in logs and payloads.
    fn name(&self) -> &str;

    /// Searches for `query`, returning hits ordered by rank.
    ///
    /// # Errors
    /// Returns a `SearchError` on network, timeout or decoding failures.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError>;
}
