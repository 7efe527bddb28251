use std::time::Duration;

use async_trait::async_trait;
use conductor_abstraction::{SearchError, SearchHit, WebSearch};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

/// SearXNG API response structure
#[derive(Debug, Deserialize)]
struct SearxngResponse {
    results: Vec<SearxngResult>,
}

#[derive(Debug, Deserialize)]
struct SearxngResult {
    url: String,
    title: String,

    #[serde(default)]
    content: String,

    #[serde(default)]
    score: f32,
}

/// Web search backed by a SearXNG instance's JSON API.
#[derive(Debug, Clone)]
pub struct SearxngSearch {
    /// Base URL of the SearXNG instance (e.g., "http://localhost:8888")
    endpoint: String,
    client: Client,
    timeout: Duration,
    max_results: usize,
}

impl SearxngSearch {
    /// Creates a new SearXNG client.
    ///
    /// # Errors
    /// Returns `SearchError::Network` if the HTTP client cannot be built.
    #[instrument(skip_all, fields(endpoint = %endpoint))]
    pub fn new(endpoint: String, timeout: Duration, max_results: usize) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| SearchError::Network(format!("Failed to build HTTP client: {e}")))?;

        let endpoint = endpoint.trim_end_matches('/').to_string();
        info!(
            "Initialized SearXNG client: endpoint={}, timeout={}s, max_results={}",
            endpoint,
            timeout.as_secs(),
            max_results
        );

        Ok(Self { endpoint, client, timeout, max_results })
    }
}

#[async_trait]
impl WebSearch for SearxngSearch {
    fn name(&self) -> &str {
        "searxng"
    }

    #[instrument(skip(self), fields(query_len = query.len(), endpoint = %self.endpoint))]
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        let url = format!("{}/search", self.endpoint);
        debug!("Sending SearXNG request");

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json")])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout(self.timeout.as_secs())
                } else {
                    SearchError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = %status, "SearXNG returned error status");
            return Err(SearchError::Backend { status: status.as_u16(), message });
        }

        let body: SearxngResponse =
            response.json().await.map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        let hits: Vec<SearchHit> = body
            .results
            .into_iter()
            .take(self.max_results)
            .map(|r| SearchHit { title: r.title, url: r.url, snippet: r.content, score: r.score })
            .collect();

        info!(hits = hits.len(), "SearXNG search completed");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(url: &str, max_results: usize) -> SearxngSearch {
        SearxngSearch::new(url.to_string(), Duration::from_secs(5), max_results).unwrap()
    }

    #[tokio::test]
    async fn test_search_maps_results_and_truncates() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "rust async".into()),
                Matcher::UrlEncoded("format".into(), "json".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"query": "rust async", "number_of_results": 3, "results": [
                    {"url": "https://a.test", "title": "A", "content": "first", "engine": "ddg", "score": 2.0},
                    {"url": "https://b.test", "title": "B", "content": "second"},
                    {"url": "https://c.test", "title": "C"}
                ]}"#,
            )
            .create_async()
            .await;

        let hits = client(&server.url(), 2).search("rust async").await.unwrap();

        mock.assert_async().await;
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].snippet, "first");
        assert_eq!(hits[1].url, "https://b.test");
    }

    #[tokio::test]
    async fn test_search_backend_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let err = client(&server.url(), 5).search("x").await.unwrap_err();
        assert_eq!(err, SearchError::Backend { status: 503, message: "unavailable".to_string() });
    }

    #[tokio::test]
    async fn test_search_invalid_json() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let err = client(&server.url(), 5).search("x").await.unwrap_err();
        assert!(matches!(err, SearchError::InvalidResponse(_)));
    }
}
