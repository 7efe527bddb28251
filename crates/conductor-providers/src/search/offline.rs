use async_trait::async_trait;
use conductor_abstraction::{SearchError, SearchHit, WebSearch};
use tracing::debug;

/// Deterministic search backend used when no SearXNG endpoint is configured.
///
/// Produces the same three hits for the same query so responses stay
/// reproducible in demos and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineSearch;

const ANGLES: [(&str, &str); 3] = [
    ("Market overview", "market size, growth rate and leading segments"),
    ("Competitor landscape", "positioning of the main competitors and their recent moves"),
    ("Industry trends", "emerging trends and signals worth tracking"),
];

#[async_trait]
impl WebSearch for OfflineSearch {
    fn name(&self) -> &str {
        "offline"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        let topic = query.trim();
        debug!(query_len = topic.len(), "Offline search");

        let slug: String = topic
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-");

        #[allow(clippy::cast_precision_loss)]
        let hits = ANGLES
            .iter()
            .enumerate()
            .map(|(i, (title, about))| SearchHit {
                title: format!("{title}: {topic}"),
                url: format!("https://example.com/{}/{}", slug, i + 1),
                snippet: format!("Summary of {about} for \"{topic}\"."),
                score: 1.0 - (i as f32) * 0.1,
            })
            .collect();
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_offline_search_is_deterministic() {
        let search = OfflineSearch;
        let a = search.search("EV market in Europe").await.unwrap();
        let b = search.search("EV market in Europe").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
        assert_eq!(a[0].url, "https://example.com/ev-market-in-europe/1");
        assert!(a[1].title.starts_with("Competitor landscape"));
    }
}
