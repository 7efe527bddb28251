//! Synthesis agent backed by a language model.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use conductor_abstraction::{DocumentExtractor, Model, ModelParameters};
use serde_json::json;
use tracing::debug;

use super::preview;
use crate::{Agent, AgentError, AgentKind, AgentOutput, TaskContext, counted};

const MAX_INSIGHTS: usize = 5;
const DOCUMENT_EXCERPT_CHARS: usize = 4000;
const CONFIDENCE_SCORE: f64 = 0.85;

/// Asks the model for key insights on the query and any attached documents.
///
/// This is the fallback agent, selected when no other agent matches.
pub struct AnalysisAgent {
    model: Arc<dyn Model>,
    extractor: Arc<dyn DocumentExtractor>,
}

impl AnalysisAgent {
    /// Creates a new `AnalysisAgent`.
    #[must_use]
    pub fn new(model: Arc<dyn Model>, extractor: Arc<dyn DocumentExtractor>) -> Self {
        Self { model, extractor }
    }

    async fn build_prompt(&self, context: &TaskContext) -> String {
        let mut prompt = format!(
            "{}\n\nList the key insights for this request, one per line. \
             End with a recommended next step.\n",
            context.query
        );

        for attachment in context.attachments.iter() {
            // Unreadable documents are reported by the file agent.
            match self.extractor.extract(&attachment.filename, &attachment.content).await {
                Ok(doc) => {
                    let _ = write!(
                        prompt,
                        "\nDocument '{}':\n{}\n",
                        doc.filename,
                        preview(&doc.text, DOCUMENT_EXCERPT_CHARS)
                    );
                }
                Err(e) => debug!(filename = %attachment.filename, error = %e, "Skipping document in analysis prompt"),
            }
        }

        prompt
    }
}

/// Non-empty lines of `text` with list markers removed.
fn insight_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| strip_list_marker(line).to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Removes a leading bullet (`-`, `*`, `•`) and then a numeral (`1.`, `2)`),
/// each only when followed by whitespace.
fn strip_list_marker(line: &str) -> &str {
    let mut line = line.trim();
    for is_marker in [is_bullet, is_numeral] {
        if let Some((head, rest)) = line.split_once(char::is_whitespace) {
            if is_marker(head) {
                line = rest.trim_start();
            }
        }
    }
    line
}

fn is_bullet(head: &str) -> bool {
    matches!(head, "-" | "*" | "•")
}

fn is_numeral(head: &str) -> bool {
    head.strip_suffix(['.', ')'])
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

#[async_trait]
impl Agent for AnalysisAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Analysis
    }

    fn description(&self) -> &str {
        "Synthesizes key insights and recommendations with a language model"
    }

    async fn execute(&self, context: &TaskContext) -> Result<AgentOutput, AgentError> {
        let prompt = self.build_prompt(context).await;
        let params = ModelParameters { temperature: Some(0.3), ..ModelParameters::default() };
        let response = self.model.generate_text(&prompt, Some(params)).await?;

        let lines = insight_lines(&response.content);
        if lines.is_empty() {
            return Err(AgentError::Unusable("Model returned an empty analysis".to_string()));
        }

        let key_insights: Vec<String> = lines.iter().take(MAX_INSIGHTS).cloned().collect();
        let recommendations: Vec<&String> = lines
            .iter()
            .filter(|l| {
                let lower = l.to_lowercase();
                lower.contains("recommend") || lower.contains("next step") || lower.contains("should")
            })
            .collect();

        Ok(AgentOutput::new(format!("Generated analysis with {}", counted(key_insights.len(), "key insight")))
            .with_payload(json!({
                "summary": key_insights.first(),
                "key_insights": key_insights,
                "recommendations": recommendations,
                "confidence_score": CONFIDENCE_SCORE,
                "model_id": self.model.model_id(),
            })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Attachment;
    use chrono::Utc;
    use conductor_abstraction::{ChatMessage, ModelError, ModelResponse};
    use conductor_providers::{ExtractorChain, MockModel};
    use std::sync::Mutex;

    /// Records the prompt and answers with fixed text.
    struct Scripted {
        answer: String,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Model for Scripted {
        async fn generate_text(
            &self,
            prompt: &str,
            _parameters: Option<ModelParameters>,
        ) -> Result<ModelResponse, ModelError> {
            self.seen.lock().unwrap().push(prompt.to_string());
            Ok(ModelResponse { content: self.answer.clone(), model_id: None, usage: None })
        }

        async fn generate_chat_completion(
            &self,
            _messages: &[ChatMessage],
            _parameters: Option<ModelParameters>,
        ) -> Result<ModelResponse, ModelError> {
            unreachable!()
        }

        fn model_id(&self) -> &str {
            "scripted"
        }
    }

    fn context(attachments: Vec<Attachment>) -> TaskContext {
        TaskContext {
            request_id: "req".to_string(),
            query: "Summarize Q4 results".to_string(),
            attachments: Arc::from(attachments),
            received_at: Utc::now(),
        }
    }

    #[test]
    fn test_insight_lines_strip_markers() {
        assert_eq!(insight_lines("- one\n\n2. two\n* three\n10) four\n- 3. five"), vec![
            "one", "two", "three", "four", "five"
        ]);
    }

    #[test]
    fn test_insight_lines_keep_leading_numbers() {
        assert_eq!(
            insight_lines("2024 revenue grew 12%\n3.5% churn is expected\n10x growth in EMEA\n-5% margin"),
            vec!["2024 revenue grew 12%", "3.5% churn is expected", "10x growth in EMEA", "-5% margin"]
        );
    }

    #[tokio::test]
    async fn test_mock_model_analysis() {
        let agent = AnalysisAgent::new(Arc::new(MockModel::new("mock".to_string())), Arc::new(ExtractorChain::default()));
        let output = agent.execute(&context(Vec::new())).await.unwrap();

        assert_eq!(output.summary, "Generated analysis with 3 key insights");
        let payload = output.payload.unwrap();
        assert_eq!(payload["summary"], "Key point: Summarize Q4 results");
        assert_eq!(payload["recommendations"].as_array().unwrap().len(), 1);
        assert_eq!(payload["confidence_score"], 0.85);
    }

    #[tokio::test]
    async fn test_insights_capped_and_documents_in_prompt() {
        let model = Arc::new(Scripted { answer: "a\nb\nc\nd\ne\nf\ng".to_string(), seen: Mutex::new(Vec::new()) });
        let agent = AnalysisAgent::new(model.clone(), Arc::new(ExtractorChain::default()));
        let output = agent
            .execute(&context(vec![Attachment::new("q4.csv", b"region,revenue\nEU,10".to_vec())]))
            .await
            .unwrap();

        assert_eq!(output.summary, "Generated analysis with 5 key insights");
        let prompt = model.seen.lock().unwrap()[0].clone();
        assert!(prompt.starts_with("Summarize Q4 results"));
        assert!(prompt.contains("Document 'q4.csv'"));
    }

    #[tokio::test]
    async fn test_blank_model_output_fails() {
        let model = Arc::new(Scripted { answer: "  \n".to_string(), seen: Mutex::new(Vec::new()) });
        let agent = AnalysisAgent::new(model, Arc::new(ExtractorChain::default()));
        let err = agent.execute(&context(Vec::new())).await.unwrap_err();
        assert!(matches!(err, AgentError::Unusable(_)));
    }
}
