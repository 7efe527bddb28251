//! Deterministic mock language model.

use async_trait::async_trait;
use conductor_abstraction::{ChatMessage, Model, ModelError, ModelParameters, ModelResponse, ModelUsage};
use tracing::debug;

use crate::count_tokens;

/// A mock implementation of the `Model` trait for offline use and tests.
///
/// The response is a short bulleted list derived from the first line of the
/// prompt, so agents that post-process model output behave realistically.
#[derive(Debug, Default, Clone)]
pub struct MockModel {
    id: String,
}

impl MockModel {
    /// Creates a new `MockModel` with the given ID.
    #[must_use]
    pub const fn new(id: String) -> Self {
        Self { id }
    }

    fn respond(prompt: &str) -> String {
        let topic = prompt.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("the request");
        format!(
            "- Key point: {topic}\n\
             - Data patterns indicate follow-up opportunities\n\
             - Recommended next step: review the findings with stakeholders"
        )
    }
}

#[async_trait]
impl Model for MockModel {
    async fn generate_text(
        &self,
        prompt: &str,
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        debug!(model_id = %self.id, prompt_len = prompt.len(), parameters = ?parameters, "MockModel generating text");

        let content = Self::respond(prompt);
        let prompt_tokens = count_tokens(prompt);
        let completion_tokens = count_tokens(&content);

        Ok(ModelResponse {
            content,
            model_id: Some(self.id.clone()),
            usage: Some(ModelUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            }),
        })
    }

    async fn generate_chat_completion(
        &self,
        messages: &[ChatMessage],
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map_or("", |m| m.content.as_str());
        self.generate_text(last_user, parameters).await
    }

    fn model_id(&self) -> &str {
        &self.id
    }
}
