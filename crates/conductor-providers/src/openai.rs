//! OpenAI model implementation.
//!
//! Talks to the chat completions endpoint of the OpenAI API (or any
//! compatible server reachable through a custom base URL).

use std::time::Duration;

use async_trait::async_trait;
use conductor_abstraction::{ChatMessage, Model, ModelError, ModelParameters, ModelResponse, ModelUsage};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// OpenAI model implementation.
#[derive(Debug, Clone)]
pub struct OpenAIModel {
    /// The model ID (e.g., "gpt-4o-mini").
    model_id: String,
    /// The API key for authentication.
    api_key: String,
    /// The base URL for the OpenAI API, without trailing slash.
    base_url: String,
    /// HTTP client for making requests.
    client: Client,
}

impl OpenAIModel {
    /// Creates a new `OpenAIModel`, reading the key from `OPENAI_API_KEY`.
    ///
    /// # Errors
    /// Returns `ModelError::UnsupportedModelProvider` if the variable is unset.
    pub fn new(model_id: String) -> Result<Self, ModelError> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            error!("OPENAI_API_KEY environment variable not set");
            ModelError::UnsupportedModelProvider(
                "OPENAI_API_KEY environment variable not set".to_string(),
            )
        })?;
        Self::with_api_key(model_id, api_key)
    }

    /// Creates a new `OpenAIModel` with an explicit API key.
    ///
    /// # Errors
    /// Returns `ModelError::RequestError` if the HTTP client cannot be built.
    pub fn with_api_key(model_id: String, api_key: String) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ModelError::RequestError(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { model_id, api_key, base_url: DEFAULT_BASE_URL.to_string(), client })
    }

    /// Points the client at a different OpenAI-compatible endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Maps a non-success HTTP status to the matching `ModelError`.
    fn classify_error(status: StatusCode, body: String) -> ModelError {
        let lower = body.to_lowercase();
        let quota_like = lower.contains("quota") || lower.contains("rate limit");

        if status == StatusCode::PAYMENT_REQUIRED
            || status == StatusCode::TOO_MANY_REQUESTS
            || (status == StatusCode::FORBIDDEN && quota_like)
        {
            return ModelError::QuotaExceeded { provider: "openai".to_string(), message: Some(body) };
        }

        ModelError::ModelResponseError(format!("API error ({}): {}", status, body))
    }
}

#[async_trait]
impl Model for OpenAIModel {
    async fn generate_text(
        &self,
        prompt: &str,
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        self.generate_chat_completion(&[ChatMessage::user(prompt)], parameters).await
    }

    async fn generate_chat_completion(
        &self,
        messages: &[ChatMessage],
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        debug!(
            model_id = %self.model_id,
            message_count = messages.len(),
            "OpenAIModel generating chat completion"
        );

        let params = parameters.unwrap_or_default();
        let body = ChatRequest {
            model: &self.model_id,
            messages,
            temperature: params.temperature,
            top_p: params.top_p,
            max_tokens: params.max_tokens,
            stop: params.stop_sequences.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send request to OpenAI API");
                if e.is_timeout() {
                    ModelError::RequestError(format!("Request timed out: {}", e))
                } else {
                    ModelError::RequestError(format!("Network error: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %text, "OpenAI API returned error status");
            return Err(Self::classify_error(status, text));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse OpenAI API response");
            ModelError::SerializationError(format!("Failed to parse response: {}", e))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ModelError::ModelResponseError("No content in API response".to_string()))?;

        let usage = parsed.usage.map(|u| ModelUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ModelResponse { content, model_id: Some(self.model_id.clone()), usage })
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a [String]>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)] // Matches API naming
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_api_key_builds_client() {
        let model = OpenAIModel::with_api_key("gpt-4o-mini".to_string(), "k".to_string()).unwrap();
        assert_eq!(model.model_id(), "gpt-4o-mini");
        assert_eq!(model.base_url, DEFAULT_BASE_URL);
    }

    #[tokio::test]
    async fn test_openai_generate_text_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                "choices": [{"message": {"role": "assistant", "content": "Hello, world!"}}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 20, "total_tokens": 30}
            }"#,
            )
            .create_async()
            .await;

        let model = OpenAIModel::with_api_key("gpt-4o-mini".to_string(), "test-key".to_string())
            .unwrap()
            .with_base_url(format!("{}/v1/", server.url()));
        let response = model.generate_text("Say hello", None).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.content, "Hello, world!");
        assert_eq!(response.usage.unwrap().total_tokens, 30);
    }

    #[tokio::test]
    async fn test_openai_quota_maps_to_quota_exceeded() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_body(r#"{"error": {"message": "You exceeded your current quota"}}"#)
            .create_async()
            .await;

        let model = OpenAIModel::with_api_key("gpt-4o-mini".to_string(), "k".to_string())
            .unwrap()
            .with_base_url(format!("{}/v1", server.url()));
        let err = model.generate_text("hi", None).await.unwrap_err();

        assert!(matches!(err, ModelError::QuotaExceeded { .. }));
    }

    #[tokio::test]
    async fn test_openai_empty_choices_is_response_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let model = OpenAIModel::with_api_key("gpt-4o-mini".to_string(), "k".to_string())
            .unwrap()
            .with_base_url(format!("{}/v1", server.url()));
        let err = model.generate_text("hi", None).await.unwrap_err();

        assert!(matches!(err, ModelError::ModelResponseError(_)));
    }

    #[test]
    fn test_server_error_is_not_quota() {
        let err = OpenAIModel::classify_error(StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string());
        assert_eq!(err, ModelError::ModelResponseError("API error (500 Internal Server Error): boom".to_string()));
    }
}
