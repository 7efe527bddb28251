use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use conductor_orchestrator::{Attachment, OrchestrationRequest, OrchestrationResult, ValidationError};
use serde::Serialize;
use tracing::debug;

use crate::AppState;
use crate::error::ApiError;
use crate::logging::REQUEST_ID_HEADER;

#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    pub success: bool,
    pub data: OrchestrationResult,
}

/// Runs one orchestration and answers with the aggregated result.
pub async fn execute(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExecuteResponse>, ApiError> {
    let request = parse_request(multipart?, request_id(&headers)).await?;
    let result = state.orchestrator.execute(request).await?;
    Ok(Json(ExecuteResponse { success: true, data: result }))
}

/// Reads the `query` field and every `files` part into a request.
///
/// Browsers send an empty, unnamed part for an untouched file input; those
/// are skipped.
pub async fn parse_request(
    mut multipart: Multipart,
    request_id: Option<String>,
) -> Result<OrchestrationRequest, ApiError> {
    let mut request = OrchestrationRequest { request_id, ..OrchestrationRequest::default() };

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "query" => request.query = field.text().await?,
            "files" | "files[]" | "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(ToString::to_string);
                let content = field.bytes().await?;

                if filename.is_empty() {
                    if content.is_empty() {
                        continue;
                    }
                    return Err(ValidationError::Malformed("file part without a filename".to_string()).into());
                }

                let mut attachment = Attachment::new(filename, content.to_vec());
                if let Some(content_type) = content_type {
                    attachment = attachment.with_content_type(content_type);
                }
                request.attachments.push(attachment);
            }
            other => debug!(field = %other, "Ignoring unknown multipart field"),
        }
    }

    Ok(request)
}

pub(crate) fn request_id(headers: &HeaderMap) -> Option<String> {
    headers.get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok()).map(ToString::to_string)
}
