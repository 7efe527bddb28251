//! API error responses.

use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use conductor_orchestrator::{OrchestrationError, ValidationError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Request-level failures, rendered as `{success: false, error, error_kind, data: null}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::PayloadTooLarge(_) => "validation",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::AttachmentTooLarge { .. } => Self::PayloadTooLarge(err.to_string()),
            other => Self::Validation(other.to_string()),
        }
    }
}

impl From<OrchestrationError> for ApiError {
    fn from(err: OrchestrationError) -> Self {
        match err {
            OrchestrationError::Validation(validation) => validation.into(),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(format!("Request body too large: {}", err.body_text()))
        } else {
            Self::Validation(ValidationError::Malformed(err.body_text()).to_string())
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(err: MultipartRejection) -> Self {
        Self::Validation(ValidationError::Malformed(err.body_text()).to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Internal(_)) {
            error!(error = %self, "Request failed with internal error");
        }

        let body = json!({
            "success": false,
            "error": self.to_string(),
            "error_kind": self.kind(),
            "data": null,
        });
        (self.status(), Json(body)).into_response()
    }
}
