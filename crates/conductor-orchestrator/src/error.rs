// Error types for orchestration

use std::time::Duration;

use conductor_abstraction::{ExtractionError, ModelError, SearchError};
use thiserror::Error;

use crate::result::FailureKind;

/// Result type for orchestration operations
pub type Result<T> = std::result::Result<T, OrchestrationError>;

/// Request-level problems found before any agent runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Query missing or blank.
    #[error("Query must not be empty")]
    EmptyQuery,

    /// No extractor accepts this attachment.
    #[error("Unsupported file type: {filename}")]
    UnsupportedAttachment {
        /// Offending file name
        filename: String,
    },

    /// More attachments than allowed.
    #[error("Too many files: {count} attached, at most {max} allowed")]
    TooManyAttachments {
        /// Number attached
        count: usize,
        /// Configured maximum
        max: usize,
    },

    /// One attachment is over the size limit.
    #[error("File '{filename}' is {size} bytes, limit is {max} bytes")]
    AttachmentTooLarge {
        /// Offending file name
        filename: String,
        /// Actual size in bytes
        size: usize,
        /// Configured maximum in bytes
        max: usize,
    },

    /// The request body could not be parsed.
    #[error("Malformed request: {0}")]
    Malformed(String),
}

/// Orchestration errors
#[derive(Debug, Error)]
pub enum OrchestrationError {
    /// Request rejected before dispatch
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Orchestration cancelled before completion
    #[error("Orchestration cancelled")]
    Cancelled,

    /// Other error
    #[error("Orchestration error: {0}")]
    Other(String),
}

/// A single agent's failure. Always isolated to that agent's invocation.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    /// Language model call failed
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Web search failed
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Document extraction failed
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// The external call succeeded but the output was unusable
    #[error("{0}")]
    Unusable(String),

    /// Exceeded its time budget
    #[error("Timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Cancelled with its request
    #[error("Cancelled")]
    Cancelled,

    /// The agent task panicked
    #[error("Agent panicked: {0}")]
    Panicked(String),
}

impl AgentError {
    /// Failure kind recorded on the invocation.
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout(_) => FailureKind::Timeout,
            Self::Cancelled => FailureKind::Cancelled,
            Self::Panicked(_) => FailureKind::Panicked,
            Self::Model(_) | Self::Search(_) | Self::Extraction(_) | Self::Unusable(_) => {
                FailureKind::Error
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_error_kinds() {
        assert_eq!(AgentError::Timeout(Duration::from_secs(1)).kind(), FailureKind::Timeout);
        assert_eq!(AgentError::Panicked("boom".into()).kind(), FailureKind::Panicked);
        assert_eq!(
            AgentError::Search(SearchError::Timeout(5)).kind(),
            FailureKind::Error
        );
    }

    #[test]
    fn test_timeout_message() {
        assert_eq!(AgentError::Timeout(Duration::from_millis(1500)).to_string(), "Timed out after 1500ms");
    }

    #[test]
    fn test_validation_is_transparent() {
        let err = OrchestrationError::from(ValidationError::EmptyQuery);
        assert_eq!(err.to_string(), "Query must not be empty");
    }
}
