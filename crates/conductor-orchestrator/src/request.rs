//! Incoming orchestration requests and their validation.

use conductor_abstraction::DocumentExtractor;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// An uploaded file, held only for the duration of a request.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Original file name.
    pub filename: String,
    /// Declared MIME type, if the client sent one.
    pub content_type: Option<String>,
    /// Raw file bytes.
    pub content: Vec<u8>,
}

impl Attachment {
    /// Creates an attachment without a declared content type.
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self { filename: filename.into(), content_type: None, content: content.into() }
    }

    /// Sets the declared content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("bytes", &self.content.len())
            .finish()
    }
}

/// Limits checked before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLimits {
    /// Maximum number of attachments per request.
    pub max_attachments: usize,
    /// Maximum size of a single attachment in bytes.
    pub max_attachment_bytes: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self { max_attachments: 10, max_attachment_bytes: 25 * 1024 * 1024 }
    }
}

/// A query plus its attachments.
#[derive(Debug, Clone, Default)]
pub struct OrchestrationRequest {
    pub query: String,
    pub attachments: Vec<Attachment>,
    /// Correlation id from the caller (e.g. `x-request-id`); generated when absent.
    pub request_id: Option<String>,
}

impl OrchestrationRequest {
    /// Creates a request with no attachments.
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), attachments: Vec::new(), request_id: None }
    }

    /// Sets the correlation id.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Adds an attachment.
    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Checks the request against `limits` and the extractor's supported formats.
    ///
    /// # Errors
    /// Returns the first `ValidationError` found.
    pub fn validate(
        &self,
        limits: &RequestLimits,
        extractor: &dyn DocumentExtractor,
    ) -> Result<(), ValidationError> {
        if self.query.trim().is_empty() {
            return Err(ValidationError::EmptyQuery);
        }

        if self.attachments.len() > limits.max_attachments {
            return Err(ValidationError::TooManyAttachments {
                count: self.attachments.len(),
                max: limits.max_attachments,
            });
        }

        for attachment in &self.attachments {
            if attachment.content.len() > limits.max_attachment_bytes {
                return Err(ValidationError::AttachmentTooLarge {
                    filename: attachment.filename.clone(),
                    size: attachment.content.len(),
                    max: limits.max_attachment_bytes,
                });
            }
            if !extractor.supports(&attachment.filename) {
                return Err(ValidationError::UnsupportedAttachment {
                    filename: attachment.filename.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conductor_providers::ExtractorChain;

    #[test]
    fn test_blank_query_rejected() {
        let err = OrchestrationRequest::new("   \n")
            .validate(&RequestLimits::default(), &ExtractorChain::default())
            .unwrap_err();
        assert_eq!(err, ValidationError::EmptyQuery);
    }

    #[test]
    fn test_unsupported_attachment_rejected() {
        let request = OrchestrationRequest::new("Analyze this")
            .with_attachment(Attachment::new("setup.exe", b"MZ".to_vec()));
        let err = request.validate(&RequestLimits::default(), &ExtractorChain::default()).unwrap_err();
        assert_eq!(err, ValidationError::UnsupportedAttachment { filename: "setup.exe".to_string() });
    }

    #[test]
    fn test_limits_enforced() {
        let limits = RequestLimits { max_attachments: 1, max_attachment_bytes: 4 };
        let extractor = ExtractorChain::default();

        let too_many = OrchestrationRequest::new("q")
            .with_attachment(Attachment::new("a.txt", b"a".to_vec()))
            .with_attachment(Attachment::new("b.txt", b"b".to_vec()));
        assert_eq!(
            too_many.validate(&limits, &extractor).unwrap_err(),
            ValidationError::TooManyAttachments { count: 2, max: 1 }
        );

        let too_big = OrchestrationRequest::new("q").with_attachment(Attachment::new("a.txt", b"hello".to_vec()));
        assert!(matches!(
            too_big.validate(&limits, &extractor).unwrap_err(),
            ValidationError::AttachmentTooLarge { size: 5, .. }
        ));
    }

    #[test]
    fn test_valid_request_passes() {
        let request = OrchestrationRequest::new("Analyze uploaded PDFs")
            .with_attachment(Attachment::new("q4.pdf", b"%PDF-1.4".to_vec()).with_content_type("application/pdf"));
        assert!(request.validate(&RequestLimits::default(), &ExtractorChain::default()).is_ok());
    }
}
