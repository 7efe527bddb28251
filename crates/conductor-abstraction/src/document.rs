//! Document extraction abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while extracting text from an uploaded document.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionError {
    /// No extractor understands this file format.
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// The document claimed a supported format but could not be parsed.
    #[error("Corrupt document '{filename}': {reason}")]
    Corrupt {
        /// Name of the offending file.
        filename: String,
        /// Parser error description.
        reason: String,
    },

    /// The document parsed but yielded no text.
    #[error("Document '{0}' contains no extractable text")]
    Empty(String),
}

/// Text pulled out of a single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Original file name.
    pub filename: String,
    /// Extracted text content.
    pub text: String,
    /// Page count, when the format has pages.
    pub page_count: Option<usize>,
}

/// Extracts text from raw document bytes.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Returns `true` if this extractor accepts files with the given name.
    ///
    /// Used for request validation before any agent runs.
    fn supports(&self, filename: &str) -> bool;

    /// Extracts text from `content`.
    ///
    /// # Errors
    /// Returns an `ExtractionError` for unsupported or corrupt documents.
    async fn extract(
        &self,
        filename: &str,
        content: &[u8],
    ) -> Result<ExtractedDocument, ExtractionError>;
}
