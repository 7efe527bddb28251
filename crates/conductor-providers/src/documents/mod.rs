//! Document text extractors.

mod pdf;
mod text;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use conductor_abstraction::{DocumentExtractor, ExtractedDocument, ExtractionError};

pub use pdf::PdfExtractor;
pub use text::TextExtractor;

/// Lowercased file extension, if any.
pub(crate) fn extension(filename: &str) -> Option<String> {
    Path::new(filename).extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase)
}

/// Dispatches each document to the first extractor that supports it.
#[derive(Clone)]
pub struct ExtractorChain {
    extractors: Vec<Arc<dyn DocumentExtractor>>,
}

impl ExtractorChain {
    /// Creates a chain from an ordered list of extractors.
    #[must_use]
    pub fn new(extractors: Vec<Arc<dyn DocumentExtractor>>) -> Self {
        Self { extractors }
    }
}

impl Default for ExtractorChain {
    fn default() -> Self {
        Self::new(vec![Arc::new(PdfExtractor), Arc::new(TextExtractor)])
    }
}

impl std::fmt::Debug for ExtractorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorChain").field("extractors", &self.extractors.len()).finish()
    }
}

#[async_trait]
impl DocumentExtractor for ExtractorChain {
    fn supports(&self, filename: &str) -> bool {
        self.extractors.iter().any(|e| e.supports(filename))
    }

    async fn extract(
        &self,
        filename: &str,
        content: &[u8],
    ) -> Result<ExtractedDocument, ExtractionError> {
        let extractor = self
            .extractors
            .iter()
            .find(|e| e.supports(filename))
            .ok_or_else(|| ExtractionError::UnsupportedFormat(filename.to_string()))?;
        extractor.extract(filename, content).await
    }
}
