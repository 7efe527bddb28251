use async_trait::async_trait;
use conductor_abstraction::{DocumentExtractor, ExtractedDocument, ExtractionError};

use super::extension;

const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "csv", "json", "html", "xml", "log"];

/// Reads UTF-8 text formats as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextExtractor;

#[async_trait]
impl DocumentExtractor for TextExtractor {
    fn supports(&self, filename: &str) -> bool {
        extension(filename).is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext.as_str()))
    }

    async fn extract(
        &self,
        filename: &str,
        content: &[u8],
    ) -> Result<ExtractedDocument, ExtractionError> {
        let text = std::str::from_utf8(content).map_err(|e| ExtractionError::Corrupt {
            filename: filename.to_string(),
            reason: format!("not valid UTF-8: {e}"),
        })?;

        if text.trim().is_empty() {
            return Err(ExtractionError::Empty(filename.to_string()));
        }

        Ok(ExtractedDocument { filename: filename.to_string(), text: text.to_string(), page_count: None })
    }
}
