use async_trait::async_trait;
use conductor_abstraction::{DocumentExtractor, ExtractedDocument, ExtractionError};
use lopdf::Document;
use tracing::{debug, warn};

use super::extension;

/// Extracts text from PDF files with `lopdf`.
///
/// Parsing is CPU-bound and runs on the blocking pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

fn parse(filename: &str, content: &[u8]) -> Result<ExtractedDocument, ExtractionError> {
    let corrupt = |reason: String| ExtractionError::Corrupt { filename: filename.to_string(), reason };

    let document = Document::load_mem(content).map_err(|e| corrupt(e.to_string()))?;
    let pages: Vec<u32> = document.get_pages().keys().copied().collect();

    let mut text = String::new();
    for page in &pages {
        match document.extract_text(&[*page]) {
            Ok(page_text) => text.push_str(&page_text),
            // A single unreadable page should not sink the whole document.
            Err(e) => warn!(filename, page, error = %e, "Skipping unreadable PDF page"),
        }
    }

    if text.trim().is_empty() {
        return Err(ExtractionError::Empty(filename.to_string()));
    }

    Ok(ExtractedDocument { filename: filename.to_string(), text, page_count: Some(pages.len()) })
}

#[async_trait]
impl DocumentExtractor for PdfExtractor {
    fn supports(&self, filename: &str) -> bool {
        extension(filename).as_deref() == Some("pdf")
    }

    async fn extract(
        &self,
        filename: &str,
        content: &[u8],
    ) -> Result<ExtractedDocument, ExtractionError> {
        debug!(filename, bytes = content.len(), "Extracting PDF");
        let name = filename.to_string();
        let bytes = content.to_vec();
        tokio::task::spawn_blocking(move || parse(&name, &bytes)).await.map_err(|e| {
            ExtractionError::Corrupt { filename: filename.to_string(), reason: e.to_string() }
        })?
    }
}
