//! Document analysis agent.

use std::sync::Arc;

use async_trait::async_trait;
use conductor_abstraction::{DocumentExtractor, ExtractionError};
use serde_json::json;
use tracing::{debug, warn};

use super::preview;
use crate::{Agent, AgentError, AgentKind, AgentOutput, TaskContext, counted};

const PREVIEW_CHARS: usize = 500;

/// Extracts text from every attachment of the request.
pub struct FileAgent {
    extractor: Arc<dyn DocumentExtractor>,
}

impl FileAgent {
    /// Creates a new `FileAgent` using `extractor`.
    #[must_use]
    pub fn new(extractor: Arc<dyn DocumentExtractor>) -> Self {
        Self { extractor }
    }
}

#[async_trait]
impl Agent for FileAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::File
    }

    fn description(&self) -> &str {
        "Extracts and previews the text of uploaded documents"
    }

    async fn execute(&self, context: &TaskContext) -> Result<AgentOutput, AgentError> {
        if context.attachments.is_empty() {
            return Ok(AgentOutput::new("No documents were attached").with_payload(json!({ "documents": [] })));
        }

        let mut documents = Vec::with_capacity(context.attachments.len());
        let mut errors: Vec<ExtractionError> = Vec::new();

        for attachment in context.attachments.iter() {
            match self.extractor.extract(&attachment.filename, &attachment.content).await {
                Ok(doc) => {
                    debug!(filename = %doc.filename, chars = doc.text.chars().count(), "Document extracted");
                    documents.push(json!({
                        "filename": doc.filename,
                        "text_length": doc.text.chars().count(),
                        "text_preview": preview(&doc.text, PREVIEW_CHARS),
                        "page_count": doc.page_count,
                    }));
                }
                Err(e) => {
                    warn!(filename = %attachment.filename, error = %e, "Document extraction failed");
                    documents.push(json!({ "filename": attachment.filename, "error": e.to_string() }));
                    errors.push(e);
                }
            }
        }

        let total = context.attachments.len();
        let processed = total - errors.len();

        if processed == 0 {
            return Err(match errors.pop() {
                Some(only) if total == 1 => AgentError::Extraction(only),
                _ => AgentError::Unusable(format!("None of the {total} documents could be processed")),
            });
        }

        let mut summary = format!("Processed {}", counted(processed, "document"));
        if !errors.is_empty() {
            summary.push_str(&format!(" ({} failed)", errors.len()));
        }

        Ok(AgentOutput::new(summary).with_payload(json!({ "documents": documents })))
    }
}
