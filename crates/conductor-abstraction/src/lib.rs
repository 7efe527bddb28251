//! Collaborator abstraction layer for Conductor.
//!
//! Agents never talk to the outside world directly. Every external capability
//! they depend on is expressed here as a trait so the orchestrator can treat
//! them uniformly (and tests can swap them for fakes):
//!
//! - [`Model`]: language generation (prompt in, text out)
//! - [`WebSearch`]: ranked web search snippets for a query
//! - [`DocumentExtractor`]: text extraction from uploaded file bytes

pub mod document;
pub mod model;
pub mod search;

pub use document::{DocumentExtractor, ExtractedDocument, ExtractionError};
pub use model::{ChatMessage, Model, ModelError, ModelParameters, ModelResponse, ModelUsage};
pub use search::{SearchError, SearchHit, WebSearch};
