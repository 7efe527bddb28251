//! Provider implementations for Conductor.
//!
//! This crate provides concrete implementations of the collaborator traits
//! defined in `conductor-abstraction`.
//!
//! # Language models
//!
//! - **Mock**: deterministic offline responses, the default
//! - **OpenAI**: chat completions API (API key required)
//!
//! # Web search
//!
//! - **SearXNG**: JSON API of a self-hosted SearXNG instance
//! - **Offline**: deterministic placeholder results when no endpoint is configured
//!
//! # Document extraction
//!
//! - **PDF** via `lopdf`
//! - **Plain text** formats (txt, md, csv, json, html, xml, log)

pub mod documents;
pub mod factory;
pub mod mock;
pub mod openai;
pub mod search;

pub use documents::{ExtractorChain, PdfExtractor, TextExtractor};
pub use factory::{ModelConfig, ModelFactory, ModelType};
pub use mock::MockModel;
pub use openai::OpenAIModel;
pub use search::{OfflineSearch, SearxngSearch};

/// Count tokens in a string (simplified: word count).
fn count_tokens(text: &str) -> u32 {
    text.split_whitespace().count() as u32
}
