//! Built-in agent implementations.
//!
//! Each agent wraps one external collaborator (document extractor, web
//! search or language model) and turns its output into an `AgentOutput`.

pub mod analysis;
pub mod calendar;
pub mod file;
pub mod mail;
pub mod research;

pub use analysis::AnalysisAgent;
pub use calendar::CalendarAgent;
pub use file::FileAgent;
pub use mail::MailAgent;
pub use research::ResearchAgent;

/// First `max_chars` characters of `text`, with `...` appended when cut.
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        assert_eq!(preview("héllo", 2), "hé...");
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("exact", 5), "exact");
    }
}
