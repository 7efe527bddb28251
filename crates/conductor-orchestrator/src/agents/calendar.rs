//! Meeting scheduling agent.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, SecondsFormat, Utc, Weekday};
use serde_json::json;

use crate::{Agent, AgentError, AgentKind, AgentOutput, TaskContext};

const SLOT_COUNT: usize = 3;
const SLOT_HOUR_UTC: u32 = 10;
const SLOT_MINUTES: i64 = 30;
const MAX_TITLE_CHARS: usize = 80;

/// Proposes meeting slots on the next business days.
#[derive(Debug, Default, Clone, Copy)]
pub struct CalendarAgent;

impl CalendarAgent {
    /// Creates a new `CalendarAgent`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// 10:00 UTC on each of the next business days after `from`.
fn proposed_slots(from: NaiveDate) -> Vec<DateTime<Utc>> {
    std::iter::successors(from.succ_opt(), |d| d.succ_opt())
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .filter_map(|d| d.and_hms_opt(SLOT_HOUR_UTC, 0, 0))
        .map(|dt| dt.and_utc())
        .take(SLOT_COUNT)
        .collect()
}

/// Meeting title taken from the phrase after "about", "for" or "regarding".
fn meeting_title(query: &str) -> String {
    let start = [" about ", " regarding ", " for "]
        .iter()
        .filter_map(|marker| find_ascii_ignore_case(query, marker).map(|i| i + marker.len()))
        .min();

    let raw = start.and_then(|i| query.get(i..)).unwrap_or(query);

    let title: String = raw.trim().trim_end_matches(['.', '?', '!']).chars().take(MAX_TITLE_CHARS).collect();
    if title.is_empty() { "Meeting".to_string() } else { title }
}

/// Byte offset of an ASCII `needle` in `haystack`, ignoring ASCII case.
///
/// ASCII bytes never occur inside a multi-byte UTF-8 sequence, so a match
/// always starts and ends on a char boundary.
fn find_ascii_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack.as_bytes().windows(needle.len()).position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

#[async_trait]
impl Agent for CalendarAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Calendar
    }

    fn description(&self) -> &str {
        "Proposes meeting slots on upcoming business days"
    }

    async fn execute(&self, context: &TaskContext) -> Result<AgentOutput, AgentError> {
        let slots = proposed_slots(context.received_at.date_naive());
        if slots.is_empty() {
            return Err(AgentError::Unusable("No business days available for scheduling".to_string()));
        }

        let formatted: Vec<String> =
            slots.iter().map(|s| s.to_rfc3339_opts(SecondsFormat::Secs, true)).collect();
        let ends: Vec<String> = slots
            .iter()
            .map(|s| (*s + Duration::minutes(SLOT_MINUTES)).to_rfc3339_opts(SecondsFormat::Secs, true))
            .collect();

        Ok(AgentOutput::new(format!("Proposed {} meeting slots", slots.len())).with_payload(json!({
            "action": "propose_meeting",
            "title": meeting_title(&context.query),
            "proposed_slots": formatted,
            "slot_ends": ends,
            "duration_minutes": SLOT_MINUTES,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn test_slots_skip_weekends() {
        // Friday 2024-03-15
        let friday = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let slots: Vec<String> =
            proposed_slots(friday).iter().map(|s| s.to_rfc3339_opts(SecondsFormat::Secs, true)).collect();
        assert_eq!(
            slots,
            vec!["2024-03-18T10:00:00Z", "2024-03-19T10:00:00Z", "2024-03-20T10:00:00Z"]
        );
    }

    #[test]
    fn test_meeting_title() {
        assert_eq!(meeting_title("Schedule a meeting about the Q4 roadmap."), "the Q4 roadmap");
        assert_eq!(meeting_title("Set up time for budget review"), "budget review");
        assert_eq!(meeting_title("calendar"), "calendar");
        assert_eq!(meeting_title("Meeting ABOUT Pricing"), "Pricing");
    }

    #[test]
    fn test_meeting_title_with_case_changing_characters() {
        // 'İ' grows and the Kelvin sign shrinks when lowercased.
        assert_eq!(meeting_title("İİ meeting about x\u{212A}"), "x\u{212A}");
        assert_eq!(meeting_title("Réunion about café"), "café");
    }

    #[tokio::test]
    async fn test_execute_payload() {
        let context = TaskContext {
            request_id: "req".to_string(),
            query: "Schedule a meeting about hiring".to_string(),
            attachments: Arc::from(Vec::new()),
            received_at: Utc.with_ymd_and_hms(2024, 3, 13, 15, 0, 0).unwrap(),
        };
        let output = CalendarAgent::new().execute(&context).await.unwrap();

        assert_eq!(output.summary, "Proposed 3 meeting slots");
        let payload = output.payload.unwrap();
        assert_eq!(payload["title"], "hiring");
        assert_eq!(payload["proposed_slots"][0], "2024-03-14T10:00:00Z");
        assert_eq!(payload["duration_minutes"], 30);
    }
}
