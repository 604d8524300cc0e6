//! Two-person transcript parsing.
//!
//! Walks the message list once, in export order, and splits message
//! texts between the first and the second sender.

use crate::error::ParseError;
use crate::models::{Participant, Transcript, TranscriptWindow};
use crate::transcript::format::{ExportDocument, MessageEvent};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// What to do with a sender that is neither of the two participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeakerPolicy {
    /// Reject the transcript.
    #[default]
    Strict,
    /// Attribute the messages to the second participant.
    Merge,
}

/// Options for [`parse_transcript`].
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Index into `chats.list` for full account exports.
    pub chat_index: usize,
    pub speaker_policy: SpeakerPolicy,
}

/// Read and parse an export file.
pub fn parse_transcript(path: &Path, options: &ParseOptions) -> Result<Transcript, ParseError> {
    info!("Reading transcript: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_document(&content, options)
}

/// Parse the JSON content of an export.
pub fn parse_document(content: &str, options: &ParseOptions) -> Result<Transcript, ParseError> {
    let document: ExportDocument = serde_json::from_str(content)?;
    let events = select_messages(document, options.chat_index)?;
    debug!("Export holds {} events", events.len());

    parse_events(&events, options.speaker_policy)
}

/// Pick the message list out of either export shape.
fn select_messages(
    document: ExportDocument,
    chat_index: usize,
) -> Result<Vec<MessageEvent>, ParseError> {
    if let Some(chats) = document.chats {
        let available = chats.list.len();
        let chat = chats
            .list
            .into_iter()
            .nth(chat_index)
            .ok_or(ParseError::ChatNotFound {
                index: chat_index,
                available,
            })?;

        if let Some(ref name) = chat.name {
            debug!("Using chat {:?}", name);
        }
        return Ok(chat.messages);
    }

    Ok(document.messages.unwrap_or_default())
}

/// Split an ordered event list between the two participants.
pub fn parse_events(
    events: &[MessageEvent],
    policy: SpeakerPolicy,
) -> Result<Transcript, ParseError> {
    if events.is_empty() {
        return Err(ParseError::EmptyTranscript);
    }

    let mut first = Participant::default();
    let mut second = Participant::default();
    let mut start: Option<NaiveDate> = None;
    let mut end: Option<NaiveDate> = None;
    let mut processed_events = 0;
    let mut extra_speakers: HashSet<&str> = HashSet::new();

    for (index, event) in events.iter().enumerate() {
        // Calls, pins and other service events
        if event.is_action {
            debug!("Skipping service event #{}", index);
            continue;
        }

        let name = event.from.as_deref().ok_or(ParseError::MissingField {
            index,
            field: "from",
        })?;
        let text = event.text.as_ref().ok_or(ParseError::MissingField {
            index,
            field: "text",
        })?;
        let raw_date = event.date.as_deref().ok_or(ParseError::MissingField {
            index,
            field: "date",
        })?;
        let date = calendar_date(raw_date).ok_or_else(|| ParseError::InvalidDate {
            index,
            value: raw_date.to_string(),
        })?;

        processed_events += 1;

        // Speaker identity
        if first.name.is_none() {
            first.name = Some(name.to_string());
        } else if second.name.is_none() && first.name.as_deref() != Some(name) {
            second.name = Some(name.to_string());
        }
        let is_first = first.name.as_deref() == Some(name);
        let is_second = second.name.as_deref() == Some(name);

        if !is_first && !is_second {
            match policy {
                SpeakerPolicy::Strict => {
                    return Err(ParseError::ExtraSpeaker {
                        index,
                        name: name.to_string(),
                        first: first.display_name().to_string(),
                        second: second.display_name().to_string(),
                    });
                }
                SpeakerPolicy::Merge => {
                    if extra_speakers.insert(name) {
                        warn!(
                            "Third participant {:?} found; merging into {:?}",
                            name,
                            second.display_name()
                        );
                    }
                }
            }
        }

        // Date window, kept ordered even if the export is not
        if let Some(latest) = end {
            if date < latest {
                warn!(
                    "Message #{} is dated {} but follows a message from {}",
                    index, date, latest
                );
            }
        }
        start = Some(start.map_or(date, |first| first.min(date)));
        end = Some(end.map_or(date, |last| last.max(date)));

        let text = text.plain_text();
        if text.is_empty() {
            continue;
        }
        if is_first {
            first.messages.push(text.to_string());
        } else {
            second.messages.push(text.to_string());
        }
    }

    let (Some(start), Some(end)) = (start, end) else {
        return Err(ParseError::EmptyTranscript);
    };

    if second.name.is_none() {
        return Err(ParseError::TooFewSpeakers { found: 1 });
    }

    info!(
        "Parsed {} events: {} ({} messages) and {} ({} messages)",
        processed_events,
        first.display_name(),
        first.messages.len(),
        second.display_name(),
        second.messages.len()
    );

    Ok(Transcript {
        first,
        second,
        window: TranscriptWindow { start, end },
        processed_events,
    })
}

/// Calendar date from the first ten characters of an ISO-8601 timestamp.
fn calendar_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FIXTURE: &str = include_str!("../../fixtures/telegram_export.json");

    fn events(value: serde_json::Value) -> Vec<MessageEvent> {
        serde_json::from_value(value).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_fixture() {
        let transcript = parse_document(FIXTURE, &ParseOptions::default()).unwrap();

        assert_eq!(transcript.first.name.as_deref(), Some("Alice"));
        assert_eq!(transcript.second.name.as_deref(), Some("Bob"));
        assert_eq!(transcript.first.messages.len(), 3);
        assert_eq!(transcript.second.messages.len(), 2);
        assert_eq!(transcript.window.start, date(2023, 1, 1));
        assert_eq!(transcript.window.end, date(2023, 1, 5));
        // Pinned message is skipped entirely
        assert_eq!(transcript.processed_events, 5);
    }

    #[test]
    fn test_parse_is_repeatable() {
        let options = ParseOptions::default();
        let once = parse_document(FIXTURE, &options).unwrap();
        let twice = parse_document(FIXTURE, &options).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_messages_keep_transcript_order() {
        let transcript = parse_document(FIXTURE, &ParseOptions::default()).unwrap();
        assert_eq!(
            transcript.first.messages,
            vec![
                "Happy new year! I love the fireworks here",
                "The train was late again, so annoying",
                "See you on Thursday",
            ]
        );
    }

    #[test]
    fn test_second_participant_is_first_different_sender() {
        let log = events(json!([
            {"from": "Alice", "text": "one", "date": "2023-02-01T10:00:00"},
            {"from": "Alice", "text": "two", "date": "2023-02-01T10:01:00"},
            {"from": "Bob", "text": "three", "date": "2023-02-02T10:00:00"},
        ]));

        let transcript = parse_events(&log, SpeakerPolicy::Strict).unwrap();
        assert_eq!(transcript.first.name.as_deref(), Some("Alice"));
        assert_eq!(transcript.second.name.as_deref(), Some("Bob"));
        assert_eq!(transcript.first.messages, vec!["one", "two"]);
        assert_eq!(transcript.second.messages, vec!["three"]);
    }

    #[test]
    fn test_leading_entity_fragment_is_not_attributed() {
        let log = events(json!([
            {"from": "Alice", "text": [{"type": "bold", "text": "hi"}, "mom"], "date": "2023-03-01T08:00:00"},
            {"from": "Bob", "text": "hello", "date": "2023-03-02T08:00:00"},
        ]));

        let transcript = parse_events(&log, SpeakerPolicy::Strict).unwrap();
        assert_eq!(transcript.first.name.as_deref(), Some("Alice"));
        assert!(transcript.first.messages.is_empty());
        assert_eq!(transcript.second.messages, vec!["hello"]);
        // Still counted for the window and identity
        assert_eq!(transcript.window.start, date(2023, 3, 1));
        assert_eq!(transcript.processed_events, 2);
    }

    #[test]
    fn test_attributed_messages_never_exceed_processed_events() {
        let log = events(json!([
            {"from": "Alice", "text": "a", "date": "2023-01-01T00:00:00"},
            {"from": "Bob", "text": {"type": "link", "text": "x"}, "date": "2023-01-01T00:00:00"},
            {"actor": "Bob", "action": "phone_call", "date": "2023-01-01T00:00:00"},
            {"from": "Bob", "text": "b", "date": "2023-01-02T00:00:00"},
            {"from": "Alice", "text": "", "date": "2023-01-03T00:00:00"},
        ]));

        let transcript = parse_events(&log, SpeakerPolicy::Strict).unwrap();
        let attributed = transcript.first.messages.len() + transcript.second.messages.len();
        assert_eq!(transcript.processed_events, 4);
        assert_eq!(attributed, 2);
        assert_eq!(transcript.window.end, date(2023, 1, 3));
    }

    #[test]
    fn test_out_of_order_dates_keep_window_ordered() {
        let log = events(json!([
            {"from": "Alice", "text": "late", "date": "2023-01-05T09:00:00"},
            {"from": "Bob", "text": "early", "date": "2023-01-01T09:00:00"},
            {"from": "Alice", "text": "middle", "date": "2023-01-03T09:00:00"},
        ]));

        let transcript = parse_events(&log, SpeakerPolicy::Strict).unwrap();
        assert_eq!(transcript.window.start, date(2023, 1, 1));
        assert_eq!(transcript.window.end, date(2023, 1, 5));
        assert!(transcript.window.start <= transcript.window.end);
        assert_eq!(transcript.second.messages, vec!["early"]);
    }

    #[test]
    fn test_third_speaker_rejected_by_default() {
        let log = events(json!([
            {"from": "Alice", "text": "a", "date": "2023-01-01T00:00:00"},
            {"from": "Bob", "text": "b", "date": "2023-01-01T00:00:00"},
            {"from": "Carol", "text": "c", "date": "2023-01-01T00:00:00"},
        ]));

        let err = parse_events(&log, SpeakerPolicy::Strict).unwrap_err();
        match err {
            ParseError::ExtraSpeaker { index, name, .. } => {
                assert_eq!(index, 2);
                assert_eq!(name, "Carol");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_third_speaker_merged_into_second() {
        let log = events(json!([
            {"from": "Alice", "text": "a", "date": "2023-01-01T00:00:00"},
            {"from": "Bob", "text": "b", "date": "2023-01-01T00:00:00"},
            {"from": "Carol", "text": "c", "date": "2023-01-01T00:00:00"},
        ]));

        let transcript = parse_events(&log, SpeakerPolicy::Merge).unwrap();
        assert_eq!(transcript.second.name.as_deref(), Some("Bob"));
        assert_eq!(transcript.second.messages, vec!["b", "c"]);
    }

    #[test]
    fn test_single_speaker_rejected() {
        let log = events(json!([
            {"from": "Alice", "text": "a", "date": "2023-01-01T00:00:00"},
            {"from": "Alice", "text": "b", "date": "2023-01-02T00:00:00"},
        ]));

        assert!(matches!(
            parse_events(&log, SpeakerPolicy::Strict),
            Err(ParseError::TooFewSpeakers { found: 1 })
        ));
    }

    #[test]
    fn test_empty_and_action_only_transcripts_rejected() {
        assert!(matches!(
            parse_events(&[], SpeakerPolicy::Strict),
            Err(ParseError::EmptyTranscript)
        ));

        let log = events(json!([
            {"actor": "Alice", "action": "pin_message", "date": "2023-01-01T00:00:00"},
        ]));
        assert!(matches!(
            parse_events(&log, SpeakerPolicy::Strict),
            Err(ParseError::EmptyTranscript)
        ));
    }

    #[test]
    fn test_missing_fields() {
        let log = events(json!([
            {"from": "Alice", "text": "a", "date": "2023-01-01T00:00:00"},
            {"text": "b", "date": "2023-01-01T00:00:00"},
        ]));
        assert!(matches!(
            parse_events(&log, SpeakerPolicy::Strict),
            Err(ParseError::MissingField { index: 1, field: "from" })
        ));

        let log = events(json!([{"from": "Alice", "date": "2023-01-01T00:00:00"}]));
        assert!(matches!(
            parse_events(&log, SpeakerPolicy::Strict),
            Err(ParseError::MissingField { index: 0, field: "text" })
        ));

        let log = events(json!([{"from": "Alice", "text": "a"}]));
        assert!(matches!(
            parse_events(&log, SpeakerPolicy::Strict),
            Err(ParseError::MissingField { index: 0, field: "date" })
        ));
    }

    #[test]
    fn test_invalid_date() {
        let log = events(json!([{"from": "Alice", "text": "a", "date": "yesterday"}]));
        assert!(matches!(
            parse_events(&log, SpeakerPolicy::Strict),
            Err(ParseError::InvalidDate { index: 0, .. })
        ));
    }

    #[test]
    fn test_single_chat_export() {
        let content = json!({
            "name": "Bob",
            "type": "personal_chat",
            "messages": [
                {"from": "Alice", "text": "hey", "date": "2024-05-01T12:00:00"},
                {"from": "Bob", "text": "hi", "date": "2024-05-03T12:00:00"},
            ]
        })
        .to_string();

        let transcript = parse_document(&content, &ParseOptions::default()).unwrap();
        assert_eq!(transcript.window.start, date(2024, 5, 1));
        assert_eq!(transcript.window.end, date(2024, 5, 3));
    }

    #[test]
    fn test_chat_index_out_of_range() {
        let options = ParseOptions {
            chat_index: 3,
            ..ParseOptions::default()
        };
        assert!(matches!(
            parse_document(FIXTURE, &options),
            Err(ParseError::ChatNotFound {
                index: 3,
                available: 1
            })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            parse_document("{not json", &ParseOptions::default()),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = parse_transcript(Path::new("does/not/exist.json"), &ParseOptions::default())
            .unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }
}
