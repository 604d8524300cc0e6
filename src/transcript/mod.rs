//! Chat export reading.
//!
//! This module turns a Telegram JSON export into the two participants'
//! message lists and the date window they span.

pub mod format;
pub mod parser;

pub use parser::{parse_transcript, ParseOptions, SpeakerPolicy};
