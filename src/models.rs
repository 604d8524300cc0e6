//! Data models for the chat analyzer.
//!
//! This module contains the core data structures shared by the parser,
//! the aggregator and the chart emitter: participants, the transcript
//! window, the two closed label sets and the per-label count maps.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

/// Which classifier a count map was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Sentiment,
    Emotion,
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisKind::Sentiment => write!(f, "sentiment"),
            AnalysisKind::Emotion => write!(f, "emotion"),
        }
    }
}

impl AnalysisKind {
    /// `(code, display name)` pairs of this kind's label set.
    pub fn labels(&self) -> Vec<(&'static str, &'static str)> {
        fn pairs<L: Label>() -> Vec<(&'static str, &'static str)> {
            L::ALL.iter().map(|l| (l.code(), l.display_name())).collect()
        }

        match self {
            AnalysisKind::Sentiment => pairs::<Sentiment>(),
            AnalysisKind::Emotion => pairs::<Emotion>(),
        }
    }

    /// Machine label codes a classifier may return for this kind.
    pub fn codes(&self) -> Vec<&'static str> {
        self.labels().into_iter().map(|(code, _)| code).collect()
    }
}

/// A member of a fixed, closed label set.
///
/// `Ord` follows declaration order, which is also the category order
/// used in charts and reports.
pub trait Label:
    Copy + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// Every label in the set, in presentation order.
    const ALL: &'static [Self];
    /// The analysis this label set belongs to.
    const KIND: AnalysisKind;

    /// Machine code returned by the classifier.
    fn code(self) -> &'static str;

    /// Human-readable name used in charts and reports.
    fn display_name(self) -> &'static str;

    /// Resolve a classifier code. Matching is exact.
    fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|label| label.code() == code)
    }
}

/// Sentiment polarity of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Label for Sentiment {
    const ALL: &'static [Self] = &[Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];
    const KIND: AnalysisKind = AnalysisKind::Sentiment;

    fn code(self) -> &'static str {
        match self {
            Sentiment::Positive => "POS",
            Sentiment::Neutral => "NEU",
            Sentiment::Negative => "NEG",
        }
    }

    fn display_name(self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Dominant emotion of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Emotion {
    Anger,
    Disgust,
    Fear,
    Joy,
    Others,
    Sadness,
    Surprise,
}

impl Label for Emotion {
    const ALL: &'static [Self] = &[
        Emotion::Anger,
        Emotion::Disgust,
        Emotion::Fear,
        Emotion::Joy,
        Emotion::Others,
        Emotion::Sadness,
        Emotion::Surprise,
    ];
    const KIND: AnalysisKind = AnalysisKind::Emotion;

    fn code(self) -> &'static str {
        match self {
            Emotion::Anger => "anger",
            Emotion::Disgust => "disgust",
            Emotion::Fear => "fear",
            Emotion::Joy => "joy",
            Emotion::Others => "others",
            Emotion::Sadness => "sadness",
            Emotion::Surprise => "surprise",
        }
    }

    fn display_name(self) -> &'static str {
        match self {
            Emotion::Anger => "Anger",
            Emotion::Disgust => "Disgust",
            Emotion::Fear => "Fear",
            Emotion::Joy => "Joy",
            Emotion::Others => "Others",
            Emotion::Sadness => "Sadness",
            Emotion::Surprise => "Surprise",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One side of the conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Participant {
    /// Sender name, set from the first message attributed to this side.
    pub name: Option<String>,
    /// Non-empty message texts in transcript order.
    pub messages: Vec<String>,
}

impl Participant {
    /// Name for display, with a placeholder for a side that never spoke.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }
}

/// Calendar date range spanned by the analyzed messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscriptWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for TranscriptWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} and {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// Result of parsing a chat export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    /// First sender seen.
    pub first: Participant,
    /// Second distinct sender seen.
    pub second: Participant,
    pub window: TranscriptWindow,
    /// Number of events that were not skipped as service actions.
    pub processed_events: usize,
}

/// Per-label tally for one participant and one analysis.
///
/// Always holds every label of `L`, starting at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountMap<L: Label> {
    counts: BTreeMap<L, usize>,
}

impl<L: Label> Default for CountMap<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Label> CountMap<L> {
    /// Creates a map with every label set to zero.
    pub fn new() -> Self {
        Self {
            counts: L::ALL.iter().map(|&label| (label, 0)).collect(),
        }
    }

    pub fn increment(&mut self, label: L) {
        *self.counts.entry(label).or_insert(0) += 1;
    }

    pub fn get(&self, label: L) -> usize {
        self.counts.get(&label).copied().unwrap_or(0)
    }

    /// Number of classified messages.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (L, usize)> + '_ {
        self.counts.iter().map(|(&label, &count)| (label, count))
    }

    /// Counts keyed by presentation name, in label order.
    pub fn relabel(&self) -> Vec<(&'static str, usize)> {
        self.iter()
            .map(|(label, count)| (label.display_name(), count))
            .collect()
    }
}

/// Per-label share of a participant's classified messages.
///
/// Values are rounded to four decimals independently, so they may not
/// add up to exactly 1.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyMap<L: Label> {
    frequencies: BTreeMap<L, f64>,
}

impl<L: Label> FrequencyMap<L> {
    pub(crate) fn from_frequencies(frequencies: BTreeMap<L, f64>) -> Self {
        Self { frequencies }
    }

    pub fn get(&self, label: L) -> f64 {
        self.frequencies.get(&label).copied().unwrap_or(0.0)
    }

    pub fn sum(&self) -> f64 {
        self.frequencies.values().sum()
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (L, f64)> + '_ {
        self.frequencies.iter().map(|(&label, &value)| (label, value))
    }

    /// Frequencies keyed by presentation name, in label order.
    pub fn relabel(&self) -> Vec<(&'static str, f64)> {
        self.iter()
            .map(|(label, value)| (label.display_name(), value))
            .collect()
    }
}
