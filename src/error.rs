//! Error types for each stage of the analysis pipeline.
//!
//! Every stage fails with its own error enum so the entry point can map
//! the failure class to a distinct exit code.

use crate::models::AnalysisKind;
use std::path::PathBuf;
use thiserror::Error;

/// The transcript could not be read or does not describe a two-person chat.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read transcript {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("transcript is not a valid chat export: {0}")]
    Json(#[from] serde_json::Error),

    #[error("export contains no chat at index {index} ({available} available)")]
    ChatNotFound { index: usize, available: usize },

    #[error("transcript contains no messages")]
    EmptyTranscript,

    #[error("message #{index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("message #{index} has an invalid date: {value:?}")]
    InvalidDate { index: usize, value: String },

    #[error("expected two participants, found {found}")]
    TooFewSpeakers { found: usize },

    #[error("message #{index} comes from a third participant {name:?} (already have {first:?} and {second:?})")]
    ExtraSpeaker {
        index: usize,
        name: String,
        first: String,
        second: String,
    },
}

/// Classification of a participant's messages failed.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("classifier returned {label:?}, which is not a {kind} label")]
    UnknownLabel { kind: AnalysisKind, label: String },

    #[error("{kind} classification timed out after {seconds}s")]
    Timeout { kind: AnalysisKind, seconds: u64 },

    #[error("{kind} classifier failed: {message}")]
    Classifier { kind: AnalysisKind, message: String },
}

/// A count map could not be turned into relative frequencies.
#[derive(Debug, Error)]
pub enum NormalizationError {
    #[error("cannot normalize {kind} counts: no messages were classified")]
    EmptyCounts { kind: AnalysisKind },
}

/// A chart artifact could not be produced.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write chart {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize chart options: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Exit code for a failed run.
///
/// 1 is used for anything that is not one of the pipeline errors
/// (bad CLI arguments, config files, report writing).
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<ParseError>().is_some() {
        2
    } else if err.downcast_ref::<AggregationError>().is_some() {
        3
    } else if err.downcast_ref::<NormalizationError>().is_some() {
        4
    } else if err.downcast_ref::<RenderError>().is_some() {
        5
    } else {
        1
    }
}
