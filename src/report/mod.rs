//! Run report generation.
//!
//! Summarizes a finished run in Markdown or JSON next to the charts.

pub mod generator;

pub use generator::{build_report, generate_json_report, generate_markdown_report, RunInfo};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Metadata about the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Transcript file that was analyzed.
    pub transcript: String,
    /// Date and time of the analysis.
    pub analysis_date: DateTime<Utc>,
    /// Classifier used for both analyses.
    pub classifier: String,
    /// Duration of the run in seconds.
    pub duration_seconds: f64,
}

/// One participant's share of the transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantSummary {
    pub name: String,
    pub messages: usize,
}

/// Count and share of one label for one participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelStat {
    pub label: String,
    pub count: usize,
    /// Missing when the participant had no classified messages.
    pub frequency: Option<f64>,
}

/// Side-by-side label statistics of one analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSection {
    pub kind: String,
    pub first: Vec<LabelStat>,
    pub second: Vec<LabelStat>,
}

/// The complete run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub participants: [ParticipantSummary; 2],
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub analyses: Vec<AnalysisSection>,
    /// Chart files written during the run.
    pub charts: Vec<String>,
}
