//! Markdown and JSON report generation.

use crate::analysis::{normalize, AnalysisResults, Comparison};
use crate::models::{CountMap, Label, Transcript};
use crate::report::{
    AnalysisSection, LabelStat, ParticipantSummary, Report, ReportMetadata,
};
use anyhow::Result;
use chrono::Utc;
use std::path::PathBuf;

/// Facts about the run that are not part of the analysis itself.
#[derive(Debug, Clone)]
pub struct RunInfo {
    pub transcript: PathBuf,
    pub classifier: String,
    pub duration_seconds: f64,
    pub charts: Vec<PathBuf>,
}

/// Assemble the report for a finished analysis.
pub fn build_report(transcript: &Transcript, results: &AnalysisResults, run: &RunInfo) -> Report {
    Report {
        metadata: ReportMetadata {
            transcript: run.transcript.display().to_string(),
            analysis_date: Utc::now(),
            classifier: run.classifier.clone(),
            duration_seconds: run.duration_seconds,
        },
        participants: [
            ParticipantSummary {
                name: transcript.first.display_name().to_string(),
                messages: transcript.first.messages.len(),
            },
            ParticipantSummary {
                name: transcript.second.display_name().to_string(),
                messages: transcript.second.messages.len(),
            },
        ],
        start_date: transcript.window.start,
        end_date: transcript.window.end,
        analyses: vec![
            analysis_section(&results.sentiment),
            analysis_section(&results.emotion),
        ],
        charts: run
            .charts
            .iter()
            .map(|path| path.display().to_string())
            .collect(),
    }
}

fn analysis_section<L: Label>(comparison: &Comparison<L>) -> AnalysisSection {
    AnalysisSection {
        kind: L::KIND.to_string(),
        first: label_stats(&comparison.first),
        second: label_stats(&comparison.second),
    }
}

fn label_stats<L: Label>(counts: &CountMap<L>) -> Vec<LabelStat> {
    let frequencies = normalize(counts).ok();

    L::ALL
        .iter()
        .map(|&label| LabelStat {
            label: label.display_name().to_string(),
            count: counts.get(label),
            frequency: frequencies.as_ref().map(|f| f.get(label)),
        })
        .collect()
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# ChatMood Report\n\n");
    output.push_str(&generate_metadata_section(report));

    for section in &report.analyses {
        output.push_str(&generate_analysis_section(section, &report.participants));
    }

    output.push_str(&generate_charts_section(&report.charts));

    output
}

fn generate_metadata_section(report: &Report) -> String {
    let mut section = String::new();
    let [first, second] = &report.participants;

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Transcript:** {}\n", report.metadata.transcript));
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        report.metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Classifier:** `{}`\n", report.metadata.classifier));
    section.push_str(&format!(
        "- **Participants:** {} ({} messages), {} ({} messages)\n",
        first.name, first.messages, second.name, second.messages
    ));
    section.push_str(&format!(
        "- **Period:** {} to {}\n",
        report.start_date.format("%Y-%m-%d"),
        report.end_date.format("%Y-%m-%d")
    ));
    section.push_str(&format!(
        "- **Analysis Duration:** {:.1}s\n",
        report.metadata.duration_seconds
    ));
    section.push('\n');

    section
}

fn generate_analysis_section(
    analysis: &AnalysisSection,
    participants: &[ParticipantSummary; 2],
) -> String {
    let mut section = String::new();

    let mut title = analysis.kind.clone();
    if let Some(first) = title.get_mut(..1) {
        first.make_ascii_uppercase();
    }
    section.push_str(&format!("## {}\n\n", title));
    section.push_str(&format!(
        "| Label | {} | {} |\n",
        participants[0].name, participants[1].name
    ));
    section.push_str("|:---|:---:|:---:|\n");

    for (a, b) in analysis.first.iter().zip(&analysis.second) {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            a.label,
            format_stat(a),
            format_stat(b)
        ));
    }
    section.push('\n');

    section
}

fn format_stat(stat: &LabelStat) -> String {
    match stat.frequency {
        Some(frequency) => format!("{} ({:.2}%)", stat.count, frequency * 100.0),
        None => stat.count.to_string(),
    }
}

fn generate_charts_section(charts: &[String]) -> String {
    if charts.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Charts\n\n");
    for chart in charts {
        section.push_str(&format!("- `{}`\n", chart));
    }
    section.push('\n');

    section
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Emotion, Participant, Sentiment, TranscriptWindow};
    use chrono::NaiveDate;

    fn create_test_transcript() -> Transcript {
        Transcript {
            first: Participant {
                name: Some("Alice".to_string()),
                messages: vec!["great".to_string(), "ok".to_string()],
            },
            second: Participant {
                name: Some("Bob".to_string()),
                messages: vec![],
            },
            window: TranscriptWindow {
                start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2023, 1, 5).unwrap(),
            },
            processed_events: 3,
        }
    }

    fn create_test_results() -> AnalysisResults {
        let mut sentiment = CountMap::<Sentiment>::new();
        sentiment.increment(Sentiment::Positive);
        sentiment.increment(Sentiment::Neutral);
        let mut emotion = CountMap::<Emotion>::new();
        emotion.increment(Emotion::Joy);
        emotion.increment(Emotion::Others);

        AnalysisResults {
            sentiment: Comparison {
                first: sentiment,
                second: CountMap::new(),
            },
            emotion: Comparison {
                first: emotion,
                second: CountMap::new(),
            },
        }
    }

    fn create_test_report() -> Report {
        let run = RunInfo {
            transcript: PathBuf::from("result.json"),
            classifier: "lexicon".to_string(),
            duration_seconds: 1.5,
            charts: vec![PathBuf::from("charts/absolute_sentiment.html")],
        };
        build_report(&create_test_transcript(), &create_test_results(), &run)
    }

    #[test]
    fn test_build_report() {
        let report = create_test_report();

        assert_eq!(report.participants[0].name, "Alice");
        assert_eq!(report.participants[0].messages, 2);
        assert_eq!(report.analyses.len(), 2);
        assert_eq!(report.analyses[0].kind, "sentiment");
        assert_eq!(report.analyses[0].first.len(), 3);
        assert_eq!(report.analyses[1].first.len(), 7);
        assert_eq!(report.analyses[0].first[0].frequency, Some(0.5));
        // Bob has nothing to normalize
        assert_eq!(report.analyses[0].second[0].frequency, None);
    }

    #[test]
    fn test_generate_markdown_report() {
        let markdown = generate_markdown_report(&create_test_report());

        assert!(markdown.contains("# ChatMood Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Sentiment"));
        assert!(markdown.contains("## Emotion"));
        assert!(markdown.contains("| Label | Alice | Bob |"));
        assert!(markdown.contains("| Positive | 1 (50.00%) | 0 |"));
        assert!(markdown.contains("2023-01-01 to 2023-01-05"));
        assert!(markdown.contains("`charts/absolute_sentiment.html`"));
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&create_test_report()).unwrap();

        assert!(json.contains("\"participants\""));
        assert!(json.contains("\"analyses\""));
        assert!(json.contains("\"start_date\": \"2023-01-01\""));
    }
}
