//! Comparison chart rendering.
//!
//! Charts are written as standalone HTML pages that load Highcharts and
//! hand it an options tree built here.

pub mod highcharts;

use crate::config::ChartConfig;
use crate::error::RenderError;
use crate::models::{AnalysisKind, CountMap, FrequencyMap, Label, TranscriptWindow};
use std::path::{Path, PathBuf};
use tracing::info;

/// How the values of a chart are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    /// Message counts.
    Absolute,
    /// Shares of the participant's messages.
    Relative,
}

/// One participant's bars.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    /// Participant name, shown in the legend.
    pub name: String,
    /// `(category, value)` in category order.
    pub points: Vec<(String, f64)>,
    /// Messages behind the values, reported in the subtitle.
    pub total_messages: usize,
}

impl ChartSeries {
    pub fn absolute<L: Label>(name: &str, counts: &CountMap<L>) -> Self {
        Self {
            name: name.to_string(),
            points: counts
                .relabel()
                .into_iter()
                .map(|(label, count)| (label.to_string(), count as f64))
                .collect(),
            total_messages: counts.total(),
        }
    }

    pub fn relative<L: Label>(
        name: &str,
        frequencies: &FrequencyMap<L>,
        total_messages: usize,
    ) -> Self {
        Self {
            name: name.to_string(),
            points: frequencies
                .relabel()
                .into_iter()
                .map(|(label, value)| (label.to_string(), value))
                .collect(),
            total_messages,
        }
    }
}

/// Presentation settings of one chart.
#[derive(Debug, Clone)]
pub struct ChartMeta {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Suffix shown after values in tooltips.
    pub unit: String,
    /// File name without extension.
    pub output_name: String,
    pub scale: Scale,
}

impl ChartMeta {
    /// Titles, axis labels and file name of one of the four standard
    /// charts (`absolute_sentiment`, `relative_emotions`, ...).
    pub fn for_analysis(kind: AnalysisKind, scale: Scale) -> Self {
        let (title, x_label, topic) = match kind {
            AnalysisKind::Sentiment => (
                "Sentiment analysis from Telegram messages",
                "Sentiment",
                "sentiment",
            ),
            AnalysisKind::Emotion => (
                "Emotions analysis from Telegram messages",
                "Emotions",
                "emotions",
            ),
        };
        let (y_label, unit, prefix) = match scale {
            Scale::Absolute => ("Messages", "messages", "absolute"),
            Scale::Relative => ("Percentage", "%", "relative"),
        };

        Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            unit: unit.to_string(),
            output_name: format!("{}_{}", prefix, topic),
            scale,
        }
    }
}

/// Writes comparison charts into one directory.
pub struct ChartEmitter {
    output_dir: PathBuf,
    style: ChartConfig,
}

impl ChartEmitter {
    pub fn new(output_dir: PathBuf, style: ChartConfig) -> Self {
        Self { output_dir, style }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render both series side by side and save the chart.
    ///
    /// Returns the path of the written file.
    pub fn emit(
        &self,
        first: &ChartSeries,
        second: &ChartSeries,
        meta: &ChartMeta,
        window: &TranscriptWindow,
    ) -> Result<PathBuf, RenderError> {
        let options = highcharts::chart_options(first, second, meta, window, &self.style);
        let page = highcharts::render_page(&meta.title, &options, &self.style.script_url)?;

        std::fs::create_dir_all(&self.output_dir).map_err(|source| RenderError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let path = self.output_dir.join(format!("{}.html", meta.output_name));
        std::fs::write(&path, page).map_err(|source| RenderError::Io {
            path: path.clone(),
            source,
        })?;

        info!("Saved chart {}", path.display());
        Ok(path)
    }
}
