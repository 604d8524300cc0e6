//! Per-label aggregation of classifier results.
//!
//! Messages are classified concurrently through a bounded stream and the
//! returned labels are folded into the count map one at a time, so no
//! counter is ever shared between in-flight calls.

use crate::classifier::Classifier;
use crate::config::GeneralConfig;
use crate::error::AggregationError;
use crate::models::{AnalysisKind, CountMap, Label};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{debug, info};

/// Settings for [`aggregate`].
#[derive(Debug, Clone)]
pub struct AggregateOptions {
    /// Maximum classifier calls in flight.
    pub concurrency: usize,
    /// Limit for a single classifier call.
    pub timeout: Duration,
    /// Draw a progress bar on the terminal.
    pub show_progress: bool,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            concurrency: GeneralConfig::default().effective_concurrency(),
            timeout: Duration::from_secs(120),
            show_progress: false,
        }
    }
}

/// Classify every message and count the labels.
///
/// The result always contains every label of `L`, and its total equals
/// `messages.len()`. The first failing call aborts the whole aggregation.
pub async fn aggregate<L: Label>(
    messages: &[String],
    classifier: &dyn Classifier,
    options: &AggregateOptions,
) -> Result<CountMap<L>, AggregationError> {
    let kind = L::KIND;
    let concurrency = options.concurrency.max(1);
    info!(
        "Classifying {} messages ({}, {} at a time)",
        messages.len(),
        kind,
        concurrency
    );

    let progress = progress_bar(messages.len(), kind, options.show_progress);
    let counts = aggregate_with_progress::<L>(messages, classifier, options, &progress).await?;
    debug!("{} counts: {:?}", kind, counts.relabel());

    Ok(counts)
}

/// Like [`aggregate`], but reports to `progress` and clears it once the
/// aggregation ends, successfully or not.
async fn aggregate_with_progress<L: Label>(
    messages: &[String],
    classifier: &dyn Classifier,
    options: &AggregateOptions,
    progress: &ProgressBar,
) -> Result<CountMap<L>, AggregationError> {
    let counts = count_labels::<L>(messages, classifier, options, progress).await;
    progress.finish_and_clear();
    counts
}

async fn count_labels<L: Label>(
    messages: &[String],
    classifier: &dyn Classifier,
    options: &AggregateOptions,
    progress: &ProgressBar,
) -> Result<CountMap<L>, AggregationError> {
    let kind = L::KIND;
    let mut results = stream::iter(messages)
        .map(|text| classify_one(classifier, kind, text, options.timeout))
        .buffer_unordered(options.concurrency.max(1));

    let mut counts = CountMap::<L>::new();
    while let Some(result) = results.next().await {
        let code = result?;
        let label = L::from_code(&code).ok_or(AggregationError::UnknownLabel {
            kind,
            label: code,
        })?;
        counts.increment(label);
        progress.inc(1);
    }

    Ok(counts)
}

async fn classify_one(
    classifier: &dyn Classifier,
    kind: AnalysisKind,
    text: &str,
    timeout: Duration,
) -> Result<String, AggregationError> {
    tokio::time::timeout(timeout, classifier.classify(kind, text))
        .await
        .map_err(|_| AggregationError::Timeout {
            kind,
            seconds: timeout.as_secs(),
        })?
        .map_err(|e| AggregationError::Classifier {
            kind,
            message: format!("{:#}", e),
        })
}

fn progress_bar(len: usize, kind: AnalysisKind, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} {msg:>10} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(kind.to_string());
    pb
}
