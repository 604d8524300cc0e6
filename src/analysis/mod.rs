//! Sentiment and emotion analysis of both participants.
//!
//! Runs the aggregator once per participant and per analysis, in a fixed
//! order, and pairs the resulting count maps up for charting.

pub mod aggregator;
pub mod normalize;

pub use aggregator::{aggregate, AggregateOptions};
pub use normalize::normalize;

use crate::classifier::Classifier;
use crate::error::{AggregationError, NormalizationError};
use crate::models::{CountMap, Emotion, FrequencyMap, Label, Sentiment, Transcript};
use tracing::info;

/// Count maps of both participants for one analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison<L: Label> {
    pub first: CountMap<L>,
    pub second: CountMap<L>,
}

impl<L: Label> Comparison<L> {
    /// Relative frequencies of both sides.
    pub fn normalize(&self) -> Result<(FrequencyMap<L>, FrequencyMap<L>), NormalizationError> {
        Ok((normalize(&self.first)?, normalize(&self.second)?))
    }
}

/// Everything the charts are drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResults {
    pub sentiment: Comparison<Sentiment>,
    pub emotion: Comparison<Emotion>,
}

/// Classify both participants' messages for sentiment, then emotion.
pub async fn analyze_transcript(
    transcript: &Transcript,
    classifier: &dyn Classifier,
    options: &AggregateOptions,
) -> Result<AnalysisResults, AggregationError> {
    info!("Sentiment analysis");
    let sentiment = Comparison {
        first: aggregate(&transcript.first.messages, classifier, options).await?,
        second: aggregate(&transcript.second.messages, classifier, options).await?,
    };

    info!("Emotion analysis");
    let emotion = Comparison {
        first: aggregate(&transcript.first.messages, classifier, options).await?,
        second: aggregate(&transcript.second.messages, classifier, options).await?,
    };

    Ok(AnalysisResults { sentiment, emotion })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LexiconClassifier;
    use crate::transcript::{parser::parse_document, ParseOptions};

    const FIXTURE: &str = include_str!("../../fixtures/telegram_export.json");

    #[tokio::test]
    async fn test_analyze_fixture_with_lexicon() {
        let transcript = parse_document(FIXTURE, &ParseOptions::default()).unwrap();
        let results = analyze_transcript(
            &transcript,
            &LexiconClassifier::new(),
            &AggregateOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(results.sentiment.first.total(), 3);
        assert_eq!(results.sentiment.second.total(), 2);
        assert_eq!(results.emotion.first.total(), 3);
        assert_eq!(results.emotion.second.total(), 2);

        assert_eq!(results.sentiment.first.get(Sentiment::Positive), 1);
        assert_eq!(results.sentiment.first.get(Sentiment::Negative), 1);
        assert_eq!(results.sentiment.first.get(Sentiment::Neutral), 1);
        assert_eq!(results.emotion.second.get(Emotion::Fear), 1);
        assert_eq!(results.emotion.second.get(Emotion::Joy), 1);
    }

    #[tokio::test]
    async fn test_normalize_comparison_with_silent_side_fails() {
        let content = serde_json::json!({
            "messages": [
                {"from": "Alice", "text": "great", "date": "2023-01-01T00:00:00"},
                {"from": "Bob", "text": [{"type": "link", "text": "https://t.me"}], "date": "2023-01-02T00:00:00"},
            ]
        })
        .to_string();
        let transcript = parse_document(&content, &ParseOptions::default()).unwrap();

        let results = analyze_transcript(
            &transcript,
            &LexiconClassifier::new(),
            &AggregateOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(results.sentiment.second.total(), 0);
        assert!(results.sentiment.normalize().is_err());
    }
}
