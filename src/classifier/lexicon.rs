//! Rule-based classifier.
//!
//! Scores words against small built-in lexicons. It needs no model and
//! gives deterministic results, which makes it useful offline.

use crate::classifier::Classifier;
use crate::models::{AnalysisKind, Emotion, Label, Sentiment};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Score above which a message counts as positive (and below the
/// negated value as negative).
const POLARITY_THRESHOLD: f64 = 0.25;

/// How many following words a negation applies to.
const NEGATION_SCOPE: usize = 2;

/// Word-list classifier for both sentiment and emotion.
pub struct LexiconClassifier {
    /// Word to polarity score mapping.
    polarity: HashMap<&'static str, f64>,
    /// Words that flip the polarity of what follows.
    negations: Vec<&'static str>,
    /// Word to emotion mapping.
    emotions: HashMap<&'static str, Emotion>,
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconClassifier {
    pub fn new() -> Self {
        let positive = [
            ("good", 0.5),
            ("great", 0.7),
            ("awesome", 0.8),
            ("amazing", 0.8),
            ("love", 0.8),
            ("like", 0.4),
            ("happy", 0.7),
            ("glad", 0.6),
            ("nice", 0.5),
            ("thanks", 0.5),
            ("thank", 0.5),
            ("cool", 0.4),
            ("fun", 0.5),
            ("beautiful", 0.7),
            ("perfect", 0.8),
            ("wonderful", 0.8),
            ("excited", 0.6),
            ("congrats", 0.7),
            ("yay", 0.6),
            ("haha", 0.4),
            ("lol", 0.3),
        ];

        let negative = [
            ("bad", -0.6),
            ("terrible", -0.8),
            ("awful", -0.8),
            ("hate", -0.8),
            ("sad", -0.6),
            ("angry", -0.7),
            ("annoying", -0.6),
            ("annoyed", -0.6),
            ("late", -0.3),
            ("sorry", -0.3),
            ("worst", -0.9),
            ("sick", -0.5),
            ("tired", -0.4),
            ("scared", -0.6),
            ("afraid", -0.6),
            ("worried", -0.5),
            ("disgusting", -0.8),
            ("boring", -0.4),
            ("cry", -0.6),
            ("ugh", -0.5),
        ];

        let emotions = [
            (Emotion::Anger, &["angry", "mad", "furious", "annoying", "annoyed", "hate", "pissed"][..]),
            (Emotion::Disgust, &["disgusting", "gross", "eww", "yuck", "nasty"][..]),
            (Emotion::Fear, &["scared", "afraid", "worried", "nervous", "terrified", "anxious"][..]),
            (
                Emotion::Joy,
                &["happy", "love", "glad", "great", "awesome", "haha", "yay", "thanks", "fun"][..],
            ),
            (Emotion::Sadness, &["sad", "cry", "miss", "lonely", "unfortunately", "sorry"][..]),
            (Emotion::Surprise, &["wow", "omg", "whoa", "unbelievable", "unexpected", "really"][..]),
        ];

        Self {
            polarity: positive.into_iter().chain(negative).collect(),
            negations: vec!["not", "no", "never", "don't", "dont", "isn't", "wasn't", "can't"],
            emotions: emotions
                .into_iter()
                .flat_map(|(emotion, words)| words.iter().map(move |&w| (w, emotion)))
                .collect(),
        }
    }

    /// Summed polarity of a text, with negation handling.
    pub fn polarity_score(&self, text: &str) -> f64 {
        let mut score = 0.0;
        let mut negated_for = 0;

        for word in tokenize(text) {
            if self.negations.contains(&word.as_str()) {
                negated_for = NEGATION_SCOPE;
                continue;
            }

            if let Some(&value) = self.polarity.get(word.as_str()) {
                score += if negated_for > 0 { -value } else { value };
            }
            negated_for = negated_for.saturating_sub(1);
        }

        score
    }

    fn sentiment(&self, text: &str) -> Sentiment {
        let score = self.polarity_score(text);
        if score > POLARITY_THRESHOLD {
            Sentiment::Positive
        } else if score < -POLARITY_THRESHOLD {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    fn emotion(&self, text: &str) -> Emotion {
        let mut hits: HashMap<Emotion, usize> = HashMap::new();
        for word in tokenize(text) {
            if let Some(&emotion) = self.emotions.get(word.as_str()) {
                *hits.entry(emotion).or_default() += 1;
            }
        }

        // Ties go to the emotion declared first
        Emotion::ALL
            .iter()
            .copied()
            .filter_map(|emotion| hits.get(&emotion).map(|&count| (emotion, count)))
            .fold(None, |best: Option<(Emotion, usize)>, (emotion, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((emotion, count)),
            })
            .map(|(emotion, _)| emotion)
            .unwrap_or(Emotion::Others)
    }
}

#[async_trait]
impl Classifier for LexiconClassifier {
    fn name(&self) -> String {
        "lexicon".to_string()
    }

    async fn classify(&self, kind: AnalysisKind, text: &str) -> Result<String> {
        let code = match kind {
            AnalysisKind::Sentiment => self.sentiment(text).code(),
            AnalysisKind::Emotion => self.emotion(text).code(),
        };
        Ok(code.to_string())
    }
}

/// Lowercase words, keeping apostrophes inside words.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|word| word.trim_matches('\'').to_lowercase())
        .filter(|word| !word.is_empty())
}
