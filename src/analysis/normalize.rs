//! Conversion from absolute counts to relative frequencies.

use crate::error::NormalizationError;
use crate::models::{CountMap, FrequencyMap, Label};
use tracing::debug;

/// Decimal places kept for each frequency.
const PRECISION: i32 = 4;

/// Share of each label in the total.
///
/// Fails on an all-zero map instead of dividing by zero. Each value is
/// rounded on its own, so the sum can be off from 1 by a few units in
/// the last decimal place.
pub fn normalize<L: Label>(counts: &CountMap<L>) -> Result<FrequencyMap<L>, NormalizationError> {
    let total = counts.total();
    if total == 0 {
        return Err(NormalizationError::EmptyCounts { kind: L::KIND });
    }

    let frequencies = counts
        .iter()
        .map(|(label, count)| (label, round(count as f64 / total as f64)))
        .collect();

    let frequencies = FrequencyMap::from_frequencies(frequencies);
    debug_assert_eq!(frequencies.len(), counts.len());
    debug!(
        "{} frequencies over {} messages sum to {:.4}",
        L::KIND,
        total,
        frequencies.sum()
    );

    Ok(frequencies)
}

fn round(value: f64) -> f64 {
    let scale = 10f64.powi(PRECISION);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisKind, Emotion, Sentiment};

    fn sentiment_counts(pos: usize, neu: usize, neg: usize) -> CountMap<Sentiment> {
        let mut counts = CountMap::new();
        for _ in 0..pos {
            counts.increment(Sentiment::Positive);
        }
        for _ in 0..neu {
            counts.increment(Sentiment::Neutral);
        }
        for _ in 0..neg {
            counts.increment(Sentiment::Negative);
        }
        counts
    }

    #[test]
    fn test_single_label() {
        let frequencies = normalize(&sentiment_counts(10, 0, 0)).unwrap();
        assert_eq!(frequencies.get(Sentiment::Positive), 1.0);
        assert_eq!(frequencies.get(Sentiment::Neutral), 0.0);
        assert_eq!(frequencies.get(Sentiment::Negative), 0.0);
    }

    #[test]
    fn test_values_rounded_to_four_places() {
        let frequencies = normalize(&sentiment_counts(1, 1, 1)).unwrap();
        for (_, value) in frequencies.iter() {
            assert_eq!(value, 0.3333);
        }
        // Independent rounding: the sum is close to, not exactly, one
        assert!((frequencies.sum() - 0.9999).abs() < 1e-9);
    }

    #[test]
    fn test_values_in_unit_interval() {
        let mut counts = CountMap::<Emotion>::new();
        for (i, label) in Emotion::ALL.iter().enumerate() {
            for _ in 0..(i * 3 + 1) {
                counts.increment(*label);
            }
        }

        let frequencies = normalize(&counts).unwrap();
        assert_eq!(frequencies.len(), Emotion::ALL.len());
        assert!(frequencies.iter().all(|(_, v)| (0.0..=1.0).contains(&v)));
        assert!((frequencies.sum() - 1.0).abs() <= 0.0005 * Emotion::ALL.len() as f64);
    }

    #[test]
    fn test_all_zero_is_an_error() {
        let err = normalize(&CountMap::<Emotion>::new()).unwrap_err();
        assert!(matches!(
            err,
            NormalizationError::EmptyCounts {
                kind: AnalysisKind::Emotion
            }
        ));
    }

    #[test]
    fn test_relabeled_frequencies() {
        let frequencies = normalize(&sentiment_counts(1, 0, 3)).unwrap();
        assert_eq!(
            frequencies.relabel(),
            vec![("Positive", 0.25), ("Neutral", 0.0), ("Negative", 0.75)]
        );
    }
}
