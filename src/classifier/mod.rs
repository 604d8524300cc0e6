//! Message classifiers.
//!
//! A classifier maps one message to one raw label code of the requested
//! analysis. Validating that the code belongs to the label set is the
//! aggregator's job, so implementations report whatever they produced.

pub mod lexicon;
pub mod ollama;

use crate::config::ModelConfig;
use crate::models::AnalysisKind;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use lexicon::LexiconClassifier;
pub use ollama::{OllamaClassifier, OllamaConfig};

/// Text to label-code function.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> String;

    /// Classify one message.
    async fn classify(&self, kind: AnalysisKind, text: &str) -> Result<String>;
}

/// Available classifier backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Local Ollama model (default)
    #[default]
    Ollama,
    /// Built-in word lists, no model needed
    Lexicon,
}

/// Build the classifier selected in the model settings.
pub fn build_classifier(config: &ModelConfig) -> Result<Arc<dyn Classifier>> {
    match config.classifier {
        ClassifierKind::Ollama => {
            let classifier = OllamaClassifier::new(OllamaConfig {
                ollama_url: config.ollama_url.clone(),
                model_name: config.name.clone(),
                temperature: config.temperature,
                timeout_seconds: config.timeout_seconds,
            })?;
            Ok(Arc::new(classifier))
        }
        ClassifierKind::Lexicon => Ok(Arc::new(LexiconClassifier::new())),
    }
}
