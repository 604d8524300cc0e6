//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::classifier::ClassifierKind;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// ChatMood - compare how both sides of a Telegram chat feel
///
/// Classifies every message of a two-person Telegram export by
/// sentiment and emotion and draws comparison bar charts, in absolute
/// numbers and as shares of each person's messages.
///
/// Examples:
///   chatmood result.json
///   chatmood result.json --model llama3.2:latest --output-dir charts
///   chatmood result.json --classifier lexicon
///   chatmood result.json --dry-run
///   chatmood --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Telegram JSON export to analyze
    #[arg(value_name = "TRANSCRIPT", required_unless_present = "init_config")]
    pub transcript: Option<PathBuf>,

    /// Directory for the charts and the run report
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Classifier backend
    #[arg(long, value_name = "KIND")]
    pub classifier: Option<ClassifierKind>,

    /// Ollama model used for classification
    ///
    /// Can also be set via CHATMOOD_MODEL env var or .chatmood.toml config.
    #[arg(short, long, env = "CHATMOOD_MODEL")]
    pub model: Option<String>,

    /// Ollama API endpoint URL
    #[arg(long, env = "OLLAMA_URL")]
    pub ollama_url: Option<String>,

    /// Timeout for a single message classification, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Number of concurrent classifications
    ///
    /// Defaults to the number of available processing units.
    #[arg(long, value_name = "NUM")]
    pub concurrency: Option<usize>,

    /// Chat to analyze when the export contains several
    #[arg(long, value_name = "INDEX")]
    pub chat_index: Option<usize>,

    /// Attribute messages of any further sender to the second participant
    /// instead of rejecting the transcript
    #[arg(long)]
    pub merge_extra_speakers: bool,

    /// Run report format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .chatmood.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Parse the transcript and print what would be analyzed
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .chatmood.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the run report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        match self.transcript {
            Some(ref path) if !path.is_file() => {
                return Err(format!("Transcript file does not exist: {}", path.display()));
            }
            None => return Err("A transcript file is required".to_string()),
            _ => {}
        }

        if let Some(ref url) = self.ollama_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Ollama URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.concurrency == Some(0) {
            return Err("Concurrency must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
