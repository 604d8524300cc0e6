//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.chatmood.toml` files.

use crate::classifier::ClassifierKind;
use crate::cli::{Args, OutputFormat};
use crate::transcript::SpeakerPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".chatmood.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Classifier settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Transcript parsing settings.
    #[serde(default)]
    pub parser: ParserConfig,

    /// Chart appearance.
    #[serde(default)]
    pub chart: ChartConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory the charts and the report are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Concurrent classifier calls. 0 means one per processing unit.
    #[serde(default)]
    pub concurrency: usize,

    /// Format of the run report.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            concurrency: 0,
            format: OutputFormat::default(),
        }
    }
}

impl GeneralConfig {
    /// Concurrency with the 0 default resolved.
    pub fn effective_concurrency(&self) -> usize {
        if self.concurrency > 0 {
            self.concurrency
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("charts")
}

/// Classifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Which classifier to use.
    #[serde(default)]
    pub classifier: ClassifierKind,

    /// Ollama model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Ollama API URL.
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Temperature for generation.
    #[serde(default)]
    pub temperature: f32,

    /// Limit for a single message classification, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierKind::default(),
            name: default_model(),
            ollama_url: default_ollama_url(),
            temperature: 0.0,
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_model() -> String {
    "llama3.2:latest".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_timeout() -> u64 {
    120
}

/// Transcript parsing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Chat to analyze in a full account export.
    #[serde(default)]
    pub chat_index: usize,

    /// Handling of senders beyond the first two.
    #[serde(default)]
    pub speaker_policy: SpeakerPolicy,
}

/// Chart appearance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_height")]
    pub height_px: u32,

    #[serde(default = "default_title_font")]
    pub title_font_px: u32,

    #[serde(default = "default_subtitle_font")]
    pub subtitle_font_px: u32,

    /// Font size of the category axis title.
    #[serde(default = "default_axis_title_font")]
    pub axis_title_font_px: u32,

    /// Font size of axis labels and the value axis title.
    #[serde(default = "default_label_font")]
    pub label_font_px: u32,

    #[serde(default = "default_small_font")]
    pub legend_font_px: u32,

    #[serde(default = "default_small_font")]
    pub tooltip_font_px: u32,

    /// Highcharts bundle loaded by the chart pages.
    #[serde(default = "default_script_url")]
    pub script_url: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            height_px: default_height(),
            title_font_px: default_title_font(),
            subtitle_font_px: default_subtitle_font(),
            axis_title_font_px: default_axis_title_font(),
            label_font_px: default_label_font(),
            legend_font_px: default_small_font(),
            tooltip_font_px: default_small_font(),
            script_url: default_script_url(),
        }
    }
}

fn default_height() -> u32 {
    1000
}

fn default_title_font() -> u32 {
    40
}

fn default_subtitle_font() -> u32 {
    25
}

fn default_axis_title_font() -> u32 {
    30
}

fn default_label_font() -> u32 {
    25
}

fn default_small_font() -> u32 {
    17
}

fn default_script_url() -> String {
    "https://code.highcharts.com/highcharts.js".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only flags that were given on the command line override the file.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref output_dir) = args.output_dir {
            self.general.output_dir = output_dir.clone();
        }
        if let Some(concurrency) = args.concurrency {
            self.general.concurrency = concurrency;
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }

        if let Some(classifier) = args.classifier {
            self.model.classifier = classifier;
        }
        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref url) = args.ollama_url {
            self.model.ollama_url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }

        if let Some(chat_index) = args.chat_index {
            self.parser.chat_index = chat_index;
        }
        if args.merge_extra_speakers {
            self.parser.speaker_policy = SpeakerPolicy::Merge;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
