//! ChatMood - sentiment and emotion comparison of two-person chats
//!
//! A CLI tool that reads a Telegram JSON export, classifies every
//! message of both participants and renders comparison bar charts.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Invalid arguments, configuration or report I/O
//!   2 - Transcript could not be parsed
//!   3 - Classification failed
//!   4 - A participant has no classified messages to normalize
//!   5 - A chart could not be written
//!
//! Charts are written one after another, so a failing run may leave the
//! absolute charts behind without the relative ones.

mod analysis;
mod chart;
mod classifier;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod transcript;

use analysis::{AggregateOptions, AnalysisResults};
use anyhow::{Context, Result};
use chart::{ChartEmitter, ChartMeta, ChartSeries, Scale};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use models::{AnalysisKind, Transcript};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use transcript::ParseOptions;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("ChatMood v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run_analysis(args).await {
        error!("Analysis failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(error::exit_code(&e));
    }

    Ok(())
}

/// Handle --init-config: generate a default .chatmood.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE_NAME);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the classifier, output directory and chart style.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete pipeline: parse, classify, chart, report.
async fn run_analysis(args: Args) -> Result<()> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let transcript_path = args
        .transcript
        .clone()
        .context("A transcript file is required")?;

    // Step 1: Parse the transcript
    println!("📥 Reading transcript: {}", transcript_path.display());
    let parse_options = ParseOptions {
        chat_index: config.parser.chat_index,
        speaker_policy: config.parser.speaker_policy,
    };
    let transcript = transcript::parse_transcript(&transcript_path, &parse_options)
        .with_context(|| format!("Failed to parse {}", transcript_path.display()))?;

    print_transcript_summary(&transcript);

    // Handle --dry-run: stop before any classification
    if args.dry_run {
        println!("\n✅ Dry run complete. No messages were classified.");
        return Ok(());
    }

    // Step 2: Classify
    let classifier = classifier::build_classifier(&config.model)?;
    let options = AggregateOptions {
        concurrency: config.general.effective_concurrency(),
        timeout: Duration::from_secs(config.model.timeout_seconds),
        show_progress: !args.quiet,
    };

    println!("\n🤖 Classifying messages...");
    println!("   Classifier: {}", classifier.name());
    println!("   Concurrency: {}", options.concurrency);
    println!("   Timeout: {}s per message", config.model.timeout_seconds);

    let results =
        analysis::analyze_transcript(&transcript, classifier.as_ref(), &options).await?;

    // Step 3: Charts
    println!("\n📊 Rendering charts...");
    let emitter = ChartEmitter::new(config.general.output_dir.clone(), config.chart.clone());
    let charts = emit_charts(&emitter, &transcript, &results)?;

    // Step 4: Report
    let duration = start_time.elapsed().as_secs_f64();
    let run = report::RunInfo {
        transcript: transcript_path,
        classifier: classifier.name(),
        duration_seconds: duration,
        charts: charts.clone(),
    };
    let run_report = report::build_report(&transcript, &results, &run);

    let output = match config.general.format {
        OutputFormat::Json => report::generate_json_report(&run_report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&run_report),
    };
    let report_path = emitter
        .output_dir()
        .join(format!("report.{}", config.general.format.extension()));
    std::fs::write(&report_path, &output)
        .with_context(|| format!("Failed to write report to {}", report_path.display()))?;

    // Print summary
    println!("\n📝 Analysis Summary:");
    print_comparison_line(
        "Sentiment",
        &transcript,
        results.sentiment.first.relabel(),
        results.sentiment.second.relabel(),
    );
    print_comparison_line(
        "Emotion",
        &transcript,
        results.emotion.first.relabel(),
        results.emotion.second.relabel(),
    );
    println!("   Duration: {:.1}s", duration);
    println!(
        "\n✅ Analysis complete! {} charts saved to: {}",
        charts.len(),
        emitter.output_dir().display()
    );
    println!("   Report: {}", report_path.display());

    Ok(())
}

/// Write the absolute charts, then the relative ones.
fn emit_charts(
    emitter: &ChartEmitter,
    transcript: &Transcript,
    results: &AnalysisResults,
) -> Result<Vec<PathBuf>> {
    let first = transcript.first.display_name();
    let second = transcript.second.display_name();
    let window = &transcript.window;
    let mut written = Vec::with_capacity(4);

    // Absolute charts
    written.push(emitter.emit(
        &ChartSeries::absolute(first, &results.sentiment.first),
        &ChartSeries::absolute(second, &results.sentiment.second),
        &ChartMeta::for_analysis(AnalysisKind::Sentiment, Scale::Absolute),
        window,
    )?);
    written.push(emitter.emit(
        &ChartSeries::absolute(first, &results.emotion.first),
        &ChartSeries::absolute(second, &results.emotion.second),
        &ChartMeta::for_analysis(AnalysisKind::Emotion, Scale::Absolute),
        window,
    )?);

    // Relative charts
    let (sentiment_first, sentiment_second) = results.sentiment.normalize()?;
    let (emotion_first, emotion_second) = results.emotion.normalize()?;

    written.push(emitter.emit(
        &ChartSeries::relative(first, &sentiment_first, results.sentiment.first.total()),
        &ChartSeries::relative(second, &sentiment_second, results.sentiment.second.total()),
        &ChartMeta::for_analysis(AnalysisKind::Sentiment, Scale::Relative),
        window,
    )?);
    written.push(emitter.emit(
        &ChartSeries::relative(first, &emotion_first, results.emotion.first.total()),
        &ChartSeries::relative(second, &emotion_second, results.emotion.second.total()),
        &ChartMeta::for_analysis(AnalysisKind::Emotion, Scale::Relative),
        window,
    )?);

    Ok(written)
}

fn print_transcript_summary(transcript: &Transcript) {
    println!("   Period: {} to {}", transcript.window.start, transcript.window.end);
    println!("   Events analyzed: {}", transcript.processed_events);
    for participant in [&transcript.first, &transcript.second] {
        println!(
            "   👤 {}: {} messages",
            participant.display_name(),
            participant.messages.len()
        );
    }
}

fn print_comparison_line(
    title: &str,
    transcript: &Transcript,
    first: Vec<(&'static str, usize)>,
    second: Vec<(&'static str, usize)>,
) {
    let format_side = |counts: Vec<(&'static str, usize)>| {
        counts
            .into_iter()
            .map(|(label, count)| format!("{} {}", label, count))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    println!("   {}:", title);
    println!("     {}: {}", transcript.first.display_name(), format_side(first));
    println!("     {}: {}", transcript.second.display_name(), format_side(second));
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LexiconClassifier;
    use crate::config::ChartConfig;
    use crate::error::NormalizationError;
    use crate::transcript::parser::parse_document;

    const FIXTURE: &str = include_str!("../fixtures/telegram_export.json");

    async fn analyze(content: &str) -> (Transcript, AnalysisResults) {
        let transcript = parse_document(content, &ParseOptions::default()).unwrap();
        let results = analysis::analyze_transcript(
            &transcript,
            &LexiconClassifier::new(),
            &AggregateOptions::default(),
        )
        .await
        .unwrap();
        (transcript, results)
    }

    #[tokio::test]
    async fn test_emit_all_four_charts() {
        let (transcript, results) = analyze(FIXTURE).await;
        let dir = tempfile::tempdir().unwrap();
        let emitter = ChartEmitter::new(dir.path().to_path_buf(), ChartConfig::default());

        let charts = emit_charts(&emitter, &transcript, &results).unwrap();

        let names: Vec<_> = charts
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "absolute_sentiment.html",
                "absolute_emotions.html",
                "relative_sentiment.html",
                "relative_emotions.html",
            ]
        );

        // Relative charts still report message totals
        let relative = std::fs::read_to_string(&charts[2]).unwrap();
        assert!(relative.contains("3+2 messages analyzed between 2023-01-01 and 2023-01-05"));
    }

    #[tokio::test]
    async fn test_silent_participant_leaves_only_absolute_charts() {
        let content = serde_json::json!({
            "messages": [
                {"from": "Alice", "text": "so happy today", "date": "2023-01-01T00:00:00"},
                {"from": "Bob", "text": {"type": "sticker"}, "date": "2023-01-02T00:00:00"},
            ]
        })
        .to_string();
        let (transcript, results) = analyze(&content).await;
        let dir = tempfile::tempdir().unwrap();
        let emitter = ChartEmitter::new(dir.path().to_path_buf(), ChartConfig::default());

        let err = emit_charts(&emitter, &transcript, &results).unwrap_err();
        assert!(err.downcast_ref::<NormalizationError>().is_some());
        assert_eq!(error::exit_code(&err), 4);

        assert!(dir.path().join("absolute_sentiment.html").exists());
        assert!(dir.path().join("absolute_emotions.html").exists());
        assert!(!dir.path().join("relative_sentiment.html").exists());
    }
}
