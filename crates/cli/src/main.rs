//! Sauti CLI — pronunciation scoring and practice progress analytics.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use uuid::Uuid;

use sauti_core::asr::{FixedTranscript, RecognitionContext, Recognizer};
use sauti_core::audio::features::AudioFeatures;
use sauti_core::audio::io::read_wav;
use sauti_core::store::{MemoryStore, PracticeStore};
use sauti_core::text::metrics::{character_error_rate, word_error_rate};
use sauti_core::types::PracticeEvent;
use sauti_core::PracticeEngine;

// ─── Top-level CLI ───────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "sauti",
    about = "Pronunciation assessment and practice progress analytics",
    version,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score a recording against the phrase it should say
    Score(ScoreArgs),
    /// Extract signal features from a recording
    Features(FeaturesArgs),
    /// Word and character error rates between two texts
    Metrics(MetricsArgs),
    /// Replay a practice event log and report progress
    Replay(ReplayArgs),
}

// ─── Score ───────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Score a recording against its reference phrase")]
struct ScoreArgs {
    /// Reference text the learner tried to say
    reference: String,

    /// Recording of the attempt (WAV)
    audio: PathBuf,

    /// Transcript of the recording
    #[arg(long)]
    hypothesis: Option<String>,

    /// File containing the transcript
    #[arg(long)]
    hypothesis_file: Option<PathBuf>,

    /// Language of the phrase
    #[arg(long, default_value = "english")]
    language: String,

    /// Speech impairment severity
    #[arg(long, default_value = "moderate", value_parser = ["mild", "moderate", "severe"])]
    severity: String,

    /// Speech impairment etiology
    #[arg(long, default_value = "none")]
    etiology: String,

    /// Show verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

// ─── Features ────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Extract energy, ZCR, SNR, and pitch from a WAV")]
struct FeaturesArgs {
    /// Recording to analyze (WAV)
    audio: PathBuf,

    /// Show verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

// ─── Metrics ─────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Word and character error rates between two texts")]
struct MetricsArgs {
    /// Reference text
    reference: String,

    /// Hypothesis text
    hypothesis: String,

    /// Show verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

// ─── Replay ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Replay a JSONL practice event log and report progress")]
struct ReplayArgs {
    /// Event log, one JSON event per line
    log: PathBuf,

    /// Report date (default: today)
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Show verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

/// One line of the replay log.
#[derive(Debug, Deserialize)]
struct ReplayLine {
    learner_id: Uuid,
    date: NaiveDate,
    #[serde(flatten)]
    event: PracticeEvent,
}

// ─── Main ────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    // Init logging
    let log_level = match &cli.command {
        Command::Score(a) if a.verbose => "debug",
        Command::Features(a) if a.verbose => "debug",
        Command::Metrics(a) if a.verbose => "debug",
        Command::Replay(a) if a.verbose => "debug",
        _ => "info",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Command::Score(args) => run_score(args),
        Command::Features(args) => run_features(args),
        Command::Metrics(args) => run_metrics(args),
        Command::Replay(args) => run_replay(args),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

// ─── Helpers ─────────────────────────────────────────────────────

/// Resolve the transcript from --hypothesis or --hypothesis-file.
fn resolve_hypothesis(inline: Option<String>, file: Option<&PathBuf>) -> Result<String> {
    if let Some(text) = inline {
        return Ok(text);
    }
    if let Some(path) = file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        return Ok(text.trim().to_string());
    }
    bail!("Either --hypothesis or --hypothesis-file is required");
}

// ─── Score runner ────────────────────────────────────────────────

fn run_score(args: ScoreArgs) -> Result<()> {
    let hypothesis = resolve_hypothesis(args.hypothesis, args.hypothesis_file.as_ref())?;

    let (samples, sample_rate) = read_wav(&args.audio)?;
    log::debug!(
        "{}: {} samples at {} Hz",
        args.audio.display(),
        samples.len(),
        sample_rate
    );

    // The fixed recognizer stands in for a real ASR backend; the
    // context travels with the request either way.
    let ctx = RecognitionContext {
        language: args.language,
        severity: args.severity,
        etiology: args.etiology,
    };
    let recognizer = FixedTranscript(hypothesis);
    let transcription = recognizer.transcribe(&samples, sample_rate, &ctx)?;
    log::info!("Heard: {}", transcription.text);

    let score = sauti_core::scoring::score(
        &args.reference,
        &transcription.text,
        &samples,
        sample_rate,
    )?;

    println!("{}", serde_json::to_string_pretty(&score)?);
    println!("Verdict: {}", score.verdict());

    Ok(())
}

// ─── Features runner ─────────────────────────────────────────────

fn run_features(args: FeaturesArgs) -> Result<()> {
    let (samples, sample_rate) = read_wav(&args.audio)?;
    log::info!(
        "{}: {} samples at {} Hz ({:.2}s)",
        args.audio.display(),
        samples.len(),
        sample_rate,
        samples.len() as f64 / f64::from(sample_rate)
    );

    let features = AudioFeatures::extract(&samples, sample_rate)?;
    println!("{}", serde_json::to_string_pretty(&features)?);

    Ok(())
}

// ─── Metrics runner ──────────────────────────────────────────────

fn run_metrics(args: MetricsArgs) -> Result<()> {
    let wer = word_error_rate(&args.reference, &args.hypothesis)?;
    let cer = character_error_rate(&args.reference, &args.hypothesis)?;

    println!("WER: {:.3}", wer);
    println!("CER: {:.3}", cer);

    Ok(())
}

// ─── Replay runner ───────────────────────────────────────────────

fn run_replay(args: ReplayArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.log)
        .with_context(|| format!("Cannot read {}", args.log.display()))?;

    let engine = PracticeEngine::new(MemoryStore::new());
    let mut learners: Vec<Uuid> = Vec::new();
    let mut events = 0usize;

    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let entry: ReplayLine = serde_json::from_str(line)
            .with_context(|| format!("Bad event on line {}", lineno + 1))?;
        engine.apply_event(entry.learner_id, entry.date, &entry.event)?;
        if !learners.contains(&entry.learner_id) {
            learners.push(entry.learner_id);
        }
        events += 1;
    }

    if learners.is_empty() {
        bail!("No events in {}", args.log.display());
    }
    log::info!("Replayed {} event(s) for {} learner(s)", events, learners.len());

    let today = args.today.unwrap_or_else(|| Utc::now().date_naive());
    for learner_id in &learners {
        let mut days = engine.store().daily_records(*learner_id)?;
        days.sort_by_key(|r| r.date);
        let report = engine.achievements(*learner_id, today)?;

        println!("Learner {}", learner_id);
        println!("{}", serde_json::to_string_pretty(&days)?);
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
