use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use doppler_gesture::analysis::{GestureClassifier, GestureDecision, TickOutcome};
use doppler_gesture::config::AppConfig;
use doppler_gesture::engine::SessionHandle;
use doppler_gesture::error::log_sample_error;
use doppler_gesture::testing::signals::{TracePattern, TracePoint, TraceSpec};
use rtrb::PushError;
use serde::Serialize;
use tokio::sync::broadcast::error::TryRecvError;

#[derive(Parser, Debug)]
#[command(
    name = "doppler_cli",
    about = "Synthetic trace harness for the Doppler gesture classifier"
)]
struct Cli {
    /// Override path to the JSON config file (defaults to assets/gesture_config.json)
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a synthetic trace and run it through a full session
    Simulate {
        #[arg(long, default_value = "sweep")]
        pattern: TracePattern,
        /// Retune the session carrier before the run (validated against the band)
        #[arg(long)]
        carrier: Option<f32>,
        #[arg(long, default_value_t = 3_000)]
        duration_ms: u64,
        #[arg(long, default_value_t = 100)]
        cadence_ms: u64,
        #[arg(long, default_value_t = 0x5EED_0D0F)]
        seed: u64,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replay a JSON trace file through the classifier, one decision per line
    Classify {
        #[arg(long)]
        input: PathBuf,
    },
    /// Print the effective configuration as JSON
    DumpConfig,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    doppler_gesture::init_logging();

    let cli = Cli::parse();
    let config = cli
        .config
        .map(AppConfig::load_from_file)
        .unwrap_or_else(AppConfig::load);

    match cli.command {
        Commands::Simulate {
            pattern,
            carrier,
            duration_ms,
            cadence_ms,
            seed,
            output,
        } => {
            let spec = TraceSpec {
                pattern,
                carrier_hz: carrier.unwrap_or(config.carrier.default_hz),
                duration_ms,
                cadence_ms,
                seed,
            };
            run_simulate(config, spec, carrier, output)
        }
        Commands::Classify { input } => run_classify(&config, &input),
        Commands::DumpConfig => run_dump_config(&config),
    }
}

fn run_simulate(
    config: AppConfig,
    spec: TraceSpec,
    retune_hz: Option<f32>,
    output_path: Option<PathBuf>,
) -> Result<ExitCode> {
    let session = SessionHandle::with_config(config);
    if let Some(hz) = retune_hz {
        session.set_carrier_hz(hz)?;
    }
    session.start()?;

    let mut decision_rx = session
        .decision_receiver()
        .context("decision channel missing after start")?;
    let mut producer = session.sample_producer()?;

    let samples = spec.samples(Instant::now());
    let sample_count = samples.len();
    for sample in samples {
        let mut pending = sample;
        loop {
            match producer.push(pending) {
                Ok(()) => break,
                Err(PushError::Full(rejected)) => {
                    pending = rejected;
                    std::thread::sleep(Duration::from_millis(1));
                }
            }
        }
    }

    // Worker drains the feed before honoring the stop flag, so every pushed
    // sample is classified by the time stop() returns.
    drop(producer);
    session.stop()?;

    let mut decisions = Vec::new();
    loop {
        match decision_rx.try_recv() {
            Ok(decision) => decisions.push(decision),
            Err(TryRecvError::Lagged(skipped)) => {
                log::warn!("[doppler_cli] Decision receiver lagged, skipped {skipped} events");
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }

    emit_report(&spec, sample_count, &decisions, output_path)?;
    Ok(ExitCode::from(0))
}

fn run_classify(config: &AppConfig, input: &Path) -> Result<ExitCode> {
    let contents =
        fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let points: Vec<TracePoint> = serde_json::from_str(&contents)
        .with_context(|| format!("parsing trace points from {}", input.display()))?;

    let mut classifier = GestureClassifier::new(&config.classifier);
    let origin = Instant::now();
    let mut rejected = 0usize;

    for point in &points {
        match classifier.process(&point.as_sample(origin)) {
            Ok(TickOutcome::Decision(decision)) => {
                println!("{}", serde_json::to_string(&decision)?);
            }
            Ok(_) => {}
            Err(err) => {
                rejected += 1;
                log_sample_error(&err, "doppler_cli");
            }
        }
    }

    if rejected > 0 {
        eprintln!("{rejected} of {} trace points rejected", points.len());
    }

    Ok(ExitCode::from(0))
}

fn run_dump_config(config: &AppConfig) -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(ExitCode::from(0))
}

fn emit_report(
    spec: &TraceSpec,
    sample_count: usize,
    decisions: &[GestureDecision],
    output_path: Option<PathBuf>,
) -> Result<()> {
    let report = SimulationReportPayload {
        pattern: spec.pattern,
        carrier_hz: spec.carrier_hz,
        duration_ms: spec.duration_ms,
        sample_count,
        decision_count: decisions.len(),
        decisions,
    };
    let json = serde_json::to_string_pretty(&report)?;

    if let Some(path) = output_path {
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }

    Ok(())
}

#[derive(Serialize)]
struct SimulationReportPayload<'a> {
    pattern: TracePattern,
    carrier_hz: f32,
    duration_ms: u64,
    sample_count: usize,
    decision_count: usize,
    #[serde(skip_serializing_if = "slice_empty")]
    decisions: &'a [GestureDecision],
}

fn slice_empty(decisions: &&[GestureDecision]) -> bool {
    decisions.is_empty()
}
