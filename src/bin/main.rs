//! # Main — CLI Entry Point
//!
//! Wires the external collaborators (CSV loading, classification) around the
//! core engine: loads moduli, runs `BatchGcdEngine`, classifies the result,
//! and reports a summary. Logging setup, `.env` loading, and the global
//! allocator are carried over verbatim from the teacher's `main.rs`.

use anyhow::{Context, Result};
use batchgcd::engine::{BatchGcdEngine, EngineConfig};
use batchgcd::{classify, input, progress::Progress};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "batchgcd", about = "Disk-backed batch-GCD engine for fleet-scale RSA modulus auditing")]
struct Cli {
    /// Number of rayon worker threads (defaults to all logical cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Working directory for the on-disk level store
    #[arg(long, default_value = ".batchgcd")]
    working_dir: PathBuf,

    /// Remainder-tree levels wider than this spill to disk instead of
    /// staying resident in memory (0 disables in-memory retention entirely)
    #[arg(long)]
    spill_threshold: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a CSV of moduli, run batch-GCD, and write classification reports
    Run {
        /// Path to the input CSV (columns: id,modulus)
        #[arg(long)]
        input: PathBuf,
        /// Parse unprefixed modulus fields as hex instead of decimal
        #[arg(long)]
        hex: bool,
        /// Directory to write compromised.csv / duplicates.csv into
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize structured logging: LOG_FORMAT=json for machine consumption,
    // human-readable otherwise.
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt().json().with_target(false).init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();

    match &cli.command {
        Commands::Run { input: input_path, hex, out_dir } => run(&cli, input_path, *hex, out_dir),
    }
}

fn run(cli: &Cli, input_path: &PathBuf, hex: bool, out_dir: &PathBuf) -> Result<()> {
    let loaded = input::load(input_path, hex).with_context(|| format!("loading {}", input_path.display()))?;
    tracing::info!(n = loaded.ids.len(), "loaded moduli");

    let progress = Progress::new();
    let reporter = progress.start_reporter();

    let engine = BatchGcdEngine::new(EngineConfig {
        workers: cli.threads,
        working_dir: cli.working_dir.clone(),
        spill_threshold: cli.spill_threshold.unwrap_or(usize::MAX),
    });

    let g = engine.run_with_progress(loaded.moduli.clone(), Some(progress.as_ref()))?;

    progress.stop();
    let _ = reporter.join();

    let summary = classify::classify(&loaded.ids, &loaded.moduli, &g, out_dir)?;
    tracing::info!(
        clean = summary.clean,
        compromised = summary.compromised,
        duplicates = summary.duplicates,
        "classification complete"
    );
    println!(
        "{} clean, {} compromised, {} duplicate(s) — reports written to {}",
        summary.clean,
        summary.compromised,
        summary.duplicates,
        out_dir.display()
    );

    Ok(())
}
