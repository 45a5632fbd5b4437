//! Headless match runner.
//!
//! Simulates matches without any display. Logs go to stderr, results to
//! JSON files.
//!
//! # Usage
//!
//! ```bash
//! # One match from a setup file
//! cargo run -p pitch_headless -- run --setup setups/derby.ron --output derby.json
//!
//! # Override formations from a tables directory
//! cargo run -p pitch_headless -- run --setup setups/derby.ron --tables tables/ --home-formation compact
//!
//! # Batch of seeds for tuning
//! cargo run -p pitch_headless -- batch --count 500 --seed 1000 --output results/
//!
//! # Determinism check
//! cargo run -p pitch_headless -- verify --seed 42 --runs 3
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pitch_core::data::MatchSetup;
use pitch_headless::{
    batch::{run_batch, BatchConfig},
    runner::{run_match, verify_setup},
    scenario::load_setup,
    tables::MatchTables,
};

#[derive(Parser)]
#[command(name = "pitch_headless")]
#[command(about = "Headless football match simulator")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a single match
    Run {
        /// Match setup file (RON)
        #[arg(short, long)]
        setup: Option<PathBuf>,

        /// Directory with formation_*.ron and roles.ron overrides
        #[arg(short, long)]
        tables: Option<PathBuf>,

        /// Formation name from the tables for the home side
        #[arg(long, requires = "tables")]
        home_formation: Option<String>,

        /// Formation name from the tables for the away side
        #[arg(long, requires = "tables")]
        away_formation: Option<String>,

        /// Write the match log as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the setup's seed
        #[arg(long)]
        seed: Option<u64>,

        /// Override the match length in minutes
        #[arg(long)]
        minutes: Option<u32>,
    },

    /// Run a batch of matches over consecutive seeds
    Batch {
        /// Number of matches to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Seed of the first match
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Maximum parallel matches (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Template setup file (RON); defaults to two unnamed teams
        #[arg(short, long)]
        setup: Option<PathBuf>,

        /// Override the match length in minutes
        #[arg(long)]
        minutes: Option<u32>,
    },

    /// Run one seed several times and compare state hashes
    Verify {
        /// Seed to verify
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Number of runs
        #[arg(short, long, default_value = "3")]
        runs: u32,

        /// Setup file (RON)
        #[arg(short, long)]
        setup: Option<PathBuf>,

        /// Override the match length in minutes
        #[arg(long)]
        minutes: Option<u32>,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Commands::Run {
            setup,
            tables,
            home_formation,
            away_formation,
            output,
            seed,
            minutes,
        } => {
            let mut setup = setup_or_default(setup.as_deref(), seed, minutes);
            if let Some(dir) = tables {
                apply_tables(&dir, &mut setup, home_formation.as_deref(), away_formation.as_deref());
            }
            cmd_run(&setup, output.as_deref());
        }
        Commands::Batch {
            count,
            seed,
            parallel,
            output,
            setup,
            minutes,
        } => {
            let setup = setup_or_default(setup.as_deref(), None, minutes);
            cmd_batch(setup, count, seed, parallel, output);
        }
        Commands::Verify {
            seed,
            runs,
            setup,
            minutes,
        } => {
            let setup = setup_or_default(setup.as_deref(), Some(seed), minutes);
            cmd_verify(&setup, runs);
        }
    }
}

/// Load a setup file, or fall back to the default fixture, then apply the
/// command-line overrides.
fn setup_or_default(path: Option<&Path>, seed: Option<u64>, minutes: Option<u32>) -> MatchSetup {
    let mut setup = match path {
        Some(path) => match load_setup(path) {
            Ok(setup) => setup,
            Err(e) => {
                eprintln!("Failed to load setup: {}", e);
                std::process::exit(1);
            }
        },
        None => MatchSetup::default(),
    };
    if let Some(seed) = seed {
        setup.seed = seed;
    }
    if let Some(minutes) = minutes {
        setup.minutes = minutes;
    }
    setup
}

fn apply_tables(dir: &Path, setup: &mut MatchSetup, home: Option<&str>, away: Option<&str>) {
    let result = MatchTables::load_from_directory(dir).and_then(|tables| tables.apply(setup, home, away));
    if let Err(e) = result {
        eprintln!("Failed to load tables: {}", e);
        std::process::exit(1);
    }
}

fn cmd_run(setup: &MatchSetup, output: Option<&Path>) {
    tracing::info!(
        home = %setup.home.name,
        away = %setup.away.name,
        seed = setup.seed,
        minutes = setup.minutes,
        "Running match"
    );

    let report = match run_match(setup) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Failed to run match: {}", e);
            std::process::exit(1);
        }
    };

    eprintln!("{}", report.summary_line());
    for line in report.goal_lines() {
        eprintln!("  {}", line);
    }
    eprintln!(
        "  Possession: {:.1}% / {:.1}%",
        report.metrics.home_possession * 100.0,
        report.metrics.away_possession * 100.0
    );
    eprintln!("  Restarts: {}", report.metrics.restarts);
    eprintln!("  Final hash: {:016x}", report.final_state_hash);

    if let Some(path) = output {
        if let Err(e) = report.save_log(path) {
            eprintln!("Failed to write match log '{}': {}", path.display(), e);
            std::process::exit(1);
        }
        tracing::info!("Match log written to {}", path.display());
    }
}

fn cmd_batch(setup: MatchSetup, count: u32, seed: u64, parallel: u32, output: PathBuf) {
    let num_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);

    tracing::info!(
        count = count,
        parallel = parallel,
        seed = seed,
        minutes = setup.minutes,
        output = %output.display(),
        cpus_available = num_cpus,
        "Batch configuration"
    );

    if let Err(e) = std::fs::create_dir_all(&output) {
        tracing::error!(error = %e, path = %output.display(), "Failed to create output directory");
        eprintln!(
            "FATAL: Cannot create output directory '{}': {}",
            output.display(),
            e
        );
        std::process::exit(1);
    }

    let config = BatchConfig::new(setup, count)
        .with_output(output.clone())
        .with_seed(seed)
        .with_parallel(parallel);
    let results = run_batch(config);

    let path = output.join("batch.json");
    if let Err(e) = results.save(&path) {
        eprintln!("Failed to save results '{}': {}", path.display(), e);
        std::process::exit(1);
    }

    let summary = &results.summary;
    eprintln!("Batch complete: {} matches", summary.total_matches);
    eprintln!(
        "  Home wins: {}  Away wins: {}  Draws: {}",
        summary.home_wins, summary.away_wins, summary.draws
    );
    eprintln!("  Goals per match: {:.2}", summary.avg_goals);
    eprintln!("  Home possession: {:.1}%", summary.avg_home_possession * 100.0);
    eprintln!("  Restarts per match: {:.1}", summary.avg_restarts);
    eprintln!("  Results: {}", path.display());

    if !results.errors.is_empty() {
        eprintln!("  {} matches failed", results.errors.len());
        std::process::exit(1);
    }
}

fn cmd_verify(setup: &MatchSetup, runs: u32) {
    tracing::info!(
        "Verifying determinism: seed {} ({} runs)",
        setup.seed,
        runs
    );

    let report = match verify_setup(setup, runs) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Failed to run match: {}", e);
            std::process::exit(1);
        }
    };

    if report.is_deterministic() {
        eprintln!("PASS: All {} runs produced identical results", runs);
        if let Some(hash) = report.hashes.first() {
            eprintln!("  Final hash: {:016x}", hash);
        }
    } else {
        eprintln!("FAIL: Non-determinism detected!");
        if let Some(period) = report.first_divergence {
            eprintln!("  First divergence after period {}", period);
        }
        std::process::exit(1);
    }
}
