//! Headless match runner for batch simulation and determinism checks.
//!
//! This crate drives [`pitch_core`] without any interactive surface:
//!
//! - **Single matches**: load a RON setup, simulate it, export the log as JSON
//! - **Batches**: run many seeds in parallel and aggregate the outcomes
//! - **Verification**: run one seed several times in lockstep and report the
//!   first period where the state hashes disagree
//!
//! Logs go to stderr; results go to files.
//!
//! # Example
//!
//! ```bash
//! # Simulate one match and keep its log
//! cargo run -p pitch_headless -- run --setup setups/derby.ron --output derby.json
//!
//! # Two hundred seeds, four threads
//! cargo run -p pitch_headless -- batch --count 200 --parallel 4 --output results/
//!
//! # Determinism check
//! cargo run -p pitch_headless -- verify --seed 42 --runs 3
//! ```

pub mod batch;
pub mod metrics;
pub mod runner;
pub mod scenario;
pub mod tables;

pub use batch::{run_batch, BatchConfig, BatchError, BatchResults};
pub use metrics::{BatchSummary, MatchMetrics};
pub use runner::{run_match, verify_setup, MatchReport, VerifyReport};
pub use scenario::{load_setup, setup_from_ron_str, ScenarioError};
pub use tables::{MatchTables, TableLoadError};
