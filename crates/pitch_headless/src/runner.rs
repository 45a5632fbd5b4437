//! Single-match runner.
//!
//! Runs one [`MatchSetup`] to completion and packages the log, the final
//! state hash and derived metrics.

use std::path::Path;

use pitch_core::components::TeamSide;
use pitch_core::data::MatchSetup;
use pitch_core::error::Result as MatchResult;
use pitch_core::log::MatchLog;
use pitch_core::simulation::MatchSimulation;
use serde::{Deserialize, Serialize};

use crate::metrics::MatchMetrics;

/// Everything a finished match produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    /// Per-period log.
    pub log: MatchLog,
    /// Final simulation state hash.
    pub final_state_hash: u64,
    /// Derived metrics.
    pub metrics: MatchMetrics,
}

impl MatchReport {
    /// One-line human summary, e.g. `Harbour 2 - 1 Uplands (seed 42, 54000 periods)`.
    #[must_use]
    pub fn summary_line(&self) -> String {
        let (home, away) = self.log.final_score();
        format!(
            "{} {home} - {away} {} (seed {}, {} periods)",
            self.log.home_name,
            self.log.away_name,
            self.log.seed,
            self.log.len()
        )
    }

    /// Goal lines, e.g. `12:03.4  Harbour  #9`.
    #[must_use]
    pub fn goal_lines(&self) -> Vec<String> {
        self.log
            .goals()
            .map(|(record, goal)| {
                let team = match goal.side {
                    TeamSide::Home => &self.log.home_name,
                    TeamSide::Away => &self.log.away_name,
                };
                format!("{}  {team}  {}", record.clock(), goal.scorer)
            })
            .collect()
    }

    /// Write the match log as pretty JSON.
    pub fn save_log(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.log).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

/// Run a match to the final whistle.
pub fn run_match(setup: &MatchSetup) -> MatchResult<MatchReport> {
    let mut sim = MatchSimulation::new(setup)?;
    sim.run();
    let final_state_hash = sim.state_hash();
    let log = sim.into_log();
    let metrics = MatchMetrics::from_log(&log, final_state_hash);

    tracing::debug!(
        seed = setup.seed,
        home = metrics.home_score,
        away = metrics.away_score,
        hash = final_state_hash,
        "Match complete"
    );

    Ok(MatchReport {
        log,
        final_state_hash,
        metrics,
    })
}

/// Outcome of running the same setup several times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    /// Final hash of each run.
    pub hashes: Vec<u64>,
    /// First period after which two runs disagreed.
    pub first_divergence: Option<u32>,
}

impl VerifyReport {
    /// Whether every run agreed.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.first_divergence.is_none() && self.hashes.windows(2).all(|w| w[0] == w[1])
    }
}

/// Run `setup` `runs` times in lockstep, comparing state hashes after
/// every period.
pub fn verify_setup(setup: &MatchSetup, runs: u32) -> MatchResult<VerifyReport> {
    let mut sims = (0..runs.max(1))
        .map(|_| MatchSimulation::new(setup))
        .collect::<MatchResult<Vec<_>>>()?;

    let mut first_divergence = None;
    let total = sims.first().map_or(0, MatchSimulation::total_periods);
    for period in 0..total {
        let hashes: Vec<u64> = sims
            .iter_mut()
            .map(|sim| {
                sim.tick();
                sim.state_hash()
            })
            .collect();
        if first_divergence.is_none() && hashes.windows(2).any(|w| w[0] != w[1]) {
            tracing::warn!(period, "Runs diverged");
            first_divergence = Some(period);
        }
    }

    Ok(VerifyReport {
        hashes: sims.iter().map(MatchSimulation::state_hash).collect(),
        first_divergence,
    })
}
