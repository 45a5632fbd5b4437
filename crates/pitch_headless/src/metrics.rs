//! Match metrics collection for batch analysis.
//!
//! Metrics are derived from a finished [`MatchLog`] so they can be
//! recomputed from a stored log without replaying the match.

use std::collections::BTreeMap;

use pitch_core::ball::BallStateKind;
use pitch_core::components::{ActionCode, TeamSide};
use pitch_core::log::MatchLog;
use serde::{Deserialize, Serialize};

/// Metrics for a single match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchMetrics {
    /// Random seed used.
    pub seed: u64,
    /// Periods simulated.
    pub periods: u32,
    /// Home goals.
    pub home_score: u32,
    /// Away goals.
    pub away_score: u32,
    /// Share of held-ball periods with the home side in possession.
    pub home_possession: f64,
    /// Share of held-ball periods with the away side in possession.
    pub away_possession: f64,
    /// How often each action code appears across all players.
    pub action_counts: BTreeMap<ActionCode, u32>,
    /// Throw-ins, corners, goal kicks, free kicks and penalties awarded.
    pub restarts: u32,
    /// Final simulation state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl MatchMetrics {
    /// Derive metrics from a finished log.
    #[must_use]
    pub fn from_log(log: &MatchLog, final_state_hash: u64) -> Self {
        let (home_score, away_score) = log.final_score();
        let mut action_counts: BTreeMap<ActionCode, u32> = BTreeMap::new();
        let mut restarts = 0;
        let mut held = [0u32; 2];

        for record in &log.periods {
            for snapshot in &record.players {
                if snapshot.action != ActionCode::None {
                    *action_counts.entry(snapshot.action).or_insert(0) += 1;
                }
                if snapshot.has_ball && record.ball_state == BallStateKind::Held {
                    match snapshot.id.side() {
                        TeamSide::Home => held[0] += 1,
                        TeamSide::Away => held[1] += 1,
                    }
                }
            }
            if record.involver_action.is_restart() {
                restarts += 1;
            }
        }

        let total = f64::from(held[0] + held[1]);
        let (home_possession, away_possession) = if total > 0.0 {
            (f64::from(held[0]) / total, f64::from(held[1]) / total)
        } else {
            (0.5, 0.5)
        };

        Self {
            seed: log.seed,
            periods: log.len() as u32,
            home_score,
            away_score,
            home_possession,
            away_possession,
            action_counts,
            restarts,
            final_state_hash,
        }
    }

    /// Winning side, `None` for a draw.
    #[must_use]
    pub fn winner(&self) -> Option<TeamSide> {
        match self.home_score.cmp(&self.away_score) {
            std::cmp::Ordering::Greater => Some(TeamSide::Home),
            std::cmp::Ordering::Less => Some(TeamSide::Away),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Goals scored by both sides.
    #[must_use]
    pub const fn total_goals(&self) -> u32 {
        self.home_score + self.away_score
    }
}

/// Aggregate over a batch of matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Matches aggregated.
    pub total_matches: u32,
    /// Home wins.
    pub home_wins: u32,
    /// Away wins.
    pub away_wins: u32,
    /// Draws.
    pub draws: u32,
    /// Mean goals per match.
    pub avg_goals: f64,
    /// Mean home possession share.
    pub avg_home_possession: f64,
    /// Mean restarts per match.
    pub avg_restarts: f64,
    /// Action counts summed over every match.
    pub action_totals: BTreeMap<ActionCode, u64>,
}

impl BatchSummary {
    /// Aggregate the given matches.
    #[must_use]
    pub fn from_matches(matches: &[MatchMetrics]) -> Self {
        let mut summary = Self {
            total_matches: matches.len() as u32,
            ..Self::default()
        };
        if matches.is_empty() {
            return summary;
        }

        let mut goals = 0u64;
        let mut possession = 0.0;
        let mut restarts = 0u64;
        for m in matches {
            match m.winner() {
                Some(TeamSide::Home) => summary.home_wins += 1,
                Some(TeamSide::Away) => summary.away_wins += 1,
                None => summary.draws += 1,
            }
            goals += u64::from(m.total_goals());
            possession += m.home_possession;
            restarts += u64::from(m.restarts);
            for (&code, &count) in &m.action_counts {
                *summary.action_totals.entry(code).or_insert(0) += u64::from(count);
            }
        }

        let n = matches.len() as f64;
        summary.avg_goals = goals as f64 / n;
        summary.avg_home_possession = possession / n;
        summary.avg_restarts = restarts as f64 / n;
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitch_core::data::MatchSetup;
    use pitch_core::simulation::MatchSimulation;

    fn metrics(home: u32, away: u32) -> MatchMetrics {
        MatchMetrics {
            home_score: home,
            away_score: away,
            home_possession: 0.6,
            away_possession: 0.4,
            restarts: 2,
            ..MatchMetrics::default()
        }
    }

    #[test]
    fn test_winner() {
        assert_eq!(metrics(2, 1).winner(), Some(TeamSide::Home));
        assert_eq!(metrics(0, 1).winner(), Some(TeamSide::Away));
        assert_eq!(metrics(1, 1).winner(), None);
    }

    #[test]
    fn test_summary_counts() {
        let summary = BatchSummary::from_matches(&[metrics(2, 1), metrics(0, 1), metrics(1, 1), metrics(3, 0)]);
        assert_eq!(summary.total_matches, 4);
        assert_eq!(summary.home_wins, 2);
        assert_eq!(summary.away_wins, 1);
        assert_eq!(summary.draws, 1);
        assert!((summary.avg_goals - 2.25).abs() < 1e-9);
        assert!((summary.avg_home_possession - 0.6).abs() < 1e-9);
        assert!((summary.avg_restarts - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchSummary::from_matches(&[]);
        assert_eq!(summary, BatchSummary::default());
    }

    #[test]
    fn test_metrics_from_real_log() {
        let mut sim = MatchSimulation::new(&MatchSetup::new("H", "A", 3).with_minutes(1)).unwrap();
        sim.run();
        let hash = sim.state_hash();
        let m = MatchMetrics::from_log(sim.log(), hash);

        assert_eq!(m.seed, 3);
        assert_eq!(m.periods, 600);
        assert_eq!(m.final_state_hash, hash);
        assert!((m.home_possession + m.away_possession - 1.0).abs() < 1e-9);
        assert!(m.action_counts.get(&ActionCode::Kickoff).copied().unwrap_or(0) >= 1);
    }
}
