//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a match produces identical
//! results given an identical setup.
//!
//! # Testing Strategy
//!
//! A match is fully determined by its [`MatchSetup`]: the seed drives a
//! single `ChaCha8Rng` and every random draw in the engine goes through it.
//! Sources of non-determinism to guard against:
//!
//! - **Floating-point geometry**: vision cones and anchors use
//!   [`pitch_core::math::Fixed`]. Probabilities are `f64` but only ever
//!   compared against a draw, never accumulated.
//!
//! - **HashMap iteration order**: players always live in a `Vec` in arena
//!   order, and every tie-break scans in that order.
//!
//! - **System randomness**: no `thread_rng()` anywhere in the engine.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual resolvers with scripted RNGs
//! 2. **Property tests**: random seeds and rosters still replay identically
//! 3. **Integration tests**: full scenarios are reproducible
//! 4. **Parallel tests**: N matches on N threads all agree

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use pitch_core::data::MatchSetup;
use pitch_core::log::MatchLog;
use pitch_core::simulation::MatchSimulation;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of periods simulated.
    pub periods: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic match).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Match is non-deterministic!\n\
                 Runs: {}\n\
                 Periods: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.periods,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a stepping process multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `periods` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    periods: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..periods {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        periods,
    }
}

/// Run the same match `runs` times for `periods` periods and compare
/// final state hashes.
///
/// # Panics
///
/// Panics if the setup is invalid.
pub fn verify_match_determinism(setup: &MatchSetup, runs: usize, periods: u64) -> DeterminismResult {
    verify_determinism(
        runs,
        periods,
        || MatchSimulation::new(setup).expect("determinism setup is valid"),
        |sim| {
            sim.tick();
        },
        MatchSimulation::state_hash,
    )
}

/// Run N copies of a match on scoped threads and collect final hashes.
///
/// Catches non-determinism that only shows under thread scheduling or
/// memory layout differences.
///
/// # Panics
///
/// Panics if the setup is invalid or a worker thread panics.
pub fn run_parallel_matches(setup: &MatchSetup, num_sims: usize, periods: u64) -> DeterminismResult {
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = MatchSimulation::new(setup).expect("parallel setup is valid");
                    for _ in 0..periods {
                        sim.tick();
                    }
                    sim.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("simulation thread panicked"))
            .collect()
    });

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    DeterminismResult {
        is_deterministic,
        hashes,
        periods,
    }
}

/// Compare two runs period by period, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs agree throughout, `Some(period)` for the first
/// period after which their hashes differ (0 = before the first tick).
///
/// # Panics
///
/// Panics if the setup is invalid.
pub fn find_first_divergence(setup: &MatchSetup, periods: u64) -> Option<u64> {
    let mut sim1 = MatchSimulation::new(setup).expect("divergence setup is valid");
    let mut sim2 = MatchSimulation::new(setup).expect("divergence setup is valid");

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for period in 1..=periods {
        sim1.tick();
        sim2.tick();

        if sim1.state_hash() != sim2.state_hash() {
            tracing::warn!(period, "Simulations diverged");
            return Some(period);
        }
    }

    None
}

/// Run a match and verify its log survives an encode/decode cycle exactly.
///
/// # Panics
///
/// Panics if the setup is invalid.
pub fn verify_log_codec_determinism(setup: &MatchSetup) -> bool {
    let mut sim = MatchSimulation::new(setup).expect("codec setup is valid");
    let log: MatchLog = sim.run().clone();
    let hash_before = compute_hash(&log);

    let Ok(bytes) = log.encode() else {
        return false;
    };
    let Ok(restored) = MatchLog::decode(&bytes) else {
        return false;
    };

    hash_before == compute_hash(&restored)
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for match testing.
///
/// These strategies generate random but reproducible setups for
/// property-based testing of engine invariants.
pub mod strategies {
    use pitch_core::components::{PlayerStatus, TEAM_SIZE};
    use pitch_core::data::{MatchSetup, TeamSetup};
    use pitch_core::pitch::{Coordinate, MAX_X, MAX_Y};
    use proptest::prelude::*;

    /// Any match seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }

    /// One ability score in 1..=100.
    pub fn arb_ability() -> impl Strategy<Value = u8> {
        1u8..=100u8
    }

    /// A full ability block.
    pub fn arb_status() -> impl Strategy<Value = PlayerStatus> {
        (arb_ability(), arb_ability(), arb_ability(), arb_ability(), arb_ability())
            .prop_map(|(speed, shoot, pass, dribble, defense)| {
                PlayerStatus::new(speed, shoot, pass, dribble, defense)
            })
    }

    /// Eleven ability blocks.
    pub fn arb_roster() -> impl Strategy<Value = Vec<PlayerStatus>> {
        proptest::collection::vec(arb_status(), TEAM_SIZE)
    }

    /// A cell on the pitch.
    pub fn arb_coordinate() -> impl Strategy<Value = Coordinate> {
        (0..=MAX_X, 0..=MAX_Y).prop_map(|(x, y)| Coordinate::new(x, y))
    }

    /// A cell just outside the pitch on any of the four lines.
    pub fn arb_exit() -> impl Strategy<Value = Coordinate> {
        prop_oneof![
            (0..=MAX_X).prop_map(|x| Coordinate::new(x, -1)),
            (0..=MAX_X).prop_map(|x| Coordinate::new(x, MAX_Y + 1)),
            (0..=MAX_Y).prop_map(|y| Coordinate::new(-1, y)),
            (0..=MAX_Y).prop_map(|y| Coordinate::new(MAX_X + 1, y)),
        ]
    }

    /// A short match with random seed and rosters.
    pub fn arb_setup(max_minutes: u32) -> impl Strategy<Value = MatchSetup> {
        (arb_seed(), arb_roster(), arb_roster(), 1..=max_minutes.max(1)).prop_map(
            |(seed, home, away, minutes)| MatchSetup {
                home: TeamSetup::named("Home").with_roster(home),
                away: TeamSetup::named("Away").with_roster(away),
                ..MatchSetup::new("Home", "Away", seed).with_minutes(minutes)
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::short_setup;

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 100, || 0u64, |n| *n += 1, |n| *n);

        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
    }

    #[test]
    fn test_unique_hashes() {
        let result = DeterminismResult {
            is_deterministic: false,
            hashes: vec![3, 1, 3],
            periods: 1,
        };
        assert_eq!(result.unique_hashes(), vec![1, 3]);
    }

    #[test]
    #[should_panic(expected = "non-deterministic")]
    fn test_assert_deterministic_panics_on_mismatch() {
        DeterminismResult {
            is_deterministic: false,
            hashes: vec![1, 2],
            periods: 1,
        }
        .assert_deterministic();
    }

    #[test]
    fn test_match_determinism() {
        verify_match_determinism(&short_setup(7, 1), 3, 300).assert_deterministic();
    }

    #[test]
    fn test_no_divergence() {
        assert_eq!(find_first_divergence(&short_setup(8, 1), 200), None);
    }

    #[test]
    fn test_parallel_matches_agree() {
        run_parallel_matches(&short_setup(9, 1), 4, 200).assert_deterministic();
    }

    #[test]
    fn test_log_codec() {
        assert!(verify_log_codec_determinism(&short_setup(10, 1)));
    }
}
