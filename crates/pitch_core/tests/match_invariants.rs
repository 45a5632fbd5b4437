//! Whole-match invariants: checked after every period of short matches
//! across many seeds and rosters.

use pitch_core::ball::BallStateKind;
use pitch_core::data::MatchSetup;
use pitch_core::log::MatchLog;
use pitch_core::simulation::{MatchSimulation, PERIODS_PER_MINUTE};
use pitch_test_utils::determinism::strategies::arb_setup;
use pitch_test_utils::determinism::{find_first_divergence, verify_log_codec_determinism};
use pitch_test_utils::fixtures::short_setup;
use pitch_test_utils::proptest::prelude::*;

fn run_checked(setup: &MatchSetup) -> MatchLog {
    let mut sim = MatchSimulation::new(setup).expect("valid setup");
    while !sim.is_finished() {
        let period = sim.period();
        let record = sim.tick().clone();

        assert_eq!(record.period, period);
        assert_eq!(record.players.len(), 22);
        let flagged = record.players.iter().filter(|p| p.has_ball).count();
        assert!(flagged <= 1, "period {period}: {flagged} holders");
        if record.ball_state == BallStateKind::Held {
            assert_eq!(flagged, 1, "period {period}: held ball without holder");
        }
        for p in &record.players {
            assert!(!p.coordinate.is_out_of_pitch(), "period {period}: {} off pitch", p.id);
        }
        assert!(!record.ball.is_out_of_pitch(), "period {period}: ball off pitch");
        sim.world().check_invariants(period).expect("world invariants hold");
    }
    sim.into_log()
}

#[test]
fn test_full_minute_holds_invariants() {
    let log = run_checked(&short_setup(100, 1));
    assert_eq!(log.len(), PERIODS_PER_MINUTE as usize);
}

#[test]
fn test_score_matches_goal_records() {
    for seed in 0..3 {
        let log = run_checked(&short_setup(seed, 2));
        let (home, away) = log.final_score();
        assert_eq!((home + away) as usize, log.goals().count(), "seed {seed}");
        let mut last = (0, 0);
        for record in &log.periods {
            assert!(record.score.0 >= last.0 && record.score.1 >= last.1);
            let delta = (record.score.0 - last.0) + (record.score.1 - last.1);
            assert_eq!(delta > 0, record.goal.is_some(), "seed {seed} period {}", record.period);
            last = record.score;
        }
    }
}

#[test]
fn test_goal_is_followed_by_kickoff() {
    for seed in 3..7 {
        let log = run_checked(&short_setup(seed, 2));
        for (record, goal) in log.goals() {
            let Some(next) = log.periods.get(record.period as usize + 1) else {
                continue;
            };
            let kicker = next.players[goal.kickoff_player_index].id;
            assert_eq!(next.holder, Some(kicker), "seed {seed}");
            assert_eq!(kicker.side(), goal.side.opponent());
        }
    }
}

#[test]
fn test_same_seed_same_log() {
    let setup = short_setup(55, 2);
    let a = MatchSimulation::new(&setup).unwrap().run().clone();
    let b = MatchSimulation::new(&setup).unwrap().run().clone();
    assert_eq!(a, b);
    assert_eq!(find_first_divergence(&setup, 600), None);
}

#[test]
fn test_log_survives_codec() {
    assert!(verify_log_codec_determinism(&short_setup(56, 1)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(6))]

    #[test]
    fn prop_random_matches_hold_invariants(setup in arb_setup(1)) {
        let log = run_checked(&setup);
        prop_assert_eq!(log.len(), (setup.minutes * PERIODS_PER_MINUTE) as usize);
    }

    #[test]
    fn prop_random_matches_replay(setup in arb_setup(1)) {
        let first = MatchSimulation::new(&setup).unwrap().run().clone();
        let second = MatchSimulation::new(&setup).unwrap().run().clone();
        prop_assert_eq!(first, second);
    }
}
