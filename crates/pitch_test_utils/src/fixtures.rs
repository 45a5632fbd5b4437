//! Test fixtures and helpers.
//!
//! Pre-built setups and scripted worlds for consistent testing.

use pitch_core::components::{PlayerId, PlayerStatus, TeamSide, TEAM_SIZE};
use pitch_core::data::{MatchSetup, TeamSetup};
use pitch_core::pitch::Coordinate;
use pitch_core::world::MatchWorld;
use rand::rngs::mock::StepRng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Two stock teams playing a match of `minutes`.
#[must_use]
pub fn short_setup(seed: u64, minutes: u32) -> MatchSetup {
    MatchSetup::new("Home", "Away", seed).with_minutes(minutes)
}

/// Eleven players with every ability set to `value`.
#[must_use]
pub fn uniform_roster(value: u8) -> Vec<PlayerStatus> {
    vec![PlayerStatus::uniform(value); TEAM_SIZE]
}

/// Setup with fixed abilities for both teams.
#[must_use]
pub fn rostered_setup(seed: u64, home: u8, away: u8) -> MatchSetup {
    MatchSetup {
        home: TeamSetup::named("Home").with_roster(uniform_roster(home)),
        away: TeamSetup::named("Away").with_roster(uniform_roster(away)),
        ..MatchSetup::new("Home", "Away", seed)
    }
}

/// A fresh world with the kickoff pending cleared, ready for scripting.
///
/// # Panics
///
/// Panics if the setup is invalid.
#[must_use]
pub fn scripted_world(setup: &MatchSetup) -> MatchWorld {
    let mut rng = ChaCha8Rng::seed_from_u64(setup.seed);
    let mut world = MatchWorld::from_setup(setup, &mut rng).expect("fixture setup is valid");
    world.pending = None;
    world
}

/// Park every player of `side` on row `y`, two cells apart from x = 2.
pub fn park_side(world: &mut MatchWorld, side: TeamSide, y: i32) {
    for index in 0..TEAM_SIZE {
        let x = 2 + 2 * index as i32;
        world.place(PlayerId::new(side, index), Coordinate::new(x, y));
    }
}

/// RNG whose every draw is zero: every roll with a positive chance hits.
#[must_use]
pub fn zero_rng() -> StepRng {
    StepRng::new(0, 0)
}

/// RNG whose every draw is maximal: every roll below certainty misses.
#[must_use]
pub fn high_rng() -> StepRng {
    StepRng::new(u64::MAX, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_park_side_places_whole_team() {
        let mut world = scripted_world(&short_setup(1, 1));
        park_side(&mut world, TeamSide::Away, 60);
        for index in 0..TEAM_SIZE {
            let id = PlayerId::new(TeamSide::Away, index);
            assert_eq!(world.coordinate_of(id).y, 60);
        }
        assert!(world.pending.is_none());
    }

    #[test]
    fn test_rostered_setup_is_valid() {
        let setup = rostered_setup(3, 80, 20);
        assert!(setup.validate().is_ok());
        assert_eq!(setup.seed, 3);
    }
}
