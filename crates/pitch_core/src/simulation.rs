//! Match scheduler.
//!
//! One call to [`MatchSimulation::tick`] simulates one 100 ms period:
//!
//! 1. Clear per-period action codes and apply possession-change freezes.
//! 2. Recompute intents for free off-ball players.
//! 3. Resolve the holder's action (unless the holder is frozen).
//! 4. Point chasers at a moving ball and move every off-ball player.
//! 5. Advance a flying ball or settle a loose one.
//! 6. Count freezes down and emit the period record.
//!
//! The simulation owns the world, the configuration and the RNG; resolvers
//! borrow them through a [`TickContext`] for the duration of the tick.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::components::ActionCode;
use crate::config::EngineConfig;
use crate::data::MatchSetup;
use crate::error::Result;
use crate::log::{MatchLog, PeriodLog};
use crate::match_state::MatchState;
use crate::positioning::{assign_intents, move_non_holders};
use crate::resolvers::{assign_chase_intents, process_ball, take_turn};
use crate::world::{MatchWorld, TickContext};

/// Periods simulated per second of match time.
pub const PERIODS_PER_SECOND: u32 = 10;

/// Periods simulated per minute of match time.
pub const PERIODS_PER_MINUTE: u32 = PERIODS_PER_SECOND * 60;

/// Length of one period in milliseconds.
pub const PERIOD_MS: u32 = 1000 / PERIODS_PER_SECOND;

/// A running match.
///
/// Generic over the random source so tests can plug in a scripted RNG;
/// matches built with [`MatchSimulation::new`] use a `ChaCha8Rng` seeded
/// from the setup.
pub struct MatchSimulation<R: RngCore = ChaCha8Rng> {
    world: MatchWorld,
    config: EngineConfig,
    rng: R,
    period: u32,
    total_periods: u32,
    log: MatchLog,
}

impl MatchSimulation<ChaCha8Rng> {
    /// Build a match from a setup, seeding the RNG from `setup.seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the setup or its formations are invalid.
    pub fn new(setup: &MatchSetup) -> Result<Self> {
        Self::with_rng(setup, ChaCha8Rng::seed_from_u64(setup.seed))
    }
}

impl<R: RngCore> MatchSimulation<R> {
    /// Build a match using the given random source.
    ///
    /// # Errors
    ///
    /// Returns an error if the setup or its formations are invalid.
    pub fn with_rng(setup: &MatchSetup, mut rng: R) -> Result<Self> {
        let world = MatchWorld::from_setup(setup, &mut rng)?;
        let log = MatchLog::new(setup.home.name.clone(), setup.away.name.clone(), setup.seed);
        let total_periods = setup.minutes * PERIODS_PER_MINUTE;

        tracing::info!(
            home = %setup.home.name,
            away = %setup.away.name,
            seed = setup.seed,
            total_periods,
            "Match created"
        );

        Ok(Self {
            world,
            config: setup.engine.clone(),
            rng,
            period: 0,
            total_periods,
            log,
        })
    }

    /// Current period index (number of periods simulated so far).
    #[must_use]
    pub const fn period(&self) -> u32 {
        self.period
    }

    /// Periods in the full match.
    #[must_use]
    pub const fn total_periods(&self) -> u32 {
        self.total_periods
    }

    /// Whether every period has been simulated.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.period >= self.total_periods
    }

    /// The match world.
    #[must_use]
    pub const fn world(&self) -> &MatchWorld {
        &self.world
    }

    /// Mutable world access for scripted scenarios.
    pub fn world_mut(&mut self) -> &mut MatchWorld {
        &mut self.world
    }

    /// Engine tuning in use.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Records emitted so far.
    #[must_use]
    pub const fn log(&self) -> &MatchLog {
        &self.log
    }

    /// Consume the simulation and return its log.
    #[must_use]
    pub fn into_log(self) -> MatchLog {
        self.log
    }

    /// Simulate one period and return its record.
    pub fn tick(&mut self) -> &PeriodLog {
        let mut record = PeriodLog::new(self.period);

        // 1. Period bookkeeping
        for player in &mut self.world.players {
            player.action = ActionCode::None;
        }
        self.world
            .state
            .begin_period(&self.world.ball, &mut self.world.players);

        // 2. Off-ball intents
        assign_intents(&mut self.world, &self.config.positioning);

        {
            let mut ctx = TickContext::new(&mut self.world, &self.config, &mut self.rng, &mut record);

            // 3. Holder action
            if let Some(holder) = ctx.world.holder() {
                ctx.log.holder = Some(holder);
                let attacking = ctx.world.state.attacking_side();
                let frozen = ctx
                    .world
                    .player(holder)
                    .is_some_and(|p| p.is_frozen(p.side == attacking));
                if !frozen {
                    take_turn(&mut ctx, holder);
                }
            }

            // A goal resets the pitch; nothing else moves this period.
            if !ctx.log.has_goal() {
                // 4. Chasers and movement
                assign_chase_intents(ctx.world);
                move_non_holders(ctx.world);

                // 5. Ball
                process_ball(&mut ctx);
            }
        }

        // 6. Freezes and the record
        MatchState::tick_down_freezes(&mut self.world.players);
        if !record.has_goal() {
            record.capture(&self.world.players, &self.world.ball, &self.world.state);
        }

        #[cfg(feature = "debug-validation")]
        if let Err(err) = self.world.check_invariants(self.period) {
            tracing::error!(%err, "World invariant broken");
        }

        let index = self.log.len();
        self.log.push(record);
        self.period += 1;

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(tick = self.period, state_hash = hash, "Simulation state hash");
        }

        &self.log.periods[index]
    }

    /// Simulate every remaining period.
    pub fn run(&mut self) -> &MatchLog {
        while !self.is_finished() {
            self.tick();
        }
        let (home, away) = self.world.state.scores();
        tracing::info!(home, away, periods = self.period, "Match finished");
        &self.log
    }

    /// Deterministic hash of the world.
    ///
    /// Two simulations with identical state produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.period.hash(&mut hasher);
        self.world.ball.hash(&mut hasher);
        self.world.state.hash(&mut hasher);
        self.world.pending.hash(&mut hasher);

        self.world.players.len().hash(&mut hasher);
        for player in &self.world.players {
            player.id.hash(&mut hasher);
            player.coordinate.hash(&mut hasher);
            player.intent.hash(&mut hasher);
            player.action.hash(&mut hasher);
            player.has_ball().hash(&mut hasher);
            player.duel.hash(&mut hasher);
            player.offense_freeze.hash(&mut hasher);
            player.defense_freeze.hash(&mut hasher);
            player.move_points.hash(&mut hasher);
        }

        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ball::BallStateKind;
    use crate::components::PlayerId;
    use crate::pitch::{Coordinate, CENTER};

    fn short_match(seed: u64) -> MatchSimulation {
        MatchSimulation::new(&MatchSetup::new("Home", "Away", seed).with_minutes(1)).unwrap()
    }

    #[test]
    fn test_period_constants() {
        assert_eq!(PERIODS_PER_MINUTE, 600);
        assert_eq!(PERIOD_MS, 100);
    }

    #[test]
    fn test_first_tick_plays_kickoff() {
        let mut sim = short_match(1);
        let record = sim.tick().clone();
        assert_eq!(record.period, 0);
        assert_eq!(record.holder, Some(PlayerId(10)));
        assert_eq!(record.holder_action, ActionCode::Kickoff);
        assert_ne!(sim.world().ball.kind(), BallStateKind::Dead);
        assert_eq!(sim.period(), 1);
    }

    #[test]
    fn test_run_emits_one_record_per_period() {
        let mut sim = short_match(2);
        let total = sim.total_periods();
        let log = sim.run();
        assert_eq!(log.len(), total as usize);
        for (i, record) in log.periods.iter().enumerate() {
            assert_eq!(record.period, i as u32);
            assert_eq!(record.players.len(), 22);
        }
        assert!(sim.is_finished());
    }

    #[test]
    fn test_tick_increments_hash_changes() {
        let mut sim = short_match(3);
        let before = sim.state_hash();
        sim.tick();
        assert_ne!(before, sim.state_hash());
    }

    #[test]
    fn test_deterministic_hash() {
        let mut a = short_match(4);
        let mut b = short_match(4);
        for _ in 0..200 {
            a.tick();
            b.tick();
            assert_eq!(a.state_hash(), b.state_hash());
        }
        assert_eq!(a.log(), b.log());
    }

    #[test]
    fn test_frozen_holder_skips_turn() {
        let mut sim = short_match(6);
        let holder = PlayerId(10);
        sim.world_mut().players[holder.arena_index()].offense_freeze = 2;

        for _ in 0..2 {
            let record = sim.tick().clone();
            assert_eq!(record.holder, Some(holder));
            assert_eq!(record.holder_action, ActionCode::None);
            assert_eq!(sim.world().holder(), Some(holder));
            assert!(sim.world().pending.is_some());
            assert_eq!(sim.world().player(holder).unwrap().coordinate, CENTER);
        }
        assert_eq!(sim.world().player(holder).unwrap().offense_freeze, 0);

        let record = sim.tick().clone();
        assert_eq!(record.holder_action, ActionCode::Kickoff);
    }

    #[test]
    fn test_frozen_off_ball_player_stays_put() {
        let mut sim = short_match(7);
        let frozen = PlayerId(3);
        let parked = Coordinate::new(3, 3);
        let start = sim.world().player(frozen).unwrap().coordinate;
        {
            let player = &mut sim.world_mut().players[frozen.arena_index()];
            player.offense_freeze = 3;
            player.intent = parked;
        }

        sim.tick();
        let player = sim.world().player(frozen).unwrap();
        assert_eq!(player.intent, parked);
        assert_eq!(player.coordinate, start);
        assert_eq!(player.offense_freeze, 2);
    }

    #[test]
    fn test_zero_minutes_is_empty_match() {
        let mut sim = MatchSimulation::new(&MatchSetup::new("H", "A", 5).with_minutes(0)).unwrap();
        assert!(sim.run().is_empty());
        assert_eq!(sim.log().final_score(), (0, 0));
        assert_eq!(sim.world().ball.coordinate(), CENTER);
    }
}
