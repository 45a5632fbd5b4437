//! The ball holder's turn: pick one action by priority and resolve it.

use crate::components::{ActionCode, HolderIntent, PlayerId};
use crate::evaluator::{enemy_in_central_vision, nearest_opponent, roll_success};
use crate::pitch::Coordinate;
use crate::world::{PendingKick, TickContext};

use super::clear::clear;
use super::dribble::{dribble, DribbleOutcome};
use super::kickoff::take_kickoff;
use super::pass::{find_receiver, pass, PassOutcome};
use super::shoot::{shoot, ShotOutcome};

/// What the holder did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HolderAction {
    /// Played the scripted kickoff pass.
    Kickoff,
    /// Took a penalty.
    Penalty(ShotOutcome),
    /// Shot from open play.
    Shot(ShotOutcome),
    /// Cleared the ball.
    Clear,
    /// Passed.
    Pass(PassOutcome),
    /// Dribbled or duelled.
    Dribble(DribbleOutcome),
    /// Could neither dribble nor pass.
    Kept,
}

/// Shooting range for a holder intent.
#[must_use]
pub const fn shot_range(intent: HolderIntent, close_range: i32, assertive_range: i32) -> i32 {
    match intent {
        HolderIntent::AssertiveShoot => assertive_range,
        _ => close_range,
    }
}

/// Whether `at` is within `range` of the goal line at `goal_y`.
#[must_use]
pub const fn in_shot_range(at: Coordinate, goal_y: i32, range: i32) -> bool {
    (at.y - goal_y).abs() <= range
}

/// Resolve the holder's turn.
///
/// Priority: running duel, pending penalty, pending kickoff, clearance
/// under pressure, shot, then pass and dribble in the order the holder
/// prefers. Goalkeepers never dribble or shoot.
pub fn take_turn(ctx: &mut TickContext<'_>, holder: PlayerId) -> HolderAction {
    let config = ctx.config;
    let Some(player) = ctx.world.player(holder) else {
        return HolderAction::Kept;
    };
    let in_duel = player.duel.is_some();

    if in_duel {
        if let Some(outcome) = dribble(ctx, holder) {
            return HolderAction::Dribble(outcome);
        }
    }

    match ctx.world.pending {
        Some(PendingKick::Penalty { kicker }) => {
            ctx.world.pending = None;
            if kicker == holder {
                let goal_y = holder.side().attacking_goal_y();
                if let Some(outcome) = shoot(ctx, holder, goal_y) {
                    return HolderAction::Penalty(outcome);
                }
            }
        }
        Some(PendingKick::Kickoff { passer, receiver }) => {
            ctx.world.pending = None;
            if passer == holder && take_kickoff(ctx, passer, receiver) {
                return HolderAction::Kickoff;
            }
        }
        None => {}
    }

    let Some(player) = ctx.world.player(holder) else {
        return HolderAction::Kept;
    };
    let at = player.coordinate;
    let side = player.side;
    let keeper = player.is_goalkeeper();
    let intent = player.holder_intent;
    let pass_ability = u32::from(player.status.pass);

    let pressed = nearest_opponent(&ctx.world.players, at, side)
        .is_some_and(|p| p.coordinate.distance(at) <= config.clear.pressure_radius);
    if side.in_defensive_third(at) && pressed && roll_success(ctx.rng, config.clear.under_pressure.falling(pass_ability)) {
        clear(ctx, holder);
        return HolderAction::Clear;
    }

    if !keeper {
        let goal_y = side.attacking_goal_y();
        let range = shot_range(intent, config.shot.close_range, config.shot.assertive_range);
        if in_shot_range(at, goal_y, range) && roll_success(ctx.rng, config.shot.close_range_select_prob) {
            let lane_blocked = ctx.world.player(holder).is_some_and(|p| {
                enemy_in_central_vision(p, &ctx.world.players, config.positioning.central_vision_half_angle_deg)
            });
            if !lane_blocked {
                if let Some(outcome) = shoot(ctx, holder, goal_y) {
                    return HolderAction::Shot(outcome);
                }
            }
        }
    }

    if keeper {
        if let Some(outcome) = try_pass(ctx, holder) {
            return HolderAction::Pass(outcome);
        }
        clear(ctx, holder);
        return HolderAction::Clear;
    }

    let pass_first = intent == HolderIntent::AssertivePass;
    if pass_first {
        if let Some(outcome) = try_pass(ctx, holder) {
            return HolderAction::Pass(outcome);
        }
    }
    if let Some(outcome) = dribble(ctx, holder) {
        return HolderAction::Dribble(outcome);
    }
    if !pass_first {
        if let Some(outcome) = try_pass(ctx, holder) {
            return HolderAction::Pass(outcome);
        }
    }

    ctx.mark(holder, ActionCode::None);
    tracing::trace!(?holder, "Holder kept the ball");
    HolderAction::Kept
}

fn try_pass(ctx: &mut TickContext<'_>, holder: PlayerId) -> Option<PassOutcome> {
    let receiver = find_receiver(ctx, holder)?;
    pass(ctx, holder, receiver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ball::BallStateKind;
    use crate::config::EngineConfig;
    use crate::data::MatchSetup;
    use crate::log::PeriodLog;
    use crate::world::MatchWorld;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn world(seed: u64) -> MatchWorld {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        MatchWorld::from_setup(&MatchSetup::new("H", "A", seed), &mut rng).unwrap()
    }

    #[test]
    fn test_shot_range_by_intent() {
        assert_eq!(shot_range(HolderIntent::Neutral, 16, 30), 16);
        assert_eq!(shot_range(HolderIntent::AssertiveShoot, 16, 30), 30);
    }

    #[test]
    fn test_shot_range_measured_from_goal_line() {
        // Wide of the posts but close to the line.
        assert!(in_shot_range(Coordinate::new(5, 90), 100, 16));
        assert!(in_shot_range(Coordinate::new(66, 14), 0, 16));
        assert!(!in_shot_range(Coordinate::new(35, 83), 100, 16));
        assert!(in_shot_range(Coordinate::new(35, 70), 100, 30));
    }

    #[test]
    fn test_pending_kickoff_fires_first() {
        let mut world = world(31);
        let config = EngineConfig::default();
        let mut rng = StepRng::new(0, 0);
        let mut log = PeriodLog::new(0);
        let mut ctx = TickContext::new(&mut world, &config, &mut rng, &mut log);

        assert_eq!(take_turn(&mut ctx, PlayerId(10)), HolderAction::Kickoff);
        assert!(ctx.world.pending.is_none());
        assert_eq!(ctx.world.ball.kind(), BallStateKind::Flying);
        assert_eq!(ctx.log.holder_action, ActionCode::Kickoff);
        let flight = ctx.world.ball.flight().unwrap();
        assert_eq!(flight.final_holder, Some(PlayerId(9)));
    }

    #[test]
    fn test_stale_pending_kick_is_dropped() {
        let mut world = world(32);
        world.give_ball(PlayerId(5));
        let config = EngineConfig::default();
        let mut rng = StepRng::new(0, 0);
        let mut log = PeriodLog::new(0);
        let mut ctx = TickContext::new(&mut world, &config, &mut rng, &mut log);

        let action = take_turn(&mut ctx, PlayerId(5));
        assert_ne!(action, HolderAction::Kickoff);
        assert!(ctx.world.pending.is_none());
    }

    #[test]
    fn test_won_duel_does_not_restart_against_same_opponent() {
        let mut world = world(35);
        world.pending = None;
        let holder = PlayerId(10);
        let opponent = PlayerId(105);
        world.players[holder.arena_index()].status.dribble = 100;
        world.players[opponent.arena_index()].status.defense = 0;
        world.place(opponent, Coordinate::new(35, 51));
        world.place(PlayerId(8), Coordinate::new(34, 51));
        world.place(PlayerId(9), Coordinate::new(36, 51));
        world.players[holder.arena_index()].start_duel(opponent, 1);
        world.players[opponent.arena_index()].start_duel(holder, 1);

        let config = EngineConfig::default();
        let mut rng = StepRng::new(0, 0);
        let mut log = PeriodLog::new(0);
        let mut ctx = TickContext::new(&mut world, &config, &mut rng, &mut log);

        assert_eq!(
            take_turn(&mut ctx, holder),
            HolderAction::Dribble(DribbleOutcome::Breakthrough(opponent))
        );
        assert!(ctx.world.player(opponent).unwrap().duel.is_none());
        assert_eq!(ctx.world.holder(), Some(holder));
    }

    #[test]
    fn test_keeper_without_target_clears() {
        let mut world = world(33);
        world.pending = None;
        let keeper = PlayerId(0);
        world.give_ball(keeper);
        // Everyone else behind the keeper's view.
        for i in 1..11 {
            world.place(PlayerId(i), Coordinate::new(30 + i as i32, 0));
        }
        let config = EngineConfig::default();
        let mut rng = StepRng::new(0, 0);
        let mut log = PeriodLog::new(0);
        let mut ctx = TickContext::new(&mut world, &config, &mut rng, &mut log);

        assert_eq!(take_turn(&mut ctx, keeper), HolderAction::Clear);
        assert_eq!(ctx.log.holder_action, ActionCode::Clear);
        assert!(ctx.world.ball.flight().unwrap().target.y > 100);
    }

    #[test]
    fn test_open_shot_in_range() {
        let mut world = world(34);
        world.pending = None;
        let striker = PlayerId(9);
        world.place(striker, Coordinate::new(35, 90));
        world.give_ball(striker);
        // Clear the lane.
        for i in 0..11 {
            world.place(PlayerId(100 + i), Coordinate::new(2 + i as i32, 60));
        }
        let config = EngineConfig::default();
        let mut rng = StepRng::new(0, 0);
        let mut log = PeriodLog::new(0);
        let mut ctx = TickContext::new(&mut world, &config, &mut rng, &mut log);

        assert_eq!(take_turn(&mut ctx, striker), HolderAction::Shot(ShotOutcome::Goal));
        assert_eq!(ctx.world.state.scores(), (1, 0));
        let goal = ctx.log.goal.unwrap();
        assert_eq!(goal.coordinate.y, 100);
        assert_eq!(goal.kickoff_player_index, PlayerId(110).arena_index());
    }
}
