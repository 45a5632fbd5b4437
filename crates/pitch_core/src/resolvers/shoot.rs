//! Shooting, blocks and goalkeeper saves.

use crate::components::{ActionCode, PlayerId, TeamSide};
use crate::config::roll_spread;
use crate::evaluator::{roll_success, shoot_success_prob};
use crate::log::GoalRecord;
use crate::pitch::{Coordinate, MAX_X};
use crate::world::TickContext;

use super::kickoff::reset_after_goal;
use super::set_play::{award_foul, restart_from_exit};

/// How a shot ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShotOutcome {
    /// In the net.
    Goal,
    /// Blocked by an outfield player and deflected.
    Blocked(PlayerId),
    /// Blocked with a hand.
    Handball(PlayerId),
    /// Held by the keeper.
    Caught(PlayerId),
    /// Pushed away by the keeper.
    Parried(PlayerId),
}

/// Opponent best placed to block a shot from `shooter`: between shooter
/// and goal, within the configured lateral and depth gaps, nearest first.
#[must_use]
pub fn find_blocker(ctx: &TickContext<'_>, shooter: PlayerId) -> Option<PlayerId> {
    let shooter = ctx.world.player(shooter)?;
    let origin = shooter.coordinate;
    let goal_y = shooter.side.attacking_goal_y();
    let cfg = &ctx.config.shot;

    let mut best: Option<(i32, PlayerId)> = None;
    for player in ctx.world.players.iter().filter(|p| p.side != shooter.side) {
        let at = player.coordinate;
        if (at.y - origin.y).abs() > cfg.block_depth || (at.x - origin.x).abs() > cfg.block_lateral {
            continue;
        }
        let between = match shooter.side {
            TeamSide::Home => at.y >= origin.y && at.y <= goal_y,
            TeamSide::Away => at.y <= origin.y && at.y >= goal_y,
        };
        if !between {
            continue;
        }
        let dist = at.distance(origin);
        if best.is_none_or(|(d, _)| dist < d) {
            best = Some((dist, player.id));
        }
    }
    best.map(|(_, id)| id)
}

/// Shoot at the goal on `goal_y`. `None` if the shooter is unknown.
pub fn shoot(ctx: &mut TickContext<'_>, shooter: PlayerId, goal_y: i32) -> Option<ShotOutcome> {
    let config = ctx.config;
    let cfg = &config.shot;
    let shooter_player = ctx.world.player(shooter)?;
    let origin = shooter_player.coordinate;
    let side = shooter_player.side;
    let success = shoot_success_prob(shooter_player, goal_y);

    if let Some(player) = ctx.world.player_mut(shooter) {
        player.clear_duel();
    }

    if let Some(blocker) = find_blocker(ctx, shooter) {
        let blocker_player = ctx.world.player(blocker)?;
        let defense = u32::from(blocker_player.status.defense);
        let keeper = blocker_player.is_goalkeeper();
        if roll_success(ctx.rng, cfg.block.rising(defense)) {
            let hand_prob = if keeper { 0.0 } else { config.pass.handball.falling(defense) };
            if roll_success(ctx.rng, hand_prob) {
                award_foul(ctx, side, blocker, origin, true);
                return Some(ShotOutcome::Handball(blocker));
            }

            ctx.mark(shooter, ActionCode::ShootFail);
            ctx.log.set_holder_action(ActionCode::ShootFail);
            ctx.mark(blocker, ActionCode::ShootBlock);
            ctx.log.set_involver(blocker, ActionCode::ShootBlock);

            let deflect = Coordinate::new(
                origin.x + roll_spread(ctx.rng, cfg.block_deflect_spread),
                origin.y + roll_spread(ctx.rng, cfg.block_deflect_spread),
            );
            loose_or_restart(ctx, deflect, blocker.side());
            return Some(ShotOutcome::Blocked(blocker));
        }
    }

    if roll_success(ctx.rng, success) {
        score_goal(ctx, shooter, side, goal_y);
        return Some(ShotOutcome::Goal);
    }

    ctx.mark(shooter, ActionCode::ShootFail);
    ctx.log.set_holder_action(ActionCode::ShootFail);

    let keeper = ctx.world.team(side.opponent()).goalkeeper();
    let keeper_player = ctx.world.player(keeper)?;
    let keeper_at = keeper_player.coordinate;
    let catch = cfg.keeper_catch.rising(u32::from(keeper_player.status.defense));

    if roll_success(ctx.rng, catch) {
        ctx.mark(keeper, ActionCode::ShootCatch);
        ctx.log.set_involver(keeper, ActionCode::ShootCatch);
        ctx.world.give_ball(keeper);
        tracing::trace!(?shooter, ?keeper, "Shot caught");
        return Some(ShotOutcome::Caught(keeper));
    }

    ctx.mark(keeper, ActionCode::ShootParry);
    ctx.log.set_involver(keeper, ActionCode::ShootParry);
    let parry = Coordinate::new(
        keeper_at.x + roll_spread(ctx.rng, cfg.parry_spread.0),
        keeper_at.y + roll_spread(ctx.rng, cfg.parry_spread.1),
    );
    loose_or_restart(ctx, parry, keeper.side());
    tracing::trace!(?shooter, ?keeper, %parry, "Shot parried");
    Some(ShotOutcome::Parried(keeper))
}

fn score_goal(ctx: &mut TickContext<'_>, shooter: PlayerId, side: TeamSide, goal_y: i32) {
    ctx.mark(shooter, ActionCode::ShootSuccess);
    ctx.log.set_holder_action(ActionCode::ShootSuccess);
    ctx.log.involver = None;
    ctx.log.involver_action = ActionCode::None;
    ctx.world.state.record_goal(side);

    // Snapshot the scene before everyone walks back.
    ctx.log.capture(&ctx.world.players, &ctx.world.ball, &ctx.world.state);

    let kickoff_player_index = reset_after_goal(ctx, side.opponent());
    ctx.log.goal = Some(GoalRecord {
        side,
        scorer: shooter,
        coordinate: Coordinate::new(MAX_X / 2, goal_y),
        kickoff_player_index,
    });

    let (home, away) = ctx.world.state.scores();
    tracing::debug!(%side, ?shooter, home, away, "Goal");
}

/// Leave the ball loose at `at`, or restart if `at` is off the pitch.
pub(crate) fn loose_or_restart(ctx: &mut TickContext<'_>, at: Coordinate, touch: TeamSide) {
    if at.is_out_of_pitch() {
        restart_from_exit(ctx, at, touch);
    } else {
        ctx.world.release_loose(at, touch);
    }
}
