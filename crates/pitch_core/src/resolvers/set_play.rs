//! Set-piece restarts: throw-ins, corners, goal kicks, free kicks and
//! penalties.
//!
//! Every restart clears all ball and duel flags, hands the ball to exactly
//! one taker and resynchronises the possession tracker so the restart
//! itself never triggers a transition freeze.

use serde::{Deserialize, Serialize};

use crate::components::{ActionCode, PlayerId, TeamSide};
use crate::evaluator::nearest_of_side;
use crate::pitch::{Coordinate, MAX_X, MAX_Y};
use crate::team::Team;
use crate::world::{PendingKick, TickContext, KICKOFF_RECEIVER_INDEX};

/// Penalty spot distance from the goal line.
const PENALTY_SPOT_DEPTH: i32 = 11;

/// Goal kick distance from the goal line.
const GOAL_KICK_DEPTH: i32 = 5;

/// How a dead ball is brought back into play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Restart {
    /// Ball crossed a touchline.
    ThrowIn {
        /// Side taking it.
        side: TeamSide,
        /// Spot on the touchline.
        at: Coordinate,
    },
    /// Ball crossed a goal line off a defender.
    CornerKick {
        /// Side taking it.
        side: TeamSide,
        /// Corner flag.
        at: Coordinate,
    },
    /// Ball crossed a goal line off an attacker.
    GoalKick {
        /// Side taking it.
        side: TeamSide,
    },
}

impl Restart {
    /// Log code for this restart.
    #[must_use]
    pub const fn action(&self) -> ActionCode {
        match self {
            Self::ThrowIn { .. } => ActionCode::ThrowIn,
            Self::CornerKick { .. } => ActionCode::CornerKick,
            Self::GoalKick { .. } => ActionCode::GoalKick,
        }
    }
}

/// Classify a ball that left the pitch at `exit`.
///
/// Touchline exits win over goal-line exits. With no recorded touch a
/// throw-in goes to the home side and a goal-line exit is a goal kick.
#[must_use]
pub fn classify_exit(exit: Coordinate, last_touch: Option<TeamSide>) -> Restart {
    if exit.x < 0 || exit.x > MAX_X {
        let side = last_touch.map_or(TeamSide::Home, TeamSide::opponent);
        let x = if exit.x < 0 { 0 } else { MAX_X };
        return Restart::ThrowIn {
            side,
            at: Coordinate::new(x, exit.y.clamp(0, MAX_Y)),
        };
    }

    let defending = if exit.y < 0 { TeamSide::Home } else { TeamSide::Away };
    if last_touch == Some(defending) {
        let x = if exit.x <= MAX_X / 2 { 0 } else { MAX_X };
        let y = if exit.y < 0 { 0 } else { MAX_Y };
        Restart::CornerKick {
            side: defending.opponent(),
            at: Coordinate::new(x, y),
        }
    } else {
        Restart::GoalKick { side: defending }
    }
}

/// Whether `at` lies in the box `attacking` is shooting at.
#[must_use]
pub const fn in_attacking_box(at: Coordinate, attacking: TeamSide) -> bool {
    attacking.opponent().own_box_contains(at)
}

/// Restart play after the ball left the pitch at `exit`.
pub fn restart_from_exit(ctx: &mut TickContext<'_>, exit: Coordinate, last_touch: TeamSide) -> Restart {
    let restart = classify_exit(exit, Some(last_touch));
    match restart {
        Restart::ThrowIn { side, at } => {
            if let Some(taker) = nearest_taker(ctx, at, side) {
                award(ctx, taker, at, ActionCode::ThrowIn);
            }
        }
        Restart::CornerKick { side, at } => corner_kick(ctx, side, at),
        Restart::GoalKick { side } => {
            let keeper = ctx.world.team(side).goalkeeper();
            let depth = side.forward() * GOAL_KICK_DEPTH;
            let at = Coordinate::new(MAX_X / 2, side.own_goal_y() + depth);
            award(ctx, keeper, at, ActionCode::GoalKick);
        }
    }
    tracing::debug!(?restart, %exit, "Ball out of play");
    restart
}

/// Award a foul against `fouler` at `at` in favour of `fouled_side`.
///
/// Fouls inside the box the fouled side attacks become penalties; the
/// kick itself is taken on the kicker's next held tick.
pub fn award_foul(
    ctx: &mut TickContext<'_>,
    fouled_side: TeamSide,
    fouler: PlayerId,
    at: Coordinate,
    hand: bool,
) -> ActionCode {
    let code = if hand { ActionCode::Hand } else { ActionCode::Foul };
    ctx.log.set_holder_action(code);
    ctx.mark(fouler, code);

    if in_attacking_box(at, fouled_side) {
        penalty_kick(ctx, fouled_side);
        tracing::debug!(%fouled_side, %at, hand, "Penalty awarded");
        return ActionCode::PenaltyKick;
    }

    let spot = at.clamped();
    if let Some(taker) = nearest_taker(ctx, spot, fouled_side) {
        award(ctx, taker, spot, ActionCode::FreeKick);
    }
    tracing::debug!(%fouled_side, %spot, hand, "Free kick awarded");
    ActionCode::FreeKick
}

fn penalty_kick(ctx: &mut TickContext<'_>, attacking: TeamSide) {
    let defending = attacking.opponent();
    let goal_y = attacking.attacking_goal_y();
    let spot = Coordinate::new(MAX_X / 2, goal_y - attacking.forward() * PENALTY_SPOT_DEPTH);

    let kicker = PlayerId::new(attacking, KICKOFF_RECEIVER_INDEX);
    award(ctx, kicker, spot, ActionCode::PenaltyKick);

    let keeper = ctx.world.team(defending).goalkeeper();
    ctx.world.place(keeper, Coordinate::new(MAX_X / 2, goal_y));
    ctx.world.pending = Some(PendingKick::Penalty { kicker });
}

fn corner_kick(ctx: &mut TickContext<'_>, side: TeamSide, at: Coordinate) {
    let Some(kicker) = nearest_taker(ctx, at, side) else {
        return;
    };
    let left = at.x <= MAX_X / 2;
    let toward_high_y = side.attacking_goal_y() == MAX_Y;

    let spots = |team: &Team, attacking: bool| -> Vec<(PlayerId, Coordinate)> {
        team.player_ids()
            .iter()
            .enumerate()
            .filter(|&(_, &id)| id != kicker)
            .filter_map(|(i, &id)| {
                let anchor = team.corner_anchor(i, attacking)?;
                Some((id, corner_transform(anchor, left, toward_high_y)))
            })
            .collect()
    };

    let defending = side.opponent();
    let attack_spots = spots(ctx.world.team(side), true);
    let mut defend_spots = spots(ctx.world.team(defending), false);
    let keeper_y = defending.own_goal_y() + defending.forward();
    let keeper_x = if left { MAX_X / 2 - 3 } else { MAX_X / 2 + 3 };
    defend_spots.push((ctx.world.team(defending).goalkeeper(), Coordinate::new(keeper_x, keeper_y)));

    for (id, spot) in attack_spots.into_iter().chain(defend_spots) {
        ctx.world.place(id, spot);
    }
    award(ctx, kicker, at, ActionCode::CornerKick);
}

/// Map a corner anchor (left corner, goal at `y = 100`) onto the actual
/// corner and attacking direction.
#[must_use]
pub fn corner_transform(anchor: Coordinate, left: bool, toward_high_y: bool) -> Coordinate {
    let mut c = anchor;
    if !left {
        c = c.mirrored_x();
    }
    if !toward_high_y {
        c = c.mirrored_y();
    }
    c.clamped()
}

fn nearest_taker(ctx: &TickContext<'_>, at: Coordinate, side: TeamSide) -> Option<PlayerId> {
    nearest_of_side(&ctx.world.players, at, side).map(|p| p.id)
}

/// Hand the ball to `taker` on `at` and log the restart.
pub(crate) fn award(ctx: &mut TickContext<'_>, taker: PlayerId, at: Coordinate, action: ActionCode) {
    ctx.world.reset_for_restart();
    ctx.world.give_ball_at(taker, at);
    ctx.world.state.sync_restart(taker, taker.side());
    ctx.world.pending = None;
    ctx.mark(taker, action);
    ctx.log.set_involver(taker, action);
}
