//! Dribbling and the multi-tick duel.
//!
//! A dribbler who comes within the contest radius of an opponent is held
//! up in a duel for a few ticks while shielding the ball. When the timer
//! runs out the duel is decided by ability plus a random roll: the
//! dribbler breaks through, or loses the ball to a foul, a spill or a
//! clean tackle.

use rand::seq::SliceRandom;
use rand::RngCore;

use crate::components::{ActionCode, Duel, PlayerId};
use crate::config::{roll_range, roll_spread, DuelConfig};
use crate::evaluator::{best_dribble_cell, nearest_opponent, roll_success};
use crate::pitch::Coordinate;
use crate::world::TickContext;

use super::set_play::award_foul;
use super::shoot::loose_or_restart;

/// What a dribble attempt did this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DribbleOutcome {
    /// Still in a duel; the ball is shielded.
    Shielded,
    /// A new duel started against this opponent.
    DuelStarted(PlayerId),
    /// Moved one cell with the ball.
    Advanced,
    /// Won a duel against this opponent and moved on.
    Breakthrough(PlayerId),
    /// Lost a duel and the ball to a clean tackle.
    Tackled(PlayerId),
    /// Lost a duel and the ball ran loose.
    Spilled(PlayerId),
    /// Brought down by this opponent.
    Fouled(PlayerId),
}

impl DribbleOutcome {
    /// Whether the dribbler still has the ball.
    #[must_use]
    pub const fn kept_ball(self) -> bool {
        matches!(
            self,
            Self::Shielded | Self::DuelStarted(_) | Self::Advanced | Self::Breakthrough(_)
        )
    }
}

/// Where the ball runs after a lost duel: away from the tackler by a few
/// cells with a little jitter. A zero axis picks a random direction.
pub fn spill_coordinate(
    rng: &mut dyn RngCore,
    cfg: &DuelConfig,
    dribbler: Coordinate,
    tackler: Coordinate,
) -> Coordinate {
    let mut axis = |delta: i32| {
        let sign = match delta.signum() {
            0 => [-1, 0, 1].choose(rng).copied().unwrap_or(0),
            s => s,
        };
        let dist = roll_range(rng, cfg.spill_distance.0, cfg.spill_distance.1);
        sign * dist + roll_spread(rng, 1)
    };
    let dx = axis(dribbler.x - tackler.x);
    let dy = axis(dribbler.y - tackler.y);
    dribbler.offset(dx, dy)
}

/// Dribble with `holder`. Returns `None` when there is no free cell to
/// dribble into and no duel to continue or finish; the holder keeps the
/// ball.
pub fn dribble(ctx: &mut TickContext<'_>, holder: PlayerId) -> Option<DribbleOutcome> {
    let config = ctx.config;
    let cfg = &config.duel;
    let player = ctx.world.player(holder)?;
    let side = player.side;
    let mut won_against = None;

    if let Some(duel) = player.duel {
        let remaining = duel.remaining.saturating_sub(1);
        if remaining > 0 {
            if let Some(p) = ctx.world.player_mut(holder) {
                p.duel = Some(Duel { remaining, ..duel });
            }
            ctx.mark(holder, ActionCode::DribbleSuccess);
            ctx.log.set_holder_action(ActionCode::DribbleSuccess);
            return Some(DribbleOutcome::Shielded);
        }

        if let Some(p) = ctx.world.player_mut(holder) {
            p.clear_duel();
        }
        if let Some(p) = ctx.world.player_mut(duel.opponent) {
            p.clear_duel();
        }
        match resolve_duel(ctx, holder, duel.opponent) {
            Some(lost) => return Some(lost),
            None => won_against = Some(duel.opponent),
        }
    }

    let player = ctx.world.player(holder)?;
    let origin = player.coordinate;
    let cell = best_dribble_cell(player, &ctx.world.players, config.positioning.vision_half_angle_deg);
    let contender = nearest_opponent(&ctx.world.players, origin, side)
        .filter(|p| p.coordinate.distance(origin) <= cfg.contest_radius)
        .map(|p| p.id);

    if let Some(opponent) = contender.filter(|_| won_against.is_none()) {
        let ticks = roll_range(ctx.rng, cfg.duration.0, cfg.duration.1).max(1) as u32;
        if let Some(p) = ctx.world.player_mut(holder) {
            p.start_duel(opponent, ticks);
        }
        if let Some(p) = ctx.world.player_mut(opponent) {
            p.start_duel(holder, ticks);
        }
        ctx.mark(holder, ActionCode::DribbleSuccess);
        ctx.log.set_holder_action(ActionCode::DribbleSuccess);
        tracing::trace!(?holder, ?opponent, ticks, "Duel started");
        return Some(DribbleOutcome::DuelStarted(opponent));
    }

    // A won duel counts as a breakthrough even when the holder is boxed in.
    if cell.is_none() && won_against.is_none() {
        return None;
    }
    if let Some(cell) = cell {
        if let Some(p) = ctx.world.player_mut(holder) {
            p.coordinate = cell;
            p.intent = cell;
        }
        ctx.world.ball.follow_holder(cell);
    }
    ctx.mark(holder, ActionCode::DribbleSuccess);
    ctx.log.set_holder_action(ActionCode::DribbleSuccess);

    match won_against {
        Some(opponent) => {
            ctx.log.set_involver(opponent, ActionCode::DribbleBreakthrough);
            Some(DribbleOutcome::Breakthrough(opponent))
        }
        None => Some(DribbleOutcome::Advanced),
    }
}

/// Decide a finished duel. `None` means the dribbler won.
fn resolve_duel(ctx: &mut TickContext<'_>, holder: PlayerId, opponent: PlayerId) -> Option<DribbleOutcome> {
    let config = ctx.config;
    let cfg = &config.duel;
    let dribbler = ctx.world.player(holder)?;
    let tackler = ctx.world.player(opponent)?;
    let (dribbler_at, tackler_at) = (dribbler.coordinate, tackler.coordinate);
    let side = dribbler.side;
    let defense = u32::from(tackler.status.defense);

    let dribble_score = i32::from(dribbler.status.dribble) + roll_range(ctx.rng, 0, cfg.score_roll);
    let defense_score = i32::from(tackler.status.defense) + roll_range(ctx.rng, 0, cfg.score_roll);
    if dribble_score > defense_score {
        tracing::trace!(?holder, ?opponent, dribble_score, defense_score, "Duel won");
        return None;
    }

    ctx.mark(holder, ActionCode::DribbleFail);
    ctx.log.set_holder_action(ActionCode::DribbleFail);

    if roll_success(ctx.rng, cfg.foul.falling(defense)) {
        award_foul(ctx, side, opponent, dribbler_at, false);
        return Some(DribbleOutcome::Fouled(opponent));
    }

    let gap = f64::from(defense_score - dribble_score);
    if roll_success(ctx.rng, cfg.spill.clamp(0.2 + gap / cfg.spill_gap_scale)) {
        ctx.mark(opponent, ActionCode::DribbleSpill);
        ctx.log.set_involver(opponent, ActionCode::DribbleSpill);
        let at = spill_coordinate(ctx.rng, cfg, dribbler_at, tackler_at);
        loose_or_restart(ctx, at, opponent.side());
        return Some(DribbleOutcome::Spilled(opponent));
    }

    ctx.world.place(opponent, dribbler_at);
    ctx.world.give_ball(opponent);
    ctx.mark(opponent, ActionCode::Tackle);
    ctx.log.set_involver(opponent, ActionCode::Tackle);
    tracing::trace!(?holder, ?opponent, "Tackled");
    Some(DribbleOutcome::Tackled(opponent))
}
