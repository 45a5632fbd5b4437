//! Passing.
//!
//! A pass is aimed at the receiver's intent cell and resolved in order:
//! overhit, interception (deflect or clean cut), stray, clean. Every
//! branch launches a flight; none of them hands the ball over directly.

use crate::ball::{ArrivalAction, FlightPlan};
use crate::components::{ActionCode, PlayerId};
use crate::config::{roll_range, roll_spread};
use crate::evaluator::{best_pass_target, evaluate_pass, roll_success};
use crate::pitch::{round_div, Coordinate};
use crate::world::TickContext;

/// How a pass left the passer's foot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassOutcome {
    /// Clean pass to the receiver.
    Completed,
    /// Struck too long past the receiver.
    Overhit,
    /// Missed the target by a few cells.
    Stray,
    /// Heading for an interceptor.
    Intercepted(PlayerId),
    /// Clipped by an opponent and redirected.
    Deflected(PlayerId),
}

/// Cells per tick for a pass ability.
#[must_use]
pub const fn pass_speed(pass: u8) -> u32 {
    1 + pass as u32 / 34
}

/// Stretch the line `from -> target` by `extra` cells along its dominant axis.
#[must_use]
pub fn overhit_target(from: Coordinate, target: Coordinate, extra: i32) -> Coordinate {
    let dx = target.x - from.x;
    let dy = target.y - from.y;
    let dominant = dx.abs().max(dy.abs()).max(1);
    let scale = dominant + extra;
    Coordinate::new(
        from.x + round_div(dx * scale, dominant),
        from.y + round_div(dy * scale, dominant),
    )
}

/// Pick the best visible teammate for `passer`.
pub fn find_receiver(ctx: &mut TickContext<'_>, passer: PlayerId) -> Option<PlayerId> {
    let player = ctx.world.player(passer)?;
    best_pass_target(
        player,
        &ctx.world.players,
        ctx.world.ball.coordinate(),
        ctx.config.positioning.vision_half_angle_deg,
        ctx.config.pass.target_sample_size,
        ctx.rng,
    )
}

/// Pass from `passer` to `receiver`. `None` if either id is unknown.
pub fn pass(ctx: &mut TickContext<'_>, passer: PlayerId, receiver: PlayerId) -> Option<PassOutcome> {
    let passer_player = ctx.world.player(passer)?;
    let receiver_player = ctx.world.player(receiver)?;
    let evaluation = evaluate_pass(passer_player, receiver_player, &ctx.world.players);
    let from = passer_player.coordinate;
    let side = passer_player.side;
    let ability = passer_player.status.pass;
    let aim = receiver_player.intent;

    let config = ctx.config;
    let cfg = &config.pass;
    let speed = pass_speed(ability);
    let base = FlightPlan::untargeted(aim, speed, side).kicked_by(passer);

    if let Some(player) = ctx.world.player_mut(passer) {
        player.clear_duel();
    }

    let (outcome, plan) = if roll_success(ctx.rng, cfg.overhit.falling(u32::from(ability))) {
        let extra = roll_range(ctx.rng, cfg.overhit_extra.0, cfg.overhit_extra.1);
        let plan = FlightPlan {
            target: overhit_target(from, aim, extra),
            intended_receiver: Some(receiver),
            ..base
        };
        (PassOutcome::Overhit, plan)
    } else if let Some(interceptor) = evaluation.interceptor {
        let interceptor_player = ctx.world.player(interceptor)?;
        let interceptor_at = interceptor_player.coordinate;
        let interceptor_side = interceptor_player.side;
        if roll_success(ctx.rng, cfg.deflect_prob) {
            let target = Coordinate::new(
                interceptor_at.x + roll_spread(ctx.rng, cfg.deflect_spread),
                interceptor_at.y + roll_spread(ctx.rng, cfg.deflect_spread),
            );
            let plan = FlightPlan {
                target,
                passer_team: interceptor_side,
                intended_receiver: Some(receiver),
                ..base
            };
            ctx.mark(interceptor, ActionCode::PassDeflect);
            ctx.log.set_involver(interceptor, ActionCode::PassDeflect);
            (PassOutcome::Deflected(interceptor), plan)
        } else {
            let plan = FlightPlan {
                target: evaluation.intercept_point,
                final_holder: Some(interceptor),
                intended_receiver: Some(receiver),
                arrival: ArrivalAction::Intercept,
                ..base
            };
            (PassOutcome::Intercepted(interceptor), plan)
        }
    } else if roll_success(ctx.rng, cfg.stray.falling(u32::from(ability))) {
        let max_error = (8 - i32::from(ability) / 20).clamp(cfg.stray_error.0, cfg.stray_error.1);
        let target = Coordinate::new(
            aim.x + roll_spread(ctx.rng, max_error),
            aim.y + roll_spread(ctx.rng, max_error),
        );
        let plan = FlightPlan {
            target,
            intended_receiver: Some(receiver),
            ..base
        };
        (PassOutcome::Stray, plan)
    } else {
        (PassOutcome::Completed, base.to_receiver(receiver))
    };

    let action = match outcome {
        PassOutcome::Completed => ActionCode::PassSuccess,
        _ => ActionCode::PassFail,
    };
    ctx.world.launch(from, plan);
    ctx.mark(passer, action);
    ctx.log.set_holder_action(action);

    tracing::trace!(?passer, ?receiver, ?outcome, target = %plan.target, "Pass");
    Some(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_speed() {
        assert_eq!(pass_speed(0), 1);
        assert_eq!(pass_speed(33), 1);
        assert_eq!(pass_speed(34), 2);
        assert_eq!(pass_speed(100), 3);
    }

    #[test]
    fn test_overhit_extends_along_line() {
        let from = Coordinate::new(30, 40);
        assert_eq!(overhit_target(from, Coordinate::new(30, 50), 10), Coordinate::new(30, 60));
        assert_eq!(overhit_target(from, Coordinate::new(20, 50), 8), Coordinate::new(12, 58));
        // Zero-length passes keep the origin.
        assert_eq!(overhit_target(from, from, 12), from);
    }
}
