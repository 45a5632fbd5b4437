//! Long clearances out of the defensive third.

use rand::RngCore;

use crate::ball::FlightPlan;
use crate::components::{ActionCode, PlayerId, TeamSide};
use crate::config::{roll_range, roll_spread, ClearConfig};
use crate::pitch::{Coordinate, MAX_Y};
use crate::world::TickContext;

/// Aim point for a clearance from `from`: a random spot past the goal line
/// `side` attacks.
pub fn clear_target(rng: &mut dyn RngCore, cfg: &ClearConfig, from: Coordinate, side: TeamSide) -> Coordinate {
    let x = from.x + roll_spread(rng, cfg.lateral_spread);
    let overshoot = roll_range(rng, cfg.overshoot.0, cfg.overshoot.1);
    let y = match side {
        TeamSide::Home => MAX_Y + 1 + overshoot,
        TeamSide::Away => -1 - overshoot,
    };
    Coordinate::new(x, y)
}

/// Cells per tick of a clearance.
#[must_use]
pub const fn clear_speed(speed: u8) -> u32 {
    2 + speed as u32 / 40
}

/// Boot the ball clear. Returns the aim point, or `None` for an unknown id.
pub fn clear(ctx: &mut TickContext<'_>, holder: PlayerId) -> Option<Coordinate> {
    let player = ctx.world.player(holder)?;
    let from = player.coordinate;
    let side = player.side;
    let speed = clear_speed(player.status.speed);

    let target = clear_target(ctx.rng, &ctx.config.clear, from, side);
    if let Some(player) = ctx.world.player_mut(holder) {
        player.clear_duel();
    }
    ctx.world
        .launch(from, FlightPlan::untargeted(target, speed, side).kicked_by(holder));
    ctx.mark(holder, ActionCode::Clear);
    ctx.log.set_holder_action(ActionCode::Clear);

    tracing::trace!(?holder, %target, speed, "Clearance");
    Some(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_clear_target_is_past_the_attacked_line() {
        let mut rng = StepRng::new(0, 0);
        let cfg = ClearConfig::default();
        let home = clear_target(&mut rng, &cfg, Coordinate::new(30, 20), TeamSide::Home);
        assert_eq!(home, Coordinate::new(10, 105));
        let away = clear_target(&mut rng, &cfg, Coordinate::new(30, 80), TeamSide::Away);
        assert_eq!(away, Coordinate::new(10, -5));
        assert!(home.is_out_of_pitch() && away.is_out_of_pitch());
    }

    #[test]
    fn test_clear_speed() {
        assert_eq!(clear_speed(0), 2);
        assert_eq!(clear_speed(40), 3);
        assert_eq!(clear_speed(100), 4);
    }
}
