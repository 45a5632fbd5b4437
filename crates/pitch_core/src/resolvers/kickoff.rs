//! Kickoffs and the post-goal reset.

use crate::ball::FlightPlan;
use crate::components::{ActionCode, PlayerId, TeamSide};
use crate::world::{TickContext, KICKOFF_PASSER_INDEX};

/// Play the scripted first pass from `passer` to `receiver`.
///
/// Returns `false` if either player is missing, leaving the ball with
/// the passer for the normal holder turn.
pub fn take_kickoff(ctx: &mut TickContext<'_>, passer: PlayerId, receiver: PlayerId) -> bool {
    let (Some(from), Some(target)) = (
        ctx.world.player(passer).map(|p| p.coordinate),
        ctx.world.player(receiver).map(|p| p.coordinate),
    ) else {
        return false;
    };

    if let Some(player) = ctx.world.player_mut(passer) {
        player.clear_duel();
    }
    let plan = FlightPlan::untargeted(target, ctx.config.pass.kickoff_speed, passer.side())
        .kicked_by(passer)
        .to_receiver(receiver);
    ctx.world.launch(from, plan);

    ctx.mark(passer, ActionCode::Kickoff);
    ctx.log.set_holder_action(ActionCode::Kickoff);
    true
}

/// Send everyone back to their kickoff positions and give the kickoff to
/// `conceding`. Returns the arena index of the kickoff passer.
pub fn reset_after_goal(ctx: &mut TickContext<'_>, conceding: TeamSide) -> usize {
    ctx.world.reset_to_formation();
    ctx.world.setup_kickoff(conceding);
    PlayerId::new(conceding, KICKOFF_PASSER_INDEX).arena_index()
}
