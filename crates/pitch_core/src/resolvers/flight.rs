//! Ball flight, touches, the arrival contest and loose-ball pickup.
//!
//! A flight advances up to its speed in path cells per tick. After each
//! cell the ball may leave the pitch (restart) or come within touch
//! radius of a player (touch). A flight that reaches the end of its path
//! untouched is contested by everyone near the arrival cell; with no
//! contestants the ball is left loose.

use rand::seq::SliceRandom;
use rand::RngCore;

use crate::ball::{BallState, BallStateKind};
use crate::components::{ActionCode, Player, PlayerId, TeamSide};
use crate::config::{roll_range, roll_spread, FlightConfig};
use crate::evaluator::{nearest_of_side, roll_success};
use crate::pitch::Coordinate;
use crate::vision::approach_in_view;
use crate::world::{MatchWorld, TickContext};

use super::pass::{find_receiver, pass, PassOutcome};
use super::set_play::{award_foul, restart_from_exit};
use super::shoot::loose_or_restart;

/// The parts of a flight a touch needs, copied out of the ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightTouch {
    /// Where the flight started.
    pub origin: Coordinate,
    /// Team credited with the strike.
    pub passer_team: TeamSide,
    /// Player who struck the ball.
    pub kicker: Option<PlayerId>,
    /// Designated final holder.
    pub final_holder: Option<PlayerId>,
    /// Designated intended receiver.
    pub intended_receiver: Option<PlayerId>,
}

impl FlightTouch {
    fn of(ball_state: &BallState) -> Option<Self> {
        match ball_state {
            BallState::Flying(flight) => Some(Self {
                origin: flight.origin,
                passer_team: flight.passer_team,
                kicker: flight.kicker,
                final_holder: flight.final_holder,
                intended_receiver: flight.intended_receiver,
            }),
            _ => None,
        }
    }
}

/// How a touch on a moving ball ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchOutcome {
    /// A teammate controlled it.
    Received,
    /// A teammate controlled it and passed first time.
    OneTouchPass(PlayerId),
    /// A teammate failed to control it.
    TrapMiss,
    /// An opponent won it.
    Intercepted,
    /// An opponent handled it.
    Handball,
}

/// Point the chasers toward a moving or loose ball.
///
/// For a flight, the designated final holder and the nearest opponent of
/// the passing side run to the target. For a loose ball the nearest player
/// of each side runs to the ball.
pub fn assign_chase_intents(world: &mut MatchWorld) {
    let ball_at = world.ball.coordinate();
    let mut chasers: Vec<(PlayerId, Coordinate)> = Vec::new();

    match world.ball.state() {
        BallState::Flying(flight) => {
            let target = flight.target.clamped();
            if let Some(holder) = flight.final_holder {
                chasers.push((holder, target));
            }
            if let Some(p) = nearest_of_side(&world.players, target, flight.passer_team.opponent()) {
                chasers.push((p.id, target));
            }
        }
        BallState::Loose => {
            for side in [TeamSide::Home, TeamSide::Away] {
                if let Some(p) = nearest_of_side(&world.players, ball_at, side) {
                    chasers.push((p.id, ball_at.clamped()));
                }
            }
        }
        BallState::Held { .. } | BallState::Dead => {}
    }

    for (id, target) in chasers {
        if let Some(player) = world.player_mut(id) {
            player.intent = target;
        }
    }
}

/// Move a flying or loose ball on by one tick.
pub fn process_ball(ctx: &mut TickContext<'_>) {
    match ctx.world.ball.kind() {
        BallStateKind::Flying => process_flight(ctx),
        BallStateKind::Loose => {
            process_loose_ball(ctx);
        }
        BallStateKind::Held | BallStateKind::Dead => {}
    }
}

/// Contest score of `player` for a ball on `at`.
pub fn touch_score(
    rng: &mut dyn RngCore,
    cfg: &FlightConfig,
    player: &Player,
    at: Coordinate,
    touch: &FlightTouch,
) -> i32 {
    let mut score = cfg.score_base - cfg.score_distance_penalty * player.coordinate.distance(at)
        + i32::from(player.status.speed)
        + i32::from(player.status.defense)
        + roll_range(rng, 0, cfg.score_random_range);
    if touch.final_holder == Some(player.id) {
        score += cfg.final_holder_bonus;
    }
    if touch.intended_receiver == Some(player.id) {
        score += cfg.intended_receiver_bonus;
    }
    score
}

/// Highest-scoring player within `radius` of `at`, skipping `exclude`.
/// Ties keep the earlier player.
fn best_contender(
    ctx: &mut TickContext<'_>,
    at: Coordinate,
    radius: i32,
    exclude: Option<PlayerId>,
    touch: &FlightTouch,
) -> Option<PlayerId> {
    let cfg = &ctx.config.flight;
    let mut best: Option<(i32, PlayerId)> = None;
    for player in ctx.world.players.iter() {
        if Some(player.id) == exclude || player.coordinate.distance(at) > radius {
            continue;
        }
        let score = touch_score(ctx.rng, cfg, player, at, touch);
        if best.is_none_or(|(s, _)| score > s) {
            best = Some((score, player.id));
        }
    }
    best.map(|(_, id)| id)
}

/// Advance the flight and resolve touches, exits and the arrival.
pub fn process_flight(ctx: &mut TickContext<'_>) {
    let Some(touch) = FlightTouch::of(ctx.world.ball.state()) else {
        return;
    };
    let cells = ctx.world.ball.flight().map_or(1, |f| f.cells_per_period);
    let touch_radius = ctx.config.flight.touch_radius;

    for _ in 0..cells {
        let at_end = ctx.world.ball.advance_flight_one_cell();
        let at = ctx.world.ball.coordinate();
        if at.is_out_of_pitch() {
            let last = ctx.world.ball.last_touch().unwrap_or(touch.passer_team);
            restart_from_exit(ctx, at, last);
            return;
        }
        if let Some(toucher) = best_contender(ctx, at, touch_radius, touch.kicker, &touch) {
            resolve_touch(ctx, toucher, &touch);
            return;
        }
        if at_end {
            break;
        }
    }

    ctx.world.ball.tick_flight();
    if !ctx.world.ball.flight().is_some_and(|f| f.at_end()) {
        return;
    }

    let at = ctx.world.ball.coordinate();
    let radius = ctx.config.flight.arrival_compete_radius;
    match best_contender(ctx, at, radius, None, &touch) {
        Some(winner) => {
            resolve_touch(ctx, winner, &touch);
        }
        None => {
            ctx.world.ball.end_flight_as_loose();
            tracing::trace!(%at, "Flight ended loose");
        }
    }
}

/// `toucher` meets the ball on its current cell.
pub fn resolve_touch(ctx: &mut TickContext<'_>, toucher: PlayerId, touch: &FlightTouch) -> TouchOutcome {
    let config = ctx.config;
    let at = ctx.world.ball.coordinate();
    ctx.world.place(toucher, at);
    if let Some(player) = ctx.world.player_mut(toucher) {
        player.clear_duel();
    }
    let Some(player) = ctx.world.player(toucher) else {
        return TouchOutcome::TrapMiss;
    };
    let side = player.side;

    if side == touch.passer_team {
        let first_touch = (u32::from(player.status.pass) + u32::from(player.status.dribble)) / 2;
        let blind = !approach_in_view(player, touch.origin, config.positioning.vision_half_angle_deg);
        let bonus = if blind { config.pass.trap_miss_out_of_view_bonus } else { 0.0 };
        let miss = config.pass.trap_miss.clamp(config.pass.trap_miss.falling(first_touch) + bonus);
        let one_touch = config.pass.one_touch.rising(u32::from(player.status.pass));

        if roll_success(ctx.rng, miss) {
            ctx.mark(toucher, ActionCode::TrapMiss);
            ctx.log.set_involver(toucher, ActionCode::TrapMiss);
            let (sx, sy) = config.pass.trap_miss_spread;
            let spot = at.offset(roll_spread(ctx.rng, sx), roll_spread(ctx.rng, sy));
            loose_or_restart(ctx, spot, side);
            return TouchOutcome::TrapMiss;
        }

        ctx.world.give_ball(toucher);
        ctx.mark(toucher, ActionCode::Receive);
        ctx.log.set_involver(toucher, ActionCode::Receive);

        // First-time passes run the same overhit, cut and stray checks.
        if roll_success(ctx.rng, one_touch) {
            if let Some(target) = find_receiver(ctx, toucher) {
                if let Some(outcome) = pass(ctx, toucher, target) {
                    if !matches!(outcome, PassOutcome::Deflected(_)) {
                        ctx.log.set_involver(toucher, ActionCode::OneTouchPass);
                    }
                    ctx.mark(toucher, ActionCode::OneTouchPass);
                    tracing::trace!(?toucher, ?target, ?outcome, "One-touch pass");
                    return TouchOutcome::OneTouchPass(target);
                }
            }
        }
        return TouchOutcome::Received;
    }

    let keeper_in_box = player.is_goalkeeper() && side.own_box_contains(at);
    let handball = if keeper_in_box {
        0.0
    } else {
        config.pass.handball.falling(u32::from(player.status.defense))
    };
    if roll_success(ctx.rng, handball) {
        award_foul(ctx, touch.passer_team, toucher, at, true);
        return TouchOutcome::Handball;
    }

    ctx.world.give_ball(toucher);
    ctx.mark(toucher, ActionCode::Intercept);
    ctx.log.set_involver(toucher, ActionCode::Intercept);
    tracing::trace!(?toucher, %at, "Intercepted");
    TouchOutcome::Intercepted
}

/// Pick up a loose ball, or restart if it lies off the pitch.
///
/// The nearest player inside the touch radius wins; equally near players
/// are separated by a random draw.
pub fn process_loose_ball(ctx: &mut TickContext<'_>) -> Option<PlayerId> {
    let at = ctx.world.ball.coordinate();
    if at.is_out_of_pitch() {
        let last = ctx
            .world
            .ball
            .last_touch()
            .unwrap_or(ctx.world.state.attacking_side());
        restart_from_exit(ctx, at, last);
        return None;
    }

    let radius = ctx.config.flight.touch_radius;
    let nearest = ctx
        .world
        .players
        .iter()
        .map(|p| p.coordinate.distance(at))
        .filter(|&d| d <= radius)
        .min()?;
    let candidates: Vec<PlayerId> = ctx
        .world
        .players
        .iter()
        .filter(|p| p.coordinate.distance(at) == nearest)
        .map(|p| p.id)
        .collect();
    let winner = *candidates.choose(&mut *ctx.rng)?;

    ctx.world.place(winner, at);
    if let Some(player) = ctx.world.player_mut(winner) {
        player.clear_duel();
    }
    ctx.world.give_ball(winner);
    ctx.mark(winner, ActionCode::Recover);
    ctx.log.set_involver_if_empty(winner, ActionCode::Recover);
    tracing::trace!(?winner, %at, "Loose ball recovered");
    Some(winner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ball::{ArrivalAction, FlightPlan};
    use crate::config::EngineConfig;
    use crate::data::MatchSetup;
    use crate::log::PeriodLog;
    use crate::pitch::CENTER;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn open_world() -> MatchWorld {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut world = MatchWorld::from_setup(&MatchSetup::new("H", "A", 21), &mut rng).unwrap();
        world.pending = None;
        world
    }

    /// Draws that never pass a probability roll.
    fn high_rng() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    #[test]
    fn test_touch_score_bonuses() {
        let mut rng = StepRng::new(0, 0);
        let cfg = FlightConfig::default();
        let player = crate::testing::player_at(3, 10, 10);
        let mut touch = FlightTouch {
            origin: CENTER,
            passer_team: TeamSide::Home,
            kicker: None,
            final_holder: None,
            intended_receiver: None,
        };
        let base = touch_score(&mut rng, &cfg, &player, Coordinate::new(10, 11), &touch);
        assert_eq!(base, 1000 - 200 + 50 + 50);
        touch.final_holder = Some(PlayerId(3));
        touch.intended_receiver = Some(PlayerId(3));
        let bonus = touch_score(&mut rng, &cfg, &player, Coordinate::new(10, 11), &touch);
        assert_eq!(bonus - base, 300);
    }

    #[test]
    fn test_flight_off_the_pitch_ends_in_restart() {
        let mut world = open_world();
        // Aim past the touchline with nobody near the path.
        world.give_ball_at(PlayerId(3), Coordinate::new(65, 40));
        let plan = FlightPlan::untargeted(Coordinate::new(80, 40), 3, TeamSide::Home).kicked_by(PlayerId(3));
        world.launch(Coordinate::new(65, 40), plan);

        let config = EngineConfig::default();
        let mut rng = high_rng();
        let mut log = PeriodLog::new(0);
        let mut ctx = TickContext::new(&mut world, &config, &mut rng, &mut log);
        for _ in 0..10 {
            if ctx.world.ball.kind() != BallStateKind::Flying {
                break;
            }
            process_flight(&mut ctx);
        }
        assert_eq!(ctx.world.ball.kind(), BallStateKind::Held);
        assert_eq!(ctx.world.holder().map(PlayerId::side), Some(TeamSide::Away));
        assert_eq!(ctx.log.involver_action, ActionCode::ThrowIn);
        assert_eq!(ctx.world.ball.coordinate(), Coordinate::new(70, 40));
    }

    #[test]
    fn test_receiver_controls_pass() {
        let mut world = open_world();
        let passer = PlayerId(6);
        let receiver = PlayerId(7);
        world.place(passer, Coordinate::new(60, 20));
        world.place(receiver, Coordinate::new(60, 26));
        world.give_ball(passer);
        let plan = FlightPlan::untargeted(Coordinate::new(60, 26), 3, TeamSide::Home)
            .kicked_by(passer)
            .to_receiver(receiver);
        world.launch(Coordinate::new(60, 20), plan);

        let config = EngineConfig::default();
        let mut rng = high_rng();
        let mut log = PeriodLog::new(0);
        let mut ctx = TickContext::new(&mut world, &config, &mut rng, &mut log);
        process_flight(&mut ctx);
        process_flight(&mut ctx);

        assert_eq!(ctx.world.holder(), Some(receiver));
        assert_eq!(ctx.log.involver, Some(receiver));
        assert_eq!(ctx.log.involver_action, ActionCode::Receive);
        assert_eq!(ctx.world.player(receiver).unwrap().coordinate, Coordinate::new(60, 25));
    }

    #[test]
    fn test_one_touch_pass_is_checked_like_any_pass() {
        let mut world = open_world();
        let passer = PlayerId(6);
        let toucher = PlayerId(7);
        let target = PlayerId(9);
        let cutter = PlayerId(105);
        // Everyone else on the home side stands behind the toucher.
        for i in [0, 1, 2, 3, 4, 5, 8, 10] {
            world.place(PlayerId(i), Coordinate::new(5 + 3 * i as i32, 0));
        }
        world.place(passer, Coordinate::new(60, 20));
        world.place(toucher, Coordinate::new(60, 26));
        world.players[toucher.arena_index()].status.pass = 100;
        world.place(target, Coordinate::new(60, 45));
        world.players[target.arena_index()].intent = Coordinate::new(60, 45);
        world.place(cutter, Coordinate::new(60, 35));

        world.give_ball_at(passer, Coordinate::new(60, 20));
        let plan = FlightPlan::untargeted(Coordinate::new(60, 26), 3, TeamSide::Home)
            .kicked_by(passer)
            .to_receiver(toucher);
        world.launch(Coordinate::new(60, 20), plan);
        for _ in 0..5 {
            world.ball.advance_flight_one_cell();
        }
        let touch = FlightTouch::of(world.ball.state()).unwrap();

        let config = EngineConfig::default();
        // Draws alternate 0.5 and 0.0: no trap miss, then a one-touch pass.
        let mut rng = StepRng::new(1 << 63, 1 << 63);
        let mut log = PeriodLog::new(0);
        let mut ctx = TickContext::new(&mut world, &config, &mut rng, &mut log);

        assert_eq!(resolve_touch(&mut ctx, toucher, &touch), TouchOutcome::OneTouchPass(target));
        assert_eq!(ctx.world.ball.kind(), BallStateKind::Flying);
        assert_ne!(ctx.world.ball.flight().unwrap().final_holder, Some(target));
        assert_eq!(ctx.log.holder_action, ActionCode::PassFail);
    }

    #[test]
    fn test_arrival_with_nobody_near_goes_loose() {
        let mut world = open_world();
        let plan = FlightPlan {
            arrival: ArrivalAction::None,
            ..FlightPlan::untargeted(Coordinate::new(68, 75), 3, TeamSide::Home)
        };
        world.launch(Coordinate::new(68, 70), plan);

        let config = EngineConfig::default();
        let mut rng = high_rng();
        let mut log = PeriodLog::new(0);
        let mut ctx = TickContext::new(&mut world, &config, &mut rng, &mut log);
        process_flight(&mut ctx);
        assert_eq!(ctx.world.ball.kind(), BallStateKind::Flying);
        process_flight(&mut ctx);
        assert_eq!(ctx.world.ball.kind(), BallStateKind::Loose);
        assert_eq!(ctx.world.ball.coordinate(), Coordinate::new(68, 75));
    }

    #[test]
    fn test_loose_ball_goes_to_nearest() {
        let mut world = open_world();
        world.release_loose(Coordinate::new(5, 5), TeamSide::Away);
        world.place(PlayerId(1), Coordinate::new(5, 6));
        world.place(PlayerId(101), Coordinate::new(6, 6));

        let config = EngineConfig::default();
        let mut rng = StepRng::new(0, 0);
        let mut log = PeriodLog::new(0);
        let mut ctx = TickContext::new(&mut world, &config, &mut rng, &mut log);
        assert_eq!(process_loose_ball(&mut ctx), Some(PlayerId(1)));
        assert_eq!(ctx.world.holder(), Some(PlayerId(1)));
        assert_eq!(ctx.log.involver_action, ActionCode::Recover);
        ctx.world.check_invariants(0).unwrap();
    }

    #[test]
    fn test_loose_ball_tie_is_drawn() {
        let mut world = open_world();
        world.release_loose(Coordinate::new(5, 5), TeamSide::Away);
        world.place(PlayerId(1), Coordinate::new(5, 6));
        world.place(PlayerId(101), Coordinate::new(5, 4));

        let config = EngineConfig::default();
        let mut winners = std::collections::BTreeSet::new();
        for seed in 0..32 {
            let mut world = world.clone();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut log = PeriodLog::new(0);
            let mut ctx = TickContext::new(&mut world, &config, &mut rng, &mut log);
            winners.insert(process_loose_ball(&mut ctx).unwrap());
        }
        assert_eq!(winners.len(), 2);
    }

    #[test]
    fn test_chase_intents_for_flight() {
        let mut world = open_world();
        let target = Coordinate::new(10, 80);
        let plan = FlightPlan::untargeted(target, 2, TeamSide::Home).to_receiver(PlayerId(5));
        world.launch(CENTER, plan);
        assign_chase_intents(&mut world);
        assert_eq!(world.player(PlayerId(5)).unwrap().intent, target);
        let chasing = world
            .players
            .iter()
            .filter(|p| p.side == TeamSide::Away && p.intent == target)
            .count();
        assert_eq!(chasing, 1);
    }
}
