//! Scripted match scenarios exercised through the public API.

use pitch_core::ball::{BallStateKind, FlightPlan};
use pitch_core::components::{ActionCode, AnchorParams, Player, PlayerId, PlayerStatus, PlayerVariable, TeamSide};
use pitch_core::config::EngineConfig;
use pitch_core::evaluator::{evaluate_pass, shoot_success_prob};
use pitch_core::log::PeriodLog;
use pitch_core::pitch::{Coordinate, CENTER, MAX_Y};
use pitch_core::resolvers::{award_foul, dribble, process_flight, take_turn, DribbleOutcome, HolderAction, ShotOutcome};
use pitch_core::simulation::MatchSimulation;
use pitch_core::world::{PendingKick, TickContext};
use pitch_test_utils::fixtures::{high_rng, park_side, rostered_setup, scripted_world, short_setup, zero_rng};

fn loose_player(id: u32, x: i32, y: i32, status: PlayerStatus) -> Player {
    let variable = PlayerVariable::derive(&status, AnchorParams::new(CENTER, CENTER, [0.0; 4]), Vec::new());
    Player::new(PlayerId(id), "T", "CMF", status, variable, Coordinate::new(x, y))
}

#[test]
fn test_sharp_passer_beats_opponent_two_from_midpoint() {
    let passer = loose_player(6, 30, 40, PlayerStatus::new(50, 50, 80, 50, 50));
    let receiver = loose_player(7, 30, 60, PlayerStatus::default());
    let opponent = loose_player(105, 32, 50, PlayerStatus::default());
    let players = vec![passer.clone(), receiver.clone(), opponent];

    let eval = evaluate_pass(&passer, &receiver, &players);
    assert!(eval.success);
}

#[test]
fn test_point_blank_shot_probability_is_capped() {
    let shooter = loose_player(9, 35, MAX_Y, PlayerStatus::new(50, 100, 50, 50, 50));
    let prob = shoot_success_prob(&shooter, MAX_Y);
    assert!((prob - 0.8).abs() < 1e-9);
}

#[test]
fn test_goal_increments_score_and_logs_goal_line() {
    let mut world = scripted_world(&short_setup(21, 1));
    let striker = PlayerId(9);
    world.place(striker, Coordinate::new(35, 92));
    world.give_ball(striker);
    park_side(&mut world, TeamSide::Away, 60);

    let config = EngineConfig::default();
    let mut rng = zero_rng();
    let mut log = PeriodLog::new(0);
    let mut ctx = TickContext::new(&mut world, &config, &mut rng, &mut log);

    assert_eq!(take_turn(&mut ctx, striker), HolderAction::Shot(ShotOutcome::Goal));
    assert_eq!(ctx.world.state.scores(), (1, 0));
    let goal = ctx.log.goal.expect("goal recorded");
    assert_eq!(goal.side, TeamSide::Home);
    assert_eq!(goal.scorer, striker);
    assert_eq!(goal.coordinate.y, MAX_Y);
    assert!(ctx.log.has_goal());
    // Away restarts from the centre.
    assert_eq!(ctx.world.ball.coordinate(), CENTER);
    assert_eq!(ctx.world.holder().map(PlayerId::side), Some(TeamSide::Away));
}

#[test]
fn test_elite_dribbler_always_breaks_through_zero_defender() {
    let setup = rostered_setup(22, 100, 0);
    let mut world = scripted_world(&setup);
    let dribbler = PlayerId(9);
    let defender = PlayerId(104);
    world.place(dribbler, Coordinate::new(35, 60));
    world.place(defender, Coordinate::new(35, 61));
    world.give_ball(dribbler);
    if let Some(p) = world.player_mut(dribbler) {
        p.start_duel(defender, 1);
    }
    if let Some(p) = world.player_mut(defender) {
        p.start_duel(dribbler, 1);
    }

    let config = EngineConfig::default();
    for draw in [0u64, u64::MAX / 2, u64::MAX] {
        let mut scripted = world.clone();
        let mut rng = rand::rngs::mock::StepRng::new(draw, 0);
        let mut log = PeriodLog::new(0);
        let mut ctx = TickContext::new(&mut scripted, &config, &mut rng, &mut log);

        let outcome = dribble(&mut ctx, dribbler);
        assert_eq!(outcome, Some(DribbleOutcome::Breakthrough(defender)), "draw {draw}");
        assert_eq!(ctx.world.holder(), Some(dribbler));
        assert!(ctx.world.player(dribbler).unwrap().duel.is_none());
        assert!(ctx.world.player(defender).unwrap().duel.is_none());
    }
}

#[test]
fn test_pass_aimed_off_pitch_ends_in_restart() {
    let mut world = scripted_world(&short_setup(23, 1));
    park_side(&mut world, TeamSide::Away, 10);
    park_side(&mut world, TeamSide::Home, 5);
    let passer = PlayerId(3);
    let from = Coordinate::new(60, 50);
    world.place(passer, from);
    world.give_ball(passer);
    let plan = FlightPlan::untargeted(Coordinate::new(90, 50), 3, TeamSide::Home).kicked_by(passer);
    world.launch(from, plan);

    let config = EngineConfig::default();
    let mut rng = high_rng();
    let mut log = PeriodLog::new(0);
    let mut ctx = TickContext::new(&mut world, &config, &mut rng, &mut log);
    for _ in 0..30 {
        if ctx.world.ball.kind() != BallStateKind::Flying {
            break;
        }
        process_flight(&mut ctx);
    }

    assert_eq!(ctx.world.ball.kind(), BallStateKind::Held);
    assert_eq!(ctx.log.involver_action, ActionCode::ThrowIn);
    assert_eq!(ctx.world.holder().map(PlayerId::side), Some(TeamSide::Away));
}

#[test]
fn test_foul_in_box_becomes_penalty_on_next_tick() {
    let mut sim = MatchSimulation::new(&short_setup(24, 1)).expect("valid setup");
    sim.tick();

    {
        let config = EngineConfig::default();
        let mut rng = zero_rng();
        let mut log = PeriodLog::new(0);
        let world = sim.world_mut();
        let mut ctx = TickContext::new(world, &config, &mut rng, &mut log);
        let code = award_foul(&mut ctx, TeamSide::Home, PlayerId(104), Coordinate::new(35, 95), false);
        assert_eq!(code, ActionCode::PenaltyKick);
    }

    let kicker = PlayerId(9);
    assert_eq!(sim.world().pending, Some(PendingKick::Penalty { kicker }));
    assert_eq!(sim.world().holder(), Some(kicker));

    let record = sim.tick().clone();
    assert_eq!(record.holder, Some(kicker));
    assert!(!matches!(sim.world().pending, Some(PendingKick::Penalty { .. })));
    assert_ne!(record.holder_action, ActionCode::None);
}
