//! Grid evaluator: pass, shot and dribble odds plus best-target searches.
//!
//! Everything here is a pure function of the players and the ball. The
//! only randomness is the receiver sample in [`best_pass_target`], which
//! draws from the caller's RNG.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::components::{Player, PlayerId, TeamSide};
use crate::pitch::Coordinate;
use crate::vision::{can_see, facing_toward_goal, in_field_of_view};

/// Outcome of checking a pass line for interceptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassEvaluation {
    /// No opponent close enough to the line.
    pub success: bool,
    /// Nearest opponent inside the cut range.
    pub interceptor: Option<PlayerId>,
    /// Midpoint of the pass line.
    pub intercept_point: Coordinate,
}

/// Cut radius around the pass midpoint for a pass ability.
#[must_use]
pub const fn pass_cut_range(pass: u8) -> i32 {
    match pass {
        76.. => 1,
        50..=75 => 2,
        25..=49 => 3,
        _ => 4,
    }
}

/// Check whether an opponent cuts the line from `passer` to `receiver`.
///
/// The nearest opponent within the cut range of the midpoint intercepts;
/// on equal distance the earlier player in `players` wins.
#[must_use]
pub fn evaluate_pass(passer: &Player, receiver: &Player, players: &[Player]) -> PassEvaluation {
    let intercept_point = Coordinate::new(
        (passer.coordinate.x + receiver.coordinate.x) / 2,
        (passer.coordinate.y + receiver.coordinate.y) / 2,
    );
    let cut_range = pass_cut_range(passer.status.pass);

    let mut interceptor = None;
    let mut best = i32::MAX;
    for player in players.iter().filter(|p| p.side != passer.side) {
        let dist = player.coordinate.distance(intercept_point);
        if dist <= cut_range && dist < best {
            best = dist;
            interceptor = Some(player.id);
        }
    }

    PassEvaluation {
        success: interceptor.is_none(),
        interceptor,
        intercept_point,
    }
}

/// Probability a shot from the shooter's cell beats the keeper.
#[must_use]
pub fn shoot_success_prob(shooter: &Player, goal_y: i32) -> f64 {
    let base = 0.4;
    let bonus = f64::from(shooter.status.shoot) / 100.0 * 0.5;
    let penalty = f64::from((shooter.coordinate.y - goal_y).abs()) * 0.01;
    (base + bonus - penalty).clamp(0.05, 0.8)
}

/// Probability a dribble succeeds, lowered when an opponent is within 10.
#[must_use]
pub fn dribble_success_prob(dribbler: &Player, players: &[Player]) -> f64 {
    let base = 0.6;
    let bonus = f64::from(dribbler.status.dribble) / 100.0 * 0.4;
    let pressed = nearest_opponent(players, dribbler.coordinate, dribbler.side)
        .is_some_and(|p| p.coordinate.distance(dribbler.coordinate) <= 10);
    let penalty = if pressed { 0.2 } else { 0.0 };
    (base + bonus - penalty).clamp(0.2, 0.9)
}

/// Bernoulli draw: `true` with probability `prob`.
pub fn roll_success(rng: &mut dyn RngCore, prob: f64) -> bool {
    rng.gen::<f64>() < prob
}

/// Nearest player of `side` to `from`. Ties keep the earlier player.
#[must_use]
pub fn nearest_of_side(players: &[Player], from: Coordinate, side: TeamSide) -> Option<&Player> {
    let mut nearest: Option<&Player> = None;
    for player in players.iter().filter(|p| p.side == side) {
        let closer = nearest.is_none_or(|n| player.coordinate.distance(from) < n.coordinate.distance(from));
        if closer {
            nearest = Some(player);
        }
    }
    nearest
}

/// Nearest opponent of `side` to `from`.
#[must_use]
pub fn nearest_opponent(players: &[Player], from: Coordinate, side: TeamSide) -> Option<&Player> {
    nearest_of_side(players, from, side.opponent())
}

/// Keeper target: x follows the ball inside `band`, y on the goal line.
#[must_use]
pub fn goalkeeper_intent(ball: Coordinate, side: TeamSide, band: (i32, i32)) -> Coordinate {
    Coordinate::new(ball.x.clamp(band.0, band.1), side.own_goal_y())
}

/// Whether anyone other than `except` stands on `cell`.
#[must_use]
pub fn is_occupied(players: &[Player], cell: Coordinate, except: PlayerId) -> bool {
    players.iter().any(|p| p.id != except && p.coordinate == cell)
}

/// Best free neighbouring cell inside the dribbler's view, nearest the
/// attacked goal line. `None` when every visible neighbour is taken.
#[must_use]
pub fn best_dribble_cell(dribbler: &Player, players: &[Player], half_angle_deg: f64) -> Option<Coordinate> {
    let origin = dribbler.coordinate;
    let facing = facing_toward_goal(origin, dribbler.side);
    let goal_y = dribbler.side.attacking_goal_y();

    let mut best: Option<(i32, Coordinate)> = None;
    for dx in -1..=1 {
        for dy in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let cell = origin.offset(dx, dy);
            if cell.is_out_of_pitch()
                || !in_field_of_view(origin, facing, cell, half_angle_deg)
                || is_occupied(players, cell, dribbler.id)
            {
                continue;
            }
            let goal_dist = (cell.y - goal_y).abs();
            if best.is_none_or(|(d, _)| goal_dist < d) {
                best = Some((goal_dist, cell));
            }
        }
    }
    best.map(|(_, cell)| cell)
}

/// Whether an opponent stands in the narrow cone between the shooter and
/// the goal. Opponents on the shooter's own cell are ignored.
#[must_use]
pub fn enemy_in_central_vision(shooter: &Player, players: &[Player], half_angle_deg: f64) -> bool {
    let origin = shooter.coordinate;
    let facing = facing_toward_goal(origin, shooter.side);
    let goal_y = shooter.side.attacking_goal_y();

    players
        .iter()
        .filter(|p| p.side != shooter.side && p.coordinate != origin)
        .filter(|p| in_field_of_view(origin, facing, p.coordinate, half_angle_deg))
        .any(|p| {
            let y = p.coordinate.y;
            match shooter.side {
                TeamSide::Home => y >= origin.y && y <= goal_y,
                TeamSide::Away => y <= origin.y && y >= goal_y,
            }
        })
}

/// Pick a receiver: sample up to `sample_size` visible teammates and take
/// the nearest of the sample.
pub fn best_pass_target(
    passer: &Player,
    players: &[Player],
    ball: Coordinate,
    half_angle_deg: f64,
    sample_size: usize,
    rng: &mut dyn RngCore,
) -> Option<PlayerId> {
    let visible: Vec<&Player> = players
        .iter()
        .filter(|p| p.side == passer.side && p.id != passer.id)
        .filter(|p| can_see(passer, p.coordinate, ball, half_angle_deg))
        .collect();

    let mut best: Option<(i32, PlayerId)> = None;
    for candidate in visible.choose_multiple(rng, sample_size) {
        let dist = candidate.coordinate.distance(passer.coordinate);
        if best.is_none_or(|(d, _)| dist < d) {
            best = Some((dist, candidate.id));
        }
    }
    best.map(|(_, id)| id)
}
