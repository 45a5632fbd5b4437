//! Off-ball positioning and movement.
//!
//! Every non-holder who is not frozen gets a fresh intent each tick:
//! keepers track the ball along their goal line, duelling players stay on
//! their opponent, and everyone else starts from a dynamic anchor, is
//! pushed apart from crowding teammates and then searches the cells around
//! the anchor for the best spot for their offence or defence intent.
//!
//! Intents are computed from a read-only view of the arena and written back
//! in one pass, so the result does not depend on iteration order.

use crate::components::{DefenseIntent, OffenseIntent, Player, PlayerId, Role, TeamSide};
use crate::config::PositioningConfig;
use crate::data::area_contains;
use crate::evaluator::{goalkeeper_intent, nearest_of_side};
use crate::pitch::{Coordinate, CENTER, MAX_X};
use crate::world::MatchWorld;

/// Score lost per opponent standing in the cell's crowding radius.
const CROWDING_PENALTY: i32 = 10;

/// Weight of the intent-specific term against the anchor pull.
const INTENT_WEIGHT: i32 = 2;

/// Recompute intents for every non-holder who is free to act.
pub fn assign_intents(world: &mut MatchWorld, cfg: &PositioningConfig) {
    let holder = world.holder();
    let ball = world.ball.coordinate();
    let attacking_side = world.state.attacking_side();

    clear_stale_duels(world, holder);

    let players = &world.players;
    let updates: Vec<(usize, Coordinate)> = players
        .iter()
        .enumerate()
        .filter(|(_, p)| Some(p.id) != holder)
        .filter(|(_, p)| !p.is_frozen(p.side == attacking_side))
        .map(|(i, p)| (i, intent_for(p, players, ball, attacking_side, cfg)))
        .collect();

    for (index, intent) in updates {
        world.players[index].intent = intent;
    }
}

/// Drop duels whose other party no longer holds the ball.
fn clear_stale_duels(world: &mut MatchWorld, holder: Option<PlayerId>) {
    for player in &mut world.players {
        let Some(duel) = player.duel else {
            continue;
        };
        let live = Some(player.id) == holder || Some(duel.opponent) == holder;
        if !live {
            player.clear_duel();
        }
    }
}

/// Intent for one off-ball player.
#[must_use]
pub fn intent_for(
    player: &Player,
    players: &[Player],
    ball: Coordinate,
    attacking_side: TeamSide,
    cfg: &PositioningConfig,
) -> Coordinate {
    if let Some(duel) = player.duel {
        if let Some(opponent) = players.iter().find(|p| p.id == duel.opponent) {
            return opponent.coordinate;
        }
    }
    if player.is_goalkeeper() {
        return goalkeeper_intent(ball, player.side, cfg.keeper_band);
    }

    let attacking = player.side == attacking_side;
    let anchor = player.variable.anchor.dynamic_anchor(player.side, ball, attacking);
    let anchor = repel(anchor, player, players, cfg.repulsion_radius);

    if attacking {
        offensive_intent(player, anchor, players, ball, cfg)
    } else {
        defensive_intent(player, anchor, players, ball, cfg)
    }
}

/// Push `anchor` away from teammates whose intents lie within `radius`.
///
/// Each close teammate pushes by `(radius - d) / 2` cells along every
/// axis on which the two differ. When the two coincide, x is pushed away
/// from the pitch centre.
#[must_use]
pub fn repel(anchor: Coordinate, player: &Player, players: &[Player], radius: i32) -> Coordinate {
    let mut dx = 0;
    let mut dy = 0;
    for mate in players
        .iter()
        .filter(|p| p.side == player.side && p.id != player.id && !p.is_goalkeeper())
    {
        let d = anchor.distance(mate.intent);
        if d >= radius {
            continue;
        }
        let push = (radius - d) / 2;
        let sx = (anchor.x - mate.intent.x).signum();
        let sy = (anchor.y - mate.intent.y).signum();
        if sx == 0 && sy == 0 {
            dx += if anchor.x <= CENTER.x { -push } else { push };
        } else {
            dx += sx * push;
            dy += sy * push;
        }
    }
    anchor.offset(dx, dy).clamped()
}

/// Best cell around `anchor` for the player's offence intent.
#[must_use]
pub fn offensive_intent(
    player: &Player,
    anchor: Coordinate,
    players: &[Player],
    ball: Coordinate,
    cfg: &PositioningConfig,
) -> Coordinate {
    let intent = player.offense_intent;
    if matches!(intent, OffenseIntent::Neutral | OffenseIntent::HoldPosition) {
        return anchor;
    }

    let goal_y = player.side.attacking_goal_y();
    let (near, far) = cfg.support_distance;
    let score = |cell: Coordinate| -> i32 {
        let heuristic = match intent {
            OffenseIntent::Support => {
                let d = cell.distance(ball);
                let off = if d < near {
                    near - d
                } else if d > far {
                    d - far
                } else {
                    0
                };
                -off
            }
            OffenseIntent::RunIntoSpace => {
                let crowd = players
                    .iter()
                    .filter(|p| p.side != player.side)
                    .filter(|p| p.coordinate.distance(cell) <= cfg.crowding_radius)
                    .count() as i32;
                -(cell.y - goal_y).abs() - crowd * CROWDING_PENALTY
            }
            OffenseIntent::MakeWidth => -cell.x.min(MAX_X - cell.x),
            OffenseIntent::Neutral | OffenseIntent::HoldPosition => 0,
        };
        heuristic * INTENT_WEIGHT - cell.distance(anchor)
    };

    search(player, anchor, score).unwrap_or(anchor)
}

/// Exhaustive scan of the square of half size `max_movable` around
/// `anchor`, limited to the pitch and the player's movable area. Ties keep
/// the first cell in x-major order.
fn search(player: &Player, anchor: Coordinate, score: impl Fn(Coordinate) -> i32) -> Option<Coordinate> {
    let reach = player.variable.max_movable;
    let area = &player.variable.movable_area;
    let mut best: Option<(i32, Coordinate)> = None;
    for x in anchor.x - reach..=anchor.x + reach {
        for y in anchor.y - reach..=anchor.y + reach {
            let cell = Coordinate::new(x, y);
            if cell.is_out_of_pitch() || !area_contains(area, player.side, anchor, cell) {
                continue;
            }
            let s = score(cell);
            if best.is_none_or(|(b, _)| s > b) {
                best = Some((s, cell));
            }
        }
    }
    best.map(|(_, cell)| cell)
}

/// Target for a defending player.
#[must_use]
pub fn defensive_intent(
    player: &Player,
    anchor: Coordinate,
    players: &[Player],
    ball: Coordinate,
    cfg: &PositioningConfig,
) -> Coordinate {
    let ball_near = ball.distance(player.coordinate) <= cfg.press_radius;
    match player.defense_intent {
        DefenseIntent::Skip => return anchor,
        DefenseIntent::Press if ball_near && player.role != Role::Forward => return ball.clamped(),
        DefenseIntent::Mark => {
            if let Some(mark) = nearest_of_side(players, anchor, player.side.opponent()) {
                let goal_side = mark.coordinate.offset(0, -player.side.forward());
                return goal_side.clamped();
            }
        }
        DefenseIntent::Neutral | DefenseIntent::Press => {}
    }

    match player.role {
        Role::Defender => Coordinate::new((anchor.x * 2 + ball.x) / 3, anchor.y).clamped(),
        Role::Midfielder => {
            if area_contains(&player.variable.movable_area, player.side, anchor, ball) {
                ball.clamped()
            } else {
                anchor
            }
        }
        Role::Forward => ball.clamped(),
        Role::Goalkeeper => goalkeeper_intent(ball, player.side, cfg.keeper_band),
    }
}

/// Step one player toward their intent with the cells their speed buys
/// this tick. The step is cancelled when a teammate stands on the
/// destination. Returns whether the player moved.
pub fn move_toward_intent(players: &mut [Player], index: usize) -> bool {
    let Some(player) = players.get_mut(index) else {
        return false;
    };
    if player.coordinate == player.intent {
        return false;
    }
    let cells = player.take_move_cells();
    if cells == 0 {
        return false;
    }

    let from = player.coordinate;
    let d = Coordinate::new(player.intent.x - from.x, player.intent.y - from.y);
    let dest = from
        .offset(d.x.signum() * d.x.abs().min(cells), d.y.signum() * d.y.abs().min(cells))
        .clamped();
    let (id, side) = (player.id, player.side);

    if players.iter().any(|p| p.id != id && p.side == side && p.coordinate == dest) {
        return false;
    }
    players[index].coordinate = dest;
    true
}

/// Move every player except the holder and anyone frozen.
pub fn move_non_holders(world: &mut MatchWorld) {
    let holder = world.holder();
    let attacking_side = world.state.attacking_side();
    for index in 0..world.players.len() {
        let player = &world.players[index];
        if Some(player.id) == holder || player.is_frozen(player.side == attacking_side) {
            continue;
        }
        move_toward_intent(&mut world.players, index);
    }
}
