//! Unit-test helpers shared across modules.

use crate::components::{AnchorParams, Player, PlayerId, PlayerStatus, PlayerVariable};
use crate::pitch::{Coordinate, CENTER};

/// A player with uniform 50 abilities standing at `(x, y)`.
pub(crate) fn player_at(id: u32, x: i32, y: i32) -> Player {
    player_with(id, x, y, PlayerStatus::default())
}

/// A player with the given abilities standing at `(x, y)`.
pub(crate) fn player_with(id: u32, x: i32, y: i32, status: PlayerStatus) -> Player {
    let variable = PlayerVariable::derive(&status, AnchorParams::new(CENTER, CENTER, [0.0; 4]), Vec::new());
    Player::new(PlayerId(id), "T", "CMF", status, variable, Coordinate::new(x, y))
}
