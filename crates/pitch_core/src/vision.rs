//! Field-of-view primitives.
//!
//! A player faces the goal they attack while holding the ball and faces
//! the ball otherwise. A target is visible when the angle between the
//! facing vector and the direction to the target is within the half-angle.
//! Angles are compared through their cosines in fixed point.

use crate::components::{Player, TeamSide};
use crate::math::{Fixed, Vec2Fixed};
use crate::pitch::{Coordinate, CENTER};

fn direction(from: Coordinate, to: Coordinate) -> Vec2Fixed {
    Vec2Fixed::from_ints(to.x - from.x, to.y - from.y).normalize()
}

/// Unit vector from `from` toward the centre of the goal `side` attacks.
#[must_use]
pub fn facing_toward_goal(from: Coordinate, side: TeamSide) -> Vec2Fixed {
    let goal = Coordinate::new(CENTER.x, side.attacking_goal_y());
    let dir = direction(from, goal);
    if dir.is_zero() {
        Vec2Fixed::from_ints(0, side.forward())
    } else {
        dir
    }
}

/// Unit vector from `from` toward the ball, or toward goal if on the ball.
#[must_use]
pub fn facing_toward_ball(from: Coordinate, ball: Coordinate, side: TeamSide) -> Vec2Fixed {
    let dir = direction(from, ball);
    if dir.is_zero() {
        facing_toward_goal(from, side)
    } else {
        dir
    }
}

/// Where a player is looking.
#[must_use]
pub fn facing(player: &Player, ball: Coordinate) -> Vec2Fixed {
    if player.has_ball() {
        facing_toward_goal(player.coordinate, player.side)
    } else {
        facing_toward_ball(player.coordinate, ball, player.side)
    }
}

/// Cosine of a half-angle given in degrees.
///
/// Converted once from configuration; everything downstream is fixed point.
#[must_use]
pub fn cos_threshold(half_angle_deg: f64) -> Fixed {
    Fixed::saturating_from_num(half_angle_deg.to_radians().cos())
}

/// Whether `target` lies inside the cone from `origin` along `facing`.
///
/// A target on the origin cell is always visible.
#[must_use]
pub fn in_field_of_view(origin: Coordinate, facing: Vec2Fixed, target: Coordinate, half_angle_deg: f64) -> bool {
    if origin == target {
        return true;
    }
    let to_target = direction(origin, target);
    facing.dot(to_target) >= cos_threshold(half_angle_deg)
}

/// Whether `viewer` can see `target` with their current facing.
#[must_use]
pub fn can_see(viewer: &Player, target: Coordinate, ball: Coordinate, half_angle_deg: f64) -> bool {
    in_field_of_view(viewer.coordinate, facing(viewer, ball), target, half_angle_deg)
}

/// Whether a ball arriving from `from` is inside the receiver's view.
///
/// The receiver is assumed to be shaping up toward the attacked goal.
#[must_use]
pub fn approach_in_view(receiver: &Player, from: Coordinate, half_angle_deg: f64) -> bool {
    let facing = facing_toward_goal(receiver.coordinate, receiver.side);
    in_field_of_view(receiver.coordinate, facing, from, half_angle_deg)
}
