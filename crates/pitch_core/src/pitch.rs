//! Pitch grid geometry.
//!
//! The pitch is a 71 × 101 integer grid (one cell per metre). Home defends
//! the goal at `y = 0` and attacks toward `y = 100`. All distances are
//! Manhattan distances unless stated otherwise.

use serde::{Deserialize, Serialize};

/// Largest valid x coordinate.
pub const MAX_X: i32 = 70;

/// Largest valid y coordinate.
pub const MAX_Y: i32 = 100;

/// Centre spot.
pub const CENTER: Coordinate = Coordinate::new(MAX_X / 2, MAX_Y / 2);

/// An integer grid position.
///
/// Coordinates are plain values; nothing on the pitch holds a reference
/// to another entity's coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Coordinate {
    /// Horizontal position, 0..=70 on the pitch.
    pub x: i32,
    /// Vertical position, 0..=100 on the pitch.
    pub y: i32,
}

impl Coordinate {
    /// Create a coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another coordinate.
    #[must_use]
    pub const fn distance(self, other: Self) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Whether this coordinate lies outside the pitch.
    #[must_use]
    pub const fn is_out_of_pitch(self) -> bool {
        self.x < 0 || self.x > MAX_X || self.y < 0 || self.y > MAX_Y
    }

    /// Clamp onto the pitch.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self::new(self.x.clamp(0, MAX_X), self.y.clamp(0, MAX_Y))
    }

    /// Shift by the given deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Reflect across the halfway line.
    #[must_use]
    pub const fn mirrored_y(self) -> Self {
        Self::new(self.x, MAX_Y - self.y)
    }

    /// Reflect across the long axis.
    #[must_use]
    pub const fn mirrored_x(self) -> Self {
        Self::new(MAX_X - self.x, self.y)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Integer division rounded half away from zero. `den` must be positive.
#[must_use]
pub const fn round_div(num: i32, den: i32) -> i32 {
    if num >= 0 {
        (2 * num + den) / (2 * den)
    } else {
        -((-2 * num + den) / (2 * den))
    }
}

/// Build the straight-line path from `from` to `to`, both ends included.
///
/// The path has `max(|dx|, |dy|) + 1` points; a zero-length line yields
/// just the origin.
#[must_use]
pub fn line_path(from: Coordinate, to: Coordinate) -> Vec<Coordinate> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let steps = dx.abs().max(dy.abs());

    if steps == 0 {
        return vec![from];
    }

    (0..=steps)
        .map(|i| {
            Coordinate::new(
                from.x + round_div(dx * i, steps),
                from.y + round_div(dy * i, steps),
            )
        })
        .collect()
}

/// Point-in-polygon test. Points on an edge or vertex count as inside.
///
/// Polygons with fewer than three vertices contain nothing.
#[must_use]
pub fn polygon_contains(polygon: &[Coordinate], point: Coordinate) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut prev = polygon[polygon.len() - 1];

    for &current in polygon {
        if on_segment(prev, current, point) {
            return true;
        }

        if (current.y > point.y) != (prev.y > point.y) {
            // Compare point.x against the edge's x at point.y without division.
            let dy = i64::from(prev.y - current.y);
            let lhs = i64::from(point.x - current.x) * dy;
            let rhs = i64::from(point.y - current.y) * i64::from(prev.x - current.x);
            let crosses = if dy > 0 { lhs < rhs } else { lhs > rhs };
            if crosses {
                inside = !inside;
            }
        }

        prev = current;
    }

    inside
}

fn on_segment(a: Coordinate, b: Coordinate, p: Coordinate) -> bool {
    let cross = i64::from(b.x - a.x) * i64::from(p.y - a.y)
        - i64::from(b.y - a.y) * i64::from(p.x - a.x);
    cross == 0
        && p.x >= a.x.min(b.x)
        && p.x <= a.x.max(b.x)
        && p.y >= a.y.min(b.y)
        && p.y <= a.y.max(b.y)
}
