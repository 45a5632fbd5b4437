//! Position-role tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::components::TeamSide;
use crate::error::Result;
use crate::pitch::{polygon_contains, Coordinate};

/// Role used when a position name is missing from the table.
pub const FALLBACK_POSITION: &str = "CMF";

/// Last-resort role when even the fallback entry is missing.
static NEUTRAL_ROLE: PositionDefinition = PositionDefinition {
    position: String::new(),
    offense_follow_x: 0.4,
    offense_follow_y: 0.5,
    defense_follow_x: 0.4,
    defense_follow_y: 0.5,
    movable_area: Vec::new(),
};

/// Ball-follow behaviour and movable area for one position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionDefinition {
    /// Position name (e.g. "CB").
    pub position: String,
    /// Share of the ball's x offset from centre followed while attacking.
    pub offense_follow_x: f32,
    /// Share of the ball's y offset from centre followed while attacking.
    pub offense_follow_y: f32,
    /// Share of the ball's x offset from centre followed while defending.
    pub defense_follow_x: f32,
    /// Share of the ball's y offset from centre followed while defending.
    pub defense_follow_y: f32,
    /// Polygon of offsets around the anchor (home frame). Empty means
    /// unconstrained.
    #[serde(default)]
    pub movable_area: Vec<Coordinate>,
}

impl PositionDefinition {
    fn new(position: &str, rates: [f32; 4], area: &[(i32, i32)]) -> Self {
        Self {
            position: position.to_string(),
            offense_follow_x: rates[0],
            offense_follow_y: rates[1],
            defense_follow_x: rates[2],
            defense_follow_y: rates[3],
            movable_area: area.iter().map(|&(x, y)| Coordinate::new(x, y)).collect(),
        }
    }

    /// Follow rates in `[offense_x, offense_y, defense_x, defense_y]` order.
    #[must_use]
    pub fn rates(&self) -> [f32; 4] {
        [
            self.offense_follow_x,
            self.offense_follow_y,
            self.defense_follow_x,
            self.defense_follow_y,
        ]
    }
}

/// Whether `point` lies in a movable area placed on `anchor`.
///
/// The area is stored in the home frame; for the away side the offsets
/// are mirrored so "forward" still means toward the attacked goal.
#[must_use]
pub fn area_contains(area: &[Coordinate], side: TeamSide, anchor: Coordinate, point: Coordinate) -> bool {
    if area.is_empty() {
        return true;
    }
    let dx = point.x - anchor.x;
    let dy = (point.y - anchor.y) * side.forward();
    polygon_contains(area, Coordinate::new(dx, dy))
}

fn rect(left: i32, right: i32, back: i32, front: i32) -> [(i32, i32); 4] {
    [(left, back), (right, back), (right, front), (left, front)]
}

/// Position-role table keyed by position name.
///
/// # Example RON
///
/// ```ron
/// PositionTable(
///     roles: {
///         "CB": (
///             position: "CB",
///             offense_follow_x: 0.3,
///             offense_follow_y: 0.45,
///             defense_follow_x: 0.3,
///             defense_follow_y: 0.4,
///             movable_area: [(x: -10, y: -12), (x: 10, y: -12), (x: 10, y: 12), (x: -10, y: 12)],
///         ),
///     },
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionTable {
    /// Entries by position name.
    pub roles: BTreeMap<String, PositionDefinition>,
}

impl PositionTable {
    /// Stock table covering GK, SB, CB, WMF, CMF, ST and CF.
    #[must_use]
    pub fn standard() -> Self {
        let entries = [
            PositionDefinition::new("GK", [0.2, 0.0, 0.2, 0.0], &[]),
            PositionDefinition::new("SB", [0.35, 0.55, 0.3, 0.45], &rect(-10, 10, -12, 18)),
            PositionDefinition::new("CB", [0.3, 0.45, 0.3, 0.4], &rect(-10, 10, -12, 12)),
            PositionDefinition::new("WMF", [0.4, 0.6, 0.35, 0.5], &rect(-12, 12, -15, 20)),
            PositionDefinition::new(
                "CMF",
                [0.45, 0.6, 0.4, 0.55],
                &[(-8, -16), (8, -16), (14, 0), (8, 16), (-8, 16), (-14, 0)],
            ),
            PositionDefinition::new("ST", [0.4, 0.55, 0.35, 0.45], &rect(-14, 14, -12, 22)),
            PositionDefinition::new("CF", [0.4, 0.55, 0.35, 0.45], &rect(-14, 14, -12, 22)),
        ];
        Self {
            roles: entries
                .into_iter()
                .map(|def| (def.position.clone(), def))
                .collect(),
        }
    }

    /// Parse from RON.
    pub fn from_ron_str(ron_str: &str, label: &str) -> Result<Self> {
        super::parse_ron(ron_str, label)
    }

    /// Look up a position, falling back to [`FALLBACK_POSITION`] and then
    /// to a neutral built-in entry. Never fails.
    #[must_use]
    pub fn lookup(&self, position: &str) -> &PositionDefinition {
        self.roles
            .get(position)
            .or_else(|| {
                tracing::trace!(position, "Position missing from role table, using fallback");
                self.roles.get(FALLBACK_POSITION)
            })
            .unwrap_or(&NEUTRAL_ROLE)
    }

    /// Overlay another table's entries onto this one.
    pub fn merge(&mut self, other: PositionTable) {
        self.roles.extend(other.roles);
    }
}

impl Default for PositionTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_falls_back_to_cmf() {
        let table = PositionTable::standard();
        let def = table.lookup("LIBERO");
        assert_eq!(def.position, FALLBACK_POSITION);
    }

    #[test]
    fn test_lookup_without_fallback_entry_is_neutral() {
        let table = PositionTable {
            roles: BTreeMap::new(),
        };
        let def = table.lookup("CB");
        assert!(def.movable_area.is_empty());
        assert!((def.offense_follow_y - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_area_contains_mirrors_for_away() {
        let table = PositionTable::standard();
        let area = &table.lookup("ST").movable_area;
        let anchor = Coordinate::new(35, 50);

        // 20 cells forward is inside for both sides.
        assert!(area_contains(area, TeamSide::Home, anchor, Coordinate::new(35, 70)));
        assert!(area_contains(area, TeamSide::Away, anchor, Coordinate::new(35, 30)));
        // 20 cells backward is outside for both sides.
        assert!(!area_contains(area, TeamSide::Home, anchor, Coordinate::new(35, 30)));
        assert!(!area_contains(area, TeamSide::Away, anchor, Coordinate::new(35, 70)));
    }

    #[test]
    fn test_empty_area_is_unconstrained() {
        assert!(area_contains(&[], TeamSide::Home, Coordinate::new(0, 0), Coordinate::new(70, 100)));
    }

    #[test]
    fn test_merge_overrides_entries() {
        let mut table = PositionTable::standard();
        let mut custom = PositionTable {
            roles: BTreeMap::new(),
        };
        custom.roles.insert(
            "CB".to_string(),
            PositionDefinition::new("CB", [0.0, 0.0, 0.0, 0.0], &[]),
        );
        table.merge(custom);
        assert!(table.lookup("CB").movable_area.is_empty());
        assert!(!table.lookup("SB").movable_area.is_empty());
    }
}
