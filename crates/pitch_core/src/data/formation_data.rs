//! Formation tables.

use serde::{Deserialize, Serialize};

use crate::error::{MatchError, Result};
use crate::pitch::Coordinate;

/// Outfield slots every formation must provide.
pub const OUTFIELD_SLOTS: usize = 10;

/// One outfield slot. Coordinates are in the home frame.
///
/// Corner coordinates are expressed for a corner taken at the `y = 100`
/// goal; they are mirrored when the corner goes the other way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormationSlot {
    /// Position name, used to look up the role table (e.g. "CB").
    pub position: String,
    /// Kickoff coordinate.
    pub base: Coordinate,
    /// Anchor base while the team attacks.
    pub goal_kick_offense: Coordinate,
    /// Anchor base while the team defends.
    pub goal_kick_defense: Coordinate,
    /// Corner position when attacking the corner.
    pub corner_kick_offense: Coordinate,
    /// Corner position when defending the corner.
    pub corner_kick_defense: Coordinate,
}

impl FormationSlot {
    fn new(position: &str, coords: [(i32, i32); 5]) -> Self {
        let [base, gk_off, gk_def, ck_off, ck_def] = coords.map(|(x, y)| Coordinate::new(x, y));
        Self {
            position: position.to_string(),
            base,
            goal_kick_offense: gk_off,
            goal_kick_defense: gk_def,
            corner_kick_offense: ck_off,
            corner_kick_defense: ck_def,
        }
    }
}

/// A formation: keeper base plus ten outfield slots in team-index order.
///
/// # Example RON
///
/// ```ron
/// FormationData(
///     name: "4-4-2",
///     goalkeeper: (x: 35, y: 2),
///     slots: [
///         (
///             position: "SB",
///             base: (x: 13, y: 34),
///             goal_kick_offense: (x: 13, y: 42),
///             goal_kick_defense: (x: 13, y: 42),
///             corner_kick_offense: (x: 13, y: 65),
///             corner_kick_defense: (x: 25, y: 93),
///         ),
///         // ... nine more
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormationData {
    /// Display name.
    pub name: String,
    /// Keeper kickoff coordinate (home frame).
    pub goalkeeper: Coordinate,
    /// Outfield slots for team indices 1..=10.
    pub slots: Vec<FormationSlot>,
}

impl FormationData {
    /// The stock 4-4-2.
    #[must_use]
    pub fn four_four_two() -> Self {
        Self {
            name: "4-4-2".to_string(),
            goalkeeper: Coordinate::new(35, 2),
            slots: vec![
                FormationSlot::new("SB", [(13, 34), (13, 42), (13, 42), (13, 65), (25, 93)]),
                FormationSlot::new("CB", [(28, 33), (28, 41), (28, 41), (28, 65), (30, 90)]),
                FormationSlot::new("CB", [(42, 33), (42, 41), (42, 41), (42, 65), (38, 88)]),
                FormationSlot::new("SB", [(57, 34), (57, 42), (57, 42), (57, 65), (45, 91)]),
                FormationSlot::new("WMF", [(13, 42), (13, 54), (13, 54), (25, 85), (30, 95)]),
                FormationSlot::new("CMF", [(27, 41), (27, 53), (27, 53), (32, 87), (35, 93)]),
                FormationSlot::new("CMF", [(43, 41), (43, 53), (43, 53), (35, 80), (40, 90)]),
                FormationSlot::new("WMF", [(57, 42), (57, 54), (57, 54), (45, 78), (50, 85)]),
                FormationSlot::new("ST", [(25, 49), (25, 65), (25, 69), (30, 93), (28, 96)]),
                FormationSlot::new("CF", [(45, 49), (45, 65), (45, 69), (40, 95), (35, 60)]),
            ],
        }
    }

    /// Parse from RON and validate.
    pub fn from_ron_str(ron_str: &str, label: &str) -> Result<Self> {
        let data: Self = super::parse_ron(ron_str, label)?;
        data.validate()?;
        Ok(data)
    }

    /// Check the slot count and that every coordinate is on the pitch.
    pub fn validate(&self) -> Result<()> {
        if self.slots.len() != OUTFIELD_SLOTS {
            return Err(MatchError::FormationSlotCount {
                name: self.name.clone(),
                found: self.slots.len(),
                expected: OUTFIELD_SLOTS,
            });
        }

        let off_pitch = std::iter::once(&self.goalkeeper).chain(self.slots.iter().flat_map(|s| {
            [
                &s.base,
                &s.goal_kick_offense,
                &s.goal_kick_defense,
                &s.corner_kick_offense,
                &s.corner_kick_defense,
            ]
        }));
        for coordinate in off_pitch {
            if coordinate.is_out_of_pitch() {
                return Err(MatchError::InvalidSetup(format!(
                    "formation '{}' places a player off the pitch at {coordinate}",
                    self.name
                )));
            }
        }
        Ok(())
    }

    /// Slot for a team index (1..=10). The keeper has no slot.
    #[must_use]
    pub fn slot(&self, team_index: usize) -> Option<&FormationSlot> {
        team_index.checked_sub(1).and_then(|i| self.slots.get(i))
    }

    /// Position name for a team index.
    #[must_use]
    pub fn position_name(&self, team_index: usize) -> &str {
        self.slot(team_index).map_or("GK", |s| s.position.as_str())
    }

    /// Kickoff coordinate for a team index (home frame).
    #[must_use]
    pub fn base_coordinate(&self, team_index: usize) -> Coordinate {
        self.slot(team_index).map_or(self.goalkeeper, |s| s.base)
    }
}

impl Default for FormationData {
    fn default() -> Self {
        Self::four_four_two()
    }
}
