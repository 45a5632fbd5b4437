//! Teams.

use serde::{Deserialize, Serialize};

use crate::components::{PlayerId, TeamSide, TEAM_SIZE};
use crate::data::FormationData;
use crate::error::Result;
use crate::pitch::Coordinate;

/// One side's static data. Players themselves live in the match arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Side.
    pub side: TeamSide,
    /// Display name.
    pub name: String,
    /// Formation in use.
    pub formation: FormationData,
    player_ids: Vec<PlayerId>,
    formation_coordinates: Vec<Coordinate>,
}

impl Team {
    /// Build a team and cache its kickoff coordinates.
    pub fn new(side: TeamSide, name: impl Into<String>, formation: FormationData) -> Result<Self> {
        formation.validate()?;

        let player_ids = (0..TEAM_SIZE).map(|i| PlayerId::new(side, i)).collect();
        let formation_coordinates = (0..TEAM_SIZE)
            .map(|i| side.orient(formation.base_coordinate(i)))
            .collect();

        Ok(Self {
            side,
            name: name.into(),
            formation,
            player_ids,
            formation_coordinates,
        })
    }

    /// Player ids in team-index order.
    #[must_use]
    pub fn player_ids(&self) -> &[PlayerId] {
        &self.player_ids
    }

    /// Id at a team index.
    #[must_use]
    pub fn player_id(&self, index: usize) -> Option<PlayerId> {
        self.player_ids.get(index).copied()
    }

    /// Goalkeeper id.
    #[must_use]
    pub fn goalkeeper(&self) -> PlayerId {
        PlayerId::new(self.side, 0)
    }

    /// Kickoff coordinate for a team index, in this side's frame.
    #[must_use]
    pub fn formation_coordinate(&self, index: usize) -> Coordinate {
        self.formation_coordinates
            .get(index)
            .copied()
            .unwrap_or_else(|| self.side.orient(self.formation.goalkeeper))
    }

    /// Corner anchor for a team index, in the corner frame (`y = 100` goal).
    #[must_use]
    pub fn corner_anchor(&self, index: usize, attacking: bool) -> Option<Coordinate> {
        self.formation.slot(index).map(|slot| {
            if attacking {
                slot.corner_kick_offense
            } else {
                slot.corner_kick_defense
            }
        })
    }
}
