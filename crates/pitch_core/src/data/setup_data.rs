//! Match setup.

use serde::{Deserialize, Serialize};

use crate::components::{PlayerStatus, TEAM_SIZE};
use crate::config::EngineConfig;
use crate::error::{MatchError, Result};

use super::{FormationData, PositionTable};

/// One team's setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSetup {
    /// Team name.
    pub name: String,
    /// Formation; the stock 4-4-2 when absent.
    #[serde(default)]
    pub formation: Option<FormationData>,
    /// Abilities in team-index order; drawn from the match seed when absent.
    #[serde(default)]
    pub roster: Option<Vec<PlayerStatus>>,
}

impl TeamSetup {
    /// A team with the stock formation and seeded abilities.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            formation: None,
            roster: None,
        }
    }

    /// Set every player's abilities.
    #[must_use]
    pub fn with_roster(mut self, roster: Vec<PlayerStatus>) -> Self {
        self.roster = Some(roster);
        self
    }

    /// Use a specific formation.
    #[must_use]
    pub fn with_formation(mut self, formation: FormationData) -> Self {
        self.formation = Some(formation);
        self
    }

    fn validate(&self) -> Result<()> {
        if let Some(roster) = &self.roster {
            if roster.len() != TEAM_SIZE {
                return Err(MatchError::InvalidSetup(format!(
                    "team '{}' roster has {} players, expected {TEAM_SIZE}",
                    self.name,
                    roster.len()
                )));
            }
        }
        if let Some(formation) = &self.formation {
            formation.validate()?;
        }
        Ok(())
    }
}

/// Everything needed to build a match.
///
/// # Example RON
///
/// ```ron
/// MatchSetup(
///     home: (name: "Harbour"),
///     away: (name: "Uplands"),
///     seed: 42,
///     minutes: 90,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSetup {
    /// Home team.
    pub home: TeamSetup,
    /// Away team.
    pub away: TeamSetup,
    /// Seed for every random draw in the match.
    #[serde(default)]
    pub seed: u64,
    /// Match length in minutes.
    #[serde(default = "default_minutes")]
    pub minutes: u32,
    /// Engine tuning.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Role table; the stock table when absent.
    #[serde(default)]
    pub positions: Option<PositionTable>,
}

fn default_minutes() -> u32 {
    90
}

impl MatchSetup {
    /// Two stock teams.
    #[must_use]
    pub fn new(home: impl Into<String>, away: impl Into<String>, seed: u64) -> Self {
        Self {
            home: TeamSetup::named(home),
            away: TeamSetup::named(away),
            seed,
            minutes: default_minutes(),
            engine: EngineConfig::default(),
            positions: None,
        }
    }

    /// Set the match length.
    #[must_use]
    pub fn with_minutes(mut self, minutes: u32) -> Self {
        self.minutes = minutes;
        self
    }

    /// Parse from RON and validate.
    pub fn from_ron_str(ron_str: &str, label: &str) -> Result<Self> {
        let setup: Self = super::parse_ron(ron_str, label)?;
        setup.validate()?;
        Ok(setup)
    }

    /// Check rosters and formations.
    pub fn validate(&self) -> Result<()> {
        self.home.validate()?;
        self.away.validate()
    }
}

impl Default for MatchSetup {
    fn default() -> Self {
        Self::new("Home", "Away", 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_ron_setup() {
        let setup = MatchSetup::from_ron_str(
            r#"(home: (name: "Harbour"), away: (name: "Uplands"), seed: 42)"#,
            "inline",
        )
        .unwrap();
        assert_eq!(setup.seed, 42);
        assert_eq!(setup.minutes, 90);
        assert!(setup.home.formation.is_none());
        assert_eq!(setup.engine, EngineConfig::default());
    }

    #[test]
    fn test_short_roster_rejected() {
        let setup = MatchSetup::new("A", "B", 1);
        let setup = MatchSetup {
            home: setup.home.with_roster(vec![PlayerStatus::default(); 10]),
            ..setup
        };
        assert!(matches!(setup.validate(), Err(MatchError::InvalidSetup(_))));
    }
}
