//! Formation and role table loading.
//!
//! A tables directory holds `formation_*.ron` files ([`FormationData`])
//! and an optional `roles.ron` ([`PositionTable`]). Loaded roles are
//! overlaid on the built-in table; formations are picked by name.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use pitch_core::data::{FormationData, MatchSetup, PositionTable};
use pitch_core::error::MatchError;
use thiserror::Error;

/// Role table file name inside a tables directory.
pub const ROLES_FILE: &str = "roles.ron";

/// Prefix of formation files inside a tables directory.
pub const FORMATION_PREFIX: &str = "formation_";

/// Errors that can occur during table loading.
#[derive(Error, Debug)]
pub enum TableLoadError {
    /// Failed to read file.
    #[error("IO error reading '{path}': {source}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },
    /// Failed to parse or validate a table.
    #[error("Bad table in '{0}': {1}")]
    Parse(String, MatchError),
    /// Directory not found.
    #[error("Tables directory not found: {0}")]
    DirectoryNotFound(String),
    /// A setup asked for a formation the tables do not have.
    #[error("Unknown formation: {0}")]
    UnknownFormation(String),
}

/// Tables loaded from disk.
#[derive(Debug, Clone, Default)]
pub struct MatchTables {
    formations: BTreeMap<String, FormationData>,
    roles: Option<PositionTable>,
}

impl MatchTables {
    /// Load every table in `dir`. Unreadable or invalid files are logged
    /// and skipped.
    pub fn load_from_directory(dir: &Path) -> Result<Self, TableLoadError> {
        if !dir.is_dir() {
            return Err(TableLoadError::DirectoryNotFound(dir.display().to_string()));
        }

        let io_error = |source: std::io::Error| TableLoadError::Io {
            path: dir.display().to_string(),
            source,
        };
        let mut paths: Vec<_> = fs::read_dir(dir)
            .map_err(io_error)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|e| e == "ron"))
            .collect();
        paths.sort();

        let mut tables = Self::default();
        for path in paths {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let result = if name == ROLES_FILE {
                load_roles(&path).map(|roles| tables.roles = Some(roles))
            } else if name.starts_with(FORMATION_PREFIX) {
                load_formation(&path).map(|formation| {
                    tables.formations.insert(formation.name.clone(), formation);
                })
            } else {
                continue;
            };
            if let Err(e) = result {
                tracing::warn!("Skipping table {:?}: {}", path, e);
            }
        }

        tracing::info!(
            formations = tables.formations.len(),
            roles = tables.roles.is_some(),
            dir = %dir.display(),
            "Loaded tables"
        );
        Ok(tables)
    }

    /// Formation by name.
    pub fn formation(&self, name: &str) -> Option<&FormationData> {
        self.formations.get(name)
    }

    /// Names of every loaded formation.
    pub fn formation_names(&self) -> impl Iterator<Item = &str> {
        self.formations.keys().map(String::as_str)
    }

    /// Loaded role overrides.
    pub fn roles(&self) -> Option<&PositionTable> {
        self.roles.as_ref()
    }

    /// Apply the tables to a setup: overlay roles on the setup's table and
    /// set the named formations for either side.
    pub fn apply(
        &self,
        setup: &mut MatchSetup,
        home_formation: Option<&str>,
        away_formation: Option<&str>,
    ) -> Result<(), TableLoadError> {
        if let Some(roles) = &self.roles {
            let mut table = setup.positions.take().unwrap_or_default();
            table.merge(roles.clone());
            setup.positions = Some(table);
        }
        for (team, name) in [(&mut setup.home, home_formation), (&mut setup.away, away_formation)] {
            if let Some(name) = name {
                let formation = self
                    .formation(name)
                    .ok_or_else(|| TableLoadError::UnknownFormation(name.to_string()))?;
                team.formation = Some(formation.clone());
            }
        }
        Ok(())
    }
}

fn read(path: &Path) -> Result<String, TableLoadError> {
    fs::read_to_string(path).map_err(|source| TableLoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn load_formation(path: &Path) -> Result<FormationData, TableLoadError> {
    let label = path.display().to_string();
    FormationData::from_ron_str(&read(path)?, &label).map_err(|e| TableLoadError::Parse(label, e))
}

fn load_roles(path: &Path) -> Result<PositionTable, TableLoadError> {
    let label = path.display().to_string();
    PositionTable::from_ron_str(&read(path)?, &label).map_err(|e| TableLoadError::Parse(label, e))
}
