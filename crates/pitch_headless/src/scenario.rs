//! Match setup loading.
//!
//! A setup file is a RON [`MatchSetup`]: team names, seed, length, and
//! optional rosters, formations and engine tuning.

use std::path::Path;

use pitch_core::data::MatchSetup;
use pitch_core::error::MatchError;
use thiserror::Error;

/// Error type for setup loading.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Setup file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read setup file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse setup: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Parsed but unusable.
    #[error("Invalid setup: {0}")]
    Invalid(#[from] MatchError),
}

/// Load a setup from a RON file.
pub fn load_setup<P: AsRef<Path>>(path: P) -> Result<MatchSetup, ScenarioError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ScenarioError::FileNotFound(path.display().to_string()));
    }
    let contents = std::fs::read_to_string(path)?;
    setup_from_ron_str(&contents)
}

/// Parse and validate a setup from a RON string.
pub fn setup_from_ron_str(ron_str: &str) -> Result<MatchSetup, ScenarioError> {
    let setup: MatchSetup = ron::from_str(ron_str)?;
    setup.validate()?;
    Ok(setup)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file() {
        let err = load_setup("/nonexistent/match.ron").unwrap_err();
        assert!(matches!(err, ScenarioError::FileNotFound(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match.ron");
        std::fs::write(&path, r#"(home: (name: "Harbour"), away: (name: "Uplands"), seed: 9, minutes: 5)"#).unwrap();

        let setup = load_setup(&path).unwrap();
        assert_eq!(setup.home.name, "Harbour");
        assert_eq!(setup.seed, 9);
        assert_eq!(setup.minutes, 5);
    }

    #[test]
    fn test_parse_error() {
        let err = setup_from_ron_str("(home: ").unwrap_err();
        assert!(matches!(err, ScenarioError::ParseError(_)));
    }

    #[test]
    fn test_short_roster_is_invalid() {
        let ron = r#"(
            home: (name: "H", roster: Some([(speed: 50, shoot: 50, pass: 50, dribble: 50, defense: 50)])),
            away: (name: "A"),
        )"#;
        let err = setup_from_ron_str(ron).unwrap_err();
        assert!(matches!(err, ScenarioError::Invalid(MatchError::InvalidSetup(_))));
    }
}
