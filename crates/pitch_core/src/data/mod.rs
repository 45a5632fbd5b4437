//! Data structures for match configuration.
//!
//! Formation tables, position-role tables and match setups. All structs
//! deserialize from RON and have built-in defaults so a match can run
//! without any data files.
//!
//! **Note:** This module contains no file IO - it only defines data types
//! and parses strings. File loading is handled by `pitch_headless`.

mod formation_data;
mod position_data;
mod setup_data;

pub use formation_data::{FormationData, FormationSlot, OUTFIELD_SLOTS};
pub use position_data::{area_contains, PositionDefinition, PositionTable, FALLBACK_POSITION};
pub use setup_data::{MatchSetup, TeamSetup};

use crate::error::{MatchError, Result};

/// Parse any RON document into `T`, labelling errors with `label`.
pub(crate) fn parse_ron<T: serde::de::DeserializeOwned>(ron_str: &str, label: &str) -> Result<T> {
    ron::from_str(ron_str).map_err(|e| MatchError::DataParseError {
        path: label.to_string(),
        message: e.to_string(),
    })
}
