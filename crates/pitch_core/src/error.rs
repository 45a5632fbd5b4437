//! Error types for the match simulation.
//!
//! In-match outcomes (fouls, turnovers, restarts) are game events, never
//! errors. Errors only arise when building a match from configuration or
//! when moving data across the crate boundary.

use thiserror::Error;

/// Result type alias using [`MatchError`].
pub type Result<T> = std::result::Result<T, MatchError>;

/// Top-level error type for match setup and data handling.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Match setup is unusable.
    #[error("Invalid match setup: {0}")]
    InvalidSetup(String),

    /// Formation does not provide one slot per outfield player.
    #[error("Formation '{name}' has {found} outfield slots, expected {expected}")]
    FormationSlotCount {
        /// Formation name.
        name: String,
        /// Number of slots found.
        found: usize,
        /// Number of slots required.
        expected: usize,
    },

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path (or label) of the source that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Match log could not be encoded or decoded.
    #[error("Match log codec error: {0}")]
    LogCodec(String),

    /// A world invariant was broken.
    #[error("Invariant violated at period {period}: {message}")]
    InvariantViolation {
        /// Period where the violation was detected.
        period: u32,
        /// Description of the violation.
        message: String,
    },
}
