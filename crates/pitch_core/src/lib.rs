//! # Pitch Core
//!
//! Deterministic football match simulation core.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness (every draw comes from the seeded match RNG)
//!
//! This separation enables:
//! - Replaying any match from its seed
//! - Headless batch runs
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`pitch`] - Pitch grid, coordinates and areas
//! - [`components`] - Player, team side, roles and action codes
//! - [`data`] - Formation, role and match setup tables (RON)
//! - [`config`] - Engine tuning constants
//! - [`world`] - Match world and the per-tick context
//! - [`evaluator`] - Read-only tactical queries
//! - [`positioning`] - Off-ball intents and movement
//! - [`resolvers`] - Holder actions, ball flight and set plays
//! - [`simulation`] - Match scheduler
//! - [`log`] - Per-period match log
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ball;
pub mod components;
pub mod config;
pub mod data;
pub mod error;
pub mod evaluator;
pub mod log;
pub mod match_state;
pub mod math;
pub mod pitch;
pub mod positioning;
pub mod resolvers;
pub mod simulation;
pub mod team;
pub mod vision;
pub mod world;

#[cfg(test)]
mod testing;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::ball::{Ball, BallState, BallStateKind};
    pub use crate::components::*;
    pub use crate::config::EngineConfig;
    pub use crate::data::{FormationData, MatchSetup, PositionTable, TeamSetup};
    pub use crate::error::{MatchError, Result};
    pub use crate::log::{GoalRecord, MatchLog, PeriodLog, PlayerSnapshot};
    pub use crate::match_state::MatchState;
    pub use crate::math::Fixed;
    pub use crate::pitch::{Coordinate, CENTER, MAX_X, MAX_Y};
    pub use crate::simulation::{MatchSimulation, PERIODS_PER_MINUTE, PERIODS_PER_SECOND};
    pub use crate::world::{MatchWorld, PendingKick, TickContext};
}
