//! Action resolvers.
//!
//! Each resolver owns one family of state transitions and works on a
//! [`TickContext`](crate::world::TickContext): the world, the engine
//! configuration, the RNG and the period log being written. Resolvers
//! return an explicit outcome so the scheduler and tests can see what
//! happened without reading the log back.

pub mod clear;
pub mod dribble;
pub mod flight;
pub mod holder;
pub mod kickoff;
pub mod pass;
pub mod set_play;
pub mod shoot;

pub use clear::clear;
pub use dribble::{dribble, DribbleOutcome};
pub use flight::{assign_chase_intents, process_ball, process_flight, process_loose_ball, TouchOutcome};
pub use holder::{take_turn, HolderAction};
pub use kickoff::{reset_after_goal, take_kickoff};
pub use pass::{pass, PassOutcome};
pub use set_play::{award_foul, classify_exit, restart_from_exit, Restart};
pub use shoot::{shoot, ShotOutcome};
