//! Engine tuning constants.
//!
//! Every probability, radius and range the resolvers use lives here as a
//! named field so a match can be re-tuned from a RON file without touching
//! code. `Default` reproduces the stock tuning.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::{MatchError, Result};

/// A probability that moves linearly with a 0..=100 ability score and is
/// clamped to `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityBand {
    /// Lower clamp.
    pub min: f64,
    /// Upper clamp.
    pub max: f64,
}

impl ProbabilityBand {
    /// Create a band.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp an arbitrary value into the band.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// `max` at ability 0, falling to `min` at ability 100.
    #[must_use]
    pub fn falling(&self, ability: u32) -> f64 {
        self.clamp(self.max - f64::from(ability) / 100.0 * (self.max - self.min))
    }

    /// `min` at ability 0, rising to `max` at ability 100.
    #[must_use]
    pub fn rising(&self, ability: u32) -> f64 {
        self.clamp(self.min + f64::from(ability) / 100.0 * (self.max - self.min))
    }
}

/// Uniform integer in `lo..=hi`.
pub fn roll_range(rng: &mut dyn RngCore, lo: i32, hi: i32) -> i32 {
    if hi <= lo {
        return lo;
    }
    rng.gen_range(lo..=hi)
}

/// Uniform offset in `-spread..=spread`.
pub fn roll_spread(rng: &mut dyn RngCore, spread: i32) -> i32 {
    roll_range(rng, -spread, spread)
}

/// Pass tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassConfig {
    /// Overhit chance, falling with pass ability.
    pub overhit: ProbabilityBand,
    /// Extra distance range added to an overhit pass.
    pub overhit_extra: (i32, i32),
    /// Stray chance, falling with pass ability.
    pub stray: ProbabilityBand,
    /// Clamp for the per-axis stray error.
    pub stray_error: (i32, i32),
    /// Chance an interceptor only deflects the ball.
    pub deflect_prob: f64,
    /// Per-axis spread of a deflection.
    pub deflect_spread: i32,
    /// Visible teammates sampled when picking a receiver.
    pub target_sample_size: usize,
    /// One-touch pass chance, rising with pass ability.
    pub one_touch: ProbabilityBand,
    /// Trap miss chance, falling with first-touch ability.
    pub trap_miss: ProbabilityBand,
    /// Added trap miss chance when the ball arrives from outside the view.
    pub trap_miss_out_of_view_bonus: f64,
    /// Per-axis spread of a miscontrolled ball.
    pub trap_miss_spread: (i32, i32),
    /// Handball chance, falling with defence ability.
    pub handball: ProbabilityBand,
    /// Cells per tick of the scripted kickoff pass.
    pub kickoff_speed: u32,
}

impl Default for PassConfig {
    fn default() -> Self {
        Self {
            overhit: ProbabilityBand::new(0.03, 0.18),
            overhit_extra: (8, 18),
            stray: ProbabilityBand::new(0.05, 0.22),
            stray_error: (2, 8),
            deflect_prob: 0.45,
            deflect_spread: 10,
            target_sample_size: 3,
            one_touch: ProbabilityBand::new(0.1, 0.45),
            trap_miss: ProbabilityBand::new(0.03, 0.2),
            trap_miss_out_of_view_bonus: 0.15,
            trap_miss_spread: (4, 3),
            handball: ProbabilityBand::new(0.02, 0.12),
            kickoff_speed: 2,
        }
    }
}

/// Shot and goalkeeper tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotConfig {
    /// Distance to the attacked goal line inside which a shot is considered.
    pub close_range: i32,
    /// Wider range for holders who prefer to shoot.
    pub assertive_range: i32,
    /// Chance a holder in range chooses to shoot.
    pub close_range_select_prob: f64,
    /// Block chance, rising with the blocker's defence.
    pub block: ProbabilityBand,
    /// Max lateral gap between shooter and blocker.
    pub block_lateral: i32,
    /// Max depth gap between shooter and blocker.
    pub block_depth: i32,
    /// Per-axis spread of a blocked shot.
    pub block_deflect_spread: i32,
    /// Catch chance, rising with the keeper's defence.
    pub keeper_catch: ProbabilityBand,
    /// Per-axis spread of a parry.
    pub parry_spread: (i32, i32),
}

impl Default for ShotConfig {
    fn default() -> Self {
        Self {
            close_range: 16,
            assertive_range: 30,
            close_range_select_prob: 0.7,
            block: ProbabilityBand::new(0.18, 0.43),
            block_lateral: 6,
            block_depth: 10,
            block_deflect_spread: 8,
            keeper_catch: ProbabilityBand::new(0.55, 0.9),
            parry_spread: (10, 6),
        }
    }
}

/// Dribble and duel tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelConfig {
    /// Distance at which an opponent engages the dribbler.
    pub contest_radius: i32,
    /// Duel length range in ticks.
    pub duration: (i32, i32),
    /// Random range added to both sides' scores.
    pub score_roll: i32,
    /// Foul chance on a lost duel, falling with the tackler's defence.
    pub foul: ProbabilityBand,
    /// Spill chance clamp on a lost duel.
    pub spill: ProbabilityBand,
    /// Score gap that adds the full spill range.
    pub spill_gap_scale: f64,
    /// Distance range the ball runs after a spill.
    pub spill_distance: (i32, i32),
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            contest_radius: 1,
            duration: (3, 8),
            score_roll: 100,
            foul: ProbabilityBand::new(0.08, 0.28),
            spill: ProbabilityBand::new(0.2, 0.55),
            spill_gap_scale: 300.0,
            spill_distance: (2, 5),
        }
    }
}

/// Clearance tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClearConfig {
    /// Opponent distance that counts as pressure.
    pub pressure_radius: i32,
    /// Clear chance under pressure, falling with pass ability.
    pub under_pressure: ProbabilityBand,
    /// Lateral spread of the clearance target.
    pub lateral_spread: i32,
    /// How far past the goal line the clearance is aimed.
    pub overshoot: (i32, i32),
}

impl Default for ClearConfig {
    fn default() -> Self {
        Self {
            pressure_radius: 2,
            under_pressure: ProbabilityBand::new(0.35, 0.75),
            lateral_spread: 20,
            overshoot: (4, 20),
        }
    }
}

/// Ball flight tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    /// Radius in which a passing player touches the ball.
    pub touch_radius: i32,
    /// Radius of the arrival contest at the end of the path.
    pub arrival_compete_radius: i32,
    /// Base contest score.
    pub score_base: i32,
    /// Score lost per unit of distance.
    pub score_distance_penalty: i32,
    /// Bonus for the designated final holder.
    pub final_holder_bonus: i32,
    /// Bonus for the intended receiver.
    pub intended_receiver_bonus: i32,
    /// Upper bound of the random score term.
    pub score_random_range: i32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            touch_radius: 1,
            arrival_compete_radius: 2,
            score_base: 1000,
            score_distance_penalty: 200,
            final_holder_bonus: 200,
            intended_receiver_bonus: 100,
            score_random_range: 50,
        }
    }
}

/// Vision and positioning tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositioningConfig {
    /// General vision half-angle in degrees.
    pub vision_half_angle_deg: f64,
    /// Central vision half-angle in degrees (shot lane check).
    pub central_vision_half_angle_deg: f64,
    /// Teammate repulsion radius.
    pub repulsion_radius: i32,
    /// Keeper x band.
    pub keeper_band: (i32, i32),
    /// Ball distance inside which a pressing player closes down.
    pub press_radius: i32,
    /// Preferred distance band for a supporting runner.
    pub support_distance: (i32, i32),
    /// Radius counted as crowded when running into space.
    pub crowding_radius: i32,
}

impl Default for PositioningConfig {
    fn default() -> Self {
        Self {
            vision_half_angle_deg: 60.0,
            central_vision_half_angle_deg: 20.0,
            repulsion_radius: 6,
            keeper_band: (20, 50),
            press_radius: 15,
            support_distance: (5, 12),
            crowding_radius: 3,
        }
    }
}

/// All engine tuning.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Passing.
    pub pass: PassConfig,
    /// Shooting.
    pub shot: ShotConfig,
    /// Dribbling.
    pub duel: DuelConfig,
    /// Clearances.
    pub clear: ClearConfig,
    /// Ball flight.
    pub flight: FlightConfig,
    /// Vision and positioning.
    pub positioning: PositioningConfig,
}

impl EngineConfig {
    /// Load from a RON string. Missing fields take their defaults.
    pub fn from_ron_str(ron_str: &str) -> Result<Self> {
        ron::from_str(ron_str).map_err(|e| MatchError::DataParseError {
            path: "<engine config>".to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_band_falling() {
        let band = ProbabilityBand::new(0.03, 0.18);
        assert!((band.falling(0) - 0.18).abs() < 1e-9);
        assert!((band.falling(100) - 0.03).abs() < 1e-9);
        assert!((band.falling(50) - 0.105).abs() < 1e-9);
    }

    #[test]
    fn test_band_rising() {
        let band = ProbabilityBand::new(0.55, 0.9);
        assert!((band.rising(0) - 0.55).abs() < 1e-9);
        assert!((band.rising(100) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_block_band_tops_out_below_half() {
        let block = ShotConfig::default().block;
        assert!((block.rising(0) - 0.18).abs() < 1e-9);
        assert!((block.rising(100) - 0.43).abs() < 1e-9);
    }

    #[test]
    fn test_roll_range_with_zero_draws_takes_low_end() {
        let mut rng = StepRng::new(0, 0);
        assert_eq!(roll_range(&mut rng, 3, 8), 3);
    }

    #[test]
    fn test_roll_range_degenerate() {
        let mut rng = StepRng::new(7, 13);
        assert_eq!(roll_range(&mut rng, 4, 4), 4);
        assert_eq!(roll_spread(&mut rng, 0), 0);
    }

    #[test]
    fn test_partial_ron_override() {
        let config = EngineConfig::from_ron_str("(shot: (close_range: 20))").unwrap();
        assert_eq!(config.shot.close_range, 20);
        assert!((config.shot.close_range_select_prob - 0.7).abs() < 1e-9);
        assert_eq!(config.pass, PassConfig::default());
    }

    #[test]
    fn test_invalid_ron_is_parse_error() {
        let err = EngineConfig::from_ron_str("(shot: 12)").unwrap_err();
        assert!(matches!(err, MatchError::DataParseError { .. }));
    }
}
