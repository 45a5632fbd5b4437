//! Per-period log records.
//!
//! One [`PeriodLog`] is emitted per simulated period and never changed
//! afterwards. A renderer can replay a match from the [`MatchLog`] alone.

use serde::{Deserialize, Serialize};

use crate::ball::{Ball, BallStateKind};
use crate::components::{ActionCode, Player, PlayerId, TeamSide};
use crate::error::{MatchError, Result};
use crate::match_state::MatchState;
use crate::pitch::Coordinate;
use crate::simulation::{PERIODS_PER_MINUTE, PERIODS_PER_SECOND};

/// One player's state at the end of a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Player id.
    pub id: PlayerId,
    /// Position.
    pub coordinate: Coordinate,
    /// Holder flag.
    pub has_ball: bool,
    /// Action recorded this period.
    pub action: ActionCode,
}

/// Goal metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoalRecord {
    /// Scoring side.
    pub side: TeamSide,
    /// Scorer.
    pub scorer: PlayerId,
    /// Where the ball crossed (goal-line centre of the defending goal).
    pub coordinate: Coordinate,
    /// Arena index of the player taking the following kickoff.
    pub kickoff_player_index: usize,
}

/// Everything that happened in one period.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodLog {
    /// Period index from kickoff.
    pub period: u32,
    /// Holder at the start of the holder phase.
    pub holder: Option<PlayerId>,
    /// What the holder did.
    pub holder_action: ActionCode,
    /// Second party (receiver, interceptor, tackler, restart taker...).
    pub involver: Option<PlayerId>,
    /// What the involver did.
    pub involver_action: ActionCode,
    /// Ball position.
    pub ball: Coordinate,
    /// Ball state.
    pub ball_state: BallStateKind,
    /// Every player, arena order.
    pub players: Vec<PlayerSnapshot>,
    /// Set when a goal was scored this period.
    pub goal: Option<GoalRecord>,
    /// `(home, away)` after this period.
    pub score: (u32, u32),
}

impl PeriodLog {
    /// Empty record for `period`.
    #[must_use]
    pub fn new(period: u32) -> Self {
        Self {
            period,
            holder: None,
            holder_action: ActionCode::None,
            involver: None,
            involver_action: ActionCode::None,
            ball: Coordinate::default(),
            ball_state: BallStateKind::Dead,
            players: Vec::new(),
            goal: None,
            score: (0, 0),
        }
    }

    /// Whether a goal was scored this period.
    #[must_use]
    pub const fn has_goal(&self) -> bool {
        self.goal.is_some()
    }

    /// Record the holder's action.
    pub fn set_holder_action(&mut self, action: ActionCode) {
        self.holder_action = action;
    }

    /// Record the second party.
    pub fn set_involver(&mut self, id: PlayerId, action: ActionCode) {
        self.involver = Some(id);
        self.involver_action = action;
    }

    /// Record the second party unless one is already set.
    pub fn set_involver_if_empty(&mut self, id: PlayerId, action: ActionCode) {
        if self.involver.is_none() {
            self.set_involver(id, action);
        }
    }

    /// Copy the world into the snapshot fields.
    pub fn capture(&mut self, players: &[Player], ball: &Ball, state: &MatchState) {
        self.players = players
            .iter()
            .map(|p| PlayerSnapshot {
                id: p.id,
                coordinate: p.coordinate,
                has_ball: p.has_ball(),
                action: p.action,
            })
            .collect();
        self.ball = ball.coordinate();
        self.ball_state = ball.kind();
        self.score = state.scores();
    }

    /// Match clock at this period.
    #[must_use]
    pub const fn clock(&self) -> MatchClock {
        MatchClock(self.period)
    }
}

/// Match clock derived from a period index, shown as `m:ss.t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchClock(pub u32);

impl std::fmt::Display for MatchClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let minutes = self.0 / PERIODS_PER_MINUTE;
        let within = self.0 % PERIODS_PER_MINUTE;
        let seconds = within / PERIODS_PER_SECOND;
        let tenths = within % PERIODS_PER_SECOND;
        write!(f, "{minutes}:{seconds:02}.{tenths}")
    }
}

/// The full output of a match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchLog {
    /// Home team name.
    pub home_name: String,
    /// Away team name.
    pub away_name: String,
    /// Seed the match ran with.
    pub seed: u64,
    /// One record per period, in order.
    pub periods: Vec<PeriodLog>,
}

impl MatchLog {
    /// Empty log.
    #[must_use]
    pub fn new(home_name: impl Into<String>, away_name: impl Into<String>, seed: u64) -> Self {
        Self {
            home_name: home_name.into(),
            away_name: away_name.into(),
            seed,
            periods: Vec::new(),
        }
    }

    /// Append a record.
    pub fn push(&mut self, record: PeriodLog) {
        self.periods.push(record);
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Final `(home, away)` score; `(0, 0)` for an empty log.
    #[must_use]
    pub fn final_score(&self) -> (u32, u32) {
        self.periods.last().map_or((0, 0), |p| p.score)
    }

    /// All goals in order.
    pub fn goals(&self) -> impl Iterator<Item = (&PeriodLog, &GoalRecord)> {
        self.periods
            .iter()
            .filter_map(|p| p.goal.as_ref().map(|g| (p, g)))
    }

    /// Compact binary encoding.
    pub fn encode(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| MatchError::LogCodec(e.to_string()))
    }

    /// Decode from [`MatchLog::encode`] output.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| MatchError::LogCodec(e.to_string()))
    }
}
