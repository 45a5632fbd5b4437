//! Possession tracking, transition freezes and the score.

use serde::{Deserialize, Serialize};

use crate::ball::Ball;
use crate::components::{Player, PlayerId, TeamSide};

/// A possession change detected at the start of a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PossessionChange {
    /// Side that now attacks.
    pub gained: TeamSide,
    /// Player who lost the ball directly.
    pub lost_holder: Option<PlayerId>,
    /// Player who now holds the ball.
    pub new_holder: Option<PlayerId>,
}

/// Match-level state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchState {
    attacking_side: TeamSide,
    previous_attacking_side: TeamSide,
    last_holder: Option<PlayerId>,
    home_score: u32,
    away_score: u32,
}

impl MatchState {
    /// Kickoff state: Home attacking, no score.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            attacking_side: TeamSide::Home,
            previous_attacking_side: TeamSide::Home,
            last_holder: None,
            home_score: 0,
            away_score: 0,
        }
    }

    /// Side in possession (kept while the ball is not held).
    #[must_use]
    pub const fn attacking_side(&self) -> TeamSide {
        self.attacking_side
    }

    /// Side that attacked at the previous period boundary.
    #[must_use]
    pub const fn previous_attacking_side(&self) -> TeamSide {
        self.previous_attacking_side
    }

    /// Most recent holder.
    #[must_use]
    pub const fn last_holder(&self) -> Option<PlayerId> {
        self.last_holder
    }

    /// Goals for a side.
    #[must_use]
    pub const fn score(&self, side: TeamSide) -> u32 {
        match side {
            TeamSide::Home => self.home_score,
            TeamSide::Away => self.away_score,
        }
    }

    /// `(home, away)` goals.
    #[must_use]
    pub const fn scores(&self) -> (u32, u32) {
        (self.home_score, self.away_score)
    }

    /// Take the attacking side from the ball holder, if any.
    pub fn refresh_attacking_side(&mut self, ball: &Ball) {
        if let Some(team) = ball.holder_team() {
            self.attacking_side = team;
        }
    }

    /// Period-start bookkeeping.
    ///
    /// Refreshes the attacking side, applies transition freezes when it
    /// changed since the previous period and records the current holder.
    pub fn begin_period(&mut self, ball: &Ball, players: &mut [Player]) -> Option<PossessionChange> {
        self.refresh_attacking_side(ball);

        let change = (self.attacking_side != self.previous_attacking_side).then(|| {
            PossessionChange {
                gained: self.attacking_side,
                lost_holder: self.last_holder,
                new_holder: ball.holder(),
            }
        });

        if let Some(change) = change {
            apply_transition(players, change);
            tracing::trace!(
                gained = %change.gained,
                lost_holder = ?change.lost_holder,
                "Possession changed"
            );
        }

        self.previous_attacking_side = self.attacking_side;
        if let Some(holder) = ball.holder() {
            self.last_holder = Some(holder);
        }
        change
    }

    /// After a restart: possession goes to `side` without a transition.
    pub fn sync_restart(&mut self, holder: PlayerId, side: TeamSide) {
        self.attacking_side = side;
        self.previous_attacking_side = side;
        self.last_holder = Some(holder);
    }

    /// Credit a goal.
    pub fn record_goal(&mut self, side: TeamSide) {
        match side {
            TeamSide::Home => self.home_score += 1,
            TeamSide::Away => self.away_score += 1,
        }
    }

    /// Count every player's freeze down by one period.
    pub fn tick_down_freezes(players: &mut [Player]) {
        for player in players {
            player.tick_down_freeze();
        }
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply freezes for a possession change.
///
/// The losing side gets defence freezes (longest for the player who lost
/// the ball), the winning side offence freezes (longest for the new
/// holder). Each player's other counter is cleared.
pub fn apply_transition(players: &mut [Player], change: PossessionChange) {
    for player in players {
        if player.side == change.gained {
            player.defense_freeze = 0;
            player.offense_freeze = if Some(player.id) == change.new_holder {
                player.variable.holder_offense_freeze
            } else {
                player.variable.offense_freeze
            };
        } else {
            player.offense_freeze = 0;
            player.defense_freeze = if Some(player.id) == change.lost_holder {
                player.variable.lost_holder_freeze
            } else {
                player.variable.defense_freeze
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{AnchorParams, PlayerStatus, PlayerVariable};
    use crate::pitch::{Coordinate, CENTER};

    fn player(id: u32, defense: u8) -> Player {
        let status = PlayerStatus::new(50, 50, 50, 50, defense);
        let variable =
            PlayerVariable::derive(&status, AnchorParams::new(CENTER, CENTER, [0.0; 4]), Vec::new());
        Player::new(PlayerId(id), "T", "CB", status, variable, CENTER)
    }

    #[test]
    fn test_no_change_no_freeze() {
        let mut state = MatchState::new();
        let mut players = vec![player(1, 50), player(101, 50)];
        let mut ball = Ball::new();
        ball.set_holder(PlayerId(1), TeamSide::Home, CENTER);

        assert!(state.begin_period(&ball, &mut players).is_none());
        assert!(players.iter().all(|p| p.offense_freeze == 0 && p.defense_freeze == 0));
        assert_eq!(state.last_holder(), Some(PlayerId(1)));
    }

    #[test]
    fn test_turnover_freezes_both_sides() {
        let mut state = MatchState::new();
        let mut players = vec![player(1, 95), player(2, 40), player(101, 50), player(102, 50)];
        let mut ball = Ball::new();
        ball.set_holder(PlayerId(1), TeamSide::Home, CENTER);
        state.begin_period(&ball, &mut players);

        ball.set_holder(PlayerId(101), TeamSide::Away, Coordinate::new(35, 51));
        let change = state.begin_period(&ball, &mut players).unwrap();
        assert_eq!(change.gained, TeamSide::Away);
        assert_eq!(change.lost_holder, Some(PlayerId(1)));

        // Lost the ball directly with defence 95.
        assert_eq!(players[0].defense_freeze, 3);
        // Teammate with defence 40.
        assert_eq!(players[1].defense_freeze, 4);
        // New holder, offence rating 50.
        assert_eq!(players[2].offense_freeze, 6);
        assert_eq!(players[3].offense_freeze, 3);
        assert_eq!(state.attacking_side(), TeamSide::Away);
        assert_eq!(state.previous_attacking_side(), TeamSide::Away);
    }

    #[test]
    fn test_loose_ball_keeps_attacking_side() {
        let mut state = MatchState::new();
        let mut players = vec![player(1, 50)];
        let mut ball = Ball::new();
        ball.set_loose(CENTER);
        assert!(state.begin_period(&ball, &mut players).is_none());
        assert_eq!(state.attacking_side(), TeamSide::Home);
    }

    #[test]
    fn test_restart_sync_suppresses_transition() {
        let mut state = MatchState::new();
        let mut players = vec![player(1, 50), player(101, 50)];
        let mut ball = Ball::new();
        ball.set_holder(PlayerId(101), TeamSide::Away, CENTER);
        state.sync_restart(PlayerId(101), TeamSide::Away);
        assert!(state.begin_period(&ball, &mut players).is_none());
    }

    #[test]
    fn test_record_goal() {
        let mut state = MatchState::new();
        state.record_goal(TeamSide::Away);
        state.record_goal(TeamSide::Away);
        assert_eq!(state.scores(), (0, 2));
        assert_eq!(state.score(TeamSide::Away), 2);
    }
}
