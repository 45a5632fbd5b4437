//! Ball state machine.
//!
//! The ball is always in exactly one [`BallState`]. Holder data exists
//! only inside [`BallState::Held`] and flight data only inside
//! [`BallState::Flying`], so every transition drops stale fields with
//! the old variant.

use serde::{Deserialize, Serialize};

use crate::components::{PlayerId, TeamSide};
use crate::pitch::{line_path, Coordinate, CENTER};

/// What happens when a flight reaches a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrivalAction {
    /// Undirected ball (clearance, overhit pass).
    None,
    /// Aimed at a teammate.
    Receive,
    /// Aimed at an intercepting opponent.
    Intercept,
}

/// Parameters for launching a flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightPlan {
    /// Where the ball is aimed. May lie off the pitch.
    pub target: Coordinate,
    /// Path cells advanced per period (at least one).
    pub cells_per_period: u32,
    /// Team credited with the last touch.
    pub passer_team: TeamSide,
    /// Player who struck the ball; ignored for in-flight touches.
    pub kicker: Option<PlayerId>,
    /// Player designated to end up with the ball.
    pub final_holder: Option<PlayerId>,
    /// Player the kicker was aiming for.
    pub intended_receiver: Option<PlayerId>,
    /// Arrival tag.
    pub arrival: ArrivalAction,
}

impl FlightPlan {
    /// An undirected ball toward `target`.
    #[must_use]
    pub const fn untargeted(target: Coordinate, cells_per_period: u32, passer_team: TeamSide) -> Self {
        Self {
            target,
            cells_per_period,
            passer_team,
            kicker: None,
            final_holder: None,
            intended_receiver: None,
            arrival: ArrivalAction::None,
        }
    }

    /// Set the kicker.
    #[must_use]
    pub const fn kicked_by(mut self, kicker: PlayerId) -> Self {
        self.kicker = Some(kicker);
        self
    }

    /// Aim at a receiver who is both final holder and intended receiver.
    #[must_use]
    pub const fn to_receiver(mut self, receiver: PlayerId) -> Self {
        self.final_holder = Some(receiver);
        self.intended_receiver = Some(receiver);
        self.arrival = ArrivalAction::Receive;
        self
    }
}

/// A ball in flight.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Flight {
    /// Where the flight started.
    pub origin: Coordinate,
    /// Final point of the path.
    pub target: Coordinate,
    path: Vec<Coordinate>,
    index: usize,
    /// Path cells advanced per period.
    pub cells_per_period: u32,
    /// Periods left at the planned speed.
    pub remaining_periods: u32,
    /// Team credited with the last touch.
    pub passer_team: TeamSide,
    /// Player who struck the ball.
    pub kicker: Option<PlayerId>,
    /// Player designated to end up with the ball.
    pub final_holder: Option<PlayerId>,
    /// Player the kicker aimed for.
    pub intended_receiver: Option<PlayerId>,
    /// Arrival tag.
    pub arrival: ArrivalAction,
}

impl Flight {
    /// The precomputed path, origin first.
    #[must_use]
    pub fn path(&self) -> &[Coordinate] {
        &self.path
    }

    /// Index of the ball's current path cell.
    #[must_use]
    pub const fn path_index(&self) -> usize {
        self.index
    }

    /// Whether the ball sits on the last path cell.
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.index + 1 >= self.path.len()
    }
}

/// Ball state. Exactly one variant holds at any time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BallState {
    /// Possessed by a player.
    Held {
        /// The holder.
        holder: PlayerId,
        /// The holder's team.
        team: TeamSide,
    },
    /// On the ground, nobody in possession.
    Loose,
    /// Travelling along a path.
    Flying(Flight),
    /// Not in play: the state before the first kickoff.
    Dead,
}

/// Flat state tag for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BallStateKind {
    /// See [`BallState::Held`].
    Held,
    /// See [`BallState::Loose`].
    Loose,
    /// See [`BallState::Flying`].
    Flying,
    /// See [`BallState::Dead`].
    Dead,
}

/// The match ball.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ball {
    coordinate: Coordinate,
    last_touch: Option<TeamSide>,
    state: BallState,
}

impl Ball {
    /// A dead ball on the centre spot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            coordinate: CENTER,
            last_touch: None,
            state: BallState::Dead,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &BallState {
        &self.state
    }

    /// State tag.
    #[must_use]
    pub fn kind(&self) -> BallStateKind {
        match self.state {
            BallState::Held { .. } => BallStateKind::Held,
            BallState::Loose => BallStateKind::Loose,
            BallState::Flying(_) => BallStateKind::Flying,
            BallState::Dead => BallStateKind::Dead,
        }
    }

    /// Ball position.
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Team that touched the ball last.
    #[must_use]
    pub const fn last_touch(&self) -> Option<TeamSide> {
        self.last_touch
    }

    /// Holder id while held.
    #[must_use]
    pub fn holder(&self) -> Option<PlayerId> {
        match self.state {
            BallState::Held { holder, .. } => Some(holder),
            _ => None,
        }
    }

    /// Holder team while held.
    #[must_use]
    pub fn holder_team(&self) -> Option<TeamSide> {
        match self.state {
            BallState::Held { team, .. } => Some(team),
            _ => None,
        }
    }

    /// Flight data while flying.
    #[must_use]
    pub fn flight(&self) -> Option<&Flight> {
        match &self.state {
            BallState::Flying(flight) => Some(flight),
            _ => None,
        }
    }

    /// Give the ball to a player standing at `at`.
    ///
    /// Use [`crate::world::MatchWorld::give_ball`] inside a match so the
    /// players' holder flags stay in step.
    pub fn set_holder(&mut self, holder: PlayerId, team: TeamSide, at: Coordinate) {
        self.coordinate = at;
        self.last_touch = Some(team);
        self.state = BallState::Held { holder, team };
    }

    /// Drop the ball at `at`.
    pub fn set_loose(&mut self, at: Coordinate) {
        self.coordinate = at;
        self.state = BallState::Loose;
    }

    /// Record which team touched the ball last.
    pub fn set_last_touch(&mut self, team: TeamSide) {
        self.last_touch = Some(team);
    }

    /// Move a held ball with its holder.
    pub fn follow_holder(&mut self, at: Coordinate) {
        if matches!(self.state, BallState::Held { .. }) {
            self.coordinate = at;
        }
    }

    /// Launch the ball from `from` along a straight path to `plan.target`.
    pub fn start_flight(&mut self, from: Coordinate, plan: FlightPlan) {
        let path = line_path(from, plan.target);
        let cells = plan.cells_per_period.max(1);
        let steps = (path.len() - 1) as u32;

        self.coordinate = from;
        self.last_touch = Some(plan.passer_team);
        self.state = BallState::Flying(Flight {
            origin: from,
            target: plan.target,
            path,
            index: 0,
            cells_per_period: cells,
            remaining_periods: steps.div_ceil(cells),
            passer_team: plan.passer_team,
            kicker: plan.kicker,
            final_holder: plan.final_holder,
            intended_receiver: plan.intended_receiver,
            arrival: plan.arrival,
        });
    }

    /// Move one cell along the flight path.
    ///
    /// Returns `true` once the ball sits on the final path cell (or when
    /// the ball is not flying at all).
    pub fn advance_flight_one_cell(&mut self) -> bool {
        let BallState::Flying(flight) = &mut self.state else {
            return true;
        };

        if !flight.at_end() {
            flight.index += 1;
            self.coordinate = flight.path[flight.index];
        }
        flight.at_end()
    }

    /// Count down the planned flight time by one period.
    pub fn tick_flight(&mut self) {
        if let BallState::Flying(flight) = &mut self.state {
            flight.remaining_periods = flight.remaining_periods.saturating_sub(1);
        }
    }

    /// End a flight where the ball currently is.
    pub fn end_flight_as_loose(&mut self) {
        if matches!(self.state, BallState::Flying(_)) {
            self.state = BallState::Loose;
        }
    }
}

impl Default for Ball {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ball_is_dead_at_centre() {
        let ball = Ball::new();
        assert_eq!(ball.kind(), BallStateKind::Dead);
        assert_eq!(ball.coordinate(), CENTER);
        assert!(ball.holder().is_none());
        assert!(ball.flight().is_none());
    }

    #[test]
    fn test_holder_fields_only_while_held() {
        let mut ball = Ball::new();
        ball.set_holder(PlayerId(9), TeamSide::Home, Coordinate::new(30, 40));
        assert_eq!(ball.holder(), Some(PlayerId(9)));
        assert_eq!(ball.holder_team(), Some(TeamSide::Home));
        assert_eq!(ball.last_touch(), Some(TeamSide::Home));

        ball.set_loose(Coordinate::new(31, 41));
        assert!(ball.holder().is_none());
        assert!(ball.holder_team().is_none());
        assert_eq!(ball.kind(), BallStateKind::Loose);
    }

    #[test]
    fn test_flight_round_trip_consumes_path() {
        let mut ball = Ball::new();
        let from = Coordinate::new(10, 20);
        let target = Coordinate::new(40, 31);
        ball.start_flight(from, FlightPlan::untargeted(target, 3, TeamSide::Away));

        let path_len = ball.flight().map(|f| f.path().len()).unwrap();
        assert_eq!(path_len, 31);
        assert_eq!(ball.flight().unwrap().remaining_periods, 10);

        let mut advances = 0;
        while !ball.advance_flight_one_cell() {
            advances += 1;
        }
        advances += 1;

        assert_eq!(advances, path_len - 1);
        assert_eq!(ball.coordinate(), target);
        assert_eq!(ball.kind(), BallStateKind::Flying);

        ball.end_flight_as_loose();
        assert_eq!(ball.kind(), BallStateKind::Loose);
        assert!(ball.flight().is_none());
        assert_eq!(ball.coordinate(), target);
    }

    #[test]
    fn test_zero_length_flight_is_already_at_end() {
        let mut ball = Ball::new();
        let spot = Coordinate::new(5, 5);
        ball.start_flight(spot, FlightPlan::untargeted(spot, 2, TeamSide::Home));
        assert!(ball.flight().unwrap().at_end());
        assert!(ball.advance_flight_one_cell());
        assert_eq!(ball.coordinate(), spot);
    }

    #[test]
    fn test_holder_replaced_by_flight() {
        let mut ball = Ball::new();
        ball.set_holder(PlayerId(5), TeamSide::Home, Coordinate::new(30, 30));
        let plan = FlightPlan::untargeted(Coordinate::new(30, 40), 1, TeamSide::Home)
            .kicked_by(PlayerId(5))
            .to_receiver(PlayerId(9));
        ball.start_flight(Coordinate::new(30, 30), plan);
        assert!(ball.holder().is_none());
        let flight = ball.flight().unwrap();
        assert_eq!(flight.final_holder, Some(PlayerId(9)));
        assert_eq!(flight.kicker, Some(PlayerId(5)));
        assert_eq!(flight.arrival, ArrivalAction::Receive);
    }

    #[test]
    fn test_follow_holder_ignored_when_loose() {
        let mut ball = Ball::new();
        ball.set_loose(Coordinate::new(1, 1));
        ball.follow_holder(Coordinate::new(9, 9));
        assert_eq!(ball.coordinate(), Coordinate::new(1, 1));
    }
}
