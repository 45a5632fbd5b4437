//! The match world: player arena, ball, teams and possession state.
//!
//! Players live in one `Vec` addressed by [`PlayerId::arena_index`]. The
//! scheduler owns the world for the whole tick and lends it to resolvers
//! through a [`TickContext`]; nothing keeps references across ticks.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::ball::{Ball, FlightPlan};
use crate::components::{
    ActionCode, AnchorParams, DefenseIntent, HolderIntent, OffenseIntent, Player, PlayerId,
    PlayerStatus, PlayerVariable, Role, TeamSide, TEAM_SIZE,
};
use crate::config::EngineConfig;
use crate::data::{MatchSetup, PositionTable, TeamSetup};
use crate::error::{MatchError, Result};
use crate::log::PeriodLog;
use crate::match_state::MatchState;
use crate::pitch::{Coordinate, CENTER};
use crate::team::Team;

/// Team index of the kickoff passer.
pub const KICKOFF_PASSER_INDEX: usize = 10;

/// Team index of the kickoff receiver and the penalty taker.
pub const KICKOFF_RECEIVER_INDEX: usize = 9;

/// A scripted kick waiting for its taker's next held tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PendingKick {
    /// First pass after a kickoff.
    Kickoff {
        /// Player on the centre spot.
        passer: PlayerId,
        /// Teammate the pass goes to.
        receiver: PlayerId,
    },
    /// Penalty awarded in the box.
    Penalty {
        /// Taker on the spot.
        kicker: PlayerId,
    },
}

/// All mutable match state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchWorld {
    /// Both teams' players; home at 0..11, away at 11..22.
    pub players: Vec<Player>,
    /// The ball.
    pub ball: Ball,
    /// Possession tracking and score.
    pub state: MatchState,
    /// Home team data.
    pub home: Team,
    /// Away team data.
    pub away: Team,
    /// Scripted kick awaiting execution.
    pub pending: Option<PendingKick>,
}

impl MatchWorld {
    /// Build both teams from a setup, drawing missing abilities and intents
    /// from `rng`. The ball starts with a home kickoff.
    pub fn from_setup(setup: &MatchSetup, rng: &mut dyn RngCore) -> Result<Self> {
        setup.validate()?;
        let positions = setup.positions.clone().unwrap_or_default();

        let home = Team::new(
            TeamSide::Home,
            setup.home.name.clone(),
            setup.home.formation.clone().unwrap_or_default(),
        )?;
        let away = Team::new(
            TeamSide::Away,
            setup.away.name.clone(),
            setup.away.formation.clone().unwrap_or_default(),
        )?;

        let mut players = Vec::with_capacity(TEAM_SIZE * 2);
        players.extend(build_players(&home, &setup.home, &positions, rng));
        players.extend(build_players(&away, &setup.away, &positions, rng));

        let mut world = Self {
            players,
            ball: Ball::new(),
            state: MatchState::new(),
            home,
            away,
            pending: None,
        };
        world.setup_kickoff(TeamSide::Home);

        tracing::debug!(home = %world.home.name, away = %world.away.name, "Match world built");
        Ok(world)
    }

    /// Player by id.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.arena_index()).filter(|p| p.id == id)
    }

    /// Mutable player by id.
    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id.arena_index()).filter(|p| p.id == id)
    }

    /// Team data for a side.
    #[must_use]
    pub const fn team(&self, side: TeamSide) -> &Team {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }

    /// Current holder, if the ball is held.
    #[must_use]
    pub fn holder(&self) -> Option<PlayerId> {
        self.ball.holder()
    }

    /// Coordinate of a player, or the ball's if the id is unknown.
    #[must_use]
    pub fn coordinate_of(&self, id: PlayerId) -> Coordinate {
        self.player(id).map_or(self.ball.coordinate(), |p| p.coordinate)
    }

    /// Hand the ball to `id` at their current cell.
    pub fn give_ball(&mut self, id: PlayerId) {
        let Some(at) = self.player(id).map(|p| p.coordinate) else {
            return;
        };
        for player in &mut self.players {
            player.set_has_ball(player.id == id);
        }
        self.ball.set_holder(id, id.side(), at);
    }

    /// Move `id` onto `at` and hand them the ball.
    pub fn give_ball_at(&mut self, id: PlayerId, at: Coordinate) {
        if let Some(player) = self.player_mut(id) {
            player.coordinate = at;
            player.intent = at;
        }
        self.give_ball(id);
    }

    /// Drop the ball loose at `at`, last touched by `touch`.
    pub fn release_loose(&mut self, at: Coordinate, touch: TeamSide) {
        self.clear_ball_flags();
        self.ball.set_last_touch(touch);
        self.ball.set_loose(at);
    }

    /// Strike the ball from `from` along `plan`.
    pub fn launch(&mut self, from: Coordinate, plan: FlightPlan) {
        self.clear_ball_flags();
        self.ball.start_flight(from, plan);
    }

    fn clear_ball_flags(&mut self) {
        for player in &mut self.players {
            player.set_has_ball(false);
        }
    }

    /// Clear ball and duel state on every player ahead of a restart.
    pub fn reset_for_restart(&mut self) {
        for player in &mut self.players {
            player.reset_for_restart();
        }
    }

    /// Put a player on a cell and make it their intent.
    pub fn place(&mut self, id: PlayerId, at: Coordinate) {
        if let Some(player) = self.player_mut(id) {
            player.coordinate = at;
            player.intent = at;
        }
    }

    /// Everyone back to kickoff positions with freezes and duels cleared.
    pub fn reset_to_formation(&mut self) {
        for player in &mut self.players {
            let team = match player.side {
                TeamSide::Home => &self.home,
                TeamSide::Away => &self.away,
            };
            let at = team.formation_coordinate(player.id.index());
            player.coordinate = at;
            player.intent = at;
            player.offense_freeze = 0;
            player.defense_freeze = 0;
            player.move_points = 0;
            player.reset_for_restart();
        }
        self.pending = None;
    }

    /// Put the kickoff passer on the centre spot with the ball.
    pub fn setup_kickoff(&mut self, side: TeamSide) {
        let passer = PlayerId::new(side, KICKOFF_PASSER_INDEX);
        let receiver = PlayerId::new(side, KICKOFF_RECEIVER_INDEX);
        self.give_ball_at(passer, CENTER);
        self.state.sync_restart(passer, side);
        self.pending = Some(PendingKick::Kickoff { passer, receiver });
    }

    /// Check the ball/holder invariants and that everyone is on the pitch.
    pub fn check_invariants(&self, period: u32) -> Result<()> {
        let violation = |message: String| MatchError::InvariantViolation { period, message };

        let flagged: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|p| p.has_ball())
            .map(|p| p.id)
            .collect();
        if flagged.len() > 1 {
            return Err(violation(format!("several holders flagged: {flagged:?}")));
        }
        match (self.ball.holder(), flagged.first()) {
            (Some(holder), Some(&flag)) if holder == flag => {}
            (None, None) => {}
            (holder, flag) => {
                return Err(violation(format!("ball holder {holder:?} but flagged {flag:?}")));
            }
        }
        if let Some(player) = self.players.iter().find(|p| p.coordinate.is_out_of_pitch()) {
            return Err(violation(format!("{} off the pitch at {}", player.profile.name, player.coordinate)));
        }
        if self.ball.coordinate().is_out_of_pitch() {
            return Err(violation(format!("ball off the pitch at {}", self.ball.coordinate())));
        }
        Ok(())
    }
}

fn build_players(
    team: &Team,
    setup: &TeamSetup,
    positions: &PositionTable,
    rng: &mut dyn RngCore,
) -> Vec<Player> {
    (0..TEAM_SIZE)
        .map(|index| {
            let id = PlayerId::new(team.side, index);
            let position = team.formation.position_name(index).to_string();
            let definition = positions.lookup(&position);
            let status = setup
                .roster
                .as_ref()
                .and_then(|roster| roster.get(index).copied())
                .unwrap_or_else(|| random_status(rng));

            let (attack_base, defense_base) = team
                .formation
                .slot(index)
                .map_or((team.formation.goalkeeper, team.formation.goalkeeper), |slot| {
                    (slot.goal_kick_offense, slot.goal_kick_defense)
                });
            let anchor = AnchorParams::new(attack_base, defense_base, definition.rates());
            let variable = PlayerVariable::derive(&status, anchor, definition.movable_area.clone());

            let mut player = Player::new(
                id,
                &team.name,
                &position,
                status,
                variable,
                team.formation_coordinate(index),
            );
            assign_intents(&mut player, rng);
            player
        })
        .collect()
}

fn random_status(rng: &mut dyn RngCore) -> PlayerStatus {
    PlayerStatus::new(
        rng.gen_range(1..=100),
        rng.gen_range(1..=100),
        rng.gen_range(1..=100),
        rng.gen_range(1..=100),
        rng.gen_range(1..=100),
    )
}

fn assign_intents(player: &mut Player, rng: &mut dyn RngCore) {
    player.holder_intent = match player.role {
        Role::Goalkeeper | Role::Defender => HolderIntent::AssertivePass,
        Role::Midfielder | Role::Forward => HolderIntent::ALL.choose(rng).copied().unwrap_or_default(),
    };
    player.offense_intent = OffenseIntent::ALL.choose(rng).copied().unwrap_or_default();
    player.defense_intent = DefenseIntent::ALL.choose(rng).copied().unwrap_or_default();
}

/// Everything a resolver may touch during one tick.
pub struct TickContext<'a> {
    /// World state, exclusively borrowed for the tick.
    pub world: &'a mut MatchWorld,
    /// Engine tuning.
    pub config: &'a EngineConfig,
    /// Seeded random source.
    pub rng: &'a mut dyn RngCore,
    /// Record being built for this period.
    pub log: &'a mut PeriodLog,
}

impl<'a> TickContext<'a> {
    /// Bundle the per-tick borrows.
    pub fn new(
        world: &'a mut MatchWorld,
        config: &'a EngineConfig,
        rng: &'a mut dyn RngCore,
        log: &'a mut PeriodLog,
    ) -> Self {
        Self {
            world,
            config,
            rng,
            log,
        }
    }

    /// Set a player's action code.
    pub fn mark(&mut self, id: PlayerId, action: ActionCode) {
        if let Some(player) = self.world.player_mut(id) {
            player.action = action;
        }
    }
}
