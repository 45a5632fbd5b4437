//! Player and team-side definitions.
//!
//! Players live in a single arena owned by [`crate::world::MatchWorld`]
//! and are addressed by [`PlayerId`]. Nothing here holds references to
//! other players.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_from_rate, round_to_i32, Fixed};
use crate::pitch::{Coordinate, CENTER, MAX_Y};

/// Players per team.
pub const TEAM_SIZE: usize = 11;

/// Movement points that buy one cell of movement.
pub const MOVE_POINTS_PER_CELL: u32 = 50;

// ============================================================================
// Sides and identifiers
// ============================================================================

/// Which team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TeamSide {
    /// Defends `y = 0`, attacks toward `y = 100`.
    Home,
    /// Defends `y = 100`, attacks toward `y = 0`.
    Away,
}

impl TeamSide {
    /// The other team.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Home => Self::Away,
            Self::Away => Self::Home,
        }
    }

    /// Goal line this side attacks.
    #[must_use]
    pub const fn attacking_goal_y(self) -> i32 {
        match self {
            Self::Home => MAX_Y,
            Self::Away => 0,
        }
    }

    /// Goal line this side defends.
    #[must_use]
    pub const fn own_goal_y(self) -> i32 {
        self.opponent().attacking_goal_y()
    }

    /// +1 when attacking toward larger y, -1 otherwise.
    #[must_use]
    pub const fn forward(self) -> i32 {
        match self {
            Self::Home => 1,
            Self::Away => -1,
        }
    }

    /// Offset of this side's players in the match arena.
    #[must_use]
    pub const fn arena_offset(self) -> usize {
        match self {
            Self::Home => 0,
            Self::Away => TEAM_SIZE,
        }
    }

    /// First player id of this side.
    #[must_use]
    pub const fn id_base(self) -> u32 {
        match self {
            Self::Home => 0,
            Self::Away => 100,
        }
    }

    /// Convert a home-frame coordinate into this side's frame.
    #[must_use]
    pub const fn orient(self, home_frame: Coordinate) -> Coordinate {
        match self {
            Self::Home => home_frame,
            Self::Away => home_frame.mirrored_y(),
        }
    }

    /// Whether `coordinate` lies inside the penalty area this side defends.
    #[must_use]
    pub const fn own_box_contains(self, coordinate: Coordinate) -> bool {
        let in_width = coordinate.x >= 15 && coordinate.x <= 55;
        let in_depth = match self {
            Self::Home => coordinate.y >= 0 && coordinate.y <= 15,
            Self::Away => coordinate.y >= 85 && coordinate.y <= MAX_Y,
        };
        in_width && in_depth
    }

    /// Whether `coordinate` lies in this side's defensive third.
    #[must_use]
    pub const fn in_defensive_third(self, coordinate: Coordinate) -> bool {
        match self {
            Self::Home => coordinate.y <= MAX_Y / 3,
            Self::Away => coordinate.y >= MAX_Y - MAX_Y / 3,
        }
    }
}

impl std::fmt::Display for TeamSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Home => write!(f, "HOME"),
            Self::Away => write!(f, "AWAY"),
        }
    }
}

/// Stable player identifier: home 0..=10, away 100..=110.
///
/// `id % 100` is the team index and encodes the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl PlayerId {
    /// Build an id from side and team index.
    #[must_use]
    pub const fn new(side: TeamSide, index: usize) -> Self {
        Self(side.id_base() + index as u32)
    }

    /// Side this id belongs to.
    #[must_use]
    pub const fn side(self) -> TeamSide {
        if self.0 >= 100 {
            TeamSide::Away
        } else {
            TeamSide::Home
        }
    }

    /// Team index (0 = goalkeeper).
    #[must_use]
    pub const fn index(self) -> usize {
        (self.0 % 100) as usize
    }

    /// Index into the match arena.
    #[must_use]
    pub const fn arena_index(self) -> usize {
        self.side().arena_offset() + self.index()
    }

    /// Role encoded in the id.
    #[must_use]
    pub const fn role(self) -> Role {
        Role::from_index(self.index())
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Broad positional role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Index 0.
    Goalkeeper,
    /// Indices 1..=4.
    Defender,
    /// Indices 5..=8.
    Midfielder,
    /// Indices 9..=10.
    Forward,
}

impl Role {
    /// Role for a team index.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Goalkeeper,
            1..=4 => Self::Defender,
            5..=8 => Self::Midfielder,
            _ => Self::Forward,
        }
    }

    /// Short group label used in player names.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Goalkeeper => "GK",
            Self::Defender => "DF",
            Self::Midfielder => "MF",
            Self::Forward => "FW",
        }
    }
}

// ============================================================================
// Action and intent codes
// ============================================================================

/// What a player did this period, as recorded in the log.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionCode {
    /// Nothing notable.
    #[default]
    None,
    Foul,
    Hand,
    PassSuccess,
    PassFail,
    OneTouchPass,
    DribbleSuccess,
    DribbleFail,
    DribbleBreakthrough,
    DribbleSpill,
    Clear,
    ShootSuccess,
    ShootFail,
    Receive,
    TrapMiss,
    Intercept,
    PassDeflect,
    Tackle,
    ShootCatch,
    ShootBlock,
    ShootParry,
    ThrowIn,
    CornerKick,
    GoalKick,
    FreeKick,
    PenaltyKick,
    /// Scripted first pass after a kickoff.
    Kickoff,
    /// Loose ball picked up.
    Recover,
}

impl ActionCode {
    /// Whether this code marks a set-piece restart.
    #[must_use]
    pub const fn is_restart(self) -> bool {
        matches!(
            self,
            Self::ThrowIn | Self::CornerKick | Self::GoalKick | Self::FreeKick | Self::PenaltyKick
        )
    }
}

/// How a holder prefers to use the ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HolderIntent {
    /// Follow the default decision order.
    #[default]
    Neutral,
    /// Look for a pass before dribbling.
    AssertivePass,
    /// Default order, dribble first.
    AssertiveDribble,
    /// Shoot from further out.
    AssertiveShoot,
}

impl HolderIntent {
    /// All variants, in draw order.
    pub const ALL: [Self; 4] = [
        Self::Neutral,
        Self::AssertivePass,
        Self::AssertiveDribble,
        Self::AssertiveShoot,
    ];
}

/// Off-ball movement preference while attacking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OffenseIntent {
    /// Stay at the dynamic anchor.
    #[default]
    Neutral,
    /// Offer a short option near the holder.
    Support,
    /// Attack the space behind the defence.
    RunIntoSpace,
    /// Keep the formation slot.
    HoldPosition,
    /// Stretch the play toward the touchline.
    MakeWidth,
}

impl OffenseIntent {
    /// All variants, in draw order.
    pub const ALL: [Self; 5] = [
        Self::Neutral,
        Self::Support,
        Self::RunIntoSpace,
        Self::HoldPosition,
        Self::MakeWidth,
    ];
}

/// Off-ball behaviour while defending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DefenseIntent {
    /// Role-banded default.
    #[default]
    Neutral,
    /// Close down the ball when it is near.
    Press,
    /// Track the nearest opponent goal-side.
    Mark,
    /// Hold the anchor.
    Skip,
}

impl DefenseIntent {
    /// All variants, in draw order.
    pub const ALL: [Self; 4] = [Self::Neutral, Self::Press, Self::Mark, Self::Skip];
}

// ============================================================================
// Player data blocks
// ============================================================================

/// Five ability scores on a 1..=100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerStatus {
    /// Movement speed.
    pub speed: u8,
    /// Shooting.
    pub shoot: u8,
    /// Passing.
    pub pass: u8,
    /// Dribbling.
    pub dribble: u8,
    /// Defending.
    pub defense: u8,
}

impl PlayerStatus {
    /// Create a status block.
    #[must_use]
    pub const fn new(speed: u8, shoot: u8, pass: u8, dribble: u8, defense: u8) -> Self {
        Self {
            speed,
            shoot,
            pass,
            dribble,
            defense,
        }
    }

    /// Every ability set to `value`.
    #[must_use]
    pub const fn uniform(value: u8) -> Self {
        Self::new(value, value, value, value, value)
    }

    /// Blended attacking ability used for offence freezes.
    #[must_use]
    pub const fn offense_rating(&self) -> u32 {
        (self.pass as u32 + self.dribble as u32 + self.shoot as u32) / 3
    }
}

impl Default for PlayerStatus {
    fn default() -> Self {
        Self::uniform(50)
    }
}

/// Display identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// Shirt number.
    pub uniform: u8,
    /// Display name.
    pub name: String,
}

/// An in-progress dribble contest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Duel {
    /// The other party.
    pub opponent: PlayerId,
    /// Ticks left before resolution.
    pub remaining: u32,
}

/// Values derived once from status and role data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerVariable {
    /// Cells the search rectangle extends around the anchor.
    pub max_movable: i32,
    /// Defence freeze when this player loses the ball directly.
    pub lost_holder_freeze: u32,
    /// Defence freeze when a teammate loses the ball.
    pub defense_freeze: u32,
    /// Offence freeze when this player wins the ball.
    pub holder_offense_freeze: u32,
    /// Offence freeze when a teammate wins the ball.
    pub offense_freeze: u32,
    /// Formation anchor parameters.
    pub anchor: AnchorParams,
    /// Movable area around the anchor (home frame offsets).
    pub movable_area: Vec<Coordinate>,
}

/// Formation anchor parameters for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnchorParams {
    /// Base when the team attacks (home frame).
    pub attack_base: Coordinate,
    /// Base when the team defends (home frame).
    pub defense_base: Coordinate,
    /// Ball-follow rates while attacking.
    #[serde(with = "crate::math::fixed_serde")]
    pub offense_follow_x: Fixed,
    /// Ball-follow rates while attacking.
    #[serde(with = "crate::math::fixed_serde")]
    pub offense_follow_y: Fixed,
    /// Ball-follow rates while defending.
    #[serde(with = "crate::math::fixed_serde")]
    pub defense_follow_x: Fixed,
    /// Ball-follow rates while defending.
    #[serde(with = "crate::math::fixed_serde")]
    pub defense_follow_y: Fixed,
}

impl AnchorParams {
    /// Build from table data. Rates are converted to fixed point here.
    #[must_use]
    pub fn new(attack_base: Coordinate, defense_base: Coordinate, rates: [f32; 4]) -> Self {
        Self {
            attack_base,
            defense_base,
            offense_follow_x: fixed_from_rate(rates[0]),
            offense_follow_y: fixed_from_rate(rates[1]),
            defense_follow_x: fixed_from_rate(rates[2]),
            defense_follow_y: fixed_from_rate(rates[3]),
        }
    }

    /// Dynamic anchor for the given ball position, clamped to the pitch.
    ///
    /// The base is taken from the attacking or defending variant and
    /// reflected for the away side; each axis then follows the ball's
    /// offset from the centre spot by its own rate.
    #[must_use]
    pub fn dynamic_anchor(&self, side: TeamSide, ball: Coordinate, attacking: bool) -> Coordinate {
        let (base, rate_x, rate_y) = if attacking {
            (self.attack_base, self.offense_follow_x, self.offense_follow_y)
        } else {
            (self.defense_base, self.defense_follow_x, self.defense_follow_y)
        };
        let base = side.orient(base);

        let x = Fixed::from_num(base.x) + rate_x * Fixed::from_num(ball.x - CENTER.x);
        let y = Fixed::from_num(base.y) + rate_y * Fixed::from_num(ball.y - CENTER.y);

        Coordinate::new(round_to_i32(x), round_to_i32(y)).clamped()
    }
}

impl PlayerVariable {
    /// Derive variables from abilities and anchor data.
    #[must_use]
    pub fn derive(status: &PlayerStatus, anchor: AnchorParams, movable_area: Vec<Coordinate>) -> Self {
        let defense = u32::from(status.defense);
        let offense = status.offense_rating();
        Self {
            max_movable: max_movable_for_speed(status.speed),
            lost_holder_freeze: lost_holder_freeze(defense),
            defense_freeze: teammate_freeze(defense),
            holder_offense_freeze: won_holder_freeze(offense),
            offense_freeze: teammate_freeze(offense),
            anchor,
            movable_area,
        }
    }
}

/// Cells of search radius for a speed rating.
#[must_use]
pub const fn max_movable_for_speed(speed: u8) -> i32 {
    if speed < 20 {
        1
    } else if speed >= 90 {
        9
    } else {
        (speed / 10) as i32
    }
}

const fn lost_holder_freeze(defense: u32) -> u32 {
    match defense {
        90.. => 3,
        80..=89 => 4,
        70..=79 => 5,
        60..=69 => 6,
        50..=59 => 7,
        _ => 8,
    }
}

const fn won_holder_freeze(offense: u32) -> u32 {
    match offense {
        90.. => 2,
        80..=89 => 3,
        70..=79 => 4,
        60..=69 => 5,
        50..=59 => 6,
        _ => 7,
    }
}

const fn teammate_freeze(rating: u32) -> u32 {
    match rating {
        90.. => 1,
        70..=89 => 2,
        50..=69 => 3,
        _ => 4,
    }
}

// ============================================================================
// Player
// ============================================================================

/// One player in the match arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Stable id.
    pub id: PlayerId,
    /// Team.
    pub side: TeamSide,
    /// Role derived from the id.
    pub role: Role,
    /// Position name from the formation (e.g. "CB").
    pub position: String,
    /// Display identity.
    pub profile: PlayerProfile,
    /// Abilities.
    pub status: PlayerStatus,
    /// Derived values.
    pub variable: PlayerVariable,
    /// Current cell.
    pub coordinate: Coordinate,
    /// Cell the player is heading to.
    pub intent: Coordinate,
    /// Action recorded this period.
    pub action: ActionCode,
    /// Holder preference.
    pub holder_intent: HolderIntent,
    /// Off-ball attacking preference.
    pub offense_intent: OffenseIntent,
    /// Off-ball defending preference.
    pub defense_intent: DefenseIntent,
    /// Active dribble contest, if any.
    pub duel: Option<Duel>,
    /// Offence freeze ticks remaining.
    pub offense_freeze: u32,
    /// Defence freeze ticks remaining.
    pub defense_freeze: u32,
    /// Movement points carried between periods.
    pub move_points: u32,
    has_ball: bool,
}

impl Player {
    /// Create a player standing at `coordinate`.
    #[must_use]
    pub fn new(
        id: PlayerId,
        team_name: &str,
        position: &str,
        status: PlayerStatus,
        variable: PlayerVariable,
        coordinate: Coordinate,
    ) -> Self {
        let uniform = (id.index() + 1) as u8;
        Self {
            id,
            side: id.side(),
            role: id.role(),
            position: position.to_string(),
            profile: PlayerProfile {
                uniform,
                name: format!("{team_name}_{position}{uniform}"),
            },
            status,
            variable,
            coordinate,
            intent: coordinate,
            action: ActionCode::None,
            holder_intent: HolderIntent::Neutral,
            offense_intent: OffenseIntent::Neutral,
            defense_intent: DefenseIntent::Neutral,
            duel: None,
            offense_freeze: 0,
            defense_freeze: 0,
            move_points: 0,
            has_ball: false,
        }
    }

    /// Whether this player is the ball holder.
    #[must_use]
    pub const fn has_ball(&self) -> bool {
        self.has_ball
    }

    /// Set the holder flag. Only the world keeps this in step with the ball.
    pub(crate) fn set_has_ball(&mut self, value: bool) {
        self.has_ball = value;
    }

    /// Whether this player is the goalkeeper.
    #[must_use]
    pub fn is_goalkeeper(&self) -> bool {
        self.role == Role::Goalkeeper
    }

    /// Whether a freeze blocks this player in the current phase.
    #[must_use]
    pub const fn is_frozen(&self, attacking: bool) -> bool {
        if attacking {
            self.offense_freeze > 0
        } else {
            self.defense_freeze > 0
        }
    }

    /// Count both freeze counters down by one.
    pub fn tick_down_freeze(&mut self) {
        self.offense_freeze = self.offense_freeze.saturating_sub(1);
        self.defense_freeze = self.defense_freeze.saturating_sub(1);
    }

    /// Begin a duel against `opponent` lasting at least one tick.
    pub fn start_duel(&mut self, opponent: PlayerId, ticks: u32) {
        self.duel = Some(Duel {
            opponent,
            remaining: ticks.max(1),
        });
    }

    /// Drop any duel state.
    pub fn clear_duel(&mut self) {
        self.duel = None;
    }

    /// Accumulate movement points and return the cells available this tick.
    pub fn take_move_cells(&mut self) -> i32 {
        self.move_points += u32::from(self.status.speed);
        let cells = self.move_points / MOVE_POINTS_PER_CELL;
        self.move_points -= cells * MOVE_POINTS_PER_CELL;
        cells as i32
    }

    /// Drop the ball flag and any duel ahead of a restart.
    pub(crate) fn reset_for_restart(&mut self) {
        self.has_ball = false;
        self.duel = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_encoding() {
        let gk = PlayerId::new(TeamSide::Away, 0);
        assert_eq!(gk.0, 100);
        assert_eq!(gk.side(), TeamSide::Away);
        assert_eq!(gk.role(), Role::Goalkeeper);
        assert_eq!(gk.arena_index(), 11);

        let fw = PlayerId::new(TeamSide::Home, 10);
        assert_eq!(fw.role(), Role::Forward);
        assert_eq!(fw.arena_index(), 10);
        assert_eq!(PlayerId(104).role(), Role::Defender);
        assert_eq!(PlayerId(5).role(), Role::Midfielder);
    }

    #[test]
    fn test_max_movable_table() {
        assert_eq!(max_movable_for_speed(100), 9);
        assert_eq!(max_movable_for_speed(90), 9);
        assert_eq!(max_movable_for_speed(89), 8);
        assert_eq!(max_movable_for_speed(20), 2);
        assert_eq!(max_movable_for_speed(19), 1);
        assert_eq!(max_movable_for_speed(1), 1);
    }

    #[test]
    fn test_freeze_tables() {
        assert_eq!(lost_holder_freeze(95), 3);
        assert_eq!(lost_holder_freeze(50), 7);
        assert_eq!(lost_holder_freeze(10), 8);
        assert_eq!(won_holder_freeze(90), 2);
        assert_eq!(won_holder_freeze(49), 7);
        assert_eq!(teammate_freeze(70), 2);
        assert_eq!(teammate_freeze(69), 3);
        assert_eq!(teammate_freeze(0), 4);
    }

    #[test]
    fn test_dynamic_anchor_follows_ball() {
        let params = AnchorParams::new(
            Coordinate::new(28, 41),
            Coordinate::new(28, 41),
            [0.5, 0.5, 0.5, 0.5],
        );
        // Ball on the centre spot: anchor is the base.
        assert_eq!(
            params.dynamic_anchor(TeamSide::Home, CENTER, true),
            Coordinate::new(28, 41)
        );
        // Ball 20 units up the pitch pulls the anchor 10 units.
        assert_eq!(
            params.dynamic_anchor(TeamSide::Home, Coordinate::new(35, 70), true),
            Coordinate::new(28, 51)
        );
        // Away reflects the base.
        assert_eq!(
            params.dynamic_anchor(TeamSide::Away, CENTER, false),
            Coordinate::new(28, 59)
        );
    }

    #[test]
    fn test_dynamic_anchor_is_clamped() {
        let params = AnchorParams::new(
            Coordinate::new(2, 98),
            Coordinate::new(2, 98),
            [1.0, 1.0, 1.0, 1.0],
        );
        let anchor = params.dynamic_anchor(TeamSide::Home, Coordinate::new(0, 100), true);
        assert_eq!(anchor, Coordinate::new(0, 100));
    }

    #[test]
    fn test_offense_rating_blends_three_abilities() {
        let status = PlayerStatus::new(10, 90, 60, 30, 10);
        assert_eq!(status.offense_rating(), 60);
    }

    #[test]
    fn test_move_cells_accumulate() {
        let variable = PlayerVariable::derive(
            &PlayerStatus::uniform(30),
            AnchorParams::new(CENTER, CENTER, [0.0; 4]),
            Vec::new(),
        );
        let mut player = Player::new(
            PlayerId(1),
            "Home",
            "CB",
            PlayerStatus::uniform(30),
            variable,
            CENTER,
        );
        assert_eq!(player.take_move_cells(), 0);
        assert_eq!(player.take_move_cells(), 1);
        assert_eq!(player.move_points, 10);
    }

    #[test]
    fn test_freeze_boundary() {
        let variable = PlayerVariable::derive(
            &PlayerStatus::default(),
            AnchorParams::new(CENTER, CENTER, [0.0; 4]),
            Vec::new(),
        );
        let mut player = Player::new(PlayerId(3), "Home", "CB", PlayerStatus::default(), variable, CENTER);
        player.defense_freeze = 1;
        assert!(player.is_frozen(false));
        player.tick_down_freeze();
        assert!(!player.is_frozen(false));
    }
}
