//! Game state and core simulation types
//!
//! Everything the renderer reads lives here. Clowns are a fixed pair indexed
//! by [`ClownId`]; all other entities are rebuilt on every match start.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::difficulty::LaunchRamp;
use crate::consts::*;

/// Index of a clown in [`GameState::clowns`]
pub type ClownId = usize;

/// Number of clowns in a match
pub const CLOWN_COUNT: usize = 2;

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the player to start
    Idle,
    /// Active gameplay
    Playing,
    /// Lives exhausted; nothing advances until restart
    GameOver,
}

/// Left or right half of the playfield / seesaw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Seesaw tilt, derived from occupancy every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tilt {
    Left,
    Right,
    Center,
}

/// Where a clown is. Flying and grounded are mutually exclusive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClownState {
    /// Airborne, advanced by physics
    Flying,
    /// Resting on one end of the seesaw
    OnSeesaw { side: Side },
    /// Resting on a diving board (index into [`GameState::diving_boards`])
    OnBoard { board: usize },
}

/// A performer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clown {
    pub pos: Vec2,
    pub vel: Vec2,
    pub state: ClownState,
    /// Seesaw side this clown last occupied (or the board side it respawned on)
    pub last_side: Side,
}

impl Clown {
    /// A clown resting on the given seesaw end
    pub fn on_seesaw(side: Side, seesaw: &Seesaw) -> Self {
        Self {
            pos: Vec2::new(seesaw.perch_x(side), seesaw.y - CLOWN_RADIUS),
            vel: Vec2::ZERO,
            state: ClownState::OnSeesaw { side },
            last_side: side,
        }
    }

    /// A clown resting on a diving board
    pub fn on_board(index: usize, board: &DivingBoard) -> Self {
        Self {
            pos: board.perch(),
            vel: Vec2::ZERO,
            state: ClownState::OnBoard { board: index },
            last_side: board.side,
        }
    }

    #[inline]
    pub fn is_flying(&self) -> bool {
        self.state == ClownState::Flying
    }

    #[inline]
    pub fn is_grounded(&self) -> bool {
        !self.is_flying()
    }

    /// Seesaw side if resting on the seesaw
    pub fn seesaw_side(&self) -> Option<Side> {
        match self.state {
            ClownState::OnSeesaw { side } => Some(side),
            _ => None,
        }
    }

    /// Board index if resting on a diving board
    pub fn board(&self) -> Option<usize> {
        match self.state {
            ClownState::OnBoard { board } => Some(board),
            _ => None,
        }
    }

    /// Become airborne with the given velocity
    pub fn take_off(&mut self, vel: Vec2) {
        self.vel = vel;
        self.state = ClownState::Flying;
    }
}

/// Balloon colors, from least to most valuable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BalloonColor {
    /// Low value
    Yellow,
    /// Mid value
    Green,
    /// High value; clearing a row of these grants a bonus jump
    Blue,
}

/// Row colors, top row first
pub const ROW_COLORS: [BalloonColor; BALLOON_ROWS as usize] = [
    BalloonColor::Blue,
    BalloonColor::Green,
    BalloonColor::Green,
    BalloonColor::Yellow,
];

/// A poppable balloon in the grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balloon {
    pub id: u32,
    pub pos: Vec2,
    pub color: BalloonColor,
    pub row: u32,
    pub popped: bool,
}

impl Balloon {
    /// Pop the balloon. Returns false if it was already popped.
    pub fn pop(&mut self) -> bool {
        if self.popped {
            return false;
        }
        self.popped = true;
        true
    }
}

/// Build the full balloon grid
pub fn balloon_grid() -> Vec<Balloon> {
    let spacing = (PLAYFIELD_WIDTH - 2.0 * BALLOON_SIDE_MARGIN) / (BALLOONS_PER_ROW - 1) as f32;
    let mut balloons = Vec::with_capacity((BALLOON_ROWS * BALLOONS_PER_ROW) as usize);
    for (row, &color) in ROW_COLORS.iter().enumerate() {
        let row = row as u32;
        let y = BALLOON_TOP_Y + row as f32 * BALLOON_ROW_SPACING;
        for col in 0..BALLOONS_PER_ROW {
            balloons.push(Balloon {
                id: row * BALLOONS_PER_ROW + col,
                pos: Vec2::new(BALLOON_SIDE_MARGIN + col as f32 * spacing, y),
                color,
                row,
                popped: false,
            });
        }
    }
    balloons
}

/// Which part of the seesaw a landing hits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// Outer third on the given side: survivable
    Edge(Side),
    /// Middle third: always fatal
    Dead,
}

/// The player-controlled seesaw
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seesaw {
    /// Center x (clamped to keep the whole plank on screen)
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub tilt: Tilt,
}

impl Default for Seesaw {
    fn default() -> Self {
        Self {
            x: PLAYFIELD_WIDTH / 2.0,
            y: SEESAW_Y,
            width: SEESAW_WIDTH,
            tilt: Tilt::Left,
        }
    }
}

impl Seesaw {
    #[inline]
    pub fn left(&self) -> f32 {
        self.x - self.width / 2.0
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Clamp a requested center x to the playfield. Non-finite input is ignored.
    pub fn clamp_x(&self, x: f32) -> Option<f32> {
        if !x.is_finite() {
            return None;
        }
        let half = self.width / 2.0;
        Some(x.clamp(half, PLAYFIELD_WIDTH - half))
    }

    /// Resting x for a clown on the given end
    pub fn perch_x(&self, side: Side) -> f32 {
        match side {
            Side::Left => self.x - self.width / 4.0,
            Side::Right => self.x + self.width / 4.0,
        }
    }

    /// Classify a landing x. None when outside the plank.
    pub fn zone_at(&self, x: f32) -> Option<Zone> {
        let (left, right) = (self.left(), self.right());
        if x < left || x > right {
            return None;
        }
        let edge = self.width / 3.0;
        if x <= left + edge {
            Some(Zone::Edge(Side::Left))
        } else if x >= right - edge {
            Some(Zone::Edge(Side::Right))
        } else {
            Some(Zone::Dead)
        }
    }
}

/// A fixed side-mounted trampoline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivingBoard {
    /// Anchor point (x at the wall mount, y at board center)
    pub pos: Vec2,
    pub side: Side,
}

impl DivingBoard {
    /// Left edge of the collision rectangle
    pub fn rect_left(&self) -> f32 {
        match self.side {
            Side::Left => DIVING_BOARD_WALL_GAP,
            Side::Right => PLAYFIELD_WIDTH - DIVING_BOARD_WALL_GAP - DIVING_BOARD_WIDTH,
        }
    }

    /// Top surface y
    pub fn top(&self) -> f32 {
        self.pos.y - DIVING_BOARD_HEIGHT / 2.0
    }

    /// Where a clown waits on this board
    pub fn perch(&self) -> Vec2 {
        let x = match self.side {
            Side::Left => DIVING_BOARD_PERCH_X,
            Side::Right => PLAYFIELD_WIDTH - DIVING_BOARD_PERCH_X,
        };
        Vec2::new(x, self.pos.y - CLOWN_RADIUS - 4.0)
    }

    /// Horizontal hop direction: toward the middle of the playfield
    pub fn hop_vx(&self) -> f32 {
        match self.side {
            Side::Left => DIVE_HOP_VX,
            Side::Right => -DIVE_HOP_VX,
        }
    }
}

/// The four diving boards: left top, left bottom, right top, right bottom
pub fn diving_boards() -> [DivingBoard; 4] {
    let top = DIVING_BOARD_MID_Y - DIVING_BOARD_OFFSET_Y;
    let bottom = DIVING_BOARD_MID_Y + DIVING_BOARD_OFFSET_Y;
    let left = DIVING_BOARD_INSET_X;
    let right = PLAYFIELD_WIDTH - DIVING_BOARD_INSET_X;
    [
        DivingBoard { pos: Vec2::new(left, top), side: Side::Left },
        DivingBoard { pos: Vec2::new(left, bottom), side: Side::Left },
        DivingBoard { pos: Vec2::new(right, top), side: Side::Right },
        DivingBoard { pos: Vec2::new(right, bottom), side: Side::Right },
    ]
}

/// Short-lived score/event annotation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingText {
    pub id: u32,
    pub text: String,
    pub pos: Vec2,
    /// Wall-clock creation time (ms)
    pub created_at: f64,
}

impl FloatingText {
    pub fn is_expired(&self, now_ms: f64) -> bool {
        now_ms - self.created_at > FLOATING_TEXT_MS
    }

    /// Remaining opacity in [0, 1] for fading out
    pub fn opacity(&self, now_ms: f64) -> f32 {
        (1.0 - (now_ms - self.created_at) / FLOATING_TEXT_MS).clamp(0.0, 1.0) as f32
    }
}

/// Discrete events for external collaborators (audio, UI)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A balloon was popped
    BalloonPopped { row: u32, color: BalloonColor, points: u32 },
    /// A whole row was cleared
    RowCleared { row: u32, color: BalloonColor, bonus: u32 },
    /// A clown died (bad landing or fell out)
    Splat { clown: ClownId },
    /// Board bounce, seesaw landing or launch
    Bounce,
    /// Lives ran out
    GameOver { score: u64 },
    /// A match began (start ambient loop)
    MatchStarted,
    /// A match ended (stop ambient loop)
    MatchEnded,
}

/// Complete match state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u8,
    /// Extra jumps earned from clearing blue rows
    pub bonus_jumps: u32,
    pub clowns: [Clown; CLOWN_COUNT],
    pub balloons: Vec<Balloon>,
    pub seesaw: Seesaw,
    pub diving_boards: [DivingBoard; 4],
    pub floating_texts: Vec<FloatingText>,
    /// Progressive launch velocity
    pub launch: LaunchRamp,
    /// Rows whose bonus has already been paid this match
    pub cleared_rows: Vec<u32>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Wall-clock time of the current tick (ms)
    pub now_ms: f64,
    /// Events raised since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Fresh state in the Idle phase: one clown on the seesaw, one on a board
    pub fn new() -> Self {
        let seesaw = Seesaw::default();
        let diving_boards = diving_boards();
        let clowns = [
            Clown::on_seesaw(Side::Left, &seesaw),
            Clown::on_board(2, &diving_boards[2]),
        ];
        let mut state = Self {
            phase: GamePhase::Idle,
            score: 0,
            lives: STARTING_LIVES,
            bonus_jumps: 0,
            clowns,
            balloons: balloon_grid(),
            seesaw,
            diving_boards,
            floating_texts: Vec::new(),
            launch: LaunchRamp::default(),
            cleared_rows: Vec::new(),
            time_ticks: 0,
            now_ms: 0.0,
            events: Vec::new(),
            next_id: 1,
        };
        state.update_tilt();
        state
    }

    /// Fresh state already in the Playing phase
    pub fn start_match(now_ms: f64) -> Self {
        let mut state = Self::new();
        state.phase = GamePhase::Playing;
        state.now_ms = now_ms;
        state.events.push(GameEvent::MatchStarted);
        log::info!("Match started");
        state
    }

    /// A match has been started (Playing or GameOver)
    #[inline]
    pub fn is_playing(&self) -> bool {
        self.phase != GamePhase::Idle
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Whether the tick driver should advance this state
    #[inline]
    pub fn is_active(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// A clown other than `id` resting on the seesaw, if any
    pub fn seesaw_partner(&self, id: ClownId) -> Option<ClownId> {
        (0..CLOWN_COUNT).find(|&i| i != id && self.clowns[i].seesaw_side().is_some())
    }

    /// Whether a clown other than `id` rests on the given seesaw end
    pub fn seesaw_end_taken(&self, id: ClownId, side: Side) -> bool {
        (0..CLOWN_COUNT).any(|i| i != id && self.clowns[i].seesaw_side() == Some(side))
    }

    /// Whether a clown other than `id` rests on the given board
    pub fn board_taken(&self, id: ClownId, board: usize) -> bool {
        (0..CLOWN_COUNT).any(|i| i != id && self.clowns[i].board() == Some(board))
    }

    /// Move the seesaw (clamped); grounded seesaw clowns ride along
    pub fn move_seesaw(&mut self, x: f32) {
        let Some(x) = self.seesaw.clamp_x(x) else {
            return;
        };
        self.seesaw.x = x;
        for clown in &mut self.clowns {
            if let Some(side) = clown.seesaw_side() {
                clown.pos.x = self.seesaw.perch_x(side);
            }
        }
    }

    /// Recompute tilt: leans toward a lone occupant, level otherwise
    pub fn update_tilt(&mut self) {
        let mut sides = self.clowns.iter().filter_map(Clown::seesaw_side);
        self.seesaw.tilt = match (sides.next(), sides.next()) {
            (Some(Side::Left), None) => Tilt::Left,
            (Some(Side::Right), None) => Tilt::Right,
            _ => Tilt::Center,
        };
    }

    /// Put a clown back on a diving board after a death.
    ///
    /// Boards on the side opposite the clown's last seesaw end are preferred;
    /// the lower board on that side is used when the upper one is taken.
    pub fn respawn_on_board(&mut self, id: ClownId) {
        let side = self.clowns[id].last_side.opposite();
        let upper = match side {
            Side::Left => 0,
            Side::Right => 2,
        };
        let board = if self.board_taken(id, upper) { upper + 1 } else { upper };
        self.clowns[id] = Clown::on_board(board, &self.diving_boards[board]);
    }

    /// Add a floating annotation stamped with the current tick time
    pub fn add_floating_text(&mut self, text: impl Into<String>, pos: Vec2) {
        let id = self.next_entity_id();
        self.floating_texts.push(FloatingText {
            id,
            text: text.into(),
            pos,
            created_at: self.now_ms,
        });
    }

    /// Drop floating texts older than their display duration
    pub fn expire_floating_texts(&mut self, now_ms: f64) {
        self.floating_texts.retain(|ft| !ft.is_expired(now_ms));
    }

    /// Take all events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of unpopped balloons left
    pub fn balloons_remaining(&self) -> usize {
        self.balloons.iter().filter(|b| !b.popped).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_layout() {
        let state = GameState::new();
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.lives, 3);
        assert_eq!(state.score, 0);
        assert_eq!(state.bonus_jumps, 0);
        assert_eq!(state.seesaw.x, 400.0);
        assert_eq!(state.seesaw.y, 520.0);
        assert_eq!(state.seesaw.width, 120.0);
        assert_eq!(state.seesaw.tilt, Tilt::Left);
        assert!(state.floating_texts.is_empty());

        let on_seesaw = state.clowns.iter().filter(|c| c.seesaw_side().is_some()).count();
        let on_board = state.clowns.iter().filter(|c| c.board().is_some()).count();
        assert_eq!(on_seesaw, 1);
        assert_eq!(on_board, 1);
    }

    #[test]
    fn test_balloon_grid_layout() {
        let balloons = balloon_grid();
        assert_eq!(balloons.len(), 56);
        assert!(balloons.iter().filter(|b| b.row == 0).all(|b| b.color == BalloonColor::Blue));
        assert!(balloons.iter().filter(|b| b.row == 3).all(|b| b.color == BalloonColor::Yellow));
        assert_eq!(balloons[0].pos, Vec2::new(80.0, 60.0));
        assert!((balloons[13].pos.x - 720.0).abs() < 0.001);
        assert_eq!(balloons[14].pos.y, 100.0);
    }

    #[test]
    fn test_balloon_pop_is_idempotent() {
        let mut balloon = balloon_grid().remove(0);
        assert!(balloon.pop());
        assert!(!balloon.pop());
        assert!(balloon.popped);
    }

    #[test]
    fn test_seesaw_zones() {
        let seesaw = Seesaw::default(); // spans 340..460
        assert_eq!(seesaw.zone_at(339.0), None);
        assert_eq!(seesaw.zone_at(340.0), Some(Zone::Edge(Side::Left)));
        assert_eq!(seesaw.zone_at(380.0), Some(Zone::Edge(Side::Left)));
        assert_eq!(seesaw.zone_at(400.0), Some(Zone::Dead));
        assert_eq!(seesaw.zone_at(420.0), Some(Zone::Edge(Side::Right)));
        assert_eq!(seesaw.zone_at(460.0), Some(Zone::Edge(Side::Right)));
        assert_eq!(seesaw.zone_at(461.0), None);
    }

    #[test]
    fn test_move_seesaw_clamps_and_carries_clowns() {
        let mut state = GameState::new();
        state.move_seesaw(-500.0);
        assert_eq!(state.seesaw.x, 60.0);
        assert_eq!(state.clowns[0].pos.x, 30.0);

        state.move_seesaw(10_000.0);
        assert_eq!(state.seesaw.x, 740.0);

        state.move_seesaw(f32::NAN);
        assert_eq!(state.seesaw.x, 740.0);
    }

    #[test]
    fn test_respawn_prefers_opposite_side_and_free_board() {
        let mut state = GameState::new();
        // Clown 1 sits on board 2 (right, upper). Clown 0 last stood on the left end.
        state.clowns[0].state = ClownState::Flying;
        state.respawn_on_board(0);
        assert_eq!(state.clowns[0].board(), Some(3));
        assert_eq!(state.clowns[0].pos, state.diving_boards[3].perch());
        assert_eq!(state.clowns[0].last_side, Side::Right);
    }

    #[test]
    fn test_floating_text_expiry() {
        let mut state = GameState::new();
        state.now_ms = 1000.0;
        state.add_floating_text("+20", Vec2::new(10.0, 10.0));
        state.expire_floating_texts(1500.0);
        assert_eq!(state.floating_texts.len(), 1);
        assert!((state.floating_texts[0].opacity(1500.0) - 0.5).abs() < 0.001);
        state.expire_floating_texts(2000.5);
        assert!(state.floating_texts.is_empty());
    }

    #[test]
    fn test_tilt_follows_occupancy() {
        let mut state = GameState::new();
        state.clowns[1] = Clown::on_seesaw(Side::Right, &state.seesaw);
        state.update_tilt();
        assert_eq!(state.seesaw.tilt, Tilt::Center);

        state.clowns[0].state = ClownState::Flying;
        state.update_tilt();
        assert_eq!(state.seesaw.tilt, Tilt::Right);
    }
}
