//! Circus Clowns - a seesaw-and-balloons arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, scoring, game state)
//! - `game`: Tick driver owning state, latched input and the RNG
//! - `audio`: Sound effect mapping (Web Audio synthesis on wasm)
//! - `highscores`: Top-10 leaderboard
//! - `settings`: Player preferences

pub mod audio;
pub mod game;
pub mod highscores;
pub mod settings;
pub mod sim;

pub use game::Game;
pub use highscores::HighScores;
pub use settings::Settings;

/// Game configuration constants
///
/// Units are pixels and pixels-per-tick; the simulation advances one fixed
/// step per display refresh.
pub mod consts {
    /// Playfield dimensions
    pub const PLAYFIELD_WIDTH: f32 = 800.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;

    /// Downward acceleration applied to flying clowns every tick
    pub const GRAVITY: f32 = 0.3;
    /// Horizontal velocity kept after hitting a side wall
    pub const WALL_DAMPING: f32 = 0.8;

    /// Clown collision radius
    pub const CLOWN_RADIUS: f32 = 24.0;
    /// Balloon collision radius
    pub const BALLOON_RADIUS: f32 = 16.0;

    /// Balloon grid
    pub const BALLOON_ROWS: u32 = 4;
    pub const BALLOONS_PER_ROW: u32 = 14;
    pub const BALLOON_TOP_Y: f32 = 60.0;
    pub const BALLOON_ROW_SPACING: f32 = 40.0;
    pub const BALLOON_SIDE_MARGIN: f32 = 80.0;

    /// Seesaw geometry
    pub const SEESAW_WIDTH: f32 = 120.0;
    pub const SEESAW_Y: f32 = PLAYFIELD_HEIGHT - 80.0;

    /// Diving boards: two per side, stacked around mid-height
    pub const DIVING_BOARD_MID_Y: f32 = PLAYFIELD_HEIGHT / 2.0;
    pub const DIVING_BOARD_OFFSET_Y: f32 = 50.0;
    pub const DIVING_BOARD_INSET_X: f32 = 40.0;
    pub const DIVING_BOARD_WIDTH: f32 = 70.0;
    pub const DIVING_BOARD_HEIGHT: f32 = 10.0;
    /// Distance from the wall to the board's near edge
    pub const DIVING_BOARD_WALL_GAP: f32 = 22.0;
    /// Vertical speed kept after bouncing off a diving board
    pub const DIVING_BOARD_DAMPING: f32 = 0.9;
    /// Distance from the wall to a clown resting on a board
    pub const DIVING_BOARD_PERCH_X: f32 = 60.0;

    /// Hop given to a clown leaving a diving board
    pub const DIVE_HOP_VY: f32 = -2.0;
    pub const DIVE_HOP_VX: f32 = 3.0;

    /// Seesaw launch velocity ramp (magnitudes, applied upward)
    pub const MIN_LAUNCH_SPEED: f32 = 14.0;
    pub const MAX_LAUNCH_SPEED: f32 = 17.0;
    pub const LAUNCH_SPEED_STEP: f32 = 0.2;
    /// Random horizontal launch component spans [-SPREAD/2, SPREAD/2)
    pub const LAUNCH_SPREAD_VX: f32 = 4.0;

    /// A flying clown this far below the playfield is lost
    pub const FLOOR_MARGIN: f32 = 50.0;

    /// Starting lives
    pub const STARTING_LIVES: u8 = 3;

    /// Floating text lifetime in milliseconds
    pub const FLOATING_TEXT_MS: f64 = 1000.0;
}
