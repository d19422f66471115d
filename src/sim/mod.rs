//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one tick per display refresh)
//! - Seeded RNG only, passed in by the caller
//! - Stable iteration order (clowns by index, balloons by grid order)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod launch;
pub mod physics;
pub mod scoring;
pub mod state;
pub mod tick;

pub use collision::{Landing, judge_landing};
pub use difficulty::LaunchRamp;
pub use launch::launch;
pub use state::{
    Balloon, BalloonColor, CLOWN_COUNT, Clown, ClownId, ClownState, DivingBoard, FloatingText,
    GameEvent, GamePhase, GameState, Seesaw, Side, Tilt, Zone,
};
pub use tick::{TickInput, predict_landing_x, step, tick};
