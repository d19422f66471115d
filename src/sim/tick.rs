//! Fixed-step simulation tick
//!
//! One call advances the match by exactly one display refresh. Input for the
//! tick is passed in explicitly; randomness comes from the caller's RNG.

use rand::Rng;

use super::state::{CLOWN_COUNT, Clown, GameEvent, GamePhase, GameState, Side};
use super::{collision, launch, physics};
use crate::consts::*;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Requested seesaw center x (from pointer position)
    pub pointer_x: Option<f32>,
    /// Launch action (click/tap/space)
    pub launch: bool,
    /// Wall-clock time of this tick (ms)
    pub now_ms: f64,
    /// Idle/demo mode - autopilot steers the seesaw
    pub idle_mode: bool,
}

/// Advance the game state by one tick.
///
/// Does nothing unless the match is in the Playing phase. Events raised
/// during the tick are appended to `state.events`.
pub fn tick<R: Rng>(state: &mut GameState, input: &TickInput, rng: &mut R) {
    if state.phase != GamePhase::Playing {
        return;
    }

    state.time_ticks += 1;
    state.now_ms = input.now_ms;

    let mut input = input.clone();
    if input.idle_mode {
        autopilot(state, &mut input);
    }

    if let Some(x) = input.pointer_x {
        state.move_seesaw(x);
    }
    if input.launch {
        launch::launch(state, rng);
    }

    physics::step_clowns(&mut state.clowns);
    collision::resolve(state, rng);

    if state.lives == 0 {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::GameOver { score: state.score });
        state.events.push(GameEvent::MatchEnded);
        log::info!("Game over - final score {}", state.score);
    }

    state.update_tilt();
    state.expire_floating_texts(state.now_ms);
}

/// Pure form of [`tick`]: returns the next snapshot, leaving `prev` untouched.
/// The returned state's events are only those raised by this tick.
pub fn step<R: Rng>(prev: &GameState, input: &TickInput, rng: &mut R) -> GameState {
    let mut next = prev.clone();
    next.events.clear();
    tick(&mut next, input, rng);
    next
}

/// Maximum ticks looked ahead when predicting a landing
const PREDICT_TICKS: u32 = 240;

/// Predict where a flying clown crosses seesaw height
pub fn predict_landing_x(clown: &Clown) -> Option<f32> {
    let mut ghost = clown.clone();
    for _ in 0..PREDICT_TICKS {
        physics::integrate(&mut ghost);
        if ghost.vel.y > 0.0 && ghost.pos.y >= SEESAW_Y - CLOWN_RADIUS {
            return Some(ghost.pos.x);
        }
    }
    None
}

/// Demo autopilot: park a free seesaw end under the next clown to come down,
/// and launch whenever nobody is in the air.
fn autopilot(state: &GameState, input: &mut TickInput) {
    if state.clowns.iter().all(Clown::is_grounded) {
        input.launch = true;
        return;
    }

    // Most urgent: the falling clown closest to the seesaw
    let incoming = (0..CLOWN_COUNT)
        .filter(|&i| state.clowns[i].is_flying() && state.clowns[i].vel.y > 0.0)
        .max_by(|&a, &b| {
            state.clowns[a]
                .pos
                .y
                .partial_cmp(&state.clowns[b].pos.y)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    let Some(id) = incoming else {
        return;
    };
    let Some(landing_x) = predict_landing_x(&state.clowns[id]) else {
        return;
    };

    let side = match state.seesaw_partner(id).and_then(|p| state.clowns[p].seesaw_side()) {
        Some(taken) => taken.opposite(),
        None if landing_x < state.seesaw.x => Side::Left,
        None => Side::Right,
    };

    // Small wobble so demo runs don't settle into a perfect loop
    let wobble = (state.time_ticks as f32 * 0.05).sin() * 6.0;
    let offset = state.seesaw.width / 4.0;
    let center = match side {
        Side::Left => landing_x + offset,
        Side::Right => landing_x - offset,
    };
    input.pointer_x = Some(center + wobble);
}
