//! Collision detection and resolution
//!
//! Runs once per tick after physics, in a fixed order:
//! balloon pops, diving-board bounces, seesaw landings, floor.
//! Later passes see the results of earlier ones (popped balloons, clowns that
//! already landed or died this tick).

use glam::Vec2;
use rand::Rng;

use super::launch::random_launch_vx;
use super::scoring::{self, BOUNCE_POINTS};
use super::state::{CLOWN_COUNT, Clown, ClownId, DivingBoard, GameEvent, GameState, Side, Zone};
use crate::consts::*;

/// Outcome of a seesaw landing check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    /// Clean landing on a free end
    Safe(Side),
    /// Middle third, or an end the other clown already occupies
    Fatal,
}

/// Circle-circle overlap test
#[inline]
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    a.distance(b) < radius_a + radius_b
}

/// Whether a clown center touches a diving board's landing rectangle
pub fn touches_board(pos: Vec2, board: &DivingBoard) -> bool {
    let left = board.rect_left();
    let top = board.top();
    pos.x >= left
        && pos.x <= left + DIVING_BOARD_WIDTH
        && pos.y >= top - CLOWN_RADIUS
        && pos.y <= top + DIVING_BOARD_HEIGHT
}

/// Judge a falling clown against the seesaw. None when it is not landing
/// this tick (rising, above the plank, or beside it).
pub fn judge_landing(state: &GameState, id: ClownId) -> Option<Landing> {
    let clown = &state.clowns[id];
    if !clown.is_flying() || clown.vel.y <= 0.0 || clown.pos.y < state.seesaw.y - CLOWN_RADIUS {
        return None;
    }
    match state.seesaw.zone_at(clown.pos.x)? {
        Zone::Dead => Some(Landing::Fatal),
        Zone::Edge(side) if state.seesaw_end_taken(id, side) => Some(Landing::Fatal),
        Zone::Edge(side) => Some(Landing::Safe(side)),
    }
}

/// Run every collision pass for this tick
pub fn resolve<R: Rng>(state: &mut GameState, rng: &mut R) {
    pop_balloons(state);
    bounce_off_boards(state);
    judge_seesaw_landings(state, rng);
    check_floor(state);
}

/// Pop every unpopped balloon a flying clown overlaps, paying row bonuses
pub fn pop_balloons(state: &mut GameState) {
    for id in 0..CLOWN_COUNT {
        if !state.clowns[id].is_flying() {
            continue;
        }
        let clown_pos = state.clowns[id].pos;

        for index in 0..state.balloons.len() {
            let balloon = &mut state.balloons[index];
            if !circles_overlap(clown_pos, CLOWN_RADIUS, balloon.pos, BALLOON_RADIUS)
                || !balloon.pop()
            {
                continue;
            }
            let (row, color, pos) = (balloon.row, balloon.color, balloon.pos);
            let hit = scoring::balloon_hit_score(&state.balloons, index);
            state.score += hit.balloon_score as u64;
            state.add_floating_text(format!("+{}", hit.balloon_score), pos);
            state.events.push(GameEvent::BalloonPopped {
                row,
                color,
                points: hit.balloon_score,
            });

            if hit.row_bonus == 0 || state.cleared_rows.contains(&row) {
                continue;
            }
            let bonus = hit.row_bonus;
            state.cleared_rows.push(row);
            state.score += bonus as u64;
            state.bonus_jumps += hit.extra_jumps;
            state.add_floating_text(
                format!("+{} ROW BONUS!", bonus),
                Vec2::new(PLAYFIELD_WIDTH / 2.0, 200.0),
            );
            state.events.push(GameEvent::RowCleared { row, color, bonus });
            log::info!("Row {} cleared ({:?}) +{}", row, color, bonus);
        }
    }
}

/// Bounce falling clowns off diving boards
pub fn bounce_off_boards(state: &mut GameState) {
    for id in 0..CLOWN_COUNT {
        let clown = &mut state.clowns[id];
        if !clown.is_flying() || clown.vel.y <= 0.0 {
            continue;
        }
        let Some(board) = state.diving_boards.iter().find(|b| touches_board(clown.pos, b)) else {
            continue;
        };
        clown.vel.y = -clown.vel.y.abs() * DIVING_BOARD_DAMPING;
        clown.pos.y = board.top() - CLOWN_RADIUS;
        state.events.push(GameEvent::Bounce);
    }
}

/// Land or kill clowns reaching the seesaw
pub fn judge_seesaw_landings<R: Rng>(state: &mut GameState, rng: &mut R) {
    for id in 0..CLOWN_COUNT {
        match judge_landing(state, id) {
            None => {}
            Some(Landing::Fatal) => {
                let at = Vec2::new(state.clowns[id].pos.x, state.seesaw.y - 30.0);
                kill_clown(state, id, at);
            }
            Some(Landing::Safe(side)) => land_on_seesaw(state, id, side, rng),
        }
    }
}

/// Clean landing: score it, ground the clown and fling its partner
fn land_on_seesaw<R: Rng>(state: &mut GameState, id: ClownId, side: Side, rng: &mut R) {
    let landing_pos = state.clowns[id].pos;
    state.score += BOUNCE_POINTS as u64;
    state.add_floating_text(format!("+{}", BOUNCE_POINTS), landing_pos);
    state.events.push(GameEvent::Bounce);

    state.launch.tighten();

    let partner = state.seesaw_partner(id);
    state.clowns[id] = Clown::on_seesaw(side, &state.seesaw);

    if let Some(partner) = partner {
        let vel = Vec2::new(random_launch_vx(rng), state.launch.velocity_y());
        state.clowns[partner].take_off(vel);
    }
    log::debug!(
        "Clown {} landed {:?}, launch speed now {:.1}",
        id,
        side,
        state.launch.speed()
    );
}

/// Clowns falling past the bottom of the screen are lost
pub fn check_floor(state: &mut GameState) {
    for id in 0..CLOWN_COUNT {
        let clown = &state.clowns[id];
        if clown.is_flying() && clown.pos.y > PLAYFIELD_HEIGHT + FLOOR_MARGIN {
            let at = Vec2::new(clown.pos.x, PLAYFIELD_HEIGHT - 50.0);
            kill_clown(state, id, at);
        }
    }
}

/// Shared death handling: lose a life, reset the ramp, respawn on a board
fn kill_clown(state: &mut GameState, id: ClownId, text_pos: Vec2) {
    state.lives = state.lives.saturating_sub(1);
    state.launch.reset();
    state.add_floating_text("SPLAT!", text_pos);
    state.events.push(GameEvent::Splat { clown: id });
    state.respawn_on_board(id);
    log::debug!("Clown {} splatted, {} lives left", id, state.lives);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{ClownState, GamePhase};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn playing() -> GameState {
        let mut state = GameState::new();
        state.phase = GamePhase::Playing;
        state
    }

    fn fly(state: &mut GameState, id: ClownId, pos: Vec2, vel: Vec2) {
        state.clowns[id].pos = pos;
        state.clowns[id].vel = vel;
        state.clowns[id].state = ClownState::Flying;
    }

    #[test]
    fn test_circles_overlap() {
        assert!(circles_overlap(Vec2::ZERO, 24.0, Vec2::new(39.0, 0.0), 16.0));
        assert!(!circles_overlap(Vec2::ZERO, 24.0, Vec2::new(40.0, 0.0), 16.0));
    }

    #[test]
    fn test_pop_awards_points_once() {
        let mut state = playing();
        let target = state.balloons[20].pos; // row 1, green
        fly(&mut state, 0, target, Vec2::new(0.0, -3.0));

        pop_balloons(&mut state);
        assert!(state.balloons[20].popped);
        let after_first = state.score;
        assert!(after_first >= 50);

        pop_balloons(&mut state);
        assert_eq!(state.score, after_first);
    }

    #[test]
    fn test_row_bonus_paid_once() {
        let mut state = playing();
        for b in state.balloons.iter_mut().filter(|b| b.row == 3) {
            b.popped = true;
        }
        let last = state.balloons.iter().position(|b| b.row == 3).unwrap();
        state.balloons[last].popped = false;
        let pos = state.balloons[last].pos;
        fly(&mut state, 0, pos + Vec2::new(0.0, 1.0), Vec2::new(0.0, -1.0));

        pop_balloons(&mut state);
        assert!(state.cleared_rows.contains(&3));
        let rows_cleared = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::RowCleared { row: 3, .. }))
            .count();
        assert_eq!(rows_cleared, 1);
        assert_eq!(state.bonus_jumps, 0);

        pop_balloons(&mut state);
        let rows_cleared = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::RowCleared { .. }))
            .count();
        assert_eq!(rows_cleared, 1);
    }

    #[test]
    fn test_board_bounce_only_when_falling() {
        let mut state = playing();
        let board = state.diving_boards[0].clone();
        let pos = Vec2::new(50.0, board.top() - 10.0);

        fly(&mut state, 0, pos, Vec2::new(0.0, -4.0));
        bounce_off_boards(&mut state);
        assert_eq!(state.clowns[0].vel.y, -4.0);
        assert_eq!(state.clowns[0].pos, pos);

        fly(&mut state, 0, pos, Vec2::new(0.0, 5.0));
        bounce_off_boards(&mut state);
        assert!((state.clowns[0].vel.y + 4.5).abs() < 1e-5);
        assert_eq!(state.clowns[0].pos.y, board.top() - CLOWN_RADIUS);
    }

    #[test]
    fn test_center_landing_is_fatal() {
        let mut state = playing();
        fly(&mut state, 1, Vec2::new(400.0, 500.0), Vec2::new(0.0, 6.0));
        assert_eq!(judge_landing(&state, 1), Some(Landing::Fatal));

        let mut rng = Pcg32::seed_from_u64(1);
        judge_seesaw_landings(&mut state, &mut rng);
        assert_eq!(state.lives, 2);
        assert!(state.clowns[1].board().is_some());
        assert_eq!(state.clowns[0].seesaw_side(), Some(Side::Left));
        assert!(state.floating_texts.iter().any(|t| t.text == "SPLAT!"));
    }

    #[test]
    fn test_occupied_edge_is_fatal() {
        let mut state = playing();
        // Clown 0 rests on the left end (x = 370); land clown 1 there too.
        fly(&mut state, 1, Vec2::new(350.0, 500.0), Vec2::new(0.0, 6.0));
        assert_eq!(judge_landing(&state, 1), Some(Landing::Fatal));
    }

    #[test]
    fn test_rising_clown_is_not_judged() {
        let mut state = playing();
        fly(&mut state, 1, Vec2::new(400.0, 500.0), Vec2::new(0.0, -6.0));
        assert_eq!(judge_landing(&state, 1), None);
    }

    #[test]
    fn test_safe_landing_launches_partner() {
        let mut state = playing();
        fly(&mut state, 1, Vec2::new(450.0, 500.0), Vec2::new(1.0, 6.0));
        let mut rng = Pcg32::seed_from_u64(7);

        judge_seesaw_landings(&mut state, &mut rng);

        assert_eq!(state.clowns[1].seesaw_side(), Some(Side::Right));
        assert_eq!(state.clowns[1].vel, Vec2::ZERO);
        assert_eq!(state.clowns[1].pos.y, SEESAW_Y - CLOWN_RADIUS);
        assert!(state.clowns[0].is_flying());
        assert_eq!(state.clowns[0].vel.y, state.launch.velocity_y());
        assert!(state.clowns[0].vel.x >= -2.0 && state.clowns[0].vel.x < 2.0);
        assert_eq!(state.score, 10);
        assert!((state.launch.speed() - 14.2).abs() < 1e-4);
    }

    #[test]
    fn test_landing_beside_seesaw_keeps_falling() {
        let mut state = playing();
        fly(&mut state, 1, Vec2::new(100.0, 510.0), Vec2::new(0.0, 6.0));
        let mut rng = Pcg32::seed_from_u64(7);
        judge_seesaw_landings(&mut state, &mut rng);
        assert!(state.clowns[1].is_flying());
        assert_eq!(state.lives, 3);
    }

    #[test]
    fn test_floor_death() {
        let mut state = playing();
        state.launch.tighten();
        fly(&mut state, 1, Vec2::new(100.0, 651.0), Vec2::new(0.0, 8.0));
        check_floor(&mut state);
        assert_eq!(state.lives, 2);
        assert!(state.clowns[1].board().is_some());
        assert_eq!(state.launch.speed(), MIN_LAUNCH_SPEED);
        assert_eq!(state.events, vec![GameEvent::Splat { clown: 1 }]);
    }

    #[test]
    fn test_lives_never_underflow() {
        let mut state = playing();
        state.lives = 0;
        fly(&mut state, 1, Vec2::new(100.0, 700.0), Vec2::new(0.0, 8.0));
        check_floor(&mut state);
        assert_eq!(state.lives, 0);
    }
}
