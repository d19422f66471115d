//! Player launch action
//!
//! A clown waiting on a diving board always goes first; otherwise the clown
//! resting on the seesaw is flung with the current launch velocity.

use glam::Vec2;
use rand::Rng;

use super::state::{CLOWN_COUNT, GameEvent, GamePhase, GameState};
use crate::consts::{DIVE_HOP_VY, LAUNCH_SPREAD_VX};

/// Random horizontal launch component in [-SPREAD/2, SPREAD/2)
pub fn random_launch_vx<R: Rng>(rng: &mut R) -> f32 {
    (rng.random::<f32>() - 0.5) * LAUNCH_SPREAD_VX
}

/// Apply a launch action. Returns true if a clown left the ground.
pub fn launch<R: Rng>(state: &mut GameState, rng: &mut R) -> bool {
    if state.phase != GamePhase::Playing {
        return false;
    }

    let on_board = (0..CLOWN_COUNT).find_map(|i| state.clowns[i].board().map(|b| (i, b)));
    if let Some((id, board)) = on_board {
        let vx = state.diving_boards[board].hop_vx();
        state.clowns[id].take_off(Vec2::new(vx, DIVE_HOP_VY));
        state.events.push(GameEvent::Bounce);
        log::debug!("Clown {} dives off board {}", id, board);
        return true;
    }

    let on_seesaw = (0..CLOWN_COUNT).find(|&i| state.clowns[i].seesaw_side().is_some());
    if let Some(id) = on_seesaw {
        let vel = Vec2::new(random_launch_vx(rng), state.launch.velocity_y());
        state.clowns[id].take_off(vel);
        state.events.push(GameEvent::Bounce);
        log::debug!("Clown {} launched from seesaw at {:.1}", id, vel.y);
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{ClownState, Side};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn playing() -> GameState {
        let mut state = GameState::new();
        state.phase = GamePhase::Playing;
        state
    }

    #[test]
    fn test_board_clown_goes_first() {
        let mut state = playing();
        let mut rng = Pcg32::seed_from_u64(3);

        assert!(launch(&mut state, &mut rng));
        // Clown 1 starts on the upper right board: hop left and up
        assert!(state.clowns[1].is_flying());
        assert_eq!(state.clowns[1].vel, Vec2::new(-3.0, -2.0));
        assert_eq!(state.clowns[0].seesaw_side(), Some(Side::Left));
        assert_eq!(state.events, vec![GameEvent::Bounce]);
    }

    #[test]
    fn test_seesaw_clown_uses_launch_velocity() {
        let mut state = playing();
        state.clowns[1].state = ClownState::Flying;
        state.launch.tighten();
        let mut rng = Pcg32::seed_from_u64(3);

        assert!(launch(&mut state, &mut rng));
        assert!(state.clowns[0].is_flying());
        assert_eq!(state.clowns[0].vel.y, state.launch.velocity_y());
        assert!(state.clowns[0].vel.x >= -2.0 && state.clowns[0].vel.x < 2.0);
    }

    #[test]
    fn test_noop_when_everyone_flying() {
        let mut state = playing();
        state.clowns[0].state = ClownState::Flying;
        state.clowns[1].state = ClownState::Flying;
        let mut rng = Pcg32::seed_from_u64(3);
        assert!(!launch(&mut state, &mut rng));
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_noop_when_not_playing() {
        let mut state = GameState::new();
        let mut rng = Pcg32::seed_from_u64(3);
        assert!(!launch(&mut state, &mut rng));
        assert!(state.clowns.iter().all(|c| c.is_grounded()));

        state.phase = GamePhase::GameOver;
        assert!(!launch(&mut state, &mut rng));
    }

    #[test]
    fn test_random_launch_vx_range() {
        let mut rng = Pcg32::seed_from_u64(42);
        for _ in 0..1000 {
            let vx = random_launch_vx(&mut rng);
            assert!((-2.0..2.0).contains(&vx));
        }
    }
}
