//! Ballistic motion for flying clowns

use super::state::Clown;
use crate::consts::{CLOWN_RADIUS, GRAVITY, PLAYFIELD_WIDTH, WALL_DAMPING};

/// Advance one flying clown by a single tick. Grounded clowns are untouched.
///
/// Gravity is applied before the position update; side walls reflect the
/// horizontal velocity away from the wall with damping.
pub fn integrate(clown: &mut Clown) {
    if !clown.is_flying() {
        return;
    }

    clown.vel.y += GRAVITY;
    clown.pos += clown.vel;

    let min_x = CLOWN_RADIUS;
    let max_x = PLAYFIELD_WIDTH - CLOWN_RADIUS;
    if clown.pos.x < min_x {
        clown.pos.x = min_x;
        clown.vel.x = clown.vel.x.abs() * WALL_DAMPING;
    } else if clown.pos.x > max_x {
        clown.pos.x = max_x;
        clown.vel.x = -clown.vel.x.abs() * WALL_DAMPING;
    }
}

/// Advance every flying clown
pub fn step_clowns(clowns: &mut [Clown]) {
    for clown in clowns {
        integrate(clown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{ClownState, Side};
    use glam::Vec2;

    fn flying(pos: Vec2, vel: Vec2) -> Clown {
        Clown {
            pos,
            vel,
            state: ClownState::Flying,
            last_side: Side::Left,
        }
    }

    #[test]
    fn test_gravity_then_move() {
        let mut clown = flying(Vec2::new(400.0, 300.0), Vec2::new(1.0, -5.0));
        integrate(&mut clown);
        assert!((clown.vel.y - (-4.7)).abs() < 1e-5);
        assert!((clown.pos.x - 401.0).abs() < 1e-5);
        assert!((clown.pos.y - 295.3).abs() < 1e-4);
    }

    #[test]
    fn test_left_wall_reflects_with_damping() {
        let mut clown = flying(Vec2::new(26.0, 300.0), Vec2::new(-5.0, 0.0));
        integrate(&mut clown);
        assert_eq!(clown.pos.x, CLOWN_RADIUS);
        assert!((clown.vel.x - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_right_wall_reflects_with_damping() {
        let mut clown = flying(Vec2::new(774.0, 300.0), Vec2::new(5.0, 0.0));
        integrate(&mut clown);
        assert_eq!(clown.pos.x, PLAYFIELD_WIDTH - CLOWN_RADIUS);
        assert!((clown.vel.x + 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_grounded_clown_does_not_move() {
        let mut clown = flying(Vec2::new(100.0, 100.0), Vec2::ZERO);
        clown.state = ClownState::OnBoard { board: 0 };
        integrate(&mut clown);
        assert_eq!(clown.pos, Vec2::new(100.0, 100.0));
        assert_eq!(clown.vel, Vec2::ZERO);
    }
}
