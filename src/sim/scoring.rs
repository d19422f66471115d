//! Pure scoring rules
//!
//! No simulation state beyond the balloon slice is consulted.

use super::state::{Balloon, BalloonColor};

/// Points for a clean seesaw landing
pub const BOUNCE_POINTS: u32 = 10;

/// Points for popping a single balloon
pub fn balloon_points(color: BalloonColor) -> u32 {
    match color {
        BalloonColor::Yellow => 20,
        BalloonColor::Green => 50,
        BalloonColor::Blue => 100,
    }
}

/// Bonus for clearing a full row of the given color
pub fn row_bonus(color: BalloonColor) -> u32 {
    match color {
        BalloonColor::Yellow => 200,
        BalloonColor::Green => 500,
        BalloonColor::Blue => 1000,
    }
}

/// Extra jumps granted for clearing a row. Only blue rows grant one.
pub fn extra_jumps_for_row_clear(color: BalloonColor) -> u32 {
    match color {
        BalloonColor::Blue => 1,
        BalloonColor::Yellow | BalloonColor::Green => 0,
    }
}

/// Row bonus if every balloon in `row` is popped, otherwise 0
pub fn row_cleared(balloons: &[Balloon], row: u32, color: BalloonColor) -> u32 {
    if balloons.iter().filter(|b| b.row == row).all(|b| b.popped) {
        row_bonus(color)
    } else {
        0
    }
}

/// Score breakdown for one balloon hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HitScore {
    pub balloon_score: u32,
    pub row_bonus: u32,
    pub extra_jumps: u32,
}

impl HitScore {
    pub fn total(&self) -> u32 {
        self.balloon_score + self.row_bonus
    }
}

/// Score for the balloon at `index`, assuming it has just been popped
pub fn balloon_hit_score(balloons: &[Balloon], index: usize) -> HitScore {
    let Some(balloon) = balloons.get(index) else {
        return HitScore::default();
    };
    let row_bonus = row_cleared(balloons, balloon.row, balloon.color);
    HitScore {
        balloon_score: balloon_points(balloon.color),
        row_bonus,
        extra_jumps: if row_bonus > 0 {
            extra_jumps_for_row_clear(balloon.color)
        } else {
            0
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn balloon(row: u32, color: BalloonColor, popped: bool) -> Balloon {
        Balloon {
            id: 0,
            pos: Vec2::ZERO,
            color,
            row,
            popped,
        }
    }

    #[test]
    fn test_point_tables() {
        assert_eq!(balloon_points(BalloonColor::Yellow), 20);
        assert_eq!(balloon_points(BalloonColor::Green), 50);
        assert_eq!(balloon_points(BalloonColor::Blue), 100);
        assert_eq!(row_bonus(BalloonColor::Yellow), 200);
        assert_eq!(row_bonus(BalloonColor::Green), 500);
        assert_eq!(row_bonus(BalloonColor::Blue), 1000);
        assert_eq!(BOUNCE_POINTS, 10);
    }

    #[test]
    fn test_only_blue_grants_extra_jump() {
        assert_eq!(extra_jumps_for_row_clear(BalloonColor::Blue), 1);
        assert_eq!(extra_jumps_for_row_clear(BalloonColor::Green), 0);
        assert_eq!(extra_jumps_for_row_clear(BalloonColor::Yellow), 0);
    }

    #[test]
    fn test_row_cleared() {
        let cleared = vec![
            balloon(0, BalloonColor::Yellow, true),
            balloon(0, BalloonColor::Yellow, true),
            balloon(1, BalloonColor::Green, false),
        ];
        assert_eq!(row_cleared(&cleared, 0, BalloonColor::Yellow), 200);
        assert_eq!(row_cleared(&cleared, 1, BalloonColor::Green), 0);
    }

    #[test]
    fn test_hit_without_row_clear() {
        let balloons = vec![
            balloon(0, BalloonColor::Yellow, true),
            balloon(0, BalloonColor::Yellow, false),
        ];
        let hit = balloon_hit_score(&balloons, 0);
        assert_eq!(hit.balloon_score, 20);
        assert_eq!(hit.row_bonus, 0);
        assert_eq!(hit.extra_jumps, 0);
    }

    #[test]
    fn test_hit_clearing_blue_row() {
        let balloons = vec![balloon(2, BalloonColor::Blue, true)];
        let hit = balloon_hit_score(&balloons, 0);
        assert_eq!(hit.balloon_score, 100);
        assert_eq!(hit.row_bonus, 1000);
        assert_eq!(hit.extra_jumps, 1);
        assert_eq!(hit.total(), 1100);
    }

    #[test]
    fn test_hit_out_of_range() {
        assert_eq!(balloon_hit_score(&[], 3), HitScore::default());
    }
}
