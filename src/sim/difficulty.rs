//! Progressive launch velocity
//!
//! Every clean seesaw landing makes the next launch a little stronger, up to a
//! cap. Any death drops it back to the baseline.

use serde::{Deserialize, Serialize};

use crate::consts::{LAUNCH_SPEED_STEP, MAX_LAUNCH_SPEED, MIN_LAUNCH_SPEED};

/// Launch speed ramp. Stored as a magnitude; [`LaunchRamp::velocity_y`]
/// gives the upward screen-space velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchRamp {
    speed: f32,
}

impl Default for LaunchRamp {
    fn default() -> Self {
        Self {
            speed: MIN_LAUNCH_SPEED,
        }
    }
}

impl LaunchRamp {
    /// Current launch speed magnitude
    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Vertical launch velocity (negative is up)
    #[inline]
    pub fn velocity_y(&self) -> f32 {
        -self.speed
    }

    /// Step toward the maximum after a successful landing
    pub fn tighten(&mut self) {
        self.speed = (self.speed + LAUNCH_SPEED_STEP).min(MAX_LAUNCH_SPEED);
    }

    /// Back to baseline after a death
    pub fn reset(&mut self) {
        self.speed = MIN_LAUNCH_SPEED;
    }
}
