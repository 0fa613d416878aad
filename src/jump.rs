use glam::Vec3;

/// Jump budget: unlimited from the ground, `max_air_jumps` per landing in the air.
#[derive(Clone, Debug, PartialEq)]
pub struct JumpController {
    pub jump_force: f32,
    pub max_air_jumps: u32,
    air_jumps_left: u32,
}

impl JumpController {
    pub fn new(jump_force: f32, max_air_jumps: u32) -> Self {
        Self {
            jump_force,
            max_air_jumps,
            air_jumps_left: max_air_jumps,
        }
    }

    pub fn air_jumps_left(&self) -> u32 {
        self.air_jumps_left
    }

    /// Refills air jumps; called on every grounded step.
    pub fn land(&mut self) {
        self.air_jumps_left = self.max_air_jumps;
    }

    /// Velocity to set on the body. Setting (not adding) keeps jump height
    /// independent of the current vertical speed.
    pub fn jump_velocity(&self, direction: Vec3, velocity: Vec3) -> Vec3 {
        direction * self.jump_force + velocity
    }

    /// Returns the new body velocity, or `None` when no jump is available.
    /// Grounded jumps push along the ground normal when known, else body up.
    pub fn try_jump(
        &mut self,
        grounded: bool,
        ground_normal: Option<Vec3>,
        body_up: Vec3,
        velocity: Vec3,
    ) -> Option<Vec3> {
        if grounded {
            let direction = ground_normal.unwrap_or(body_up);
            return Some(self.jump_velocity(direction, velocity));
        }
        if self.air_jumps_left == 0 {
            return None;
        }
        self.air_jumps_left -= 1;
        Some(self.jump_velocity(body_up, velocity))
    }
}
