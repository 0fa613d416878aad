use glam::{Quat, Vec2, Vec3};

/// How the blended velocity reaches the body this step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Motion {
    /// Move the body directly by this displacement.
    Displace(Vec3),
    /// Apply as a continuous acceleration.
    Accelerate(Vec3),
}

#[derive(Clone, Debug, PartialEq)]
pub struct MovementIntegrator {
    pub speed: f32,
    pub acceleration: f32,
    pub air_control: f32,
    pub air_acceleration: f32,
    velocity: Vec3,
}

impl MovementIntegrator {
    pub fn new(speed: f32, acceleration: f32, air_control: f32, air_acceleration: f32) -> Self {
        Self {
            speed,
            acceleration,
            air_control,
            air_acceleration,
            velocity: Vec3::ZERO,
        }
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Blends velocity toward the requested world-space direction. The blend
    /// factor is `rate * dt`, unnormalised, and is not clamped.
    pub fn step(&mut self, input: Vec2, body_rotation: Quat, grounded: bool, dt: f32) -> Motion {
        let wish = world_direction(input, body_rotation);
        if grounded {
            self.velocity = self.velocity.lerp(wish * self.speed, self.acceleration * dt);
            Motion::Displace(self.velocity * dt)
        } else {
            let target = wish * self.speed * self.air_control;
            self.velocity = self.velocity.lerp(target, self.air_acceleration * dt);
            Motion::Accelerate(self.velocity)
        }
    }

    pub fn reset(&mut self) {
        self.velocity = Vec3::ZERO;
    }
}

/// `input.x` strafes right, `input.y` moves forward. Diagonals are normalised.
pub fn world_direction(input: Vec2, body_rotation: Quat) -> Vec3 {
    let local = Vec3::new(input.x, 0.0, -input.y).normalize_or_zero();
    body_rotation * local
}
