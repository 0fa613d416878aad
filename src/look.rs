use glam::{Quat, Vec2, Vec3};

use crate::config::MAX_PITCH;
use crate::math::look_rotation;

/// Result of one look step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LookOutput {
    pub body_rotation: Quat,
    /// Camera pitch relative to the body, degrees, positive looks up.
    pub camera_pitch: f32,
}

/// Mouse look with smoothing. Angles are degrees: `x` is pitch, `y` turns
/// clockwise around the gravity axis.
#[derive(Clone, Debug, PartialEq)]
pub struct LookController {
    pub sensitivity: f32,
    pub smoothness: f32,
    target: Vec2,
    current: Vec2,
}

impl LookController {
    pub fn new(sensitivity: f32, smoothness: f32) -> Self {
        Self {
            sensitivity,
            smoothness,
            target: Vec2::ZERO,
            current: Vec2::ZERO,
        }
    }

    pub fn target_angles(&self) -> Vec2 {
        self.target
    }

    pub fn current_angles(&self) -> Vec2 {
        self.current
    }

    /// Adds mouse movement (`x` horizontal, `y` vertical) to the target angles.
    pub fn accumulate(&mut self, mouse_delta: Vec2, dt: f32) {
        self.target.y += mouse_delta.x * self.sensitivity * dt;
        self.target.x += mouse_delta.y * self.sensitivity * dt;
        self.target.x = self.target.x.clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Overrides pitch on both target and current, e.g. to keep the horizon
    /// steady while gravity swings.
    pub fn set_pitch(&mut self, pitch: f32) {
        let pitch = pitch.clamp(-MAX_PITCH, MAX_PITCH);
        self.target.x = pitch;
        self.current.x = pitch;
    }

    /// Smooths current toward target and derives the body orientation from the
    /// current gravity. Turning is applied as the change of the smoothed yaw.
    pub fn step(&mut self, dt: f32, gravity: Vec3, body_rotation: Quat) -> LookOutput {
        let previous = self.current;
        let t = (self.smoothness * dt).min(1.0);
        // a + (b - a) * t is exact when a == b, unlike glam's a * (1 - t) + b * t
        self.current += (self.target - self.current) * t;
        self.current.x = self.current.x.clamp(-MAX_PITCH, MAX_PITCH);

        let up = (-gravity).normalize_or(body_rotation * Vec3::Y);
        let right = body_rotation * Vec3::X;
        let mut forward = right.cross(-up);
        if forward.length_squared() < 1e-6 {
            // Gravity lines up with the body's right axis; keep the old heading
            forward = body_rotation * Vec3::NEG_Z;
        }
        let turn = (self.current.y - previous.y).to_radians();
        let forward = Quat::from_axis_angle(up, -turn) * forward.normalize();

        LookOutput {
            body_rotation: look_rotation(forward, up),
            camera_pitch: self.current.x,
        }
    }

    pub fn reset(&mut self) {
        self.target = Vec2::ZERO;
        self.current = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn pitch_target_stays_clamped_for_random_input() {
        let mut look = LookController::new(100.0, 20.0);
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..5_000 {
            let delta = Vec2::new(rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0));
            let dt = rng.gen_range(0.001..0.1);
            look.accumulate(delta, dt);
            let pitch = look.target_angles().x;
            assert!((-90.0..=90.0).contains(&pitch), "pitch {pitch}");
            look.step(dt, Vec3::NEG_Y * 9.81, Quat::IDENTITY);
            assert!((-90.0..=90.0).contains(&look.current_angles().x));
        }
    }

    #[test]
    fn pitch_held_at_limit_stays_on_limit() {
        let mut look = LookController::new(100.0, 20.0);
        look.set_pitch(90.0);
        // smoothness * dt = 0.25524297
        let out = look.step(0.012_762_149, Vec3::NEG_Y * 9.81, Quat::IDENTITY);
        assert_eq!(look.current_angles().x, 90.0);
        assert_eq!(out.camera_pitch, 90.0);

        look.set_pitch(-90.0);
        for _ in 0..50 {
            look.step(0.013, Vec3::NEG_Y * 9.81, Quat::IDENTITY);
            assert_eq!(look.current_angles().x, -90.0);
        }
    }

    #[test]
    fn current_angles_approach_target() {
        let mut look = LookController::new(1.0, 10.0);
        look.accumulate(Vec2::new(30.0, 45.0), 1.0);
        let mut last_gap = f32::MAX;
        for _ in 0..100 {
            look.step(0.02, Vec3::NEG_Y, Quat::IDENTITY);
            let gap = (look.target_angles() - look.current_angles()).length();
            assert!(gap <= last_gap);
            last_gap = gap;
        }
        assert!(last_gap < 0.01);
    }

    #[test]
    fn body_turns_around_gravity_axis() {
        let mut look = LookController::new(1.0, 50.0);
        // 90 degrees to the right; smoothness * dt of 1 snaps in one step
        look.accumulate(Vec2::new(90.0, 0.0), 1.0);
        let out = look.step(0.02, Vec3::NEG_Y * 9.81, Quat::IDENTITY);
        let forward = out.body_rotation * Vec3::NEG_Z;
        assert!(forward.distance(Vec3::X) < 1e-4, "forward {forward:?}");
        assert!((out.body_rotation * Vec3::Y).distance(Vec3::Y) < 1e-4);
    }

    #[test]
    fn body_up_follows_gravity() {
        let mut look = LookController::new(1.0, 10.0);
        let gravity = Vec3::new(0.0, 0.0, 9.81);
        let out = look.step(0.02, gravity, Quat::IDENTITY);
        assert!((out.body_rotation * Vec3::Y).distance(Vec3::NEG_Z) < 1e-4);
        // right axis is preserved through the flip
        assert!((out.body_rotation * Vec3::X).distance(Vec3::X) < 1e-4);
    }

    #[test]
    fn set_pitch_overrides_both_angles() {
        let mut look = LookController::new(1.0, 10.0);
        look.set_pitch(-120.0);
        assert_eq!(look.target_angles().x, -90.0);
        assert_eq!(look.current_angles().x, -90.0);
    }
}
