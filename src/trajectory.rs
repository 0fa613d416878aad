//! Jump arc preview for level design: integrates a jump from a pose with the
//! player's jump formula and gravity rotation.

use glam::Vec3;

use crate::config::{PREVIEW_DELTA_TIME, PREVIEW_MAX_LENGTH, PREVIEW_POINT_SPACING};
use crate::gravity::rotate_gravity;
use crate::physics::Pose;
use crate::player::PlayerController;

#[derive(Clone, Debug, PartialEq)]
pub struct TrajectoryPreview {
    max_length: f32,
    clockwise_delta: f32,
    points: Vec<Vec3>,
}

impl TrajectoryPreview {
    pub fn new(max_length: f32) -> Self {
        let mut preview = Self {
            max_length: 0.0,
            clockwise_delta: 0.0,
            points: Vec::new(),
        };
        preview.set_max_length(max_length);
        preview
    }

    pub fn max_length(&self) -> f32 {
        self.max_length
    }

    /// Clamped to `>= 0`; resizes the point buffer to an even count.
    pub fn set_max_length(&mut self, max_length: f32) {
        self.max_length = max_length.max(0.0);
        let mut count = (self.max_length / PREVIEW_POINT_SPACING) as usize;
        if count % 2 != 0 {
            count += 1;
        }
        self.points = vec![Vec3::ZERO; count];
    }

    pub fn clockwise_delta(&self) -> f32 {
        self.clockwise_delta
    }

    pub fn set_clockwise_delta(&mut self, delta: f32) {
        self.clockwise_delta = delta.clamp(-1.0, 1.0);
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Arc of a jump taken from `origin` while running forward at full speed.
    pub fn simulate(&mut self, origin: Pose, player: &PlayerController, gravity_magnitude: f32) -> &[Vec3] {
        let velocity = player.jump_velocity(origin.up(), origin.forward() * player.settings().speed);
        self.simulate_from(
            origin,
            velocity,
            origin.down() * gravity_magnitude,
            player.settings().gravity_rotation_scale,
        )
    }

    /// Explicit Euler over `PREVIEW_DELTA_TIME` steps. Gravity turns about the
    /// origin's forward axis by the clockwise delta each step, as held input would.
    pub fn simulate_from(&mut self, origin: Pose, mut velocity: Vec3, mut gravity: Vec3, rotation_scale: f32) -> &[Vec3] {
        if self.points.is_empty() {
            return &self.points;
        }
        self.points[0] = origin.position;
        let dt = PREVIEW_DELTA_TIME;
        for i in 1..self.points.len() {
            self.points[i] = self.points[i - 1] + velocity * dt;
            velocity += gravity * dt;
            gravity = rotate_gravity(
                gravity,
                origin.forward(),
                origin.right(),
                self.clockwise_delta,
                0.0,
                rotation_scale * dt,
            );
        }
        &self.points
    }

    /// Pose at the end of the last simulated arc, keeping the origin's rotation.
    /// Used to chain a new preview from where this one lands.
    pub fn end_pose(&self, origin: Pose) -> Option<Pose> {
        self.points
            .last()
            .map(|&position| Pose::new(position, origin.rotation))
    }
}

impl Default for TrajectoryPreview {
    fn default() -> Self {
        Self::new(PREVIEW_MAX_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerSettings;
    use crate::physics::PhysicsWorld;

    #[test]
    fn point_count_is_even_and_length_non_negative() {
        let mut preview = TrajectoryPreview::new(1.0);
        assert_eq!(preview.points().len(), 6);
        preview.set_max_length(-3.0);
        assert_eq!(preview.max_length(), 0.0);
        assert!(preview.points().is_empty());
        preview.set_clockwise_delta(4.0);
        assert_eq!(preview.clockwise_delta(), 1.0);
    }

    #[test]
    fn zero_gravity_is_a_straight_line() {
        let mut preview = TrajectoryPreview::new(20.0);
        let velocity = Vec3::new(1.0, 2.0, -3.0);
        let points = preview.simulate_from(Pose::from_position(Vec3::ONE), velocity, Vec3::ZERO, 1.5);
        let direction = velocity.normalize();
        for point in points {
            let offset = *point - Vec3::ONE;
            assert!(offset.cross(direction).length() < 1e-4);
        }
    }

    #[test]
    fn constant_gravity_matches_projectile_motion() {
        let mut preview = TrajectoryPreview::new(10.0);
        let v0 = Vec3::new(0.0, 5.0, -5.0);
        let g = Vec3::new(0.0, -9.81, 0.0);
        let points = preview.simulate_from(Pose::from_position(Vec3::ZERO), v0, g, 1.5).to_vec();
        let dt = PREVIEW_DELTA_TIME;
        for (i, point) in points.iter().enumerate() {
            let t = i as f32 * dt;
            let exact = v0 * t + 0.5 * g * t * t;
            // Explicit Euler lags by 0.5 * g * t * dt
            let tolerance = 0.5 * g.length() * t * dt + 1e-3;
            assert!(point.distance(exact) <= tolerance, "step {i}: {point:?} vs {exact:?}");
        }
    }

    #[test]
    fn player_preview_starts_with_jump_velocity() {
        let mut world = PhysicsWorld::default();
        let player = PlayerController::spawn(&mut world, Pose::from_position(Vec3::ZERO), PlayerSettings::default());
        let mut preview = TrajectoryPreview::default();
        let origin = Pose::from_position(Vec3::new(0.0, 2.0, 0.0));
        let points = preview.simulate(origin, &player, 9.81).to_vec();

        let settings = player.settings();
        let expected = origin.position + (Vec3::Y * settings.jump_force + Vec3::NEG_Z * settings.speed) * PREVIEW_DELTA_TIME;
        assert!(points[1].distance(expected) < 1e-5);
        let end = preview.end_pose(origin).unwrap();
        assert_eq!(end.position, *points.last().unwrap());
        assert!(end.position.y < origin.position.y);
    }
}
