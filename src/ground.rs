//! Ground detection against everything but the player's own layer.

use glam::Vec3;

use crate::config::{GROUND_NORMAL_MAX_DISTANCE, GROUND_PROBE_RADIUS_FACTOR, GROUND_PROBE_TRAVEL_FACTOR};
use crate::physics::{Layer, LayerMask, PhysicsWorld};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundSensor {
    /// Radius of the body the probe belongs to
    pub radius: f32,
    pub mask: LayerMask,
}

impl GroundSensor {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            mask: LayerMask::all_except(Layer::Player),
        }
    }

    /// Sweeps a slightly smaller sphere from one radius below `center` along `down`.
    pub fn is_grounded(&self, world: &PhysicsWorld, center: Vec3, down: Vec3) -> bool {
        let down = down.normalize_or(Vec3::NEG_Y);
        let origin = center + down * self.radius;
        world
            .cast_sphere(
                origin,
                self.radius * GROUND_PROBE_RADIUS_FACTOR,
                down,
                self.radius * GROUND_PROBE_TRAVEL_FACTOR,
                self.mask,
            )
            .is_some()
    }

    /// Normal of the surface straight below `center`, if any within range.
    pub fn ground_normal(&self, world: &PhysicsWorld, center: Vec3, down: Vec3) -> Option<Vec3> {
        let down = down.normalize_or(Vec3::NEG_Y);
        world
            .cast_ray(center, down, GROUND_NORMAL_MAX_DISTANCE, self.mask)
            .map(|hit| hit.normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Pose;

    fn world_with_floor() -> PhysicsWorld {
        let mut world = PhysicsWorld::default();
        world.add_static_box(
            Pose::from_position(Vec3::new(0.0, -1.0, 0.0)),
            Vec3::new(10.0, 1.0, 10.0),
        );
        world
    }

    #[test]
    fn normal_of_floor_five_units_below() {
        let mut world = world_with_floor();
        // The player's own body sits in the way and must be ignored
        world.add_player_body(Pose::from_position(Vec3::new(0.0, 4.0, 0.0)), 0.5, 0.5);
        let sensor = GroundSensor::new(0.5);
        assert!(!sensor.mask.contains(Layer::Player));

        let normal = sensor.ground_normal(&world, Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y);
        assert!(normal.unwrap().distance(Vec3::Y) < 1e-4);
    }

    #[test]
    fn no_normal_beyond_range() {
        let world = world_with_floor();
        let sensor = GroundSensor::new(0.5);
        assert_eq!(
            sensor.ground_normal(&world, Vec3::new(0.0, 150.0, 0.0), Vec3::NEG_Y),
            None
        );
        assert_eq!(
            sensor.ground_normal(&world, Vec3::new(0.0, 5.0, 0.0), Vec3::Y),
            None
        );
    }

    #[test]
    fn grounded_when_resting_on_floor() {
        let world = world_with_floor();
        let sensor = GroundSensor::new(0.5);
        // capsule bottom touches y = 0
        assert!(sensor.is_grounded(&world, Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Y));
        assert!(sensor.is_grounded(&world, Vec3::new(0.0, 1.1, 0.0), Vec3::NEG_Y));
        assert!(!sensor.is_grounded(&world, Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y));
    }

    #[test]
    fn grounded_follows_custom_down() {
        let mut world = PhysicsWorld::default();
        world.add_static_box(
            Pose::from_position(Vec3::new(-1.0, 0.0, 0.0)),
            Vec3::new(1.0, 10.0, 10.0),
        );
        let sensor = GroundSensor::new(0.5);
        assert!(sensor.is_grounded(&world, Vec3::new(1.0, 0.0, 0.0), Vec3::NEG_X));
        assert!(!sensor.is_grounded(&world, Vec3::new(1.0, 0.0, 0.0), Vec3::NEG_Y));
        let normal = sensor.ground_normal(&world, Vec3::new(1.0, 0.0, 0.0), Vec3::NEG_X);
        assert!(normal.unwrap().distance(Vec3::X) < 1e-4);
    }
}
