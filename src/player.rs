//! The player controller: per-frame input sampling and the fixed-step update that
//! drives look, gravity, movement and jumping against the physics world.

use glam::{Quat, Vec2, Vec3};
use rapier3d::prelude::RigidBodyHandle;

use crate::config::PlayerSettings;
use crate::error::{GameError, Result};
use crate::gravity::GravityRotator;
use crate::ground::GroundSensor;
use crate::input::{Action, Axis, InputState};
use crate::jump::JumpController;
use crate::look::LookController;
use crate::movement::{Motion, MovementIntegrator};
use crate::physics::{PhysicsWorld, Pose};

pub struct PlayerController {
    settings: PlayerSettings,
    body: RigidBodyHandle,
    sensor: GroundSensor,
    look: LookController,
    gravity: GravityRotator,
    movement: MovementIntegrator,
    jump: JumpController,

    // Sampled each frame, consumed by the next fixed step
    move_input: Vec2,
    jump_requested: bool,
    gravity_reset_requested: bool,

    camera_pitch: f32,
    grounded: bool,
}

impl PlayerController {
    /// Spawns the player body into `world`.
    pub fn spawn(world: &mut PhysicsWorld, pose: Pose, settings: PlayerSettings) -> Self {
        let body = world.add_player_body(pose, settings.body_radius, settings.body_half_height);
        Self {
            body,
            sensor: GroundSensor::new(settings.body_radius),
            look: LookController::new(settings.mouse_sensitivity, settings.look_smoothness),
            gravity: GravityRotator::new(
                settings.gravity_rotation_scale,
                settings.gravity_smooth_time,
                settings.gravity_reset_duration,
            ),
            movement: MovementIntegrator::new(
                settings.speed,
                settings.acceleration,
                settings.air_control,
                settings.air_acceleration,
            ),
            jump: JumpController::new(settings.jump_force, settings.max_air_jumps),
            settings,
            move_input: Vec2::ZERO,
            jump_requested: false,
            gravity_reset_requested: false,
            camera_pitch: 0.0,
            grounded: false,
        }
    }

    pub fn body(&self) -> RigidBodyHandle {
        self.body
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    pub fn pose(&self, world: &PhysicsWorld) -> Result<Pose> {
        world.body_pose(self.body).ok_or(GameError::MissingBody)
    }

    /// Grounded state as of the last fixed step.
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn air_jumps_left(&self) -> u32 {
        self.jump.air_jumps_left()
    }

    pub fn velocity(&self) -> Vec3 {
        self.movement.velocity()
    }

    pub fn target_angles(&self) -> Vec2 {
        self.look.target_angles()
    }

    pub fn current_angles(&self) -> Vec2 {
        self.look.current_angles()
    }

    pub fn camera_pitch(&self) -> f32 {
        self.camera_pitch
    }

    pub fn is_resetting_gravity(&self) -> bool {
        self.gravity.is_resetting()
    }

    /// Camera orientation in world space: body rotation then local pitch.
    pub fn camera_rotation(&self, world: &PhysicsWorld) -> Result<Quat> {
        let pose = self.pose(world)?;
        Ok(pose.rotation * Quat::from_rotation_x(self.camera_pitch.to_radians()))
    }

    pub fn jump_velocity(&self, direction: Vec3, velocity: Vec3) -> Vec3 {
        self.jump.jump_velocity(direction, velocity)
    }

    /// Per-frame input sampling.
    pub fn update(&mut self, input: &mut InputState, dt: f32) {
        self.move_input = Vec2::new(input.axis(Axis::Horizontal), input.axis(Axis::Vertical));
        self.look.accumulate(input.consume_mouse_delta(), dt);
        self.gravity.set_input(
            input.button_axis(Action::GravityClockwise, Action::GravityCounterClockwise),
            input.axis(Axis::GravityVertical),
        );
        if input.consume_pressed(Action::Jump) {
            self.jump_requested = true;
        }
        if input.consume_pressed(Action::ResetGravity) {
            self.gravity_reset_requested = true;
        }
    }

    /// Asks for gravity to swing to the surface below on the next fixed step.
    pub fn request_gravity_reset(&mut self) {
        self.gravity_reset_requested = true;
    }

    pub fn request_jump(&mut self) {
        self.jump_requested = true;
    }

    pub fn fixed_update(&mut self, world: &mut PhysicsWorld, dt: f32) -> Result<()> {
        let pose = self.pose(world)?;

        if std::mem::take(&mut self.gravity_reset_requested) {
            let normal = self.sensor.ground_normal(world, pose.position, pose.down());
            if !self.gravity.begin_reset(world.gravity, normal, self.look.current_angles().x, pose.right()) {
                log::debug!("Gravity reset skipped, nothing below");
            }
        }

        let step = self.gravity.fixed_step(world.gravity, pose.forward(), pose.right(), dt);
        world.gravity = step.gravity;
        if let Some(pitch) = step.camera_pitch {
            self.look.set_pitch(pitch);
        }

        let look = self.look.step(dt, world.gravity, pose.rotation);
        self.camera_pitch = look.camera_pitch;
        let rotation = look.body_rotation;
        world.set_body_rotation(self.body, rotation);

        let down = rotation * Vec3::NEG_Y;
        let grounded = self.sensor.is_grounded(world, pose.position, down);
        if grounded {
            self.jump.land();
        }

        match self.movement.step(self.move_input, rotation, grounded, dt) {
            Motion::Displace(offset) => {
                world.set_acceleration(self.body, Vec3::ZERO);
                world.set_body_pose(self.body, Pose::new(pose.position + offset, rotation));
            }
            Motion::Accelerate(acceleration) => {
                world.set_acceleration(self.body, acceleration);
            }
        }

        if std::mem::take(&mut self.jump_requested) {
            let normal = if grounded {
                self.sensor.ground_normal(world, pose.position, down)
            } else {
                None
            };
            let up = rotation * Vec3::Y;
            if let Some(velocity) = self.jump.try_jump(grounded, normal, up, self.movement.velocity()) {
                world.set_linear_velocity(self.body, velocity);
                log::debug!(
                    "Jump (grounded: {grounded}, air jumps left: {})",
                    self.jump.air_jumps_left()
                );
            }
        }

        self.grounded = grounded;
        Ok(())
    }

    /// Moves the body to `pose` without touching controller state.
    pub fn teleport(&self, world: &mut PhysicsWorld, pose: Pose) -> Result<()> {
        if world.set_body_pose(self.body, pose) {
            Ok(())
        } else {
            Err(GameError::MissingBody)
        }
    }

    /// Clears velocity, smoothing state and look accumulators.
    pub fn reset(&mut self, world: &mut PhysicsWorld) -> Result<()> {
        if !world.set_linear_velocity(self.body, Vec3::ZERO) {
            return Err(GameError::MissingBody);
        }
        world.set_acceleration(self.body, Vec3::ZERO);
        self.movement.reset();
        self.look.reset();
        self.gravity.reset();
        self.jump.land();
        self.move_input = Vec2::ZERO;
        self.jump_requested = false;
        self.gravity_reset_requested = false;
        self.camera_pitch = 0.0;
        self.grounded = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FIXED_DELTA_TIME;

    fn scene() -> (PhysicsWorld, PlayerController) {
        let mut world = PhysicsWorld::default();
        world.add_static_box(
            Pose::from_position(Vec3::new(0.0, -0.5, 0.0)),
            Vec3::new(50.0, 0.5, 50.0),
        );
        let player = PlayerController::spawn(
            &mut world,
            Pose::from_position(Vec3::new(0.0, 1.0, 0.0)),
            PlayerSettings::default(),
        );
        (world, player)
    }

    fn settle(world: &mut PhysicsWorld, player: &mut PlayerController, steps: usize) {
        for _ in 0..steps {
            player.fixed_update(world, FIXED_DELTA_TIME).unwrap();
            world.step(FIXED_DELTA_TIME);
        }
    }

    #[test]
    fn standing_player_is_grounded_with_full_air_jumps() {
        let (mut world, mut player) = scene();
        settle(&mut world, &mut player, 10);
        assert!(player.is_grounded());
        assert_eq!(player.air_jumps_left(), player.settings().max_air_jumps);
    }

    #[test]
    fn forward_input_moves_along_body_forward() {
        let (mut world, mut player) = scene();
        let mut input = InputState::new();
        input.set_axis(Axis::Vertical, 1.0);
        for _ in 0..50 {
            player.update(&mut input, FIXED_DELTA_TIME);
            player.fixed_update(&mut world, FIXED_DELTA_TIME).unwrap();
            world.step(FIXED_DELTA_TIME);
        }
        let pose = player.pose(&world).unwrap();
        assert!(pose.position.z < -1.0, "position {:?}", pose.position);
        assert!(pose.position.x.abs() < 1e-3);
    }

    #[test]
    fn camera_pitches_relative_to_body() {
        let (mut world, mut player) = scene();
        let mut input = InputState::new();
        // Straight up after the clamp; smoothness * dt of 1 snaps in one step
        input.handle_mouse_move(0.0, 1000.0);
        player.update(&mut input, 0.1);
        player.fixed_update(&mut world, 0.05).unwrap();
        assert_eq!(player.camera_pitch(), 90.0);

        let camera = player.camera_rotation(&world).unwrap();
        let view = camera * Vec3::NEG_Z;
        assert!(view.distance(Vec3::Y) < 1e-4, "view {view:?}");
    }

    #[test]
    fn jump_leaves_ground_and_air_jump_consumes_budget() {
        let (mut world, mut player) = scene();
        settle(&mut world, &mut player, 5);

        player.request_jump();
        player.fixed_update(&mut world, FIXED_DELTA_TIME).unwrap();
        let v = world.linear_velocity(player.body()).unwrap();
        assert!((v.y - player.settings().jump_force).abs() < 1e-3);

        // Rise clear of the ground probe
        for _ in 0..10 {
            world.step(FIXED_DELTA_TIME);
            player.fixed_update(&mut world, FIXED_DELTA_TIME).unwrap();
        }
        assert!(!player.is_grounded());
        assert_eq!(player.air_jumps_left(), 1);

        player.request_jump();
        player.fixed_update(&mut world, FIXED_DELTA_TIME).unwrap();
        assert_eq!(player.air_jumps_left(), 0);

        // Budget exhausted: velocity is left to the integrator
        world.step(FIXED_DELTA_TIME);
        let before = world.linear_velocity(player.body()).unwrap();
        player.request_jump();
        player.fixed_update(&mut world, FIXED_DELTA_TIME).unwrap();
        assert_eq!(world.linear_velocity(player.body()).unwrap(), before);
        assert_eq!(player.air_jumps_left(), 0);
    }

    #[test]
    fn gravity_reset_swings_to_wall_below() {
        let mut world = PhysicsWorld::default();
        // Tilted floor: 30 degrees around X
        let tilt = Quat::from_rotation_x(30f32.to_radians());
        world.add_static_box(Pose::new(Vec3::ZERO, tilt), Vec3::new(50.0, 0.5, 50.0));
        let mut player = PlayerController::spawn(
            &mut world,
            Pose::from_position(Vec3::new(0.0, 5.0, 0.0)),
            PlayerSettings::default(),
        );

        player.request_gravity_reset();
        player.fixed_update(&mut world, FIXED_DELTA_TIME).unwrap();
        assert!(player.is_resetting_gravity());
        while player.is_resetting_gravity() {
            player.fixed_update(&mut world, FIXED_DELTA_TIME).unwrap();
        }
        let expected = -(tilt * Vec3::Y) * 9.81;
        assert!(world.gravity.distance(expected) < 1e-3, "gravity {:?}", world.gravity);
    }

    #[test]
    fn reset_clears_motion_and_look() {
        let (mut world, mut player) = scene();
        let mut input = InputState::new();
        input.set_axis(Axis::Vertical, 1.0);
        input.handle_mouse_move(10.0, 10.0);
        player.update(&mut input, 0.1);
        settle(&mut world, &mut player, 5);
        assert_ne!(player.velocity(), Vec3::ZERO);
        assert_ne!(player.target_angles(), Vec2::ZERO);

        player.reset(&mut world).unwrap();
        assert_eq!(player.velocity(), Vec3::ZERO);
        assert_eq!(player.target_angles(), Vec2::ZERO);
        assert_eq!(player.current_angles(), Vec2::ZERO);
        assert_eq!(world.linear_velocity(player.body()).unwrap(), Vec3::ZERO);
    }
}
