use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

// Player body
pub const BODY_RADIUS: f32 = 0.5;
pub const BODY_HALF_HEIGHT: f32 = 0.5; // half length of the capsule segment
pub const GROUND_PROBE_RADIUS_FACTOR: f32 = 0.95;
pub const GROUND_PROBE_TRAVEL_FACTOR: f32 = 0.5;
pub const GROUND_NORMAL_MAX_DISTANCE: f32 = 100.0;

// Movement
pub const MOVE_SPEED: f32 = 5.0;
pub const ACCELERATION: f32 = 10.0;
pub const AIR_CONTROL: f32 = 0.5;
pub const AIR_ACCELERATION: f32 = 2.0;
pub const JUMP_FORCE: f32 = 5.0;
pub const MAX_AIR_JUMPS: u32 = 1;

// Look
pub const MOUSE_SENSITIVITY: f32 = 100.0;
pub const LOOK_SMOOTHNESS: f32 = 20.0;
pub const MAX_PITCH: f32 = 90.0;

// Gravity
pub const GRAVITY: f32 = 9.81;
pub const GRAVITY_ROTATION_SCALE: f32 = 1.5; // radians per second at full input
pub const GRAVITY_SMOOTH_TIME: f32 = 0.15;
pub const GRAVITY_RESET_DURATION: f32 = 0.5;

// Level
pub const FADE_APPEAR_TIME: f32 = 0.5;
pub const BOUNDS_EDGE: f32 = 1000.0;

// Trajectory preview
pub const PREVIEW_DELTA_TIME: f32 = 0.02;
pub const PREVIEW_POINT_SPACING: f32 = 0.2;
pub const PREVIEW_MAX_LENGTH: f32 = 100.0;

pub const FIXED_DELTA_TIME: f32 = 1.0 / 50.0;

/// Tunable fields of the player controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub speed: f32,
    pub acceleration: f32,
    pub air_control: f32,
    pub air_acceleration: f32,
    pub jump_force: f32,
    pub max_air_jumps: u32,
    pub mouse_sensitivity: f32,
    pub look_smoothness: f32,
    /// Angular rate applied to gravity at full input, radians per second.
    pub gravity_rotation_scale: f32,
    pub gravity_smooth_time: f32,
    pub gravity_reset_duration: f32,
    pub body_radius: f32,
    pub body_half_height: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            speed: MOVE_SPEED,
            acceleration: ACCELERATION,
            air_control: AIR_CONTROL,
            air_acceleration: AIR_ACCELERATION,
            jump_force: JUMP_FORCE,
            max_air_jumps: MAX_AIR_JUMPS,
            mouse_sensitivity: MOUSE_SENSITIVITY,
            look_smoothness: LOOK_SMOOTHNESS,
            gravity_rotation_scale: GRAVITY_ROTATION_SCALE,
            gravity_smooth_time: GRAVITY_SMOOTH_TIME,
            gravity_reset_duration: GRAVITY_RESET_DURATION,
            body_radius: BODY_RADIUS,
            body_half_height: BODY_HALF_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FadeSettings {
    pub appear_time: f32,
}

impl Default for FadeSettings {
    fn default() -> Self {
        Self {
            appear_time: FADE_APPEAR_TIME,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelSettings {
    /// Respawn when any coordinate of the player leaves `[-bounds_edge, bounds_edge]`.
    pub bounds_edge: f32,
    pub default_gravity: Vec3,
    /// Where the player goes on respawn while no checkpoint is claimed.
    pub reset_position: Vec3,
}

impl Default for LevelSettings {
    fn default() -> Self {
        Self {
            bounds_edge: BOUNDS_EDGE,
            default_gravity: Vec3::NEG_Y * GRAVITY,
            reset_position: Vec3::ZERO,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub player: PlayerSettings,
    pub fade: FadeSettings,
    pub level: LevelSettings,
}

impl GameConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let p = &self.player;
        if p.body_radius <= 0.0 || p.body_half_height < 0.0 {
            return Err(GameError::Config(format!(
                "invalid body dimensions: radius {}, half height {}",
                p.body_radius, p.body_half_height
            )));
        }
        if p.gravity_reset_duration <= 0.0 || self.fade.appear_time <= 0.0 {
            return Err(GameError::Config(
                "transition durations must be positive".into(),
            ));
        }
        Ok(())
    }
}
