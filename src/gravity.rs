//! Player-driven gravity rotation and the smoothed "reset to ground" transition.
//!
//! Two writers touch gravity: the continuous rotation from input and the reset
//! transition. While a transition runs it owns gravity and the continuous rotation is
//! suspended; the input rates keep smoothing so control resumes without a jump.

use glam::{Quat, Vec3};

use crate::config::MAX_PITCH;
use crate::math::{lerp, signed_angle, smooth_damp, smoothstep};
use crate::Progress;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct SmoothedRate {
    value: f32,
    velocity: f32,
    target: f32,
}

impl SmoothedRate {
    fn advance(&mut self, smooth_time: f32, dt: f32) -> f32 {
        self.value = smooth_damp(self.value, self.target, &mut self.velocity, smooth_time, dt);
        self.value
    }
}

/// Smoothstep interpolation of gravity and camera pitch over a fixed duration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GravityReset {
    start_gravity: Vec3,
    target_gravity: Vec3,
    start_pitch: f32,
    target_pitch: f32,
    elapsed: f32,
    duration: f32,
}

impl GravityReset {
    /// Pitch is compensated by the signed angle between old and new gravity about
    /// `right`, so the view keeps pointing at the same place.
    pub fn new(start_gravity: Vec3, target_gravity: Vec3, start_pitch: f32, right: Vec3, duration: f32) -> Self {
        let swing = signed_angle(start_gravity, target_gravity, right).to_degrees();
        Self {
            start_gravity,
            target_gravity,
            start_pitch,
            target_pitch: (start_pitch - swing).clamp(-MAX_PITCH, MAX_PITCH),
            elapsed: 0.0,
            duration: duration.max(f32::EPSILON),
        }
    }

    pub fn advance(&mut self, dt: f32) -> Progress {
        self.elapsed += dt;
        // tolerate accumulated step error
        if self.elapsed >= self.duration - 1e-5 {
            self.elapsed = self.duration;
            Progress::Done
        } else {
            Progress::InProgress
        }
    }

    fn amount(&self) -> f32 {
        smoothstep(self.elapsed / self.duration)
    }

    pub fn gravity(&self) -> Vec3 {
        self.start_gravity.lerp(self.target_gravity, self.amount())
    }

    pub fn pitch(&self) -> f32 {
        lerp(self.start_pitch, self.target_pitch, self.amount())
    }

    pub fn target_gravity(&self) -> Vec3 {
        self.target_gravity
    }

    pub fn target_pitch(&self) -> f32 {
        self.target_pitch
    }
}

/// Gravity and, during a reset transition, the camera pitch to apply.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GravityStep {
    pub gravity: Vec3,
    pub camera_pitch: Option<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GravityRotator {
    /// Radians per second at full input
    pub rotation_scale: f32,
    pub smooth_time: f32,
    pub reset_duration: f32,
    clockwise: SmoothedRate,
    vertical: SmoothedRate,
    reset: Option<GravityReset>,
}

impl GravityRotator {
    pub fn new(rotation_scale: f32, smooth_time: f32, reset_duration: f32) -> Self {
        Self {
            rotation_scale,
            smooth_time,
            reset_duration,
            clockwise: SmoothedRate::default(),
            vertical: SmoothedRate::default(),
            reset: None,
        }
    }

    /// Target rates in `[-1, 1]`.
    pub fn set_input(&mut self, clockwise: f32, vertical: f32) {
        self.clockwise.target = clockwise.clamp(-1.0, 1.0);
        self.vertical.target = vertical.clamp(-1.0, 1.0);
    }

    pub fn rates(&self) -> (f32, f32) {
        (self.clockwise.value, self.vertical.value)
    }

    pub fn is_resetting(&self) -> bool {
        self.reset.is_some()
    }

    pub fn active_reset(&self) -> Option<&GravityReset> {
        self.reset.as_ref()
    }

    /// Starts a transition to `-normal * |gravity|`. Without a normal nothing
    /// happens. A running transition is replaced, starting from `gravity`.
    pub fn begin_reset(&mut self, gravity: Vec3, ground_normal: Option<Vec3>, pitch: f32, right: Vec3) -> bool {
        let Some(normal) = ground_normal else {
            return false;
        };
        // Mid-transition gravity is a chord and shorter than the real magnitude
        let magnitude = self
            .reset
            .map_or(gravity.length(), |running| running.target_gravity().length());
        let target = -normal.normalize_or_zero() * magnitude;
        if self.reset.is_some() {
            log::debug!("Gravity reset restarted mid-transition");
        }
        self.reset = Some(GravityReset::new(gravity, target, pitch, right, self.reset_duration));
        log::info!("Gravity reset toward {:?}", target);
        true
    }

    /// One fixed step: smooths input rates, then either advances the reset
    /// transition or rotates `gravity` about the body's forward and right axes.
    pub fn fixed_step(&mut self, gravity: Vec3, forward: Vec3, right: Vec3, dt: f32) -> GravityStep {
        let clockwise = self.clockwise.advance(self.smooth_time, dt);
        let vertical = self.vertical.advance(self.smooth_time, dt);

        if let Some(reset) = self.reset.as_mut() {
            let progress = reset.advance(dt);
            let step = GravityStep {
                gravity: reset.gravity(),
                camera_pitch: Some(reset.pitch()),
            };
            if progress == Progress::Done {
                self.reset = None;
            }
            return step;
        }

        GravityStep {
            gravity: rotate_gravity(gravity, forward, right, clockwise, vertical, self.rotation_scale * dt),
            camera_pitch: None,
        }
    }

    pub fn reset(&mut self) {
        self.clockwise = SmoothedRate::default();
        self.vertical = SmoothedRate::default();
        self.reset = None;
    }
}

/// Pure rotation of `gravity`; `angle_scale` is radians per unit rate for this step.
pub fn rotate_gravity(gravity: Vec3, forward: Vec3, right: Vec3, clockwise: f32, vertical: f32, angle_scale: f32) -> Vec3 {
    let around_forward = Quat::from_axis_angle(forward.normalize_or(Vec3::NEG_Z), -clockwise * angle_scale);
    let around_right = Quat::from_axis_angle(right.normalize_or(Vec3::X), -vertical * angle_scale);
    around_right * (around_forward * gravity)
}
