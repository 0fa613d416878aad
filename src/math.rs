//! Small interpolation helpers shared by the controllers.

use glam::{Mat3, Quat, Vec3};

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Hermite smoothstep of `t` clamped to `[0, 1]`.
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Critically damped spring toward `target`. `velocity` carries state between calls.
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return current;
    }
    let smooth_time = smooth_time.max(1e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    // No overshoot
    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = 0.0;
    }
    output
}

/// Rotation whose local -Z looks along `forward` and local +Y leans toward `up`.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let up = up.normalize_or(Vec3::Y);
    let mut forward = (forward - up * forward.dot(up)).normalize_or_zero();
    if forward == Vec3::ZERO {
        forward = up.any_orthonormal_vector();
    }
    let right = forward.cross(up).normalize();
    let corrected_up = right.cross(forward).normalize();
    Quat::from_mat3(&Mat3::from_cols(right, corrected_up, -forward)).normalize()
}

/// Angle in radians from `from` to `to`, signed by the rotation sense about `axis`.
pub fn signed_angle(from: Vec3, to: Vec3, axis: Vec3) -> f32 {
    let angle = from.angle_between(to);
    if from.cross(to).dot(axis) < 0.0 {
        -angle
    } else {
        angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothstep_endpoints_and_midpoint() {
        assert_eq!(smoothstep(-1.0), 0.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert_eq!(smoothstep(2.0), 1.0);
    }

    #[test]
    fn smooth_damp_converges_without_overshoot() {
        let mut value = 0.0;
        let mut velocity = 0.0;
        for _ in 0..200 {
            value = smooth_damp(value, 1.0, &mut velocity, 0.15, 0.02);
            assert!(value <= 1.0);
        }
        assert!((value - 1.0).abs() < 1e-3);
    }

    #[test]
    fn smooth_damp_ignores_zero_dt() {
        let mut velocity = 3.0;
        assert_eq!(smooth_damp(0.25, 1.0, &mut velocity, 0.1, 0.0), 0.25);
    }

    #[test]
    fn look_rotation_matches_identity_for_default_axes() {
        let q = look_rotation(Vec3::NEG_Z, Vec3::Y);
        assert!(q.angle_between(Quat::IDENTITY) < 1e-5);
    }

    #[test]
    fn look_rotation_aligns_up_with_request() {
        let up = Vec3::new(1.0, 1.0, 0.0).normalize();
        let q = look_rotation(Vec3::NEG_Z, up);
        assert!((q * Vec3::Y).distance(up) < 1e-5);
        assert!((q * Vec3::NEG_Z).distance(Vec3::NEG_Z) < 1e-5);
    }

    #[test]
    fn signed_angle_follows_axis() {
        let a = signed_angle(Vec3::NEG_Y, Vec3::NEG_Z, Vec3::X);
        assert!((a - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        let b = signed_angle(Vec3::NEG_Y, Vec3::Z, Vec3::X);
        assert!((b + std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }
}
