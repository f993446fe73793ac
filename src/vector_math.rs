//! Basic vector math helper functions.
//! Small helpers that filter non-finite sensor data and keep direction
//! arithmetic total, returning zero instead of NaN for degenerate input.
use glam::{Quat, Vec3};

use crate::constants::DIRECTION_EPSILON;

/// Returns `vector` when every component is finite, otherwise zero.
///
/// # Examples
/// ```
/// use glam::Vec3;
/// use soar::vector_math::sanitize_vec;
/// assert_eq!(sanitize_vec(Vec3::new(f32::NAN, 1.0, 0.0)), Vec3::ZERO);
/// assert_eq!(sanitize_vec(Vec3::X), Vec3::X);
/// ```
#[must_use]
pub fn sanitize_vec(vector: Vec3) -> Vec3 {
    if vector.is_finite() {
        vector
    } else {
        Vec3::ZERO
    }
}

/// Returns `value` when finite, otherwise zero.
#[must_use]
pub fn sanitize_scalar(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Returns the unit vector in the direction of `vector`.
///
/// The function checks that all components are finite and the vector is
/// non-zero before normalising. If the input is invalid or shorter than
/// [`DIRECTION_EPSILON`], it returns [`Vec3::ZERO`].
///
/// # Examples
///
/// ```
/// use glam::Vec3;
/// use soar::safe_normalize;
/// let unit = safe_normalize(Vec3::new(3.0, 0.0, 4.0));
/// assert!((unit.x - 0.6).abs() < 1e-6);
/// assert!((unit.z - 0.8).abs() < 1e-6);
///
/// assert_eq!(safe_normalize(Vec3::ZERO), Vec3::ZERO);
/// ```
#[must_use]
pub fn safe_normalize(vector: Vec3) -> Vec3 {
    let vector = sanitize_vec(vector);
    if vector.length_squared() < DIRECTION_EPSILON * DIRECTION_EPSILON {
        return Vec3::ZERO;
    }
    vector.try_normalize().unwrap_or(Vec3::ZERO)
}

/// Angle between two directions in degrees, or `None` if either is degenerate.
#[must_use]
pub fn angle_between_deg(a: Vec3, b: Vec3) -> Option<f32> {
    let a = safe_normalize(a);
    let b = safe_normalize(b);
    if a == Vec3::ZERO || b == Vec3::ZERO {
        return None;
    }
    Some(a.dot(b).clamp(-1.0, 1.0).acos().to_degrees())
}

/// Rotates unit vector `from` towards `to` by at most `max_radians`.
///
/// Degenerate `to` leaves `from` untouched; degenerate `from` snaps to `to`.
#[must_use]
pub fn rotate_towards(from: Vec3, to: Vec3, max_radians: f32) -> Vec3 {
    let from = safe_normalize(from);
    let to = safe_normalize(to);
    if to == Vec3::ZERO {
        return from;
    }
    if from == Vec3::ZERO {
        return to;
    }
    let angle = from.dot(to).clamp(-1.0, 1.0).acos();
    if angle <= max_radians.max(0.0) || angle < DIRECTION_EPSILON {
        return to;
    }
    let axis = safe_normalize(from.cross(to));
    // antiparallel: any perpendicular axis is a valid great circle
    let axis = if axis == Vec3::ZERO {
        from.any_orthonormal_vector()
    } else {
        axis
    };
    safe_normalize(Quat::from_axis_angle(axis, max_radians.max(0.0)) * from)
}

/// Blend factor of a single-pole filter with time constant `tau` over `dt`.
///
/// A non-positive `tau` means no smoothing and yields `1.0`.
///
/// # Examples
/// ```
/// use soar::vector_math::exp_smoothing_factor;
/// assert_eq!(exp_smoothing_factor(0.1, 0.0), 1.0);
/// let a = exp_smoothing_factor(0.1, 0.5);
/// assert!(a > 0.0 && a < 1.0);
/// ```
#[must_use]
pub fn exp_smoothing_factor(dt: f32, tau: f32) -> f32 {
    if tau <= 0.0 {
        return 1.0;
    }
    1.0 - (-dt.max(0.0) / tau).exp()
}

/// Euler-integrates `position` by `velocity` over `dt`, ignoring non-finite input.
#[must_use]
pub fn integrate_position(position: Vec3, velocity: Vec3, dt: f32) -> Vec3 {
    position + sanitize_vec(velocity) * sanitize_scalar(dt).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case::straight_down(Vec3::NEG_Y, Vec3::NEG_Y, Some(0.0))]
    #[case::level(Vec3::X, Vec3::NEG_Y, Some(90.0))]
    #[case::degenerate(Vec3::ZERO, Vec3::NEG_Y, None)]
    fn angle_cases(#[case] a: Vec3, #[case] b: Vec3, #[case] expected: Option<f32>) {
        match (angle_between_deg(a, b), expected) {
            (Some(angle), Some(e)) => assert_relative_eq!(angle, e, epsilon = 1e-3),
            (None, None) => {}
            (got, want) => panic!("mismatch: {got:?} vs {want:?}"),
        }
    }

    #[rstest]
    fn rotate_towards_is_bounded() {
        let turned = rotate_towards(Vec3::X, Vec3::Z, 0.1);
        let angle = turned.angle_between(Vec3::X);
        assert!(angle <= 0.1 + 1e-3, "rotated {angle} rad");
        assert_relative_eq!(turned.length(), 1.0, epsilon = 1e-5);
    }

    #[rstest]
    fn rotate_towards_snaps_when_close() {
        assert_eq!(rotate_towards(Vec3::X, Vec3::X, 0.1), Vec3::X);
        assert_eq!(rotate_towards(Vec3::ZERO, Vec3::Y, 0.1), Vec3::Y);
    }

    #[rstest]
    fn integrate_skips_nan_velocity() {
        let p = integrate_position(Vec3::ONE, Vec3::splat(f32::NAN), 0.5);
        assert_eq!(p, Vec3::ONE);
    }
}
