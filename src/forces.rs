//! Force model helpers.
//!
//! Pure functions computing velocity contributions from flaps and glides.
//! They keep no state and never fail: degenerate directions and non-finite
//! inputs simply contribute nothing.

use glam::Vec3;

use crate::config::DiveConfig;
use crate::constants::{
    DIVE_ANGLE_DEG, DIVE_BOOST_MAX_SECS, DIVE_BOOST_MIN_SECS, DIVE_FULL_ANGLE_DEG,
    DIVE_INTENSITY_MAX, DIVE_INTENSITY_MIN, DIVE_MAX_ACCEL, LEVEL_DIVE_ANGLE_DEG,
};
use crate::vector_math::{angle_between_deg, safe_normalize, sanitize_scalar, sanitize_vec};

/// Velocity change of a single flap.
///
/// The upward part scales with `strength * magnitude`, the forward part runs
/// along `head_forward` and scales with `forward_thrust * magnitude`.
/// `magnitude` is clamped to `[0, 1]`.
///
/// # Examples
///
/// ```
/// use glam::Vec3;
/// use soar::flap_impulse;
/// let dv = flap_impulse(Vec3::NEG_Z, 0.5, 6.0, 2.0);
/// assert!((dv.y - 3.0).abs() < 1e-6);
/// assert!((dv.z + 1.0).abs() < 1e-6);
///
/// // A missing facing direction still flaps straight up.
/// assert_eq!(flap_impulse(Vec3::ZERO, 1.0, 6.0, 2.0), Vec3::new(0.0, 6.0, 0.0));
/// ```
#[must_use]
pub fn flap_impulse(head_forward: Vec3, magnitude: f32, strength: f32, forward_thrust: f32) -> Vec3 {
    let magnitude = sanitize_scalar(magnitude).clamp(0.0, 1.0);
    let up = Vec3::Y * sanitize_scalar(strength) * magnitude;
    let forward = safe_normalize(head_forward) * sanitize_scalar(forward_thrust) * magnitude;
    up + forward
}

/// Flap multiplier that weakens flaps as speed approaches `max_speed`.
///
/// Returns `1.0` at rest, falling linearly to `min_multiplier` at `max_speed`
/// and staying there above it.
#[must_use]
pub fn flap_speed_multiplier(speed: f32, max_speed: f32, min_multiplier: f32) -> f32 {
    if max_speed <= 0.0 {
        return 1.0;
    }
    let t = (sanitize_scalar(speed) / max_speed).clamp(0.0, 1.0);
    1.0 + (min_multiplier - 1.0) * t
}

/// Tunables of the glide force beyond the per-call arguments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlideTuning {
    /// Lift per unit of forward speed (1/s).
    pub lift_coefficient: f32,
    /// Base dive acceleration; zero disables the dive term.
    pub dive_accel: f32,
    /// Downward speed floor when stalled.
    pub stall_sink_speed: f32,
    /// Downward speed floor at `max_speed`.
    pub fast_sink_speed: f32,
}

impl Default for GlideTuning {
    fn default() -> Self {
        Self {
            lift_coefficient: 0.8,
            dive_accel: 18.0,
            stall_sink_speed: 3.0,
            fast_sink_speed: 30.0,
        }
    }
}

/// Result of one glide step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlideStep {
    /// Updated velocity.
    pub velocity: Vec3,
    /// Angle between the steering direction and straight down, in degrees.
    pub dive_angle_deg: f32,
}

/// Dive intensity for a pitch-to-down angle, or `None` outside the dive cone.
///
/// Ramps linearly from [`DIVE_INTENSITY_MIN`] at [`DIVE_ANGLE_DEG`] to
/// [`DIVE_INTENSITY_MAX`] at [`DIVE_FULL_ANGLE_DEG`] and below.
#[must_use]
pub fn dive_intensity(dive_angle_deg: f32) -> Option<f32> {
    if dive_angle_deg.is_nan() || dive_angle_deg >= DIVE_ANGLE_DEG {
        return None;
    }
    let t = ((DIVE_ANGLE_DEG - dive_angle_deg) / (DIVE_ANGLE_DEG - DIVE_FULL_ANGLE_DEG))
        .clamp(0.0, 1.0);
    Some(DIVE_INTENSITY_MIN + (DIVE_INTENSITY_MAX - DIVE_INTENSITY_MIN) * t)
}

/// Applies one glide step with default [`GlideTuning`].
#[must_use]
pub fn glide_velocity(
    current: Vec3,
    steering: Vec3,
    glide_strength: f32,
    max_speed: f32,
    dt: f32,
) -> GlideStep {
    glide_velocity_with(
        &GlideTuning::default(),
        current,
        steering,
        glide_strength,
        max_speed,
        dt,
    )
}

/// Applies one glide step.
///
/// Adds, in order:
/// 1. thrust along `steering` of `glide_strength * dt`;
/// 2. lift proportional to the forward speed along `steering`, clamped to
///    `[0, max_speed]`;
/// 3. inside the dive cone, a dive acceleration along `steering` shaped by
///    [`dive_intensity`] and capped at [`DIVE_MAX_ACCEL`];
/// 4. a floor on downward speed that relaxes as forward speed nears
///    `max_speed`.
///
/// A degenerate `steering` returns `current` unchanged (after filtering) and
/// reports a level dive angle.
#[must_use]
pub fn glide_velocity_with(
    tuning: &GlideTuning,
    current: Vec3,
    steering: Vec3,
    glide_strength: f32,
    max_speed: f32,
    dt: f32,
) -> GlideStep {
    let mut velocity = sanitize_vec(current);
    let steering = safe_normalize(steering);
    let dt = sanitize_scalar(dt).max(0.0);
    let max_speed = sanitize_scalar(max_speed).max(0.0);
    let Some(dive_angle_deg) = angle_between_deg(steering, Vec3::NEG_Y) else {
        return GlideStep {
            velocity,
            dive_angle_deg: LEVEL_DIVE_ANGLE_DEG,
        };
    };

    velocity += steering * sanitize_scalar(glide_strength) * dt;

    let forward_speed = velocity.dot(steering).clamp(0.0, max_speed);
    velocity.y += forward_speed * tuning.lift_coefficient * dt;

    if let Some(intensity) = dive_intensity(dive_angle_deg) {
        let accel = (tuning.dive_accel * intensity).min(DIVE_MAX_ACCEL);
        velocity += steering * accel * dt;
    }

    let speed_ratio = if max_speed > 0.0 {
        forward_speed / max_speed
    } else {
        0.0
    };
    let sink_floor = tuning.stall_sink_speed
        + (tuning.fast_sink_speed - tuning.stall_sink_speed) * speed_ratio;
    velocity.y = velocity.y.max(-sink_floor);

    GlideStep {
        velocity,
        dive_angle_deg,
    }
}

/// Length of the boost window earned by a dive.
///
/// Longer and faster dives earn longer windows; the result is clamped to
/// `[DIVE_BOOST_MIN_SECS, DIVE_BOOST_MAX_SECS]`.
///
/// # Examples
/// ```
/// use soar::config::DiveConfig;
/// use soar::post_dive_boost_duration;
/// let cfg = DiveConfig::default();
/// let long = post_dive_boost_duration(2.0, 20.0, &cfg);
/// let short = post_dive_boost_duration(1.0, 10.0, &cfg);
/// assert!(long > short);
/// assert!((1.5..=7.5).contains(&long));
/// ```
#[must_use]
pub fn post_dive_boost_duration(dive_secs: f32, peak_speed: f32, cfg: &DiveConfig) -> f32 {
    let earned = sanitize_scalar(dive_secs).max(0.0) * cfg.boost_per_dive_second
        + sanitize_scalar(peak_speed).max(0.0) * cfg.boost_per_peak_speed;
    (DIVE_BOOST_MIN_SECS + earned).clamp(DIVE_BOOST_MIN_SECS, DIVE_BOOST_MAX_SECS)
}
