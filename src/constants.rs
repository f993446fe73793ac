//! Flight tuning constants shared across the controller.
//!
//! These are the defaults behind [`crate::config::LocomotionConfig`]; the
//! dive curve and boost window bounds are fixed and not configurable.

/// Downward gravitational acceleration in metres per second squared.
pub const GRAVITY_ACCEL: f32 = 9.81;

/// Pitch-to-down angle (degrees) below which the glide dive curve engages.
pub const DIVE_ANGLE_DEG: f32 = 60.0;
/// Pitch-to-down angle (degrees) at which dive intensity saturates.
pub const DIVE_FULL_ANGLE_DEG: f32 = 10.0;
/// Dive intensity at [`DIVE_ANGLE_DEG`].
pub const DIVE_INTENSITY_MIN: f32 = 0.8;
/// Dive intensity at or below [`DIVE_FULL_ANGLE_DEG`].
pub const DIVE_INTENSITY_MAX: f32 = 1.0;
/// Upper bound on dive acceleration in metres per second squared.
pub const DIVE_MAX_ACCEL: f32 = 30.0;

/// Shortest post-dive boost window in seconds.
pub const DIVE_BOOST_MIN_SECS: f32 = 1.5;
/// Longest post-dive boost window in seconds.
pub const DIVE_BOOST_MAX_SECS: f32 = 7.5;

/// Tick rate the bounce drag factor is expressed against.
pub const REFERENCE_TICK_HZ: f32 = 60.0;

/// Lengths below this are treated as degenerate directions.
pub const DIRECTION_EPSILON: f32 = 1e-6;

/// Pitch-to-down angle reported when no steering direction is available.
pub const LEVEL_DIVE_ANGLE_DEG: f32 = 90.0;
