//! Shared builders for controller tests.
//!
//! Poses are built facing `-Z` with both hands at chest height; helpers only
//! vary the parts a scenario cares about.

use glam::{Quat, Vec3};
use soar::{EventKind, LocomotionConfig, LocomotionEvent, PoseSample};

/// Default tick length used by the builders (50 Hz).
pub const TICK: f32 = 0.02;

/// Default config with spread smoothing disabled, so a scripted spread
/// takes effect on the tick it is supplied.
#[must_use]
pub fn test_config() -> LocomotionConfig {
    let mut cfg = LocomotionConfig::default();
    cfg.glide.spread_smoothing = 0.0;
    cfg
}

/// Pose with the hands `spread_m` metres apart along X.
#[must_use]
pub fn spread_pose(spread_m: f32) -> PoseSample {
    let mut pose = PoseSample {
        dt: TICK,
        ..PoseSample::default()
    };
    pose.head.position = Vec3::new(0.0, 1.7, 0.0);
    pose.left.position = Vec3::new(-spread_m / 2.0, 1.4, 0.0);
    pose.right.position = Vec3::new(spread_m / 2.0, 1.4, 0.0);
    pose
}

/// Pose whose raw spread equals `spread` controller units at the default
/// scale of 100 units per metre.
#[must_use]
pub fn spread_units_pose(spread: f32) -> PoseSample {
    spread_pose(spread / 100.0)
}

/// Pose with arms spread and head and hands pitched to `angle_from_down_deg`
/// degrees from straight down (90 is level, 0 is vertical).
#[must_use]
pub fn pitched_pose(spread_m: f32, angle_from_down_deg: f32) -> PoseSample {
    let mut pose = spread_pose(spread_m);
    let forward = pitched_forward(angle_from_down_deg);
    pose.head.forward = forward;
    let orientation = Quat::from_rotation_arc(Vec3::NEG_Z, forward);
    pose.left.orientation = orientation;
    pose.right.orientation = orientation;
    pose
}

/// Unit vector in the Y/-Z plane at `angle_from_down_deg` from `-Y`.
#[must_use]
pub fn pitched_forward(angle_from_down_deg: f32) -> Vec3 {
    let a = angle_from_down_deg.to_radians();
    Vec3::new(0.0, -a.cos(), -a.sin())
}

/// Sets both hands' vertical velocity.
#[must_use]
pub fn with_hand_speed(mut pose: PoseSample, vertical_velocity: f32) -> PoseSample {
    pose.left.vertical_velocity = vertical_velocity;
    pose.right.vertical_velocity = vertical_velocity;
    pose
}

/// Closes or opens both grips.
#[must_use]
pub fn with_grips(mut pose: PoseSample, grip: bool) -> PoseSample {
    pose.left.grip = grip;
    pose.right.grip = grip;
    pose
}

/// Number of events of `kind`.
#[must_use]
pub fn count(events: &[LocomotionEvent], kind: EventKind) -> usize {
    events.iter().filter(|e| e.kind() == kind).count()
}

/// Kinds of `events` in emission order.
#[must_use]
pub fn kinds(events: &[LocomotionEvent]) -> Vec<EventKind> {
    events.iter().map(LocomotionEvent::kind).collect()
}
