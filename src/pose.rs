//! Per-tick pose input.
//!
//! A [`PoseSample`] is produced by the caller each tick from already-resolved
//! head and hand transforms. The controller only reads it and never keeps it
//! past the tick.

use glam::{Quat, Vec3};
use log::warn;

use crate::vector_math::{exp_smoothing_factor, safe_normalize, sanitize_scalar, sanitize_vec};

/// Head transform for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadPose {
    /// World-space head position.
    pub position: Vec3,
    /// Unit facing direction.
    pub forward: Vec3,
    /// Unit up direction.
    pub up: Vec3,
}

impl Default for HeadPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
        }
    }
}

/// One tracked hand.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HandPose {
    /// World-space hand position.
    pub position: Vec3,
    /// Hand orientation; `orientation * -Z` points along the fingers.
    pub orientation: Quat,
    /// Smoothed vertical hand velocity, positive upwards.
    pub vertical_velocity: f32,
    /// Whether the grip is held.
    pub grip: bool,
}

impl HandPose {
    /// Direction the hand points in, or zero when the orientation is invalid.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        if !self.orientation.is_finite() {
            return Vec3::ZERO;
        }
        safe_normalize(self.orientation * Vec3::NEG_Z)
    }
}

/// Everything the controller reads from the tracking stack in one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoseSample {
    /// Head transform.
    pub head: HeadPose,
    /// Left hand.
    pub left: HandPose,
    /// Right hand.
    pub right: HandPose,
    /// Seconds since the previous tick.
    pub dt: f32,
    /// Explicit flap request, e.g. from a controller button.
    pub flap_trigger: bool,
}

impl PoseSample {
    /// Returns a copy with non-finite values replaced by neutral ones.
    ///
    /// Degenerate head directions are zeroed so callers fall back to their
    /// last known facing; a negative or non-finite `dt` becomes zero.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let dt = sanitize_scalar(self.dt);
        if dt != self.dt || dt < 0.0 {
            warn!("discarding invalid tick duration {}", self.dt);
        }
        let hand = |h: &HandPose| HandPose {
            position: sanitize_vec(h.position),
            orientation: if h.orientation.is_finite() {
                h.orientation
            } else {
                Quat::IDENTITY
            },
            vertical_velocity: sanitize_scalar(h.vertical_velocity),
            grip: h.grip,
        };
        Self {
            head: HeadPose {
                position: sanitize_vec(self.head.position),
                forward: safe_normalize(self.head.forward),
                up: safe_normalize(self.head.up),
            },
            left: hand(&self.left),
            right: hand(&self.right),
            dt: dt.max(0.0),
            flap_trigger: self.flap_trigger,
        }
    }

    /// Horizontal distance between the hands in metres.
    #[must_use]
    pub fn hand_separation(&self) -> f32 {
        let delta = self.right.position - self.left.position;
        sanitize_scalar(Vec3::new(delta.x, 0.0, delta.z).length())
    }

    /// Mean pointing direction of both hands, zero when they cancel out.
    #[must_use]
    pub fn hands_forward(&self) -> Vec3 {
        safe_normalize(self.left.forward() + self.right.forward())
    }

    /// Both grips held.
    #[must_use]
    pub const fn both_grips(&self) -> bool {
        self.left.grip && self.right.grip
    }
}

/// Exponentially smoothed arm spread.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HandSpreadFilter {
    value: Option<f32>,
}

impl HandSpreadFilter {
    /// Feeds a raw spread sample and returns the smoothed value.
    ///
    /// The first sample seeds the filter directly.
    pub fn update(&mut self, raw: f32, dt: f32, tau: f32) -> f32 {
        let raw = sanitize_scalar(raw).max(0.0);
        let next = match self.value {
            Some(prev) => prev + (raw - prev) * exp_smoothing_factor(dt, tau),
            None => raw,
        };
        self.value = Some(next);
        next
    }

    /// Current smoothed value, zero before the first sample.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.value.unwrap_or(0.0)
    }
}
