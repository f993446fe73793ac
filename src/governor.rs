//! Soft speed ceiling and the temporary speed-boost overlay.

use glam::Vec3;
use log::debug;

use crate::config::{BoostConfig, GovernorConfig};
use crate::vector_math::{exp_smoothing_factor, rotate_towards, safe_normalize, sanitize_vec};

/// An active boost overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedBoost {
    /// Clock time the boost began.
    pub started_at: f64,
    /// Seconds of full-strength boost.
    pub duration: f32,
    /// Seconds of linear fade after `duration`.
    pub fade: f32,
    /// Current push direction; turns towards facing over time.
    pub direction: Vec3,
}

impl SpeedBoost {
    /// Strength in `[0, 1]` at `now`, or `None` once fully faded.
    #[must_use]
    pub fn strength(&self, now: f64) -> Option<f32> {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "Boost windows are seconds long; f32 precision suffices."
        )]
        let elapsed = (now - self.started_at).max(0.0) as f32;
        if elapsed < self.duration {
            return Some(1.0);
        }
        let into_fade = elapsed - self.duration;
        if into_fade < self.fade {
            Some(1.0 - into_fade / self.fade)
        } else {
            None
        }
    }
}

/// Keeps speed near the ceiling and applies boost impulses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedGovernor {
    cfg: GovernorConfig,
    boost_cfg: BoostConfig,
    boost: Option<SpeedBoost>,
}

impl SpeedGovernor {
    /// Governor with no active boost.
    #[must_use]
    pub const fn new(cfg: GovernorConfig, boost_cfg: BoostConfig) -> Self {
        Self {
            cfg,
            boost_cfg,
            boost: None,
        }
    }

    /// Configured ceiling.
    #[must_use]
    pub const fn max_speed(&self) -> f32 {
        self.cfg.max_speed
    }

    /// The active boost, if any.
    #[must_use]
    pub const fn boost(&self) -> Option<&SpeedBoost> {
        self.boost.as_ref()
    }

    /// Whether a boost (including its fade) is in progress.
    #[must_use]
    pub const fn is_boosting(&self) -> bool {
        self.boost.is_some()
    }

    /// Starts a boost, replacing any running one, and returns its direction.
    ///
    /// A degenerate `direction` falls back to `facing`.
    pub fn activate_boost(&mut self, now: f64, duration: f32, direction: Vec3, facing: Vec3) -> Vec3 {
        let mut direction = safe_normalize(direction);
        if direction == Vec3::ZERO {
            direction = safe_normalize(facing);
        }
        debug!("speed boost for {duration:.2}s towards {direction:?}");
        self.boost = Some(SpeedBoost {
            started_at: now,
            duration: duration.max(0.0),
            fade: self.boost_cfg.fade,
            direction,
        });
        direction
    }

    /// Drops any boost.
    pub fn cancel_boost(&mut self) {
        self.boost = None;
    }

    /// Applies the boost impulse or, without a boost, relaxes excess speed.
    ///
    /// Relaxation is a single-pole filter on the excess over the ceiling, so
    /// speed approaches the ceiling from above without ever crossing it and
    /// direction is preserved.
    #[must_use]
    pub fn govern(&mut self, velocity: Vec3, facing: Vec3, now: f64, dt: f32) -> Vec3 {
        let velocity = sanitize_vec(velocity);
        if let Some(boost) = self.boost.as_mut() {
            match boost.strength(now) {
                Some(strength) => {
                    boost.direction =
                        rotate_towards(boost.direction, facing, self.boost_cfg.realign_rate * dt);
                    return velocity + boost.direction * self.boost_cfg.accel * strength * dt;
                }
                None => {
                    debug!("speed boost faded");
                    self.boost = None;
                }
            }
        }
        relax_to_ceiling(velocity, self.cfg.max_speed, self.cfg.relax_time, dt)
    }
}

/// Relaxes `velocity` towards `ceiling` if it exceeds it.
///
/// # Examples
/// ```
/// use glam::Vec3;
/// use soar::governor::relax_to_ceiling;
/// let v = relax_to_ceiling(Vec3::new(30.0, 0.0, 0.0), 20.0, 0.5, 0.1);
/// assert!(v.x > 20.0 && v.x < 30.0);
/// assert_eq!(relax_to_ceiling(Vec3::X, 20.0, 0.5, 0.1), Vec3::X);
/// ```
#[must_use]
pub fn relax_to_ceiling(velocity: Vec3, ceiling: f32, tau: f32, dt: f32) -> Vec3 {
    let speed = velocity.length();
    if speed <= ceiling || speed <= 0.0 {
        return velocity;
    }
    let excess = speed - ceiling;
    let relaxed = ceiling + excess * (1.0 - exp_smoothing_factor(dt, tau));
    velocity * (relaxed / speed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn governor() -> SpeedGovernor {
        SpeedGovernor::new(GovernorConfig::default(), BoostConfig::default())
    }

    #[rstest]
    fn below_ceiling_is_untouched() {
        let mut g = governor();
        let v = Vec3::new(3.0, 4.0, 0.0);
        assert_eq!(g.govern(v, Vec3::X, 0.0, 0.1), v);
    }

    #[rstest]
    fn relaxation_preserves_direction() {
        let v = Vec3::new(0.0, 30.0, 40.0);
        let relaxed = relax_to_ceiling(v, 25.0, 0.5, 0.1);
        assert_relative_eq!(relaxed.normalize().dot(v.normalize()), 1.0, epsilon = 1e-5);
    }

    #[rstest]
    fn boost_suppresses_ceiling_then_fades() {
        let mut g = governor();
        g.activate_boost(0.0, 1.0, Vec3::X, Vec3::X);
        let fast = Vec3::new(40.0, 0.0, 0.0);
        let boosted = g.govern(fast, Vec3::X, 0.5, 0.1);
        assert!(boosted.x > 40.0);
        let fading = g.boost().and_then(|b| b.strength(1.5)).expect("fading");
        assert_relative_eq!(fading, 0.5, epsilon = 1e-5);
        let after = g.govern(fast, Vec3::X, 2.5, 0.1);
        assert!(!g.is_boosting());
        assert!(after.x < 40.0);
    }

    #[rstest]
    fn boost_turns_towards_facing() {
        let mut g = governor();
        g.activate_boost(0.0, 5.0, Vec3::X, Vec3::X);
        let _ = g.govern(Vec3::ZERO, Vec3::Z, 0.1, 0.5);
        let dir = g.boost().map(|b| b.direction).expect("boost");
        assert!(dir.z > 0.0 && dir.x > dir.z);
    }
}
