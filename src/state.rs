//! Discrete locomotion state and its timers.
//!
//! [`DiscreteState`] is a tagged variant: hovering and diving only exist
//! inside a glide, and a bounce lock carries the glide it interrupted, so
//! illegal flag combinations cannot be expressed.

use glam::Vec3;
use serde::Serialize;

/// An active dive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiveState {
    /// Controller clock when the dive began.
    pub started_at: f64,
    /// Speed on entry.
    pub entry_speed: f32,
    /// Highest speed seen so far.
    pub peak_speed: f32,
}

/// What a glide is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GlideMode {
    /// Plain gliding.
    #[default]
    Cruising,
    /// Steep, fast descent.
    Diving(DiveState),
    /// Grip-held station keeping.
    Hovering,
}

/// An active glide.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlideState {
    /// Seconds since the glide started or the last flap.
    pub elapsed: f32,
    /// Sub-state.
    pub mode: GlideMode,
}

impl GlideState {
    /// Whether the glide is diving.
    #[must_use]
    pub const fn is_diving(&self) -> bool {
        matches!(self.mode, GlideMode::Diving(_))
    }

    /// Whether the glide is hovering.
    #[must_use]
    pub const fn is_hovering(&self) -> bool {
        matches!(self.mode, GlideMode::Hovering)
    }
}

/// Time-boxed override after an obstacle impact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BounceLock {
    /// Seconds until the lock releases.
    pub remaining: f32,
    /// Glide interrupted by the impact, resumed on release.
    pub suspended: Option<GlideState>,
}

/// Top-level locomotion state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DiscreteState {
    /// Not gliding.
    #[default]
    Idle,
    /// Gliding, possibly diving or hovering.
    Gliding(GlideState),
    /// Recovering from an impact.
    Bouncing(BounceLock),
}

impl DiscreteState {
    /// The active glide, if the state is [`DiscreteState::Gliding`].
    #[must_use]
    pub const fn glide(&self) -> Option<&GlideState> {
        match self {
            Self::Gliding(glide) => Some(glide),
            _ => None,
        }
    }

    /// Flattened flags for readers that do not care about payloads.
    #[must_use]
    pub const fn flags(&self) -> StateFlags {
        match self {
            Self::Idle => StateFlags::IDLE,
            Self::Gliding(glide) => StateFlags {
                gliding: true,
                diving: glide.is_diving(),
                hovering: glide.is_hovering(),
                bouncing: false,
            },
            Self::Bouncing(lock) => StateFlags {
                gliding: lock.suspended.is_some(),
                diving: false,
                hovering: false,
                bouncing: true,
            },
        }
    }
}

/// Boolean view of [`DiscreteState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StateFlags {
    /// Gliding, or a glide is suspended by a bounce.
    pub gliding: bool,
    /// Diving.
    pub diving: bool,
    /// Hovering.
    pub hovering: bool,
    /// Bounce-locked.
    pub bouncing: bool,
}

impl StateFlags {
    /// No flags set.
    pub const IDLE: Self = Self {
        gliding: false,
        diving: false,
        hovering: false,
        bouncing: false,
    };
}

/// Absolute clock time until which something holds, or inactive.
///
/// Extending never moves the deadline earlier.
///
/// # Examples
/// ```
/// use soar::state::Deadline;
/// let mut latch = Deadline::default();
/// latch.extend(1.0, 2.0);
/// latch.extend(1.5, 0.1);
/// assert_eq!(latch.until(), Some(3.0));
/// assert!(latch.is_active(2.9));
/// assert!(!latch.is_active(3.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Deadline(Option<f64>);

impl Deadline {
    /// Holds until at least `now + hold`.
    pub fn extend(&mut self, now: f64, hold: f32) {
        let candidate = now + f64::from(hold.max(0.0));
        self.0 = Some(self.0.map_or(candidate, |until| until.max(candidate)));
    }

    /// Whether the deadline lies in the future.
    #[must_use]
    pub fn is_active(&self, now: f64) -> bool {
        self.0.is_some_and(|until| now < until)
    }

    /// Deadline, if armed.
    #[must_use]
    pub const fn until(&self) -> Option<f64> {
        self.0
    }

    /// Disarms the deadline.
    pub fn clear(&mut self) {
        self.0 = None;
    }
}

/// Latches that outlive a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransitionTimers {
    /// Post-flap glide hold.
    pub glide_latch: Deadline,
    /// Shorter hold re-armed by strong vertical strokes.
    pub stroke_latch: Deadline,
    /// Clock time of the last flap.
    pub last_flap: Option<f64>,
}

impl TransitionTimers {
    /// Whether either latch currently forces gliding on.
    #[must_use]
    pub fn latched(&self, now: f64) -> bool {
        self.glide_latch.is_active(now) || self.stroke_latch.is_active(now)
    }

    /// Disarms both latches.
    pub fn clear_latches(&mut self) {
        self.glide_latch.clear();
        self.stroke_latch.clear();
    }
}

/// Heading and window of a finished dive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiveExit {
    /// Seconds the dive lasted.
    pub duration: f32,
    /// Highest speed reached.
    pub peak_speed: f32,
    /// Travel direction at exit.
    pub heading: Vec3,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn latch_never_shortens() {
        let mut latch = Deadline::default();
        latch.extend(0.0, 1.0);
        latch.extend(0.5, 0.2);
        assert_eq!(latch.until(), Some(1.0));
        latch.extend(0.9, 1.0);
        assert_eq!(latch.until(), Some(1.9));
    }

    #[rstest]
    fn bouncing_flags_report_suspended_glide() {
        let state = DiscreteState::Bouncing(BounceLock {
            remaining: 0.2,
            suspended: Some(GlideState::default()),
        });
        let flags = state.flags();
        assert!(flags.bouncing && flags.gliding && !flags.diving);
    }

    #[rstest]
    fn diving_requires_glide() {
        let dive = DiveState {
            started_at: 0.0,
            entry_speed: 10.0,
            peak_speed: 10.0,
        };
        let state = DiscreteState::Gliding(GlideState {
            elapsed: 0.0,
            mode: GlideMode::Diving(dive),
        });
        assert_eq!(
            state.flags(),
            StateFlags {
                gliding: true,
                diving: true,
                hovering: false,
                bouncing: false
            }
        );
    }
}
