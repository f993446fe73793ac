//! Controller tuning and startup validation.
//!
//! Every sub-config derives serde with `#[serde(default)]`, so a JSON
//! document only needs the fields it overrides:
//!
//! ```
//! use soar::config::LocomotionConfig;
//! let cfg = LocomotionConfig::from_json_str(r#"{ "glide": { "enter_spread": 45.0 } }"#).unwrap();
//! assert_eq!(cfg.glide.enter_spread, 45.0);
//! assert_eq!(cfg.glide.stay_spread, LocomotionConfig::default().glide.stay_spread);
//! ```

use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DIVE_ANGLE_DEG, GRAVITY_ACCEL};

/// Reasons a [`LocomotionConfig`] is rejected at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The hysteresis band is empty or inverted.
    #[error("glide stay spread {stay} must be below enter spread {enter}")]
    ThresholdOrder {
        /// Lower (stay) threshold.
        stay: f32,
        /// Upper (enter) threshold.
        enter: f32,
    },
    /// A value lies outside the range it is allowed to take.
    #[error("{field} = {value} is out of range ({expected})")]
    OutOfRange {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Rejected value.
        value: f32,
        /// Human readable description of the permitted range.
        expected: &'static str,
    },
    /// A value is NaN or infinite.
    #[error("{field} must be finite")]
    NonFinite {
        /// Dotted path of the offending field.
        field: &'static str,
    },
    /// The configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration document is malformed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Arm-spread hysteresis, glide force and steering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlideConfig {
    /// Smoothed spread above which gliding starts.
    pub enter_spread: f32,
    /// Smoothed spread below which gliding may stop.
    pub stay_spread: f32,
    /// Multiplier from metres of hand separation to spread units.
    pub spread_scale: f32,
    /// Time constant of the spread filter in seconds; zero disables smoothing.
    pub spread_smoothing: f32,
    /// Forward thrust along the steering direction (m/s²).
    pub glide_strength: f32,
    /// Lift per unit of forward speed (1/s).
    pub lift_coefficient: f32,
    /// Base dive acceleration before the intensity curve (m/s²).
    pub dive_accel: f32,
    /// Largest downward speed tolerated when nearly stalled (m/s).
    pub stall_sink_speed: f32,
    /// Largest downward speed tolerated at `max_speed` (m/s).
    pub fast_sink_speed: f32,
    /// Share of the hands' forward direction mixed into steering, in `[0, 1]`.
    pub hand_steering_weight: f32,
    /// Duration of the in-stroke latch in seconds.
    pub stroke_hold: f32,
    /// Vertical hand speed (both hands, same sign) that arms the stroke latch.
    pub stroke_speed: f32,
}

impl Default for GlideConfig {
    fn default() -> Self {
        Self {
            enter_spread: 40.0,
            stay_spread: 20.0,
            spread_scale: 100.0,
            spread_smoothing: 0.08,
            glide_strength: 4.0,
            lift_coefficient: 0.8,
            dive_accel: 18.0,
            stall_sink_speed: 3.0,
            fast_sink_speed: 30.0,
            hand_steering_weight: 0.25,
            stroke_hold: 0.35,
            stroke_speed: 1.2,
        }
    }
}

/// Flap gesture detection and impulse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlapConfig {
    /// Upward impulse of a full-magnitude flap (m/s).
    pub strength: f32,
    /// Forward impulse of a full-magnitude flap (m/s).
    pub forward_thrust: f32,
    /// Downward hand speed both hands must exceed to fire.
    pub trigger_speed: f32,
    /// Downward hand speed that counts as a full-magnitude flap.
    pub full_flap_speed: f32,
    /// Minimum seconds between two flaps.
    pub refire_interval: f32,
    /// Seconds a flap holds gliding on regardless of spread.
    pub glide_hold: f32,
    /// Flap multiplier reached at `max_speed`.
    pub min_speed_multiplier: f32,
}

impl Default for FlapConfig {
    fn default() -> Self {
        Self {
            strength: 6.0,
            forward_thrust: 3.0,
            trigger_speed: 1.5,
            full_flap_speed: 4.0,
            refire_interval: 0.25,
            glide_hold: 1.0,
            min_speed_multiplier: 0.4,
        }
    }
}

/// Dive sub-state entry and post-dive boost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiveConfig {
    /// Pitch-to-down angle under which a dive starts.
    pub enter_angle_deg: f32,
    /// Pitch-to-down angle over which a dive ends.
    pub exit_angle_deg: f32,
    /// Speed a glide must exceed to start or keep diving.
    pub min_speed: f32,
    /// Boost seconds gained per second spent diving.
    pub boost_per_dive_second: f32,
    /// Boost seconds gained per m/s of peak dive speed.
    pub boost_per_peak_speed: f32,
}

impl Default for DiveConfig {
    fn default() -> Self {
        Self {
            enter_angle_deg: DIVE_ANGLE_DEG,
            exit_angle_deg: 65.0,
            min_speed: 5.0,
            boost_per_dive_second: 0.75,
            boost_per_peak_speed: 0.1,
        }
    }
}

/// Hover sub-state speed cap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverConfig {
    /// Speed hovering converges to from above (m/s).
    pub max_speed: f32,
    /// Time constant of the convergence in seconds.
    pub smoothing: f32,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            max_speed: 2.0,
            smoothing: 0.25,
        }
    }
}

/// Gravity applied when the capability gate enables it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GravityConfig {
    /// Downward acceleration (m/s²).
    pub accel: f32,
}

impl Default for GravityConfig {
    fn default() -> Self {
        Self {
            accel: GRAVITY_ACCEL,
        }
    }
}

/// Obstacle probe and bounce response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BounceConfig {
    /// Radius of the swept probe sphere.
    pub probe_radius: f32,
    /// Probe length per m/s of speed (seconds of look-ahead).
    pub lookahead: f32,
    /// Shortest probe length.
    pub min_probe_distance: f32,
    /// Minimum dot of travel direction and inward surface normal.
    pub min_alignment: f32,
    /// Bounce blend at rest.
    pub base_blend: f32,
    /// Blend added per m/s of impact speed.
    pub blend_per_speed: f32,
    /// Largest blend.
    pub max_blend: f32,
    /// Lock duration in seconds.
    pub duration: f32,
    /// Velocity retained per reference tick while locked, in `(0, 1]`.
    pub drag: f32,
    /// Obstacle layers the probe tests against.
    pub layer_mask: u32,
}

impl Default for BounceConfig {
    fn default() -> Self {
        Self {
            probe_radius: 0.3,
            lookahead: 0.1,
            min_probe_distance: 0.5,
            min_alignment: 0.2,
            base_blend: 1.2,
            blend_per_speed: 0.02,
            max_blend: 1.8,
            duration: 0.4,
            drag: 0.97,
            layer_mask: u32::MAX,
        }
    }
}

/// Soft speed ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernorConfig {
    /// Speed the governor relaxes towards (m/s).
    pub max_speed: f32,
    /// Time constant of the relaxation in seconds.
    pub relax_time: f32,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            max_speed: 25.0,
            relax_time: 0.5,
        }
    }
}

/// Speed-boost overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostConfig {
    /// Acceleration along the boost direction while active (m/s²).
    pub accel: f32,
    /// Radians per second the boost direction turns towards facing.
    pub realign_rate: f32,
    /// Seconds over which the boost fades out after its active window.
    pub fade: f32,
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            accel: 6.0,
            realign_rate: 0.8,
            fade: 1.0,
        }
    }
}

/// Full controller tuning.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Glide hysteresis and forces.
    pub glide: GlideConfig,
    /// Flap detection.
    pub flap: FlapConfig,
    /// Dive sub-state.
    pub dive: DiveConfig,
    /// Hover sub-state.
    pub hover: HoverConfig,
    /// Gravity.
    pub gravity: GravityConfig,
    /// Obstacle response.
    pub bounce: BounceConfig,
    /// Speed ceiling.
    pub governor: GovernorConfig,
    /// Speed boost overlay.
    pub boost: BoostConfig,
}

fn finite(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { field })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if finite(field, value)? < 0.0 {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            expected: ">= 0",
        });
    }
    Ok(())
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if finite(field, value)? <= 0.0 {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            expected: "> 0",
        });
    }
    Ok(())
}

fn unit_interval(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&finite(field, value)?) {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            expected: "0..=1",
        });
    }
    Ok(())
}

impl LocomotionConfig {
    /// Parses a JSON document, filling omitted fields with defaults, and validates it.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed JSON and any validation error.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads and validates a JSON configuration file.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise as
    /// [`LocomotionConfig::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks every invariant the controller relies on.
    ///
    /// # Errors
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_inner().inspect_err(|e| warn!("rejecting locomotion config: {e}"))
    }

    fn validate_inner(&self) -> Result<(), ConfigError> {
        let g = &self.glide;
        let enter = finite("glide.enter_spread", g.enter_spread)?;
        let stay = finite("glide.stay_spread", g.stay_spread)?;
        if stay >= enter {
            return Err(ConfigError::ThresholdOrder { stay, enter });
        }
        positive("glide.spread_scale", g.spread_scale)?;
        non_negative("glide.spread_smoothing", g.spread_smoothing)?;
        non_negative("glide.glide_strength", g.glide_strength)?;
        non_negative("glide.lift_coefficient", g.lift_coefficient)?;
        non_negative("glide.dive_accel", g.dive_accel)?;
        non_negative("glide.stall_sink_speed", g.stall_sink_speed)?;
        if finite("glide.fast_sink_speed", g.fast_sink_speed)? < g.stall_sink_speed {
            return Err(ConfigError::OutOfRange {
                field: "glide.fast_sink_speed",
                value: g.fast_sink_speed,
                expected: ">= glide.stall_sink_speed",
            });
        }
        unit_interval("glide.hand_steering_weight", g.hand_steering_weight)?;
        non_negative("glide.stroke_hold", g.stroke_hold)?;
        positive("glide.stroke_speed", g.stroke_speed)?;

        let f = &self.flap;
        non_negative("flap.strength", f.strength)?;
        non_negative("flap.forward_thrust", f.forward_thrust)?;
        positive("flap.trigger_speed", f.trigger_speed)?;
        positive("flap.full_flap_speed", f.full_flap_speed)?;
        non_negative("flap.refire_interval", f.refire_interval)?;
        non_negative("flap.glide_hold", f.glide_hold)?;
        unit_interval("flap.min_speed_multiplier", f.min_speed_multiplier)?;

        let d = &self.dive;
        let dive_enter = finite("dive.enter_angle_deg", d.enter_angle_deg)?;
        if !(0.0..=90.0).contains(&dive_enter) {
            return Err(ConfigError::OutOfRange {
                field: "dive.enter_angle_deg",
                value: dive_enter,
                expected: "0..=90",
            });
        }
        if finite("dive.exit_angle_deg", d.exit_angle_deg)? < dive_enter {
            return Err(ConfigError::OutOfRange {
                field: "dive.exit_angle_deg",
                value: d.exit_angle_deg,
                expected: ">= dive.enter_angle_deg",
            });
        }
        non_negative("dive.min_speed", d.min_speed)?;
        non_negative("dive.boost_per_dive_second", d.boost_per_dive_second)?;
        non_negative("dive.boost_per_peak_speed", d.boost_per_peak_speed)?;

        non_negative("hover.max_speed", self.hover.max_speed)?;
        non_negative("hover.smoothing", self.hover.smoothing)?;
        non_negative("gravity.accel", self.gravity.accel)?;

        let b = &self.bounce;
        non_negative("bounce.probe_radius", b.probe_radius)?;
        non_negative("bounce.lookahead", b.lookahead)?;
        positive("bounce.min_probe_distance", b.min_probe_distance)?;
        unit_interval("bounce.min_alignment", b.min_alignment)?;
        non_negative("bounce.base_blend", b.base_blend)?;
        non_negative("bounce.blend_per_speed", b.blend_per_speed)?;
        if finite("bounce.max_blend", b.max_blend)? < b.base_blend {
            return Err(ConfigError::OutOfRange {
                field: "bounce.max_blend",
                value: b.max_blend,
                expected: ">= bounce.base_blend",
            });
        }
        positive("bounce.duration", b.duration)?;
        positive("bounce.drag", b.drag)?;
        unit_interval("bounce.drag", b.drag)?;

        positive("governor.max_speed", self.governor.max_speed)?;
        positive("governor.relax_time", self.governor.relax_time)?;
        if self.hover.max_speed > self.governor.max_speed {
            return Err(ConfigError::OutOfRange {
                field: "hover.max_speed",
                value: self.hover.max_speed,
                expected: "<= governor.max_speed",
            });
        }

        non_negative("boost.accel", self.boost.accel)?;
        non_negative("boost.realign_rate", self.boost.realign_rate)?;
        non_negative("boost.fade", self.boost.fade)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_validate() {
        assert!(LocomotionConfig::default().validate().is_ok());
    }

    #[rstest]
    #[case::equal(20.0, 20.0)]
    #[case::inverted(40.0, 20.0)]
    fn rejects_empty_hysteresis_band(#[case] stay: f32, #[case] enter: f32) {
        let mut cfg = LocomotionConfig::default();
        cfg.glide.stay_spread = stay;
        cfg.glide.enter_spread = enter;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ThresholdOrder { .. })
        ));
    }

    #[rstest]
    fn rejects_nan() {
        let mut cfg = LocomotionConfig::default();
        cfg.flap.strength = f32::NAN;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NonFinite {
                field: "flap.strength"
            })
        ));
    }

    #[rstest]
    fn rejects_dive_exit_below_entry() {
        let mut cfg = LocomotionConfig::default();
        cfg.dive.exit_angle_deg = 30.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::OutOfRange { .. })));
    }
}
