#![cfg_attr(docsrs, feature(doc_cfg))]
//! Library crate providing the `soar` flight locomotion controller.
//! Re-exports the controller, its collaborator traits and the force model
//! for the simulation binary, engine integrations and tests.
pub mod capability;
pub mod config;
pub mod constants;
pub mod controller;
pub mod environment;
pub mod events;
pub mod forces;
pub mod governor;
pub mod logging;
pub mod obstacle;
#[cfg(feature = "bevy")]
#[cfg_attr(docsrs, doc(cfg(feature = "bevy")))]
pub mod plugin;
pub mod pose;
pub mod state;
pub mod vector_math;
pub use constants::*;

// Re-export commonly used items
pub use capability::{Ability, Capabilities, CapabilityGate, CapabilityMask};
pub use config::{ConfigError, LocomotionConfig};
pub use controller::{FlightController, LocomotionSnapshot, TickInput};
pub use environment::{EnvironmentField, NoField, UniformField, WindField, WindZone};
pub use events::{EventKind, EventSink, FnSink, LocomotionEvent, NullSink};
pub use forces::{
    flap_impulse, flap_speed_multiplier, glide_velocity, glide_velocity_with,
    post_dive_boost_duration, GlideStep, GlideTuning,
};
pub use governor::{SpeedBoost, SpeedGovernor};
pub use logging::init as init_logging;
pub use obstacle::{
    NoObstacles, ObstacleProbe, ObstacleResponder, ObstacleSet, ObstacleShape, ProbeHit,
};
#[cfg(feature = "bevy")]
#[cfg_attr(docsrs, doc(cfg(feature = "bevy")))]
pub use plugin::{FlightEvent, FlightPlugin, FlightRig};
pub use pose::{HandPose, HeadPose, PoseSample};
pub use state::{DiscreteState, GlideMode, StateFlags};
pub use vector_math::{integrate_position, safe_normalize};

pub mod prelude {
    //! Prelude exports used in documentation examples.
    //!
    //! ```rust
    //! use soar::prelude::*;
    //!
    //! let mut controller = FlightController::new(LocomotionConfig::default(), Vec::new()).unwrap();
    //! let pose = PoseSample { dt: 1.0 / 60.0, ..PoseSample::default() };
    //! let snapshot = controller.tick(&TickInput::new(&pose, Vec3::ZERO));
    //! assert!(snapshot.velocity.y < 0.0);
    //! ```

    pub use crate::capability::{Ability, Capabilities, CapabilityMask};
    pub use crate::config::LocomotionConfig;
    pub use crate::controller::{FlightController, TickInput};
    pub use crate::events::{EventSink, LocomotionEvent};
    pub use crate::pose::PoseSample;
    pub use glam::Vec3;
}
