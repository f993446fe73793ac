//! Bevy plugin driving [`FlightController`]s from the ECS schedule.
//!
//! Each entity carrying a [`FlightRig`] and a [`PoseInput`] is ticked once
//! per frame with [`Time`]'s delta. Its `Transform` translation is integrated
//! with the resulting velocity, and every controller notification is
//! re-triggered as a [`FlightEvent`] observer event.

use bevy::ecs::prelude::On;
use bevy::prelude::*;
use log::{debug, info};

use crate::capability::Capabilities;
use crate::config::{ConfigError, LocomotionConfig};
use crate::controller::{FlightController, LocomotionSnapshot, TickInput};
use crate::environment::WindField;
use crate::events::LocomotionEvent;
use crate::obstacle::ObstacleSet;
use crate::pose::PoseSample;
use crate::vector_math::integrate_position;

/// Controller attached to an avatar entity.
#[derive(Component, Debug)]
pub struct FlightRig {
    controller: FlightController<Vec<LocomotionEvent>>,
    last: Option<LocomotionSnapshot>,
}

impl FlightRig {
    /// Rig with a validated configuration.
    ///
    /// # Errors
    /// Returns the configuration error when `cfg` is invalid.
    pub fn new(cfg: LocomotionConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            controller: FlightController::new(cfg, Vec::new())?,
            last: None,
        })
    }

    /// The wrapped controller.
    #[must_use]
    pub const fn controller(&self) -> &FlightController<Vec<LocomotionEvent>> {
        &self.controller
    }

    /// Snapshot taken at the end of the last tick.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&LocomotionSnapshot> {
        self.last.as_ref()
    }
}

/// Latest tracked pose for an avatar; `dt` is ignored in favour of [`Time`].
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PoseInput(pub PoseSample);

/// Capabilities applied to every rig.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct CapabilityState(pub Capabilities);

/// Obstacles probed by every rig.
#[derive(Resource, Debug, Clone, Default)]
pub struct Obstacles(pub ObstacleSet);

/// Ambient wind acting on every rig.
#[derive(Resource, Debug, Clone, Default)]
pub struct Wind(pub WindField);

/// A controller notification tagged with the avatar it came from.
#[derive(Event, Debug, Clone, Copy)]
pub struct FlightEvent {
    /// Avatar entity.
    pub avatar: Entity,
    /// The notification.
    pub event: LocomotionEvent,
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "Observer systems must accept On<T> by value for Events V2."
)]
fn log_flight_event(event: On<FlightEvent>) {
    let FlightEvent { avatar, event } = event.event();
    match event {
        LocomotionEvent::GlideTick { .. }
        | LocomotionEvent::HoverTick { .. }
        | LocomotionEvent::DiveTick { .. }
        | LocomotionEvent::GravityTick { .. } => {}
        other => debug!("{avatar:?}: {other:?}"),
    }
}

/// Ticks every rig and publishes its notifications.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy system parameters use `Res<T>` by value."
)]
pub fn tick_flight_rigs_system(
    mut commands: Commands,
    time: Res<Time>,
    caps: Res<CapabilityState>,
    obstacles: Res<Obstacles>,
    wind: Res<Wind>,
    mut rigs: Query<(Entity, &mut FlightRig, &PoseInput, &mut Transform)>,
) {
    let dt = time.delta_secs();
    for (avatar, mut rig, pose, mut transform) in &mut rigs {
        let pose = PoseSample { dt, ..pose.0 };
        let input = TickInput::new(&pose, transform.translation)
            .with_capabilities(caps.0)
            .with_environment(&wind.0)
            .with_obstacles(&obstacles.0);
        let snapshot = rig.controller.tick(&input);
        rig.last = Some(snapshot);
        transform.translation = integrate_position(transform.translation, snapshot.velocity, dt);
        for event in rig.controller.sink_mut().drain(..) {
            commands.trigger(FlightEvent { avatar, event });
        }
    }
}

/// Bevy plugin installing the flight rig system.
#[derive(Default)]
pub struct FlightPlugin;

impl Plugin for FlightPlugin {
    fn build(&self, app: &mut App) {
        info!("installing flight locomotion plugin");
        app.add_observer(log_flight_event);
        app.init_resource::<CapabilityState>();
        app.init_resource::<Obstacles>();
        app.init_resource::<Wind>();
        app.add_systems(Update, tick_flight_rigs_system);
    }
}
