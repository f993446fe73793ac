//! The locomotion state machine.
//!
//! [`FlightController`] owns the avatar velocity and discrete state and is
//! advanced once per simulation frame by [`FlightController::tick`]. Each
//! tick runs in a fixed order:
//!
//! 1. capability gate (translate revocation short-circuits the tick)
//! 2. glide hysteresis, then the dive and hover sub-states
//! 3. flap detection and impulse
//! 4. glide forces, ambient forces, gravity
//! 5. obstacle probe
//! 6. speed governor
//!
//! A bounce lock replaces steps 2 to 5 with drag until it expires.

use glam::Vec3;
use log::{debug, trace};
use serde::Serialize;

use crate::capability::{Ability, Capabilities, CapabilityGate};
use crate::config::{ConfigError, LocomotionConfig};
use crate::constants::LEVEL_DIVE_ANGLE_DEG;
use crate::environment::{EnvironmentField, NoField};
use crate::events::{EventSink, LocomotionEvent};
use crate::forces::{
    flap_impulse, flap_speed_multiplier, glide_velocity_with, post_dive_boost_duration,
    GlideTuning,
};
use crate::governor::{relax_to_ceiling, SpeedGovernor};
use crate::obstacle::{NoObstacles, ObstacleProbe, ObstacleResponder};
use crate::pose::{HandSpreadFilter, PoseSample};
use crate::state::{
    BounceLock, DiscreteState, DiveExit, DiveState, GlideMode, GlideState, StateFlags,
    TransitionTimers,
};
use crate::vector_math::{angle_between_deg, safe_normalize, sanitize_vec};

/// Everything one tick reads besides the controller's own state.
#[derive(Clone, Copy)]
pub struct TickInput<'a> {
    /// Pose for this tick, including the elapsed time.
    pub pose: &'a PoseSample,
    /// Capabilities in force this tick.
    pub capabilities: Capabilities,
    /// Avatar body position, used for ambient forces and as probe origin.
    pub position: Vec3,
    /// Ambient force source.
    pub environment: &'a dyn EnvironmentField,
    /// Obstacle geometry.
    pub obstacles: &'a dyn ObstacleProbe,
}

impl<'a> TickInput<'a> {
    /// Input with every capability, no ambient forces and no obstacles.
    #[must_use]
    pub fn new(pose: &'a PoseSample, position: Vec3) -> Self {
        Self {
            pose,
            capabilities: Capabilities::default(),
            position,
            environment: &NoField,
            obstacles: &NoObstacles,
        }
    }

    /// Uses the given capabilities.
    #[must_use]
    pub const fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Reads capabilities from `gate`.
    #[must_use]
    pub fn with_gate(self, gate: &dyn CapabilityGate) -> Self {
        self.with_capabilities(gate.capabilities())
    }

    /// Uses the given ambient force source.
    #[must_use]
    pub fn with_environment(mut self, environment: &'a dyn EnvironmentField) -> Self {
        self.environment = environment;
        self
    }

    /// Uses the given obstacle geometry.
    #[must_use]
    pub fn with_obstacles(mut self, obstacles: &'a dyn ObstacleProbe) -> Self {
        self.obstacles = obstacles;
        self
    }
}

/// Immutable view of the controller after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocomotionSnapshot {
    /// Velocity in m/s.
    pub velocity: Vec3,
    /// Speed in m/s.
    pub speed: f32,
    /// Discrete state flags.
    pub flags: StateFlags,
    /// Angle between steering and straight down, in degrees.
    pub dive_angle_deg: f32,
    /// Smoothed arm spread.
    pub spread: f32,
    /// Whether a speed boost is in progress.
    pub boosting: bool,
    /// Controller clock in seconds.
    pub clock: f64,
}

/// Flight locomotion state machine.
///
/// Notifications go to the injected sink `S`; the controller never looks
/// up listeners on its own.
#[derive(Debug)]
pub struct FlightController<S> {
    cfg: LocomotionConfig,
    sink: S,
    velocity: Vec3,
    state: DiscreteState,
    timers: TransitionTimers,
    spread: HandSpreadFilter,
    flap_gesture_held: bool,
    facing: Vec3,
    steering: Vec3,
    dive_angle: f32,
    clock: f64,
    responder: ObstacleResponder,
    governor: SpeedGovernor,
}

impl<S: EventSink> FlightController<S> {
    /// Validates `cfg` and builds an idle controller at rest.
    ///
    /// # Errors
    /// Returns the first configuration constraint `cfg` violates.
    pub fn new(cfg: LocomotionConfig, sink: S) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            sink,
            velocity: Vec3::ZERO,
            state: DiscreteState::Idle,
            timers: TransitionTimers::default(),
            spread: HandSpreadFilter::default(),
            flap_gesture_held: false,
            facing: Vec3::NEG_Z,
            steering: Vec3::NEG_Z,
            dive_angle: LEVEL_DIVE_ANGLE_DEG,
            clock: 0.0,
            responder: ObstacleResponder::new(cfg.bounce),
            governor: SpeedGovernor::new(cfg.governor, cfg.boost),
        })
    }

    /// Current velocity.
    #[must_use]
    pub const fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Overrides the velocity, e.g. after a teleport. Non-finite input zeroes it.
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = sanitize_vec(velocity);
    }

    /// Current discrete state.
    #[must_use]
    pub const fn state(&self) -> &DiscreteState {
        &self.state
    }

    /// Current state as flags.
    #[must_use]
    pub const fn flags(&self) -> StateFlags {
        self.state.flags()
    }

    /// Angle between the steering direction and straight down, in degrees.
    #[must_use]
    pub const fn dive_angle(&self) -> f32 {
        self.dive_angle
    }

    /// Latches and flap timing.
    #[must_use]
    pub const fn timers(&self) -> &TransitionTimers {
        &self.timers
    }

    /// Speed governor and boost overlay.
    #[must_use]
    pub const fn governor(&self) -> &SpeedGovernor {
        &self.governor
    }

    /// Seconds of simulated time so far.
    #[must_use]
    pub const fn clock(&self) -> f64 {
        self.clock
    }

    /// Tuning in use.
    #[must_use]
    pub const fn config(&self) -> &LocomotionConfig {
        &self.cfg
    }

    /// The event sink.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the event sink, e.g. to drain buffered events.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consumes the controller and returns its sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Snapshot of the externally visible state.
    #[must_use]
    pub fn snapshot(&self) -> LocomotionSnapshot {
        LocomotionSnapshot {
            velocity: self.velocity,
            speed: self.velocity.length(),
            flags: self.state.flags(),
            dive_angle_deg: self.dive_angle,
            spread: self.spread.value(),
            boosting: self.governor.is_boosting(),
            clock: self.clock,
        }
    }

    /// Starts a speed boost of `duration` active seconds along `direction`
    /// (falling back to the current facing when degenerate).
    pub fn activate_speed_boost(&mut self, duration: f32, direction: Vec3) {
        let direction = self
            .governor
            .activate_boost(self.clock, duration, direction, self.facing);
        self.sink.emit(LocomotionEvent::SpeedBoostActivated {
            duration,
            direction,
        });
    }

    /// Advances the controller by `input.pose.dt` seconds.
    pub fn tick(&mut self, input: &TickInput<'_>) -> LocomotionSnapshot {
        let pose = input.pose.sanitized();
        let caps = input.capabilities;
        let dt = pose.dt;
        self.clock += f64::from(dt);
        let now = self.clock;

        self.update_steering(&pose, caps);
        let raw_spread = pose.hand_separation() * self.cfg.glide.spread_scale;
        let spread = self
            .spread
            .update(raw_spread, dt, self.cfg.glide.spread_smoothing);
        self.update_stroke_latch(&pose, now);
        let flap = self.detect_flap(&pose, caps, now);

        if !caps.allows(Ability::Translate) {
            self.revoke_translate();
            return self.snapshot();
        }

        if let DiscreteState::Bouncing(lock) = self.state {
            self.tick_bounce(lock, dt, caps);
        } else {
            self.update_glide(spread, now, caps);
            self.update_dive(now, caps);
            self.update_hover(&pose, now, caps);
            if let Some(magnitude) = flap {
                self.apply_flap(magnitude, now);
            }
            self.apply_glide_forces(dt, caps);
            self.apply_ambient_forces(input, dt);
            self.apply_gravity(dt, caps);
            self.emit_state_ticks(dt);
            self.probe_obstacles(input);
        }

        self.velocity = sanitize_vec(self.governor.govern(self.velocity, self.facing, now, dt));
        trace!(
            "t={now:.3} v={:?} state={:?} spread={spread:.1}",
            self.velocity,
            self.state.flags()
        );
        self.snapshot()
    }

    fn update_steering(&mut self, pose: &PoseSample, caps: Capabilities) {
        if caps.allows(Ability::Look) && pose.head.forward != Vec3::ZERO {
            self.facing = pose.head.forward;
        }
        let weight = self.cfg.glide.hand_steering_weight;
        let hands = pose.hands_forward();
        let blended = if hands == Vec3::ZERO {
            self.facing
        } else {
            self.facing * (1.0 - weight) + hands * weight
        };
        let steering = safe_normalize(blended);
        if steering != Vec3::ZERO {
            self.steering = steering;
        }
        self.dive_angle =
            angle_between_deg(self.steering, Vec3::NEG_Y).unwrap_or(LEVEL_DIVE_ANGLE_DEG);
    }

    fn update_stroke_latch(&mut self, pose: &PoseSample, now: f64) {
        let threshold = self.cfg.glide.stroke_speed;
        let (left, right) = (pose.left.vertical_velocity, pose.right.vertical_velocity);
        let upstroke = left > threshold && right > threshold;
        let downstroke = left < -threshold && right < -threshold;
        if upstroke || downstroke {
            self.timers
                .stroke_latch
                .extend(now, self.cfg.glide.stroke_hold);
        }
    }

    /// Returns the flap magnitude if a flap fires this tick.
    fn detect_flap(&mut self, pose: &PoseSample, caps: Capabilities, now: f64) -> Option<f32> {
        let cfg = self.cfg.flap;
        let down_left = -pose.left.vertical_velocity;
        let down_right = -pose.right.vertical_velocity;
        let gesture = down_left > cfg.trigger_speed && down_right > cfg.trigger_speed;
        let rising_edge = gesture && !self.flap_gesture_held;
        self.flap_gesture_held = gesture;

        if !caps.allows(Ability::Flap) {
            return None;
        }
        let rested = self
            .timers
            .last_flap
            .map_or(true, |last| now - last >= f64::from(cfg.refire_interval));
        if !rested {
            return None;
        }
        if pose.flap_trigger {
            return Some(1.0);
        }
        rising_edge.then(|| ((down_left + down_right) * 0.5 / cfg.full_flap_speed).clamp(0.0, 1.0))
    }

    fn update_glide(&mut self, spread: f32, now: f64, caps: Capabilities) {
        let cfg = self.cfg.glide;
        let allowed = caps.allows(Ability::Glide);
        let latched = self.timers.latched(now);
        match self.state {
            DiscreteState::Idle => {
                if allowed && (spread > cfg.enter_spread || latched) {
                    debug!("glide started (spread {spread:.1}, latched {latched})");
                    self.state = DiscreteState::Gliding(GlideState::default());
                    self.sink.emit(LocomotionEvent::GlideStarted);
                }
            }
            DiscreteState::Gliding(glide) => {
                if !allowed {
                    debug!("glide revoked");
                    self.close_glide(glide);
                    self.state = DiscreteState::Idle;
                } else if spread < cfg.stay_spread && !latched {
                    debug!("glide ended (spread {spread:.1})");
                    self.end_glide_mode(glide.mode, now, true);
                    self.sink.emit(LocomotionEvent::GlideEnded);
                    self.timers.clear_latches();
                    self.state = DiscreteState::Idle;
                }
            }
            DiscreteState::Bouncing(_) => {}
        }
    }

    fn update_dive(&mut self, now: f64, caps: Capabilities) {
        let DiscreteState::Gliding(mut glide) = self.state else {
            return;
        };
        let cfg = self.cfg.dive;
        let speed = self.velocity.length();
        let angle = self.dive_angle;
        match glide.mode {
            GlideMode::Cruising => {
                if caps.allows(Ability::Dive) && angle < cfg.enter_angle_deg && speed > cfg.min_speed
                {
                    debug!("dive started at {speed:.1} m/s, pitch {angle:.1}");
                    glide.mode = GlideMode::Diving(DiveState {
                        started_at: now,
                        entry_speed: speed,
                        peak_speed: speed,
                    });
                    self.sink.emit(LocomotionEvent::DiveStarted { speed });
                }
            }
            GlideMode::Diving(mut dive) => {
                dive.peak_speed = dive.peak_speed.max(speed);
                if !caps.allows(Ability::Dive) {
                    self.finish_dive(dive, now, false);
                    glide.mode = GlideMode::Cruising;
                } else if angle > cfg.exit_angle_deg || speed < cfg.min_speed {
                    self.finish_dive(dive, now, true);
                    glide.mode = GlideMode::Cruising;
                } else {
                    glide.mode = GlideMode::Diving(dive);
                }
            }
            GlideMode::Hovering => {}
        }
        self.state = DiscreteState::Gliding(glide);
    }

    fn update_hover(&mut self, pose: &PoseSample, now: f64, caps: Capabilities) {
        let DiscreteState::Gliding(mut glide) = self.state else {
            return;
        };
        let wanted = pose.both_grips() && caps.allows(Ability::Hover);
        match (glide.mode, wanted) {
            (GlideMode::Hovering, false) => {
                debug!("hover ended");
                glide.mode = GlideMode::Cruising;
                self.sink.emit(LocomotionEvent::HoverEnded);
            }
            (GlideMode::Diving(dive), true) => {
                self.finish_dive(dive, now, true);
                self.start_hover(&mut glide);
            }
            (GlideMode::Cruising, true) => self.start_hover(&mut glide),
            _ => {}
        }
        self.state = DiscreteState::Gliding(glide);
    }

    fn start_hover(&mut self, glide: &mut GlideState) {
        debug!("hover started");
        glide.mode = GlideMode::Hovering;
        self.sink.emit(LocomotionEvent::HoverStarted);
    }

    fn apply_flap(&mut self, magnitude: f32, now: f64) {
        let cfg = &self.cfg.flap;
        let multiplier = flap_speed_multiplier(
            self.velocity.length(),
            self.governor.max_speed(),
            cfg.min_speed_multiplier,
        );
        let impulse = flap_impulse(self.facing, magnitude, cfg.strength, cfg.forward_thrust);
        self.velocity += impulse * multiplier;
        self.timers.last_flap = Some(now);
        self.timers.glide_latch.extend(now, cfg.glide_hold);
        if let DiscreteState::Gliding(glide) = &mut self.state {
            glide.elapsed = 0.0;
        }
        debug!("flap magnitude {magnitude:.2} x{multiplier:.2}");
        self.sink.emit(LocomotionEvent::FlapOccurred { magnitude });
    }

    fn apply_glide_forces(&mut self, dt: f32, caps: Capabilities) {
        let DiscreteState::Gliding(glide) = &mut self.state else {
            return;
        };
        glide.elapsed += dt;
        let hovering = glide.is_hovering();
        let cfg = &self.cfg.glide;
        let tuning = GlideTuning {
            lift_coefficient: cfg.lift_coefficient,
            dive_accel: if caps.allows(Ability::Dive) {
                cfg.dive_accel
            } else {
                0.0
            },
            stall_sink_speed: cfg.stall_sink_speed,
            fast_sink_speed: cfg.fast_sink_speed,
        };
        let step = glide_velocity_with(
            &tuning,
            self.velocity,
            self.steering,
            cfg.glide_strength,
            self.governor.max_speed(),
            dt,
        );
        self.velocity = step.velocity;
        self.dive_angle = step.dive_angle_deg;
        if hovering {
            self.velocity = relax_to_ceiling(
                self.velocity,
                self.cfg.hover.max_speed,
                self.cfg.hover.smoothing,
                dt,
            );
        }
    }

    fn apply_ambient_forces(&mut self, input: &TickInput<'_>, dt: f32) {
        let force = input.environment.query_force(input.position);
        let force = sanitize_vec(force);
        self.velocity += force * dt;
    }

    fn apply_gravity(&mut self, dt: f32, caps: Capabilities) {
        if !caps.gravity_enabled {
            return;
        }
        self.velocity.y -= self.cfg.gravity.accel * dt;
        self.sink.emit(LocomotionEvent::GravityTick { dt });
    }

    fn emit_state_ticks(&mut self, dt: f32) {
        let DiscreteState::Gliding(glide) = self.state else {
            return;
        };
        self.sink.emit(LocomotionEvent::GlideTick { dt });
        match glide.mode {
            GlideMode::Hovering => self.sink.emit(LocomotionEvent::HoverTick { dt }),
            GlideMode::Diving(_) => self.sink.emit(LocomotionEvent::DiveTick { dt }),
            GlideMode::Cruising => {}
        }
    }

    fn probe_obstacles(&mut self, input: &TickInput<'_>) {
        let Some(impulse) = self
            .responder
            .probe(input.obstacles, input.position, self.velocity)
        else {
            return;
        };
        self.velocity += impulse.delta_v;
        let suspended = match self.state {
            DiscreteState::Gliding(mut glide) => {
                self.end_glide_mode(glide.mode, self.clock, false);
                glide.mode = GlideMode::Cruising;
                Some(glide)
            }
            DiscreteState::Idle => None,
            DiscreteState::Bouncing(lock) => lock.suspended,
        };
        debug!(
            "bounce lock for {:.2}s (glide suspended: {})",
            self.cfg.bounce.duration,
            suspended.is_some()
        );
        self.state = DiscreteState::Bouncing(BounceLock {
            remaining: self.cfg.bounce.duration,
            suspended,
        });
        self.sink.emit(LocomotionEvent::BounceOccurred {
            normal: impulse.normal,
            speed: impulse.speed,
        });
    }

    fn tick_bounce(&mut self, lock: BounceLock, dt: f32, caps: Capabilities) {
        self.velocity *= self.responder.drag_factor(dt);
        let remaining = lock.remaining - dt;
        let mut suspended = lock.suspended;
        if !caps.allows(Ability::Glide) && suspended.take().is_some() {
            self.sink.emit(LocomotionEvent::GlideEnded);
            self.timers.clear_latches();
        }
        self.state = if remaining > 0.0 {
            DiscreteState::Bouncing(BounceLock {
                remaining,
                suspended,
            })
        } else {
            debug!("bounce lock released");
            suspended.map_or(DiscreteState::Idle, DiscreteState::Gliding)
        };
    }

    fn revoke_translate(&mut self) {
        if self.velocity != Vec3::ZERO || self.state != DiscreteState::Idle {
            debug!("translate revoked, halting");
        }
        self.velocity = Vec3::ZERO;
        self.governor.cancel_boost();
        match self.state {
            DiscreteState::Gliding(glide) => self.close_glide(glide),
            DiscreteState::Bouncing(BounceLock {
                suspended: Some(_), ..
            }) => {
                self.sink.emit(LocomotionEvent::GlideEnded);
                self.timers.clear_latches();
            }
            DiscreteState::Bouncing(_) | DiscreteState::Idle => {}
        }
        self.state = DiscreteState::Idle;
    }

    /// Ends a glide and its sub-state without granting a dive boost.
    fn close_glide(&mut self, glide: GlideState) {
        self.end_glide_mode(glide.mode, self.clock, false);
        self.sink.emit(LocomotionEvent::GlideEnded);
        self.timers.clear_latches();
    }

    fn end_glide_mode(&mut self, mode: GlideMode, now: f64, grant_boost: bool) {
        match mode {
            GlideMode::Diving(dive) => self.finish_dive(dive, now, grant_boost),
            GlideMode::Hovering => {
                debug!("hover ended");
                self.sink.emit(LocomotionEvent::HoverEnded);
            }
            GlideMode::Cruising => {}
        }
    }

    fn finish_dive(&mut self, dive: DiveState, now: f64, grant_boost: bool) {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "Dive durations are seconds long; f32 precision suffices."
        )]
        let duration = (now - dive.started_at).max(0.0) as f32;
        let exit = DiveExit {
            duration,
            peak_speed: dive.peak_speed,
            heading: safe_normalize(self.velocity),
        };
        debug!(
            "dive ended after {:.2}s, peak {:.1} m/s",
            exit.duration, exit.peak_speed
        );
        self.sink.emit(LocomotionEvent::DiveEnded {
            duration: exit.duration,
            peak_speed: exit.peak_speed,
        });
        if grant_boost {
            let boost = post_dive_boost_duration(exit.duration, exit.peak_speed, &self.cfg.dive);
            self.activate_speed_boost(boost, exit.heading);
        }
    }
}
