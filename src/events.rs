//! Notifications emitted by the controller.
//!
//! Consumers (animation, audio, telemetry) receive these fire-and-forget
//! through an [`EventSink`] injected into the controller.

use std::sync::mpsc::Sender;

use glam::Vec3;
use log::trace;
use serde::Serialize;

/// A discrete locomotion notification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum LocomotionEvent {
    /// A flap impulse was applied.
    FlapOccurred {
        /// Flap magnitude in `[0, 1]` before the speed multiplier.
        magnitude: f32,
    },
    /// Gliding began.
    GlideStarted,
    /// A tick elapsed while gliding.
    GlideTick {
        /// Tick duration in seconds.
        dt: f32,
    },
    /// Gliding ended.
    GlideEnded,
    /// Hovering began.
    HoverStarted,
    /// A tick elapsed while hovering.
    HoverTick {
        /// Tick duration in seconds.
        dt: f32,
    },
    /// Hovering ended.
    HoverEnded,
    /// Diving began.
    DiveStarted {
        /// Speed on entry.
        speed: f32,
    },
    /// A tick elapsed while diving.
    DiveTick {
        /// Tick duration in seconds.
        dt: f32,
    },
    /// Diving ended.
    DiveEnded {
        /// Seconds the dive lasted.
        duration: f32,
        /// Highest speed reached.
        peak_speed: f32,
    },
    /// An obstacle impact triggered a bounce.
    BounceOccurred {
        /// Surface normal at the impact.
        normal: Vec3,
        /// Speed at impact.
        speed: f32,
    },
    /// Gravity was applied this tick.
    GravityTick {
        /// Tick duration in seconds.
        dt: f32,
    },
    /// A speed boost started.
    SpeedBoostActivated {
        /// Active seconds before the fade.
        duration: f32,
        /// Initial boost direction.
        direction: Vec3,
    },
}

/// Payload-free discriminant of [`LocomotionEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventKind {
    /// See [`LocomotionEvent::FlapOccurred`].
    FlapOccurred,
    /// See [`LocomotionEvent::GlideStarted`].
    GlideStarted,
    /// See [`LocomotionEvent::GlideTick`].
    GlideTick,
    /// See [`LocomotionEvent::GlideEnded`].
    GlideEnded,
    /// See [`LocomotionEvent::HoverStarted`].
    HoverStarted,
    /// See [`LocomotionEvent::HoverTick`].
    HoverTick,
    /// See [`LocomotionEvent::HoverEnded`].
    HoverEnded,
    /// See [`LocomotionEvent::DiveStarted`].
    DiveStarted,
    /// See [`LocomotionEvent::DiveTick`].
    DiveTick,
    /// See [`LocomotionEvent::DiveEnded`].
    DiveEnded,
    /// See [`LocomotionEvent::BounceOccurred`].
    BounceOccurred,
    /// See [`LocomotionEvent::GravityTick`].
    GravityTick,
    /// See [`LocomotionEvent::SpeedBoostActivated`].
    SpeedBoostActivated,
}

impl LocomotionEvent {
    /// Discriminant of this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::FlapOccurred { .. } => EventKind::FlapOccurred,
            Self::GlideStarted => EventKind::GlideStarted,
            Self::GlideTick { .. } => EventKind::GlideTick,
            Self::GlideEnded => EventKind::GlideEnded,
            Self::HoverStarted => EventKind::HoverStarted,
            Self::HoverTick { .. } => EventKind::HoverTick,
            Self::HoverEnded => EventKind::HoverEnded,
            Self::DiveStarted { .. } => EventKind::DiveStarted,
            Self::DiveTick { .. } => EventKind::DiveTick,
            Self::DiveEnded { .. } => EventKind::DiveEnded,
            Self::BounceOccurred { .. } => EventKind::BounceOccurred,
            Self::GravityTick { .. } => EventKind::GravityTick,
            Self::SpeedBoostActivated { .. } => EventKind::SpeedBoostActivated,
        }
    }
}

/// Receiver of controller notifications.
pub trait EventSink {
    /// Delivers one event. Must not call back into the controller.
    fn emit(&mut self, event: LocomotionEvent);
}

impl EventSink for Vec<LocomotionEvent> {
    fn emit(&mut self, event: LocomotionEvent) {
        self.push(event);
    }
}

impl EventSink for Sender<LocomotionEvent> {
    fn emit(&mut self, event: LocomotionEvent) {
        // A dropped receiver just means nobody is listening any more.
        if self.send(event).is_err() {
            trace!("event receiver gone, dropping {:?}", event.kind());
        }
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: LocomotionEvent) {
        (**self).emit(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn emit(&mut self, event: LocomotionEvent) {
        (**self).emit(event);
    }
}

/// Sink forwarding to a closure.
pub struct FnSink<F>(pub F);

impl<F: FnMut(LocomotionEvent)> EventSink for FnSink<F> {
    fn emit(&mut self, event: LocomotionEvent) {
        (self.0)(event);
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: LocomotionEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::mpsc;

    #[rstest]
    fn channel_sink_forwards() {
        let (tx, rx) = mpsc::channel();
        let mut sink = tx;
        sink.emit(LocomotionEvent::GlideStarted);
        assert_eq!(rx.try_recv().ok(), Some(LocomotionEvent::GlideStarted));
    }

    #[rstest]
    fn channel_sink_survives_dropped_receiver() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut sink = tx;
        sink.emit(LocomotionEvent::GlideEnded);
    }

    #[rstest]
    fn closure_sink_counts() {
        let mut count = 0;
        {
            let mut sink = FnSink(|_e| count += 1);
            sink.emit(LocomotionEvent::GravityTick { dt: 0.1 });
            sink.emit(LocomotionEvent::GravityTick { dt: 0.1 });
        }
        assert_eq!(count, 2);
    }
}
