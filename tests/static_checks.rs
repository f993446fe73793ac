//! Compile-time guarantees on types shared with other subsystems.

use soar::state::{Deadline, TransitionTimers};
use soar::{
    Capabilities, FlightController, LocomotionConfig, LocomotionEvent, LocomotionSnapshot,
    ObstacleSet, StateFlags, WindField,
};
use static_assertions::assert_impl_all;
use std::sync::mpsc::Sender;

assert_impl_all!(LocomotionSnapshot: Send, Sync, Copy, serde::Serialize);
assert_impl_all!(LocomotionEvent: Send, Sync, Copy, serde::Serialize);
assert_impl_all!(StateFlags: Send, Sync, Copy, Eq);
assert_impl_all!(Capabilities: Send, Sync, Copy);
assert_impl_all!(Deadline: Copy, Default);
assert_impl_all!(TransitionTimers: Copy, Default);
assert_impl_all!(LocomotionConfig: Send, Sync, Copy, serde::Serialize);
assert_impl_all!(ObstacleSet: Send, Sync, Clone);
assert_impl_all!(WindField: Send, Sync, Clone);
assert_impl_all!(FlightController<Vec<LocomotionEvent>>: Send, Sync);
assert_impl_all!(FlightController<Sender<LocomotionEvent>>: Send);
