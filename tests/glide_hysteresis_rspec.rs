//! Behaviour tests for the glide hysteresis band using rust-rspec.
//!
//! Spread is scripted in controller units (enter 40, stay 20) with smoothing
//! disabled so each step takes effect on the tick it is supplied.

#[path = "support/rspec_runner.rs"]
mod rspec_runner;

use glam::Vec3;
use rspec_runner::run_serial;
use soar::{EventKind, FlightController, LocomotionEvent, TickInput};
use std::fmt;
use std::sync::{Arc, Mutex};
use test_utils::{count, spread_units_pose, test_config};

type Controller = FlightController<Vec<LocomotionEvent>>;

#[derive(Clone)]
struct GlideWorld {
    controller: Arc<Mutex<Option<Controller>>>,
}

impl fmt::Debug for GlideWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlideWorld").finish_non_exhaustive()
    }
}

impl Default for GlideWorld {
    fn default() -> Self {
        Self {
            controller: Arc::new(Mutex::new(None)),
        }
    }
}

impl GlideWorld {
    fn setup(&mut self) {
        let controller = FlightController::new(test_config(), Vec::new()).expect("valid config");
        *self.controller.lock().expect("controller lock") = Some(controller);
    }

    fn tick_with_spread(&mut self, spread: f32) {
        let mut guard = self.controller.lock().expect("controller lock");
        let controller = guard.as_mut().expect("controller not set up");
        let pose = spread_units_pose(spread);
        controller.tick(&TickInput::new(&pose, Vec3::new(0.0, 50.0, 0.0)));
    }

    fn assert_gliding(&self, gliding: bool) {
        let guard = self.controller.lock().expect("controller lock");
        let controller = guard.as_ref().expect("controller not set up");
        assert_eq!(controller.flags().gliding, gliding);
    }

    fn assert_count(&self, kind: EventKind, expected: usize) {
        let guard = self.controller.lock().expect("controller lock");
        let controller = guard.as_ref().expect("controller not set up");
        assert_eq!(count(controller.sink(), kind), expected, "{kind:?}");
    }
}

#[test]
fn spread_hysteresis_scenario() {
    run_serial(&rspec::given(
        "an idle controller with enter spread 40 and stay spread 20",
        GlideWorld::default(),
        |ctx| {
            ctx.before_each(GlideWorld::setup);
            ctx.when("the spread reaches 50", |ctx| {
                ctx.before_each(|world| world.tick_with_spread(50.0));
                ctx.then("it glides and announces it once", |world| {
                    world.assert_gliding(true);
                    world.assert_count(EventKind::GlideStarted, 1);
                });
                ctx.when("the spread drops to 25", |ctx| {
                    ctx.before_each(|world| world.tick_with_spread(25.0));
                    ctx.then("it keeps gliding", |world| {
                        world.assert_gliding(true);
                        world.assert_count(EventKind::GlideEnded, 0);
                    });
                    ctx.when("the spread drops to 15", |ctx| {
                        ctx.before_each(|world| world.tick_with_spread(15.0));
                        ctx.then("it returns to idle with one GlideEnded", |world| {
                            world.assert_gliding(false);
                            world.assert_count(EventKind::GlideEnded, 1);
                            world.assert_count(EventKind::GlideStarted, 1);
                        });
                    });
                });
            });
            ctx.when("the spread hovers inside the band", |ctx| {
                ctx.before_each(|world| {
                    for _ in 0..50 {
                        world.tick_with_spread(30.0);
                    }
                });
                ctx.then("it never starts gliding", |world| {
                    world.assert_gliding(false);
                    world.assert_count(EventKind::GlideStarted, 0);
                });
            });
        },
    ));
}
