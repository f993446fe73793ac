//! Capability gating applied by the controller tick.

use glam::Vec3;
use rstest::{fixture, rstest};
use soar::{
    Ability, Capabilities, CapabilityMask, EventKind, FlightController, LocomotionEvent,
    PoseSample, TickInput,
};
use test_utils::{count, kinds, pitched_pose, spread_pose, test_config, with_hand_speed};

type Controller = FlightController<Vec<LocomotionEvent>>;

fn without(ability: Ability) -> Capabilities {
    Capabilities {
        mask: CapabilityMask::ALL.without(ability),
        gravity_enabled: true,
    }
}

fn tick(controller: &mut Controller, pose: &PoseSample, caps: Capabilities) {
    controller.tick(&TickInput::new(pose, Vec3::new(0.0, 50.0, 0.0)).with_capabilities(caps));
}

#[fixture]
fn gliding() -> Controller {
    let mut controller = FlightController::new(test_config(), Vec::new()).expect("valid config");
    controller.set_velocity(Vec3::new(0.0, 0.0, -12.0));
    tick(&mut controller, &spread_pose(1.0), Capabilities::default());
    assert!(controller.flags().gliding);
    controller.sink_mut().clear();
    controller
}

#[rstest]
fn translate_revocation_halts_and_ends_glide_once(mut gliding: Controller) {
    let pose = spread_pose(1.0);
    tick(&mut gliding, &pose, without(Ability::Translate));

    assert_eq!(gliding.velocity(), Vec3::ZERO);
    assert!(!gliding.flags().gliding);
    assert_eq!(kinds(gliding.sink()), vec![EventKind::GlideEnded]);

    for _ in 0..10 {
        tick(&mut gliding, &pose, without(Ability::Translate));
    }
    let events = gliding.sink();
    assert_eq!(count(events, EventKind::GlideEnded), 1);
    assert_eq!(count(events, EventKind::GlideTick), 0);
    assert_eq!(count(events, EventKind::GravityTick), 0);
    assert_eq!(gliding.velocity(), Vec3::ZERO);
}

#[rstest]
fn glide_resumes_once_translate_returns(mut gliding: Controller) {
    let pose = spread_pose(1.0);
    tick(&mut gliding, &pose, without(Ability::Translate));
    tick(&mut gliding, &pose, Capabilities::default());
    assert!(gliding.flags().gliding);
    assert_eq!(count(gliding.sink(), EventKind::GlideStarted), 1);
}

#[rstest]
fn translate_revocation_ends_dive_without_boost() {
    let mut controller = FlightController::new(test_config(), Vec::new()).expect("valid config");
    controller.set_velocity(Vec3::new(0.0, -15.0, -10.0));
    let pose = pitched_pose(1.0, 30.0);
    tick(&mut controller, &pose, Capabilities::default());
    assert!(controller.flags().diving);

    tick(&mut controller, &pose, without(Ability::Translate));
    let events = controller.sink();
    assert_eq!(count(events, EventKind::DiveEnded), 1);
    assert_eq!(count(events, EventKind::GlideEnded), 1);
    assert_eq!(count(events, EventKind::SpeedBoostActivated), 0);
    assert!(!controller.governor().is_boosting());
}

#[rstest]
fn glide_revocation_ends_glide_but_keeps_moving(mut gliding: Controller) {
    tick(&mut gliding, &spread_pose(1.0), without(Ability::Glide));
    assert!(!gliding.flags().gliding);
    assert_eq!(count(gliding.sink(), EventKind::GlideEnded), 1);
    assert_ne!(gliding.velocity(), Vec3::ZERO);
    assert_eq!(count(gliding.sink(), EventKind::GravityTick), 1);
}

#[rstest]
fn glide_revocation_blocks_entry() {
    let mut controller = FlightController::new(test_config(), Vec::new()).expect("valid config");
    for _ in 0..5 {
        tick(&mut controller, &spread_pose(1.0), without(Ability::Glide));
    }
    assert!(!controller.flags().gliding);
    assert_eq!(count(controller.sink(), EventKind::GlideStarted), 0);
}

#[rstest]
fn flap_revocation_suppresses_flaps() {
    let mut controller = FlightController::new(test_config(), Vec::new()).expect("valid config");
    let mut pose = spread_pose(0.0);
    pose.flap_trigger = true;
    tick(&mut controller, &pose, without(Ability::Flap));
    assert_eq!(count(controller.sink(), EventKind::FlapOccurred), 0);
    assert!(controller.velocity().y < 0.0);
}

#[rstest]
fn flap_gesture_held_through_revocation_does_not_fire_late() {
    let mut controller = FlightController::new(test_config(), Vec::new()).expect("valid config");
    let pose = with_hand_speed(spread_pose(0.0), -3.0);
    tick(&mut controller, &pose, without(Ability::Flap));
    tick(&mut controller, &pose, Capabilities::default());
    assert_eq!(count(controller.sink(), EventKind::FlapOccurred), 0);
}

#[rstest]
fn hover_revocation_ends_hover(mut gliding: Controller) {
    let mut pose = spread_pose(1.0);
    pose.left.grip = true;
    pose.right.grip = true;
    tick(&mut gliding, &pose, Capabilities::default());
    assert!(gliding.flags().hovering);
    tick(&mut gliding, &pose, without(Ability::Hover));
    assert!(!gliding.flags().hovering);
    assert!(gliding.flags().gliding);
    assert_eq!(count(gliding.sink(), EventKind::HoverEnded), 1);
}

#[rstest]
fn frozen_look_keeps_previous_facing() {
    let mut controller = FlightController::new(test_config(), Vec::new()).expect("valid config");
    let mut pose = spread_pose(1.0);
    tick(&mut controller, &pose, Capabilities::default());
    let level = controller.dive_angle();

    pose.head.forward = Vec3::NEG_Y;
    tick(&mut controller, &pose, without(Ability::Look));
    // Hands still point forward, so only the head could have pitched us down.
    assert!((controller.dive_angle() - level).abs() < 1e-3);
}

#[rstest]
fn gravity_flag_is_honoured_without_mask_change() {
    let mut controller = FlightController::new(test_config(), Vec::new()).expect("valid config");
    let caps = Capabilities {
        mask: CapabilityMask::ALL,
        gravity_enabled: false,
    };
    let gate = move || caps;
    let pose = spread_pose(0.0);
    controller.tick(&TickInput::new(&pose, Vec3::ZERO).with_gate(&gate));
    assert_eq!(controller.velocity(), Vec3::ZERO);
}
