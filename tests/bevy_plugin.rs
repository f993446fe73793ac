//! Headless Bevy app driving flight rigs through `FlightPlugin`.

use std::time::Duration;

use bevy::ecs::prelude::On;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rstest::{fixture, rstest};
use soar::plugin::{CapabilityState, PoseInput};
use soar::{
    Ability, Capabilities, CapabilityMask, EventKind, FlightEvent, FlightPlugin, FlightRig,
    PoseSample,
};
use test_utils::{spread_pose, test_config};

#[derive(Resource, Default)]
struct Seen(Vec<EventKind>);

#[fixture]
fn app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins).add_plugins(FlightPlugin);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(20)));
    app.init_resource::<Seen>();
    app.add_observer(|event: On<FlightEvent>, mut seen: ResMut<Seen>| {
        seen.0.push(event.event().event.kind());
    });
    app
}

fn spawn_rig(app: &mut App, pose: PoseSample) -> Entity {
    let rig = FlightRig::new(test_config()).expect("valid config");
    app.world_mut()
        .spawn((rig, PoseInput(pose), Transform::from_xyz(0.0, 10.0, 0.0)))
        .id()
}

fn run(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

#[rstest]
fn rig_falls_and_moves_transform(mut app: App) {
    let avatar = spawn_rig(&mut app, spread_pose(0.0));
    run(&mut app, 3);

    let transform = app
        .world()
        .get::<Transform>(avatar)
        .expect("avatar keeps its Transform");
    assert!(transform.translation.y < 10.0, "{:?}", transform.translation);

    let rig = app.world().get::<FlightRig>(avatar).expect("rig present");
    let snapshot = rig.snapshot().expect("rig ticked");
    assert!(snapshot.velocity.y < 0.0);
    assert!(rig.controller().sink().is_empty(), "events are drained each frame");
}

#[rstest]
fn notifications_reach_observers(mut app: App) {
    spawn_rig(&mut app, spread_pose(1.0));
    run(&mut app, 2);

    let seen = &app.world().resource::<Seen>().0;
    assert_eq!(
        seen.iter().filter(|k| **k == EventKind::GlideStarted).count(),
        1
    );
    assert!(seen.contains(&EventKind::GlideTick));
}

#[rstest]
fn revoked_translate_pins_the_avatar(mut app: App) {
    app.insert_resource(CapabilityState(Capabilities {
        mask: CapabilityMask::ALL.without(Ability::Translate),
        gravity_enabled: true,
    }));
    let avatar = spawn_rig(&mut app, spread_pose(1.0));
    run(&mut app, 3);

    let transform = app.world().get::<Transform>(avatar).expect("transform");
    assert_eq!(transform.translation, Vec3::new(0.0, 10.0, 0.0));
    assert!(app.world().resource::<Seen>().0.is_empty());
}
