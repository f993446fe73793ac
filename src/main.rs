use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glam::{Quat, Vec3};
use log::info;
use soar::{
    init_logging, integrate_position, Ability, Capabilities, CapabilityMask, FlightController,
    FnSink, LocomotionConfig, LocomotionEvent, ObstacleSet, ObstacleShape, PoseSample,
    TickInput, WindField, WindZone,
};

/// Headless flight locomotion simulation
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
    /// JSON file overriding controller tuning
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Simulated seconds
    #[arg(long, default_value_t = 12.0)]
    seconds: f32,
    /// Tick rate in Hz
    #[arg(long, default_value_t = 90.0)]
    hz: f32,
}

/// Scripted pilot: spreads arms, flaps twice, pitches into a dive, pulls up
/// towards a wall, then loses the translate capability.
fn scripted_pose(t: f32, dt: f32) -> (PoseSample, Capabilities) {
    let spread = if t < 0.5 { 0.3 } else { 1.4 };
    let flapping = (1.0..1.2).contains(&t) || (2.0..2.2).contains(&t);
    let hand_vv = if flapping { -3.5 } else { 0.0 };
    let forward = if (4.0..6.5).contains(&t) {
        Vec3::new(0.0, -0.9, -0.45).normalize()
    } else {
        Vec3::NEG_Z
    };
    let mut pose = PoseSample {
        dt,
        ..PoseSample::default()
    };
    pose.head.position = Vec3::new(0.0, 1.7, 0.0);
    pose.head.forward = forward;
    pose.left.position = Vec3::new(-spread / 2.0, 1.4, 0.0);
    pose.right.position = Vec3::new(spread / 2.0, 1.4, 0.0);
    pose.left.orientation = Quat::from_rotation_arc(Vec3::NEG_Z, forward);
    pose.right.orientation = pose.left.orientation;
    pose.left.vertical_velocity = hand_vv;
    pose.right.vertical_velocity = hand_vv;
    pose.left.grip = (8.0..9.0).contains(&t);
    pose.right.grip = pose.left.grip;

    let mask = if t > 10.5 {
        CapabilityMask::ALL.without(Ability::Translate)
    } else {
        CapabilityMask::ALL
    };
    (
        pose,
        Capabilities {
            mask,
            gravity_enabled: true,
        },
    )
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let cfg = match &args.config {
        Some(path) => LocomotionConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => LocomotionConfig::default(),
    };
    let sink = FnSink(|event: LocomotionEvent| match event {
        LocomotionEvent::GlideTick { .. }
        | LocomotionEvent::HoverTick { .. }
        | LocomotionEvent::DiveTick { .. }
        | LocomotionEvent::GravityTick { .. } => {}
        other => info!("{other:?}"),
    });
    let mut controller = FlightController::new(cfg, sink).context("invalid controller config")?;

    let wind = WindField::default().with_zone(WindZone {
        centre: Vec3::new(0.0, 20.0, -40.0),
        radius: 15.0,
        force: Vec3::new(0.0, 6.0, 0.0),
    });
    let obstacles = ObstacleSet::new()
        .with(ObstacleShape::Plane {
            normal: Vec3::Y,
            offset: 0.0,
        })
        .with(ObstacleShape::Box {
            min: Vec3::new(-20.0, 0.0, -140.0),
            max: Vec3::new(20.0, 60.0, -130.0),
        });

    let hz = if args.hz.is_finite() && args.hz > 0.0 {
        args.hz
    } else {
        90.0
    };
    let dt = 1.0 / hz;
    let mut position = Vec3::new(0.0, 30.0, 0.0);
    let mut t = 0.0;
    let mut snapshot = controller.snapshot();
    while t < args.seconds {
        let (pose, caps) = scripted_pose(t, dt);
        let input = TickInput::new(&pose, position)
            .with_capabilities(caps)
            .with_environment(&wind)
            .with_obstacles(&obstacles);
        snapshot = controller.tick(&input);
        position = integrate_position(position, snapshot.velocity, dt);
        t += dt;
    }

    info!("final position {position:?}");
    info!(
        "final snapshot {}",
        serde_json::to_string(&snapshot).context("serialising snapshot")?
    );
    Ok(())
}
