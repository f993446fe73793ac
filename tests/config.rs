//! Loading configuration documents from disk.

use rstest::rstest;
use soar::{ConfigError, FlightController, LocomotionConfig, NullSink};
use std::fs;
use std::path::PathBuf;

fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("soar-{}-{name}.json", std::process::id()));
    fs::write(&path, contents).expect("write scratch config");
    path
}

#[rstest]
fn partial_document_overlays_defaults() {
    let path = scratch_file(
        "partial",
        r#"{ "governor": { "max_speed": 30.0 }, "bounce": { "duration": 0.6 } }"#,
    );
    let cfg = LocomotionConfig::load(&path).expect("valid document");
    fs::remove_file(&path).expect("remove scratch config");

    let defaults = LocomotionConfig::default();
    assert!((cfg.governor.max_speed - 30.0).abs() < f32::EPSILON);
    assert!((cfg.bounce.duration - 0.6).abs() < f32::EPSILON);
    assert_eq!(cfg.glide, defaults.glide);
    assert_eq!(cfg.flap, defaults.flap);
}

#[rstest]
fn missing_file_is_an_io_error() {
    let path = std::env::temp_dir().join("soar-definitely-missing.json");
    assert!(matches!(
        LocomotionConfig::load(path),
        Err(ConfigError::Io(_))
    ));
}

#[rstest]
#[case::not_json("glide: fast")]
#[case::wrong_type(r#"{ "glide": { "enter_spread": "wide" } }"#)]
fn malformed_document_is_a_parse_error(#[case] text: &str) {
    assert!(matches!(
        LocomotionConfig::from_json_str(text),
        Err(ConfigError::Parse(_))
    ));
}

#[rstest]
#[case::inverted_band(r#"{ "glide": { "enter_spread": 10.0 } }"#)]
#[case::drag_above_one(r#"{ "bounce": { "drag": 1.5 } }"#)]
#[case::hover_above_ceiling(r#"{ "hover": { "max_speed": 40.0 } }"#)]
#[case::negative_flap(r#"{ "flap": { "strength": -1.0 } }"#)]
fn invalid_values_are_rejected_at_startup(#[case] text: &str) {
    assert!(LocomotionConfig::from_json_str(text).is_err());
}

#[rstest]
fn controller_refuses_invalid_config() {
    let mut cfg = LocomotionConfig::default();
    cfg.governor.max_speed = 0.0;
    let err = FlightController::new(cfg, NullSink).expect_err("zero ceiling is invalid");
    assert!(err.to_string().contains("governor.max_speed"), "{err}");
}

#[rstest]
fn defaults_round_trip_through_json() {
    let cfg = LocomotionConfig::default();
    let text = serde_json::to_string(&cfg).expect("serialise config");
    let back = LocomotionConfig::from_json_str(&text).expect("parse config");
    assert_eq!(back, cfg);
}
