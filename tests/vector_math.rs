use glam::Vec3;
use soar::safe_normalize;
use soar::vector_math::{angle_between_deg, rotate_towards};

#[test]
fn normalize_returns_zero_for_nan() {
    assert_eq!(safe_normalize(Vec3::new(f32::NAN, 1.0, 0.0)), Vec3::ZERO);
}

#[test]
fn normalize_returns_normalized_vector() {
    assert_eq!(safe_normalize(Vec3::new(3.0, 0.0, 0.0)), Vec3::X);
}

#[test]
fn angle_is_undefined_for_zero_vector() {
    assert_eq!(angle_between_deg(Vec3::ZERO, Vec3::NEG_Y), None);
}

#[test]
fn rotating_away_from_opposite_direction_stays_unit_length() {
    let turned = rotate_towards(Vec3::X, Vec3::NEG_X, 0.1);
    assert!((turned.length() - 1.0).abs() < 1e-5);
    assert!(turned.dot(Vec3::X) < 1.0);
}
