//! Ambient directional forces such as wind and updrafts.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Something that pushes the avatar depending on where it is.
///
/// Returned vectors are accelerations in m/s². Implementations may return
/// garbage; the controller filters non-finite results to zero.
pub trait EnvironmentField {
    /// Ambient acceleration at `position`, zero when nothing applies.
    fn query_force(&self, position: Vec3) -> Vec3;
}

/// Empty environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoField;

impl EnvironmentField for NoField {
    fn query_force(&self, _position: Vec3) -> Vec3 {
        Vec3::ZERO
    }
}

/// The same acceleration everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UniformField(pub Vec3);

impl EnvironmentField for UniformField {
    fn query_force(&self, _position: Vec3) -> Vec3 {
        self.0
    }
}

/// Spherical volume of wind whose strength falls off linearly to its edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindZone {
    /// Centre of the zone.
    pub centre: Vec3,
    /// Radius of the zone.
    pub radius: f32,
    /// Acceleration at the centre.
    pub force: Vec3,
}

impl WindZone {
    /// Acceleration contributed at `position`.
    #[must_use]
    pub fn force_at(&self, position: Vec3) -> Vec3 {
        if self.radius <= 0.0 {
            return Vec3::ZERO;
        }
        let distance = position.distance(self.centre);
        if distance >= self.radius {
            return Vec3::ZERO;
        }
        self.force * (1.0 - distance / self.radius)
    }
}

/// Sum of any number of wind zones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindField {
    /// Zones in the field.
    pub zones: Vec<WindZone>,
}

impl WindField {
    /// Adds a zone.
    #[must_use]
    pub fn with_zone(mut self, zone: WindZone) -> Self {
        self.zones.push(zone);
        self
    }
}

impl EnvironmentField for WindField {
    fn query_force(&self, position: Vec3) -> Vec3 {
        self.zones.iter().map(|z| z.force_at(position)).sum()
    }
}

impl<T: EnvironmentField + ?Sized> EnvironmentField for &T {
    fn query_force(&self, position: Vec3) -> Vec3 {
        (**self).query_force(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn updraft() -> WindZone {
        WindZone {
            centre: Vec3::ZERO,
            radius: 10.0,
            force: Vec3::new(0.0, 8.0, 0.0),
        }
    }

    #[rstest]
    #[case::centre(Vec3::ZERO, 8.0)]
    #[case::halfway(Vec3::new(5.0, 0.0, 0.0), 4.0)]
    #[case::outside(Vec3::new(0.0, 0.0, 11.0), 0.0)]
    fn zone_falloff(#[case] at: Vec3, #[case] expected_up: f32) {
        assert_relative_eq!(updraft().force_at(at).y, expected_up, epsilon = 1e-5);
    }

    #[rstest]
    fn field_sums_overlapping_zones() {
        let field = WindField::default().with_zone(updraft()).with_zone(updraft());
        assert_relative_eq!(field.query_force(Vec3::ZERO).y, 16.0);
    }
}
