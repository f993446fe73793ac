//! Forward obstacle probing and bounce impulses.
//!
//! The probe is a swept sphere cast along the direction of travel. Hits that
//! the avatar is flying into, rather than grazing, produce an impulse along
//! the surface normal that deliberately overshoots a physical reflection.

use glam::Vec3;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::BounceConfig;
use crate::constants::{DIRECTION_EPSILON, REFERENCE_TICK_HZ};
use crate::vector_math::{safe_normalize, sanitize_vec};

/// Where a probe met an obstacle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeHit {
    /// Contact point on the obstacle surface.
    pub point: Vec3,
    /// Unit surface normal pointing out of the obstacle.
    pub normal: Vec3,
    /// Distance travelled along the probe direction before contact.
    pub distance: f32,
}

/// Swept-sphere query against world geometry.
pub trait ObstacleProbe {
    /// Casts a sphere of `radius` from `origin` along unit `direction` for at
    /// most `max_distance`, considering only obstacles in `layer_mask`.
    fn cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        radius: f32,
        max_distance: f32,
        layer_mask: u32,
    ) -> Option<ProbeHit>;
}

/// World with nothing to hit.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObstacles;

impl ObstacleProbe for NoObstacles {
    fn cast(&self, _: Vec3, _: Vec3, _: f32, _: f32, _: u32) -> Option<ProbeHit> {
        None
    }
}

impl<T: ObstacleProbe + ?Sized> ObstacleProbe for &T {
    fn cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        radius: f32,
        max_distance: f32,
        layer_mask: u32,
    ) -> Option<ProbeHit> {
        (**self).cast(origin, direction, radius, max_distance, layer_mask)
    }
}

/// Geometry of a single obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleShape {
    /// Solid sphere.
    Sphere {
        /// Centre.
        centre: Vec3,
        /// Radius.
        radius: f32,
    },
    /// Half-space bounded by `normal · x = offset`; `normal` points into free space.
    Plane {
        /// Outward normal.
        normal: Vec3,
        /// Plane offset along the normal.
        offset: f32,
    },
    /// Axis-aligned box.
    Box {
        /// Minimum corner.
        min: Vec3,
        /// Maximum corner.
        max: Vec3,
    },
}

/// An obstacle with its collision layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Geometry.
    pub shape: ObstacleShape,
    /// Layers this obstacle belongs to.
    pub layers: u32,
}

/// Flat list of obstacles answering probes by brute force.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSet {
    obstacles: Vec<Obstacle>,
}

impl ObstacleSet {
    /// Empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `shape` on every layer.
    #[must_use]
    pub fn with(self, shape: ObstacleShape) -> Self {
        self.with_layers(shape, u32::MAX)
    }

    /// Adds `shape` on `layers`.
    #[must_use]
    pub fn with_layers(mut self, shape: ObstacleShape, layers: u32) -> Self {
        self.obstacles.push(Obstacle { shape, layers });
        self
    }

    /// Number of obstacles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

impl ObstacleProbe for ObstacleSet {
    fn cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        radius: f32,
        max_distance: f32,
        layer_mask: u32,
    ) -> Option<ProbeHit> {
        let direction = safe_normalize(direction);
        if direction == Vec3::ZERO || !origin.is_finite() {
            return None;
        }
        let radius = radius.max(0.0);
        self.obstacles
            .iter()
            .filter(|o| o.layers & layer_mask != 0)
            .filter_map(|o| cast_shape(&o.shape, origin, direction, radius, max_distance))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

fn cast_shape(
    shape: &ObstacleShape,
    origin: Vec3,
    direction: Vec3,
    radius: f32,
    max_distance: f32,
) -> Option<ProbeHit> {
    match *shape {
        ObstacleShape::Sphere {
            centre,
            radius: solid,
        } => cast_sphere(centre, solid, origin, direction, radius, max_distance),
        ObstacleShape::Plane { normal, offset } => {
            cast_plane(normal, offset, origin, direction, radius, max_distance)
        }
        ObstacleShape::Box { min, max } => {
            cast_box(min, max, origin, direction, radius, max_distance)
        }
    }
}

fn cast_sphere(
    centre: Vec3,
    solid: f32,
    origin: Vec3,
    direction: Vec3,
    radius: f32,
    max_distance: f32,
) -> Option<ProbeHit> {
    let reach = solid.max(0.0) + radius;
    let m = origin - centre;
    let b = m.dot(direction);
    let c = m.length_squared() - reach * reach;
    if c > 0.0 && b > 0.0 {
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let distance = (-b - discriminant.sqrt()).max(0.0);
    if distance > max_distance {
        return None;
    }
    let swept_centre = origin + direction * distance;
    let normal = safe_normalize(swept_centre - centre);
    let normal = if normal == Vec3::ZERO { -direction } else { normal };
    Some(ProbeHit {
        point: centre + normal * solid.max(0.0),
        normal,
        distance,
    })
}

fn cast_plane(
    normal: Vec3,
    offset: f32,
    origin: Vec3,
    direction: Vec3,
    radius: f32,
    max_distance: f32,
) -> Option<ProbeHit> {
    let normal = safe_normalize(normal);
    let approach = direction.dot(normal);
    if normal == Vec3::ZERO || approach >= -DIRECTION_EPSILON {
        return None;
    }
    let clearance = normal.dot(origin) - offset - radius;
    let distance = (clearance / -approach).max(0.0);
    if distance > max_distance {
        return None;
    }
    Some(ProbeHit {
        point: origin + direction * distance - normal * radius,
        normal,
        distance,
    })
}

fn cast_box(
    min: Vec3,
    max: Vec3,
    origin: Vec3,
    direction: Vec3,
    radius: f32,
    max_distance: f32,
) -> Option<ProbeHit> {
    // Minkowski-inflated box; rounded corners are approximated as square.
    let lo = min.min(max) - Vec3::splat(radius);
    let hi = min.max(max) + Vec3::splat(radius);

    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut enter_normal = Vec3::ZERO;
    for axis in Vec3::AXES {
        let o = origin.dot(axis);
        let d = direction.dot(axis);
        if d.abs() < DIRECTION_EPSILON {
            if o < lo.dot(axis) || o > hi.dot(axis) {
                return None;
            }
            continue;
        }
        let t1 = (lo.dot(axis) - o) / d;
        let t2 = (hi.dot(axis) - o) / d;
        let (near, far) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
        if near > t_enter {
            t_enter = near;
            enter_normal = -axis * d.signum();
        }
        t_exit = t_exit.min(far);
    }
    if t_enter > t_exit || t_exit < 0.0 {
        return None;
    }
    let distance = t_enter.max(0.0);
    if distance > max_distance || enter_normal == Vec3::ZERO {
        return None;
    }
    let swept_centre = origin + direction * distance;
    Some(ProbeHit {
        point: swept_centre - enter_normal * radius,
        normal: enter_normal,
        distance,
    })
}

/// Impulse produced by an accepted impact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BounceImpulse {
    /// Velocity change to add.
    pub delta_v: Vec3,
    /// Surface normal at the impact.
    pub normal: Vec3,
    /// Speed at impact.
    pub speed: f32,
}

/// Turns probe hits into bounce impulses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleResponder {
    cfg: BounceConfig,
}

impl ObstacleResponder {
    /// Responder with the given tuning.
    #[must_use]
    pub const fn new(cfg: BounceConfig) -> Self {
        Self { cfg }
    }

    /// Tuning in use.
    #[must_use]
    pub const fn config(&self) -> &BounceConfig {
        &self.cfg
    }

    /// Blend factor for an impact at `speed`, rising with speed up to the cap.
    #[must_use]
    pub fn bounce_blend(&self, speed: f32) -> f32 {
        (self.cfg.base_blend + speed.max(0.0) * self.cfg.blend_per_speed).min(self.cfg.max_blend)
    }

    /// Probe length for a given speed.
    #[must_use]
    pub fn probe_distance(&self, speed: f32) -> f32 {
        (speed * self.cfg.lookahead).max(self.cfg.min_probe_distance)
    }

    /// Velocity factor retained over `dt` seconds of bounce lock.
    #[must_use]
    pub fn drag_factor(&self, dt: f32) -> f32 {
        self.cfg.drag.powf(dt.max(0.0) * REFERENCE_TICK_HZ)
    }

    /// Probes ahead of `origin` along `velocity` and returns an impulse when
    /// the avatar is flying into something.
    pub fn probe(
        &self,
        probe: &dyn ObstacleProbe,
        origin: Vec3,
        velocity: Vec3,
    ) -> Option<BounceImpulse> {
        let velocity = sanitize_vec(velocity);
        let travel = safe_normalize(velocity);
        if travel == Vec3::ZERO {
            return None;
        }
        let speed = velocity.length();
        let hit = probe.cast(
            origin,
            travel,
            self.cfg.probe_radius,
            self.probe_distance(speed),
            self.cfg.layer_mask,
        )?;
        let normal = safe_normalize(hit.normal);
        let alignment = travel.dot(-normal);
        if normal == Vec3::ZERO || alignment <= self.cfg.min_alignment {
            return None;
        }
        let blend = self.bounce_blend(speed);
        debug!(
            "impact at {:?} dist {:.2} speed {speed:.2} alignment {alignment:.2} blend {blend:.2}",
            hit.point, hit.distance
        );
        Some(BounceImpulse {
            delta_v: normal * speed * blend,
            normal,
            speed,
        })
    }
}
