//! Ray/primitive intersection and nearest-hit search over the scene

use crate::ray::Ray;
use crate::scene::{CylinderShape, Scene, SphereShape};

/// Rays whose direction is this close to the cylinder axis (relative) count as parallel
const PARALLEL_EPSILON: f32 = 1e-8;

/// Primitive kind tag carried by a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Sphere,
    Cylinder,
}

/// Nearest intersection found along a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    pub kind: PrimitiveKind,
    /// Slot of the primitive within its kind
    pub index: usize,
    /// Ray parameter of the hit, in units of the (unnormalized) direction
    pub distance: f32,
}

/// Geometry that can be tested against a ray
pub trait Intersect {
    /// Smallest non-negative ray parameter at which the ray meets the surface
    fn intersect(&self, ray: &Ray) -> Option<f32>;
}

fn valid_radius(radius: f32) -> bool {
    radius > 0.0 && radius.is_finite()
}

/// Smallest non-negative root of `a t^2 + 2 half_b t + c`, filtered by `accept`
fn nearest_root(a: f32, half_b: f32, c: f32, accept: impl Fn(f32) -> bool) -> Option<f32> {
    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 || !discriminant.is_finite() {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    [(-half_b - sqrt_d) / a, (-half_b + sqrt_d) / a]
        .into_iter()
        .find(|&t| t >= 0.0 && accept(t))
}

impl Intersect for SphereShape {
    fn intersect(&self, ray: &Ray) -> Option<f32> {
        if !valid_radius(self.radius) {
            return None;
        }

        let oc = ray.origin - self.center;
        let a = ray.direction.norm_squared();
        if a <= f32::MIN_POSITIVE || !a.is_finite() {
            return None;
        }
        let half_b = oc.dot(&ray.direction);
        let c = oc.norm_squared() - self.radius * self.radius;

        nearest_root(a, half_b, c, |_| true)
    }
}

impl Intersect for CylinderShape {
    fn intersect(&self, ray: &Ray) -> Option<f32> {
        if !valid_radius(self.radius) {
            return None;
        }

        let axis = self.axis();
        let length = axis.norm();
        if !(length > f32::EPSILON) || !length.is_finite() {
            return None;
        }
        let unit_axis = axis / length;

        // Work in the plane perpendicular to the axis
        let offset = ray.origin - self.cap0;
        let direction_perp = ray.direction - unit_axis * ray.direction.dot(&unit_axis);
        let offset_perp = offset - unit_axis * offset.dot(&unit_axis);

        let a = direction_perp.norm_squared();
        if a <= PARALLEL_EPSILON * ray.direction.norm_squared() || !a.is_finite() {
            return None;
        }
        let half_b = offset_perp.dot(&direction_perp);
        let c = offset_perp.norm_squared() - self.radius * self.radius;

        nearest_root(a, half_b, c, |t| {
            let along = (offset + ray.direction * t).dot(&unit_axis);
            (0.0..=length).contains(&along)
        })
    }
}

impl Scene {
    /// Nearest hit over every primitive. Ties keep the first primitive tested.
    pub fn intersect(&self, ray: &Ray) -> Option<HitRecord> {
        let spheres = self
            .spheres()
            .enumerate()
            .filter_map(|(index, sphere)| {
                sphere.intersect(ray).map(|distance| HitRecord {
                    kind: PrimitiveKind::Sphere,
                    index,
                    distance,
                })
            });
        let cylinders = self
            .cylinders()
            .enumerate()
            .filter_map(|(index, cylinder)| {
                cylinder.intersect(ray).map(|distance| HitRecord {
                    kind: PrimitiveKind::Cylinder,
                    index,
                    distance,
                })
            });

        let mut closest: Option<HitRecord> = None;
        for hit in spheres.chain(cylinders) {
            if closest.map_or(true, |best| hit.distance < best.distance) {
                closest = Some(hit);
            }
        }
        closest
    }
}
