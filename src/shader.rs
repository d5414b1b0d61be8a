//! Resolve a ray's nearest hit into one palette color

use crate::color::{ColorRamp, ConsoleColor};
use crate::intersect::{HitRecord, PrimitiveKind};
use crate::ray::Ray;
use crate::scene::Scene;
use nalgebra::{Point3, Vector3};

/// Outward surface normal and color ramp of the primitive behind a hit
fn surface(scene: &Scene, hit: &HitRecord, point: Point3<f32>) -> Option<(Vector3<f32>, ColorRamp)> {
    match hit.kind {
        PrimitiveKind::Sphere => {
            let sphere = scene.sphere(hit.index)?;
            let ramp = scene.sphere_color(hit.index)?;
            Some((point - sphere.center, ramp))
        }
        PrimitiveKind::Cylinder => {
            let cylinder = scene.cylinder(hit.index)?;
            let ramp = scene.cylinder_color(hit.index)?;
            let axis = cylinder.axis().try_normalize(f32::EPSILON)?;
            let offset = point - cylinder.cap0;
            Some((offset - axis * offset.dot(&axis), ramp))
        }
    }
}

/// Whether the surface at `point` faces the point light nearest to it
fn faces_light(scene: &Scene, point: Point3<f32>, normal: Vector3<f32>) -> bool {
    let Some(normal) = normal.try_normalize(f32::EPSILON) else {
        return false;
    };

    scene
        .point_lights()
        .min_by(|a, b| {
            let da = (*a - point).norm_squared();
            let db = (*b - point).norm_squared();
            da.total_cmp(&db)
        })
        .is_some_and(|light| normal.dot(&(light - point)) > 0.0)
}

/// Final color for a ray: background on a miss, otherwise the light or dark tone
/// of the hit primitive depending on whether the hit point faces the light.
pub fn shade(scene: &Scene, ray: &Ray, hit: Option<HitRecord>) -> ConsoleColor {
    let Some(hit) = hit else {
        return scene.background();
    };

    let point = ray.at(hit.distance);
    match surface(scene, &hit, point) {
        Some((normal, ramp)) => ramp.pick(faces_light(scene, point, normal)),
        None => {
            tracing::warn!(kind = ?hit.kind, index = hit.index, "Hit references a missing primitive");
            scene.background()
        }
    }
}

/// Intersect and shade in one step
pub fn trace(scene: &Scene, ray: &Ray) -> ConsoleColor {
    shade(scene, ray, scene.intersect(ray))
}
