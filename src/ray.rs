//! Primary ray generation

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// How view-plane points become rays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    /// Rays fan out from the eye through the view plane
    #[default]
    Perspective,
    /// Parallel rays start on the view plane, offset from the eye
    Orthographic,
}

/// A ray in view space. The direction is not normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self { origin, direction }
    }

    /// Build the ray for a view-plane point
    pub fn generate(projection: Projection, eye: Point3<f32>, view_point: Point3<f32>) -> Self {
        match projection {
            Projection::Perspective => Self::new(eye, view_point - eye),
            Projection::Orthographic => Self::new(
                eye + view_point.coords,
                Vector3::new(0.0, 0.0, view_point.z),
            ),
        }
    }

    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Point3::origin(), Vector3::new(1.0, 0.0, 0.0));
        assert!((ray.at(5.0).x - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_perspective_ray() {
        let eye = Point3::new(0.0, 1.0, 0.0);
        let view_point = Point3::new(0.5, -0.5, -3.0);
        let ray = Ray::generate(Projection::Perspective, eye, view_point);

        assert_eq!(ray.origin, eye);
        assert_eq!(ray.direction, Vector3::new(0.5, -1.5, -3.0));
        // Direction keeps its length; it reaches the view plane at t = 1
        assert_eq!(ray.at(1.0), view_point);
    }

    #[test]
    fn test_orthographic_ray() {
        let eye = Point3::new(1.0, 0.0, 0.0);
        let a = Ray::generate(Projection::Orthographic, eye, Point3::new(0.5, 0.25, -3.0));
        let b = Ray::generate(Projection::Orthographic, eye, Point3::new(-0.5, 0.75, -3.0));

        assert_eq!(a.origin, Point3::new(1.5, 0.25, -3.0));
        assert_eq!(a.direction, Vector3::new(0.0, 0.0, -3.0));
        // Same direction for every pixel
        assert_eq!(a.direction, b.direction);
    }

    #[test]
    fn test_projection_serde() {
        let mode: Projection = serde_json::from_str("\"orthographic\"").unwrap();
        assert_eq!(mode, Projection::Orthographic);
        assert_eq!(Projection::default(), Projection::Perspective);
    }
}
