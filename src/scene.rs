//! Scene store: primitive slots indexing into shared position, radius and color arenas

use crate::color::{ColorRamp, ConsoleColor};
use crate::config::SceneConfig;
use crate::error::RenderError;
use crate::ray::{Projection, Ray};
use nalgebra::{Point3, Vector3};

/// Handle into the scene's position arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionId(u16);

/// Handle into the scene's radius arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RadiusId(u16);

/// Handle into the scene's color ramp arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorId(u16);

macro_rules! arena_id {
    ($($id:ident),*) => {$(
        impl $id {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    )*};
}

arena_id!(PositionId, RadiusId, ColorId);

/// Sphere slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sphere {
    pub center: PositionId,
    pub radius: RadiusId,
    pub color: ColorId,
}

/// Open-ended cylinder slot bounded by two cap centers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cylinder {
    pub cap0: PositionId,
    pub cap1: PositionId,
    pub radius: RadiusId,
    pub color: ColorId,
}

/// Point light slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointLight {
    pub position: PositionId,
}

/// Sphere geometry resolved from the arenas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereShape {
    pub center: Point3<f32>,
    pub radius: f32,
}

impl SphereShape {
    pub fn new(center: Point3<f32>, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Cylinder geometry resolved from the arenas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderShape {
    pub cap0: Point3<f32>,
    pub cap1: Point3<f32>,
    pub radius: f32,
}

impl CylinderShape {
    pub fn new(cap0: Point3<f32>, cap1: Point3<f32>, radius: f32) -> Self {
        Self { cap0, cap1, radius }
    }

    pub fn axis(&self) -> Vector3<f32> {
        self.cap1 - self.cap0
    }
}

/// Arena entries reachable through a `u16` handle
pub const MAX_HANDLES: usize = u16::MAX as usize + 1;

/// Slot counts for each primitive kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneLayout {
    pub spheres: usize,
    pub cylinders: usize,
    pub point_lights: usize,
}

impl SceneLayout {
    /// Layout of the built-in demo scene
    pub const DEMO: SceneLayout = SceneLayout {
        spheres: 2,
        cylinders: 2,
        point_lights: 1,
    };

    pub fn position_count(&self) -> usize {
        self.spheres
            .saturating_add(self.cylinders.saturating_mul(2))
            .saturating_add(self.point_lights)
    }

    pub fn radius_count(&self) -> usize {
        self.spheres + self.cylinders
    }

    pub fn color_count(&self) -> usize {
        self.spheres + self.cylinders
    }

    /// Every arena entry must be addressable by a `u16` handle
    pub fn check(&self) -> Result<(), RenderError> {
        let positions = self.position_count();
        if positions > MAX_HANDLES {
            return Err(RenderError::invalid(format!(
                "scene needs {} positions, at most {} are addressable",
                positions, MAX_HANDLES
            )));
        }
        Ok(())
    }
}

/// The complete scene. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    spheres: Vec<Sphere>,
    cylinders: Vec<Cylinder>,
    point_lights: Vec<PointLight>,
    positions: Vec<Point3<f32>>,
    radii: Vec<f32>,
    colors: Vec<ColorRamp>,
    background: ConsoleColor,
}

impl Default for Scene {
    fn default() -> Self {
        Self::demo()
    }
}

impl Scene {
    /// Two spheres, two cylinders and one light over a dark grey background.
    /// Nothing sits on the view axis, so the center of the image shows background.
    pub fn demo() -> Self {
        let mut builder = SceneBuilder::link(SceneLayout::DEMO);

        let slots: [Result<(), RenderError>; 5] = [
            builder.set_sphere(0, Point3::new(-3.5, 1.5, -10.0), 2.0, ConsoleColor::Red),
            builder.set_sphere(1, Point3::new(-2.0, 0.0, -6.0), 1.0, ConsoleColor::Blue),
            builder.set_cylinder(
                0,
                Point3::new(2.5, -2.0, -9.0),
                Point3::new(4.5, 2.0, -9.0),
                1.0,
                ConsoleColor::Magenta,
            ),
            builder.set_cylinder(
                1,
                Point3::new(1.5, -0.5, -5.0),
                Point3::new(2.5, 0.5, -7.0),
                1.0,
                ConsoleColor::Cyan,
            ),
            builder.set_point_light(0, Point3::new(5.0, 4.0, -1.0)),
        ];
        debug_assert!(slots.iter().all(Result::is_ok));

        builder.background(ConsoleColor::DarkGrey);
        builder.build()
    }

    /// Build a scene from its configuration section, sized to the listed primitives
    pub fn from_config(config: &SceneConfig) -> Result<Self, RenderError> {
        let mut builder = SceneBuilder::new(config.layout())?;

        for (slot, sphere) in config.spheres.iter().enumerate() {
            builder.set_sphere(slot, sphere.center.into(), sphere.radius, sphere.color)?;
        }
        for (slot, cylinder) in config.cylinders.iter().enumerate() {
            builder.set_cylinder(
                slot,
                cylinder.cap0.into(),
                cylinder.cap1.into(),
                cylinder.radius,
                cylinder.color,
            )?;
        }
        for (slot, light) in config.point_lights.iter().enumerate() {
            builder.set_point_light(slot, light.position.into())?;
        }
        builder.background(config.background);

        Ok(builder.build())
    }

    pub fn layout(&self) -> SceneLayout {
        SceneLayout {
            spheres: self.spheres.len(),
            cylinders: self.cylinders.len(),
            point_lights: self.point_lights.len(),
        }
    }

    pub fn background(&self) -> ConsoleColor {
        self.background
    }

    pub fn sphere(&self, slot: usize) -> Option<SphereShape> {
        let sphere = self.spheres.get(slot)?;
        Some(SphereShape {
            center: *self.positions.get(sphere.center.index())?,
            radius: *self.radii.get(sphere.radius.index())?,
        })
    }

    pub fn sphere_color(&self, slot: usize) -> Option<ColorRamp> {
        let sphere = self.spheres.get(slot)?;
        self.colors.get(sphere.color.index()).copied()
    }

    pub fn cylinder(&self, slot: usize) -> Option<CylinderShape> {
        let cylinder = self.cylinders.get(slot)?;
        Some(CylinderShape {
            cap0: *self.positions.get(cylinder.cap0.index())?,
            cap1: *self.positions.get(cylinder.cap1.index())?,
            radius: *self.radii.get(cylinder.radius.index())?,
        })
    }

    pub fn cylinder_color(&self, slot: usize) -> Option<ColorRamp> {
        let cylinder = self.cylinders.get(slot)?;
        self.colors.get(cylinder.color.index()).copied()
    }

    pub fn point_light(&self, slot: usize) -> Option<Point3<f32>> {
        let light = self.point_lights.get(slot)?;
        self.positions.get(light.position.index()).copied()
    }

    pub fn spheres(&self) -> impl Iterator<Item = SphereShape> + '_ {
        (0..self.spheres.len()).filter_map(move |slot| self.sphere(slot))
    }

    pub fn cylinders(&self) -> impl Iterator<Item = CylinderShape> + '_ {
        (0..self.cylinders.len()).filter_map(move |slot| self.cylinder(slot))
    }

    pub fn point_lights(&self) -> impl Iterator<Item = Point3<f32>> + '_ {
        (0..self.point_lights.len()).filter_map(move |slot| self.point_light(slot))
    }

    /// Handle slots, for callers that want the raw arena indices
    pub fn sphere_slots(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn cylinder_slots(&self) -> &[Cylinder] {
        &self.cylinders
    }

    pub fn point_light_slots(&self) -> &[PointLight] {
        &self.point_lights
    }
}

/// Links every slot to its arena entries, then takes the literal scene contents.
///
/// Handles are assigned in slot order: spheres, then cylinders (cap0 before cap1),
/// then point lights. Slots that are never set keep a zero radius and never hit.
pub struct SceneBuilder {
    layout: SceneLayout,
    scene: Scene,
}

impl SceneBuilder {
    /// Fails when the layout needs more handles than a `u16` can address
    pub fn new(layout: SceneLayout) -> Result<Self, RenderError> {
        layout.check()?;
        Ok(Self::link(layout))
    }

    /// Link slots for a layout already known to fit `MAX_HANDLES`
    fn link(layout: SceneLayout) -> Self {
        let mut next_position = 0usize;
        let mut next_radius = 0usize;
        let mut next_color = 0usize;
        // In range: every counter stays below position_count() <= MAX_HANDLES
        fn take(counter: &mut usize) -> u16 {
            let id = *counter as u16;
            *counter += 1;
            id
        }

        let spheres = (0..layout.spheres)
            .map(|_| Sphere {
                center: PositionId(take(&mut next_position)),
                radius: RadiusId(take(&mut next_radius)),
                color: ColorId(take(&mut next_color)),
            })
            .collect();
        let cylinders = (0..layout.cylinders)
            .map(|_| Cylinder {
                cap0: PositionId(take(&mut next_position)),
                cap1: PositionId(take(&mut next_position)),
                radius: RadiusId(take(&mut next_radius)),
                color: ColorId(take(&mut next_color)),
            })
            .collect();
        let point_lights = (0..layout.point_lights)
            .map(|_| PointLight {
                position: PositionId(take(&mut next_position)),
            })
            .collect();

        debug_assert_eq!(next_position, layout.position_count());
        debug_assert_eq!(next_radius, layout.radius_count());
        debug_assert_eq!(next_color, layout.color_count());

        let scene = Scene {
            spheres,
            cylinders,
            point_lights,
            positions: vec![Point3::origin(); layout.position_count()],
            radii: vec![0.0; layout.radius_count()],
            colors: vec![ColorRamp::from_base(ConsoleColor::Black); layout.color_count()],
            background: ConsoleColor::Black,
        };

        Self { layout, scene }
    }

    pub fn set_sphere(
        &mut self,
        slot: usize,
        center: Point3<f32>,
        radius: f32,
        base: ConsoleColor,
    ) -> Result<(), RenderError> {
        let sphere = *self.scene.spheres.get(slot).ok_or_else(|| {
            RenderError::invalid(format!(
                "sphere slot {} out of range (capacity {})",
                slot, self.layout.spheres
            ))
        })?;

        self.scene.positions[sphere.center.index()] = center;
        self.scene.radii[sphere.radius.index()] = radius;
        self.scene.colors[sphere.color.index()] = ColorRamp::from_base(base);
        Ok(())
    }

    pub fn set_cylinder(
        &mut self,
        slot: usize,
        cap0: Point3<f32>,
        cap1: Point3<f32>,
        radius: f32,
        base: ConsoleColor,
    ) -> Result<(), RenderError> {
        let cylinder = *self.scene.cylinders.get(slot).ok_or_else(|| {
            RenderError::invalid(format!(
                "cylinder slot {} out of range (capacity {})",
                slot, self.layout.cylinders
            ))
        })?;

        self.scene.positions[cylinder.cap0.index()] = cap0;
        self.scene.positions[cylinder.cap1.index()] = cap1;
        self.scene.radii[cylinder.radius.index()] = radius;
        self.scene.colors[cylinder.color.index()] = ColorRamp::from_base(base);
        Ok(())
    }

    pub fn set_point_light(&mut self, slot: usize, position: Point3<f32>) -> Result<(), RenderError> {
        let light = *self.scene.point_lights.get(slot).ok_or_else(|| {
            RenderError::invalid(format!(
                "point light slot {} out of range (capacity {})",
                slot, self.layout.point_lights
            ))
        })?;

        self.scene.positions[light.position.index()] = position;
        Ok(())
    }

    pub fn background(&mut self, color: ConsoleColor) {
        self.scene.background = color;
    }

    pub fn build(self) -> Scene {
        self.scene
    }
}

/// Eye point and projection mode used to generate primary rays
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Point3<f32>,
    pub projection: Projection,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Point3::origin(),
            projection: Projection::Perspective,
        }
    }
}

impl Camera {
    pub fn new(eye: Point3<f32>, projection: Projection) -> Self {
        Self { eye, projection }
    }

    /// Primary ray through a point on the view plane
    pub fn ray_through(&self, view_point: Point3<f32>) -> Ray {
        Ray::generate(self.projection, self.eye, view_point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CylinderConfig, PointLightConfig, SphereConfig};
    use std::collections::HashSet;

    #[test]
    fn test_demo_scene_creation() {
        let scene = Scene::demo();
        assert_eq!(scene.layout(), SceneLayout::DEMO);
        assert_eq!(scene.background(), ConsoleColor::DarkGrey);
        assert_eq!(scene.spheres().count(), 2);
        assert_eq!(scene.cylinders().count(), 2);
        assert_eq!(scene.point_lights().count(), 1);
    }

    #[test]
    fn test_demo_scene_contents() {
        let scene = Scene::demo();

        let sphere = scene.sphere(1).unwrap();
        assert_eq!(sphere.center, Point3::new(-2.0, 0.0, -6.0));
        assert_eq!(sphere.radius, 1.0);
        assert_eq!(
            scene.sphere_color(0).unwrap(),
            ColorRamp::new(ConsoleColor::DarkRed, ConsoleColor::Red)
        );

        let cylinder = scene.cylinder(1).unwrap();
        assert_eq!(cylinder.cap0, Point3::new(1.5, -0.5, -5.0));
        assert_eq!(cylinder.cap1, Point3::new(2.5, 0.5, -7.0));
        assert_eq!(
            scene.cylinder_color(0).unwrap(),
            ColorRamp::new(ConsoleColor::DarkMagenta, ConsoleColor::Magenta)
        );

        assert_eq!(scene.point_light(0), Some(Point3::new(5.0, 4.0, -1.0)));
    }

    #[test]
    fn test_out_of_range_slots() {
        let scene = Scene::demo();
        assert!(scene.sphere(2).is_none());
        assert!(scene.cylinder_color(5).is_none());
        assert!(scene.point_light(1).is_none());
    }

    #[test]
    fn test_handles_unique_across_kinds() {
        let scene = Scene::demo();

        let mut positions = HashSet::new();
        let mut radii = HashSet::new();
        let mut colors = HashSet::new();
        for sphere in scene.sphere_slots() {
            assert!(positions.insert(sphere.center));
            assert!(radii.insert(sphere.radius));
            assert!(colors.insert(sphere.color));
        }
        for cylinder in scene.cylinder_slots() {
            assert!(positions.insert(cylinder.cap0));
            assert!(positions.insert(cylinder.cap1));
            assert!(radii.insert(cylinder.radius));
            assert!(colors.insert(cylinder.color));
        }
        for light in scene.point_light_slots() {
            assert!(positions.insert(light.position));
        }

        let layout = scene.layout();
        assert_eq!(positions.len(), layout.position_count());
        assert_eq!(radii.len(), layout.radius_count());
        assert_eq!(colors.len(), layout.color_count());
    }

    #[test]
    fn test_link_order() {
        let scene = SceneBuilder::new(SceneLayout::DEMO).unwrap().build();
        assert_eq!(scene.sphere_slots()[1].center.index(), 1);
        assert_eq!(scene.cylinder_slots()[0].cap0.index(), 2);
        assert_eq!(scene.cylinder_slots()[0].cap1.index(), 3);
        assert_eq!(scene.cylinder_slots()[1].radius.index(), 3);
        assert_eq!(scene.point_light_slots()[0].position.index(), 6);
    }

    #[test]
    fn test_builder_rejects_unaddressable_layout() {
        let layout = SceneLayout {
            spheres: 0,
            cylinders: 33_000,
            point_lights: 1,
        };
        assert_eq!(layout.position_count(), 66_001);
        assert!(matches!(
            SceneBuilder::new(layout),
            Err(RenderError::InvalidParameter(_))
        ));

        let huge = SceneLayout {
            spheres: usize::MAX,
            cylinders: usize::MAX,
            point_lights: 1,
        };
        assert!(huge.check().is_err());
    }

    #[test]
    fn test_builder_fills_every_handle() {
        let layout = SceneLayout {
            spheres: MAX_HANDLES - 3,
            cylinders: 1,
            point_lights: 1,
        };
        assert_eq!(layout.position_count(), MAX_HANDLES);

        let scene = SceneBuilder::new(layout).unwrap().build();
        let cylinder = scene.cylinder_slots()[0];
        let light = scene.point_light_slots()[0];
        assert_eq!(cylinder.cap0.index(), MAX_HANDLES - 3);
        assert_eq!(cylinder.cap1.index(), MAX_HANDLES - 2);
        assert_eq!(light.position.index(), MAX_HANDLES - 1);
        assert_ne!(light.position, scene.sphere_slots()[0].center);
    }

    #[test]
    fn test_builder_rejects_bad_slot() {
        let mut builder = SceneBuilder::new(SceneLayout::DEMO).unwrap();
        let result = builder.set_sphere(2, Point3::origin(), 1.0, ConsoleColor::Red);
        assert!(matches!(result, Err(RenderError::InvalidParameter(_))));

        let result = builder.set_point_light(1, Point3::origin());
        assert!(matches!(result, Err(RenderError::InvalidParameter(_))));
    }

    #[test]
    fn test_unset_slots_are_degenerate() {
        let scene = SceneBuilder::new(SceneLayout::DEMO).unwrap().build();
        assert_eq!(scene.sphere(0).unwrap().radius, 0.0);
        assert_eq!(scene.background(), ConsoleColor::Black);
    }

    #[test]
    fn test_scene_from_config() {
        let config = SceneConfig {
            background: ConsoleColor::Black,
            spheres: vec![SphereConfig {
                center: [0.0, 1.0, -4.0],
                radius: 0.5,
                color: ConsoleColor::Green,
            }],
            cylinders: vec![CylinderConfig {
                cap0: [0.0, 0.0, -5.0],
                cap1: [0.0, 2.0, -5.0],
                radius: 0.25,
                color: ConsoleColor::DarkYellow,
            }],
            point_lights: vec![PointLightConfig {
                position: [1.0, 1.0, 1.0],
            }],
        };

        let scene = Scene::from_config(&config).unwrap();
        assert_eq!(scene.layout().spheres, 1);
        assert_eq!(scene.sphere(0).unwrap().center, Point3::new(0.0, 1.0, -4.0));
        assert_eq!(scene.cylinder(0).unwrap().radius, 0.25);
        assert_eq!(
            scene.cylinder_color(0).unwrap(),
            ColorRamp::new(ConsoleColor::DarkYellow, ConsoleColor::Yellow)
        );
        assert_eq!(scene.background(), ConsoleColor::Black);
    }

    #[test]
    fn test_camera_default() {
        let camera = Camera::default();
        assert_eq!(camera.eye, Point3::origin());
        assert_eq!(camera.projection, Projection::Perspective);

        let ray = camera.ray_through(Point3::new(0.5, 0.0, -3.0));
        assert_eq!(ray.direction, Vector3::new(0.5, 0.0, -3.0));
    }
}
