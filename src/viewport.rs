//! Mapping from console pixels to points on the view plane

use crate::error::RenderError;
use crate::COLUMNS_PER_PIXEL;
use nalgebra::Point3;

/// Widest viewport whose pixels still fit in `u16` console columns
pub const MAX_VIEWPORT_WIDTH: u16 = u16::MAX / COLUMNS_PER_PIXEL;

/// Pixel grid and the view-plane rectangle it covers
///
/// The eye looks down -z; the view plane sits at `z = -distance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: u16,
    height: u16,
    aspect_ratio: f32,
    inv_width: f32,
    inv_height: f32,
    view_width: f32,
    view_height: f32,
    distance: f32,
}

impl Viewport {
    /// Viewport from the view-plane height; the width follows the pixel aspect ratio
    pub fn new(width: u16, height: u16, view_height: f32, distance: f32) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::invalid(format!(
                "viewport dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        if width > MAX_VIEWPORT_WIDTH {
            return Err(RenderError::invalid(format!(
                "viewport width {} exceeds the console limit of {} pixels",
                width, MAX_VIEWPORT_WIDTH
            )));
        }
        if !(view_height > 0.0 && view_height.is_finite()) {
            return Err(RenderError::invalid(format!(
                "view height must be positive, got {}",
                view_height
            )));
        }
        if !(distance > 0.0 && distance.is_finite()) {
            return Err(RenderError::invalid(format!(
                "view distance must be positive, got {}",
                distance
            )));
        }

        let aspect_ratio = width as f32 / height as f32;
        Ok(Self {
            width,
            height,
            aspect_ratio,
            inv_width: 1.0 / width as f32,
            inv_height: 1.0 / height as f32,
            view_width: aspect_ratio * view_height,
            view_height,
            distance,
        })
    }

    /// Viewport from a vertical field of view in degrees
    pub fn from_fov(width: u16, height: u16, fov_degrees: f32, distance: f32) -> Result<Self, RenderError> {
        if !(fov_degrees > 0.0 && fov_degrees < 180.0) {
            return Err(RenderError::invalid(format!(
                "field of view must be in (0, 180) degrees, got {}",
                fov_degrees
            )));
        }
        let view_height = 2.0 * distance * (fov_degrees.to_radians() / 2.0).tan();
        Self::new(width, height, view_height, distance)
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn view_width(&self) -> f32 {
        self.view_width
    }

    pub fn view_height(&self) -> f32 {
        self.view_height
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Vertical field of view implied by view height and distance
    pub fn fov_degrees(&self) -> f32 {
        (2.0 * (self.view_height / (2.0 * self.distance)).atan()).to_degrees()
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// View-plane point for pixel `(x, y)`; row 0 is the top of the image
    pub fn project(&self, x: u16, y: u16) -> Result<Point3<f32>, RenderError> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::invalid("viewport is not initialized"));
        }
        if x >= self.width || y >= self.height {
            return Err(RenderError::invalid(format!(
                "pixel ({}, {}) outside {}x{} viewport",
                x, y, self.width, self.height
            )));
        }

        let u = x as f32 * self.inv_width;
        let v = 1.0 - y as f32 * self.inv_height;

        let ndc_x = 2.0 * u - 1.0;
        let ndc_y = 2.0 * v - 1.0;

        Ok(Point3::new(
            ndc_x * self.view_width * 0.5,
            ndc_y * self.view_height * 0.5,
            -self.distance,
        ))
    }
}
