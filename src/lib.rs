//! Console Raytracer
//!
//! This library ray traces a small scene of spheres, open cylinders and a point
//! light, and draws the result to a terminal using colored character cells as pixels.

pub mod color;
pub mod config;
pub mod error;
pub mod intersect;
pub mod ray;
pub mod renderer;
pub mod scene;
pub mod shader;
pub mod terminal;
pub mod viewport;

pub use color::{ColorRamp, ConsoleColor};
pub use config::AppConfig;
pub use error::{RenderError, Status};
pub use renderer::FrameDriver;
pub use scene::Scene;
pub use terminal::{Canvas, FrameBuffer, TerminalDisplay};
pub use viewport::Viewport;

/// Console columns used to draw one pixel (cells are roughly twice as tall as wide)
pub const COLUMNS_PER_PIXEL: u16 = 2;

/// Default viewport size in pixels
pub const DEFAULT_WIDTH: u16 = 48;
pub const DEFAULT_HEIGHT: u16 = 27;

/// Default view-plane height and eye distance
pub const DEFAULT_VIEW_HEIGHT: f32 = 2.0;
pub const DEFAULT_VIEW_DISTANCE: f32 = 3.0;
