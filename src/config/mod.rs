mod loader;

use crate::color::ConsoleColor;
use crate::error::RenderError;
use crate::ray::Projection;
use crate::scene::{Camera, Scene, SceneLayout};
use crate::viewport::{Viewport, MAX_VIEWPORT_WIDTH};
use crate::{DEFAULT_HEIGHT, DEFAULT_VIEW_DISTANCE, DEFAULT_VIEW_HEIGHT, DEFAULT_WIDTH};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use loader::load_config;

/// Locations tried, in order, when no config path is given
pub const DEFAULT_CONFIG_PATHS: [&str; 2] = ["console-rt.yaml", "config/console-rt.yaml"];

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    /// Scene description; the built-in demo scene when absent
    #[serde(default)]
    pub scene: Option<SceneConfig>,
    #[serde(default)]
    pub render: RenderConfig,
}

/// Pixel grid and view-plane configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViewportConfig {
    /// Width in pixels; fitted to the terminal when unset
    #[serde(default)]
    pub width: Option<u16>,
    /// Height in pixels; fitted to the terminal when unset
    #[serde(default)]
    pub height: Option<u16>,
    #[serde(default = "default_view_height")]
    pub view_height: f32,
    #[serde(default = "default_distance")]
    pub distance: f32,
    /// Vertical field of view in degrees; overrides `view_height` when set
    #[serde(default)]
    pub fov_degrees: Option<f32>,
}

fn default_view_height() -> f32 {
    DEFAULT_VIEW_HEIGHT
}

fn default_distance() -> f32 {
    DEFAULT_VIEW_DISTANCE
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            view_height: default_view_height(),
            distance: default_distance(),
            fov_degrees: None,
        }
    }
}

impl ViewportConfig {
    /// Build the viewport, using the fallback size for any unset dimension
    pub fn build(&self, fallback: (u16, u16)) -> Result<Viewport, RenderError> {
        let width = self.width.unwrap_or(fallback.0);
        let height = self.height.unwrap_or(fallback.1);
        match self.fov_degrees {
            Some(fov) => Viewport::from_fov(width, height, fov, self.distance),
            None => Viewport::new(width, height, self.view_height, self.distance),
        }
    }

    /// Build with the default 48x27 size for unset dimensions
    pub fn build_default(&self) -> Result<Viewport, RenderError> {
        self.build((DEFAULT_WIDTH, DEFAULT_HEIGHT))
    }
}

/// Eye position and projection
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CameraConfig {
    #[serde(default)]
    pub eye: [f32; 3],
    #[serde(default)]
    pub projection: Projection,
}

impl CameraConfig {
    pub fn camera(&self) -> Camera {
        Camera::new(self.eye.into(), self.projection)
    }
}

/// Scene description
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneConfig {
    #[serde(default = "default_background")]
    pub background: ConsoleColor,
    #[serde(default)]
    pub spheres: Vec<SphereConfig>,
    #[serde(default)]
    pub cylinders: Vec<CylinderConfig>,
    #[serde(default)]
    pub point_lights: Vec<PointLightConfig>,
}

impl SceneConfig {
    /// Slot counts needed for the listed primitives
    pub fn layout(&self) -> SceneLayout {
        SceneLayout {
            spheres: self.spheres.len(),
            cylinders: self.cylinders.len(),
            point_lights: self.point_lights.len(),
        }
    }
}

fn default_background() -> ConsoleColor {
    ConsoleColor::DarkGrey
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SphereConfig {
    pub center: [f32; 3],
    pub radius: f32,
    /// Either tone of the hue; both ramp entries are derived from it
    pub color: ConsoleColor,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CylinderConfig {
    pub cap0: [f32; 3],
    pub cap1: [f32; 3],
    pub radius: f32,
    pub color: ConsoleColor,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PointLightConfig {
    pub position: [f32; 3],
}

/// Frame loop settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenderConfig {
    /// Stop after this many frames; unlimited when unset
    #[serde(default)]
    pub max_frames: Option<u32>,
    /// Show the prompt line under the image while waiting for input
    #[serde(default = "default_show_prompt")]
    pub show_prompt: bool,
}

fn default_show_prompt() -> bool {
    true
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_frames: None,
            show_prompt: default_show_prompt(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        load_config(path)
    }

    /// Load the given file, or the first default location that exists, or the
    /// built-in defaults when there is none
    pub fn load_or_default(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => Self::from_file(path),
            None => {
                for p in DEFAULT_CONFIG_PATHS {
                    let path = Path::new(p);
                    if path.exists() {
                        return Self::from_file(path);
                    }
                }
                tracing::debug!(
                    tried = ?DEFAULT_CONFIG_PATHS,
                    "No config file found, using built-in defaults"
                );
                Ok(Self::default())
            }
        }
    }

    /// Reject settings the renderer cannot use
    pub fn validate(&self) -> Result<(), ConfigError> {
        let viewport = &self.viewport;
        if viewport.width == Some(0) || viewport.height == Some(0) {
            return Err(ConfigError::Validation(
                "viewport width and height must be non-zero".to_string(),
            ));
        }
        if !(viewport.distance > 0.0 && viewport.distance.is_finite()) {
            return Err(ConfigError::Validation(format!(
                "viewport distance must be positive, got {}",
                viewport.distance
            )));
        }
        match viewport.fov_degrees {
            Some(fov) if !(fov > 0.0 && fov < 180.0) => {
                return Err(ConfigError::Validation(format!(
                    "fov_degrees must be in (0, 180), got {}",
                    fov
                )));
            }
            None if !(viewport.view_height > 0.0 && viewport.view_height.is_finite()) => {
                return Err(ConfigError::Validation(format!(
                    "view_height must be positive, got {}",
                    viewport.view_height
                )));
            }
            _ => {}
        }

        if let Some(width) = viewport.width {
            if width > MAX_VIEWPORT_WIDTH {
                return Err(ConfigError::Validation(format!(
                    "viewport width {} exceeds the console limit of {} pixels",
                    width, MAX_VIEWPORT_WIDTH
                )));
            }
        }

        if let Some(scene) = &self.scene {
            scene
                .layout()
                .check()
                .map_err(|e| ConfigError::Validation(e.to_string()))?;

            let radii = scene
                .spheres
                .iter()
                .map(|s| s.radius)
                .chain(scene.cylinders.iter().map(|c| c.radius));
            for radius in radii {
                if !radius.is_finite() {
                    return Err(ConfigError::Validation(format!(
                        "primitive radius must be finite, got {}",
                        radius
                    )));
                }
                if radius <= 0.0 {
                    tracing::warn!(radius, "Primitive with non-positive radius will never be hit");
                }
            }
        }

        Ok(())
    }

    /// Scene from the config, or the demo scene
    pub fn build_scene(&self) -> Result<Scene, RenderError> {
        match &self.scene {
            Some(scene) => Scene::from_config(scene),
            None => Ok(Scene::demo()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}
