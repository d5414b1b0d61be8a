use std::path::Path;

use super::{AppConfig, ConfigError};

/// Parse a YAML config file. Sections missing from the file take their defaults;
/// call `AppConfig::validate` before use.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }

    let yaml = std::fs::read_to_string(path)?;
    let config = serde_yaml::from_str::<AppConfig>(&yaml)?;
    tracing::debug!(
        path = %path.display(),
        custom_scene = config.scene.is_some(),
        "Loaded configuration"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ConsoleColor;
    use crate::ray::Projection;

    #[test]
    fn test_load_missing_config() {
        let result = load_config("/nonexistent/console-rt.yaml");
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_config_invalid_yaml() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let temp_file = temp_dir.path().join("invalid.yaml");
        std::fs::write(&temp_file, "viewport: [width: 3").unwrap();

        let result = load_config(&temp_file);
        assert!(matches!(result.unwrap_err(), ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_config_valid() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let temp_file = temp_dir.path().join("console-rt.yaml");

        let config_content = r#"
viewport:
  width: 64
  height: 32
  view_height: 2.5
  distance: 4.0

camera:
  eye: [0.0, 0.5, 0.0]
  projection: orthographic

scene:
  background: black
  spheres:
    - center: [0.0, 0.0, -6.0]
      radius: 1.5
      color: green
  cylinders:
    - cap0: [1.0, -1.0, -7.0]
      cap1: [1.0, 1.0, -7.0]
      radius: 0.5
      color: dark_yellow
  point_lights:
    - position: [3.0, 3.0, 0.0]

render:
  max_frames: 2
  show_prompt: false
"#;
        std::fs::write(&temp_file, config_content).unwrap();

        let config = load_config(&temp_file).unwrap();
        assert_eq!(config.viewport.width, Some(64));
        assert_eq!(config.viewport.height, Some(32));
        assert_eq!(config.viewport.view_height, 2.5);
        assert_eq!(config.camera.projection, Projection::Orthographic);
        assert_eq!(config.render.max_frames, Some(2));
        assert!(!config.render.show_prompt);

        let scene = config.scene.as_ref().unwrap();
        assert_eq!(scene.background, ConsoleColor::Black);
        assert_eq!(scene.spheres.len(), 1);
        assert_eq!(scene.cylinders[0].color, ConsoleColor::DarkYellow);
        assert_eq!(scene.point_lights[0].position, [3.0, 3.0, 0.0]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_config_minimal() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let temp_file = temp_dir.path().join("minimal.yaml");
        std::fs::write(&temp_file, "viewport:\n  width: 10\n").unwrap();

        let config = load_config(&temp_file).unwrap();
        assert_eq!(config.viewport.width, Some(10));
        assert_eq!(config.viewport.distance, 3.0);
        assert!(config.scene.is_none());
        assert!(config.render.max_frames.is_none());
    }

    #[test]
    fn test_scene_section_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let temp_file = temp_dir.path().join("empty_scene.yaml");
        std::fs::write(&temp_file, "scene:\n  spheres: []\n").unwrap();

        let config = load_config(&temp_file).unwrap();
        let scene = config.build_scene().unwrap();
        assert_eq!(scene.background(), ConsoleColor::DarkGrey);
        assert_eq!(scene.spheres().count(), 0);
    }

    #[test]
    fn test_example_config_matches_demo() {
        let config: AppConfig =
            serde_yaml::from_str(include_str!("../../console-rt.example.yaml")).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.build_scene().unwrap(), crate::scene::Scene::demo());
        assert!(config.viewport.width.is_none());
    }

    #[test]
    fn test_config_from_file() {
        let result = AppConfig::from_file("/nonexistent/path.yaml");
        assert!(result.is_err());
    }
}
