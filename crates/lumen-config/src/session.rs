//! Per-session state persisted between runs.
//!
//! Captures what the user was looking at when they quit: background color,
//! overlay visibility, and the camera pose. Loaded at startup and saved at
//! shutdown as `session.ron`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// State saved at shutdown and restored at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionState {
    /// Background clear color, linear RGB.
    pub clear_color: [f32; 3],
    /// Whether the overlay panel is visible (releases mouse capture).
    pub overlay_enabled: bool,
    /// Camera position in world space.
    pub camera_position: [f32; 3],
    /// Camera front (look) vector.
    pub camera_front: [f32; 3],
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0],
            overlay_enabled: false,
            camera_position: [0.0, 0.0, 3.0],
            camera_front: [0.0, 0.0, -1.0],
        }
    }
}

impl SessionState {
    /// Load session state from the given directory. A missing or unreadable
    /// file yields the default state; a present-but-corrupt file is an error
    /// so the user's saved pose is never silently discarded.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join("session.ron");
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let state: SessionState = ron::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        log::info!("Restored session from {}", path.display());
        Ok(state)
    }

    /// Save session state to `session.ron` in the given directory.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;
        let path = config_dir.join("session.ron");
        let serialized = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new())
            .map_err(|source| ConfigError::Serialize {
                what: "session state",
                source,
            })?;
        std::fs::write(&path, serialized).map_err(|source| ConfigError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera_pose() {
        let state = SessionState::default();
        assert_eq!(state.camera_position, [0.0, 0.0, 3.0]);
        assert_eq!(state.camera_front, [0.0, 0.0, -1.0]);
        assert!(!state.overlay_enabled);
    }

    #[test]
    fn test_missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let state = SessionState::load(dir.path()).unwrap();
        assert_eq!(state, SessionState::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let state = SessionState {
            clear_color: [0.1, 0.2, 0.3],
            overlay_enabled: true,
            camera_position: [12.0, 180.0, -40.0],
            camera_front: [0.0, -0.5, -0.866],
        };
        state.save(dir.path()).unwrap();
        let loaded = SessionState::load(dir.path()).unwrap();
        assert_eq!(state, loaded);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("session.ron"), "not ron at all {{{").unwrap();
        assert!(SessionState::load(dir.path()).is_err());
    }
}
