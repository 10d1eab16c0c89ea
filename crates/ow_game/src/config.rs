use ow_core::controller::ControllerConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Host settings: where the assets live, where the actor spawns, how fast it moves.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HostConfig {
    pub controller: ControllerConfig,
    pub spawn_x: f32,
    pub spawn_y: f32,
    /// Collision box half extents; the reference sprite is 16x20.
    pub half_w: f32,
    pub half_h: f32,
    pub map_path: PathBuf,
    pub sheet_path: PathBuf,
    pub replay_path: PathBuf,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            controller: ControllerConfig::default(),
            spawn_x: 100.0,
            spawn_y: 100.0,
            half_w: 8.0,
            half_h: 10.0,
            map_path: PathBuf::from("assets/maps/grass_test.json"),
            sheet_path: PathBuf::from("assets/sheets/link.json"),
            replay_path: PathBuf::from("assets/replays/walkabout.json"),
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<HostConfig, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let config: HostConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse host config {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Load `path` if it exists; otherwise fall back to defaults with a warning.
pub fn load_config_or_default(path: &Path) -> Result<HostConfig, String> {
    if path.exists() {
        load_config_from_path(path)
    } else {
        log::warn!(
            "Host config '{}' was not found. Using built-in defaults.",
            path.display()
        );
        Ok(HostConfig::default())
    }
}

fn validate_config(config: &HostConfig) -> Result<(), String> {
    config.controller.validate()?;
    if config.half_w <= 0.0 || config.half_h <= 0.0 {
        return Err("Host config validation failed: half_w and half_h must be > 0".to_string());
    }
    if !config.spawn_x.is_finite() || !config.spawn_y.is_finite() {
        return Err("Host config validation failed: spawn position must be finite".to_string());
    }
    Ok(())
}
