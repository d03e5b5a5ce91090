use crate::geometry::DEFAULT_OBSTACLE_MARGIN;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";
pub const DEFAULT_CELL_SIZE: f64 = 1.0;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub app: AppSection,
    pub logging: LoggingSection,
    #[serde(default)]
    pub grid: Option<GridSection>,
    #[serde(default)]
    pub waypoints: Option<WaypointsSection>,
    #[serde(default)]
    pub floor: Option<FloorSection>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GridSection {
    /// Cell edge length in meters (default: 1.0)
    pub cell_size: Option<f64>,
    /// Outward padding applied to obstacles in meters (default: 0.1)
    pub obstacle_margin: Option<f64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WaypointsSection {
    /// Fail when a floor yields no waypoints (default: false)
    pub strict: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FloorSection {
    /// Directory holding the floor's `*.txt` trace files
    pub trace_dir: Option<PathBuf>,
    /// GeoJSON with the floor outline followed by obstacle footprints
    pub geojson_path: Option<PathBuf>,
    /// `floor_info.json` with the floor size in meters
    pub floor_info_path: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

pub fn load_default() -> Result<Config, ConfigError> {
    load_from_path(DEFAULT_CONFIG_PATH)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

fn non_empty(path: Option<&PathBuf>) -> Option<&Path> {
    let path = path?.as_path();
    if path.as_os_str().is_empty() {
        None
    } else {
        Some(path)
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cell_size = self.cell_size();
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "grid.cell_size must be positive, got {cell_size}"
            )));
        }
        let margin = self.obstacle_margin();
        if !(margin.is_finite() && margin >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "grid.obstacle_margin must be non-negative, got {margin}"
            )));
        }
        Ok(())
    }

    /// Returns the grid cell size in meters (default: 1.0)
    pub fn cell_size(&self) -> f64 {
        self.grid
            .as_ref()
            .and_then(|g| g.cell_size)
            .unwrap_or(DEFAULT_CELL_SIZE)
    }

    /// Returns the obstacle margin in meters (default: 0.1)
    pub fn obstacle_margin(&self) -> f64 {
        self.grid
            .as_ref()
            .and_then(|g| g.obstacle_margin)
            .unwrap_or(DEFAULT_OBSTACLE_MARGIN)
    }

    pub fn strict_waypoints(&self) -> bool {
        self.waypoints
            .as_ref()
            .and_then(|w| w.strict)
            .unwrap_or(false)
    }

    pub fn trace_dir(&self) -> Option<&Path> {
        non_empty(self.floor.as_ref()?.trace_dir.as_ref())
    }

    pub fn geojson_path(&self) -> Option<&Path> {
        non_empty(self.floor.as_ref()?.geojson_path.as_ref())
    }

    pub fn floor_info_path(&self) -> Option<&Path> {
        non_empty(self.floor.as_ref()?.floor_info_path.as_ref())
    }
}
