//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tuning::RoverTuning;

/// File name of the persisted configuration inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ron";

/// Top-level simulator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Session settings: biome, preset, traction, speed.
    pub sim: SimConfig,
    /// Active rover handling parameters.
    pub rover: RoverTuning,
    /// Camera offsets.
    pub camera: CameraConfig,
    /// Minimap zoom bounds.
    pub minimap: MinimapConfig,
    /// Replay persistence and playback cadence.
    pub replay: ReplayConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Session-level simulation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Biome identifier (`mars`, `icy`, `dunes`).
    pub biome: String,
    /// Rover tuning preset name. When set, replaces the `rover` section on
    /// startup; `None` keeps the tuning as written.
    pub rover_preset: Option<String>,
    /// Ground traction multiplier, clamped to `[0.2, 1.5]` by the integrator.
    pub traction: f64,
    /// Initial speed setting for the drive controls.
    pub default_speed: f64,
}

/// Camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Offset of the chase camera from the rover, in world units.
    pub chase_offset: [f64; 3],
    /// Height of the top-down preset camera.
    pub top_height: f64,
}

/// Minimap configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MinimapConfig {
    /// Zoom level on startup.
    pub default_zoom: f64,
    /// Inclusive `(min, max)` zoom bounds.
    pub zoom_range: (f64, f64),
}

/// Replay configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReplayConfig {
    /// Key the recorded sample sequence is stored under.
    pub storage_key: String,
    /// File name offered for exported replays.
    pub export_file_name: String,
    /// Interval between playback ticks in milliseconds.
    pub tick_interval_ms: f64,
    /// Directory for persisted replays. `None` uses the platform data dir.
    pub data_dir: Option<PathBuf>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            biome: "mars".to_string(),
            rover_preset: None,
            traction: 0.8,
            default_speed: 4.0,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            chase_offset: [6.0, 4.0, 8.0],
            top_height: 30.0,
        }
    }
}

impl Default for MinimapConfig {
    fn default() -> Self {
        Self {
            default_zoom: 12.0,
            zoom_range: (8.0, 20.0),
        }
    }
}

impl MinimapConfig {
    /// Clamp a requested zoom level to the configured range.
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.zoom_range.0, self.zoom_range.1)
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            storage_key: "rover-replay".to_string(),
            export_file_name: "rover-replay.json".to_string(),
            tick_interval_ms: 50.0,
            data_dir: None,
        }
    }
}

impl ReplayConfig {
    /// Directory replays are persisted to: the configured one, else
    /// `<platform data dir>/rover-sim/replays`.
    pub fn resolve_data_dir(&self) -> Option<PathBuf> {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("rover-sim").join("replays")))
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Platform config directory for the simulator (`<config dir>/rover-sim`).
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|d| d.join("rover-sim"))
        .ok_or(ConfigError::NoConfigDir)
}

// --- Load / Save / Reload ---

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl Config {
    /// Loads `config.ron` from `config_dir`, writing the defaults there first
    /// if the file does not exist yet.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Wrote default rover config to {}", path.display());
            return Ok(config);
        }
        let config = read_config(&path)?;
        log::info!("Loaded rover config from {}", path.display());
        Ok(config)
    }

    /// Writes `config.ron` into `config_dir`, creating the directory.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let path = config_dir.join(CONFIG_FILE_NAME);
        let write_err = |source| ConfigError::Write {
            path: path.clone(),
            source,
        };
        std::fs::create_dir_all(config_dir).map_err(write_err)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized = ron::ser::to_string_pretty(self, pretty)?;
        std::fs::write(&path, serialized).map_err(write_err)
    }

    /// Re-reads `config.ron`. Returns the new config only if it differs from
    /// `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = read_config(&config_dir.join(CONFIG_FILE_NAME))?;
        if fresh == *self {
            return Ok(None);
        }
        log::info!("Rover config changed on disk");
        Ok(Some(fresh))
    }

    /// Resolves `sim.rover_preset`, if any, into `rover`.
    ///
    /// Unknown preset names keep the current tuning and are reported.
    pub fn apply_rover_preset(&mut self) {
        let Some(name) = self.sim.rover_preset.as_deref() else {
            return;
        };
        match RoverTuning::preset(name) {
            Some(tuning) => self.rover = tuning,
            None => log::warn!("Unknown rover preset '{name}', keeping current tuning"),
        }
    }
}
