//! Configuration system for the rover simulator.
//!
//! Provides runtime-configurable settings that persist to disk as RON files,
//! the rover tuning presets, and an observable settings store. Supports CLI
//! overrides via clap and hot-reload detection.

mod cli;
mod config;
mod error;
mod settings;
pub mod tuning;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE_NAME, CameraConfig, Config, DebugConfig, MinimapConfig, ReplayConfig, SimConfig,
    default_config_dir,
};
pub use error::ConfigError;
pub use settings::{Settings, SettingsStore, SubscriptionId};
pub use tuning::{RoverTuning, RoverTuningPatch, SuspensionTuning};
