//! Command-line argument parsing for the rover simulator.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Rover simulator command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "rover-sim", about = "Rover simulator")]
pub struct CliArgs {
    /// Biome to drive on (mars, icy, dunes).
    #[arg(long)]
    pub biome: Option<String>,

    /// Rover tuning preset (default, sporty, crawler).
    #[arg(long)]
    pub preset: Option<String>,

    /// Ground traction multiplier.
    #[arg(long)]
    pub traction: Option<f64>,

    /// Initial drive speed setting.
    #[arg(long)]
    pub speed: Option<f64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref biome) = args.biome {
            self.sim.biome = biome.clone();
        }
        if let Some(ref preset) = args.preset {
            self.sim.rover_preset = Some(preset.clone());
        }
        if let Some(traction) = args.traction {
            self.sim.traction = traction;
        }
        if let Some(speed) = args.speed {
            self.sim.default_speed = speed;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            biome: Some("dunes".to_string()),
            traction: Some(1.2),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.sim.biome, "dunes");
        assert_eq!(config.sim.traction, 1.2);
        // Non-overridden fields retain defaults
        assert_eq!(config.sim.rover_preset, None);
        assert_eq!(config.sim.default_speed, 4.0);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from(["rover-sim", "--preset", "sporty", "--speed", "6"]);
        assert_eq!(args.preset.as_deref(), Some("sporty"));
        assert_eq!(args.speed, Some(6.0));
        assert!(args.biome.is_none());
    }
}
