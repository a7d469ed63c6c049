//! Rover tuning bundles and the named presets shipped with the simulator.

use serde::{Deserialize, Serialize};

/// Base forward acceleration in units/s² at full throttle and speed 1.
pub const ACCELERATION: f64 = 14.0;
/// Per-60Hz-frame velocity retention factor.
pub const DRAG: f64 = 0.9;
/// Hard cap on velocity magnitude in units/s.
pub const MAX_SPEED: f64 = 12.0;
/// Movement multiplier applied while the rover is sliding sideways.
pub const SLIP_FACTOR: f64 = 0.35;
/// Heading change in radians/s at full turn input.
pub const TURN_RATE: f64 = 1.4;
/// Turn authority retained with no throttle (turning in place).
pub const TURN_MIN_SCALE: f64 = 0.35;
/// Wheel radius in world units.
pub const WHEEL_RADIUS: f64 = 0.35;
/// Minimum wheel spin in radians/s while moving.
pub const MIN_WHEEL_SPIN: f64 = 0.4;
/// Pitch/roll spring stiffness.
pub const SUSPENSION_STIFFNESS: f64 = 14.0;
/// Pitch/roll spring damping.
pub const SUSPENSION_DAMPING: f64 = 7.0;

/// Names of the built-in presets, in display order.
pub const PRESET_NAMES: [&str; 3] = ["default", "sporty", "crawler"];

/// Pitch/roll suspension coefficients.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SuspensionTuning {
    /// Spring stiffness pulling orientation toward the terrain slope.
    pub stiffness: f64,
    /// Velocity damping of the orientation spring.
    pub damping: f64,
}

impl Default for SuspensionTuning {
    fn default() -> Self {
        Self {
            stiffness: SUSPENSION_STIFFNESS,
            damping: SUSPENSION_DAMPING,
        }
    }
}

/// Full set of vehicle handling parameters.
///
/// Presets are selected wholesale. The only way to change a subset of fields
/// during a session is [`RoverTuning::apply_patch`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RoverTuning {
    pub acceleration: f64,
    pub drag: f64,
    pub max_speed: f64,
    pub slip_factor: f64,
    pub turn_rate: f64,
    pub min_turn_scale: f64,
    pub wheel_radius: f64,
    pub min_wheel_spin: f64,
    pub suspension: SuspensionTuning,
}

impl Default for RoverTuning {
    fn default() -> Self {
        Self {
            acceleration: ACCELERATION,
            drag: DRAG,
            max_speed: MAX_SPEED,
            slip_factor: SLIP_FACTOR,
            turn_rate: TURN_RATE,
            min_turn_scale: TURN_MIN_SCALE,
            wheel_radius: WHEEL_RADIUS,
            min_wheel_spin: MIN_WHEEL_SPIN,
            suspension: SuspensionTuning::default(),
        }
    }
}

impl RoverTuning {
    /// Faster, grippier handling.
    pub fn sporty() -> Self {
        Self {
            acceleration: ACCELERATION * 1.2,
            max_speed: MAX_SPEED * 1.25,
            slip_factor: SLIP_FACTOR * 1.1,
            turn_rate: TURN_RATE * 1.05,
            suspension: SuspensionTuning {
                stiffness: SUSPENSION_STIFFNESS * 1.2,
                damping: SUSPENSION_DAMPING * 1.1,
            },
            ..Self::default()
        }
    }

    /// Slow, heavily damped handling for rough ground.
    pub fn crawler() -> Self {
        Self {
            acceleration: ACCELERATION * 0.8,
            drag: DRAG * 1.02,
            max_speed: MAX_SPEED * 0.7,
            slip_factor: SLIP_FACTOR * 0.8,
            turn_rate: TURN_RATE * 0.8,
            min_turn_scale: TURN_MIN_SCALE * 0.9,
            suspension: SuspensionTuning {
                stiffness: SUSPENSION_STIFFNESS * 0.9,
                damping: SUSPENSION_DAMPING * 1.1,
            },
            ..Self::default()
        }
    }

    /// Looks up a preset by name. Returns `None` for unknown names.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default()),
            "sporty" => Some(Self::sporty()),
            "crawler" => Some(Self::crawler()),
            _ => None,
        }
    }

    /// Overwrites the fields present in `patch`, leaving the rest untouched.
    pub fn apply_patch(&mut self, patch: &RoverTuningPatch) {
        if let Some(v) = patch.acceleration {
            self.acceleration = v;
        }
        if let Some(v) = patch.drag {
            self.drag = v;
        }
        if let Some(v) = patch.max_speed {
            self.max_speed = v;
        }
        if let Some(v) = patch.slip_factor {
            self.slip_factor = v;
        }
        if let Some(v) = patch.turn_rate {
            self.turn_rate = v;
        }
        if let Some(v) = patch.min_turn_scale {
            self.min_turn_scale = v;
        }
        if let Some(v) = patch.wheel_radius {
            self.wheel_radius = v;
        }
        if let Some(v) = patch.min_wheel_spin {
            self.min_wheel_spin = v;
        }
        if let Some(v) = patch.suspension {
            self.suspension = v;
        }
    }
}

/// Partial update for [`RoverTuning`]; `None` fields are left as they are.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RoverTuningPatch {
    pub acceleration: Option<f64>,
    pub drag: Option<f64>,
    pub max_speed: Option<f64>,
    pub slip_factor: Option<f64>,
    pub turn_rate: Option<f64>,
    pub min_turn_scale: Option<f64>,
    pub wheel_radius: Option<f64>,
    pub min_wheel_spin: Option<f64>,
    pub suspension: Option<SuspensionTuning>,
}
