//! Camera presets and the goal transform each one asks for.

use std::fmt;
use std::str::FromStr;

use glam::DVec3;
use rover_config::CameraConfig;
use rover_physics::Pose;

/// Resting position of the `default` preset.
pub const DEFAULT_POSITION: DVec3 = DVec3::new(14.0, 9.0, 14.0);
/// Look-at point of the `default` preset.
pub const DEFAULT_TARGET: DVec3 = DVec3::new(0.0, 0.8, 0.0);
/// Horizontal nudge keeping the top-down view's up vector well defined.
pub const TOP_Z_NUDGE: f64 = 0.0001;

/// Spring frequency for `default` and `top` transitions.
pub const PRESET_SPRING_HZ: f64 = 2.5;
/// Spring frequency for `chase`.
pub const CHASE_SPRING_HZ: f64 = 3.0;
/// Horizontal lag, as a multiple of the chase offset length, before the
/// chase spring stiffens.
pub const CHASE_LAG_MAX_MULTIPLIER: f64 = 1.75;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CameraPreset {
    /// Fixed three-quarter overview.
    #[default]
    Default,
    /// Straight down from above the origin.
    Top,
    /// Trails the rover at a fixed offset.
    Chase,
}

impl CameraPreset {
    pub fn as_str(self) -> &'static str {
        match self {
            CameraPreset::Default => "default",
            CameraPreset::Top => "top",
            CameraPreset::Chase => "chase",
        }
    }

    /// Presets that fly to a fixed spot and then hand control to the user.
    pub fn is_fixed(self) -> bool {
        matches!(self, CameraPreset::Default | CameraPreset::Top)
    }

    /// Where the camera should be and look for this preset.
    pub fn goal(self, pose: &Pose, camera: &CameraConfig) -> CameraGoal {
        match self {
            CameraPreset::Default => CameraGoal {
                position: DEFAULT_POSITION,
                target: DEFAULT_TARGET,
            },
            CameraPreset::Top => CameraGoal {
                position: DVec3::new(0.0, camera.top_height, TOP_Z_NUDGE),
                target: DVec3::ZERO,
            },
            CameraPreset::Chase => CameraGoal {
                position: pose.position + DVec3::from_array(camera.chase_offset),
                target: pose.position,
            },
        }
    }
}

impl fmt::Display for CameraPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown preset name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown camera preset: {0}")]
pub struct UnknownCameraPreset(pub String);

impl FromStr for CameraPreset {
    type Err = UnknownCameraPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(CameraPreset::Default),
            "top" => Ok(CameraPreset::Top),
            "chase" => Ok(CameraPreset::Chase),
            other => Err(UnknownCameraPreset(other.to_string())),
        }
    }
}

/// Desired camera placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraGoal {
    pub position: DVec3,
    pub target: DVec3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_goals_ignore_pose() {
        let camera = CameraConfig::default();
        let pose = Pose::new(DVec3::new(20.0, 1.0, -5.0), 1.0);
        let goal = CameraPreset::Default.goal(&pose, &camera);
        assert_eq!(goal.position, DEFAULT_POSITION);
        assert_eq!(goal.target, DEFAULT_TARGET);

        let top = CameraPreset::Top.goal(&pose, &camera);
        assert_eq!(top.position, DVec3::new(0.0, 30.0, TOP_Z_NUDGE));
        assert_eq!(top.target, DVec3::ZERO);
    }

    #[test]
    fn test_chase_goal_follows_pose() {
        let camera = CameraConfig::default();
        let pose = Pose::new(DVec3::new(2.0, 1.0, -3.0), 0.0);
        let goal = CameraPreset::Chase.goal(&pose, &camera);
        assert_eq!(goal.target, pose.position);
        assert_eq!(goal.position, DVec3::new(8.0, 5.0, 5.0));
    }

    #[test]
    fn test_parse() {
        assert_eq!("chase".parse(), Ok(CameraPreset::Chase));
        assert!("orbit".parse::<CameraPreset>().is_err());
        assert!(CameraPreset::Top.is_fixed());
        assert!(!CameraPreset::Chase.is_fixed());
    }
}
