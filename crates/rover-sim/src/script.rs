//! Scripted inputs for headless runs.

use clap::ValueEnum;
use rover_physics::InputState;

/// Seconds per lobe of the figure-eight.
pub const FIGURE8_HALF_PERIOD: f64 = 4.0;

/// Canned steering patterns, always with the throttle held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DrivePattern {
    #[default]
    Circle,
    Figure8,
    Straight,
}

impl DrivePattern {
    /// Keys held `t` seconds into the run.
    pub fn input_at(self, t: f64) -> InputState {
        let (left, right) = match self {
            DrivePattern::Straight => (false, false),
            DrivePattern::Circle => (true, false),
            DrivePattern::Figure8 => {
                let lobe = (t / FIGURE8_HALF_PERIOD).floor() as i64;
                if lobe.rem_euclid(2) == 0 {
                    (true, false)
                } else {
                    (false, true)
                }
            }
        };
        InputState {
            forward: true,
            backward: false,
            left,
            right,
        }
    }
}
