//! Camera rig for the rover simulator: critically damped springs, the
//! `default`/`top`/`chase` presets, and manual-override detection.

mod controller;
mod manual;
mod preset;
mod spring;

pub use controller::{
    CameraController, CameraFrame, MIN_DT, SETTLE_DISTANCE, SETTLE_SPEED,
};
pub use manual::{
    CANCEL_HOLD_MS, CANCEL_MOUSE_PX, CANCEL_TOUCH_PX, OverrideDetector, PointerKind,
};
pub use preset::{
    CHASE_LAG_MAX_MULTIPLIER, CHASE_SPRING_HZ, CameraGoal, CameraPreset, DEFAULT_POSITION,
    DEFAULT_TARGET, PRESET_SPRING_HZ, UnknownCameraPreset,
};
pub use spring::Spring;
