//! Spring-driven camera rig.
//!
//! Fixed presets (`default`, `top`) fly the camera to a spot and lock user
//! orbit/pan until the flight settles. Sustained user input during the
//! flight cancels it and leaves the camera where it is. `chase` follows the
//! rover every frame and cannot be cancelled.

use glam::DVec3;
use rover_config::CameraConfig;
use rover_physics::{InputState, Pose};

use crate::manual::{OverrideDetector, PointerKind};
use crate::preset::{
    CHASE_LAG_MAX_MULTIPLIER, CHASE_SPRING_HZ, CameraGoal, CameraPreset, DEFAULT_POSITION,
    DEFAULT_TARGET, PRESET_SPRING_HZ,
};
use crate::spring::Spring;

/// Frame deltas are floored to this (seconds).
pub const MIN_DT: f64 = 0.001;
/// Position/target error below which a preset flight counts as arrived.
pub const SETTLE_DISTANCE: f64 = 0.02;
/// Spring speed below which a preset flight counts as arrived.
pub const SETTLE_SPEED: f64 = 0.01;

/// Camera output for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraFrame {
    pub position: DVec3,
    pub target: DVec3,
    /// User orbit/pan must be disabled while set.
    pub controls_locked: bool,
    pub manual_override: bool,
}

#[derive(Clone, Debug)]
pub struct CameraController {
    preset: CameraPreset,
    position: Spring,
    target: Spring,
    manual_override: bool,
    transitioning: bool,
    locked: bool,
    detector: OverrideDetector,
}

impl CameraController {
    /// Camera parked at the default preset.
    pub fn new() -> Self {
        Self {
            preset: CameraPreset::Default,
            position: Spring::new(DEFAULT_POSITION),
            target: Spring::new(DEFAULT_TARGET),
            manual_override: false,
            transitioning: false,
            locked: false,
            detector: OverrideDetector::new(),
        }
    }

    pub fn preset(&self) -> CameraPreset {
        self.preset
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn manual_override(&self) -> bool {
        self.manual_override
    }

    /// Selects a preset, clearing any manual override and starting a fresh
    /// flight.
    pub fn set_preset(&mut self, preset: CameraPreset) {
        self.preset = preset;
        self.manual_override = false;
        self.transitioning = preset.is_fixed();
        self.position.stop();
        self.target.stop();
        self.locked = false;
        self.detector.reset_hold();
        tracing::debug!(%preset, "Camera preset selected");
    }

    /// Moves the camera directly, e.g. from user orbit controls.
    pub fn place(&mut self, position: DVec3, target: DVec3) {
        self.position = Spring::new(position);
        self.target = Spring::new(target);
    }

    pub fn pointer_down(&mut self, x: f64, y: f64, kind: PointerKind, now_ms: f64) {
        self.detector.pointer_down(x, y, kind, now_ms);
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.detector.pointer_move(x, y);
    }

    pub fn pointer_up(&mut self) {
        self.detector.pointer_up();
    }

    /// Advances the rig by `delta` seconds toward the active preset's goal.
    pub fn update(
        &mut self,
        delta: f64,
        pose: &Pose,
        camera: &CameraConfig,
        input: &InputState,
        now_ms: f64,
    ) -> CameraFrame {
        let dt = delta.max(MIN_DT);
        let fixed = self.preset.is_fixed();
        let chase = self.preset == CameraPreset::Chase;
        let goal = self.preset.goal(pose, camera);

        self.check_override(dt * 1000.0, input, now_ms);
        self.locked = fixed && !self.manual_override && self.transitioning;

        if chase || (fixed && !self.manual_override) {
            let hz = if chase {
                self.chase_frequency(&goal, camera)
            } else {
                PRESET_SPRING_HZ
            };
            self.target.step(goal.target, dt, hz);
            self.position.step(goal.position, dt, hz);

            if fixed
                && self.transitioning
                && self.position.is_settled(goal.position, SETTLE_DISTANCE, SETTLE_SPEED)
                && self.target.is_settled(goal.target, SETTLE_DISTANCE, SETTLE_SPEED)
            {
                self.transitioning = false;
                self.locked = false;
                tracing::debug!(preset = %self.preset, "Camera settled");
            }
        }

        self.frame()
    }

    pub fn frame(&self) -> CameraFrame {
        CameraFrame {
            position: self.position.value,
            target: self.target.value,
            controls_locked: self.locked,
            manual_override: self.manual_override,
        }
    }

    fn check_override(&mut self, dt_ms: f64, input: &InputState, now_ms: f64) {
        if !self.preset.is_fixed() || self.manual_override {
            return;
        }
        if self.detector.update(dt_ms, input, now_ms) {
            self.manual_override = true;
            self.transitioning = false;
            self.locked = false;
            tracing::debug!(preset = %self.preset, "Camera preset cancelled by user input");
        }
    }

    /// Chase spring frequency, stiffened up to 2x when the camera trails too
    /// far behind horizontally.
    fn chase_frequency(&self, goal: &CameraGoal, camera: &CameraConfig) -> f64 {
        let follow = DVec3::from_array(camera.chase_offset).length();
        let max_lag = follow * CHASE_LAG_MAX_MULTIPLIER;
        let mut gap = self.position.value - goal.position;
        gap.y = 0.0;
        let lag = gap.length();
        if follow > 0.0 && lag > max_lag {
            let excess = ((lag - max_lag) / max_lag).min(1.0);
            CHASE_SPRING_HZ * (1.0 + excess)
        } else {
            CHASE_SPRING_HZ
        }
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 60.0;

    fn idle() -> InputState {
        InputState::default()
    }

    fn run(
        camera: &mut CameraController,
        frames: usize,
        pose: &Pose,
        input: &InputState,
    ) -> CameraFrame {
        let config = CameraConfig::default();
        let mut frame = camera.frame();
        for i in 0..frames {
            frame = camera.update(DT, pose, &config, input, i as f64 * DT * 1000.0);
        }
        frame
    }

    #[test]
    fn test_top_preset_locks_then_settles() {
        let mut camera = CameraController::new();
        camera.set_preset(CameraPreset::Top);
        let pose = Pose::default();

        let first = run(&mut camera, 1, &pose, &idle());
        assert!(first.controls_locked);
        assert!(camera.is_transitioning());

        let settled = run(&mut camera, 600, &pose, &idle());
        assert!(!settled.controls_locked);
        assert!(!camera.is_transitioning());
        assert!((settled.position - DVec3::new(0.0, 30.0, 0.0001)).length() < SETTLE_DISTANCE);
        assert!(settled.target.length() < SETTLE_DISTANCE);
    }

    #[test]
    fn test_held_keys_cancel_fixed_preset() {
        let mut camera = CameraController::new();
        camera.set_preset(CameraPreset::Top);
        let pose = Pose::default();
        let keys = InputState {
            left: true,
            ..Default::default()
        };

        run(&mut camera, 5, &pose, &keys);
        assert!(!camera.manual_override(), "83 ms of keys is not enough");
        let frame = run(&mut camera, 10, &pose, &keys);
        assert!(camera.manual_override());
        assert!(!frame.controls_locked);

        // Overridden camera stays put.
        let before = camera.frame();
        let after = run(&mut camera, 30, &pose, &idle());
        assert_eq!(before.position, after.position);
        assert!(camera.manual_override(), "override persists until a new preset");

        camera.set_preset(CameraPreset::Default);
        assert!(!camera.manual_override());
        assert!(camera.is_transitioning());
    }

    #[test]
    fn test_drag_cancels_fixed_preset() {
        let mut camera = CameraController::new();
        camera.set_preset(CameraPreset::Top);
        let config = CameraConfig::default();
        let pose = Pose::default();
        camera.pointer_down(0.0, 0.0, PointerKind::Mouse, 0.0);
        camera.pointer_move(40.0, 0.0);
        camera.update(DT, &pose, &config, &idle(), 100.0);
        assert!(!camera.manual_override());
        camera.update(DT, &pose, &config, &idle(), 250.0);
        assert!(camera.manual_override());
    }

    #[test]
    fn test_chase_ignores_override_and_follows() {
        let mut camera = CameraController::new();
        camera.set_preset(CameraPreset::Chase);
        let keys = InputState {
            forward: true,
            ..Default::default()
        };
        let pose = Pose::new(DVec3::new(10.0, 1.0, -10.0), 0.0);

        let frame = run(&mut camera, 600, &pose, &keys);
        assert!(!camera.manual_override());
        assert!(!frame.controls_locked);
        assert!((frame.target - pose.position).length() < 1e-3);
        assert!((frame.position - DVec3::new(16.0, 5.0, -2.0)).length() < 1e-3);
    }

    #[test]
    fn test_chase_stiffens_when_lagging() {
        let config = CameraConfig::default();
        let camera = CameraController::new();
        let near = CameraGoal {
            position: DEFAULT_POSITION,
            target: DVec3::ZERO,
        };
        assert_eq!(camera.chase_frequency(&near, &config), CHASE_SPRING_HZ);

        let far = CameraGoal {
            position: DEFAULT_POSITION + DVec3::new(100.0, 0.0, 0.0),
            target: DVec3::ZERO,
        };
        assert_eq!(camera.chase_frequency(&far, &config), CHASE_SPRING_HZ * 2.0);

        // Vertical distance alone never counts as lag.
        let above = CameraGoal {
            position: DEFAULT_POSITION + DVec3::new(0.0, 100.0, 0.0),
            target: DVec3::ZERO,
        };
        assert_eq!(camera.chase_frequency(&above, &config), CHASE_SPRING_HZ);
    }

    #[test]
    fn test_zero_delta_still_advances() {
        let mut camera = CameraController::new();
        camera.set_preset(CameraPreset::Top);
        let before = camera.frame().position;
        camera.update(0.0, &Pose::default(), &CameraConfig::default(), &idle(), 0.0);
        assert_ne!(camera.frame().position, before);
    }
}
