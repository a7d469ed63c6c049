//! Rover pose, telemetry, and the rate/delta filter for outward pose updates.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Pose updates are forced at least this often (Hz).
pub const POSE_EMIT_HZ: f64 = 15.0;
/// Summed per-axis movement that counts as a change.
pub const POSITION_EPSILON: f64 = 0.01;
/// Heading change (radians) that counts as a change.
pub const HEADING_EPSILON: f64 = 0.005;

/// Position plus heading. Heading 0 faces -Z; positive turns toward +X.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: DVec3,
    pub heading: f64,
}

impl Pose {
    pub fn new(position: DVec3, heading: f64) -> Self {
        Self { position, heading }
    }

    /// Unit vector the rover faces on the ground plane.
    pub fn forward(&self) -> DVec3 {
        DVec3::new(libm::sin(self.heading), 0.0, -libm::cos(self.heading))
    }
}

/// Per-step readout for the HUD. Angles are in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    pub rpm: f64,
    pub slipping: bool,
    pub pitch: f64,
    pub roll: f64,
}

/// Whether `next` differs enough from the last emitted `current`, or enough
/// time (`elapsed`, seconds) has passed, to report it.
pub fn should_emit(current: &Pose, next: &Pose, elapsed: f64) -> bool {
    let delta = (next.position - current.position).abs();
    let position_delta = delta.x + delta.y + delta.z;
    let heading_delta = (next.heading - current.heading).abs();

    let moved = position_delta > POSITION_EPSILON || heading_delta > HEADING_EPSILON;
    moved || elapsed >= 1.0 / POSE_EMIT_HZ
}

/// Applies [`should_emit`] to a stream of sub-step poses.
#[derive(Clone, Debug)]
pub struct PoseEmitter {
    last: Pose,
    elapsed: f64,
}

impl PoseEmitter {
    pub fn new(initial: Pose) -> Self {
        Self {
            last: initial,
            elapsed: 0.0,
        }
    }

    /// Offers the pose produced by a sub-step of length `dt`. Returns it when
    /// it should be reported.
    pub fn offer(&mut self, pose: Pose, dt: f64) -> Option<Pose> {
        self.elapsed += dt;
        if should_emit(&self.last, &pose, self.elapsed) {
            self.last = pose;
            self.elapsed = 0.0;
            Some(pose)
        } else {
            None
        }
    }

    /// Re-primes the filter after the rover was teleported.
    pub fn reset(&mut self, pose: Pose) {
        self.last = pose;
        self.elapsed = 0.0;
    }

    pub fn last_emitted(&self) -> &Pose {
        &self.last
    }
}
