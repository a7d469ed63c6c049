//! Deterministic rover vehicle simulation.
//!
//! [`FixedStepper`] turns variable frame deltas into 90 Hz sub-steps,
//! [`RoverPhysics`] integrates one sub-step at a time, and [`PoseEmitter`]
//! decides which resulting poses are worth reporting outward.

mod fixed_step;
mod input;
mod integrator;
mod pose;

pub use fixed_step::{FIXED_DT, FixedStepper, MAX_DELTA, MAX_STEPS};
pub use input::InputState;
pub use integrator::{
    DEFAULT_TRACTION, ROVER_BASE_HEIGHT, RoverPhysics, RoverState, StepContext, StepOutput,
    TRACTION_RANGE,
};
pub use pose::{
    HEADING_EPSILON, POSE_EMIT_HZ, POSITION_EPSILON, Pose, PoseEmitter, Telemetry, should_emit,
};
