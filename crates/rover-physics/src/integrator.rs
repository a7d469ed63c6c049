//! Fixed-step rover dynamics: steering, traction-scaled thrust, drag, lateral
//! slip, wheel spin, slope-following suspension, and rock repulsion.
//!
//! One call to [`RoverPhysics::step`] advances one sub-step and returns the
//! resulting pose and telemetry. The integrator owns its state; tuning,
//! terrain and obstacles are borrowed per step.

use std::f64::consts::TAU;

use glam::DVec3;
use rover_config::RoverTuning;
use rover_terrain::{Biome, Obstacle, terrain_limit};

use crate::input::InputState;
use crate::pose::{Pose, Telemetry};

/// Resting height of the chassis above the ground.
pub const ROVER_BASE_HEIGHT: f64 = 0.65;
/// Default ground traction.
pub const DEFAULT_TRACTION: f64 = 0.8;
/// Traction is clamped into this range before use.
pub const TRACTION_RANGE: (f64, f64) = (0.2, 1.5);

/// Extra distance kept between the rover centre and a rock's surface.
const OBSTACLE_CLEARANCE: f64 = 1.2;
/// Fraction of the penetration corrected per sub-step.
const OBSTACLE_PUSH: f64 = 0.4;
/// Velocity retained after touching a rock.
const OBSTACLE_DAMPING: f64 = 0.7;
/// Below this separation the push direction is undefined and skipped.
const OBSTACLE_MIN_DISTANCE: f64 = 0.01;
/// Exponential rate of the ride-height follow.
const GROUND_FOLLOW_RATE: f64 = 8.0;
/// Fraction of the drive speed above which steering causes slip.
const SLIP_SPEED_RATIO: f64 = 0.8;

/// Everything one sub-step reads besides the integrator's own state.
#[derive(Clone, Copy, Debug)]
pub struct StepContext<'a> {
    pub input: &'a InputState,
    pub drive_enabled: bool,
    /// Speed setting from the drive controls. Ignored while drive is off.
    pub speed: f64,
    pub traction: f64,
    pub tuning: &'a RoverTuning,
    pub biome: &'a Biome,
    pub obstacles: &'a [Obstacle],
}

/// Result of one sub-step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepOutput {
    pub pose: Pose,
    pub telemetry: Telemetry,
}

/// Full integrator state. Angles are radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoverState {
    pub position: DVec3,
    pub velocity: DVec3,
    pub heading: f64,
    /// Accumulated wheel rotation for the renderer.
    pub wheel_rotation: f64,
    pub pitch: f64,
    pub roll: f64,
    pub pitch_velocity: f64,
    pub roll_velocity: f64,
    pub slipping: bool,
    pub rpm: f64,
}

impl Default for RoverState {
    fn default() -> Self {
        Self {
            position: DVec3::new(0.0, ROVER_BASE_HEIGHT, 0.0),
            velocity: DVec3::ZERO,
            heading: 0.0,
            wheel_rotation: 0.0,
            pitch: 0.0,
            roll: 0.0,
            pitch_velocity: 0.0,
            roll_velocity: 0.0,
            slipping: false,
            rpm: 0.0,
        }
    }
}

impl RoverState {
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.heading)
    }

    pub fn telemetry(&self) -> Telemetry {
        Telemetry {
            rpm: self.rpm,
            slipping: self.slipping,
            pitch: self.pitch.to_degrees(),
            roll: self.roll.to_degrees(),
        }
    }
}

/// The vehicle integrator.
#[derive(Clone, Debug, Default)]
pub struct RoverPhysics {
    state: RoverState,
}

impl RoverPhysics {
    /// A rover parked at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: RoverState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &RoverState {
        &self.state
    }

    pub fn pose(&self) -> Pose {
        self.state.pose()
    }

    /// Puts the rover back at the origin at rest and returns that pose.
    pub fn reset(&mut self) -> Pose {
        self.state = RoverState::default();
        tracing::debug!("Rover reset");
        self.state.pose()
    }

    /// Advances the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f64, ctx: &StepContext<'_>) -> StepOutput {
        let tuning = ctx.tuning;
        let throttle = ctx.input.throttle();
        let turn = ctx.input.turn();
        let s = &mut self.state;

        if turn != 0.0 {
            let turn_scale = throttle.abs().max(tuning.min_turn_scale);
            s.heading += turn * tuning.turn_rate * dt * turn_scale;
        }

        let speed = if ctx.drive_enabled { ctx.speed } else { 0.0 };
        let traction = ctx.traction.clamp(TRACTION_RANGE.0, TRACTION_RANGE.1);
        let grip = traction.min(1.0);
        let forward = DVec3::new(libm::sin(s.heading), 0.0, -libm::cos(s.heading));

        if speed > 0.0 && throttle != 0.0 {
            s.velocity += forward * (tuning.acceleration * throttle * speed * dt * traction);
        }

        s.velocity *= libm::pow(tuning.drag + (1.0 - grip) * 0.05, dt * 60.0);

        s.slipping = turn != 0.0 && s.velocity.length() > speed * SLIP_SPEED_RATIO;
        let motion_scale = if s.slipping {
            tuning.slip_factor * (1.0 - grip * 0.5)
        } else {
            1.0
        };

        s.velocity = s.velocity.clamp_length_max(tuning.max_speed);

        let limit = terrain_limit();
        s.position += s.velocity * (motion_scale * dt);
        s.position.x = s.position.x.clamp(-limit, limit);
        s.position.z = s.position.z.clamp(-limit, limit);

        let distance = s.velocity.length() * dt;
        if distance != 0.0 {
            let along = s.velocity.dot(forward);
            let direction = if along != 0.0 {
                along.signum()
            } else if throttle != 0.0 {
                throttle.signum()
            } else {
                1.0
            };
            let wheel_delta = (distance / tuning.wheel_radius).max(tuning.min_wheel_spin * dt);
            s.wheel_rotation += direction * wheel_delta;
            s.rpm = wheel_delta / TAU * 60.0;
        }

        let ground = ctx.biome.height.sample(s.position.x, s.position.z);
        let n = ctx.biome.height.normal(s.position.x, s.position.z);
        let target_pitch = libm::atan2(n.z, n.y);
        let target_roll = -libm::atan2(n.x, n.y);
        let k = tuning.suspension.stiffness;
        let d = tuning.suspension.damping;

        s.pitch_velocity += (k * (target_pitch - s.pitch) - d * s.pitch_velocity) * dt;
        s.pitch += s.pitch_velocity * dt;
        s.roll_velocity += (k * (target_roll - s.roll) - d * s.roll_velocity) * dt;
        s.roll += s.roll_velocity * dt;

        let target_y = ground + ROVER_BASE_HEIGHT;
        s.position.y += (target_y - s.position.y) * (1.0 - libm::exp(-GROUND_FOLLOW_RATE * dt));

        resolve_obstacles(&mut s.position, &mut s.velocity, ctx.obstacles);

        StepOutput {
            pose: s.pose(),
            telemetry: s.telemetry(),
        }
    }
}

/// Pushes `position` out of every rock it overlaps, damping `velocity` once
/// per contact.
pub(crate) fn resolve_obstacles(
    position: &mut DVec3,
    velocity: &mut DVec3,
    obstacles: &[Obstacle],
) {
    for rock in obstacles {
        let offset = *position - rock.position;
        let distance = offset.length();
        let min_distance = rock.radius + OBSTACLE_CLEARANCE;
        if distance < min_distance && distance > OBSTACLE_MIN_DISTANCE {
            *position += offset / distance * ((min_distance - distance) * OBSTACLE_PUSH);
            *velocity *= OBSTACLE_DAMPING;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed_step::FIXED_DT;
    use rover_terrain::BiomeId;

    struct Rig {
        tuning: RoverTuning,
        biome: Biome,
        obstacles: Vec<Obstacle>,
        input: InputState,
        drive_enabled: bool,
        speed: f64,
        traction: f64,
    }

    impl Rig {
        fn new(biome: Biome) -> Self {
            Self {
                tuning: RoverTuning::default(),
                biome,
                obstacles: Vec::new(),
                input: InputState::default(),
                drive_enabled: true,
                speed: 4.0,
                traction: DEFAULT_TRACTION,
            }
        }

        fn ctx(&self) -> StepContext<'_> {
            StepContext {
                input: &self.input,
                drive_enabled: self.drive_enabled,
                speed: self.speed,
                traction: self.traction,
                tuning: &self.tuning,
                biome: &self.biome,
                obstacles: &self.obstacles,
            }
        }

        fn run(&self, physics: &mut RoverPhysics, seconds: f64) -> StepOutput {
            let steps = (seconds / FIXED_DT).round() as usize;
            let mut out = StepOutput {
                pose: physics.pose(),
                telemetry: physics.state().telemetry(),
            };
            for _ in 0..steps {
                out = physics.step(FIXED_DT, &self.ctx());
            }
            out
        }
    }

    fn rock(x: f64, y: f64, z: f64, radius: f64) -> Obstacle {
        Obstacle {
            position: DVec3::new(x, y, z),
            radius,
            rotation: DVec3::ZERO,
        }
    }

    fn assert_resting_on_slope(rig: &Rig, s: &RoverState) {
        let n = rig.biome.height.normal(s.position.x, s.position.z);
        let expected_pitch = libm::atan2(n.z, n.y);
        let expected_roll = -libm::atan2(n.x, n.y);
        assert!(
            (s.pitch - expected_pitch).abs() < 1e-3,
            "pitch {} vs slope {expected_pitch}",
            s.pitch
        );
        assert!(
            (s.roll - expected_roll).abs() < 1e-3,
            "roll {} vs slope {expected_roll}",
            s.roll
        );
    }

    #[test]
    fn test_idle_rover_settles_to_slope() {
        let rig = Rig::new(Biome::builtin(BiomeId::Mars));
        let mut physics = RoverPhysics::new();
        let out = rig.run(&mut physics, 5.0);
        let s = physics.state();

        assert!(s.velocity.length() < 1e-9, "velocity {:?}", s.velocity);
        assert_resting_on_slope(&rig, s);
        let ground = rig.biome.height.sample(s.position.x, s.position.z);
        assert!((s.position.y - (ground + ROVER_BASE_HEIGHT)).abs() < 1e-6);
        assert!(!out.telemetry.slipping);
        assert!((out.telemetry.pitch - s.pitch.to_degrees()).abs() < 1e-12);
    }

    #[test]
    fn test_coasting_rover_comes_to_rest() {
        let rig = Rig::new(Biome::builtin(BiomeId::Mars));
        let mut physics = RoverPhysics::from_state(RoverState {
            velocity: DVec3::new(3.0, 0.0, -8.0),
            ..Default::default()
        });
        rig.run(&mut physics, 5.0);
        let s = physics.state();

        assert!(s.velocity.length() < 1e-6, "velocity {:?}", s.velocity);
        assert!(s.position.z < -1.0 && s.position.x > 0.0, "drag let it coast first");
        assert_resting_on_slope(&rig, s);
    }

    #[test]
    fn test_forward_drive_moves_toward_negative_z() {
        let mut rig = Rig::new(Biome::flat());
        rig.input.forward = true;
        let mut physics = RoverPhysics::new();
        let out = rig.run(&mut physics, 1.0);

        assert!(out.pose.position.z < -1.0, "z = {}", out.pose.position.z);
        assert!(out.pose.position.x.abs() < 1e-9);
        assert!(out.telemetry.rpm > 0.0);
        assert!(physics.state().wheel_rotation > 0.0);
    }

    #[test]
    fn test_reverse_spins_wheels_backward() {
        let mut rig = Rig::new(Biome::flat());
        rig.input.backward = true;
        let mut physics = RoverPhysics::new();
        rig.run(&mut physics, 0.5);
        assert!(physics.pose().position.z > 0.0);
        assert!(physics.state().wheel_rotation < 0.0);
    }

    #[test]
    fn test_drive_disabled_ignores_throttle() {
        let mut rig = Rig::new(Biome::flat());
        rig.input.forward = true;
        rig.drive_enabled = false;
        let mut physics = RoverPhysics::new();
        let out = rig.run(&mut physics, 1.0);
        assert_eq!(out.pose.position.x, 0.0);
        assert_eq!(out.pose.position.z, 0.0);
        assert_eq!(out.telemetry.rpm, 0.0);
    }

    #[test]
    fn test_turn_in_place_uses_min_turn_scale() {
        let mut rig = Rig::new(Biome::flat());
        rig.input.left = true;
        let mut physics = RoverPhysics::new();
        physics.step(FIXED_DT, &rig.ctx());
        let expected = 1.4 * FIXED_DT * 0.35;
        assert!((physics.state().heading - expected).abs() < 1e-12);

        rig.input.left = false;
        rig.input.right = true;
        rig.input.forward = true;
        let before = physics.state().heading;
        physics.step(FIXED_DT, &rig.ctx());
        assert!((physics.state().heading - (before - 1.4 * FIXED_DT)).abs() < 1e-12);
    }

    #[test]
    fn test_speed_clamped_to_max() {
        let mut rig = Rig::new(Biome::flat());
        rig.input.forward = true;
        rig.speed = 100.0;
        rig.traction = 1.5;
        let mut physics = RoverPhysics::new();
        rig.run(&mut physics, 3.0);
        let v = physics.state().velocity.length();
        assert!(v <= rig.tuning.max_speed + 1e-9, "velocity {v} over cap");
    }

    #[test]
    fn test_position_clamped_to_terrain() {
        let rig = Rig::new(Biome::flat());
        let mut physics = RoverPhysics::from_state(RoverState {
            position: DVec3::new(58.9, ROVER_BASE_HEIGHT, -58.9),
            velocity: DVec3::new(12.0, 0.0, -12.0),
            ..Default::default()
        });
        rig.run(&mut physics, 0.5);
        let p = physics.pose().position;
        assert_eq!(p.x, terrain_limit());
        assert_eq!(p.z, -terrain_limit());
    }

    #[test]
    fn test_slip_when_turning_fast() {
        let mut rig = Rig::new(Biome::flat());
        rig.input.left = true;
        let start = RoverState {
            velocity: DVec3::new(0.0, 0.0, -5.0),
            ..Default::default()
        };

        let mut slipping = RoverPhysics::from_state(start);
        let out = slipping.step(FIXED_DT, &rig.ctx());
        assert!(out.telemetry.slipping);

        rig.input.left = false;
        let mut straight = RoverPhysics::from_state(start);
        let out_straight = straight.step(FIXED_DT, &rig.ctx());
        assert!(!out_straight.telemetry.slipping);

        // Slip scales this step's travel by slip_factor * (1 - 0.8 * 0.5).
        let ratio = out.pose.position.z / out_straight.pose.position.z;
        assert!((ratio - 0.35 * 0.6).abs() < 1e-9, "ratio {ratio}");
    }

    #[test]
    fn test_low_traction_lets_rover_coast_further() {
        let start = RoverState {
            velocity: DVec3::new(0.0, 0.0, -4.0),
            ..Default::default()
        };
        let mut grippy = Rig::new(Biome::flat());
        grippy.traction = 1.0;
        let mut slick = Rig::new(Biome::flat());
        slick.traction = 0.2;

        let mut a = RoverPhysics::from_state(start);
        let mut b = RoverPhysics::from_state(start);
        a.step(FIXED_DT, &grippy.ctx());
        b.step(FIXED_DT, &slick.ctx());
        assert!(b.state().velocity.length() > a.state().velocity.length());
    }

    #[test]
    fn test_obstacle_pushes_out_and_damps() {
        let mut rig = Rig::new(Biome::flat());
        let start = RoverState {
            velocity: DVec3::new(0.0, 0.0, -2.0),
            ..Default::default()
        };

        let mut free = RoverPhysics::from_state(start);
        free.step(FIXED_DT, &rig.ctx());

        rig.obstacles.push(rock(1.0, ROVER_BASE_HEIGHT, 0.0, 1.0));
        let mut blocked = RoverPhysics::from_state(start);
        blocked.step(FIXED_DT, &rig.ctx());

        let v_free = free.state().velocity;
        let v_blocked = blocked.state().velocity;
        assert!((v_blocked - v_free * 0.7).length() < 1e-12);

        // Penetration of 2.2 - 1.0 corrected by 40% along -X.
        let dx = blocked.pose().position.x - free.pose().position.x;
        assert!(dx < 0.0, "rock should push the rover away, dx = {dx}");
        assert!((dx + 0.48).abs() < 1e-3, "dx = {dx}");
    }

    #[test]
    fn test_repulsion_is_cumulative() {
        let mut position = DVec3::ZERO;
        let mut velocity = DVec3::new(1.0, 0.0, 0.0);
        let rocks = [rock(1.0, 0.0, 0.0, 1.0), rock(-1.0, 0.0, 0.5, 1.0)];
        resolve_obstacles(&mut position, &mut velocity, &rocks);
        assert!((velocity.x - 0.49).abs() < 1e-12);
    }

    #[test]
    fn test_coincident_obstacle_skipped() {
        let mut position = DVec3::new(2.0, 0.0, 2.0);
        let mut velocity = DVec3::X;
        resolve_obstacles(&mut position, &mut velocity, &[rock(2.0, 0.0, 2.0, 1.0)]);
        assert_eq!(position, DVec3::new(2.0, 0.0, 2.0));
        assert_eq!(velocity, DVec3::X);
    }

    #[test]
    fn test_reset_restores_origin() {
        let mut rig = Rig::new(Biome::builtin(BiomeId::Dunes));
        rig.input.forward = true;
        rig.input.left = true;
        let mut physics = RoverPhysics::new();
        rig.run(&mut physics, 2.0);
        assert_ne!(physics.pose(), Pose::default());

        let pose = physics.reset();
        assert_eq!(pose.position, DVec3::new(0.0, ROVER_BASE_HEIGHT, 0.0));
        assert_eq!(pose.heading, 0.0);
        assert_eq!(*physics.state(), RoverState::default());
    }

    #[test]
    fn test_deterministic_runs() {
        let mut rig = Rig::new(Biome::builtin(BiomeId::Icy));
        rig.input.forward = true;
        rig.input.right = true;
        rig.obstacles = rover_terrain::scatter_obstacles(&rig.biome, 18);
        let mut a = RoverPhysics::new();
        let mut b = RoverPhysics::new();
        assert_eq!(rig.run(&mut a, 4.0), rig.run(&mut b, 4.0));
    }
}
