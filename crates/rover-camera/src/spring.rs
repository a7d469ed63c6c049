//! Critically damped spring used for all camera motion.

use std::f64::consts::TAU;

use glam::DVec3;

/// A point pulled toward a moving goal without overshoot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Spring {
    pub value: DVec3,
    pub velocity: DVec3,
}

impl Spring {
    pub fn new(value: DVec3) -> Self {
        Self {
            value,
            velocity: DVec3::ZERO,
        }
    }

    /// One explicit-Euler step of `a = ω²(goal - x) - 2ωv` with `ω = 2π·hz`.
    pub fn step(&mut self, goal: DVec3, dt: f64, hz: f64) {
        let w = TAU * hz;
        let accel = (goal - self.value) * (w * w) - self.velocity * (2.0 * w);
        self.velocity += accel * dt;
        self.value += self.velocity * dt;
    }

    /// Whether the spring sits within `max_error` of `goal` and moves slower
    /// than `max_speed`.
    pub fn is_settled(&self, goal: DVec3, max_error: f64, max_speed: f64) -> bool {
        self.value.distance(goal) < max_error && self.velocity.length() < max_speed
    }

    pub fn stop(&mut self) {
        self.velocity = DVec3::ZERO;
    }
}
