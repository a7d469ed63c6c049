//! Fixed-timestep accumulator driving the vehicle integrator.
//!
//! Frame deltas are capped and accumulated; the simulation runs in whole
//! `FIXED_DT` sub-steps. When a frame hits the sub-step cap the leftover time
//! is dropped rather than carried, so a stalled frame never snowballs.

/// Physics sub-step: 90 Hz.
pub const FIXED_DT: f64 = 1.0 / 90.0;

/// Maximum sub-steps run for a single frame.
pub const MAX_STEPS: u32 = 8;

/// Frame deltas above this are clamped before accumulation.
pub const MAX_DELTA: f64 = 0.05;

/// Accumulates frame time and hands out fixed sub-steps.
#[derive(Clone, Debug)]
pub struct FixedStepper {
    fixed_dt: f64,
    max_steps: u32,
    max_delta: f64,
    accumulator: f64,
    total_steps: u64,
}

impl FixedStepper {
    pub fn new() -> Self {
        Self::with_limits(FIXED_DT, MAX_STEPS, MAX_DELTA)
    }

    pub fn with_limits(fixed_dt: f64, max_steps: u32, max_delta: f64) -> Self {
        Self {
            fixed_dt,
            max_steps,
            max_delta,
            accumulator: 0.0,
            total_steps: 0,
        }
    }

    /// Feeds one frame delta (seconds) and calls `step_fn(fixed_dt)` for each
    /// sub-step due. Returns the number of sub-steps run.
    pub fn advance(&mut self, frame_delta: f64, mut step_fn: impl FnMut(f64)) -> u32 {
        // Non-finite deltas would poison the accumulator for good.
        let delta = if frame_delta.is_finite() {
            frame_delta.clamp(0.0, self.max_delta)
        } else {
            0.0
        };
        self.accumulator += delta;

        let mut steps = 0;
        while self.accumulator >= self.fixed_dt && steps < self.max_steps {
            step_fn(self.fixed_dt);
            self.accumulator -= self.fixed_dt;
            steps += 1;
        }

        if steps == self.max_steps {
            tracing::debug!(
                dropped_ms = self.accumulator * 1000.0,
                "Sub-step cap reached, dropping accumulated time"
            );
            self.accumulator = 0.0;
        }

        self.total_steps += u64::from(steps);
        steps
    }

    /// Unsimulated time carried into the next frame.
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    pub fn fixed_dt(&self) -> f64 {
        self.fixed_dt
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Drops any carried time.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

impl Default for FixedStepper {
    fn default() -> Self {
        Self::new()
    }
}
