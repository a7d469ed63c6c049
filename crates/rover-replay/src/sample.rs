//! Recorded pose samples and ghost interpolation between them.

use rover_physics::Pose;
use serde::{Deserialize, Serialize};

use crate::error::ReplayError;

/// Shortest interval used as the interpolation denominator, in ms.
const MIN_SEGMENT_MS: f64 = 1.0;

/// A pose stamped with milliseconds since the recording started.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseSample {
    pub time: f64,
    pub pose: Pose,
}

/// Time of the last sample, or 0 when empty.
pub fn duration_of(samples: &[PoseSample]) -> f64 {
    samples.last().map_or(0.0, |s| s.time)
}

/// Interpolated pose at `time` ms, or `None` without samples.
///
/// Times are clamped into `[0, duration]`; at or past the end the last pose
/// is returned verbatim. Heading follows the shortest arc between samples.
pub fn ghost_pose_at(samples: &[PoseSample], time: f64) -> Option<Pose> {
    let last = samples.last()?;
    let duration = last.time;
    let t = time.max(0.0).min(duration);
    if t >= duration || samples.len() == 1 {
        return Some(last.pose);
    }

    // First sample at or after `t`; ties resolve to the earliest.
    let next_index = samples.partition_point(|s| s.time < t).max(1);
    let prev = &samples[next_index - 1];
    let next = &samples[next_index];

    let alpha = (t - prev.time) / (next.time - prev.time).max(MIN_SEGMENT_MS);
    let position = prev.pose.position.lerp(next.pose.position, alpha);
    let heading = prev.pose.heading + wrap_angle(next.pose.heading - prev.pose.heading) * alpha;
    Some(Pose::new(position, heading))
}

/// Maps an angle difference into `(-π, π]`.
pub fn wrap_angle(delta: f64) -> f64 {
    libm::atan2(libm::sin(delta), libm::cos(delta))
}

/// Checks that a sample sequence is a valid recording: finite times, the
/// first at or after zero, never decreasing.
pub fn validate(samples: &[PoseSample]) -> Result<(), ReplayError> {
    let mut previous = 0.0;
    for (index, sample) in samples.iter().enumerate() {
        if !sample.time.is_finite() {
            return Err(ReplayError::InvalidTime { index });
        }
        if index == 0 && sample.time < 0.0 {
            return Err(ReplayError::NegativeStart(sample.time));
        }
        if index > 0 && sample.time < previous {
            return Err(ReplayError::OutOfOrder {
                index,
                time: sample.time,
                previous,
            });
        }
        previous = sample.time;
    }
    Ok(())
}
