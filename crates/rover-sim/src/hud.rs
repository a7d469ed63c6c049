//! Rate-limited HUD readout.

use rover_physics::Telemetry;

/// Minimum interval between HUD updates, in milliseconds.
pub const HUD_REFRESH_MS: f64 = 150.0;
/// Per-frame blend factor of the FPS estimate.
pub const FPS_SMOOTHING: f64 = 0.12;
/// Frame time assumed when a frame reports no elapsed time.
const FALLBACK_FRAME_MS: f64 = 16.0;
/// FPS estimate before the first frame.
const INITIAL_FPS: f64 = 60.0;

/// What the HUD displays.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HudSnapshot {
    pub rpm: f64,
    pub slipping: bool,
    pub pitch: f64,
    pub roll: f64,
    pub fps: f64,
}

/// Smooths FPS every frame and republishes the latest telemetry at most
/// every [`HUD_REFRESH_MS`].
#[derive(Clone, Debug)]
pub struct HudThrottle {
    telemetry: Telemetry,
    fps: Option<f64>,
    last_publish_ms: f64,
    published: HudSnapshot,
}

impl HudThrottle {
    pub fn new(now_ms: f64) -> Self {
        Self {
            telemetry: Telemetry::default(),
            fps: None,
            last_publish_ms: now_ms,
            published: HudSnapshot::default(),
        }
    }

    /// Latest physics telemetry. Not published until the next refresh.
    pub fn update_telemetry(&mut self, telemetry: Telemetry) {
        self.telemetry = telemetry;
    }

    pub fn fps(&self) -> f64 {
        self.fps.unwrap_or(INITIAL_FPS)
    }

    /// Snapshot most recently published.
    pub fn published(&self) -> &HudSnapshot {
        &self.published
    }

    /// Records a frame of `frame_ms` ending at `now_ms`. Returns a new
    /// snapshot when the refresh interval has passed and something changed.
    pub fn frame(&mut self, now_ms: f64, frame_ms: f64) -> Option<HudSnapshot> {
        let frame_ms = if frame_ms > 0.0 { frame_ms } else { FALLBACK_FRAME_MS };
        let current = self.fps();
        let fps = current + (1000.0 / frame_ms - current) * FPS_SMOOTHING;
        self.fps = Some(fps.max(1.0));

        if now_ms - self.last_publish_ms < HUD_REFRESH_MS {
            return None;
        }
        self.last_publish_ms = now_ms;

        let next = HudSnapshot {
            rpm: self.telemetry.rpm,
            slipping: self.telemetry.slipping,
            pitch: self.telemetry.pitch,
            roll: self.telemetry.roll,
            fps: self.fps(),
        };
        if next == self.published {
            return None;
        }
        self.published = next;
        Some(next)
    }
}
