//! Record/playback state machine for ghost replays.
//!
//! The engine records timestamped poses while `Recording`, persists them
//! through a [`ReplayStore`] when recording stops, and while `Playing` moves a
//! playhead along the recording so a ghost pose can be sampled at any time.
//! Storage failures are logged and never surface to the caller.

use rover_physics::Pose;

use crate::clock::Clock;
use crate::error::ReplayError;
use crate::sample::{PoseSample, duration_of, ghost_pose_at, validate};
use crate::store::{MemoryStore, ReplayStore};

/// Default key recordings are persisted under.
pub const DEFAULT_STORAGE_KEY: &str = "rover-replay";
/// File name offered for exports.
pub const EXPORT_FILE_NAME: &str = "rover-replay.json";

/// What the engine is doing. Recording and playing are mutually exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReplayMode {
    #[default]
    Idle,
    Recording,
    Playing,
}

/// Observable replay state. Times are milliseconds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReplayState {
    pub mode: ReplayMode,
    pub samples: Vec<PoseSample>,
    /// Clock time the recording began, or the playback origin while playing.
    pub started_at: f64,
    pub playhead: f64,
    pub duration: f64,
}

impl ReplayState {
    pub fn is_recording(&self) -> bool {
        self.mode == ReplayMode::Recording
    }

    pub fn is_playing(&self) -> bool {
        self.mode == ReplayMode::Playing
    }
}

/// Result of [`ReplayEngine::tick`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlaybackTick {
    /// Not playing; nothing happened.
    Idle,
    /// Playhead moved to the given time.
    Advanced(f64),
    /// Playhead reached the end and playback stopped.
    Finished,
}

/// Records, persists, and plays back pose streams.
pub struct ReplayEngine {
    state: ReplayState,
    clock: Box<dyn Clock>,
    store: Box<dyn ReplayStore>,
    storage_key: String,
}

impl ReplayEngine {
    pub fn new(
        clock: Box<dyn Clock>,
        store: Box<dyn ReplayStore>,
        storage_key: impl Into<String>,
    ) -> Self {
        Self {
            state: ReplayState::default(),
            clock,
            store,
            storage_key: storage_key.into(),
        }
    }

    /// Engine backed by a process-local store under the default key.
    pub fn in_memory(clock: Box<dyn Clock>) -> Self {
        Self::new(clock, Box::new(MemoryStore::new()), DEFAULT_STORAGE_KEY)
    }

    pub fn state(&self) -> &ReplayState {
        &self.state
    }

    pub fn samples(&self) -> &[PoseSample] {
        &self.state.samples
    }

    pub fn store(&self) -> &dyn ReplayStore {
        self.store.as_ref()
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Clears the buffer and starts a new recording.
    pub fn start_recording(&mut self) {
        self.state = ReplayState {
            mode: ReplayMode::Recording,
            samples: Vec::new(),
            started_at: self.clock.now_ms(),
            playhead: 0.0,
            duration: 0.0,
        };
        tracing::info!("Replay recording started");
    }

    /// Appends `pose` stamped with the time since recording began. Ignored
    /// unless recording.
    pub fn record_pose(&mut self, pose: Pose) {
        if !self.state.is_recording() {
            return;
        }
        let elapsed = (self.clock.now_ms() - self.state.started_at).max(0.0);
        // Keep times non-decreasing even if the clock is rewound.
        let time = elapsed.max(self.state.duration);
        self.state.samples.push(PoseSample { time, pose });
        self.state.duration = time;
    }

    /// Ends the recording and persists it when non-empty. Ignored unless
    /// recording.
    pub fn stop_recording(&mut self) {
        if !self.state.is_recording() {
            return;
        }
        let duration = duration_of(&self.state.samples);
        self.state.mode = ReplayMode::Idle;
        self.state.playhead = duration;
        self.state.duration = duration;

        tracing::info!(
            samples = self.state.samples.len(),
            duration_ms = duration,
            "Replay recording stopped"
        );

        if !self.state.samples.is_empty() {
            self.persist();
        }
    }

    /// Starts playback from the current playhead, loading the persisted
    /// recording when the buffer is empty. Does nothing if there is still
    /// nothing to play.
    pub fn start_playback(&mut self) {
        if self.state.samples.is_empty() {
            self.state.samples = self.load_persisted();
        }
        if self.state.samples.is_empty() {
            tracing::debug!("No replay to play");
            return;
        }
        let now = self.clock.now_ms();
        self.state.duration = duration_of(&self.state.samples);
        self.state.mode = ReplayMode::Playing;
        self.state.started_at = now - self.state.playhead;
        tracing::info!(
            playhead_ms = self.state.playhead,
            duration_ms = self.state.duration,
            "Replay playback started"
        );
    }

    pub fn stop_playback(&mut self) {
        if self.state.is_playing() {
            self.state.mode = ReplayMode::Idle;
        }
        self.state.playhead = self.state.playhead.clamp(0.0, self.state.duration);
    }

    /// Moves the playhead, clamped into `[0, duration]`.
    pub fn seek(&mut self, time: f64) {
        let playhead = time.clamp(0.0, self.state.duration);
        self.state.playhead = playhead;
        if self.state.is_playing() {
            self.state.started_at = self.clock.now_ms() - playhead;
        }
    }

    /// Advances the playhead to the current clock time.
    pub fn tick(&mut self) -> PlaybackTick {
        if !self.state.is_playing() {
            return PlaybackTick::Idle;
        }
        let elapsed = self.clock.now_ms() - self.state.started_at;
        if elapsed >= self.state.duration {
            self.state.playhead = self.state.duration;
            self.state.mode = ReplayMode::Idle;
            tracing::info!("Replay playback finished");
            PlaybackTick::Finished
        } else {
            self.state.playhead = elapsed;
            PlaybackTick::Advanced(elapsed)
        }
    }

    /// Ghost pose at the current playhead.
    pub fn ghost_pose(&self) -> Option<Pose> {
        ghost_pose_at(&self.state.samples, self.state.playhead)
    }

    /// Ghost pose at an arbitrary time in ms.
    pub fn ghost_pose_at(&self, time: f64) -> Option<Pose> {
        ghost_pose_at(&self.state.samples, time)
    }

    /// Pretty-printed JSON of the buffer, or of the persisted recording when
    /// the buffer is empty.
    pub fn export_replay(&self) -> Result<String, ReplayError> {
        if self.state.samples.is_empty() {
            let persisted = self.load_persisted();
            Ok(serde_json::to_string_pretty(&persisted)?)
        } else {
            Ok(serde_json::to_string_pretty(&self.state.samples)?)
        }
    }

    /// Replaces the buffer with an exported recording. Stops any recording or
    /// playback and rewinds the playhead. Returns the sample count.
    pub fn import_replay(&mut self, text: &str) -> Result<usize, ReplayError> {
        let samples: Vec<PoseSample> = serde_json::from_str(text)?;
        validate(&samples)?;

        let count = samples.len();
        self.state = ReplayState {
            mode: ReplayMode::Idle,
            duration: duration_of(&samples),
            samples,
            started_at: 0.0,
            playhead: 0.0,
        };
        tracing::info!(samples = count, "Replay imported");
        Ok(count)
    }

    fn persist(&mut self) {
        let json = match serde_json::to_string(&self.state.samples) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize replay");
                return;
            }
        };
        if let Err(e) = self.store.save(&self.storage_key, &json) {
            tracing::warn!(error = %e, key = %self.storage_key, "Failed to save replay");
        }
    }

    fn load_persisted(&self) -> Vec<PoseSample> {
        let raw = match self.store.load(&self.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, key = %self.storage_key, "Failed to load replay");
                return Vec::new();
            }
        };
        let parsed = serde_json::from_str::<Vec<PoseSample>>(&raw)
            .map_err(ReplayError::from)
            .and_then(|samples| validate(&samples).map(|()| samples));
        match parsed {
            Ok(samples) => samples,
            Err(e) => {
                tracing::warn!(error = %e, key = %self.storage_key, "Ignoring corrupt replay");
                Vec::new()
            }
        }
    }
}

impl std::fmt::Debug for ReplayEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayEngine")
            .field("state", &self.state)
            .field("storage_key", &self.storage_key)
            .finish_non_exhaustive()
    }
}
