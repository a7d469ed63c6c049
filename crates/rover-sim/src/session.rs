//! The simulator session: one owner for every piece of simulation state.
//!
//! A [`Session`] is driven by calling [`Session::frame`] once per rendered
//! frame with the elapsed wall time. User actions (drive toggle, recording,
//! playback, biome and preset changes) are methods on the session, which keeps
//! the mode state machine, the drive controls and the replay engine in step.

use std::path::{Path, PathBuf};

use rover_camera::{CameraController, CameraFrame, CameraPreset, PointerKind};
use rover_config::{Config, RoverTuningPatch, Settings, SettingsStore};
use rover_physics::{
    FixedStepper, InputState, Pose, PoseEmitter, RoverPhysics, StepContext, TRACTION_RANGE,
    Telemetry,
};
use rover_replay::{Clock, PlaybackTick, ReplayEngine, ReplayStore};
use rover_terrain::{Biome, BiomeRegistry, HeightGrid, Obstacle, ROCK_COUNT, scatter_obstacles};

use crate::controls::DriveControls;
use crate::error::SessionError;
use crate::hud::{HudSnapshot, HudThrottle};
use crate::mode::{SimEvent, SimMode};
use crate::trail::Trail;

/// Everything a renderer needs after one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    /// Integrator pose after the last sub-step.
    pub pose: Pose,
    pub telemetry: Telemetry,
    /// Poses that passed the emission filter this frame, oldest first.
    pub emitted: Vec<Pose>,
    /// Ghost at the replay playhead, if a recording is loaded.
    pub ghost: Option<Pose>,
    pub camera: CameraFrame,
    /// New HUD readout, when one was due.
    pub hud: Option<HudSnapshot>,
    pub mode: SimMode,
    /// Physics sub-steps run.
    pub steps: u32,
}

pub struct Session {
    mode: SimMode,
    settings: SettingsStore,
    biomes: BiomeRegistry,
    biome: Biome,
    obstacles: Vec<Obstacle>,
    physics: RoverPhysics,
    stepper: FixedStepper,
    emitter: PoseEmitter,
    replay: ReplayEngine,
    camera: CameraController,
    controls: DriveControls,
    trail: Trail,
    hud: HudThrottle,
    clock: Box<dyn Clock>,
    traction: f64,
    minimap_zoom: f64,
    /// Last reported pose; what the HUD, minimap and camera follow.
    reported: Pose,
    telemetry: Telemetry,
    replay_tick_ms: f64,
    last_replay_tick: f64,
    export_file_name: String,
}

impl Session {
    /// Builds a session from a loaded config. The clock is shared between the
    /// session and its replay engine.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownBiome`] if `config.sim.biome` does not
    /// name a known biome.
    pub fn new<C>(
        config: &Config,
        clock: C,
        store: Box<dyn ReplayStore>,
    ) -> Result<Self, SessionError>
    where
        C: Clock + Clone + 'static,
    {
        let biomes = BiomeRegistry::with_builtins();
        let biome = biomes.lookup(&config.sim.biome)?.clone();
        let obstacles = scatter_obstacles(&biome, ROCK_COUNT);
        let settings = SettingsStore::new(Settings::from_config(config));
        let minimap_zoom = settings
            .snapshot()
            .minimap
            .clamp_zoom(settings.snapshot().minimap.default_zoom);

        let physics = RoverPhysics::new();
        let pose = physics.pose();
        let now = clock.now_ms();
        let replay = ReplayEngine::new(
            Box::new(clock.clone()),
            store,
            config.replay.storage_key.clone(),
        );

        tracing::info!(
            biome = %biome.id,
            obstacles = obstacles.len(),
            traction = config.sim.traction,
            "Session created"
        );

        Ok(Self {
            mode: SimMode::Idle,
            settings,
            biomes,
            biome,
            obstacles,
            physics,
            stepper: FixedStepper::new(),
            emitter: PoseEmitter::new(pose),
            replay,
            camera: CameraController::new(),
            controls: DriveControls::new(config.sim.default_speed),
            trail: Trail::new(),
            hud: HudThrottle::new(now),
            clock: Box::new(clock),
            traction: config.sim.traction.clamp(TRACTION_RANGE.0, TRACTION_RANGE.1),
            minimap_zoom,
            reported: pose,
            telemetry: Telemetry::default(),
            replay_tick_ms: config.replay.tick_interval_ms,
            last_replay_tick: now,
            export_file_name: config.replay.export_file_name.clone(),
        })
    }

    /// Advances the simulation by `delta` seconds of wall time.
    pub fn frame(&mut self, delta: f64) -> FrameReport {
        let now = self.clock.now_ms();
        let tuning = self.settings.snapshot().rover;
        let ctx = StepContext {
            input: self.controls.input(),
            drive_enabled: self.controls.drive_enabled(),
            speed: self.controls.speed(),
            traction: self.traction,
            tuning: &tuning,
            biome: &self.biome,
            obstacles: &self.obstacles,
        };

        let physics = &mut self.physics;
        let emitter = &mut self.emitter;
        let mut emitted = Vec::new();
        let mut last = None;
        let steps = self.stepper.advance(delta, |dt| {
            let output = physics.step(dt, &ctx);
            if let Some(pose) = emitter.offer(output.pose, dt) {
                emitted.push(pose);
            }
            last = Some(output);
        });

        if let Some(output) = last {
            self.telemetry = output.telemetry;
            self.hud.update_telemetry(output.telemetry);
        }
        for pose in &emitted {
            self.replay.record_pose(*pose);
            self.trail.push(pose.position);
            self.reported = *pose;
        }

        self.tick_replay(now);

        let camera = self.camera.update(
            delta,
            &self.reported,
            &self.settings.snapshot().camera,
            self.controls.input(),
            now,
        );
        let hud = self.hud.frame(now, delta * 1000.0);

        FrameReport {
            pose: self.physics.pose(),
            telemetry: self.telemetry,
            emitted,
            ghost: self.replay.ghost_pose(),
            camera,
            hud,
            mode: self.mode,
            steps,
        }
    }

    // --- Mode arbitration ---

    /// Drive button. Stops a recording instead of toggling while one runs,
    /// and leaves playback for driving.
    pub fn toggle_drive(&mut self) {
        if self.mode.is_recording() {
            self.stop_recording();
            return;
        }
        if self.mode.is_playing() {
            self.stop_playback();
        }
        self.send(SimEvent::ToggleDrive);
    }

    /// Starts a fresh recording, ending any playback first.
    pub fn start_recording(&mut self) {
        if self.mode.is_playing() {
            self.stop_playback();
        }
        self.send(SimEvent::StartRecord);
        self.replay.start_recording();
    }

    pub fn stop_recording(&mut self) {
        self.send(SimEvent::StopRecord);
        self.replay.stop_recording();
    }

    /// Plays the current (or persisted) recording, ending any recording
    /// first. A playhead parked at the end rewinds to the start. With nothing
    /// to play the session drops straight back to driving.
    pub fn start_playback(&mut self) {
        if self.mode.is_recording() {
            self.stop_recording();
        }
        let state = self.replay.state();
        if state.duration > 0.0 && state.playhead >= state.duration {
            self.replay.seek(0.0);
        }
        self.send(SimEvent::StartPlayback);
        self.replay.start_playback();
        self.last_replay_tick = self.clock.now_ms();
        self.reconcile_playback();
    }

    pub fn stop_playback(&mut self) {
        self.send(SimEvent::StopPlayback);
        self.replay.stop_playback();
    }

    /// Moves the replay playhead (ms).
    pub fn seek(&mut self, time: f64) {
        self.replay.seek(time);
    }

    /// Back to idle with the rover parked at the origin. Ends any recording
    /// or playback.
    pub fn reset(&mut self) {
        if self.replay.state().is_recording() {
            self.replay.stop_recording();
        }
        if self.replay.state().is_playing() {
            self.replay.stop_playback();
        }
        self.send(SimEvent::Reset);
        self.controls.reset();
        let pose = self.physics.reset();
        self.stepper.reset();
        self.emitter.reset(pose);
        self.reported = pose;
        self.trail.push(pose.position);
        self.telemetry = Telemetry::default();
        tracing::info!(reset = self.controls.reset_signal(), "Session reset");
    }

    fn send(&mut self, event: SimEvent) {
        let next = self.mode.transition(event);
        if next != self.mode {
            tracing::debug!(from = %self.mode, to = %next, ?event, "Mode changed");
            self.mode = next;
        }
        let allow = self.mode.allow_input();
        if self.controls.drive_enabled() != allow {
            self.controls.set_drive_enabled(allow);
        }
    }

    fn tick_replay(&mut self, now: f64) {
        if self.replay.state().is_playing() && now - self.last_replay_tick >= self.replay_tick_ms {
            self.last_replay_tick = now;
            if self.replay.tick() == PlaybackTick::Finished {
                tracing::debug!("Playback reached the end");
            }
        }
        self.reconcile_playback();
    }

    /// Leaves `Play` once the engine is no longer playing.
    fn reconcile_playback(&mut self) {
        if self.mode.is_playing() && !self.replay.state().is_playing() {
            self.send(SimEvent::StopPlayback);
        }
    }

    // --- Replay I/O ---

    /// Pretty JSON of the current (or persisted) recording.
    pub fn export_replay(&self) -> Result<String, SessionError> {
        Ok(self.replay.export_replay()?)
    }

    /// Writes the export into `dir` under the configured export file name.
    pub fn export_to(&self, dir: &Path) -> Result<PathBuf, SessionError> {
        let json = self.export_replay()?;
        let path = dir.join(&self.export_file_name);
        std::fs::write(&path, json).map_err(|source| SessionError::WriteReplay {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), "Replay exported");
        Ok(path)
    }

    /// Loads an exported recording, ending any recording or playback.
    pub fn import_replay(&mut self, text: &str) -> Result<usize, SessionError> {
        let count = self.replay.import_replay(text)?;
        if self.mode.is_recording() || self.mode.is_playing() {
            self.send(SimEvent::StopPlayback);
        }
        Ok(count)
    }

    pub fn import_from(&mut self, path: &Path) -> Result<usize, SessionError> {
        let text = std::fs::read_to_string(path).map_err(|source| SessionError::ReadReplay {
            path: path.to_path_buf(),
            source,
        })?;
        self.import_replay(&text)
    }

    // --- World and settings ---

    /// Switches biome, rescattering obstacles and clearing the trail.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownBiome`] and keeps the current biome if
    /// `name` is not known.
    pub fn set_biome(&mut self, name: &str) -> Result<(), SessionError> {
        let biome = self.biomes.lookup(name)?.clone();
        self.obstacles = scatter_obstacles(&biome, ROCK_COUNT);
        self.trail.clear();
        tracing::info!(biome = %biome.id, "Biome changed");
        self.biome = biome;
        Ok(())
    }

    /// Mesh-ready height grid of the current biome.
    pub fn height_grid(&self) -> HeightGrid {
        HeightGrid::for_biome(&self.biome)
    }

    /// Sets traction, clamped into the supported range.
    pub fn set_traction(&mut self, traction: f64) {
        self.traction = traction.clamp(TRACTION_RANGE.0, TRACTION_RANGE.1);
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.controls.set_speed(speed);
    }

    pub fn set_rover_preset(&mut self, name: &str) {
        self.settings.set_rover_preset(name);
    }

    pub fn update_rover_tuning(&mut self, patch: &RoverTuningPatch) {
        self.settings.update_rover_tuning(patch);
    }

    pub fn set_camera_preset(&mut self, preset: CameraPreset) {
        self.camera.set_preset(preset);
    }

    pub fn zoom_in(&mut self) {
        self.set_minimap_zoom(self.minimap_zoom + 1.0);
    }

    pub fn zoom_out(&mut self) {
        self.set_minimap_zoom(self.minimap_zoom - 1.0);
    }

    pub fn reset_zoom(&mut self) {
        let default = self.settings.snapshot().minimap.default_zoom;
        self.set_minimap_zoom(default);
    }

    pub fn set_minimap_zoom(&mut self, zoom: f64) {
        self.minimap_zoom = self.settings.snapshot().minimap.clamp_zoom(zoom);
    }

    pub fn toggle_trail(&mut self) {
        self.trail.toggle();
    }

    // --- Input forwarding ---

    /// Replaces the held directions, e.g. from a script or gamepad. Ignored
    /// unless the mode allows input.
    pub fn set_input(&mut self, input: InputState) {
        self.controls.set_input(input);
    }

    pub fn key_down(&mut self, key: &str) -> bool {
        self.controls.key_down(key)
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        self.controls.key_up(key)
    }

    pub fn blur(&mut self) {
        self.controls.blur();
    }

    pub fn visibility_changed(&mut self, hidden: bool) {
        self.controls.visibility_changed(hidden);
    }

    pub fn pointer_down(&mut self, x: f64, y: f64, kind: PointerKind) {
        let now = self.clock.now_ms();
        self.camera.pointer_down(x, y, kind, now);
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.camera.pointer_move(x, y);
    }

    pub fn pointer_up(&mut self) {
        self.camera.pointer_up();
    }

    // --- Accessors ---

    pub fn mode(&self) -> SimMode {
        self.mode
    }

    /// Last pose that passed the emission filter.
    pub fn reported_pose(&self) -> Pose {
        self.reported
    }

    pub fn telemetry(&self) -> Telemetry {
        self.telemetry
    }

    pub fn physics(&self) -> &RoverPhysics {
        &self.physics
    }

    pub fn replay(&self) -> &ReplayEngine {
        &self.replay
    }

    pub fn controls(&self) -> &DriveControls {
        &self.controls
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SettingsStore {
        &mut self.settings
    }

    pub fn biome(&self) -> &Biome {
        &self.biome
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn traction(&self) -> f64 {
        self.traction
    }

    pub fn minimap_zoom(&self) -> f64 {
        self.minimap_zoom
    }

    pub fn hud(&self) -> &HudSnapshot {
        self.hud.published()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("mode", &self.mode)
            .field("biome", &self.biome.id)
            .field("pose", &self.reported)
            .field("replay", &self.replay.state().mode)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use rover_replay::{ManualClock, MemoryStore};

    use super::*;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn new_session() -> (Session, ManualClock) {
        let clock = ManualClock::new(0.0);
        let session = Session::new(
            &Config::default(),
            clock.clone(),
            Box::new(MemoryStore::new()),
        )
        .expect("default biome exists");
        (session, clock)
    }

    fn run(session: &mut Session, clock: &ManualClock, frames: usize) -> FrameReport {
        let mut report = None;
        for _ in 0..frames {
            clock.advance(FRAME_MS);
            report = Some(session.frame(FRAME_MS / 1000.0));
        }
        report.expect("at least one frame")
    }

    #[test]
    fn test_idle_session_ignores_keys() {
        let (mut session, clock) = new_session();
        assert_eq!(session.mode(), SimMode::Idle);
        assert!(!session.key_down("w"));
        let settled = run(&mut session, &clock, 30).pose;
        let later = run(&mut session, &clock, 30).pose;
        assert_eq!(settled.position.x, later.position.x);
        assert_eq!(settled.position.z, later.position.z);
    }

    #[test]
    fn test_drive_forward_reports_poses() {
        let (mut session, clock) = new_session();
        session.toggle_drive();
        assert_eq!(session.mode(), SimMode::Drive);
        assert!(session.controls().drive_enabled());
        assert!(session.key_down("w"));

        let mut emitted = 0;
        for _ in 0..60 {
            clock.advance(FRAME_MS);
            emitted += session.frame(FRAME_MS / 1000.0).emitted.len();
        }
        let pose = session.physics().pose();
        assert!(pose.position.z < -1.0, "heading 0 drives toward -Z, got {pose:?}");
        assert!(emitted > 10);
        assert!(!session.trail().is_empty());
        assert_eq!(
            session.trail().points().last(),
            Some(&session.reported_pose().position)
        );

        session.toggle_drive();
        assert_eq!(session.mode(), SimMode::Idle);
        assert!(session.controls().input().is_idle());
    }

    #[test]
    fn test_record_then_play_back() {
        let (mut session, clock) = new_session();
        session.toggle_drive();
        session.start_recording();
        assert_eq!(session.mode(), SimMode::Record);
        assert!(session.controls().drive_enabled());
        session.key_down("ArrowUp");
        run(&mut session, &clock, 60);

        session.stop_recording();
        assert_eq!(session.mode(), SimMode::Drive);
        let duration = session.replay().state().duration;
        assert!(session.replay().samples().len() > 10);
        assert!(duration > 900.0 && duration < 1000.001, "duration {duration}");
        let persisted = session
            .replay()
            .store()
            .load("rover-replay")
            .expect("memory store never fails");
        assert!(persisted.is_some());

        session.start_playback();
        assert_eq!(session.mode(), SimMode::Play);
        assert!(!session.controls().drive_enabled());
        assert_eq!(session.replay().state().playhead, 0.0, "finished recording rewinds");

        let report = run(&mut session, &clock, 4);
        assert!(report.ghost.is_some());
        assert!(session.replay().state().playhead > 0.0);

        let report = run(&mut session, &clock, 90);
        assert_eq!(report.mode, SimMode::Drive, "playback end returns to driving");
        assert_eq!(session.replay().state().playhead, duration);
        let last = session.replay().samples().last().map(|s| s.pose);
        assert_eq!(report.ghost, last);
    }

    #[test]
    fn test_playback_with_nothing_recorded_returns_to_drive() {
        let (mut session, _clock) = new_session();
        session.start_playback();
        assert_eq!(session.mode(), SimMode::Drive);
        assert!(!session.replay().state().is_playing());
    }

    #[test]
    fn test_toggle_drive_while_recording_stops_recording() {
        let (mut session, clock) = new_session();
        session.toggle_drive();
        session.start_recording();
        session.key_down("w");
        run(&mut session, &clock, 20);

        session.toggle_drive();
        assert_eq!(session.mode(), SimMode::Drive);
        assert!(!session.replay().state().is_recording());
        assert!(!session.replay().samples().is_empty());
    }

    #[test]
    fn test_start_recording_ends_playback() {
        let (mut session, clock) = new_session();
        session.toggle_drive();
        session.start_recording();
        session.key_down("w");
        run(&mut session, &clock, 30);
        session.stop_recording();

        session.start_playback();
        run(&mut session, &clock, 5);
        assert!(session.replay().state().is_playing());

        session.start_recording();
        assert_eq!(session.mode(), SimMode::Record);
        assert!(session.replay().state().is_recording());
        assert!(session.replay().samples().is_empty());
    }

    #[test]
    fn test_start_playback_ends_recording() {
        let (mut session, clock) = new_session();
        session.toggle_drive();
        session.start_recording();
        session.key_down("w");
        run(&mut session, &clock, 30);

        session.start_playback();
        assert_eq!(session.mode(), SimMode::Play);
        assert!(!session.replay().state().is_recording());
        assert!(session.replay().state().is_playing());
    }

    #[test]
    fn test_set_biome() {
        let (mut session, clock) = new_session();
        session.toggle_drive();
        session.key_down("w");
        run(&mut session, &clock, 30);
        assert!(!session.trail().is_empty());
        let mars_rocks = session.obstacles().to_vec();

        session.set_biome("icy").expect("icy is built in");
        assert_eq!(session.biome().name, "Icy Plain");
        assert!(session.trail().is_empty());
        assert_eq!(session.obstacles().len(), ROCK_COUNT);
        assert_ne!(session.obstacles(), mars_rocks.as_slice());

        assert!(matches!(
            session.set_biome("venus"),
            Err(SessionError::UnknownBiome(_))
        ));
        assert_eq!(session.biome().id.as_str(), "icy");
    }

    #[test]
    fn test_unknown_biome_in_config() {
        let mut config = Config::default();
        config.sim.biome = "venus".to_string();
        let result = Session::new(&config, ManualClock::new(0.0), Box::new(MemoryStore::new()));
        assert!(matches!(result, Err(SessionError::UnknownBiome(_))));
    }

    #[test]
    fn test_minimap_zoom_is_clamped() {
        let (mut session, _clock) = new_session();
        assert_eq!(session.minimap_zoom(), 12.0);
        for _ in 0..20 {
            session.zoom_in();
        }
        assert_eq!(session.minimap_zoom(), 20.0);
        for _ in 0..20 {
            session.zoom_out();
        }
        assert_eq!(session.minimap_zoom(), 8.0);
        session.reset_zoom();
        assert_eq!(session.minimap_zoom(), 12.0);
    }

    #[test]
    fn test_traction_is_clamped() {
        let (mut session, _clock) = new_session();
        assert_eq!(session.traction(), 0.8);
        session.set_traction(5.0);
        assert_eq!(session.traction(), 1.5);
        session.set_traction(0.0);
        assert_eq!(session.traction(), 0.2);
    }

    #[test]
    fn test_reset_parks_rover() {
        let (mut session, clock) = new_session();
        session.toggle_drive();
        session.start_recording();
        session.key_down("w");
        session.set_speed(8.0);
        run(&mut session, &clock, 30);

        session.reset();
        assert_eq!(session.mode(), SimMode::Idle);
        assert!(!session.replay().state().is_recording());
        assert_eq!(session.controls().reset_signal(), 1);
        assert_eq!(session.controls().speed(), 4.0);
        assert_eq!(session.physics().pose().position.x, 0.0);
        assert_eq!(session.physics().pose().position.z, 0.0);
        assert_eq!(session.reported_pose(), session.physics().pose());
        let trail = session.trail();
        assert!(trail.len() > 1, "driven breadcrumbs kept");
        assert_eq!(trail.points().last(), Some(&session.physics().pose().position));
    }

    #[test]
    fn test_rover_preset_changes_tuning() {
        let (mut session, _clock) = new_session();
        session.set_rover_preset("sporty");
        assert!(session.settings().snapshot().rover.max_speed > 12.0);
        session.set_rover_preset("warp");
        assert_eq!(session.settings().snapshot().rover.max_speed, 12.0);
    }

    #[test]
    fn test_export_and_import() {
        let (mut session, clock) = new_session();
        session.toggle_drive();
        session.start_recording();
        session.key_down("w");
        run(&mut session, &clock, 30);
        session.stop_recording();

        let dir = tempfile::tempdir().expect("tempdir");
        let path = session.export_to(dir.path()).expect("export");
        assert!(path.ends_with("rover-replay.json"));
        let recorded = session.replay().samples().len();

        let (mut other, _clock) = new_session();
        assert_eq!(other.import_from(&path).expect("import"), recorded);
        assert_eq!(other.replay().samples(), session.replay().samples());

        let text = std::fs::read_to_string(&path).expect("read export");
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        assert!(value[0]["pose"]["position"].is_array());
        assert_eq!(
            value[0]["pose"]["position"][0].as_f64(),
            Some(session.replay().samples()[0].pose.position.x)
        );
    }
}
