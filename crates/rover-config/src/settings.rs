//! Observable runtime settings shared by physics, camera and minimap.

use crate::config::{CameraConfig, Config, MinimapConfig};
use crate::tuning::{RoverTuning, RoverTuningPatch};

/// Per-frame settings snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub rover: RoverTuning,
    pub camera: CameraConfig,
    pub minimap: MinimapConfig,
}

impl Settings {
    /// Extracts the runtime-adjustable sections from a loaded config.
    pub fn from_config(config: &Config) -> Self {
        Self {
            rover: config.rover,
            camera: config.camera.clone(),
            minimap: config.minimap.clone(),
        }
    }
}

/// Handle returned by [`SettingsStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&Settings)>;

/// Single-owner settings store that notifies listeners on every change.
pub struct SettingsStore {
    state: Settings,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl SettingsStore {
    pub fn new(initial: Settings) -> Self {
        Self {
            state: initial,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Current settings.
    pub fn snapshot(&self) -> &Settings {
        &self.state
    }

    /// Replaces the whole snapshot.
    pub fn set(&mut self, next: Settings) {
        self.state = next;
        self.emit();
    }

    /// Selects a tuning preset; unknown names fall back to `default`.
    pub fn set_rover_preset(&mut self, name: &str) {
        let tuning = RoverTuning::preset(name).unwrap_or_else(|| {
            log::warn!("Unknown rover preset '{name}', using default");
            RoverTuning::default()
        });
        self.state.rover = tuning;
        self.emit();
    }

    /// Applies a partial tuning update to the active rover tuning.
    pub fn update_rover_tuning(&mut self, patch: &RoverTuningPatch) {
        self.state.rover.apply_patch(patch);
        self.emit();
    }

    /// Registers a listener called after each change.
    pub fn subscribe(&mut self, listener: impl FnMut(&Settings) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    fn emit(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener(&self.state);
        }
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
