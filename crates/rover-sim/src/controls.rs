//! Keyboard drive controls.
//!
//! [`DriveControls`] turns key names into an [`InputState`] and owns the
//! drive-enabled flag and speed setting. While driving is disabled every key
//! event is ignored and the input stays released.

use rover_physics::InputState;

/// Speed setting the controls start with and return to on reset.
pub const DEFAULT_SPEED: f64 = 4.0;

/// A drive direction a key can be bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriveKey {
    Forward,
    Backward,
    Left,
    Right,
}

impl DriveKey {
    /// Maps a key name to its direction. Single-character names are matched
    /// case-insensitively.
    pub fn from_key(key: &str) -> Option<DriveKey> {
        let mut chars = key.chars();
        let single = match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c.to_ascii_lowercase()),
            _ => None,
        };
        match single {
            Some('w') => return Some(DriveKey::Forward),
            Some('s') => return Some(DriveKey::Backward),
            Some('a') => return Some(DriveKey::Left),
            Some('d') => return Some(DriveKey::Right),
            Some(_) => return None,
            None => {}
        }
        match key {
            "ArrowUp" => Some(DriveKey::Forward),
            "ArrowDown" => Some(DriveKey::Backward),
            "ArrowLeft" => Some(DriveKey::Left),
            "ArrowRight" => Some(DriveKey::Right),
            _ => None,
        }
    }

    fn set(self, input: &mut InputState, held: bool) {
        match self {
            DriveKey::Forward => input.forward = held,
            DriveKey::Backward => input.backward = held,
            DriveKey::Left => input.left = held,
            DriveKey::Right => input.right = held,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DriveControls {
    drive_enabled: bool,
    speed: f64,
    initial_speed: f64,
    input: InputState,
    reset_signal: u64,
}

impl DriveControls {
    pub fn new(initial_speed: f64) -> Self {
        Self {
            drive_enabled: false,
            speed: initial_speed,
            initial_speed,
            input: InputState::default(),
            reset_signal: 0,
        }
    }

    pub fn drive_enabled(&self) -> bool {
        self.drive_enabled
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Incremented by every [`reset`](Self::reset).
    pub fn reset_signal(&self) -> u64 {
        self.reset_signal
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    pub fn toggle_drive(&mut self) {
        self.set_drive_enabled(!self.drive_enabled);
    }

    /// Disabling driving releases every key.
    pub fn set_drive_enabled(&mut self, enabled: bool) {
        self.drive_enabled = enabled;
        if !enabled {
            self.input.clear();
        }
    }

    /// Replaces the whole input state. Ignored while driving is disabled.
    pub fn set_input(&mut self, input: InputState) {
        if self.drive_enabled {
            self.input = input;
        }
    }

    /// Returns `true` if the key is a drive binding and was applied.
    pub fn key_down(&mut self, key: &str) -> bool {
        self.apply_key(key, true)
    }

    /// Returns `true` if the key is a drive binding and was applied.
    pub fn key_up(&mut self, key: &str) -> bool {
        self.apply_key(key, false)
    }

    /// Focus lost: releases every key.
    pub fn blur(&mut self) {
        self.input.clear();
    }

    /// Visibility changed; hiding releases every key.
    pub fn visibility_changed(&mut self, hidden: bool) {
        if hidden {
            self.input.clear();
        }
    }

    /// Releases keys, disables driving, and restores the initial speed.
    pub fn reset(&mut self) {
        self.input.clear();
        self.drive_enabled = false;
        self.speed = self.initial_speed;
        self.reset_signal += 1;
    }

    fn apply_key(&mut self, key: &str, held: bool) -> bool {
        let Some(binding) = DriveKey::from_key(key) else {
            return false;
        };
        if !self.drive_enabled {
            return false;
        }
        binding.set(&mut self.input, held);
        true
    }
}

impl Default for DriveControls {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED)
    }
}
