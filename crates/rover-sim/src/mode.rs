//! Top-level simulator mode.

use std::fmt;

/// What the user is doing with the rover.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SimMode {
    #[default]
    Idle,
    Drive,
    Record,
    Play,
}

/// Requests that move the simulator between modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimEvent {
    ToggleDrive,
    StartRecord,
    StopRecord,
    StartPlayback,
    StopPlayback,
    Reset,
}

impl SimMode {
    /// The mode after `event`. Events that make no sense in the current mode
    /// leave it unchanged.
    pub fn transition(self, event: SimEvent) -> SimMode {
        match (self, event) {
            (SimMode::Play, SimEvent::ToggleDrive) => SimMode::Drive,
            (SimMode::Idle, SimEvent::ToggleDrive) => SimMode::Drive,
            (_, SimEvent::ToggleDrive) => SimMode::Idle,
            (SimMode::Play, SimEvent::StartRecord) => SimMode::Play,
            (_, SimEvent::StartRecord) => SimMode::Record,
            (SimMode::Record, SimEvent::StopRecord) => SimMode::Drive,
            (mode, SimEvent::StopRecord) => mode,
            (_, SimEvent::StartPlayback) => SimMode::Play,
            (_, SimEvent::StopPlayback) => SimMode::Drive,
            (_, SimEvent::Reset) => SimMode::Idle,
        }
    }

    /// Whether drive keys reach the rover.
    pub fn allow_input(self) -> bool {
        matches!(self, SimMode::Drive | SimMode::Record)
    }

    pub fn is_recording(self) -> bool {
        self == SimMode::Record
    }

    pub fn is_playing(self) -> bool {
        self == SimMode::Play
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SimMode::Idle => "idle",
            SimMode::Drive => "drive",
            SimMode::Record => "record",
            SimMode::Play => "play",
        }
    }
}

impl fmt::Display for SimMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_drive() {
        assert_eq!(SimMode::Idle.transition(SimEvent::ToggleDrive), SimMode::Drive);
        assert_eq!(SimMode::Drive.transition(SimEvent::ToggleDrive), SimMode::Idle);
        assert_eq!(SimMode::Record.transition(SimEvent::ToggleDrive), SimMode::Idle);
        assert_eq!(SimMode::Play.transition(SimEvent::ToggleDrive), SimMode::Drive);
    }

    #[test]
    fn test_recording_transitions() {
        assert_eq!(SimMode::Idle.transition(SimEvent::StartRecord), SimMode::Record);
        assert_eq!(SimMode::Drive.transition(SimEvent::StartRecord), SimMode::Record);
        assert_eq!(
            SimMode::Play.transition(SimEvent::StartRecord),
            SimMode::Play,
            "recording cannot start over a playback"
        );
        assert_eq!(SimMode::Record.transition(SimEvent::StopRecord), SimMode::Drive);
        assert_eq!(SimMode::Idle.transition(SimEvent::StopRecord), SimMode::Idle);
        assert_eq!(SimMode::Play.transition(SimEvent::StopRecord), SimMode::Play);
    }

    #[test]
    fn test_playback_and_reset() {
        for mode in [SimMode::Idle, SimMode::Drive, SimMode::Record, SimMode::Play] {
            assert_eq!(mode.transition(SimEvent::StartPlayback), SimMode::Play);
            assert_eq!(mode.transition(SimEvent::StopPlayback), SimMode::Drive);
            assert_eq!(mode.transition(SimEvent::Reset), SimMode::Idle);
        }
    }

    #[test]
    fn test_allow_input() {
        assert!(!SimMode::Idle.allow_input());
        assert!(SimMode::Drive.allow_input());
        assert!(SimMode::Record.allow_input());
        assert!(!SimMode::Play.allow_input());
    }
}
