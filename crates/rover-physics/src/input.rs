//! Directional control state read by the integrator every sub-step.

/// Which drive directions are currently held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl InputState {
    /// `+1` forward, `-1` backward, `0` when neither or both are held.
    pub fn throttle(&self) -> f64 {
        f64::from(u8::from(self.forward)) - f64::from(u8::from(self.backward))
    }

    /// `+1` left, `-1` right, `0` when neither or both are held.
    pub fn turn(&self) -> f64 {
        f64::from(u8::from(self.left)) - f64::from(u8::from(self.right))
    }

    /// Releases every direction at once.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}
