//! Detects sustained user camera input that should cancel a preset flight.

use rover_physics::InputState;

/// Input must be sustained this long (ms) to count as a takeover.
pub const CANCEL_HOLD_MS: f64 = 200.0;
/// Mouse drag distance (px) that counts as a takeover.
pub const CANCEL_MOUSE_PX: f64 = 20.0;
/// Touch drag distance (px) that counts as a takeover.
pub const CANCEL_TOUCH_PX: f64 = 28.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
    Pen,
}

impl PointerKind {
    fn cancel_threshold(self) -> f64 {
        match self {
            PointerKind::Touch => CANCEL_TOUCH_PX,
            PointerKind::Mouse | PointerKind::Pen => CANCEL_MOUSE_PX,
        }
    }
}

/// A drag in progress on the viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct PointerDrag {
    start: (f64, f64),
    moved: f64,
    started_at_ms: f64,
    kind: PointerKind,
}

/// Tracks pointer drags and held drive keys.
#[derive(Clone, Debug, Default)]
pub struct OverrideDetector {
    drag: Option<PointerDrag>,
    key_hold_ms: f64,
}

impl OverrideDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_down(&mut self, x: f64, y: f64, kind: PointerKind, now_ms: f64) {
        self.drag = Some(PointerDrag {
            start: (x, y),
            moved: 0.0,
            started_at_ms: now_ms,
            kind,
        });
    }

    /// Updates the straight-line distance from where the drag began.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if let Some(drag) = &mut self.drag {
            drag.moved = (x - drag.start.0).hypot(y - drag.start.1);
        }
    }

    /// Pointer released or cancelled.
    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    /// Accumulates key hold time and reports whether either a long enough
    /// drag or a long enough key hold is in progress.
    pub fn update(&mut self, dt_ms: f64, input: &InputState, now_ms: f64) -> bool {
        let keys_held = !input.is_idle();
        if keys_held {
            self.key_hold_ms += dt_ms;
        } else {
            self.key_hold_ms = 0.0;
        }

        let drag_met = self.drag.is_some_and(|drag| {
            drag.moved >= drag.kind.cancel_threshold()
                && now_ms - drag.started_at_ms >= CANCEL_HOLD_MS
        });
        let keys_met = keys_held && self.key_hold_ms >= CANCEL_HOLD_MS;
        drag_met || keys_met
    }

    /// Forgets accumulated key hold time.
    pub fn reset_hold(&mut self) {
        self.key_hold_ms = 0.0;
    }
}
