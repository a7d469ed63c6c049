//! Session layer of the rover simulator.
//!
//! Ties the simulation crates together behind [`Session`]: the mode state
//! machine, keyboard drive controls, breadcrumb trail, HUD rate limiting and
//! the per-frame pipeline from input to pose, replay and camera.

mod controls;
mod error;
mod hud;
mod mode;
mod script;
mod session;
mod trail;

pub use controls::{DEFAULT_SPEED, DriveControls, DriveKey};
pub use error::SessionError;
pub use hud::{FPS_SMOOTHING, HUD_REFRESH_MS, HudSnapshot, HudThrottle};
pub use mode::{SimEvent, SimMode};
pub use script::{DrivePattern, FIGURE8_HALF_PERIOD};
pub use session::{FrameReport, Session};
pub use trail::{BREADCRUMB_LIMIT, Trail};
