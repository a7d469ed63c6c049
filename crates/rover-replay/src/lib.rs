//! Ghost replays: record a pose stream, persist it, and play it back with
//! interpolation, seeking, and JSON import/export.

mod clock;
mod engine;
mod error;
mod sample;
mod store;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use engine::{
    DEFAULT_STORAGE_KEY, EXPORT_FILE_NAME, PlaybackTick, ReplayEngine, ReplayMode, ReplayState,
};
pub use error::ReplayError;
pub use sample::{PoseSample, duration_of, ghost_pose_at, validate, wrap_angle};
pub use store::{FileStore, MemoryStore, ReplayStore, StorageError};
