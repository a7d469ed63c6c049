use std::path::PathBuf;

use rover_replay::ReplayError;
use rover_terrain::UnknownBiome;

/// Errors surfaced by [`Session`](crate::Session) operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    UnknownBiome(#[from] UnknownBiome),

    #[error("replay error: {0}")]
    Replay(#[from] ReplayError),

    #[error("failed to write replay to {path}: {source}")]
    WriteReplay {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read replay from {path}: {source}")]
    ReadReplay {
        path: PathBuf,
        source: std::io::Error,
    },
}
