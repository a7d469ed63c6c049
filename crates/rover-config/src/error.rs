use std::path::PathBuf;

/// Errors from loading or saving `config.ron`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),

    /// No platform config directory could be resolved and none was given.
    #[error("no config directory available on this platform")]
    NoConfigDir,
}
