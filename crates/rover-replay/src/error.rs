//! Replay error types.

/// Errors from importing or exporting replay data.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// The text is not a JSON array of pose samples.
    #[error("malformed replay: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A sample time is NaN or infinite.
    #[error("sample {index} has a non-finite time")]
    InvalidTime { index: usize },

    /// The first sample is stamped before the recording began.
    #[error("first sample time {0} ms is negative")]
    NegativeStart(f64),

    /// Sample times go backwards.
    #[error("sample {index} at {time} ms precedes previous sample at {previous} ms")]
    OutOfOrder {
        index: usize,
        time: f64,
        previous: f64,
    },
}
