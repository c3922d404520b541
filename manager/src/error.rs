//! Error types for physio-manager.

use std::io;

/// Result type alias for physio-manager.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for manager operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The manager has been closed and accepts no new workers.
    #[error("manager closed")]
    Closed,

    /// The operating system refused to create a worker thread.
    #[error("failed to spawn worker: {0}")]
    Spawn(#[from] io::Error),

    /// Worker configuration could not be parsed.
    #[error("invalid config: {0}")]
    Config(#[from] serde_yaml::Error),
}
