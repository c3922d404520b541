//! Error types for ring buffer operations.

/// Result type alias for buffer operations.
pub type Result<T> = std::result::Result<T, BufferError>;

/// Ring buffer precondition violation.
///
/// Every variant means "no data moved": a failed operation leaves the
/// buffer exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    /// The buffer has zero capacity and must be resized before use.
    #[error("buffer: zero capacity")]
    ZeroCapacity,

    /// The buffer holds no elements.
    #[error("buffer: empty")]
    Empty,

    /// A batch request is larger than the buffer could ever hold.
    #[error("buffer: request of {requested} exceeds capacity {capacity}")]
    ExceedsCapacity { requested: usize, capacity: usize },

    /// The overlap of a windowed read is larger than the window.
    #[error("buffer: overlap {overlap} exceeds request of {requested}")]
    InvalidOverlap { overlap: usize, requested: usize },

    /// Fewer elements are stored than were requested.
    #[error("buffer: {requested} requested but only {available} stored")]
    Insufficient { requested: usize, available: usize },
}
