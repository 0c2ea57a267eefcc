use thiserror::Error;

// -----------------------------------------------------------------------------
// Error

/// Returned by the checked (`try_*`) accessors of the owning handles.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum HandleError {
    #[error("handle does not own an object")]
    Empty,

    #[error("index {index} out of bounds for array of length {len}")]
    OutOfBounds { index: usize, len: usize },
}
