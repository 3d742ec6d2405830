//! Error types for geometry operations.

use thiserror::Error;

/// Error type for geometry operations and factories.
#[derive(Error, Debug)]
pub enum OpsError {
    /// A buffer-level failure (descriptor, memory, bounds).
    #[error(transparent)]
    Core(#[from] pixmap_core::Error),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Requested region does not lie inside the source.
    #[error("invalid region: {0}")]
    InvalidRegion(String),
}

/// Result type for geometry operations.
pub type OpsResult<T> = Result<T, OpsError>;
