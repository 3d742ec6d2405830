//! Error types for pixmap-core operations.
//!
//! Structural mutators ([`PixelBuffer::set_descriptor`],
//! [`PixelBuffer::attach_memory`], wire decoding) report one of these and
//! leave the buffer in its last valid state. Read-path accessors such as
//! [`PixelBuffer::pixel_at`] never produce an [`Error`]; they return `None`.
//!
//! # Usage
//!
//! ```rust
//! use pixmap_core::{Error, Result};
//!
//! fn check(x: i32, y: i32, width: i32, height: i32) -> Result<()> {
//!     if x < 0 || y < 0 || x >= width || y >= height {
//!         return Err(Error::out_of_bounds(x, y, width, height));
//!     }
//!     Ok(())
//! }
//! assert!(check(3, 0, 3, 3).is_err());
//! ```
//!
//! [`PixelBuffer::set_descriptor`]: crate::PixelBuffer::set_descriptor
//! [`PixelBuffer::attach_memory`]: crate::PixelBuffer::attach_memory
//! [`PixelBuffer::pixel_at`]: crate::PixelBuffer::pixel_at

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while describing, filling or moving pixel buffers.
///
/// # Categories
///
/// - **Descriptor errors**: [`InvalidGeometry`](Error::InvalidGeometry),
///   [`UnsupportedFormat`](Error::UnsupportedFormat), [`TooLarge`](Error::TooLarge)
/// - **Access errors**: [`OutOfBounds`](Error::OutOfBounds),
///   [`NotEditable`](Error::NotEditable), [`NoMemory`](Error::NoMemory)
/// - **Memory errors**: [`CapacityMismatch`](Error::CapacityMismatch),
///   [`AllocationFailed`](Error::AllocationFailed), [`Io`](Error::Io)
/// - **Wire errors**: [`DecodeMismatch`](Error::DecodeMismatch)
#[derive(Debug, Error)]
pub enum Error {
    /// Width or height is non-positive, or the row/byte size overflows.
    #[error("invalid geometry {width}x{height}: {reason}")]
    InvalidGeometry {
        /// Requested width
        width: i32,
        /// Requested height
        height: i32,
        /// Why the geometry was rejected
        reason: String,
    },

    /// Pixel format or color space is unknown or not handled here.
    #[error("unsupported format: {format}")]
    UnsupportedFormat {
        /// Format name or description
        format: String,
    },

    /// The buffer would exceed the allocation ceiling.
    #[error("buffer of {requested} bytes exceeds the {limit} byte ceiling")]
    TooLarge {
        /// Bytes the descriptor requires
        requested: u64,
        /// Configured ceiling
        limit: u64,
    },

    /// Access beyond the buffer or beyond a caller-supplied slice.
    #[error("access ({x}, {y}) out of bounds for {width}x{height}")]
    OutOfBounds {
        /// X coordinate (or byte offset for linear access)
        x: i32,
        /// Y coordinate
        y: i32,
        /// Extent width
        width: i32,
        /// Extent height
        height: i32,
    },

    /// Attached memory is smaller than the descriptor requires.
    #[error("capacity {capacity} is smaller than the required {required} bytes")]
    CapacityMismatch {
        /// Bytes required by the descriptor
        required: usize,
        /// Bytes offered by the memory
        capacity: usize,
    },

    /// Malformed or truncated wire bytes.
    #[error("decode mismatch: {0}")]
    DecodeMismatch(String),

    /// A write was attempted on a buffer that is not editable.
    #[error("pixel buffer is not editable")]
    NotEditable,

    /// The buffer has no memory attached.
    #[error("pixel buffer has no memory attached")]
    NoMemory,

    /// Memory could not be obtained.
    #[error("failed to allocate {requested} bytes: {reason}")]
    AllocationFailed {
        /// Bytes requested
        requested: usize,
        /// Failure reason
        reason: String,
    },

    /// OS-level failure while mapping shared memory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates an [`Error::InvalidGeometry`] error.
    #[inline]
    pub fn invalid_geometry(width: i32, height: i32, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::UnsupportedFormat`] error.
    #[inline]
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Creates an [`Error::OutOfBounds`] error.
    #[inline]
    pub fn out_of_bounds(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::OutOfBounds {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates an [`Error::CapacityMismatch`] error.
    #[inline]
    pub fn capacity_mismatch(required: usize, capacity: usize) -> Self {
        Self::CapacityMismatch { required, capacity }
    }

    /// Creates an [`Error::DecodeMismatch`] error.
    #[inline]
    pub fn decode_mismatch(msg: impl Into<String>) -> Self {
        Self::DecodeMismatch(msg.into())
    }

    /// Creates an [`Error::AllocationFailed`] error.
    #[inline]
    pub fn allocation_failed(requested: usize, reason: impl Into<String>) -> Self {
        Self::AllocationFailed {
            requested,
            reason: reason.into(),
        }
    }

    /// Returns `true` if this is a bounds-related error.
    #[inline]
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. })
    }

    /// Returns `true` if the descriptor itself was rejected.
    #[inline]
    pub fn is_descriptor_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidGeometry { .. } | Self::UnsupportedFormat { .. } | Self::TooLarge { .. }
        )
    }
}
