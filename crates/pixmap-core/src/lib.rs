//! # pixmap-core
//!
//! Core pixel-buffer types.
//!
//! - [`ImageDescriptor`] - size, [`PixelFormat`], [`AlphaType`], [`ColorSpace`]
//! - [`format`] - the static per-format conversion table
//! - [`alpha`] - integer premultiply / unpremultiply
//! - [`PixelMemory`] - byte regions tagged with their [`AllocationStrategy`]
//! - [`PixelBuffer`] - descriptor plus memory, with bounds-safe pixel access
//! - [`PixelConverter`] - row conversion between formats
//!
//! ## Crate Structure
//!
//! ```text
//! pixmap-core (this crate)
//!    ^
//!    |
//!    +-- pixmap-ops (scale, rotate, crop, factories)
//!    +-- pixmap-wire (parcel serialization)
//!    +-- pixmap-cli
//! ```
//!
//! ## Platform Notes
//!
//! Shared-memory segments ([`SharedSegment`]) exist on unix only.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod alpha;
pub mod buffer;
pub mod convert;
pub mod descriptor;
pub mod error;
pub mod format;
pub mod memory;
pub mod rect;
#[cfg(unix)]
pub mod shm;

// Re-exports for convenience
pub use alpha::{premultiply, unpremultiply, AlphaConversionKind};
pub use buffer::{PixelBuffer, MAX_BYTE_COUNT};
pub use convert::PixelConverter;
pub use descriptor::*;
pub use error::*;
pub use format::FormatEntry;
pub use memory::{AllocationStrategy, PixelMemory, ReleaseFn};
pub use rect::*;
#[cfg(unix)]
pub use shm::SharedSegment;

/// Prelude module for convenient imports.
///
/// ```
/// use pixmap_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::alpha::AlphaConversionKind;
    pub use crate::buffer::PixelBuffer;
    pub use crate::convert::PixelConverter;
    pub use crate::descriptor::{AlphaType, ColorSpace, ImageDescriptor, PixelFormat, Size};
    pub use crate::error::{Error, Result};
    pub use crate::memory::{AllocationStrategy, PixelMemory};
    pub use crate::rect::{Position, Rect};
}
