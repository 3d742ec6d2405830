//! # pixmap-ops
//!
//! Geometry for pixmap buffers: nearest-neighbor scaling, rotation,
//! crop-and-create and buffer factories.
//!
//! # Modules
//!
//! - [`resize`] - scale by factors or to an exact size
//! - [`transform`] - rotation and the accumulating [`Transformer`]
//! - [`create`] - blank, color-array and cropped buffers
//!
//! Every operation reads its source and writes a freshly allocated heap
//! destination. With the default `parallel` feature, destination rows are
//! produced on the rayon thread pool.
//!
//! # Example
//!
//! ```rust
//! use pixmap_core::{ImageDescriptor, PixelBuffer, PixelFormat};
//! use pixmap_ops::{rotate, scale};
//!
//! let src = PixelBuffer::allocate(ImageDescriptor::new(3, 4, PixelFormat::Argb8888)).unwrap();
//! let big = scale(&src, 2.0, 2.0).unwrap();
//! let turned = rotate(&src, 90.0, 1.0, 2.0).unwrap();
//! assert_eq!((big.width(), big.height()), (6, 8));
//! assert_eq!((turned.width(), turned.height()), (4, 3));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod rows;
pub mod create;
pub mod resize;
pub mod transform;

pub use create::{create, create_from_colors, create_from_source, crop_and_create, InitOptions, ScaleMode};
pub use error::{OpsError, OpsResult};
pub use resize::{resize, scale};
pub use transform::{rotate, TransformSpec, Transformer};
