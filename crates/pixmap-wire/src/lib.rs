//! # pixmap-wire
//!
//! Serializes [`PixelBuffer`](pixmap_core::PixelBuffer)s into a [`Parcel`]
//! and back.
//!
//! Small buffers are copied inline after a fixed header; buffers at or
//! above the [`WirePolicy`] threshold travel as a handle to a shared-memory
//! segment, so the receiver maps the same pages instead of copying them.
//!
//! ```rust
//! use pixmap_core::{ImageDescriptor, PixelBuffer, PixelFormat};
//! use pixmap_wire::{Codec, Parcel, WirePolicy};
//!
//! let codec = Codec::new(WirePolicy::inline_only());
//! let buf = PixelBuffer::allocate(ImageDescriptor::new(16, 16, PixelFormat::Rgb565)).unwrap();
//! let mut parcel = Parcel::new();
//! codec.encode(&buf, &mut parcel).unwrap();
//! let bytes = parcel.to_bytes().unwrap();
//!
//! let back = codec.decode(&mut Parcel::from_bytes(bytes)).unwrap();
//! assert!(back.is_same_image(&buf));
//! ```

#![warn(missing_docs)]

pub mod codec;
pub mod parcel;
pub mod policy;

pub use codec::{decode, encode, Codec, PayloadKind, WireHeader, HEADER_LEN, MAGIC, VERSION};
pub use parcel::Parcel;
pub use policy::{WirePolicy, INLINE_THRESHOLD};
