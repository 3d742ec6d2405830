//! Pixel memory and its release contracts.
//!
//! A [`PixelMemory`] is a byte region tagged with the [`AllocationStrategy`]
//! that produced it. Each strategy releases differently:
//!
//! | Strategy | Storage | Release |
//! |----------|---------|---------|
//! | `Heap` | `Vec<u8>` | freed by the allocator |
//! | `SharedSegment` | POSIX shm mapping | `munmap` + close |
//! | `ExternalGraphicsBuffer` | foreign pointer | caller-supplied callback |
//! | `Custom` | foreign pointer | caller-supplied callback |
//!
//! Release always happens in `Drop`, and therefore exactly once: dropping
//! the memory, replacing it on a buffer, or having an attach rejected all
//! funnel into the same path.
//!
//! # Usage
//!
//! ```rust
//! use pixmap_core::{AllocationStrategy, PixelMemory};
//!
//! let mem = PixelMemory::heap(64).unwrap();
//! assert_eq!(mem.capacity(), 64);
//! assert_eq!(mem.strategy(), AllocationStrategy::Heap);
//! ```

use std::fmt;
use std::ptr::NonNull;

use tracing::trace;

use crate::error::{Error, Result};
#[cfg(unix)]
use crate::shm::SharedSegment;

/// Where a buffer's bytes came from; selects the release path.
///
/// Discriminants are stable wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum AllocationStrategy {
    /// Process heap.
    #[default]
    Heap = 0,
    /// Anonymous shared-memory segment.
    SharedSegment = 1,
    /// Buffer owned by a graphics allocator outside this crate.
    ExternalGraphicsBuffer = 2,
    /// Caller-provided memory with a caller-provided release.
    Custom = 3,
}

impl AllocationStrategy {
    /// Parses a wire value.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Heap),
            1 => Some(Self::SharedSegment),
            2 => Some(Self::ExternalGraphicsBuffer),
            3 => Some(Self::Custom),
            _ => None,
        }
    }

    /// Stable wire value.
    #[inline]
    pub const fn as_raw(self) -> u32 {
        self as u32
    }

    /// Lower-case name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Heap => "heap",
            Self::SharedSegment => "shared",
            Self::ExternalGraphicsBuffer => "external",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for AllocationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Release callback for foreign memory; receives the region it was given.
pub type ReleaseFn = Box<dyn FnOnce(NonNull<u8>, usize)>;

enum Storage {
    Heap(Vec<u8>),
    #[cfg(unix)]
    Shared(SharedSegment),
    Foreign {
        ptr: NonNull<u8>,
        len: usize,
        release: Option<ReleaseFn>,
    },
}

/// A byte region plus the strategy that owns it.
pub struct PixelMemory {
    storage: Storage,
    strategy: AllocationStrategy,
}

impl PixelMemory {
    /// Allocates `len` zeroed heap bytes.
    ///
    /// Allocation failure is reported as [`Error::AllocationFailed`].
    pub fn heap(len: usize) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|e| Error::allocation_failed(len, e.to_string()))?;
        data.resize(len, 0);
        Ok(Self::from_vec(data))
    }

    /// Wraps an existing heap vector.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self {
            storage: Storage::Heap(data),
            strategy: AllocationStrategy::Heap,
        }
    }

    /// Creates a zeroed shared segment of `len` bytes.
    #[cfg(unix)]
    pub fn shared(len: usize) -> Result<Self> {
        Ok(Self::from_segment(SharedSegment::create(len)?))
    }

    /// Wraps an already-mapped shared segment.
    #[cfg(unix)]
    pub fn from_segment(segment: SharedSegment) -> Self {
        Self {
            storage: Storage::Shared(segment),
            strategy: AllocationStrategy::SharedSegment,
        }
    }

    /// Wraps a graphics-allocator buffer.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads and writes of `len` bytes until
    /// `release` runs, and nothing else may access the region meanwhile.
    pub unsafe fn external_graphics_buffer(
        ptr: NonNull<u8>,
        len: usize,
        release: impl FnOnce(NonNull<u8>, usize) + 'static,
    ) -> Self {
        Self::foreign(ptr, len, AllocationStrategy::ExternalGraphicsBuffer, Box::new(release))
    }

    /// Wraps caller-provided memory.
    ///
    /// # Safety
    ///
    /// Same contract as [`external_graphics_buffer`](Self::external_graphics_buffer).
    pub unsafe fn custom(
        ptr: NonNull<u8>,
        len: usize,
        release: impl FnOnce(NonNull<u8>, usize) + 'static,
    ) -> Self {
        Self::foreign(ptr, len, AllocationStrategy::Custom, Box::new(release))
    }

    fn foreign(ptr: NonNull<u8>, len: usize, strategy: AllocationStrategy, release: ReleaseFn) -> Self {
        Self {
            storage: Storage::Foreign {
                ptr,
                len,
                release: Some(release),
            },
            strategy,
        }
    }

    /// Strategy tag.
    #[inline]
    pub fn strategy(&self) -> AllocationStrategy {
        self.strategy
    }

    /// Usable bytes.
    pub fn capacity(&self) -> usize {
        match &self.storage {
            Storage::Heap(data) => data.len(),
            #[cfg(unix)]
            Storage::Shared(segment) => segment.len(),
            Storage::Foreign { len, .. } => *len,
        }
    }

    /// The whole region.
    pub fn as_slice(&self) -> &[u8] {
        match &self.storage {
            Storage::Heap(data) => data,
            #[cfg(unix)]
            Storage::Shared(segment) => segment.as_slice(),
            // SAFETY: upheld by the unsafe constructors.
            Storage::Foreign { ptr, len, .. } => unsafe {
                std::slice::from_raw_parts(ptr.as_ptr(), *len)
            },
        }
    }

    /// The whole region, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match &mut self.storage {
            Storage::Heap(data) => data,
            #[cfg(unix)]
            Storage::Shared(segment) => segment.as_mut_slice(),
            // SAFETY: upheld by the unsafe constructors.
            Storage::Foreign { ptr, len, .. } => unsafe {
                std::slice::from_raw_parts_mut(ptr.as_ptr(), *len)
            },
        }
    }

    /// The backing segment, if this memory is shared.
    #[cfg(unix)]
    pub fn segment(&self) -> Option<&SharedSegment> {
        match &self.storage {
            Storage::Shared(segment) => Some(segment),
            _ => None,
        }
    }
}

impl fmt::Debug for PixelMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelMemory")
            .field("strategy", &self.strategy)
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl Drop for PixelMemory {
    fn drop(&mut self) {
        if let Storage::Foreign { ptr, len, release } = &mut self.storage {
            if let Some(release) = release.take() {
                trace!(strategy = %self.strategy, len = *len, "running release callback");
                release(*ptr, *len);
            }
        }
    }
}
