//! Anonymous POSIX shared-memory segments.
//!
//! A segment is created under a unique `/pixmap_<pid>_<n>` name and unlinked
//! immediately, so the only references to it are file descriptors. The
//! descriptor can be duplicated into a wire parcel's handle table and
//! mapped again on the receiving side with [`SharedSegment::from_fd`].

use std::ffi::CString;
use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, OwnedFd};
use std::ptr::{self, NonNull};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::error::{Error, Result};

static SEGMENT_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A read-write `MAP_SHARED` mapping of a shared-memory object.
///
/// The mapping is released with `munmap` and the descriptor closed on drop.
#[derive(Debug)]
pub struct SharedSegment {
    ptr: NonNull<u8>,
    len: usize,
    fd: OwnedFd,
}

// SAFETY: the mapping is exclusively owned by this value; aliasing across
// processes is the caller's concern, as with any shared-memory transport.
unsafe impl Send for SharedSegment {}

impl SharedSegment {
    /// Creates a zero-filled segment of `len` bytes.
    pub fn create(len: usize) -> Result<Self> {
        if len == 0 {
            return Err(Error::allocation_failed(0, "empty shared segment"));
        }
        let name = format!(
            "/pixmap_{}_{}",
            std::process::id(),
            SEGMENT_COUNTER.fetch_add(1, Ordering::Relaxed)
        );
        let c_name = CString::new(name.as_str())
            .map_err(|_| Error::allocation_failed(len, "segment name contains a null byte"))?;

        let raw = unsafe {
            libc::shm_open(
                c_name.as_ptr(),
                libc::O_RDWR | libc::O_CREAT | libc::O_EXCL,
                (libc::S_IRUSR | libc::S_IWUSR) as libc::c_uint,
            )
        };
        if raw < 0 {
            return Err(io::Error::last_os_error().into());
        }
        // SAFETY: shm_open returned a fresh descriptor we now own.
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };
        unsafe {
            libc::shm_unlink(c_name.as_ptr());
        }

        let size = libc::off_t::try_from(len)
            .map_err(|_| Error::allocation_failed(len, "segment length exceeds off_t"))?;
        if unsafe { libc::ftruncate(fd.as_raw_fd(), size) } < 0 {
            return Err(io::Error::last_os_error().into());
        }

        let segment = Self::map(fd, len)?;
        debug!(name = %name, len, "created shared segment");
        Ok(segment)
    }

    /// Maps `len` bytes of an existing segment descriptor.
    ///
    /// Fails with [`Error::CapacityMismatch`] if the object is smaller than `len`.
    pub fn from_fd(fd: OwnedFd, len: usize) -> Result<Self> {
        if len == 0 {
            return Err(Error::allocation_failed(0, "empty shared segment"));
        }
        let mut stat = std::mem::MaybeUninit::<libc::stat>::uninit();
        if unsafe { libc::fstat(fd.as_raw_fd(), stat.as_mut_ptr()) } < 0 {
            return Err(io::Error::last_os_error().into());
        }
        // SAFETY: fstat succeeded and initialized the struct.
        let stat = unsafe { stat.assume_init() };
        let actual = usize::try_from(stat.st_size).unwrap_or(0);
        if actual < len {
            return Err(Error::capacity_mismatch(len, actual));
        }
        Self::map(fd, len)
    }

    fn map(fd: OwnedFd, len: usize) -> Result<Self> {
        let addr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                fd.as_raw_fd(),
                0,
            )
        };
        if addr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error().into());
        }
        let ptr = NonNull::new(addr.cast::<u8>())
            .ok_or_else(|| Error::allocation_failed(len, "mmap returned null"))?;
        Ok(Self { ptr, len, fd })
    }

    /// Mapped length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; empty segments cannot be created.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The mapped bytes.
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: ptr is a live mapping of len bytes for the lifetime of self.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// The mapped bytes, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as above, and &mut self guarantees no other local borrow.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Duplicates the descriptor so another owner can map the same pages.
    pub fn try_clone_fd(&self) -> Result<OwnedFd> {
        Ok(self.fd.try_clone()?)
    }
}

impl AsFd for SharedSegment {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl Drop for SharedSegment {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.ptr.as_ptr().cast::<libc::c_void>(), self.len);
        }
        debug!(len = self.len, "unmapped shared segment");
    }
}
