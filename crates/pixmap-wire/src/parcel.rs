//! Byte stream plus handle table.
//!
//! A [`Parcel`] is what crosses the process boundary: an append-only byte
//! stream with a read cursor, and an ordered table of shared-memory file
//! descriptors referenced from the stream by index.

#[cfg(unix)]
use std::os::fd::OwnedFd;

use pixmap_core::{Error, Result};

/// Serialized bytes and the handles they reference.
#[derive(Debug, Default)]
pub struct Parcel {
    data: Vec<u8>,
    cursor: usize,
    #[cfg(unix)]
    handles: Vec<Option<OwnedFd>>,
}

impl Parcel {
    /// Creates an empty parcel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps bytes produced by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// The byte stream, if the parcel carries no handles.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.handle_count() > 0 {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("parcel carries {} handle(s) and cannot be flattened", self.handle_count()),
            )));
        }
        Ok(self.data.clone())
    }

    /// Appends bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Reads the next `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&[u8]> {
        let end = self
            .cursor
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                Error::decode_mismatch(format!(
                    "need {len} bytes at offset {}, parcel has {}",
                    self.cursor,
                    self.data.len()
                ))
            })?;
        let bytes = &self.data[self.cursor..end];
        self.cursor = end;
        Ok(bytes)
    }

    /// Total bytes written.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    /// Moves the read cursor back to the start.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Offset of the read cursor.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Moves the read cursor to `pos`, clamped to the end of the data.
    pub fn set_position(&mut self, pos: usize) {
        self.cursor = pos.min(self.data.len());
    }

    /// Number of handle slots, taken or not.
    pub fn handle_count(&self) -> usize {
        #[cfg(unix)]
        {
            self.handles.len()
        }
        #[cfg(not(unix))]
        {
            0
        }
    }

    /// Appends a handle and returns its index.
    #[cfg(unix)]
    pub fn push_handle(&mut self, fd: OwnedFd) -> u32 {
        self.handles.push(Some(fd));
        (self.handles.len() - 1) as u32
    }

    /// Moves a handle out of the table; each index can be taken once.
    #[cfg(unix)]
    pub fn take_handle(&mut self, index: u32) -> Result<OwnedFd> {
        self.handles
            .get_mut(index as usize)
            .and_then(Option::take)
            .ok_or_else(|| Error::decode_mismatch(format!("handle {index} missing or already taken")))
    }
}
