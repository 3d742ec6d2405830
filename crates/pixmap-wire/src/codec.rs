//! Buffer encoding and decoding.
//!
//! # Header
//!
//! Every encoded buffer starts with a fixed 48-byte little-endian header:
//!
//! | Offset | Type | Field |
//! |--------|------|-------|
//! | 0 | `[u8; 4]` | magic `PXBF` |
//! | 4 | u16 | version (1) |
//! | 6 | u16 | flags (bit 0: editable) |
//! | 8 | i32 | width |
//! | 12 | i32 | height |
//! | 16 | u32 | pixel format |
//! | 20 | u32 | alpha type |
//! | 24 | u32 | color space |
//! | 28 | i32 | row stride |
//! | 32 | u32 | byte count |
//! | 36 | u32 | allocation strategy |
//! | 40 | u32 | payload kind (0 inline, 1 shared) |
//! | 44 | u32 | payload length |
//!
//! An inline payload is the `byte_count` pixel bytes. A shared payload is a
//! u32 handle index into the parcel's handle table and a u64 segment length.
//!
//! # Example
//!
//! ```rust
//! use pixmap_core::{ImageDescriptor, PixelBuffer, PixelFormat};
//! use pixmap_wire::{decode, encode, Parcel};
//!
//! let buf = PixelBuffer::allocate(ImageDescriptor::new(4, 4, PixelFormat::Rgba8888)).unwrap();
//! let mut parcel = Parcel::new();
//! encode(&buf, &mut parcel).unwrap();
//! let back = decode(&mut parcel).unwrap();
//! assert!(back.is_same_image(&buf));
//! ```

use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian as LE, ReadBytesExt, WriteBytesExt};
use pixmap_core::{
    AllocationStrategy, AlphaType, ColorSpace, Error, ImageDescriptor, PixelBuffer, PixelFormat,
    PixelMemory, Result, Size,
};
use tracing::{debug, trace, warn};

use crate::parcel::Parcel;
use crate::policy::WirePolicy;

/// Header magic.
pub const MAGIC: [u8; 4] = *b"PXBF";
/// Current header version.
pub const VERSION: u16 = 1;
/// Encoded header size in bytes.
pub const HEADER_LEN: usize = 48;

const FLAG_EDITABLE: u16 = 1;
const SHARED_PAYLOAD_LEN: u32 = 12;

/// Where the pixel bytes of an encoded buffer live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum PayloadKind {
    /// Bytes follow the header.
    Inline = 0,
    /// Bytes live in a shared segment referenced by handle.
    Shared = 1,
}

impl PayloadKind {
    fn from_raw(raw: u32) -> Result<Self> {
        match raw {
            0 => Ok(Self::Inline),
            1 => Ok(Self::Shared),
            other => Err(Error::decode_mismatch(format!("unknown payload kind {other}"))),
        }
    }
}

/// Decoded form of the fixed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireHeader {
    /// Editable flag of the encoded buffer
    pub editable: bool,
    /// Descriptor of the encoded buffer
    pub descriptor: ImageDescriptor,
    /// Row stride in bytes
    pub row_stride: i32,
    /// Total pixel bytes
    pub byte_count: u32,
    /// Strategy of the encoded buffer's memory
    pub strategy: AllocationStrategy,
    /// Payload branch
    pub payload: PayloadKind,
    /// Bytes of payload following the header
    pub payload_len: u32,
}

impl WireHeader {
    /// Writes the 48 header bytes.
    pub fn write_to(&self, w: &mut impl Write) -> std::io::Result<()> {
        w.write_all(&MAGIC)?;
        w.write_u16::<LE>(VERSION)?;
        w.write_u16::<LE>(if self.editable { FLAG_EDITABLE } else { 0 })?;
        w.write_i32::<LE>(self.descriptor.width())?;
        w.write_i32::<LE>(self.descriptor.height())?;
        w.write_u32::<LE>(self.descriptor.pixel_format.as_raw())?;
        w.write_u32::<LE>(self.descriptor.alpha_type.as_raw())?;
        w.write_u32::<LE>(self.descriptor.color_space.as_raw())?;
        w.write_i32::<LE>(self.row_stride)?;
        w.write_u32::<LE>(self.byte_count)?;
        w.write_u32::<LE>(self.strategy.as_raw())?;
        w.write_u32::<LE>(self.payload as u32)?;
        w.write_u32::<LE>(self.payload_len)?;
        Ok(())
    }

    /// Parses and sanity-checks 48 header bytes.
    pub fn read_from(bytes: &[u8]) -> Result<Self> {
        let mut r = Cursor::new(bytes);
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(Error::decode_mismatch(format!("bad magic {magic:02x?}")));
        }
        let version = r.read_u16::<LE>()?;
        if version != VERSION {
            return Err(Error::decode_mismatch(format!("unsupported version {version}")));
        }
        let flags = r.read_u16::<LE>()?;
        let width = r.read_i32::<LE>()?;
        let height = r.read_i32::<LE>()?;
        let descriptor = ImageDescriptor {
            size: Size::new(width, height),
            pixel_format: PixelFormat::from_raw(r.read_u32::<LE>()?),
            alpha_type: AlphaType::from_raw(r.read_u32::<LE>()?),
            color_space: ColorSpace::from_raw(r.read_u32::<LE>()?),
        };
        let row_stride = r.read_i32::<LE>()?;
        let byte_count = r.read_u32::<LE>()?;
        let raw_strategy = r.read_u32::<LE>()?;
        let strategy = AllocationStrategy::from_raw(raw_strategy)
            .ok_or_else(|| Error::decode_mismatch(format!("unknown allocation strategy {raw_strategy}")))?;
        let payload = PayloadKind::from_raw(r.read_u32::<LE>()?)?;
        let payload_len = r.read_u32::<LE>()?;
        Ok(Self {
            editable: flags & FLAG_EDITABLE != 0,
            descriptor,
            row_stride,
            byte_count,
            strategy,
            payload,
            payload_len,
        })
    }
}

/// Encoder/decoder bound to a [`WirePolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Codec {
    policy: WirePolicy,
}

impl Codec {
    /// Creates a codec with the given policy.
    pub fn new(policy: WirePolicy) -> Self {
        Self { policy }
    }

    /// The active policy.
    pub fn policy(&self) -> &WirePolicy {
        &self.policy
    }

    /// Appends `buffer` to `parcel`.
    pub fn encode(&self, buffer: &PixelBuffer, parcel: &mut Parcel) -> Result<()> {
        let pixels = buffer.pixels().ok_or(Error::NoMemory)?;
        let byte_count = u32::try_from(pixels.len())
            .map_err(|_| Error::decode_mismatch("byte count does not fit the header"))?;
        let mut header = WireHeader {
            editable: buffer.is_editable(),
            descriptor: *buffer.descriptor(),
            row_stride: buffer.row_stride() as i32,
            byte_count,
            strategy: buffer.allocation_strategy().unwrap_or_default(),
            payload: PayloadKind::Inline,
            payload_len: byte_count,
        };

        if self.policy.is_inline(pixels.len()) || cfg!(not(unix)) {
            let mut head = Vec::with_capacity(HEADER_LEN);
            header.write_to(&mut head)?;
            parcel.write_bytes(&head);
            parcel.write_bytes(pixels);
            trace!(byte_count, "encoded inline");
            return Ok(());
        }

        #[cfg(unix)]
        {
            let (fd, segment_len) = shared_handle(buffer, pixels)?;
            header.payload = PayloadKind::Shared;
            header.payload_len = SHARED_PAYLOAD_LEN;
            let index = parcel.push_handle(fd);
            let mut head = Vec::with_capacity(HEADER_LEN + SHARED_PAYLOAD_LEN as usize);
            header.write_to(&mut head)?;
            head.write_u32::<LE>(index)?;
            head.write_u64::<LE>(segment_len as u64)?;
            parcel.write_bytes(&head);
            debug!(byte_count, index, segment_len, "encoded through shared segment");
        }
        Ok(())
    }

    /// Reads the next buffer from `parcel`.
    ///
    /// Any header, layout, policy or payload inconsistency is reported as
    /// [`Error::DecodeMismatch`]. On error the read cursor is put back where
    /// it was, so the same bytes can be decoded again. A shared-memory handle
    /// already moved out of the parcel's table stays taken.
    pub fn decode(&self, parcel: &mut Parcel) -> Result<PixelBuffer> {
        let start = parcel.position();
        let result = self.decode_next(parcel);
        if result.is_err() {
            parcel.set_position(start);
        }
        result
    }

    fn decode_next(&self, parcel: &mut Parcel) -> Result<PixelBuffer> {
        let header = WireHeader::read_from(parcel.read_bytes(HEADER_LEN)?)?;
        trace!(?header, "decoding");

        let mut buffer = PixelBuffer::new();
        buffer
            .set_descriptor(header.descriptor)
            .map_err(|e| Error::decode_mismatch(format!("descriptor rejected: {e}")))?;
        if buffer.alpha_type() != header.descriptor.alpha_type {
            return Err(Error::decode_mismatch(format!(
                "alpha type {} is not valid for {}",
                header.descriptor.alpha_type, header.descriptor.pixel_format
            )));
        }
        if buffer.row_stride() != header.row_stride as usize || buffer.byte_count() != header.byte_count as usize {
            return Err(Error::decode_mismatch(format!(
                "layout {} / {} disagrees with descriptor ({} / {})",
                header.row_stride,
                header.byte_count,
                buffer.row_stride(),
                buffer.byte_count()
            )));
        }
        let expected_inline = self.policy.is_inline(buffer.byte_count()) || cfg!(not(unix));
        if expected_inline != (header.payload == PayloadKind::Inline) {
            warn!(payload = ?header.payload, byte_count = header.byte_count, "payload branch disagrees with policy");
            return Err(Error::decode_mismatch(format!(
                "{:?} payload for {} bytes contradicts inline threshold {}",
                header.payload, header.byte_count, self.policy.inline_threshold
            )));
        }

        let memory = match header.payload {
            PayloadKind::Inline => {
                if header.payload_len != header.byte_count {
                    return Err(Error::decode_mismatch("inline payload length differs from byte count"));
                }
                let bytes = parcel.read_bytes(header.byte_count as usize)?;
                let mut memory = PixelMemory::heap(bytes.len())?;
                memory.as_mut_slice().copy_from_slice(bytes);
                memory
            }
            PayloadKind::Shared => self.read_shared(&header, parcel)?,
        };
        buffer.attach_memory(memory)?;
        buffer.set_editable(header.editable);
        debug!(
            width = buffer.width(),
            height = buffer.height(),
            payload = ?header.payload,
            "decoded buffer"
        );
        Ok(buffer)
    }

    #[cfg(unix)]
    fn read_shared(&self, header: &WireHeader, parcel: &mut Parcel) -> Result<PixelMemory> {
        if header.payload_len != SHARED_PAYLOAD_LEN {
            return Err(Error::decode_mismatch("shared payload length must be 12"));
        }
        let mut r = Cursor::new(parcel.read_bytes(SHARED_PAYLOAD_LEN as usize)?);
        let index = r.read_u32::<LE>()?;
        let segment_len = usize::try_from(r.read_u64::<LE>()?)
            .map_err(|_| Error::decode_mismatch("segment length overflows"))?;
        if segment_len < header.byte_count as usize {
            return Err(Error::decode_mismatch(format!(
                "segment of {segment_len} bytes cannot hold {}",
                header.byte_count
            )));
        }
        let fd = parcel.take_handle(index)?;
        let segment = pixmap_core::SharedSegment::from_fd(fd, segment_len)
            .map_err(|e| Error::decode_mismatch(format!("cannot map segment: {e}")))?;
        Ok(PixelMemory::from_segment(segment))
    }

    #[cfg(not(unix))]
    fn read_shared(&self, _header: &WireHeader, _parcel: &mut Parcel) -> Result<PixelMemory> {
        Err(Error::decode_mismatch("shared payloads need a unix host"))
    }
}

/// Returns a descriptor for the buffer's pixels in shared memory: a
/// duplicate of its own segment, or a fresh segment holding a copy.
#[cfg(unix)]
fn shared_handle(buffer: &PixelBuffer, pixels: &[u8]) -> Result<(std::os::fd::OwnedFd, usize)> {
    if let Some(segment) = buffer.memory().and_then(PixelMemory::segment) {
        return Ok((segment.try_clone_fd()?, segment.len()));
    }
    let mut segment = pixmap_core::SharedSegment::create(pixels.len())?;
    segment.as_mut_slice().copy_from_slice(pixels);
    Ok((segment.try_clone_fd()?, segment.len()))
}

/// Encodes with the default policy.
pub fn encode(buffer: &PixelBuffer, parcel: &mut Parcel) -> Result<()> {
    Codec::default().encode(buffer, parcel)
}

/// Decodes with the default policy.
pub fn decode(parcel: &mut Parcel) -> Result<PixelBuffer> {
    Codec::default().decode(parcel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixmap_core::Position;

    fn gradient(width: i32, height: i32, format: PixelFormat) -> PixelBuffer {
        let mut buf = PixelBuffer::allocate(ImageDescriptor::new(width, height, format)).unwrap();
        for (i, b) in buf.pixels_mut().unwrap().iter_mut().enumerate() {
            *b = (i * 7 % 251) as u8;
        }
        buf
    }

    fn header_bytes(parcel: &Parcel) -> Vec<u8> {
        let mut copy = Parcel::from_bytes(parcel.to_bytes().unwrap());
        copy.read_bytes(HEADER_LEN).unwrap().to_vec()
    }

    #[test]
    fn test_header_layout() {
        let mut buf = gradient(3, 2, PixelFormat::Rgb888);
        buf.set_editable(true);
        let mut parcel = Parcel::new();
        encode(&buf, &mut parcel).unwrap();
        assert_eq!(parcel.len(), HEADER_LEN + 18);

        let head = header_bytes(&parcel);
        assert_eq!(&head[0..4], b"PXBF");
        assert_eq!(&head[4..6], &[1, 0]);
        assert_eq!(&head[6..8], &[1, 0]);
        assert_eq!(&head[8..12], &3i32.to_le_bytes());
        assert_eq!(&head[16..20], &5u32.to_le_bytes());
        assert_eq!(&head[20..24], &1u32.to_le_bytes());
        assert_eq!(&head[24..28], &2u32.to_le_bytes());
        assert_eq!(&head[28..32], &9i32.to_le_bytes());
        assert_eq!(&head[32..36], &18u32.to_le_bytes());
        assert_eq!(&head[40..44], &0u32.to_le_bytes());
    }

    #[test]
    fn test_inline_roundtrip() {
        let mut buf = gradient(5, 3, PixelFormat::Alpha8);
        buf.set_editable(true);
        buf.write_pixel(Position::new(4, 2), 0x7F00_0000).unwrap();
        let mut parcel = Parcel::new();
        encode(&buf, &mut parcel).unwrap();
        let back = decode(&mut parcel).unwrap();
        assert!(back.is_same_image(&buf));
        assert!(back.is_editable());
        assert_eq!(back.allocation_strategy(), Some(AllocationStrategy::Heap));
        assert_eq!(parcel.remaining(), 0);
    }

    #[test]
    fn test_several_buffers_in_one_parcel() {
        let a = gradient(2, 2, PixelFormat::Argb8888);
        let b = gradient(3, 1, PixelFormat::Rgb565);
        let mut parcel = Parcel::new();
        encode(&a, &mut parcel).unwrap();
        encode(&b, &mut parcel).unwrap();
        assert!(decode(&mut parcel).unwrap().is_same_image(&a));
        assert!(decode(&mut parcel).unwrap().is_same_image(&b));
    }

    #[cfg(unix)]
    #[test]
    fn test_shared_roundtrip() {
        let buf = gradient(128, 128, PixelFormat::Argb8888);
        let mut parcel = Parcel::new();
        encode(&buf, &mut parcel).unwrap();
        assert_eq!(parcel.handle_count(), 1);
        assert_eq!(parcel.len(), HEADER_LEN + 12);

        let back = decode(&mut parcel).unwrap();
        assert!(back.is_same_image(&buf));
        assert_eq!(back.allocation_strategy(), Some(AllocationStrategy::SharedSegment));

        // Re-encoding a shared buffer shares its segment.
        let mut again = Parcel::new();
        encode(&back, &mut again).unwrap();
        let mut third = decode(&mut again).unwrap();
        third.set_editable(true);
        third.write_pixel(Position::new(0, 0), 0x0102_0304).unwrap();
        assert_eq!(back.color_at(0, 0), Some(0x0102_0304));
    }

    #[cfg(unix)]
    #[test]
    fn test_threshold_is_symmetric() {
        let buf = gradient(8, 8, PixelFormat::Argb8888);
        let mut parcel = Parcel::new();
        encode(&buf, &mut parcel).unwrap();
        let strict = Codec::new(WirePolicy { inline_threshold: 64 });
        let err = strict.decode(&mut parcel).unwrap_err();
        assert!(matches!(err, Error::DecodeMismatch(_)));

        // The rejected buffer is still there for a matching codec.
        assert_eq!(parcel.position(), 0);
        assert!(decode(&mut parcel).unwrap().is_same_image(&buf));
    }

    #[test]
    fn test_bad_magic_and_version() {
        let buf = gradient(2, 2, PixelFormat::Argb8888);
        let mut parcel = Parcel::new();
        encode(&buf, &mut parcel).unwrap();
        let bytes = parcel.to_bytes().unwrap();

        let mut bad = bytes.clone();
        bad[0] = b'X';
        assert!(matches!(decode(&mut Parcel::from_bytes(bad)), Err(Error::DecodeMismatch(_))));

        let mut bad = bytes.clone();
        bad[4] = 2;
        assert!(matches!(decode(&mut Parcel::from_bytes(bad)), Err(Error::DecodeMismatch(_))));
    }

    #[test]
    fn test_inconsistent_layout_rejected() {
        let buf = gradient(2, 2, PixelFormat::Argb8888);
        let mut parcel = Parcel::new();
        encode(&buf, &mut parcel).unwrap();
        let bytes = parcel.to_bytes().unwrap();

        // Row stride.
        let mut bad = bytes.clone();
        bad[28..32].copy_from_slice(&12i32.to_le_bytes());
        assert!(matches!(decode(&mut Parcel::from_bytes(bad)), Err(Error::DecodeMismatch(_))));

        // Unknown format.
        let mut bad = bytes.clone();
        bad[16..20].copy_from_slice(&7u32.to_le_bytes());
        assert!(matches!(decode(&mut Parcel::from_bytes(bad)), Err(Error::DecodeMismatch(_))));

        // Negative width.
        let mut bad = bytes.clone();
        bad[8..12].copy_from_slice(&(-2i32).to_le_bytes());
        assert!(matches!(decode(&mut Parcel::from_bytes(bad)), Err(Error::DecodeMismatch(_))));

        // Alpha type impossible for the format.
        let mut bad = bytes.clone();
        bad[16..20].copy_from_slice(&PixelFormat::Rgb888.as_raw().to_le_bytes());
        assert!(matches!(decode(&mut Parcel::from_bytes(bad)), Err(Error::DecodeMismatch(_))));

        // Unknown payload kind.
        let mut bad = bytes.clone();
        bad[40..44].copy_from_slice(&9u32.to_le_bytes());
        assert!(matches!(decode(&mut Parcel::from_bytes(bad)), Err(Error::DecodeMismatch(_))));
    }

    #[test]
    fn test_truncated_rejected() {
        let buf = gradient(2, 2, PixelFormat::Argb8888);
        let mut parcel = Parcel::new();
        encode(&buf, &mut parcel).unwrap();
        let bytes = parcel.to_bytes().unwrap();
        for len in [0, 10, HEADER_LEN, bytes.len() - 1] {
            let mut short = Parcel::from_bytes(bytes[..len].to_vec());
            assert!(matches!(decode(&mut short), Err(Error::DecodeMismatch(_))), "len {len}");
            assert_eq!(short.remaining(), len, "len {len}");
        }
    }

    #[test]
    fn test_failed_decode_keeps_cursor() {
        let a = gradient(2, 2, PixelFormat::Argb8888);
        let mut parcel = Parcel::new();
        encode(&a, &mut parcel).unwrap();
        let mut bytes = parcel.to_bytes().unwrap();
        let first_len = bytes.len();
        // Second buffer carries a bad row stride.
        bytes.extend_from_within(..first_len);
        bytes[first_len + 28..first_len + 32].copy_from_slice(&12i32.to_le_bytes());

        let mut parcel = Parcel::from_bytes(bytes);
        assert!(decode(&mut parcel).unwrap().is_same_image(&a));
        assert_eq!(parcel.position(), first_len);
        assert!(decode(&mut parcel).is_err());
        assert_eq!(parcel.position(), first_len);
        assert_eq!(parcel.remaining(), first_len);
    }

    #[test]
    fn test_encode_requires_memory() {
        let mut buf = gradient(2, 2, PixelFormat::Argb8888);
        buf.release();
        assert!(matches!(encode(&buf, &mut Parcel::new()), Err(Error::NoMemory)));
    }
}
