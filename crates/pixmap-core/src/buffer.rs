//! The pixel buffer: a descriptor, a row layout and attached memory.
//!
//! A [`PixelBuffer`] starts empty, is described with
//! [`set_descriptor`](PixelBuffer::set_descriptor), and receives bytes with
//! [`attach_memory`](PixelBuffer::attach_memory). Attached memory is released
//! when it is replaced, when the descriptor changes, on
//! [`release`](PixelBuffer::release), or when the buffer drops.
//!
//! # Memory Layout
//!
//! Rows are stored top-to-bottom, `row_stride` bytes apart:
//!
//! ```text
//! byte 0                         row_stride
//! [px px px ... px | pad]        ← row 0
//! [px px px ... px | pad]        ← row 1
//! ```
//!
//! Only `Alpha8` rows carry padding (up to a 4-byte boundary).
//!
//! # Usage
//!
//! ```rust
//! use pixmap_core::{ImageDescriptor, PixelBuffer, PixelFormat, PixelMemory};
//!
//! let mut buf = PixelBuffer::new();
//! buf.set_descriptor(ImageDescriptor::new(3, 3, PixelFormat::Argb8888)).unwrap();
//! buf.attach_memory(PixelMemory::heap(buf.byte_count()).unwrap()).unwrap();
//! buf.set_editable(true);
//!
//! assert!(buf.fill(0xFF00_FF00));
//! assert_eq!(buf.color_at(2, 2), Some(0xFF00_FF00));
//! assert_eq!(buf.color_at(3, 0), None);
//! ```

use tracing::{debug, trace, warn};

use crate::descriptor::{AlphaType, ColorSpace, ImageDescriptor, PixelFormat, Size};
use crate::error::{Error, Result};
use crate::format::{self, FormatEntry};
use crate::memory::{AllocationStrategy, PixelMemory};
use crate::rect::{Position, Rect};

/// Largest byte count a buffer may describe (600 MiB).
pub const MAX_BYTE_COUNT: u64 = 600 * 1024 * 1024;

/// Validated row layout of a descriptor.
#[derive(Debug, Clone, Copy)]
struct Layout {
    row_stride: usize,
    byte_count: usize,
}

fn layout_for(desc: &ImageDescriptor) -> Result<Layout> {
    let Size { width, height } = desc.size;
    if width <= 0 || height <= 0 {
        return Err(Error::invalid_geometry(width, height, "dimensions must be positive"));
    }
    if !desc.pixel_format.is_known() {
        return Err(Error::unsupported_format(desc.pixel_format.name()));
    }
    if desc.color_space == ColorSpace::Unknown {
        return Err(Error::unsupported_format("unknown color space"));
    }
    let row_stride = format::row_stride(desc.pixel_format, width as usize)
        .filter(|&s| i32::try_from(s).is_ok())
        .ok_or_else(|| Error::invalid_geometry(width, height, "row stride overflows"))?;
    let byte_count = (row_stride as u64)
        .checked_mul(height as u64)
        .ok_or_else(|| Error::invalid_geometry(width, height, "byte count overflows"))?;
    if byte_count > MAX_BYTE_COUNT {
        return Err(Error::TooLarge {
            requested: byte_count,
            limit: MAX_BYTE_COUNT,
        });
    }
    Ok(Layout {
        row_stride,
        byte_count: byte_count as usize,
    })
}

/// An image in a native pixel format, plus the memory that holds it.
///
/// # Invariants
///
/// - `byte_count == row_stride * height`
/// - `row_stride >= width * bytes_per_pixel`
/// - attached memory implies a set descriptor and `capacity >= byte_count`
///
/// Writes require [`is_editable`](Self::is_editable); a fresh buffer is not
/// editable.
#[derive(Debug, Default)]
pub struct PixelBuffer {
    descriptor: ImageDescriptor,
    row_stride: usize,
    byte_count: usize,
    memory: Option<PixelMemory>,
    editable: bool,
}

impl PixelBuffer {
    /// Creates an empty, undescribed buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Describes a buffer and attaches zeroed heap memory for it.
    pub fn allocate(descriptor: ImageDescriptor) -> Result<Self> {
        let mut buffer = Self::new();
        buffer.set_descriptor(descriptor)?;
        buffer.attach_memory(PixelMemory::heap(buffer.byte_count)?)?;
        Ok(buffer)
    }

    // ========================================================================
    // Structure
    // ========================================================================

    /// Sets size, format, alpha type and color space.
    ///
    /// The alpha type is reconciled with the format (see
    /// [`AlphaType::valid_for`]). On success any attached memory is released;
    /// on failure the buffer is left as it was.
    pub fn set_descriptor(&mut self, descriptor: ImageDescriptor) -> Result<()> {
        let layout = layout_for(&descriptor).inspect_err(|e| {
            warn!(error = %e, "rejected descriptor");
        })?;
        let mut descriptor = descriptor;
        descriptor.alpha_type = descriptor.alpha_type.valid_for(descriptor.pixel_format);

        if let Some(old) = self.memory.take() {
            debug!(strategy = %old.strategy(), "releasing memory on re-describe");
        }
        self.descriptor = descriptor;
        self.row_stride = layout.row_stride;
        self.byte_count = layout.byte_count;
        trace!(
            width = descriptor.width(),
            height = descriptor.height(),
            format = %descriptor.pixel_format,
            alpha = %descriptor.alpha_type,
            row_stride = layout.row_stride,
            byte_count = layout.byte_count,
            "descriptor set"
        );
        Ok(())
    }

    /// Re-describes the buffer while keeping its memory.
    ///
    /// The new layout must fit the attached capacity.
    pub fn reset_config(&mut self, size: Size, pixel_format: PixelFormat) -> Result<()> {
        let capacity = self.memory.as_ref().ok_or(Error::NoMemory)?.capacity();
        let descriptor = ImageDescriptor {
            size,
            pixel_format,
            alpha_type: self.descriptor.alpha_type.valid_for(pixel_format),
            color_space: self.descriptor.color_space,
        };
        let layout = layout_for(&descriptor)?;
        if layout.byte_count > capacity {
            return Err(Error::capacity_mismatch(layout.byte_count, capacity));
        }
        self.descriptor = descriptor;
        self.row_stride = layout.row_stride;
        self.byte_count = layout.byte_count;
        debug!(width = size.width, height = size.height, format = %pixel_format, "config reset");
        Ok(())
    }

    /// Attaches memory, releasing whatever was attached before.
    ///
    /// Rejected memory is released before the error returns.
    pub fn attach_memory(&mut self, memory: PixelMemory) -> Result<()> {
        if self.descriptor.is_unset() {
            return Err(Error::invalid_geometry(0, 0, "descriptor not set"));
        }
        if memory.capacity() < self.byte_count {
            warn!(
                capacity = memory.capacity(),
                required = self.byte_count,
                "memory too small"
            );
            return Err(Error::capacity_mismatch(self.byte_count, memory.capacity()));
        }
        debug!(strategy = %memory.strategy(), capacity = memory.capacity(), "memory attached");
        self.memory = Some(memory);
        Ok(())
    }

    /// Detaches and releases memory; the descriptor is kept.
    pub fn release(&mut self) {
        if let Some(memory) = self.memory.take() {
            debug!(strategy = %memory.strategy(), "memory released");
        }
    }

    /// Detaches memory without releasing it.
    pub fn take_memory(&mut self) -> Option<PixelMemory> {
        self.memory.take()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current descriptor.
    #[inline]
    pub fn descriptor(&self) -> &ImageDescriptor {
        &self.descriptor
    }

    /// Width in pixels (0 when unset).
    #[inline]
    pub fn width(&self) -> i32 {
        self.descriptor.width()
    }

    /// Height in pixels (0 when unset).
    #[inline]
    pub fn height(&self) -> i32 {
        self.descriptor.height()
    }

    /// Native pixel format.
    #[inline]
    pub fn pixel_format(&self) -> PixelFormat {
        self.descriptor.pixel_format
    }

    /// Alpha convention.
    #[inline]
    pub fn alpha_type(&self) -> AlphaType {
        self.descriptor.alpha_type
    }

    /// Color space tag.
    #[inline]
    pub fn color_space(&self) -> ColorSpace {
        self.descriptor.color_space
    }

    /// Bytes between the starts of consecutive rows.
    #[inline]
    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    /// `row_stride * height`.
    #[inline]
    pub fn byte_count(&self) -> usize {
        self.byte_count
    }

    /// Bytes per pixel of the current format.
    #[inline]
    pub fn bytes_per_pixel(&self) -> usize {
        self.descriptor.pixel_format.bytes_per_pixel()
    }

    /// Capacity of the attached memory, 0 when none.
    pub fn capacity(&self) -> usize {
        self.memory.as_ref().map_or(0, PixelMemory::capacity)
    }

    /// Strategy of the attached memory.
    pub fn allocation_strategy(&self) -> Option<AllocationStrategy> {
        self.memory.as_ref().map(PixelMemory::strategy)
    }

    /// Attached memory.
    pub fn memory(&self) -> Option<&PixelMemory> {
        self.memory.as_ref()
    }

    /// Whether writes are permitted.
    #[inline]
    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Permits or forbids writes.
    #[inline]
    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    /// Changes the alpha type if it is valid for the current format.
    pub fn set_alpha_type(&mut self, alpha_type: AlphaType) -> bool {
        if self.descriptor.is_unset() || alpha_type == AlphaType::Unknown {
            return false;
        }
        if alpha_type.valid_for(self.descriptor.pixel_format) != alpha_type {
            warn!(alpha = %alpha_type, format = %self.descriptor.pixel_format, "alpha type not valid");
            return false;
        }
        self.descriptor.alpha_type = alpha_type;
        true
    }

    /// The `byte_count` bytes of image data, rows padded as laid out.
    pub fn pixels(&self) -> Option<&[u8]> {
        self.memory
            .as_ref()
            .map(|m| &m.as_slice()[..self.byte_count])
    }

    /// Mutable image data. Bypasses the editable flag.
    pub fn pixels_mut(&mut self) -> Option<&mut [u8]> {
        let byte_count = self.byte_count;
        self.memory
            .as_mut()
            .map(|m| &mut m.as_mut_slice()[..byte_count])
    }

    fn entry(&self) -> Option<&'static FormatEntry> {
        format::entry(self.descriptor.pixel_format)
    }

    fn pixel_offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width() || y >= self.height() {
            return None;
        }
        Some(y as usize * self.row_stride + x as usize * self.bytes_per_pixel())
    }

    // ========================================================================
    // Soft reads
    // ========================================================================

    /// Native bytes of the pixel at (x, y), or `None` out of range.
    pub fn pixel_at(&self, x: i32, y: i32) -> Option<&[u8]> {
        let offset = self.pixel_offset(x, y)?;
        let data = self.pixels()?;
        data.get(offset..offset + self.bytes_per_pixel())
    }

    /// First byte of the pixel at (x, y).
    pub fn pixel8(&self, x: i32, y: i32) -> Option<u8> {
        self.pixel_at(x, y).map(|p| p[0])
    }

    /// First two bytes of the pixel at (x, y), native-endian.
    pub fn pixel16(&self, x: i32, y: i32) -> Option<u16> {
        let p = self.pixel_at(x, y)?;
        Some(u16::from_ne_bytes(p.get(..2)?.try_into().ok()?))
    }

    /// First four bytes of the pixel at (x, y), native-endian.
    pub fn pixel32(&self, x: i32, y: i32) -> Option<u32> {
        let p = self.pixel_at(x, y)?;
        Some(u32::from_ne_bytes(p.get(..4)?.try_into().ok()?))
    }

    /// Canonical ARGB of the pixel at (x, y), or `None` out of range.
    pub fn color_at(&self, x: i32, y: i32) -> Option<u32> {
        let entry = self.entry()?;
        self.pixel_at(x, y).map(entry.to_canonical)
    }

    // ========================================================================
    // Hard reads and writes
    // ========================================================================

    /// Validates a region copy and returns the bytes per region row.
    ///
    /// A region outside the image is [`Error::OutOfBounds`]; a caller slice
    /// too short for `offset` and `stride`, or a stride shorter than a region
    /// row, is [`Error::CapacityMismatch`].
    fn check_region(&self, caller_len: usize, offset: usize, stride: usize, region: &Rect) -> Result<usize> {
        if !region.fits_within(self.descriptor.size) {
            return Err(Error::out_of_bounds(region.x, region.y, self.width(), self.height()));
        }
        let row_bytes = region.width as usize * self.bytes_per_pixel();
        if stride < row_bytes {
            return Err(Error::capacity_mismatch(row_bytes, stride));
        }
        let end = stride
            .checked_mul(region.height as usize - 1)
            .and_then(|v| v.checked_add(offset))
            .and_then(|v| v.checked_add(row_bytes))
            .unwrap_or(usize::MAX);
        if end > caller_len {
            return Err(Error::capacity_mismatch(end, caller_len));
        }
        Ok(row_bytes)
    }

    /// Copies `region` into `dst`, row `r` starting at `offset + r * stride`.
    pub fn read_region(&self, dst: &mut [u8], offset: usize, stride: usize, region: Rect) -> Result<()> {
        let row_bytes = self.check_region(dst.len(), offset, stride, &region)?;
        let data = self.pixels().ok_or(Error::NoMemory)?;
        let bpp = self.bytes_per_pixel();
        for row in 0..region.height as usize {
            let src_start = (region.y as usize + row) * self.row_stride + region.x as usize * bpp;
            let dst_start = offset + row * stride;
            dst[dst_start..dst_start + row_bytes]
                .copy_from_slice(&data[src_start..src_start + row_bytes]);
        }
        trace!(?region, offset, stride, "read region");
        Ok(())
    }

    /// Copies `src` into `region`, row `r` read from `offset + r * stride`.
    pub fn write_region(&mut self, src: &[u8], offset: usize, stride: usize, region: Rect) -> Result<()> {
        if !self.editable {
            return Err(Error::NotEditable);
        }
        let row_bytes = self.check_region(src.len(), offset, stride, &region)?;
        let bpp = self.bytes_per_pixel();
        let row_stride = self.row_stride;
        let data = self.pixels_mut().ok_or(Error::NoMemory)?;
        for row in 0..region.height as usize {
            let dst_start = (region.y as usize + row) * row_stride + region.x as usize * bpp;
            let src_start = offset + row * stride;
            data[dst_start..dst_start + row_bytes]
                .copy_from_slice(&src[src_start..src_start + row_bytes]);
        }
        trace!(?region, offset, stride, "wrote region");
        Ok(())
    }

    /// Copies all `byte_count` bytes into the front of `dst`.
    pub fn read_pixels(&self, dst: &mut [u8]) -> Result<()> {
        let data = self.pixels().ok_or(Error::NoMemory)?;
        if dst.len() < data.len() {
            return Err(Error::capacity_mismatch(data.len(), dst.len()));
        }
        dst[..data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Replaces all `byte_count` bytes from the front of `src`.
    pub fn write_pixels(&mut self, src: &[u8]) -> Result<()> {
        if !self.editable {
            return Err(Error::NotEditable);
        }
        let data = self.pixels_mut().ok_or(Error::NoMemory)?;
        if src.len() < data.len() {
            return Err(Error::capacity_mismatch(data.len(), src.len()));
        }
        let n = data.len();
        data.copy_from_slice(&src[..n]);
        Ok(())
    }

    /// Canonical ARGB at `pos`.
    pub fn read_pixel(&self, pos: Position) -> Result<u32> {
        if self.memory.is_none() {
            return Err(Error::NoMemory);
        }
        self.color_at(pos.x, pos.y)
            .ok_or_else(|| Error::out_of_bounds(pos.x, pos.y, self.width(), self.height()))
    }

    /// Encodes `argb` into the native format at `pos`.
    pub fn write_pixel(&mut self, pos: Position, argb: u32) -> Result<()> {
        if !self.editable {
            return Err(Error::NotEditable);
        }
        let entry = self.entry().ok_or(Error::NoMemory)?;
        let offset = self
            .pixel_offset(pos.x, pos.y)
            .ok_or_else(|| Error::out_of_bounds(pos.x, pos.y, self.width(), self.height()))?;
        let data = self.pixels_mut().ok_or(Error::NoMemory)?;
        (entry.from_canonical)(argb, &mut data[offset..offset + entry.bytes_per_pixel]);
        Ok(())
    }

    /// Writes `argb`, encoded in the native format, to every pixel.
    ///
    /// Returns `false` without writing when no memory is attached or the
    /// buffer is not editable. Row padding is left alone.
    pub fn fill(&mut self, argb: u32) -> bool {
        if !self.editable {
            return false;
        }
        let Some(entry) = self.entry() else {
            return false;
        };
        let mut encoded = [0u8; 8];
        let bpp = entry.bytes_per_pixel;
        (entry.from_canonical)(argb, &mut encoded[..bpp]);

        let row_bytes = self.width() as usize * bpp;
        let row_stride = self.row_stride;
        let Some(data) = self.pixels_mut() else {
            return false;
        };
        for row in data.chunks_mut(row_stride) {
            for px in row[..row_bytes].chunks_exact_mut(bpp) {
                px.copy_from_slice(&encoded[..bpp]);
            }
        }
        trace!(argb, "filled");
        true
    }

    // ========================================================================
    // Comparison and copies
    // ========================================================================

    /// Same descriptor, same stride and identical pixel bytes.
    pub fn is_same_image(&self, other: &PixelBuffer) -> bool {
        if self.descriptor != other.descriptor || self.row_stride != other.row_stride {
            return false;
        }
        match (self.pixels(), other.pixels()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Deep copy into fresh heap memory, keeping descriptor and editability.
    pub fn try_clone(&self) -> Result<Self> {
        let data = self.pixels().ok_or(Error::NoMemory)?;
        let mut memory = PixelMemory::heap(data.len())?;
        memory.as_mut_slice().copy_from_slice(data);
        let mut copy = Self::new();
        copy.set_descriptor(self.descriptor)?;
        copy.attach_memory(memory)?;
        copy.editable = self.editable;
        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::tests::counted_custom;
    use std::cell::Cell;
    use std::rc::Rc;

    /// 3x3 buffer whose byte `i` holds `i`.
    fn ramp(format: PixelFormat) -> PixelBuffer {
        let mut buf = PixelBuffer::new();
        buf.set_descriptor(ImageDescriptor::new(3, 3, format)).unwrap();
        let bytes: Vec<u8> = (0..buf.byte_count()).map(|i| i as u8).collect();
        buf.attach_memory(PixelMemory::from_vec(bytes)).unwrap();
        buf
    }

    #[test]
    fn test_byte_count_matches_bpp() {
        for format in PixelFormat::ALL {
            let mut buf = PixelBuffer::new();
            buf.set_descriptor(ImageDescriptor::new(8, 5, format)).unwrap();
            assert_eq!(buf.byte_count(), format.bytes_per_pixel() * 8 * 5, "{format}");
            assert_eq!(buf.row_stride(), format.bytes_per_pixel() * 8, "{format}");
        }
    }

    #[test]
    fn test_alpha8_rows_are_padded() {
        let buf = ramp(PixelFormat::Alpha8);
        assert_eq!(buf.row_stride(), 4);
        assert_eq!(buf.byte_count(), 12);
        assert_eq!(buf.pixel8(1, 1), Some(5));
        assert_eq!(buf.color_at(1, 1), Some(0x0500_0000));
        assert_eq!(buf.alpha_type(), AlphaType::Premultiplied);
    }

    #[test]
    fn test_color_at_layouts() {
        assert_eq!(ramp(PixelFormat::Argb8888).color_at(1, 1), Some(0x1011_1213));
        assert_eq!(ramp(PixelFormat::Rgb888).color_at(1, 1), Some(0xFF0C_0D0E));
        assert_eq!(ramp(PixelFormat::Rgb565).color_at(1, 1), Some(0xFF42_2008));
    }

    #[test]
    fn test_typed_reads() {
        let buf = ramp(PixelFormat::Argb8888);
        assert_eq!(buf.pixel_at(1, 1), Some(&[16u8, 17, 18, 19][..]));
        assert_eq!(buf.pixel16(1, 1), Some(u16::from_ne_bytes([16, 17])));
        assert_eq!(buf.pixel32(1, 1), Some(u32::from_ne_bytes([16, 17, 18, 19])));
        let buf = ramp(PixelFormat::Rgb565);
        assert_eq!(buf.pixel32(0, 0), None);
    }

    #[test]
    fn test_out_of_range_reads_are_none() {
        for format in PixelFormat::ALL {
            let buf = ramp(format);
            for (x, y) in [(-1, 0), (0, -1), (3, 0), (0, 3), (i32::MAX, i32::MAX)] {
                assert!(buf.pixel_at(x, y).is_none(), "{format} ({x}, {y})");
                assert!(buf.color_at(x, y).is_none(), "{format} ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_reads_without_memory_are_none() {
        let mut buf = PixelBuffer::new();
        buf.set_descriptor(ImageDescriptor::new(2, 2, PixelFormat::Argb8888)).unwrap();
        assert!(buf.pixel_at(0, 0).is_none());
        assert!(buf.color_at(0, 0).is_none());
        assert!(matches!(buf.read_pixel(Position::new(0, 0)), Err(Error::NoMemory)));
    }

    #[test]
    fn test_negative_width_rejected() {
        let mut buf = PixelBuffer::new();
        let err = buf
            .set_descriptor(ImageDescriptor::new(-10, 10, PixelFormat::Argb8888))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidGeometry { .. }));
        assert_eq!(buf.width(), 0);
        assert_eq!(buf.height(), 0);
        assert_eq!(buf.byte_count(), 0);
        assert_eq!(buf.pixel_format(), PixelFormat::Unknown);
        assert_eq!(buf.color_space(), ColorSpace::Srgb);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let mut buf = PixelBuffer::new();
        let err = buf
            .set_descriptor(ImageDescriptor::new(10, 10, PixelFormat::Unknown))
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
        let err = buf
            .set_descriptor(
                ImageDescriptor::new(10, 10, PixelFormat::Argb8888).with_color_space(ColorSpace::Unknown),
            )
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_too_large_rejected() {
        let mut buf = PixelBuffer::new();
        let err = buf
            .set_descriptor(ImageDescriptor::new(500 * 1024, 500 * 1024, PixelFormat::Argb8888))
            .unwrap_err();
        assert!(matches!(err, Error::TooLarge { .. }));
        assert!(buf.descriptor().is_unset());
    }

    #[test]
    fn test_failed_describe_keeps_previous_state() {
        let mut buf = ramp(PixelFormat::Argb8888);
        assert!(buf.set_descriptor(ImageDescriptor::new(0, 5, PixelFormat::Argb8888)).is_err());
        assert_eq!(buf.width(), 3);
        assert_eq!(buf.color_at(1, 1), Some(0x1011_1213));
    }

    #[test]
    fn test_attach_requires_descriptor_and_capacity() {
        let mut buf = PixelBuffer::new();
        let err = buf.attach_memory(PixelMemory::heap(16).unwrap()).unwrap_err();
        assert!(matches!(err, Error::InvalidGeometry { .. }));

        buf.set_descriptor(ImageDescriptor::new(2, 2, PixelFormat::Argb8888)).unwrap();
        let err = buf.attach_memory(PixelMemory::heap(15).unwrap()).unwrap_err();
        assert!(matches!(err, Error::CapacityMismatch { required: 16, capacity: 15 }));
        assert!(buf.memory().is_none());
        buf.attach_memory(PixelMemory::heap(32).unwrap()).unwrap();
        assert_eq!(buf.capacity(), 32);
        assert_eq!(buf.allocation_strategy(), Some(AllocationStrategy::Heap));
    }

    #[test]
    fn test_release_runs_once_everywhere() {
        let releases = Rc::new(Cell::new(0));
        let mut buf = PixelBuffer::new();
        buf.set_descriptor(ImageDescriptor::new(2, 2, PixelFormat::Argb8888)).unwrap();

        // Rejected attach.
        assert!(buf.attach_memory(counted_custom(4, &releases)).is_err());
        assert_eq!(releases.get(), 1);

        // Replacement.
        buf.attach_memory(counted_custom(16, &releases)).unwrap();
        buf.attach_memory(counted_custom(16, &releases)).unwrap();
        assert_eq!(releases.get(), 2);

        // Explicit release, then a second release is a no-op.
        buf.release();
        buf.release();
        assert_eq!(releases.get(), 3);

        // Re-describe.
        buf.attach_memory(counted_custom(16, &releases)).unwrap();
        buf.set_descriptor(ImageDescriptor::new(1, 1, PixelFormat::Argb8888)).unwrap();
        assert_eq!(releases.get(), 4);

        // Drop.
        buf.attach_memory(counted_custom(4, &releases)).unwrap();
        drop(buf);
        assert_eq!(releases.get(), 5);
    }

    #[test]
    fn test_writes_require_editable() {
        let mut buf = ramp(PixelFormat::Argb8888);
        assert!(!buf.fill(0));
        assert!(matches!(buf.write_pixel(Position::new(0, 0), 0), Err(Error::NotEditable)));
        assert!(matches!(buf.write_pixels(&[0; 36]), Err(Error::NotEditable)));
        assert!(matches!(
            buf.write_region(&[0; 4], 0, 4, Rect::new(0, 0, 1, 1)),
            Err(Error::NotEditable)
        ));
    }

    #[test]
    fn test_fill_without_memory_fails() {
        let mut buf = PixelBuffer::new();
        buf.set_descriptor(ImageDescriptor::new(2, 2, PixelFormat::Argb8888)).unwrap();
        buf.set_editable(true);
        assert!(!buf.fill(0xFFFF_FFFF));
    }

    #[test]
    fn test_fill_keeps_alpha8_padding() {
        let mut buf = ramp(PixelFormat::Alpha8);
        buf.set_editable(true);
        assert!(buf.fill(0x8000_0000));
        let data = buf.pixels().unwrap();
        assert_eq!(&data[..4], &[0x80, 0x80, 0x80, 3]);
    }

    #[test]
    fn test_fill_rgb565() {
        let mut buf = ramp(PixelFormat::Rgb565);
        buf.set_editable(true);
        assert!(buf.fill(0xFF42_2008));
        assert!(buf.pixels().unwrap().chunks(2).all(|px| px == [0x08, 0x09]));
    }

    #[test]
    fn test_read_write_pixel() {
        let mut buf = ramp(PixelFormat::Bgra8888);
        buf.set_editable(true);
        buf.write_pixel(Position::new(2, 1), 0x8011_2233).unwrap();
        assert_eq!(buf.read_pixel(Position::new(2, 1)).unwrap(), 0x8011_2233);
        assert_eq!(buf.pixel_at(2, 1), Some(&[0x33u8, 0x22, 0x11, 0x80][..]));
        let err = buf.write_pixel(Position::new(3, 0), 0).unwrap_err();
        assert!(err.is_bounds_error());
    }

    #[test]
    fn test_region_copy() {
        let src = ramp(PixelFormat::Argb8888);
        let mut dst = vec![0u8; 2 + 2 * 10];
        src.read_region(&mut dst, 2, 10, Rect::new(1, 1, 2, 2)).unwrap();
        assert_eq!(&dst[2..10], &[16, 17, 18, 19, 20, 21, 22, 23]);
        assert_eq!(&dst[12..20], &[28, 29, 30, 31, 32, 33, 34, 35]);

        let mut target = PixelBuffer::allocate(ImageDescriptor::new(3, 3, PixelFormat::Argb8888)).unwrap();
        target.set_editable(true);
        target.write_region(&dst, 2, 10, Rect::new(0, 0, 2, 2)).unwrap();
        assert_eq!(target.color_at(0, 0), Some(0x1011_1213));
        assert_eq!(target.color_at(1, 1), Some(0x2021_2223));
        assert_eq!(target.color_at(2, 2), Some(0));
    }

    #[test]
    fn test_region_bounds() {
        let src = ramp(PixelFormat::Argb8888);
        let mut dst = vec![0u8; 64];
        // Region outside the image.
        let err = src.read_region(&mut dst, 0, 12, Rect::new(2, 2, 2, 1)).unwrap_err();
        assert!(err.is_bounds_error());
        // Stride shorter than a region row.
        let err = src.read_region(&mut dst, 0, 4, Rect::new(0, 0, 2, 2)).unwrap_err();
        assert!(matches!(err, Error::CapacityMismatch { required: 8, capacity: 4 }));
        // Caller slice too short.
        let err = src.read_region(&mut dst[..10], 0, 12, Rect::new(0, 0, 3, 1)).unwrap_err();
        assert!(matches!(err, Error::CapacityMismatch { required: 12, capacity: 10 }));
        // Offset overruns.
        let err = src.read_region(&mut dst, 60, 12, Rect::new(0, 0, 3, 1)).unwrap_err();
        assert!(matches!(err, Error::CapacityMismatch { required: 72, capacity: 64 }));
        let err = src.read_region(&mut dst, usize::MAX, 12, Rect::new(0, 0, 1, 1)).unwrap_err();
        assert!(matches!(err, Error::CapacityMismatch { required: usize::MAX, .. }));

        let mut target = PixelBuffer::allocate(ImageDescriptor::new(3, 3, PixelFormat::Argb8888)).unwrap();
        target.set_editable(true);
        let err = target.write_region(&dst[..20], 0, 12, Rect::new(0, 0, 3, 2)).unwrap_err();
        assert!(matches!(err, Error::CapacityMismatch { required: 24, capacity: 20 }));
    }

    #[test]
    fn test_whole_buffer_copy() {
        let src = ramp(PixelFormat::Rgb888);
        let mut bytes = vec![0u8; src.byte_count()];
        src.read_pixels(&mut bytes).unwrap();
        assert_eq!(bytes[12], 12);
        assert!(src.read_pixels(&mut [0u8; 4]).is_err());

        let mut dst = PixelBuffer::allocate(*src.descriptor()).unwrap();
        dst.set_editable(true);
        dst.write_pixels(&bytes).unwrap();
        assert!(dst.is_same_image(&src));
    }

    #[test]
    fn test_set_alpha_type() {
        let mut buf = ramp(PixelFormat::Rgba8888);
        assert_eq!(buf.alpha_type(), AlphaType::Premultiplied);
        assert!(buf.set_alpha_type(AlphaType::Unpremultiplied));
        assert!(!buf.set_alpha_type(AlphaType::Unknown));

        let mut opaque = ramp(PixelFormat::Rgb888);
        assert!(!opaque.set_alpha_type(AlphaType::Premultiplied));
        assert!(opaque.set_alpha_type(AlphaType::Opaque));
        assert!(!PixelBuffer::new().set_alpha_type(AlphaType::Opaque));
    }

    #[test]
    fn test_reset_config() {
        let mut buf = ramp(PixelFormat::Argb8888);
        buf.reset_config(Size::new(2, 2), PixelFormat::Rgb565).unwrap();
        assert_eq!(buf.byte_count(), 8);
        assert_eq!(buf.capacity(), 36);
        assert_eq!(buf.alpha_type(), AlphaType::Opaque);
        let err = buf.reset_config(Size::new(10, 10), PixelFormat::Argb8888).unwrap_err();
        assert!(matches!(err, Error::CapacityMismatch { .. }));
        assert!(matches!(
            PixelBuffer::new().reset_config(Size::new(1, 1), PixelFormat::Argb8888),
            Err(Error::NoMemory)
        ));
    }

    #[test]
    fn test_same_image_and_clone() {
        let a = ramp(PixelFormat::Argb8888);
        let b = a.try_clone().unwrap();
        assert!(a.is_same_image(&b));
        assert_eq!(b.allocation_strategy(), Some(AllocationStrategy::Heap));

        let mut c = a.try_clone().unwrap();
        c.set_editable(true);
        c.write_pixel(Position::new(0, 0), 0).unwrap();
        assert!(!a.is_same_image(&c));
        assert!(!a.is_same_image(&ramp(PixelFormat::Rgba8888)));
    }
}
