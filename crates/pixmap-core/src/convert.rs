//! Cross-format pixel conversion.
//!
//! Every conversion goes through the canonical ARGB color: decode with the
//! source format's rule, reconcile alpha, encode with the destination rule.

use tracing::debug;

use crate::alpha::AlphaConversionKind;
use crate::buffer::PixelBuffer;
use crate::descriptor::{AlphaType, ImageDescriptor, PixelFormat};
use crate::error::{Error, Result};
use crate::format::{self, FormatEntry};

/// Converts rows of pixels between two descriptors' formats.
#[derive(Debug, Clone, Copy)]
pub struct PixelConverter {
    src: &'static FormatEntry,
    dst: &'static FormatEntry,
    alpha: AlphaConversionKind,
}

impl PixelConverter {
    /// Builds a converter from `src_info` pixels to `dst_info` pixels.
    ///
    /// Alpha types are taken as stored; use descriptors that came out of a
    /// [`PixelBuffer`] so they are already reconciled with their formats.
    pub fn new(src_info: &ImageDescriptor, dst_info: &ImageDescriptor) -> Result<Self> {
        let src = format::entry(src_info.pixel_format)
            .ok_or_else(|| Error::unsupported_format(src_info.pixel_format.name()))?;
        let dst = format::entry(dst_info.pixel_format)
            .ok_or_else(|| Error::unsupported_format(dst_info.pixel_format.name()))?;
        Ok(Self {
            src,
            dst,
            alpha: AlphaConversionKind::select(src_info.alpha_type, dst_info.alpha_type),
        })
    }

    /// Alpha handling this converter applies.
    #[inline]
    pub fn alpha_conversion(&self) -> AlphaConversionKind {
        self.alpha
    }

    /// Converts `pixel_count` pixels from the front of `src` into `dst`.
    pub fn convert_row(&self, dst: &mut [u8], src: &[u8], pixel_count: usize) -> Result<()> {
        let src_len = pixel_count * self.src.bytes_per_pixel;
        let dst_len = pixel_count * self.dst.bytes_per_pixel;
        if src.len() < src_len {
            return Err(Error::capacity_mismatch(src_len, src.len()));
        }
        if dst.len() < dst_len {
            return Err(Error::capacity_mismatch(dst_len, dst.len()));
        }
        let src_px = src[..src_len].chunks_exact(self.src.bytes_per_pixel);
        let dst_px = dst[..dst_len].chunks_exact_mut(self.dst.bytes_per_pixel);
        for (d, s) in dst_px.zip(src_px) {
            let argb = self.alpha.apply((self.src.to_canonical)(s));
            (self.dst.from_canonical)(argb, d);
        }
        Ok(())
    }
}

impl PixelBuffer {
    /// Copies the buffer into fresh heap memory in another format.
    ///
    /// The requested alpha type is reconciled with `pixel_format`; size,
    /// color space and editability carry over.
    pub fn convert_to(&self, pixel_format: PixelFormat, alpha_type: AlphaType) -> Result<PixelBuffer> {
        let src = self.pixels().ok_or(Error::NoMemory)?;
        let info = ImageDescriptor {
            pixel_format,
            alpha_type,
            ..*self.descriptor()
        };
        let mut out = PixelBuffer::allocate(info)?;
        let converter = PixelConverter::new(self.descriptor(), out.descriptor())?;
        let width = self.width() as usize;
        let (src_stride, dst_stride) = (self.row_stride(), out.row_stride());
        let dst = out.pixels_mut().ok_or(Error::NoMemory)?;
        for (d, s) in dst.chunks_mut(dst_stride).zip(src.chunks(src_stride)) {
            converter.convert_row(d, s, width)?;
        }
        out.set_editable(self.is_editable());
        debug!(
            from = %self.pixel_format(),
            to = %pixel_format,
            alpha = ?converter.alpha_conversion(),
            "converted buffer"
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::PixelMemory;

    fn argb_buffer(pixels: &[u32], width: i32, alpha: AlphaType) -> PixelBuffer {
        let height = pixels.len() as i32 / width;
        let mut buf = PixelBuffer::new();
        buf.set_descriptor(ImageDescriptor::new(width, height, PixelFormat::Argb8888).with_alpha_type(alpha))
            .unwrap();
        let bytes: Vec<u8> = pixels.iter().flat_map(|p| p.to_be_bytes()).collect();
        buf.attach_memory(PixelMemory::from_vec(bytes)).unwrap();
        buf
    }

    #[test]
    fn test_convert_row_reorders() {
        let src = ImageDescriptor::new(2, 1, PixelFormat::Argb8888).with_alpha_type(AlphaType::Premultiplied);
        let dst = ImageDescriptor::new(2, 1, PixelFormat::Rgba8888).with_alpha_type(AlphaType::Premultiplied);
        let conv = PixelConverter::new(&src, &dst).unwrap();
        assert_eq!(conv.alpha_conversion(), AlphaConversionKind::None);
        let mut out = [0u8; 8];
        conv.convert_row(&mut out, &[1, 2, 3, 4, 5, 6, 7, 8], 2).unwrap();
        assert_eq!(out, [2, 3, 4, 1, 6, 7, 8, 5]);
    }

    #[test]
    fn test_convert_row_length_checks() {
        let info = ImageDescriptor::new(1, 1, PixelFormat::Rgb888);
        let conv = PixelConverter::new(&info, &info).unwrap();
        assert!(conv.convert_row(&mut [0; 3], &[0; 2], 1).is_err());
        assert!(conv.convert_row(&mut [0; 2], &[0; 3], 1).is_err());
        assert!(PixelConverter::new(&ImageDescriptor::default(), &info).is_err());
    }

    #[test]
    fn test_convert_unpremul_to_premul() {
        let src = argb_buffer(&[0x80FF_4000, 0xFF10_2030], 2, AlphaType::Unpremultiplied);
        let out = src.convert_to(PixelFormat::Bgra8888, AlphaType::Premultiplied).unwrap();
        assert_eq!(out.alpha_type(), AlphaType::Premultiplied);
        assert_eq!(out.color_at(0, 0), Some(0x8080_2000));
        assert_eq!(out.color_at(1, 0), Some(0xFF10_2030));
    }

    #[test]
    fn test_convert_premul_to_opaque_format() {
        let src = argb_buffer(&[0x8040_2000], 1, AlphaType::Premultiplied);
        let out = src.convert_to(PixelFormat::Rgb888, AlphaType::Unknown).unwrap();
        assert_eq!(out.alpha_type(), AlphaType::Opaque);
        assert_eq!(out.pixel_at(0, 0), Some(&[0x80u8, 0x40, 0x00][..]));
    }

    #[test]
    fn test_convert_to_alpha8_keeps_padding_rows() {
        let src = argb_buffer(&[0x1100_0000, 0x2200_0000, 0x3300_0000, 0x4400_0000], 1, AlphaType::Premultiplied);
        let out = src.convert_to(PixelFormat::Alpha8, AlphaType::Premultiplied).unwrap();
        assert_eq!(out.row_stride(), 4);
        assert_eq!(out.pixel8(0, 3), Some(0x44));
    }

    #[test]
    fn test_convert_keeps_color_space() {
        let mut src = PixelBuffer::new();
        src.set_descriptor(
            ImageDescriptor::new(1, 1, PixelFormat::Rgb565).with_color_space(crate::ColorSpace::DisplayP3),
        )
        .unwrap();
        src.attach_memory(PixelMemory::from_vec(vec![0x08, 0x09])).unwrap();
        let out = src.convert_to(PixelFormat::Argb8888, AlphaType::Premultiplied).unwrap();
        assert_eq!(out.color_space(), crate::ColorSpace::DisplayP3);
        assert_eq!(out.color_at(0, 0), Some(0xFF42_2008));
    }
}
