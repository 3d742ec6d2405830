//! Static per-format conversion table.
//!
//! Every [`PixelFormat`] maps to a [`FormatEntry`] describing its pixel size
//! and the two rules that move one pixel to and from the canonical color:
//! 32-bit ARGB with 8 bits per channel, alpha in the top byte.
//!
//! The format set is closed, so dispatch is a plain `match` into a static
//! array; there is no registration step.
//!
//! # RGB565
//!
//! Expansion uses bit replication, not linear scaling: a 5-bit channel `v`
//! becomes `(v << 3) | (v >> 2)`, a 6-bit channel `(v << 2) | (v >> 4)`.
//!
//! ```rust
//! use pixmap_core::{format, PixelFormat};
//!
//! let entry = format::entry(PixelFormat::Rgb565).unwrap();
//! assert_eq!((entry.to_canonical)(&[0x08, 0x09]), 0xFF42_2008);
//! ```

use crate::alpha::{premultiply, unpremultiply, ALPHA_OPAQUE};
use crate::descriptor::PixelFormat;

/// Decodes one native pixel (exactly `bytes_per_pixel` bytes) to ARGB.
pub type ToCanonicalFn = fn(&[u8]) -> u32;

/// Encodes an ARGB color into one native pixel.
pub type FromCanonicalFn = fn(u32, &mut [u8]);

/// Conversion rules for one pixel format.
#[derive(Debug, Clone, Copy)]
pub struct FormatEntry {
    /// Format the entry describes
    pub pixel_format: PixelFormat,
    /// Bytes per pixel
    pub bytes_per_pixel: usize,
    /// Native → canonical
    pub to_canonical: ToCanonicalFn,
    /// Canonical → native
    pub from_canonical: FromCanonicalFn,
}

/// Row alignment applied to formats narrower than a word.
const ALPHA8_ROW_ALIGN: usize = 4;

static TABLE: [FormatEntry; 13] = [
    FormatEntry {
        pixel_format: PixelFormat::Argb8888,
        bytes_per_pixel: 4,
        to_canonical: argb8888_to_argb,
        from_canonical: argb_to_argb8888,
    },
    FormatEntry {
        pixel_format: PixelFormat::Rgb565,
        bytes_per_pixel: 2,
        to_canonical: rgb565_to_argb,
        from_canonical: argb_to_rgb565,
    },
    FormatEntry {
        pixel_format: PixelFormat::Rgba8888,
        bytes_per_pixel: 4,
        to_canonical: rgba8888_to_argb,
        from_canonical: argb_to_rgba8888,
    },
    FormatEntry {
        pixel_format: PixelFormat::Bgra8888,
        bytes_per_pixel: 4,
        to_canonical: bgra8888_to_argb,
        from_canonical: argb_to_bgra8888,
    },
    FormatEntry {
        pixel_format: PixelFormat::Rgb888,
        bytes_per_pixel: 3,
        to_canonical: rgb888_to_argb,
        from_canonical: argb_to_rgb888,
    },
    FormatEntry {
        pixel_format: PixelFormat::Alpha8,
        bytes_per_pixel: 1,
        to_canonical: alpha8_to_argb,
        from_canonical: argb_to_alpha8,
    },
    FormatEntry {
        pixel_format: PixelFormat::Abgr8888,
        bytes_per_pixel: 4,
        to_canonical: abgr8888_to_argb,
        from_canonical: argb_to_abgr8888,
    },
    FormatEntry {
        pixel_format: PixelFormat::Cmyk,
        bytes_per_pixel: 4,
        to_canonical: cmyk_to_argb,
        from_canonical: argb_to_cmyk,
    },
    FormatEntry {
        pixel_format: PixelFormat::Bgr888,
        bytes_per_pixel: 3,
        to_canonical: bgr888_to_argb,
        from_canonical: argb_to_bgr888,
    },
    FormatEntry {
        pixel_format: PixelFormat::Rgb161616,
        bytes_per_pixel: 6,
        to_canonical: rgb161616_to_argb,
        from_canonical: argb_to_rgb161616,
    },
    FormatEntry {
        pixel_format: PixelFormat::Rgba16161616,
        bytes_per_pixel: 8,
        to_canonical: rgba16161616_to_argb,
        from_canonical: argb_to_rgba16161616,
    },
    FormatEntry {
        pixel_format: PixelFormat::GrayBit,
        bytes_per_pixel: 1,
        to_canonical: gray_bit_to_argb,
        from_canonical: argb_to_gray_bit,
    },
    FormatEntry {
        pixel_format: PixelFormat::GrayAlpha,
        bytes_per_pixel: 2,
        to_canonical: gray_alpha_to_argb,
        from_canonical: argb_to_gray_alpha,
    },
];

/// Returns the table entry for `format`, or `None` for `Unknown`.
pub fn entry(format: PixelFormat) -> Option<&'static FormatEntry> {
    let index = match format {
        PixelFormat::Unknown => return None,
        PixelFormat::Argb8888 => 0,
        PixelFormat::Rgb565 => 1,
        PixelFormat::Rgba8888 => 2,
        PixelFormat::Bgra8888 => 3,
        PixelFormat::Rgb888 => 4,
        PixelFormat::Alpha8 => 5,
        PixelFormat::Abgr8888 => 6,
        PixelFormat::Cmyk => 7,
        PixelFormat::Bgr888 => 8,
        PixelFormat::Rgb161616 => 9,
        PixelFormat::Rgba16161616 => 10,
        PixelFormat::GrayBit => 11,
        PixelFormat::GrayAlpha => 12,
    };
    Some(&TABLE[index])
}

/// Minimum row stride for `width` pixels of `format`, or `None` on overflow.
///
/// `Alpha8` rows are padded to a 4-byte boundary; every other format is
/// packed.
pub fn row_stride(format: PixelFormat, width: usize) -> Option<usize> {
    let bpp = entry(format)?.bytes_per_pixel;
    let packed = width.checked_mul(bpp)?;
    if format == PixelFormat::Alpha8 {
        packed
            .checked_add(ALPHA8_ROW_ALIGN - 1)
            .map(|v| v / ALPHA8_ROW_ALIGN * ALPHA8_ROW_ALIGN)
    } else {
        Some(packed)
    }
}

// ============================================================================
// Canonical color helpers
// ============================================================================

/// Packs four channels into canonical ARGB.
#[inline]
pub const fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Alpha channel of a canonical color.
#[inline]
pub const fn alpha(argb: u32) -> u8 {
    (argb >> 24) as u8
}

/// Red channel of a canonical color.
#[inline]
pub const fn red(argb: u32) -> u8 {
    (argb >> 16) as u8
}

/// Green channel of a canonical color.
#[inline]
pub const fn green(argb: u32) -> u8 {
    (argb >> 8) as u8
}

/// Blue channel of a canonical color.
#[inline]
pub const fn blue(argb: u32) -> u8 {
    argb as u8
}

#[inline]
const fn expand5(v: u16) -> u8 {
    ((v << 3) | (v >> 2)) as u8
}

#[inline]
const fn expand6(v: u16) -> u8 {
    ((v << 2) | (v >> 4)) as u8
}

#[inline]
fn luma(argb: u32) -> u8 {
    let r = red(argb) as u32;
    let g = green(argb) as u32;
    let b = blue(argb) as u32;
    ((77 * r + 150 * g + 29 * b) >> 8) as u8
}

// ============================================================================
// 8-bit-per-channel formats
// ============================================================================

fn argb8888_to_argb(px: &[u8]) -> u32 {
    pack_argb(px[0], px[1], px[2], px[3])
}

fn argb_to_argb8888(argb: u32, px: &mut [u8]) {
    px[..4].copy_from_slice(&[alpha(argb), red(argb), green(argb), blue(argb)]);
}

fn rgba8888_to_argb(px: &[u8]) -> u32 {
    pack_argb(px[3], px[0], px[1], px[2])
}

fn argb_to_rgba8888(argb: u32, px: &mut [u8]) {
    px[..4].copy_from_slice(&[red(argb), green(argb), blue(argb), alpha(argb)]);
}

fn bgra8888_to_argb(px: &[u8]) -> u32 {
    pack_argb(px[3], px[2], px[1], px[0])
}

fn argb_to_bgra8888(argb: u32, px: &mut [u8]) {
    px[..4].copy_from_slice(&[blue(argb), green(argb), red(argb), alpha(argb)]);
}

fn abgr8888_to_argb(px: &[u8]) -> u32 {
    pack_argb(px[0], px[3], px[2], px[1])
}

fn argb_to_abgr8888(argb: u32, px: &mut [u8]) {
    px[..4].copy_from_slice(&[alpha(argb), blue(argb), green(argb), red(argb)]);
}

fn rgb888_to_argb(px: &[u8]) -> u32 {
    pack_argb(0xFF, px[0], px[1], px[2])
}

fn argb_to_rgb888(argb: u32, px: &mut [u8]) {
    px[..3].copy_from_slice(&[red(argb), green(argb), blue(argb)]);
}

fn bgr888_to_argb(px: &[u8]) -> u32 {
    pack_argb(0xFF, px[2], px[1], px[0])
}

fn argb_to_bgr888(argb: u32, px: &mut [u8]) {
    px[..3].copy_from_slice(&[blue(argb), green(argb), red(argb)]);
}

fn alpha8_to_argb(px: &[u8]) -> u32 {
    pack_argb(px[0], 0, 0, 0)
}

fn argb_to_alpha8(argb: u32, px: &mut [u8]) {
    px[0] = alpha(argb);
}

// ============================================================================
// Packed and wide formats
// ============================================================================

fn rgb565_to_argb(px: &[u8]) -> u32 {
    let v = u16::from_le_bytes([px[0], px[1]]);
    let r = v & 0x1F;
    let g = (v >> 5) & 0x3F;
    let b = (v >> 11) & 0x1F;
    pack_argb(0xFF, expand5(r), expand6(g), expand5(b))
}

fn argb_to_rgb565(argb: u32, px: &mut [u8]) {
    let r = (red(argb) >> 3) as u16;
    let g = (green(argb) >> 2) as u16;
    let b = (blue(argb) >> 3) as u16;
    let v = r | (g << 5) | (b << 11);
    px[..2].copy_from_slice(&v.to_le_bytes());
}

#[inline]
fn sample16_high(px: &[u8], index: usize) -> u8 {
    // Little-endian sample: the high byte is second.
    px[index * 2 + 1]
}

#[inline]
fn write_sample16(px: &mut [u8], index: usize, v: u8) {
    let wide = u16::from(v) * 257;
    px[index * 2..index * 2 + 2].copy_from_slice(&wide.to_le_bytes());
}

fn rgb161616_to_argb(px: &[u8]) -> u32 {
    pack_argb(0xFF, sample16_high(px, 0), sample16_high(px, 1), sample16_high(px, 2))
}

fn argb_to_rgb161616(argb: u32, px: &mut [u8]) {
    write_sample16(px, 0, red(argb));
    write_sample16(px, 1, green(argb));
    write_sample16(px, 2, blue(argb));
}

fn rgba16161616_to_argb(px: &[u8]) -> u32 {
    pack_argb(
        sample16_high(px, 3),
        sample16_high(px, 0),
        sample16_high(px, 1),
        sample16_high(px, 2),
    )
}

fn argb_to_rgba16161616(argb: u32, px: &mut [u8]) {
    write_sample16(px, 0, red(argb));
    write_sample16(px, 1, green(argb));
    write_sample16(px, 2, blue(argb));
    write_sample16(px, 3, alpha(argb));
}

fn gray_bit_to_argb(px: &[u8]) -> u32 {
    if px[0] & 0x80 != 0 { 0xFFFF_FFFF } else { 0xFF00_0000 }
}

fn argb_to_gray_bit(argb: u32, px: &mut [u8]) {
    px[0] = if luma(argb) & 0x80 != 0 { 0xFF } else { 0x00 };
}

fn gray_alpha_to_argb(px: &[u8]) -> u32 {
    pack_argb(px[1], px[0], px[0], px[0])
}

fn argb_to_gray_alpha(argb: u32, px: &mut [u8]) {
    px[0] = luma(argb);
    px[1] = alpha(argb);
}

fn cmyk_to_argb(px: &[u8]) -> u32 {
    let k = 255 - px[3] as u32;
    let channel = |ink: u8| premultiply(255 - ink as u32, k) as u8;
    pack_argb(0xFF, channel(px[0]), channel(px[1]), channel(px[2]))
}

fn argb_to_cmyk(argb: u32, px: &mut [u8]) {
    let max = red(argb).max(green(argb)).max(blue(argb)) as u32;
    if max == 0 {
        px[..4].copy_from_slice(&[0, 0, 0, 0xFF]);
        return;
    }
    let ink = |c: u8| (ALPHA_OPAQUE - unpremultiply(c as u32, max)) as u8;
    px[..4].copy_from_slice(&[
        ink(red(argb)),
        ink(green(argb)),
        ink(blue(argb)),
        (ALPHA_OPAQUE - max) as u8,
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_argb(format: PixelFormat, px: &[u8]) -> u32 {
        (entry(format).unwrap().to_canonical)(px)
    }

    fn from_argb(format: PixelFormat, argb: u32) -> Vec<u8> {
        let e = entry(format).unwrap();
        let mut px = vec![0u8; e.bytes_per_pixel];
        (e.from_canonical)(argb, &mut px);
        px
    }

    #[test]
    fn test_table_is_indexed_by_format() {
        for format in PixelFormat::ALL {
            assert_eq!(entry(format).unwrap().pixel_format, format);
        }
        assert!(entry(PixelFormat::Unknown).is_none());
    }

    #[test]
    fn test_bytes_per_pixel() {
        assert_eq!(PixelFormat::GrayBit.bytes_per_pixel(), 1);
        assert_eq!(PixelFormat::GrayAlpha.bytes_per_pixel(), 2);
        assert_eq!(PixelFormat::Rgb565.bytes_per_pixel(), 2);
        assert_eq!(PixelFormat::Rgb888.bytes_per_pixel(), 3);
        assert_eq!(PixelFormat::Bgr888.bytes_per_pixel(), 3);
        assert_eq!(PixelFormat::Cmyk.bytes_per_pixel(), 4);
        assert_eq!(PixelFormat::Rgb161616.bytes_per_pixel(), 6);
        assert_eq!(PixelFormat::Rgba16161616.bytes_per_pixel(), 8);
        assert_eq!(PixelFormat::Unknown.bytes_per_pixel(), 0);
    }

    #[test]
    fn test_rgb565_bit_replication() {
        let argb = to_argb(PixelFormat::Rgb565, &[0x08, 0x09]);
        assert_eq!(alpha(argb), 255);
        assert_eq!(red(argb), 66);
        assert_eq!(green(argb), 32);
        assert_eq!(blue(argb), 8);
        assert_eq!(to_argb(PixelFormat::Rgb565, &[0xFF, 0xFF]), 0xFFFF_FFFF);
        assert_eq!(to_argb(PixelFormat::Rgb565, &[0x00, 0x00]), 0xFF00_0000);
    }

    #[test]
    fn test_rgb565_reverse() {
        let px = from_argb(PixelFormat::Rgb565, 0xFF42_2008);
        assert_eq!(px, vec![0x08, 0x09]);
    }

    #[test]
    fn test_8888_layouts() {
        let px = [0x10, 0x11, 0x12, 0x13];
        assert_eq!(to_argb(PixelFormat::Argb8888, &px), 0x1011_1213);
        assert_eq!(to_argb(PixelFormat::Rgba8888, &px), 0x1310_1112);
        assert_eq!(to_argb(PixelFormat::Bgra8888, &px), 0x1312_1110);
        assert_eq!(to_argb(PixelFormat::Abgr8888, &px), 0x1013_1211);
        for format in [
            PixelFormat::Argb8888,
            PixelFormat::Rgba8888,
            PixelFormat::Bgra8888,
            PixelFormat::Abgr8888,
        ] {
            let argb = to_argb(format, &px);
            assert_eq!(from_argb(format, argb), px.to_vec(), "{format}");
        }
    }

    #[test]
    fn test_24bit_layouts() {
        assert_eq!(to_argb(PixelFormat::Rgb888, &[12, 13, 14]), 0xFF0C_0D0E);
        assert_eq!(to_argb(PixelFormat::Bgr888, &[12, 13, 14]), 0xFF0E_0D0C);
        assert_eq!(from_argb(PixelFormat::Bgr888, 0x800C_0D0E), vec![14, 13, 12]);
    }

    #[test]
    fn test_alpha8() {
        assert_eq!(to_argb(PixelFormat::Alpha8, &[5]), 0x0500_0000);
        assert_eq!(from_argb(PixelFormat::Alpha8, 0x7FFF_FFFF), vec![0x7F]);
    }

    #[test]
    fn test_gray_formats() {
        assert_eq!(to_argb(PixelFormat::GrayBit, &[0x80]), 0xFFFF_FFFF);
        assert_eq!(to_argb(PixelFormat::GrayBit, &[0x7F]), 0xFF00_0000);
        assert_eq!(from_argb(PixelFormat::GrayBit, 0xFFFF_FFFF), vec![0xFF]);
        assert_eq!(from_argb(PixelFormat::GrayBit, 0xFF10_1010), vec![0x00]);
        assert_eq!(to_argb(PixelFormat::GrayAlpha, &[0x40, 0x80]), 0x8040_4040);
        assert_eq!(from_argb(PixelFormat::GrayAlpha, 0x8040_4040), vec![0x40, 0x80]);
    }

    #[test]
    fn test_16bit_formats() {
        let px = [0x00, 0x12, 0xFF, 0x34, 0x01, 0x56];
        assert_eq!(to_argb(PixelFormat::Rgb161616, &px), 0xFF12_3456);
        assert_eq!(
            from_argb(PixelFormat::Rgb161616, 0xFF12_3456),
            vec![0x12, 0x12, 0x34, 0x34, 0x56, 0x56]
        );
        let px = [0, 1, 0, 2, 0, 3, 0, 4];
        assert_eq!(to_argb(PixelFormat::Rgba16161616, &px), 0x0401_0203);
    }

    #[test]
    fn test_cmyk() {
        assert_eq!(to_argb(PixelFormat::Cmyk, &[0, 0, 0, 0]), 0xFFFF_FFFF);
        assert_eq!(to_argb(PixelFormat::Cmyk, &[0, 0, 0, 255]), 0xFF00_0000);
        assert_eq!(to_argb(PixelFormat::Cmyk, &[255, 0, 0, 0]), 0xFF00_FFFF);
        assert_eq!(from_argb(PixelFormat::Cmyk, 0xFFFF_FFFF), vec![0, 0, 0, 0]);
        assert_eq!(from_argb(PixelFormat::Cmyk, 0xFF00_0000), vec![0, 0, 0, 255]);
        assert_eq!(from_argb(PixelFormat::Cmyk, 0xFF00_FFFF), vec![255, 0, 0, 0]);
    }

    #[test]
    fn test_row_stride() {
        assert_eq!(row_stride(PixelFormat::Alpha8, 3), Some(4));
        assert_eq!(row_stride(PixelFormat::Alpha8, 8), Some(8));
        assert_eq!(row_stride(PixelFormat::Rgb888, 3), Some(9));
        assert_eq!(row_stride(PixelFormat::Rgba16161616, 2), Some(16));
        assert_eq!(row_stride(PixelFormat::Unknown, 2), None);
        assert_eq!(row_stride(PixelFormat::Argb8888, usize::MAX), None);
    }
}
