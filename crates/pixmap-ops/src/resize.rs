//! Nearest-neighbor scaling.
//!
//! Both entry points allocate a fresh heap buffer with the source's
//! descriptor (format, alpha type, color space) and the new size.
//!
//! # Example
//!
//! ```rust
//! use pixmap_core::{ImageDescriptor, PixelBuffer, PixelFormat};
//! use pixmap_ops::resize::scale;
//!
//! let src = PixelBuffer::allocate(ImageDescriptor::new(3, 4, PixelFormat::Argb8888)).unwrap();
//! let dst = scale(&src, 2.0, 2.0).unwrap();
//! assert_eq!((dst.width(), dst.height()), (6, 8));
//! assert_eq!(dst.byte_count(), 192);
//! ```

use pixmap_core::{ImageDescriptor, PixelBuffer, Size};
use tracing::trace;

use crate::rows::{fill_rows, Sampler};
use crate::{OpsError, OpsResult};

fn scaled_extent(extent: i32, factor: f32) -> OpsResult<i32> {
    let v = (extent as f64 * factor as f64).round();
    if !(1.0..=i32::MAX as f64).contains(&v) {
        return Err(OpsError::InvalidParameter(format!(
            "scaling {extent} by {factor} gives an empty or oversized extent"
        )));
    }
    Ok(v as i32)
}

/// Scales by independent factors.
///
/// The destination is `round(width * sx) x round(height * sy)`; destination
/// pixel (dx, dy) copies source `(floor(dx / sx), floor(dy / sy))`, clamped.
pub fn scale(source: &PixelBuffer, sx: f32, sy: f32) -> OpsResult<PixelBuffer> {
    if !(sx.is_finite() && sy.is_finite() && sx > 0.0 && sy > 0.0) {
        return Err(OpsError::InvalidParameter(format!(
            "scale factors must be positive and finite, got {sx} x {sy}"
        )));
    }
    let width = scaled_extent(source.width(), sx)?;
    let height = scaled_extent(source.height(), sy)?;
    trace!(sx, sy, width, height, "scale");

    let (sw, sh) = (source.width() as usize, source.height() as usize);
    let (fx, fy) = (sx as f64, sy as f64);
    remap(
        source,
        Size::new(width, height),
        |dx| ((dx as f64 / fx).floor() as usize).min(sw - 1),
        |dy| ((dy as f64 / fy).floor() as usize).min(sh - 1),
    )
}

/// Resizes to an exact size.
///
/// Destination pixel (dx, dy) copies source
/// `(dx * width / new_width, dy * height / new_height)` in integer arithmetic.
pub fn resize(source: &PixelBuffer, width: i32, height: i32) -> OpsResult<PixelBuffer> {
    if width <= 0 || height <= 0 {
        return Err(OpsError::InvalidParameter(format!(
            "target size must be positive, got {width}x{height}"
        )));
    }
    trace!(width, height, "resize");
    let (sw, sh) = (source.width() as usize, source.height() as usize);
    let (tw, th) = (width as usize, height as usize);
    remap(
        source,
        Size::new(width, height),
        |dx| dx * sw / tw,
        |dy| dy * sh / th,
    )
}

/// Allocates the destination, then fills it through per-axis index maps.
///
/// The maps are only materialized once the allocation has passed the size
/// checks.
fn remap(
    source: &PixelBuffer,
    size: Size,
    map_x: impl Fn(usize) -> usize,
    map_y: impl Fn(usize) -> usize,
) -> OpsResult<PixelBuffer> {
    let sampler = Sampler::new(source)?;
    let descriptor = ImageDescriptor {
        size,
        ..*source.descriptor()
    };
    let mut dst = PixelBuffer::allocate(descriptor)?;
    let x_map: Vec<usize> = (0..size.width as usize).map(map_x).collect();
    let y_map: Vec<usize> = (0..size.height as usize).map(map_y).collect();
    let bpp = sampler.bytes_per_pixel();
    let row_stride = dst.row_stride();
    if let Some(data) = dst.pixels_mut() {
        fill_rows(data, row_stride, |dy, row| {
            let sy = y_map[dy] as i64;
            for (px, &sx) in row.chunks_exact_mut(bpp).zip(&x_map) {
                sampler.copy_to(sx as i64, sy, px);
            }
        });
    }
    dst.set_editable(source.is_editable());
    Ok(dst)
}
