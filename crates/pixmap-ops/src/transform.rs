//! Rotation and accumulated transforms.
//!
//! # Coordinate System
//!
//! Image space is y-down, so a positive angle turns the picture clockwise
//! on screen. The destination canvas spans the bounding box of the four
//! rotated source corners, its extents rounded to whole pixels, so its size
//! depends only on the angle and never on where the pivot sits. The box's
//! top-left corner is the canvas origin; every destination pixel centre is
//! mapped back through the inverse rotation and sampled nearest-neighbor.
//! Samples that land outside the source are written as zero bytes.
//!
//! # Example
//!
//! ```rust
//! use pixmap_core::{ImageDescriptor, PixelBuffer, PixelFormat};
//! use pixmap_ops::transform::Transformer;
//!
//! let src = PixelBuffer::allocate(ImageDescriptor::new(3, 4, PixelFormat::Argb8888)).unwrap();
//! let mut t = Transformer::new();
//! t.set_scale(2.0, 2.0).set_rotate(90.0, 3.0, 4.0);
//! let dst = t.transform(&src).unwrap();
//! assert_eq!((dst.width(), dst.height()), (8, 6));
//! ```

use pixmap_core::{ImageDescriptor, PixelBuffer, Size};
use tracing::{debug, trace};

use crate::resize::scale;
use crate::rows::{fill_rows, Sampler};
use crate::{OpsError, OpsResult};

const AXIS_EPSILON: f64 = 1e-9;
const CORNER_EPSILON: f64 = 1e-6;

/// Snaps values within `eps` of an integer onto it.
#[inline]
fn snap(v: f64, eps: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() < eps { r } else { v }
}

/// Scale and rotation parameters collected before a transform runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformSpec {
    /// Horizontal scale factor
    pub scale_x: f32,
    /// Vertical scale factor
    pub scale_y: f32,
    /// Clockwise rotation in degrees
    pub rotation_degrees: f32,
    /// Rotation pivot, x
    pub pivot_x: f32,
    /// Rotation pivot, y
    pub pivot_y: f32,
}

impl Default for TransformSpec {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            rotation_degrees: 0.0,
            pivot_x: 0.0,
            pivot_y: 0.0,
        }
    }
}

impl TransformSpec {
    /// Returns `true` if either scale factor differs from 1.
    pub fn has_scale(&self) -> bool {
        self.scale_x != 1.0 || self.scale_y != 1.0
    }

    /// Returns `true` if the rotation is not a multiple of a full turn.
    pub fn has_rotation(&self) -> bool {
        self.rotation_degrees % 360.0 != 0.0
    }
}

/// Accumulates a [`TransformSpec`] and applies it once.
///
/// Scaling runs before rotation; the pivot is in the coordinates of the
/// scaled image.
#[derive(Debug, Clone, Default)]
pub struct Transformer {
    spec: TransformSpec,
}

impl Transformer {
    /// Creates an identity transformer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scale factors.
    pub fn set_scale(&mut self, sx: f32, sy: f32) -> &mut Self {
        self.spec.scale_x = sx;
        self.spec.scale_y = sy;
        self
    }

    /// Sets the rotation angle and pivot.
    pub fn set_rotate(&mut self, degrees: f32, pivot_x: f32, pivot_y: f32) -> &mut Self {
        self.spec.rotation_degrees = degrees;
        self.spec.pivot_x = pivot_x;
        self.spec.pivot_y = pivot_y;
        self
    }

    /// The accumulated parameters.
    pub fn spec(&self) -> &TransformSpec {
        &self.spec
    }

    /// Consumes the transformer and produces the transformed copy.
    pub fn transform(self, source: &PixelBuffer) -> OpsResult<PixelBuffer> {
        let spec = self.spec;
        debug!(?spec, "transform");
        let scaled = if spec.has_scale() {
            Some(scale(source, spec.scale_x, spec.scale_y)?)
        } else {
            None
        };
        let current = scaled.as_ref().unwrap_or(source);
        if spec.has_rotation() {
            return rotate(current, spec.rotation_degrees, spec.pivot_x, spec.pivot_y);
        }
        match scaled {
            Some(buf) => Ok(buf),
            None => Ok(source.try_clone()?),
        }
    }
}

/// Rotates clockwise by `degrees` about (pivot_x, pivot_y).
pub fn rotate(source: &PixelBuffer, degrees: f32, pivot_x: f32, pivot_y: f32) -> OpsResult<PixelBuffer> {
    if !(degrees.is_finite() && pivot_x.is_finite() && pivot_y.is_finite()) {
        return Err(OpsError::InvalidParameter(format!(
            "rotation {degrees} about ({pivot_x}, {pivot_y}) is not finite"
        )));
    }
    let sampler = Sampler::new(source)?;
    let radians = (degrees as f64).to_radians();
    let sin = snap(radians.sin(), AXIS_EPSILON);
    let cos = snap(radians.cos(), AXIS_EPSILON);
    let (px, py) = (pivot_x as f64, pivot_y as f64);
    let (w, h) = (source.width() as f64, source.height() as f64);

    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for (cx, cy) in [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)] {
        let (dx, dy) = (cx - px, cy - py);
        let rx = snap(cos * dx - sin * dy, CORNER_EPSILON);
        let ry = snap(sin * dx + cos * dy, CORNER_EPSILON);
        min_x = min_x.min(rx);
        max_x = max_x.max(rx);
        min_y = min_y.min(ry);
        max_y = max_y.max(ry);
    }
    let width = (max_x - min_x).round().max(1.0);
    let height = (max_y - min_y).round().max(1.0);
    if width > i32::MAX as f64 || height > i32::MAX as f64 {
        return Err(OpsError::InvalidParameter(format!(
            "rotated canvas {width}x{height} is too large"
        )));
    }
    let size = Size::new(width as i32, height as i32);
    trace!(degrees, pivot_x, pivot_y, width = size.width, height = size.height, "rotate");

    let descriptor = ImageDescriptor {
        size,
        ..*source.descriptor()
    };
    let mut dst = PixelBuffer::allocate(descriptor)?;
    let bpp = sampler.bytes_per_pixel();
    let row_stride = dst.row_stride();
    if let Some(data) = dst.pixels_mut() {
        fill_rows(data, row_stride, |dy, row| {
            let y = min_y + dy as f64 + 0.5;
            for (dx, px_out) in row.chunks_exact_mut(bpp).take(size.width as usize).enumerate() {
                let x = min_x + dx as f64 + 0.5;
                let sx = (cos * x + sin * y + px).floor() as i64;
                let sy = (-sin * x + cos * y + py).floor() as i64;
                sampler.copy_to(sx, sy, px_out);
            }
        });
    }
    dst.set_editable(source.is_editable());
    Ok(dst)
}
