//! Buffer factories and crop-and-create.
//!
//! Every factory returns a fresh heap buffer. Options left at their unset
//! values inherit from the source (for crops) or fall back to `Bgra8888`
//! (for blank and color-array buffers).
//!
//! # Example
//!
//! ```rust
//! use pixmap_core::{PixelFormat, Rect, Size};
//! use pixmap_ops::create::{create, crop_and_create, InitOptions, ScaleMode};
//!
//! let src = create(&InitOptions {
//!     size: Size::new(8, 8),
//!     pixel_format: PixelFormat::Rgba8888,
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! let opts = InitOptions {
//!     size: Size::new(2, 2),
//!     scale_mode: ScaleMode::CenterCrop,
//!     ..Default::default()
//! };
//! let thumb = crop_and_create(&src, Rect::new(0, 0, 8, 4), &opts).unwrap();
//! assert_eq!((thumb.width(), thumb.height()), (2, 2));
//! ```

use pixmap_core::{
    AlphaType, ImageDescriptor, PixelBuffer, PixelConverter, PixelFormat, Rect, Size,
};
use tracing::{debug, trace, warn};

use crate::resize::resize;
use crate::{OpsError, OpsResult};

/// Format used when a factory is not told otherwise.
pub const DEFAULT_PIXEL_FORMAT: PixelFormat = PixelFormat::Bgra8888;

/// How a crop is fitted to a target size.
///
/// Discriminants are stable wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum ScaleMode {
    /// Stretch each axis independently to the target.
    #[default]
    FitTargetSize = 0,
    /// Scale uniformly to cover the target, then crop the centre.
    CenterCrop = 1,
}

impl ScaleMode {
    /// Parses a wire value; anything unrecognized is `FitTargetSize`.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => Self::CenterCrop,
            _ => Self::FitTargetSize,
        }
    }

    /// Stable wire value.
    #[inline]
    pub const fn as_raw(self) -> u32 {
        self as u32
    }

    /// Looks a mode up by name (`fit` or `center-crop`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "fit" | "fit-target-size" => Some(Self::FitTargetSize),
            "center-crop" | "centercrop" | "crop" => Some(Self::CenterCrop),
            _ => None,
        }
    }
}

/// Options shared by the factories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InitOptions {
    /// Target size; zero means "keep the source / region size"
    pub size: Size,
    /// Target format; `Unknown` means "keep" (or the default format)
    pub pixel_format: PixelFormat,
    /// Target alpha type; `Unknown` means "keep" (or premultiplied)
    pub alpha_type: AlphaType,
    /// Fit rule when `size` differs from the region
    pub scale_mode: ScaleMode,
    /// Whether the result accepts writes
    pub editable: bool,
    /// Let [`create_from_source`] return a plain copy when nothing changes
    pub use_source_if_match: bool,
}

impl InitOptions {
    fn target_size(&self) -> OpsResult<Option<Size>> {
        let Size { width, height } = self.size;
        if width < 0 || height < 0 {
            return Err(OpsError::InvalidParameter(format!(
                "target size {width}x{height} is negative"
            )));
        }
        Ok((width > 0 && height > 0).then_some(self.size))
    }
}

/// Creates a zeroed buffer.
pub fn create(opts: &InitOptions) -> OpsResult<PixelBuffer> {
    let format = match opts.pixel_format {
        PixelFormat::Unknown => DEFAULT_PIXEL_FORMAT,
        f => f,
    };
    let descriptor = ImageDescriptor {
        size: opts.size,
        pixel_format: format,
        alpha_type: opts.alpha_type,
        ..Default::default()
    };
    let mut buf = PixelBuffer::allocate(descriptor)?;
    buf.set_editable(opts.editable);
    debug!(width = opts.size.width, height = opts.size.height, format = %format, "created buffer");
    Ok(buf)
}

/// Creates a buffer from unpremultiplied ARGB words.
///
/// Row `r` of the image is read from `colors[offset + r * stride..]`;
/// `stride` is in pixels.
pub fn create_from_colors(
    colors: &[u32],
    offset: usize,
    stride: usize,
    opts: &InitOptions,
) -> OpsResult<PixelBuffer> {
    let Size { width, height } = opts.size;
    if width <= 0 || height <= 0 {
        return Err(pixmap_core::Error::invalid_geometry(width, height, "dimensions must be positive").into());
    }
    let (w, h) = (width as usize, height as usize);
    let needed = stride
        .checked_mul(h - 1)
        .and_then(|v| v.checked_add(offset))
        .and_then(|v| v.checked_add(w));
    let fits = matches!(needed, Some(end) if end <= colors.len());
    if offset >= colors.len() || stride < w || !fits {
        warn!(len = colors.len(), offset, stride, width, height, "color array too small");
        return Err(OpsError::InvalidParameter(format!(
            "{} colors cannot hold {width}x{height} at offset {offset}, stride {stride}",
            colors.len()
        )));
    }

    let mut buf = create(&InitOptions {
        alpha_type: match opts.alpha_type {
            AlphaType::Unknown => AlphaType::Premultiplied,
            a => a,
        },
        ..*opts
    })?;
    let src_info = ImageDescriptor::new(width, 1, PixelFormat::Argb8888)
        .with_alpha_type(AlphaType::Unpremultiplied);
    let converter = PixelConverter::new(&src_info, buf.descriptor())?;
    let row_stride = buf.row_stride();
    let mut scratch = vec![0u8; w * 4];
    if let Some(data) = buf.pixels_mut() {
        for (row, dst) in data.chunks_mut(row_stride).enumerate() {
            let start = offset + row * stride;
            for (px, color) in scratch.chunks_exact_mut(4).zip(&colors[start..start + w]) {
                px.copy_from_slice(&color.to_be_bytes());
            }
            converter.convert_row(dst, &scratch, w)?;
        }
    }
    trace!(offset, stride, "filled from colors");
    Ok(buf)
}

/// Copies `rect` out of `source`, converting and rescaling per `opts`.
///
/// Fails with [`OpsError::InvalidRegion`] unless `rect` lies inside the
/// source.
pub fn crop_and_create(source: &PixelBuffer, rect: Rect, opts: &InitOptions) -> OpsResult<PixelBuffer> {
    if !rect.fits_within(source.descriptor().size) {
        return Err(OpsError::InvalidRegion(format!(
            "{}x{} at ({}, {}) is outside {}x{}",
            rect.width,
            rect.height,
            rect.x,
            rect.y,
            source.width(),
            source.height()
        )));
    }
    let target = opts.target_size()?;
    trace!(?rect, ?target, mode = ?opts.scale_mode, "crop and create");

    let mut cropped = PixelBuffer::allocate(ImageDescriptor {
        size: rect.size(),
        ..*source.descriptor()
    })?;
    let row_stride = cropped.row_stride();
    if let Some(data) = cropped.pixels_mut() {
        source.read_region(data, 0, row_stride, rect)?;
    }

    let format = match opts.pixel_format {
        PixelFormat::Unknown => source.pixel_format(),
        f => f,
    };
    let alpha = match opts.alpha_type {
        AlphaType::Unknown => source.alpha_type(),
        a => a,
    }
    .valid_for(format);
    if format != cropped.pixel_format() || alpha != cropped.alpha_type() {
        cropped = cropped.convert_to(format, alpha)?;
    }

    let mut out = match target {
        Some(size) if size != rect.size() => fit(&cropped, size, opts.scale_mode)?,
        _ => cropped,
    };
    out.set_editable(opts.editable);
    Ok(out)
}

fn fit(source: &PixelBuffer, target: Size, mode: ScaleMode) -> OpsResult<PixelBuffer> {
    match mode {
        ScaleMode::FitTargetSize => resize(source, target.width, target.height),
        ScaleMode::CenterCrop => {
            let (sw, sh) = (source.width() as f64, source.height() as f64);
            let ratio = (target.width as f64 / sw).max(target.height as f64 / sh);
            let cover = Size::new(
                ((sw * ratio).round() as i32).max(target.width),
                ((sh * ratio).round() as i32).max(target.height),
            );
            let covered = resize(source, cover.width, cover.height)?;
            let rect = Rect::new(
                (cover.width - target.width) / 2,
                (cover.height - target.height) / 2,
                target.width,
                target.height,
            );
            let mut out = PixelBuffer::allocate(ImageDescriptor {
                size: target,
                ..*covered.descriptor()
            })?;
            let row_stride = out.row_stride();
            if let Some(data) = out.pixels_mut() {
                covered.read_region(data, 0, row_stride, rect)?;
            }
            Ok(out)
        }
    }
}

/// Full-frame [`crop_and_create`].
///
/// With `use_source_if_match`, a source that already has the requested
/// size, format and alpha type is returned as a plain copy.
pub fn create_from_source(source: &PixelBuffer, opts: &InitOptions) -> OpsResult<PixelBuffer> {
    let full = Rect::from_size(source.descriptor().size);
    if opts.use_source_if_match {
        let format = match opts.pixel_format {
            PixelFormat::Unknown => source.pixel_format(),
            f => f,
        };
        let alpha = match opts.alpha_type {
            AlphaType::Unknown => source.alpha_type(),
            a => a,
        }
        .valid_for(format);
        let same_size = opts.target_size()?.is_none_or(|s| s == full.size());
        if same_size && format == source.pixel_format() && alpha == source.alpha_type() {
            debug!("source matches options, copying");
            let mut copy = source.try_clone()?;
            copy.set_editable(opts.editable);
            return Ok(copy);
        }
    }
    crop_and_create(source, full, opts)
}
