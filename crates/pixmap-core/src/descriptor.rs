//! Image descriptors and their stable enumerants.
//!
//! An [`ImageDescriptor`] is the "header" of a [`PixelBuffer`](crate::PixelBuffer):
//! size, pixel format, alpha convention and color space. The numeric values
//! of [`PixelFormat`], [`AlphaType`] and [`ColorSpace`] are part of the wire
//! contract and must never be renumbered.
//!
//! # Usage
//!
//! ```rust
//! use pixmap_core::{AlphaType, ColorSpace, ImageDescriptor, PixelFormat};
//!
//! let desc = ImageDescriptor::new(640, 480, PixelFormat::Rgba8888)
//!     .with_alpha_type(AlphaType::Unpremultiplied);
//! assert_eq!(desc.color_space, ColorSpace::Srgb);
//! assert!(!desc.is_unset());
//! ```

use std::fmt;

/// In-memory pixel encodings.
///
/// Discriminants are the stable interchange values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum PixelFormat {
    /// Not set.
    #[default]
    Unknown = 0,
    /// 32-bit, bytes `A R G B`.
    Argb8888 = 0x0000_0001,
    /// 16-bit little-endian, R in the low 5 bits, B in the top 5 bits.
    Rgb565 = 0x0000_0002,
    /// 32-bit, bytes `R G B A`.
    Rgba8888 = 0x0000_0003,
    /// 32-bit, bytes `B G R A`.
    Bgra8888 = 0x0000_0004,
    /// 24-bit, bytes `R G B`.
    Rgb888 = 0x0000_0005,
    /// 8-bit coverage only.
    Alpha8 = 0x0000_0006,
    /// 32-bit, bytes `A B G R`.
    Abgr8888 = 0x0000_0008,
    /// 32-bit, bytes `C M Y K`.
    Cmyk = 0x0000_000A,
    /// 24-bit, bytes `B G R`.
    Bgr888 = 0x4000_0002,
    /// 48-bit, little-endian 16-bit `R G B` samples.
    Rgb161616 = 0x4000_0007,
    /// 64-bit, little-endian 16-bit `R G B A` samples.
    Rgba16161616 = 0x4000_0008,
    /// Two-value image stored one byte per pixel; the top bit selects white.
    GrayBit = 0x8000_0001,
    /// 16-bit, bytes `gray alpha`.
    GrayAlpha = 0x8000_0002,
}

impl PixelFormat {
    /// Every recognized format, `Unknown` excluded.
    pub const ALL: [PixelFormat; 13] = [
        Self::Argb8888,
        Self::Rgb565,
        Self::Rgba8888,
        Self::Bgra8888,
        Self::Rgb888,
        Self::Alpha8,
        Self::Abgr8888,
        Self::Cmyk,
        Self::Bgr888,
        Self::Rgb161616,
        Self::Rgba16161616,
        Self::GrayBit,
        Self::GrayAlpha,
    ];

    /// Parses a wire value; unrecognized values map to `Unknown`.
    pub fn from_raw(raw: u32) -> Self {
        Self::ALL
            .into_iter()
            .find(|f| f.as_raw() == raw)
            .unwrap_or(Self::Unknown)
    }

    /// Stable wire value.
    #[inline]
    pub const fn as_raw(self) -> u32 {
        self as u32
    }

    /// Returns `true` for every format except `Unknown`.
    #[inline]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Returns `true` if the encoding stores an alpha channel.
    pub const fn has_alpha(self) -> bool {
        matches!(
            self,
            Self::Argb8888
                | Self::Rgba8888
                | Self::Bgra8888
                | Self::Abgr8888
                | Self::Alpha8
                | Self::Rgba16161616
                | Self::GrayAlpha
        )
    }

    /// Bytes occupied by one pixel; 0 for `Unknown`.
    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        crate::format::entry(self).map_or(0, |e| e.bytes_per_pixel)
    }

    /// Lower-case name used in logs and on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Argb8888 => "argb8888",
            Self::Rgb565 => "rgb565",
            Self::Rgba8888 => "rgba8888",
            Self::Bgra8888 => "bgra8888",
            Self::Rgb888 => "rgb888",
            Self::Alpha8 => "alpha8",
            Self::Abgr8888 => "abgr8888",
            Self::Cmyk => "cmyk",
            Self::Bgr888 => "bgr888",
            Self::Rgb161616 => "rgb161616",
            Self::Rgba16161616 => "rgba16161616",
            Self::GrayBit => "graybit",
            Self::GrayAlpha => "grayalpha",
        }
    }

    /// Looks a format up by [`name`](Self::name), case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        Self::ALL.into_iter().find(|f| f.name() == lower)
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How color channels relate to the alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum AlphaType {
    /// Not set.
    #[default]
    Unknown = 0,
    /// No transparency; alpha is implicitly 255.
    Opaque = 1,
    /// Color channels are pre-scaled by alpha.
    Premultiplied = 2,
    /// Color channels are independent of alpha.
    Unpremultiplied = 3,
}

impl AlphaType {
    /// Parses a wire value; unrecognized values map to `Unknown`.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => Self::Opaque,
            2 => Self::Premultiplied,
            3 => Self::Unpremultiplied,
            _ => Self::Unknown,
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
            Self::Unknown => "unknown",
            Self::Opaque => "opaque",
            Self::Premultiplied => "premul",
            Self::Unpremultiplied => "unpremul",
        }
    }

    /// Looks an alpha type up by [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "opaque" => Some(Self::Opaque),
            "premul" | "premultiplied" => Some(Self::Premultiplied),
            "unpremul" | "unpremultiplied" => Some(Self::Unpremultiplied),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// The alpha type a buffer of `format` actually carries when `self` is requested.
    ///
    /// Formats without an alpha channel are always opaque, `Alpha8` is always
    /// premultiplied, and an unset request on an alpha format means premultiplied.
    pub fn valid_for(self, format: PixelFormat) -> Self {
        match format {
            PixelFormat::Unknown => Self::Unknown,
            PixelFormat::Alpha8 => Self::Premultiplied,
            f if !f.has_alpha() => Self::Opaque,
            _ if self == Self::Unknown => Self::Premultiplied,
            _ => self,
        }
    }
}

impl fmt::Display for AlphaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Color space tag carried alongside the pixels.
///
/// The engine never converts between color spaces; the tag only travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum ColorSpace {
    Unknown = 0,
    DisplayP3 = 1,
    #[default]
    Srgb = 2,
    LinearSrgb = 3,
    ExtendedSrgb = 4,
    LinearExtendedSrgb = 5,
    GenericXyz = 6,
    GenericLab = 7,
    Aces = 8,
    AcesCg = 9,
    AdobeRgb1998 = 10,
    DciP3 = 11,
    ItuR709 = 12,
    ItuR2020 = 13,
}

impl ColorSpace {
    /// Parses a wire value; unrecognized values map to `Unknown`.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => Self::DisplayP3,
            2 => Self::Srgb,
            3 => Self::LinearSrgb,
            4 => Self::ExtendedSrgb,
            5 => Self::LinearExtendedSrgb,
            6 => Self::GenericXyz,
            7 => Self::GenericLab,
            8 => Self::Aces,
            9 => Self::AcesCg,
            10 => Self::AdobeRgb1998,
            11 => Self::DciP3,
            12 => Self::ItuR709,
            13 => Self::ItuR2020,
            _ => Self::Unknown,
        }
    }

    /// Stable wire value.
    #[inline]
    pub const fn as_raw(self) -> u32 {
        self as u32
    }

    /// Every color space, in wire order.
    pub const ALL: [ColorSpace; 14] = [
        Self::Unknown,
        Self::DisplayP3,
        Self::Srgb,
        Self::LinearSrgb,
        Self::ExtendedSrgb,
        Self::LinearExtendedSrgb,
        Self::GenericXyz,
        Self::GenericLab,
        Self::Aces,
        Self::AcesCg,
        Self::AdobeRgb1998,
        Self::DciP3,
        Self::ItuR709,
        Self::ItuR2020,
    ];

    /// Lower-case name, e.g. `"srgb"` or `"display-p3"`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::DisplayP3 => "display-p3",
            Self::Srgb => "srgb",
            Self::LinearSrgb => "linear-srgb",
            Self::ExtendedSrgb => "extended-srgb",
            Self::LinearExtendedSrgb => "linear-extended-srgb",
            Self::GenericXyz => "xyz",
            Self::GenericLab => "lab",
            Self::Aces => "aces",
            Self::AcesCg => "acescg",
            Self::AdobeRgb1998 => "adobe-rgb-1998",
            Self::DciP3 => "dci-p3",
            Self::ItuR709 => "rec709",
            Self::ItuR2020 => "rec2020",
        }
    }

    /// Looks a color space up by [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        Self::ALL.into_iter().find(|cs| cs.name() == name)
    }
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Width and height in pixels.
///
/// Signed so that callers' negative sizes reach validation instead of
/// wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
}

impl Size {
    /// Creates a size.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either side is non-positive.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Size, format, alpha convention and color space of a pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ImageDescriptor {
    /// Dimensions in pixels
    pub size: Size,
    /// Native pixel encoding
    pub pixel_format: PixelFormat,
    /// Alpha convention of the color channels
    pub alpha_type: AlphaType,
    /// Color space tag
    pub color_space: ColorSpace,
}

impl ImageDescriptor {
    /// Creates an sRGB descriptor with an unset alpha type.
    pub const fn new(width: i32, height: i32, pixel_format: PixelFormat) -> Self {
        Self {
            size: Size::new(width, height),
            pixel_format,
            alpha_type: AlphaType::Unknown,
            color_space: ColorSpace::Srgb,
        }
    }

    /// Returns a copy with the given alpha type.
    pub const fn with_alpha_type(mut self, alpha_type: AlphaType) -> Self {
        self.alpha_type = alpha_type;
        self
    }

    /// Returns a copy with the given color space.
    pub const fn with_color_space(mut self, color_space: ColorSpace) -> Self {
        self.color_space = color_space;
        self
    }

    /// Width in pixels.
    #[inline]
    pub const fn width(&self) -> i32 {
        self.size.width
    }

    /// Height in pixels.
    #[inline]
    pub const fn height(&self) -> i32 {
        self.size.height
    }

    /// Returns `true` for the empty descriptor a fresh buffer starts with.
    pub fn is_unset(&self) -> bool {
        self.size == Size::default() && self.pixel_format == PixelFormat::Unknown
    }
}
