//! Integer premultiply/unpremultiply routines.
//!
//! These reproduce byte-for-byte the rounding that downstream consumers
//! expect, so they are written in plain integer arithmetic and are the only
//! place alpha math happens.
//!
//! ```rust
//! use pixmap_core::alpha::{premultiply, unpremultiply};
//!
//! assert_eq!(premultiply(255, 128), 128);
//! assert_eq!(unpremultiply(128, 128), 255);
//! ```

use crate::descriptor::AlphaType;

/// Largest component or alpha value [`premultiply`] accepts.
pub const MAX_PREMUL_INPUT: u32 = 0x7FFF;

/// Fully opaque alpha.
pub const ALPHA_OPAQUE: u32 = 0xFF;

/// Scales `component` by `alpha / 255` with rounding.
///
/// Returns 0 when either argument exceeds [`MAX_PREMUL_INPUT`].
#[inline]
pub const fn premultiply(component: u32, alpha: u32) -> u32 {
    if component > MAX_PREMUL_INPUT || alpha > MAX_PREMUL_INPUT {
        return 0;
    }
    let p = component * alpha + 128;
    (p + (p >> 8)) >> 8
}

/// Reverses [`premultiply`]: `round(component * 255 / alpha)` clamped to 255.
///
/// Returns 0 for out-of-range inputs and for `alpha == 0`; returns
/// `component` unchanged for `alpha == 255`.
#[inline]
pub fn unpremultiply(component: u32, alpha: u32) -> u32 {
    if component > ALPHA_OPAQUE || alpha > ALPHA_OPAQUE || alpha == 0 {
        return 0;
    }
    if alpha == ALPHA_OPAQUE {
        return component;
    }
    let result = (component as f32 * ALPHA_OPAQUE as f32 / alpha as f32 + 0.5) as u32;
    result.min(ALPHA_OPAQUE)
}

/// Alpha reconciliation applied during a cross-format copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlphaConversionKind {
    /// Channels are copied as they are.
    #[default]
    None,
    /// Divide color by alpha.
    PremulToUnpremul,
    /// Divide color by alpha, then force alpha to 255.
    PremulToOpaque,
    /// Multiply color by alpha.
    UnpremulToPremul,
    /// Force alpha to 255, colors untouched.
    UnpremulToOpaque,
}

impl AlphaConversionKind {
    /// Selects the conversion purely from the source and destination alpha types.
    pub fn select(src: AlphaType, dst: AlphaType) -> Self {
        match (src, dst) {
            (AlphaType::Premultiplied, AlphaType::Unpremultiplied) => Self::PremulToUnpremul,
            (AlphaType::Premultiplied, AlphaType::Opaque) => Self::PremulToOpaque,
            (AlphaType::Unpremultiplied, AlphaType::Premultiplied) => Self::UnpremulToPremul,
            (AlphaType::Unpremultiplied, AlphaType::Opaque) => Self::UnpremulToOpaque,
            _ => Self::None,
        }
    }

    /// Applies the conversion to one canonical ARGB color.
    pub fn apply(self, argb: u32) -> u32 {
        let [a, r, g, b] = argb.to_be_bytes().map(u32::from);
        let (a, r, g, b) = match self {
            Self::None => return argb,
            Self::PremulToUnpremul => (a, unpremultiply(r, a), unpremultiply(g, a), unpremultiply(b, a)),
            Self::PremulToOpaque => (
                ALPHA_OPAQUE,
                unpremultiply(r, a),
                unpremultiply(g, a),
                unpremultiply(b, a),
            ),
            Self::UnpremulToPremul => (a, premultiply(r, a), premultiply(g, a), premultiply(b, a)),
            Self::UnpremulToOpaque => (ALPHA_OPAQUE, r, g, b),
        };
        (a << 24) | (r << 16) | (g << 8) | b
    }
}
