//! Row-parallel destination fill and nearest-neighbor sampling.
//!
//! When the `parallel` feature is enabled, destination rows are produced
//! with rayon. The source is only ever read.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use pixmap_core::PixelBuffer;

use crate::{OpsError, OpsResult};

/// Runs `f(y, row)` for every `row_stride`-sized row of `dst`.
#[cfg(feature = "parallel")]
pub(crate) fn fill_rows<F>(dst: &mut [u8], row_stride: usize, f: F)
where
    F: Fn(usize, &mut [u8]) + Sync + Send,
{
    dst.par_chunks_mut(row_stride)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

/// Runs `f(y, row)` for every `row_stride`-sized row of `dst` (single-threaded fallback).
#[cfg(not(feature = "parallel"))]
pub(crate) fn fill_rows<F>(dst: &mut [u8], row_stride: usize, f: F)
where
    F: Fn(usize, &mut [u8]),
{
    for (y, row) in dst.chunks_mut(row_stride).enumerate() {
        f(y, row);
    }
}

/// Read-only view of a source buffer's pixels.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Sampler<'a> {
    data: &'a [u8],
    row_stride: usize,
    bpp: usize,
    width: i64,
    height: i64,
}

impl<'a> Sampler<'a> {
    pub(crate) fn new(source: &'a PixelBuffer) -> OpsResult<Self> {
        let data = source.pixels().ok_or(OpsError::Core(pixmap_core::Error::NoMemory))?;
        Ok(Self {
            data,
            row_stride: source.row_stride(),
            bpp: source.bytes_per_pixel(),
            width: source.width() as i64,
            height: source.height() as i64,
        })
    }

    #[inline]
    pub(crate) fn bytes_per_pixel(&self) -> usize {
        self.bpp
    }

    /// Copies the pixel at (x, y) into `out`, or zero bytes outside the source.
    #[inline]
    pub(crate) fn copy_to(&self, x: i64, y: i64, out: &mut [u8]) {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            out.fill(0);
            return;
        }
        let start = y as usize * self.row_stride + x as usize * self.bpp;
        out.copy_from_slice(&self.data[start..start + self.bpp]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixmap_core::{ImageDescriptor, PixelFormat, PixelMemory};

    #[test]
    fn test_sampler_zero_outside() {
        let mut buf = PixelBuffer::new();
        buf.set_descriptor(ImageDescriptor::new(2, 1, PixelFormat::Rgb888)).unwrap();
        buf.attach_memory(PixelMemory::from_vec(vec![1, 2, 3, 4, 5, 6])).unwrap();
        let sampler = Sampler::new(&buf).unwrap();
        let mut out = [9u8; 3];
        sampler.copy_to(1, 0, &mut out);
        assert_eq!(out, [4, 5, 6]);
        sampler.copy_to(2, 0, &mut out);
        assert_eq!(out, [0, 0, 0]);
        sampler.copy_to(0, -1, &mut out);
        assert_eq!(out, [0, 0, 0]);
    }

    #[test]
    fn test_fill_rows_visits_every_row() {
        let mut dst = vec![0u8; 12];
        fill_rows(&mut dst, 4, |y, row| row.fill(y as u8 + 1));
        assert_eq!(dst, [1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3]);
    }
}
