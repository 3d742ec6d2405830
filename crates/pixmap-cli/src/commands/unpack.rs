//! Unpack command

use crate::UnpackArgs;
use anyhow::{Context, Result};
use pixmap_core::Rect;

pub fn run(args: UnpackArgs, verbose: bool) -> Result<()> {
    let buffer = super::load_buffer(&args.input)?;

    let bytes = if args.packed {
        let stride = buffer.width() as usize * buffer.bytes_per_pixel();
        let mut out = vec![0u8; stride * buffer.height() as usize];
        let full = Rect::new(0, 0, buffer.width(), buffer.height());
        buffer.read_region(&mut out, 0, stride, full)?;
        out
    } else {
        buffer.pixels().context("Buffer has no pixel memory")?.to_vec()
    };

    if verbose {
        println!("Writing {} bytes to {}", bytes.len(), args.output.display());
    }
    std::fs::write(&args.output, &bytes).with_context(|| format!("Failed to save: {}", args.output.display()))
}
