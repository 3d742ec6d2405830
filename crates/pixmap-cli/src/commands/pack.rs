//! Pack command

use crate::PackArgs;
use anyhow::{bail, Context, Result};
use pixmap_core::{ImageDescriptor, PixelBuffer, Rect};

pub fn run(args: PackArgs, verbose: bool) -> Result<()> {
    let raw = std::fs::read(&args.input).with_context(|| format!("Failed to read: {}", args.input.display()))?;
    let descriptor = ImageDescriptor::new(args.width, args.height, args.format).with_alpha_type(args.alpha);
    let mut buffer = PixelBuffer::allocate(descriptor).context("Invalid buffer description")?;
    buffer.set_editable(true);

    let packed_stride = args.width as usize * buffer.bytes_per_pixel();
    if raw.len() == buffer.byte_count() {
        buffer.write_pixels(&raw)?;
    } else if raw.len() == packed_stride * args.height as usize {
        let full = Rect::new(0, 0, args.width, args.height);
        buffer.write_region(&raw, 0, packed_stride, full)?;
    } else {
        bail!(
            "{} holds {} bytes; {}x{} {} needs {} (padded) or {} (packed)",
            args.input.display(),
            raw.len(),
            args.width,
            args.height,
            args.format,
            buffer.byte_count(),
            packed_stride * args.height as usize
        );
    }
    buffer.set_editable(args.editable);

    if verbose {
        println!(
            "Packed {}x{} {} ({} bytes, stride {})",
            buffer.width(),
            buffer.height(),
            buffer.pixel_format(),
            buffer.byte_count(),
            buffer.row_stride()
        );
    }

    super::save_buffer(&args.output, &buffer)
}
