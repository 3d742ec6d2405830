//! Info command.
//!
//! Prints the descriptor and memory layout of each wire file, and which
//! transport the active policy would pick for it over a live parcel.

use crate::InfoArgs;
use anyhow::Result;
use pixmap_wire::WirePolicy;

pub fn run(args: InfoArgs, policy: &WirePolicy, verbose: bool) -> Result<()> {
    for path in &args.input {
        let buffer = super::load_buffer(path)?;
        let transport = if policy.is_inline(buffer.byte_count()) {
            "inline"
        } else {
            "shared segment"
        };

        println!("{}", path.display());
        println!("  Resolution: {}x{}", buffer.width(), buffer.height());
        println!("  Format:     {}", buffer.pixel_format());
        println!("  Alpha:      {}", buffer.alpha_type());
        println!("  Color:      {}", buffer.color_space());
        println!("  Row stride: {}", buffer.row_stride());
        println!("  Pixel data: {}", super::format_size(buffer.byte_count() as u64));
        println!("  Editable:   {}", buffer.is_editable());
        println!("  Transport:  {} (threshold {})", transport, policy.inline_threshold);

        if verbose {
            let bpp = buffer.bytes_per_pixel();
            let padding = buffer.row_stride() - buffer.width() as usize * bpp;
            println!("  Bytes/px:   {}", bpp);
            println!("  Row pad:    {}", padding);
            if let Some(argb) = buffer.color_at(0, 0) {
                println!("  Pixel 0,0:  {:#010x}", argb);
            }
        }

        if args.input.len() > 1 {
            println!();
        }
    }

    Ok(())
}
