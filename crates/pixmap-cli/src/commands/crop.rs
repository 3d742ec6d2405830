//! Crop command

use crate::CropArgs;
use anyhow::Result;
use pixmap_core::{PixelFormat, Rect, Size};
use pixmap_ops::{crop_and_create, InitOptions};

pub fn run(args: CropArgs, verbose: bool) -> Result<()> {
    let source = super::load_buffer(&args.input)?;
    let rect = Rect::new(args.x, args.y, args.width, args.height);

    if verbose {
        println!(
            "Cropping {}x{} @ ({},{}) from {}x{}",
            args.width,
            args.height,
            args.x,
            args.y,
            source.width(),
            source.height()
        );
    }

    let opts = InitOptions {
        size: Size::new(args.target_width, args.target_height),
        pixel_format: args.format.unwrap_or(PixelFormat::Unknown),
        scale_mode: args.mode,
        editable: source.is_editable(),
        ..Default::default()
    };
    let output = crop_and_create(&source, rect, &opts)?;

    super::save_buffer(&args.output, &output)?;

    if verbose {
        println!("Done.");
    }

    Ok(())
}
