//! Transform command

use crate::TransformArgs;
use anyhow::Result;
use pixmap_ops::Transformer;

pub fn run(args: TransformArgs, verbose: bool) -> Result<()> {
    let source = super::load_buffer(&args.input)?;

    let mut transformer = Transformer::new();
    transformer
        .set_scale(args.scale_x, args.scale_y)
        .set_rotate(args.rotate, args.pivot_x, args.pivot_y);

    if verbose {
        println!("Transforming {}x{}: {:?}", source.width(), source.height(), transformer.spec());
    }

    let output = transformer.transform(&source)?;

    if verbose {
        println!("Result {}x{}", output.width(), output.height());
    }

    super::save_buffer(&args.output, &output)
}
