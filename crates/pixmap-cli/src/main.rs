//! pixmap - inspect and transform pixel-buffer wire files
//!
//! A wire file is one inline-encoded buffer: the 48-byte header followed by
//! the pixel bytes.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pixmap_core::{AlphaType, PixelFormat};
use pixmap_ops::ScaleMode;
use pixmap_wire::WirePolicy;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "pixmap")]
#[command(author, version, about = "Inspect and transform pixel-buffer wire files")]
#[command(long_about = "
Wraps raw pixel bytes into self-describing wire files and runs the
buffer operations over them.

Examples:
  pixmap pack frame.raw -o frame.pxb -W 640 -H 480 -f rgba8888
  pixmap info frame.pxb
  pixmap transform frame.pxb -o turned.pxb --rotate 90 --pivot-x 320 --pivot-y 240
  pixmap crop frame.pxb -o thumb.pxb -x 0 -y 0 -W 320 -H 240 --target-width 64 --target-height 64 --mode center-crop
  pixmap unpack thumb.pxb -o thumb.raw --packed
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Wire policy file (YAML)
    #[arg(long, global = true)]
    policy: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print descriptor and layout of wire files
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Wrap raw pixel bytes into a wire file
    Pack(PackArgs),

    /// Dump the pixel bytes of a wire file
    Unpack(UnpackArgs),

    /// Scale and/or rotate
    #[command(visible_alias = "t")]
    Transform(TransformArgs),

    /// Crop a region, optionally converting and fitting it to a size
    Crop(CropArgs),
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Input wire file(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct PackArgs {
    /// Raw pixel bytes
    input: PathBuf,

    /// Output wire file
    #[arg(short, long)]
    output: PathBuf,

    /// Width in pixels
    #[arg(short = 'W', long)]
    width: i32,

    /// Height in pixels
    #[arg(short = 'H', long)]
    height: i32,

    /// Pixel format, e.g. argb8888, rgb565, alpha8
    #[arg(short, long, value_parser = parse_format)]
    format: PixelFormat,

    /// Alpha type: opaque, premul, unpremul
    #[arg(short, long, value_parser = parse_alpha, default_value = "premul")]
    alpha: AlphaType,

    /// Mark the packed buffer editable
    #[arg(long)]
    editable: bool,
}

#[derive(Args, Debug)]
struct UnpackArgs {
    /// Input wire file
    input: PathBuf,

    /// Output raw file
    #[arg(short, long)]
    output: PathBuf,

    /// Strip row padding
    #[arg(long)]
    packed: bool,
}

#[derive(Args, Debug)]
struct TransformArgs {
    /// Input wire file
    input: PathBuf,

    /// Output wire file
    #[arg(short, long)]
    output: PathBuf,

    /// Horizontal scale factor
    #[arg(long, default_value = "1.0")]
    scale_x: f32,

    /// Vertical scale factor
    #[arg(long, default_value = "1.0")]
    scale_y: f32,

    /// Clockwise rotation in degrees
    #[arg(short, long, default_value = "0.0", allow_negative_numbers = true)]
    rotate: f32,

    /// Rotation pivot x (after scaling)
    #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
    pivot_x: f32,

    /// Rotation pivot y (after scaling)
    #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
    pivot_y: f32,
}

#[derive(Args, Debug)]
struct CropArgs {
    /// Input wire file
    input: PathBuf,

    /// Output wire file
    #[arg(short, long)]
    output: PathBuf,

    /// Region x
    #[arg(short)]
    x: i32,

    /// Region y
    #[arg(short)]
    y: i32,

    /// Region width
    #[arg(short = 'W', long)]
    width: i32,

    /// Region height
    #[arg(short = 'H', long)]
    height: i32,

    /// Output width (0 keeps the region width)
    #[arg(long, default_value = "0")]
    target_width: i32,

    /// Output height (0 keeps the region height)
    #[arg(long, default_value = "0")]
    target_height: i32,

    /// Fit mode: fit, center-crop
    #[arg(short, long, value_parser = parse_mode, default_value = "fit")]
    mode: ScaleMode,

    /// Convert to this pixel format
    #[arg(short, long, value_parser = parse_format)]
    format: Option<PixelFormat>,
}

fn parse_format(s: &str) -> std::result::Result<PixelFormat, String> {
    PixelFormat::from_name(s)
        .filter(|f| f.is_known())
        .ok_or_else(|| {
            let names: Vec<_> = PixelFormat::ALL.iter().map(|f| f.name()).collect();
            format!("unknown pixel format '{s}' (expected one of: {})", names.join(", "))
        })
}

fn parse_alpha(s: &str) -> std::result::Result<AlphaType, String> {
    AlphaType::from_name(s).ok_or_else(|| format!("unknown alpha type '{s}'"))
}

fn parse_mode(s: &str) -> std::result::Result<ScaleMode, String> {
    ScaleMode::from_name(s).ok_or_else(|| format!("unknown scale mode '{s}' (expected fit or center-crop)"))
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    // A second init (tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let policy = match &cli.policy {
        Some(path) => WirePolicy::load(path)
            .with_context(|| format!("Failed to load policy: {}", path.display()))?,
        None => WirePolicy::default(),
    };

    match cli.command {
        Commands::Info(args) => commands::info::run(args, &policy, cli.verbose),
        Commands::Pack(args) => commands::pack::run(args, cli.verbose),
        Commands::Unpack(args) => commands::unpack::run(args, cli.verbose),
        Commands::Transform(args) => commands::transform::run(args, cli.verbose),
        Commands::Crop(args) => commands::crop::run(args, cli.verbose),
    }
}
