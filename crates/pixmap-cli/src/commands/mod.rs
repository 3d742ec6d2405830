//! CLI command implementations

pub mod crop;
pub mod info;
pub mod pack;
pub mod transform;
pub mod unpack;

use anyhow::{Context, Result};
use pixmap_core::PixelBuffer;
use pixmap_wire::{Codec, Parcel, WirePolicy};
use std::path::Path;

/// Files hold a single inline buffer regardless of size.
fn file_codec() -> Codec {
    Codec::new(WirePolicy::inline_only())
}

/// Load a buffer from a wire file
pub fn load_buffer(path: &Path) -> Result<PixelBuffer> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read: {}", path.display()))?;
    let mut parcel = Parcel::from_bytes(bytes);
    let buffer = file_codec()
        .decode(&mut parcel)
        .with_context(|| format!("Failed to decode: {}", path.display()))?;
    if parcel.remaining() > 0 {
        tracing::warn!(path = %path.display(), trailing = parcel.remaining(), "ignoring trailing bytes");
    }
    Ok(buffer)
}

/// Save a buffer to a wire file
pub fn save_buffer(path: &Path, buffer: &PixelBuffer) -> Result<()> {
    let mut parcel = Parcel::new();
    file_codec()
        .encode(buffer, &mut parcel)
        .with_context(|| format!("Failed to encode: {}", path.display()))?;
    std::fs::write(path, parcel.to_bytes()?).with_context(|| format!("Failed to save: {}", path.display()))
}

/// Format byte size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
