//! Serialization policy.
//!
//! The policy is plain data loaded from YAML:
//!
//! ```yaml
//! inline_threshold: 32768
//! ```
//!
//! Buffers whose `byte_count` is below `inline_threshold` travel inline in
//! the parcel; larger ones travel through a shared-memory segment. Both
//! sides of a transfer must agree on the threshold.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default inline threshold in bytes (32 KiB).
pub const INLINE_THRESHOLD: u32 = 32 * 1024;

/// Tunables for [`Codec`](crate::Codec).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WirePolicy {
    /// Largest byte count (exclusive) sent inline
    pub inline_threshold: u32,
}

impl Default for WirePolicy {
    fn default() -> Self {
        Self {
            inline_threshold: INLINE_THRESHOLD,
        }
    }
}

impl WirePolicy {
    /// A policy that never uses shared memory, for flat files.
    pub fn inline_only() -> Self {
        Self {
            inline_threshold: u32::MAX,
        }
    }

    /// Parses a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Reads and parses a YAML file.
    pub fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Returns `true` if a payload of `byte_count` bytes goes inline.
    #[inline]
    pub fn is_inline(&self, byte_count: usize) -> bool {
        byte_count < self.inline_threshold as usize
    }
}
