//! TOML file parsing with file path context.
//!
//! Shared by engine configuration and project descriptions. Errors name the
//! file and whether reading or parsing failed; the underlying I/O or TOML
//! error is kept as the cause so [`crate::core::user_friendly_error`] can
//! recognise it.
//!
//! ```text
//! Failed to parse roo-metadata.toml
//! Caused by:
//!     unknown field `cache_size`, expected `cache_capacity` or `trace_level`
//! ```

use anyhow::{Context, Result};
use std::path::Path;

/// Read and deserialize a TOML file.
///
/// # Errors
///
/// Fails if the file cannot be read or does not match `T`.
pub fn parse_toml_file<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}
