//! Engine configuration.
//!
//! Read from `roo-metadata.toml` in the working directory, or from the file
//! given with `--config`. A missing default file means defaults; a missing
//! explicit file is an error.
//!
//! ```toml
//! # Maximum number of cached metadata items (must be > 0)
//! cache_capacity = 10000
//!
//! # 0 = off, 1 = log notification edges, 2 = also log provider timings
//! trace_level = 0
//! ```
//!
//! Traces are emitted at `info` on the `roo_metadata::trace` target. `roo-md`
//! enables that target whenever `trace_level` is non-zero; other embedders
//! must include it in their own filter.

mod parser;

pub use parser::parse_toml_file;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{CONFIG_FILE_NAME, DEFAULT_CACHE_CAPACITY, MAX_TRACE_LEVEL};
use crate::core::MetadataError;

const fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

/// Tunables of the metadata service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    #[serde(default)]
    pub trace_level: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            trace_level: 0,
        }
    }
}

impl EngineConfig {
    /// Load from `path`, or from the default file when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Fails if an explicit file is missing, a file cannot be parsed, or a
    /// value is out of range.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => parse_toml_file(path)?,
            None => {
                let default = PathBuf::from(CONFIG_FILE_NAME);
                if default.exists() {
                    parse_toml_file(&default)?
                } else {
                    tracing::debug!("No {CONFIG_FILE_NAME} found, using defaults");
                    Self::default()
                }
            }
        };
        config.validate().context("Invalid engine configuration")?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`MetadataError::Config`] for a zero capacity or an unknown trace level.
    pub fn validate(&self) -> Result<(), MetadataError> {
        if self.cache_capacity == 0 {
            return Err(MetadataError::Config {
                message: "cache_capacity must be greater than zero".to_string(),
            });
        }
        if self.trace_level > MAX_TRACE_LEVEL {
            return Err(MetadataError::Config {
                message: format!(
                    "trace_level must be between 0 and {MAX_TRACE_LEVEL}, got {}",
                    self.trace_level
                ),
            });
        }
        Ok(())
    }
}
