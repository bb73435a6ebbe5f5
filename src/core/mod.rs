//! Core error types shared by every layer of the engine.
//!
//! - [`MetadataError`] - strongly-typed configuration failures
//! - [`ErrorContext`] - terminal-friendly wrapper with suggestions
//! - [`user_friendly_error`] - maps an [`anyhow::Error`] to an [`ErrorContext`]

pub mod error;

pub use error::{ErrorContext, MetadataError, user_friendly_error};

/// Result alias for engine operations.
pub type Result<T, E = MetadataError> = std::result::Result<T, E>;
