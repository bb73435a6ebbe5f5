//! Error handling for the metadata engine
//!
//! The engine distinguishes three kinds of failure:
//!
//! 1. **Configuration errors** are add-on authoring bugs: a malformed identifier
//!    handed to a public entry point, a second provider claiming a metadata class,
//!    a dependency edge that would close a cycle, or a retrieval for a class that
//!    has no provider. They are reported as [`MetadataError`] and are never
//!    retried.
//! 2. **Unavailable metadata** (a provider that cannot compute its item yet) is
//!    not an error at all; it is an `Ok(None)` from the retrieval APIs.
//! 3. **Re-entrant retrieval** of an identifier already being computed is also
//!    `Ok(None)`.
//!
//! At the application boundary errors travel as [`anyhow::Error`];
//! [`user_friendly_error`] turns them into an [`ErrorContext`] carrying an
//! actionable suggestion for the terminal.
//!
//! # Examples
//!
//! ```rust,no_run
//! use roo_metadata::core::{MetadataError, ErrorContext, user_friendly_error};
//!
//! let error = MetadataError::ProviderNotFound {
//!     id: "MID:com.example.Missing#Foo".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The error type for metadata engine operations.
///
/// Every variant describes a programming or configuration mistake rather
/// than a transient runtime condition, so none of them are retried.
///
/// # Error Categories
///
/// ## Identifiers
/// - [`InvalidIdentifier`] - string is not a well-formed `MID:` identifier
/// - [`ClassMismatch`] - identifier belongs to a different metadata class than expected
///
/// ## Dependency graph
/// - [`InvalidDependency`] - edge would create a self reference or cycle
///
/// ## Providers
/// - [`DuplicateProvider`] - a second provider claims an already-provided class
/// - [`ProviderNotFound`] - no provider is registered for the requested class
///
/// ## Configuration
/// - [`Config`] - invalid engine configuration values
///
/// [`InvalidIdentifier`]: MetadataError::InvalidIdentifier
/// [`ClassMismatch`]: MetadataError::ClassMismatch
/// [`InvalidDependency`]: MetadataError::InvalidDependency
/// [`DuplicateProvider`]: MetadataError::DuplicateProvider
/// [`ProviderNotFound`]: MetadataError::ProviderNotFound
/// [`Config`]: MetadataError::Config
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// A string passed to a public entry point is not a valid identifier.
    ///
    /// # Fields
    /// - `id`: the offending string
    /// - `expected`: what shape was required ("class", "instance" or "any")
    #[error("Invalid metadata identification string '{id}' (expected {expected} identifier)")]
    InvalidIdentifier {
        /// The rejected identification string
        id: String,
        /// Required identifier shape
        expected: &'static str,
    },

    /// Registering the edge would make an identifier depend on itself.
    ///
    /// This indicates a circular metadata design in an add-on.
    #[error("Invalid dependency between upstream '{upstream}' and downstream '{downstream}'")]
    InvalidDependency {
        /// Proposed upstream identifier
        upstream: String,
        /// Proposed downstream identifier
        downstream: String,
    },

    /// A provider is already registered for this metadata class.
    #[error("Metadata provider for '{class_id}' already registered")]
    DuplicateProvider {
        /// Class identifier claimed twice
        class_id: String,
    },

    /// Retrieval was attempted for a class without a registered provider.
    #[error("No metadata provider is currently registered to provide metadata for '{id}'")]
    ProviderNotFound {
        /// Identifier whose class has no provider
        id: String,
    },

    /// An identifier or item does not belong to the expected metadata class.
    #[error("Metadata '{id}' does not belong to class '{expected}'")]
    ClassMismatch {
        /// The identifier that was rejected
        id: String,
        /// The class identifier that was required
        expected: String,
    },

    /// Engine configuration value is out of range.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error
        message: String,
    },
}

impl MetadataError {
    /// Shorthand for an [`MetadataError::InvalidIdentifier`] error.
    pub fn invalid_id(id: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidIdentifier {
            id: id.into(),
            expected,
        }
    }
}

/// Error wrapper carrying a suggestion and details for display.
///
/// Suggestions are printed in green, details in yellow, and the error
/// itself in bold red.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error message
    pub error: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub fn new(error: impl fmt::Display) -> Self {
        Self {
            error: error.to_string(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error context to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

/// Convert any error into an [`ErrorContext`] with a suggestion where one is known.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(metadata_error) = error.downcast_ref::<MetadataError>() {
        return create_error_context(metadata_error);
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(format!("{error:#}"))
            .with_suggestion("Check the TOML syntax. Verify quotes, brackets, and key names")
            .with_details(toml_error.message().to_string());
    }

    let ctx = ErrorContext::new(format!("{error:#}"));
    match error.chain().nth(1) {
        Some(cause) => ctx.with_details(cause.to_string()),
        None => ctx,
    }
}

fn create_error_context(error: &MetadataError) -> ErrorContext {
    match error {
        MetadataError::InvalidIdentifier { .. } => ErrorContext::new(error)
            .with_suggestion("Build identifiers with the identification functions instead of by hand")
            .with_details("Identifiers have the form MID:<class> or MID:<class>#<instance>"),
        MetadataError::InvalidDependency { .. } => ErrorContext::new(error)
            .with_suggestion("Restructure the add-on so that no metadata depends on itself, directly or transitively")
            .with_details("The dependency registry only accepts edges that keep the graph acyclic"),
        MetadataError::DuplicateProvider { .. } => ErrorContext::new(error)
            .with_suggestion("Unregister the existing provider before registering a replacement"),
        MetadataError::ProviderNotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Check that the add-on providing this metadata is installed and registered")
            .with_details("This usually means an add-on calls into a feature that was moved or removed"),
        MetadataError::ClassMismatch { .. } => ErrorContext::new(error),
        MetadataError::Config { .. } => ErrorContext::new(error)
            .with_suggestion("Check the values in roo-metadata.toml"),
    }
}
