//! Roo metadata engine
//!
//! A demand-driven, cached, dependency-tracked engine that computes derived
//! Java source fragments (inter-type declarations, ITDs) for governor types
//! and recomputes exactly what is affected when a source file or another
//! piece of metadata changes.
//!
//! # Architecture Overview
//!
//! - Metadata is addressed by identifiers `MID:<class>` (a kind of metadata,
//!   one per provider) and `MID:<class>#<key>` (one item for one governor).
//! - Providers compute items on demand through the [`metadata::MetadataService`],
//!   which caches them and breaks re-entrant requests by answering `None`.
//! - Providers record upstream → downstream edges in a dependency registry;
//!   a change to an upstream is fanned out to everything downstream of it.
//! - A hash-tracking notifier suppresses the cascade when a recomputed item
//!   turns out unchanged.
//! - ITD providers see a governor's full member surface through the
//!   [`scanner::MemberDetailsScanner`], which also applies decorators to a
//!   fixpoint.
//!
//! # Modules
//!
//! - [`metadata`] - identifiers, provider traits, registry, cache, service
//! - [`model`] - Java type model and member details
//! - [`scanner`] - member details aggregation and decoration
//! - [`itd`] - physical types and the generic ITD provider
//! - [`addons`] - equals/hashCode, toString and JavaBean generators plus decorators
//! - [`project`] - project descriptions and engine sessions
//! - [`config`] - engine configuration
//! - [`core`] - errors
//! - [`cli`] - the `roo-md` command line
//!
//! # Example
//!
//! ```rust,no_run
//! use roo_metadata::config::EngineConfig;
//! use roo_metadata::itd::TypeDeclaration;
//! use roo_metadata::project::ProjectSession;
//!
//! # fn example() -> anyhow::Result<()> {
//! let session = ProjectSession::new(&EngineConfig::default())?;
//! session.physical().update_type(
//!     session.service(),
//!     TypeDeclaration::new("com.example.Person")
//!         .annotated("org.springframework.roo.addon.javabean.RooJavaBean")
//!         .field("name", "java.lang.String", &[]),
//! )?;
//! for report in session.scan()? {
//!     print!("{report}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod addons;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod itd;
pub mod metadata;
pub mod model;
pub mod project;
pub mod scanner;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
