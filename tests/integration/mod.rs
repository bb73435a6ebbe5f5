//! Integration test suite for the metadata engine
//!
//! End-to-end tests driving the public API and the `roo-md` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **engine**: retrieval, caching, re-entrancy and dependency registration
//! - **notification**: default notification policy and downstream fan-out
//! - **scanner**: member details aggregation and decorator fixpoint
//! - **addons**: bundled ITD generators over a project hierarchy
//! - **cli**: `roo-md` commands

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod addons;
mod cli;
mod engine;
mod notification;
mod scanner;
