//! Shared test utilities for srxsync integration tests.
//!
//! This module provides:
//! - `TestHarness` wiring a rules file, an in-memory inventory and the services
//! - Builders for projects, files and parser options

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
