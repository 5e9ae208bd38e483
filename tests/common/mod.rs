//! Common test utilities and shared infrastructure.
//!
//! This module provides all the shared functionality used across the test suite:
//! - `fixtures`: coder specs, fragment sets and erasure patterns
//! - `assertions`: high-level assertion helpers for decode and reconstruct

pub mod assertions;
pub mod fixtures;

// Re-export commonly used test helpers
#[allow(unused_imports)] // These are used across many test files
pub use fixtures::{small_coders, CoderSpec, FragmentSet};
