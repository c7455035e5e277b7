//! Integration tests for secscan-engine
//!
//! These tests verify end-to-end behavior across multiple modules.
//!
//! ## Test Tiers
//!
//! - **Tier 1: Unit** - Individual functions (in src/*.rs)
//! - **Tier 2: Component** - Front ends, binder and engine together (`engine`)
//! - **Tier 3: Integration** - Full CLI pipelines (`cli`, `edge_cases`)
//!
//! ## Running Integration Tests
//!
//! ```bash
//! # Run all integration tests
//! cargo test --test integration_tests
//!
//! # Run specific test group
//! cargo test --test integration_tests engine::parity_tests
//! cargo test --test integration_tests cli::analyze_tests
//! ```
//!
//! ## Test Fixture Strategy
//!
//! Tests use tempfile to create temporary directories with specific source
//! structures. Source text lives in `common::fixtures` as C# and Visual Basic
//! pairs describing the same program.

#![allow(clippy::duplicate_mod)]

// Shared test infrastructure
mod common;

// Cross-syntax rule engine tests
mod engine;

// CLI command tests (analyze, rules, dump-tree)
mod cli;

// Edge cases and error handling tests
mod edge_cases;
