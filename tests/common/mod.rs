//! Common test utilities and fixtures for secscan integration tests
//!
//! This module provides:
//! - `TestRepo` builder for creating project trees with C# and VB sources
//! - Custom assertions for validating CLI output and diagnostics
//! - Source fixtures shared by the parity and CLI tests

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;
pub mod test_repo;

pub use assertions::*;
pub use test_repo::TestRepo;
