//! Edge cases and error handling
//!
//! Malformed, empty and unusual inputs must never abort a pass or panic.

pub mod error_handling_tests;
