//! Engine tests driven through the public library API
//!
//! These run both front ends over matching C# and Visual Basic programs and
//! check that the rule engine reports the same findings for each.

pub mod parity_tests;
pub mod rule_tests;
