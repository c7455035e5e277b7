//! CLI command integration tests
//!
//! These drive the `secscan` binary through every subcommand and output
//! format (text, toon, json).

pub mod analyze_tests;
pub mod dump_tree_tests;
pub mod rules_tests;
