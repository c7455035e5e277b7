//! Command modules for the secscan CLI
//!
//! Each command module implements a single top-level command:
//! - `analyze` - run the rule catalog over files and directories
//! - `rules` - list the effective rule catalog
//! - `dump_tree` - print the reduced-kind view of a syntax tree
//!
//! All command handlers take their respective `Args` struct from `cli.rs`
//! and a shared `CommandContext` for output format, verbosity and the loaded
//! configuration.

pub mod analyze;
pub mod dump_tree;
pub mod rules;

pub use analyze::{run_analyze, run_analyze_with_cancellation, AnalyzeOutcome};
pub use dump_tree::run_dump_tree;
pub use rules::run_rules;

use crate::cli::OutputFormat;
use crate::config::SecscanConfig;

/// Shared context passed to all command handlers
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    /// Output format (text, toon, or json)
    pub format: OutputFormat,
    /// Show verbose output
    pub verbose: bool,
    /// Loaded configuration
    pub config: SecscanConfig,
}

impl CommandContext {
    pub fn new(format: OutputFormat, verbose: bool, config: SecscanConfig) -> Self {
        Self {
            format,
            verbose,
            config,
        }
    }
}

/// Encode a JSON value as TOON using the rtoon library
pub fn encode_toon(value: &serde_json::Value) -> String {
    rtoon::encode_default(value).unwrap_or_else(|e| format!("TOON encoding error: {}", e))
}

/// Render a JSON value in the context's format; text falls back to `text`
pub(crate) fn render(ctx: &CommandContext, value: &serde_json::Value, text: impl FnOnce() -> String) -> String {
    match ctx.format {
        OutputFormat::Json => serde_json::to_string_pretty(value).unwrap_or_default(),
        OutputFormat::Toon => encode_toon(value),
        OutputFormat::Text => text(),
    }
}

/// Section banner used by text output
pub(crate) fn banner(title: &str) -> String {
    let rule = "═".repeat(43);
    format!("{rule}\n  {title}\n{rule}\n\n")
}
