//! CLI argument definitions using clap with subcommand architecture

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::diagnostic::Severity;

/// Static security analyzer for C# and Visual Basic
#[derive(Parser, Debug)]
#[command(name = "secscan")]
#[command(about = "Reports security anti-patterns in C# and Visual Basic sources")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (applies to all commands)
    #[arg(short, long, default_value = "text", value_enum, global = true)]
    pub format: OutputFormat,

    /// Show verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to ./secscan.toml, then the user config dir)
    #[arg(long, value_name = "FILE", global = true, env = "SECSCAN_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze files or directories
    #[command(visible_alias = "a")]
    Analyze(AnalyzeArgs),

    /// List the effective rule catalog
    Rules(RulesArgs),

    /// Print the reduced-kind view of a file's syntax tree
    DumpTree(DumpTreeArgs),
}

/// Arguments for the analyze command
#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Files or directories to analyze
    #[arg(value_name = "PATH", default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Exit with a findings status when a diagnostic reaches this severity
    #[arg(long, value_enum, value_name = "SEVERITY")]
    pub fail_on: Option<FailOn>,

    /// Worker threads (defaults to the configured value, then the CPU count)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Additional exclude glob (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Maximum directory depth
    #[arg(long)]
    pub max_depth: Option<usize>,
}

/// Arguments for the rules command
#[derive(Args, Debug, Clone, Default)]
pub struct RulesArgs {
    /// Only list rows of this rule id
    #[arg(long, value_name = "ID")]
    pub id: Option<String>,
}

/// Arguments for the dump-tree command
#[derive(Args, Debug, Clone)]
pub struct DumpTreeArgs {
    /// Source file to dump
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Only show nodes that map to a reduced kind or declaration
    #[arg(long)]
    pub reduced_only: bool,
}

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default for terminal)
    #[default]
    #[value(alias = "pretty")]
    Text,
    /// TOON (Token-Oriented Object Notation) - token-efficient format
    Toon,
    /// JSON - standard JSON output for machine parsing
    Json,
}

/// Severity threshold for `--fail-on`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FailOn {
    Info,
    Warning,
    Error,
}

impl AnalyzeArgs {
    /// Analyze the given paths with every option at its default
    pub fn for_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            fail_on: None,
            jobs: None,
            exclude: Vec::new(),
            max_depth: None,
        }
    }
}

impl FailOn {
    pub fn severity(self) -> Severity {
        match self {
            FailOn::Info => Severity::Info,
            FailOn::Warning => Severity::Warning,
            FailOn::Error => Severity::Error,
        }
    }
}
