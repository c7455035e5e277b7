//! Diagnostic records produced by the rule engine
//!
//! A [`DiagnosticResult`] is created once, on a positive rule match, and is
//! never mutated afterwards. Hosts own the records and decide how to render
//! them and whether a given severity fails a build.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Warning
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    /// Parse a severity name (case-insensitive). `warn` is accepted for `warning`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "info" | "information" | "note" => Some(Severity::Info),
            "warning" | "warn" => Some(Severity::Warning),
            "error" => Some(Severity::Error),
            _ => None,
        }
    }
}

/// Source range of a syntax node
///
/// Lines and columns are 1-based; columns count bytes, as both front ends do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub start_byte: usize,
    pub end_byte: usize,
}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Location {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.start_byte, self.end_byte).cmp(&(other.start_byte, other.end_byte))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Where a diagnostic was raised, beyond its raw location
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiagnosticContext {
    /// Fully qualified name of the enclosing type, when one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enclosing_type: Option<String>,

    /// Method, constructor or field the offending code belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
}

/// A single finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticResult {
    /// Stable rule identifier, e.g. `SCS0015`
    pub id: String,
    pub severity: Severity,
    pub message: String,
    /// File label the pass was run with
    pub file: String,
    pub location: Location,
    #[serde(default)]
    pub context: DiagnosticContext,
}

impl DiagnosticResult {
    /// Ordering used for every diagnostic sequence returned to a host:
    /// file, then position, then rule id, then message.
    pub fn sort_key(&self) -> (&str, Location, &str, &str) {
        (&self.file, self.location, &self.id, &self.message)
    }
}

impl fmt::Display for DiagnosticResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} {}: {}",
            self.file, self.location, self.severity, self.id, self.message
        )
    }
}

/// Sort diagnostics into their canonical order
pub fn sort_diagnostics(diagnostics: &mut [DiagnosticResult]) {
    diagnostics.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}
