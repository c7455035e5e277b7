//! Rule catalog
//!
//! A rule is a set of catalog rows, each naming a sensitive member (owning
//! type, member name) and the index of the argument that must not be a
//! literal. Several rows may share a diagnostic id. The engine looks rows up
//! by the symbol a call resolves to; it never inspects rule ids itself.
//!
//! Member names follow metadata conventions: constructors are `.ctor` and
//! property setters are `set_<Property>`, with the assigned value at
//! argument 0.

pub mod hardcoded_password;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

use crate::config::{RulesConfig, SinkConfig};
use crate::diagnostic::Severity;
use crate::error::{Result, ScanError};
use crate::semantic::CONSTRUCTOR_NAME;

/// Message used when a row carries no template of its own
pub const DEFAULT_MESSAGE: &str = "Hardcoded value passed to {type}.{member}";

/// One sensitive member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCatalogEntry {
    /// Fully qualified owning type, e.g. `System.Net.NetworkCredential`
    pub type_name: String,

    /// `.ctor`, `set_<Property>` or a method name
    pub member: String,

    /// Zero-based index of the tainted argument
    pub parameter: usize,

    pub id: String,

    pub severity: Severity,

    /// Message template; `{type}`, `{member}` and `{parameter}` are expanded
    pub message: String,
}

impl RuleCatalogEntry {
    pub fn new(
        type_name: impl Into<String>,
        member: impl Into<String>,
        parameter: usize,
        id: impl Into<String>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            member: member.into(),
            parameter,
            id: id.into(),
            severity: Severity::Warning,
            message: DEFAULT_MESSAGE.to_string(),
        }
    }

    /// Row for a constructor argument
    pub fn constructor(type_name: impl Into<String>, parameter: usize, id: impl Into<String>) -> Self {
        Self::new(type_name, CONSTRUCTOR_NAME, parameter, id)
    }

    /// Row for a property setter; the assigned value is argument 0
    pub fn setter(type_name: impl Into<String>, property: &str, id: impl Into<String>) -> Self {
        Self::new(type_name, format!("set_{}", property), 0, id)
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Build a row from a configured sink
    pub fn from_sink(sink: &SinkConfig) -> Result<Self> {
        if sink.type_name.trim().is_empty() || sink.member.trim().is_empty() || sink.id.trim().is_empty() {
            return Err(ScanError::Config {
                message: "rules.sinks entries need a type, a member and an id".to_string(),
            });
        }

        let mut entry = Self::new(sink.type_name.trim(), sink.member.trim(), sink.parameter, sink.id.trim());
        if let Some(severity) = &sink.severity {
            entry.severity = parse_severity(severity)?;
        }
        if let Some(message) = &sink.message {
            entry.message = message.clone();
        }
        Ok(entry)
    }

    /// Human-facing member name: the type name for constructors, the
    /// property name for setters
    pub fn member_display(&self) -> &str {
        if self.member == CONSTRUCTOR_NAME {
            self.type_name.rsplit('.').next().unwrap_or(&self.type_name)
        } else if let Some(property) = self.member.strip_prefix("set_") {
            property
        } else {
            &self.member
        }
    }

    /// Render the message template
    ///
    /// `parameter_name` comes from the resolved symbol; without it the index
    /// is used.
    pub fn render_message(&self, parameter_name: Option<&str>) -> String {
        let parameter = match parameter_name {
            Some(name) => name.to_string(),
            None => format!("#{}", self.parameter),
        };
        self.message
            .replace("{type}", &self.type_name)
            .replace("{member}", self.member_display())
            .replace("{parameter}", &parameter)
    }
}

fn parse_severity(value: &str) -> Result<Severity> {
    Severity::parse(value).ok_or_else(|| ScanError::Config {
        message: format!("unknown severity '{}' (expected info, warning or error)", value),
    })
}

/// Every built-in row
pub fn builtin_entries() -> Vec<RuleCatalogEntry> {
    let mut entries = Vec::new();

    entries.extend(hardcoded_password::entries());

    entries
}

static BUILTIN: Lazy<RuleCatalog> = Lazy::new(|| {
    let catalog = RuleCatalog::new(builtin_entries());
    debug!(rows = catalog.len(), "built-in rule catalog ready");
    catalog
});

/// Immutable set of catalog rows indexed by (type, member)
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    entries: Vec<RuleCatalogEntry>,
    index: HashMap<(String, String), Vec<usize>>,
}

impl RuleCatalog {
    pub fn new(entries: Vec<RuleCatalogEntry>) -> Self {
        let mut index: HashMap<(String, String), Vec<usize>> = HashMap::new();
        for (i, entry) in entries.iter().enumerate() {
            index
                .entry((entry.type_name.clone(), entry.member.clone()))
                .or_default()
                .push(i);
        }
        Self { entries, index }
    }

    /// The built-in catalog, shared for the life of the process
    pub fn builtin() -> &'static RuleCatalog {
        &BUILTIN
    }

    /// Built-in rows adjusted by configuration
    ///
    /// Configured sinks are appended, disabled ids are dropped, then
    /// severity overrides are applied to every remaining row of an id.
    pub fn from_config(config: &RulesConfig) -> Result<Self> {
        let mut entries = builtin_entries();
        for sink in &config.sinks {
            entries.push(RuleCatalogEntry::from_sink(sink)?);
        }

        let disabled: BTreeSet<&str> = config.disabled.iter().map(|s| s.as_str()).collect();
        entries.retain(|e| !disabled.contains(e.id.as_str()));

        for (id, value) in &config.severity {
            let severity = parse_severity(value)?;
            let mut matched = false;
            for entry in entries.iter_mut().filter(|e| &e.id == id) {
                entry.severity = severity;
                matched = true;
            }
            if !matched {
                warn!(rule = %id, "severity override for a rule that is not in the catalog");
            }
        }

        Ok(Self::new(entries))
    }

    /// Rows for a member, in catalog order
    pub fn lookup(&self, type_name: &str, member: &str) -> Vec<&RuleCatalogEntry> {
        self.index
            .get(&(type_name.to_string(), member.to_string()))
            .map(|ids| ids.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }

    pub fn entries(&self) -> &[RuleCatalogEntry] {
        &self.entries
    }

    /// Distinct rule ids, sorted
    pub fn rule_ids(&self) -> BTreeSet<&str> {
        self.entries.iter().map(|e| e.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
