//! Diagnostic rule engine
//!
//! The engine walks one syntax tree through the [`SyntaxHelper`] capability
//! set and never sees a native node kind. For every call or construction it
//! resolves the callee, looks the callee up in the [`RuleCatalog`], and
//! reports rows whose tainted argument is a literal. Property writes are
//! matched the same way against `set_<Property>` rows, with the assigned
//! value as argument 0.
//!
//! Candidates are independent: nothing is carried from one to the next, so
//! evaluation order does not affect the result. A pass is sequential; hosts
//! parallelize across files.

pub mod literal;
pub mod suppression;

pub use literal::is_literal;
pub use suppression::is_suppressed;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::diagnostic::{sort_diagnostics, DiagnosticContext, DiagnosticResult};
use crate::error::{Result, ScanError};
use crate::rules::{RuleCatalog, RuleCatalogEntry};
use crate::semantic::{MethodSymbol, SemanticModel, Symbol};
use crate::syntax::{CallKind, DeclarationKind, SyntaxHelper, SyntaxNodeKind};

/// Argument bound to parameter `index` of `callee`
///
/// A positional argument binds to the parameter at its position. A named
/// argument binds only to the parameter it names, so it is never picked up
/// by position.
pub fn bound_argument<H: SyntaxHelper>(
    helper: &H,
    arguments: &[H::Node],
    callee: &MethodSymbol,
    index: usize,
) -> Option<H::Node> {
    let parameter = callee.parameter_name(index);
    arguments.iter().enumerate().find_map(|(position, &argument)| {
        match helper.argument_name(argument).and_then(|n| helper.name_text(n)) {
            Some(name) => parameter
                .is_some_and(|p| helper.names_equal(&name, p))
                .then_some(argument),
            None => (position == index).then_some(argument),
        }
    })
}

/// Parameter name reported for property setter rows
const SETTER_VALUE_NAME: &str = "value";

/// Cooperative cancellation flag, checked between candidates
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Runs the rule catalog over syntax trees
#[derive(Debug, Clone)]
pub struct Analyzer<'c> {
    catalog: &'c RuleCatalog,
    cancellation: Option<CancellationToken>,
}

impl<'c> Analyzer<'c> {
    pub fn new(catalog: &'c RuleCatalog) -> Self {
        Self {
            catalog,
            cancellation: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn catalog(&self) -> &RuleCatalog {
        self.catalog
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.cancellation {
            Some(token) if token.is_cancelled() => Err(ScanError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Analyze one compilation unit
    ///
    /// Diagnostics come back ordered by location, then rule id. The only
    /// error is [`ScanError::Cancelled`].
    pub fn analyze<H: SyntaxHelper>(
        &self,
        helper: &H,
        model: &dyn SemanticModel<H::Node>,
        file: &str,
    ) -> Result<Vec<DiagnosticResult>> {
        let root = helper.root();
        let mut diagnostics = Vec::new();
        let mut candidates = 0usize;
        let mut writes = 0usize;

        for node in helper.descendants_and_self(root) {
            match helper.kind(node) {
                Some(SyntaxNodeKind::Invocation | SyntaxNodeKind::ObjectConstruction) => {
                    self.check_cancelled()?;
                    candidates += 1;
                    diagnostics.extend(self.evaluate_candidate(helper, model, node, file));
                }
                Some(SyntaxNodeKind::Assignment | SyntaxNodeKind::ObjectInitializerMember) => {
                    self.check_cancelled()?;
                    writes += 1;
                    diagnostics.extend(self.evaluate_property_write(helper, model, node, file));
                }
                _ => {}
            }
        }

        sort_diagnostics(&mut diagnostics);

        info!(
            file,
            syntax = %helper.syntax(),
            candidates,
            writes,
            diagnostics = diagnostics.len(),
            "analysis pass complete"
        );

        Ok(diagnostics)
    }

    /// Evaluate one call or construction against the catalog
    ///
    /// Anything that is not a call, does not resolve, or has no catalog row
    /// yields nothing.
    pub fn evaluate_candidate<H: SyntaxHelper>(
        &self,
        helper: &H,
        model: &dyn SemanticModel<H::Node>,
        node: H::Node,
        file: &str,
    ) -> Vec<DiagnosticResult> {
        if !helper.is_call(node) {
            return Vec::new();
        }

        let Some(callee) = helper.resolve_callee_symbol(node, model) else {
            debug!(
                file,
                target = ?helper.call_target_name(node).and_then(|n| helper.name_text(n)),
                "unresolved call skipped"
            );
            return Vec::new();
        };

        let rows = self
            .catalog
            .lookup(&callee.containing_type.full_name(), &callee.name);
        if rows.is_empty() {
            return Vec::new();
        }

        let arguments = helper.call_arguments(node, CallKind::INVOCATION | CallKind::OBJECT_CREATION);
        let mut diagnostics = Vec::new();

        for row in rows {
            let Some(argument) = bound_argument(helper, &arguments, &callee, row.parameter) else {
                debug!(
                    file,
                    member = %callee.qualified_name(),
                    index = row.parameter,
                    arguments = arguments.len(),
                    "tainted argument absent"
                );
                continue;
            };
            if !is_literal(helper, argument) {
                continue;
            }
            if let Some(diagnostic) =
                self.report(helper, model, node, row, callee.parameter_name(row.parameter), file)
            {
                diagnostics.push(diagnostic);
            }
        }

        diagnostics
    }

    /// Evaluate an assignment or member initializer as a property setter call
    pub fn evaluate_property_write<H: SyntaxHelper>(
        &self,
        helper: &H,
        model: &dyn SemanticModel<H::Node>,
        node: H::Node,
        file: &str,
    ) -> Vec<DiagnosticResult> {
        if !matches!(
            helper.kind(node),
            Some(SyntaxNodeKind::Assignment | SyntaxNodeKind::ObjectInitializerMember)
        ) {
            return Vec::new();
        }

        let (Some(target), Some(value)) = (helper.assignment_left(node), helper.assignment_right(node)) else {
            return Vec::new();
        };
        let Some(Symbol::Property(property)) = model.symbol_info(target) else {
            return Vec::new();
        };

        let rows = self
            .catalog
            .lookup(&property.containing_type.full_name(), &property.setter_name());
        let mut diagnostics = Vec::new();

        for row in rows {
            if row.parameter != 0 {
                debug!(file, rule = %row.id, index = row.parameter, "setter row with index beyond the value");
                continue;
            }
            if !is_literal(helper, value) {
                continue;
            }
            if let Some(diagnostic) = self.report(helper, model, node, row, Some(SETTER_VALUE_NAME), file) {
                diagnostics.push(diagnostic);
            }
        }

        diagnostics
    }

    fn report<H: SyntaxHelper>(
        &self,
        helper: &H,
        model: &dyn SemanticModel<H::Node>,
        node: H::Node,
        row: &RuleCatalogEntry,
        parameter_name: Option<&str>,
        file: &str,
    ) -> Option<DiagnosticResult> {
        if is_suppressed(helper, node, &row.id) {
            debug!(file, rule = %row.id, "diagnostic suppressed in source");
            return None;
        }

        Some(DiagnosticResult {
            id: row.id.clone(),
            severity: row.severity,
            message: row.render_message(parameter_name),
            file: file.to_string(),
            location: helper.location(node),
            context: diagnostic_context(helper, model, node),
        })
    }
}

/// Enclosing type and member of a reported node
///
/// The member is the enclosing method or constructor, else the enclosing
/// property, else the field whose initializer contains the node.
pub fn diagnostic_context<H: SyntaxHelper>(
    helper: &H,
    model: &dyn SemanticModel<H::Node>,
    node: H::Node,
) -> DiagnosticContext {
    let enclosing_type = helper.enclosing_type_symbol(node, model).map(|t| t.full_name());

    let member = helper
        .resolve_caller_symbol(node, model)
        .map(|m| m.name)
        .or_else(|| {
            helper
                .enclosing_declaration(node, DeclarationKind::Property)
                .and_then(|p| helper.declared_name(p))
        })
        .or_else(|| {
            helper
                .ancestors_and_self(node)
                .into_iter()
                .find_map(|n| helper.field_declarator_of_construction(n))
                .and_then(|d| helper.declared_name(d))
        });

    DiagnosticContext {
        enclosing_type,
        member,
    }
}
