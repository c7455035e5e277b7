//! Syntax abstraction shared by the C# and Visual Basic front ends
//!
//! The two front ends produce unrelated node types: tree-sitter nodes for C#
//! and arena nodes for Visual Basic. [`SyntaxHelper`] is the one capability
//! set both implement, so that rule logic never inspects a native node kind.
//!
//! # Contract
//!
//! Every query is total. Asking a question about a shape a node does not
//! have (the right side of a method declaration, the arguments of a loop)
//! returns `None`, an empty `Vec` or `false`. Native kinds unknown to an
//! implementation are treated as absent rather than rejected.
//!
//! # Implementing
//!
//! Implementations supply navigation, the native → reduced kind mapping and
//! the per-shape queries. Classification predicates, document-order
//! enumeration and symbol delegation come for free as provided methods.

pub mod kind;

pub use kind::{CallKind, DeclarationKind, ExpressionShape, ImportDirective, LiteralKind, SyntaxNodeKind};

use std::fmt::Debug;

use crate::diagnostic::Location;
use crate::lang::SurfaceSyntax;
use crate::semantic::{MethodSymbol, SemanticModel, Symbol, TypeSymbol};

/// Syntax-agnostic queries over one syntax tree
pub trait SyntaxHelper {
    /// Native node handle of the front end
    type Node: Copy + PartialEq + Debug;

    // =========================================================================
    // Navigation
    // =========================================================================

    fn syntax(&self) -> SurfaceSyntax;

    fn root(&self) -> Self::Node;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Structural children in source order (punctuation excluded)
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Native kind name, for diagnostics output and tree dumps only
    fn native_kind(&self, node: Self::Node) -> &'static str;

    fn text(&self, node: Self::Node) -> &str;

    fn location(&self, node: Self::Node) -> Location;

    /// Identifier comparison under the syntax's case rules
    fn names_equal(&self, a: &str, b: &str) -> bool {
        if self.syntax().is_case_sensitive() {
            a == b
        } else {
            a.eq_ignore_ascii_case(b)
        }
    }

    // =========================================================================
    // Classification
    // =========================================================================

    /// Map the native kind onto the reduced kind set
    fn kind(&self, node: Self::Node) -> Option<SyntaxNodeKind>;

    /// Reduced expression shape; `Other` for anything unrecognized
    fn expression_shape(&self, node: Self::Node) -> ExpressionShape<Self::Node>;

    fn declaration_kind(&self, node: Self::Node) -> Option<DeclarationKind>;

    /// Unquoted value of a plain string literal
    fn string_literal_value(&self, node: Self::Node) -> Option<String>;

    /// Dotted name of a name-like node with generic arguments, escapes and
    /// global qualifiers stripped (`global::System.Net.NetworkCredential`
    /// becomes `System.Net.NetworkCredential`)
    fn name_text(&self, node: Self::Node) -> Option<String>;

    // =========================================================================
    // Shape queries
    // =========================================================================

    /// Written-to side of an assignment, variable binding or member initializer
    fn assignment_left(&self, node: Self::Node) -> Option<Self::Node>;

    /// Written value of an assignment, variable binding or member initializer
    fn assignment_right(&self, node: Self::Node) -> Option<Self::Node>;

    /// Object expression of a simple member access
    fn member_access_target(&self, node: Self::Node) -> Option<Self::Node>;

    /// Member name node of a simple member access
    fn member_access_name(&self, node: Self::Node) -> Option<Self::Node>;

    /// Callee expression of an invocation
    fn invocation_target(&self, node: Self::Node) -> Option<Self::Node>;

    /// Name node of a call's callee, or the constructed type of a construction
    fn call_target_name(&self, node: Self::Node) -> Option<Self::Node>;

    /// Argument expressions in source order, for calls matching `filter`
    fn call_arguments(&self, node: Self::Node, filter: CallKind) -> Vec<Self::Node>;

    /// Name node of a named call argument (`password: x` / `password:=x`);
    /// `argument` is an element of [`SyntaxHelper::call_arguments`]
    fn argument_name(&self, argument: Self::Node) -> Option<Self::Node>;

    /// Member-initializer nodes of a construction's initializer block
    fn object_initializer_members(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Attributes applied to a method, property or type declaration
    fn declaration_attributes(&self, node: Self::Node) -> Vec<Self::Node>;

    fn attribute_name(&self, node: Self::Node) -> Option<Self::Node>;

    fn attribute_arguments(&self, node: Self::Node) -> Vec<Self::Node>;

    fn attribute_argument_expression(&self, node: Self::Node) -> Option<Self::Node>;

    /// Name of a named attribute argument (`CheckId = "..."` / `CheckId:="..."`)
    fn attribute_argument_name(&self, node: Self::Node) -> Option<Self::Node>;

    /// Default value of parameter `index` of a method-like declaration
    fn default_parameter_value(&self, declaration: Self::Node, index: usize) -> Option<Self::Node>;

    /// Construction whose result is not bound to a declared variable
    fn is_temporary_construction(&self, node: Self::Node) -> bool;

    // =========================================================================
    // Declarations
    // =========================================================================

    fn declared_name(&self, declaration: Self::Node) -> Option<String>;

    /// Explicit type syntax of a variable, parameter or property declaration
    fn declared_type(&self, declaration: Self::Node) -> Option<Self::Node>;

    /// Parameters of a method-like declaration
    fn parameters(&self, declaration: Self::Node) -> Vec<Self::Node>;

    /// Namespace imports and aliases of the compilation unit
    fn imports(&self) -> Vec<ImportDirective>;

    /// Dotted namespace enclosing a node, empty for the global namespace
    fn namespace_of(&self, node: Self::Node) -> String;

    // =========================================================================
    // Provided: classification predicates
    // =========================================================================

    /// Invocations and object constructions
    fn is_call(&self, node: Self::Node) -> bool {
        matches!(
            self.kind(node),
            Some(SyntaxNodeKind::Invocation | SyntaxNodeKind::ObjectConstruction)
        )
    }

    fn is_member_access(&self, node: Self::Node) -> bool {
        self.kind(node) == Some(SyntaxNodeKind::MemberAccess)
    }

    fn is_object_construction(&self, node: Self::Node) -> bool {
        self.kind(node) == Some(SyntaxNodeKind::ObjectConstruction)
    }

    fn is_attribute_argument(&self, node: Self::Node) -> bool {
        self.kind(node) == Some(SyntaxNodeKind::AttributeArgument)
    }

    /// True when an object construction is, or sits inside, a field declaration
    fn is_under_field_declaration(&self, node: Self::Node) -> bool {
        self.is_object_construction(node)
            && self
                .ancestors_and_self(node)
                .into_iter()
                .any(|n| self.declaration_kind(n) == Some(DeclarationKind::Field))
    }

    /// The declarator of the field a construction initializes
    fn field_declarator_of_construction(&self, node: Self::Node) -> Option<Self::Node> {
        if !self.is_under_field_declaration(node) {
            return None;
        }
        self.ancestors_and_self(node)
            .into_iter()
            .find(|&n| self.declaration_kind(n) == Some(DeclarationKind::Variable))
    }

    /// Value expressions of a construction's member initializers, source order
    fn object_initializer_values(&self, node: Self::Node) -> Vec<Self::Node> {
        self.object_initializer_members(node)
            .into_iter()
            .filter_map(|member| self.assignment_right(member))
            .collect()
    }

    // =========================================================================
    // Provided: traversal
    // =========================================================================

    /// The node followed by its ancestors, innermost first
    fn ancestors_and_self(&self, node: Self::Node) -> Vec<Self::Node> {
        let mut result = vec![node];
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            result.push(parent);
            current = parent;
        }
        result
    }

    /// Pre-order (document order) walk of the subtree rooted at `node`
    fn descendants_and_self(&self, node: Self::Node) -> Vec<Self::Node> {
        let mut result = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            result.push(current);
            let children = self.children(current);
            stack.extend(children.into_iter().rev());
        }
        result
    }

    /// Nearest ancestor-or-self with the given declaration kind
    fn enclosing_declaration(&self, node: Self::Node, kind: DeclarationKind) -> Option<Self::Node> {
        self.ancestors_and_self(node)
            .into_iter()
            .find(|&n| self.declaration_kind(n) == Some(kind))
    }

    /// Nearest enclosing method or constructor declaration
    fn enclosing_method_like(&self, node: Self::Node) -> Option<Self::Node> {
        self.ancestors_and_self(node).into_iter().find(|&n| {
            self.declaration_kind(n)
                .is_some_and(|k| k.is_method_like())
        })
    }

    /// Calls and constructions under `node`, document order
    fn candidates(&self, node: Self::Node) -> Vec<Self::Node> {
        self.descendants_and_self(node)
            .into_iter()
            .filter(|&n| self.is_call(n))
            .collect()
    }

    fn descendant_assignments(&self, node: Self::Node) -> Vec<Self::Node> {
        self.descendants_and_self(node)
            .into_iter()
            .filter(|&n| self.kind(n) == Some(SyntaxNodeKind::Assignment))
            .collect()
    }

    fn descendant_member_accesses(&self, node: Self::Node) -> Vec<Self::Node> {
        self.descendants_and_self(node)
            .into_iter()
            .filter(|&n| self.is_member_access(n))
            .collect()
    }

    // =========================================================================
    // Provided: symbol delegation
    // =========================================================================

    /// Method or constructor a call resolves to
    fn resolve_callee_symbol(
        &self,
        node: Self::Node,
        model: &dyn SemanticModel<Self::Node>,
    ) -> Option<MethodSymbol> {
        if !self.is_call(node) {
            return None;
        }
        model.symbol_info(node).and_then(Symbol::into_method)
    }

    /// Method or constructor whose body contains the node
    fn resolve_caller_symbol(
        &self,
        node: Self::Node,
        model: &dyn SemanticModel<Self::Node>,
    ) -> Option<MethodSymbol> {
        let declaration = self.enclosing_method_like(node)?;
        model
            .declared_symbol(declaration)
            .and_then(Symbol::into_method)
    }

    /// Type declaration enclosing the node
    fn enclosing_type_symbol(
        &self,
        node: Self::Node,
        model: &dyn SemanticModel<Self::Node>,
    ) -> Option<TypeSymbol> {
        let declaration = self.enclosing_declaration(node, DeclarationKind::Type)?;
        model.declared_type(declaration)
    }

    /// Type declared by the node itself, when it is a type declaration
    fn class_declaration_symbol(
        &self,
        node: Self::Node,
        model: &dyn SemanticModel<Self::Node>,
    ) -> Option<TypeSymbol> {
        if self.declaration_kind(node) != Some(DeclarationKind::Type) {
            return None;
        }
        model.declared_type(node)
    }
}
