//! C# front end backed by tree-sitter-c-sharp
//!
//! Node kind names differ slightly between grammar releases (initializers
//! as `equals_value_clause` vs. a bare `=` child, `this` vs.
//! `this_expression`), so lookups go through small helpers that accept
//! either form instead of relying on one field layout.

use tree_sitter::{Node, Parser, Tree};

use crate::diagnostic::Location;
use crate::error::{Result, ScanError};
use crate::lang::SurfaceSyntax;
use crate::syntax::{
    CallKind, DeclarationKind, ExpressionShape, ImportDirective, LiteralKind, SyntaxHelper, SyntaxNodeKind,
};

const TYPE_DECLARATIONS: &[&str] = &[
    "class_declaration",
    "struct_declaration",
    "interface_declaration",
    "record_declaration",
    "record_struct_declaration",
    "enum_declaration",
];

const NAMESPACE_DECLARATIONS: &[&str] = &["namespace_declaration", "file_scoped_namespace_declaration"];

/// A parsed C# compilation unit
pub struct CSharpTree {
    source: String,
    tree: Tree,
}

impl CSharpTree {
    pub fn parse(source: &str) -> Result<Self> {
        let language = SurfaceSyntax::CSharp
            .tree_sitter_language()
            .ok_or_else(|| ScanError::ParseFailure {
                message: "C# grammar unavailable".to_string(),
            })?;

        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| ScanError::ParseFailure {
                message: format!("Failed to set language for C#: {:?}", e),
            })?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ScanError::ParseFailure {
                message: "tree-sitter returned no tree".to_string(),
            })?;

        Ok(Self {
            source: source.to_string(),
            tree,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether tree-sitter had to recover from syntax errors
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    pub fn helper(&self) -> CSharpSyntaxHelper<'_> {
        CSharpSyntaxHelper {
            source: &self.source,
            root: self.tree.root_node(),
        }
    }
}

/// [`SyntaxHelper`] over a tree-sitter C# tree
#[derive(Clone, Copy)]
pub struct CSharpSyntaxHelper<'t> {
    source: &'t str,
    root: Node<'t>,
}

impl<'t> CSharpSyntaxHelper<'t> {
    fn node_text(&self, node: Node<'t>) -> &'t str {
        self.source.get(node.byte_range()).unwrap_or("")
    }

    fn named_children(&self, node: Node<'t>) -> Vec<Node<'t>> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|c| c.kind() != "comment")
            .collect()
    }

    fn all_children(&self, node: Node<'t>) -> Vec<Node<'t>> {
        let mut cursor = node.walk();
        node.children(&mut cursor).collect()
    }

    fn child_of_kind(&self, node: Node<'t>, kind: &str) -> Option<Node<'t>> {
        self.named_children(node).into_iter().find(|c| c.kind() == kind)
    }

    fn has_token(&self, node: Node<'t>, token: &str) -> bool {
        self.all_children(node)
            .iter()
            .any(|c| !c.is_named() && c.kind() == token)
    }

    /// First named child after an unnamed `=` token, or the content of an
    /// `equals_value_clause`
    fn value_after_equals(&self, node: Node<'t>) -> Option<Node<'t>> {
        if let Some(clause) = self.child_of_kind(node, "equals_value_clause") {
            return self.named_children(clause).into_iter().next();
        }
        let mut seen_equals = false;
        for child in self.all_children(node) {
            if seen_equals && child.is_named() && child.kind() != "comment" {
                return Some(child);
            }
            if !child.is_named() && child.kind() == "=" {
                seen_equals = true;
            }
        }
        None
    }

    fn is_simple_assignment(&self, node: Node<'t>) -> bool {
        if node.kind() != "assignment_expression" {
            return false;
        }
        match node.child_by_field_name("operator") {
            Some(op) => self.node_text(op).trim() == "=",
            None => self.has_token(node, "="),
        }
    }

    /// Attribute arguments written `Name = value` may surface as an
    /// assignment expression rather than a `name_equals` prefix
    fn attribute_assignment(&self, node: Node<'t>) -> Option<Node<'t>> {
        let children = self.named_children(node);
        match children.as_slice() {
            [only] if self.is_simple_assignment(*only) => Some(*only),
            _ => None,
        }
    }

    fn is_construction_kind(kind: &str) -> bool {
        matches!(kind, "object_creation_expression" | "implicit_object_creation_expression")
    }

    fn initializer_of(&self, node: Node<'t>) -> Option<Node<'t>> {
        if !Self::is_construction_kind(node.kind()) {
            return None;
        }
        node.child_by_field_name("initializer")
            .or_else(|| self.child_of_kind(node, "initializer_expression"))
    }

    /// Expression of an `argument`; `this` and `base` are anonymous tokens,
    /// so the last non-extra child is taken whether named or not
    fn argument_value(&self, argument: Node<'t>) -> Node<'t> {
        let mut cursor = argument.walk();
        let value = argument
            .children(&mut cursor)
            .filter(|c| !c.is_extra())
            .last();
        value.unwrap_or(argument)
    }

    fn argument_list_of(&self, node: Node<'t>) -> Option<Node<'t>> {
        node.child_by_field_name("arguments")
            .or_else(|| self.child_of_kind(node, "argument_list"))
    }

    /// Type syntax a target-typed `new(...)` takes from its declaration
    fn implicit_construction_type(&self, node: Node<'t>) -> Option<Node<'t>> {
        let mut current = node.parent();
        while let Some(parent) = current {
            match parent.kind() {
                "equals_value_clause" | "variable_declarator" => current = parent.parent(),
                "variable_declaration" | "property_declaration" => {
                    return parent
                        .child_by_field_name("type")
                        .filter(|t| self.node_text(*t) != "var");
                }
                _ => return None,
            }
        }
        None
    }

    fn declaration_name(&self, node: Node<'t>) -> Option<Node<'t>> {
        node.child_by_field_name("name")
            .or_else(|| self.child_of_kind(node, "identifier"))
    }

    fn first_declarator(&self, node: Node<'t>) -> Option<Node<'t>> {
        let declaration = self.child_of_kind(node, "variable_declaration")?;
        self.child_of_kind(declaration, "variable_declarator")
    }

    fn parameter_nodes(&self, declaration: Node<'t>) -> Vec<Node<'t>> {
        let Some(list) = declaration
            .child_by_field_name("parameters")
            .or_else(|| self.child_of_kind(declaration, "parameter_list"))
        else {
            return Vec::new();
        };
        self.named_children(list)
            .into_iter()
            .filter(|p| p.kind() == "parameter")
            .collect()
    }

    fn literal_kind(&self, node: Node<'t>) -> Option<LiteralKind> {
        match node.kind() {
            "string_literal" | "verbatim_string_literal" | "raw_string_literal" => Some(LiteralKind::String),
            "interpolated_string_expression" => {
                let has_holes = self
                    .named_children(node)
                    .iter()
                    .any(|c| c.kind() == "interpolation");
                (!has_holes).then_some(LiteralKind::String)
            }
            "character_literal" => Some(LiteralKind::Character),
            "integer_literal" | "real_literal" => Some(LiteralKind::Numeric),
            "boolean_literal" => Some(LiteralKind::Boolean),
            "null_literal" => Some(LiteralKind::Null),
            _ => None,
        }
    }

    /// Root-level file-scoped namespace preceding `node`
    fn file_scoped_namespace(&self, node: Node<'t>) -> Option<Node<'t>> {
        self.named_children(self.root)
            .into_iter()
            .find(|c| c.kind() == "file_scoped_namespace_declaration" && c.start_byte() <= node.start_byte())
    }
}

/// Normalize type or member name syntax to a plain dotted name
fn clean_name(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    let text = text.trim().trim_start_matches("global::");
    for ch in text.chars() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth > 0 => {}
            '@' | '?' => {}
            c if c.is_whitespace() => {}
            c if c.is_alphanumeric() || c == '_' || c == '.' => out.push(c),
            _ => return None,
        }
    }
    if out.is_empty() || out.starts_with('.') || out.ends_with('.') {
        None
    } else {
        Some(out)
    }
}

fn unquote_string(text: &str) -> Option<String> {
    if let Some(rest) = text.strip_prefix("@\"") {
        return rest.strip_suffix('"').map(|s| s.replace("\"\"", "\""));
    }
    if text.starts_with("\"\"\"") {
        let trimmed = text.trim_matches('"');
        return Some(trimmed.trim().to_string());
    }
    let inner = text.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    Some(out)
}

impl<'t> SyntaxHelper for CSharpSyntaxHelper<'t> {
    type Node = Node<'t>;

    fn syntax(&self) -> SurfaceSyntax {
        SurfaceSyntax::CSharp
    }

    fn root(&self) -> Node<'t> {
        self.root
    }

    fn parent(&self, node: Node<'t>) -> Option<Node<'t>> {
        node.parent()
    }

    fn children(&self, node: Node<'t>) -> Vec<Node<'t>> {
        self.named_children(node)
    }

    fn native_kind(&self, node: Node<'t>) -> &'static str {
        node.kind()
    }

    fn text(&self, node: Node<'t>) -> &str {
        self.node_text(node)
    }

    fn location(&self, node: Node<'t>) -> Location {
        let start = node.start_position();
        let end = node.end_position();
        Location {
            line: start.row + 1,
            column: start.column + 1,
            end_line: end.row + 1,
            end_column: end.column + 1,
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
        }
    }

    fn kind(&self, node: Node<'t>) -> Option<SyntaxNodeKind> {
        match node.kind() {
            "assignment_expression" if self.is_simple_assignment(node) => {
                let in_initializer = node.parent().is_some_and(|p| {
                    p.kind() == "initializer_expression"
                        && p.parent().is_some_and(|g| Self::is_construction_kind(g.kind()))
                });
                Some(if in_initializer {
                    SyntaxNodeKind::ObjectInitializerMember
                } else {
                    SyntaxNodeKind::Assignment
                })
            }
            "variable_declarator" => Some(SyntaxNodeKind::VariableBinding),
            "member_access_expression" => Some(SyntaxNodeKind::MemberAccess),
            "invocation_expression" => Some(SyntaxNodeKind::Invocation),
            k if Self::is_construction_kind(k) => Some(SyntaxNodeKind::ObjectConstruction),
            "attribute" => Some(SyntaxNodeKind::Attribute),
            "attribute_argument" => Some(SyntaxNodeKind::AttributeArgument),
            "parameter" if self.value_after_equals(node).is_some() => Some(SyntaxNodeKind::ParameterDefault),
            _ => None,
        }
    }

    fn expression_shape(&self, node: Node<'t>) -> ExpressionShape<Node<'t>> {
        if let Some(kind) = self.literal_kind(node) {
            return ExpressionShape::Literal(kind);
        }
        match node.kind() {
            "identifier" => ExpressionShape::Identifier,
            "this" | "this_expression" | "base" | "base_expression" => ExpressionShape::SelfReference,
            "member_access_expression" => ExpressionShape::MemberAccess,
            "invocation_expression" => ExpressionShape::Invocation,
            k if Self::is_construction_kind(k) => ExpressionShape::ObjectConstruction,
            "array_creation_expression" | "implicit_array_creation_expression" | "stackalloc_expression" => {
                ExpressionShape::ArrayConstruction
            }
            "binary_expression" => {
                let is_plus = node
                    .child_by_field_name("operator")
                    .map(|op| op.kind() == "+")
                    .unwrap_or_else(|| self.has_token(node, "+"));
                match (is_plus, node.child_by_field_name("left"), node.child_by_field_name("right")) {
                    (true, Some(left), Some(right)) => ExpressionShape::Concatenation(left, right),
                    _ => ExpressionShape::Other,
                }
            }
            "parenthesized_expression" => match self.named_children(node).into_iter().next() {
                Some(inner) => ExpressionShape::Parenthesized(inner),
                None => ExpressionShape::Other,
            },
            "cast_expression" => match node
                .child_by_field_name("value")
                .or_else(|| self.named_children(node).into_iter().last())
            {
                Some(inner) => ExpressionShape::Conversion(inner),
                None => ExpressionShape::Other,
            },
            _ => ExpressionShape::Other,
        }
    }

    fn declaration_kind(&self, node: Node<'t>) -> Option<DeclarationKind> {
        let kind = node.kind();
        if NAMESPACE_DECLARATIONS.contains(&kind) {
            return Some(DeclarationKind::Namespace);
        }
        if TYPE_DECLARATIONS.contains(&kind) {
            return Some(DeclarationKind::Type);
        }
        match kind {
            "method_declaration" => Some(DeclarationKind::Method),
            "constructor_declaration" => Some(DeclarationKind::Constructor),
            "property_declaration" => Some(DeclarationKind::Property),
            "field_declaration" => Some(DeclarationKind::Field),
            "variable_declarator" => Some(DeclarationKind::Variable),
            "parameter" => Some(DeclarationKind::Parameter),
            _ => None,
        }
    }

    fn string_literal_value(&self, node: Node<'t>) -> Option<String> {
        match node.kind() {
            "string_literal" | "verbatim_string_literal" | "raw_string_literal" => {
                unquote_string(self.node_text(node))
            }
            _ => None,
        }
    }

    fn name_text(&self, node: Node<'t>) -> Option<String> {
        match node.kind() {
            "identifier" | "qualified_name" | "generic_name" | "alias_qualified_name" | "predefined_type"
            | "nullable_type" | "member_access_expression" => clean_name(self.node_text(node)),
            _ => None,
        }
    }

    fn assignment_left(&self, node: Node<'t>) -> Option<Node<'t>> {
        match node.kind() {
            "assignment_expression" if self.is_simple_assignment(node) => node.child_by_field_name("left"),
            "variable_declarator" => self.declaration_name(node),
            _ => None,
        }
    }

    fn assignment_right(&self, node: Node<'t>) -> Option<Node<'t>> {
        match node.kind() {
            "assignment_expression" if self.is_simple_assignment(node) => node.child_by_field_name("right"),
            "variable_declarator" => self.value_after_equals(node),
            _ => None,
        }
    }

    fn member_access_target(&self, node: Node<'t>) -> Option<Node<'t>> {
        if node.kind() != "member_access_expression" {
            return None;
        }
        node.child_by_field_name("expression")
    }

    fn member_access_name(&self, node: Node<'t>) -> Option<Node<'t>> {
        if node.kind() != "member_access_expression" {
            return None;
        }
        node.child_by_field_name("name")
    }

    fn invocation_target(&self, node: Node<'t>) -> Option<Node<'t>> {
        if node.kind() != "invocation_expression" {
            return None;
        }
        node.child_by_field_name("function")
            .or_else(|| self.named_children(node).into_iter().next())
    }

    fn call_target_name(&self, node: Node<'t>) -> Option<Node<'t>> {
        match node.kind() {
            "invocation_expression" => {
                let callee = self.invocation_target(node)?;
                Some(self.member_access_name(callee).unwrap_or(callee))
            }
            "object_creation_expression" => node.child_by_field_name("type"),
            "implicit_object_creation_expression" => self.implicit_construction_type(node),
            _ => None,
        }
    }

    fn call_arguments(&self, node: Node<'t>, filter: CallKind) -> Vec<Node<'t>> {
        let accepted = match node.kind() {
            "invocation_expression" => filter.contains(CallKind::INVOCATION),
            k if Self::is_construction_kind(k) => filter.contains(CallKind::OBJECT_CREATION),
            _ => false,
        };
        if !accepted {
            return Vec::new();
        }
        let Some(list) = self.argument_list_of(node) else {
            return Vec::new();
        };
        self.named_children(list)
            .into_iter()
            .filter(|a| a.kind() == "argument")
            .map(|a| self.argument_value(a))
            .collect()
    }

    fn argument_name(&self, argument: Node<'t>) -> Option<Node<'t>> {
        let owner = if argument.kind() == "argument" {
            argument
        } else {
            argument.parent().filter(|p| p.kind() == "argument")?
        };
        let name = owner.child_by_field_name("name")?;
        (name != argument).then_some(name)
    }

    fn object_initializer_members(&self, node: Node<'t>) -> Vec<Node<'t>> {
        let Some(initializer) = self.initializer_of(node) else {
            return Vec::new();
        };
        self.named_children(initializer)
            .into_iter()
            .filter(|m| self.is_simple_assignment(*m))
            .collect()
    }

    fn declaration_attributes(&self, node: Node<'t>) -> Vec<Node<'t>> {
        self.named_children(node)
            .into_iter()
            .filter(|c| c.kind() == "attribute_list")
            .flat_map(|list| self.named_children(list))
            .filter(|a| a.kind() == "attribute")
            .collect()
    }

    fn attribute_name(&self, node: Node<'t>) -> Option<Node<'t>> {
        if node.kind() != "attribute" {
            return None;
        }
        node.child_by_field_name("name")
            .or_else(|| self.named_children(node).into_iter().next())
    }

    fn attribute_arguments(&self, node: Node<'t>) -> Vec<Node<'t>> {
        if node.kind() != "attribute" {
            return Vec::new();
        }
        self.child_of_kind(node, "attribute_argument_list")
            .map(|list| {
                self.named_children(list)
                    .into_iter()
                    .filter(|a| a.kind() == "attribute_argument")
                    .collect()
            })
            .unwrap_or_default()
    }

    fn attribute_argument_expression(&self, node: Node<'t>) -> Option<Node<'t>> {
        if node.kind() != "attribute_argument" {
            return None;
        }
        if let Some(assignment) = self.attribute_assignment(node) {
            return assignment.child_by_field_name("right");
        }
        self.named_children(node).into_iter().last()
    }

    fn attribute_argument_name(&self, node: Node<'t>) -> Option<Node<'t>> {
        if node.kind() != "attribute_argument" {
            return None;
        }
        if let Some(assignment) = self.attribute_assignment(node) {
            return assignment.child_by_field_name("left");
        }
        if let Some(equals) = self.child_of_kind(node, "name_equals") {
            return self.named_children(equals).into_iter().next();
        }
        if self.has_token(node, "=") || self.has_token(node, ":") {
            let children = self.named_children(node);
            if children.len() > 1 {
                return children.into_iter().next();
            }
        }
        None
    }

    fn default_parameter_value(&self, declaration: Node<'t>, index: usize) -> Option<Node<'t>> {
        if !self.declaration_kind(declaration)?.is_method_like() {
            return None;
        }
        let parameter = *self.parameter_nodes(declaration).get(index)?;
        self.value_after_equals(parameter)
    }

    fn is_temporary_construction(&self, node: Node<'t>) -> bool {
        Self::is_construction_kind(node.kind())
            && !node
                .parent()
                .is_some_and(|p| matches!(p.kind(), "equals_value_clause" | "variable_declarator"))
    }

    fn declared_name(&self, declaration: Node<'t>) -> Option<String> {
        let name = match self.declaration_kind(declaration)? {
            DeclarationKind::Field => self.first_declarator(declaration).and_then(|d| self.declaration_name(d))?,
            _ => self.declaration_name(declaration)?,
        };
        clean_name(self.node_text(name))
    }

    fn declared_type(&self, declaration: Node<'t>) -> Option<Node<'t>> {
        let type_node = match declaration.kind() {
            "variable_declarator" => declaration
                .parent()
                .filter(|p| p.kind() == "variable_declaration")?
                .child_by_field_name("type")?,
            "field_declaration" => self
                .child_of_kind(declaration, "variable_declaration")?
                .child_by_field_name("type")?,
            "parameter" | "property_declaration" => declaration.child_by_field_name("type")?,
            _ => return None,
        };
        (self.node_text(type_node) != "var").then_some(type_node)
    }

    fn parameters(&self, declaration: Node<'t>) -> Vec<Node<'t>> {
        match self.declaration_kind(declaration) {
            Some(kind) if kind.is_method_like() => self.parameter_nodes(declaration),
            _ => Vec::new(),
        }
    }

    fn imports(&self) -> Vec<ImportDirective> {
        let mut imports = Vec::new();
        for directive in self.descendants_and_self(self.root) {
            if directive.kind() != "using_directive" || self.has_token(directive, "static") {
                continue;
            }
            let names = self.named_children(directive);
            if self.has_token(directive, "=") {
                let alias = names.first().and_then(|n| clean_name(self.node_text(*n)));
                let target = names.last().and_then(|n| clean_name(self.node_text(*n)));
                if let (Some(alias), Some(target), true) = (alias, target, names.len() > 1) {
                    imports.push(ImportDirective::alias(alias, target));
                }
            } else if let Some(target) = names.last().and_then(|n| clean_name(self.node_text(*n))) {
                imports.push(ImportDirective::namespace(target));
            }
        }
        imports
    }

    fn namespace_of(&self, node: Node<'t>) -> String {
        let mut parts: Vec<String> = self
            .ancestors_and_self(node)
            .into_iter()
            .skip(1)
            .filter(|n| NAMESPACE_DECLARATIONS.contains(&n.kind()))
            .filter_map(|n| n.child_by_field_name("name").and_then(|name| clean_name(self.node_text(name))))
            .collect();

        let inside_file_scoped = self
            .ancestors_and_self(node)
            .iter()
            .any(|n| n.kind() == "file_scoped_namespace_declaration");
        if !inside_file_scoped {
            if let Some(name) = self
                .file_scoped_namespace(node)
                .and_then(|ns| ns.child_by_field_name("name"))
                .and_then(|name| clean_name(self.node_text(name)))
            {
                parts.push(name);
            }
        }

        parts.reverse();
        parts.join(".")
    }
}
