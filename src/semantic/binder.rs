//! Heuristic symbol binder shared by both front ends
//!
//! The binder is written purely against [`SyntaxHelper`], so the same name
//! lookup, overload choice and receiver typing serve C# and Visual Basic.
//! It knows the types declared in the compilation unit plus the framework
//! types listed in [`super::reference`]; anything else stays unresolved.
//!
//! Resolution rules:
//! - type names: alias, then the enclosing namespace chain, then enclosing
//!   types (for nested types), then each imported namespace
//! - overloads: exact arity for framework members; declared members accept
//!   any arity between their required and total parameter counts
//! - receivers: locals, parameters, fields and properties with a declared
//!   type or a `new T` initializer, `this`/`Me`, or a type name for static
//!   access

use tracing::trace;

use super::reference::{find_framework_type, ReferenceMethod, ReferenceType};
use super::{
    FieldSymbol, MethodSymbol, ParameterSymbol, PropertySymbol, SemanticModel, Symbol, TypeSymbol,
};
use crate::syntax::{CallKind, DeclarationKind, ExpressionShape, ImportDirective, SyntaxHelper, SyntaxNodeKind};

/// Receiver typing gives up after this many indirections
const MAX_TYPING_DEPTH: usize = 8;

/// Language keywords naming framework types
const KEYWORD_TYPES: &[(&str, &str)] = &[("string", "System.String")];

/// A type declared in the compilation unit
#[derive(Debug)]
struct DeclaredType<N> {
    node: N,
    symbol: TypeSymbol,
    constructors: Vec<N>,
    methods: Vec<N>,
    properties: Vec<N>,
    fields: Vec<N>,
}

/// A resolved type: declared in this unit or known from reference metadata
#[derive(Debug, Clone, Copy)]
enum TypeRef {
    Framework(&'static ReferenceType),
    Declared(usize),
}

/// Semantic model over one syntax tree
pub struct Binder<'h, H: SyntaxHelper> {
    helper: &'h H,
    imports: Vec<ImportDirective>,
    types: Vec<DeclaredType<H::Node>>,
}

impl<'h, H: SyntaxHelper> Binder<'h, H> {
    /// Collect imports and declared types of the tree behind `helper`
    pub fn new(helper: &'h H) -> Self {
        let imports = helper.imports();
        let mut binder = Self {
            helper,
            imports,
            types: Vec::new(),
        };
        binder.collect_declared_types();
        trace!(
            "binder: {} imports, {} declared types",
            binder.imports.len(),
            binder.types.len()
        );
        binder
    }

    /// Fully qualified names of the declared types, in document order
    pub fn declared_type_names(&self) -> Vec<String> {
        self.types.iter().map(|t| t.symbol.full_name()).collect()
    }

    fn case_sensitive(&self) -> bool {
        self.helper.syntax().is_case_sensitive()
    }

    fn names_equal(&self, a: &str, b: &str) -> bool {
        self.helper.names_equal(a, b)
    }

    // =========================================================================
    // Declared types
    // =========================================================================

    fn collect_declared_types(&mut self) {
        let h = self.helper;
        let type_nodes: Vec<H::Node> = h
            .descendants_and_self(h.root())
            .into_iter()
            .filter(|&n| h.declaration_kind(n) == Some(DeclarationKind::Type))
            .collect();

        for node in type_nodes {
            let Some(symbol) = self.type_symbol_of_declaration(node) else {
                continue;
            };
            let mut declared = DeclaredType {
                node,
                symbol,
                constructors: Vec::new(),
                methods: Vec::new(),
                properties: Vec::new(),
                fields: Vec::new(),
            };

            // Only member declarations need the owner walk
            for member in h.descendants_and_self(node).into_iter().skip(1) {
                let Some(kind) = h.declaration_kind(member) else {
                    continue;
                };
                if !matches!(
                    kind,
                    DeclarationKind::Constructor
                        | DeclarationKind::Method
                        | DeclarationKind::Property
                        | DeclarationKind::Variable
                ) {
                    continue;
                }
                let owner = h
                    .parent(member)
                    .and_then(|p| h.enclosing_declaration(p, DeclarationKind::Type));
                if owner != Some(node) {
                    continue;
                }
                match kind {
                    DeclarationKind::Constructor => declared.constructors.push(member),
                    DeclarationKind::Method => declared.methods.push(member),
                    DeclarationKind::Property => declared.properties.push(member),
                    DeclarationKind::Variable if self.is_field_declarator(member) => {
                        declared.fields.push(member)
                    }
                    _ => {}
                }
            }

            self.types.push(declared);
        }
    }

    /// Namespace-qualified symbol of a type declaration; nested types are
    /// joined to their enclosing types with `.`
    fn type_symbol_of_declaration(&self, node: H::Node) -> Option<TypeSymbol> {
        let h = self.helper;
        let mut names = vec![h.declared_name(node)?];
        let mut current = h.parent(node);
        while let Some(outer) = current.and_then(|p| h.enclosing_declaration(p, DeclarationKind::Type)) {
            names.push(h.declared_name(outer)?);
            current = h.parent(outer);
        }
        names.reverse();
        Some(TypeSymbol::new(h.namespace_of(node), names.join(".")))
    }

    fn is_field_declarator(&self, node: H::Node) -> bool {
        let h = self.helper;
        h.enclosing_declaration(node, DeclarationKind::Field).is_some()
            && h.enclosing_method_like(node).is_none()
    }

    fn declared_index_of(&self, node: H::Node) -> Option<usize> {
        self.types.iter().position(|t| t.node == node)
    }

    /// Declared type enclosing `node`
    fn enclosing_declared(&self, node: H::Node) -> Option<usize> {
        let decl = self.helper.enclosing_declaration(node, DeclarationKind::Type)?;
        self.declared_index_of(decl)
    }

    fn type_symbol(&self, ty: TypeRef) -> TypeSymbol {
        match ty {
            TypeRef::Framework(rt) => rt.symbol(),
            TypeRef::Declared(i) => self.types[i].symbol.clone(),
        }
    }

    // =========================================================================
    // Type names
    // =========================================================================

    fn resolve_type_node(&self, node: H::Node) -> Option<TypeRef> {
        let name = self.helper.name_text(node)?;
        self.resolve_type_name(&name, node)
    }

    fn resolve_type_name(&self, name: &str, context: H::Node) -> Option<TypeRef> {
        if name.is_empty() {
            return None;
        }
        if let Some((_, full)) = KEYWORD_TYPES
            .iter()
            .find(|(keyword, _)| self.names_equal(keyword, name))
        {
            return self.lookup_full_name(full);
        }

        for candidate in self.candidate_full_names(name, context) {
            if let Some(found) = self.lookup_full_name(&candidate) {
                return Some(found);
            }
        }
        None
    }

    fn candidate_full_names(&self, name: &str, context: H::Node) -> Vec<String> {
        let mut candidates = Vec::new();

        let (head, rest) = match name.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (name, None),
        };
        for import in &self.imports {
            if let Some(alias) = &import.alias {
                if self.names_equal(alias, head) {
                    candidates.push(match rest {
                        Some(rest) => format!("{}.{}", import.target, rest),
                        None => import.target.clone(),
                    });
                }
            }
        }

        let mut namespace = self.helper.namespace_of(context);
        loop {
            if namespace.is_empty() {
                candidates.push(name.to_string());
                break;
            }
            candidates.push(format!("{}.{}", namespace, name));
            namespace = match namespace.rsplit_once('.') {
                Some((outer, _)) => outer.to_string(),
                None => String::new(),
            };
        }

        let mut scope = self.helper.enclosing_declaration(context, DeclarationKind::Type);
        while let Some(decl) = scope {
            if let Some(i) = self.declared_index_of(decl) {
                candidates.push(format!("{}.{}", self.types[i].symbol.full_name(), name));
            }
            scope = self
                .helper
                .parent(decl)
                .and_then(|p| self.helper.enclosing_declaration(p, DeclarationKind::Type));
        }

        for import in self.imports.iter().filter(|i| i.alias.is_none()) {
            candidates.push(format!("{}.{}", import.target, name));
        }

        candidates
    }

    fn lookup_full_name(&self, full_name: &str) -> Option<TypeRef> {
        if let Some(i) = self
            .types
            .iter()
            .position(|t| self.names_equal(&t.symbol.full_name(), full_name))
        {
            return Some(TypeRef::Declared(i));
        }
        find_framework_type(full_name, self.case_sensitive()).map(TypeRef::Framework)
    }

    // =========================================================================
    // Receiver typing
    // =========================================================================

    fn type_of_expression(&self, expr: H::Node, depth: usize) -> Option<TypeRef> {
        if depth > MAX_TYPING_DEPTH {
            return None;
        }
        let h = self.helper;
        match h.expression_shape(expr) {
            ExpressionShape::ObjectConstruction => self.resolve_type_node(h.call_target_name(expr)?),
            ExpressionShape::SelfReference => self.enclosing_declared(expr).map(TypeRef::Declared),
            ExpressionShape::Identifier => {
                let name = h.name_text(expr)?;
                match self.lookup_variable(&name, expr) {
                    Some(decl) => self.type_of_declaration(decl, depth + 1),
                    None => self.resolve_type_name(&name, expr),
                }
            }
            ExpressionShape::MemberAccess => {
                if let Some(ty) = h.name_text(expr).and_then(|n| self.resolve_type_name(&n, expr)) {
                    return Some(ty);
                }
                let receiver = self.type_of_expression(h.member_access_target(expr)?, depth + 1)?;
                let member = h.name_text(h.member_access_name(expr)?)?;
                self.member_type(receiver, &member, depth + 1)
            }
            ExpressionShape::Invocation => {
                let (_, method) = self.resolve_invocation_with_metadata(expr, depth + 1)?;
                self.lookup_full_name(method?.returns?)
            }
            ExpressionShape::Parenthesized(inner) | ExpressionShape::Conversion(inner) => {
                self.type_of_expression(inner, depth + 1)
            }
            _ => None,
        }
    }

    /// Declared type of a field or property of a declared type
    fn member_type(&self, receiver: TypeRef, member: &str, depth: usize) -> Option<TypeRef> {
        let TypeRef::Declared(i) = receiver else {
            return None;
        };
        let h = self.helper;
        let ty = &self.types[i];
        ty.fields
            .iter()
            .chain(ty.properties.iter())
            .find(|&&decl| h.declared_name(decl).is_some_and(|n| self.names_equal(&n, member)))
            .and_then(|&decl| self.type_of_declaration(decl, depth))
    }

    fn type_of_declaration(&self, decl: H::Node, depth: usize) -> Option<TypeRef> {
        if depth > MAX_TYPING_DEPTH {
            return None;
        }
        let h = self.helper;
        if let Some(type_node) = h.declared_type(decl) {
            return self.resolve_type_node(type_node);
        }
        let value = h.assignment_right(decl)?;
        self.type_of_expression(value, depth + 1)
    }

    /// Declaration a simple name refers to: a local or parameter of an
    /// enclosing member, then a field or property of an enclosing type
    fn lookup_variable(&self, name: &str, at: H::Node) -> Option<H::Node> {
        let h = self.helper;
        let matches = |decl: &H::Node| h.declared_name(*decl).is_some_and(|n| self.names_equal(&n, name));

        for scope in h.ancestors_and_self(at).into_iter().skip(1) {
            match h.declaration_kind(scope) {
                Some(kind) if kind.is_method_like() || kind == DeclarationKind::Property => {
                    if let Some(param) = h.parameters(scope).into_iter().find(matches) {
                        return Some(param);
                    }
                    if let Some(local) = h
                        .descendants_and_self(scope)
                        .into_iter()
                        .filter(|&n| h.declaration_kind(n) == Some(DeclarationKind::Variable))
                        .find(matches)
                    {
                        return Some(local);
                    }
                }
                Some(DeclarationKind::Type) => {
                    if let Some(i) = self.declared_index_of(scope) {
                        let ty = &self.types[i];
                        if let Some(&decl) = ty.fields.iter().chain(ty.properties.iter()).find(|d| matches(*d)) {
                            return Some(decl);
                        }
                    }
                }
                _ => {}
            }
        }
        None
    }

    // =========================================================================
    // Calls
    // =========================================================================

    fn resolve_construction(&self, node: H::Node) -> Option<MethodSymbol> {
        let h = self.helper;
        let ty = self.resolve_type_node(h.call_target_name(node)?)?;
        let arity = h.call_arguments(node, CallKind::OBJECT_CREATION).len();
        match ty {
            TypeRef::Framework(rt) => rt.constructor(arity),
            TypeRef::Declared(i) => {
                let declared = &self.types[i];
                if declared.constructors.is_empty() {
                    return (arity == 0).then(|| MethodSymbol::constructor(declared.symbol.clone(), Vec::new()));
                }
                declared
                    .constructors
                    .iter()
                    .find(|&&ctor| self.accepts_arity(ctor, arity))
                    .map(|&ctor| MethodSymbol::constructor(declared.symbol.clone(), self.parameter_symbols(ctor)))
            }
        }
    }

    fn resolve_invocation(&self, node: H::Node) -> Option<MethodSymbol> {
        self.resolve_invocation_with_metadata(node, 0).map(|(symbol, _)| symbol)
    }

    /// Resolve an invocation, also returning the reference metadata when the
    /// callee is a framework method
    fn resolve_invocation_with_metadata(
        &self,
        node: H::Node,
        depth: usize,
    ) -> Option<(MethodSymbol, Option<&'static ReferenceMethod>)> {
        let h = self.helper;
        let target = h.invocation_target(node)?;
        let arity = h.call_arguments(node, CallKind::INVOCATION).len();

        let (receiver, name) = if h.is_member_access(target) {
            let receiver = self.type_of_expression(h.member_access_target(target)?, depth + 1)?;
            (receiver, h.name_text(h.member_access_name(target)?)?)
        } else {
            let receiver = TypeRef::Declared(self.enclosing_declared(node)?);
            (receiver, h.name_text(target)?)
        };

        match receiver {
            TypeRef::Framework(rt) => {
                let method = rt.method(&name, arity, self.case_sensitive())?;
                Some((rt.method_symbol(method), Some(method)))
            }
            TypeRef::Declared(i) => {
                let declared = &self.types[i];
                declared
                    .methods
                    .iter()
                    .find(|&&m| {
                        h.declared_name(m).is_some_and(|n| self.names_equal(&n, &name))
                            && self.accepts_arity(m, arity)
                    })
                    .and_then(|&m| {
                        let method_name = h.declared_name(m)?;
                        Some((
                            MethodSymbol::ordinary(declared.symbol.clone(), method_name, self.parameter_symbols(m)),
                            None,
                        ))
                    })
            }
        }
    }

    fn accepts_arity(&self, decl: H::Node, arity: usize) -> bool {
        let total = self.helper.parameters(decl).len();
        let required = (0..total)
            .filter(|&i| self.helper.default_parameter_value(decl, i).is_none())
            .count();
        required <= arity && arity <= total
    }

    fn parameter_symbols(&self, decl: H::Node) -> Vec<ParameterSymbol> {
        let h = self.helper;
        h.parameters(decl)
            .into_iter()
            .enumerate()
            .map(|(i, p)| ParameterSymbol {
                name: h.declared_name(p).unwrap_or_default(),
                has_default: h.default_parameter_value(decl, i).is_some(),
            })
            .collect()
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Property or field a written-to expression refers to
    fn resolve_member_target(&self, node: H::Node) -> Option<Symbol> {
        let h = self.helper;
        let (owner, name) = if h.is_member_access(node) {
            let receiver = self.type_of_expression(h.member_access_target(node)?, 0)?;
            (receiver, h.name_text(h.member_access_name(node)?)?)
        } else if let Some(construction) = self.initializer_construction(node) {
            let ty = self.resolve_type_node(h.call_target_name(construction)?)?;
            (ty, h.name_text(node)?)
        } else {
            let name = h.name_text(node)?;
            if name.contains('.') {
                return None;
            }
            (TypeRef::Declared(self.enclosing_declared(node)?), name)
        };
        self.member_symbol(owner, &name)
    }

    /// Construction whose initializer block assigns `node`
    fn initializer_construction(&self, node: H::Node) -> Option<H::Node> {
        let h = self.helper;
        let member = h.parent(node)?;
        if h.kind(member) != Some(SyntaxNodeKind::ObjectInitializerMember) || h.assignment_left(member) != Some(node) {
            return None;
        }
        h.ancestors_and_self(member)
            .into_iter()
            .find(|&n| h.is_object_construction(n))
    }

    fn member_symbol(&self, owner: TypeRef, name: &str) -> Option<Symbol> {
        let h = self.helper;
        match owner {
            TypeRef::Framework(rt) => rt.property(name, self.case_sensitive()).map(|p| {
                Symbol::Property(PropertySymbol {
                    containing_type: rt.symbol(),
                    name: p.to_string(),
                })
            }),
            TypeRef::Declared(i) => {
                let declared = &self.types[i];
                let named = |decl: &&H::Node| h.declared_name(**decl).is_some_and(|n| self.names_equal(&n, name));
                if let Some(p) = declared.properties.iter().find(named) {
                    return Some(Symbol::Property(PropertySymbol {
                        containing_type: declared.symbol.clone(),
                        name: h.declared_name(*p)?,
                    }));
                }
                declared.fields.iter().find(named).and_then(|f| {
                    Some(Symbol::Field(FieldSymbol {
                        containing_type: declared.symbol.clone(),
                        name: h.declared_name(*f)?,
                    }))
                })
            }
        }
    }
}

impl<'h, H: SyntaxHelper> SemanticModel<H::Node> for Binder<'h, H> {
    fn symbol_info(&self, node: H::Node) -> Option<Symbol> {
        let h = self.helper;
        match h.kind(node) {
            Some(SyntaxNodeKind::ObjectConstruction) => {
                return self.resolve_construction(node).map(Symbol::Method);
            }
            Some(SyntaxNodeKind::Invocation) => {
                return self.resolve_invocation(node).map(Symbol::Method);
            }
            _ => {}
        }

        match h.expression_shape(node) {
            ExpressionShape::Identifier | ExpressionShape::MemberAccess => {
                if let Some(symbol) = self.resolve_member_target(node) {
                    return Some(symbol);
                }
                let name = h.name_text(node)?;
                self.resolve_type_name(&name, node)
                    .map(|ty| Symbol::Type(self.type_symbol(ty)))
            }
            _ => {
                // Type syntax that is not an expression (e.g. `predefined_type`)
                let name = h.name_text(node)?;
                self.resolve_type_name(&name, node)
                    .map(|ty| Symbol::Type(self.type_symbol(ty)))
            }
        }
    }

    fn declared_symbol(&self, declaration: H::Node) -> Option<Symbol> {
        let h = self.helper;
        match h.declaration_kind(declaration)? {
            DeclarationKind::Type => self.declared_type(declaration).map(Symbol::Type),
            DeclarationKind::Method => {
                let owner = &self.types[self.enclosing_declared(h.parent(declaration)?)?];
                Some(Symbol::Method(MethodSymbol::ordinary(
                    owner.symbol.clone(),
                    h.declared_name(declaration)?,
                    self.parameter_symbols(declaration),
                )))
            }
            DeclarationKind::Constructor => {
                let owner = &self.types[self.enclosing_declared(h.parent(declaration)?)?];
                Some(Symbol::Method(MethodSymbol::constructor(
                    owner.symbol.clone(),
                    self.parameter_symbols(declaration),
                )))
            }
            DeclarationKind::Property => {
                let owner = &self.types[self.enclosing_declared(h.parent(declaration)?)?];
                Some(Symbol::Property(PropertySymbol {
                    containing_type: owner.symbol.clone(),
                    name: h.declared_name(declaration)?,
                }))
            }
            DeclarationKind::Field | DeclarationKind::Variable => {
                let declarator = if h.declaration_kind(declaration) == Some(DeclarationKind::Field) {
                    h.descendants_and_self(declaration)
                        .into_iter()
                        .find(|&n| h.declaration_kind(n) == Some(DeclarationKind::Variable))?
                } else {
                    declaration
                };
                if !self.is_field_declarator(declarator) {
                    return None;
                }
                let owner = &self.types[self.enclosing_declared(declarator)?];
                Some(Symbol::Field(FieldSymbol {
                    containing_type: owner.symbol.clone(),
                    name: h.declared_name(declarator)?,
                }))
            }
            DeclarationKind::Namespace | DeclarationKind::Parameter => None,
        }
    }

    fn declared_type(&self, declaration: H::Node) -> Option<TypeSymbol> {
        self.declared_index_of(declaration)
            .map(|i| self.types[i].symbol.clone())
    }
}
