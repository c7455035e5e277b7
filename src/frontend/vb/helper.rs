//! [`SyntaxHelper`] over the Visual Basic arena tree

use super::tree::{VbKind, VbNode, VbTree};
use crate::diagnostic::Location;
use crate::lang::SurfaceSyntax;
use crate::syntax::{
    CallKind, DeclarationKind, ExpressionShape, ImportDirective, LiteralKind, SyntaxHelper, SyntaxNodeKind,
};

/// Syntax queries over one parsed Visual Basic file
#[derive(Clone, Copy)]
pub struct VbSyntaxHelper<'t> {
    tree: &'t VbTree,
}

/// Plain identifier from a name token: escapes, array bounds, nullable
/// markers and type characters removed
fn clean_identifier(text: &str) -> Option<String> {
    let text = text.split('(').next().unwrap_or("").trim();
    let text = text.trim_end_matches('?');
    let text = text
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .unwrap_or(text);
    let text = text.trim_end_matches(['$', '%', '&', '@', '!', '#']);
    if text.is_empty() || !text.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    Some(text.to_string())
}

fn strip_global(name: String) -> String {
    match name.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("Global.") => name[7..].to_string(),
        _ => name,
    }
}

fn unquote(text: &str) -> Option<String> {
    let is_quote = |c: char| matches!(c, '"' | '\u{201c}' | '\u{201d}');
    let inner = text.strip_prefix(is_quote)?.strip_suffix(is_quote)?;
    Some(inner.replace("\"\"", "\""))
}

impl<'t> VbSyntaxHelper<'t> {
    pub fn new(tree: &'t VbTree) -> Self {
        Self { tree }
    }

    /// Header statement of a block declaration (`ClassStatement` of a
    /// `ClassBlock`, ...); a property statement is its own header
    fn header(&self, node: VbNode<'t>) -> Option<VbNode<'t>> {
        let kind = node.kind();
        if kind == VbKind::PropertyStatement {
            return Some(node);
        }
        let is_block = kind.is_type_block()
            || kind.is_method_block()
            || matches!(kind, VbKind::PropertyBlock | VbKind::NamespaceBlock);
        if is_block {
            node.child(0)
        } else {
            None
        }
    }

    fn first_declarator(&self, field: VbNode<'t>) -> Option<VbNode<'t>> {
        field.child_of_kind(VbKind::VariableDeclarator)
    }

    fn parameter_nodes(&self, declaration: VbNode<'t>) -> Vec<VbNode<'t>> {
        if !declaration.kind().is_method_block() {
            return Vec::new();
        }
        self.header(declaration)
            .and_then(|h| h.child_of_kind(VbKind::ParameterList))
            .map(|list| list.children_of_kind(VbKind::Parameter))
            .unwrap_or_default()
    }

    fn equals_value(&self, node: VbNode<'t>) -> Option<VbNode<'t>> {
        node.child_of_kind(VbKind::EqualsValue)?.child(0)
    }

    /// Expression of an argument, skipping a `name:=` prefix
    fn argument_expression(&self, argument: VbNode<'t>) -> Option<VbNode<'t>> {
        match argument.kind() {
            VbKind::SimpleArgument => argument
                .children()
                .into_iter()
                .find(|c| c.kind() != VbKind::NameColonEquals),
            VbKind::OmittedArgument => Some(argument),
            _ => None,
        }
    }

    fn is_attribute_argument_node(&self, node: VbNode<'t>) -> bool {
        node.kind() == VbKind::SimpleArgument
            && node
                .parent()
                .filter(|list| list.kind() == VbKind::ArgumentList)
                .and_then(|list| list.parent())
                .is_some_and(|owner| owner.kind() == VbKind::Attribute)
    }

    fn type_of_as_clause(&self, owner: VbNode<'t>) -> Option<VbNode<'t>> {
        if let Some(clause) = owner.child_of_kind(VbKind::SimpleAsClause) {
            return clause.child(0);
        }
        let creation = owner.child_of_kind(VbKind::AsNewClause)?.child(0)?;
        (creation.kind() == VbKind::ObjectCreationExpression)
            .then(|| creation.child(0))
            .flatten()
    }

    fn literal_kind(&self, node: VbNode<'t>) -> Option<LiteralKind> {
        match node.kind() {
            VbKind::StringLiteralExpression => Some(LiteralKind::String),
            VbKind::InterpolatedStringExpression => node
                .child_of_kind(VbKind::Interpolation)
                .is_none()
                .then_some(LiteralKind::String),
            VbKind::CharacterLiteralExpression => Some(LiteralKind::Character),
            VbKind::NumericLiteralExpression => Some(LiteralKind::Numeric),
            VbKind::TrueLiteralExpression | VbKind::FalseLiteralExpression => Some(LiteralKind::Boolean),
            VbKind::DateLiteralExpression => Some(LiteralKind::Date),
            VbKind::NothingLiteralExpression => Some(LiteralKind::Null),
            _ => None,
        }
    }

    fn dotted_name(&self, node: VbNode<'t>) -> Option<String> {
        match node.kind() {
            VbKind::IdentifierName | VbKind::IdentifierToken | VbKind::ModifiedIdentifier | VbKind::GenericName => {
                clean_identifier(node.text())
            }
            VbKind::QualifiedName | VbKind::SimpleMemberAccessExpression if node.child_count() == 2 => {
                let left = self.dotted_name(node.child(0)?)?;
                let right = self.dotted_name(node.child(1)?)?;
                Some(format!("{}.{}", left, right))
            }
            VbKind::NullableType => self.dotted_name(node.child(0)?),
            _ => None,
        }
    }
}

impl<'t> SyntaxHelper for VbSyntaxHelper<'t> {
    type Node = VbNode<'t>;

    fn syntax(&self) -> SurfaceSyntax {
        SurfaceSyntax::VisualBasic
    }

    fn root(&self) -> VbNode<'t> {
        self.tree.root()
    }

    fn parent(&self, node: VbNode<'t>) -> Option<VbNode<'t>> {
        node.parent()
    }

    fn children(&self, node: VbNode<'t>) -> Vec<VbNode<'t>> {
        node.children()
    }

    fn native_kind(&self, node: VbNode<'t>) -> &'static str {
        node.kind().as_str()
    }

    fn text(&self, node: VbNode<'t>) -> &str {
        node.text()
    }

    fn location(&self, node: VbNode<'t>) -> Location {
        node.location()
    }

    fn kind(&self, node: VbNode<'t>) -> Option<SyntaxNodeKind> {
        match node.kind() {
            VbKind::SimpleAssignmentStatement => Some(SyntaxNodeKind::Assignment),
            VbKind::VariableDeclarator => Some(SyntaxNodeKind::VariableBinding),
            VbKind::SimpleMemberAccessExpression => Some(SyntaxNodeKind::MemberAccess),
            VbKind::InvocationExpression => Some(SyntaxNodeKind::Invocation),
            VbKind::ObjectCreationExpression => Some(SyntaxNodeKind::ObjectConstruction),
            VbKind::NamedFieldInitializer => Some(SyntaxNodeKind::ObjectInitializerMember),
            VbKind::Attribute => Some(SyntaxNodeKind::Attribute),
            VbKind::SimpleArgument if self.is_attribute_argument_node(node) => Some(SyntaxNodeKind::AttributeArgument),
            VbKind::Parameter if node.child_of_kind(VbKind::EqualsValue).is_some() => {
                Some(SyntaxNodeKind::ParameterDefault)
            }
            _ => None,
        }
    }

    fn expression_shape(&self, node: VbNode<'t>) -> ExpressionShape<VbNode<'t>> {
        if let Some(kind) = self.literal_kind(node) {
            return ExpressionShape::Literal(kind);
        }
        match node.kind() {
            VbKind::IdentifierName | VbKind::GenericName => ExpressionShape::Identifier,
            VbKind::MeExpression | VbKind::MyBaseExpression | VbKind::MyClassExpression => {
                ExpressionShape::SelfReference
            }
            VbKind::SimpleMemberAccessExpression => ExpressionShape::MemberAccess,
            VbKind::InvocationExpression => ExpressionShape::Invocation,
            VbKind::ObjectCreationExpression => ExpressionShape::ObjectConstruction,
            VbKind::ArrayCreationExpression | VbKind::CollectionInitializer => ExpressionShape::ArrayConstruction,
            VbKind::ConcatenateExpression | VbKind::AddExpression => match (node.child(0), node.child(1)) {
                (Some(left), Some(right)) => ExpressionShape::Concatenation(left, right),
                _ => ExpressionShape::Other,
            },
            VbKind::ParenthesizedExpression => match node.child(0) {
                Some(inner) => ExpressionShape::Parenthesized(inner),
                None => ExpressionShape::Other,
            },
            VbKind::CTypeExpression
            | VbKind::DirectCastExpression
            | VbKind::TryCastExpression
            | VbKind::PredefinedCastExpression => match node.child(0) {
                Some(inner) => ExpressionShape::Conversion(inner),
                None => ExpressionShape::Other,
            },
            _ => ExpressionShape::Other,
        }
    }

    fn declaration_kind(&self, node: VbNode<'t>) -> Option<DeclarationKind> {
        match node.kind() {
            VbKind::NamespaceBlock => Some(DeclarationKind::Namespace),
            k if k.is_type_block() => Some(DeclarationKind::Type),
            VbKind::SubBlock | VbKind::FunctionBlock => Some(DeclarationKind::Method),
            VbKind::ConstructorBlock => Some(DeclarationKind::Constructor),
            VbKind::PropertyBlock => Some(DeclarationKind::Property),
            VbKind::PropertyStatement
                if !node.parent().is_some_and(|p| p.kind() == VbKind::PropertyBlock) =>
            {
                Some(DeclarationKind::Property)
            }
            VbKind::FieldDeclaration => Some(DeclarationKind::Field),
            VbKind::VariableDeclarator => Some(DeclarationKind::Variable),
            VbKind::Parameter => Some(DeclarationKind::Parameter),
            _ => None,
        }
    }

    fn string_literal_value(&self, node: VbNode<'t>) -> Option<String> {
        match node.kind() {
            VbKind::StringLiteralExpression => unquote(node.text()),
            _ => None,
        }
    }

    fn name_text(&self, node: VbNode<'t>) -> Option<String> {
        self.dotted_name(node).map(strip_global)
    }

    fn assignment_left(&self, node: VbNode<'t>) -> Option<VbNode<'t>> {
        match node.kind() {
            VbKind::SimpleAssignmentStatement | VbKind::NamedFieldInitializer => node.child(0),
            VbKind::VariableDeclarator => node.child_of_kind(VbKind::ModifiedIdentifier),
            _ => None,
        }
    }

    fn assignment_right(&self, node: VbNode<'t>) -> Option<VbNode<'t>> {
        match node.kind() {
            VbKind::SimpleAssignmentStatement | VbKind::NamedFieldInitializer => node.child(1),
            VbKind::VariableDeclarator => self
                .equals_value(node)
                .or_else(|| node.child_of_kind(VbKind::AsNewClause)?.child(0)),
            _ => None,
        }
    }

    fn member_access_target(&self, node: VbNode<'t>) -> Option<VbNode<'t>> {
        match node.kind() {
            VbKind::SimpleMemberAccessExpression if node.child_count() == 2 => node.child(0),
            _ => None,
        }
    }

    fn member_access_name(&self, node: VbNode<'t>) -> Option<VbNode<'t>> {
        match node.kind() {
            VbKind::SimpleMemberAccessExpression => node.child(node.child_count().checked_sub(1)?),
            _ => None,
        }
    }

    fn invocation_target(&self, node: VbNode<'t>) -> Option<VbNode<'t>> {
        match node.kind() {
            VbKind::InvocationExpression => node.child(0),
            _ => None,
        }
    }

    fn call_target_name(&self, node: VbNode<'t>) -> Option<VbNode<'t>> {
        match node.kind() {
            VbKind::InvocationExpression => {
                let callee = node.child(0)?;
                Some(self.member_access_name(callee).unwrap_or(callee))
            }
            VbKind::ObjectCreationExpression => node.child(0),
            _ => None,
        }
    }

    fn call_arguments(&self, node: VbNode<'t>, filter: CallKind) -> Vec<VbNode<'t>> {
        let accepted = match node.kind() {
            VbKind::InvocationExpression => filter.contains(CallKind::INVOCATION),
            VbKind::ObjectCreationExpression => filter.contains(CallKind::OBJECT_CREATION),
            _ => false,
        };
        if !accepted {
            return Vec::new();
        }
        let Some(list) = node.child_of_kind(VbKind::ArgumentList) else {
            return Vec::new();
        };
        list.children()
            .into_iter()
            .filter_map(|a| self.argument_expression(a))
            .collect()
    }

    fn argument_name(&self, argument: VbNode<'t>) -> Option<VbNode<'t>> {
        argument
            .parent()
            .filter(|owner| owner.kind() == VbKind::SimpleArgument)?
            .child_of_kind(VbKind::NameColonEquals)?
            .child(0)
    }

    fn object_initializer_members(&self, node: VbNode<'t>) -> Vec<VbNode<'t>> {
        if node.kind() != VbKind::ObjectCreationExpression {
            return Vec::new();
        }
        node.child_of_kind(VbKind::ObjectMemberInitializer)
            .map(|init| init.children_of_kind(VbKind::NamedFieldInitializer))
            .unwrap_or_default()
    }

    fn declaration_attributes(&self, node: VbNode<'t>) -> Vec<VbNode<'t>> {
        let Some(header) = self.header(node) else {
            return Vec::new();
        };
        header
            .children_of_kind(VbKind::AttributeList)
            .into_iter()
            .flat_map(|list| list.children_of_kind(VbKind::Attribute))
            .collect()
    }

    fn attribute_name(&self, node: VbNode<'t>) -> Option<VbNode<'t>> {
        match node.kind() {
            VbKind::Attribute => node.child(0),
            _ => None,
        }
    }

    fn attribute_arguments(&self, node: VbNode<'t>) -> Vec<VbNode<'t>> {
        if node.kind() != VbKind::Attribute {
            return Vec::new();
        }
        node.child_of_kind(VbKind::ArgumentList)
            .map(|list| list.children_of_kind(VbKind::SimpleArgument))
            .unwrap_or_default()
    }

    fn attribute_argument_expression(&self, node: VbNode<'t>) -> Option<VbNode<'t>> {
        if !self.is_attribute_argument_node(node) {
            return None;
        }
        self.argument_expression(node)
    }

    fn attribute_argument_name(&self, node: VbNode<'t>) -> Option<VbNode<'t>> {
        if !self.is_attribute_argument_node(node) {
            return None;
        }
        node.child_of_kind(VbKind::NameColonEquals)?.child(0)
    }

    fn default_parameter_value(&self, declaration: VbNode<'t>, index: usize) -> Option<VbNode<'t>> {
        let parameter = *self.parameter_nodes(declaration).get(index)?;
        self.equals_value(parameter)
    }

    fn is_temporary_construction(&self, node: VbNode<'t>) -> bool {
        node.kind() == VbKind::ObjectCreationExpression
            && !node
                .parent()
                .is_some_and(|p| matches!(p.kind(), VbKind::AsNewClause | VbKind::EqualsValue))
    }

    fn declared_name(&self, declaration: VbNode<'t>) -> Option<String> {
        match declaration.kind() {
            VbKind::ConstructorBlock => Some("New".to_string()),
            VbKind::NamespaceBlock => {
                let statement = declaration.child(0)?;
                self.name_text(statement.child(0)?)
            }
            VbKind::FieldDeclaration => {
                let declarator = self.first_declarator(declaration)?;
                clean_identifier(declarator.child_of_kind(VbKind::ModifiedIdentifier)?.text())
            }
            VbKind::VariableDeclarator | VbKind::Parameter => {
                clean_identifier(declaration.child_of_kind(VbKind::ModifiedIdentifier)?.text())
            }
            _ => {
                let header = self.header(declaration)?;
                clean_identifier(header.child_of_kind(VbKind::IdentifierToken)?.text())
            }
        }
    }

    fn declared_type(&self, declaration: VbNode<'t>) -> Option<VbNode<'t>> {
        match declaration.kind() {
            VbKind::VariableDeclarator | VbKind::Parameter => self.type_of_as_clause(declaration),
            VbKind::FieldDeclaration => self.type_of_as_clause(self.first_declarator(declaration)?),
            VbKind::PropertyBlock | VbKind::PropertyStatement => self.type_of_as_clause(self.header(declaration)?),
            _ => None,
        }
    }

    fn parameters(&self, declaration: VbNode<'t>) -> Vec<VbNode<'t>> {
        self.parameter_nodes(declaration)
    }

    fn imports(&self) -> Vec<ImportDirective> {
        let mut imports = Vec::new();
        for statement in self.root().children_of_kind(VbKind::ImportsStatement) {
            for clause in statement.children_of_kind(VbKind::SimpleImportsClause) {
                let Some(target) = clause
                    .children()
                    .last()
                    .filter(|n| n.kind() != VbKind::ImportAliasClause)
                    .and_then(|n| self.name_text(*n))
                else {
                    continue;
                };
                let alias = clause
                    .child_of_kind(VbKind::ImportAliasClause)
                    .and_then(|a| a.child(0))
                    .and_then(|token| clean_identifier(token.text()));
                imports.push(match alias {
                    Some(alias) => ImportDirective::alias(alias, target),
                    None => ImportDirective::namespace(target),
                });
            }
        }
        imports
    }

    fn namespace_of(&self, node: VbNode<'t>) -> String {
        let mut parts: Vec<String> = self
            .ancestors_and_self(node)
            .into_iter()
            .skip(1)
            .filter(|n| n.kind() == VbKind::NamespaceBlock)
            .filter_map(|n| self.declared_name(n))
            .collect();
        parts.reverse();
        parts.join(".")
    }
}
