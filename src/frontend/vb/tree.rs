//! Arena syntax tree for Visual Basic sources
//!
//! Nodes live in one `Vec` owned by [`VbTree`] and refer to each other by
//! [`NodeId`]. [`VbNode`] pairs an id with a borrow of the tree, which makes
//! it a cheap `Copy` handle usable as a `SyntaxHelper::Node`.

use std::fmt;

use crate::diagnostic::Location;

/// Native node kinds, named after their Roslyn counterparts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VbKind {
    CompilationUnit,
    ImportsStatement,
    SimpleImportsClause,
    ImportAliasClause,
    NamespaceBlock,
    NamespaceStatement,
    ClassBlock,
    ClassStatement,
    ModuleBlock,
    ModuleStatement,
    StructureBlock,
    StructureStatement,
    InterfaceBlock,
    InterfaceStatement,
    EnumBlock,
    EnumStatement,
    SubBlock,
    SubStatement,
    FunctionBlock,
    FunctionStatement,
    ConstructorBlock,
    SubNewStatement,
    OperatorBlock,
    PropertyBlock,
    PropertyStatement,
    GetAccessorBlock,
    SetAccessorBlock,
    AccessorStatement,
    ParameterList,
    Parameter,
    ModifiedIdentifier,
    IdentifierToken,
    SimpleAsClause,
    AsNewClause,
    EqualsValue,
    FieldDeclaration,
    LocalDeclarationStatement,
    VariableDeclarator,
    AttributeList,
    Attribute,
    ArgumentList,
    SimpleArgument,
    OmittedArgument,
    NameColonEquals,
    SimpleAssignmentStatement,
    CompoundAssignmentStatement,
    ExpressionStatement,
    CallStatement,
    ReturnStatement,
    SingleLineIfStatement,
    UsingStatement,
    OtherStatement,
    // Expressions
    StringLiteralExpression,
    CharacterLiteralExpression,
    NumericLiteralExpression,
    TrueLiteralExpression,
    FalseLiteralExpression,
    NothingLiteralExpression,
    DateLiteralExpression,
    InterpolatedStringExpression,
    Interpolation,
    IdentifierName,
    GenericName,
    QualifiedName,
    TypeArgumentList,
    ArrayType,
    NullableType,
    MeExpression,
    MyBaseExpression,
    MyClassExpression,
    SimpleMemberAccessExpression,
    ConditionalAccessExpression,
    InvocationExpression,
    ObjectCreationExpression,
    AnonymousObjectCreationExpression,
    ObjectMemberInitializer,
    NamedFieldInitializer,
    ObjectCollectionInitializer,
    CollectionInitializer,
    ArrayCreationExpression,
    ParenthesizedExpression,
    ConcatenateExpression,
    AddExpression,
    BinaryExpression,
    NotExpression,
    UnaryMinusExpression,
    CTypeExpression,
    DirectCastExpression,
    TryCastExpression,
    PredefinedCastExpression,
    GetTypeExpression,
    NameOfExpression,
    TypeOfExpression,
    TernaryConditionalExpression,
    BinaryConditionalExpression,
    SingleLineLambdaExpression,
    MultiLineLambdaExpression,
    AwaitExpression,
    AddressOfExpression,
    /// Tokens of an expression nested too deeply to parse
    SkippedExpression,
}

impl VbKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CompilationUnit => "CompilationUnit",
            Self::ImportsStatement => "ImportsStatement",
            Self::SimpleImportsClause => "SimpleImportsClause",
            Self::ImportAliasClause => "ImportAliasClause",
            Self::NamespaceBlock => "NamespaceBlock",
            Self::NamespaceStatement => "NamespaceStatement",
            Self::ClassBlock => "ClassBlock",
            Self::ClassStatement => "ClassStatement",
            Self::ModuleBlock => "ModuleBlock",
            Self::ModuleStatement => "ModuleStatement",
            Self::StructureBlock => "StructureBlock",
            Self::StructureStatement => "StructureStatement",
            Self::InterfaceBlock => "InterfaceBlock",
            Self::InterfaceStatement => "InterfaceStatement",
            Self::EnumBlock => "EnumBlock",
            Self::EnumStatement => "EnumStatement",
            Self::SubBlock => "SubBlock",
            Self::SubStatement => "SubStatement",
            Self::FunctionBlock => "FunctionBlock",
            Self::FunctionStatement => "FunctionStatement",
            Self::ConstructorBlock => "ConstructorBlock",
            Self::SubNewStatement => "SubNewStatement",
            Self::OperatorBlock => "OperatorBlock",
            Self::PropertyBlock => "PropertyBlock",
            Self::PropertyStatement => "PropertyStatement",
            Self::GetAccessorBlock => "GetAccessorBlock",
            Self::SetAccessorBlock => "SetAccessorBlock",
            Self::AccessorStatement => "AccessorStatement",
            Self::ParameterList => "ParameterList",
            Self::Parameter => "Parameter",
            Self::ModifiedIdentifier => "ModifiedIdentifier",
            Self::IdentifierToken => "IdentifierToken",
            Self::SimpleAsClause => "SimpleAsClause",
            Self::AsNewClause => "AsNewClause",
            Self::EqualsValue => "EqualsValue",
            Self::FieldDeclaration => "FieldDeclaration",
            Self::LocalDeclarationStatement => "LocalDeclarationStatement",
            Self::VariableDeclarator => "VariableDeclarator",
            Self::AttributeList => "AttributeList",
            Self::Attribute => "Attribute",
            Self::ArgumentList => "ArgumentList",
            Self::SimpleArgument => "SimpleArgument",
            Self::OmittedArgument => "OmittedArgument",
            Self::NameColonEquals => "NameColonEquals",
            Self::SimpleAssignmentStatement => "SimpleAssignmentStatement",
            Self::CompoundAssignmentStatement => "CompoundAssignmentStatement",
            Self::ExpressionStatement => "ExpressionStatement",
            Self::CallStatement => "CallStatement",
            Self::ReturnStatement => "ReturnStatement",
            Self::SingleLineIfStatement => "SingleLineIfStatement",
            Self::UsingStatement => "UsingStatement",
            Self::OtherStatement => "OtherStatement",
            Self::StringLiteralExpression => "StringLiteralExpression",
            Self::CharacterLiteralExpression => "CharacterLiteralExpression",
            Self::NumericLiteralExpression => "NumericLiteralExpression",
            Self::TrueLiteralExpression => "TrueLiteralExpression",
            Self::FalseLiteralExpression => "FalseLiteralExpression",
            Self::NothingLiteralExpression => "NothingLiteralExpression",
            Self::DateLiteralExpression => "DateLiteralExpression",
            Self::InterpolatedStringExpression => "InterpolatedStringExpression",
            Self::Interpolation => "Interpolation",
            Self::IdentifierName => "IdentifierName",
            Self::GenericName => "GenericName",
            Self::QualifiedName => "QualifiedName",
            Self::TypeArgumentList => "TypeArgumentList",
            Self::ArrayType => "ArrayType",
            Self::NullableType => "NullableType",
            Self::MeExpression => "MeExpression",
            Self::MyBaseExpression => "MyBaseExpression",
            Self::MyClassExpression => "MyClassExpression",
            Self::SimpleMemberAccessExpression => "SimpleMemberAccessExpression",
            Self::ConditionalAccessExpression => "ConditionalAccessExpression",
            Self::InvocationExpression => "InvocationExpression",
            Self::ObjectCreationExpression => "ObjectCreationExpression",
            Self::AnonymousObjectCreationExpression => "AnonymousObjectCreationExpression",
            Self::ObjectMemberInitializer => "ObjectMemberInitializer",
            Self::NamedFieldInitializer => "NamedFieldInitializer",
            Self::ObjectCollectionInitializer => "ObjectCollectionInitializer",
            Self::CollectionInitializer => "CollectionInitializer",
            Self::ArrayCreationExpression => "ArrayCreationExpression",
            Self::ParenthesizedExpression => "ParenthesizedExpression",
            Self::ConcatenateExpression => "ConcatenateExpression",
            Self::AddExpression => "AddExpression",
            Self::BinaryExpression => "BinaryExpression",
            Self::NotExpression => "NotExpression",
            Self::UnaryMinusExpression => "UnaryMinusExpression",
            Self::CTypeExpression => "CTypeExpression",
            Self::DirectCastExpression => "DirectCastExpression",
            Self::TryCastExpression => "TryCastExpression",
            Self::PredefinedCastExpression => "PredefinedCastExpression",
            Self::GetTypeExpression => "GetTypeExpression",
            Self::NameOfExpression => "NameOfExpression",
            Self::TypeOfExpression => "TypeOfExpression",
            Self::TernaryConditionalExpression => "TernaryConditionalExpression",
            Self::BinaryConditionalExpression => "BinaryConditionalExpression",
            Self::SingleLineLambdaExpression => "SingleLineLambdaExpression",
            Self::MultiLineLambdaExpression => "MultiLineLambdaExpression",
            Self::AwaitExpression => "AwaitExpression",
            Self::AddressOfExpression => "AddressOfExpression",
            Self::SkippedExpression => "SkippedExpression",
        }
    }

    /// Block kinds whose header statement carries the name and attributes
    pub fn is_type_block(&self) -> bool {
        matches!(
            self,
            Self::ClassBlock | Self::ModuleBlock | Self::StructureBlock | Self::InterfaceBlock | Self::EnumBlock
        )
    }

    pub fn is_method_block(&self) -> bool {
        matches!(self, Self::SubBlock | Self::FunctionBlock | Self::ConstructorBlock)
    }
}

impl fmt::Display for VbKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index of a node in its tree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
struct NodeData {
    kind: VbKind,
    start: usize,
    end: usize,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A parsed Visual Basic compilation unit
#[derive(Debug)]
pub struct VbTree {
    source: String,
    nodes: Vec<NodeData>,
    root: NodeId,
    line_starts: Vec<usize>,
}

impl VbTree {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> VbNode<'_> {
        self.node(self.root)
    }

    pub fn node(&self, id: NodeId) -> VbNode<'_> {
        VbNode { tree: self, id }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 1-based line and byte column of a byte offset
    fn line_column(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let start = self.line_starts.get(line).copied().unwrap_or(0);
        (line + 1, offset - start + 1)
    }
}

/// Borrowed handle to one node of a [`VbTree`]
#[derive(Clone, Copy)]
pub struct VbNode<'t> {
    tree: &'t VbTree,
    id: NodeId,
}

impl<'t> VbNode<'t> {
    fn data(&self) -> &'t NodeData {
        &self.tree.nodes[self.id.index()]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> VbKind {
        self.data().kind
    }

    pub fn parent(&self) -> Option<VbNode<'t>> {
        self.data().parent.map(|id| self.tree.node(id))
    }

    pub fn children(&self) -> Vec<VbNode<'t>> {
        self.data().children.iter().map(|&id| self.tree.node(id)).collect()
    }

    pub fn child(&self, index: usize) -> Option<VbNode<'t>> {
        self.data().children.get(index).map(|&id| self.tree.node(id))
    }

    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    pub fn child_of_kind(&self, kind: VbKind) -> Option<VbNode<'t>> {
        self.children().into_iter().find(|c| c.kind() == kind)
    }

    pub fn children_of_kind(&self, kind: VbKind) -> Vec<VbNode<'t>> {
        self.children().into_iter().filter(|c| c.kind() == kind).collect()
    }

    pub fn start_byte(&self) -> usize {
        self.data().start
    }

    pub fn end_byte(&self) -> usize {
        self.data().end
    }

    pub fn text(&self) -> &'t str {
        let data = self.data();
        self.tree.source.get(data.start..data.end).unwrap_or("")
    }

    pub fn location(&self) -> Location {
        let data = self.data();
        let (line, column) = self.tree.line_column(data.start);
        let (end_line, end_column) = self.tree.line_column(data.end);
        Location {
            line,
            column,
            end_line,
            end_column,
            start_byte: data.start,
            end_byte: data.end,
        }
    }
}

impl PartialEq for VbNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for VbNode<'_> {}

impl fmt::Debug for VbNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}..{}", self.kind(), self.start_byte(), self.end_byte())
    }
}

/// Bottom-up tree construction used by the parser
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<NodeData>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node over `start..end` adopting `children`
    pub fn add(&mut self, kind: VbKind, start: usize, end: usize, children: Vec<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        for child in &children {
            self.nodes[child.index()].parent = Some(id);
        }
        self.nodes.push(NodeData {
            kind,
            start,
            end: end.max(start),
            parent: None,
            children,
        });
        id
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.nodes[id.index()].children.len()
    }

    pub fn finish(self, source: &str, root: NodeId) -> VbTree {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        VbTree {
            source: source.to_string(),
            nodes: self.nodes,
            root,
            line_starts,
        }
    }
}
