//! Recursive-descent parser for Visual Basic
//!
//! The parser is error tolerant: it never fails, and any statement it does
//! not understand becomes an `OtherStatement` whose embedded expressions are
//! still parsed. Control-flow blocks (`If`, `For`, `Try`, ...) are kept flat:
//! their header and `End` lines become statements in the enclosing body.
//! Only declarations (namespaces, types, members, accessors and multi-line
//! lambdas) nest.

use super::lexer::{tokenize, Token, TokenKind};
use super::tree::{NodeId, TreeBuilder, VbKind, VbTree};

/// Words that never start an expression
const RESERVED: &[&str] = &[
    "AddHandler", "Alias", "And", "AndAlso", "As", "ByRef", "ByVal", "Call", "Case", "Catch", "Class", "Const",
    "Continue", "Declare", "Delegate", "Dim", "Do", "Each", "Else", "ElseIf", "End", "EndIf", "Enum", "Erase",
    "Error", "Event", "Exit", "Finally", "For", "Friend", "Function", "Get", "GoTo", "Handles", "If", "Implements", "Imports", "In",
    "Inherits", "Interface", "Is", "IsNot", "Let", "Lib", "Like", "Loop", "Mod", "Module", "MustInherit",
    "MustOverride", "Namespace", "Narrowing", "Next", "NotInheritable", "NotOverridable", "Of", "On", "Operator",
    "Option", "Optional", "Or", "OrElse", "Overloads", "Overridable", "Overrides", "ParamArray", "Partial",
    "Private", "Property", "Protected", "Public", "RaiseEvent", "ReadOnly", "ReDim", "RemoveHandler", "Resume",
    "Return", "Select", "Set", "Shadows", "Shared", "Static", "Step", "Stop", "Structure", "Sub", "SyncLock", "Then",
    "Throw", "To", "Try", "Using", "When", "While", "Widening", "With", "WithEvents", "WriteOnly", "Xor",
];

const MODIFIERS: &[&str] = &[
    "Public", "Private", "Protected", "Friend", "Shared", "Shadows", "Overrides", "Overridable", "NotOverridable",
    "MustOverride", "MustInherit", "NotInheritable", "Partial", "ReadOnly", "WriteOnly", "Overloads", "Static",
    "Const", "Dim", "WithEvents", "Async", "Iterator", "Default", "Widening", "Narrowing", "Custom",
];

const PARAMETER_MODIFIERS: &[&str] = &["ByVal", "ByRef", "Optional", "ParamArray"];

const PREDEFINED_CASTS: &[&str] = &[
    "CBool", "CByte", "CChar", "CDate", "CDbl", "CDec", "CInt", "CLng", "CObj", "CSByte", "CShort", "CSng", "CStr",
    "CUInt", "CULng", "CUShort",
];

/// Statement keywords parsed generically
const GENERIC_STATEMENTS: &[&str] = &[
    "ElseIf", "Else", "While", "Do", "Loop", "For", "Next", "Select", "Case", "Try", "Catch", "Finally", "Throw",
    "With", "SyncLock", "Exit", "Continue", "ReDim", "Erase", "RaiseEvent", "AddHandler", "RemoveHandler", "Yield",
    "GoTo", "On", "Resume", "Stop", "Error", "End", "EndIf", "Wend", "Option", "Inherits", "Implements", "Event",
    "Delegate", "Declare", "Mid",
];

const COMPOUND_ASSIGNMENTS: &[&str] = &["+=", "-=", "*=", "/=", "\\=", "^=", "&=", "<<=", ">>="];

/// `End X` words that close a declaration and so must not be swallowed by a
/// method body that lost track of its own `End`
/// Expression nesting past this depth is consumed as one `SkippedExpression`
pub const MAX_EXPRESSION_DEPTH: usize = 128;

const DECLARATION_ENDS: &[&str] = &["Class", "Module", "Structure", "Interface", "Namespace", "Property", "Enum"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Namespace,
    Type,
    Interface,
}

/// Parse Visual Basic source into a syntax tree
pub fn parse(source: &str) -> VbTree {
    let mut parser = Parser {
        source,
        tokens: tokenize(source),
        pos: 0,
        depth: 0,
        builder: TreeBuilder::new(),
    };
    let root = parser.parse_compilation_unit();
    parser.builder.finish(source, root)
}

struct Parser<'s> {
    source: &'s str,
    tokens: Vec<Token>,
    pos: usize,
    /// Current expression nesting
    depth: usize,
    builder: TreeBuilder,
}

impl<'s> Parser<'s> {
    // =========================================================================
    // Token access
    // =========================================================================

    fn peek(&self) -> Token {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Token {
        let index = (self.pos + offset).min(self.tokens.len().saturating_sub(1));
        self.tokens[index]
    }

    fn text_at(&self, offset: usize) -> &'s str {
        self.peek_at(offset).text(self.source)
    }

    fn is_word_at(&self, offset: usize, word: &str) -> bool {
        let token = self.peek_at(offset);
        token.kind == TokenKind::Word && token.text(self.source).eq_ignore_ascii_case(word)
    }

    fn is_word(&self, word: &str) -> bool {
        self.is_word_at(0, word)
    }

    fn is_any_word(&self, words: &[&str]) -> bool {
        words.iter().any(|w| self.is_word(w))
    }

    fn is_symbol_at(&self, offset: usize, symbol: &str) -> bool {
        let token = self.peek_at(offset);
        token.kind == TokenKind::Symbol && token.text(self.source) == symbol
    }

    fn is_symbol(&self, symbol: &str) -> bool {
        self.is_symbol_at(0, symbol)
    }

    fn is_name_token_at(&self, offset: usize) -> bool {
        matches!(self.peek_at(offset).kind, TokenKind::Word | TokenKind::EscapedIdentifier)
    }

    fn is_identifier_at(&self, offset: usize) -> bool {
        let token = self.peek_at(offset);
        match token.kind {
            TokenKind::EscapedIdentifier => true,
            TokenKind::Word => {
                let text = token.text(self.source);
                !RESERVED.iter().any(|r| r.eq_ignore_ascii_case(text))
            }
            _ => false,
        }
    }

    fn at_statement_end(&self) -> bool {
        self.peek().is_statement_end()
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn bump(&mut self) -> Token {
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn eat_symbol(&mut self, symbol: &str) -> bool {
        if self.is_symbol(symbol) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.is_word(word) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_statement_ends(&mut self) {
        while matches!(self.peek().kind, TokenKind::Newline | TokenKind::Colon) {
            self.bump();
        }
    }

    fn skip_to_statement_end(&mut self) {
        while !self.at_statement_end() {
            self.bump();
        }
    }

    fn prev_end(&self) -> usize {
        if self.pos == 0 {
            return 0;
        }
        self.tokens[self.pos - 1].end
    }

    fn node(&mut self, kind: VbKind, start: usize, children: Vec<NodeId>) -> NodeId {
        let end = self.prev_end();
        self.builder.add(kind, start, end, children)
    }

    fn leaf(&mut self, kind: VbKind) -> NodeId {
        let token = self.bump();
        self.builder.add(kind, token.start, token.end, Vec::new())
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn parse_compilation_unit(&mut self) -> NodeId {
        let mut children = Vec::new();
        loop {
            self.skip_statement_ends();
            if self.at_eof() {
                break;
            }
            let before = self.pos;
            children.extend(self.parse_member(Scope::Namespace));
            if self.pos == before {
                self.bump();
            }
        }
        self.builder.add(VbKind::CompilationUnit, 0, self.source.len(), children)
    }

    /// Members up to and including `End <end_word>`
    fn parse_members_until(&mut self, end_word: &str, scope: Scope) -> Vec<NodeId> {
        let mut members = Vec::new();
        loop {
            self.skip_statement_ends();
            if self.at_eof() {
                break;
            }
            if self.is_word("End") && self.is_word_at(1, end_word) {
                self.bump();
                self.bump();
                self.skip_to_statement_end();
                break;
            }
            let before = self.pos;
            members.extend(self.parse_member(scope));
            if self.pos == before {
                self.bump();
            }
        }
        members
    }

    fn parse_member(&mut self, scope: Scope) -> Option<NodeId> {
        let start = self.peek().start;
        let attributes = self.parse_attribute_lists();

        let mut has_modifiers = false;
        let mut must_override = false;
        while self.is_any_word(MODIFIERS) {
            // `Dim`/`Const` inside a method body are statements, not modifiers
            if scope == Scope::Namespace && self.is_any_word(&["Dim", "Const", "Static"]) {
                break;
            }
            must_override |= self.is_word("MustOverride");
            has_modifiers = true;
            self.bump();
        }

        let word = self.text_at(0).to_ascii_lowercase();
        match word.as_str() {
            "imports" if attributes.is_empty() => Some(self.parse_imports(start)),
            "namespace" => Some(self.parse_namespace(start)),
            "class" => Some(self.parse_type_block(start, attributes, VbKind::ClassBlock, VbKind::ClassStatement, "Class", Scope::Type)),
            "module" => Some(self.parse_type_block(start, attributes, VbKind::ModuleBlock, VbKind::ModuleStatement, "Module", Scope::Type)),
            "structure" => Some(self.parse_type_block(start, attributes, VbKind::StructureBlock, VbKind::StructureStatement, "Structure", Scope::Type)),
            "interface" => Some(self.parse_type_block(start, attributes, VbKind::InterfaceBlock, VbKind::InterfaceStatement, "Interface", Scope::Interface)),
            "enum" => Some(self.parse_enum(start, attributes)),
            "sub" | "function" => Some(self.parse_method(start, attributes, scope == Scope::Interface || must_override)),
            "property" => Some(self.parse_property(start, attributes, scope == Scope::Interface || must_override)),
            "operator" => Some(self.parse_operator(start, attributes)),
            "event" | "delegate" | "declare" | "inherits" | "implements" | "option" => {
                self.skip_to_statement_end();
                Some(self.node(VbKind::OtherStatement, start, attributes))
            }
            _ if (has_modifiers || (scope != Scope::Namespace && !attributes.is_empty())) && self.is_name_token_at(0) => {
                let mut children = attributes;
                children.extend(self.parse_declarators());
                Some(self.node(VbKind::FieldDeclaration, start, children))
            }
            _ => self.parse_statement(),
        }
    }

    fn parse_imports(&mut self, start: usize) -> NodeId {
        self.bump();
        let mut clauses = Vec::new();
        loop {
            let clause_start = self.peek().start;
            if self.is_symbol("<") {
                self.skip_to_statement_end();
                break;
            }
            let mut children = Vec::new();
            if self.is_name_token_at(0) && self.is_symbol_at(1, "=") {
                let alias_start = self.peek().start;
                let name = self.leaf(VbKind::IdentifierToken);
                self.bump();
                children.push(self.node(VbKind::ImportAliasClause, alias_start, vec![name]));
            }
            match self.parse_type_name() {
                Some(name) => children.push(name),
                None => break,
            }
            clauses.push(self.node(VbKind::SimpleImportsClause, clause_start, children));
            if !self.eat_symbol(",") {
                break;
            }
        }
        self.skip_to_statement_end();
        self.node(VbKind::ImportsStatement, start, clauses)
    }

    fn parse_namespace(&mut self, start: usize) -> NodeId {
        self.bump();
        let mut statement_children = Vec::new();
        statement_children.extend(self.parse_type_name());
        self.skip_to_statement_end();
        let statement = self.node(VbKind::NamespaceStatement, start, statement_children);

        let mut children = vec![statement];
        children.extend(self.parse_members_until("Namespace", Scope::Namespace));
        self.node(VbKind::NamespaceBlock, start, children)
    }

    fn parse_type_block(
        &mut self,
        start: usize,
        attributes: Vec<NodeId>,
        block_kind: VbKind,
        statement_kind: VbKind,
        end_word: &str,
        scope: Scope,
    ) -> NodeId {
        self.bump();
        let mut statement_children = attributes;
        if self.is_name_token_at(0) {
            statement_children.push(self.leaf(VbKind::IdentifierToken));
        }
        self.skip_to_statement_end();
        let statement = self.node(statement_kind, start, statement_children);

        let mut children = vec![statement];
        children.extend(self.parse_members_until(end_word, scope));
        self.node(block_kind, start, children)
    }

    fn parse_enum(&mut self, start: usize, attributes: Vec<NodeId>) -> NodeId {
        self.bump();
        let mut statement_children = attributes;
        if self.is_name_token_at(0) {
            statement_children.push(self.leaf(VbKind::IdentifierToken));
        }
        self.skip_to_statement_end();
        let statement = self.node(VbKind::EnumStatement, start, statement_children);

        loop {
            self.skip_statement_ends();
            if self.at_eof() {
                break;
            }
            if self.is_word("End") && self.is_word_at(1, "Enum") {
                self.bump();
                self.bump();
                break;
            }
            self.skip_to_statement_end();
        }
        self.skip_to_statement_end();
        self.node(VbKind::EnumBlock, start, vec![statement])
    }

    fn parse_method(&mut self, start: usize, attributes: Vec<NodeId>, abstract_member: bool) -> NodeId {
        let is_function = self.is_word("Function");
        self.bump();

        if !is_function && self.is_word("New") {
            self.bump();
            let mut statement_children = attributes;
            if self.is_symbol("(") {
                statement_children.push(self.parse_parameter_list());
            }
            self.skip_to_statement_end();
            let statement = self.node(VbKind::SubNewStatement, start, statement_children);
            if abstract_member {
                return statement;
            }
            let mut children = vec![statement];
            children.extend(self.parse_statements_until("Sub", true));
            return self.node(VbKind::ConstructorBlock, start, children);
        }

        let mut statement_children = attributes;
        if self.is_name_token_at(0) {
            statement_children.push(self.leaf(VbKind::IdentifierToken));
        }
        if self.is_symbol("(") && self.is_word_at(1, "Of") {
            self.parse_type_argument_list();
        }
        if self.is_symbol("(") {
            statement_children.push(self.parse_parameter_list());
        }
        if self.is_word("As") {
            statement_children.push(self.parse_as_clause());
        }
        self.skip_to_statement_end();

        let (statement_kind, block_kind, end_word) = if is_function {
            (VbKind::FunctionStatement, VbKind::FunctionBlock, "Function")
        } else {
            (VbKind::SubStatement, VbKind::SubBlock, "Sub")
        };
        let statement = self.node(statement_kind, start, statement_children);
        if abstract_member {
            return statement;
        }
        let mut children = vec![statement];
        children.extend(self.parse_statements_until(end_word, true));
        self.node(block_kind, start, children)
    }

    fn parse_operator(&mut self, start: usize, attributes: Vec<NodeId>) -> NodeId {
        self.skip_to_statement_end();
        let statement = self.node(VbKind::OtherStatement, start, attributes);
        let mut children = vec![statement];
        children.extend(self.parse_statements_until("Operator", true));
        self.node(VbKind::OperatorBlock, start, children)
    }

    fn parse_property(&mut self, start: usize, attributes: Vec<NodeId>, abstract_member: bool) -> NodeId {
        self.bump();
        let mut statement_children = attributes;
        if self.is_name_token_at(0) {
            statement_children.push(self.leaf(VbKind::IdentifierToken));
        }
        if self.is_symbol("(") {
            statement_children.push(self.parse_parameter_list());
        }
        if self.is_word("As") {
            statement_children.push(self.parse_as_clause());
        }
        if self.is_symbol("=") {
            statement_children.push(self.parse_equals_value());
        }
        self.skip_to_statement_end();
        let statement = self.node(VbKind::PropertyStatement, start, statement_children);

        if abstract_member || !self.accessor_follows() {
            return statement;
        }

        let mut children = vec![statement];
        loop {
            self.skip_statement_ends();
            if self.at_eof() {
                break;
            }
            if self.is_word("End") && self.is_word_at(1, "Property") {
                self.bump();
                self.bump();
                self.skip_to_statement_end();
                break;
            }
            let before = self.pos;
            if let Some(accessor) = self.parse_accessor() {
                children.push(accessor);
            }
            if self.pos == before {
                self.bump();
            }
        }
        self.node(VbKind::PropertyBlock, start, children)
    }

    /// Whether the next statement opens a `Get`/`Set` accessor
    fn accessor_follows(&mut self) -> bool {
        let saved = self.pos;
        self.skip_statement_ends();
        self.parse_attribute_lists();
        while self.is_any_word(MODIFIERS) {
            self.bump();
        }
        let found = self.is_word("Get") || self.is_word("Set");
        self.pos = saved;
        found
    }

    fn parse_accessor(&mut self) -> Option<NodeId> {
        let start = self.peek().start;
        let attributes = self.parse_attribute_lists();
        while self.is_any_word(MODIFIERS) {
            self.bump();
        }
        let (block_kind, end_word) = if self.is_word("Get") {
            (VbKind::GetAccessorBlock, "Get")
        } else if self.is_word("Set") {
            (VbKind::SetAccessorBlock, "Set")
        } else {
            return self.parse_statement();
        };
        self.bump();
        let mut statement_children = attributes;
        if self.is_symbol("(") {
            statement_children.push(self.parse_parameter_list());
        }
        self.skip_to_statement_end();
        let statement = self.node(VbKind::AccessorStatement, start, statement_children);
        let mut children = vec![statement];
        children.extend(self.parse_statements_until(end_word, true));
        Some(self.node(block_kind, start, children))
    }

    fn parse_attribute_lists(&mut self) -> Vec<NodeId> {
        let mut lists = Vec::new();
        while self.is_symbol("<") {
            let start = self.peek().start;
            self.bump();
            let mut attributes = Vec::new();
            loop {
                // Attribute target such as `Assembly:`
                if self.is_name_token_at(0) && self.peek_at(1).kind == TokenKind::Colon {
                    self.bump();
                    self.bump();
                }
                let attribute_start = self.peek().start;
                let Some(name) = self.parse_type_name() else {
                    break;
                };
                let mut children = vec![name];
                if self.is_symbol("(") {
                    children.push(self.parse_argument_list());
                }
                attributes.push(self.node(VbKind::Attribute, attribute_start, children));
                if !self.eat_symbol(",") {
                    break;
                }
            }
            while !self.is_symbol(">") && !self.at_statement_end() {
                self.bump();
            }
            self.eat_symbol(">");
            lists.push(self.node(VbKind::AttributeList, start, attributes));
            while self.peek().kind == TokenKind::Newline {
                self.bump();
            }
        }
        lists
    }

    fn parse_parameter_list(&mut self) -> NodeId {
        let start = self.peek().start;
        self.bump();
        let mut parameters = Vec::new();
        if self.eat_symbol(")") {
            return self.node(VbKind::ParameterList, start, parameters);
        }
        loop {
            let before = self.pos;
            if let Some(parameter) = self.parse_parameter() {
                parameters.push(parameter);
            }
            if self.eat_symbol(",") {
                continue;
            }
            if self.eat_symbol(")") || self.at_statement_end() {
                break;
            }
            if self.pos == before {
                self.bump();
            }
        }
        self.node(VbKind::ParameterList, start, parameters)
    }

    fn parse_parameter(&mut self) -> Option<NodeId> {
        let start = self.peek().start;
        let mut children = self.parse_attribute_lists();
        while self.is_any_word(PARAMETER_MODIFIERS) {
            self.bump();
        }
        children.push(self.parse_modified_identifier()?);
        if self.is_word("As") {
            children.push(self.parse_as_clause());
        }
        if self.is_symbol("=") {
            children.push(self.parse_equals_value());
        }
        Some(self.node(VbKind::Parameter, start, children))
    }

    fn parse_modified_identifier(&mut self) -> Option<NodeId> {
        if !self.is_name_token_at(0) || self.at_statement_end() {
            return None;
        }
        let start = self.peek().start;
        self.bump();
        if self.is_symbol("(") {
            self.skip_balanced("(", ")");
        }
        self.eat_symbol("?");
        Some(self.node(VbKind::ModifiedIdentifier, start, Vec::new()))
    }

    /// `As T` or `As New T(...)`
    fn parse_as_clause(&mut self) -> NodeId {
        let start = self.peek().start;
        self.bump();
        if self.is_word("New") {
            let creation = self.parse_new();
            return self.node(VbKind::AsNewClause, start, creation.into_iter().collect());
        }
        let children = self.parse_type().into_iter().collect();
        self.node(VbKind::SimpleAsClause, start, children)
    }

    fn parse_equals_value(&mut self) -> NodeId {
        let start = self.peek().start;
        self.bump();
        let children = self.parse_expression().into_iter().collect();
        self.node(VbKind::EqualsValue, start, children)
    }

    /// Declarators of a `Dim`, field or `Using` statement
    fn parse_declarators(&mut self) -> Vec<NodeId> {
        let mut declarators = Vec::new();
        loop {
            let start = self.peek().start;
            let mut children = Vec::new();
            match self.parse_modified_identifier() {
                Some(name) => children.push(name),
                None => break,
            }
            while self.is_symbol(",") && self.is_name_token_at(1) {
                self.bump();
                match self.parse_modified_identifier() {
                    Some(name) => children.push(name),
                    None => break,
                }
            }
            if self.is_word("As") {
                children.push(self.parse_as_clause());
            }
            if self.is_symbol("=") {
                children.push(self.parse_equals_value());
            }
            declarators.push(self.node(VbKind::VariableDeclarator, start, children));
            if !self.eat_symbol(",") {
                break;
            }
        }
        declarators
    }

    fn skip_balanced(&mut self, open: &str, close: &str) {
        let mut depth = 0usize;
        while !self.at_eof() {
            if self.is_symbol(open) {
                depth += 1;
            } else if self.is_symbol(close) {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    self.bump();
                    return;
                }
            } else if self.at_statement_end() {
                return;
            }
            self.bump();
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Statements up to and including `End <end_word>`
    ///
    /// With `consume_line` unset the rest of the `End` line is left for the
    /// caller, which is how a multi-line lambda hands back `End Sub)`.
    fn parse_statements_until(&mut self, end_word: &str, consume_line: bool) -> Vec<NodeId> {
        let mut statements = Vec::new();
        loop {
            self.skip_statement_ends();
            if self.at_eof() {
                break;
            }
            if self.is_word("End") && self.is_word_at(1, end_word) {
                self.bump();
                self.bump();
                if consume_line {
                    self.skip_to_statement_end();
                }
                break;
            }
            if self.is_word("End") && DECLARATION_ENDS.iter().any(|w| self.is_word_at(1, w)) {
                break;
            }
            let start = self.peek().start;
            let before = self.pos;
            statements.extend(self.parse_statement());
            if !self.at_statement_end() {
                let rest = self.parse_generic_rest();
                if !rest.is_empty() {
                    statements.push(self.node(VbKind::OtherStatement, start, rest));
                }
            }
            if self.pos == before {
                self.bump();
            }
        }
        statements
    }

    fn parse_statement(&mut self) -> Option<NodeId> {
        let start = self.peek().start;
        if self.is_any_word(&["Dim", "Const", "Static"]) {
            while self.is_any_word(MODIFIERS) {
                self.bump();
            }
            let declarators = self.parse_declarators();
            return Some(self.node(VbKind::LocalDeclarationStatement, start, declarators));
        }
        if self.eat_word("Return") {
            let children = self.parse_expression().into_iter().collect();
            return Some(self.node(VbKind::ReturnStatement, start, children));
        }
        if self.eat_word("Call") {
            let children = self.parse_expression().into_iter().collect();
            return Some(self.node(VbKind::CallStatement, start, children));
        }
        if self.eat_word("Using") {
            let children = if self.is_name_token_at(0) && (self.is_word_at(1, "As") || self.is_symbol_at(1, "=")) {
                self.parse_declarators()
            } else {
                self.parse_expression().into_iter().collect()
            };
            return Some(self.node(VbKind::UsingStatement, start, children));
        }
        if self.is_word("If") && (!self.is_symbol_at(1, "(") || self.line_has_then()) {
            return Some(self.parse_if(start));
        }
        if self.is_any_word(GENERIC_STATEMENTS) || self.is_any_word(MODIFIERS) {
            self.bump();
            let children = self.parse_generic_rest();
            return Some(self.node(VbKind::OtherStatement, start, children));
        }
        self.parse_simple_statement(start)
    }

    fn line_has_then(&self) -> bool {
        let mut offset = 0;
        loop {
            let token = self.peek_at(offset);
            if token.is_statement_end() {
                return false;
            }
            if token.kind == TokenKind::Word && token.text(self.source).eq_ignore_ascii_case("Then") {
                return true;
            }
            offset += 1;
        }
    }

    fn parse_if(&mut self, start: usize) -> NodeId {
        self.bump();
        let mut children: Vec<NodeId> = self.parse_expression().into_iter().collect();
        self.eat_word("Then");
        if self.at_statement_end() {
            return self.node(VbKind::OtherStatement, start, children);
        }
        loop {
            let before = self.pos;
            children.extend(self.parse_statement());
            if self.eat_word("Else") {
                continue;
            }
            if self.at_statement_end() || self.pos == before {
                break;
            }
            children.extend(self.parse_generic_rest());
            break;
        }
        self.node(VbKind::SingleLineIfStatement, start, children)
    }

    fn parse_simple_statement(&mut self, start: usize) -> Option<NodeId> {
        if self.is_word("Await") {
            let expression = self.parse_expression()?;
            return Some(self.node(VbKind::ExpressionStatement, start, vec![expression]));
        }
        let Some(target) = self.parse_postfix() else {
            let children = self.parse_generic_rest();
            return Some(self.node(VbKind::OtherStatement, start, children));
        };
        if self.eat_symbol("=") {
            let mut children = vec![target];
            children.extend(self.parse_expression());
            return Some(self.node(VbKind::SimpleAssignmentStatement, start, children));
        }
        if COMPOUND_ASSIGNMENTS.iter().any(|op| self.is_symbol(op)) {
            self.bump();
            let mut children = vec![target];
            children.extend(self.parse_expression());
            return Some(self.node(VbKind::CompoundAssignmentStatement, start, children));
        }
        Some(self.node(VbKind::ExpressionStatement, start, vec![target]))
    }

    /// Parse whatever expressions remain on the current line
    fn parse_generic_rest(&mut self) -> Vec<NodeId> {
        let mut children = Vec::new();
        while !self.at_statement_end() {
            let before = self.pos;
            if self.can_start_expression() {
                children.extend(self.parse_expression());
            }
            if self.pos == before {
                self.bump();
            }
        }
        children
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn can_start_expression(&self) -> bool {
        let token = self.peek();
        match token.kind {
            TokenKind::String
            | TokenKind::Character
            | TokenKind::Number
            | TokenKind::Date
            | TokenKind::InterpolatedString
            | TokenKind::EscapedIdentifier => true,
            TokenKind::Symbol => matches!(token.text(self.source), "(" | "{" | "-" | "+" | "."),
            TokenKind::Word => {
                self.is_identifier_at(0) || (self.is_any_word(&["If", "Sub", "Function"]) && self.is_symbol_at(1, "("))
            }
            _ => false,
        }
    }

    fn parse_expression(&mut self) -> Option<NodeId> {
        self.parse_binary(0)
    }

    fn binary_operator(&self) -> Option<(u8, VbKind)> {
        let token = self.peek();
        let text = token.text(self.source);
        match token.kind {
            TokenKind::Symbol => match text {
                "^" => Some((14, VbKind::BinaryExpression)),
                "*" | "/" => Some((12, VbKind::BinaryExpression)),
                "\\" => Some((11, VbKind::BinaryExpression)),
                "+" => Some((9, VbKind::AddExpression)),
                "-" => Some((9, VbKind::BinaryExpression)),
                "&" => Some((8, VbKind::ConcatenateExpression)),
                "<<" | ">>" => Some((7, VbKind::BinaryExpression)),
                "=" | "<>" | "<" | ">" | "<=" | ">=" => Some((6, VbKind::BinaryExpression)),
                _ => None,
            },
            TokenKind::Word => {
                let lower = text.to_ascii_lowercase();
                match lower.as_str() {
                    "mod" => Some((10, VbKind::BinaryExpression)),
                    "is" | "isnot" | "like" => Some((6, VbKind::BinaryExpression)),
                    "and" => Some((4, VbKind::BinaryExpression)),
                    "andalso" => Some((3, VbKind::BinaryExpression)),
                    "or" | "xor" => Some((2, VbKind::BinaryExpression)),
                    "orelse" => Some((1, VbKind::BinaryExpression)),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Option<NodeId> {
        let start = self.peek().start;
        let mut left = self.parse_unary()?;
        while let Some((precedence, kind)) = self.binary_operator() {
            if precedence < min_precedence.max(1) {
                break;
            }
            let saved = self.pos;
            self.bump();
            let Some(right) = self.parse_binary(precedence + 1) else {
                self.pos = saved;
                break;
            };
            left = self.node(kind, start, vec![left, right]);
        }
        Some(left)
    }

    fn parse_unary(&mut self) -> Option<NodeId> {
        if self.depth >= MAX_EXPRESSION_DEPTH {
            return self.skip_expression();
        }
        self.depth += 1;
        let expression = self.parse_prefixed();
        self.depth -= 1;
        expression
    }

    /// Consume the rest of an expression too deep to parse, stopping before
    /// the `)`, `}` or `,` that closes it
    fn skip_expression(&mut self) -> Option<NodeId> {
        let start = self.peek().start;
        let first = self.pos;
        let mut depth = 0usize;
        while !self.at_statement_end() {
            if self.is_symbol("(") || self.is_symbol("{") {
                depth += 1;
            } else if self.is_symbol(")") || self.is_symbol("}") {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            } else if depth == 0 && self.is_symbol(",") {
                break;
            }
            self.bump();
        }
        if self.pos == first {
            return None;
        }
        Some(self.node(VbKind::SkippedExpression, start, Vec::new()))
    }

    fn parse_prefixed(&mut self) -> Option<NodeId> {
        let start = self.peek().start;
        if self.eat_word("Not") {
            let operand = self.parse_binary(6)?;
            return Some(self.node(VbKind::NotExpression, start, vec![operand]));
        }
        if self.is_symbol("-") || self.is_symbol("+") {
            self.bump();
            let operand = self.parse_binary(13)?;
            return Some(self.node(VbKind::UnaryMinusExpression, start, vec![operand]));
        }
        if self.eat_word("Await") {
            let operand = self.parse_unary()?;
            return Some(self.node(VbKind::AwaitExpression, start, vec![operand]));
        }
        if self.eat_word("AddressOf") {
            let operand = self.parse_postfix()?;
            return Some(self.node(VbKind::AddressOfExpression, start, vec![operand]));
        }
        if self.eat_word("TypeOf") {
            let mut children: Vec<NodeId> = self.parse_postfix().into_iter().collect();
            if self.eat_word("Is") || self.eat_word("IsNot") {
                children.extend(self.parse_type());
            }
            return Some(self.node(VbKind::TypeOfExpression, start, children));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Option<NodeId> {
        let start = self.peek().start;
        let mut expression = self.parse_primary()?;
        loop {
            if self.is_symbol(".") && self.is_name_token_at(1) {
                self.bump();
                let name = self.parse_simple_name()?;
                expression = self.node(VbKind::SimpleMemberAccessExpression, start, vec![expression, name]);
            } else if self.is_symbol("?.") && self.is_name_token_at(1) {
                self.bump();
                let name = self.parse_simple_name()?;
                expression = self.node(VbKind::ConditionalAccessExpression, start, vec![expression, name]);
            } else if self.is_symbol("(") {
                let arguments = self.parse_argument_list();
                expression = self.node(VbKind::InvocationExpression, start, vec![expression, arguments]);
            } else if self.is_symbol("!") && self.is_name_token_at(1) {
                self.bump();
                self.bump();
            } else {
                break;
            }
        }
        Some(expression)
    }

    fn parse_primary(&mut self) -> Option<NodeId> {
        let token = self.peek();
        let start = token.start;
        match token.kind {
            TokenKind::String => Some(self.leaf(VbKind::StringLiteralExpression)),
            TokenKind::Character => Some(self.leaf(VbKind::CharacterLiteralExpression)),
            TokenKind::Number => Some(self.leaf(VbKind::NumericLiteralExpression)),
            TokenKind::Date => Some(self.leaf(VbKind::DateLiteralExpression)),
            TokenKind::InterpolatedString => Some(self.parse_interpolated_string()),
            TokenKind::EscapedIdentifier => self.parse_simple_name(),
            TokenKind::Symbol => match token.text(self.source) {
                "(" => {
                    self.bump();
                    let inner = self.parse_expression();
                    self.eat_symbol(")");
                    Some(self.node(VbKind::ParenthesizedExpression, start, inner.into_iter().collect()))
                }
                "{" => Some(self.parse_collection_initializer()),
                "." if self.is_name_token_at(1) => {
                    self.bump();
                    let name = self.parse_simple_name()?;
                    Some(self.node(VbKind::SimpleMemberAccessExpression, start, vec![name]))
                }
                _ => None,
            },
            TokenKind::Word => self.parse_word_primary(start),
            _ => None,
        }
    }

    fn parse_word_primary(&mut self, start: usize) -> Option<NodeId> {
        let word = self.text_at(0).to_ascii_lowercase();
        match word.as_str() {
            "true" => Some(self.leaf(VbKind::TrueLiteralExpression)),
            "false" => Some(self.leaf(VbKind::FalseLiteralExpression)),
            "nothing" => Some(self.leaf(VbKind::NothingLiteralExpression)),
            "me" => Some(self.leaf(VbKind::MeExpression)),
            "mybase" => Some(self.leaf(VbKind::MyBaseExpression)),
            "myclass" => Some(self.leaf(VbKind::MyClassExpression)),
            "new" => self.parse_new(),
            "ctype" | "directcast" | "trycast" if self.is_symbol_at(1, "(") => {
                let kind = match word.as_str() {
                    "ctype" => VbKind::CTypeExpression,
                    "directcast" => VbKind::DirectCastExpression,
                    _ => VbKind::TryCastExpression,
                };
                self.bump();
                self.bump();
                let mut children: Vec<NodeId> = self.parse_expression().into_iter().collect();
                if self.eat_symbol(",") {
                    children.extend(self.parse_type());
                }
                self.skip_until_close();
                Some(self.node(kind, start, children))
            }
            _ if PREDEFINED_CASTS.iter().any(|c| c.eq_ignore_ascii_case(&word)) && self.is_symbol_at(1, "(") => {
                self.bump();
                self.bump();
                let children = self.parse_expression().into_iter().collect();
                self.skip_until_close();
                Some(self.node(VbKind::PredefinedCastExpression, start, children))
            }
            "gettype" if self.is_symbol_at(1, "(") => {
                self.bump();
                self.bump();
                let children = self.parse_type().into_iter().collect();
                self.skip_until_close();
                Some(self.node(VbKind::GetTypeExpression, start, children))
            }
            "nameof" if self.is_symbol_at(1, "(") => {
                self.bump();
                self.bump();
                let children = self.parse_expression().into_iter().collect();
                self.skip_until_close();
                Some(self.node(VbKind::NameOfExpression, start, children))
            }
            "if" if self.is_symbol_at(1, "(") => {
                self.bump();
                let arguments = self.parse_argument_list();
                let kind = if self.builder.child_count(arguments) == 3 {
                    VbKind::TernaryConditionalExpression
                } else {
                    VbKind::BinaryConditionalExpression
                };
                Some(self.node(kind, start, vec![arguments]))
            }
            "function" | "sub" if self.is_symbol_at(1, "(") => self.parse_lambda(start),
            _ if self.is_identifier_at(0) => self.parse_simple_name(),
            _ => None,
        }
    }

    /// Skip to and past the `)` closing a parenthesized construct
    fn skip_until_close(&mut self) {
        let mut depth = 0usize;
        while !self.at_statement_end() {
            if self.is_symbol("(") {
                depth += 1;
            } else if self.is_symbol(")") {
                if depth == 0 {
                    self.bump();
                    return;
                }
                depth -= 1;
            }
            self.bump();
        }
    }

    fn parse_lambda(&mut self, start: usize) -> Option<NodeId> {
        let is_function = self.is_word("Function");
        self.bump();
        let mut children = Vec::new();
        if self.is_symbol("(") {
            children.push(self.parse_parameter_list());
        }
        if self.is_word("As") {
            children.push(self.parse_as_clause());
        }
        if self.at_statement_end() {
            let end_word = if is_function { "Function" } else { "Sub" };
            children.extend(self.parse_statements_until(end_word, false));
            return Some(self.node(VbKind::MultiLineLambdaExpression, start, children));
        }
        let body = if is_function {
            self.parse_expression()
        } else {
            self.parse_statement()
        };
        children.extend(body);
        Some(self.node(VbKind::SingleLineLambdaExpression, start, children))
    }

    fn parse_interpolated_string(&mut self) -> NodeId {
        let token = self.bump();
        let text = token.text(self.source);
        let bytes = text.as_bytes();
        let mut holes = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'{' {
                if bytes.get(i + 1) == Some(&b'{') {
                    i += 2;
                    continue;
                }
                let open = i;
                let mut depth = 0usize;
                while i < bytes.len() {
                    match bytes[i] {
                        b'{' => depth += 1,
                        b'}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    i += 1;
                }
                let close = (i + 1).min(bytes.len());
                holes.push(
                    self.builder
                        .add(VbKind::Interpolation, token.start + open, token.start + close, Vec::new()),
                );
            }
            i += 1;
        }
        self.builder
            .add(VbKind::InterpolatedStringExpression, token.start, token.end, holes)
    }

    /// `New T(args)`, `New T With {...}`, `New T From {...}`, `New T() {...}`
    fn parse_new(&mut self) -> Option<NodeId> {
        let start = self.peek().start;
        self.bump();
        if self.is_word("With") {
            self.bump();
            let initializer = self.parse_object_member_initializer();
            return Some(self.node(VbKind::AnonymousObjectCreationExpression, start, vec![initializer]));
        }
        let mut children = vec![self.parse_type_name()?];
        if self.is_symbol("(") {
            children.push(self.parse_argument_list());
        }
        if self.is_symbol("{") {
            children.push(self.parse_collection_initializer());
            return Some(self.node(VbKind::ArrayCreationExpression, start, children));
        }
        if self.eat_word("With") {
            children.push(self.parse_object_member_initializer());
        } else if self.eat_word("From") {
            let init_start = self.peek().start;
            let collection = self.parse_collection_initializer();
            children.push(self.node(VbKind::ObjectCollectionInitializer, init_start, vec![collection]));
        }
        Some(self.node(VbKind::ObjectCreationExpression, start, children))
    }

    fn parse_object_member_initializer(&mut self) -> NodeId {
        let start = self.peek().start;
        let mut members = Vec::new();
        if !self.eat_symbol("{") {
            return self.node(VbKind::ObjectMemberInitializer, start, members);
        }
        loop {
            if self.eat_symbol("}") || self.at_statement_end() {
                break;
            }
            let before = self.pos;
            let member_start = self.peek().start;
            self.eat_word("Key");
            if self.is_symbol(".") && self.is_name_token_at(1) {
                self.bump();
                let name = self.leaf(VbKind::IdentifierName);
                let mut children = vec![name];
                if self.eat_symbol("=") {
                    children.extend(self.parse_expression());
                }
                members.push(self.node(VbKind::NamedFieldInitializer, member_start, children));
            } else if let Some(expression) = self.parse_expression() {
                members.push(expression);
            }
            if self.eat_symbol(",") {
                continue;
            }
            if self.pos == before {
                self.bump();
            }
        }
        self.node(VbKind::ObjectMemberInitializer, start, members)
    }

    fn parse_collection_initializer(&mut self) -> NodeId {
        let start = self.peek().start;
        self.bump();
        let mut elements = Vec::new();
        loop {
            if self.eat_symbol("}") || self.at_statement_end() {
                break;
            }
            let before = self.pos;
            elements.extend(self.parse_expression());
            if self.eat_symbol(",") {
                continue;
            }
            if self.pos == before {
                self.bump();
            }
        }
        self.node(VbKind::CollectionInitializer, start, elements)
    }

    fn parse_argument_list(&mut self) -> NodeId {
        let start = self.peek().start;
        self.bump();
        let mut arguments = Vec::new();
        if self.eat_symbol(")") {
            return self.node(VbKind::ArgumentList, start, arguments);
        }
        loop {
            let position = self.peek().start;
            if self.is_symbol(",") || self.is_symbol(")") {
                arguments.push(self.builder.add(VbKind::OmittedArgument, position, position, Vec::new()));
            } else {
                let before = self.pos;
                arguments.extend(self.parse_argument());
                if self.pos == before {
                    // Unparseable argument: skip to the next separator
                    while !self.is_symbol(",") && !self.is_symbol(")") && !self.at_statement_end() {
                        self.bump();
                    }
                }
            }
            if self.eat_symbol(",") {
                continue;
            }
            if self.eat_symbol(")") || self.at_statement_end() {
                break;
            }
            // Stray tokens before the separator
            self.bump();
        }
        self.node(VbKind::ArgumentList, start, arguments)
    }

    fn parse_argument(&mut self) -> Option<NodeId> {
        let start = self.peek().start;
        let mut children = Vec::new();
        if self.is_name_token_at(0) && self.is_symbol_at(1, ":=") {
            let name = self.leaf(VbKind::IdentifierName);
            self.bump();
            children.push(self.node(VbKind::NameColonEquals, start, vec![name]));
        }
        children.push(self.parse_expression()?);
        if self.eat_word("To") {
            children.extend(self.parse_expression());
        }
        Some(self.node(VbKind::SimpleArgument, start, children))
    }

    // =========================================================================
    // Names and types
    // =========================================================================

    fn parse_simple_name(&mut self) -> Option<NodeId> {
        if !self.is_name_token_at(0) {
            return None;
        }
        let start = self.peek().start;
        self.bump();
        if self.is_symbol("(") && self.is_word_at(1, "Of") {
            let arguments = self.parse_type_argument_list();
            return Some(self.node(VbKind::GenericName, start, vec![arguments]));
        }
        Some(self.node(VbKind::IdentifierName, start, Vec::new()))
    }

    fn parse_type_argument_list(&mut self) -> NodeId {
        let start = self.peek().start;
        self.bump();
        self.bump();
        let mut types = Vec::new();
        loop {
            let before = self.pos;
            types.extend(self.parse_type());
            if self.eat_symbol(",") {
                continue;
            }
            if self.eat_symbol(")") || self.at_statement_end() {
                break;
            }
            if self.pos == before {
                self.bump();
            }
        }
        self.node(VbKind::TypeArgumentList, start, types)
    }

    /// Dotted, possibly generic, type or namespace name
    fn parse_type_name(&mut self) -> Option<NodeId> {
        let start = self.peek().start;
        let mut name = self.parse_simple_name()?;
        while self.is_symbol(".") && self.is_name_token_at(1) {
            self.bump();
            let Some(right) = self.parse_simple_name() else {
                break;
            };
            name = self.node(VbKind::QualifiedName, start, vec![name, right]);
        }
        Some(name)
    }

    /// A type name with optional array rank and nullable suffixes
    fn parse_type(&mut self) -> Option<NodeId> {
        let start = self.peek().start;
        let mut ty = self.parse_type_name()?;
        while self.is_symbol("(") && (self.is_symbol_at(1, ")") || self.is_symbol_at(1, ",")) {
            self.skip_balanced("(", ")");
            ty = self.node(VbKind::ArrayType, start, vec![ty]);
        }
        if self.eat_symbol("?") {
            ty = self.node(VbKind::NullableType, start, vec![ty]);
        }
        Some(ty)
    }
}
