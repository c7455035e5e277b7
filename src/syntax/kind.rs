//! Reduced, syntax-agnostic views of native syntax nodes

use std::ops::{BitOr, BitOrAssign};

/// The structural shapes the engine cares about
///
/// Each front end maps its own node kinds onto this set. Native kinds that
/// have no counterpart map to nothing and stay invisible to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxNodeKind {
    /// Simple `=` assignment
    Assignment,
    /// A declared variable, with or without an initializer
    VariableBinding,
    /// `a.b`
    MemberAccess,
    /// `f(...)`
    Invocation,
    /// `new T(...)` / `New T(...)`
    ObjectConstruction,
    /// `Name = value` inside an object-initializer block
    ObjectInitializerMember,
    Attribute,
    AttributeArgument,
    /// A parameter carrying a default value
    ParameterDefault,
}

/// Declarations the binder and the suppression logic need to recognize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Namespace,
    Type,
    Method,
    Constructor,
    Property,
    Field,
    Variable,
    Parameter,
}

impl DeclarationKind {
    /// Method-like declarations own parameters and a body
    pub fn is_method_like(&self) -> bool {
        matches!(self, Self::Method | Self::Constructor)
    }
}

/// Kind of a literal token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    String,
    Character,
    Numeric,
    Boolean,
    Date,
    /// `null` / `Nothing`
    Null,
}

/// Reduced expression shape used for literal evaluation and receiver typing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionShape<N> {
    Literal(LiteralKind),
    Identifier,
    /// `this` / `Me` and friends
    SelfReference,
    MemberAccess,
    Invocation,
    ObjectConstruction,
    ArrayConstruction,
    /// String concatenation or addition, with both operands
    Concatenation(N, N),
    Parenthesized(N),
    /// A cast or conversion of the inner expression
    Conversion(N),
    Other,
}

/// Call kinds accepted by argument extraction
///
/// Flags combine with `|`. A filter that matches neither an invocation nor a
/// construction simply yields no arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallKind(u8);

impl CallKind {
    pub const NONE: CallKind = CallKind(0);
    pub const INVOCATION: CallKind = CallKind(0b01);
    pub const OBJECT_CREATION: CallKind = CallKind(0b10);
    pub const ANY: CallKind = CallKind(0b11);

    pub fn contains(self, other: CallKind) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for CallKind {
    type Output = CallKind;

    fn bitor(self, rhs: CallKind) -> CallKind {
        CallKind(self.0 | rhs.0)
    }
}

impl BitOrAssign for CallKind {
    fn bitor_assign(&mut self, rhs: CallKind) {
        self.0 |= rhs.0;
    }
}

/// An `using` / `Imports` directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDirective {
    /// Alias introduced by `using A = X.Y;` / `Imports A = X.Y`
    pub alias: Option<String>,
    /// Imported namespace or aliased type
    pub target: String,
}

impl ImportDirective {
    pub fn namespace(target: impl Into<String>) -> Self {
        Self {
            alias: None,
            target: target.into(),
        }
    }

    pub fn alias(alias: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            target: target.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_kind_combination() {
        let both = CallKind::INVOCATION | CallKind::OBJECT_CREATION;
        assert_eq!(both, CallKind::ANY);
        assert!(both.contains(CallKind::INVOCATION));
        assert!(both.contains(CallKind::OBJECT_CREATION));
        assert!(!CallKind::INVOCATION.contains(CallKind::OBJECT_CREATION));
    }

    #[test]
    fn test_call_kind_none_matches_nothing() {
        assert!(CallKind::NONE.is_empty());
        assert!(!CallKind::NONE.contains(CallKind::INVOCATION));
        assert!(!CallKind::ANY.contains(CallKind::NONE));
    }

    #[test]
    fn test_call_kind_or_assign() {
        let mut kind = CallKind::NONE;
        kind |= CallKind::OBJECT_CREATION;
        assert!(kind.contains(CallKind::OBJECT_CREATION));
        assert!(!kind.contains(CallKind::INVOCATION));
    }
}
