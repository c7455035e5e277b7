//! Symbols and the semantic-model boundary
//!
//! The engine treats symbol resolution as an injected capability: anything
//! implementing [`SemanticModel`] for a front end's node type can drive it.
//! [`Binder`] is the model shipped with the crate; tests are free to use
//! canned resolvers instead.

pub mod binder;
pub mod reference;

pub use binder::Binder;
pub use reference::{find_framework_type, ReferenceMethod, ReferenceType, FRAMEWORK_TYPES};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Metadata name of instance constructors
pub const CONSTRUCTOR_NAME: &str = ".ctor";

/// A named type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeSymbol {
    /// Dotted namespace, empty for the global namespace
    pub namespace: String,
    /// Type name; nested types are joined with `.`
    pub name: String,
}

impl TypeSymbol {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Build from a fully qualified name, splitting at the last `.`
    pub fn from_full_name(full_name: &str) -> Self {
        match full_name.rsplit_once('.') {
            Some((ns, name)) => Self::new(ns, name),
            None => Self::new("", full_name),
        }
    }

    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

impl fmt::Display for TypeSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MethodKind {
    Constructor,
    Ordinary,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterSymbol {
    pub name: String,
    pub has_default: bool,
}

impl ParameterSymbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            has_default: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodSymbol {
    pub containing_type: TypeSymbol,
    /// Member name; constructors use [`CONSTRUCTOR_NAME`]
    pub name: String,
    pub kind: MethodKind,
    pub parameters: Vec<ParameterSymbol>,
}

impl MethodSymbol {
    pub fn constructor(containing_type: TypeSymbol, parameters: Vec<ParameterSymbol>) -> Self {
        Self {
            containing_type,
            name: CONSTRUCTOR_NAME.to_string(),
            kind: MethodKind::Constructor,
            parameters,
        }
    }

    pub fn ordinary(
        containing_type: TypeSymbol,
        name: impl Into<String>,
        parameters: Vec<ParameterSymbol>,
    ) -> Self {
        Self {
            containing_type,
            name: name.into(),
            kind: MethodKind::Ordinary,
            parameters,
        }
    }

    pub fn parameter_name(&self, index: usize) -> Option<&str> {
        self.parameters.get(index).map(|p| p.name.as_str())
    }

    /// Human-readable name, e.g. `System.Net.NetworkCredential..ctor`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.containing_type.full_name(), self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldSymbol {
    pub containing_type: TypeSymbol,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertySymbol {
    pub containing_type: TypeSymbol,
    pub name: String,
}

impl PropertySymbol {
    /// Metadata name of the property's setter, e.g. `set_Password`
    pub fn setter_name(&self) -> String {
        format!("set_{}", self.name)
    }
}

/// Anything a semantic model can resolve a node to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    Method(MethodSymbol),
    Type(TypeSymbol),
    Field(FieldSymbol),
    Property(PropertySymbol),
}

impl Symbol {
    pub fn as_method(&self) -> Option<&MethodSymbol> {
        match self {
            Symbol::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_method(self) -> Option<MethodSymbol> {
        match self {
            Symbol::Method(m) => Some(m),
            _ => None,
        }
    }

    /// Short display name used in diagnostic context
    pub fn display_name(&self) -> String {
        match self {
            Symbol::Method(m) => m.qualified_name(),
            Symbol::Type(t) => t.full_name(),
            Symbol::Field(f) => format!("{}.{}", f.containing_type.full_name(), f.name),
            Symbol::Property(p) => format!("{}.{}", p.containing_type.full_name(), p.name),
        }
    }
}

/// Symbol information for the nodes of one compilation unit
///
/// Every method returns `None` when resolution fails; failing to resolve is
/// an expected outcome, not an error.
pub trait SemanticModel<N> {
    /// Symbol referenced by an expression, call, construction or type name
    fn symbol_info(&self, node: N) -> Option<Symbol>;

    /// Symbol declared by a declaration node
    fn declared_symbol(&self, declaration: N) -> Option<Symbol>;

    /// Type declared by a type declaration node
    fn declared_type(&self, declaration: N) -> Option<TypeSymbol>;
}
