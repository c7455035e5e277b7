//! Visual Basic front end
//!
//! No tree-sitter grammar covers Visual Basic, so this front end carries its
//! own lexer and an error-tolerant recursive-descent parser producing an
//! arena tree whose node kinds follow Roslyn's names.

mod helper;
mod lexer;
mod parser;
mod tree;

pub use helper::VbSyntaxHelper;
pub use tree::{NodeId, VbKind, VbNode, VbTree};

use crate::error::Result;

impl VbTree {
    /// Parse a Visual Basic source file
    ///
    /// Parsing is error tolerant; malformed statements become opaque nodes.
    pub fn parse(source: &str) -> Result<Self> {
        Ok(parser::parse(source))
    }

    pub fn helper(&self) -> VbSyntaxHelper<'_> {
        VbSyntaxHelper::new(self)
    }
}
