//! Literal evaluation
//!
//! An expression counts as a literal when its value is fixed in source:
//! a literal token, a parenthesized or converted literal, or a
//! concatenation whose operands are all literals. `null` / `Nothing` is not
//! credential material and does not count. Identifiers are never followed
//! back to their declarations.

use crate::syntax::{ExpressionShape, LiteralKind, SyntaxHelper};

/// Nesting beyond this is treated as non-literal
pub const MAX_LITERAL_DEPTH: usize = 256;

/// True when `node` evaluates to a compile-time literal
pub fn is_literal<H: SyntaxHelper>(helper: &H, node: H::Node) -> bool {
    literal_at(helper, node, 0)
}

fn literal_at<H: SyntaxHelper>(helper: &H, node: H::Node, depth: usize) -> bool {
    if depth > MAX_LITERAL_DEPTH {
        return false;
    }

    match helper.expression_shape(node) {
        ExpressionShape::Literal(LiteralKind::Null) => false,
        ExpressionShape::Literal(_) => true,
        ExpressionShape::Parenthesized(inner) | ExpressionShape::Conversion(inner) => {
            literal_at(helper, inner, depth + 1)
        }
        ExpressionShape::Concatenation(left, right) => {
            literal_at(helper, left, depth + 1) && literal_at(helper, right, depth + 1)
        }
        ExpressionShape::Identifier
        | ExpressionShape::SelfReference
        | ExpressionShape::MemberAccess
        | ExpressionShape::Invocation
        | ExpressionShape::ObjectConstruction
        | ExpressionShape::ArrayConstruction
        | ExpressionShape::Other => false,
    }
}
