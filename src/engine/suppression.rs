//! In-source suppression through `SuppressMessage` attributes
//!
//! A diagnostic raised inside a method, constructor, property or type that
//! carries `[SuppressMessage("Category", "SCS0015:Description")]` (or the
//! VB `<SuppressMessage(...)>` form) is dropped. The id may also be given as
//! the `CheckId` named argument.

use crate::syntax::{DeclarationKind, SyntaxHelper};

const SUPPRESS_ATTRIBUTES: &[&str] = &["SuppressMessage", "SuppressMessageAttribute"];

const CHECK_ID_ARGUMENT: &str = "CheckId";

/// True when a declaration enclosing `node` suppresses `rule_id`
pub fn is_suppressed<H: SyntaxHelper>(helper: &H, node: H::Node, rule_id: &str) -> bool {
    helper
        .ancestors_and_self(node)
        .into_iter()
        .filter(|&n| {
            matches!(
                helper.declaration_kind(n),
                Some(
                    DeclarationKind::Method
                        | DeclarationKind::Constructor
                        | DeclarationKind::Property
                        | DeclarationKind::Type
                )
            )
        })
        .any(|declaration| suppressed_ids(helper, declaration).iter().any(|id| id == rule_id))
}

/// Rule ids suppressed by the attributes of one declaration
pub fn suppressed_ids<H: SyntaxHelper>(helper: &H, declaration: H::Node) -> Vec<String> {
    let mut ids = Vec::new();

    for attribute in helper.declaration_attributes(declaration) {
        if !is_suppress_attribute(helper, attribute) {
            continue;
        }

        let mut positional = 0;
        for argument in helper.attribute_arguments(attribute) {
            let Some(expression) = helper.attribute_argument_expression(argument) else {
                continue;
            };
            let name = helper
                .attribute_argument_name(argument)
                .and_then(|n| helper.name_text(n));

            let is_check_id = match &name {
                Some(name) => helper.names_equal(name, CHECK_ID_ARGUMENT),
                None => {
                    positional += 1;
                    positional == 2
                }
            };
            if !is_check_id {
                continue;
            }

            if let Some(id) = helper.string_literal_value(expression).as_deref().and_then(check_id) {
                ids.push(id);
            }
        }
    }

    ids
}

fn is_suppress_attribute<H: SyntaxHelper>(helper: &H, attribute: H::Node) -> bool {
    let Some(name) = helper.attribute_name(attribute).and_then(|n| helper.name_text(n)) else {
        return false;
    };
    let short = name.rsplit('.').next().unwrap_or(&name);
    SUPPRESS_ATTRIBUTES.iter().any(|s| helper.names_equal(short, s))
}

/// Rule id part of a check id such as `SCS0015:HardcodedPassword`
fn check_id(value: &str) -> Option<String> {
    let id = value.split(':').next().unwrap_or(value).trim();
    (!id.is_empty()).then(|| id.to_string())
}
