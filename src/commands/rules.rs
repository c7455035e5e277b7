//! Rules command - list the effective rule catalog

use serde_json::json;

use crate::cli::RulesArgs;
use crate::error::Result;
use crate::rules::{RuleCatalog, RuleCatalogEntry};

use super::{banner, render, CommandContext};

/// Run the rules command
pub fn run_rules(args: &RulesArgs, ctx: &CommandContext) -> Result<String> {
    let catalog = RuleCatalog::from_config(&ctx.config.rules)?;

    let entries: Vec<&RuleCatalogEntry> = catalog
        .entries()
        .iter()
        .filter(|e| args.id.as_deref().map_or(true, |id| e.id.eq_ignore_ascii_case(id)))
        .collect();

    let value = json!({
        "_type": "rules",
        "rules": entries.iter().map(|e| json!({
            "id": e.id,
            "severity": e.severity.as_str(),
            "type": e.type_name,
            "member": e.member,
            "parameter": e.parameter,
            "message": e.message,
        })).collect::<Vec<_>>(),
        "count": entries.len(),
    });

    Ok(render(ctx, &value, || {
        let mut output = banner("RULE CATALOG");
        if entries.is_empty() {
            output.push_str("No rules enabled.\n");
            return output;
        }

        let width = entries
            .iter()
            .map(|e| e.type_name.len() + e.member.len() + 1)
            .max()
            .unwrap_or(0);
        for e in &entries {
            let target = format!("{}.{}", e.type_name, e.member);
            output.push_str(&format!(
                "{:<8} {:<7} {:<width$}  arg {}\n",
                e.id,
                e.severity.as_str(),
                target,
                e.parameter,
                width = width
            ));
        }
        output.push_str(&format!("\n{} row(s)\n", entries.len()));
        output
    }))
}
