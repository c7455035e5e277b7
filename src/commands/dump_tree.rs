//! Dump-tree command - print the reduced-kind view of one file
//!
//! Useful when writing catalog rows: it shows which nodes the engine sees as
//! calls, constructions, assignments and declarations.

use serde_json::json;

use crate::cli::DumpTreeArgs;
use crate::error::Result;
use crate::frontend::{dump_source, read_source, DumpNode};
use crate::lang::SurfaceSyntax;

use super::{render, CommandContext};

/// Run the dump-tree command
pub fn run_dump_tree(args: &DumpTreeArgs, ctx: &CommandContext) -> Result<String> {
    let syntax = SurfaceSyntax::from_path(&args.file)?;
    let source = read_source(&args.file)?;

    let mut rows = dump_source(&source, syntax)?;
    if args.reduced_only {
        rows.retain(|r| r.kind.is_some() || r.declaration.is_some());
    }

    let value = json!({
        "_type": "syntax_tree",
        "file": args.file.display().to_string(),
        "syntax": syntax.name(),
        "nodes": rows,
    });

    Ok(render(ctx, &value, || {
        let mut output = format!("{} ({})\n", args.file.display(), syntax.name());
        for row in &rows {
            output.push_str(&format_row(row, args.reduced_only));
        }
        output
    }))
}

fn format_row(row: &DumpNode, flat: bool) -> String {
    let indent = if flat { String::new() } else { "  ".repeat(row.depth) };
    let mut tags = Vec::new();
    if let Some(kind) = &row.kind {
        tags.push(kind.as_str());
    }
    if let Some(declaration) = &row.declaration {
        tags.push(declaration.as_str());
    }
    let tags = if tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", tags.join(", "))
    };
    format!(
        "{}{}{} @{}:{}  {}\n",
        indent, row.native_kind, tags, row.line, row.column, row.text
    )
}
