//! Front ends and the per-file analysis entry points
//!
//! Each surface syntax has its own tree type and [`SyntaxHelper`]
//! implementation. The functions here pick the front end once per file,
//! build the binder over it and hand both to the engine.

pub mod csharp;
pub mod vb;

use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::diagnostic::DiagnosticResult;
use crate::engine::Analyzer;
use crate::error::{Result, ScanError};
use crate::lang::SurfaceSyntax;
use crate::semantic::Binder;
use crate::syntax::SyntaxHelper;

use csharp::CSharpTree;
use vb::VbTree;

/// Longest node text kept in a tree dump
const DUMP_TEXT_LIMIT: usize = 60;

/// Analyze source text in the given syntax
pub fn analyze_source(
    source: &str,
    syntax: SurfaceSyntax,
    file: &str,
    analyzer: &Analyzer<'_>,
) -> Result<Vec<DiagnosticResult>> {
    match syntax {
        SurfaceSyntax::CSharp => {
            let tree = CSharpTree::parse(source)?;
            if tree.has_errors() {
                debug!(file, "C# source contains syntax errors; analyzing the recovered tree");
            }
            let helper = tree.helper();
            let binder = Binder::new(&helper);
            analyzer.analyze(&helper, &binder, file)
        }
        SurfaceSyntax::VisualBasic => {
            let tree = VbTree::parse(source)?;
            let helper = tree.helper();
            let binder = Binder::new(&helper);
            analyzer.analyze(&helper, &binder, file)
        }
    }
}

/// Read and analyze one file, choosing the front end from its extension
pub fn analyze_file(path: &Path, analyzer: &Analyzer<'_>) -> Result<Vec<DiagnosticResult>> {
    let syntax = SurfaceSyntax::from_path(path)?;
    let source = read_source(path)?;
    analyze_source(&source, syntax, &path.display().to_string(), analyzer)
}

/// Read a source file, mapping a missing file to [`ScanError::FileNotFound`]
pub fn read_source(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(ScanError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    fs::read_to_string(path).map_err(|e| {
        warn!(path = %path.display(), error = %e, "unreadable source file");
        ScanError::Io(e)
    })
}

/// One row of a reduced-kind tree dump
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DumpNode {
    pub depth: usize,
    pub native_kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declaration: Option<String>,
    pub line: usize,
    pub column: usize,
    pub text: String,
}

/// Reduced-kind view of a source file, in document order
pub fn dump_source(source: &str, syntax: SurfaceSyntax) -> Result<Vec<DumpNode>> {
    match syntax {
        SurfaceSyntax::CSharp => {
            let tree = CSharpTree::parse(source)?;
            Ok(dump_tree(&tree.helper()))
        }
        SurfaceSyntax::VisualBasic => {
            let tree = VbTree::parse(source)?;
            Ok(dump_tree(&tree.helper()))
        }
    }
}

/// Reduced-kind view of the tree behind `helper`
pub fn dump_tree<H: SyntaxHelper>(helper: &H) -> Vec<DumpNode> {
    let mut rows = Vec::new();
    let mut stack = vec![(helper.root(), 0usize)];

    while let Some((node, depth)) = stack.pop() {
        let location = helper.location(node);
        rows.push(DumpNode {
            depth,
            native_kind: helper.native_kind(node),
            kind: helper.kind(node).map(|k| format!("{:?}", k)),
            declaration: helper.declaration_kind(node).map(|k| format!("{:?}", k)),
            line: location.line,
            column: location.column,
            text: snippet(helper.text(node)),
        });
        for child in helper.children(node).into_iter().rev() {
            stack.push((child, depth + 1));
        }
    }

    rows
}

fn snippet(text: &str) -> String {
    let line = text.lines().next().unwrap_or("").trim();
    if line.chars().count() > DUMP_TEXT_LIMIT {
        let cut: String = line.chars().take(DUMP_TEXT_LIMIT).collect();
        format!("{}…", cut)
    } else if text.trim().lines().nth(1).is_some() {
        format!("{}…", line)
    } else {
        line.to_string()
    }
}
