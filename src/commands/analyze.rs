//! Analyze command implementation
//!
//! Collects source files, analyzes them in parallel on a rayon pool and
//! renders the merged, ordered diagnostics.

use std::path::Path;

use rayon::prelude::*;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::cli::AnalyzeArgs;
use crate::diagnostic::{sort_diagnostics, DiagnosticResult, Severity};
use crate::engine::{Analyzer, CancellationToken};
use crate::error::{Result, ScanError};
use crate::frontend::{analyze_source, read_source};
use crate::fs_utils::{collect_source_files, display_path, WalkOptions};
use crate::lang::SurfaceSyntax;
use crate::rules::RuleCatalog;

use super::{banner, render, CommandContext};

/// A file that could not be analyzed
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub file: String,
    pub error: String,
}

/// Result of an analyze run
#[derive(Debug, Clone)]
pub struct AnalyzeOutcome {
    /// Rendered report
    pub output: String,
    pub diagnostics: Vec<DiagnosticResult>,
    pub failures: Vec<FileFailure>,
    /// A diagnostic reached the `--fail-on` threshold
    pub threshold_reached: bool,
}

/// Run the analyze command
pub fn run_analyze(args: &AnalyzeArgs, ctx: &CommandContext) -> Result<AnalyzeOutcome> {
    run_analyze_with_cancellation(args, ctx, CancellationToken::new())
}

/// Run the analyze command with an externally controlled cancellation token
pub fn run_analyze_with_cancellation(
    args: &AnalyzeArgs,
    ctx: &CommandContext,
    token: CancellationToken,
) -> Result<AnalyzeOutcome> {
    let catalog = RuleCatalog::from_config(&ctx.config.rules)?;
    debug!(rows = catalog.len(), "rule catalog loaded");

    let mut exclude = ctx.config.scan.exclude.clone();
    exclude.extend(args.exclude.iter().cloned());
    let walk = WalkOptions {
        exclude,
        max_depth: args.max_depth.or(ctx.config.scan.max_depth),
    };
    let files = collect_source_files(&args.paths, &walk)?;

    let jobs = args.jobs.or(ctx.config.scan.jobs).unwrap_or(0);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| ScanError::Config {
            message: format!("failed to start worker pool: {}", e),
        })?;

    let analyzer = Analyzer::new(&catalog).with_cancellation(token);
    let roots = &args.paths;

    let results: Vec<(String, Result<Vec<DiagnosticResult>>)> = pool.install(|| {
        files
            .par_iter()
            .map(|path| {
                let label = display_path(path, roots);
                let result = analyze_path(path, &label, &analyzer);
                (label, result)
            })
            .collect()
    });

    let mut diagnostics = Vec::new();
    let mut failures = Vec::new();
    for (file, result) in results {
        match result {
            Ok(found) => diagnostics.extend(found),
            Err(ScanError::Cancelled) => return Err(ScanError::Cancelled),
            Err(e) => {
                warn!(file = %file, error = %e, "file skipped");
                failures.push(FileFailure {
                    file,
                    error: e.to_string(),
                });
            }
        }
    }
    sort_diagnostics(&mut diagnostics);

    info!(
        files = files.len(),
        failed = failures.len(),
        diagnostics = diagnostics.len(),
        "analysis complete"
    );

    let threshold_reached = args
        .fail_on
        .is_some_and(|level| diagnostics.iter().any(|d| d.severity >= level.severity()));

    let output = render_report(ctx, files.len(), &diagnostics, &failures);

    Ok(AnalyzeOutcome {
        output,
        diagnostics,
        failures,
        threshold_reached,
    })
}

fn analyze_path(path: &Path, label: &str, analyzer: &Analyzer<'_>) -> Result<Vec<DiagnosticResult>> {
    let syntax = SurfaceSyntax::from_path(path)?;
    let source = read_source(path)?;
    analyze_source(&source, syntax, label, analyzer)
}

/// Count diagnostics per severity, highest first
fn severity_counts(diagnostics: &[DiagnosticResult]) -> Vec<(Severity, usize)> {
    [Severity::Error, Severity::Warning, Severity::Info]
        .into_iter()
        .map(|s| (s, diagnostics.iter().filter(|d| d.severity == s).count()))
        .collect()
}

fn render_report(
    ctx: &CommandContext,
    files: usize,
    diagnostics: &[DiagnosticResult],
    failures: &[FileFailure],
) -> String {
    let counts = severity_counts(diagnostics);

    let value = json!({
        "_type": "analysis",
        "files_analyzed": files - failures.len(),
        "diagnostics": diagnostics.iter().map(|d| json!({
            "id": d.id,
            "severity": d.severity.as_str(),
            "file": d.file,
            "line": d.location.line,
            "column": d.location.column,
            "end_line": d.location.end_line,
            "end_column": d.location.end_column,
            "message": d.message,
            "type": d.context.enclosing_type,
            "member": d.context.member,
        })).collect::<Vec<_>>(),
        "count": diagnostics.len(),
        "by_severity": counts
            .iter()
            .map(|(s, n)| (s.as_str().to_string(), json!(n)))
            .collect::<serde_json::Map<_, _>>(),
        "failures": failures,
    });

    render(ctx, &value, || {
        let mut output = String::new();

        if ctx.verbose {
            output.push_str(&banner("SECURITY ANALYSIS"));
        }

        for d in diagnostics {
            output.push_str(&format!("{}\n", d));
            if ctx.verbose {
                if let Some(member) = &d.context.member {
                    let owner = d.context.enclosing_type.as_deref().unwrap_or("<global>");
                    output.push_str(&format!("    in {}.{}\n", owner, member));
                }
            }
        }

        for f in failures {
            output.push_str(&format!("{}: skipped: {}\n", f.file, f.error));
        }

        if !diagnostics.is_empty() || !failures.is_empty() {
            output.push('\n');
        }
        let summary: Vec<String> = counts
            .iter()
            .map(|(s, n)| format!("{} {}", n, s))
            .collect();
        output.push_str(&format!(
            "{} file(s) analyzed, {} diagnostic(s) ({})\n",
            files - failures.len(),
            diagnostics.len(),
            summary.join(", ")
        ));
        output
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{FailOn, OutputFormat};
    use crate::config::SinkConfig;
    use std::fs;
    use tempfile::TempDir;

    const CS_SOURCE: &str = r#"
using System.Net;
class Login {
    void Connect() { var c = new NetworkCredential("admin", "secret"); }
}
"#;

    const VB_SOURCE: &str = "Imports System.Security.Cryptography\nModule Keys\n  Sub Derive()\n    Dim k As New Rfc2898DeriveBytes(\"pw\", 16)\n  End Sub\nEnd Module\n";

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/Login.cs"), CS_SOURCE).unwrap();
        fs::write(dir.path().join("src/Keys.vb"), VB_SOURCE).unwrap();
        fs::write(dir.path().join("src/Clean.cs"), "class Clean { }").unwrap();
        dir
    }

    #[test]
    fn test_analyze_directory() {
        let dir = project();
        let args = AnalyzeArgs::for_paths(vec![dir.path().to_path_buf()]);
        let outcome = run_analyze(&args, &CommandContext::default()).unwrap();

        assert_eq!(outcome.diagnostics.len(), 2);
        assert!(outcome.failures.is_empty());
        assert!(!outcome.threshold_reached);
        let files: Vec<_> = outcome.diagnostics.iter().map(|d| d.file.as_str()).collect();
        assert_eq!(files, vec!["src/Keys.vb", "src/Login.cs"]);
        assert!(outcome.output.contains("src/Login.cs:4:"));
        assert!(outcome.output.contains("3 file(s) analyzed, 2 diagnostic(s)"));
    }

    #[test]
    fn test_fail_on_threshold() {
        let dir = project();
        let mut args = AnalyzeArgs::for_paths(vec![dir.path().to_path_buf()]);
        args.fail_on = Some(FailOn::Warning);
        assert!(run_analyze(&args, &CommandContext::default()).unwrap().threshold_reached);

        args.fail_on = Some(FailOn::Error);
        assert!(!run_analyze(&args, &CommandContext::default()).unwrap().threshold_reached);
    }

    #[test]
    fn test_config_overrides_severity_and_disables() {
        let dir = project();
        let args = AnalyzeArgs::for_paths(vec![dir.path().to_path_buf()]);

        let mut ctx = CommandContext::default();
        ctx.config.rules.severity.insert("SCS0015".into(), "error".into());
        let outcome = run_analyze(&args, &ctx).unwrap();
        assert!(outcome.diagnostics.iter().all(|d| d.severity == Severity::Error));

        ctx.config.rules.disabled.push("SCS0015".into());
        assert!(run_analyze(&args, &ctx).unwrap().diagnostics.is_empty());
    }

    #[test]
    fn test_custom_sink() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("Vault.cs"),
            r#"
namespace MyCorp {
    class Vault { public Vault(string token) { } }
    class Use { void M() { var v = new Vault("t0k3n"); } }
}
"#,
        )
        .unwrap();

        let mut ctx = CommandContext::default();
        ctx.config.rules.sinks.push(SinkConfig {
            type_name: "MyCorp.Vault".into(),
            member: ".ctor".into(),
            parameter: 0,
            id: "CORP001".into(),
            severity: Some("error".into()),
            message: Some("Hardcoded vault token".into()),
        });
        let outcome = run_analyze(&AnalyzeArgs::for_paths(vec![dir.path().to_path_buf()]), &ctx).unwrap();
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].id, "CORP001");
        assert_eq!(outcome.diagnostics[0].message, "Hardcoded vault token");
    }

    #[test]
    fn test_json_output() {
        let dir = project();
        let ctx = CommandContext {
            format: OutputFormat::Json,
            ..CommandContext::default()
        };
        let outcome = run_analyze(&AnalyzeArgs::for_paths(vec![dir.path().to_path_buf()]), &ctx).unwrap();
        let value: serde_json::Value = serde_json::from_str(&outcome.output).unwrap();
        assert_eq!(value["_type"], "analysis");
        assert_eq!(value["count"], 2);
        assert_eq!(value["by_severity"]["warning"], 2);
        assert_eq!(value["diagnostics"][0]["id"], "SCS0015");
    }

    #[test]
    fn test_cancelled_run() {
        let dir = project();
        let token = CancellationToken::new();
        token.cancel();
        let result = run_analyze_with_cancellation(
            &AnalyzeArgs::for_paths(vec![dir.path().to_path_buf()]),
            &CommandContext::default(),
            token,
        );
        assert!(matches!(result, Err(ScanError::Cancelled)));
    }

    #[test]
    fn test_missing_path() {
        let dir = TempDir::new().unwrap();
        let result = run_analyze(
            &AnalyzeArgs::for_paths(vec![dir.path().join("absent")]),
            &CommandContext::default(),
        );
        assert!(matches!(result, Err(ScanError::FileNotFound { .. })));
    }
}
