//! Cross-syntax parity for the hardcoded password rule

use secscan_engine::{analyze_source, Analyzer, DiagnosticResult, RuleCatalog, Severity, SurfaceSyntax};

use crate::common::fixtures::*;
use crate::common::{assert_single, summarize};

fn analyze(source: &str, syntax: SurfaceSyntax) -> Vec<DiagnosticResult> {
    let file = match syntax {
        SurfaceSyntax::CSharp => "Test.cs",
        SurfaceSyntax::VisualBasic => "Test.vb",
    };
    analyze_source(source, syntax, file, &Analyzer::new(RuleCatalog::builtin())).unwrap()
}

/// Same ids and severities in the same order; lines differ between syntaxes
fn assert_parity(csharp: &str, vb: &str) -> (Vec<DiagnosticResult>, Vec<DiagnosticResult>) {
    let cs = analyze(csharp, SurfaceSyntax::CSharp);
    let vb = analyze(vb, SurfaceSyntax::VisualBasic);
    let strip = |d: &[DiagnosticResult]| {
        summarize(d)
            .into_iter()
            .map(|(id, severity, _)| (id, severity))
            .collect::<Vec<_>>()
    };
    assert_eq!(strip(&cs), strip(&vb), "C#: {:#?}\nVB: {:#?}", cs, vb);
    (cs, vb)
}

#[test]
fn test_network_credential_password_literal() {
    let (cs, vb) = assert_parity(CSHARP_NETWORK_CREDENTIAL, VB_NETWORK_CREDENTIAL);
    for diagnostics in [&cs, &vb] {
        assert_single(diagnostics, "SCS0015", "NetworkCredential password");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert!(diagnostics[0].message.contains("password"));
    }
    assert_eq!(cs[0].location.line, 11);
    assert_eq!(vb[0].location.line, 8);
}

#[test]
fn test_password_derive_bytes_literal() {
    let (cs, vb) = assert_parity(CSHARP_PASSWORD_DERIVE_BYTES, VB_PASSWORD_DERIVE_BYTES);
    assert_single(&cs, "SCS0015", "C# PasswordDeriveBytes");
    assert_single(&vb, "SCS0015", "VB PasswordDeriveBytes");
}

#[test]
fn test_parameter_argument_is_not_reported() {
    let (cs, vb) = assert_parity(CSHARP_PARAMETER_PASSWORD, VB_PARAMETER_PASSWORD);
    assert!(cs.is_empty(), "{:#?}", cs);
    assert!(vb.is_empty(), "{:#?}", vb);
}

#[test]
fn test_local_variable_argument_is_not_reported() {
    let (cs, vb) = assert_parity(CSHARP_LOCAL_PASSWORD, VB_LOCAL_PASSWORD);
    assert!(cs.is_empty());
    assert!(vb.is_empty());
}

#[test]
fn test_setter_sinks() {
    let (cs, vb) = assert_parity(CSHARP_SETTERS, VB_SETTERS);
    assert_eq!(cs.len(), 2, "{:#?}", cs);
    assert_eq!(vb.len(), 2, "{:#?}", vb);
    for diagnostics in [&cs, &vb] {
        assert!(diagnostics[0].message.contains("NetworkCredential.Password"));
        assert!(diagnostics[1].message.contains("SqlConnectionStringBuilder.Password"));
    }
}

#[test]
fn test_every_sink_shape() {
    let (cs, vb) = assert_parity(CSHARP_MANY_SINKS, VB_MANY_SINKS);
    assert_eq!(cs.len(), 8, "{:#?}", cs);
    assert_eq!(vb.len(), 8, "{:#?}", vb);

    let field = &cs[0];
    assert_eq!(field.context.enclosing_type.as_deref(), Some("Sinks"));
    assert_eq!(field.context.member.as_deref(), Some("service"));
    assert_eq!(vb[0].context.member.as_deref(), Some("service"));
    assert!(cs[1..].iter().all(|d| d.context.member.as_deref() == Some("Run")));
}

#[test]
fn test_clean_source_has_no_findings() {
    assert!(analyze(CSHARP_CLEAN, SurfaceSyntax::CSharp).is_empty());
    assert!(analyze("Class Clean\nEnd Class\n", SurfaceSyntax::VisualBasic).is_empty());
}
