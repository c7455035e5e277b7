//! Rule engine behaviour through the public API

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use secscan_engine::config::{RulesConfig, SinkConfig};
use secscan_engine::diagnostic::sort_diagnostics;
use secscan_engine::{
    analyze_source, Analyzer, Binder, CSharpTree, DiagnosticResult, RuleCatalog, SurfaceSyntax, SyntaxHelper,
    SyntaxNodeKind, VbTree,
};

use crate::common::fixtures::*;

fn analyze_with(catalog: &RuleCatalog, source: &str, syntax: SurfaceSyntax) -> Vec<DiagnosticResult> {
    analyze_source(source, syntax, "Test", &Analyzer::new(catalog)).unwrap()
}

fn analyze(source: &str, syntax: SurfaceSyntax) -> Vec<DiagnosticResult> {
    analyze_with(RuleCatalog::builtin(), source, syntax)
}

fn csharp_call(argument: &str) -> String {
    format!(
        "using System.Net;\nclass C {{\n    void M(string user) {{\n        var c = new NetworkCredential(user, {});\n    }}\n}}\n",
        argument
    )
}

fn vb_call(argument: &str) -> String {
    format!(
        "Imports System.Net\nClass C\n    Sub M(user As String)\n        Dim c = New NetworkCredential(user, {})\n    End Sub\nEnd Class\n",
        argument
    )
}

// ============================================================================
// LITERAL SENSITIVITY
// ============================================================================

#[test]
fn test_literal_forms_are_reported() {
    for argument in [r#""p""#, r#""""#, r#"("p")"#, r#""a" + "b""#, r#"(string)"p""#] {
        let found = analyze(&csharp_call(argument), SurfaceSyntax::CSharp);
        assert_eq!(found.len(), 1, "C# argument {} gave {:#?}", argument, found);
    }
    for argument in [r#""p""#, r#""""#, r#"("p")"#, r#""a" & "b""#, r#"CStr("p")"#] {
        let found = analyze(&vb_call(argument), SurfaceSyntax::VisualBasic);
        assert_eq!(found.len(), 1, "VB argument {} gave {:#?}", argument, found);
    }
}

#[test]
fn test_non_literal_forms_are_not_reported() {
    for argument in ["user", "null", "user.Trim()", r#""a" + user"#, "Secrets.Password"] {
        let found = analyze(&csharp_call(argument), SurfaceSyntax::CSharp);
        assert!(found.is_empty(), "C# argument {} gave {:#?}", argument, found);
    }
    for argument in ["user", "Nothing", "user.Trim()", r#""a" & user"#, "Secrets.Password"] {
        let found = analyze(&vb_call(argument), SurfaceSyntax::VisualBasic);
        assert!(found.is_empty(), "VB argument {} gave {:#?}", argument, found);
    }
}

// ============================================================================
// ARGUMENT INDEX
// ============================================================================

#[test]
fn test_only_the_catalog_index_is_checked() {
    let cs = "using System.Net;\nclass C { void M(string p) { var c = new NetworkCredential(\"admin\", p); } }\n";
    assert!(analyze(cs, SurfaceSyntax::CSharp).is_empty());

    let vb = "Imports System.Net\nClass C\n Sub M(p As String)\n  Dim c = New NetworkCredential(\"admin\", p)\n End Sub\nEnd Class\n";
    assert!(analyze(vb, SurfaceSyntax::VisualBasic).is_empty());
}

#[test]
fn test_overload_without_tainted_argument_is_skipped() {
    let cs = "using System.DirectoryServices;\nclass C { void M() { var e = new DirectoryEntry(\"LDAP://corp\"); } }\n";
    assert!(analyze(cs, SurfaceSyntax::CSharp).is_empty());
}

#[test]
fn test_unimported_type_is_not_matched() {
    let cs = "class C { void M() { var c = new NetworkCredential(\"u\", \"p\"); } }\n";
    assert!(analyze(cs, SurfaceSyntax::CSharp).is_empty());

    let vb = "Class C\n Sub M()\n  Dim c = New NetworkCredential(\"u\", \"p\")\n End Sub\nEnd Class\n";
    assert!(analyze(vb, SurfaceSyntax::VisualBasic).is_empty());
}

// ============================================================================
// ORDER INDEPENDENCE AND IDEMPOTENCE
// ============================================================================

fn shuffled_evaluation<H: SyntaxHelper>(helper: &H, seed: u64) -> Vec<DiagnosticResult> {
    let binder = Binder::new(helper);
    let analyzer = Analyzer::new(RuleCatalog::builtin());

    let mut nodes = helper.descendants_and_self(helper.root());
    nodes.shuffle(&mut StdRng::seed_from_u64(seed));

    let mut found = Vec::new();
    for node in nodes {
        match helper.kind(node) {
            Some(SyntaxNodeKind::Invocation | SyntaxNodeKind::ObjectConstruction) => {
                found.extend(analyzer.evaluate_candidate(helper, &binder, node, "Test"));
            }
            Some(SyntaxNodeKind::Assignment | SyntaxNodeKind::ObjectInitializerMember) => {
                found.extend(analyzer.evaluate_property_write(helper, &binder, node, "Test"));
            }
            _ => {}
        }
    }
    sort_diagnostics(&mut found);
    found
}

#[test]
fn test_candidate_order_does_not_matter() {
    let expected = analyze(CSHARP_MANY_SINKS, SurfaceSyntax::CSharp);
    let tree = CSharpTree::parse(CSHARP_MANY_SINKS).unwrap();
    let helper = tree.helper();
    for seed in 0..5 {
        assert_eq!(shuffled_evaluation(&helper, seed), expected, "seed {}", seed);
    }

    let expected = analyze(VB_MANY_SINKS, SurfaceSyntax::VisualBasic);
    let tree = VbTree::parse(VB_MANY_SINKS).unwrap();
    let helper = tree.helper();
    for seed in 0..5 {
        assert_eq!(shuffled_evaluation(&helper, seed), expected, "seed {}", seed);
    }
}

#[test]
fn test_repeated_analysis_is_identical() {
    for (source, syntax) in [
        (CSHARP_SETTERS, SurfaceSyntax::CSharp),
        (VB_SETTERS, SurfaceSyntax::VisualBasic),
    ] {
        let first = analyze(source, syntax);
        let second = analyze(source, syntax);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }
}

// ============================================================================
// CATALOG CONFIGURATION
// ============================================================================

const VAULT_CS: &str = r#"
namespace MyCorp.Vault
{
    class Client
    {
        public Client(string endpoint, string token) { }
    }

    class Startup
    {
        void Configure()
        {
            var client = new Client("https://vault", "s.abc123");
        }
    }
}
"#;

const VAULT_VB: &str = r#"
Namespace MyCorp.Vault
    Class Client
        Public Sub New(endpoint As String, token As String)
        End Sub
    End Class

    Class Startup
        Sub Configure()
            Dim client = New Client("https://vault", "s.abc123")
        End Sub
    End Class
End Namespace
"#;

fn vault_config() -> RulesConfig {
    RulesConfig {
        sinks: vec![SinkConfig {
            type_name: "MyCorp.Vault.Client".to_string(),
            member: ".ctor".to_string(),
            parameter: 1,
            id: "CORP0001".to_string(),
            severity: Some("error".to_string()),
            message: Some("Vault token passed to {member} ({parameter})".to_string()),
        }],
        ..RulesConfig::default()
    }
}

#[test]
fn test_configured_sink_on_declared_type() {
    let catalog = RuleCatalog::from_config(&vault_config()).unwrap();
    for (source, syntax) in [(VAULT_CS, SurfaceSyntax::CSharp), (VAULT_VB, SurfaceSyntax::VisualBasic)] {
        let found = analyze_with(&catalog, source, syntax);
        assert_eq!(found.len(), 1, "{:#?}", found);
        assert_eq!(found[0].id, "CORP0001");
        assert_eq!(found[0].message, "Vault token passed to Client (token)");
        assert_eq!(found[0].context.enclosing_type.as_deref(), Some("MyCorp.Vault.Startup"));
    }
}

#[test]
fn test_disabled_rule_reports_nothing() {
    let config = RulesConfig {
        disabled: vec!["SCS0015".to_string()],
        ..RulesConfig::default()
    };
    let catalog = RuleCatalog::from_config(&config).unwrap();
    assert!(analyze_with(&catalog, CSHARP_NETWORK_CREDENTIAL, SurfaceSyntax::CSharp).is_empty());
    assert!(analyze_with(&catalog, VB_NETWORK_CREDENTIAL, SurfaceSyntax::VisualBasic).is_empty());
}

#[test]
fn test_severity_override_applies() {
    let mut config = RulesConfig::default();
    config.severity.insert("SCS0015".to_string(), "error".to_string());
    let catalog = RuleCatalog::from_config(&config).unwrap();
    let found = analyze_with(&catalog, VB_PASSWORD_DERIVE_BYTES, SurfaceSyntax::VisualBasic);
    assert_eq!(found[0].severity, secscan_engine::Severity::Error);
}

// ============================================================================
// SUPPRESSION
// ============================================================================

#[test]
fn test_suppressed_member_in_both_syntaxes() {
    let cs = r#"
using System.Diagnostics.CodeAnalysis;
using System.Net;

class C
{
    [SuppressMessage("Security", "SCS0015:Hardcoded password", Justification = "test fixture")]
    void Quiet() { var c = new NetworkCredential("u", "p"); }

    void Loud() { var c = new NetworkCredential("u", "p"); }
}
"#;
    let vb = r#"
Imports System.Diagnostics.CodeAnalysis
Imports System.Net

Class C
    <SuppressMessage("Security", "SCS0015:Hardcoded password", Justification:="test fixture")>
    Sub Quiet()
        Dim c = New NetworkCredential("u", "p")
    End Sub

    Sub Loud()
        Dim c = New NetworkCredential("u", "p")
    End Sub
End Class
"#;
    for (source, syntax) in [(cs, SurfaceSyntax::CSharp), (vb, SurfaceSyntax::VisualBasic)] {
        let found = analyze(source, syntax);
        assert_eq!(found.len(), 1, "{:#?}", found);
        assert_eq!(found[0].context.member.as_deref(), Some("Loud"));
    }
}
