//! Error Handling and Edge Case Tests

use secscan_engine::{analyze_source, Analyzer, RuleCatalog, SurfaceSyntax};

use crate::common::fixtures::{CSHARP_NETWORK_CREDENTIAL, VB_NETWORK_CREDENTIAL};
use crate::common::{assert_valid_json, TestRepo};

fn run(source: &str, syntax: SurfaceSyntax) -> usize {
    analyze_source(source, syntax, "Edge", &Analyzer::new(RuleCatalog::builtin()))
        .unwrap_or_else(|e| panic!("analysis failed: {}", e))
        .len()
}

// ============================================================================
// EMPTY AND TRIVIAL FILES
// ============================================================================

#[test]
fn test_empty_sources() {
    for source in ["", "   \n\t\n", "// only a comment\n", "\u{feff}"] {
        assert_eq!(run(source, SurfaceSyntax::CSharp), 0);
    }
    for source in ["", "   \n\n", "' only a comment\n", "REM remark\n", "\u{feff}"] {
        assert_eq!(run(source, SurfaceSyntax::VisualBasic), 0);
    }
}

#[test]
fn test_empty_files_through_cli() {
    let repo = TestRepo::new();
    repo.add_file("src/Empty.cs", "").add_file("src/Empty.vb", "");

    let output = repo.run_cli_success(&["analyze", "-f", "json"]);
    let json = assert_valid_json(&output, "empty files");
    assert_eq!(json["files_analyzed"], 2);
    assert_eq!(json["count"], 0);
}

// ============================================================================
// MALFORMED INPUT
// ============================================================================

#[test]
fn test_malformed_csharp_does_not_fail() {
    for source in [
        "class C { void M() { var c = new NetworkCredential(\"u\", ",
        "using System.Net; class { void () { new (\"x\"); } }",
        "}}}}{{{{",
        "class C { void M() { var s = \"unterminated; } }",
    ] {
        run(source, SurfaceSyntax::CSharp);
    }
}

#[test]
fn test_malformed_vb_does_not_fail() {
    for source in [
        "Class C\n Sub M()\n  Dim c = New NetworkCredential(\"u\", \n",
        "End Class\nEnd Sub\nEnd Namespace\n",
        "Sub\nFunction\nProperty\n",
        "Class C\n Sub M()\n  Dim s = \"unterminated\n End Sub\nEnd Class\n",
        "Imports\nNamespace\n",
    ] {
        run(source, SurfaceSyntax::VisualBasic);
    }
}

#[test]
fn test_unreadable_file_is_reported_not_fatal() {
    let repo = TestRepo::new();
    repo.add_file("src/Login.cs", CSHARP_NETWORK_CREDENTIAL);
    std::fs::write(repo.path().join("src/Binary.cs"), [0xff, 0xfe, 0x00, 0xc3]).unwrap();

    let output = repo.run_cli_success(&["analyze", "-f", "json"]);
    let json = assert_valid_json(&output, "unreadable file");
    assert_eq!(json["files_analyzed"], 1);
    assert_eq!(json["count"], 1);
    assert_eq!(json["failures"][0]["file"], "src/Binary.cs");
}

// ============================================================================
// TEXT VARIANTS
// ============================================================================

#[test]
fn test_crlf_line_endings() {
    let cs = CSHARP_NETWORK_CREDENTIAL.replace('\n', "\r\n");
    let vb = VB_NETWORK_CREDENTIAL.replace('\n', "\r\n");
    assert_eq!(run(&cs, SurfaceSyntax::CSharp), 1);
    assert_eq!(run(&vb, SurfaceSyntax::VisualBasic), 1);
}

#[test]
fn test_non_ascii_literals() {
    let cs = "using System.Net;\nclass Ü { void Prüfen() { var c = new NetworkCredential(\"benutzer\", \"geheimnis-ßü\"); } }\n";
    assert_eq!(run(cs, SurfaceSyntax::CSharp), 1);

    let vb = "Imports System.Net\nClass Ü\n Sub Prüfen()\n  Dim c = New NetworkCredential(\"benutzer\", \"geheimnis-ßü\")\n End Sub\nEnd Class\n";
    assert_eq!(run(vb, SurfaceSyntax::VisualBasic), 1);
}

#[test]
fn test_vb_line_continuation() {
    let vb = "Imports System.Net\nClass C\n Sub M()\n  Dim c = New NetworkCredential(\"u\", _\n      \"p\")\n End Sub\nEnd Class\n";
    assert_eq!(run(vb, SurfaceSyntax::VisualBasic), 1);
}

#[test]
fn test_deeply_nested_expression() {
    let argument = format!("{}\"p\"{}", "(".repeat(200), ")".repeat(200));
    let cs = format!(
        "using System.Net;\nclass C {{ void M() {{ var c = new NetworkCredential(\"u\", {}); }} }}\n",
        argument
    );
    assert_eq!(run(&cs, SurfaceSyntax::CSharp), 1);
}

#[test]
fn test_deeply_nested_vb_expression() {
    let vb = |depth: usize| {
        format!(
            "Imports System.Net\nClass C\n Sub M()\n  Dim c = New NetworkCredential(\"u\", {}\"p\"{})\n End Sub\nEnd Class\n",
            "(".repeat(depth),
            ")".repeat(depth)
        )
    };
    assert_eq!(run(&vb(50), SurfaceSyntax::VisualBasic), 1);
    assert_eq!(run(&vb(5000), SurfaceSyntax::VisualBasic), 0);
}

#[test]
fn test_long_concatenation() {
    let terms = vec!["\"p\""; 2000].join(" + ");
    let cs = format!(
        "using System.Net;\nclass C {{ void M() {{ var s = {}; var c = new NetworkCredential(\"u\", \"p\"); }} }}\n",
        terms
    );
    assert_eq!(run(&cs, SurfaceSyntax::CSharp), 1);
}

#[test]
fn test_many_files_in_one_run() {
    let repo = TestRepo::new();
    for i in 0..40 {
        repo.add_file(&format!("src/cs/File{}.cs", i), CSHARP_NETWORK_CREDENTIAL);
        repo.add_file(&format!("src/vb/File{}.vb", i), VB_NETWORK_CREDENTIAL);
    }

    let output = repo.run_cli_success(&["analyze", "-f", "json"]);
    let json = assert_valid_json(&output, "many files");
    assert_eq!(json["files_analyzed"], 80);
    assert_eq!(json["count"], 80);
}
