//! Tests for the `dump-tree` CLI command

use crate::common::fixtures::{CSHARP_SETTERS, VB_SETTERS};
use crate::common::{assert_contains, assert_json_type, assert_valid_json, TestRepo};

#[test]
fn test_dump_tree_vb_text() {
    let repo = TestRepo::new();
    repo.add_file("Settings.vb", VB_SETTERS);

    let output = repo.run_cli_success(&["dump-tree", "Settings.vb", "--reduced-only"]);
    assert_contains(&output, "Settings.vb (vb)", "header");
    assert_contains(&output, "[Assignment]", "assignment statement");
    assert_contains(&output, "[ObjectInitializerMember]", "With member");
    assert_contains(&output, "[ObjectConstruction]", "New expression");
}

#[test]
fn test_dump_tree_csharp_json() {
    let repo = TestRepo::new();
    repo.add_file("Settings.cs", CSHARP_SETTERS);

    let output = repo.run_cli_success(&["dump-tree", "Settings.cs", "--format", "json"]);
    let json = assert_valid_json(&output, "dump json");
    assert_json_type(&json, "syntax_tree");
    assert_eq!(json["syntax"], "csharp");

    let nodes = json["nodes"].as_array().expect("nodes array");
    assert_eq!(nodes[0]["depth"], 0);
    assert_eq!(nodes[0]["native_kind"], "compilation_unit");
    assert!(nodes.iter().any(|n| n["kind"] == "ObjectInitializerMember"));
}

#[test]
fn test_dump_tree_errors() {
    let repo = TestRepo::new();
    repo.add_file("readme.md", "# hi");

    repo.run_cli_with_code(&["dump-tree", "Missing.cs"], 1);
    repo.run_cli_with_code(&["dump-tree", "readme.md"], 2);
}
