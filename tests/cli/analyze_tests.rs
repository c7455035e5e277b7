//! Tests for the `analyze` CLI command

use crate::common::{
    assert_contains, assert_json_type, assert_not_contains, assert_valid_json, assert_valid_toon,
    json_diagnostic_ids, TestRepo,
};

// ============================================================================
// BASIC ANALYSIS
// ============================================================================

#[test]
fn test_analyze_project_text() {
    let repo = TestRepo::new();
    repo.with_vulnerable_project();

    let output = repo.run_cli_success(&["analyze"]);

    assert_contains(&output, "src/Login.cs:11:", "C# finding location");
    assert_contains(&output, "src/Keys.vb:7:", "VB finding location");
    assert_contains(&output, "warning SCS0015", "severity and id");
    assert_contains(&output, "3 file(s) analyzed, 2 diagnostic(s)", "summary");
    assert_not_contains(&output, "Clean.cs", "clean file has no findings");
}

#[test]
fn test_analyze_alias_and_single_file() {
    let repo = TestRepo::new();
    repo.with_vulnerable_project();

    let output = repo.run_cli_success(&["a", "src/Keys.vb"]);
    assert_contains(&output, "1 file(s) analyzed, 1 diagnostic(s)", "single file");
}

#[test]
fn test_analyze_verbose_shows_context() {
    let repo = TestRepo::new();
    repo.with_vulnerable_project();

    let output = repo.run_cli_success(&["analyze", "--verbose", "src/Login.cs"]);
    assert_contains(&output, "SECURITY ANALYSIS", "banner");
    assert_contains(&output, "in VulnerableApp.HardCodedPassword.TestHardcodedValue", "context");
}

// ============================================================================
// OUTPUT FORMATS
// ============================================================================

#[test]
fn test_analyze_json() {
    let repo = TestRepo::new();
    repo.with_vulnerable_project();

    let output = repo.run_cli_success(&["analyze", "--format", "json"]);
    let json = assert_valid_json(&output, "analyze json");
    assert_json_type(&json, "analysis");
    assert_eq!(json["files_analyzed"], 3);
    assert_eq!(json["count"], 2);
    assert_eq!(json["by_severity"]["warning"], 2);
    assert_eq!(json_diagnostic_ids(&json), vec!["SCS0015", "SCS0015"]);
    assert_eq!(json["diagnostics"][0]["file"], "src/Keys.vb");
    assert_eq!(json["diagnostics"][1]["member"], "TestHardcodedValue");
}

#[test]
fn test_analyze_toon() {
    let repo = TestRepo::new();
    repo.with_vulnerable_project();

    let output = repo.run_cli_success(&["analyze", "-f", "toon"]);
    assert_valid_toon(&output, "analyze toon");
    assert_contains(&output, "SCS0015", "toon diagnostics");
}

// ============================================================================
// EXIT CODES
// ============================================================================

#[test]
fn test_fail_on_threshold() {
    let repo = TestRepo::new();
    repo.with_vulnerable_project();

    repo.run_cli_with_code(&["analyze", "--fail-on", "warning"], 6);
    repo.run_cli_with_code(&["analyze", "--fail-on", "error"], 0);
}

#[test]
fn test_fail_on_clean_project_succeeds() {
    let repo = TestRepo::new();
    repo.add_file("Clean.cs", crate::common::fixtures::CSHARP_CLEAN);

    repo.run_cli_with_code(&["analyze", "--fail-on", "info"], 0);
}

#[test]
fn test_missing_path() {
    let repo = TestRepo::new();
    let (_, stderr) = repo.run_cli_with_code(&["analyze", "does/not/exist"], 1);
    assert_contains(&stderr, "File not found", "error message");
}

#[test]
fn test_unsupported_file() {
    let repo = TestRepo::new();
    repo.add_file("notes.txt", "hello");
    repo.run_cli_with_code(&["analyze", "notes.txt"], 2);
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[test]
fn test_config_severity_override() {
    let repo = TestRepo::new();
    repo.with_vulnerable_project().with_config(
        r#"
[rules.severity]
SCS0015 = "error"
"#,
    );

    let output = repo.run_cli_success(&["analyze"]);
    assert_contains(&output, "error SCS0015", "overridden severity");
    repo.run_cli_with_code(&["analyze", "--fail-on", "error"], 6);
}

#[test]
fn test_config_disables_rule_and_excludes() {
    let repo = TestRepo::new();
    repo.with_vulnerable_project().with_config(
        r#"
[scan]
exclude = ["*.vb"]
"#,
    );

    let output = repo.run_cli_success(&["analyze", "--format", "json"]);
    let json = assert_valid_json(&output, "excluded vb");
    assert_eq!(json["files_analyzed"], 2);
    assert_eq!(json["count"], 1);

    let output = repo.run_cli_success(&["analyze", "--exclude", "*.cs", "--format", "json"]);
    let json = assert_valid_json(&output, "everything excluded");
    assert_eq!(json["files_analyzed"], 0);
}

#[test]
fn test_explicit_config_file() {
    let repo = TestRepo::new();
    repo.with_vulnerable_project().add_file(
        "ci/secscan.toml",
        r#"
[rules]
disabled = ["SCS0015"]
"#,
    );

    let output = repo.run_cli_success(&["analyze", "--config", "ci/secscan.toml"]);
    assert_contains(&output, "0 diagnostic(s)", "rule disabled");
}

#[test]
fn test_invalid_config() {
    let repo = TestRepo::new();
    repo.with_vulnerable_project().with_config("[rules\nbroken");

    let (_, stderr) = repo.run_cli_with_code(&["analyze"], 4);
    assert_contains(&stderr, "Configuration error", "config error");

    repo.run_cli_with_code(&["analyze", "--config", "missing.toml"], 4);
}

// ============================================================================
// DIRECTORY WALKING
// ============================================================================

#[test]
fn test_build_output_directories_skipped() {
    let repo = TestRepo::new();
    repo.with_vulnerable_project()
        .add_file("bin/Debug/Generated.cs", crate::common::fixtures::CSHARP_NETWORK_CREDENTIAL)
        .add_file("obj/Temp.vb", crate::common::fixtures::VB_NETWORK_CREDENTIAL);

    let output = repo.run_cli_success(&["analyze", "--format", "json"]);
    let json = assert_valid_json(&output, "skipped dirs");
    assert_eq!(json["files_analyzed"], 3);
}

#[test]
fn test_jobs_flag() {
    let repo = TestRepo::new();
    repo.with_vulnerable_project();

    let single = repo.run_cli_success(&["analyze", "-j", "1", "--format", "json"]);
    let many = repo.run_cli_success(&["analyze", "-j", "4", "--format", "json"]);
    assert_eq!(single, many);
}
