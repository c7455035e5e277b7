//! Tests for the `rules` CLI command

use crate::common::{assert_contains, assert_json_type, assert_valid_json, assert_valid_toon, TestRepo};

#[test]
fn test_rules_text() {
    let repo = TestRepo::new();
    let output = repo.run_cli_success(&["rules"]);

    assert_contains(&output, "RULE CATALOG", "banner");
    assert_contains(&output, "System.Net.NetworkCredential..ctor", "constructor row");
    assert_contains(&output, "10 row(s)", "row count");
}

#[test]
fn test_rules_json_includes_configured_sinks() {
    let repo = TestRepo::new();
    repo.with_config(
        r#"
[[rules.sinks]]
type = "MyCorp.Vault.Client"
member = ".ctor"
parameter = 1
id = "CORP0001"
severity = "error"
"#,
    );

    let output = repo.run_cli_success(&["rules", "--format", "json", "--id", "CORP0001"]);
    let json = assert_valid_json(&output, "rules json");
    assert_json_type(&json, "rules");
    assert_eq!(json["count"], 1);
    assert_eq!(json["rules"][0]["type"], "MyCorp.Vault.Client");
    assert_eq!(json["rules"][0]["severity"], "error");
    assert_eq!(json["rules"][0]["parameter"], 1);
}

#[test]
fn test_rules_toon() {
    let repo = TestRepo::new();
    let output = repo.run_cli_success(&["-f", "toon", "rules"]);
    assert_valid_toon(&output, "rules toon");
}

#[test]
fn test_rules_invalid_sink() {
    let repo = TestRepo::new();
    repo.with_config(
        r#"
[[rules.sinks]]
type = "MyCorp.Vault.Client"
member = ".ctor"
parameter = 1
id = "CORP0001"
severity = "catastrophic"
"#,
    );

    let (_, stderr) = repo.run_cli_with_code(&["rules"], 4);
    assert_contains(&stderr, "catastrophic", "bad severity named");
}
