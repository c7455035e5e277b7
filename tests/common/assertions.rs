//! Custom assertions for integration tests

use serde_json::Value;

use secscan_engine::DiagnosticResult;

/// Assert that output is valid JSON and return parsed value
pub fn assert_valid_json(output: &str, context: &str) -> Value {
    serde_json::from_str(output).unwrap_or_else(|e| {
        panic!(
            "Expected valid JSON ({}): {}\nOutput:\n{}",
            context, e, output
        )
    })
}

/// Assert that output contains valid TOON markers
pub fn assert_valid_toon(output: &str, context: &str) {
    assert!(
        output.contains("_type:"),
        "Expected TOON output to contain '_type:' marker ({})\nOutput:\n{}",
        context,
        output
    );
}

/// Assert that JSON output has expected type
pub fn assert_json_type(json: &Value, expected_type: &str) {
    let actual_type = json["_type"]
        .as_str()
        .unwrap_or_else(|| panic!("JSON missing '_type' field"));
    assert_eq!(
        actual_type, expected_type,
        "Expected JSON type '{}' but got '{}'",
        expected_type, actual_type
    );
}

/// Assert that output contains a string
pub fn assert_contains(output: &str, needle: &str, context: &str) {
    assert!(
        output.contains(needle),
        "Expected output to contain '{}' ({})\nOutput:\n{}",
        needle,
        context,
        output
    );
}

/// Assert that output does not contain a string
pub fn assert_not_contains(output: &str, needle: &str, context: &str) {
    assert!(
        !output.contains(needle),
        "Expected output NOT to contain '{}' ({})\nOutput:\n{}",
        needle,
        context,
        output
    );
}

/// Rule ids of the diagnostics in an analysis JSON report
pub fn json_diagnostic_ids(json: &Value) -> Vec<String> {
    json["diagnostics"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|d| d["id"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

/// (id, severity, line) triples, for comparing results across syntaxes
pub fn summarize(diagnostics: &[DiagnosticResult]) -> Vec<(String, String, usize)> {
    diagnostics
        .iter()
        .map(|d| (d.id.clone(), d.severity.to_string(), d.location.line))
        .collect()
}

/// Assert that exactly one diagnostic with `id` was produced
pub fn assert_single(diagnostics: &[DiagnosticResult], id: &str, context: &str) {
    let matching: Vec<_> = diagnostics.iter().filter(|d| d.id == id).collect();
    assert_eq!(
        matching.len(),
        1,
        "Expected exactly one {} ({}), got: {:#?}",
        id,
        context,
        diagnostics
    );
}
