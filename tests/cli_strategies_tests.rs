//! End-to-end tests for `esxkit strategies`.

mod fixtures;
use fixtures::*;

#[test]
fn test_strategies_json_lists_presets() {
    let config = tempfile::TempDir::new().unwrap();
    let output = run(config.path(), &["strategies", "--json"]);
    assert_success(&output);

    let presets: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Should parse JSON output");
    let presets = presets.as_array().unwrap();
    let find = |name: &str| {
        presets
            .iter()
            .find(|p| p["name"] == name)
            .unwrap_or_else(|| panic!("preset {name} missing"))
    };

    assert_eq!(find("rows")["requires_tag"], false);
    assert_eq!(find("columns")["requires_tag"], false);
    assert_eq!(find("tag-rows")["requires_tag"], true);
    assert!(find("rows")["pattern"].as_str().unwrap().contains("{seq}"));
}

#[test]
fn test_strategies_human_output() {
    let config = tempfile::TempDir::new().unwrap();
    let output = run(config.path(), &["strategies"]);
    assert_success(&output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Available strategies:"));
    assert!(stdout.contains("tag-rows"));
    assert!(stdout.contains("(needs --tag)"));
}
