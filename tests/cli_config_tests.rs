//! End-to-end tests for `esxkit config`.

use std::fs;
use tempfile::TempDir;

mod fixtures;
use fixtures::*;

fn show_json(config: &TempDir) -> serde_json::Value {
    let output = run(config.path(), &["config", "show", "--json"]);
    assert_success(&output);
    serde_json::from_slice(&output.stdout).expect("Should parse JSON output")
}

#[test]
fn test_config_show_defaults() {
    let config = TempDir::new().unwrap();
    let json = show_json(&config);

    assert_eq!(json["exists"], false);
    assert!(json["path"].as_str().unwrap().ends_with("config.toml"));
    assert_eq!(json["rename"], serde_json::json!({}));
    assert!(json["effective"].is_string());
}

#[test]
fn test_config_set_and_show() {
    let config = TempDir::new().unwrap();
    let output = run(
        config.path(),
        &["config", "set", "--strategy", "columns", "--pixels", "75", "--scope", "floor"],
    );
    assert_success(&output);

    let json = show_json(&config);
    assert_eq!(json["exists"], true);
    assert_eq!(json["rename"]["strategy"], "columns");
    assert_eq!(json["rename"]["pixels"], 75.0);
    assert_eq!(json["rename"]["scope"], "floor");

    let toml = fs::read_to_string(config.path().join("config.toml")).unwrap();
    assert!(toml.contains("[rename]"));
}

#[test]
fn test_config_set_merges_with_existing() {
    let config = TempDir::new().unwrap();
    assert_success(&run(config.path(), &["config", "set", "--width", "2"]));
    assert_success(&run(config.path(), &["config", "set", "--pattern", "R{seq}"]));

    let json = show_json(&config);
    assert_eq!(json["rename"]["width"], 2);
    assert_eq!(json["rename"]["pattern"], "R{seq}");
}

#[test]
fn test_config_set_requires_option() {
    let config = TempDir::new().unwrap();
    let output = run(config.path(), &["config", "set"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("At least one option"));
}

#[test]
fn test_config_set_rejects_invalid_values() {
    let config = TempDir::new().unwrap();

    let output = run(config.path(), &["config", "set", "--pattern", "no-sequence"]);
    assert_eq!(output.status.code(), Some(1));

    let output = run(config.path(), &["config", "set", "--scope", "building"]);
    assert_eq!(output.status.code(), Some(1));

    assert!(!config.path().join("config.toml").exists());
}

#[test]
fn test_config_reset() {
    let config = TempDir::new().unwrap();
    assert_success(&run(config.path(), &["config", "set", "--width", "5"]));
    assert_success(&run(config.path(), &["config", "reset"]));

    let json = show_json(&config);
    assert_eq!(json["rename"], serde_json::json!({}));
}

#[test]
fn test_config_invalid_file_is_reported() {
    let config = TempDir::new().unwrap();
    fs::write(config.path().join("config.toml"), "[rename]\nwidth = \"wide\"\n").unwrap();

    let output = run(config.path(), &["config", "show"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load configuration"));
}
