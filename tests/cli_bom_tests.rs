//! End-to-end tests for `esxkit bom`.

use std::fs;

mod fixtures;
use fixtures::*;

#[test]
fn test_bom_json() {
    let (_work, esx, config) = sample_workspace();
    let output = run(config.path(), &["bom", esx.to_str().unwrap(), "--json"]);
    assert_success(&output);

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Should parse JSON output");
    assert_eq!(json["total"], 5);
    assert_eq!(json["totals"]["AP-635"], 3);
    assert_eq!(json["totals"]["AP-505"], 2);

    let lines = json["lines"].as_array().unwrap();
    let unplaced = lines
        .iter()
        .find(|l| l["floor"] == "(unplaced)")
        .expect("unplaced line");
    assert_eq!(unplaced["model"], "AP-635");
    assert_eq!(unplaced["count"], 1);
}

#[test]
fn test_bom_table() {
    let (_work, esx, config) = sample_workspace();
    let output = run(config.path(), &["bom", esx.to_str().unwrap()]);
    assert_success(&output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Floor"));
    assert!(stdout.contains("Total APs: 5"));
}

#[test]
fn test_bom_csv_explicit_path() {
    let (work, esx, config) = sample_workspace();
    let csv = work.path().join("counts.csv");

    let output = run(
        config.path(),
        &["bom", esx.to_str().unwrap(), "--csv", csv.to_str().unwrap()],
    );
    assert_success(&output);

    let content = fs::read_to_string(&csv).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("floor,model,count"));
    assert!(content.contains("L1,AP-635,2"));
    assert!(content.contains("L2,AP-505,1"));
}

#[test]
fn test_bom_csv_default_path() {
    let (work, esx, config) = sample_workspace();

    let output = run(config.path(), &["bom", esx.to_str().unwrap(), "--csv"]);
    assert_success(&output);

    let written: Vec<String> = fs::read_dir(work.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with("site_bom_") && name.ends_with(".csv"))
        .collect();
    assert_eq!(written.len(), 1, "expected one dated CSV, got {written:?}");
}

#[test]
fn test_bom_missing_project() {
    let (work, _esx, config) = sample_workspace();
    let missing = work.path().join("gone.esx");

    let output = run(config.path(), &["bom", missing.to_str().unwrap()]);
    assert_ne!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stderr).contains("gone.esx"));
}
