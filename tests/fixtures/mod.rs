//! Shared test fixtures for E2E CLI tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use esxkit::esx::{ArchiveEntry, EsxArchive};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Bytes of the fake floor plan image.
pub const IMAGE_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-a-png";

/// Path to the esxkit binary
pub fn esxkit_bin() -> &'static str {
    env!("CARGO_BIN_EXE_esxkit")
}

/// Creates a Command with an isolated config directory.
pub fn esxkit(config_dir: &Path) -> Command {
    let mut cmd = Command::new(esxkit_bin());
    cmd.env("ESXKIT_CONFIG_DIR", config_dir);
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Runs esxkit with args and an isolated config directory.
pub fn run(config_dir: &Path, args: &[&str]) -> Output {
    esxkit(config_dir)
        .args(args)
        .output()
        .expect("Failed to execute command")
}

/// Asserts a zero exit code, printing stderr otherwise.
pub fn assert_success(output: &Output) {
    assert_eq!(
        output.status.code(),
        Some(0),
        "Command should succeed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Two floors, four placed APs, one unplaced AP.
///
/// With the default `rows` strategy (floor height / 20) the expected names are:
/// - ap-1 `AP-001`, ap-2 `AP-002`, ap-3 `AP-003` (L1, two rows)
/// - ap-4 `AP-004` (L2)
/// - ap-5 stays `Spare` (unplaced)
pub fn floor_plans_json() -> Value {
    json!({
        "floorPlans": [
            {"id": "fp-1", "name": "L1", "width": 1000.0, "height": 800.0, "imageId": "abc"},
            {"id": "fp-2", "name": "L2", "width": 500.0, "height": 500.0, "imageId": "def"}
        ]
    })
}

/// See [`floor_plans_json`].
pub fn access_points_json() -> Value {
    json!({
        "accessPoints": [
            {"id": "ap-1", "name": "Old 7", "vendor": "Acme", "model": "AP-635", "mine": true,
             "location": {"floorPlanId": "fp-1", "coord": {"x": 100.0, "y": 100.0}},
             "tags": [{"tagKeyId": "tk-zone", "value": "North"}]},
            {"id": "ap-2", "name": "Old 3", "vendor": "Acme", "model": "AP-635", "mine": true,
             "location": {"floorPlanId": "fp-1", "coord": {"x": 600.0, "y": 120.0}},
             "tags": [{"tagKeyId": "tk-zone", "value": "South"}]},
            {"id": "ap-3", "name": "Old 9", "vendor": "Acme", "model": "AP-505", "mine": true,
             "location": {"floorPlanId": "fp-1", "coord": {"x": 120.0, "y": 400.0}},
             "tags": [{"tagKeyId": "tk-zone", "value": "North"}]},
            {"id": "ap-4", "name": "Old 1", "vendor": "Acme", "model": "AP-505", "mine": true,
             "location": {"floorPlanId": "fp-2", "coord": {"x": 50.0, "y": 50.0}},
             "tags": []},
            {"id": "ap-5", "name": "Spare", "vendor": "Acme", "model": "AP-635", "mine": false,
             "tags": []}
        ]
    })
}

/// Archive entries of the sample project.
pub fn sample_entries(with_tags: bool) -> Vec<ArchiveEntry> {
    let mut entries = vec![
        ArchiveEntry::file(
            "projectConfiguration.json",
            br#"{"projectConfiguration": {"name": "Sample"}}"#.to_vec(),
        ),
        ArchiveEntry::file("floorPlans.json", to_bytes(&floor_plans_json())),
        ArchiveEntry::file("accessPoints.json", to_bytes(&access_points_json())),
        ArchiveEntry::file(
            "simulatedRadios.json",
            br#"{"simulatedRadios": [{"id": "r1", "accessPointId": "ap-1"}]}"#.to_vec(),
        ),
        ArchiveEntry::file("notes.json", br#"{"notes": []}"#.to_vec()),
        ArchiveEntry::file("image-abc", IMAGE_BYTES.to_vec()),
        ArchiveEntry::file("image-def", IMAGE_BYTES.to_vec()),
    ];
    if with_tags {
        entries.push(ArchiveEntry::file(
            "tagKeys.json",
            br#"{"tagKeys": [{"id": "tk-zone", "key": "Zone"}]}"#.to_vec(),
        ));
    }
    entries
}

/// Writes the sample project as `<dir>/<name>`.
pub fn write_sample_esx(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    EsxArchive::from_entries(sample_entries(true))
        .write(&path)
        .expect("Failed to write sample archive");
    path
}

/// A temp workspace holding `site.esx`, plus a separate config directory.
pub fn sample_workspace() -> (TempDir, PathBuf, TempDir) {
    let work = TempDir::new().expect("Failed to create temp dir");
    let esx = write_sample_esx(work.path(), "site.esx");
    let config = TempDir::new().expect("Failed to create config dir");
    (work, esx, config)
}

/// Reads `accessPoints.json` from an archive.
pub fn read_access_points(esx: &Path) -> Value {
    EsxArchive::open(esx)
        .expect("Failed to open archive")
        .read_json("accessPoints.json")
        .expect("Failed to parse accessPoints.json")
        .expect("accessPoints.json missing")
}

/// `id -> name` from an `accessPoints.json` document, in document order.
pub fn names(doc: &Value) -> Vec<(String, String)> {
    doc["accessPoints"]
        .as_array()
        .expect("accessPoints array")
        .iter()
        .map(|ap| {
            (
                ap["id"].as_str().unwrap_or_default().to_string(),
                ap["name"].as_str().unwrap_or_default().to_string(),
            )
        })
        .collect()
}

/// Looks up one AP name by id.
pub fn name_of(doc: &Value, id: &str) -> String {
    names(doc)
        .into_iter()
        .find(|(ap_id, _)| ap_id == id)
        .map(|(_, name)| name)
        .unwrap_or_else(|| panic!("AP {id} not found"))
}

fn to_bytes(value: &Value) -> Vec<u8> {
    serde_json::to_vec_pretty(value).expect("Failed to serialize fixture")
}
