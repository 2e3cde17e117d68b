//! Integration tests for the CLI commands

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

const RECEIPT: &str = r#"{"responses":[{"fullTextAnnotation":{"pages":[{"width":400,"height":800,"blocks":[
  {"confidence":0.9,"boundingBox":{"vertices":[{"x":20,"y":20},{"x":220,"y":20},{"x":220,"y":60},{"x":20,"y":60}]},
   "paragraphs":[{"words":[
    {"confidence":0.95,"boundingBox":{"vertices":[{"x":20,"y":20},{"x":100,"y":20},{"x":100,"y":60},{"x":20,"y":60}]},"symbols":[{"text":"CORNER"}]},
    {"confidence":0.95,"boundingBox":{"vertices":[{"x":110,"y":20},{"x":220,"y":20},{"x":220,"y":60},{"x":110,"y":60}]},"symbols":[{"text":"CAFE"}]}
  ]}]},
  {"confidence":0.9,"boundingBox":{"vertices":[{"x":20,"y":300},{"x":380,"y":300},{"x":380,"y":420},{"x":20,"y":420}]},
   "paragraphs":[{"words":[
    {"confidence":0.9,"boundingBox":{"vertices":[{"x":20,"y":300},{"x":90,"y":300},{"x":90,"y":316},{"x":20,"y":316}]},"symbols":[{"text":"Latte"}]},
    {"confidence":0.9,"boundingBox":{"vertices":[{"x":320,"y":300},{"x":380,"y":300},{"x":380,"y":316},{"x":320,"y":316}]},"symbols":[{"text":"$4.50"}]},
    {"confidence":0.9,"boundingBox":{"vertices":[{"x":20,"y":400},{"x":90,"y":400},{"x":90,"y":416},{"x":20,"y":416}]},"symbols":[{"text":"TOTAL"}]},
    {"confidence":0.9,"boundingBox":{"vertices":[{"x":320,"y":400},{"x":380,"y":400},{"x":380,"y":416},{"x":320,"y":416}]},"symbols":[{"text":"$4.50"}]}
  ]}]}
]}]}}]}"#;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_version_command() {
    let mut cmd = cargo_bin_cmd!("tally");
    cmd.arg("version");

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("tally "));
}

#[test]
fn test_version_flag() {
    let mut cmd = cargo_bin_cmd!("tally");
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("tally "));
}

#[test]
fn test_version_short_flag() {
    let mut cmd = cargo_bin_cmd!("tally");
    cmd.arg("-V");

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("tally "));
}

#[test]
fn test_extract_command() {
    let input = write_temp(RECEIPT);
    let mut cmd = cargo_bin_cmd!("tally");
    cmd.arg("extract")
        .arg(input.path())
        .args(["--reference-date", "2030-01-01", "--compact"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""merchant":"CORNER CAFE""#))
        .stdout(predicate::str::contains(r#""total":4.5"#))
        .stdout(predicate::str::contains(r#""date":"2030-01-01""#));
}

#[test]
fn test_extract_writes_output_file() {
    let input = write_temp(RECEIPT);
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("record.json");

    let mut cmd = cargo_bin_cmd!("tally");
    cmd.arg("extract").arg(input.path()).arg("-o").arg(&output);
    cmd.assert().success();

    let written = std::fs::read_to_string(&output).unwrap();
    let value: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(value["merchant"], "CORNER CAFE");
    assert_eq!(value["line_items"].as_array().unwrap().len(), 1);
}

#[test]
fn test_extract_missing_annotation_fails() {
    let input = write_temp(r#"{"responses":[{}]}"#);
    let mut cmd = cargo_bin_cmd!("tally");
    cmd.arg("extract").arg(input.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("full text annotation"));
}

#[test]
fn test_extract_missing_file_fails() {
    let mut cmd = cargo_bin_cmd!("tally");
    cmd.args(["extract", "does/not/exist.json"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load OCR payload"));
}

#[test]
fn test_lines_command() {
    let input = write_temp(RECEIPT);
    let mut cmd = cargo_bin_cmd!("tally");
    cmd.arg("lines").arg(input.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("CORNER CAFE"))
        .stdout(predicate::str::contains("Latte $4.50"))
        .stdout(predicate::str::contains("TOTAL $4.50"));
}

#[test]
fn test_config_command() {
    let mut cmd = cargo_bin_cmd!("tally");
    cmd.arg("config");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("[weights]"))
        .stdout(predicate::str::contains("mode = \"standard\""));
}

#[test]
fn test_config_round_trips_through_extract() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("tally.toml");

    cargo_bin_cmd!("tally").arg("config").arg("-o").arg(&config).assert().success();
    assert!(config.exists());

    let input = write_temp(RECEIPT);
    cargo_bin_cmd!("tally")
        .arg("extract")
        .arg(input.path())
        .arg("-c")
        .arg(&config)
        .arg("--table-aware")
        .assert()
        .success()
        .stdout(predicate::str::contains("spatial_validation"));
}

#[test]
fn test_batch_command() {
    let good = write_temp(RECEIPT);
    let bad = write_temp("not json");

    let mut cmd = cargo_bin_cmd!("tally");
    cmd.arg("batch").arg(good.path()).arg(bad.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""succeeded": 1"#))
        .stdout(predicate::str::contains(r#""failed": 1"#));
}
