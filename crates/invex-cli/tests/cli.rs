//! Black-box tests for the `invex` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

const ACME: &str = "Acme Supplies\n\
Invoice Number: INV-1002\n\
Invoice Date: 03/04/2024\n\
Widget A    2 x 10.00\n\
Subtotal 20.00\n\
Tax 1.60\n\
Total 21.60\n";

fn invex(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("invex").unwrap();
    // Keep every test away from the user's real config file.
    cmd.arg("--config").arg(dir.join("config.json"));
    cmd
}

/// Runs without `--config`, with the per-user config directory under `home`.
fn invex_at_home(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("invex").unwrap();
    cmd.env("HOME", home).env("XDG_CONFIG_HOME", home.join(".config"));
    cmd
}

fn write_config(dir: &Path, config: Value) {
    fs::write(dir.join("config.json"), config.to_string()).unwrap();
}

#[test]
fn process_emits_canonical_json() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), json!({}));
    let input = dir.path().join("acme.txt");
    fs::write(&input, ACME).unwrap();

    let output = invex(dir.path()).arg("process").arg(&input).output().unwrap();
    assert!(output.status.success());

    let record: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        record,
        json!({
            "vendor": "Acme Supplies",
            "invoiceNumber": "INV-1002",
            "invoiceDate": "2024-03-04",
            "subtotal": 20.0,
            "tax": 1.6,
            "total": 21.6,
            "lineItems": [
                {"description": "Widget A", "quantity": 2.0, "unitPrice": 10.0, "lineTotal": 20.0}
            ]
        })
    );
}

#[test]
fn process_writes_csv_to_file() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), json!({}));
    let input = dir.path().join("acme.txt");
    let out = dir.path().join("acme.csv");
    fs::write(&input, ACME).unwrap();

    invex(dir.path())
        .args(["process", "--format", "csv", "--output"])
        .arg(&out)
        .arg(&input)
        .assert()
        .success();

    let csv = fs::read_to_string(&out).unwrap();
    assert!(csv.starts_with("vendor,invoice_number,invoice_date"));
    assert!(csv.contains("Acme Supplies,INV-1002,2024-03-04"));
}

#[test]
fn process_reports_fallback_when_validating() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), json!({}));
    let input = dir.path().join("globex.txt");
    fs::write(&input, "Globex Corp\nTotal: $250\n").unwrap();

    invex(dir.path())
        .args(["process", "--validate"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"description\": \"Invoice Total\""))
        .stderr(predicate::str::contains("No line items recovered"));
}

#[test]
fn process_rejects_missing_and_unsupported_inputs() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), json!({}));

    invex(dir.path())
        .arg("process")
        .arg(dir.path().join("missing.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));

    let image = dir.path().join("scan.png");
    fs::write(&image, b"\x89PNG").unwrap();
    invex(dir.path())
        .arg("process")
        .arg(&image)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported input format"));
}

#[test]
fn llm_parser_requires_configured_backend() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), json!({"generative": {"enabled": false}}));
    let input = dir.path().join("acme.txt");
    fs::write(&input, ACME).unwrap();

    invex(dir.path())
        .args(["process", "--parser", "llm"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("generative backend unavailable"));

    invex(dir.path())
        .args(["process", "--parser", "auto"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("INV-1002"));
}

#[test]
fn normalize_reads_stdin() {
    let dir = TempDir::new().unwrap();

    let output = invex(dir.path())
        .arg("normalize")
        .write_stdin("```json\n{\"vendor\": \" Acme \", \"total\": \"12.50\", \"invoiceDate\": \"04/03/2024\"}\n```")
        .output()
        .unwrap();
    assert!(output.status.success());

    let record: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(record["vendor"], "Acme");
    assert_eq!(record["invoiceNumber"], Value::Null);
    assert_eq!(record["invoiceDate"], Value::Null);
    assert_eq!(
        record["lineItems"],
        json!([{"description": "Invoice Total", "quantity": 1.0, "unitPrice": 12.5, "lineTotal": 12.5}])
    );
}

#[test]
fn normalize_rejects_non_object_payload() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("payload.json");
    fs::write(&input, "[1, 2, 3]").unwrap();

    invex(dir.path())
        .arg("normalize")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid LLM JSON"));
}

#[test]
fn batch_writes_outputs_and_summary() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), json!({}));
    let scans = dir.path().join("scans");
    let out = dir.path().join("out");
    fs::create_dir_all(&scans).unwrap();
    fs::write(scans.join("acme.txt"), ACME).unwrap();
    fs::write(scans.join("globex.txt"), "Globex Corp\nTotal 250\n").unwrap();
    fs::write(scans.join("broken.pdf"), "not a pdf").unwrap();

    let pattern = format!("{}/*", scans.display());
    invex(dir.path())
        .args(["batch", "--summary", "--continue-on-error", "--output-dir"])
        .arg(&out)
        .arg(&pattern)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 successful, 1 failed"));

    assert!(out.join("acme.json").exists());
    assert!(out.join("globex.json").exists());
    assert!(!out.join("broken.json").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert_eq!(summary.lines().count(), 4);
    assert!(summary.contains("acme.txt,success,Acme Supplies,INV-1002,2024-03-04,21.60,1"));
    assert!(summary.contains("broken.pdf,error"));
}

#[test]
fn batch_stops_on_first_error_by_default() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), json!({}));
    fs::write(dir.path().join("broken.pdf"), "not a pdf").unwrap();

    invex(dir.path())
        .arg("batch")
        .arg(format!("{}/*.pdf", dir.path().display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}

#[test]
fn config_init_set_get_roundtrip() {
    let dir = TempDir::new().unwrap();

    invex(dir.path()).args(["config", "init"]).assert().success();
    assert!(dir.path().join("config.json").exists());

    invex(dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    invex(dir.path())
        .args(["config", "set", "generative.model", "local-model"])
        .assert()
        .success();

    invex(dir.path())
        .args(["config", "get", "generative.model"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"local-model\""));

    invex(dir.path())
        .args(["config", "get", "generative.nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn process_reads_user_config_written_by_config_set() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("acme.txt");
    fs::write(&input, ACME).unwrap();

    invex_at_home(home.path())
        .arg("process")
        .arg(&input)
        .assert()
        .success();

    invex_at_home(home.path())
        .args(["config", "set", "source.max_bytes", "8"])
        .assert()
        .success();
    assert!(home.path().join(".config/invex/config.json").exists());

    invex_at_home(home.path())
        .arg("process")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("limit is 8"));
}
