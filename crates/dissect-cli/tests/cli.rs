use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const INVOICE: &str = r#"{
    "id": 42,
    "title": "ACME invoice",
    "correspondent": "ACME",
    "tags": ["inbox"],
    "pages": [
        {"width": 600, "height": 800, "text_runs": [
            {"x": 10, "y": 10, "x2": 60, "y2": 20, "text": "Invoice"},
            {"x": 10, "y": 740, "x2": 60, "y2": 752, "text": "Total:"},
            {"x": 65, "y": 740, "x2": 120, "y2": 752, "text": "1,234.50"}
        ]}
    ]
}"#;

const LETTER: &str = r#"{
    "id": 43,
    "title": "Letter",
    "pages": [
        {"width": 600, "height": 800, "text_runs": [
            {"x": 10, "y": 10, "x2": 60, "y2": 20, "text": "Dear"}
        ]}
    ]
}"#;

const PATTERN: &str = r#"{
    "name": "ACME invoices",
    "checks": [
        {"type": "correspondent", "name": "ACME"},
        {"type": "region", "x": 0, "y": 700, "x2": 600, "y2": 800,
         "page": "last_match", "kind": "simple", "simple_expr": "Total: <amount:number>"}
    ],
    "regions": [
        {"x": 0, "y": 700, "x2": 600, "y2": 800,
         "page": "last_match", "kind": "simple", "simple_expr": "Total: <amount:number>"}
    ],
    "fields": [
        {"kind": "custom", "name": "Total", "template": "{{ amount | parse_monetary }}"}
    ]
}"#;

/// Command with the user config directory pointed into the sandbox.
fn dissect(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("dissect").unwrap();
    cmd.env("XDG_CONFIG_HOME", dir).env("HOME", dir);
    cmd
}

fn path_str(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path_str(path)
}

#[test]
fn test_compile_prints_regex() {
    let dir = TempDir::new().unwrap();

    dissect(dir.path())
        .args(["compile", "Nr <n:int>", "--groups"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r"(?P<n>[0-9]+)"))
        .stdout(predicate::str::contains("n"));
}

#[test]
fn test_compile_rejects_unknown_kind() {
    let dir = TempDir::new().unwrap();

    dissect(dir.path())
        .args(["compile", "<n:colour>"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown placeholder kind"));
}

#[test]
fn test_compile_rejects_invalid_regex() {
    let dir = TempDir::new().unwrap();

    dissect(dir.path())
        .args(["compile", "--regex", "(unclosed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid regex"));
}

#[test]
fn test_evaluate_outputs_json() {
    let dir = TempDir::new().unwrap();
    let pattern = write(dir.path(), "pattern.json", PATTERN);
    let document = write(dir.path(), "invoice.json", INVOICE);

    let output = dissect(dir.path())
        .args(["evaluate", "-p", pattern.as_str(), "-d", document.as_str()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["checks"][0]["passed"], true);
    assert_eq!(result["checks"][1]["passed"], true);
    assert_eq!(result["regions"][0][0]["is_retained"], true);
    assert_eq!(result["regions"][0][0]["group_values"]["amount"], "1,234.50");
    assert_eq!(result["fields"][0]["value"], "1234.50");
}

#[test]
fn test_evaluate_text_format() {
    let dir = TempDir::new().unwrap();
    let pattern = write(dir.path(), "pattern.json", PATTERN);
    let document = write(dir.path(), "letter.json", LETTER);

    dissect(dir.path())
        .args(["evaluate", "-p", pattern.as_str(), "-d", document.as_str(), "-f", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("NO MATCH"))
        .stdout(predicate::str::contains("undefined variable"));
}

#[test]
fn test_evaluate_missing_document() {
    let dir = TempDir::new().unwrap();
    let pattern = write(dir.path(), "pattern.json", PATTERN);

    dissect(dir.path())
        .args(["evaluate", "-p", pattern.as_str(), "-d", "does-not-exist.json"])
        .assert()
        .failure();
}

#[test]
fn test_batch_writes_results() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("patterns")).unwrap();
    fs::create_dir(dir.path().join("documents")).unwrap();
    write(dir.path(), "patterns/acme.json", PATTERN);
    write(dir.path(), "documents/invoice.json", INVOICE);
    write(dir.path(), "documents/letter.json", LETTER);

    let output = path_str(dir.path().join("results.json"));
    let patterns = path_str(dir.path().join("patterns/*.json"));
    let documents = path_str(dir.path().join("documents/*.json"));

    dissect(dir.path())
        .args([
            "batch",
            "-p",
            patterns.as_str(),
            "-d",
            documents.as_str(),
            "-o",
            output.as_str(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 matched"));

    let results: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(results["matched"]["42"][0], "ACME invoices");
    assert_eq!(results["unmatched"][0]["id"], 43);
    assert_eq!(results["errors"].as_array().unwrap().len(), 0);
}

#[test]
fn test_batch_fails_without_documents() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "pattern.json", PATTERN);
    let patterns = path_str(dir.path().join("*.json"));
    let documents = path_str(dir.path().join("missing/*.json"));

    dissect(dir.path())
        .args([
            "batch",
            "-p",
            patterns.as_str(),
            "-d",
            documents.as_str(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn test_config_init_and_get() {
    let dir = TempDir::new().unwrap();
    let config = path_str(dir.path().join("dissect.json"));
    let config = config.as_str();

    dissect(dir.path())
        .args(["--config", config, "config", "init"])
        .assert()
        .success();

    dissect(dir.path())
        .args(["--config", config, "config", "set", "processing.jobs", "2"])
        .assert()
        .success();

    dissect(dir.path())
        .args(["--config", config, "config", "get", "processing.jobs"])
        .assert()
        .success()
        .stdout(predicate::str::diff("2\n"));

    dissect(dir.path())
        .args(["--config", config, "config", "get", "processing.nope"])
        .assert()
        .failure();
}
