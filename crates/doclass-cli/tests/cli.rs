use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn doclass(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("doclass").unwrap();
    cmd.env_remove("NUM_SAMPLES")
        .env_remove("EPOCHS")
        .env_remove("BATCH_SIZE")
        .arg("--config")
        .arg(config);
    cmd
}

/// Temp dir with an initialized config file.
fn workspace() -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    doclass(&config).args(["config", "init"]).assert().success();
    (dir, config)
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("doclass")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("train"))
        .stdout(predicate::str::contains("classify"))
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    doclass(&dir.path().join("absent.json"))
        .args(["generate", "-n", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_config_init_refuses_overwrite() {
    let (_dir, config) = workspace();
    doclass(&config)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    doclass(&config)
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_set_and_get() {
    let (_dir, config) = workspace();
    doclass(&config)
        .args(["config", "set", "training.epochs", "7"])
        .assert()
        .success();
    doclass(&config)
        .args(["config", "get", "training.epochs"])
        .assert()
        .success()
        .stdout("7\n");
    doclass(&config)
        .args(["config", "set", "training.no_such_key", "1"])
        .assert()
        .failure();
}

#[test]
fn test_generate_jsonl() {
    let (_dir, config) = workspace();
    let output = doclass(&config)
        .args(["generate", "-n", "5", "--seed", "3", "--no-noise"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 5);
    for line in lines {
        let record: serde_json::Value = serde_json::from_str(line).unwrap();
        let label = record["label"].as_str().unwrap();
        assert!(["invoice", "bank_statement", "drivers_license"].contains(&label));
        assert!(!record["text"].as_str().unwrap().is_empty());
    }
}

#[test]
fn test_generate_csv_to_file() {
    let (dir, config) = workspace();
    let out = dir.path().join("corpus.csv");
    doclass(&config)
        .args(["generate", "-n", "4", "--format", "csv", "--output"])
        .arg(&out)
        .assert()
        .success();

    let mut reader = csv::Reader::from_path(&out).unwrap();
    assert_eq!(reader.headers().unwrap(), vec!["text", "label"]);
    assert_eq!(reader.records().count(), 4);
}

#[test]
fn test_generate_unknown_industry() {
    let (_dir, config) = workspace();
    doclass(&config)
        .args(["generate", "--industry", "aerospace"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("aerospace"));
}

#[test]
fn test_classify_without_model_reports_errors() {
    let (dir, config) = workspace();
    let doc = dir.path().join("letter.xyz");
    std::fs::write(&doc, "hello").unwrap();
    let txt = dir.path().join("invoice.txt");
    std::fs::write(&txt, "Invoice Number: 42").unwrap();

    doclass(&config)
        .args(["classify", "--format", "csv", "--model-dir"])
        .arg(dir.path().join("no-model"))
        .arg(&doc)
        .arg(&txt)
        .assert()
        .success()
        .stdout(predicate::str::contains("Error: extraction error: Unsupported file type. Extension: xyz"))
        .stdout(predicate::str::contains("Error: prediction error"));
}

#[test]
fn test_train_then_classify() {
    let (dir, config) = workspace();
    let model = dir.path().join("model");

    doclass(&config)
        .args(["train", "-n", "120", "--epochs", "4", "--seed", "11", "--format", "json", "--output"])
        .arg(&model)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"train_samples\": 96"));

    assert!(model.join("label_encoder.json").exists());

    let docs = dir.path().join("docs");
    std::fs::create_dir(&docs).unwrap();
    std::fs::write(
        docs.join("statement.txt"),
        "Bank Statement\nAccount Holder: Jane Roe\nOpening Balance: $1,200.00\nClosing Balance: $980.00",
    )
    .unwrap();
    std::fs::write(docs.join("skip.md"), "# not a document").unwrap();

    let output = doclass(&config)
        .args(["classify", "--format", "json", "--model-dir"])
        .arg(&model)
        .arg(&docs)
        .output()
        .unwrap();
    assert!(output.status.success());

    let results: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["status"], "success");
    assert!(!results[0]["result"].as_str().unwrap().starts_with("Error: "));
}
