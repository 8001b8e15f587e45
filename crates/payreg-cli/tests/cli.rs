use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Config pointing at files that do not exist inside `dir`, with a
/// WebDriver endpoint nothing listens on.
fn write_config(dir: &Path) -> String {
    let config = serde_json::json!({
        "ocr": { "model_dir": dir.join("no-models") },
        "form": { "webdriver_url": "http://127.0.0.1:9" },
        "pipeline": {
            "invoice_image": dir.join("invoice.jpg"),
            "form_html": dir.join("payment_form.html"),
        }
    });
    let path = dir.join("config.json");
    fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    path.to_string_lossy().into_owned()
}

fn payreg(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("payreg").unwrap();
    cmd.current_dir(dir).env_remove("GEMINI_API_KEY");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    payreg(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ocr"))
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("submit"));
}

#[test]
fn test_config_path_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("absent.json");
    payreg(dir.path())
        .args(["-c", config.to_str().unwrap(), "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not created"));
}

#[test]
fn test_config_init_then_get() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("nested").join("config.json");
    let config = config.to_str().unwrap();

    payreg(dir.path())
        .args(["-c", config, "config", "init"])
        .assert()
        .success();

    payreg(dir.path())
        .args(["-c", config, "config", "get", "policy.currency_symbol"])
        .assert()
        .success()
        .stdout(predicate::str::contains("R$"));

    // A second init without --force refuses to overwrite
    payreg(dir.path())
        .args(["-c", config, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn test_config_get_unknown_key_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    payreg(dir.path())
        .args(["-c", &config, "config", "get", "policy.nope"])
        .assert()
        .failure();
}

#[test]
fn test_ocr_without_models_prints_mock_text() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    payreg(dir.path())
        .args(["-c", &config, "ocr"])
        .assert()
        .success()
        .stdout(predicate::str::contains("VALOR TOTAL: R$ 4.500,00"));
}

#[test]
fn test_analyze_without_api_key_reports_error_record() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    payreg(dir.path())
        .args(["-c", &config, "analyze", "--text", "Total: R$ 10,00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"isApproved\": false"))
        .stdout(predicate::str::contains("GEMINI_API_KEY"));
}

#[test]
fn test_run_without_api_key_stops_before_the_form() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    payreg(dir.path())
        .args(["-c", &config])
        .assert()
        .success()
        .stdout(predicate::str::contains("validating"))
        .stdout(predicate::str::contains("GEMINI_API_KEY"));
}

#[test]
fn test_submit_rejects_invalid_total() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    payreg(dir.path())
        .args(["-c", &config, "submit", "--total", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid total amount"));
}

#[test]
fn test_submit_missing_form_fails_without_browser() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    payreg(dir.path())
        .args(["-c", &config, "submit"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("payment_form.html"));
}
