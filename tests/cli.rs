use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use homeready::inspect_pdf_path;
use predicates::str::contains;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("homeready");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn generate_writes_requested_output() {
    let tmp = TempDir::new().expect("create temp dir");
    let output = tmp.path().join("report.pdf");
    cmd()
        .arg("generate")
        .arg(fixture("ready.json"))
        .arg(&output)
        .assert()
        .success()
        .stdout(contains("PDF generated:"))
        .stdout(contains("report.pdf"));

    let inspected = inspect_pdf_path(&output).expect("valid pdf");
    assert!(inspected.contains_text("Ready to Buy!"));
}

#[test]
fn generate_defaults_output_name() {
    let tmp = TempDir::new().expect("create temp dir");
    cmd()
        .current_dir(tmp.path())
        .arg("generate")
        .arg(fixture("ready.json"))
        .assert()
        .success()
        .stdout(contains("PDF generated: home_buying_report.pdf"));
    assert!(tmp.path().join("home_buying_report.pdf").is_file());
}

#[test]
fn stdin_mode_stamps_generation_time() {
    let tmp = TempDir::new().expect("create temp dir");
    cmd()
        .current_dir(tmp.path())
        .write_stdin(r#"{"readinessStatus": "Almost Ready", "inputs": {"creditScore": 720}}"#)
        .assert()
        .success()
        .stdout(contains("PDF generated: home_buying_report.pdf"));

    let inspected =
        inspect_pdf_path(&tmp.path().join("home_buying_report.pdf")).expect("valid pdf");
    assert!(inspected.contains_text("Generated on "));
    assert!(inspected.contains_text("Your credit score is good"));
    assert!(inspected.contains_text("Continue saving while monitoring interest rates"));
}

#[test]
fn missing_input_fails_without_output() {
    let tmp = TempDir::new().expect("create temp dir");
    let output = tmp.path().join("never.pdf");
    cmd()
        .arg("generate")
        .arg(tmp.path().join("absent.json"))
        .arg(&output)
        .assert()
        .failure()
        .code(1)
        .stderr(contains("error: failed to read input"));
    assert!(!output.exists());
}

#[test]
fn invalid_json_is_reported() {
    let tmp = TempDir::new().expect("create temp dir");
    let input = tmp.path().join("broken.json");
    fs::write(&input, "{ not json").expect("write input");
    cmd()
        .arg("generate")
        .arg(&input)
        .arg(tmp.path().join("out.pdf"))
        .assert()
        .failure()
        .stderr(contains("is not valid JSON"));
}

#[test]
fn unwritable_output_is_reported() {
    let tmp = TempDir::new().expect("create temp dir");
    cmd()
        .arg("generate")
        .arg(fixture("ready.json"))
        .arg(tmp.path().join("missing-dir").join("out.pdf"))
        .assert()
        .failure()
        .stderr(contains("failed to write report"));
}

#[test]
fn stdin_syntax_error_names_stdin() {
    let tmp = TempDir::new().expect("create temp dir");
    cmd()
        .current_dir(tmp.path())
        .write_stdin("[")
        .assert()
        .failure()
        .stderr(contains("input from stdin is not valid JSON"));
}
