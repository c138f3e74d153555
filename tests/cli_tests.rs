//! # CLI Tests / 命令行测试
//!
//! Drives the compiled binary end to end. Matrices point at copies of the
//! fixtures and use a shell stand-in for the tool.

mod common;

use assert_cmd::Command;
use common::{fixture, install_stub_tool};
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn runner_cmd() -> Command {
    let mut cmd = Command::cargo_bin("validation-runner").unwrap();
    cmd.env("NO_COLOR", "1").env("RUST_LOG", "off");
    cmd
}

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        fs::copy(entry.path(), to.join(entry.file_name())).unwrap();
    }
}

/// Writes `matrix.toml` plus copies of the named fixtures into a temp dir.
/// Each case is `(name, fixture, expect_success)`; the fixture is copied to
/// a subdirectory of the same name.
fn workspace(cases: &[(&str, &str, bool)]) -> TempDir {
    let dir = tempdir().unwrap();
    let tool = install_stub_tool(dir.path());

    let mut matrix = format!(
        "tool = {tool:?}\n\n[backoff]\ninitial_delay_ms = 1\nmax_delay_ms = 1\n"
    );
    for (name, fixture_name, expect_success) in cases {
        let source = fixture(fixture_name);
        if source.is_dir() && !dir.path().join(fixture_name).exists() {
            copy_dir(&source, &dir.path().join(fixture_name));
        }
        matrix.push_str(&format!(
            "\n[[cases]]\nname = {name:?}\ndir = {fixture_name:?}\nexpect_success = {expect_success}\n"
        ));
    }
    fs::write(dir.path().join("matrix.toml"), matrix).unwrap();
    dir
}

#[cfg(unix)]
#[test]
fn run_passes_both_valid_scenarios() {
    let dir = workspace(&[
        ("ValidConfiguration", "valid-config", true),
        ("ValidWithDNS", "valid-config-with-dns", true),
    ]);

    runner_cmd()
        .args(["--lang", "en", "run", "-c"])
        .arg(dir.path().join("matrix.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Case 'ValidConfiguration' passed"))
        .stdout(predicate::str::contains("Case 'ValidWithDNS' passed"))
        .stdout(predicate::str::contains("VALIDATION MATRIX PASSED SUCCESSFULLY"));

    assert!(dir.path().join("valid-config/.terraform.lock.hcl").is_file());
}

#[cfg(unix)]
#[test]
fn run_reports_missing_directory_as_setup_failure() {
    let dir = workspace(&[
        ("ValidConfiguration", "valid-config", true),
        ("Missing", "missing-config", true),
    ]);

    runner_cmd()
        .args(["--lang", "en", "run", "-c"])
        .arg(dir.path().join("matrix.toml"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("UNEXPECTED FAILURE DETECTED"))
        .stdout(predicate::str::contains("missing-config"))
        .stdout(predicate::str::contains("Setup Error"))
        .stderr(predicate::str::contains("1 unexpected failure(s)"));
}

#[cfg(unix)]
#[test]
fn run_accepts_broken_config_that_is_expected_to_fail() {
    let dir = workspace(&[("Broken", "broken-config", false)]);

    runner_cmd()
        .args(["--lang", "en", "run", "-c"])
        .arg(dir.path().join("matrix.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("failed as expected"));
}

#[cfg(unix)]
#[test]
fn run_fails_on_broken_config_and_shows_tool_output() {
    let dir = workspace(&[("Broken", "broken-config", true)]);

    runner_cmd()
        .args(["--lang", "en", "run", "-c"])
        .arg(dir.path().join("matrix.toml"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("Validate Log"))
        .stdout(predicate::str::contains("Missing name for resource"));
}

#[cfg(unix)]
#[test]
fn run_filter_limits_cases() {
    let dir = workspace(&[
        ("ValidConfiguration", "valid-config", true),
        ("ValidWithDNS", "valid-config-with-dns", true),
    ]);

    runner_cmd()
        .args(["--lang", "en", "run", "--filter", "DNS", "-c"])
        .arg(dir.path().join("matrix.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("ValidWithDNS"))
        .stdout(predicate::str::contains("'ValidConfiguration'").not());
}

#[cfg(unix)]
#[test]
fn run_writes_json_and_html_reports() {
    let dir = workspace(&[("ValidConfiguration", "valid-config", true)]);
    let json = dir.path().join("report.json");
    let html = dir.path().join("report.html");

    runner_cmd()
        .args(["--lang", "en", "run", "-c"])
        .arg(dir.path().join("matrix.toml"))
        .arg("--json")
        .arg(&json)
        .arg("--html")
        .arg(&html)
        .assert()
        .success();

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(report["summary"]["passed"], 1);
    assert_eq!(report["results"][0]["status"], "passed");
    assert_eq!(report["results"][0]["case"]["name"], "ValidConfiguration");
    assert!(fs::read_to_string(&html).unwrap().contains("ValidConfiguration"));
}

#[cfg(unix)]
#[test]
fn run_speaks_chinese_when_asked() {
    let dir = workspace(&[("ValidConfiguration", "valid-config", true)]);

    runner_cmd()
        .args(["run", "--lang", "zh-CN", "-c"])
        .arg(dir.path().join("matrix.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("验证矩阵全部通过"));
}

#[test]
fn run_fails_when_matrix_file_is_missing() {
    let dir = tempdir().unwrap();

    runner_cmd()
        .args(["--lang", "en", "run", "-c"])
        .arg(dir.path().join("nope.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read matrix file"));
}

#[test]
fn run_rejects_duplicate_case_names() {
    let dir = tempdir().unwrap();
    let matrix = dir.path().join("matrix.toml");
    fs::write(
        &matrix,
        "[[cases]]\nname = \"a\"\ndir = \".\"\n\n[[cases]]\nname = \"a\"\ndir = \".\"\n",
    )
    .unwrap();

    runner_cmd()
        .args(["--lang", "en", "run", "-c"])
        .arg(&matrix)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Duplicate case name"));
}

#[test]
fn init_writes_template() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("ci").join("ValidationMatrix.toml");

    runner_cmd()
        .args(["--lang", "en", "init", "--non-interactive", "-o"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created validation matrix"));

    let content = fs::read_to_string(&output).unwrap();
    assert!(content.contains("ValidWithDNS"));
}

#[test]
fn init_keeps_existing_file_without_force() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("ValidationMatrix.toml");
    fs::write(&output, "# mine\n").unwrap();

    runner_cmd()
        .args(["--lang", "en", "init", "--non-interactive", "-o"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("File already exists"));
    assert_eq!(fs::read_to_string(&output).unwrap(), "# mine\n");

    runner_cmd()
        .args(["--lang", "en", "init", "--non-interactive", "--force", "-o"])
        .arg(&output)
        .assert()
        .success();
    assert!(fs::read_to_string(&output).unwrap().contains("[[cases]]"));
}

#[test]
fn missing_subcommand_prints_help() {
    runner_cmd().assert().failure().stderr(predicate::str::contains("Usage"));
}
