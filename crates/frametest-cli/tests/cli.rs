//! Binary-level checks that need no browser.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn frametest(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("frametest").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .arg("--no-color");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    frametest(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("watch"));
}

#[test]
fn test_missing_theme_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    frametest(&dir)
        .arg("run")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("theme.script"));
}

#[test]
fn test_no_test_files_exits_with_failure() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("frametest.toml"),
        "[theme]\nscript = \"theme.js\"\nstyle = \"theme.css\"\n",
    )
    .unwrap();
    fs::create_dir(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/util.ts"), "").unwrap();

    frametest(&dir)
        .args(["run", "--no-browser"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No test files found"));
}

#[test]
fn test_missing_runtime_script_is_reported() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("frametest.toml"),
        "runtimeScript = \"missing/runtime.js\"\n[theme]\nscript = \"theme.js\"\nstyle = \"theme.css\"\n",
    )
    .unwrap();
    fs::write(dir.path().join("a.test.ts"), "").unwrap();

    frametest(&dir)
        .args(["run", "--no-browser"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("runtime script"));
}
