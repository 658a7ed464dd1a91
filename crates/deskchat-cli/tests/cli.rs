//! Binary smoke tests.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_subcommands() {
    Command::cargo_bin("deskchat")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("agents"))
        .stdout(predicate::str::contains("upload"));
}

#[test]
fn test_version_prints() {
    Command::cargo_bin("deskchat")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("deskchat"));
}

#[test]
fn test_status_against_unreachable_backend_fails_cleanly() {
    // Empty home keeps any real user config out of the test.
    let home = tempfile::tempdir().unwrap();

    // Port 9 (discard) is not listening; the command must fail with a
    // readable error rather than a panic.
    Command::cargo_bin("deskchat")
        .unwrap()
        .env("DESKCHAT_HOME", home.path())
        .args(["--base-url", "http://127.0.0.1:9", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to reach backend"));
}
