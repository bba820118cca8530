//! Integration tests for the command-line surface.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("tljh-bootstrap"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--show-progress-page"))
        .stdout(predicate::str::contains("--version <VERSION>"))
        .stdout(predicate::str::contains(
            "passed through to the TLJH installer",
        ));
    Ok(())
}

#[test]
fn cli_help_hides_progress_server() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("tljh-bootstrap"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("progress-server").not());
    Ok(())
}

#[test]
fn cli_version_requires_value() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("tljh-bootstrap"));
    cmd.arg("--version");
    cmd.assert().failure().code(2);
    Ok(())
}

#[test]
fn progress_server_requires_log_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("tljh-bootstrap"));
    cmd.arg("progress-server");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--log-file"));
    Ok(())
}

#[test]
fn progress_server_fails_on_bad_port() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("tljh-bootstrap"));
    cmd.args(["progress-server", "--log-file", "installer.log", "--port", "http"]);
    cmd.assert().failure().code(2);
    Ok(())
}
