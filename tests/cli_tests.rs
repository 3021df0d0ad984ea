//! CLI integration tests using the real mixer binary

mod common;

use common::{TestWorkspace, mixer_cmd};
use predicates::prelude::*;

#[test]
fn test_help_output() {
    mixer_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("bundle"))
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("versions"));
}

#[test]
fn test_version_flag() {
    mixer_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mixer"));
}

#[test]
fn test_init_creates_workspace() {
    let workspace = TestWorkspace::new();

    mixer_cmd()
        .current_dir(&workspace.path)
        .args(["init", "--upstream-version", "30000", "--mix-version", "100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    assert_eq!(workspace.read_file("mixversion").trim(), "100");
    assert_eq!(workspace.read_file("upstreamversion").trim(), "30000");
    assert_eq!(workspace.read_file("mixbundles"), "os-core\n");
    assert!(workspace.file_exists("mixer.yaml"));
    assert!(workspace.file_exists("mixer.state"));
}

#[test]
fn test_init_twice_fails() {
    let workspace = TestWorkspace::initialized();

    mixer_cmd()
        .current_dir(&workspace.path)
        .args(["init", "--upstream-version", "30000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already a mix workspace"));
}

#[test]
fn test_command_outside_workspace_fails() {
    let workspace = TestWorkspace::new();

    mixer_cmd()
        .current_dir(&workspace.path)
        .args(["bundle", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_workspace_option() {
    let workspace = TestWorkspace::initialized();
    let elsewhere = TestWorkspace::new();

    mixer_cmd()
        .current_dir(&elsewhere.path)
        .args(["bundle", "list", "-w"])
        .arg(&workspace.path)
        .assert()
        .success()
        .stdout(predicate::str::contains("os-core"));
}

#[test]
fn test_completions_unknown_shell() {
    mixer_cmd()
        .args(["completions", "tcsh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown shell"));
}

#[test]
fn test_completions_bash() {
    mixer_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mixer"));
}
