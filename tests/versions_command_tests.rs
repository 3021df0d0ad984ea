//! Versions command tests

mod common;

use common::{TestWorkspace, mixer_cmd};
use predicates::prelude::*;

#[test]
fn test_versions_report() {
    let workspace = TestWorkspace::initialized();
    workspace.write_upstream_mirror(29, 29000, 30100);

    mixer_cmd()
        .current_dir(&workspace.path)
        .arg("versions")
        .assert()
        .success()
        .stdout(predicate::str::contains("10"))
        .stdout(predicate::str::contains("30000"))
        .stdout(predicate::str::contains("versions 29000 to 30100"));
}

#[test]
fn test_versions_update_to_latest() {
    let workspace = TestWorkspace::initialized();
    workspace.write_upstream_mirror(29, 29000, 30100);

    mixer_cmd()
        .current_dir(&workspace.path)
        .args(["versions", "update"])
        .assert()
        .success()
        .stdout(predicate::str::contains("latest version of its format"));

    assert_eq!(workspace.read_file("mixversion").trim(), "20");
    assert_eq!(workspace.read_file("upstreamversion").trim(), "30100");
}

#[test]
fn test_versions_update_rejects_other_format() {
    let workspace = TestWorkspace::initialized();
    workspace.write_upstream_mirror(29, 29000, 30100);

    mixer_cmd()
        .current_dir(&workspace.path)
        .args(["versions", "update", "--upstream-version", "31000"])
        .assert()
        .failure();

    assert_eq!(workspace.read_file("mixversion").trim(), "10");
    assert_eq!(workspace.read_file("upstreamversion").trim(), "30000");
}

#[test]
fn test_versions_update_rejects_going_back() {
    let workspace = TestWorkspace::initialized();
    workspace.write_upstream_mirror(29, 29000, 30100);

    mixer_cmd()
        .current_dir(&workspace.path)
        .args(["versions", "update", "--mix-version", "5"])
        .assert()
        .failure();
}

#[test]
fn test_versions_without_mirror_fails() {
    let workspace = TestWorkspace::initialized();

    mixer_cmd()
        .current_dir(&workspace.path)
        .arg("versions")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}
