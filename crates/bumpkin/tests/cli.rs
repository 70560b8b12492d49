//! End-to-end CLI integration tests
//!
//! These tests invoke the compiled binary as a subprocess to verify
//! that the CLI behaves correctly from a user's perspective.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Returns a Command configured to run our binary.
///
/// Note: `cargo_bin` is marked deprecated for edge cases involving custom
/// cargo build directories, but works correctly for standard project layouts.
#[allow(deprecated)]
fn cmd() -> Command {
    Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap()
}

/// A temp project with a discoverable config and one versioned file.
///
/// No `.git` directory is created, so SCM detection stays empty and no
/// commit or tag is ever attempted.
fn project(current: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("VERSION"), format!("{current}\n")).unwrap();
    fs::write(
        tmp.path().join(".bumpkin.toml"),
        format!(
            r#"current_version = "{current}"

[[file]]
path = "VERSION"
"#
        ),
    )
    .unwrap();
    tmp
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_shows_usage() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("Options:"));
}

#[test]
fn version_flag_shows_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn bump_help_shows_flags() {
    cmd()
        .args(["bump", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--new-version"))
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--allow-dirty"));
}

// =============================================================================
// Show Command
// =============================================================================

#[test]
fn show_prints_package_name() {
    let tmp = project("1.2.3");
    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_NAME")))
        .stdout(predicate::str::contains("1.2.3"));
}

#[test]
fn show_json_outputs_valid_json() {
    let tmp = project("1.2.3");
    let output = cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "show", "--json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("show --json should output valid JSON");

    assert_eq!(json["name"], env!("CARGO_PKG_NAME"));
    assert_eq!(json["current_version"], "1.2.3");
    assert_eq!(json["files"][0], "VERSION");
}

// =============================================================================
// Bump Command
// =============================================================================

#[test]
fn bump_patch_updates_files_and_config() {
    let tmp = project("1.2.3");
    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "bump", "patch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.2.4"));

    let version = fs::read_to_string(tmp.path().join("VERSION")).unwrap();
    assert_eq!(version, "1.2.4\n");
    let config = fs::read_to_string(tmp.path().join(".bumpkin.toml")).unwrap();
    assert!(config.contains("current_version = \"1.2.4\""));
}

#[test]
fn bump_explicit_version() {
    let tmp = project("1.2.3");
    cmd()
        .args([
            "-C",
            tmp.path().to_str().unwrap(),
            "bump",
            "--new-version",
            "2.0.0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("2.0.0"));

    let version = fs::read_to_string(tmp.path().join("VERSION")).unwrap();
    assert_eq!(version, "2.0.0\n");
}

#[test]
fn bump_dry_run_leaves_everything_alone() {
    let tmp = project("1.2.3");
    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "bump", "minor", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.3.0"))
        .stdout(predicate::str::contains("Dry run"));

    let version = fs::read_to_string(tmp.path().join("VERSION")).unwrap();
    assert_eq!(version, "1.2.3\n");
    let config = fs::read_to_string(tmp.path().join(".bumpkin.toml")).unwrap();
    assert!(config.contains("current_version = \"1.2.3\""));
}

#[test]
fn bump_to_same_version_is_inert() {
    let tmp = project("1.2.3");
    cmd()
        .args([
            "-C",
            tmp.path().to_str().unwrap(),
            "bump",
            "--new-version",
            "1.2.3",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to do"));

    let version = fs::read_to_string(tmp.path().join("VERSION")).unwrap();
    assert_eq!(version, "1.2.3\n");
}

#[test]
fn bump_without_component_or_version_fails() {
    let tmp = project("1.2.3");
    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "bump"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unable to determine the next version"));
}

#[test]
fn bump_unknown_component_fails() {
    let tmp = project("1.2.3");
    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "bump", "flavor"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown version component"));
}

#[test]
fn bump_without_config_fails() {
    let tmp = TempDir::new().unwrap();
    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "bump", "patch"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("current_version"));
}

#[test]
fn bump_json_reports_outcome() {
    let tmp = project("0.9.0");
    let output = cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "bump", "minor", "--json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("bump --json should output valid JSON");

    assert_eq!(json["previous"], "0.9.0");
    assert_eq!(json["new"], "0.10.0");
    assert_eq!(json["skipped"], false);
}

// =============================================================================
// Error Cases
// =============================================================================

#[test]
fn invalid_subcommand_shows_error() {
    cmd()
        .arg("not-a-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn chdir_nonexistent_fails() {
    cmd()
        .args(["-C", "/nonexistent/path/that/does/not/exist", "show"])
        .assert()
        .failure();
}
