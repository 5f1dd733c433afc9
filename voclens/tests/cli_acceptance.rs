//! CLI acceptance tests
//!
//! Smoke tests over the compiled binary; anything touching the network or
//! the real XDG directories stays out of here.

use assert_cmd::Command;

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("voclens").unwrap();
    let assert = cmd.arg("--help").assert().success();

    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    for subcommand in ["sync", "stats", "count", "schedule"] {
        assert!(output.contains(subcommand), "help should list {}", subcommand);
    }
}

#[test]
fn test_version_flag() {
    let mut cmd = Command::cargo_bin("voclens").unwrap();
    cmd.arg("--version").assert().success();
}

#[test]
fn test_stats_requires_tags() {
    let mut cmd = Command::cargo_bin("voclens").unwrap();
    cmd.args(["stats", "--from", "2025-01-01", "--to", "2025-01-02"])
        .assert()
        .failure();
}
