//! CLI structure and argument parsing.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

pub fn nightwatch_deploy() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("nightwatch-deploy"));
    cmd.env("NO_COLOR", "1")
        .env_remove("NIGHTWATCH_DEPLOY_CONFIG")
        .env_remove("NIGHTWATCH_PORT")
        .env_remove("NIGHTWATCH_TOKEN");
    cmd
}

#[test]
fn test_cli_no_args_shows_help() {
    // clap with arg_required_else_help shows help on stderr and exits 2
    nightwatch_deploy()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Nightwatch"));
}

#[test]
fn test_cli_help_lists_commands() {
    nightwatch_deploy()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("setup"))
        .stdout(predicate::str::contains("enroll"))
        .stdout(predicate::str::contains("find-port"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    nightwatch_deploy()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_setup_help_lists_pipeline_flags() {
    nightwatch_deploy()
        .args(["setup", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--optimize-cache"))
        .stdout(predicate::str::contains("--strict-template"));
}

#[test]
fn test_unknown_command_fails() {
    nightwatch_deploy()
        .arg("deploy-everything")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_setup_rejects_non_numeric_port() {
    nightwatch_deploy()
        .args(["setup", "--port", "abc"])
        .assert()
        .code(2);
}
