//! Inventory loading and host resolution through the `hosts` command.

#![allow(clippy::expect_used)]

use predicates::prelude::*;
use serial_test::serial;

use crate::cli_tests::nightwatch_deploy;

const INVENTORY: &str = "\
defaults:
  bin/php: /usr/bin/php8.3
hosts:
  web01:
    hostname: web01.example.com
    deploy_path: /var/www/app
  web02:
    hostname: web02.example.com
    deploy_path: /srv/app/
    nightwatch_port: 2100
";

fn workspace() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("deploy.yaml"), INVENTORY).expect("write inventory");
    dir
}

#[test]
fn test_missing_inventory_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    nightwatch_deploy()
        .current_dir(dir.path())
        .arg("hosts")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("deploy.yaml"));
}

#[test]
fn test_hosts_lists_resolved_settings() {
    let dir = workspace();
    nightwatch_deploy()
        .current_dir(dir.path())
        .arg("hosts")
        .assert()
        .success()
        .stdout(predicate::str::contains("web01examplecom-nightwatch-agent"))
        .stdout(predicate::str::contains("/etc/supervisor/conf.d/web02examplecom.conf"));
}

#[test]
fn test_hosts_json_honours_host_filter() {
    let dir = workspace();
    let output = nightwatch_deploy()
        .current_dir(dir.path())
        .args(["--json", "--host", "web02", "hosts"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    let hosts = value.as_array().expect("array");
    assert_eq!(hosts.len(), 1);
    assert_eq!(hosts[0]["host"], "web02");
    assert_eq!(hosts[0]["deploy_path"], "/srv/app");
    assert_eq!(hosts[0]["nightwatch_port"], 2100);
}

#[test]
fn test_unknown_host_json_error() {
    let dir = workspace();
    let output = nightwatch_deploy()
        .current_dir(dir.path())
        .args(["--json", "--host", "db01", "hosts"])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value["error"], true);
    assert_eq!(value["code"], "UNKNOWN_HOST");
}

#[test]
fn test_config_flag_points_at_inventory() {
    let dir = workspace();
    let other = tempfile::tempdir().expect("tempdir");
    nightwatch_deploy()
        .current_dir(other.path())
        .arg("--config")
        .arg(dir.path().join("deploy.yaml"))
        .arg("hosts")
        .assert()
        .success()
        .stdout(predicate::str::contains("web01"));
}

#[test]
fn test_config_env_var_points_at_inventory() {
    let dir = workspace();
    let other = tempfile::tempdir().expect("tempdir");
    nightwatch_deploy()
        .current_dir(other.path())
        .env("NIGHTWATCH_DEPLOY_CONFIG", dir.path().join("deploy.yaml"))
        .arg("hosts")
        .assert()
        .success()
        .stdout(predicate::str::contains("web02"));
}

#[test]
#[serial]
fn test_env_file_sets_default_port() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("deploy.yaml"),
        "hosts:\n  web01:\n    deploy_path: /var/www/app\n",
    )
    .expect("write inventory");
    std::fs::write(dir.path().join(".env.deployer"), "NIGHTWATCH_PORT=2300\n").expect("write env");
    let output = nightwatch_deploy()
        .current_dir(dir.path())
        .args(["--json", "hosts"])
        .output()
        .expect("run");
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value[0]["nightwatch_port"], 2300);
}

#[test]
#[serial]
fn test_process_env_port_wins_over_env_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("deploy.yaml"),
        "hosts:\n  web01:\n    deploy_path: /var/www/app\n",
    )
    .expect("write inventory");
    std::fs::write(dir.path().join(".env.deployer"), "NIGHTWATCH_PORT=2300\n").expect("write env");
    let output = nightwatch_deploy()
        .current_dir(dir.path())
        .env("NIGHTWATCH_PORT", "2400")
        .args(["--json", "hosts"])
        .output()
        .expect("run");
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value[0]["nightwatch_port"], 2400);
}
