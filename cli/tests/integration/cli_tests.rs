//! Integration tests for argument parsing and the offline commands.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const INPUT_VARS: &[&str] = &[
    "INPUT_OCI_REGISTRY",
    "INPUT_OCI_USERNAME",
    "INPUT_OCI_PASSWORD",
    "INPUT_BINARIES",
    "INPUT_VERSION",
    "INPUT_SIGNING_URL",
    "INPUT_SIGNING_TOKEN",
    "INPUT_SIGNING_CLIENT_ID",
    "GITHUB_WORKSPACE",
];

fn agent_metadata() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("agent-metadata"));
    cmd.env("NO_COLOR", "1");
    for var in INPUT_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn workspace_with(files: &[(&str, &[u8])]) -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    for (path, content) in files {
        let full = dir.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("mkdir");
        }
        std::fs::write(full, content).expect("write");
    }
    dir
}

const LINUX_BINARY: &str = r#"[{"name":"linux-amd64","path":"dist/agent.tar.gz","os":"linux","arch":"amd64","format":"tar+gzip"}]"#;

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help() {
    agent_metadata()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_cli_help_lists_commands() {
    agent_metadata()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("publish"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("version"));
}

#[test]
fn test_version_command_shows_version() {
    agent_metadata()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("agent-metadata 0.1.0"));
}

#[test]
fn test_no_color_accepts_conventional_values() {
    for value in ["1", "true", "yes", ""] {
        agent_metadata()
            .arg("version")
            .env("NO_COLOR", value)
            .assert()
            .success()
            .stdout(predicate::str::contains("agent-metadata 0.1.0"));
    }
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let output = agent_metadata()
        .args(["version", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value["version"], "0.1.0");
}

#[test]
fn test_publish_help_mentions_signing_inputs() {
    agent_metadata()
        .args(["publish", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--signing-url"))
        .stdout(predicate::str::contains("--agent-version"));
}

// --- validate ---

#[test]
fn test_validate_without_registry_is_disabled() {
    agent_metadata()
        .args(["validate", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""enabled": false"#));
}

#[test]
fn test_validate_accepts_existing_binary() {
    let ws = workspace_with(&[("dist/agent.tar.gz", b"payload")]);
    agent_metadata()
        .arg("validate")
        .env("INPUT_OCI_REGISTRY", "docker.io/newrelic/agents")
        .env("INPUT_BINARIES", LINUX_BINARY)
        .env("GITHUB_WORKSPACE", ws.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("linux-amd64"));
}

#[test]
fn test_validate_reports_missing_binary() {
    let ws = workspace_with(&[]);
    agent_metadata()
        .arg("validate")
        .env("INPUT_OCI_REGISTRY", "docker.io/newrelic/agents")
        .env("INPUT_BINARIES", LINUX_BINARY)
        .env("GITHUB_WORKSPACE", ws.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("binary upload failed"))
        .stderr(predicate::str::contains("linux-amd64"));
}

#[test]
fn test_validate_json_error_carries_code() {
    let ws = workspace_with(&[]);
    let output = agent_metadata()
        .args(["validate", "--json"])
        .env("INPUT_OCI_REGISTRY", "docker.io/newrelic/agents")
        .env("INPUT_BINARIES", LINUX_BINARY)
        .env("GITHUB_WORKSPACE", ws.path())
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value["error"], true);
    assert!(
        value["message"]
            .as_str()
            .is_some_and(|m| m.contains("binary upload failed"))
    );
    assert!(value["code"].is_string());
    assert!(value.get("results").is_none());
}

#[test]
fn test_validate_rejects_path_traversal() {
    let ws = workspace_with(&[]);
    agent_metadata()
        .arg("validate")
        .env("INPUT_OCI_REGISTRY", "docker.io/newrelic/agents")
        .env(
            "INPUT_BINARIES",
            r#"[{"name":"evil","path":"../etc/passwd","os":"linux","arch":"amd64","format":"tar"}]"#,
        )
        .env("GITHUB_WORKSPACE", ws.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("evil"));
}

#[test]
fn test_validate_rejects_registry_without_repository() {
    agent_metadata()
        .arg("validate")
        .env("INPUT_OCI_REGISTRY", "docker.io")
        .env("INPUT_BINARIES", LINUX_BINARY)
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "must contain both domain and repository path",
        ));
}

#[test]
fn test_validate_rejects_malformed_binaries_json() {
    agent_metadata()
        .arg("validate")
        .env("INPUT_OCI_REGISTRY", "docker.io/newrelic/agents")
        .env("INPUT_BINARIES", "not json")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot parse binaries JSON"));
}

// --- publish ---

#[test]
fn test_publish_without_registry_is_skipped() {
    agent_metadata()
        .args(["publish", "--json"])
        .env("INPUT_VERSION", "1.2.3")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""published": false"#));
}

#[test]
fn test_publish_disabled_ignores_missing_version() {
    agent_metadata()
        .arg("publish")
        .assert()
        .success()
        .stdout(predicate::str::contains("skipping binary publication"));
}

#[test]
fn test_publish_accepts_agent_version_flag() {
    agent_metadata()
        .args(["publish", "--json", "--agent-version", "1.2.3"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""published": false"#));
}

#[test]
fn test_publish_rejects_invalid_version() {
    let ws = workspace_with(&[("dist/agent.tar.gz", b"payload")]);
    agent_metadata()
        .arg("publish")
        .env("INPUT_VERSION", "latest")
        .env("INPUT_OCI_REGISTRY", "localhost:5000/agents")
        .env("INPUT_BINARIES", LINUX_BINARY)
        .env("GITHUB_WORKSPACE", ws.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not a valid semantic version"));
}

#[test]
fn test_publish_rejects_build_metadata_version() {
    let ws = workspace_with(&[("dist/agent.tar.gz", b"payload")]);
    agent_metadata()
        .arg("publish")
        .env("INPUT_VERSION", "1.2.3+build.5")
        .env("INPUT_OCI_REGISTRY", "localhost:5000/agents")
        .env("INPUT_BINARIES", LINUX_BINARY)
        .env("GITHUB_WORKSPACE", ws.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("build metadata"));
}

#[test]
fn test_publish_requires_signing_url_when_enabled() {
    let ws = workspace_with(&[("dist/agent.tar.gz", b"payload")]);
    agent_metadata()
        .arg("publish")
        .env("INPUT_VERSION", "1.2.3")
        .env("INPUT_OCI_REGISTRY", "localhost:5000/agents")
        .env("INPUT_BINARIES", LINUX_BINARY)
        .env("GITHUB_WORKSPACE", ws.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("INPUT_SIGNING_URL is required"));
}
