use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

/// A binary invocation isolated to `dir`: registry, config and home all live there.
fn gistskill(dir: &Path) -> Command {
    let config = dir.join("config.toml");
    if !config.exists() {
        std::fs::write(
            &config,
            format!(
                "[registry]\nroot = {:?}\n\n[linking]\nhome = {:?}\n",
                dir.join("skills").display().to_string(),
                dir.display().to_string()
            ),
        )
        .unwrap();
    }
    let mut cmd = Command::cargo_bin("gistskill").unwrap();
    cmd.env_remove("GISTSKILL_ROOT")
        .env_remove("GISTSKILL_PROVIDER")
        .env("GISTSKILL_GH_PATH", dir.join("no-gh"))
        .env("GISTSKILL_GLAB_PATH", dir.join("no-glab"))
        .arg("--config")
        .arg(&config);
    cmd
}

fn install_fixture(dir: &Path, name: &str) {
    let skill = dir.join("skills").join(name);
    std::fs::create_dir_all(&skill).unwrap();
    std::fs::write(skill.join("SKILL.md"), format!("---\nname: {name}\n---\n# {name}\n")).unwrap();
    std::fs::write(
        skill.join(".gistskill.json"),
        serde_json::json!({
            "name": name,
            "provider": "github",
            "bundle_id": format!("{name}-id"),
            "revision": "rev-1",
            "description": format!("{name} skill"),
            "version": "1.0.0",
            "author": "nico",
            "url": format!("https://gist.github.com/nico/{name}-id"),
            "installed_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-02T00:00:00Z"
        })
        .to_string(),
    )
    .unwrap();
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("gistskill").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("publish"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("gistskill").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_list_empty_registry() {
    let dir = tempdir().unwrap();
    gistskill(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No skills installed"));
}

#[test]
fn test_list_and_info_robot() {
    let dir = tempdir().unwrap();
    install_fixture(dir.path(), "zeta");
    install_fixture(dir.path(), "alpha");

    let output = gistskill(dir.path()).args(["--robot", "ls"]).output().unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"], "ok");
    let names: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["alpha", "zeta"]);

    let output = gistskill(dir.path())
        .args(["--robot", "info", "alpha"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["data"]["bundle_id"], "alpha-id");
    assert_eq!(json["data"]["files"], serde_json::json!(["SKILL.md"]));
}

#[test]
fn test_info_unknown_skill_fails_with_robot_error() {
    let dir = tempdir().unwrap();
    let output = gistskill(dir.path())
        .args(["--robot", "info", "ghost"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["error"], true);
    assert_eq!(json["code"], "not_found");
}

#[cfg(unix)]
#[test]
fn test_remove_deletes_skill_and_links() {
    let dir = tempdir().unwrap();
    install_fixture(dir.path(), "weather");
    std::fs::create_dir_all(dir.path().join(".claude")).unwrap();

    gistskill(dir.path())
        .args(["link", "weather", "--target", "claude-code"])
        .assert()
        .success();
    let link = dir.path().join(".claude/skills/weather");
    assert!(std::fs::symlink_metadata(&link).is_ok());

    gistskill(dir.path())
        .args(["rm", "weather"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed skill"));
    assert!(std::fs::symlink_metadata(&link).is_err());
    assert!(!dir.path().join("skills/weather").exists());

    gistskill(dir.path())
        .args(["remove", "weather"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not found"))
        .stderr(predicate::str::contains("gistskill list"));
}

#[test]
fn test_link_unknown_target() {
    let dir = tempdir().unwrap();
    install_fixture(dir.path(), "weather");
    gistskill(dir.path())
        .args(["--robot", "link", "weather", "--target", "emacs"])
        .assert()
        .code(4)
        .stdout(predicate::str::contains("unknown_target"));
}

#[test]
fn test_trust_add_list_remove() {
    let dir = tempdir().unwrap();

    gistskill(dir.path())
        .args(["trust", "Nico"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Trusted author \"Nico\""));

    let output = gistskill(dir.path())
        .args(["--robot", "trust", "--list"])
        .output()
        .unwrap();
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["data"][0]["username"], "Nico");

    gistskill(dir.path())
        .args(["trust", "--remove", "someone"])
        .assert()
        .success()
        .stdout(predicate::str::contains("was not trusted"));

    gistskill(dir.path())
        .args(["trust", "--remove", "nico"])
        .assert()
        .success();
    gistskill(dir.path())
        .args(["trust", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No trusted authors"));
}

#[test]
fn test_missing_backend_cli_is_backend_error() {
    let dir = tempdir().unwrap();
    gistskill(dir.path())
        .args(["--robot", "add", "abc123", "-y"])
        .assert()
        .code(5)
        .stdout(predicate::str::contains("backend_error"));

    gistskill(dir.path())
        .args(["add", "https://gitlab.com/-/snippets/42", "-y"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("glab auth status"));
}

#[test]
fn test_update_requires_name_or_all() {
    let dir = tempdir().unwrap();
    gistskill(dir.path()).arg("update").assert().code(2);
    gistskill(dir.path())
        .args(["update", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No skills installed"));
}
