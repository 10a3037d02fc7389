//! Integration tests for the grafter CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("home")).unwrap();
        Self { dir }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    fn store(&self) -> PathBuf {
        self.path("state/missions.yml")
    }

    /// grafter with an isolated HOME and the sandbox store
    fn grafter(&self) -> Command {
        let mut cmd = Command::cargo_bin("grafter").unwrap();
        cmd.env("HOME", self.path("home"))
            .env_remove("RUST_LOG")
            .arg("--store")
            .arg(self.store());
        cmd
    }

    fn write(&self, rel: &str, contents: &str) {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

/// Test CLI binary exists and responds to --help
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("grafter").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mirror a source directory"))
        .stdout(predicate::str::contains("graft"));
}

/// Test CLI responds to --version
#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("grafter").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("grafter"));
}

/// Test invalid subcommand shows error
#[test]
fn test_invalid_subcommand() {
    let mut cmd = Command::cargo_bin("grafter").unwrap();
    cmd.arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_init_requires_existing_directories() {
    let sandbox = Sandbox::new();
    fs::create_dir_all(sandbox.path("src")).unwrap();

    sandbox
        .grafter()
        .args(["init", "site", arg(&sandbox.path("src")), arg(&sandbox.path("nope"))])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not an existing directory"));
    assert!(!sandbox.store().exists());
}

#[test]
fn test_unknown_mission_fails() {
    let sandbox = Sandbox::new();
    for args in [vec!["info", "ghost"], vec!["unregister", "ghost"], vec!["graft", "ghost"]] {
        sandbox
            .grafter()
            .args(&args)
            .assert()
            .failure()
            .stderr(predicate::str::contains("doesn't exist"));
    }
}

#[test]
fn test_mission_lifecycle() {
    let sandbox = Sandbox::new();
    sandbox.write("src/a.txt", "0123456789");
    sandbox.write("src/lib/b.js", "js");
    sandbox.write("src/.hidden", "secret");
    sandbox.write("dest/stale.txt", "old");
    let src = sandbox.path("src");
    let dest = sandbox.path("dest");

    sandbox
        .grafter()
        .args(["init", "site", arg(&src), arg(&dest)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Registered mission site"));
    assert!(sandbox.store().exists());

    sandbox
        .grafter()
        .args(["init", "site", arg(&src), arg(&dest)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    sandbox
        .grafter()
        .args(["ignore", "add", "site", r"\.js$"])
        .assert()
        .success();
    sandbox
        .grafter()
        .args(["ignore", "add", "site", r"\.js$"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already ignores"));
    sandbox
        .grafter()
        .args(["ignore", "add", "site", r"\.bak$"])
        .assert()
        .success();

    sandbox
        .grafter()
        .args(["ignore", "list", "site"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r"0. \.js$"))
        .stdout(predicate::str::contains(r"1. \.bak$"));

    sandbox
        .grafter()
        .args(["ignore", "remove", "site", "1"])
        .assert()
        .success();
    sandbox
        .grafter()
        .args(["ignore", "remove", "site", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));

    sandbox
        .grafter()
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("site"));

    let assert = sandbox
        .grafter()
        .args(["graft", "site", "--json", "--workers", "2"])
        .assert()
        .success();
    let report: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(report["copied"], 1);
    assert_eq!(report["bytes_copied"], 10);
    assert_eq!(report["deleted"], 1);
    assert_eq!(report["kept"], 1);
    assert_eq!(report["errors"].as_array().map(Vec::len), Some(0));

    assert_eq!(fs::read_to_string(dest.join("a.txt")).unwrap(), "0123456789");
    assert!(!dest.join("lib/b.js").exists());
    assert!(!dest.join(".hidden").exists());
    assert!(!dest.join("stale.txt").exists());

    sandbox
        .grafter()
        .args(["info", "site"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r"\.js$"))
        .stdout(predicate::str::contains(r"\.bak$").not());

    sandbox
        .grafter()
        .args(["unregister", "site"])
        .assert()
        .success();
    sandbox
        .grafter()
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No missions registered"));
}

#[test]
fn test_invalid_regex_is_rejected() {
    let sandbox = Sandbox::new();
    fs::create_dir_all(sandbox.path("src")).unwrap();
    fs::create_dir_all(sandbox.path("dest")).unwrap();

    sandbox
        .grafter()
        .args(["init", "site", arg(&sandbox.path("src")), arg(&sandbox.path("dest"))])
        .assert()
        .success();
    sandbox
        .grafter()
        .args(["ignore", "add", "site", "(unclosed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid ignore pattern"));

    let store = fs::read_to_string(sandbox.store()).unwrap();
    assert!(!store.contains("unclosed"));
}

#[test]
fn test_graft_prints_summary() {
    let sandbox = Sandbox::new();
    sandbox.write("src/docs/readme.md", "hello");
    fs::create_dir_all(sandbox.path("dest")).unwrap();

    sandbox
        .grafter()
        .args(["init", "docs", arg(&sandbox.path("src")), arg(&sandbox.path("dest"))])
        .assert()
        .success();
    sandbox
        .grafter()
        .args(["graft", "docs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied"))
        .stdout(predicate::str::contains("Graft complete"));
    assert!(sandbox.path("dest/docs/readme.md").exists());

    sandbox
        .grafter()
        .args(["--quiet", "graft", "docs"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
