#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Sandbox {
    _temp: TempDir,
    data: PathBuf,
    git: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let data = temp.path().join("data");
        let git = temp.path().join("git");
        Self {
            _temp: temp,
            data,
            git,
        }
    }

    /// A git root that marks accepts without running git.
    fn with_git_dir(self) -> Self {
        fs::create_dir_all(self.git.join(".git")).unwrap();
        self
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(cargo_bin("marks"));
        cmd.env("MARKS_DATA", self.data.as_os_str())
            .env("MARKS_GIT_ROOT", self.git.as_os_str())
            .env_remove("MARKS_LOG");
        cmd
    }
}

fn json_files(dir: &Path) -> usize {
    if !dir.exists() {
        return 0;
    }
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .map(|p| {
            if p.is_dir() {
                json_files(&p)
            } else {
                usize::from(p.extension().is_some_and(|e| e == "json"))
            }
        })
        .sum()
}

#[test]
fn test_add_list_remove() {
    let sb = Sandbox::new();

    sb.cmd()
        .args(["add", "https://www.rust-lang.org", "-t", "Rust", "-T", "lang,Docs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added https://www.rust-lang.org"));

    sb.cmd()
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rust [docs,lang]"))
        .stdout(predicate::str::contains("https://www.rust-lang.org"));

    sb.cmd()
        .args(["remove", "https://www.rust-lang.org"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed"));

    sb.cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("No bookmarks found."));
}

#[test]
fn test_add_duplicate_warns() {
    let sb = Sandbox::new();
    sb.cmd().args(["add", "https://a.com"]).assert().success();
    sb.cmd()
        .args(["add", "https://a.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Already bookmarked"));
}

#[test]
fn test_list_json_filters_by_tag() {
    let sb = Sandbox::new();
    sb.cmd()
        .args(["add", "https://a.com", "-T", "rust"])
        .assert()
        .success();
    sb.cmd()
        .args(["add", "https://b.com", "-T", "go"])
        .assert()
        .success();

    let output = sb
        .cmd()
        .args(["list", "--tag", "rust", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["url"], "https://a.com");
}

#[test]
fn test_separate_databases() {
    let sb = Sandbox::new();
    sb.cmd()
        .args(["add", "https://work.example.com", "--db", "work"])
        .assert()
        .success();

    sb.cmd()
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No bookmarks found."));
    sb.cmd()
        .args(["list", "--db", "work"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://work.example.com"));
    assert!(sb.data.join("work.json").exists());
}

#[test]
fn test_remove_unknown_url_fails() {
    let sb = Sandbox::new();
    sb.cmd()
        .args(["remove", "https://nowhere.example"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("No bookmark with URL"));
}

#[test]
fn test_add_rejects_url_without_host() {
    let sb = Sandbox::new();
    sb.cmd()
        .args(["add", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_export_requires_git_root() {
    let sb = Sandbox::new();
    sb.cmd().args(["add", "https://a.com"]).assert().success();
    sb.cmd()
        .args(["git", "export"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_export_then_import_restores_removed() {
    let sb = Sandbox::new().with_git_dir();
    sb.cmd().args(["add", "https://a.com/x"]).assert().success();
    sb.cmd().args(["add", "https://b.com/y"]).assert().success();

    sb.cmd()
        .args(["git", "export"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 written"));
    assert_eq!(json_files(&sb.git.join("bookmarks")), 2);

    // Unchanged records are not rewritten.
    sb.cmd()
        .args(["git", "export"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 written, 2 unchanged"));

    // Untracked, so the mirror keeps the file.
    sb.cmd()
        .args(["remove", "https://a.com/x"])
        .assert()
        .success();

    sb.cmd()
        .args(["git", "import"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 of 2"));

    sb.cmd()
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://a.com/x"));
}

#[test]
fn test_track_mirrors_adds_and_removes() {
    let sb = Sandbox::new().with_git_dir();
    sb.cmd().args(["add", "https://a.com"]).assert().success();

    sb.cmd()
        .args(["git", "track"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tracking bookmarks"));
    assert_eq!(json_files(&sb.git.join("bookmarks")), 1);

    sb.cmd()
        .args(["add", "https://b.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mirrored to bookmarks"));
    assert_eq!(json_files(&sb.git.join("bookmarks")), 2);

    sb.cmd()
        .args(["remove", "https://b.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted from bookmarks"));
    assert_eq!(json_files(&sb.git.join("bookmarks")), 1);

    sb.cmd()
        .args(["git", "untrack"])
        .assert()
        .success();
    sb.cmd()
        .args(["add", "https://c.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mirrored").not());
    assert_eq!(json_files(&sb.git.join("bookmarks")), 1);
}

#[test]
fn test_config_shows_defaults() {
    let sb = Sandbox::new();
    sb.cmd()
        .args(["config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default_db = \"bookmarks\""))
        .stdout(predicate::str::contains("git_program = \"git\""));
}

#[test]
fn test_config_file_changes_default_db() {
    let sb = Sandbox::new();
    fs::create_dir_all(&sb.data).unwrap();
    fs::write(sb.data.join("marks.toml"), "default_db = \"work\"\n").unwrap();

    sb.cmd().args(["add", "https://a.com"]).assert().success();
    assert!(sb.data.join("work.json").exists());
    assert!(!sb.data.join("bookmarks.json").exists());
}

#[test]
fn test_version_flag() {
    Command::new(cargo_bin("marks"))
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("marks v"));
}
