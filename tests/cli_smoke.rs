use assert_cmd::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn has_git() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}

fn init_git_repo(dir: &Path) {
    // init and basic identity
    assert!(Command::new("git")
        .args(["init"])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
    assert!(Command::new("git")
        .args(["config", "core.autocrlf", "false"])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
    assert!(Command::new("git")
        .args(["config", "user.email", "you@example.com"])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
    assert!(Command::new("git")
        .args(["config", "user.name", "Your Name"])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
}

fn commit_file(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut f = File::create(&path).unwrap();
    f.write_all(content.as_bytes()).unwrap();
    f.sync_all().unwrap();
    assert!(Command::new("git")
        .args(["add", "."])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
    assert!(Command::new("git")
        .args(["commit", "-m", &format!("add {name}")])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
}

fn commit_rename(dir: &Path, from: &str, to: &str) {
    assert!(Command::new("git")
        .args(["mv", from, to])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
    assert!(Command::new("git")
        .args(["commit", "-m", &format!("rename {from} to {to}")])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
}

fn run_json(dir: &Path, extra: &[&str]) -> serde_json::Value {
    let mut cmd = Command::cargo_bin("gchurn").unwrap();
    cmd.current_dir(dir)
        .arg("--repo")
        .arg(dir)
        .args(["--since", "2000-01-01", "--json"])
        .args(extra);
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).unwrap()
}

#[test]
fn churn_json_outputs_entries() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_file(dir.path(), "lib.rs", "pub fn hi(){}\n");
    commit_file(dir.path(), "lib.rs", "pub fn hi(){ println!(\"hi\"); }\n");

    let v = run_json(dir.path(), &[]);
    let entries = v.get("entries").and_then(|e| e.as_array()).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "lib.rs");
    assert_eq!(entries[0]["updates"], 2);
    // original_path stays internal
    assert!(entries[0].get("original_path").is_none());
}

#[test]
fn rename_is_followed_to_the_current_name() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_file(dir.path(), "src/a.rs", "fn a(){}\n");
    commit_file(dir.path(), "src/a.rs", "fn a(){}\nfn b(){}\n");
    commit_rename(dir.path(), "src/a.rs", "src/b.rs");

    let v = run_json(dir.path(), &[]);
    let entries = v.get("entries").and_then(|e| e.as_array()).unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e["name"].as_str().unwrap()).collect();
    assert!(names.contains(&"src/b.rs"), "entries: {names:?}");
    assert!(!names.contains(&"src/a.rs"), "entries: {names:?}");

    let renamed = entries.iter().find(|e| e["name"] == "src/b.rs").unwrap();
    assert_eq!(renamed["updates"], 2);
}

#[test]
fn depth_folds_into_directories() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_file(dir.path(), "src/a.rs", "fn a(){}\n");
    commit_file(dir.path(), "src/b.rs", "fn b(){}\n");

    let v = run_json(dir.path(), &["--depth", "1"]);
    let entries = v.get("entries").and_then(|e| e.as_array()).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "src");
    assert_eq!(entries[0]["updates"], 2);
}

#[test]
fn empty_window_emits_no_entries() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_file(dir.path(), "lib.rs", "pub fn hi(){}\n");

    let mut cmd = Command::cargo_bin("gchurn").unwrap();
    cmd.current_dir(dir.path())
        .arg("--repo")
        .arg(dir.path())
        .args(["--since", "2999-01-01", "--json"]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["entries"].as_array().unwrap().len(), 0);
}

#[test]
fn table_output_by_default() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_file(dir.path(), "lib.rs", "pub fn hi(){}\n");

    let mut cmd = Command::cargo_bin("gchurn").unwrap();
    cmd.current_dir(dir.path())
        .arg("--repo")
        .arg(dir.path())
        .args(["--since", "2000-01-01"]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("lib.rs"));
}
