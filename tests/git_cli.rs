// tests/git_cli.rs

//! GitCli tests against a real throwaway repository.
//!
//! Skipped silently when git is not installed on the test host.

use pkggen::{resolve_version, Channel, GitCli};
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args([
            "-c",
            "user.email=test@example.com",
            "-c",
            "user.name=test",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .status()
        .unwrap();
    assert!(status.success(), "git {:?} failed", args);
}

#[test]
fn test_resolution_against_real_repository() {
    if !git_available() {
        eprintln!("git not installed; skipping");
        return;
    }

    let repo = TempDir::new().unwrap();
    git(repo.path(), &["init", "-q"]);
    git(repo.path(), &["commit", "-q", "--allow-empty", "-m", "first"]);
    git(repo.path(), &["tag", "v0.3.0"]);

    let cli = GitCli::new(repo.path());
    assert_eq!(resolve_version(Channel::Stable, &cli).unwrap(), "0.3.0");

    // At the tag itself the rolling count is zero
    let rolling = resolve_version(Channel::Rolling, &cli).unwrap();
    assert!(rolling.starts_with("0.3.0r0."), "got {}", rolling);

    git(repo.path(), &["commit", "-q", "--allow-empty", "-m", "second"]);
    git(repo.path(), &["commit", "-q", "--allow-empty", "-m", "third"]);

    let rolling = resolve_version(Channel::Rolling, &cli).unwrap();
    assert!(rolling.starts_with("0.3.0r2."), "got {}", rolling);
    let hash = rolling.rsplit('.').next().unwrap();
    assert_eq!(hash.len(), 6, "abbreviated hash in {}", rolling);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_untagged_repository_fails_resolution() {
    if !git_available() {
        eprintln!("git not installed; skipping");
        return;
    }

    let repo = TempDir::new().unwrap();
    git(repo.path(), &["init", "-q"]);
    git(repo.path(), &["commit", "-q", "--allow-empty", "-m", "first"]);

    let cli = GitCli::new(repo.path());
    assert!(resolve_version(Channel::Stable, &cli).is_err());
    assert!(resolve_version(Channel::Rolling, &cli).is_err());
}

#[test]
fn test_missing_repository_fails_resolution() {
    if !git_available() {
        eprintln!("git not installed; skipping");
        return;
    }

    let empty = TempDir::new().unwrap();
    let cli = GitCli::new(empty.path());
    assert!(resolve_version(Channel::Stable, &cli).is_err());
}
