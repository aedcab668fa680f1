// src/version/mod.rs

//! Version resolution from git history
//!
//! Both release channels derive their `pkgver` from repository state,
//! recomputed on every run:
//!
//! - **Stable**: the most recent reachable tag with one optional leading
//!   `v` stripped (`v1.2.0` → `1.2.0`). The fixed `pkgrel=1` in the
//!   manifest absorbs repackaging, so nothing else is appended.
//! - **Rolling**: `<tag>r<count>.<hash>` where `count` is the number of
//!   commits after the tag and `hash` is the abbreviated 6-character
//!   commit id (`v1.2.0` + 5 commits at `abc123` → `1.2.0r5.abc123`).
//!
//! The `r<count>` component makes every rolling build sort after its base
//! tag and makes successive rolling builds sort by commit count. The hash
//! only disambiguates equal counts textually; two divergent branches can
//! share a count, which is an accepted limitation of the convention.
//!
//! Git is reached through the [`GitQuery`] trait so tests can substitute
//! an in-memory repository instead of depending on real git state.

use crate::descriptor::Channel;
use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::debug;
use wait_timeout::ChildExt;

/// Default timeout for git subprocess calls (30 seconds)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Read-only queries against revision-control history.
///
/// These three shapes are the only git surface the generator depends on.
pub trait GitQuery {
    /// Most recent tag reachable from the current revision.
    fn latest_tag(&self) -> Result<String>;

    /// Number of commits reachable from the current revision but not
    /// from `tag`.
    fn commits_since(&self, tag: &str) -> Result<u64>;

    /// Abbreviated (6 hex character) hash of the current commit.
    fn short_hash(&self) -> Result<String>;
}

/// [`GitQuery`] backed by the `git` command-line tool.
///
/// Every invocation runs with stdin nullified and a bounded wait so a
/// wedged subprocess surfaces as an error instead of hanging the run.
pub struct GitCli {
    repo_dir: PathBuf,
    timeout: Duration,
}

impl GitCli {
    /// Create a query handle for the repository at `repo_dir`.
    pub fn new(repo_dir: &Path) -> Self {
        Self {
            repo_dir: repo_dir.to_path_buf(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set a custom subprocess timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn run_git(&self, args: &[&str]) -> Result<String> {
        debug!("running git {}", args.join(" "));

        let mut child = Command::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                Error::VersionResolution(format!("failed to run git: {}. Is git installed?", e))
            })?;

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                child.kill().ok();
                child.wait().ok();
                return Err(Error::VersionResolution(format!(
                    "git {} timed out after {}s",
                    args.join(" "),
                    self.timeout.as_secs()
                )));
            }
            Err(e) => {
                return Err(Error::VersionResolution(format!(
                    "failed to wait for git {}: {}",
                    args.join(" "),
                    e
                )));
            }
        };

        let mut stdout = String::new();
        if let Some(mut out) = child.stdout.take() {
            out.read_to_string(&mut stdout)
                .map_err(|e| Error::VersionResolution(format!("failed to read git output: {}", e)))?;
        }

        if !status.success() {
            let mut stderr = String::new();
            if let Some(mut err) = child.stderr.take() {
                err.read_to_string(&mut stderr).ok();
            }
            return Err(Error::VersionResolution(format!(
                "git {} failed: {}",
                args.join(" "),
                stderr.trim()
            )));
        }

        Ok(stdout.trim().to_string())
    }
}

impl GitQuery for GitCli {
    fn latest_tag(&self) -> Result<String> {
        let tag = self.run_git(&["describe", "--tags", "--abbrev=0"])?;
        if tag.is_empty() {
            return Err(Error::VersionResolution(
                "no tag reachable from the current revision".to_string(),
            ));
        }
        Ok(tag)
    }

    fn commits_since(&self, tag: &str) -> Result<u64> {
        let range = format!("{}..HEAD", tag);
        let count = self.run_git(&["rev-list", &range, "--count"])?;
        count.parse::<u64>().map_err(|e| {
            Error::VersionResolution(format!("unparseable commit count '{}': {}", count, e))
        })
    }

    fn short_hash(&self) -> Result<String> {
        self.run_git(&["rev-parse", "--short=6", "HEAD"])
    }
}

/// Resolve the canonical version string for a channel.
///
/// Fails when no tag exists in history or a git query fails; the caller
/// must not write any output for the channel in that case.
pub fn resolve_version(channel: Channel, git: &impl GitQuery) -> Result<String> {
    let tag = git.latest_tag()?;
    let base = strip_tag_prefix(&tag);

    match channel {
        Channel::Stable => Ok(base.to_string()),
        Channel::Rolling => {
            let count = git.commits_since(&tag)?;
            let hash = git.short_hash()?;
            Ok(format!("{}r{}.{}", base, count, hash))
        }
    }
}

/// Strip exactly one leading `v` from a tag name, if present.
fn strip_tag_prefix(tag: &str) -> &str {
    tag.strip_prefix('v').unwrap_or(tag)
}

/// Compare two version strings by alternating numeric and alphabetic
/// segments, the scheme package managers use for `pkgver` ordering.
///
/// Rules:
/// - Separator characters only delimit segments.
/// - Numeric segments compare numerically (leading zeroes stripped,
///   longer digit string wins).
/// - A numeric segment is always newer than an alphabetic one.
/// - When all shared segments compare equal, the version with segments
///   left over is newer: `1.2.0r5.abc123` > `1.2.0`, and rolling builds
///   order by commit count since `r10` > `r5`.
pub fn vercmp(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        while i < a.len() && !a[i].is_ascii_alphanumeric() {
            i += 1;
        }
        while j < b.len() && !b[j].is_ascii_alphanumeric() {
            j += 1;
        }
        if i >= a.len() || j >= b.len() {
            break;
        }

        let numeric = a[i].is_ascii_digit();
        if numeric != b[j].is_ascii_digit() {
            // Numeric segments always sort newer than alphabetic ones
            return if numeric {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }

        let end = |s: &[u8], mut k: usize| {
            while k < s.len()
                && (if numeric {
                    s[k].is_ascii_digit()
                } else {
                    s[k].is_ascii_alphabetic()
                })
            {
                k += 1;
            }
            k
        };
        let (ae, be) = (end(a, i), end(b, j));
        let (sa, sb) = (&a[i..ae], &b[j..be]);

        let ord = if numeric {
            let sa = strip_leading_zeroes(sa);
            let sb = strip_leading_zeroes(sb);
            sa.len().cmp(&sb.len()).then_with(|| sa.cmp(sb))
        } else {
            sa.cmp(sb)
        };
        if ord != Ordering::Equal {
            return ord;
        }
        i = ae;
        j = be;
    }

    // All shared segments equal: whichever version has content left wins
    match (i < a.len(), j < b.len()) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

fn strip_leading_zeroes(s: &[u8]) -> &[u8] {
    let start = s.iter().take_while(|&&c| c == b'0').count();
    if start == s.len() {
        &s[s.len() - 1..]
    } else {
        &s[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory repository state standing in for real git
    struct FakeGit {
        tag: Option<&'static str>,
        count: u64,
        hash: &'static str,
    }

    impl GitQuery for FakeGit {
        fn latest_tag(&self) -> Result<String> {
            self.tag.map(str::to_string).ok_or_else(|| {
                Error::VersionResolution("no tag reachable from the current revision".to_string())
            })
        }

        fn commits_since(&self, _tag: &str) -> Result<u64> {
            Ok(self.count)
        }

        fn short_hash(&self) -> Result<String> {
            Ok(self.hash.to_string())
        }
    }

    #[test]
    fn test_stable_strips_single_leading_v() {
        let git = FakeGit {
            tag: Some("v1.2.0"),
            count: 0,
            hash: "abc123",
        };
        assert_eq!(resolve_version(Channel::Stable, &git).unwrap(), "1.2.0");
    }

    #[test]
    fn test_stable_without_v_prefix_is_verbatim() {
        let git = FakeGit {
            tag: Some("1.2.0"),
            count: 0,
            hash: "abc123",
        };
        assert_eq!(resolve_version(Channel::Stable, &git).unwrap(), "1.2.0");
    }

    #[test]
    fn test_stable_strips_only_one_v() {
        let git = FakeGit {
            tag: Some("vv1.0"),
            count: 0,
            hash: "abc123",
        };
        assert_eq!(resolve_version(Channel::Stable, &git).unwrap(), "v1.0");
    }

    #[test]
    fn test_rolling_composition() {
        let git = FakeGit {
            tag: Some("v1.2.0"),
            count: 5,
            hash: "abc123",
        };
        assert_eq!(
            resolve_version(Channel::Rolling, &git).unwrap(),
            "1.2.0r5.abc123"
        );
    }

    #[test]
    fn test_missing_tag_fails_both_channels() {
        let git = FakeGit {
            tag: None,
            count: 5,
            hash: "abc123",
        };
        assert!(resolve_version(Channel::Stable, &git).is_err());
        assert!(resolve_version(Channel::Rolling, &git).is_err());
    }

    #[test]
    fn test_vercmp_basic_ordering() {
        assert_eq!(vercmp("1.2.3", "1.2.3"), Ordering::Equal);
        assert_eq!(vercmp("1.2.3", "1.2.4"), Ordering::Less);
        assert_eq!(vercmp("1.10.0", "1.9.0"), Ordering::Greater);
        assert_eq!(vercmp("1.02", "1.2"), Ordering::Equal);
    }

    #[test]
    fn test_rolling_sorts_after_stable_base() {
        let git = FakeGit {
            tag: Some("v1.2.0"),
            count: 1,
            hash: "abc123",
        };
        let stable = resolve_version(Channel::Stable, &git).unwrap();
        let rolling = resolve_version(Channel::Rolling, &git).unwrap();
        assert_eq!(vercmp(&rolling, &stable), Ordering::Greater);
    }

    #[test]
    fn test_rolling_monotone_in_commit_count() {
        let versions: Vec<String> = [0u64, 1, 2, 9, 10, 11, 99, 100]
            .iter()
            .map(|&count| {
                let git = FakeGit {
                    tag: Some("v1.2.0"),
                    count,
                    hash: "abc123",
                };
                resolve_version(Channel::Rolling, &git).unwrap()
            })
            .collect();

        for pair in versions.windows(2) {
            assert_eq!(
                vercmp(&pair[1], &pair[0]),
                Ordering::Greater,
                "{} should sort after {}",
                pair[1],
                pair[0]
            );
        }
    }

    #[test]
    fn test_vercmp_numeric_beats_alpha() {
        assert_eq!(vercmp("1.2", "1.a"), Ordering::Greater);
    }
}
