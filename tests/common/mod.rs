// tests/common/mod.rs

//! Shared fixtures for integration tests

use pkggen::{Error, GitQuery, Result};

/// In-memory repository state standing in for real git
pub struct FakeGit {
    pub tag: &'static str,
    pub count: u64,
    pub hash: &'static str,
}

impl GitQuery for FakeGit {
    fn latest_tag(&self) -> Result<String> {
        Ok(self.tag.to_string())
    }

    fn commits_since(&self, _tag: &str) -> Result<u64> {
        Ok(self.count)
    }

    fn short_hash(&self) -> Result<String> {
        Ok(self.hash.to_string())
    }
}

/// A repository with no reachable tag; every query fails
pub struct BrokenGit;

impl GitQuery for BrokenGit {
    fn latest_tag(&self) -> Result<String> {
        Err(Error::VersionResolution(
            "no tag reachable from the current revision".to_string(),
        ))
    }

    fn commits_since(&self, _tag: &str) -> Result<u64> {
        Err(Error::VersionResolution("no repository".to_string()))
    }

    fn short_hash(&self) -> Result<String> {
        Err(Error::VersionResolution("no repository".to_string()))
    }
}
