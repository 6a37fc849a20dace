//! Repository discovery
//!
//! Defines the normalized [`RepositoryRecord`], the sources a record list can be
//! discovered from, and the scan of an existing `<owner>/<repo>` checkout tree.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::filter::StarFilter;
use crate::github::{GitHubClient, OwnedRepoOptions};

/// Normalized description of one remote repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRecord {
    /// `<owner>/<name>`
    pub full_name: String,

    /// URL handed to `git clone`
    pub clone_url: String,

    pub stargazers_count: u64,

    /// Login of the repository owner
    pub owner_name: String,
}

impl RepositoryRecord {
    pub fn new(
        full_name: impl Into<String>,
        clone_url: impl Into<String>,
        stargazers_count: u64,
        owner_name: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            clone_url: clone_url.into(),
            stargazers_count,
            owner_name: owner_name.into(),
        }
    }

    /// First `/` segment of `full_name`
    pub fn owner_segment(&self) -> &str {
        self.full_name.split('/').next().unwrap_or(&self.full_name)
    }

    /// Last `/` segment of `full_name`
    pub fn name_segment(&self) -> &str {
        self.full_name.rsplit('/').next().unwrap_or(&self.full_name)
    }

    /// Where this repository lives under a checkout root: `<root>/<owner>/<name>`
    pub fn local_path(&self, root: &Path) -> PathBuf {
        root.join(self.owner_segment()).join(self.name_segment())
    }
}

/// Which listing to pull records from
#[derive(Debug, Clone)]
pub enum RepoSource {
    /// Repositories starred by a user, narrowed by a star filter
    Starred { username: String, filter: StarFilter },
    /// Repositories owned by a user
    User {
        username: String,
        options: OwnedRepoOptions,
    },
    /// Repositories owned by an organization
    Org {
        orgname: String,
        options: OwnedRepoOptions,
    },
}

impl RepoSource {
    /// Display label for logging
    pub fn describe(&self) -> String {
        match self {
            RepoSource::Starred { username, .. } => format!("repositories starred by {}", username),
            RepoSource::User { username, .. } => format!("repositories owned by {}", username),
            RepoSource::Org { orgname, .. } => format!("repositories of organization {}", orgname),
        }
    }
}

/// Outcome of a discovery pass
#[derive(Debug, Clone, Default)]
pub struct Discovered {
    /// Records returned by the API before post-fetch filtering
    pub fetched: usize,

    /// Records that survived filtering, in API order
    pub repositories: Vec<RepositoryRecord>,
}

/// Discovers repositories through the GitHub API
pub struct GitHubDiscovery {
    client: GitHubClient,
}

impl GitHubDiscovery {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }

    /// Fetch the records for a source. The star filter only applies to starred
    /// listings; owned listings already dropped forks and archives while fetching.
    pub async fn discover(&self, source: &RepoSource) -> Discovered {
        info!("Fetching {}", source.describe());

        let (fetched, repositories) = match source {
            RepoSource::Starred { username, filter } => {
                let all = self.client.list_starred_repositories(username).await;
                let fetched = all.len();
                let kept = filter.apply(all);
                debug!("Star filter kept {} of {} repositories", kept.len(), fetched);
                (fetched, kept)
            }
            RepoSource::User { username, options } => {
                let all = self.client.list_user_repositories(username, options).await;
                (all.len(), all)
            }
            RepoSource::Org { orgname, options } => {
                let all = self
                    .client
                    .list_organization_repositories(orgname, options)
                    .await;
                (all.len(), all)
            }
        };

        Discovered {
            fetched,
            repositories,
        }
    }
}

/// List the checkouts already present under `root` as `<owner>/<repo>` directories.
/// Records carry no clone URL or star count; a missing root yields nothing.
pub fn scan_local_checkouts(root: &Path) -> Result<Vec<RepositoryRecord>> {
    if !root.is_dir() {
        debug!("Checkout root does not exist: {}", root.display());
        return Ok(Vec::new());
    }

    let mut records = Vec::new();

    for owner_dir in sorted_subdirectories(root)? {
        let owner = file_name(&owner_dir);
        for repo_dir in sorted_subdirectories(&owner_dir)? {
            let repo = file_name(&repo_dir);
            records.push(RepositoryRecord::new(
                format!("{}/{}", owner, repo),
                "",
                0,
                owner.clone(),
            ));
        }
    }

    Ok(records)
}

fn sorted_subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read entry in {}", dir.display()))?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();

    Ok(dirs)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(full_name: &str) -> RepositoryRecord {
        RepositoryRecord::new(
            full_name,
            format!("https://github.com/{}.git", full_name),
            10,
            full_name.split('/').next().unwrap(),
        )
    }

    #[test]
    fn test_local_path_uses_owner_and_name() {
        let repo = record("octocat/Hello-World");
        assert_eq!(
            repo.local_path(Path::new("/tmp/repos")),
            PathBuf::from("/tmp/repos/octocat/Hello-World")
        );
    }

    #[test]
    fn test_segments_split_first_and_last() {
        let repo = record("a/b/c");
        assert_eq!(repo.owner_segment(), "a");
        assert_eq!(repo.name_segment(), "c");

        let bare = record("solo");
        assert_eq!(bare.owner_segment(), "solo");
        assert_eq!(bare.name_segment(), "solo");
    }

    #[test]
    fn test_scan_local_checkouts() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("user1/repo1")).unwrap();
        std::fs::create_dir_all(temp.path().join("user1/repo0")).unwrap();
        std::fs::write(temp.path().join("user1/notes.txt"), "not a repo").unwrap();
        std::fs::write(temp.path().join("README"), "top-level file").unwrap();

        let records = scan_local_checkouts(temp.path()).unwrap();

        assert_eq!(
            records,
            vec![
                RepositoryRecord::new("user1/repo0", "", 0, "user1"),
                RepositoryRecord::new("user1/repo1", "", 0, "user1"),
            ]
        );
    }

    #[test]
    fn test_scan_missing_root_is_empty() {
        let records = scan_local_checkouts(Path::new("/nonexistent/starsync/root")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_describe_source() {
        let source = RepoSource::Org {
            orgname: "rust-lang".to_string(),
            options: OwnedRepoOptions::default(),
        };
        assert_eq!(source.describe(), "repositories of organization rust-lang");
    }
}
