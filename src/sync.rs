//! Sync Engine - reconciles a repository list against a local checkout root
//!
//! Each record maps to `<root>/<owner>/<name>`. An existing directory is pulled,
//! anything else is cloned. Records are processed one after another and a
//! failing clone or pull never stops the remaining records.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::discovery::RepositoryRecord;
use crate::git::{GitCommand, GitRunner};

/// What the engine decided to do for one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Clone `url` from inside `parent`, producing `path`
    Clone {
        url: String,
        parent: PathBuf,
        path: PathBuf,
    },
    /// Pull the existing checkout at `path`
    Pull { path: PathBuf },
}

/// Result of reconciling one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncResult {
    /// Repository was cloned
    Cloned { full_name: String, path: PathBuf },
    /// Existing checkout was pulled
    Pulled { full_name: String, path: PathBuf },
    /// Dry run: a clone would have been performed
    WouldClone {
        full_name: String,
        url: String,
        path: PathBuf,
    },
    /// Dry run: a pull would have been performed
    WouldPull { full_name: String, path: PathBuf },
    /// git exited unsuccessfully or could not be started
    Failed {
        full_name: String,
        path: PathBuf,
        error: String,
    },
}

impl SyncResult {
    pub fn full_name(&self) -> &str {
        match self {
            SyncResult::Cloned { full_name, .. }
            | SyncResult::Pulled { full_name, .. }
            | SyncResult::WouldClone { full_name, .. }
            | SyncResult::WouldPull { full_name, .. }
            | SyncResult::Failed { full_name, .. } => full_name,
        }
    }
}

/// Results from a complete sync pass
#[derive(Debug, Clone, Default)]
pub struct SyncSummary {
    pub total_repositories: usize,
    pub cloned: usize,
    pub pulled: usize,
    pub planned: usize,
    pub failed: usize,
    pub duration: Duration,
    pub results: Vec<SyncResult>,
}

impl SyncSummary {
    fn compile(results: Vec<SyncResult>, duration: Duration) -> Self {
        let mut summary = SyncSummary {
            total_repositories: results.len(),
            duration,
            ..Default::default()
        };

        for result in &results {
            match result {
                SyncResult::Cloned { .. } => summary.cloned += 1,
                SyncResult::Pulled { .. } => summary.pulled += 1,
                SyncResult::WouldClone { .. } | SyncResult::WouldPull { .. } => {
                    summary.planned += 1
                }
                SyncResult::Failed { .. } => summary.failed += 1,
            }
        }

        summary.results = results;
        summary
    }
}

/// Clone-or-pull reconciler over a checkout root
pub struct SyncEngine<G: GitRunner> {
    git: G,
    root: PathBuf,
    dry_run: bool,
}

impl<G: GitRunner> SyncEngine<G> {
    pub fn new(git: G, root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            git,
            root: root.into(),
            dry_run,
        }
    }

    /// Pull when the expected checkout directory exists, clone otherwise
    pub fn plan(&self, repo: &RepositoryRecord) -> SyncAction {
        let path = repo.local_path(&self.root);

        if path.is_dir() {
            SyncAction::Pull { path }
        } else {
            let parent = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.root.clone());
            SyncAction::Clone {
                url: repo.clone_url.clone(),
                parent,
                path,
            }
        }
    }

    /// Reconcile one record. Failures are reported in the result, never raised.
    pub async fn sync_repository(&self, repo: &RepositoryRecord) -> SyncResult {
        let full_name = repo.full_name.clone();

        match self.plan(repo) {
            SyncAction::Pull { path } if self.dry_run => {
                SyncResult::WouldPull { full_name, path }
            }
            SyncAction::Clone { url, path, .. } if self.dry_run => SyncResult::WouldClone {
                full_name,
                url,
                path,
            },
            SyncAction::Pull { path } => {
                info!("Pulling in '{}' (Repository: {})", path.display(), full_name);

                match self.git.run(GitCommand::pull(&path)).await {
                    Ok(Some(0)) => SyncResult::Pulled { full_name, path },
                    Ok(code) => SyncResult::Failed {
                        full_name,
                        path,
                        error: format!("git pull exited with {}", describe_exit(code)),
                    },
                    Err(e) => SyncResult::Failed {
                        full_name,
                        path,
                        error: format!("{:#}", e),
                    },
                }
            }
            SyncAction::Clone { url, parent, path } => {
                info!(
                    "Cloning {} into '{}' (Repository: {})",
                    url,
                    parent.display(),
                    full_name
                );

                if let Err(e) = tokio::fs::create_dir_all(&parent).await {
                    return SyncResult::Failed {
                        full_name,
                        path,
                        error: format!("Failed to create {}: {}", parent.display(), e),
                    };
                }

                match self.git.run(GitCommand::clone_into(&url, &parent)).await {
                    Ok(Some(0)) => SyncResult::Cloned { full_name, path },
                    Ok(code) => SyncResult::Failed {
                        full_name,
                        path,
                        error: format!("git clone exited with {}", describe_exit(code)),
                    },
                    Err(e) => SyncResult::Failed {
                        full_name,
                        path,
                        error: format!("{:#}", e),
                    },
                }
            }
        }
    }

    /// Reconcile every record in order. Only failing to create the root is an error.
    pub async fn sync_repos(&self, repos: &[RepositoryRecord]) -> Result<SyncSummary> {
        let start_time = Instant::now();

        if !self.dry_run {
            tokio::fs::create_dir_all(&self.root).await.with_context(|| {
                format!("Failed to create output directory: {}", self.root.display())
            })?;
        }

        let mut results = Vec::with_capacity(repos.len());
        for repo in repos {
            let result = self.sync_repository(repo).await;
            match &result {
                SyncResult::Failed { error, .. } => {
                    warn!("{}: {}", result.full_name(), error)
                }
                other => debug!("Sync completed: {:?}", other),
            }
            results.push(result);
        }

        let summary = SyncSummary::compile(results, start_time.elapsed());

        info!(
            "Sync finished in {:.2}s: {} cloned, {} pulled, {} planned, {} failed",
            summary.duration.as_secs_f64(),
            summary.cloned,
            summary.pulled,
            summary.planned,
            summary.failed
        );

        Ok(summary)
    }
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}
