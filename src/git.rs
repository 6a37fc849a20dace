use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command as AsyncCommand;
use tracing::debug;

/// One invocation of the `git` executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommand {
    /// Arguments after `git`
    pub args: Vec<String>,

    /// Working directory for the child process, inherited when `None`
    pub working_dir: Option<PathBuf>,
}

impl GitCommand {
    /// `git clone <url>` run from `parent`, so the checkout lands in `parent/<name>`
    pub fn clone_into(url: &str, parent: &Path) -> Self {
        Self {
            args: vec!["clone".to_string(), url.to_string()],
            working_dir: Some(parent.to_path_buf()),
        }
    }

    /// `git -C <path> pull`
    pub fn pull(path: &Path) -> Self {
        Self {
            args: vec![
                "-C".to_string(),
                path.to_string_lossy().into_owned(),
                "pull".to_string(),
            ],
            working_dir: None,
        }
    }
}

/// Runs git commands and reports the exit code (`None` when killed by a signal)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitRunner: Send + Sync {
    async fn run(&self, command: GitCommand) -> Result<Option<i32>>;
}

/// Spawns the real `git` executable, letting it write to the terminal
#[derive(Debug, Clone, Default)]
pub struct SystemGit;

#[async_trait]
impl GitRunner for SystemGit {
    async fn run(&self, command: GitCommand) -> Result<Option<i32>> {
        debug!("Running git {:?}", command.args);

        let mut process = AsyncCommand::new("git");
        process.args(&command.args);
        if let Some(dir) = &command.working_dir {
            process.current_dir(dir);
        }

        let status = process
            .status()
            .await
            .with_context(|| format!("Failed to execute git {}", command.args.join(" ")))?;

        Ok(status.code())
    }
}

/// Owner and repository name recovered from a checkout's remote URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSlug {
    pub owner: String,
    pub repo: String,
}

/// Read a `.git/config` file and extract the owner/repo of the first `url =` entry.
///
/// Returns `None` when the file is missing or unreadable, when that URL does not
/// mention `host`, or when the path after the host has fewer than two segments.
pub fn remote_from_config(config_path: &Path, host: &str) -> Option<RemoteSlug> {
    let content = match std::fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            debug!("Cannot read {}: {}", config_path.display(), e);
            return None;
        }
    };

    let url = content
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("url ="))?
        .split_once('=')?
        .1
        .trim();

    parse_remote_url(url, host)
}

/// Split `https://<host>/owner/repo.git` or `git@<host>:owner/repo.git`
pub fn parse_remote_url(url: &str, host: &str) -> Option<RemoteSlug> {
    let (_, rest) = url.split_once(host)?;
    let rest = rest
        .strip_prefix('/')
        .or_else(|| rest.strip_prefix(':'))
        .unwrap_or(rest);

    let mut segments = rest.split('/');
    let owner = segments.next()?;
    let repo_segment = segments.next()?;
    let repo = repo_segment.strip_suffix(".git").unwrap_or(repo_segment);

    if owner.is_empty() || repo.is_empty() {
        return None;
    }

    Some(RemoteSlug {
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}
