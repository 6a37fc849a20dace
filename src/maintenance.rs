//! Maintenance - reorganize a flat directory of checkouts into `<owner>/<repo>`
//!
//! Every immediate subdirectory with a `.git` directory is inspected; its first
//! remote URL names the owner and repository it belongs under.

use anyhow::{Context, Result};
use path_clean::PathClean;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

use crate::git::{remote_from_config, RemoteSlug};

/// What happened to one checkout during a maintenance pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrganizeOutcome {
    /// Checkout was moved to its `<owner>/<repo>` location
    Moved { from: PathBuf, to: PathBuf },
    /// Dry run: checkout would have been moved
    WouldMove { from: PathBuf, to: PathBuf },
    /// Remote owner/repo could not be recovered from the git metadata
    SkippedUnrecognized { path: PathBuf },
    /// The destination is already occupied
    SkippedExisting { path: PathBuf, destination: PathBuf },
    /// The destination lies inside another checkout that is not being moved
    SkippedInsideCheckout { path: PathBuf, checkout: PathBuf },
    /// The move itself failed
    Failed {
        path: PathBuf,
        destination: PathBuf,
        error: String,
    },
}

/// Move every recognizable checkout directly under `base` to `base/<owner>/<repo>`.
///
/// Checkouts named after their own remote owner are moved first, so nothing else
/// lands inside them before they are relocated. The rest follow in name order.
/// A destination inside another checkout that stays in place is skipped. Per-entry
/// problems are reported as outcomes; only an unreadable `base` is an error.
pub fn organize_directory(base: &Path, host: &str, dry_run: bool) -> Result<Vec<OrganizeOutcome>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(base)
        .with_context(|| format!("Failed to read directory: {}", base.display()))?
    {
        let entry = entry.with_context(|| format!("Failed to read entry in {}", base.display()))?;
        entries.push(entry.path());
    }
    entries.sort();

    let mut checkouts = Vec::new();
    for item in entries {
        if !item.is_dir() {
            continue;
        }

        let git_dir = item.join(".git");
        if !git_dir.is_dir() {
            debug!("Not a git checkout: {}", item.display());
            continue;
        }

        let remote = remote_from_config(&git_dir.join("config"), host);
        checkouts.push((item, remote));
    }

    checkouts.sort_by_key(|(item, remote)| !is_named_after_owner(item, remote.as_ref()));

    let mut vacated = HashSet::new();
    let mut outcomes = Vec::new();

    for (item, remote) in checkouts {
        let outcome = organize_entry(base, &item, remote, &vacated, dry_run);
        debug!("{}: {:?}", item.display(), outcome);

        if matches!(
            outcome,
            OrganizeOutcome::Moved { .. } | OrganizeOutcome::WouldMove { .. }
        ) {
            vacated.insert(item);
        }
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

fn is_named_after_owner(item: &Path, remote: Option<&RemoteSlug>) -> bool {
    match (item.file_name(), remote) {
        (Some(name), Some(remote)) => name.to_string_lossy() == remote.owner,
        _ => false,
    }
}

fn organize_entry(
    base: &Path,
    item: &Path,
    remote: Option<RemoteSlug>,
    vacated: &HashSet<PathBuf>,
    dry_run: bool,
) -> OrganizeOutcome {
    let Some(remote) = remote else {
        return OrganizeOutcome::SkippedUnrecognized {
            path: item.to_path_buf(),
        };
    };

    let owner_dir = base.join(&remote.owner);
    let destination = owner_dir.join(&remote.repo);
    if destination.exists() {
        return OrganizeOutcome::SkippedExisting {
            path: item.to_path_buf(),
            destination,
        };
    }

    // `vacated` stands in for moves a dry run only pretends to make
    if owner_dir != item && owner_dir.join(".git").is_dir() && !vacated.contains(&owner_dir) {
        return OrganizeOutcome::SkippedInsideCheckout {
            path: item.to_path_buf(),
            checkout: owner_dir,
        };
    }

    if dry_run {
        return OrganizeOutcome::WouldMove {
            from: item.to_path_buf(),
            to: destination,
        };
    }

    let moved = destination
        .parent()
        .map_or(Ok(()), |parent| {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))
        })
        .and_then(|_| safe_move(item, &destination));

    match moved {
        Ok(()) => OrganizeOutcome::Moved {
            from: item.to_path_buf(),
            to: destination,
        },
        Err(e) => OrganizeOutcome::Failed {
            path: item.to_path_buf(),
            destination,
            error: format!("{:#}", e),
        },
    }
}

/// Move the directory `src` to `dst`.
///
/// When `dst` lies inside `src` a direct rename cannot work, so `src` is first
/// renamed to a unique sibling (`.tmpmove_<uuid>`) and that is moved into place.
/// Any other failure is returned.
pub fn safe_move(src: &Path, dst: &Path) -> Result<()> {
    let err = match fs::rename(src, dst) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    if !is_nested_within(src, dst) {
        return Err(err).with_context(|| {
            format!("Failed to move {} to {}", src.display(), dst.display())
        });
    }

    info!(
        "Cannot move {} into itself ({}); moving via a temporary directory",
        src.display(),
        dst.display()
    );

    let base_dir = src.parent().unwrap_or_else(|| Path::new("."));
    let tmp_path = base_dir.join(format!(".tmpmove_{}", Uuid::new_v4().simple()));

    fs::rename(src, &tmp_path).with_context(|| {
        format!("Failed to rename {} to {}", src.display(), tmp_path.display())
    })?;

    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    fs::rename(&tmp_path, dst).with_context(|| {
        format!(
            "Failed to move {} to {} (contents remain in {})",
            src.display(),
            dst.display(),
            tmp_path.display()
        )
    })
}

/// Whether `dst` is a strict descendant of `src` after lexical normalization
fn is_nested_within(src: &Path, dst: &Path) -> bool {
    let src = src.clean();
    let dst = dst.clean();
    dst != src && dst.starts_with(&src)
}
