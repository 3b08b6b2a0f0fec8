use std::path::Path;

use anyhow::{Context, Result};
use git2::{ErrorCode, Oid, Repository, Sort};
use tracing::info;

use super::{
    cmd::git,
    ops_lock::acquire_ops_lock,
    repo::{head_commit, identity_overrides, open_repo},
};
use crate::{core::clock, error::AirgapError};

/// Prefix of the branches preserving pre-rollback history.
pub const BACKUP_BRANCH_PREFIX: &str = "backup-";

/// Outcome of a rollback.
#[derive(Debug, Clone)]
pub struct RollbackResult {
    pub backup_branch: String,
    /// Tip before the rollback; the backup branch points here.
    pub previous_tip: Oid,
    /// The new commit undoing the reverted range.
    pub rollback_commit: Oid,
    pub reverted: usize,
}

/// Parse the user-supplied commit count (defaults to 1).
///
/// # Errors
/// Returns [`AirgapError::InvalidCount`] unless the value is a positive integer.
pub fn parse_count(raw: Option<&str>) -> Result<usize, AirgapError> {
    let raw = raw.unwrap_or("1");
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(AirgapError::InvalidCount(raw.to_string())),
    }
}

/// Revert the `count` most recent commits of the current branch as one new
/// commit, after saving the current tip on a timestamped backup branch.
///
/// Conflicts abort the operation; the repository is left mid-revert.
///
/// # Errors
/// Fails if history is too short, the backup branch exists, or `git revert`
/// or `git commit` fails.
pub fn rollback(repo_path: &Path, count: usize) -> Result<RollbackResult> {
    let repo = open_repo(repo_path)?;
    let _ops_lock = acquire_ops_lock(repo.path())?;

    let previous_tip = head_commit(&repo)?.id();
    let targets = recent_commits(&repo, count)?;

    let backup_branch = format!(
        "{BACKUP_BRANCH_PREFIX}{}",
        clock::timestamp_id(clock::now())
    );
    create_backup_branch(&repo, &backup_branch, previous_tip)?;
    info!(branch = %backup_branch, tip = %previous_tip, "created backup branch");

    let mut revert = vec!["revert".to_string(), "--no-commit".to_string()];
    revert.extend(targets.iter().map(Oid::to_string));
    git(repo_path, &revert)?;

    let message = format!("Rollback: revert last {count} commit(s) (backup: {backup_branch})");
    let mut commit = identity_overrides(&repo);
    commit.extend(["commit".into(), "-q".into(), "-m".into(), message]);
    git(repo_path, &commit)?;

    let rollback_commit = head_commit(&repo)?.id();
    info!(commit = %rollback_commit, reverted = count, "committed rollback");

    Ok(RollbackResult {
        backup_branch,
        previous_tip,
        rollback_commit,
        reverted: count,
    })
}

/// The `count` newest first-parent commits, newest first.
fn recent_commits(repo: &Repository, count: usize) -> Result<Vec<Oid>> {
    let mut walk = repo.revwalk().context("failed to create revwalk")?;
    walk.set_sorting(Sort::TOPOLOGICAL)
        .context("failed to set revwalk order")?;
    walk.simplify_first_parent()
        .context("failed to restrict revwalk to first parents")?;
    walk.push_head().context("failed to push HEAD onto revwalk")?;

    let mut oids = Vec::with_capacity(count);
    for oid in walk.take(count) {
        oids.push(oid.context("failed to iterate revwalk")?);
    }
    if oids.len() < count {
        return Err(AirgapError::NotEnoughHistory {
            requested: count,
            available: oids.len(),
        }
        .into());
    }
    Ok(oids)
}

fn create_backup_branch(repo: &Repository, name: &str, tip: Oid) -> Result<()> {
    let commit = repo
        .find_commit(tip)
        .context("failed to load tip commit")?;
    match repo.branch(name, &commit, false) {
        Ok(_) => Ok(()),
        Err(e) if e.code() == ErrorCode::Exists => {
            Err(AirgapError::BranchExists(name.to_string()).into())
        }
        Err(e) => Err(e).with_context(|| format!("failed to create branch {name}")),
    }
}
