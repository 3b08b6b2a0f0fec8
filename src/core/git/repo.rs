use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use git2::{Commit, ErrorCode, Oid, Repository, Signature};

use crate::error::AirgapError;

const FALLBACK_NAME: &str = "git-airgap";
const FALLBACK_EMAIL: &str = "git-airgap@local";

/// Discover the work tree root of the repository enclosing `start`.
///
/// # Errors
/// Returns an error if `start` is not inside a non-bare Git repository.
pub fn discover_root(start: &Path) -> Result<PathBuf> {
    let repo = Repository::discover(start).context("not inside a Git repository")?;
    let workdir = repo
        .workdir()
        .context("repository has no working directory")?;
    Ok(workdir.to_path_buf())
}

/// Open the configured repository, mapping any failure to
/// [`AirgapError::RepositoryUnavailable`].
///
/// # Errors
/// Returns an error if `path` is not an accessible Git repository.
pub fn open_repo(path: &Path) -> Result<Repository> {
    if !path.is_dir() {
        return Err(AirgapError::RepositoryUnavailable {
            path: path.to_path_buf(),
            reason: "not a directory".into(),
        }
        .into());
    }
    Repository::open(path).map_err(|e| {
        AirgapError::RepositoryUnavailable {
            path: path.to_path_buf(),
            reason: e.message().to_string(),
        }
        .into()
    })
}

/// Commit currently checked out.
///
/// # Errors
/// Returns [`AirgapError::EmptyRepository`] when HEAD is unborn.
pub fn head_commit(repo: &Repository) -> Result<Commit<'_>> {
    let head = match repo.head() {
        Ok(head) => head,
        Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
            return Err(AirgapError::EmptyRepository.into());
        }
        Err(e) => return Err(e).context("failed to resolve HEAD"),
    };
    head.peel_to_commit()
        .context("failed to peel HEAD to a commit")
}

/// Full ref name of the checked-out branch, e.g. `refs/heads/main`.
///
/// # Errors
/// Returns [`AirgapError::DetachedHead`] when HEAD does not point at a branch.
pub fn head_branch_ref(repo: &Repository) -> Result<String> {
    let head = match repo.head() {
        Ok(head) => head,
        Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
            return Err(AirgapError::EmptyRepository.into());
        }
        Err(e) => return Err(e).context("failed to resolve HEAD"),
    };
    if !head.is_branch() {
        return Err(AirgapError::DetachedHead.into());
    }
    head.name()
        .map(str::to_string)
        .context("branch name is not valid UTF-8")
}

/// Commit a tag points at, or `None` when the tag does not exist.
///
/// # Errors
/// Returns an error if the tag exists but cannot be peeled to a commit.
pub fn tag_commit(repo: &Repository, tag: &str) -> Result<Option<Oid>> {
    let reference = match repo.find_reference(&format!("refs/tags/{tag}")) {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("failed to look up tag {tag}")),
    };
    let commit = reference
        .peel_to_commit()
        .with_context(|| format!("tag {tag} does not point at a commit"))?;
    Ok(Some(commit.id()))
}

/// Author/committer signature from repository config, with fallbacks.
///
/// # Errors
/// Returns an error if the signature cannot be constructed.
pub fn signature(repo: &Repository) -> Result<Signature<'static>> {
    let (name, email) = identity(repo);
    Signature::now(&name, &email).context("failed to create signature")
}

/// `-c user.name=… -c user.email=…` overrides for `git` subprocesses when the
/// repository has no identity of its own.
#[must_use]
pub fn identity_overrides(repo: &Repository) -> Vec<String> {
    let cfg = repo.config().ok();
    let mut args = Vec::new();
    if cfg.as_ref().and_then(|c| c.get_string("user.name").ok()).is_none() {
        args.push("-c".to_string());
        args.push(format!("user.name={FALLBACK_NAME}"));
    }
    if cfg.as_ref().and_then(|c| c.get_string("user.email").ok()).is_none() {
        args.push("-c".to_string());
        args.push(format!("user.email={FALLBACK_EMAIL}"));
    }
    args
}

fn identity(repo: &Repository) -> (String, String) {
    let cfg = repo.config().ok();
    let name = cfg
        .as_ref()
        .and_then(|c| c.get_string("user.name").ok())
        .unwrap_or_else(|| FALLBACK_NAME.to_string());
    let email = cfg
        .as_ref()
        .and_then(|c| c.get_string("user.email").ok())
        .unwrap_or_else(|| FALLBACK_EMAIL.to_string());
    (name, email)
}
