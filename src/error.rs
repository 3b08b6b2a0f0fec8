use std::path::PathBuf;

use thiserror::Error;

/// Failure kinds surfaced by git-airgap operations.
///
/// Every variant is fatal to the invocation: handlers propagate it and
/// `main` logs it once before exiting with status 1.
#[derive(Error, Debug)]
pub enum AirgapError {
    // Configuration
    #[error("{key} is not configured in {}; run `git-airgap setup` first", .path.display())]
    NotConfigured { key: &'static str, path: PathBuf },

    #[error("repository not accessible at {}: {reason}", .path.display())]
    RepositoryUnavailable { path: PathBuf, reason: String },

    #[error("{what} directory {} does not exist; run `git-airgap setup` first", .path.display())]
    MissingDirectory { what: &'static str, path: PathBuf },

    // Input validation
    #[error("invalid version '{0}': expected MAJOR.MINOR.PATCH")]
    InvalidVersion(String),

    #[error("missing required argument <{0}>")]
    MissingArgument(&'static str),

    #[error("invalid commit count '{0}': expected a positive integer")]
    InvalidCount(String),

    // Preconditions
    #[error("baseline tag {tag} does not exist; run `git-airgap baseline {version}` first")]
    BaselineMissing { tag: String, version: String },

    #[error("tag {0} already exists")]
    TagExists(String),

    #[error("artifact already exists: {}", .0.display())]
    ArtifactExists(PathBuf),

    #[error("HEAD is detached; check out a branch before exporting")]
    DetachedHead,

    #[error("repository has no commits")]
    EmptyRepository,

    #[error("cannot roll back {requested} commit(s): only {available} on the current branch")]
    NotEnoughHistory { requested: usize, available: usize },

    // External tool
    #[error("`git {command}` failed: {detail}")]
    Git { command: String, detail: String },

    #[error("bundle verification failed for {}: {detail}", .artifact.display())]
    VerificationFailed { artifact: PathBuf, detail: String },

    #[error("backup branch {0} already exists")]
    BranchExists(String),
}
