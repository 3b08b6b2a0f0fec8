use std::{
    fs::{File, OpenOptions},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use fs2::FileExt;
use tracing::{debug, info};

const LOCK_FILE_NAME: &str = "git-airgap.lock";

/// Lock file serializing tag, branch and bundle writes on one repository.
#[must_use]
pub fn ops_lock_path(git_dir: &Path) -> PathBuf {
    git_dir.join(LOCK_FILE_NAME)
}

/// Held for the duration of a baseline, update or rollback.
pub struct OpsLockGuard {
    file: File,
    path: PathBuf,
}

impl Drop for OpsLockGuard {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        debug!(path = %self.path.display(), "released operations lock");
    }
}

/// Take the exclusive operations lock inside `git_dir` (the repository's
/// `.git` directory), waiting for any other git-airgap process holding it.
///
/// # Errors
/// Returns an error if the lock file cannot be opened or locked.
pub fn acquire_ops_lock(git_dir: &Path) -> Result<OpsLockGuard> {
    let path = ops_lock_path(git_dir);
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(&path)
        .with_context(|| format!("failed to open lock file {}", path.display()))?;

    if file.try_lock_exclusive().is_err() {
        info!(path = %path.display(), "another git-airgap operation is running; waiting");
        file.lock_exclusive()
            .with_context(|| format!("failed to acquire lock {}", path.display()))?;
    }
    debug!(path = %path.display(), "acquired operations lock");

    Ok(OpsLockGuard { file, path })
}
