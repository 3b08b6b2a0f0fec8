use std::{ffi::OsStr, fs::OpenOptions, io::Write, path::Path};

use anyhow::{Context, Result};
use git2::Oid;
use tracing::{debug, info};

use super::cmd::git;
use crate::error::AirgapError;

const BUNDLE_SIGNATURE: &str = "# v2 git bundle";

/// History range exported into a bundle.
#[derive(Debug, Clone, Copy)]
pub enum BundleScope<'a> {
    /// Every ref with its complete history.
    Full,
    /// Commits reachable from `tip_ref` but not from `base_tag`.
    Since { base_tag: &'a str, tip_ref: &'a str },
}

/// Export `scope` from the repository into `artifact`.
///
/// # Errors
/// Returns [`AirgapError::ArtifactExists`] if the file is already present, or
/// [`AirgapError::Git`] if `git bundle create` fails.
pub fn create_bundle(repo_path: &Path, artifact: &Path, scope: BundleScope<'_>) -> Result<()> {
    ensure_absent(artifact)?;

    let range = match scope {
        BundleScope::Full => "--all".to_string(),
        BundleScope::Since { base_tag, tip_ref } => format!("{base_tag}..{tip_ref}"),
    };
    git(
        repo_path,
        [
            OsStr::new("bundle"),
            OsStr::new("create"),
            artifact.as_os_str(),
            OsStr::new(&range),
        ],
    )?;

    info!(artifact = %artifact.display(), range = %range, "created bundle");
    Ok(())
}

/// Write a bundle that carries no objects: `tip` is both its only
/// prerequisite and the value of `tip_ref`.
///
/// `git bundle create` refuses empty ranges, so the v2 header is written
/// directly and followed by an empty pack produced by `git pack-objects`.
///
/// # Errors
/// Returns an error if the artifact exists or cannot be written.
pub fn write_empty_bundle(repo_path: &Path, artifact: &Path, tip: Oid, tip_ref: &str) -> Result<()> {
    ensure_absent(artifact)?;

    let pack = git(repo_path, ["pack-objects", "--stdout", "-q"])?.stdout;

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(artifact)
        .with_context(|| format!("failed to create {}", artifact.display()))?;
    write!(file, "{BUNDLE_SIGNATURE}\n-{tip}\n{tip} {tip_ref}\n\n")
        .and_then(|()| file.write_all(&pack))
        .and_then(|()| file.sync_all())
        .with_context(|| format!("failed to write {}", artifact.display()))?;

    info!(artifact = %artifact.display(), tip = %tip, "created empty bundle");
    Ok(())
}

/// Run git's own integrity check on `artifact` in the context of the
/// repository (prerequisites are resolved against it).
///
/// # Errors
/// Returns [`AirgapError::VerificationFailed`] if the check fails.
pub fn verify_bundle(repo_path: &Path, artifact: &Path) -> Result<()> {
    if !artifact.is_file() {
        return Err(AirgapError::VerificationFailed {
            artifact: artifact.to_path_buf(),
            detail: "file not found".into(),
        }
        .into());
    }

    match git(
        repo_path,
        [OsStr::new("bundle"), OsStr::new("verify"), artifact.as_os_str()],
    ) {
        Ok(output) => {
            debug!(
                report = %String::from_utf8_lossy(&output.stderr).trim(),
                "bundle verify report"
            );
            info!(artifact = %artifact.display(), "bundle verified");
            Ok(())
        }
        Err(err) => {
            let detail = match err.downcast_ref::<AirgapError>() {
                Some(AirgapError::Git { detail, .. }) => detail.clone(),
                _ => format!("{err:#}"),
            };
            Err(AirgapError::VerificationFailed {
                artifact: artifact.to_path_buf(),
                detail,
            }
            .into())
        }
    }
}

fn ensure_absent(artifact: &Path) -> Result<()> {
    if artifact.exists() {
        return Err(AirgapError::ArtifactExists(artifact.to_path_buf()).into());
    }
    Ok(())
}
