use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use super::{
    bundle::{BundleScope, create_bundle, verify_bundle},
    ops_lock::acquire_ops_lock,
    repo::{head_branch_ref, head_commit, open_repo, signature, tag_commit},
};
use crate::{
    core::{
        artifact::{self, ScriptParams, script::CompanionScripts, write_companion_scripts},
        version::Version,
    },
    error::AirgapError,
};

/// Everything produced by a successful baseline export.
#[derive(Debug, Clone)]
pub struct BaselineArtifact {
    pub tag: String,
    pub bundle: PathBuf,
    pub scripts: CompanionScripts,
}

/// Tag the current repository state as `baseline-<version>` and export its
/// full history into `bundle_dir`.
///
/// A tag created before a later step fails is left in place.
///
/// # Errors
/// Fails if the tag or artifact already exists, HEAD is not on a branch, or
/// any git step fails.
pub fn create_baseline(
    repo_path: &Path,
    bundle_dir: &Path,
    version: &Version,
) -> Result<BaselineArtifact> {
    let repo = open_repo(repo_path)?;
    let _ops_lock = acquire_ops_lock(repo.path())?;

    let tag = version.baseline_tag();
    if tag_commit(&repo, &tag)?.is_some() {
        return Err(AirgapError::TagExists(tag).into());
    }

    let bundle = bundle_dir.join(artifact::baseline_file_name(version));
    if bundle.exists() {
        return Err(AirgapError::ArtifactExists(bundle).into());
    }

    let source_ref = head_branch_ref(&repo)?;
    let head = head_commit(&repo)?;
    let sig = signature(&repo)?;
    repo.tag(
        &tag,
        head.as_object(),
        &sig,
        &format!("Baseline version {version}"),
        false,
    )
    .with_context(|| format!("failed to create tag {tag}"))?;
    info!(tag = %tag, commit = %head.id(), "created baseline tag");

    create_bundle(repo_path, &bundle, BundleScope::Full)?;
    verify_bundle(repo_path, &bundle)?;

    let params = ScriptParams::for_artifact(&bundle, version, &source_ref)?;
    let scripts = write_companion_scripts(&params)?;
    info!(
        verify = %scripts.verify.display(),
        deploy = %scripts.deploy.display(),
        "generated companion scripts"
    );

    Ok(BaselineArtifact {
        tag,
        bundle,
        scripts,
    })
}
