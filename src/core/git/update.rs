use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use git2::{Oid, Repository};
use tracing::info;

use super::{
    bundle::{BundleScope, create_bundle, verify_bundle, write_empty_bundle},
    ops_lock::acquire_ops_lock,
    repo::{head_branch_ref, head_commit, open_repo, tag_commit},
};
use crate::{
    core::{
        artifact::{self, ScriptParams, script::CompanionScripts, write_companion_scripts},
        clock,
        version::Version,
    },
    error::AirgapError,
};

/// Everything produced by a successful update export.
#[derive(Debug, Clone)]
pub struct UpdateArtifact {
    pub base_tag: String,
    pub bundle: PathBuf,
    /// Number of commits carried by the bundle.
    pub commits: usize,
    pub scripts: CompanionScripts,
}

/// Export the commits reachable from the current branch tip but not from
/// `baseline-<base>` into a timestamped artifact in `bundle_dir`.
///
/// # Errors
/// Fails with [`AirgapError::BaselineMissing`] if the base tag is absent, and
/// on any artifact, script or git failure.
pub fn create_update(repo_path: &Path, bundle_dir: &Path, base: &Version) -> Result<UpdateArtifact> {
    let repo = open_repo(repo_path)?;
    let _ops_lock = acquire_ops_lock(repo.path())?;

    let base_tag = base.baseline_tag();
    let Some(base_commit) = tag_commit(&repo, &base_tag)? else {
        return Err(AirgapError::BaselineMissing {
            tag: base_tag,
            version: base.to_string(),
        }
        .into());
    };

    let tip_ref = head_branch_ref(&repo)?;
    let tip = head_commit(&repo)?.id();

    let id = clock::timestamp_id(clock::now());
    let bundle = bundle_dir.join(artifact::update_file_name(base, &id));

    let commits = count_delta(&repo, tip, base_commit)?;
    if commits == 0 {
        write_empty_bundle(repo_path, &bundle, tip, &tip_ref)?;
    } else {
        create_bundle(
            repo_path,
            &bundle,
            BundleScope::Since {
                base_tag: &base_tag,
                tip_ref: &tip_ref,
            },
        )?;
    }
    info!(base = %base_tag, commits, "exported update delta");

    verify_bundle(repo_path, &bundle)?;

    let params = ScriptParams::for_artifact(&bundle, base, &tip_ref)?;
    let scripts = write_companion_scripts(&params)?;
    info!(
        verify = %scripts.verify.display(),
        deploy = %scripts.deploy.display(),
        "generated companion scripts"
    );

    Ok(UpdateArtifact {
        base_tag,
        bundle,
        commits,
        scripts,
    })
}

/// Commits reachable from `tip` but not from `base`.
fn count_delta(repo: &Repository, tip: Oid, base: Oid) -> Result<usize> {
    let mut walk = repo.revwalk().context("failed to create revwalk")?;
    walk.push(tip).context("failed to push tip onto revwalk")?;
    walk.hide(base).context("failed to hide base from revwalk")?;

    let mut count = 0;
    for oid in walk {
        oid.context("failed to iterate revwalk")?;
        count += 1;
    }
    Ok(count)
}
