use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Result;

use super::Command;
use crate::{app::context::AppContext, error::AirgapError};

pub struct VerifyCommand<'a> {
    pub artifact: Option<&'a Path>,
}

impl Command for VerifyCommand<'_> {
    fn run(&self, ctx: &AppContext) -> Result<()> {
        let artifact = self
            .artifact
            .ok_or(AirgapError::MissingArgument("artifact"))?;
        let repo = ctx.repo_path()?;
        let artifact = resolve_artifact(ctx, artifact);
        crate::core::git::verify_bundle(repo, &artifact)
    }
}

/// Bare file names that do not exist locally are looked up in the bundle
/// directory.
fn resolve_artifact(ctx: &AppContext, artifact: &Path) -> PathBuf {
    if artifact.exists() {
        return fs::canonicalize(artifact).unwrap_or_else(|_| artifact.to_path_buf());
    }
    let is_bare_name = artifact.parent().is_none_or(|p| p.as_os_str().is_empty());
    if !is_bare_name {
        return artifact.to_path_buf();
    }
    ctx.bundle_dir()
        .map_or_else(|_| artifact.to_path_buf(), |dir| dir.join(artifact))
}
