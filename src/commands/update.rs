use anyhow::Result;
use tracing::info;

use super::{Command, required_version};
use crate::app::context::AppContext;

pub struct UpdateCommand<'a> {
    pub base_version: Option<&'a str>,
}

impl Command for UpdateCommand<'_> {
    fn run(&self, ctx: &AppContext) -> Result<()> {
        let base = required_version(self.base_version, "base_version")?;
        let repo = ctx.repo_path()?;
        let bundle_dir = ctx.bundle_dir()?;

        info!(base = %base, repo = %repo.display(), "creating update");
        let artifact = crate::core::git::create_update(repo, &bundle_dir, &base)?;
        info!(
            bundle = %artifact.bundle.display(),
            commits = artifact.commits,
            "update from {} complete",
            artifact.base_tag
        );
        Ok(())
    }
}
