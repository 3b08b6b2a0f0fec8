use anyhow::Result;
use tracing::info;

use super::{Command, required_version};
use crate::app::context::AppContext;

pub struct BaselineCommand<'a> {
    pub version: Option<&'a str>,
}

impl Command for BaselineCommand<'_> {
    fn run(&self, ctx: &AppContext) -> Result<()> {
        let version = required_version(self.version, "version")?;
        let repo = ctx.repo_path()?;
        let bundle_dir = ctx.bundle_dir()?;

        info!(version = %version, repo = %repo.display(), "creating baseline");
        let artifact = crate::core::git::create_baseline(repo, &bundle_dir, &version)?;
        info!(
            tag = %artifact.tag,
            bundle = %artifact.bundle.display(),
            "baseline {version} complete"
        );
        Ok(())
    }
}
