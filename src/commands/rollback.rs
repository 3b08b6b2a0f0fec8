use anyhow::Result;
use tracing::info;

use super::Command;
use crate::{app::context::AppContext, core::git::rollback::parse_count};

pub struct RollbackCommand<'a> {
    pub commits: Option<&'a str>,
}

impl Command for RollbackCommand<'_> {
    fn run(&self, ctx: &AppContext) -> Result<()> {
        let count = parse_count(self.commits)?;
        let repo = ctx.repo_path()?;

        info!(commits = count, repo = %repo.display(), "rolling back");
        let result = crate::core::git::rollback(repo, count)?;
        info!(
            backup = %result.backup_branch,
            commit = %result.rollback_commit,
            "rolled back {} commit(s)",
            result.reverted
        );
        Ok(())
    }
}
