use anyhow::Result;

use super::Command;
use crate::{
    app::context::AppContext,
    core::git::{
        inventory::{artifacts, baseline_tags},
        open_repo,
    },
};

pub struct ListCommand;

impl Command for ListCommand {
    fn run(&self, ctx: &AppContext) -> Result<()> {
        let repo_path = ctx.repo_path()?;
        let bundle_dir = ctx.bundle_dir()?;
        let repo = open_repo(repo_path)?;

        println!("repository: {}", repo_path.display());
        println!("baseline version: {}", ctx.cfg.baseline_version);

        println!("baselines:");
        let tags = baseline_tags(&repo)?;
        if tags.is_empty() {
            println!("  (none)");
        }
        for tag in tags {
            println!("  {}  {}", tag.name, tag.short_id);
        }

        println!("artifacts ({}):", bundle_dir.display());
        let found = artifacts(&bundle_dir)?;
        if found.is_empty() {
            println!("  (none)");
        }
        for entry in found {
            let name = entry
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            println!("  {name}  {} bytes", entry.size);
        }
        Ok(())
    }
}
