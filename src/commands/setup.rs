use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::info;

use super::Command;
use crate::{
    app::context::AppContext,
    config::AirgapConfig,
    core::git::{discover_root, open_repo},
    error::AirgapError,
};

const DEFAULT_BUNDLE_DIR: &str = "bundles";
const DEFAULT_LOG_DIR: &str = "logs";

pub struct SetupCommand;

impl Command for SetupCommand {
    fn run(&self, ctx: &AppContext) -> Result<()> {
        let cwd = std::env::current_dir().context("failed to read current directory")?;
        let resolved = resolve(&ctx.cfg, &cwd)?;

        let repo_path = resolved.repo_path.clone().unwrap_or_else(|| cwd.clone());
        let _ = open_repo(&repo_path)?;

        let bundle_dir = ensure_dir(resolved.bundle_dir.as_deref(), "bundle")?;
        let log_dir = ensure_dir(resolved.log_dir.as_deref(), "log")?;

        let written = if ctx.config_path.exists() {
            false
        } else {
            let cfg = AirgapConfig {
                bundle_dir: Some(bundle_dir.clone()),
                log_dir: Some(log_dir.clone()),
                ..resolved
            };
            cfg.save(&ctx.config_path)?;
            true
        };

        info!(
            repo = %repo_path.display(),
            bundles = %bundle_dir.display(),
            logs = %log_dir.display(),
            "setup complete"
        );
        if written {
            info!(config = %ctx.config_path.display(), "wrote configuration");
        } else {
            info!(config = %ctx.config_path.display(), "configuration already present");
        }
        Ok(())
    }
}

/// Fill unset values with defaults and make every path absolute.
fn resolve(cfg: &AirgapConfig, cwd: &Path) -> Result<AirgapConfig> {
    let absolute = |p: &Path| {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            cwd.join(p)
        }
    };

    let repo_path = match cfg.repo_path.as_deref() {
        Some(p) => absolute(p),
        None => discover_root(cwd).map_err(|e| AirgapError::RepositoryUnavailable {
            path: cwd.to_path_buf(),
            reason: format!("{e:#}; set REPO_PATH"),
        })?,
    };
    let repo_path = fs::canonicalize(&repo_path).map_err(|e| AirgapError::RepositoryUnavailable {
        path: repo_path.clone(),
        reason: e.to_string(),
    })?;

    Ok(AirgapConfig {
        repo_path: Some(repo_path),
        baseline_version: cfg.baseline_version.clone(),
        bundle_dir: Some(
            cfg.bundle_dir
                .as_deref()
                .map_or_else(|| cwd.join(DEFAULT_BUNDLE_DIR), absolute),
        ),
        log_dir: Some(
            cfg.log_dir
                .as_deref()
                .map_or_else(|| cwd.join(DEFAULT_LOG_DIR), absolute),
        ),
    })
}

fn ensure_dir(dir: Option<&Path>, what: &'static str) -> Result<PathBuf> {
    let dir = dir.context("directory unresolved")?;
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {what} directory {}", dir.display()))?;
    fs::canonicalize(dir).map_err(|_| {
        AirgapError::MissingDirectory {
            what,
            path: dir.to_path_buf(),
        }
        .into()
    })
}
