use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use git2::Repository;

use super::repo::tag_commit;
use crate::core::{artifact::BUNDLE_EXTENSION, version::BASELINE_TAG_PREFIX};

/// A `baseline-*` tag and the commit it marks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineTag {
    pub name: String,
    pub short_id: String,
}

/// An exported artifact found in the bundle directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactEntry {
    pub path: PathBuf,
    pub size: u64,
}

/// All baseline tags in the repository, sorted by name.
///
/// # Errors
/// Returns an error if tags cannot be enumerated.
pub fn baseline_tags(repo: &Repository) -> Result<Vec<BaselineTag>> {
    let pattern = format!("{BASELINE_TAG_PREFIX}*");
    let names = repo
        .tag_names(Some(pattern.as_str()))
        .context("failed to list tags")?;

    let mut tags = Vec::new();
    for name in names.iter().flatten() {
        let Some(oid) = tag_commit(repo, name)? else {
            continue;
        };
        let short_id = repo
            .find_object(oid, None)
            .and_then(|o| o.short_id())
            .ok()
            .and_then(|buf| buf.as_str().map(str::to_string))
            .unwrap_or_else(|| oid.to_string());
        tags.push(BaselineTag {
            name: name.to_string(),
            short_id,
        });
    }
    tags.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(tags)
}

/// All `*.bundle` files directly inside `bundle_dir`, sorted by file name.
///
/// # Errors
/// Returns an error if the directory cannot be read.
pub fn artifacts(bundle_dir: &Path) -> Result<Vec<ArtifactEntry>> {
    let entries = fs::read_dir(bundle_dir)
        .with_context(|| format!("failed to read {}", bundle_dir.display()))?;

    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read {}", bundle_dir.display()))?;
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != BUNDLE_EXTENSION) {
            continue;
        }
        let meta = entry
            .metadata()
            .with_context(|| format!("failed to stat {}", path.display()))?;
        if meta.is_file() {
            out.push(ArtifactEntry {
                path,
                size: meta.len(),
            });
        }
    }
    out.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(out)
}
