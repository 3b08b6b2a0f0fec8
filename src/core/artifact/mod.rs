use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::core::version::Version;

pub mod script;

pub use script::{ScriptKind, ScriptParams, write_companion_scripts};

/// File extension of every exported artifact.
pub const BUNDLE_EXTENSION: &str = "bundle";

/// `baseline_<version>.bundle`
#[must_use]
pub fn baseline_file_name(version: &Version) -> String {
    format!("baseline_{version}.{BUNDLE_EXTENSION}")
}

/// `update_<base>_<timestamp>.bundle`
#[must_use]
pub fn update_file_name(base: &Version, timestamp_id: &str) -> String {
    format!("update_{base}_{timestamp_id}.{BUNDLE_EXTENSION}")
}

/// Artifact identifier: the file name without its `.bundle` extension.
#[must_use]
pub fn artifact_id(artifact: &Path) -> String {
    let name = artifact
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.strip_suffix(&format!(".{BUNDLE_EXTENSION}"))
        .map_or_else(|| name.clone(), str::to_string)
}

/// Path of a companion script living next to `artifact`.
#[must_use]
pub fn companion_script_path(artifact: &Path, kind: ScriptKind) -> PathBuf {
    let name = format!("{}{}", artifact_id(artifact), kind.suffix());
    artifact.with_file_name(name)
}

/// Hex-encoded SHA-256 of a file's contents.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file =
        fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file
            .read(&mut buf)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
