use std::{
    ffi::{OsStr, OsString},
    path::Path,
    process::{Command, Output, Stdio},
};

use anyhow::{Context, Result};
use tracing::{debug, trace};

use crate::error::AirgapError;

/// Run `git <args>` inside `repo_path`, capturing output.
///
/// A non-zero exit becomes [`AirgapError::Git`] carrying git's stderr.
///
/// # Errors
/// Returns an error if `git` cannot be spawned or exits unsuccessfully.
pub fn git<I, S>(repo_path: &Path, args: I) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<OsString> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
    let rendered = render(&args);
    debug!(cwd = %repo_path.display(), "git {rendered}");

    let output = Command::new("git")
        .current_dir(repo_path)
        .args(&args)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("failed to run git {rendered}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = match stderr.trim() {
            "" => format!("exited with {}", output.status),
            s => s.to_string(),
        };
        return Err(AirgapError::Git {
            command: rendered,
            detail,
        }
        .into());
    }

    trace!(
        stdout = %String::from_utf8_lossy(&output.stdout).trim(),
        stderr = %String::from_utf8_lossy(&output.stderr).trim(),
        "git {rendered} finished"
    );
    Ok(output)
}

fn render(args: &[OsString]) -> String {
    args.iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
