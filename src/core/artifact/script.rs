use std::{
    borrow::Cow,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use shell_escape::unix::escape;
use tracing::debug;

use super::{artifact_id, companion_script_path, sha256_file};
use crate::core::version::Version;

/// Branch every deployment script checks out in the destination repository.
pub const DEPLOY_BRANCH: &str = "master";

/// Kind of companion script generated next to an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    Verify,
    Deploy,
}

impl ScriptKind {
    /// File name suffix replacing the artifact's `.bundle` extension.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Verify => "_verify.sh",
            Self::Deploy => "_deploy.sh",
        }
    }

    /// Render the script text for `params`.
    #[must_use]
    pub fn render(self, params: &ScriptParams) -> String {
        match self {
            Self::Verify => render_verify(params),
            Self::Deploy => render_deploy(params),
        }
    }
}

/// Values baked literally into a generated script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptParams {
    /// Absolute path of the artifact at generation time.
    pub artifact: PathBuf,
    pub artifact_id: String,
    pub version: String,
    /// Full ref name the artifact exports, e.g. `refs/heads/main`.
    pub source_ref: String,
    pub sha256: String,
}

impl ScriptParams {
    /// Collect parameters for an artifact that already exists on disk.
    ///
    /// # Errors
    /// Returns an error if the artifact cannot be read for hashing.
    pub fn for_artifact(artifact: &Path, version: &Version, source_ref: &str) -> Result<Self> {
        Ok(Self {
            artifact: artifact.to_path_buf(),
            artifact_id: artifact_id(artifact),
            version: version.to_string(),
            source_ref: source_ref.to_string(),
            sha256: sha256_file(artifact)?,
        })
    }
}

/// Paths of the scripts written for one artifact.
#[derive(Debug, Clone)]
pub struct CompanionScripts {
    pub verify: PathBuf,
    pub deploy: PathBuf,
}

/// Write both companion scripts next to the artifact.
///
/// # Errors
/// Returns an error if a script cannot be written or made executable.
pub fn write_companion_scripts(params: &ScriptParams) -> Result<CompanionScripts> {
    let verify = companion_script_path(&params.artifact, ScriptKind::Verify);
    write_script(&verify, &ScriptKind::Verify.render(params))?;
    let deploy = companion_script_path(&params.artifact, ScriptKind::Deploy);
    write_script(&deploy, &ScriptKind::Deploy.render(params))?;
    Ok(CompanionScripts { verify, deploy })
}

fn write_script(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("failed to make {} executable", path.display()))?;
    }

    debug!(script = %path.display(), "wrote companion script");
    Ok(())
}

fn quote(value: &str) -> String {
    escape(Cow::Borrowed(value)).into_owned()
}

fn header(kind: &str, params: &ScriptParams) -> String {
    format!(
        "#!/bin/sh\n\
         # git-airgap {kind} script for {id} (version {version})\n\
         # Paths are fixed at export time; regenerate if the artifact moves.\n\
         \n\
         BUNDLE={bundle}\n\
         EXPECTED_SHA256={sha}\n",
        id = params.artifact_id,
        version = params.version,
        bundle = quote(&params.artifact.to_string_lossy()),
        sha = quote(&params.sha256),
    )
}

const CHECKSUM_BLOCK: &str = r#"[ -f "$BUNDLE" ] || fail "$BUNDLE not found"

actual=""
if command -v sha256sum >/dev/null 2>&1; then
    actual=$(sha256sum "$BUNDLE" | cut -d ' ' -f 1)
elif command -v shasum >/dev/null 2>&1; then
    actual=$(shasum -a 256 "$BUNDLE" | cut -d ' ' -f 1)
else
    echo "warning: no sha256 tool found, skipping checksum" >&2
fi
if [ -n "$actual" ] && [ "$actual" != "$EXPECTED_SHA256" ]; then
    fail "checksum mismatch for $BUNDLE"
fi
"#;

/// Script that re-runs `git bundle verify` on the fixed artifact path.
#[must_use]
pub fn render_verify(params: &ScriptParams) -> String {
    let mut out = header("verification", params);
    out.push_str(
        r#"
fail() {
    echo "Bundle verification FAILED: $1" >&2
    exit 1
}

"#,
    );
    out.push_str(CHECKSUM_BLOCK);
    out.push_str(
        r#"
if git rev-parse --git-dir >/dev/null 2>&1; then
    git bundle verify "$BUNDLE" || fail "$BUNDLE"
else
    scratch=$(mktemp -d) || fail "cannot create scratch repository"
    git init -q "$scratch" && git -C "$scratch" bundle verify "$BUNDLE"
    status=$?
    rm -rf "$scratch"
    [ "$status" -eq 0 ] || fail "$BUNDLE"
fi

echo "Bundle verification successful: $BUNDLE"
"#,
    );
    out
}

/// Script that imports the fixed artifact into a destination directory.
#[must_use]
pub fn render_deploy(params: &ScriptParams) -> String {
    let mut out = header("deployment", params);
    out.push_str(&format!(
        "SOURCE_REF={}\nTARGET_BRANCH={}\n",
        quote(&params.source_ref),
        quote(DEPLOY_BRANCH)
    ));
    out.push_str(
        r#"
fail() {
    echo "Deployment FAILED: $1" >&2
    exit 1
}

if [ $# -lt 1 ] || [ -z "$1" ]; then
    echo "Usage: $0 <destination-directory>" >&2
    exit 1
fi
DEST=$1

"#,
    );
    out.push_str(CHECKSUM_BLOCK);
    out.push_str(
        r#"
mkdir -p "$DEST" || fail "cannot create $DEST"
cd "$DEST" || fail "cannot enter $DEST"
if [ ! -d .git ]; then
    git init -q || fail "cannot initialize repository in $DEST"
fi

git fetch -q --update-head-ok "$BUNDLE" "+$SOURCE_REF:refs/heads/$TARGET_BRANCH" \
    || fail "cannot import $BUNDLE"
git checkout -q -f "$TARGET_BRANCH" || fail "cannot check out $TARGET_BRANCH"

echo "Deployed $BUNDLE to $DEST on branch $TARGET_BRANCH"
"#,
    );
    out
}
