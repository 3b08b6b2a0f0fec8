use std::{
    fmt::Write as _,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

/// Default location of the configuration file, relative to the current
/// directory.
pub const DEFAULT_CONFIG_FILE: &str = ".git-airgap.conf";

/// Baseline version recorded when the file does not set one.
pub const DEFAULT_BASELINE_VERSION: &str = "1.0.0";

const KEY_REPO_PATH: &str = "REPO_PATH";
const KEY_BASELINE_VERSION: &str = "BASELINE_VERSION";
const KEY_BUNDLE_DIR: &str = "BUNDLE_DIR";
const KEY_LOG_DIR: &str = "LOG_DIR";

/// Persisted settings read from a `KEY="value"` file.
///
/// Empty values mean "unset"; callers decide whether that is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirgapConfig {
    pub repo_path: Option<PathBuf>,
    pub baseline_version: String,
    pub bundle_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
}

impl Default for AirgapConfig {
    fn default() -> Self {
        Self {
            repo_path: None,
            baseline_version: DEFAULT_BASELINE_VERSION.to_string(),
            bundle_dir: None,
            log_dir: None,
        }
    }
}

impl AirgapConfig {
    /// Load configuration from `path`, falling back to defaults when the file
    /// does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Self::parse(&text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    /// Apply every recognised assignment in `text` over the defaults.
    /// Unknown keys and malformed lines are ignored.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut cfg = Self::default();
        for line in text.lines() {
            let Some((key, value)) = parse_assignment(line) else {
                continue;
            };
            match key {
                KEY_REPO_PATH => cfg.repo_path = non_empty_path(&value),
                KEY_BASELINE_VERSION => cfg.baseline_version = value,
                KEY_BUNDLE_DIR => cfg.bundle_dir = non_empty_path(&value),
                KEY_LOG_DIR => cfg.log_dir = non_empty_path(&value),
                _ => {}
            }
        }
        cfg
    }

    /// Render as `KEY="value"` lines.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::from("# git-airgap configuration\n");
        let path_value = |p: &Option<PathBuf>| {
            p.as_deref()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        for (key, value) in [
            (KEY_REPO_PATH, path_value(&self.repo_path)),
            (KEY_BASELINE_VERSION, self.baseline_version.clone()),
            (KEY_BUNDLE_DIR, path_value(&self.bundle_dir)),
            (KEY_LOG_DIR, path_value(&self.log_dir)),
        ] {
            let _ = writeln!(out, "{key}=\"{}\"", escape_double_quoted(&value));
        }
        out
    }

    /// Write the rendered configuration to `path`, creating parent
    /// directories as needed.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(path, self.render()).with_context(|| format!("failed to write {}", path.display()))
    }
}

fn non_empty_path(value: &str) -> Option<PathBuf> {
    (!value.is_empty()).then(|| PathBuf::from(value))
}

/// Split `KEY=value` into its parts, unquoting the value.
fn parse_assignment(line: &str) -> Option<(&str, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").map_or(line, str::trim_start);
    let (key, raw) = line.split_once('=')?;
    if key.is_empty() || !key.chars().all(|c| c == '_' || c.is_ascii_alphanumeric()) {
        return None;
    }
    Some((key, unquote(raw.trim_end())?))
}

fn unquote(raw: &str) -> Option<String> {
    if let Some(inner) = raw.strip_prefix('"') {
        let inner = inner.strip_suffix('"')?;
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\\'
                && let Some(next) = chars.next()
            {
                if !matches!(next, '"' | '\\' | '$' | '`') {
                    out.push('\\');
                }
                out.push(next);
            } else {
                out.push(c);
            }
        }
        Some(out)
    } else if let Some(inner) = raw.strip_prefix('\'') {
        inner.strip_suffix('\'').map(str::to_string)
    } else if raw.contains(char::is_whitespace) {
        None
    } else {
        Some(raw.to_string())
    }
}

fn escape_double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
