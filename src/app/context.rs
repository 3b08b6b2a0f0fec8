use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Result;

use crate::{
    config::{AirgapConfig, DEFAULT_CONFIG_FILE},
    error::AirgapError,
};

/// Per-invocation state handed to every command handler.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config_path: PathBuf,
    pub cfg: AirgapConfig,
    pub verbosity: u8,
}

impl AppContext {
    pub const fn new(config_path: PathBuf, cfg: AirgapConfig, verbosity: u8) -> Self {
        Self {
            config_path,
            cfg,
            verbosity,
        }
    }

    /// Load configuration from `config_path` (or the default location).
    ///
    /// # Errors
    /// Returns an error if an existing config file cannot be read.
    pub fn load(config_path: Option<&Path>, verbosity: u8) -> Result<Self> {
        let config_path = config_path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);
        let cfg = AirgapConfig::load(&config_path)?;
        Ok(Self::new(config_path, cfg, verbosity))
    }

    /// Configured repository path.
    ///
    /// # Errors
    /// Returns [`AirgapError::NotConfigured`] when unset.
    pub fn repo_path(&self) -> Result<&Path> {
        self.cfg
            .repo_path
            .as_deref()
            .ok_or_else(|| self.not_configured("REPO_PATH").into())
    }

    /// Absolute path of the existing bundle directory.
    ///
    /// # Errors
    /// Fails when unset or missing on disk.
    pub fn bundle_dir(&self) -> Result<PathBuf> {
        let dir = self
            .cfg
            .bundle_dir
            .as_deref()
            .ok_or_else(|| self.not_configured("BUNDLE_DIR"))?;
        fs::canonicalize(dir).map_err(|_| {
            AirgapError::MissingDirectory {
                what: "bundle",
                path: dir.to_path_buf(),
            }
            .into()
        })
    }

    fn not_configured(&self, key: &'static str) -> AirgapError {
        AirgapError::NotConfigured {
            key,
            path: self.config_path.clone(),
        }
    }
}
