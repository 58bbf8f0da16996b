//! Base configuration loading from disk.
//!
//! Layers, highest precedence first:
//! 1. `CONFIG_FORCE_*` environment overrides
//! 2. `iep-<account-type>.toml` overlay (optional)
//! 3. `application.toml`
//! 4. `reference.toml`
//!
//! A missing overlay degrades to the default layers. An overlay that exists
//! but does not parse is a hard error.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::env::{env_overrides, process_overrides};
use crate::config::error::{ConfigError, ConfigResult};
use crate::config::source::PropertySource;
use crate::config::tree::ConfigTree;

/// Key selecting the environment overlay.
pub const ACCOUNT_TYPE_KEY: &str = "netflix.iep.env.account-type";

/// Environment variable naming the config directory.
pub const CONFIG_DIR_ENV: &str = "IEP_CONFIG_DIR";

const DEFAULT_CONFIG_DIR: &str = "config";

/// Loads the static configuration tree from a directory of TOML files.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    dir: PathBuf,
    env: Vec<(String, String)>,
}

impl ConfigLoader {
    /// Loader over `dir`, using the process environment for overrides.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            env: process_overrides(),
        }
    }

    /// Loader over `$IEP_CONFIG_DIR`, or `./config` when unset.
    pub fn from_env() -> Self {
        let dir = std::env::var_os(CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR));
        Self::new(dir)
    }

    /// Replace the environment snapshot used for overrides.
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load the merged static configuration.
    pub fn load(&self) -> ConfigResult<ConfigTree> {
        let overrides = env_overrides(self.env.iter().map(|(k, v)| (k, v)));
        let reference = self.load_named("reference")?.unwrap_or_default();
        let application = self.load_named("application")?.unwrap_or_default();
        let base = overrides.with_fallback(&application.with_fallback(&reference));

        let account_type = base.get_string(ACCOUNT_TYPE_KEY)?;
        let overlay_name = format!("iep-{}", account_type);

        match self.load_named(&overlay_name)? {
            Some(overlay) => {
                tracing::info!(
                    dir = %self.dir.display(),
                    overlay = %overlay_name,
                    keys = overlay.len(),
                    "Loaded environment overlay"
                );
                Ok(overrides.with_fallback(&overlay).with_fallback(&base))
            }
            None => {
                tracing::info!(
                    dir = %self.dir.display(),
                    overlay = %overlay_name,
                    "Environment overlay not found, using default layers"
                );
                Ok(base)
            }
        }
    }

    /// Read `<name>.toml` from the config directory.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub fn load_named(&self, name: &str) -> ConfigResult<Option<ConfigTree>> {
        let path = self.dir.join(format!("{}.toml", name));
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(ConfigError::Io { path, source }),
        };

        let tree = ConfigTree::from_toml_str(&content)
            .map_err(|source| ConfigError::Parse { path: path.clone(), source })?;
        tracing::debug!(path = %path.display(), keys = tree.len(), "Read config layer");
        Ok(Some(tree))
    }
}
