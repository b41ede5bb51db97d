//! Configuration for caches and resolvers.
//!
//! Configuration is stored in TOML. Every field has a default, so an empty
//! file (or no file at all) is a valid configuration.
//!
//! ## Configuration Sources
//!
//! 1. **Global config**: `config.toml` in the platform config directory
//! 2. **Explicit file**: any path passed to [`Config::from_path`]
//! 3. **Environment variables**: `PAGECAP_*` overrides applied last
//!
//! ## Example Configuration File
//!
//! ```toml
//! [cache]
//! scope = "shared"
//! verify_parent_child = true
//! shards = 16
//!
//! [resolve]
//! max_depth = 256
//! ```
//!
//! ```rust
//! use pagecap_core::{CacheScope, Config};
//!
//! let config = Config::from_toml_str("[cache]\nscope = \"shared\"\n")?;
//! assert_eq!(config.cache.scope, CacheScope::Shared);
//! assert!(config.cache.verify_parent_child);
//! # Ok::<(), pagecap_core::Error>(())
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding [`CacheConfig::verify_parent_child`].
pub const VERIFY_ENV: &str = "PAGECAP_VERIFY_PARENT_CHILD";

/// Default for [`ResolveConfig::max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cache construction settings
    pub cache: CacheConfig,
    /// Resolver settings
    pub resolve: ResolveConfig,
}

/// Which thread-safety tier to build a cache with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheScope {
    /// Shared between unrelated requests; fully concurrent.
    Shared,
    /// One request that may run subrequests concurrently.
    Subrequest,
    /// One sequential request; unsynchronized.
    #[default]
    Request,
}

/// Cache construction settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Tier used by callers that pick a cache from configuration.
    pub scope: CacheScope,

    /// Check parent/child links against cached pages on every insert.
    ///
    /// The check is proportional to the number of links of the inserted page,
    /// so it stays on by default.
    pub verify_parent_child: bool,

    /// Number of lock shards for the shared tier. Values below 1 mean 1.
    pub shards: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            scope: CacheScope::default(),
            verify_parent_child: true,
            shards: 16,
        }
    }
}

/// Resolver settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Deepest parent chain the inheritance resolver will follow.
    pub max_depth: usize,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Config {
    /// Load from the platform config directory, or defaults if absent.
    ///
    /// Environment overrides are applied in both cases.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if an environment override has an invalid value.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::from_path(&path)?,
            _ => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load from an explicit file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {e}")))
    }

    /// Write the configuration to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any filesystem step fails.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;
        Ok(())
    }

    /// Where [`Config::load`] looks for the global file.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "pagecap", "pagecap")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply `PAGECAP_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unrecognized value.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(raw) = lookup(VERIFY_ENV) {
            self.cache.verify_parent_child = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(Error::Config(format!("Invalid {VERIFY_ENV} value: {other}")));
                },
            };
            tracing::debug!(
                verify = self.cache.verify_parent_child,
                "Applied {VERIFY_ENV} override"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_empty_toml_is_default() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.cache.scope, CacheScope::Request);
        assert_eq!(config.resolve.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = Config::from_toml_str(
            "[cache]\nscope = \"subrequest\"\nverify_parent_child = false\n",
        )
        .unwrap();
        assert_eq!(config.cache.scope, CacheScope::Subrequest);
        assert!(!config.cache.verify_parent_child);
        assert_eq!(config.cache.shards, 16);
    }

    #[test]
    fn test_invalid_scope_is_config_error() {
        let err = Config::from_toml_str("[cache]\nscope = \"global\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.cache.scope = CacheScope::Shared;
        config.resolve.max_depth = 8;

        config.save_to(&path).unwrap();
        let loaded = Config::from_path(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_env_override() {
        let mut config = Config::default();
        config
            .apply_overrides_from(|name| (name == VERIFY_ENV).then(|| "off".to_string()))
            .unwrap();
        assert!(!config.cache.verify_parent_child);

        let err = config
            .apply_overrides_from(|_| Some("maybe".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
