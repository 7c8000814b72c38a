//! Store configuration, loadable from TOML.
//!
//! ```toml
//! path = "/var/cache/discovery.db"
//! readers = 4
//! foreign_keys = true
//! busy_timeout_ms = 5000
//! wal = true
//! ```
//!
//! Every key is optional; a missing `path` selects an in-memory store.

use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// StoreConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Database file; `None` keeps the store in memory.
    pub path: Option<PathBuf>,

    /// Read-only connections for file-backed stores.
    pub readers: usize,

    /// Enforce `FOREIGN KEY ... ON DELETE CASCADE`.
    pub foreign_keys: bool,

    pub busy_timeout_ms: u64,

    /// Write-ahead logging for file-backed stores.
    pub wal: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            readers: 4,
            foreign_keys: true,
            busy_timeout_ms: 5_000,
            wal: true,
        }
    }
}

impl StoreConfig {
    /// In-memory store with default settings.
    #[must_use]
    pub fn memory() -> Self {
        Self::default()
    }

    /// File-backed store with default settings.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&text)
    }

    #[must_use]
    pub const fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    #[must_use]
    pub const fn is_memory(&self) -> bool {
        self.path.is_none()
    }
}

///
/// TESTS
///
