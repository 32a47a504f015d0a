use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name under which the container registers itself when `container_type` is set.
pub const CONTAINER_SERVICE: &str = "container";

/// Settings of a single build.
///
/// ```toml
/// excluded_types = ["ArrayAccess", "Countable"]
/// container_type = "App\\Container"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Types that never serve as autowiring keys, e.g. marker interfaces
    /// implemented by many unrelated services.
    pub excluded_types: Vec<String>,

    /// Type of the generated container. When set, the container itself is
    /// registered as an imported service named `container`.
    pub container_type: Option<String>,
}

/// Errors that can occur while loading a [`BuildConfig`].
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("Error reading build configuration {path}: {source}")]
    #[diagnostic(code(wirebox_resolve::config_io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid build configuration: {0}")]
    #[diagnostic(
        code(wirebox_resolve::config_parse),
        help("Known keys are `excluded_types` and `container_type`")
    )]
    Parse(#[from] toml::de::Error),
}

impl BuildConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let config = Self::from_toml_str(&source)?;
        log::debug!("loaded build configuration from {}", path.display());
        Ok(config)
    }
}
