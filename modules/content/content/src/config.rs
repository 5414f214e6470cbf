//! Content module configuration.

use std::path::Path;

use dataloader::LoaderConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::permitter::DEFAULT_MAX_OWNER_DEPTH;

/// Prefix of environment variables overriding file configuration.
/// Nested keys are separated by `__`, e.g. `STUDYHUB_LOADER__MAX_BATCH_SIZE`.
pub const ENV_PREFIX: &str = "STUDYHUB_";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    /// Settings shared by every entity loader of a request.
    pub loader: LoaderConfig,

    /// Settings of the permitter's query-permission cache.
    pub permission_cache: LoaderConfig,

    /// How many `owner_via` hops ownership resolution follows before giving up.
    pub max_owner_depth: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            loader: LoaderConfig::default(),
            permission_cache: LoaderConfig::default(),
            max_owner_depth: DEFAULT_MAX_OWNER_DEPTH,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid content configuration: {0}")]
    Invalid(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        Self::Invalid(Box::new(e))
    }
}

impl ContentConfig {
    /// Defaults, then the YAML file at `path`, then `STUDYHUB_` environment variables.
    #[must_use]
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load configuration from `path` merged with the environment.
    ///
    /// A missing file leaves the defaults in place.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for malformed YAML, unknown keys or
    /// values of the wrong type.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment(path.as_ref()))
    }

    /// Extract from an already assembled figment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when extraction fails.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        Ok(figment.extract()?)
    }
}
