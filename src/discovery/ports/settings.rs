//! Read-only key/value views over process environment and configuration.

use std::sync::Arc;
use thiserror::Error;

/// Result type for settings loading.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Key/value lookup used by adapters to read environment variables and
/// configuration.
///
/// Configuration keys use `:` separators (`Mongo:ConnectionString`) and are
/// matched case-insensitively by every shipped implementation.
pub trait SettingsSource: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Returns the value under `key` when it is non-blank after trimming.
    fn get_non_blank(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    }
}

impl<T: SettingsSource + ?Sized> SettingsSource for Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

/// Environment and configuration views read by discovery adapters.
#[derive(Clone)]
pub struct DiscoverySources {
    environment: Arc<dyn SettingsSource>,
    configuration: Arc<dyn SettingsSource>,
}

impl DiscoverySources {
    /// Bundles an environment view and a configuration view.
    #[must_use]
    pub fn new(
        environment: Arc<dyn SettingsSource>,
        configuration: Arc<dyn SettingsSource>,
    ) -> Self {
        Self {
            environment,
            configuration,
        }
    }

    /// Returns the process environment view.
    #[must_use]
    pub fn environment(&self) -> &dyn SettingsSource {
        self.environment.as_ref()
    }

    /// Returns the application configuration view.
    #[must_use]
    pub fn configuration(&self) -> &dyn SettingsSource {
        self.configuration.as_ref()
    }
}

impl std::fmt::Debug for DiscoverySources {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("DiscoverySources").finish_non_exhaustive()
    }
}

/// Errors returned while loading settings from persistent sources.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be opened or read.
    #[error("cannot read settings file '{path}': {source}")]
    Io {
        /// File path as supplied by the caller.
        path: String,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The settings file is not valid JSON.
    #[error("settings file '{path}' is not valid JSON: {source}")]
    Parse {
        /// File path as supplied by the caller.
        path: String,
        /// Underlying parse failure.
        source: serde_json::Error,
    },

    /// The settings document root is not a JSON object.
    #[error("settings file '{0}' must contain a JSON object at the root")]
    NotAnObject(String),
}
