//! Start-up hook that fills connection options from discovery.
//!
//! An options object whose connection string is absent, blank, or `auto`
//! has it replaced by the resolved URL. Anything else is treated as an
//! operator decision and left alone.

use super::coordinator::DiscoveryCoordinator;
use crate::discovery::{
    adapters::is_auto_sentinel,
    domain::{DiscoveryContext, DiscoveryResult, parameter_keys, redact_credentials},
};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

/// Options types whose connection string can be discovered.
pub trait DiscoverableOptions {
    /// Registry name of the dependency these options connect to.
    fn service_name(&self) -> &str;

    /// Currently configured connection string.
    fn connection_string(&self) -> Option<&str>;

    /// Stores the discovered URL as the connection string.
    fn apply_discovered_url(&mut self, url: &str);

    /// Parameters merged into the discovery context (credentials, database,
    /// required model).
    fn discovery_parameters(&self) -> Vec<(String, Value)> {
        Vec::new()
    }
}

/// General-purpose connection options for any registered dependency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionOptions {
    service_name: String,
    connection_string: Option<String>,
    username: Option<String>,
    password: Option<String>,
    database: Option<String>,
    required_model: Option<String>,
}

impl ConnectionOptions {
    /// Creates options for `service_name` with discovery enabled.
    #[must_use]
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Self::default()
        }
    }

    /// Sets the connection string (`auto` keeps discovery enabled).
    #[must_use]
    pub fn with_connection_string(mut self, value: impl Into<String>) -> Self {
        self.connection_string = Some(value.into());
        self
    }

    /// Sets the user name applied to discovered URLs.
    #[must_use]
    pub fn with_username(mut self, value: impl Into<String>) -> Self {
        self.username = Some(value.into());
        self
    }

    /// Sets the password applied to discovered URLs.
    #[must_use]
    pub fn with_password(mut self, value: impl Into<String>) -> Self {
        self.password = Some(value.into());
        self
    }

    /// Sets the database applied to discovered URLs.
    #[must_use]
    pub fn with_database(mut self, value: impl Into<String>) -> Self {
        self.database = Some(value.into());
        self
    }

    /// Sets the model a model server must already provide.
    #[must_use]
    pub fn with_required_model(mut self, value: impl Into<String>) -> Self {
        self.required_model = Some(value.into());
        self
    }

    /// Returns the configured user name.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Returns the configured database.
    #[must_use]
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// Returns the required model.
    #[must_use]
    pub fn required_model(&self) -> Option<&str> {
        self.required_model.as_deref()
    }
}

impl DiscoverableOptions for ConnectionOptions {
    fn service_name(&self) -> &str {
        &self.service_name
    }

    fn connection_string(&self) -> Option<&str> {
        self.connection_string.as_deref()
    }

    fn apply_discovered_url(&mut self, url: &str) {
        self.connection_string = Some(url.to_owned());
    }

    fn discovery_parameters(&self) -> Vec<(String, Value)> {
        [
            (parameter_keys::USERNAME, &self.username),
            (parameter_keys::PASSWORD, &self.password),
            (parameter_keys::DATABASE, &self.database),
            (parameter_keys::REQUIRED_MODEL, &self.required_model),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_ref()
                .map(|text| (key.to_owned(), Value::String(text.clone())))
        })
        .collect()
    }
}

/// What [`OptionsConfigurator`] did to an options object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigureOutcome {
    /// The options already carried a connection string; nothing changed.
    Explicit,
    /// Discovery ran and its URL was written into the options.
    Discovered(DiscoveryResult),
}

/// Errors raised while configuring options from discovery.
#[derive(Debug, Error)]
pub enum OptionsConfigurationError {
    /// Discovery produced no usable address.
    #[error("discovery for '{service}' failed: {message}")]
    DiscoveryFailed {
        /// Requested service name.
        service: String,
        /// Failure reported by the coordinator.
        message: String,
    },
}

/// Result type for options configuration.
pub type OptionsConfigurationResult<T> = Result<T, OptionsConfigurationError>;

/// Applies discovery results to options objects at start-up.
#[derive(Clone)]
pub struct OptionsConfigurator<C>
where
    C: Clock + Send + Sync,
{
    coordinator: DiscoveryCoordinator<C>,
    base_context: DiscoveryContext,
}

impl<C> OptionsConfigurator<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a configurator resolving with `base_context`.
    #[must_use]
    pub const fn new(coordinator: DiscoveryCoordinator<C>, base_context: DiscoveryContext) -> Self {
        Self {
            coordinator,
            base_context,
        }
    }

    /// Fills `options` from discovery, blocking the calling thread.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsConfigurationError::DiscoveryFailed`] when the
    /// service is unknown or produced no candidates.
    pub fn configure<O: DiscoverableOptions>(
        &self,
        options: &mut O,
    ) -> OptionsConfigurationResult<ConfigureOutcome> {
        if !is_auto_sentinel(options.connection_string()) {
            return Ok(ConfigureOutcome::Explicit);
        }
        let context = self.context_for(options);
        let result = self
            .coordinator
            .resolve_blocking(options.service_name(), &context);
        apply(options, result)
    }

    /// Fills `options` from discovery.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsConfigurationError::DiscoveryFailed`] when the
    /// service is unknown or produced no candidates.
    pub async fn configure_async<O: DiscoverableOptions>(
        &self,
        options: &mut O,
    ) -> OptionsConfigurationResult<ConfigureOutcome> {
        if !is_auto_sentinel(options.connection_string()) {
            return Ok(ConfigureOutcome::Explicit);
        }
        let context = self.context_for(options);
        let result = self
            .coordinator
            .resolve(options.service_name(), &context)
            .await;
        apply(options, result)
    }

    fn context_for<O: DiscoverableOptions>(&self, options: &O) -> DiscoveryContext {
        self.base_context
            .clone()
            .with_parameters(options.discovery_parameters())
    }
}

fn apply<O: DiscoverableOptions>(
    options: &mut O,
    result: DiscoveryResult,
) -> OptionsConfigurationResult<ConfigureOutcome> {
    match result.service_url().filter(|_| result.is_successful()) {
        Some(url) => {
            info!(
                service = options.service_name(),
                url = %redact_credentials(url),
                healthy = result.is_healthy(),
                "configured connection from discovery"
            );
            options.apply_discovered_url(url);
            Ok(ConfigureOutcome::Discovered(result))
        }
        None => Err(OptionsConfigurationError::DiscoveryFailed {
            service: options.service_name().to_owned(),
            message: result
                .error_message()
                .unwrap_or("no address resolved")
                .to_owned(),
        }),
    }
}
