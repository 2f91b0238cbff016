//! Discovery settings read from configuration.

use super::environment::detect_orchestration_mode;
use crate::discovery::{
    domain::{DEFAULT_HEALTH_CHECK_TIMEOUT, DiscoveryContext, OrchestrationMode},
    ports::SettingsSource,
};
use std::time::Duration;
use thiserror::Error;

/// Configuration key holding the per-probe timeout in milliseconds.
pub const HEALTH_CHECK_TIMEOUT_KEY: &str = "Discovery:HealthCheckTimeoutMs";
/// Configuration key forcing an orchestration mode.
pub const ORCHESTRATION_MODE_KEY: &str = "Discovery:OrchestrationMode";

/// Errors raised while reading discovery configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A configured value could not be interpreted.
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        /// Configuration key.
        key: &'static str,
        /// Raw value as configured.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Discovery settings for one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryConfig {
    health_check_timeout: Duration,
    orchestration_mode: Option<OrchestrationMode>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            health_check_timeout: DEFAULT_HEALTH_CHECK_TIMEOUT,
            orchestration_mode: None,
        }
    }
}

impl DiscoveryConfig {
    /// Reads discovery settings from `configuration`.
    ///
    /// A missing timeout defaults to 500 ms; negative timeouts clamp to zero,
    /// which disables health validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the timeout is not an integer or
    /// the orchestration mode is not recognised.
    pub fn from_settings(configuration: &dyn SettingsSource) -> Result<Self, ConfigError> {
        let health_check_timeout = match configuration.get_non_blank(HEALTH_CHECK_TIMEOUT_KEY) {
            Some(raw) => {
                let millis = raw.parse::<i64>().map_err(|err| ConfigError::Invalid {
                    key: HEALTH_CHECK_TIMEOUT_KEY,
                    value: raw.clone(),
                    reason: err.to_string(),
                })?;
                Duration::from_millis(u64::try_from(millis).unwrap_or(0))
            }
            None => DEFAULT_HEALTH_CHECK_TIMEOUT,
        };

        let orchestration_mode = configuration
            .get_non_blank(ORCHESTRATION_MODE_KEY)
            .map(|raw| {
                OrchestrationMode::try_from(raw.as_str()).map_err(|err| ConfigError::Invalid {
                    key: ORCHESTRATION_MODE_KEY,
                    value: raw.clone(),
                    reason: err.to_string(),
                })
            })
            .transpose()?;

        Ok(Self {
            health_check_timeout,
            orchestration_mode,
        })
    }

    /// Sets the per-probe timeout.
    #[must_use]
    pub const fn with_health_check_timeout(mut self, timeout: Duration) -> Self {
        self.health_check_timeout = timeout;
        self
    }

    /// Forces an orchestration mode instead of detecting one.
    #[must_use]
    pub const fn with_orchestration_mode(mut self, mode: OrchestrationMode) -> Self {
        self.orchestration_mode = Some(mode);
        self
    }

    /// Returns the per-probe timeout.
    #[must_use]
    pub const fn health_check_timeout(&self) -> Duration {
        self.health_check_timeout
    }

    /// Returns the configured orchestration mode, if forced.
    #[must_use]
    pub const fn orchestration_mode(&self) -> Option<OrchestrationMode> {
        self.orchestration_mode
    }

    /// Builds the base context, detecting the orchestration mode from
    /// `environment` unless one is configured.
    #[must_use]
    pub fn context(
        &self,
        environment: &dyn SettingsSource,
        container_marker_present: bool,
    ) -> DiscoveryContext {
        let mode = self.orchestration_mode.unwrap_or_else(|| {
            detect_orchestration_mode(environment, container_marker_present)
        });
        DiscoveryContext::new(mode).with_health_check_timeout(self.health_check_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::adapters::settings::InMemorySettings;
    use rstest::rstest;

    #[rstest]
    #[case(&[], Duration::from_millis(500))]
    #[case(&[("Discovery:HealthCheckTimeoutMs", "1500")], Duration::from_millis(1500))]
    #[case(&[("discovery__healthchecktimeoutms", "0")], Duration::ZERO)]
    #[case(&[("Discovery:HealthCheckTimeoutMs", "-20")], Duration::ZERO)]
    fn timeouts_are_read_and_clamped(
        #[case] values: &[(&str, &str)],
        #[case] expected: Duration,
    ) {
        let settings = InMemorySettings::from_pairs(values.iter().copied());

        let config = DiscoveryConfig::from_settings(&settings).expect("config should load");

        assert_eq!(config.health_check_timeout(), expected);
    }

    #[rstest]
    #[case("Discovery:HealthCheckTimeoutMs", "soon")]
    #[case("Discovery:OrchestrationMode", "mainframe")]
    fn malformed_values_are_rejected(#[case] key: &str, #[case] value: &str) {
        let settings = InMemorySettings::new().with(key, value);

        let result = DiscoveryConfig::from_settings(&settings);

        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[rstest]
    fn configured_modes_win_over_detection() {
        let settings = InMemorySettings::new().with("Discovery:OrchestrationMode", "container");
        let environment = InMemorySettings::new().with("CI", "true");

        let context = DiscoveryConfig::from_settings(&settings)
            .expect("config should load")
            .context(&environment, false);

        assert_eq!(context.orchestration_mode(), OrchestrationMode::Container);
    }

    #[rstest]
    fn detection_applies_without_a_configured_mode() {
        let environment = InMemorySettings::new().with("CI", "true");

        let context = DiscoveryConfig::default()
            .with_health_check_timeout(Duration::from_millis(50))
            .context(&environment, false);

        assert_eq!(context.orchestration_mode(), OrchestrationMode::Ci);
        assert_eq!(context.health_check_timeout(), Duration::from_millis(50));
    }
}
