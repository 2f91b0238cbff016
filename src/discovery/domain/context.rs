//! Ambient parameters for a single resolution attempt.

use super::OrchestrationMode;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Default health-check budget per candidate.
pub const DEFAULT_HEALTH_CHECK_TIMEOUT: Duration = Duration::from_millis(500);

/// Well-known parameter keys understood by the shipped adapters.
pub mod parameter_keys {
    /// User name applied to candidate URLs.
    pub const USERNAME: &str = "username";
    /// Password applied to candidate URLs.
    pub const PASSWORD: &str = "password";
    /// Target database (or Redis database index).
    pub const DATABASE: &str = "database";
    /// Model that a local model runtime must already serve.
    pub const REQUIRED_MODEL: &str = "required_model";
    /// Broker virtual host.
    pub const VHOST: &str = "vhost";
}

/// Immutable context shared by every candidate of one resolution.
///
/// Adapters read the context but never mutate it. A zero
/// `health_check_timeout` disables health validation.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryContext {
    orchestration_mode: OrchestrationMode,
    health_check_timeout: Duration,
    parameters: BTreeMap<String, Value>,
}

impl DiscoveryContext {
    /// Creates a context for the given topology with the default timeout.
    #[must_use]
    pub const fn new(orchestration_mode: OrchestrationMode) -> Self {
        Self {
            orchestration_mode,
            health_check_timeout: DEFAULT_HEALTH_CHECK_TIMEOUT,
            parameters: BTreeMap::new(),
        }
    }

    /// Sets the per-candidate health-check timeout.
    #[must_use]
    pub const fn with_health_check_timeout(mut self, timeout: Duration) -> Self {
        self.health_check_timeout = timeout;
        self
    }

    /// Adds an adapter hint. Keys are trimmed and lowercased; `null` values
    /// are ignored.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let normalized_key = key.into().trim().to_ascii_lowercase();
        let parameter = value.into();
        if !normalized_key.is_empty() && !parameter.is_null() {
            self.parameters.insert(normalized_key, parameter);
        }
        self
    }

    /// Adds every parameter from `values`, overriding existing keys.
    #[must_use]
    pub fn with_parameters(mut self, values: impl IntoIterator<Item = (String, Value)>) -> Self {
        for (key, value) in values {
            self = self.with_parameter(key, value);
        }
        self
    }

    /// Returns the orchestration mode.
    #[must_use]
    pub const fn orchestration_mode(&self) -> OrchestrationMode {
        self.orchestration_mode
    }

    /// Returns the per-candidate health-check timeout.
    #[must_use]
    pub const fn health_check_timeout(&self) -> Duration {
        self.health_check_timeout
    }

    /// Returns `true` when health validation should be skipped.
    #[must_use]
    pub const fn skips_health_validation(&self) -> bool {
        self.health_check_timeout.is_zero()
    }

    /// Returns all adapter hints.
    #[must_use]
    pub const fn parameters(&self) -> &BTreeMap<String, Value> {
        &self.parameters
    }

    /// Returns a parameter value.
    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&Value> {
        self.parameters.get(&key.to_ascii_lowercase())
    }

    /// Returns a parameter rendered as a non-blank string.
    ///
    /// Strings are trimmed, except credentials which are returned verbatim;
    /// numbers and booleans are rendered in their JSON form. Arrays and
    /// objects yield `None`.
    #[must_use]
    pub fn parameter_str(&self, key: &str) -> Option<String> {
        let rendered = match self.parameter(key)? {
            Value::String(text) if is_credential(key) => text.clone(),
            Value::String(text) => text.trim().to_owned(),
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            Value::Null | Value::Array(_) | Value::Object(_) => return None,
        };
        (!rendered.is_empty()).then_some(rendered)
    }
}

fn is_credential(key: &str) -> bool {
    let normalized = key.trim();
    normalized.eq_ignore_ascii_case(parameter_keys::USERNAME)
        || normalized.eq_ignore_ascii_case(parameter_keys::PASSWORD)
}

impl Default for DiscoveryContext {
    fn default() -> Self {
        Self::new(OrchestrationMode::default())
    }
}
