//! Error types for discovery domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing discovery domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiscoveryDomainError {
    /// A candidate URL is empty after trimming.
    #[error("discovery candidate URL must not be empty")]
    BlankCandidateUrl,

    /// A service name is empty after trimming.
    #[error("service name must not be empty")]
    EmptyServiceName,

    /// A descriptor endpoint host is empty after trimming.
    #[error("service '{service}' declares an empty {endpoint} host")]
    EmptyEndpointHost {
        /// Service name owning the descriptor.
        service: String,
        /// Which endpoint is malformed (`container` or `local`).
        endpoint: &'static str,
    },

    /// A descriptor endpoint port is zero.
    #[error("service '{service}' declares port 0 for its {endpoint} endpoint")]
    ZeroEndpointPort {
        /// Service name owning the descriptor.
        service: String,
        /// Which endpoint is malformed (`container` or `local`).
        endpoint: &'static str,
    },

    /// The URI pattern lacks a required placeholder.
    #[error("service '{service}' URI pattern '{pattern}' must contain {{host}} and {{port}}")]
    InvalidUriPattern {
        /// Service name owning the descriptor.
        service: String,
        /// Offending pattern.
        pattern: String,
    },
}

/// Error returned while parsing an orchestration mode.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown orchestration mode: {0}")]
pub struct ParseOrchestrationModeError(pub String);

/// Error returned when a candidate URL cannot be rewritten with connection
/// parameters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CandidateRewriteError {
    /// The URL could not be parsed.
    #[error("cannot parse candidate URL '{url}': {reason}")]
    Unparseable {
        /// Candidate URL as emitted.
        url: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The URL has no authority section to carry credentials.
    #[error("candidate URL '{0}' cannot carry credentials")]
    CannotCarryCredentials(String),

    /// A parameter has a value of the wrong shape.
    #[error("discovery parameter '{key}' has an unsupported value: {value}")]
    InvalidParameter {
        /// Parameter key.
        key: String,
        /// Rendered parameter value.
        value: String,
    },
}
