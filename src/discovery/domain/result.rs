//! Outcome of one resolution call.

use super::{CandidateSource, DiscoveryCandidate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of probing a single candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// The candidate answered the protocol check.
    Healthy,
    /// The candidate was unreachable or answered incorrectly.
    Unhealthy,
    /// The probe exceeded the health-check timeout.
    TimedOut,
    /// The resolution was cancelled before or during the probe.
    Cancelled,
    /// Health validation was disabled for this resolution.
    Skipped,
}

impl ProbeOutcome {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
            Self::TimedOut => "timed_out",
            Self::Cancelled => "cancelled",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Record of one candidate considered during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeAttempt {
    candidate: DiscoveryCandidate,
    outcome: ProbeOutcome,
    elapsed_ms: u64,
}

impl ProbeAttempt {
    /// Creates a probe record.
    #[must_use]
    pub const fn new(candidate: DiscoveryCandidate, outcome: ProbeOutcome, elapsed_ms: u64) -> Self {
        Self {
            candidate,
            outcome,
            elapsed_ms,
        }
    }

    /// Returns the probed candidate.
    #[must_use]
    pub const fn candidate(&self) -> &DiscoveryCandidate {
        &self.candidate
    }

    /// Returns the probe outcome.
    #[must_use]
    pub const fn outcome(&self) -> ProbeOutcome {
        self.outcome
    }

    /// Returns the wall-clock duration of the probe in milliseconds.
    #[must_use]
    pub const fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }
}

/// Result of resolving one dependency.
///
/// A result is produced fresh for every call and consumed by the caller;
/// only the resolved URL is expected to outlive it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    service_name: String,
    service_url: Option<String>,
    is_successful: bool,
    discovery_method: Option<CandidateSource>,
    is_healthy: bool,
    error_message: Option<String>,
    attempts: Vec<ProbeAttempt>,
    resolved_at: DateTime<Utc>,
}

impl DiscoveryResult {
    /// Creates a result for an address the operator configured directly.
    #[must_use]
    pub fn explicit(
        service_name: impl Into<String>,
        url: impl Into<String>,
        resolved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            service_url: Some(url.into()),
            is_successful: true,
            discovery_method: Some(CandidateSource::ExplicitConfig),
            is_healthy: false,
            error_message: None,
            attempts: Vec::new(),
            resolved_at,
        }
    }

    /// Creates a result for a candidate that passed health validation.
    #[must_use]
    pub fn healthy(
        service_name: impl Into<String>,
        winner: &DiscoveryCandidate,
        attempts: Vec<ProbeAttempt>,
        resolved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            service_url: Some(winner.url().to_owned()),
            is_successful: true,
            discovery_method: Some(winner.source()),
            is_healthy: true,
            error_message: None,
            attempts,
            resolved_at,
        }
    }

    /// Creates a successful but unconfirmed result that falls back to a
    /// default candidate.
    #[must_use]
    pub fn degraded(
        service_name: impl Into<String>,
        fallback: &DiscoveryCandidate,
        attempts: Vec<ProbeAttempt>,
        message: impl Into<String>,
        resolved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            service_url: Some(fallback.url().to_owned()),
            is_successful: true,
            discovery_method: Some(fallback.source()),
            is_healthy: false,
            error_message: Some(message.into()),
            attempts,
            resolved_at,
        }
    }

    /// Creates a failed result carrying no address.
    #[must_use]
    pub fn failed(
        service_name: impl Into<String>,
        message: impl Into<String>,
        resolved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            service_url: None,
            is_successful: false,
            discovery_method: None,
            is_healthy: false,
            error_message: Some(message.into()),
            attempts: Vec::new(),
            resolved_at,
        }
    }

    /// Returns the requested service name.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Returns the resolved address, if any.
    #[must_use]
    pub fn service_url(&self) -> Option<&str> {
        self.service_url.as_deref()
    }

    /// Returns `true` when the caller can proceed with the resolved address.
    #[must_use]
    pub const fn is_successful(&self) -> bool {
        self.is_successful
    }

    /// Returns how the address was found.
    #[must_use]
    pub const fn discovery_method(&self) -> Option<CandidateSource> {
        self.discovery_method
    }

    /// Returns `true` when a health probe confirmed the address.
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        self.is_healthy
    }

    /// Returns the explanation attached to failed or degraded results.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Returns the candidates considered, in probe order.
    #[must_use]
    pub fn attempts(&self) -> &[ProbeAttempt] {
        &self.attempts
    }

    /// Returns when the result was produced.
    #[must_use]
    pub const fn resolved_at(&self) -> DateTime<Utc> {
        self.resolved_at
    }
}
