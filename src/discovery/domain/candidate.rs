//! Candidate addresses proposed for a dependency.

use super::DiscoveryDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Provenance of a discovery candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateSource {
    /// Address listed in a dependency-specific environment variable.
    EnvList,
    /// Address configured explicitly by the operator.
    ExplicitConfig,
    /// Address injected by an app-host orchestrator.
    AspireDiscovery,
    /// Address of the dependency on the shared container network.
    ContainerInstance,
    /// Address of the dependency on the host network.
    LocalFallback,
}

impl CandidateSource {
    /// Returns the canonical provenance tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnvList => "env-list",
            Self::ExplicitConfig => "explicit-config",
            Self::AspireDiscovery => "aspire-discovery",
            Self::ContainerInstance => "container-instance",
            Self::LocalFallback => "local-fallback",
        }
    }
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A single proposed address for a dependency.
///
/// Candidates are immutable; rewriting happens on the URL before the
/// candidate is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryCandidate {
    url: String,
    source: CandidateSource,
    priority: u32,
}

impl DiscoveryCandidate {
    /// Creates a candidate.
    ///
    /// The URL is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryDomainError::BlankCandidateUrl`] when the URL is
    /// empty after trimming.
    pub fn new(
        url: impl Into<String>,
        source: CandidateSource,
        priority: u32,
    ) -> Result<Self, DiscoveryDomainError> {
        let normalized = url.into().trim().to_owned();
        if normalized.is_empty() {
            return Err(DiscoveryDomainError::BlankCandidateUrl);
        }

        Ok(Self {
            url: normalized,
            source,
            priority,
        })
    }

    /// Returns the protocol-qualified address.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the candidate provenance.
    #[must_use]
    pub const fn source(&self) -> CandidateSource {
        self.source
    }

    /// Returns the candidate priority. Lower values are tried first.
    #[must_use]
    pub const fn priority(&self) -> u32 {
        self.priority
    }
}

/// Sorts candidates by ascending priority, preserving emission order for
/// equal priorities.
pub fn rank_candidates(candidates: &mut [DiscoveryCandidate]) {
    // `sort_by_key` is stable.
    candidates.sort_by_key(DiscoveryCandidate::priority);
}
