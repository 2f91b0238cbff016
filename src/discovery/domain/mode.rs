//! Deployment topology the process believes it runs under.

use super::ParseOrchestrationModeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Orchestration mode for one discovery attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestrationMode {
    /// Bare process on a developer or server host.
    #[default]
    Standalone,
    /// Inside a container sharing a network with its dependencies.
    Container,
    /// Continuous-integration runner.
    Ci,
    /// Under an app-host orchestrator that injects service addresses.
    AspireAppHost,
}

impl OrchestrationMode {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standalone => "standalone",
            Self::Container => "container",
            Self::Ci => "ci",
            Self::AspireAppHost => "aspire_app_host",
        }
    }
}

impl fmt::Display for OrchestrationMode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for OrchestrationMode {
    type Error = ParseOrchestrationModeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "standalone" => Ok(Self::Standalone),
            "container" => Ok(Self::Container),
            "ci" => Ok(Self::Ci),
            "aspire" | "aspire_app_host" | "aspireapphost" => Ok(Self::AspireAppHost),
            _ => Err(ParseOrchestrationModeError(value.to_owned())),
        }
    }
}
