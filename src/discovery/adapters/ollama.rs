//! Local model server discovery (Ollama).

use super::conventions::{ConventionalDiscovery, SourceConventions};
use super::probe::{http_client, http_get_success};
use crate::discovery::{
    domain::{
        DiscoveryCandidate, DiscoveryContext, ServiceDescriptor, ServiceEndpoint, parameter_keys,
    },
    ports::{DiscoveryAdapter, DiscoverySources},
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

const DEFAULT_PORT: u16 = 11434;
const TAGS_PATH: &str = "/api/tags";
const LATEST_TAG: &str = ":latest";

const CONVENTIONS: SourceConventions = SourceConventions {
    environment_lists: &["OLLAMA_URLS", "OLLAMA_BASE_URL"],
    configuration_lists: &["Ollama:Urls"],
    connection_string_keys: &["Ollama:ConnectionString", "Ollama:BaseUrl"],
};

#[derive(Debug, Default, Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    model: String,
}

/// Discovery adapter for Ollama model servers.
///
/// When the context carries `required_model`, a server only counts as
/// healthy if it already has that model pulled.
#[derive(Debug, Clone)]
pub struct OllamaDiscoveryAdapter {
    descriptor: ServiceDescriptor,
    discovery: ConventionalDiscovery,
    client: reqwest::Client,
}

impl OllamaDiscoveryAdapter {
    /// Creates the adapter with its default descriptor.
    #[must_use]
    pub fn new(sources: DiscoverySources) -> Self {
        Self {
            descriptor: Self::default_descriptor(),
            discovery: ConventionalDiscovery::new(sources, CONVENTIONS),
            client: http_client(),
        }
    }

    /// Replaces the descriptor, for deployments using other host names.
    #[must_use]
    pub fn with_descriptor(mut self, descriptor: ServiceDescriptor) -> Self {
        self.descriptor = descriptor;
        self
    }

    /// Returns the descriptor registered by default.
    #[must_use]
    pub fn default_descriptor() -> ServiceDescriptor {
        ServiceDescriptor::new(
            "ollama",
            ServiceEndpoint::new("http", "ollama", DEFAULT_PORT),
            ServiceEndpoint::new("http", "localhost", DEFAULT_PORT),
        )
        .with_aliases(["ai", "local-model"])
        .with_health_endpoint(TAGS_PATH)
    }
}

#[async_trait]
impl DiscoveryAdapter for OllamaDiscoveryAdapter {
    fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    fn read_explicit_configuration(&self) -> Option<String> {
        self.discovery.read_explicit(&self.descriptor)
    }

    fn build_candidates(
        &self,
        descriptor: &ServiceDescriptor,
        context: &DiscoveryContext,
    ) -> Vec<DiscoveryCandidate> {
        self.discovery.candidates(self, descriptor, context)
    }

    async fn validate_health(&self, url: &str, context: &DiscoveryContext) -> bool {
        let path = self.descriptor.health_endpoint().unwrap_or(TAGS_PATH);
        let Some(response) =
            http_get_success(&self.client, url, path, context.health_check_timeout()).await
        else {
            return false;
        };

        let Some(required) = context.parameter_str(parameter_keys::REQUIRED_MODEL) else {
            return true;
        };
        match response.json::<ModelList>().await {
            Ok(list) => {
                let found = has_model(&list, &required);
                if !found {
                    debug!(model = %required, "model server lacks the required model");
                }
                found
            }
            Err(err) => {
                debug!(%err, "model list was not understood");
                false
            }
        }
    }
}

/// Compares model names, treating a missing tag as `:latest`.
fn same_model(available: &str, required: &str) -> bool {
    let normalise = |name: &str| {
        let lowered = name.trim().to_ascii_lowercase();
        if lowered.contains(':') {
            lowered
        } else {
            format!("{lowered}{LATEST_TAG}")
        }
    };
    !available.trim().is_empty() && normalise(available) == normalise(required)
}

fn has_model(list: &ModelList, required: &str) -> bool {
    list.models
        .iter()
        .any(|entry| same_model(&entry.name, required) || same_model(&entry.model, required))
}
