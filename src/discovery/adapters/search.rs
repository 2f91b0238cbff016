//! Search cluster discovery (Elasticsearch and `OpenSearch`).
//!
//! Both engines share the `_cluster/health` API, so one adapter type serves
//! either flavour with its own descriptor and source conventions.

use super::conventions::{ConventionalDiscovery, SourceConventions};
use super::probe::{http_client, http_get_success};
use super::rewrite::{apply_credentials, has_any_parameter, parse_candidate};
use crate::discovery::{
    domain::{
        CandidateRewriteError, DiscoveryCandidate, DiscoveryContext, ServiceDescriptor,
        ServiceEndpoint, parameter_keys,
    },
    ports::{DiscoveryAdapter, DiscoverySources},
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

const DEFAULT_PORT: u16 = 9200;
const HEALTH_PATH: &str = "/_cluster/health";

const ELASTICSEARCH: SourceConventions = SourceConventions {
    environment_lists: &["ELASTICSEARCH_URLS"],
    configuration_lists: &["Elasticsearch:Urls"],
    connection_string_keys: &["Elasticsearch:ConnectionString", "Elasticsearch:Uri"],
};

const OPENSEARCH: SourceConventions = SourceConventions {
    environment_lists: &["OPENSEARCH_URLS"],
    configuration_lists: &["OpenSearch:Urls"],
    connection_string_keys: &["OpenSearch:ConnectionString", "OpenSearch:Uri"],
};

#[derive(Debug, Deserialize)]
struct ClusterHealth {
    status: String,
}

/// Discovery adapter for search clusters.
#[derive(Debug, Clone)]
pub struct SearchClusterAdapter {
    descriptor: ServiceDescriptor,
    discovery: ConventionalDiscovery,
    client: reqwest::Client,
}

impl SearchClusterAdapter {
    /// Creates the Elasticsearch flavour.
    #[must_use]
    pub fn elasticsearch(sources: DiscoverySources) -> Self {
        Self {
            descriptor: Self::elasticsearch_descriptor(),
            discovery: ConventionalDiscovery::new(sources, ELASTICSEARCH),
            client: http_client(),
        }
    }

    /// Creates the `OpenSearch` flavour.
    #[must_use]
    pub fn opensearch(sources: DiscoverySources) -> Self {
        Self {
            descriptor: Self::opensearch_descriptor(),
            discovery: ConventionalDiscovery::new(sources, OPENSEARCH),
            client: http_client(),
        }
    }

    /// Replaces the descriptor, for deployments using other host names.
    #[must_use]
    pub fn with_descriptor(mut self, descriptor: ServiceDescriptor) -> Self {
        self.descriptor = descriptor;
        self
    }

    /// Default Elasticsearch descriptor.
    #[must_use]
    pub fn elasticsearch_descriptor() -> ServiceDescriptor {
        ServiceDescriptor::new(
            "elasticsearch",
            ServiceEndpoint::new("http", "elasticsearch", DEFAULT_PORT),
            ServiceEndpoint::new("http", "localhost", DEFAULT_PORT),
        )
        .with_aliases(["elastic"])
        .with_health_endpoint(HEALTH_PATH)
    }

    /// Default `OpenSearch` descriptor.
    #[must_use]
    pub fn opensearch_descriptor() -> ServiceDescriptor {
        ServiceDescriptor::new(
            "opensearch",
            ServiceEndpoint::new("http", "opensearch", DEFAULT_PORT),
            ServiceEndpoint::new("http", "localhost", DEFAULT_PORT),
        )
        .with_health_endpoint(HEALTH_PATH)
    }
}

#[async_trait]
impl DiscoveryAdapter for SearchClusterAdapter {
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
        let path = self.descriptor.health_endpoint().unwrap_or(HEALTH_PATH);
        let Some(response) =
            http_get_success(&self.client, url, path, context.health_check_timeout()).await
        else {
            return false;
        };

        match response.json::<ClusterHealth>().await {
            Ok(health) => cluster_is_usable(&health.status),
            Err(err) => {
                debug!(%err, "cluster health body was not understood");
                false
            }
        }
    }

    fn rewrite_url(
        &self,
        url: &str,
        context: &DiscoveryContext,
    ) -> Result<String, CandidateRewriteError> {
        if !has_any_parameter(context, &[parameter_keys::USERNAME, parameter_keys::PASSWORD]) {
            return Ok(url.to_owned());
        }
        let mut parsed = parse_candidate(url)?;
        apply_credentials(&mut parsed, context)?;
        Ok(parsed.to_string())
    }
}

fn cluster_is_usable(status: &str) -> bool {
    matches!(status.to_ascii_lowercase().as_str(), "green" | "yellow")
}
