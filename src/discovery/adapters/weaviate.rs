//! Vector database discovery (Weaviate).

use super::conventions::{ConventionalDiscovery, SourceConventions};
use super::probe::{http_client, http_get_success};
use crate::discovery::{
    domain::{DiscoveryCandidate, DiscoveryContext, ServiceDescriptor, ServiceEndpoint},
    ports::{DiscoveryAdapter, DiscoverySources},
};
use async_trait::async_trait;

const READY_PATH: &str = "/v1/.well-known/ready";

const CONVENTIONS: SourceConventions = SourceConventions {
    environment_lists: &["WEAVIATE_URLS", "WEAVIATE_ENDPOINT"],
    configuration_lists: &["Weaviate:Urls"],
    connection_string_keys: &["Weaviate:ConnectionString", "Weaviate:Endpoint"],
};

/// Discovery adapter for Weaviate.
///
/// Weaviate is not published through orchestrator service references, and
/// its host-network default is remapped to port 8085 to stay clear of the
/// usual development web servers on 8080.
#[derive(Debug, Clone)]
pub struct WeaviateDiscoveryAdapter {
    descriptor: ServiceDescriptor,
    discovery: ConventionalDiscovery,
    client: reqwest::Client,
}

impl WeaviateDiscoveryAdapter {
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
            "weaviate",
            ServiceEndpoint::new("http", "weaviate", 8080),
            ServiceEndpoint::new("http", "localhost", 8085),
        )
        .with_aliases(["vector"])
        .with_health_endpoint(READY_PATH)
    }
}

#[async_trait]
impl DiscoveryAdapter for WeaviateDiscoveryAdapter {
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
        let path = self.descriptor.health_endpoint().unwrap_or(READY_PATH);
        http_get_success(&self.client, url, path, context.health_check_timeout())
            .await
            .is_some()
    }

    fn supports_orchestrator_injection(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::adapters::http_test_support::serve_once;
    use crate::discovery::adapters::settings::InMemorySettings;
    use crate::discovery::domain::{CandidateSource, OrchestrationMode};
    use rstest::{fixture, rstest};
    use std::sync::Arc;

    fn sources(configuration: InMemorySettings) -> DiscoverySources {
        DiscoverySources::new(Arc::new(InMemorySettings::new()), Arc::new(configuration))
    }

    #[fixture]
    fn adapter() -> WeaviateDiscoveryAdapter {
        WeaviateDiscoveryAdapter::new(sources(InMemorySettings::new()))
    }

    #[rstest]
    fn aspire_references_are_ignored() {
        let adapter = WeaviateDiscoveryAdapter::new(sources(
            InMemorySettings::new().with("services:weaviate:default:0", "http://aspire:8080"),
        ));
        let context = DiscoveryContext::new(OrchestrationMode::AspireAppHost);

        let candidates = adapter.build_candidates(adapter.descriptor(), &context);

        assert!(
            candidates
                .iter()
                .all(|candidate| candidate.source() != CandidateSource::AspireDiscovery)
        );
        assert_eq!(
            candidates.first().map(DiscoveryCandidate::url),
            Some("http://localhost:8085")
        );
    }

    #[rstest]
    #[case("200 OK", true)]
    #[case("503 Service Unavailable", false)]
    #[tokio::test(flavor = "multi_thread")]
    async fn readiness_follows_the_status_code(
        adapter: WeaviateDiscoveryAdapter,
        #[case] status: &'static str,
        #[case] expected: bool,
    ) {
        let (base, server) = serve_once(status, "").await;

        let healthy = adapter
            .validate_health(&base, &DiscoveryContext::new(OrchestrationMode::Standalone))
            .await;

        assert_eq!(healthy, expected);
        let request = server.await.expect("server task should finish");
        assert!(request.starts_with("GET /v1/.well-known/ready "));
    }
}
