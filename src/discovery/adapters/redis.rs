//! Key-value store discovery (Redis).

use super::conventions::{ConventionalDiscovery, SourceConventions};
use super::rewrite::{apply_credentials, has_any_parameter, parse_candidate};
use crate::discovery::{
    domain::{
        CandidateRewriteError, DiscoveryCandidate, DiscoveryContext, ServiceDescriptor,
        ServiceEndpoint, parameter_keys,
    },
    ports::{DiscoveryAdapter, DiscoverySources},
};
use async_trait::async_trait;
use redis::{ErrorKind, RedisError, RedisResult};
use tokio::time::timeout;
use tracing::debug;

const DEFAULT_PORT: u16 = 6379;

const CONVENTIONS: SourceConventions = SourceConventions {
    environment_lists: &["REDIS_URLS", "REDIS_URL"],
    configuration_lists: &["Redis:Urls"],
    connection_string_keys: &["Redis:ConnectionString", "Redis:Configuration"],
};

/// Discovery adapter for Redis.
#[derive(Debug, Clone)]
pub struct RedisDiscoveryAdapter {
    descriptor: ServiceDescriptor,
    discovery: ConventionalDiscovery,
}

impl RedisDiscoveryAdapter {
    /// Creates the adapter with its default descriptor.
    #[must_use]
    pub fn new(sources: DiscoverySources) -> Self {
        Self {
            descriptor: Self::default_descriptor(),
            discovery: ConventionalDiscovery::new(sources, CONVENTIONS),
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
            "redis",
            ServiceEndpoint::new("redis", "redis", DEFAULT_PORT),
            ServiceEndpoint::new("redis", "localhost", DEFAULT_PORT),
        )
        .with_aliases(["cache"])
    }
}

#[async_trait]
impl DiscoveryAdapter for RedisDiscoveryAdapter {
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
        match timeout(context.health_check_timeout(), ping(url)).await {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                debug!(%err, "redis ping failed");
                false
            }
            Err(_) => {
                debug!("redis ping timed out");
                false
            }
        }
    }

    fn rewrite_url(
        &self,
        url: &str,
        context: &DiscoveryContext,
    ) -> Result<String, CandidateRewriteError> {
        let keys = [
            parameter_keys::USERNAME,
            parameter_keys::PASSWORD,
            parameter_keys::DATABASE,
        ];
        if !has_any_parameter(context, &keys) {
            return Ok(url.to_owned());
        }

        let mut parsed = parse_candidate(url)?;
        apply_credentials(&mut parsed, context)?;
        if let Some(database) = context.parameter_str(parameter_keys::DATABASE) {
            let index = database.parse::<u16>().map_err(|_| {
                CandidateRewriteError::InvalidParameter {
                    key: parameter_keys::DATABASE.to_owned(),
                    value: database.clone(),
                }
            })?;
            parsed.set_path(&format!("/{index}"));
        }
        Ok(parsed.to_string())
    }
}

/// Connects with the credentials and database carried by `url`, then
/// sends `PING`.
async fn ping(url: &str) -> RedisResult<()> {
    let client = redis::Client::open(url)?;
    let mut connection = client.get_multiplexed_async_connection().await?;
    let reply: String = redis::cmd("PING").query_async(&mut connection).await?;
    if reply == "PONG" {
        Ok(())
    } else {
        Err(RedisError::from((
            ErrorKind::ResponseError,
            "unexpected PING reply",
            reply,
        )))
    }
}
