//! Relational store discovery (`PostgreSQL`).

use super::conventions::{ConventionalDiscovery, SourceConventions};
use super::rewrite::{apply_credentials, apply_path_parameter, has_any_parameter, parse_candidate};
use crate::discovery::{
    domain::{
        CandidateRewriteError, DiscoveryCandidate, DiscoveryContext, ServiceDescriptor,
        ServiceEndpoint, parameter_keys,
    },
    ports::{DiscoveryAdapter, DiscoverySources},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::ConnectionError;
use std::time::Duration;
use tracing::debug;
use url::Url;

const DEFAULT_PORT: u16 = 5432;

const CONVENTIONS: SourceConventions = SourceConventions {
    environment_lists: &["POSTGRES_URLS", "DATABASE_URL"],
    configuration_lists: &["Postgres:Urls"],
    connection_string_keys: &["Postgres:ConnectionString", "Postgresql:ConnectionString"],
};

/// Discovery adapter for `PostgreSQL` relational stores.
///
/// The health check opens a Diesel connection and runs `SELECT 1` on a
/// blocking thread. libpq honours `connect_timeout` in whole seconds, so the
/// coordinator's deadline is what bounds the caller; the blocking thread is
/// abandoned when it fires.
#[derive(Debug, Clone)]
pub struct PostgresDiscoveryAdapter {
    descriptor: ServiceDescriptor,
    discovery: ConventionalDiscovery,
}

impl PostgresDiscoveryAdapter {
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
            "postgres",
            ServiceEndpoint::new("postgres", "postgres", DEFAULT_PORT),
            ServiceEndpoint::new("postgres", "localhost", DEFAULT_PORT),
        )
        .with_aliases(["postgresql", "pg"])
    }
}

#[async_trait]
impl DiscoveryAdapter for PostgresDiscoveryAdapter {
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
        let Some(probe_url) = with_connect_timeout(url, context.health_check_timeout()) else {
            debug!("postgres candidate is not a URL");
            return false;
        };

        let ping = tokio::task::spawn_blocking(move || {
            let mut connection = PgConnection::establish(&probe_url)?;
            diesel::sql_query("SELECT 1")
                .execute(&mut connection)
                .map_err(ConnectionError::CouldntSetupConfiguration)
        });

        match ping.await {
            Ok(Ok(_)) => true,
            Ok(Err(err)) => {
                debug!(%err, "postgres ping failed");
                false
            }
            Err(err) => {
                debug!(%err, "postgres ping task failed");
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
        apply_path_parameter(&mut parsed, context, parameter_keys::DATABASE);
        Ok(parsed.to_string())
    }
}

/// Adds libpq's `connect_timeout` (whole seconds, rounded up) unless the URL
/// already sets one.
fn with_connect_timeout(url: &str, budget: Duration) -> Option<String> {
    let mut parsed = Url::parse(url).ok()?;
    let has_timeout = parsed
        .query_pairs()
        .any(|(key, _)| key == "connect_timeout");
    if !has_timeout {
        let seconds = budget.as_millis().div_ceil(1000).max(1);
        parsed
            .query_pairs_mut()
            .append_pair("connect_timeout", &seconds.to_string());
    }
    Some(parsed.to_string())
}
