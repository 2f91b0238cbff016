//! Adapter implementations for discovery ports.
//!
//! One discovery adapter ships per dependency kind, alongside the settings
//! sources those adapters read from.

pub mod conventions;
pub mod mongo;
pub mod ollama;
pub mod postgres;
pub mod probe;
pub mod rabbitmq;
pub mod redis;
pub mod rewrite;
pub mod search;
pub mod settings;
pub mod weaviate;

#[cfg(test)]
pub(crate) mod http_test_support;

use crate::discovery::ports::{DiscoveryAdapter, DiscoverySources};
use std::sync::Arc;

pub use conventions::{AUTO_SENTINEL, ConventionalDiscovery, SourceConventions, is_auto_sentinel};
pub use mongo::MongoDiscoveryAdapter;
pub use ollama::OllamaDiscoveryAdapter;
pub use postgres::PostgresDiscoveryAdapter;
pub use rabbitmq::RabbitMqDiscoveryAdapter;
pub use redis::RedisDiscoveryAdapter;
pub use search::SearchClusterAdapter;
pub use weaviate::WeaviateDiscoveryAdapter;

/// Builds every shipped adapter over the same settings sources, in
/// registration order.
#[must_use]
pub fn default_adapters(sources: &DiscoverySources) -> Vec<Arc<dyn DiscoveryAdapter>> {
    vec![
        Arc::new(MongoDiscoveryAdapter::new(sources.clone())),
        Arc::new(PostgresDiscoveryAdapter::new(sources.clone())),
        Arc::new(RedisDiscoveryAdapter::new(sources.clone())),
        Arc::new(SearchClusterAdapter::elasticsearch(sources.clone())),
        Arc::new(SearchClusterAdapter::opensearch(sources.clone())),
        Arc::new(WeaviateDiscoveryAdapter::new(sources.clone())),
        Arc::new(OllamaDiscoveryAdapter::new(sources.clone())),
        Arc::new(RabbitMqDiscoveryAdapter::new(sources.clone())),
    ]
}
