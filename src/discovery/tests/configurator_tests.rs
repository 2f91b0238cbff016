//! Unit tests for filling options from discovery.

use super::support::{ScriptedAdapter, coordinator_with};
use crate::discovery::{
    adapters::{MongoDiscoveryAdapter, settings::InMemorySettings},
    domain::{CandidateSource, DiscoveryContext, OrchestrationMode},
    ports::{DiscoveryAdapter, DiscoverySources},
    services::{
        ConfigureOutcome, ConnectionOptions, DiscoverableOptions, OptionsConfigurationError,
        OptionsConfigurator,
    },
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use std::sync::Arc;
use std::time::Duration;

type TestConfigurator = OptionsConfigurator<DefaultClock>;

#[fixture]
fn configurator() -> TestConfigurator {
    let redis: Arc<dyn DiscoveryAdapter> = Arc::new(
        ScriptedAdapter::new("redis")
            .with_alias("cache")
            .with_candidate("redis://localhost:6379", CandidateSource::LocalFallback, 2)
            .healthy_at("redis://localhost:6379"),
    );
    OptionsConfigurator::new(
        coordinator_with(vec![redis]),
        DiscoveryContext::new(OrchestrationMode::Standalone)
            .with_health_check_timeout(Duration::from_millis(200)),
    )
}

#[rstest]
#[case(None)]
#[case(Some(""))]
#[case(Some("AUTO"))]
#[tokio::test(flavor = "multi_thread")]
async fn auto_connection_strings_are_discovered(
    configurator: TestConfigurator,
    #[case] configured: Option<&str>,
) {
    let mut options = ConnectionOptions::new("redis");
    if let Some(value) = configured {
        options = options.with_connection_string(value);
    }

    let outcome = configurator
        .configure_async(&mut options)
        .await
        .expect("discovery should succeed");

    assert_eq!(options.connection_string(), Some("redis://localhost:6379"));
    assert!(matches!(outcome, ConfigureOutcome::Discovered(result) if result.is_healthy()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn explicit_connection_strings_are_left_alone(configurator: TestConfigurator) {
    let mut options =
        ConnectionOptions::new("redis").with_connection_string("redis://cache.internal:6380");

    let outcome = configurator
        .configure_async(&mut options)
        .await
        .expect("explicit options need no discovery");

    assert_eq!(outcome, ConfigureOutcome::Explicit);
    assert_eq!(
        options.connection_string(),
        Some("redis://cache.internal:6380")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_services_surface_as_errors(configurator: TestConfigurator) {
    let mut options = ConnectionOptions::new("cassandra");

    let error = configurator
        .configure_async(&mut options)
        .await
        .expect_err("unknown services cannot be configured");

    let OptionsConfigurationError::DiscoveryFailed { service, message } = error;
    assert_eq!(service, "cassandra");
    assert_eq!(message, "no discovery adapter registered for 'cassandra'");
    assert_eq!(options.connection_string(), None);
}

#[rstest]
fn blocking_configuration_matches_async(configurator: TestConfigurator) {
    let mut options = ConnectionOptions::new("cache").with_connection_string("auto");

    configurator
        .configure(&mut options)
        .expect("discovery should succeed");

    assert_eq!(options.connection_string(), Some("redis://localhost:6379"));
}

#[rstest]
fn option_parameters_reach_candidate_rewriting() {
    let sources = DiscoverySources::new(
        Arc::new(InMemorySettings::new()),
        Arc::new(InMemorySettings::new()),
    );
    let mongo: Arc<dyn DiscoveryAdapter> = Arc::new(MongoDiscoveryAdapter::new(sources));
    let configurator = OptionsConfigurator::new(
        coordinator_with(vec![mongo]),
        DiscoveryContext::new(OrchestrationMode::Standalone).with_health_check_timeout(Duration::ZERO),
    );
    let mut options = ConnectionOptions::new("mongo")
        .with_username("app")
        .with_password("pw")
        .with_database("orders");

    let outcome = configurator
        .configure(&mut options)
        .expect("discovery should succeed");

    assert_eq!(
        options.connection_string(),
        Some("mongodb://app:pw@localhost:27017/orders?authSource=admin")
    );
    assert!(matches!(outcome, ConfigureOutcome::Discovered(result) if !result.is_healthy()));
}

#[rstest]
fn options_deserialise_from_configuration_json() {
    let options: ConnectionOptions = serde_json::from_str(
        r#"{"service_name":"ollama","connection_string":"auto","required_model":"llama3"}"#,
    )
    .expect("options should deserialise");

    assert_eq!(options.service_name(), "ollama");
    assert_eq!(options.required_model(), Some("llama3"));
    assert_eq!(
        options.discovery_parameters(),
        vec![(
            "required_model".to_owned(),
            serde_json::Value::String("llama3".to_owned())
        )]
    );
}
