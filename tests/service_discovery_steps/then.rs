//! Then steps for service discovery BDD scenarios.

use super::world::DiscoveryWorld;
use eyre::eyre;
use rstest_bdd_macros::then;
use wayfinder::discovery::domain::DiscoveryResult;

fn last_result(world: &DiscoveryWorld) -> Result<&DiscoveryResult, eyre::Report> {
    world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre!("no resolution has run in this scenario"))
}

#[then(r#"the resolved address is "{url}""#)]
fn resolved_address_is(world: &DiscoveryWorld, url: String) -> Result<(), eyre::Report> {
    let result = last_result(world)?;
    if result.service_url() != Some(url.as_str()) {
        return Err(eyre!(
            "expected address {url}, got {:?}",
            result.service_url()
        ));
    }
    Ok(())
}

#[then(r#"the discovery method is "{method}""#)]
fn discovery_method_is(world: &DiscoveryWorld, method: String) -> Result<(), eyre::Report> {
    let result = last_result(world)?;
    let actual = result.discovery_method().map(|source| source.as_str());
    if actual != Some(method.as_str()) {
        return Err(eyre!("expected method {method}, got {actual:?}"));
    }
    Ok(())
}

#[then("{count:usize} candidates were probed")]
fn candidates_were_probed(world: &DiscoveryWorld, count: usize) -> Result<(), eyre::Report> {
    let probed = last_result(world)?.attempts().len();
    if probed != count {
        return Err(eyre!("expected {count} probes, got {probed}"));
    }
    Ok(())
}

#[then("the result is healthy")]
fn result_is_healthy(world: &DiscoveryWorld) -> Result<(), eyre::Report> {
    let result = last_result(world)?;
    if !result.is_healthy() {
        return Err(eyre!(
            "expected a healthy result, got {:?}",
            result.error_message()
        ));
    }
    Ok(())
}

#[then(r#"the result is degraded with a message containing "{fragment}""#)]
fn result_is_degraded(world: &DiscoveryWorld, fragment: String) -> Result<(), eyre::Report> {
    let result = last_result(world)?;
    if !result.is_successful() || result.is_healthy() {
        return Err(eyre!("expected a degraded result"));
    }
    let message = result.error_message().unwrap_or_default();
    if !message.contains(&fragment) {
        return Err(eyre!("message {message:?} does not mention {fragment:?}"));
    }
    Ok(())
}

#[then(r#"every attempt was "{outcome}""#)]
fn every_attempt_was(world: &DiscoveryWorld, outcome: String) -> Result<(), eyre::Report> {
    let attempts = last_result(world)?.attempts();
    if attempts.is_empty() {
        return Err(eyre!("no attempts were recorded"));
    }
    if let Some(other) = attempts
        .iter()
        .find(|attempt| attempt.outcome().as_str() != outcome)
    {
        return Err(eyre!("found a {} attempt", other.outcome()));
    }
    Ok(())
}

#[then(r#"resolution fails with "{message}""#)]
fn resolution_fails_with(world: &DiscoveryWorld, message: String) -> Result<(), eyre::Report> {
    let result = last_result(world)?;
    if result.is_successful() {
        return Err(eyre!("expected resolution to fail"));
    }
    if result.error_message() != Some(message.as_str()) {
        return Err(eyre!(
            "expected {message:?}, got {:?}",
            result.error_message()
        ));
    }
    Ok(())
}
