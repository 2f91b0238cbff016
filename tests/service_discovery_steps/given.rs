//! Given steps for service discovery BDD scenarios.

use std::time::Duration;

use super::world::{DiscoveryWorld, closed_port, fake_redis, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use wayfinder::discovery::domain::OrchestrationMode;

#[given(r#"the configuration sets "{key}" to "{value}""#)]
fn configuration_sets(world: &mut DiscoveryWorld, key: String, value: String) {
    world.configuration.insert(key, value);
}

#[given(r#"the process runs in "{mode}" mode"#)]
fn process_runs_in_mode(world: &mut DiscoveryWorld, mode: String) -> Result<(), eyre::Report> {
    world.mode =
        OrchestrationMode::try_from(mode.as_str()).wrap_err("parse orchestration mode")?;
    Ok(())
}

#[given("health checks time out after {millis:u64} milliseconds")]
fn health_checks_time_out(world: &mut DiscoveryWorld, millis: u64) {
    world.timeout = Duration::from_millis(millis);
}

#[given("a healthy redis container instance")]
fn healthy_container_instance(world: &mut DiscoveryWorld) -> Result<(), eyre::Report> {
    let port = run_async(fake_redis()).wrap_err("start container stand-in")?;
    world.container_port = Some(port);
    Ok(())
}

#[given("an unreachable redis container instance")]
fn unreachable_container_instance(world: &mut DiscoveryWorld) {
    world.container_port = Some(run_async(closed_port()));
}

#[given("a healthy redis on the host")]
fn healthy_host_instance(world: &mut DiscoveryWorld) -> Result<(), eyre::Report> {
    let port = run_async(fake_redis()).wrap_err("start host stand-in")?;
    world.local_port = Some(port);
    Ok(())
}

#[given("an unreachable redis on the host")]
fn unreachable_host_instance(world: &mut DiscoveryWorld) {
    world.local_port = Some(run_async(closed_port()));
}
