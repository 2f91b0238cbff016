//! When steps for service discovery BDD scenarios.

use super::world::{DiscoveryWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;

#[when(r#"the application resolves "{name}""#)]
fn application_resolves(world: &mut DiscoveryWorld, name: String) -> Result<(), eyre::Report> {
    let coordinator = world.coordinator().wrap_err("build coordinator")?;
    let context = world.context();
    let result = run_async(coordinator.resolve(&name, &context));
    world.last_result = Some(result);
    Ok(())
}
