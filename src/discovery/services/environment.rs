//! Detection of the runtime topology the process is running in.

use crate::discovery::{domain::OrchestrationMode, ports::SettingsSource};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use tracing::{debug, warn};

/// Environment variable forcing a specific orchestration mode.
pub const ORCHESTRATION_MODE_OVERRIDE: &str = "WAYFINDER_ORCHESTRATION_MODE";

const ASPIRE_MARKERS: &[&str] = &["ASPIRE_APPHOST", "ASPIRE_RESOURCE_NAME"];
const CONTAINER_MARKERS: &[&str] = &["container", "KUBERNETES_SERVICE_HOST"];
const CI_MARKERS: &[&str] = &["GITHUB_ACTIONS", "GITLAB_CI", "TF_BUILD"];

/// Returns `true` when `/.dockerenv` exists.
#[must_use]
pub fn container_marker_present() -> bool {
    Dir::open_ambient_dir("/", ambient_authority())
        .is_ok_and(|root| root.exists(".dockerenv"))
}

/// Infers the orchestration mode from environment markers.
///
/// Precedence: explicit override, app-host orchestrator, container, CI,
/// then standalone. An unrecognised override is logged and ignored.
#[must_use]
pub fn detect_orchestration_mode(
    environment: &dyn SettingsSource,
    container_marker_present: bool,
) -> OrchestrationMode {
    if let Some(raw) = environment.get_non_blank(ORCHESTRATION_MODE_OVERRIDE) {
        match OrchestrationMode::try_from(raw.as_str()) {
            Ok(mode) => {
                debug!(%mode, "orchestration mode overridden");
                return mode;
            }
            Err(err) => warn!(%err, "ignoring orchestration mode override"),
        }
    }

    let present = |key: &&str| environment.get_non_blank(key).is_some();
    let is_true = |key: &str| {
        environment
            .get_non_blank(key)
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
    };

    let mode = if ASPIRE_MARKERS.iter().any(present) {
        OrchestrationMode::AspireAppHost
    } else if container_marker_present
        || is_true("DOTNET_RUNNING_IN_CONTAINER")
        || CONTAINER_MARKERS.iter().any(present)
    {
        OrchestrationMode::Container
    } else if is_true("CI") || CI_MARKERS.iter().any(present) {
        OrchestrationMode::Ci
    } else {
        OrchestrationMode::Standalone
    };
    debug!(%mode, "detected orchestration mode");
    mode
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::adapters::settings::InMemorySettings;
    use rstest::rstest;

    #[rstest]
    #[case(&[], false, OrchestrationMode::Standalone)]
    #[case(&[], true, OrchestrationMode::Container)]
    #[case(&[("CI", "true")], false, OrchestrationMode::Ci)]
    #[case(&[("CI", "false")], false, OrchestrationMode::Standalone)]
    #[case(&[("GITHUB_ACTIONS", "true")], false, OrchestrationMode::Ci)]
    #[case(&[("KUBERNETES_SERVICE_HOST", "10.0.0.1")], false, OrchestrationMode::Container)]
    #[case(&[("DOTNET_RUNNING_IN_CONTAINER", "True")], false, OrchestrationMode::Container)]
    #[case(&[("CI", "true"), ("container", "podman")], false, OrchestrationMode::Container)]
    #[case(&[("ASPIRE_APPHOST", "1"), ("CI", "true")], true, OrchestrationMode::AspireAppHost)]
    #[case(
        &[("WAYFINDER_ORCHESTRATION_MODE", "ci"), ("ASPIRE_APPHOST", "1")],
        true,
        OrchestrationMode::Ci
    )]
    #[case(
        &[("WAYFINDER_ORCHESTRATION_MODE", "cloud"), ("GITLAB_CI", "true")],
        false,
        OrchestrationMode::Ci
    )]
    fn markers_follow_precedence(
        #[case] variables: &[(&str, &str)],
        #[case] marker: bool,
        #[case] expected: OrchestrationMode,
    ) {
        let environment = InMemorySettings::from_pairs(variables.iter().copied());

        assert_eq!(detect_orchestration_mode(&environment, marker), expected);
    }
}
