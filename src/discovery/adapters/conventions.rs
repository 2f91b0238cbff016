//! Candidate construction shared by every shipped adapter.
//!
//! Each adapter supplies a [`SourceConventions`] table naming where its
//! dependency's addresses may be configured. [`ConventionalDiscovery`] turns
//! that table, the service descriptor, and the discovery context into an
//! ordered candidate list.

use crate::discovery::{
    domain::{
        CandidateSource, DiscoveryCandidate, DiscoveryContext, OrchestrationMode,
        ServiceDescriptor, redact_credentials,
    },
    ports::{DiscoveryAdapter, DiscoverySources, SettingsSource},
};
use tracing::{debug, warn};

/// Connection-setting value that requests discovery instead of a literal
/// address.
pub const AUTO_SENTINEL: &str = "auto";

/// Priority of environment-derived and orchestrator-injected candidates.
pub const ENVIRONMENT_PRIORITY: u32 = 0;
/// Priority of configuration-listed candidates.
pub const CONFIGURATION_PRIORITY: u32 = 1;
/// Priority of the first topology-derived candidate.
pub const TOPOLOGY_PRIORITY: u32 = 2;

/// Returns `true` when a connection setting is absent, blank, or `auto`.
#[must_use]
pub fn is_auto_sentinel(value: Option<&str>) -> bool {
    value
        .map(str::trim)
        .is_none_or(|text| text.is_empty() || text.eq_ignore_ascii_case(AUTO_SENTINEL))
}

/// Where one dependency's addresses may be configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceConventions {
    /// Environment variables holding `;`/`,`-delimited address lists.
    pub environment_lists: &'static [&'static str],
    /// Configuration keys holding delimited candidate lists.
    pub configuration_lists: &'static [&'static str],
    /// Configuration keys holding an authoritative connection string, in
    /// precedence order. `ConnectionStrings:<name>` for the service name and
    /// each alias is consulted after these.
    pub connection_string_keys: &'static [&'static str],
}

/// Conventional candidate builder bound to a set of settings sources.
#[derive(Debug, Clone)]
pub struct ConventionalDiscovery {
    sources: DiscoverySources,
    conventions: SourceConventions,
}

impl ConventionalDiscovery {
    /// Creates a builder for one adapter.
    #[must_use]
    pub const fn new(sources: DiscoverySources, conventions: SourceConventions) -> Self {
        Self {
            sources,
            conventions,
        }
    }

    /// Returns the first configured connection string that is neither blank
    /// nor the `auto` sentinel.
    #[must_use]
    pub fn read_explicit(&self, descriptor: &ServiceDescriptor) -> Option<String> {
        let configuration = self.sources.configuration();
        let generic_keys = descriptor
            .names()
            .map(|name| format!("ConnectionStrings:{name}"));

        self.conventions
            .connection_string_keys
            .iter()
            .map(|key| (*key).to_owned())
            .chain(generic_keys)
            .filter_map(|key| configuration.get_non_blank(&key))
            .find(|value| !is_auto_sentinel(Some(value)))
    }

    /// Builds the ordered candidate list for `adapter`.
    ///
    /// Emission order: environment lists (priority 0), orchestrator-injected
    /// address (priority 0), configuration lists (priority 1), then the
    /// topology-derived descriptor addresses. Every URL is qualified with
    /// the descriptor scheme when it lacks one and passed through the
    /// adapter's rewrite hook; rewrite failures keep the original URL.
    pub fn candidates(
        &self,
        adapter: &dyn DiscoveryAdapter,
        descriptor: &ServiceDescriptor,
        context: &DiscoveryContext,
    ) -> Vec<DiscoveryCandidate> {
        let mut emitted: Vec<(String, CandidateSource, u32)> = Vec::new();

        for key in self.conventions.environment_lists {
            if let Some(raw) = self.sources.environment().get_non_blank(key) {
                emitted.extend(
                    split_address_list(&raw)
                        .into_iter()
                        .map(|url| (url, CandidateSource::EnvList, ENVIRONMENT_PRIORITY)),
                );
            }
        }

        let wants_orchestrator = context.orchestration_mode() == OrchestrationMode::AspireAppHost
            && adapter.supports_orchestrator_injection();
        if wants_orchestrator
            && let Some(injected) = self.orchestrator_address(descriptor)
        {
            emitted.push((
                injected,
                CandidateSource::AspireDiscovery,
                ENVIRONMENT_PRIORITY,
            ));
        }

        for key in self.conventions.configuration_lists {
            if let Some(raw) = self.sources.configuration().get_non_blank(key) {
                emitted.extend(
                    split_address_list(&raw)
                        .into_iter()
                        .map(|url| (url, CandidateSource::ExplicitConfig, CONFIGURATION_PRIORITY)),
                );
            }
        }

        if context.orchestration_mode() == OrchestrationMode::Container {
            emitted.push((
                descriptor.container_url(),
                CandidateSource::ContainerInstance,
                TOPOLOGY_PRIORITY,
            ));
            emitted.push((
                descriptor.local_url(),
                CandidateSource::LocalFallback,
                TOPOLOGY_PRIORITY + 1,
            ));
        } else {
            emitted.push((
                descriptor.local_url(),
                CandidateSource::LocalFallback,
                TOPOLOGY_PRIORITY,
            ));
        }

        emitted
            .into_iter()
            .filter_map(|(url, source, priority)| {
                let qualified = qualify_scheme(&url, descriptor.default_scheme());
                let rewritten = rewrite_or_keep(adapter, descriptor, &qualified, context);
                match DiscoveryCandidate::new(rewritten, source, priority) {
                    Ok(candidate) => Some(candidate),
                    Err(err) => {
                        debug!(service = descriptor.service_name(), %source, %err, "skipping blank candidate");
                        None
                    }
                }
            })
            .collect()
    }

    fn orchestrator_address(&self, descriptor: &ServiceDescriptor) -> Option<String> {
        descriptor.names().find_map(|name| {
            self.sources
                .configuration()
                .get_non_blank(&format!("services:{name}:default:0"))
        })
    }
}

fn rewrite_or_keep(
    adapter: &dyn DiscoveryAdapter,
    descriptor: &ServiceDescriptor,
    url: &str,
    context: &DiscoveryContext,
) -> String {
    match adapter.rewrite_url(url, context) {
        Ok(rewritten) => rewritten,
        Err(err) => {
            warn!(
                service = descriptor.service_name(),
                url = %redact_credentials(url),
                %err,
                "keeping candidate unchanged after rewrite failure"
            );
            url.to_owned()
        }
    }
}

/// Splits a delimited address list.
///
/// Segments are separated by `;`. A segment is further split on `,` unless
/// it carries exactly one scheme, which keeps multi-host connection strings
/// such as `mongodb://a:27017,b:27017` intact.
#[must_use]
pub fn split_address_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .flat_map(|segment| {
            if segment.matches("://").count() == 1 {
                vec![segment]
            } else {
                segment.split(',').collect()
            }
        })
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Prefixes `scheme://` when `url` carries no scheme.
#[must_use]
pub fn qualify_scheme(url: &str, scheme: &str) -> String {
    let trimmed = url.trim();
    if trimmed.is_empty() || trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("{scheme}://{trimmed}")
    }
}
