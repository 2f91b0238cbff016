//! Resolution of one dependency into a usable connection URL.
//!
//! Provides [`DiscoveryCoordinator`], which looks up the adapter for a
//! service, honours explicit configuration, ranks the adapter's candidates,
//! and probes them one at a time under a hard per-probe deadline.

use super::registry::DiscoveryRegistry;
use crate::discovery::{
    domain::{
        DiscoveryCandidate, DiscoveryContext, DiscoveryResult, ProbeAttempt, ProbeOutcome,
        rank_candidates, redact_credentials,
    },
    ports::DiscoveryAdapter,
};
use mockable::Clock;
use std::sync::Arc;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::time::{Instant, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Discovery orchestration service.
///
/// The coordinator is stateless between calls; any number of resolutions
/// may run concurrently against one instance.
#[derive(Clone)]
pub struct DiscoveryCoordinator<C>
where
    C: Clock + Send + Sync,
{
    registry: Arc<DiscoveryRegistry>,
    clock: Arc<C>,
}

impl<C> DiscoveryCoordinator<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a coordinator over a frozen registry.
    #[must_use]
    pub const fn new(registry: Arc<DiscoveryRegistry>, clock: Arc<C>) -> Self {
        Self { registry, clock }
    }

    /// Returns the registry consulted by this coordinator.
    #[must_use]
    pub fn registry(&self) -> &DiscoveryRegistry {
        &self.registry
    }

    /// Resolves `service_name` to a URL.
    ///
    /// Never fails: every outcome, including an unknown service, is reported
    /// through the returned [`DiscoveryResult`].
    pub async fn resolve(&self, service_name: &str, context: &DiscoveryContext) -> DiscoveryResult {
        self.resolve_with_cancellation(service_name, context, &CancellationToken::new())
            .await
    }

    /// Resolves `service_name`, abandoning in-flight and remaining probes as
    /// soon as `cancellation` fires.
    ///
    /// A cancelled resolution still returns the degraded default candidate.
    #[instrument(
        name = "discovery.resolve",
        skip_all,
        fields(service = %service_name, mode = %context.orchestration_mode())
    )]
    pub async fn resolve_with_cancellation(
        &self,
        service_name: &str,
        context: &DiscoveryContext,
        cancellation: &CancellationToken,
    ) -> DiscoveryResult {
        let Some(adapter) = self.registry.lookup(service_name) else {
            warn!("no discovery adapter registered");
            return DiscoveryResult::failed(
                service_name.trim(),
                format!("no discovery adapter registered for '{}'", service_name.trim()),
                self.clock.utc(),
            );
        };
        let canonical = adapter.service_name();

        if let Some(explicit) = adapter.read_explicit_configuration() {
            info!(url = %redact_credentials(&explicit), "using explicitly configured address");
            return DiscoveryResult::explicit(canonical, explicit, self.clock.utc());
        }

        let mut candidates = adapter.build_candidates(adapter.descriptor(), context);
        if candidates.is_empty() {
            warn!("adapter produced no candidates");
            return DiscoveryResult::failed(
                canonical,
                format!("no candidates available for '{canonical}'"),
                self.clock.utc(),
            );
        }
        rank_candidates(&mut candidates);

        if context.skips_health_validation() {
            return self.unvalidated(canonical, &candidates);
        }

        self.probe_in_order(adapter.as_ref(), canonical, &candidates, context, cancellation)
            .await
    }

    /// Synchronous form of [`resolve`](Self::resolve).
    ///
    /// Inside a multi-threaded Tokio runtime the current worker is handed
    /// over with `block_in_place`; otherwise a private current-thread runtime
    /// drives the resolution, on a scoped thread if the caller is itself on
    /// a current-thread runtime.
    pub fn resolve_blocking(&self, service_name: &str, context: &DiscoveryContext) -> DiscoveryResult {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(self.resolve(service_name, context)))
            }
            Ok(_) => std::thread::scope(|scope| {
                scope
                    .spawn(|| self.resolve_on_private_runtime(service_name, context))
                    .join()
                    .unwrap_or_else(|_| {
                        DiscoveryResult::failed(
                            service_name.trim(),
                            "discovery thread panicked",
                            self.clock.utc(),
                        )
                    })
            }),
            Err(_) => self.resolve_on_private_runtime(service_name, context),
        }
    }

    fn resolve_on_private_runtime(
        &self,
        service_name: &str,
        context: &DiscoveryContext,
    ) -> DiscoveryResult {
        match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime.block_on(self.resolve(service_name, context)),
            Err(err) => DiscoveryResult::failed(
                service_name.trim(),
                format!("cannot start discovery runtime: {err}"),
                self.clock.utc(),
            ),
        }
    }

    fn unvalidated(&self, service_name: &str, candidates: &[DiscoveryCandidate]) -> DiscoveryResult {
        let attempts: Vec<ProbeAttempt> = candidates
            .iter()
            .map(|candidate| ProbeAttempt::new(candidate.clone(), ProbeOutcome::Skipped, 0))
            .collect();
        let Some(first) = candidates.first() else {
            return DiscoveryResult::failed(
                service_name,
                format!("no candidates available for '{service_name}'"),
                self.clock.utc(),
            );
        };
        debug!(url = %redact_credentials(first.url()), "health validation disabled");
        DiscoveryResult::degraded(
            service_name,
            first,
            attempts,
            "health validation skipped: timeout is zero",
            self.clock.utc(),
        )
    }

    async fn probe_in_order(
        &self,
        adapter: &dyn DiscoveryAdapter,
        service_name: &str,
        candidates: &[DiscoveryCandidate],
        context: &DiscoveryContext,
        cancellation: &CancellationToken,
    ) -> DiscoveryResult {
        let budget = context.health_check_timeout();
        let mut attempts = Vec::with_capacity(candidates.len());
        let mut cancelled = cancellation.is_cancelled();

        for candidate in candidates {
            if cancelled {
                attempts.push(ProbeAttempt::new(candidate.clone(), ProbeOutcome::Cancelled, 0));
                continue;
            }

            let started = Instant::now();
            let outcome = tokio::select! {
                biased;
                () = cancellation.cancelled() => ProbeOutcome::Cancelled,
                probe = timeout(budget, adapter.validate_health(candidate.url(), context)) => {
                    match probe {
                        Ok(true) => ProbeOutcome::Healthy,
                        Ok(false) => ProbeOutcome::Unhealthy,
                        Err(_) => ProbeOutcome::TimedOut,
                    }
                }
            };
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            debug!(
                url = %redact_credentials(candidate.url()),
                source = %candidate.source(),
                priority = candidate.priority(),
                %outcome,
                elapsed_ms,
                "probed candidate"
            );
            attempts.push(ProbeAttempt::new(candidate.clone(), outcome, elapsed_ms));

            match outcome {
                ProbeOutcome::Healthy => {
                    info!(
                        url = %redact_credentials(candidate.url()),
                        source = %candidate.source(),
                        "resolved healthy candidate"
                    );
                    return DiscoveryResult::healthy(
                        service_name,
                        candidate,
                        attempts,
                        self.clock.utc(),
                    );
                }
                ProbeOutcome::Cancelled => cancelled = true,
                _ => {}
            }
        }

        let Some(fallback) = candidates.first() else {
            return DiscoveryResult::failed(
                service_name,
                format!("no candidates available for '{service_name}'"),
                self.clock.utc(),
            );
        };
        let message = if cancelled {
            format!(
                "no reachable candidate for '{service_name}': discovery was cancelled; using default {}",
                redact_credentials(fallback.url())
            )
        } else {
            format!(
                "no reachable candidate for '{service_name}' after {} probes; using default {}",
                attempts.len(),
                redact_credentials(fallback.url())
            )
        };
        warn!(url = %redact_credentials(fallback.url()), cancelled, "falling back to default candidate");
        DiscoveryResult::degraded(service_name, fallback, attempts, message, self.clock.utc())
    }
}

impl<C> std::fmt::Debug for DiscoveryCoordinator<C>
where
    C: Clock + Send + Sync,
{
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("DiscoveryCoordinator")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
