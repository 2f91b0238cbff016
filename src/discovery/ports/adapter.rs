//! Strategy contract implemented once per dependency kind.

use crate::discovery::domain::{
    CandidateRewriteError, DiscoveryCandidate, DiscoveryContext, ServiceDescriptor,
};
use async_trait::async_trait;

/// Dependency-specific discovery behaviour.
///
/// An adapter knows where candidate addresses for its dependency may live
/// and how to prove that one of them is alive and speaking the right
/// protocol. Adapters carry no per-call mutable state, so one instance is
/// shared by every resolution in the process.
#[async_trait]
pub trait DiscoveryAdapter: Send + Sync {
    /// Returns the descriptor the adapter was built with.
    fn descriptor(&self) -> &ServiceDescriptor;

    /// Returns the canonical service name.
    fn service_name(&self) -> &str {
        self.descriptor().service_name()
    }

    /// Returns alternative names accepted by the registry.
    fn aliases(&self) -> &[String] {
        self.descriptor().aliases()
    }

    /// Returns an operator-supplied connection string, if one is configured.
    ///
    /// A non-blank value bypasses discovery entirely. The sentinel `auto`
    /// must be treated as absent.
    fn read_explicit_configuration(&self) -> Option<String>;

    /// Produces candidate addresses in emission order.
    ///
    /// Implementations may read environment variables and static
    /// configuration but must not perform network I/O.
    fn build_candidates(
        &self,
        descriptor: &ServiceDescriptor,
        context: &DiscoveryContext,
    ) -> Vec<DiscoveryCandidate>;

    /// Issues one protocol-appropriate reachability check against `url`.
    ///
    /// Every failure, including protocol and authentication errors, is
    /// reported as `false`. Implementations must not retry.
    async fn validate_health(&self, url: &str, context: &DiscoveryContext) -> bool;

    /// Returns `false` when the dependency is never injected by an app-host
    /// orchestrator.
    fn supports_orchestrator_injection(&self) -> bool {
        true
    }

    /// Applies connection parameters (credentials, database) to a candidate
    /// URL.
    ///
    /// # Errors
    ///
    /// Returns [`CandidateRewriteError`] when the URL cannot carry the
    /// requested parameters. Callers keep the original URL in that case.
    fn rewrite_url(
        &self,
        url: &str,
        _context: &DiscoveryContext,
    ) -> Result<String, CandidateRewriteError> {
        Ok(url.to_owned())
    }
}
