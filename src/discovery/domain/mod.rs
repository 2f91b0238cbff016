//! Domain model for dependency discovery.
//!
//! Candidates, contexts, descriptors, and results are plain values created
//! and discarded within a single resolution call. Nothing here performs I/O.

mod candidate;
mod context;
mod descriptor;
mod error;
mod mode;
mod redact;
mod result;

pub use candidate::{CandidateSource, DiscoveryCandidate, rank_candidates};
pub use context::{DEFAULT_HEALTH_CHECK_TIMEOUT, DiscoveryContext, parameter_keys};
pub use descriptor::{DEFAULT_URI_PATTERN, ServiceDescriptor, ServiceEndpoint};
pub use error::{CandidateRewriteError, DiscoveryDomainError, ParseOrchestrationModeError};
pub use mode::OrchestrationMode;
pub use redact::redact_credentials;
pub use result::{DiscoveryResult, ProbeAttempt, ProbeOutcome};
