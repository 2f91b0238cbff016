//! Autonomous discovery of backing-service connection URLs.
//!
//! Given a logical dependency name (`mongo`, `redis`, `ollama`, ...), the
//! discovery module works out which address to connect to by combining
//! explicit configuration, environment variables, orchestrator-injected
//! references, and topology-derived defaults, then probing candidates in
//! priority order. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
