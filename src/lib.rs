//! Wayfinder: connection discovery for backing services.
//!
//! This crate resolves a usable connection URL for each dependency an
//! application declares (document store, relational store, cache, search
//! cluster, vector database, model server, message broker) without the
//! operator having to configure one. Explicit configuration always wins;
//! otherwise candidates are gathered from the environment and the deployment
//! topology, then probed in priority order with a protocol-level health
//! check.
//!
//! # Architecture
//!
//! Wayfinder follows hexagonal architecture principles:
//!
//! - **Domain**: Candidates, contexts, descriptors, and results, free of I/O
//! - **Ports**: The per-dependency adapter strategy and settings sources
//! - **Adapters**: Protocol probes and settings readers
//! - **Services**: Registry, coordinator, options configurator, and report
//!
//! # Modules
//!
//! - [`discovery`]: Service discovery and connection resolution

pub mod discovery;
