//! Scripted adapter and fixtures shared by the orchestration tests.

use crate::discovery::{
    domain::{
        CandidateSource, DiscoveryCandidate, DiscoveryContext, ServiceDescriptor, ServiceEndpoint,
    },
    ports::DiscoveryAdapter,
    services::{DiscoveryCoordinator, DiscoveryRegistry},
};
use async_trait::async_trait;
use mockable::DefaultClock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Adapter whose candidates and probe outcomes are fixed up front.
#[derive(Debug)]
pub struct ScriptedAdapter {
    descriptor: ServiceDescriptor,
    explicit: Option<String>,
    candidates: Vec<DiscoveryCandidate>,
    healthy: BTreeSet<String>,
    delays: BTreeMap<String, Duration>,
    probed: Mutex<Vec<String>>,
}

impl ScriptedAdapter {
    pub fn new(name: &str) -> Self {
        Self {
            descriptor: ServiceDescriptor::new(
                name,
                ServiceEndpoint::new("tcp", name, 7000),
                ServiceEndpoint::new("tcp", "localhost", 7000),
            ),
            explicit: None,
            candidates: Vec::new(),
            healthy: BTreeSet::new(),
            delays: BTreeMap::new(),
            probed: Mutex::new(Vec::new()),
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.descriptor = self.descriptor.with_aliases([alias]);
        self
    }

    pub fn with_explicit(mut self, url: &str) -> Self {
        self.explicit = Some(url.to_owned());
        self
    }

    pub fn with_candidate(mut self, url: &str, source: CandidateSource, priority: u32) -> Self {
        self.candidates
            .push(DiscoveryCandidate::new(url, source, priority).expect("valid candidate"));
        self
    }

    pub fn healthy_at(mut self, url: &str) -> Self {
        self.healthy.insert(url.to_owned());
        self
    }

    pub fn slow_at(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_owned(), delay);
        self
    }

    pub fn probed(&self) -> Vec<String> {
        self.probed.lock().expect("probe log lock").clone()
    }
}

#[async_trait]
impl DiscoveryAdapter for ScriptedAdapter {
    fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    fn read_explicit_configuration(&self) -> Option<String> {
        self.explicit.clone()
    }

    fn build_candidates(
        &self,
        _descriptor: &ServiceDescriptor,
        _context: &DiscoveryContext,
    ) -> Vec<DiscoveryCandidate> {
        self.candidates.clone()
    }

    async fn validate_health(&self, url: &str, _context: &DiscoveryContext) -> bool {
        self.probed
            .lock()
            .expect("probe log lock")
            .push(url.to_owned());
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        self.healthy.contains(url)
    }
}

pub type TestCoordinator = DiscoveryCoordinator<DefaultClock>;

/// Builds a coordinator over the given adapters.
pub fn coordinator_with(adapters: Vec<Arc<dyn DiscoveryAdapter>>) -> TestCoordinator {
    let registry = adapters
        .into_iter()
        .try_fold(DiscoveryRegistry::builder(), |builder, adapter| {
            builder.register(adapter)
        })
        .expect("adapters should register")
        .build();
    DiscoveryCoordinator::new(Arc::new(registry), Arc::new(DefaultClock))
}
