//! Static registry of discovery adapters.
//!
//! Adapters are registered explicitly at start-up. After [`build`] the
//! registry is immutable and shared by reference.
//!
//! [`build`]: DiscoveryRegistryBuilder::build

use crate::discovery::{
    adapters::default_adapters,
    domain::DiscoveryDomainError,
    ports::{DiscoveryAdapter, DiscoverySources},
};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while assembling the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The adapter's descriptor failed validation.
    #[error(transparent)]
    InvalidDescriptor(#[from] DiscoveryDomainError),
    /// A name or alias is already claimed by another adapter.
    #[error("discovery name '{name}' is already registered by '{owner}'")]
    DuplicateName {
        /// The contested name, lowercased.
        name: String,
        /// Canonical name of the adapter that registered it first.
        owner: String,
    },
}

/// Result type for registry assembly.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Immutable lookup table from service names and aliases to adapters.
#[derive(Clone, Default)]
pub struct DiscoveryRegistry {
    adapters: Vec<Arc<dyn DiscoveryAdapter>>,
    by_name: BTreeMap<String, usize>,
}

impl DiscoveryRegistry {
    /// Starts an empty builder.
    #[must_use]
    pub fn builder() -> DiscoveryRegistryBuilder {
        DiscoveryRegistryBuilder::default()
    }

    /// Builds a registry holding every shipped adapter.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if a shipped descriptor is invalid or two
    /// adapters claim the same name.
    pub fn with_defaults(sources: &DiscoverySources) -> RegistryResult<Self> {
        default_adapters(sources)
            .into_iter()
            .try_fold(Self::builder(), DiscoveryRegistryBuilder::register)
            .map(DiscoveryRegistryBuilder::build)
    }

    /// Finds the adapter registered under `name`, ignoring ASCII case and
    /// surrounding whitespace.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Arc<dyn DiscoveryAdapter>> {
        let index = self.by_name.get(&name.trim().to_ascii_lowercase())?;
        self.adapters.get(*index)
    }

    /// Returns canonical service names in registration order.
    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.adapters.iter().map(|adapter| adapter.service_name())
    }

    /// Returns the number of registered adapters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Returns `true` when no adapter is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl std::fmt::Debug for DiscoveryRegistry {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("DiscoveryRegistry")
            .field("names", &self.by_name.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Collects adapters before the registry is frozen.
#[derive(Default)]
pub struct DiscoveryRegistryBuilder {
    registry: DiscoveryRegistry,
}

impl DiscoveryRegistryBuilder {
    /// Adds `adapter` under its canonical name and every alias.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidDescriptor`] when the adapter's
    /// descriptor is malformed, or [`RegistryError::DuplicateName`] when any
    /// of its names is already taken. The builder is consumed either way;
    /// a failed registration discards every adapter registered so far.
    pub fn register(mut self, adapter: Arc<dyn DiscoveryAdapter>) -> RegistryResult<Self> {
        adapter.descriptor().validate()?;

        let names: Vec<String> = std::iter::once(adapter.service_name())
            .chain(adapter.aliases().iter().map(String::as_str))
            .map(|name| name.trim().to_ascii_lowercase())
            .collect();
        for name in &names {
            if let Some(owner) = self
                .registry
                .by_name
                .get(name)
                .and_then(|index| self.registry.adapters.get(*index))
            {
                return Err(RegistryError::DuplicateName {
                    name: name.clone(),
                    owner: owner.service_name().to_owned(),
                });
            }
        }

        let index = self.registry.adapters.len();
        self.registry.adapters.push(adapter);
        for name in names {
            self.registry.by_name.entry(name).or_insert(index);
        }
        Ok(self)
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> DiscoveryRegistry {
        self.registry
    }
}
