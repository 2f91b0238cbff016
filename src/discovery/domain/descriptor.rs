//! Static per-dependency addressing metadata.

use super::DiscoveryDomainError;
use serde::{Deserialize, Serialize};

/// Default URI template applied to descriptor endpoints.
pub const DEFAULT_URI_PATTERN: &str = "{scheme}://{host}:{port}";

/// Scheme, host, and port of one addressable shape of a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    scheme: String,
    host: String,
    port: u16,
}

impl ServiceEndpoint {
    /// Creates an endpoint. Scheme and host are trimmed; the scheme is
    /// lowercased.
    #[must_use]
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: scheme.into().trim().to_ascii_lowercase(),
            host: host.into().trim().to_owned(),
            port,
        }
    }

    /// Returns the URL scheme.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the host name.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the TCP port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }
}

/// Declarative facts a connector author supplies once per dependency kind.
///
/// Descriptors are registered explicitly alongside their adapter and are
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    service_name: String,
    aliases: Vec<String>,
    container: ServiceEndpoint,
    local: ServiceEndpoint,
    uri_pattern: String,
    health_endpoint: Option<String>,
}

impl ServiceDescriptor {
    /// Creates a descriptor with the default URI pattern and no aliases.
    ///
    /// The service name is trimmed and lowercased. Structural validation
    /// happens in [`ServiceDescriptor::validate`], which registration runs.
    #[must_use]
    pub fn new(
        service_name: impl Into<String>,
        container: ServiceEndpoint,
        local: ServiceEndpoint,
    ) -> Self {
        Self {
            service_name: service_name.into().trim().to_ascii_lowercase(),
            aliases: Vec::new(),
            container,
            local,
            uri_pattern: DEFAULT_URI_PATTERN.to_owned(),
            health_endpoint: None,
        }
    }

    /// Replaces the alias list. Aliases are trimmed, lowercased, and blank
    /// entries dropped.
    #[must_use]
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases
            .into_iter()
            .map(|alias| alias.into().trim().to_ascii_lowercase())
            .filter(|alias| !alias.is_empty())
            .collect();
        self
    }

    /// Replaces the URI pattern.
    #[must_use]
    pub fn with_uri_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.uri_pattern = pattern.into().trim().to_owned();
        self
    }

    /// Records the health endpoint path shown in reports.
    #[must_use]
    pub fn with_health_endpoint(mut self, path: impl Into<String>) -> Self {
        let normalized = path.into().trim().to_owned();
        self.health_endpoint = (!normalized.is_empty()).then_some(normalized);
        self
    }

    /// Checks the structural invariants of the descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryDomainError`] when the service name is blank, an
    /// endpoint has a blank host or port 0, or the URI pattern lacks the
    /// `{host}` or `{port}` placeholder.
    pub fn validate(&self) -> Result<(), DiscoveryDomainError> {
        if self.service_name.is_empty() {
            return Err(DiscoveryDomainError::EmptyServiceName);
        }

        for (endpoint_kind, endpoint) in [("container", &self.container), ("local", &self.local)] {
            if endpoint.host().is_empty() {
                return Err(DiscoveryDomainError::EmptyEndpointHost {
                    service: self.service_name.clone(),
                    endpoint: endpoint_kind,
                });
            }
            if endpoint.port() == 0 {
                return Err(DiscoveryDomainError::ZeroEndpointPort {
                    service: self.service_name.clone(),
                    endpoint: endpoint_kind,
                });
            }
        }

        let has_placeholders =
            self.uri_pattern.contains("{host}") && self.uri_pattern.contains("{port}");
        if !has_placeholders {
            return Err(DiscoveryDomainError::InvalidUriPattern {
                service: self.service_name.clone(),
                pattern: self.uri_pattern.clone(),
            });
        }

        Ok(())
    }

    /// Iterates the service name followed by every alias.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.service_name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Renders an endpoint through the URI pattern.
    #[must_use]
    pub fn render(&self, endpoint: &ServiceEndpoint) -> String {
        self.uri_pattern
            .replace("{scheme}", endpoint.scheme())
            .replace("{host}", endpoint.host())
            .replace("{port}", &endpoint.port().to_string())
    }

    /// Returns the in-container address.
    #[must_use]
    pub fn container_url(&self) -> String {
        self.render(&self.container)
    }

    /// Returns the host-network address.
    #[must_use]
    pub fn local_url(&self) -> String {
        self.render(&self.local)
    }

    /// Returns the canonical service name.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Returns the aliases.
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Returns the health endpoint path used for reporting.
    #[must_use]
    pub fn health_endpoint(&self) -> Option<&str> {
        self.health_endpoint.as_deref()
    }

    /// Returns the default scheme, taken from the container endpoint.
    #[must_use]
    pub fn default_scheme(&self) -> &str {
        self.container.scheme()
    }
}
