//! Shared world state for service discovery BDD scenarios.

use std::sync::Arc;
use std::time::Duration;

use mockable::DefaultClock;
use rstest::fixture;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wayfinder::discovery::{
    adapters::{RedisDiscoveryAdapter, settings::InMemorySettings},
    domain::{
        DEFAULT_HEALTH_CHECK_TIMEOUT, DiscoveryContext, DiscoveryResult, OrchestrationMode,
        ServiceDescriptor, ServiceEndpoint,
    },
    ports::{DiscoveryAdapter, DiscoverySources},
    services::{DiscoveryCoordinator, DiscoveryRegistry, RegistryError},
};

/// Scenario world for service discovery behaviour tests.
pub struct DiscoveryWorld {
    /// Settings standing in for the process environment.
    pub environment: InMemorySettings,
    /// Settings standing in for the application configuration.
    pub configuration: InMemorySettings,
    /// Orchestration mode the resolution runs under.
    pub mode: OrchestrationMode,
    /// Per-probe health-check budget.
    pub timeout: Duration,
    /// Loopback port used as the container instance address.
    pub container_port: Option<u16>,
    /// Loopback port used as the host address.
    pub local_port: Option<u16>,
    /// Result of the last resolution.
    pub last_result: Option<DiscoveryResult>,
}

impl DiscoveryWorld {
    /// Creates a standalone world with no configured ports.
    #[must_use]
    pub fn new() -> Self {
        Self {
            environment: InMemorySettings::new(),
            configuration: InMemorySettings::new(),
            mode: OrchestrationMode::Standalone,
            timeout: DEFAULT_HEALTH_CHECK_TIMEOUT,
            container_port: None,
            local_port: None,
            last_result: None,
        }
    }

    /// Builds a coordinator over a Redis adapter aimed at the world's ports.
    pub fn coordinator(&self) -> Result<DiscoveryCoordinator<DefaultClock>, RegistryError> {
        let sources = DiscoverySources::new(
            Arc::new(self.environment.clone()),
            Arc::new(self.configuration.clone()),
        );
        let container = self.container_port.unwrap_or_else(|| run_async(closed_port()));
        let local = self.local_port.unwrap_or_else(|| run_async(closed_port()));
        let descriptor = ServiceDescriptor::new(
            "redis",
            ServiceEndpoint::new("redis", "127.0.0.1", container),
            ServiceEndpoint::new("redis", "127.0.0.1", local),
        )
        .with_aliases(["cache"]);
        let adapter: Arc<dyn DiscoveryAdapter> =
            Arc::new(RedisDiscoveryAdapter::new(sources).with_descriptor(descriptor));
        let registry = DiscoveryRegistry::builder().register(adapter)?.build();
        Ok(DiscoveryCoordinator::new(
            Arc::new(registry),
            Arc::new(DefaultClock),
        ))
    }

    /// Returns the context the world resolves under.
    #[must_use]
    pub const fn context(&self) -> DiscoveryContext {
        DiscoveryContext::new(self.mode).with_health_check_timeout(self.timeout)
    }
}

impl Default for DiscoveryWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> DiscoveryWorld {
    DiscoveryWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Starts a loopback listener answering Redis clients with `PONG`.
pub async fn fake_redis() -> std::io::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buffer = [0_u8; 1024];
                loop {
                    let read = stream.read(&mut buffer).await?;
                    if read == 0 {
                        return Ok::<(), std::io::Error>(());
                    }
                    let request = String::from_utf8_lossy(buffer.get(..read).unwrap_or_default());
                    stream.write_all(replies_for(&request).as_bytes()).await?;
                }
            });
        }
    });
    Ok(port)
}

/// Answers each RESP command in `request`: `PING` with `PONG`, anything
/// else (connection setup such as `CLIENT SETINFO`) with `OK`.
fn replies_for(request: &str) -> String {
    let mut lines = request.split("\r\n");
    let mut replies = String::new();
    while let Some(line) = lines.next() {
        if line.starts_with('*') {
            let command = lines.nth(1).unwrap_or_default();
            replies.push_str(if command.eq_ignore_ascii_case("PING") {
                "+PONG\r\n"
            } else {
                "+OK\r\n"
            });
        }
    }
    replies
}

/// Returns a loopback port with nothing listening on it.
///
/// Falls back to port 9 (discard) if no ephemeral port can be bound.
pub async fn closed_port() -> u16 {
    match TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => listener.local_addr().map_or(9, |addr| addr.port()),
        Err(_) => 9,
    }
}
