//! Application services for dependency discovery.

mod config;
mod configurator;
mod coordinator;
mod environment;
mod registry;
mod report;

pub use config::{ConfigError, DiscoveryConfig, HEALTH_CHECK_TIMEOUT_KEY, ORCHESTRATION_MODE_KEY};
pub use configurator::{
    ConfigureOutcome, ConnectionOptions, DiscoverableOptions, OptionsConfigurationError,
    OptionsConfigurationResult, OptionsConfigurator,
};
pub use coordinator::DiscoveryCoordinator;
pub use environment::{
    ORCHESTRATION_MODE_OVERRIDE, container_marker_present, detect_orchestration_mode,
};
pub use registry::{DiscoveryRegistry, DiscoveryRegistryBuilder, RegistryError, RegistryResult};
pub use report::{DiscoveryReport, ReportEntry};
