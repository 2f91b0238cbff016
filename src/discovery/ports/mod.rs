//! Port contracts for dependency discovery.

mod adapter;
mod settings;

pub use adapter::DiscoveryAdapter;
pub use settings::{DiscoverySources, SettingsError, SettingsResult, SettingsSource};
