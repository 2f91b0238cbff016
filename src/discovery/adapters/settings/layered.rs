//! Ordered composition of settings sources.

use crate::discovery::ports::SettingsSource;
use std::sync::Arc;

/// Settings source that consults layers in order; the first layer holding
/// a key wins.
#[derive(Clone, Default)]
pub struct LayeredSettings {
    layers: Vec<Arc<dyn SettingsSource>>,
}

impl LayeredSettings {
    /// Creates an empty layered source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer with lower precedence than existing layers.
    #[must_use]
    pub fn with_layer(mut self, layer: Arc<dyn SettingsSource>) -> Self {
        self.layers.push(layer);
        self
    }
}

impl SettingsSource for LayeredSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.get(key))
    }
}

impl std::fmt::Debug for LayeredSettings {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("LayeredSettings")
            .field("layers", &self.layers.len())
            .finish()
    }
}
