//! In-memory settings source.

use crate::discovery::ports::SettingsSource;
use serde_json::Value;
use std::collections::BTreeMap;

/// Case-insensitive, in-memory key/value settings.
///
/// Used directly in tests and as the flattened form of JSON settings files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemorySettings {
    values: BTreeMap<String, String>,
}

impl InMemorySettings {
    /// Creates an empty settings map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces one value.
    #[must_use]
    pub fn with(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds or replaces one value in place.
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.values.insert(normalize_key(key.as_ref()), value.into());
    }

    /// Builds settings from key/value pairs.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut settings = Self::new();
        for (key, value) in pairs {
            settings.insert(key, value);
        }
        settings
    }

    /// Flattens a JSON document into colon-separated keys.
    ///
    /// Objects contribute `parent:child` segments and arrays contribute
    /// their index (`services:mongo:default:0`). `null` leaves are skipped.
    #[must_use]
    pub fn from_json(document: &Value) -> Self {
        let mut settings = Self::new();
        flatten_into(&mut settings, None, document);
        settings
    }

    /// Returns the number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when no values are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SettingsSource for InMemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(&normalize_key(key)).cloned()
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().replace("__", ":").to_ascii_lowercase()
}

fn flatten_into(settings: &mut InMemorySettings, prefix: Option<&str>, value: &Value) {
    let child_key = |segment: &str| match prefix {
        Some(parent) => format!("{parent}:{segment}"),
        None => segment.to_owned(),
    };

    match value {
        Value::Object(entries) => {
            for (segment, child) in entries {
                flatten_into(settings, Some(&child_key(segment)), child);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(settings, Some(&child_key(&index.to_string())), child);
            }
        }
        Value::Null => {}
        Value::String(text) => {
            if let Some(key) = prefix {
                settings.insert(key, text.clone());
            }
        }
        Value::Bool(_) | Value::Number(_) => {
            if let Some(key) = prefix {
                settings.insert(key, value.to_string());
            }
        }
    }
}
