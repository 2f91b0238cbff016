//! Process environment settings source.

use crate::discovery::ports::SettingsSource;
use std::env;

/// Settings source backed by the process environment.
///
/// Lookups try the key verbatim, then upper-cased. Keys containing `:` are
/// also tried with `__` separators so that configuration paths such as
/// `Mongo:ConnectionString` can be supplied as `MONGO__CONNECTIONSTRING`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl ProcessEnvironment {
    /// Creates a process environment view.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SettingsSource for ProcessEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        environment_key_variants(key)
            .into_iter()
            .find_map(|variant| env::var(variant).ok())
    }
}

fn environment_key_variants(key: &str) -> Vec<String> {
    let trimmed = key.trim();
    let mut variants = vec![trimmed.to_owned(), trimmed.to_ascii_uppercase()];
    if trimmed.contains(':') {
        let double_underscore = trimmed.replace(':', "__");
        variants.push(double_underscore.to_ascii_uppercase());
        variants.push(double_underscore);
    }
    variants.dedup();
    variants
}
