//! JSON settings file loaded through capability-based filesystem access.

use super::InMemorySettings;
use crate::discovery::ports::{SettingsError, SettingsResult, SettingsSource};
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde_json::Value;

/// Settings read once from a JSON document on disk.
///
/// The document is flattened into colon-separated keys at load time; later
/// edits to the file are not observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonFileSettings {
    values: InMemorySettings,
}

impl JsonFileSettings {
    /// Loads and flattens a JSON settings file.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] when the file cannot be read,
    /// [`SettingsError::Parse`] when it is not valid JSON, and
    /// [`SettingsError::NotAnObject`] when the root is not an object.
    pub fn load(path: &Utf8Path) -> SettingsResult<Self> {
        let io_error = |source: std::io::Error| SettingsError::Io {
            path: path.to_string(),
            source,
        };

        let file_name = path
            .file_name()
            .ok_or_else(|| io_error(std::io::Error::other("path must include a file name")))?;
        let parent = path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(io_error)?;
        let contents = dir.read_to_string(file_name).map_err(io_error)?;

        Self::parse(path.as_str(), &contents)
    }

    /// Parses settings from JSON text. `origin` names the source in errors.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Parse`] when the text is not valid JSON and
    /// [`SettingsError::NotAnObject`] when the root is not an object.
    pub fn parse(origin: &str, contents: &str) -> SettingsResult<Self> {
        let document: Value =
            serde_json::from_str(contents).map_err(|source| SettingsError::Parse {
                path: origin.to_owned(),
                source,
            })?;
        if !document.is_object() {
            return Err(SettingsError::NotAnObject(origin.to_owned()));
        }

        Ok(Self {
            values: InMemorySettings::from_json(&document),
        })
    }
}

impl SettingsSource for JsonFileSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key)
    }
}
