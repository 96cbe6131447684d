//! Resolved settings instances.

use std::ops::Deref;

use serde::de::DeserializeOwned;
use serde_json::Value;
use visyn_settings_core::{resolve_dotted, ModelSchema, SettingsError, SettingsResult};

/// A fully resolved settings instance.
///
/// Dereferences to the typed model `T`. The same values are also reachable
/// by dotted path through [`Resolved::get_nested`], including values inside
/// open map fields. An instance never changes after the loader returns it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    settings: T,
    tree: Value,
    schema: ModelSchema,
}

impl<T> Resolved<T> {
    pub(crate) fn new(settings: T, tree: Value, schema: ModelSchema) -> Self {
        Self {
            settings,
            tree,
            schema,
        }
    }

    /// Read the value at a dotted path such as `visyn_core.logging.version`.
    ///
    /// Field names match ignoring case. Keys inside open maps match exactly.
    ///
    /// # Errors
    ///
    /// Returns a path error if any segment does not resolve. A missing value
    /// is never reported as null.
    ///
    /// # Example
    ///
    /// ```
    /// use visyn_settings::{EnvSnapshot, GlobalSettings};
    ///
    /// let env: EnvSnapshot = [("visyn_core__LOGGING__VERSION", "2")].into_iter().collect();
    /// let settings = GlobalSettings::from_env(env).unwrap();
    ///
    /// assert_eq!(settings.get_nested("visyn_core.logging.version").unwrap(), "2");
    /// assert!(settings.get_nested("visyn_core.logging.nope").is_err());
    /// ```
    pub fn get_nested(&self, path: &str) -> SettingsResult<&Value> {
        resolve_dotted(&self.schema, path)?.lookup(path, &self.tree)
    }

    /// Read the value at a dotted path and deserialize it.
    ///
    /// # Errors
    ///
    /// Returns a path error as [`Resolved::get_nested`] does, or
    /// [`SettingsError::Deserialize`] if the value does not fit `U`.
    pub fn get_nested_as<U: DeserializeOwned>(&self, path: &str) -> SettingsResult<U> {
        let value = self.get_nested(path)?;
        U::deserialize(value).map_err(|source| SettingsError::Deserialize {
            path: path.to_string(),
            source,
        })
    }

    /// The typed settings.
    pub fn settings(&self) -> &T {
        &self.settings
    }

    /// The whole settings tree.
    pub fn as_value(&self) -> &Value {
        &self.tree
    }

    /// The schema the settings were resolved against.
    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    /// Return the typed settings, dropping the tree.
    pub fn into_inner(self) -> T {
        self.settings
    }
}

impl<T> Deref for Resolved<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.settings
    }
}
