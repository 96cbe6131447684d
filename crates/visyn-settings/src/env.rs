//! Point-in-time environment snapshots.

use std::collections::BTreeMap;
use std::env;

use tracing::warn;

/// An immutable copy of environment variables taken at one moment.
///
/// Entries iterate in ascending byte order of their names, so resolving the
/// same snapshot always applies overrides in the same order.
///
/// # Example
///
/// ```
/// use visyn_settings::EnvSnapshot;
///
/// let env: EnvSnapshot = [("SECRET_KEY", "Custom_Secret_Key")].into_iter().collect();
/// assert_eq!(env.get("SECRET_KEY"), Some("Custom_Secret_Key"));
/// assert_eq!(env.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        let vars = env::vars_os()
            .filter_map(|(name, value)| match (name.into_string(), value.into_string()) {
                (Ok(name), Ok(value)) => Some((name, value)),
                (Ok(name), Err(_)) => {
                    warn!(var = %name, "skipping environment variable with non UTF-8 value");
                    None
                }
                (Err(name), _) => {
                    warn!(var = ?name, "skipping environment variable with non UTF-8 name");
                    None
                }
            })
            .collect();
        Self { vars }
    }

    /// Set a variable, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Get the value of a variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns `true` if the snapshot holds no variables.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate over `(name, value)` pairs in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for EnvSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let vars = iter
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        Self { vars }
    }
}
