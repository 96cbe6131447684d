//! Settings loader with layered approach.
//!
//! This module provides the [`SettingsLoader`] for resolving a typed settings
//! model from its declared defaults and environment variables.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use visyn_settings_core::{
    coerce, resolve, MapKeys, Model, ModelSchema, SchemaError, SettingsError, SettingsResult,
    Target, ENV_DELIMITER,
};

use crate::{EnvSnapshot, Resolved};

/// Settings loader with layered approach.
///
/// The loader applies settings in layers, with later layers overriding
/// earlier ones:
/// 1. Default values declared by the model's schema
/// 2. Environment variables
///
/// Variable names address fields with `__` between segments, ignoring case:
/// `visyn_core__SECURITY__STORE__ALB_SECURITY_STORE__ENABLE` sets
/// `visyn_core.security.store.alb_security_store.enable`. Values for typed
/// fields are coerced to the declared type. Values landing inside an open map
/// field are stored as raw strings.
///
/// Variables whose first segment names no root field are skipped, unless
/// [`SettingsLoader::deny_unknown_variables`] is set. Any other segment that
/// fails to resolve is an error.
///
/// # Example
///
/// ```
/// use visyn_settings::{EnvSnapshot, GlobalSettings, SettingsLoader};
///
/// # fn main() -> Result<(), visyn_settings::SettingsError> {
/// let env: EnvSnapshot = [("APP__SECRET_KEY", "Custom_Secret_Key"), ("SECRET_KEY", "ignored")]
///     .into_iter()
///     .collect();
///
/// let settings = SettingsLoader::<GlobalSettings>::new()
///     .with_env(env)
///     .with_env_prefix("APP")
///     .load()?;
///
/// assert_eq!(settings.secret_key, "Custom_Secret_Key");
/// # Ok(())
/// # }
/// ```
pub struct SettingsLoader<T> {
    env: Option<EnvSnapshot>,
    env_prefix: Option<String>,
    deny_unknown: bool,
    model: PhantomData<fn() -> T>,
}

impl<T> Default for SettingsLoader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SettingsLoader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsLoader")
            .field("env", &self.env.as_ref().map(EnvSnapshot::len))
            .field("env_prefix", &self.env_prefix)
            .field("deny_unknown", &self.deny_unknown)
            .finish()
    }
}

impl<T> SettingsLoader<T> {
    /// Create a new settings loader.
    ///
    /// Without [`SettingsLoader::with_env`], the process environment is
    /// captured when [`SettingsLoader::load`] runs.
    #[must_use]
    pub fn new() -> Self {
        Self {
            env: None,
            env_prefix: None,
            deny_unknown: false,
            model: PhantomData,
        }
    }

    /// Resolve against `env` instead of the process environment.
    ///
    /// The snapshot replaces the environment entirely.
    #[must_use]
    pub fn with_env(mut self, env: EnvSnapshot) -> Self {
        self.env = Some(env);
        self
    }

    /// Capture the process environment now.
    #[must_use]
    pub fn with_process_env(self) -> Self {
        self.with_env(EnvSnapshot::from_process())
    }

    /// Only consider variables named `PREFIX__...`.
    ///
    /// The prefix matches ignoring case and is stripped before the rest of
    /// the name is resolved.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(format!("{prefix}{ENV_DELIMITER}"));
        self
    }

    /// Fail on variables whose first segment names no root field.
    #[must_use]
    pub fn deny_unknown_variables(mut self) -> Self {
        self.deny_unknown = true;
        self
    }

    fn strip_prefix<'v>(&self, var: &'v str) -> Option<&'v str> {
        let Some(prefix) = &self.env_prefix else {
            return Some(var);
        };
        var.get(..prefix.len())
            .filter(|head| head.eq_ignore_ascii_case(prefix))
            .map(|_| &var[prefix.len()..])
    }
}

impl<T: Model + DeserializeOwned> SettingsLoader<T> {
    /// Resolve the settings.
    ///
    /// Overrides are applied in ascending order of variable name into a
    /// scratch tree. Nothing is returned unless every override succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if:
    /// - The schema is invalid or does not match `T`
    /// - A variable addresses a field or key that does not exist
    /// - A value cannot be coerced to its field's declared type
    pub fn load(mut self) -> SettingsResult<Resolved<T>> {
        let schema = T::schema()?;
        let env = self.env.take().unwrap_or_else(EnvSnapshot::from_process);

        let mut tree = schema.defaults();
        let mut applied = 0_usize;
        for (var, raw) in env.iter() {
            let Some(name) = self.strip_prefix(var) else {
                continue;
            };
            if self.apply_env_var(&schema, &mut tree, var, name, raw)? {
                applied += 1;
            }
        }

        let settings = T::deserialize(&tree).map_err(|e| SchemaError::ModelMismatch {
            model: schema.name().to_string(),
            reason: e.to_string(),
        })?;

        debug!(model = schema.name(), overrides = applied, "resolved settings");
        Ok(Resolved::new(settings, tree, schema))
    }

    // Apply a single environment variable; returns false if it was skipped
    fn apply_env_var(
        &self,
        schema: &ModelSchema,
        tree: &mut Value,
        var: &str,
        name: &str,
        raw: &str,
    ) -> SettingsResult<bool> {
        let mut segments = name.split(ENV_DELIMITER).peekable();
        let first = segments.peek().copied().unwrap_or_default();
        if schema.field(first).is_none() {
            if self.deny_unknown {
                return Err(SettingsError::unknown_variable(var));
            }
            trace!(var, "skipping variable outside the settings schema");
            return Ok(false);
        }

        let path = resolve(schema, var, segments, MapKeys::Lowercase)?;
        match path.target() {
            Target::MapEntry(_) => {
                path.assign(var, tree, Value::String(raw.to_string()))?;
            }
            Target::Field(field) if field.field_type().is_open() => {
                let value = coerce(var, field.field_type(), raw)?;
                path.merge(var, tree, value)?;
            }
            Target::Field(field) => {
                let value = coerce(var, field.field_type(), raw)?;
                path.assign(var, tree, value)?;
            }
            Target::Root(_) => return Err(SettingsError::path_not_found(var, name)),
        }

        debug!(
            var,
            path = %path.dotted(),
            coerced = !path.target().is_map_entry(),
            "applied settings override"
        );
        Ok(true)
    }
}
