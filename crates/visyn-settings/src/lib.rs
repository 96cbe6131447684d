//! Typed settings for visyn applications.
//!
//! This crate resolves one strongly-typed settings object from:
//! - Defaults declared by the model's schema
//! - Environment variable overrides
//!
//! # Overview
//!
//! The root model is [`GlobalSettings`]. Most of it is closed, typed
//! structure ([`VisynCoreSettings`], [`SecuritySettings`], ...), while
//! `visyn_core.logging` is an open map that accepts arbitrary keys.
//!
//! # Environment Variable Overrides
//!
//! Variable names address fields with `__` between segments. Segments match
//! field names ignoring case:
//!
//! - `SECRET_KEY=Custom_Secret_Key`
//! - `visyn_core__SECURITY__STORE__ALB_SECURITY_STORE__ENABLE=True` (coerced to `true`)
//! - `visyn_core__LOGGING__VERSION=2` (stored as the string `"2"`)
//! - `visyn_core__LOGGING__ROOT__LEVEL=DEBUG`
//!
//! # Example
//!
//! ```
//! use visyn_settings::{EnvSnapshot, GlobalSettings};
//!
//! # fn main() -> Result<(), visyn_settings::SettingsError> {
//! let env: EnvSnapshot = [
//!     ("SECRET_KEY", "Custom_Secret_Key"),
//!     ("visyn_core__SECURITY__STORE__ALB_SECURITY_STORE__ENABLE", "True"),
//!     ("visyn_core__LOGGING__VERSION", "2"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let settings = GlobalSettings::from_env(env)?;
//!
//! assert_eq!(settings.secret_key, "Custom_Secret_Key");
//! assert!(settings.visyn_core.security.store.alb_security_store.enable);
//! assert_eq!(settings.visyn_core.logging["version"], "2");
//! assert_eq!(settings.get_nested("visyn_core.logging.version")?, "2");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod env;
mod loader;
mod model;
mod resolved;

pub use env::EnvSnapshot;
pub use loader::SettingsLoader;
pub use model::*;
pub use resolved::Resolved;

pub use visyn_settings_core::{
    Field, FieldType, Model, ModelSchema, ScalarType, SchemaError, SettingsError, SettingsResult,
};
