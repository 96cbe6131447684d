//! Schema model and path walking for visyn settings.
//!
//! This crate holds the pieces of settings resolution that do not depend on
//! where values come from:
//! - [`ModelSchema`] and [`Field`] declare the settings tree. Models are
//!   closed (fixed field names and types); [`FieldType::Map`] fields are open
//!   (arbitrary keys, untyped values).
//! - [`coerce`] converts raw override strings into declared field types.
//! - [`resolve`] walks a path against a schema. The same walk serves both
//!   environment variable names (`A__B__C`) and dotted reads (`a.b.c`).
//!
//! The loader that reads the environment lives in the `visyn-settings` crate.

#![warn(missing_docs)]

mod coerce;
mod error;
mod path;
mod schema;

pub use coerce::{coerce, parse_bool};
pub use error::{SchemaError, SettingsError};
pub use path::{resolve, resolve_dotted, resolve_env, MapKeys, ResolvedPath, Target};
pub use schema::*;

/// Result type alias using [`SettingsError`].
pub type SettingsResult<T> = Result<T, SettingsError>;
