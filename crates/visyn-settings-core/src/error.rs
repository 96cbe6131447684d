//! Settings error types.

use thiserror::Error;

/// Errors raised while declaring a settings schema.
///
/// These are definition errors: they surface when the schema is built at
/// startup and are not meant to be recovered from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A field was declared with an empty name.
    #[error("empty field name in model {model}")]
    EmptyFieldName {
        /// The model declaring the field.
        model: String,
    },

    /// A field name cannot be addressed by environment variables or paths.
    #[error("invalid field name {field} in model {model}: {reason}")]
    InvalidFieldName {
        /// The model declaring the field.
        model: String,
        /// The offending field name.
        field: String,
        /// Why the name is rejected.
        reason: String,
    },

    /// The same field name was declared twice.
    #[error("duplicate field {field} in model {model}")]
    DuplicateField {
        /// The model declaring the field.
        model: String,
        /// The duplicated field name.
        field: String,
    },

    /// Two field names differ only by case and cannot be told apart.
    #[error("ambiguous fields {first} and {second} in model {model}")]
    AmbiguousField {
        /// The model declaring the fields.
        model: String,
        /// The field declared first.
        first: String,
        /// The field colliding with it.
        second: String,
    },

    /// A default value does not have the declared type.
    #[error("default for {model}.{field} is not a valid {expected}")]
    DefaultTypeMismatch {
        /// The model declaring the field.
        model: String,
        /// The field with the bad default.
        field: String,
        /// The declared type.
        expected: String,
    },

    /// The typed model does not match the tree its schema produces.
    #[error("model {model} does not match its schema: {reason}")]
    ModelMismatch {
        /// The model type.
        model: String,
        /// Explanation of the mismatch.
        reason: String,
    },
}

/// Errors raised while resolving or reading settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The schema itself is invalid.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A path segment matches no field or key.
    #[error("settings path not found: {path} (no match for {segment:?})")]
    PathNotFound {
        /// The full variable name or dotted path.
        path: String,
        /// The first segment that did not resolve.
        segment: String,
    },

    /// A path continues past a value that has no children.
    #[error("settings path not found: {path} ({segment:?} indexes into a value without children)")]
    NotTraversable {
        /// The full variable name or dotted path.
        path: String,
        /// The segment that tried to descend.
        segment: String,
    },

    /// An environment variable addresses no root field (strict mode).
    #[error("unknown settings variable: {var}")]
    UnknownVariable {
        /// The environment variable name.
        var: String,
    },

    /// An override value cannot be converted to its declared type.
    #[error("failed to parse environment variable {var}: expected {expected}, got {value:?}")]
    Coercion {
        /// The environment variable name.
        var: String,
        /// The declared type of the target.
        expected: String,
        /// The raw value.
        value: String,
    },

    /// A value read by path cannot be deserialized into the requested type.
    #[error("settings value at {path} has an unexpected type: {source}")]
    Deserialize {
        /// The dotted path that was read.
        path: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

impl SettingsError {
    /// Create a new path not found error.
    pub fn path_not_found(path: impl Into<String>, segment: impl Into<String>) -> Self {
        Self::PathNotFound {
            path: path.into(),
            segment: segment.into(),
        }
    }

    /// Create a new not traversable error.
    pub fn not_traversable(path: impl Into<String>, segment: impl Into<String>) -> Self {
        Self::NotTraversable {
            path: path.into(),
            segment: segment.into(),
        }
    }

    /// Create a new unknown variable error.
    pub fn unknown_variable(var: impl Into<String>) -> Self {
        Self::UnknownVariable { var: var.into() }
    }

    /// Create a new coercion error.
    pub fn coercion(
        var: impl Into<String>,
        expected: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Coercion {
            var: var.into(),
            expected: expected.into(),
            value: value.into(),
        }
    }

    /// Returns `true` for errors caused by a path that does not resolve.
    pub fn is_path_error(&self) -> bool {
        matches!(
            self,
            Self::PathNotFound { .. } | Self::NotTraversable { .. } | Self::UnknownVariable { .. }
        )
    }
}
