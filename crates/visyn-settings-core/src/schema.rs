//! Settings schema types.
//!
//! A schema is a tree of [`ModelSchema`] nodes. Each node is *closed*: its
//! field names and types are fixed when it is built. A field of type
//! [`FieldType::Map`] is *open*: it holds arbitrary string keys whose values
//! carry no declared type.

use std::fmt;

use serde_json::{Map, Value};

use crate::SchemaError;

/// Delimiter between path segments in environment variable names.
pub const ENV_DELIMITER: &str = "__";

/// Separator between path segments in dotted paths.
pub const PATH_SEPARATOR: char = '.';

/// Primitive value types a field can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// UTF-8 string.
    String,
    /// Boolean.
    Bool,
    /// Signed 64-bit integer.
    Int,
    /// Finite 64-bit float.
    Float,
}

impl ScalarType {
    /// Returns `true` if `value` is a valid instance of this type.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Bool => value.is_boolean(),
            Self::Int => value.is_i64(),
            Self::Float => value.is_number(),
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
        };
        f.write_str(name)
    }
}

/// The declared type of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// A required primitive.
    Scalar(ScalarType),
    /// A primitive that may be null.
    Optional(ScalarType),
    /// A list of primitives.
    List(ScalarType),
    /// A nested closed model.
    Model(ModelSchema),
    /// An open string-keyed map with untyped values.
    Map,
}

impl FieldType {
    /// Returns `true` for open map fields.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Map)
    }

    /// Returns `true` if `value` is a valid instance of this type.
    ///
    /// A nested model value must carry exactly the model's declared field
    /// names, each holding a value its field accepts.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Scalar(ty) => ty.accepts(value),
            Self::Optional(ty) => value.is_null() || ty.accepts(value),
            Self::List(ty) => value
                .as_array()
                .is_some_and(|items| items.iter().all(|item| ty.accepts(item))),
            Self::Model(schema) => value.as_object().is_some_and(|map| schema.accepts(map)),
            Self::Map => value.is_object(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(ty) => write!(f, "{ty}"),
            Self::Optional(ty) => write!(f, "optional {ty}"),
            Self::List(ty) => write!(f, "list of {ty}"),
            Self::Model(schema) => write!(f, "settings model {}", schema.name()),
            Self::Map => f.write_str("map"),
        }
    }
}

/// A named slot in a [`ModelSchema`].
///
/// # Example
///
/// ```
/// use visyn_settings_core::{Field, ScalarType};
///
/// let field = Field::optional("cookie_name", ScalarType::String);
/// assert!(field.default().is_null());
///
/// let field = Field::bool("enable", false);
/// assert_eq!(field.default(), &serde_json::json!(false));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    ty: FieldType,
    default: Value,
}

impl Field {
    /// Create a field with an explicit type and default.
    ///
    /// The default is checked against the type when the owning schema is
    /// built.
    pub fn new(name: impl Into<String>, ty: FieldType, default: Value) -> Self {
        Self {
            name: name.into(),
            ty,
            default,
        }
    }

    /// Create a string field.
    pub fn string(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldType::Scalar(ScalarType::String),
            Value::String(default.into()),
        )
    }

    /// Create a boolean field.
    pub fn bool(name: impl Into<String>, default: bool) -> Self {
        Self::new(name, FieldType::Scalar(ScalarType::Bool), Value::Bool(default))
    }

    /// Create an integer field.
    pub fn int(name: impl Into<String>, default: i64) -> Self {
        Self::new(name, FieldType::Scalar(ScalarType::Int), Value::from(default))
    }

    /// Create a float field.
    ///
    /// Non-finite defaults are rejected when the schema is built.
    pub fn float(name: impl Into<String>, default: f64) -> Self {
        Self::new(name, FieldType::Scalar(ScalarType::Float), Value::from(default))
    }

    /// Create an optional field that defaults to null.
    pub fn optional(name: impl Into<String>, ty: ScalarType) -> Self {
        Self::new(name, FieldType::Optional(ty), Value::Null)
    }

    /// Create a list field.
    pub fn list<I, V>(name: impl Into<String>, ty: ScalarType, default: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let items = default.into_iter().map(Into::into).collect();
        Self::new(name, FieldType::List(ty), Value::Array(items))
    }

    /// Create a nested model field. Its default is the model's defaults.
    pub fn model(name: impl Into<String>, schema: ModelSchema) -> Self {
        let default = schema.defaults();
        Self::new(name, FieldType::Model(schema), default)
    }

    /// Create an open map field pre-seeded with `default`.
    pub fn map(name: impl Into<String>, default: Value) -> Self {
        Self::new(name, FieldType::Map, default)
    }

    /// Replace the default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = value.into();
        self
    }

    /// The declared field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared field type.
    pub fn field_type(&self) -> &FieldType {
        &self.ty
    }

    /// The default value.
    pub fn default(&self) -> &Value {
        &self.default
    }

    /// Returns `true` if `segment` addresses this field.
    ///
    /// Matching ignores case.
    pub fn matches(&self, segment: &str) -> bool {
        same_name(&self.name, segment)
    }
}

/// A closed model node: a fixed, ordered set of fields.
///
/// Built through [`ModelSchema::builder`], which rejects names that cannot be
/// addressed unambiguously.
///
/// # Example
///
/// ```
/// use visyn_settings_core::{Field, ModelSchema};
///
/// # fn main() -> Result<(), visyn_settings_core::SchemaError> {
/// let store = ModelSchema::builder("AlbSecurityStoreSettings")
///     .field(Field::bool("enable", false))
///     .build()?;
///
/// let root = ModelSchema::builder("Settings")
///     .field(Field::string("secret_key", "changeme"))
///     .field(Field::model("alb_security_store", store))
///     .build()?;
///
/// assert!(root.field("SECRET_KEY").is_some());
/// assert_eq!(root.defaults()["alb_security_store"]["enable"], false);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSchema {
    name: String,
    fields: Vec<Field>,
}

impl ModelSchema {
    /// Start declaring a model.
    pub fn builder(name: impl Into<String>) -> ModelSchemaBuilder {
        ModelSchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// The model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Find the field addressed by `segment`, ignoring case.
    pub fn field(&self, segment: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.matches(segment))
    }

    fn accepts(&self, map: &Map<String, Value>) -> bool {
        // Field names are unique, so equal counts rule out undeclared keys.
        map.len() == self.fields.len()
            && self.fields.iter().all(|field| {
                map.get(&field.name)
                    .is_some_and(|value| field.ty.accepts(value))
            })
    }

    /// Materialize the default tree for this model.
    pub fn defaults(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|field| (field.name.clone(), field.default.clone()))
            .collect();
        Value::Object(map)
    }
}

/// Builder for [`ModelSchema`].
#[derive(Debug)]
pub struct ModelSchemaBuilder {
    name: String,
    fields: Vec<Field>,
}

impl ModelSchemaBuilder {
    /// Declare a field.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Validate the declaration and build the schema.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if a field name is empty, contains the
    /// environment delimiter or the path separator, ends with an underscore,
    /// collides with another name (exactly or ignoring case), or if a default
    /// does not match its declared type.
    pub fn build(self) -> Result<ModelSchema, SchemaError> {
        for (index, field) in self.fields.iter().enumerate() {
            validate_name(&self.name, &field.name)?;

            if let Some(prior) = self.fields[..index]
                .iter()
                .find(|prior| same_name(&prior.name, &field.name))
            {
                return Err(if prior.name == field.name {
                    SchemaError::DuplicateField {
                        model: self.name.clone(),
                        field: field.name.clone(),
                    }
                } else {
                    SchemaError::AmbiguousField {
                        model: self.name.clone(),
                        first: prior.name.clone(),
                        second: field.name.clone(),
                    }
                });
            }

            if !field.ty.accepts(&field.default) {
                return Err(SchemaError::DefaultTypeMismatch {
                    model: self.name.clone(),
                    field: field.name.clone(),
                    expected: field.ty.to_string(),
                });
            }
        }

        Ok(ModelSchema {
            name: self.name,
            fields: self.fields,
        })
    }
}

/// A typed settings struct with a declared schema.
///
/// The tree materialized from [`Model::schema`] must deserialize into the
/// implementing type.
pub trait Model {
    /// Declare the schema of this model.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the declaration is invalid.
    fn schema() -> Result<ModelSchema, SchemaError>;
}

fn validate_name(model: &str, name: &str) -> Result<(), SchemaError> {
    if name.is_empty() {
        return Err(SchemaError::EmptyFieldName {
            model: model.to_string(),
        });
    }

    let reason = if name.contains(ENV_DELIMITER) {
        "contains the environment delimiter"
    } else if name.contains(PATH_SEPARATOR) {
        "contains the path separator"
    } else if name.ends_with('_') {
        "ends with an underscore"
    } else {
        return Ok(());
    };

    Err(SchemaError::InvalidFieldName {
        model: model.to_string(),
        field: name.to_string(),
        reason: reason.to_string(),
    })
}

fn same_name(declared: &str, segment: &str) -> bool {
    declared
        .chars()
        .flat_map(char::to_lowercase)
        .eq(segment.chars().flat_map(char::to_lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> ModelSchema {
        ModelSchema::builder("Store")
            .field(Field::bool("enable", false))
            .field(Field::optional("cookie_name", ScalarType::String))
            .build()
            .unwrap()
    }

    #[test]
    fn test_defaults_materialize_nested_models() {
        let root = ModelSchema::builder("Root")
            .field(Field::string("secret_key", "s3cret"))
            .field(Field::model("store", store()))
            .field(Field::map("logging", json!({"version": 1})))
            .build()
            .unwrap();

        assert_eq!(
            root.defaults(),
            json!({
                "secret_key": "s3cret",
                "store": {"enable": false, "cookie_name": null},
                "logging": {"version": 1},
            })
        );
    }

    #[test]
    fn test_field_lookup_ignores_case() {
        let schema = store();
        assert_eq!(schema.field("ENABLE").map(Field::name), Some("enable"));
        assert_eq!(schema.field("Cookie_Name").map(Field::name), Some("cookie_name"));
        assert!(schema.field("missing").is_none());
        assert!(schema.field("").is_none());
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = ModelSchema::builder("Root")
            .field(Field::bool("enable", false))
            .field(Field::bool("enable", true))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { ref field, .. } if field == "enable"));
    }

    #[test]
    fn test_case_collision_rejected() {
        let err = ModelSchema::builder("Root")
            .field(Field::string("secret_key", "a"))
            .field(Field::string("SECRET_KEY", "b"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::AmbiguousField {
                model: "Root".to_string(),
                first: "secret_key".to_string(),
                second: "SECRET_KEY".to_string(),
            }
        );
    }

    #[test]
    fn test_unaddressable_names_rejected() {
        for name in ["a__b", "a.b", "trailing_"] {
            let err = ModelSchema::builder("Root")
                .field(Field::bool(name, false))
                .build()
                .unwrap_err();
            assert!(matches!(err, SchemaError::InvalidFieldName { .. }), "{name}");
        }

        let err = ModelSchema::builder("Root")
            .field(Field::bool("", false))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::EmptyFieldName { .. }));
    }

    #[test]
    fn test_default_type_mismatch_rejected() {
        let cases = [
            Field::new("port", FieldType::Scalar(ScalarType::Int), json!("8080")),
            Field::float("ratio", f64::NAN),
            Field::list("roles", ScalarType::String, [1, 2]),
            Field::map("logging", json!([])),
            Field::optional("name", ScalarType::String).default_value(true),
        ];

        for field in cases {
            let name = field.name().to_string();
            let err = ModelSchema::builder("Root").field(field).build().unwrap_err();
            assert!(
                matches!(err, SchemaError::DefaultTypeMismatch { ref field, .. } if *field == name),
                "{name}"
            );
        }
    }

    #[test]
    fn test_nested_model_default_checked_against_schema() {
        let cases = [
            Field::new("store", FieldType::Model(store()), json!({"bogus": 1})),
            Field::new(
                "store",
                FieldType::Model(store()),
                json!({"enable": false, "cookie_name": null, "bogus": 1}),
            ),
            Field::new("store", FieldType::Model(store()), json!({"enable": false})),
            Field::new(
                "store",
                FieldType::Model(store()),
                json!({"enable": "yes", "cookie_name": null}),
            ),
            Field::new(
                "store",
                FieldType::Model(store()),
                json!({"ENABLE": false, "cookie_name": null}),
            ),
        ];

        for field in cases {
            let default = field.default().clone();
            let err = ModelSchema::builder("Root").field(field).build().unwrap_err();
            assert!(
                matches!(err, SchemaError::DefaultTypeMismatch { ref field, .. } if field == "store"),
                "{default}"
            );
        }
    }

    #[test]
    fn test_nested_model_default_may_differ_from_model_defaults() {
        let nested = ModelSchema::builder("Outer")
            .field(Field::model("store", store()))
            .build()
            .unwrap();
        let schema = ModelSchema::builder("Root")
            .field(
                Field::model("outer", nested)
                    .default_value(json!({"store": {"enable": true, "cookie_name": "sid"}})),
            )
            .build()
            .unwrap();

        assert_eq!(schema.defaults()["outer"]["store"]["cookie_name"], "sid");
    }

    #[test]
    fn test_field_type_display() {
        assert_eq!(FieldType::Scalar(ScalarType::Bool).to_string(), "bool");
        assert_eq!(FieldType::Optional(ScalarType::String).to_string(), "optional string");
        assert_eq!(FieldType::List(ScalarType::Int).to_string(), "list of int");
        assert_eq!(FieldType::Model(store()).to_string(), "settings model Store");
        assert_eq!(FieldType::Map.to_string(), "map");
    }

    #[test]
    fn test_float_accepts_integer_default() {
        let schema = ModelSchema::builder("Root")
            .field(Field::new("ratio", FieldType::Scalar(ScalarType::Float), json!(1)))
            .build();
        assert!(schema.is_ok());
    }
}
