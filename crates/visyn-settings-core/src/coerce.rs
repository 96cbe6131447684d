//! Conversion of raw override strings into declared field types.

use serde_json::{Number, Value};

use crate::{FieldType, ScalarType, SettingsError};

/// Convert the raw value of environment variable `var` into `ty`.
///
/// Lists and open maps are read as JSON. Optional scalars treat the empty
/// string as null. A nested model cannot be assigned from a single variable.
///
/// # Errors
///
/// Returns [`SettingsError::Coercion`] naming `var` and the expected type if
/// `raw` is not a valid encoding of `ty`.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use visyn_settings_core::{coerce, FieldType, ScalarType};
///
/// let ty = FieldType::Scalar(ScalarType::Bool);
/// assert_eq!(coerce("ENABLE", &ty, "True").unwrap(), json!(true));
/// assert!(coerce("ENABLE", &ty, "sometimes").is_err());
/// ```
pub fn coerce(var: &str, ty: &FieldType, raw: &str) -> Result<Value, SettingsError> {
    let value = match ty {
        FieldType::Scalar(scalar) => coerce_scalar(*scalar, raw),
        FieldType::Optional(_) if raw.is_empty() => Some(Value::Null),
        FieldType::Optional(scalar) => coerce_scalar(*scalar, raw),
        FieldType::List(scalar) => coerce_list(*scalar, raw),
        FieldType::Map => serde_json::from_str::<Value>(raw)
            .ok()
            .filter(Value::is_object),
        FieldType::Model(_) => None,
    };

    value.ok_or_else(|| SettingsError::coercion(var, expected(ty), raw))
}

/// Parse a boolean from a string.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn coerce_scalar(ty: ScalarType, raw: &str) -> Option<Value> {
    match ty {
        ScalarType::String => Some(Value::String(raw.to_string())),
        ScalarType::Bool => parse_bool(raw.trim()).map(Value::Bool),
        ScalarType::Int => raw.trim().parse::<i64>().ok().map(Value::from),
        ScalarType::Float => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
    }
}

fn coerce_list(ty: ScalarType, raw: &str) -> Option<Value> {
    let items: Vec<Value> = serde_json::from_str(raw).ok()?;
    items
        .into_iter()
        .map(|item| coerce_item(ty, item))
        .collect::<Option<Vec<_>>>()
        .map(Value::Array)
}

// JSON elements may already be typed, or be strings that still need coercion.
fn coerce_item(ty: ScalarType, item: Value) -> Option<Value> {
    if ty.accepts(&item) {
        return Some(item);
    }
    match item {
        Value::String(s) => coerce_scalar(ty, &s),
        _ => None,
    }
}

fn expected(ty: &FieldType) -> String {
    match ty {
        FieldType::List(_) => format!("JSON array ({ty})"),
        FieldType::Map => "JSON object".to_string(),
        FieldType::Model(schema) => {
            format!("one of the fields of settings model {}", schema.name())
        }
        _ => ty.to_string(),
    }
}
