//! Path resolution shared by override writing and nested reads.
//!
//! A path is walked against the schema first: segments match declared field
//! names (ignoring case) through closed models, and once a segment lands on an
//! open map every remaining segment becomes a literal key inside it. The
//! result is a [`ResolvedPath`] holding the canonical key sequence into the
//! materialized tree, which is then used to read or write that tree.

use serde_json::{Map, Value};

use crate::{Field, FieldType, ModelSchema, SettingsError, ENV_DELIMITER, PATH_SEPARATOR};

/// How segments inside an open map are turned into keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapKeys {
    /// Use the segment as written.
    Exact,
    /// Lowercase the segment. Environment variable names ignore case.
    ///
    /// When writing, a key already present in the map that matches ignoring
    /// case is reused instead.
    Lowercase,
}

impl MapKeys {
    fn key(self, segment: &str) -> String {
        match self {
            Self::Exact => segment.to_string(),
            Self::Lowercase => segment.to_lowercase(),
        }
    }
}

/// What a resolved path points at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target<'s> {
    /// The root model itself (empty segment list).
    Root(&'s ModelSchema),
    /// A declared field.
    Field(&'s Field),
    /// A key somewhere inside the open map field.
    MapEntry(&'s Field),
}

impl<'s> Target<'s> {
    /// Returns `true` if the target lies inside an open map.
    pub fn is_map_entry(&self) -> bool {
        matches!(self, Self::MapEntry(_))
    }

    fn node(self) -> Node<'s> {
        match self {
            Self::Root(model) => Node::Closed(model),
            Self::MapEntry(field) => Node::Open(field),
            Self::Field(field) => match field.field_type() {
                FieldType::Model(model) => Node::Closed(model),
                FieldType::Map => Node::Open(field),
                _ => Node::Leaf,
            },
        }
    }
}

enum Node<'s> {
    Closed(&'s ModelSchema),
    Open(&'s Field),
    Leaf,
}

/// A path matched against a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPath<'s> {
    keys: Vec<String>,
    target: Target<'s>,
    map_keys: MapKeys,
    // Index of the first key inside an open map
    map_start: Option<usize>,
}

impl<'s> ResolvedPath<'s> {
    /// The canonical keys from the root of the tree to the target.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// What the path points at.
    pub fn target(&self) -> Target<'s> {
        self.target
    }

    /// The keys joined as a dotted path.
    pub fn dotted(&self) -> String {
        self.keys.join(".")
    }

    /// Read the value at this path from `tree`.
    ///
    /// `path` is the caller-facing name used in errors.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::PathNotFound`] if a key is absent and
    /// [`SettingsError::NotTraversable`] if a key indexes into a value without
    /// children.
    pub fn lookup<'v>(&self, path: &str, tree: &'v Value) -> Result<&'v Value, SettingsError> {
        let mut node = tree;
        for key in &self.keys {
            node = match node {
                Value::Object(map) => map
                    .get(key)
                    .ok_or_else(|| SettingsError::path_not_found(path, key.as_str()))?,
                _ => return Err(SettingsError::not_traversable(path, key.as_str())),
            };
        }
        Ok(node)
    }

    /// Store `value` at this path in `tree`, creating missing maps on the way.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NotTraversable`] if an existing value on the
    /// way is not a map.
    pub fn assign(&self, path: &str, tree: &mut Value, value: Value) -> Result<(), SettingsError> {
        *self.slot_mut(path, tree)? = value;
        Ok(())
    }

    /// Deep-merge `value` into the value at this path in `tree`.
    ///
    /// Maps are merged key by key. Anything else replaces what was there.
    ///
    /// # Errors
    ///
    /// Same as [`ResolvedPath::assign`].
    pub fn merge(&self, path: &str, tree: &mut Value, value: Value) -> Result<(), SettingsError> {
        merge_values(self.slot_mut(path, tree)?, value);
        Ok(())
    }

    fn slot_mut<'v>(&self, path: &str, tree: &'v mut Value) -> Result<&'v mut Value, SettingsError> {
        let mut node = tree;
        for (index, key) in self.keys.iter().enumerate() {
            let map = node
                .as_object_mut()
                .ok_or_else(|| SettingsError::not_traversable(path, key.as_str()))?;
            let key = self.existing_key(index, key, map);
            let fill = if index + 1 < self.keys.len() {
                Value::Object(Map::new())
            } else {
                Value::Null
            };
            node = map.entry(key).or_insert(fill);
        }
        Ok(node)
    }

    fn existing_key(&self, index: usize, key: &str, map: &Map<String, Value>) -> String {
        let in_map = self.map_start.is_some_and(|start| index >= start);
        if in_map && self.map_keys == MapKeys::Lowercase && !map.contains_key(key) {
            if let Some(existing) = map.keys().find(|existing| existing.to_lowercase() == key) {
                return existing.clone();
            }
        }
        key.to_string()
    }
}

/// Match `segments` against `schema`.
///
/// `path` is the caller-facing name used in errors.
///
/// # Errors
///
/// Returns [`SettingsError::PathNotFound`] if a segment matches no field of a
/// closed model and [`SettingsError::NotTraversable`] if a segment follows a
/// scalar or list field.
pub fn resolve<'s, 'a, I>(
    schema: &'s ModelSchema,
    path: &str,
    segments: I,
    map_keys: MapKeys,
) -> Result<ResolvedPath<'s>, SettingsError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut keys = Vec::new();
    let mut target = Target::Root(schema);
    let mut map_start = None;

    for segment in segments {
        target = match target.node() {
            Node::Closed(model) => {
                let field = model
                    .field(segment)
                    .ok_or_else(|| SettingsError::path_not_found(path, segment))?;
                keys.push(field.name().to_string());
                Target::Field(field)
            }
            Node::Open(field) => {
                if map_start.is_none() {
                    map_start = Some(keys.len());
                }
                keys.push(map_keys.key(segment));
                Target::MapEntry(field)
            }
            Node::Leaf => return Err(SettingsError::not_traversable(path, segment)),
        };
    }

    Ok(ResolvedPath {
        keys,
        target,
        map_keys,
        map_start,
    })
}

/// Resolve an environment variable name such as `VISYN_CORE__LOGGING__VERSION`.
///
/// Keys inside open maps are lowercased, unless the tree being written
/// already holds a key that matches ignoring case.
///
/// # Errors
///
/// See [`resolve`].
pub fn resolve_env<'s>(schema: &'s ModelSchema, var: &str) -> Result<ResolvedPath<'s>, SettingsError> {
    resolve(schema, var, var.split(ENV_DELIMITER), MapKeys::Lowercase)
}

/// Resolve a dotted path such as `visyn_core.logging.version`.
///
/// Keys inside open maps are matched exactly.
///
/// # Errors
///
/// See [`resolve`].
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use visyn_settings_core::{resolve_dotted, Field, ModelSchema};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let schema = ModelSchema::builder("Settings")
///     .field(Field::map("logging", json!({"root": {"level": "INFO"}})))
///     .build()?;
/// let tree = schema.defaults();
///
/// let path = resolve_dotted(&schema, "LOGGING.root.level")?;
/// assert_eq!(path.lookup("LOGGING.root.level", &tree)?, &json!("INFO"));
/// # Ok(())
/// # }
/// ```
pub fn resolve_dotted<'s>(
    schema: &'s ModelSchema,
    path: &str,
) -> Result<ResolvedPath<'s>, SettingsError> {
    resolve(schema, path, path.split(PATH_SEPARATOR), MapKeys::Exact)
}

fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base_slot, overlay_value) => {
            *base_slot = overlay_value;
        }
    }
}
