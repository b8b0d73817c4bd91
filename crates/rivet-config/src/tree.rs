//! The configuration tree: three well-known sections plus dot-path access.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::{merge, path};

/// Section holding plain data parameters.
pub const PARAMETERS: &str = "parameters";
/// Section holding definitions built once and cached.
pub const SHARED: &str = "shared";
/// Section holding definitions rebuilt on every request.
pub const MULTIPLE: &str = "multiple";

/// Nested configuration backing a service container.
///
/// The tree is a JSON object with three well-known top-level sections,
/// `parameters`, `shared` and `multiple`, which always exist even when
/// empty. Additional top-level keys are carried along untouched. Partial
/// trees can be layered in with [`merge`](ConfigTree::merge), and the
/// `parameters` section is addressable by dot-separated paths.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigTree {
    root: Map<String, Value>,
}

impl ConfigTree {
    /// Creates an empty tree with the three sections seeded.
    pub fn new() -> Self {
        let mut tree = ConfigTree { root: Map::new() };
        tree.ensure_sections();
        tree
    }

    /// Builds a tree from a JSON object, seeding any missing section.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(root) => {
                let mut tree = ConfigTree { root };
                tree.ensure_sections();
                Ok(tree)
            }
            other => Err(ConfigError::NotAnObject {
                kind: value_kind(&other),
            }),
        }
    }

    /// Deep-merges a partial configuration into this tree.
    ///
    /// Incoming objects merge key by key; scalars and arrays in the partial
    /// overwrite whatever the tree held at the same spot. See
    /// [`deep_merge`](crate::merge::deep_merge) for the exact rules.
    pub fn merge(&mut self, partial: Value) -> Result<()> {
        let incoming = match partial {
            Value::Object(map) => map,
            other => {
                return Err(ConfigError::NotAnObject {
                    kind: value_kind(&other),
                })
            }
        };
        for (key, value) in incoming {
            match self.root.get_mut(&key) {
                Some(slot) => merge::deep_merge(slot, value),
                None => {
                    self.root.insert(key, value);
                }
            }
        }
        self.ensure_sections();
        debug!(
            "Merged configuration: {} shared, {} multiple definitions",
            self.shared_section().map_or(0, Map::len),
            self.multiple_section().map_or(0, Map::len)
        );
        Ok(())
    }

    /// Reads the parameter at a dot-separated path, or `None` when any
    /// segment is missing.
    pub fn parameter(&self, path_expr: &str) -> Option<&Value> {
        path::walk(self.root.get(PARAMETERS)?, path_expr)
    }

    /// Reads the parameter at a path, falling back to `default`.
    pub fn parameter_or(&self, path_expr: &str, default: Value) -> Value {
        self.parameter(path_expr).cloned().unwrap_or(default)
    }

    /// Writes a parameter at a dot-separated path, creating missing
    /// intermediate objects.
    ///
    /// The final segment always overwrites; descending through an existing
    /// non-object value fails with [`ConfigError::ScalarInPath`].
    pub fn set_parameter(&mut self, path_expr: &str, value: Value) -> Result<()> {
        let section = self
            .root
            .entry(PARAMETERS.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        let map = match section {
            Value::Object(map) => map,
            _ => {
                return Err(ConfigError::ScalarInPath {
                    segment: PARAMETERS.to_string(),
                    path: path_expr.to_string(),
                })
            }
        };
        path::set(map, path_expr, value)
    }

    /// Raw definition under `shared`, if present.
    pub fn shared_definition(&self, id: &str) -> Option<&Value> {
        self.root.get(SHARED)?.get(id)
    }

    /// Raw definition under `multiple`, if present.
    pub fn multiple_definition(&self, id: &str) -> Option<&Value> {
        self.root.get(MULTIPLE)?.get(id)
    }

    /// The `parameters` section as a map, when it is one.
    pub fn parameters_section(&self) -> Option<&Map<String, Value>> {
        self.root.get(PARAMETERS)?.as_object()
    }

    /// The `shared` section as a map, when it is one.
    pub fn shared_section(&self) -> Option<&Map<String, Value>> {
        self.root.get(SHARED)?.as_object()
    }

    /// The `multiple` section as a map, when it is one.
    pub fn multiple_section(&self) -> Option<&Map<String, Value>> {
        self.root.get(MULTIPLE)?.as_object()
    }

    /// Snapshot of the whole tree as a JSON value.
    pub fn as_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    // Sections are guaranteed to exist; merges and deserialization restore
    // any that a partial dropped.
    fn ensure_sections(&mut self) {
        for name in [PARAMETERS, SHARED, MULTIPLE] {
            self.root
                .entry(name.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
    }
}

impl Default for ConfigTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for ConfigTree {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.root.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ConfigTree {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let root = Map::<String, Value>::deserialize(deserializer)?;
        let mut tree = ConfigTree { root };
        tree.ensure_sections();
        Ok(tree)
    }
}

/// Human-readable JSON kind, for error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
