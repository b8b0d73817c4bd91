//! Dot-separated path access into nested JSON values.
//!
//! Paths like `db.pool.max` address nested object keys. Reads walk the
//! tree and give up on the first missing or non-object segment; writes
//! create missing intermediate objects as they go.

use serde_json::{Map, Value};

use crate::error::{ConfigError, Result};

/// Walks `root` along the dot-separated `path` and returns the node at the
/// end, or `None` if any segment is missing or lands on a non-object.
pub fn walk<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Sets `value` at `path` inside `root`, creating intermediate objects for
/// missing segments.
///
/// The final segment is always assigned, creating or overwriting whatever
/// was there. An intermediate segment that already holds a non-object value
/// fails with [`ConfigError::ScalarInPath`]; intermediates created before
/// the failing segment stay in place.
pub fn set(root: &mut Map<String, Value>, path: &str, value: Value) -> Result<()> {
    let mut current = root;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), value);
            return Ok(());
        }
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        current = match slot {
            Value::Object(map) => map,
            _ => {
                return Err(ConfigError::ScalarInPath {
                    segment: segment.to_string(),
                    path: path.to_string(),
                })
            }
        };
    }
    Ok(())
}
