//! Recursive configuration merging.

use serde_json::Value;

/// Deep-merges `incoming` into `dest`.
///
/// When both sides are objects the merge recurses key by key, so sibling
/// keys in `dest` survive. Every other pairing overwrites `dest` with
/// `incoming` wholesale, arrays included.
pub fn deep_merge(dest: &mut Value, incoming: Value) {
    match (dest, incoming) {
        (Value::Object(dest_map), Value::Object(incoming_map)) => {
            for (key, value) in incoming_map {
                match dest_map.get_mut(&key) {
                    Some(slot) => deep_merge(slot, value),
                    None => {
                        dest_map.insert(key, value);
                    }
                }
            }
        }
        (dest, incoming) => *dest = incoming,
    }
}
