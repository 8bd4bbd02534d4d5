//! Deterministic fingerprints for cacheable operations.
//!
//! A fingerprint is the cache key: the operation identifier concatenated
//! with a canonical rendering of the call arguments. Canonicalization
//! sorts object keys recursively, so two argument sets that are equal as
//! unordered mappings produce the same fingerprint regardless of the
//! order the caller assembled them in. Arrays keep their order —
//! aggregation pipelines are ordered sequences and reordering stages
//! changes the operation.

use serde_json::Value;

/// Compute the cache fingerprint for an operation and its arguments.
///
/// `operation_id` names the logical operation and its target, e.g.
/// `"query:musicgen"` or `"track:6rqhFgbbKwnb9MLmUQDhG6"`. The result is
/// a pure function of its inputs.
pub fn fingerprint(operation_id: &str, args: &Value) -> String {
    let mut out = String::with_capacity(operation_id.len() + 32);
    out.push_str(operation_id);
    out.push('|');
    write_canonical(args, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // Render the key as a JSON string so exotic key characters
                // cannot collide with the separators.
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
