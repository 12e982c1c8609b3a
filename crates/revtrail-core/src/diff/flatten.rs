//! Flatten a snapshot tree into `path → leaf`.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::diff::noise::NoisePolicy;

/// Traversal limits and the noise predicate
#[derive(Debug, Clone, Copy)]
pub struct FlattenOptions<'a> {
    /// A container at this depth is emitted whole as a leaf
    pub max_depth: usize,
    /// Array elements visited per array
    pub array_fan_out: usize,
    pub noise: &'a NoisePolicy,
}

/// Flatten an object or array root
///
/// Noise is checked before a path is descended into or emitted, so no noise
/// path ever appears in the output.
pub fn flatten(root: &Value, options: &FlattenOptions<'_>) -> BTreeMap<String, Value> {
    let mut leaves = BTreeMap::new();
    match root {
        Value::Object(map) => {
            for (key, child) in map {
                visit(key.clone(), child, 1, options, &mut leaves);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().take(options.array_fan_out).enumerate() {
                visit(format!("[{}]", i), child, 1, options, &mut leaves);
            }
        }
        scalar => {
            leaves.insert(String::new(), scalar.clone());
        }
    }
    leaves
}

fn is_leaf(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

fn visit(
    path: String,
    value: &Value,
    depth: usize,
    options: &FlattenOptions<'_>,
    leaves: &mut BTreeMap<String, Value>,
) {
    if options.noise.is_noise(&path) {
        return;
    }
    if is_leaf(value) || depth >= options.max_depth {
        leaves.insert(path, value.clone());
        return;
    }
    match value {
        Value::Object(map) if map.is_empty() => {
            leaves.insert(path, value.clone());
        }
        Value::Object(map) => {
            for (key, child) in map {
                visit(format!("{}.{}", path, key), child, depth + 1, options, leaves);
            }
        }
        Value::Array(items) if items.iter().all(is_leaf) => {
            leaves.insert(path, value.clone());
        }
        Value::Array(items) => {
            for (i, child) in items.iter().take(options.array_fan_out).enumerate() {
                visit(format!("{}[{}]", path, i), child, depth + 1, options, leaves);
            }
        }
        _ => {
            leaves.insert(path, value.clone());
        }
    }
}
