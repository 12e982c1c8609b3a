//! Entity → canonical snapshot text.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::errors::Result;
use crate::model::{transient_fields_for, Auditable};

/// Objects nested deeper than this are replaced by `null`
pub const DEFAULT_NESTING_CAP: usize = 32;

/// Canonicalization options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalOptions {
    /// Field names removed at every depth, in addition to the entity's
    /// declared transient fields
    pub omit_fields: Vec<String>,
    pub nesting_cap: usize,
}

impl Default for CanonicalOptions {
    fn default() -> Self {
        Self {
            omit_fields: Vec::new(),
            nesting_cap: DEFAULT_NESTING_CAP,
        }
    }
}

impl CanonicalOptions {
    pub fn omit(mut self, field: impl Into<String>) -> Self {
        self.omit_fields.push(field.into());
        self
    }

    /// Also omit the declared transient fields of a known aggregate kind
    pub fn with_entity_type(mut self, entity_type: &str) -> Self {
        for field in transient_fields_for(entity_type) {
            if !self.omit_fields.iter().any(|f| f == field) {
                self.omit_fields.push((*field).to_string());
            }
        }
        self
    }
}

/// Canonicalize an auditable entity
///
/// # Errors
///
/// `Serialization` when the entity cannot be represented as JSON (e.g. a map
/// with non-string keys).
pub fn canonicalize<E: Auditable>(entity: &E, options: &CanonicalOptions) -> Result<String> {
    let value = serde_json::to_value(entity)?;
    let mut omit: BTreeSet<&str> = E::transient_fields().iter().copied().collect();
    omit.extend(options.omit_fields.iter().map(String::as_str));
    Ok(render(value, &omit, options.nesting_cap))
}

/// Canonicalize an already-serialized entity state
///
/// Only `options.omit_fields` is applied; use
/// [`CanonicalOptions::with_entity_type`] to add a kind's transient fields.
///
/// # Errors
///
/// Returns `Serialization` only if the value cannot be written back out as
/// JSON text.
pub fn canonicalize_value(value: &Value, options: &CanonicalOptions) -> Result<String> {
    let omit: BTreeSet<&str> = options.omit_fields.iter().map(String::as_str).collect();
    Ok(render(value.clone(), &omit, options.nesting_cap))
}

fn render(value: Value, omit: &BTreeSet<&str>, nesting_cap: usize) -> String {
    let mut ancestors = Vec::new();
    let scrubbed = scrub(value, omit, &mut ancestors, 0, nesting_cap);
    // Display on Value is infallible compact JSON
    scrubbed.to_string()
}

/// Identity and key set of an enclosing object
struct Ancestor {
    id: Option<Value>,
    keys: BTreeSet<String>,
}

fn scrub(
    value: Value,
    omit: &BTreeSet<&str>,
    ancestors: &mut Vec<Ancestor>,
    depth: usize,
    nesting_cap: usize,
) -> Value {
    match value {
        Value::Object(map) => {
            if depth >= nesting_cap {
                return Value::Null;
            }
            let map: Map<String, Value> = map
                .into_iter()
                .filter(|(k, _)| !omit.contains(k.as_str()))
                .collect();
            let id = map.get("id").filter(|v| !v.is_null()).cloned();
            let keys: BTreeSet<String> = map.keys().cloned().collect();

            if let Some(id) = &id {
                let is_back_edge = ancestors
                    .iter()
                    .any(|a| a.id.as_ref() == Some(id) && keys.is_subset(&a.keys));
                if is_back_edge {
                    return Value::Null;
                }
            }

            ancestors.push(Ancestor { id, keys });
            let mut entries: Vec<(String, Value)> = map
                .into_iter()
                .map(|(k, v)| {
                    let v = scrub(v, omit, ancestors, depth + 1, nesting_cap);
                    (k, v)
                })
                .collect();
            ancestors.pop();

            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().collect())
        }
        Value::Array(items) => {
            if depth >= nesting_cap {
                return Value::Null;
            }
            Value::Array(
                items
                    .into_iter()
                    .map(|v| scrub(v, omit, ancestors, depth + 1, nesting_cap))
                    .collect(),
            )
        }
        scalar => scalar,
    }
}

/// Recursively sort object keys without removing anything
pub(crate) fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_keys(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        scalar => scalar.clone(),
    }
}
