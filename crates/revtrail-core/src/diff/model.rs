//! Revision diff output types.
//!
//! All types implement `Debug, Clone, Serialize, Deserialize, PartialEq`.
//! None of them are persisted; they are rebuilt from stored snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a change item was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// A leaf whose normalized values differ
    Structured,
    /// The snapshots could not be parsed into a tree
    Opaque,
    /// No structured change survived filtering
    Empty,
}

/// One displayed change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeItem {
    /// Dotted/indexed address into the flattened tree (`orders[0].status`)
    pub path: String,
    pub label: String,
    /// Raw leaf value before the change; `null` when absent
    pub old_value: Value,
    /// Raw leaf value after the change; `null` when absent
    pub new_value: Value,
    pub kind: ChangeKind,
}

impl ChangeItem {
    pub fn structured(
        path: impl Into<String>,
        label: impl Into<String>,
        old_value: Value,
        new_value: Value,
    ) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
            old_value,
            new_value,
            kind: ChangeKind::Structured,
        }
    }

    /// Both raw snapshot texts, verbatim
    pub fn opaque(before: &str, after: &str, label: impl Into<String>) -> Self {
        Self {
            path: String::new(),
            label: label.into(),
            old_value: Value::String(before.to_string()),
            new_value: Value::String(after.to_string()),
            kind: ChangeKind::Opaque,
        }
    }

    pub fn empty(label: impl Into<String>) -> Self {
        Self {
            path: String::new(),
            label: label.into(),
            old_value: Value::Null,
            new_value: Value::Null,
            kind: ChangeKind::Empty,
        }
    }
}

/// All changes of one revision record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionGroup {
    pub revision_id: i64,
    pub timestamp: DateTime<Utc>,
    pub entity_type: String,
    pub entity_id: String,
    pub summary: String,
    pub changes: Vec<ChangeItem>,
}

impl RevisionGroup {
    /// True when the group carries no structured or opaque change
    pub fn is_empty_only(&self) -> bool {
        self.changes.iter().all(|c| c.kind == ChangeKind::Empty)
    }
}
