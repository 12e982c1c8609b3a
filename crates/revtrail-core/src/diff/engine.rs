//! Revision diff computation engine.
//!
//! The core entry point is [`build_groups`], which turns a page of stored
//! revision records into presentation groups.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::config::DiffConfig;
use crate::diff::flatten::{flatten, FlattenOptions};
use crate::diff::format::{format_value, FormatOptions};
use crate::diff::labels::{resolve_label, summarize, EMPTY_LABEL, OPAQUE_LABEL};
use crate::diff::model::{ChangeItem, ChangeKind, RevisionGroup};
use crate::diff::normalize::normalize_leaf;
use crate::model::RevisionRecord;
use revtrail_core_types::schema::EVENT_SKIPPED;

/// Parse a snapshot into a tree root; scalars and malformed text are `None`
fn parse_tree(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Some(value),
        _ => None,
    }
}

/// Compare two snapshot texts
///
/// Never fails: unparseable input yields a single opaque item, and a pair
/// without structured changes yields the single empty sentinel. Items are
/// ordered by path.
pub fn diff_snapshots(
    before: &str,
    after: &str,
    entity_type: &str,
    config: &DiffConfig,
) -> Vec<ChangeItem> {
    let language = config.language;
    let (before_tree, after_tree) = match (parse_tree(before), parse_tree(after)) {
        (Some(b), Some(a)) => (b, a),
        _ => {
            return vec![ChangeItem::opaque(
                before,
                after,
                OPAQUE_LABEL.get(language),
            )]
        }
    };

    let noise = config.noise_for(entity_type);
    let options = FlattenOptions {
        max_depth: config.max_depth,
        array_fan_out: config.array_fan_out,
        noise,
    };
    let before_leaves = flatten(&before_tree, &options);
    let after_leaves = flatten(&after_tree, &options);

    let paths: BTreeSet<&String> = before_leaves.keys().chain(after_leaves.keys()).collect();
    let changes: Vec<ChangeItem> = paths
        .into_iter()
        .filter_map(|path| {
            let old = before_leaves.get(path);
            let new = after_leaves.get(path);
            if normalize_leaf(path, old, noise) == normalize_leaf(path, new, noise) {
                return None;
            }
            Some(ChangeItem::structured(
                path.clone(),
                resolve_label(path, &config.labels, language),
                old.cloned().unwrap_or(Value::Null),
                new.cloned().unwrap_or(Value::Null),
            ))
        })
        .collect();

    if changes.is_empty() {
        return vec![ChangeItem::empty(EMPTY_LABEL.get(language))];
    }
    changes
}

/// Build the presentation group for one record
pub fn build_group(record: &RevisionRecord, config: &DiffConfig) -> RevisionGroup {
    let changes = diff_snapshots(
        &record.before_snapshot,
        &record.after_snapshot,
        &record.entity_type,
        config,
    );
    let labels: Vec<String> = changes
        .iter()
        .filter(|c| c.kind != ChangeKind::Empty)
        .map(|c| c.label.clone())
        .collect();

    RevisionGroup {
        revision_id: record.id,
        timestamp: record.timestamp,
        entity_type: record.entity_type.clone(),
        entity_id: record.entity_id.clone(),
        summary: summarize(&labels, config.summary_labels),
        changes,
    }
}

/// Build groups newest first, dropping records with no visible change
///
/// Dropped records stay in storage; only the presentation skips them.
pub fn build_groups(records: &[RevisionRecord], config: &DiffConfig) -> Vec<RevisionGroup> {
    let mut groups: Vec<RevisionGroup> = records
        .iter()
        .map(|record| build_group(record, config))
        .filter(|group| {
            if group.is_empty_only() {
                tracing::debug!(
                    component = module_path!(),
                    op = "build_groups",
                    event = EVENT_SKIPPED,
                    revision_id = group.revision_id,
                );
                return false;
            }
            true
        })
        .collect();

    groups.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then(b.revision_id.cmp(&a.revision_id))
    });
    groups
}

/// Keep groups with at least one item matching `text`
///
/// Matching is case-insensitive over labels and formatted old/new values
/// (raw texts for opaque items). Matching groups are kept whole. Blank text
/// keeps everything.
pub fn filter_groups(
    groups: Vec<RevisionGroup>,
    text: Option<&str>,
    config: &DiffConfig,
) -> Vec<RevisionGroup> {
    let needle = match text.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => t.to_lowercase(),
        None => return groups,
    };
    let options = FormatOptions::from_config(config);

    groups
        .into_iter()
        .filter(|group| {
            group
                .changes
                .iter()
                .any(|item| item_matches(item, &needle, &options))
        })
        .collect()
}

fn item_matches(item: &ChangeItem, needle: &str, options: &FormatOptions) -> bool {
    if item.label.to_lowercase().contains(needle) {
        return true;
    }
    let haystacks: Vec<String> = match item.kind {
        ChangeKind::Structured => vec![
            format_value(&item.old_value, &item.path, options).text,
            format_value(&item.new_value, &item.path, options).text,
        ],
        ChangeKind::Opaque => [&item.old_value, &item.new_value]
            .iter()
            .map(|v| v.as_str().unwrap_or_default().to_string())
            .collect(),
        ChangeKind::Empty => Vec::new(),
    };
    haystacks
        .iter()
        .any(|h| h.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(id: i64, secs: i64, before: &str, after: &str) -> RevisionRecord {
        RevisionRecord {
            id,
            entity_type: "contract".into(),
            entity_id: "c-1".into(),
            before_snapshot: before.into(),
            after_snapshot: after.into(),
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
        }
    }

    #[test]
    fn test_scalar_root_is_opaque() {
        let config = DiffConfig::default();
        let items = diff_snapshots("42", "43", "contract", &config);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, ChangeKind::Opaque);
        assert_eq!(items[0].old_value, "42");
    }

    #[test]
    fn test_removed_field_has_null_new_value() {
        let config = DiffConfig::default();
        let items = diff_snapshots(r#"{"note":"x"}"#, r#"{}"#, "contract", &config);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].new_value, Value::Null);
    }

    #[test]
    fn test_summary_counts_remaining_labels() {
        let config = DiffConfig::default();
        let group = build_group(
            &record(1, 1, r#"{"a":1,"b":1,"c":1,"d":1}"#, r#"{"a":2,"b":2,"c":2,"d":2}"#),
            &config,
        );
        assert_eq!(group.summary, "A, B, C +1");
    }

    #[test]
    fn test_filter_keeps_whole_group() {
        let config = DiffConfig::default();
        let groups = build_groups(
            &[record(
                1,
                1,
                r#"{"companyName":"Cong Ty Cu","status":"draft"}"#,
                r#"{"companyName":"Cong Ty Moi","status":"active"}"#,
            )],
            &config,
        );
        let kept = filter_groups(groups, Some("  MOI "), &config);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].changes.len(), 2);
    }
}
