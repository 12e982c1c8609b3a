use chrono::{DateTime, TimeZone, Utc};
use revtrail_core::RevisionRecord;

/// Fixed instant `secs` seconds after 2024-01-01T00:00:00Z
#[allow(dead_code)]
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_704_067_200 + secs, 0).unwrap()
}

/// A stored contract revision with the given snapshots
#[allow(dead_code)]
pub fn record(id: i64, secs: i64, before: &str, after: &str) -> RevisionRecord {
    RevisionRecord {
        id,
        entity_type: "contract".to_string(),
        entity_id: "contract-1".to_string(),
        before_snapshot: before.to_string(),
        after_snapshot: after.to_string(),
        timestamp: at(secs),
    }
}
