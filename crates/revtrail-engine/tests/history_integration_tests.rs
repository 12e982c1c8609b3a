#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{DateTime, TimeZone, Utc};
use revtrail_core::config::{DiffConfig, Language};
use revtrail_core::errors::ExErrorKind;
use revtrail_core::ChangeKind;
use revtrail_core_types::{RequestContext, RequestId};
use revtrail_engine::commands::engine_command::{
    apply_engine_command, EngineCommand, EngineCommandResult,
};
use revtrail_engine::commands::engine_query::{apply_engine_query, EngineQuery, EngineQueryResult};
use revtrail_engine::commands::history::{revision_history, HistoryRequest};
use revtrail_engine::commands::revision::{capture_mutation_at, fetch_revisions};
use revtrail_store::db::{open_ledger, open_ledger_in_memory};
use rusqlite::Connection;
use serde_json::{json, Value};
use tempfile::TempDir;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_704_067_200 + secs, 0).unwrap()
}

fn en() -> DiffConfig {
    DiffConfig::default().with_language(Language::En)
}

fn contract(company: &str, status: &str) -> Value {
    json!({
        "id": "contract-1",
        "contractNumber": "HD-001",
        "companyName": company,
        "status": status,
        "resellerId": "r-1",
        "startDate": "2024-01-15"
    })
}

/// Three real edits and one noise-only edit for contract-1
fn seed(conn: &Connection) {
    let v1 = contract("Cong Ty Cu", "draft");
    let v2 = contract("Cong Ty Moi", "draft");
    let v3 = contract("Cong Ty Moi", "active");
    let mut v4 = v3.clone();
    v4["resellerId"] = json!("r-2");
    v4["startDate"] = json!("2024-01-15T00:00:00Z");
    let v5 = contract("Cong Ty Moi", "terminated");

    capture_mutation_at(conn, "contract", "contract-1", &v1, &v2, at(10)).unwrap();
    capture_mutation_at(conn, "contract", "contract-1", &v2, &v3, at(20)).unwrap();
    capture_mutation_at(conn, "contract", "contract-1", &v3, &v4, at(30)).unwrap();
    capture_mutation_at(conn, "contract", "contract-1", &v4, &v5, at(40)).unwrap();
}

#[test]
fn test_history_groups_newest_first_and_hides_noise() {
    let conn = open_ledger_in_memory().unwrap();
    seed(&conn);

    let page = revision_history(&conn, &HistoryRequest::new("contract-1"), &en()).unwrap();

    // the noise-only revision is stored but not shown
    assert_eq!(page.total_count, 4);
    let stamps: Vec<DateTime<Utc>> = page.items.iter().map(|g| g.timestamp).collect();
    assert_eq!(stamps, vec![at(40), at(20), at(10)]);

    let oldest = &page.items[2];
    assert_eq!(oldest.summary, "Company name");
    assert_eq!(oldest.changes[0].old_value, json!("Cong Ty Cu"));
    assert_eq!(oldest.changes[0].new_value, json!("Cong Ty Moi"));
}

#[test]
fn test_history_filter_keeps_matching_groups_whole() {
    let conn = open_ledger_in_memory().unwrap();
    seed(&conn);

    let request = HistoryRequest::new("contract-1").filter("TERMINATED");
    let page = revision_history(&conn, &request, &en()).unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].timestamp, at(40));
    // counts stay the store's
    assert_eq!(page.total_count, 4);
}

#[test]
fn test_history_search_runs_in_store() {
    let conn = open_ledger_in_memory().unwrap();
    seed(&conn);

    let request = HistoryRequest::new("contract-1").search("cong ty cu");
    let page = revision_history(&conn, &request, &en()).unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items.len(), 1);
}

#[test]
fn test_malformed_stored_snapshot_is_opaque_in_history() {
    let conn = open_ledger_in_memory().unwrap();
    conn.execute(
        "INSERT INTO revisions (entity_type, entity_id, before_snapshot, after_snapshot, created_at)
         VALUES ('contract', 'legacy-1', 'v1|Cong Ty Cu', '{\"companyName\":\"x\"}', 1000)",
        [],
    )
    .unwrap();

    let page = revision_history(&conn, &HistoryRequest::new("legacy-1"), &en()).unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].changes[0].kind, ChangeKind::Opaque);
    assert_eq!(page.items[0].summary, "Raw snapshot");
}

#[test]
fn test_fetch_rejects_oversized_page() {
    let conn = open_ledger_in_memory().unwrap();
    let err = fetch_revisions(&conn, "contract-1", 1, 1000, None).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
}

#[test]
fn test_engine_query_and_command_round() {
    let dir = TempDir::new().unwrap();
    let conn = open_ledger(dir.path().join("audit.db")).unwrap();
    let ctx = RequestContext::with_request_id(RequestId::from_string("req-test-1".to_string()));

    let captured = apply_engine_command(
        EngineCommand::CaptureMutation {
            entity_type: "reseller".to_string(),
            entity_id: "r-1".to_string(),
            before: json!({"id": "r-1", "companyName": "Dai Ly A"}),
            after: json!({"id": "r-1", "companyName": "Dai Ly B"}),
        },
        &conn,
        &ctx,
    )
    .unwrap();
    let record = match captured {
        EngineCommandResult::Captured(Some(record)) => record,
        other => panic!("unexpected result: {:?}", other),
    };

    let result = apply_engine_query(
        EngineQuery::RevisionPage(HistoryRequest::new("r-1")),
        &conn,
        &en(),
        &ctx,
    )
    .unwrap();
    match result {
        EngineQueryResult::RevisionPage(page) => assert_eq!(page.items, vec![record.clone()]),
        other => panic!("unexpected result: {:?}", other),
    }

    let deleted = apply_engine_command(
        EngineCommand::DeleteRevision {
            revision_id: record.id,
        },
        &conn,
        &ctx,
    )
    .unwrap();
    assert_eq!(
        deleted,
        EngineCommandResult::Deleted {
            revision_id: record.id
        }
    );

    let err = apply_engine_command(
        EngineCommand::DeleteRevision {
            revision_id: record.id,
        },
        &conn,
        &ctx,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert_eq!(err.request_id().map(|r| r.as_str()), Some("req-test-1"));
}

#[test]
fn test_engine_query_error_carries_request_id() {
    let conn = open_ledger_in_memory().unwrap();
    let ctx = RequestContext::new();
    let err = apply_engine_query(
        EngineQuery::RevisionHistory(HistoryRequest::new("c-1").page(0, 10)),
        &conn,
        &en(),
        &ctx,
    )
    .unwrap_err();
    assert_eq!(err.request_id(), Some(&ctx.request_id));
}
