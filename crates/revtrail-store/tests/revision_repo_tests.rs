#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{DateTime, TimeZone, Utc};
use revtrail_core::{
    ExErrorKind, NewRevision, RevisionQuery, RevisionRepository,
};
use revtrail_store::db::{open_ledger, open_ledger_in_memory};
use revtrail_store::SqliteRevisionRepository;
use tempfile::TempDir;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_704_067_200 + secs, 0).unwrap()
}

fn rev(entity_id: &str, secs: i64, after: &str) -> NewRevision {
    NewRevision::new("contract", entity_id, "{}", after, at(secs))
}

#[test]
fn test_page_is_newest_first_with_id_tiebreak() {
    let conn = open_ledger_in_memory().unwrap();
    let repo = SqliteRevisionRepository::new(&conn).unwrap();

    let r1 = repo.append(rev("c-1", 10, r#"{"v":1}"#)).unwrap();
    let r2 = repo.append(rev("c-1", 30, r#"{"v":2}"#)).unwrap();
    let r3 = repo.append(rev("c-1", 30, r#"{"v":3}"#)).unwrap();
    repo.append(rev("c-2", 99, r#"{"v":4}"#)).unwrap();

    let page = repo.page(&RevisionQuery::new("c-1", 1, 10)).unwrap();
    let ids: Vec<i64> = page.items.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![r3.id, r2.id, r1.id]);
    assert_eq!(page.total_count, 3);
    assert_eq!(page.total_pages, 1);
}

#[test]
fn test_paging_math() {
    let conn = open_ledger_in_memory().unwrap();
    let repo = SqliteRevisionRepository::new(&conn).unwrap();
    for i in 0..7 {
        repo.append(rev("c-1", i, &format!(r#"{{"v":{}}}"#, i))).unwrap();
    }

    let page = repo.page(&RevisionQuery::new("c-1", 2, 3)).unwrap();
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.total_count, 7);
    assert_eq!(page.total_pages, 3);
    // newest first: page 2 holds v=3, v=2, v=1
    assert_eq!(page.items[0].after_snapshot, r#"{"v":3}"#);

    let last = repo.page(&RevisionQuery::new("c-1", 3, 3)).unwrap();
    assert_eq!(last.items.len(), 1);

    let past_end = repo.page(&RevisionQuery::new("c-1", 9, 3)).unwrap();
    assert!(past_end.items.is_empty());
    assert_eq!(past_end.total_count, 7);
    assert_eq!(past_end.total_pages, 3);
}

#[test]
fn test_search_is_case_insensitive_over_both_snapshots() {
    let conn = open_ledger_in_memory().unwrap();
    let repo = SqliteRevisionRepository::new(&conn).unwrap();

    repo.append(NewRevision::new(
        "contract",
        "c-1",
        r#"{"companyName":"Công Ty Cũ"}"#,
        r#"{"companyName":"Công Ty Mới"}"#,
        at(1),
    ))
    .unwrap();
    repo.append(rev("c-1", 2, r#"{"status":"ACTIVE"}"#)).unwrap();

    let query = |text: &str| RevisionQuery::new("c-1", 1, 10).with_search(Some(text.to_string()));

    assert_eq!(repo.page(&query("CÔNG TY CŨ")).unwrap().total_count, 1);
    assert_eq!(repo.page(&query("  active ")).unwrap().total_count, 1);
    assert_eq!(repo.page(&query("companyname")).unwrap().total_count, 1);
    assert_eq!(repo.page(&query("   ")).unwrap().total_count, 2);
    assert_eq!(repo.page(&query("nothing")).unwrap().total_count, 0);
}

#[test]
fn test_invalid_paging_is_invalid_input() {
    let conn = open_ledger_in_memory().unwrap();
    let repo = SqliteRevisionRepository::new(&conn).unwrap();

    for query in [
        RevisionQuery::new("c-1", 0, 10),
        RevisionQuery::new("c-1", 1, 0),
        RevisionQuery::new("c-1", 1, 501),
    ] {
        let err = repo.page(&query).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    }
}

#[test]
fn test_delete_by_id() {
    let conn = open_ledger_in_memory().unwrap();
    let repo = SqliteRevisionRepository::new(&conn).unwrap();
    let r = repo.append(rev("c-1", 1, "{}")).unwrap();

    assert!(repo.delete(r.id).unwrap());
    assert!(!repo.delete(r.id).unwrap());
    assert_eq!(repo.get(r.id).unwrap(), None);
}

#[test]
fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.db");

    let stored = {
        let conn = open_ledger(&path).unwrap();
        let repo = SqliteRevisionRepository::new(&conn).unwrap();
        repo.append(rev("c-1", 42, r#"{"status":"active"}"#)).unwrap()
    };

    let conn = open_ledger(&path).unwrap();
    let repo = SqliteRevisionRepository::new(&conn).unwrap();
    let fetched = repo.get(stored.id).unwrap().unwrap();
    assert_eq!(fetched, stored);
    assert_eq!(fetched.timestamp, at(42));
}

#[test]
fn test_blank_entity_id_is_rejected() {
    let conn = open_ledger_in_memory().unwrap();
    let repo = SqliteRevisionRepository::new(&conn).unwrap();
    let err = repo.append(rev("  ", 1, "{}")).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
}
