//! Capture guard: record a revision only when a mutation changed something.
//!
//! Audit is best-effort. A failure to canonicalize or persist never reaches
//! the caller's mutation; it is logged once as an `end_error` event for
//! `capture_revision` and the guard returns `None`.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::errors::{AuditError, ExError};
use crate::model::{Auditable, NewRevision, RevisionRecord};
use crate::snapshot::{canonicalize, canonicalize_value, snapshot_digest, CanonicalOptions};
use crate::store::RevisionRepository;
use crate::{log_op_end, log_op_error, log_op_start};

const OP: &str = "capture_revision";

/// Wraps a revision repository with the skip-if-unchanged decision
pub struct CaptureGuard<'a, R: RevisionRepository + ?Sized> {
    repo: &'a R,
    options: CanonicalOptions,
}

impl<'a, R: RevisionRepository + ?Sized> CaptureGuard<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self {
            repo,
            options: CanonicalOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CanonicalOptions) -> Self {
        self.options = options;
        self
    }

    /// Record `before → after` for a typed entity, stamped now
    pub fn capture<E: Auditable>(&self, before: &E, after: &E) -> Option<RevisionRecord> {
        self.capture_at(before, after, Utc::now())
    }

    /// Record `before → after` with an explicit timestamp
    pub fn capture_at<E: Auditable>(
        &self,
        before: &E,
        after: &E,
        timestamp: DateTime<Utc>,
    ) -> Option<RevisionRecord> {
        self.record(
            E::ENTITY_TYPE,
            &after.audit_id(),
            canonicalize(before, &self.options),
            canonicalize(after, &self.options),
            timestamp,
        )
    }

    /// Record a change of an untyped entity state
    ///
    /// Transient fields of a known `entity_type` are omitted as for the
    /// typed entity.
    pub fn capture_values(
        &self,
        entity_type: &str,
        entity_id: &str,
        before: &Value,
        after: &Value,
    ) -> Option<RevisionRecord> {
        self.capture_values_at(entity_type, entity_id, before, after, Utc::now())
    }

    pub fn capture_values_at(
        &self,
        entity_type: &str,
        entity_id: &str,
        before: &Value,
        after: &Value,
        timestamp: DateTime<Utc>,
    ) -> Option<RevisionRecord> {
        let options = self.options.clone().with_entity_type(entity_type);
        self.record(
            entity_type,
            entity_id,
            canonicalize_value(before, &options),
            canonicalize_value(after, &options),
            timestamp,
        )
    }

    /// Run a mutation between the two snapshots
    ///
    /// The mutation's result is returned unchanged. Nothing is recorded when
    /// the mutation fails.
    ///
    /// # Errors
    ///
    /// Only the mutation's own error; audit failures are swallowed.
    pub fn apply_audited<E, T, Err, F>(&self, entity: &mut E, mutate: F) -> Result<T, Err>
    where
        E: Auditable,
        F: FnOnce(&mut E) -> Result<T, Err>,
    {
        let before = canonicalize(entity, &self.options);
        let output = mutate(entity)?;
        let after = canonicalize(entity, &self.options);
        self.record(E::ENTITY_TYPE, &entity.audit_id(), before, after, Utc::now());
        Ok(output)
    }

    fn record(
        &self,
        entity_type: &str,
        entity_id: &str,
        before: crate::errors::Result<String>,
        after: crate::errors::Result<String>,
        timestamp: DateTime<Utc>,
    ) -> Option<RevisionRecord> {
        let start = Instant::now();
        log_op_start!(OP, entity_type = entity_type, entity_id = entity_id);

        let result = self.try_record(entity_type, entity_id, before, after, timestamp);
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Some(record)) => {
                let before_digest = snapshot_digest(&record.before_snapshot);
                let after_digest = snapshot_digest(&record.after_snapshot);
                let snapshot_len = record.after_snapshot.len() as u64;
                log_op_end!(
                    OP,
                    duration_ms = duration_ms,
                    entity_id = entity_id,
                    revision_id = record.id,
                    recorded = true,
                    before_digest = before_digest.as_str(),
                    after_digest = after_digest.as_str(),
                    snapshot_len = snapshot_len
                );
                Some(record)
            }
            Ok(None) => {
                log_op_end!(
                    OP,
                    duration_ms = duration_ms,
                    entity_id = entity_id,
                    recorded = false
                );
                None
            }
            Err(err) => {
                log_op_error!(OP, err, duration_ms = duration_ms, entity_id = entity_id);
                None
            }
        }
    }

    fn try_record(
        &self,
        entity_type: &str,
        entity_id: &str,
        before: crate::errors::Result<String>,
        after: crate::errors::Result<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<RevisionRecord>, ExError> {
        let context = |e: AuditError| ExError::from(e).with_op(OP).with_entity_id(entity_id);
        if entity_id.trim().is_empty() {
            return Err(context(AuditError::EmptyEntityId));
        }
        let before = before.map_err(context)?;
        let after = after.map_err(context)?;

        if before == after {
            return Ok(None);
        }

        let revision = NewRevision::new(entity_type, entity_id, before, after, timestamp);
        self.repo
            .append(revision)
            .map(Some)
            .map_err(|e| e.with_op(OP).with_entity_id(entity_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Contract;
    use crate::store::MemoryRevisionStore;

    #[test]
    fn test_unchanged_entity_is_not_recorded() {
        let store = MemoryRevisionStore::new();
        let guard = CaptureGuard::new(&store);
        let contract = Contract::new("c-1", "HD-001", "Cong Ty Cu");

        assert!(guard.capture(&contract, &contract.clone()).is_none());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_changed_entity_is_recorded() {
        let store = MemoryRevisionStore::new();
        let guard = CaptureGuard::new(&store);
        let before = Contract::new("c-1", "HD-001", "Cong Ty Cu");
        let mut after = before.clone();
        after.company_name = "Cong Ty Moi".into();

        let record = guard.capture(&before, &after).unwrap();
        assert_eq!(record.entity_type, "contract");
        assert_eq!(record.entity_id, "c-1");
        assert!(record.after_snapshot.contains("Cong Ty Moi"));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_lazy_collection_does_not_count_as_change() {
        let store = MemoryRevisionStore::new();
        let guard = CaptureGuard::new(&store);
        let before = Contract::new("c-1", "HD-001", "Cong Ty Cu");
        let mut after = before.clone();
        after.orders = Some(vec![crate::model::Order::new("o-1", "DH-1")]);

        assert!(guard.capture(&before, &after).is_none());
    }

    #[test]
    fn test_failed_mutation_records_nothing() {
        let store = MemoryRevisionStore::new();
        let guard = CaptureGuard::new(&store);
        let mut contract = Contract::new("c-1", "HD-001", "Cong Ty Cu");

        let result: Result<(), String> = guard.apply_audited(&mut contract, |c| {
            c.status = "active".into();
            Err("constraint violated".into())
        });
        assert!(result.is_err());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_apply_audited_returns_mutation_output() {
        let store = MemoryRevisionStore::new();
        let guard = CaptureGuard::new(&store);
        let mut contract = Contract::new("c-1", "HD-001", "Cong Ty Cu");

        let result: Result<u32, String> = guard.apply_audited(&mut contract, |c| {
            c.status = "active".into();
            Ok(7)
        });
        assert_eq!(result, Ok(7));
        assert_eq!(store.len().unwrap(), 1);
    }
}
