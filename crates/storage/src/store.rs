// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Journal-backed store with crash recovery
//!
//! One mutex guards the journal and the materialized state together, so
//! every mutation is a single append-and-apply critical section. That is
//! what makes `adjust_active` atomic: the read-modify-write on the ledger
//! counter never leaves the lock.

use crate::journal::Journal;
use crate::operation::Operation;
use crate::state::MaterializedState;
use async_trait::async_trait;
use gym_core::config::EngineConfig;
use gym_core::ledger::{LedgerDelta, MembershipLedger, OverconsumptionPolicy};
use gym_core::record::{ClassRecord, MemberId, RecordId, StaffId};
use gym_core::stores::{
    ClassRecordStore, MembershipLedgerStore, MonthlySubmissionStore, StoreError,
};
use gym_core::submission::{MonthlySubmission, YearMonth};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

struct Inner {
    journal: Journal,
    state: MaterializedState,
}

/// Journal-backed implementation of the three store traits
#[derive(Clone)]
pub struct JournalStore {
    inner: Arc<Mutex<Inner>>,
    policy: OverconsumptionPolicy,
}

impl JournalStore {
    /// Open the store described by an engine configuration
    pub fn from_config(config: &EngineConfig) -> Result<Self, StoreError> {
        Self::open(&config.storage.journal_dir, config.ledger.overconsumption)
    }

    /// Open or create a store in the given directory
    pub fn open(dir: &Path, policy: OverconsumptionPolicy) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join("journal.jsonl");

        let entries = Journal::replay(&path).map_err(journal_to_store)?;
        let mut state = MaterializedState::new();
        for entry in &entries {
            state.apply(&entry.operation);
        }
        let journal = Journal::open(&path).map_err(journal_to_store)?;

        Ok(Self {
            inner: Arc::new(Mutex::new(Inner { journal, state })),
            policy,
        })
    }

    /// Record a membership ledger (renewal workflows and test seeding)
    pub fn upsert_ledger(&self, ledger: &MembershipLedger) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let op = Operation::LedgerUpsert {
            ledger: ledger.clone(),
        };
        inner.journal.append(&op).map_err(journal_to_store)?;
        inner.state.apply(&op);
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn journal_to_store(err: crate::journal::JournalError) -> StoreError {
    match err {
        crate::journal::JournalError::Io(e) => StoreError::Io(e),
        crate::journal::JournalError::Json(e) => StoreError::Json(e),
    }
}

#[async_trait]
impl ClassRecordStore for JournalStore {
    async fn get(&self, id: &RecordId) -> Result<ClassRecord, StoreError> {
        let inner = self.lock();
        inner
            .state
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::RecordNotFound(id.clone()))
    }

    async fn upsert(&self, record: &ClassRecord) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let op = Operation::RecordUpsert {
            record: record.clone(),
        };
        inner.journal.append(&op).map_err(journal_to_store)?;
        inner.state.apply(&op);
        Ok(())
    }

    async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if !inner.state.records.contains_key(id) {
            return Err(StoreError::RecordNotFound(id.clone()));
        }
        let op = Operation::RecordDelete { id: id.clone() };
        inner.journal.append(&op).map_err(journal_to_store)?;
        inner.state.apply(&op);
        Ok(())
    }

    async fn list_by_staff(&self, staff_id: &StaffId) -> Result<Vec<ClassRecord>, StoreError> {
        let inner = self.lock();
        Ok(inner.state.records_for_staff(staff_id))
    }
}

#[async_trait]
impl MembershipLedgerStore for JournalStore {
    async fn active_for_member(
        &self,
        member_id: &MemberId,
    ) -> Result<Option<MembershipLedger>, StoreError> {
        let inner = self.lock();
        Ok(inner.state.active_ledger(member_id).cloned())
    }

    async fn adjust_active(
        &self,
        member_id: &MemberId,
        delta: LedgerDelta,
    ) -> Result<MembershipLedger, StoreError> {
        let mut inner = self.lock();
        let current = inner
            .state
            .active_ledger(member_id)
            .cloned()
            .ok_or_else(|| StoreError::NoActiveMembership(member_id.clone()))?;

        let (updated, clamped) = current.apply_delta(delta, self.policy)?;
        if clamped {
            tracing::warn!(
                member = %member_id,
                delta = delta.as_i64(),
                used = updated.used_sessions,
                total = updated.total_sessions,
                "ledger adjustment clamped at bound"
            );
        }

        let op = Operation::LedgerAdjust {
            ledger_id: updated.id.clone(),
            member_id: member_id.clone(),
            delta: delta.as_i64(),
            used_sessions: updated.used_sessions,
        };
        inner.journal.append(&op).map_err(journal_to_store)?;
        inner.state.apply(&op);
        Ok(updated)
    }
}

#[async_trait]
impl MonthlySubmissionStore for JournalStore {
    async fn find(
        &self,
        staff_id: &StaffId,
        month: YearMonth,
    ) -> Result<Option<MonthlySubmission>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .state
            .submissions
            .get(&(staff_id.clone(), month))
            .cloned())
    }

    async fn put(
        &self,
        submission: &MonthlySubmission,
        expected_version: u64,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let key = (submission.staff_id.clone(), submission.year_month);
        let found = inner
            .state
            .submissions
            .get(&key)
            .map(|s| s.version)
            .unwrap_or(0);
        if found != expected_version {
            return Err(StoreError::VersionConflict {
                staff_id: submission.staff_id.clone(),
                month: submission.year_month,
                expected: expected_version,
                found,
            });
        }

        let op = Operation::SubmissionUpsert {
            submission: submission.clone(),
        };
        inner.journal.append(&op).map_err(journal_to_store)?;
        inner.state.apply(&op);
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
