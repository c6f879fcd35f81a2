// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory fake stores for testing
//!
//! Same semantics as `JournalStore` without the journal: one lock around a
//! materialized state, seedable from tests.

use crate::operation::Operation;
use crate::state::MaterializedState;
use async_trait::async_trait;
use gym_core::ledger::{LedgerDelta, MembershipLedger, OverconsumptionPolicy};
use gym_core::record::{ClassRecord, MemberId, RecordId, StaffId};
use gym_core::stores::{
    ClassRecordStore, MembershipLedgerStore, MonthlySubmissionStore, StoreError,
};
use gym_core::submission::{MonthlySubmission, YearMonth};
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory implementation of the three store traits
#[derive(Clone, Default)]
pub struct MemoryStores {
    state: Arc<Mutex<MaterializedState>>,
    policy: OverconsumptionPolicy,
}

impl MemoryStores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: OverconsumptionPolicy) -> Self {
        Self {
            state: Arc::new(Mutex::new(MaterializedState::new())),
            policy,
        }
    }

    /// Seed a class record directly
    pub fn seed_record(&self, record: ClassRecord) {
        self.lock().apply(&Operation::RecordUpsert { record });
    }

    /// Seed a membership ledger directly
    pub fn seed_ledger(&self, ledger: MembershipLedger) {
        self.lock().apply(&Operation::LedgerUpsert { ledger });
    }

    /// Inspect a record without going through the trait
    pub fn record_snapshot(&self, id: &RecordId) -> Option<ClassRecord> {
        self.lock().records.get(id).cloned()
    }

    /// Inspect the member's current ledger without going through the trait
    pub fn ledger_snapshot(&self, member_id: &MemberId) -> Option<MembershipLedger> {
        self.lock().active_ledger(member_id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, MaterializedState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ClassRecordStore for MemoryStores {
    async fn get(&self, id: &RecordId) -> Result<ClassRecord, StoreError> {
        self.lock()
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::RecordNotFound(id.clone()))
    }

    async fn upsert(&self, record: &ClassRecord) -> Result<(), StoreError> {
        self.lock().apply(&Operation::RecordUpsert {
            record: record.clone(),
        });
        Ok(())
    }

    async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        let mut state = self.lock();
        if !state.records.contains_key(id) {
            return Err(StoreError::RecordNotFound(id.clone()));
        }
        state.apply(&Operation::RecordDelete { id: id.clone() });
        Ok(())
    }

    async fn list_by_staff(&self, staff_id: &StaffId) -> Result<Vec<ClassRecord>, StoreError> {
        Ok(self.lock().records_for_staff(staff_id))
    }
}

#[async_trait]
impl MembershipLedgerStore for MemoryStores {
    async fn active_for_member(
        &self,
        member_id: &MemberId,
    ) -> Result<Option<MembershipLedger>, StoreError> {
        Ok(self.lock().active_ledger(member_id).cloned())
    }

    async fn adjust_active(
        &self,
        member_id: &MemberId,
        delta: LedgerDelta,
    ) -> Result<MembershipLedger, StoreError> {
        let mut state = self.lock();
        let current = state
            .active_ledger(member_id)
            .cloned()
            .ok_or_else(|| StoreError::NoActiveMembership(member_id.clone()))?;

        let (updated, _clamped) = current.apply_delta(delta, self.policy)?;
        state.apply(&Operation::LedgerAdjust {
            ledger_id: updated.id.clone(),
            member_id: member_id.clone(),
            delta: delta.as_i64(),
            used_sessions: updated.used_sessions,
        });
        Ok(updated)
    }
}

#[async_trait]
impl MonthlySubmissionStore for MemoryStores {
    async fn find(
        &self,
        staff_id: &StaffId,
        month: YearMonth,
    ) -> Result<Option<MonthlySubmission>, StoreError> {
        Ok(self
            .lock()
            .submissions
            .get(&(staff_id.clone(), month))
            .cloned())
    }

    async fn put(
        &self,
        submission: &MonthlySubmission,
        expected_version: u64,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        let key = (submission.staff_id.clone(), submission.year_month);
        let found = state.submissions.get(&key).map(|s| s.version).unwrap_or(0);
        if found != expected_version {
            return Err(StoreError::VersionConflict {
                staff_id: submission.staff_id.clone(),
                month: submission.year_month,
                expected: expected_version,
                found,
            });
        }
        state.apply(&Operation::SubmissionUpsert {
            submission: submission.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
