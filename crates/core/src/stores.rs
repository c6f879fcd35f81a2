// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store trait definitions for the durable collaborators
//!
//! The engine consumes these three traits; persistence shape is an
//! implementation detail of the stores behind them.

use crate::ledger::{LedgerDelta, LedgerError, MembershipLedger};
use crate::record::{ClassRecord, MemberId, RecordId, StaffId};
use crate::submission::{MonthlySubmission, YearMonth};
use async_trait::async_trait;
use thiserror::Error;

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    RecordNotFound(RecordId),
    #[error("no active membership for member {0}")]
    NoActiveMembership(MemberId),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("submission for staff {staff_id} month {month} was modified concurrently (expected version {expected}, found {found})")]
    VersionConflict {
        staff_id: StaffId,
        month: YearMonth,
        expected: u64,
        found: u64,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable storage of class records
#[async_trait]
pub trait ClassRecordStore: Clone + Send + Sync + 'static {
    /// Fetch a record by id
    async fn get(&self, id: &RecordId) -> Result<ClassRecord, StoreError>;

    /// Insert or replace a record
    async fn upsert(&self, record: &ClassRecord) -> Result<(), StoreError>;

    /// Delete a record by id
    async fn delete(&self, id: &RecordId) -> Result<(), StoreError>;

    /// All records owned by a staff member, ordered by start time
    async fn list_by_staff(&self, staff_id: &StaffId) -> Result<Vec<ClassRecord>, StoreError>;
}

/// Durable storage of membership session counters
#[async_trait]
pub trait MembershipLedgerStore: Clone + Send + Sync + 'static {
    /// The member's current ledger: most recently created, status active
    async fn active_for_member(
        &self,
        member_id: &MemberId,
    ) -> Result<Option<MembershipLedger>, StoreError>;

    /// Atomically adjust the current ledger's used-session counter
    ///
    /// The read-modify-write happens inside the store's own critical
    /// section; concurrent adjustments against the same ledger serialize.
    async fn adjust_active(
        &self,
        member_id: &MemberId,
        delta: LedgerDelta,
    ) -> Result<MembershipLedger, StoreError>;
}

/// Durable storage of monthly submission records
#[async_trait]
pub trait MonthlySubmissionStore: Clone + Send + Sync + 'static {
    /// Fetch the submission for a (staff, month) pair, if any
    async fn find(
        &self,
        staff_id: &StaffId,
        month: YearMonth,
    ) -> Result<Option<MonthlySubmission>, StoreError>;

    /// Versioned write; `expected_version` is the version the caller read
    /// (zero for an absent record), and a mismatch fails with
    /// `VersionConflict`
    async fn put(
        &self,
        submission: &MonthlySubmission,
        expected_version: u64,
    ) -> Result<(), StoreError>;
}
