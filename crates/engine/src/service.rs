// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduling service
//!
//! Owns the orchestration of the four core pieces: the monthly submission
//! gate, the attendance state machine, the session ledger, and the session
//! indexer. The gate is re-checked here on every mutation; a caller-side
//! check is never trusted.

use crate::error::EngineError;
use gym_core::clock::Clock;
use gym_core::event::Event;
use gym_core::id::IdGen;
use gym_core::indexer::{index_sessions, IndexedRecord};
use gym_core::ledger::LedgerDelta;
use gym_core::record::{
    self, ClassKind, ClassRecord, ClassStatus, MemberId, MonthLock, RecordError, RecordId, StaffId,
    SubType, TransitionError,
};
use gym_core::stores::{
    ClassRecordStore, MembershipLedgerStore, MonthlySubmissionStore, StoreError,
};
use gym_core::submission::{self, MonthlySubmission, ReviewDecision, YearMonth};
use chrono::{DateTime, Utc};
use std::ops::Range;

/// How many times a submit retries after losing a version race
const SUBMIT_RETRIES: u32 = 3;

/// Caller role for gate operations
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Staff,
    Admin,
}

/// The authenticated caller of a gate operation
#[derive(Clone, Debug)]
pub struct Actor {
    pub staff_id: StaffId,
    pub role: Role,
}

impl Actor {
    pub fn staff(staff_id: impl Into<String>) -> Self {
        Self {
            staff_id: StaffId::new(staff_id),
            role: Role::Staff,
        }
    }

    pub fn admin(staff_id: impl Into<String>) -> Self {
        Self {
            staff_id: StaffId::new(staff_id),
            role: Role::Admin,
        }
    }
}

/// Store dependencies for the scheduler
pub struct SchedulerDeps<R, L, S> {
    pub records: R,
    pub ledgers: L,
    pub submissions: S,
}

/// The scheduling service
pub struct Scheduler<R, L, S, C, I> {
    records: R,
    ledgers: L,
    submissions: S,
    clock: C,
    id_gen: I,
}

impl<R, L, S, C, I> Scheduler<R, L, S, C, I>
where
    R: ClassRecordStore,
    L: MembershipLedgerStore,
    S: MonthlySubmissionStore,
    C: Clock,
    I: IdGen,
{
    /// Create a new scheduler
    pub fn new(deps: SchedulerDeps<R, L, S>, clock: C, id_gen: I) -> Self {
        Self {
            records: deps.records,
            ledgers: deps.ledgers,
            submissions: deps.submissions,
            clock,
            id_gen,
        }
    }

    /// Schedule a new class or personal block
    pub async fn create_record(
        &self,
        staff_id: StaffId,
        kind: ClassKind,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<ClassRecord, EngineError> {
        let month = YearMonth::from_datetime(start_time);
        self.ensure_month_open(&staff_id, month).await?;

        let mut record = ClassRecord::new(
            self.id_gen.next_record_id(),
            staff_id.clone(),
            kind,
            start_time,
            end_time,
        )?;

        // A record scheduled directly in a consuming status still charges
        let applied = self.settle_ledger(&mut record).await?;
        if let Err(e) = self.records.upsert(&record).await {
            self.roll_back_ledger(applied).await;
            return Err(e.into());
        }

        tracing::info!(record = %record.id, staff = %staff_id, "record created");
        self.emit(&[Event::RecordCreated {
            record_id: record.id.clone(),
            staff_id,
        }]);
        Ok(record)
    }

    /// Change a record's attendance status
    ///
    /// The ledger settles before the new status is persisted; a ledger
    /// failure aborts with the stored record untouched.
    pub async fn change_status(
        &self,
        record_id: &RecordId,
        requested: ClassStatus,
    ) -> Result<ClassRecord, EngineError> {
        let record = self.records.get(record_id).await?;
        let month = record.month();
        let lock = self.month_lock(&record.staff_id, month).await?;

        let (mut updated, events) = record::transition(&record, requested, lock)
            .map_err(|e| map_transition(e, month))?;

        let applied = self.settle_ledger(&mut updated).await?;
        if let Err(e) = self.records.upsert(&updated).await {
            self.roll_back_ledger(applied).await;
            return Err(e.into());
        }

        tracing::info!(record = %updated.id, status = %requested, "status changed");
        self.emit(&events);
        Ok(updated)
    }

    /// Reclassify a consulting or personal block's sub-type
    pub async fn reclassify(
        &self,
        record_id: &RecordId,
        sub_type: SubType,
    ) -> Result<ClassRecord, EngineError> {
        let record = self.records.get(record_id).await?;
        let month = record.month();
        let lock = self.month_lock(&record.staff_id, month).await?;

        let (updated, events) =
            record::reclassify(&record, sub_type, lock).map_err(|e| map_transition(e, month))?;
        self.records.upsert(&updated).await?;

        tracing::info!(record = %updated.id, "record reclassified");
        self.emit(&events);
        Ok(updated)
    }

    /// Move a record to a new time slot
    ///
    /// Both the current month and the target month must be open.
    pub async fn reschedule(
        &self,
        record_id: &RecordId,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<ClassRecord, EngineError> {
        if end_time <= start_time {
            return Err(RecordError::InvalidTimeRange.into());
        }

        let record = self.records.get(record_id).await?;
        self.ensure_month_open(&record.staff_id, record.month())
            .await?;
        let target_month = YearMonth::from_datetime(start_time);
        if target_month != record.month() {
            self.ensure_month_open(&record.staff_id, target_month)
                .await?;
        }

        let mut updated = record;
        updated.start_time = start_time;
        updated.end_time = end_time;
        self.records.upsert(&updated).await?;

        tracing::info!(record = %updated.id, "record rescheduled");
        self.emit(&[Event::RecordRescheduled {
            record_id: updated.id.clone(),
        }]);
        Ok(updated)
    }

    /// Delete a record
    ///
    /// A record that has charged a session refunds it in the same guarded
    /// path, so the ledger never keeps a debit for a record that no longer
    /// exists.
    pub async fn delete_record(&self, record_id: &RecordId) -> Result<(), EngineError> {
        let record = self.records.get(record_id).await?;
        self.ensure_month_open(&record.staff_id, record.month())
            .await?;

        let mut refunded = None;
        if record.charged {
            if let Some(member_id) = record.kind.member_id().cloned() {
                let ledger = self
                    .ledgers
                    .adjust_active(&member_id, LedgerDelta::Credit)
                    .await?;
                self.emit(&[Event::LedgerAdjusted {
                    member_id: member_id.clone(),
                    delta: LedgerDelta::Credit.as_i64(),
                    used_sessions: ledger.used_sessions,
                    total_sessions: ledger.total_sessions,
                }]);
                refunded = Some((member_id, LedgerDelta::Credit));
            }
        }

        if let Err(e) = self.records.delete(record_id).await {
            self.roll_back_ledger(refunded).await;
            return Err(e.into());
        }

        tracing::info!(record = %record_id, "record deleted");
        self.emit(&[Event::RecordDeleted {
            record_id: record_id.clone(),
        }]);
        Ok(())
    }

    /// A staff member's records with display session numbers
    ///
    /// Recomputed on every call. The range filter applies after indexing so
    /// numbering always reflects the full history.
    pub async fn list_with_session_numbers(
        &self,
        staff_id: &StaffId,
        range: Option<Range<DateTime<Utc>>>,
    ) -> Result<Vec<IndexedRecord>, EngineError> {
        let records = self.records.list_by_staff(staff_id).await?;
        let indexed = index_sessions(records);
        Ok(match range {
            Some(range) => indexed
                .filter(|item| range.contains(&item.record.start_time))
                .collect(),
            None => indexed.collect(),
        })
    }

    /// Submit a month for admin review, locking its records
    pub async fn submit_month(
        &self,
        actor: &Actor,
        staff_id: &StaffId,
        month: YearMonth,
    ) -> Result<MonthlySubmission, EngineError> {
        if actor.role != Role::Admin && &actor.staff_id != staff_id {
            return Err(EngineError::Forbidden {
                actor: actor.staff_id.clone(),
                action: format!("submit month {} for staff {}", month, staff_id),
            });
        }

        let mut attempts = 0;
        loop {
            let existing = self.submissions.find(staff_id, month).await?;
            let (updated, events) =
                submission::submit(existing.as_ref(), staff_id, month, self.clock.now())?;
            let expected = existing.map(|s| s.version).unwrap_or(0);

            match self.submissions.put(&updated, expected).await {
                Ok(()) => {
                    tracing::info!(staff = %staff_id, %month, "month submitted");
                    self.emit(&events);
                    return Ok(updated);
                }
                Err(StoreError::VersionConflict { .. }) if attempts < SUBMIT_RETRIES => {
                    attempts += 1;
                    tracing::debug!(staff = %staff_id, %month, attempts, "submit lost version race, retrying");
                }
                Err(StoreError::VersionConflict { .. }) => {
                    return Err(EngineError::Conflict {
                        staff_id: staff_id.clone(),
                        month,
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Approve or reject a submitted month (admin only)
    pub async fn review_month(
        &self,
        actor: &Actor,
        staff_id: &StaffId,
        month: YearMonth,
        decision: ReviewDecision,
        memo: Option<String>,
    ) -> Result<MonthlySubmission, EngineError> {
        if actor.role != Role::Admin {
            return Err(EngineError::Forbidden {
                actor: actor.staff_id.clone(),
                action: format!("review month {} for staff {}", month, staff_id),
            });
        }

        let existing = self.submissions.find(staff_id, month).await?;
        let (updated, events) = submission::review(
            existing.as_ref(),
            staff_id,
            month,
            decision,
            memo,
            self.clock.now(),
        )?;
        let expected = existing.map(|s| s.version).unwrap_or(0);

        match self.submissions.put(&updated, expected).await {
            Ok(()) => {
                tracing::info!(staff = %staff_id, %month, ?decision, "month reviewed");
                self.emit(&events);
                Ok(updated)
            }
            // A review losing a race re-reads rather than retrying blindly
            Err(StoreError::VersionConflict { .. }) => Err(EngineError::Conflict {
                staff_id: staff_id.clone(),
                month,
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Read-only gate lookup for display
    pub async fn month_status(
        &self,
        staff_id: &StaffId,
        month: YearMonth,
    ) -> Result<Option<MonthlySubmission>, EngineError> {
        Ok(self.submissions.find(staff_id, month).await?)
    }

    /// Derive the lock state of a (staff, month) pair from the gate
    async fn month_lock(
        &self,
        staff_id: &StaffId,
        month: YearMonth,
    ) -> Result<MonthLock, EngineError> {
        let current = self.submissions.find(staff_id, month).await?;
        Ok(if submission::is_locked(current.as_ref()) {
            MonthLock::Locked
        } else {
            MonthLock::Open
        })
    }

    async fn ensure_month_open(
        &self,
        staff_id: &StaffId,
        month: YearMonth,
    ) -> Result<(), EngineError> {
        match self.month_lock(staff_id, month).await? {
            MonthLock::Open => Ok(()),
            MonthLock::Locked => Err(EngineError::MonthLocked {
                staff_id: staff_id.clone(),
                month,
            }),
        }
    }

    /// Settle the ledger against the record's pending status
    ///
    /// The delta derives from the stored `charged` flag, never from the
    /// caller's from-status, which makes retried transitions idempotent.
    /// Returns the adjustment that was applied, for rollback.
    async fn settle_ledger(
        &self,
        record: &mut ClassRecord,
    ) -> Result<Option<(MemberId, LedgerDelta)>, EngineError> {
        let status = match record.status() {
            Some(status) => status,
            None => return Ok(None),
        };
        let member_id = match record.kind.member_id() {
            Some(member_id) => member_id.clone(),
            None => return Ok(None),
        };

        let consumed = status.consumes_session();
        let delta = LedgerDelta::from_consumed_flip(record.charged, consumed);
        let mut applied = None;
        if delta != LedgerDelta::None {
            let ledger = self.ledgers.adjust_active(&member_id, delta).await?;
            self.emit(&[Event::LedgerAdjusted {
                member_id: member_id.clone(),
                delta: delta.as_i64(),
                used_sessions: ledger.used_sessions,
                total_sessions: ledger.total_sessions,
            }]);
            applied = Some((member_id, delta));
        }
        record.charged = consumed;
        Ok(applied)
    }

    /// Best-effort compensation when the record write fails after a ledger
    /// adjustment succeeded
    async fn roll_back_ledger(&self, applied: Option<(MemberId, LedgerDelta)>) {
        if let Some((member_id, delta)) = applied {
            if let Err(e) = self
                .ledgers
                .adjust_active(&member_id, delta.reversed())
                .await
            {
                tracing::warn!(member = %member_id, error = %e, "failed to roll back ledger adjustment");
            }
        }
    }

    fn emit(&self, events: &[Event]) {
        for event in events {
            tracing::debug!(name = event.name(), ?event, "domain event");
        }
    }
}

fn map_transition(err: TransitionError, month: YearMonth) -> EngineError {
    match err {
        TransitionError::Locked { id } => EngineError::LockedRecord {
            record_id: id,
            month,
        },
        other => EngineError::InvalidTransition(other),
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
