// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from journal replay

use crate::operation::Operation;
use gym_core::ledger::{LedgerId, MembershipLedger};
use gym_core::record::{ClassRecord, MemberId, RecordId, StaffId};
use gym_core::submission::{MonthlySubmission, YearMonth};
use std::collections::HashMap;

/// Materialized state built from journal operations
#[derive(Debug, Default)]
pub struct MaterializedState {
    pub records: HashMap<RecordId, ClassRecord>,
    pub ledgers: HashMap<LedgerId, MembershipLedger>,
    pub submissions: HashMap<(StaffId, YearMonth), MonthlySubmission>,
}

impl MaterializedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an operation to update the state
    pub fn apply(&mut self, op: &Operation) {
        match op {
            Operation::RecordUpsert { record } => {
                self.records.insert(record.id.clone(), record.clone());
            }

            Operation::RecordDelete { id } => {
                self.records.remove(id);
            }

            Operation::LedgerUpsert { ledger } => {
                self.ledgers.insert(ledger.id.clone(), ledger.clone());
            }

            Operation::LedgerAdjust {
                ledger_id,
                used_sessions,
                ..
            } => {
                if let Some(ledger) = self.ledgers.get_mut(ledger_id) {
                    ledger.used_sessions = *used_sessions;
                }
            }

            Operation::SubmissionUpsert { submission } => {
                self.submissions.insert(
                    (submission.staff_id.clone(), submission.year_month),
                    submission.clone(),
                );
            }
        }
    }

    /// The member's current ledger: most recently created, status active
    ///
    /// Ties on `created_at` break by ledger id so replay order cannot change
    /// the answer.
    pub fn active_ledger(&self, member_id: &MemberId) -> Option<&MembershipLedger> {
        self.ledgers
            .values()
            .filter(|ledger| &ledger.member_id == member_id && ledger.is_active())
            .max_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.id.cmp(&b.id))
            })
    }

    /// All records owned by a staff member, ordered by start time
    pub fn records_for_staff(&self, staff_id: &StaffId) -> Vec<ClassRecord> {
        let mut records: Vec<ClassRecord> = self
            .records
            .values()
            .filter(|record| &record.staff_id == staff_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            a.start_time
                .cmp(&b.start_time)
                .then_with(|| a.id.cmp(&b.id))
        });
        records
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
