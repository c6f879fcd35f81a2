// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the scheduling service

use gym_core::ledger::LedgerError;
use gym_core::record::{MemberId, RecordError, RecordId, StaffId, TransitionError};
use gym_core::stores::StoreError;
use gym_core::submission::{SubmissionError, SubmissionStatus, YearMonth};
use thiserror::Error;

/// Errors surfaced by the scheduling service
///
/// Every variant names the offending entity so the caller can render an
/// actionable message.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("record not found: {0}")]
    RecordNotFound(RecordId),
    #[error("record {record_id} is locked: {month} has been submitted for review")]
    LockedRecord {
        record_id: RecordId,
        month: YearMonth,
    },
    #[error("month {month} is locked for staff {staff_id}")]
    MonthLocked { staff_id: StaffId, month: YearMonth },
    #[error("invalid transition: {0}")]
    InvalidTransition(TransitionError),
    #[error("invalid record: {0}")]
    InvalidRecord(#[from] RecordError),
    #[error("no active membership to deduct from for member {0}")]
    NoActiveMembership(MemberId),
    #[error("{0}")]
    Overconsumption(LedgerError),
    #[error("month {month} for staff {staff_id} is already {status}")]
    AlreadySubmitted {
        staff_id: StaffId,
        month: YearMonth,
        status: SubmissionStatus,
    },
    #[error("month {month} for staff {staff_id} has not been submitted for review")]
    NotSubmitted { staff_id: StaffId, month: YearMonth },
    #[error("staff {actor} may not {action}")]
    Forbidden { actor: StaffId, action: String },
    #[error("submission for staff {staff_id} month {month} was modified concurrently")]
    Conflict { staff_id: StaffId, month: YearMonth },
    #[error("storage error: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RecordNotFound(id) => EngineError::RecordNotFound(id),
            StoreError::NoActiveMembership(member_id) => {
                EngineError::NoActiveMembership(member_id)
            }
            StoreError::Ledger(e) => EngineError::Overconsumption(e),
            other => EngineError::Storage(other),
        }
    }
}

impl From<SubmissionError> for EngineError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::AlreadySubmitted {
                staff_id,
                month,
                status,
            } => EngineError::AlreadySubmitted {
                staff_id,
                month,
                status,
            },
            SubmissionError::NotSubmitted { staff_id, month } => {
                EngineError::NotSubmitted { staff_id, month }
            }
        }
    }
}
