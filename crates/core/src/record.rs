// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Class records and the attendance state machine
//!
//! A class record is one scheduled or past block on a staff member's
//! calendar. PT and OT records carry an attendance status whose domain is
//! closed per discipline; Consulting and Personal blocks carry a sub-type
//! tag instead and never touch the session ledger.

use crate::event::Event;
use crate::submission::YearMonth;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier for a class record
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a staff member
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StaffId(pub String);

impl StaffId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for StaffId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a member
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId(pub String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Attendance status domain for personal-training records
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PtStatus {
    Reserved,
    Completed,
    NoShowDeducted,
    NoShow,
    Service,
    Cancelled,
}

/// Attendance status domain for orientation-training records
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtStatus {
    Reserved,
    Completed,
    NoShow,
    Cancelled,
    Converted,
}

/// Classification tag for consulting and personal blocks
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubType {
    Intro,
    Assessment,
    FollowUp,
    Admin,
    Break,
    Other,
}

/// The category of a class record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discipline {
    Pt,
    Ot,
    Consulting,
    Personal,
}

impl std::fmt::Display for Discipline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Discipline::Pt => write!(f, "PT"),
            Discipline::Ot => write!(f, "OT"),
            Discipline::Consulting => write!(f, "consulting"),
            Discipline::Personal => write!(f, "personal"),
        }
    }
}

/// An attendance status together with its discipline domain
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassStatus {
    Pt(PtStatus),
    Ot(OtStatus),
}

impl ClassStatus {
    /// Whether this status debits the member's paid session counter
    pub fn consumes_session(self) -> bool {
        matches!(
            self,
            ClassStatus::Pt(PtStatus::Completed)
                | ClassStatus::Pt(PtStatus::NoShowDeducted)
                | ClassStatus::Ot(OtStatus::Completed)
        )
    }

    /// Whether this status advances the chronological session index
    ///
    /// Differs from `consumes_session` on purpose: service sessions are
    /// numbered for scheduling continuity but never billed.
    pub fn counts_for_index(self) -> bool {
        matches!(
            self,
            ClassStatus::Pt(PtStatus::Completed)
                | ClassStatus::Pt(PtStatus::NoShowDeducted)
                | ClassStatus::Pt(PtStatus::Service)
                | ClassStatus::Ot(OtStatus::Completed)
        )
    }

    pub fn discipline(self) -> Discipline {
        match self {
            ClassStatus::Pt(_) => Discipline::Pt,
            ClassStatus::Ot(_) => Discipline::Ot,
        }
    }
}

impl std::fmt::Display for ClassStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ClassStatus::Pt(PtStatus::Reserved) | ClassStatus::Ot(OtStatus::Reserved) => "reserved",
            ClassStatus::Pt(PtStatus::Completed) | ClassStatus::Ot(OtStatus::Completed) => {
                "completed"
            }
            ClassStatus::Pt(PtStatus::NoShowDeducted) => "no_show_deducted",
            ClassStatus::Pt(PtStatus::NoShow) | ClassStatus::Ot(OtStatus::NoShow) => "no_show",
            ClassStatus::Pt(PtStatus::Service) => "service",
            ClassStatus::Pt(PtStatus::Cancelled) | ClassStatus::Ot(OtStatus::Cancelled) => {
                "cancelled"
            }
            ClassStatus::Ot(OtStatus::Converted) => "converted",
        };
        write!(f, "{}", name)
    }
}

/// Discipline-specific payload of a class record
///
/// PT and OT variants require a member, so a session-bearing record without
/// one is unrepresentable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "discipline", rename_all = "snake_case")]
pub enum ClassKind {
    Pt {
        member_id: MemberId,
        status: PtStatus,
    },
    Ot {
        member_id: MemberId,
        status: OtStatus,
    },
    Consulting {
        member_id: Option<MemberId>,
        sub_type: SubType,
    },
    Personal {
        sub_type: SubType,
    },
}

impl ClassKind {
    pub fn discipline(&self) -> Discipline {
        match self {
            ClassKind::Pt { .. } => Discipline::Pt,
            ClassKind::Ot { .. } => Discipline::Ot,
            ClassKind::Consulting { .. } => Discipline::Consulting,
            ClassKind::Personal { .. } => Discipline::Personal,
        }
    }

    pub fn member_id(&self) -> Option<&MemberId> {
        match self {
            ClassKind::Pt { member_id, .. } | ClassKind::Ot { member_id, .. } => Some(member_id),
            ClassKind::Consulting { member_id, .. } => member_id.as_ref(),
            ClassKind::Personal { .. } => None,
        }
    }

    pub fn status(&self) -> Option<ClassStatus> {
        match self {
            ClassKind::Pt { status, .. } => Some(ClassStatus::Pt(*status)),
            ClassKind::Ot { status, .. } => Some(ClassStatus::Ot(*status)),
            ClassKind::Consulting { .. } | ClassKind::Personal { .. } => None,
        }
    }

    pub fn sub_type(&self) -> Option<SubType> {
        match self {
            ClassKind::Consulting { sub_type, .. } | ClassKind::Personal { sub_type } => {
                Some(*sub_type)
            }
            ClassKind::Pt { .. } | ClassKind::Ot { .. } => None,
        }
    }
}

/// Lock state of a record's owning month, derived from the submission gate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonthLock {
    Open,
    Locked,
}

/// Errors from record construction
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("end time must be after start time")]
    InvalidTimeRange,
}

/// Errors from attendance transitions
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("record {id} is locked pending month review")]
    Locked { id: RecordId },
    #[error("status {requested} is not valid for a {discipline} record")]
    InvalidStatus {
        requested: ClassStatus,
        discipline: Discipline,
    },
    #[error("record {id} is a {discipline} record and does not accept sub-type reclassification")]
    NotReclassifiable { id: RecordId, discipline: Discipline },
}

/// One scheduled or past class/personal block
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub id: RecordId,
    pub staff_id: StaffId,
    pub kind: ClassKind,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Consumed-fact last charged against the member's ledger for this record
    pub charged: bool,
}

impl ClassRecord {
    /// Create a new record, validating the time range
    pub fn new(
        id: RecordId,
        staff_id: StaffId,
        kind: ClassKind,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Self, RecordError> {
        if end_time <= start_time {
            return Err(RecordError::InvalidTimeRange);
        }
        Ok(Self {
            id,
            staff_id,
            kind,
            start_time,
            end_time,
            charged: false,
        })
    }

    pub fn status(&self) -> Option<ClassStatus> {
        self.kind.status()
    }

    /// Calendar month that owns this record for submission purposes
    pub fn month(&self) -> YearMonth {
        YearMonth::from_datetime(self.start_time)
    }
}

/// Pure attendance transition
///
/// Validates the requested status against the record's discipline domain and
/// the month lock, and returns the updated record plus the events the caller
/// should emit. The `charged` flag is untouched here: the orchestrator
/// settles the ledger first and persists the flag with the record.
pub fn transition(
    record: &ClassRecord,
    requested: ClassStatus,
    lock: MonthLock,
) -> Result<(ClassRecord, Vec<Event>), TransitionError> {
    if lock == MonthLock::Locked {
        return Err(TransitionError::Locked {
            id: record.id.clone(),
        });
    }

    let from = record.status().ok_or(TransitionError::InvalidStatus {
        requested,
        discipline: record.kind.discipline(),
    })?;

    let mut updated = record.clone();
    match (&mut updated.kind, requested) {
        (ClassKind::Pt { status, .. }, ClassStatus::Pt(next)) => *status = next,
        (ClassKind::Ot { status, .. }, ClassStatus::Ot(next)) => *status = next,
        _ => {
            return Err(TransitionError::InvalidStatus {
                requested,
                discipline: record.kind.discipline(),
            });
        }
    }

    let events = vec![Event::StatusChanged {
        record_id: record.id.clone(),
        from,
        to: requested,
    }];
    Ok((updated, events))
}

/// Pure sub-type reclassification for consulting and personal blocks
pub fn reclassify(
    record: &ClassRecord,
    sub_type: SubType,
    lock: MonthLock,
) -> Result<(ClassRecord, Vec<Event>), TransitionError> {
    if lock == MonthLock::Locked {
        return Err(TransitionError::Locked {
            id: record.id.clone(),
        });
    }

    let mut updated = record.clone();
    let from = match &mut updated.kind {
        ClassKind::Consulting {
            sub_type: current, ..
        }
        | ClassKind::Personal { sub_type: current } => std::mem::replace(current, sub_type),
        ClassKind::Pt { .. } | ClassKind::Ot { .. } => {
            return Err(TransitionError::NotReclassifiable {
                id: record.id.clone(),
                discipline: record.kind.discipline(),
            });
        }
    };

    let events = vec![Event::SubTypeChanged {
        record_id: record.id.clone(),
        from,
        to: sub_type,
    }];
    Ok((updated, events))
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
