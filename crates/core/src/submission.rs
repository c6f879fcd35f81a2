// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Monthly submission gate
//!
//! Tracks one staff member's lock/approval record for one calendar month.
//! Submitted and approved months are locked: no class record in that month
//! may be mutated until an admin rejects the submission.

use crate::event::Event;
use crate::record::StaffId;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A calendar month, rendered "2024-05"
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

/// Errors from parsing a year-month string
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum YearMonthError {
    #[error("invalid year-month: {0}")]
    Invalid(String),
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, YearMonthError> {
        if !(1..=12).contains(&month) {
            return Err(YearMonthError::Invalid(format!("{}-{}", year, month)));
        }
        Ok(Self { year, month })
    }

    /// Month that owns the given instant (UTC calendar)
    pub fn from_datetime(time: DateTime<Utc>) -> Self {
        Self {
            year: time.year(),
            month: time.month(),
        }
    }

    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        time.year() == self.year && time.month() == self.month
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for YearMonth {
    type Err = YearMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || YearMonthError::Invalid(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        YearMonth::new(year, month).map_err(|_| invalid())
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Submission lifecycle state; "none" is the absence of a record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Submitted,
    Approved,
    Rejected,
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionStatus::Submitted => write!(f, "submitted"),
            SubmissionStatus::Approved => write!(f, "approved"),
            SubmissionStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Admin decision on a submitted month
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

/// Errors from the submission gate
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("month {month} for staff {staff_id} is already {status}")]
    AlreadySubmitted {
        staff_id: StaffId,
        month: YearMonth,
        status: SubmissionStatus,
    },
    #[error("month {month} for staff {staff_id} has not been submitted for review")]
    NotSubmitted { staff_id: StaffId, month: YearMonth },
}

/// One staff member's lock/approval record for one calendar month
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySubmission {
    pub staff_id: StaffId,
    pub year_month: YearMonth,
    pub status: SubmissionStatus,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub admin_memo: Option<String>,
    /// Optimistic-concurrency counter, bumped on every transition
    pub version: u64,
}

/// Whether the month is locked for record mutations
pub fn is_locked(submission: Option<&MonthlySubmission>) -> bool {
    matches!(
        submission.map(|s| s.status),
        Some(SubmissionStatus::Submitted) | Some(SubmissionStatus::Approved)
    )
}

/// Staff submits a month for review
///
/// Created implicitly on first submit; a rejected month may be resubmitted,
/// which clears the previous review outcome.
pub fn submit(
    existing: Option<&MonthlySubmission>,
    staff_id: &StaffId,
    month: YearMonth,
    now: DateTime<Utc>,
) -> Result<(MonthlySubmission, Vec<Event>), SubmissionError> {
    match existing.map(|s| s.status) {
        Some(status @ SubmissionStatus::Submitted) | Some(status @ SubmissionStatus::Approved) => {
            Err(SubmissionError::AlreadySubmitted {
                staff_id: staff_id.clone(),
                month,
                status,
            })
        }
        Some(SubmissionStatus::Rejected) | None => {
            let submission = MonthlySubmission {
                staff_id: staff_id.clone(),
                year_month: month,
                status: SubmissionStatus::Submitted,
                submitted_at: now,
                reviewed_at: None,
                admin_memo: None,
                version: existing.map(|s| s.version + 1).unwrap_or(1),
            };
            let events = vec![Event::MonthSubmitted {
                staff_id: staff_id.clone(),
                month,
            }];
            Ok((submission, events))
        }
    }
}

/// Admin approves or rejects a submitted month
pub fn review(
    existing: Option<&MonthlySubmission>,
    staff_id: &StaffId,
    month: YearMonth,
    decision: ReviewDecision,
    memo: Option<String>,
    now: DateTime<Utc>,
) -> Result<(MonthlySubmission, Vec<Event>), SubmissionError> {
    let not_submitted = || SubmissionError::NotSubmitted {
        staff_id: staff_id.clone(),
        month,
    };
    let current = existing.ok_or_else(not_submitted)?;
    if current.status != SubmissionStatus::Submitted {
        return Err(not_submitted());
    }

    let mut submission = current.clone();
    submission.reviewed_at = Some(now);
    submission.admin_memo = memo.clone();
    submission.version += 1;
    let events = match decision {
        ReviewDecision::Approve => {
            submission.status = SubmissionStatus::Approved;
            vec![Event::MonthApproved {
                staff_id: staff_id.clone(),
                month,
            }]
        }
        ReviewDecision::Reject => {
            submission.status = SubmissionStatus::Rejected;
            vec![Event::MonthRejected {
                staff_id: staff_id.clone(),
                month,
                memo: memo.unwrap_or_default(),
            }]
        }
    };
    Ok((submission, events))
}

#[cfg(test)]
#[path = "submission_tests.rs"]
mod tests;
