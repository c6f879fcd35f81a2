// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operations recorded in the journal
//!
//! Ledger adjustments are journaled as signed deltas with the resulting
//! counter, so the journal doubles as an audit trail of every charge and
//! refund.

use gym_core::ledger::{LedgerId, MembershipLedger};
use gym_core::record::{ClassRecord, MemberId, RecordId};
use gym_core::submission::MonthlySubmission;
use serde::{Deserialize, Serialize};

/// One durable state change
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    RecordUpsert {
        record: ClassRecord,
    },
    RecordDelete {
        id: RecordId,
    },
    LedgerUpsert {
        ledger: MembershipLedger,
    },
    LedgerAdjust {
        ledger_id: LedgerId,
        member_id: MemberId,
        delta: i64,
        used_sessions: u32,
    },
    SubmissionUpsert {
        submission: MonthlySubmission,
    },
}
