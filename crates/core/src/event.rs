// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Domain events emitted by state machine transitions

use crate::record::{ClassStatus, MemberId, RecordId, StaffId, SubType};
use crate::submission::YearMonth;
use serde::{Deserialize, Serialize};

/// Events emitted by state machines and the orchestrator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    // Record events
    RecordCreated {
        record_id: RecordId,
        staff_id: StaffId,
    },
    StatusChanged {
        record_id: RecordId,
        from: ClassStatus,
        to: ClassStatus,
    },
    SubTypeChanged {
        record_id: RecordId,
        from: SubType,
        to: SubType,
    },
    RecordRescheduled {
        record_id: RecordId,
    },
    RecordDeleted {
        record_id: RecordId,
    },

    // Ledger events
    LedgerAdjusted {
        member_id: MemberId,
        delta: i64,
        used_sessions: u32,
        total_sessions: u32,
    },

    // Submission events
    MonthSubmitted {
        staff_id: StaffId,
        month: YearMonth,
    },
    MonthApproved {
        staff_id: StaffId,
        month: YearMonth,
    },
    MonthRejected {
        staff_id: StaffId,
        month: YearMonth,
        memo: String,
    },
}

impl Event {
    /// Stable event name for logging and filtering
    pub fn name(&self) -> &'static str {
        match self {
            Event::RecordCreated { .. } => "record:created",
            Event::StatusChanged { .. } => "record:status",
            Event::SubTypeChanged { .. } => "record:subtype",
            Event::RecordRescheduled { .. } => "record:rescheduled",
            Event::RecordDeleted { .. } => "record:deleted",
            Event::LedgerAdjusted { .. } => "ledger:adjusted",
            Event::MonthSubmitted { .. } => "month:submitted",
            Event::MonthApproved { .. } => "month:approved",
            Event::MonthRejected { .. } => "month:rejected",
        }
    }
}
