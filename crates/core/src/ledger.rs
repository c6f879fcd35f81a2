// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Membership session ledgers
//!
//! A ledger is one membership's counter of sessions used versus purchased.
//! A member may accumulate several ledgers over time; the most recently
//! created active one is the current ledger that attendance debits.

use crate::record::MemberId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier for a membership ledger
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LedgerId(pub String);

impl LedgerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for LedgerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a membership
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    Active,
    Expired,
    Paused,
}

/// What to do when a debit would push `used_sessions` past `total_sessions`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverconsumptionPolicy {
    /// Fail the debit and abort the enclosing transition
    #[default]
    Reject,
    /// Saturate at `total_sessions`; the store logs a warning
    Clamp,
}

/// Signed session delta produced by a consumed-fact flip
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedgerDelta {
    /// Refund one session (used decreases)
    Credit,
    None,
    /// Charge one session (used increases)
    Debit,
}

impl LedgerDelta {
    /// Delta implied by the consumed-fact moving from `was` to `now`
    pub fn from_consumed_flip(was: bool, now: bool) -> Self {
        match (was, now) {
            (false, true) => LedgerDelta::Debit,
            (true, false) => LedgerDelta::Credit,
            _ => LedgerDelta::None,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            LedgerDelta::Credit => LedgerDelta::Debit,
            LedgerDelta::None => LedgerDelta::None,
            LedgerDelta::Debit => LedgerDelta::Credit,
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            LedgerDelta::Credit => -1,
            LedgerDelta::None => 0,
            LedgerDelta::Debit => 1,
        }
    }
}

/// Errors from ledger arithmetic
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error(
        "member {member_id} has no sessions left on the active membership \
         ({total_sessions} purchased)"
    )]
    Overconsumption {
        member_id: MemberId,
        total_sessions: u32,
    },
}

/// One membership's usage counter
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipLedger {
    pub id: LedgerId,
    pub member_id: MemberId,
    pub total_sessions: u32,
    pub used_sessions: u32,
    pub status: MembershipStatus,
    pub created_at: DateTime<Utc>,
}

impl MembershipLedger {
    pub fn new(
        id: LedgerId,
        member_id: MemberId,
        total_sessions: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            member_id,
            total_sessions,
            used_sessions: 0,
            status: MembershipStatus::Active,
            created_at,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, MembershipStatus::Active)
    }

    pub fn remaining_sessions(&self) -> u32 {
        self.total_sessions.saturating_sub(self.used_sessions)
    }

    /// Apply a signed delta to `used_sessions`
    ///
    /// The floor always clamps at zero. The ceiling follows the policy:
    /// `Reject` fails the debit, `Clamp` saturates at `total_sessions`.
    /// Returns the updated ledger and whether either bound clamped.
    pub fn apply_delta(
        &self,
        delta: LedgerDelta,
        policy: OverconsumptionPolicy,
    ) -> Result<(MembershipLedger, bool), LedgerError> {
        let mut updated = self.clone();
        let clamped = match delta {
            LedgerDelta::None => false,
            LedgerDelta::Credit => {
                if updated.used_sessions == 0 {
                    true
                } else {
                    updated.used_sessions -= 1;
                    false
                }
            }
            LedgerDelta::Debit => {
                if updated.used_sessions >= updated.total_sessions {
                    match policy {
                        OverconsumptionPolicy::Reject => {
                            return Err(LedgerError::Overconsumption {
                                member_id: self.member_id.clone(),
                                total_sessions: self.total_sessions,
                            });
                        }
                        OverconsumptionPolicy::Clamp => true,
                    }
                } else {
                    updated.used_sessions += 1;
                    false
                }
            }
        };
        Ok((updated, clamped))
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
