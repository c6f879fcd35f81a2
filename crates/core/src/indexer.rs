// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session indexer
//!
//! A pure, read-time projection over a staff member's records: each
//! `(member, discipline)` group of PT/OT records is numbered chronologically,
//! with a running counter that advances only on statuses that count toward
//! the index. Nothing here is persisted; callers recompute on every read.

use crate::record::{ClassRecord, Discipline, MemberId};
use std::collections::BTreeMap;

/// A class record annotated with its display session number
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedRecord {
    pub record: ClassRecord,
    /// Chronological ordinal within the (member, discipline) group;
    /// `None` for consulting/personal blocks
    pub session_number: Option<u32>,
    /// True when the record has not yet counted toward the index
    pub pending: bool,
}

/// Number a staff member's records
///
/// Records are ordered by start time (record id breaks ties) so the result
/// is deterministic for a given input set. A record whose status counts
/// receives the incremented counter; one that does not receives the next
/// slot with `pending` set, without advancing the counter.
pub fn index_sessions(
    records: impl IntoIterator<Item = ClassRecord>,
) -> impl Iterator<Item = IndexedRecord> {
    let mut indexed: Vec<IndexedRecord> = records
        .into_iter()
        .map(|record| IndexedRecord {
            record,
            session_number: None,
            pending: false,
        })
        .collect();

    indexed.sort_by(|a, b| {
        a.record
            .start_time
            .cmp(&b.record.start_time)
            .then_with(|| a.record.id.cmp(&b.record.id))
    });

    let mut counters: BTreeMap<(MemberId, Discipline), u32> = BTreeMap::new();
    for item in &mut indexed {
        let discipline = item.record.kind.discipline();
        if !matches!(discipline, Discipline::Pt | Discipline::Ot) {
            continue;
        }
        let status = match item.record.status() {
            Some(status) => status,
            None => continue,
        };
        let member_id = match item.record.kind.member_id() {
            Some(member_id) => member_id.clone(),
            None => continue,
        };

        let counter = counters.entry((member_id, discipline)).or_insert(0);
        if status.counts_for_index() {
            *counter += 1;
            item.session_number = Some(*counter);
        } else {
            item.session_number = Some(*counter + 1);
            item.pending = true;
        }
    }

    indexed.into_iter()
}

#[cfg(test)]
#[path = "indexer_tests.rs"]
mod tests;
