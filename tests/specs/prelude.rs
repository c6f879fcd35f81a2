//! Shared fixtures for the behavioral specs.

use chrono::{DateTime, TimeZone, Utc};
use gym_core::clock::FakeClock;
use gym_core::id::SequentialIdGen;
use gym_core::ledger::{LedgerId, MembershipLedger, OverconsumptionPolicy};
use gym_core::record::{ClassKind, ClassRecord, MemberId, PtStatus, RecordId, StaffId};
use gym_core::submission::YearMonth;
use gym_engine::{Scheduler, SchedulerDeps};
use gym_storage::{JournalStore, MemoryStores};
use std::path::Path;

pub type MemoryScheduler =
    Scheduler<MemoryStores, MemoryStores, MemoryStores, FakeClock, SequentialIdGen>;
pub type JournalScheduler =
    Scheduler<JournalStore, JournalStore, JournalStore, FakeClock, SequentialIdGen>;

pub const STAFF: &str = "staff-1";
pub const MEMBER: &str = "member-1";

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
}

pub fn may() -> YearMonth {
    "2024-05".parse().unwrap()
}

pub fn memory_scheduler(stores: &MemoryStores) -> MemoryScheduler {
    Scheduler::new(
        SchedulerDeps {
            records: stores.clone(),
            ledgers: stores.clone(),
            submissions: stores.clone(),
        },
        FakeClock::at(at(31, 18)),
        SequentialIdGen::new("rec"),
    )
}

pub fn journal_scheduler(dir: &Path) -> (JournalScheduler, JournalStore) {
    let store = JournalStore::open(dir, OverconsumptionPolicy::Reject).unwrap();
    let scheduler = Scheduler::new(
        SchedulerDeps {
            records: store.clone(),
            ledgers: store.clone(),
            submissions: store.clone(),
        },
        FakeClock::at(at(31, 18)),
        SequentialIdGen::new("rec"),
    );
    (scheduler, store)
}

pub fn membership(total: u32, used: u32) -> MembershipLedger {
    let mut ledger = MembershipLedger::new(
        LedgerId::new("led-1"),
        MemberId::new(MEMBER),
        total,
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    );
    ledger.used_sessions = used;
    ledger
}

pub fn pt_record(id: &str, status: PtStatus, day: u32, hour: u32) -> ClassRecord {
    ClassRecord::new(
        RecordId::new(id),
        StaffId::new(STAFF),
        ClassKind::Pt {
            member_id: MemberId::new(MEMBER),
            status,
        },
        at(day, hour),
        at(day, hour + 1),
    )
    .unwrap()
}
