//! Session ledger settlement through attendance transitions.

use crate::prelude::*;
use gym_core::stores::MembershipLedgerStore as _;
use gym_core::record::{ClassStatus, MemberId, PtStatus, RecordId};
use gym_storage::MemoryStores;

fn used(stores: &MemoryStores) -> u32 {
    stores
        .ledger_snapshot(&MemberId::new(MEMBER))
        .map(|l| l.used_sessions)
        .unwrap_or(0)
}

#[tokio::test]
async fn ledger_follows_the_consumed_fact_not_the_raw_status() {
    let stores = MemoryStores::new();
    stores.seed_ledger(membership(30, 10));
    stores.seed_record(pt_record("rec-1", PtStatus::Reserved, 10, 9));
    let svc = memory_scheduler(&stores);
    let id = RecordId::new("rec-1");

    // reserved -> completed: one session consumed
    svc.change_status(&id, ClassStatus::Pt(PtStatus::Completed))
        .await
        .unwrap();
    assert_eq!(used(&stores), 11);

    // completed -> no_show_deducted: both consume, no delta
    svc.change_status(&id, ClassStatus::Pt(PtStatus::NoShowDeducted))
        .await
        .unwrap();
    assert_eq!(used(&stores), 11);

    // no_show_deducted -> cancelled: consumption refunded
    svc.change_status(&id, ClassStatus::Pt(PtStatus::Cancelled))
        .await
        .unwrap();
    assert_eq!(used(&stores), 10);
}

#[tokio::test]
async fn consumed_fact_flips_charge_exactly_once_per_direction() {
    let stores = MemoryStores::new();
    stores.seed_ledger(membership(30, 10));
    stores.seed_record(pt_record("rec-1", PtStatus::Reserved, 10, 9));
    let svc = memory_scheduler(&stores);
    let id = RecordId::new("rec-1");

    for _ in 0..3 {
        // retried transition with the same arguments
        svc.change_status(&id, ClassStatus::Pt(PtStatus::Completed))
            .await
            .unwrap();
    }
    assert_eq!(used(&stores), 11);

    for _ in 0..3 {
        svc.change_status(&id, ClassStatus::Pt(PtStatus::Cancelled))
            .await
            .unwrap();
    }
    assert_eq!(used(&stores), 10);
}

#[tokio::test]
async fn used_sessions_never_goes_negative() {
    let stores = MemoryStores::new();
    stores.seed_ledger(membership(30, 0));
    stores.seed_record(pt_record("rec-1", PtStatus::Reserved, 10, 9));
    let svc = memory_scheduler(&stores);
    let id = RecordId::new("rec-1");

    // cancel, reserve, cancel again: no sequence of transitions may push
    // the counter below zero
    for status in [
        PtStatus::Cancelled,
        PtStatus::Reserved,
        PtStatus::NoShow,
        PtStatus::Cancelled,
    ] {
        svc.change_status(&id, ClassStatus::Pt(status)).await.unwrap();
        assert_eq!(used(&stores), 0);
    }
}

#[tokio::test]
async fn failed_settlement_leaves_the_record_as_it_was() {
    let stores = MemoryStores::new();
    stores.seed_ledger(membership(10, 10));
    stores.seed_record(pt_record("rec-1", PtStatus::Reserved, 10, 9));
    let svc = memory_scheduler(&stores);
    let id = RecordId::new("rec-1");

    let result = svc
        .change_status(&id, ClassStatus::Pt(PtStatus::Completed))
        .await;
    assert!(result.is_err());

    let stored = stores.record_snapshot(&id).unwrap();
    assert_eq!(stored.status(), Some(ClassStatus::Pt(PtStatus::Reserved)));
    assert!(!stored.charged);
    assert_eq!(used(&stores), 10);
}

#[tokio::test]
async fn settlement_is_visible_through_the_ledger_store() {
    let stores = MemoryStores::new();
    stores.seed_ledger(membership(30, 10));
    stores.seed_record(pt_record("rec-1", PtStatus::Reserved, 10, 9));
    let svc = memory_scheduler(&stores);

    svc.change_status(&RecordId::new("rec-1"), ClassStatus::Pt(PtStatus::Completed))
        .await
        .unwrap();

    let current = stores
        .active_for_member(&MemberId::new(MEMBER))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.used_sessions, 11);
    assert_eq!(current.remaining_sessions(), 19);
}
