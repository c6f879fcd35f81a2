//! Session numbering through the indexed listing.

use crate::prelude::*;
use gym_core::record::{ClassKind, ClassRecord, OtStatus, PtStatus, RecordId, StaffId, SubType};
use gym_storage::MemoryStores;
use similar_asserts::assert_eq;

fn summary(listed: &[gym_core::indexer::IndexedRecord]) -> Vec<(String, Option<u32>, bool)> {
    listed
        .iter()
        .map(|item| (item.record.id.0.clone(), item.session_number, item.pending))
        .collect()
}

#[tokio::test]
async fn pending_slots_are_numbered_ahead_without_advancing_the_counter() {
    let stores = MemoryStores::new();
    stores.seed_record(pt_record("rec-0900", PtStatus::Completed, 10, 9));
    stores.seed_record(pt_record("rec-1000", PtStatus::Reserved, 10, 10));
    stores.seed_record(pt_record("rec-1100", PtStatus::Service, 10, 11));
    let svc = memory_scheduler(&stores);

    let listed = svc
        .list_with_session_numbers(&StaffId::new(STAFF), None)
        .await
        .unwrap();

    assert_eq!(
        summary(&listed),
        vec![
            ("rec-0900".to_string(), Some(1), false),
            ("rec-1000".to_string(), Some(2), true),
            ("rec-1100".to_string(), Some(2), false),
        ]
    );
}

#[tokio::test]
async fn listing_is_restartable() {
    let stores = MemoryStores::new();
    stores.seed_record(pt_record("rec-a", PtStatus::Completed, 10, 9));
    stores.seed_record(pt_record("rec-b", PtStatus::NoShowDeducted, 11, 9));
    stores.seed_record(pt_record("rec-c", PtStatus::Cancelled, 12, 9));
    let ot = ClassRecord::new(
        RecordId::new("rec-d"),
        StaffId::new(STAFF),
        ClassKind::Ot {
            member_id: gym_core::record::MemberId::new(MEMBER),
            status: OtStatus::Completed,
        },
        at(13, 9),
        at(13, 10),
    )
    .unwrap();
    stores.seed_record(ot);
    let svc = memory_scheduler(&stores);

    let staff = StaffId::new(STAFF);
    let first = svc.list_with_session_numbers(&staff, None).await.unwrap();
    let second = svc.list_with_session_numbers(&staff, None).await.unwrap();
    assert_eq!(summary(&first), summary(&second));

    // OT keeps its own counter
    assert_eq!(
        summary(&first),
        vec![
            ("rec-a".to_string(), Some(1), false),
            ("rec-b".to_string(), Some(2), false),
            ("rec-c".to_string(), Some(3), true),
            ("rec-d".to_string(), Some(1), false),
        ]
    );
}

#[tokio::test]
async fn consulting_blocks_appear_unnumbered() {
    let stores = MemoryStores::new();
    stores.seed_record(pt_record("rec-a", PtStatus::Completed, 10, 9));
    let consulting = ClassRecord::new(
        RecordId::new("rec-b"),
        StaffId::new(STAFF),
        ClassKind::Consulting {
            member_id: None,
            sub_type: SubType::Intro,
        },
        at(10, 10),
        at(10, 11),
    )
    .unwrap();
    stores.seed_record(consulting);
    let svc = memory_scheduler(&stores);

    let listed = svc
        .list_with_session_numbers(&StaffId::new(STAFF), None)
        .await
        .unwrap();
    assert_eq!(
        summary(&listed),
        vec![
            ("rec-a".to_string(), Some(1), false),
            ("rec-b".to_string(), None, false),
        ]
    );
}

#[tokio::test]
async fn status_changes_renumber_on_the_next_read() {
    let stores = MemoryStores::new();
    stores.seed_ledger(membership(30, 0));
    stores.seed_record(pt_record("rec-a", PtStatus::Reserved, 10, 9));
    stores.seed_record(pt_record("rec-b", PtStatus::Reserved, 10, 10));
    let svc = memory_scheduler(&stores);
    let staff = StaffId::new(STAFF);

    let before = svc.list_with_session_numbers(&staff, None).await.unwrap();
    assert_eq!(
        summary(&before),
        vec![
            ("rec-a".to_string(), Some(1), true),
            ("rec-b".to_string(), Some(1), true),
        ]
    );

    svc.change_status(
        &RecordId::new("rec-a"),
        gym_core::record::ClassStatus::Pt(PtStatus::Completed),
    )
    .await
    .unwrap();

    let after = svc.list_with_session_numbers(&staff, None).await.unwrap();
    assert_eq!(
        summary(&after),
        vec![
            ("rec-a".to_string(), Some(1), false),
            ("rec-b".to_string(), Some(2), true),
        ]
    );
}
