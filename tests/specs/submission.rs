//! Monthly submission gate lifecycle.

use crate::prelude::*;
use gym_core::record::{ClassStatus, PtStatus, RecordId, StaffId};
use gym_core::submission::{ReviewDecision, SubmissionStatus};
use gym_engine::{Actor, EngineError};
use gym_storage::MemoryStores;

#[tokio::test]
async fn submitted_month_locks_and_rejection_reopens() {
    let stores = MemoryStores::new();
    stores.seed_ledger(membership(30, 10));
    stores.seed_record(pt_record("rec-1", PtStatus::Reserved, 10, 9));
    let svc = memory_scheduler(&stores);
    let staff = StaffId::new(STAFF);
    let id = RecordId::new("rec-1");

    // Staff submits May 2024
    let submission = svc
        .submit_month(&Actor::staff(STAFF), &staff, may())
        .await
        .unwrap();
    assert_eq!(submission.status, SubmissionStatus::Submitted);

    // Any further status change on a May record fails
    let result = svc
        .change_status(&id, ClassStatus::Pt(PtStatus::Completed))
        .await;
    assert!(matches!(result, Err(EngineError::LockedRecord { .. })));

    // Admin rejects with a memo
    let rejected = svc
        .review_month(
            &Actor::admin("admin-1"),
            &staff,
            may(),
            ReviewDecision::Reject,
            Some("missing session 4".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(rejected.status, SubmissionStatus::Rejected);
    assert_eq!(rejected.admin_memo.as_deref(), Some("missing session 4"));

    // The same change now succeeds
    svc.change_status(&id, ClassStatus::Pt(PtStatus::Completed))
        .await
        .unwrap();
}

#[tokio::test]
async fn rejected_month_can_be_resubmitted_and_approved() {
    let stores = MemoryStores::new();
    let svc = memory_scheduler(&stores);
    let staff = StaffId::new(STAFF);

    svc.submit_month(&Actor::staff(STAFF), &staff, may())
        .await
        .unwrap();
    svc.review_month(
        &Actor::admin("admin-1"),
        &staff,
        may(),
        ReviewDecision::Reject,
        Some("fix the 10th".to_string()),
    )
    .await
    .unwrap();

    let resubmitted = svc
        .submit_month(&Actor::staff(STAFF), &staff, may())
        .await
        .unwrap();
    assert_eq!(resubmitted.status, SubmissionStatus::Submitted);
    assert_eq!(resubmitted.admin_memo, None);

    let approved = svc
        .review_month(
            &Actor::admin("admin-1"),
            &staff,
            may(),
            ReviewDecision::Approve,
            None,
        )
        .await
        .unwrap();
    assert_eq!(approved.status, SubmissionStatus::Approved);

    // Approved is terminal: resubmission and re-review both fail
    let result = svc.submit_month(&Actor::staff(STAFF), &staff, may()).await;
    assert!(matches!(result, Err(EngineError::AlreadySubmitted { .. })));
    let result = svc
        .review_month(
            &Actor::admin("admin-1"),
            &staff,
            may(),
            ReviewDecision::Reject,
            None,
        )
        .await;
    assert!(matches!(result, Err(EngineError::NotSubmitted { .. })));
}

#[tokio::test]
async fn gate_is_enforced_at_the_engine_not_the_caller() {
    let stores = MemoryStores::new();
    stores.seed_record(pt_record("rec-1", PtStatus::Reserved, 10, 9));
    let svc = memory_scheduler(&stores);
    let staff = StaffId::new(STAFF);

    svc.submit_month(&Actor::staff(STAFF), &staff, may())
        .await
        .unwrap();

    // Every mutating path consults the gate, not just status changes
    assert!(matches!(
        svc.reschedule(&RecordId::new("rec-1"), at(11, 9), at(11, 10))
            .await,
        Err(EngineError::MonthLocked { .. })
    ));
    assert!(matches!(
        svc.delete_record(&RecordId::new("rec-1")).await,
        Err(EngineError::MonthLocked { .. })
    ));
    assert!(matches!(
        svc.create_record(
            staff.clone(),
            gym_core::record::ClassKind::Personal {
                sub_type: gym_core::record::SubType::Break,
            },
            at(12, 9),
            at(12, 10),
        )
        .await,
        Err(EngineError::MonthLocked { .. })
    ));
}

#[tokio::test]
async fn each_staff_month_pair_locks_independently() {
    let stores = MemoryStores::new();
    stores.seed_record(pt_record("rec-1", PtStatus::Reserved, 10, 9));
    let other_staff_record = gym_core::record::ClassRecord::new(
        RecordId::new("rec-2"),
        StaffId::new("staff-2"),
        gym_core::record::ClassKind::Personal {
            sub_type: gym_core::record::SubType::Admin,
        },
        at(10, 9),
        at(10, 10),
    )
    .unwrap();
    stores.seed_record(other_staff_record);
    let svc = memory_scheduler(&stores);

    svc.submit_month(&Actor::staff(STAFF), &StaffId::new(STAFF), may())
        .await
        .unwrap();

    // staff-2's May stays open
    svc.reschedule(&RecordId::new("rec-2"), at(11, 9), at(11, 10))
        .await
        .unwrap();
}
