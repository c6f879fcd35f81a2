//! Journal-backed persistence across restarts.

use crate::prelude::*;
use gym_core::record::{ClassStatus, MemberId, PtStatus, RecordId, StaffId};
use gym_core::stores::{ClassRecordStore as _, MembershipLedgerStore as _};
use gym_core::submission::SubmissionStatus;
use gym_engine::Actor;

#[tokio::test]
async fn ledger_and_records_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let (svc, store) = journal_scheduler(dir.path());
        store.upsert_ledger(&membership(30, 10)).unwrap();
        store
            .upsert(&pt_record("rec-1", PtStatus::Reserved, 10, 9))
            .await
            .unwrap();

        svc.change_status(&RecordId::new("rec-1"), ClassStatus::Pt(PtStatus::Completed))
            .await
            .unwrap();
    }

    // Reopen from the journal alone
    let (_, store) = journal_scheduler(dir.path());
    let record = store.get(&RecordId::new("rec-1")).await.unwrap();
    assert_eq!(record.status(), Some(ClassStatus::Pt(PtStatus::Completed)));
    assert!(record.charged);

    let ledger = store
        .active_for_member(&MemberId::new(MEMBER))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ledger.used_sessions, 11);
}

#[tokio::test]
async fn retry_after_restart_does_not_double_charge() {
    let dir = tempfile::tempdir().unwrap();
    {
        let (svc, store) = journal_scheduler(dir.path());
        store.upsert_ledger(&membership(30, 10)).unwrap();
        store
            .upsert(&pt_record("rec-1", PtStatus::Reserved, 10, 9))
            .await
            .unwrap();
        svc.change_status(&RecordId::new("rec-1"), ClassStatus::Pt(PtStatus::Completed))
            .await
            .unwrap();
    }

    // The same transition replayed by a client after restart
    let (svc, store) = journal_scheduler(dir.path());
    svc.change_status(&RecordId::new("rec-1"), ClassStatus::Pt(PtStatus::Completed))
        .await
        .unwrap();

    let ledger = store
        .active_for_member(&MemberId::new(MEMBER))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ledger.used_sessions, 11);
}

#[tokio::test]
async fn submission_lock_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let (svc, store) = journal_scheduler(dir.path());
        store
            .upsert(&pt_record("rec-1", PtStatus::Reserved, 10, 9))
            .await
            .unwrap();
        svc.submit_month(&Actor::staff(STAFF), &StaffId::new(STAFF), may())
            .await
            .unwrap();
    }

    let (svc, _) = journal_scheduler(dir.path());
    let current = svc
        .month_status(&StaffId::new(STAFF), may())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.status, SubmissionStatus::Submitted);

    let result = svc
        .change_status(&RecordId::new("rec-1"), ClassStatus::Pt(PtStatus::Completed))
        .await;
    assert!(result.is_err());
}
