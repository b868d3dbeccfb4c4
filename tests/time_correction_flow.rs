mod common;

use common::*;
use hrm_attendance::error::AppError;
use hrm_attendance::model::attendance::{AttendanceRecord, PunchType};
use hrm_attendance::model::summary::SummaryType;
use hrm_attendance::model::time_correction::{
    CorrectionStatus, CreateTimeCorrection, RequestType,
};
use hrm_attendance::store::SummaryStore;
use rust_decimal_macros::dec;

/// A completed 09:00-18:00 Monday for Alice; returns the clock-in record.
async fn worked_day(h: &Harness) -> AttendanceRecord {
    h.work(ALICE, tokyo(2026, 1, 5, 9, 0), tokyo(2026, 1, 5, 18, 0))
        .await;
    h.services
        .recorder
        .records_between(ALICE, date(2026, 1, 5), date(2026, 1, 5))
        .await
        .unwrap()
        .into_iter()
        .find(|r| r.punch_type == PunchType::In)
        .unwrap()
}

fn earlier_arrival(attendance_id: u64) -> CreateTimeCorrection {
    CreateTimeCorrection {
        attendance_id,
        request_type: "time".to_string(),
        requested_time: Some(tokyo(2026, 1, 5, 8, 30)),
        requested_type: None,
        reason: Some("Badge reader was down".to_string()),
    }
}

#[actix_web::test]
async fn time_request_needs_a_requested_time() {
    let h = Harness::new();
    let record = worked_day(&h).await;

    let err = h
        .services
        .corrections
        .create(
            CreateTimeCorrection {
                requested_time: None,
                ..earlier_arrival(record.id)
            },
            ALICE,
        )
        .await
        .unwrap_err();
    match err {
        AppError::Validation(message) => assert_eq!(message, "requested time required"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(h.services.corrections.pending_count(None).await.unwrap(), 0);
}

#[actix_web::test]
async fn cannot_correct_another_users_record() {
    let h = Harness::new();
    let record = worked_day(&h).await;

    let err = h
        .services
        .corrections
        .create(earlier_arrival(record.id), BOB)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let missing = h
        .services
        .corrections
        .create(earlier_arrival(9_999), ALICE)
        .await
        .unwrap_err();
    assert!(matches!(missing, AppError::NotFound(_)));
}

#[actix_web::test]
async fn created_correction_is_pending() {
    let h = Harness::new();
    let record = worked_day(&h).await;

    let correction = h
        .services
        .corrections
        .create(earlier_arrival(record.id), ALICE)
        .await
        .unwrap();
    assert_eq!(correction.status, CorrectionStatus::Pending);
    assert_eq!(correction.request_type, RequestType::Time);
    assert_eq!(correction.current_type, PunchType::In);
    assert_eq!(correction.requested_type, None);
    assert!(correction.approver_id.is_none());

    let workflow = &h.services.corrections;
    assert_eq!(workflow.pending_count(None).await.unwrap(), 1);
    assert_eq!(workflow.pending_count(Some(ALICE)).await.unwrap(), 1);
    assert_eq!(workflow.pending_count(Some(BOB)).await.unwrap(), 0);
    assert_eq!(workflow.list_pending().await.unwrap().len(), 1);
    assert_eq!(workflow.list_by_user(ALICE).await.unwrap()[0].id, correction.id);
}

#[actix_web::test]
async fn second_decision_is_rejected_and_first_stands() {
    let h = Harness::new();
    let record = worked_day(&h).await;
    let workflow = &h.services.corrections;

    let correction = workflow
        .create(earlier_arrival(record.id), ALICE)
        .await
        .unwrap();

    h.at(tokyo(2026, 1, 6, 10, 0));
    let approved = workflow.approve(correction.id, MANAGER).await.unwrap();
    assert_eq!(approved.status, CorrectionStatus::Approved);
    assert_eq!(approved.approver_id, Some(MANAGER));
    assert_eq!(approved.approved_at, Some(tokyo(2026, 1, 6, 10, 0)));

    for second in [
        workflow.approve(correction.id, MANAGER).await,
        workflow.reject(correction.id, MANAGER).await,
    ] {
        match second {
            Err(AppError::Conflict(message)) => assert_eq!(message, "already processed"),
            other => panic!("expected already processed, got {other:?}"),
        }
    }

    let current = workflow.get_by_id(correction.id).await.unwrap();
    assert_eq!(current.status, CorrectionStatus::Approved);
    assert_eq!(workflow.pending_count(None).await.unwrap(), 0);
}

#[actix_web::test]
async fn rejection_needs_a_known_approver() {
    let h = Harness::new();
    let record = worked_day(&h).await;
    let workflow = &h.services.corrections;

    let correction = workflow
        .create(earlier_arrival(record.id), ALICE)
        .await
        .unwrap();

    let err = workflow.reject(correction.id, 404).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let rejected = workflow.reject(correction.id, MANAGER).await.unwrap();
    assert_eq!(rejected.status, CorrectionStatus::Rejected);

    let err = h
        .services
        .recorder
        .apply_correction(correction.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[actix_web::test]
async fn applying_an_approved_correction_amends_record_and_summary() {
    let h = Harness::new();
    let record = worked_day(&h).await;
    let workflow = &h.services.corrections;

    let correction = workflow
        .create(earlier_arrival(record.id), ALICE)
        .await
        .unwrap();

    let not_yet = h
        .services
        .recorder
        .apply_correction(correction.id)
        .await
        .unwrap_err();
    match not_yet {
        AppError::Conflict(message) => assert_eq!(message, "correction is not approved"),
        other => panic!("unexpected error: {other:?}"),
    }

    workflow.approve(correction.id, MANAGER).await.unwrap();
    let amended = h
        .services
        .recorder
        .apply_correction(correction.id)
        .await
        .unwrap();
    assert_eq!(amended.id, record.id);
    assert_eq!(amended.timestamp, tokyo(2026, 1, 5, 8, 30));
    assert_eq!(amended.punch_type, PunchType::In);

    let stored = h
        .store
        .find(ALICE, date(2026, 1, 5), SummaryType::Daily)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.total_hours, dec!(9.50));
    assert_eq!(stored.overtime_hours, dec!(1.50));
}

#[actix_web::test]
async fn applied_correction_cannot_be_applied_again() {
    let h = Harness::new();
    let record = worked_day(&h).await;
    let workflow = &h.services.corrections;

    let correction = workflow
        .create(earlier_arrival(record.id), ALICE)
        .await
        .unwrap();
    workflow.approve(correction.id, MANAGER).await.unwrap();

    h.at(tokyo(2026, 1, 6, 9, 0));
    h.services
        .recorder
        .apply_correction(correction.id)
        .await
        .unwrap();
    assert_eq!(
        workflow.get_by_id(correction.id).await.unwrap().applied_at,
        Some(tokyo(2026, 1, 6, 9, 0))
    );

    let err = h
        .services
        .recorder
        .apply_correction(correction.id)
        .await
        .unwrap_err();
    match err {
        AppError::Conflict(message) => assert_eq!(message, "correction already applied"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[actix_web::test]
async fn older_correction_does_not_overwrite_a_newer_application() {
    let h = Harness::new();
    let record = worked_day(&h).await;
    let workflow = &h.services.corrections;

    let first = workflow
        .create(earlier_arrival(record.id), ALICE)
        .await
        .unwrap();
    let second = workflow
        .create(
            CreateTimeCorrection {
                requested_time: Some(tokyo(2026, 1, 5, 8, 45)),
                ..earlier_arrival(record.id)
            },
            ALICE,
        )
        .await
        .unwrap();
    workflow.approve(first.id, MANAGER).await.unwrap();
    workflow.approve(second.id, MANAGER).await.unwrap();

    h.at(tokyo(2026, 1, 6, 9, 0));
    h.services
        .recorder
        .apply_correction(second.id)
        .await
        .unwrap();

    let err = h
        .services
        .recorder
        .apply_correction(first.id)
        .await
        .unwrap_err();
    match err {
        AppError::Conflict(message) => assert_eq!(message, "correction is stale"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(workflow.get_by_id(first.id).await.unwrap().applied_at.is_none());

    let kept = h
        .services
        .recorder
        .records_between(ALICE, date(2026, 1, 5), date(2026, 1, 5))
        .await
        .unwrap()
        .into_iter()
        .find(|r| r.id == record.id)
        .unwrap();
    assert_eq!(kept.timestamp, tokyo(2026, 1, 5, 8, 45));

    // Filed after the application, so it describes the current record.
    let refiled = workflow
        .create(earlier_arrival(record.id), ALICE)
        .await
        .unwrap();
    workflow.approve(refiled.id, MANAGER).await.unwrap();
    let amended = h
        .services
        .recorder
        .apply_correction(refiled.id)
        .await
        .unwrap();
    assert_eq!(amended.timestamp, tokyo(2026, 1, 5, 8, 30));
}

#[actix_web::test]
async fn correction_filed_against_the_old_type_is_stale() {
    let h = Harness::new();
    h.at(tokyo(2026, 1, 5, 9, 0));
    let record = h
        .services
        .recorder
        .clock_in(ALICE, Some(OFFICE_LAT), Some(OFFICE_LON))
        .await
        .unwrap();
    let workflow = &h.services.corrections;

    let retype = workflow
        .create(
            CreateTimeCorrection {
                request_type: "type".to_string(),
                requested_time: None,
                requested_type: Some("out".to_string()),
                ..earlier_arrival(record.id)
            },
            ALICE,
        )
        .await
        .unwrap();
    let retime = workflow
        .create(earlier_arrival(record.id), ALICE)
        .await
        .unwrap();
    assert_eq!(retime.current_type, PunchType::In);
    workflow.approve(retype.id, MANAGER).await.unwrap();
    workflow.approve(retime.id, MANAGER).await.unwrap();

    let amended = h
        .services
        .recorder
        .apply_correction(retype.id)
        .await
        .unwrap();
    assert_eq!(amended.punch_type, PunchType::Out);

    let err = h
        .services
        .recorder
        .apply_correction(retime.id)
        .await
        .unwrap_err();
    match err {
        AppError::Conflict(message) => assert_eq!(message, "correction is stale"),
        other => panic!("unexpected error: {other:?}"),
    }
}
