mod common;

use common::*;
use hrm_attendance::error::AppError;
use hrm_attendance::model::attendance::{AttendanceStatus, ClockRequest, PunchType};
use hrm_attendance::model::summary::{DailyStatus, SummaryType};
use hrm_attendance::store::SummaryStore;
use rust_decimal_macros::dec;

fn conflict_message(err: AppError) -> String {
    match err {
        AppError::Conflict(message) => message,
        other => panic!("expected a conflict, got {other:?}"),
    }
}

#[actix_web::test]
async fn geofence_accepts_99m_and_rejects_101m() {
    let h = Harness::new();

    let err = h
        .services
        .recorder
        .clock_in(ALICE, Some(north_of_office(101.0)), Some(OFFICE_LON))
        .await
        .unwrap_err();
    match err {
        AppError::Validation(message) => {
            assert_eq!(message, "more than 100m from office; punch rejected")
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let record = h
        .services
        .recorder
        .clock_in(ALICE, Some(north_of_office(99.0)), Some(OFFICE_LON))
        .await
        .unwrap();
    assert_eq!(record.punch_type, PunchType::In);
    assert_eq!(record.work_date, date(2026, 1, 5));
}

#[actix_web::test]
async fn missing_coordinates_are_rejected_even_when_check_is_skipped() {
    let h = Harness::new();

    let err = h
        .services
        .recorder
        .clock_in(REMOTE, None, Some(OFFICE_LON))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Far from any office, but the user may punch from anywhere.
    let record = h
        .services
        .recorder
        .clock_in(REMOTE, Some(34.0), Some(135.0))
        .await
        .unwrap();
    assert_eq!(record.user_id, REMOTE);
}

#[actix_web::test]
async fn unknown_user_cannot_punch() {
    let h = Harness::new();
    let err = h
        .services
        .recorder
        .clock_in(404, Some(OFFICE_LAT), Some(OFFICE_LON))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[actix_web::test]
async fn second_clock_in_on_same_day_conflicts() {
    let h = Harness::new();
    let recorder = &h.services.recorder;

    recorder
        .clock_in(ALICE, Some(OFFICE_LAT), Some(OFFICE_LON))
        .await
        .unwrap();

    h.clock.advance(chrono::Duration::hours(2));
    let err = recorder
        .clock_in(ALICE, Some(OFFICE_LAT), Some(OFFICE_LON))
        .await
        .unwrap_err();
    assert_eq!(conflict_message(err), "already clocked in");
}

#[actix_web::test]
async fn clock_out_requires_clock_in_and_happens_once() {
    let h = Harness::new();
    let recorder = &h.services.recorder;

    let err = recorder
        .clock_out(ALICE, Some(OFFICE_LAT), Some(OFFICE_LON))
        .await
        .unwrap_err();
    assert_eq!(conflict_message(err), "no clock-in");
    assert_eq!(h.store.summary_count().unwrap(), 0);

    h.work(ALICE, tokyo(2026, 1, 5, 9, 0), tokyo(2026, 1, 5, 18, 0))
        .await;

    h.at(tokyo(2026, 1, 5, 19, 0));
    let err = recorder
        .clock_out(ALICE, Some(OFFICE_LAT), Some(OFFICE_LON))
        .await
        .unwrap_err();
    assert_eq!(conflict_message(err), "already clocked out");
}

#[actix_web::test]
async fn duplicate_window_spans_midnight() {
    let h = Harness::new();
    let recorder = &h.services.recorder;

    h.at(tokyo(2026, 1, 5, 23, 58));
    recorder
        .clock_in(ALICE, Some(OFFICE_LAT), Some(OFFICE_LON))
        .await
        .unwrap();

    // New local day, but only three minutes later.
    h.at(tokyo(2026, 1, 6, 0, 1));
    let err = recorder
        .clock_in(ALICE, Some(OFFICE_LAT), Some(OFFICE_LON))
        .await
        .unwrap_err();
    assert_eq!(conflict_message(err), "duplicate clock-in within 5 minutes");

    h.at(tokyo(2026, 1, 6, 0, 4));
    let record = recorder
        .clock_in(ALICE, Some(OFFICE_LAT), Some(OFFICE_LON))
        .await
        .unwrap();
    assert_eq!(record.work_date, date(2026, 1, 6));
}

#[actix_web::test]
async fn clock_out_stores_daily_summary() {
    let h = Harness::new();

    h.work(ALICE, tokyo(2026, 1, 5, 9, 0), tokyo(2026, 1, 5, 18, 0))
        .await;

    let stored = h
        .store
        .find(ALICE, date(2026, 1, 5), SummaryType::Daily)
        .await
        .unwrap()
        .expect("daily summary written on clock-out");
    assert_eq!(stored.total_hours, dec!(9.00));
    assert_eq!(stored.overtime_hours, dec!(1.00));
    assert_eq!(stored.late_night_hours, dec!(0));
    assert_eq!(stored.holiday_hours, dec!(0));

    let daily = h
        .services
        .summaries
        .get_daily_summary(ALICE, date(2026, 1, 5))
        .await
        .unwrap();
    assert_eq!(daily.status, DailyStatus::Completed);
    assert_eq!(daily.total_hours, dec!(9.00));
}

#[actix_web::test]
async fn status_follows_the_latest_punch() {
    let h = Harness::new();
    let recorder = &h.services.recorder;

    assert_eq!(recorder.current_status(ALICE).await.unwrap(), AttendanceStatus::None);

    recorder
        .clock_in(ALICE, Some(OFFICE_LAT), Some(OFFICE_LON))
        .await
        .unwrap();
    assert_eq!(recorder.current_status(ALICE).await.unwrap(), AttendanceStatus::In);

    h.at(tokyo(2026, 1, 5, 17, 30));
    recorder
        .clock_out(ALICE, Some(OFFICE_LAT), Some(OFFICE_LON))
        .await
        .unwrap();
    assert_eq!(recorder.current_status(ALICE).await.unwrap(), AttendanceStatus::Out);

    h.at(tokyo(2026, 1, 6, 8, 0));
    assert_eq!(recorder.current_status(ALICE).await.unwrap(), AttendanceStatus::None);
}

#[actix_web::test]
async fn request_object_reports_rule_failures_as_values() {
    let h = Harness::new();
    let recorder = &h.services.recorder;

    let request = |punch_type| ClockRequest {
        user_id: ALICE,
        punch_type,
        latitude: Some(OFFICE_LAT),
        longitude: Some(OFFICE_LON),
    };

    let ok = recorder.handle(request(PunchType::In)).await.unwrap();
    assert!(ok.success);
    assert_eq!(ok.status, Some(AttendanceStatus::In));
    assert!(ok.record.is_some());

    let failed = recorder.handle(request(PunchType::In)).await.unwrap();
    assert!(!failed.success);
    assert_eq!(failed.message, "already clocked in");
    assert!(failed.record.is_none());

    let far = recorder
        .handle(ClockRequest {
            latitude: Some(north_of_office(500.0)),
            ..request(PunchType::Out)
        })
        .await
        .unwrap();
    assert!(!far.success);
    assert_eq!(far.message, "more than 100m from office; punch rejected");
}

#[actix_web::test]
async fn records_between_checks_range_and_orders_oldest_first() {
    let h = Harness::new();

    h.work(ALICE, tokyo(2026, 1, 5, 9, 0), tokyo(2026, 1, 5, 18, 0))
        .await;
    h.work(ALICE, tokyo(2026, 1, 6, 9, 0), tokyo(2026, 1, 6, 17, 0))
        .await;

    let records = h
        .services
        .recorder
        .records_between(ALICE, date(2026, 1, 5), date(2026, 1, 6))
        .await
        .unwrap();
    assert_eq!(records.len(), 4);
    assert!(records.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

    let err = h
        .services
        .recorder
        .records_between(ALICE, date(2026, 1, 6), date(2026, 1, 5))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[actix_web::test]
async fn duplicate_clock_out_window_spans_midnight() {
    let h = Harness::new();

    h.work(ALICE, tokyo(2026, 1, 5, 23, 50), tokyo(2026, 1, 5, 23, 58))
        .await;

    h.at(tokyo(2026, 1, 6, 0, 0));
    h.services
        .recorder
        .clock_in(ALICE, Some(OFFICE_LAT), Some(OFFICE_LON))
        .await
        .unwrap();

    // Three minutes after yesterday's clock-out.
    h.at(tokyo(2026, 1, 6, 0, 1));
    let err = h
        .services
        .recorder
        .clock_out(ALICE, Some(OFFICE_LAT), Some(OFFICE_LON))
        .await
        .unwrap_err();
    assert_eq!(conflict_message(err), "duplicate clock-out within 5 minutes");
}
