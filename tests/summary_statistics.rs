mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use common::*;
use hrm_attendance::error::{AppError, AppResult};
use hrm_attendance::model::summary::{AttendanceSummary, DailyStatus, SummaryType};
use hrm_attendance::service::clock::FixedClock;
use hrm_attendance::service::summary::SummaryCalculator;
use hrm_attendance::service::work_rules::WorkRules;
use hrm_attendance::store::SummaryStore;
use hrm_attendance::store::memory::MemoryStore;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Summary store that counts every call before delegating.
struct CountingSummaries {
    inner: Arc<MemoryStore>,
    calls: AtomicUsize,
}

#[async_trait]
impl SummaryStore for CountingSummaries {
    async fn upsert(&self, summary: &AttendanceSummary) -> AppResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.upsert(summary).await
    }

    async fn find(
        &self,
        user_id: u64,
        target_date: NaiveDate,
        summary_type: SummaryType,
    ) -> AppResult<Option<AttendanceSummary>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find(user_id, target_date, summary_type).await
    }

    async fn find_between(
        &self,
        user_id: Option<u64>,
        summary_type: SummaryType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<AttendanceSummary>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner
            .find_between(user_id, summary_type, start, end)
            .await
    }
}

#[actix_web::test]
async fn inverted_range_fails_before_touching_storage() {
    let store = Arc::new(MemoryStore::new());
    let summaries = Arc::new(CountingSummaries {
        inner: store.clone(),
        calls: AtomicUsize::new(0),
    });
    let calculator = SummaryCalculator::new(
        store.clone(),
        summaries.clone(),
        store,
        Arc::new(WorkRules::default()),
        Arc::new(FixedClock::new(tokyo(2026, 1, 5, 9, 0))),
    );

    let (start, end) = (date(2026, 1, 31), date(2026, 1, 1));
    for result in [
        calculator.get_summary_statistics(start, end).await,
        calculator.get_personal_statistics(ALICE, start, end).await,
    ] {
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
    assert!(matches!(
        calculator.get_department_statistics(DEPARTMENT, start, end).await,
        Err(AppError::Validation(_))
    ));

    assert_eq!(summaries.calls.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn daily_summary_status_reflects_punches() {
    let h = Harness::new();
    let summaries = &h.services.summaries;

    let empty = summaries
        .get_daily_summary(ALICE, date(2026, 1, 5))
        .await
        .unwrap();
    assert_eq!(empty.status, DailyStatus::None);
    assert_eq!(empty.total_hours, Decimal::ZERO);
    assert!(empty.clock_in.is_none());

    h.services
        .recorder
        .clock_in(ALICE, Some(OFFICE_LAT), Some(OFFICE_LON))
        .await
        .unwrap();

    let started = summaries
        .get_daily_summary(ALICE, date(2026, 1, 5))
        .await
        .unwrap();
    assert_eq!(started.status, DailyStatus::InProgress);
    assert_eq!(started.total_hours, Decimal::ZERO);
    assert_eq!(started.clock_in, Some(tokyo(2026, 1, 5, 9, 0)));
}

#[actix_web::test]
async fn late_night_and_holiday_hours_are_split_out() {
    let h = Harness::new();

    // Saturday, running past the start of the late-night band.
    h.work(ALICE, tokyo(2026, 1, 10, 14, 0), tokyo(2026, 1, 10, 23, 30))
        .await;

    let stored = h
        .store
        .find(ALICE, date(2026, 1, 10), SummaryType::Daily)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.total_hours, dec!(9.50));
    assert_eq!(stored.overtime_hours, dec!(1.50));
    assert_eq!(stored.late_night_hours, dec!(1.50));
    assert_eq!(stored.holiday_hours, dec!(9.50));
}

#[actix_web::test]
async fn monthly_summary_totals_worked_days() {
    let h = Harness::new();

    h.work(ALICE, tokyo(2026, 1, 5, 9, 0), tokyo(2026, 1, 5, 18, 0))
        .await;
    h.work(ALICE, tokyo(2026, 1, 6, 9, 0), tokyo(2026, 1, 6, 16, 30))
        .await;
    // Clock-in only: counted as a day in progress, not worked.
    h.at(tokyo(2026, 1, 7, 9, 0));
    h.services
        .recorder
        .clock_in(ALICE, Some(OFFICE_LAT), Some(OFFICE_LON))
        .await
        .unwrap();

    let monthly = h
        .services
        .summaries
        .generate_monthly_summary(ALICE, 2026, 1)
        .await
        .unwrap();
    assert_eq!(monthly.worked_days, 2);
    assert_eq!(monthly.total_hours, dec!(16.50));
    assert_eq!(monthly.overtime_hours, dec!(1.00));
    assert_eq!(monthly.average_daily_hours, dec!(8.25));

    let row = h
        .store
        .find(ALICE, date(2026, 1, 1), SummaryType::Monthly)
        .await
        .unwrap()
        .expect("monthly row keyed by the first of the month");
    assert_eq!(row.total_hours, dec!(16.50));

    let invalid = h
        .services
        .summaries
        .generate_monthly_summary(ALICE, 2026, 13)
        .await;
    assert!(matches!(invalid, Err(AppError::Validation(_))));
}

#[actix_web::test]
async fn statistics_aggregate_daily_rows() {
    let h = Harness::new();

    h.work(ALICE, tokyo(2026, 1, 5, 9, 0), tokyo(2026, 1, 5, 18, 0))
        .await;
    h.work(BOB, tokyo(2026, 1, 5, 10, 0), tokyo(2026, 1, 5, 17, 0))
        .await;
    h.work(ALICE, tokyo(2026, 1, 6, 9, 0), tokyo(2026, 1, 6, 19, 0))
        .await;
    // Monthly rows are not double counted.
    h.services
        .summaries
        .generate_monthly_summary(ALICE, 2026, 1)
        .await
        .unwrap();

    let summaries = &h.services.summaries;
    let all = summaries
        .get_summary_statistics(date(2026, 1, 1), date(2026, 1, 31))
        .await
        .unwrap();
    assert_eq!(all.total_records, 3);
    assert_eq!(all.total_hours, dec!(26.00));
    assert_eq!(all.overtime_hours, dec!(3.00));

    let alice = summaries
        .get_personal_statistics(ALICE, date(2026, 1, 6), date(2026, 1, 6))
        .await
        .unwrap();
    assert_eq!(alice.total_records, 1);
    assert_eq!(alice.total_hours, dec!(10.00));

    let department = summaries
        .get_department_statistics(DEPARTMENT, date(2026, 1, 1), date(2026, 1, 31))
        .await
        .unwrap();
    assert_eq!(department.user_count, 2);
    assert_eq!(department.total_records, 3);
    assert_eq!(department.total_hours, dec!(26.00));
    assert_eq!(department.average_hours_per_user, dec!(13.00));
}

#[actix_web::test]
async fn empty_department_reports_zeros() {
    let h = Harness::new();

    let stats = h
        .services
        .summaries
        .get_department_statistics(99, date(2026, 1, 1), date(2026, 1, 31))
        .await
        .unwrap();
    assert_eq!(stats.user_count, 0);
    assert_eq!(stats.total_records, 0);
    assert_eq!(stats.total_hours, Decimal::ZERO);
    assert_eq!(stats.average_hours_per_user, Decimal::ZERO);
}
