use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Months, NaiveDate};
use futures::future::try_join_all;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use crate::error::{AppError, AppResult};
use crate::model::attendance::{AttendanceRecord, PunchType};
use crate::model::summary::{
    AttendanceSummary, DailyStatus, DailySummary, DepartmentStatistics, HourBreakdown,
    MonthlySummary, SummaryStatistics, SummaryType,
};
use crate::service::clock::Clock;
use crate::service::work_rules::{WorkRules, round_hours};
use crate::store::{AttendanceStore, DepartmentDirectory, SummaryStore};

/// Derives work-hour summaries from attendance records and owns the stored
/// summary rows.
pub struct SummaryCalculator {
    records: Arc<dyn AttendanceStore>,
    summaries: Arc<dyn SummaryStore>,
    departments: Arc<dyn DepartmentDirectory>,
    rules: Arc<WorkRules>,
    clock: Arc<dyn Clock>,
}

fn validate_range(start: NaiveDate, end: NaiveDate) -> AppResult<()> {
    if start > end {
        return Err(AppError::validation("start date must not be after end date"));
    }
    Ok(())
}

/// First and last day of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> AppResult<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::validation("invalid year or month"))?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| AppError::validation("invalid year or month"))?;
    Ok((first, last))
}

impl SummaryCalculator {
    pub fn new(
        records: Arc<dyn AttendanceStore>,
        summaries: Arc<dyn SummaryStore>,
        departments: Arc<dyn DepartmentDirectory>,
        rules: Arc<WorkRules>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            records,
            summaries,
            departments,
            rules,
            clock,
        }
    }

    /// Builds the day's view from that day's records (in any order).
    pub fn summarize_day(
        &self,
        user_id: u64,
        target_date: NaiveDate,
        records: &[AttendanceRecord],
    ) -> DailySummary {
        let clock_in = records
            .iter()
            .filter(|r| r.punch_type == PunchType::In)
            .map(|r| r.timestamp)
            .min();
        let clock_out = records
            .iter()
            .filter(|r| r.punch_type == PunchType::Out)
            .map(|r| r.timestamp)
            .max();

        let (status, hours) = match (clock_in, clock_out) {
            (Some(start), Some(end)) => (DailyStatus::Completed, self.rules.split_hours(start, end)),
            _ if records.is_empty() => (DailyStatus::None, HourBreakdown::zero()),
            // A lone punch accrues nothing until its pair exists.
            _ => (DailyStatus::InProgress, HourBreakdown::zero()),
        };

        DailySummary {
            user_id,
            target_date,
            status,
            clock_in,
            clock_out,
            total_hours: hours.total_hours,
            overtime_hours: hours.overtime_hours,
            late_night_hours: hours.late_night_hours,
            holiday_hours: hours.holiday_hours,
        }
    }

    /// Computes the day's summary without storing it.
    pub async fn get_daily_summary(&self, user_id: u64, date: NaiveDate) -> AppResult<DailySummary> {
        let records = self
            .records
            .find_by_user_between_dates(user_id, date, date)
            .await?;
        Ok(self.summarize_day(user_id, date, &records))
    }

    /// Recomputes the day's summary and upserts the stored daily row.
    #[instrument(name = "generate_daily_summary", skip(self))]
    pub async fn generate_daily_summary(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> AppResult<AttendanceSummary> {
        let daily = self.get_daily_summary(user_id, date).await?;
        let stored = self.store(user_id, date, SummaryType::Daily, daily.hours()).await?;
        debug!(status = %daily.status, total = %stored.total_hours, "Daily summary stored");
        Ok(stored)
    }

    /// Regenerates every worked day of the month and upserts the monthly row,
    /// keyed by the first day of the month.
    #[instrument(name = "generate_monthly_summary", skip(self))]
    pub async fn generate_monthly_summary(
        &self,
        user_id: u64,
        year: i32,
        month: u32,
    ) -> AppResult<MonthlySummary> {
        let (first, last) = month_bounds(year, month)?;
        let records = self
            .records
            .find_by_user_between_dates(user_id, first, last)
            .await?;

        let mut by_day: BTreeMap<NaiveDate, Vec<AttendanceRecord>> = BTreeMap::new();
        for record in records {
            by_day.entry(record.work_date).or_default().push(record);
        }

        let mut totals = HourBreakdown::zero();
        let mut worked_days = 0u32;
        for (day, day_records) in &by_day {
            let daily = self.summarize_day(user_id, *day, day_records);
            if daily.status == DailyStatus::Completed {
                worked_days += 1;
            }
            totals = totals + daily.hours();
            self.store(user_id, *day, SummaryType::Daily, daily.hours())
                .await?;
        }

        self.store(user_id, first, SummaryType::Monthly, totals)
            .await?;

        let average_daily_hours = if worked_days == 0 {
            round_hours(Decimal::ZERO)
        } else {
            round_hours(totals.total_hours / Decimal::from(worked_days))
        };

        info!(worked_days, total = %totals.total_hours, "Monthly summary stored");

        Ok(MonthlySummary {
            user_id,
            year,
            month,
            worked_days,
            total_hours: totals.total_hours,
            overtime_hours: totals.overtime_hours,
            late_night_hours: totals.late_night_hours,
            holiday_hours: totals.holiday_hours,
            average_daily_hours,
        })
    }

    /// Totals over every user's daily summaries in the range.
    pub async fn get_summary_statistics(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<SummaryStatistics> {
        validate_range(start, end)?;
        let rows = self
            .summaries
            .find_between(None, SummaryType::Daily, start, end)
            .await?;
        Ok(aggregate(start, end, &rows))
    }

    pub async fn get_personal_statistics(
        &self,
        user_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<SummaryStatistics> {
        validate_range(start, end)?;
        let rows = self
            .summaries
            .find_between(Some(user_id), SummaryType::Daily, start, end)
            .await?;
        Ok(aggregate(start, end, &rows))
    }

    #[instrument(name = "department_statistics", skip(self))]
    pub async fn get_department_statistics(
        &self,
        department_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<DepartmentStatistics> {
        validate_range(start, end)?;
        let members = self.departments.member_ids(department_id).await?;

        let per_user = try_join_all(
            members
                .iter()
                .map(|user_id| self.get_personal_statistics(*user_id, start, end)),
        )
        .await?;

        let user_count = members.len() as u64;
        let total_records: u64 = per_user.iter().map(|s| s.total_records).sum();
        let hours: HourBreakdown = per_user
            .iter()
            .map(|s| HourBreakdown {
                total_hours: s.total_hours,
                overtime_hours: s.overtime_hours,
                late_night_hours: s.late_night_hours,
                holiday_hours: s.holiday_hours,
            })
            .sum();

        let average_hours_per_user = if user_count == 0 {
            round_hours(Decimal::ZERO)
        } else {
            round_hours(hours.total_hours / Decimal::from(user_count))
        };

        debug!(user_count, "Department statistics aggregated");

        Ok(DepartmentStatistics {
            department_id,
            start_date: start,
            end_date: end,
            user_count,
            total_records,
            total_hours: hours.total_hours,
            overtime_hours: hours.overtime_hours,
            late_night_hours: hours.late_night_hours,
            holiday_hours: hours.holiday_hours,
            average_hours_per_user,
        })
    }

    async fn store(
        &self,
        user_id: u64,
        target_date: NaiveDate,
        summary_type: SummaryType,
        hours: HourBreakdown,
    ) -> AppResult<AttendanceSummary> {
        let summary = AttendanceSummary {
            user_id,
            target_date,
            total_hours: hours.total_hours,
            overtime_hours: hours.overtime_hours,
            late_night_hours: hours.late_night_hours,
            holiday_hours: hours.holiday_hours,
            summary_type,
            updated_at: self.clock.now(),
        };
        self.summaries.upsert(&summary).await?;
        Ok(summary)
    }
}

fn aggregate(start: NaiveDate, end: NaiveDate, rows: &[AttendanceSummary]) -> SummaryStatistics {
    let hours: HourBreakdown = rows.iter().map(AttendanceSummary::hours).sum();
    SummaryStatistics {
        start_date: start,
        end_date: end,
        total_records: rows.len() as u64,
        total_hours: hours.total_hours,
        overtime_hours: hours.overtime_hours,
        late_night_hours: hours.late_night_hours,
        holiday_hours: hours.holiday_hours,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn month_bounds_cover_the_calendar_month() {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(month_bounds(2026, 2).unwrap(), (date(2026, 2, 1), date(2026, 2, 28)));
        assert_eq!(month_bounds(2028, 2).unwrap(), (date(2028, 2, 1), date(2028, 2, 29)));
        assert_eq!(month_bounds(2026, 12).unwrap(), (date(2026, 12, 1), date(2026, 12, 31)));
        assert!(matches!(month_bounds(2026, 13), Err(AppError::Validation(_))));
    }

    #[test]
    fn aggregate_counts_rows_and_sums_hours() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let row = |user_id, total| AttendanceSummary {
            user_id,
            target_date: day,
            total_hours: total,
            overtime_hours: (total - dec!(8)).max(Decimal::ZERO),
            late_night_hours: Decimal::ZERO,
            holiday_hours: Decimal::ZERO,
            summary_type: SummaryType::Daily,
            updated_at: chrono::Utc::now(),
        };

        let stats = aggregate(day, day, &[row(1, dec!(9.5)), row(2, dec!(7.25))]);
        assert_eq!(stats.total_records, 2);
        assert_eq!(stats.total_hours, dec!(16.75));
        assert_eq!(stats.overtime_hours, dec!(1.5));
    }
}
