use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SummaryType {
    Daily,
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DailyStatus {
    None,
    InProgress,
    Completed,
}

/// Worked hours split into the buckets a summary reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourBreakdown {
    pub total_hours: Decimal,
    pub overtime_hours: Decimal,
    pub late_night_hours: Decimal,
    pub holiday_hours: Decimal,
}

impl HourBreakdown {
    pub fn zero() -> Self {
        let zero = Decimal::new(0, 2);
        Self {
            total_hours: zero,
            overtime_hours: zero,
            late_night_hours: zero,
            holiday_hours: zero,
        }
    }
}

impl std::ops::Add for HourBreakdown {
    type Output = HourBreakdown;

    fn add(self, rhs: Self) -> Self::Output {
        HourBreakdown {
            total_hours: self.total_hours + rhs.total_hours,
            overtime_hours: self.overtime_hours + rhs.overtime_hours,
            late_night_hours: self.late_night_hours + rhs.late_night_hours,
            holiday_hours: self.holiday_hours + rhs.holiday_hours,
        }
    }
}

impl std::iter::Sum for HourBreakdown {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(HourBreakdown::zero(), |acc, h| acc + h)
    }
}

/// Stored aggregate, keyed by (user_id, target_date, summary_type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    #[schema(example = 1000)]
    pub user_id: u64,

    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub target_date: NaiveDate,

    #[schema(example = "9.00", value_type = String)]
    pub total_hours: Decimal,

    #[schema(example = "1.00", value_type = String)]
    pub overtime_hours: Decimal,

    #[schema(example = "0.00", value_type = String)]
    pub late_night_hours: Decimal,

    #[schema(example = "0.00", value_type = String)]
    pub holiday_hours: Decimal,

    #[schema(example = "daily")]
    pub summary_type: SummaryType,

    #[schema(example = "2026-01-05T09:00:00Z", format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

impl AttendanceSummary {
    pub fn hours(&self) -> HourBreakdown {
        HourBreakdown {
            total_hours: self.total_hours,
            overtime_hours: self.overtime_hours,
            late_night_hours: self.late_night_hours,
            holiday_hours: self.holiday_hours,
        }
    }
}

/// On-demand view of one user's day.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    #[schema(example = 1000)]
    pub user_id: u64,

    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub target_date: NaiveDate,

    #[schema(example = "completed")]
    pub status: DailyStatus,

    #[schema(format = "date-time", value_type = String, nullable = true)]
    pub clock_in: Option<DateTime<Utc>>,

    #[schema(format = "date-time", value_type = String, nullable = true)]
    pub clock_out: Option<DateTime<Utc>>,

    #[schema(example = "9.00", value_type = String)]
    pub total_hours: Decimal,

    #[schema(example = "1.00", value_type = String)]
    pub overtime_hours: Decimal,

    #[schema(example = "0.00", value_type = String)]
    pub late_night_hours: Decimal,

    #[schema(example = "0.00", value_type = String)]
    pub holiday_hours: Decimal,
}

impl DailySummary {
    pub fn hours(&self) -> HourBreakdown {
        HourBreakdown {
            total_hours: self.total_hours,
            overtime_hours: self.overtime_hours,
            late_night_hours: self.late_night_hours,
            holiday_hours: self.holiday_hours,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    #[schema(example = 1000)]
    pub user_id: u64,

    #[schema(example = 2026)]
    pub year: i32,

    #[schema(example = 1)]
    pub month: u32,

    #[schema(example = 20)]
    pub worked_days: u32,

    #[schema(example = "168.50", value_type = String)]
    pub total_hours: Decimal,

    #[schema(example = "8.50", value_type = String)]
    pub overtime_hours: Decimal,

    #[schema(example = "0.00", value_type = String)]
    pub late_night_hours: Decimal,

    #[schema(example = "0.00", value_type = String)]
    pub holiday_hours: Decimal,

    #[schema(example = "8.43", value_type = String)]
    pub average_daily_hours: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStatistics {
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,

    #[schema(example = "2026-01-31", format = "date", value_type = String)]
    pub end_date: NaiveDate,

    /// Number of summary rows aggregated.
    #[schema(example = 42)]
    pub total_records: u64,

    #[schema(example = "350.25", value_type = String)]
    pub total_hours: Decimal,

    #[schema(example = "12.00", value_type = String)]
    pub overtime_hours: Decimal,

    #[schema(example = "1.50", value_type = String)]
    pub late_night_hours: Decimal,

    #[schema(example = "0.00", value_type = String)]
    pub holiday_hours: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentStatistics {
    #[schema(example = 10)]
    pub department_id: u64,

    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,

    #[schema(example = "2026-01-31", format = "date", value_type = String)]
    pub end_date: NaiveDate,

    #[schema(example = 5)]
    pub user_count: u64,

    #[schema(example = 100)]
    pub total_records: u64,

    #[schema(example = "820.00", value_type = String)]
    pub total_hours: Decimal,

    #[schema(example = "20.00", value_type = String)]
    pub overtime_hours: Decimal,

    #[schema(example = "0.00", value_type = String)]
    pub late_night_hours: Decimal,

    #[schema(example = "0.00", value_type = String)]
    pub holiday_hours: Decimal,

    #[schema(example = "164.00", value_type = String)]
    pub average_hours_per_user: Decimal,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct DateRangeQuery {
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    /// First day of the range (inclusive)
    pub start: NaiveDate,
    #[schema(example = "2026-01-31", format = "date", value_type = String)]
    /// Last day of the range (inclusive)
    pub end: NaiveDate,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct DateQuery {
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct MonthQuery {
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = 1)]
    pub month: u32,
}
