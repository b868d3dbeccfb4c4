use std::str::FromStr;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, MySqlPool};

use crate::error::{AppError, AppResult};
use crate::model::attendance::{AttendanceRecord, NewAttendanceRecord, PunchType};
use crate::model::summary::{AttendanceSummary, SummaryType};
use crate::model::time_correction::{CorrectionStatus, NewTimeCorrection, TimeCorrection};
use crate::model::user::User;
use crate::model::work_location::{LocationType, WorkLocation};
use crate::store::{
    AttendanceStore, CorrectionStore, DUPLICATE_PUNCH, DepartmentDirectory, SummaryStore,
    UserDirectory, WorkLocationDirectory,
};

/// All collaborators backed by one MySQL pool.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn parse_column<T: FromStr>(value: &str, column: &str) -> AppResult<T> {
    value
        .parse()
        .map_err(|_| AppError::Unexpected(anyhow!("unexpected value {value:?} in column {column}")))
}

#[derive(FromRow)]
struct UserRow {
    id: u64,
    name: String,
    location_type: String,
    skip_location_check: bool,
    hire_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    department_id: Option<u64>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> AppResult<Self> {
        Ok(User {
            id: row.id,
            name: row.name,
            location_type: parse_column(&row.location_type, "users.location_type")?,
            skip_location_check: row.skip_location_check,
            hire_date: row.hire_date,
            created_at: row.created_at,
            department_id: row.department_id,
        })
    }
}

#[derive(FromRow)]
struct WorkLocationRow {
    id: u64,
    name: String,
    location_type: String,
    latitude: f64,
    longitude: f64,
    radius_meters: f64,
}

impl TryFrom<WorkLocationRow> for WorkLocation {
    type Error = AppError;

    fn try_from(row: WorkLocationRow) -> AppResult<Self> {
        Ok(WorkLocation {
            id: row.id,
            name: row.name,
            location_type: parse_column(&row.location_type, "work_locations.location_type")?,
            latitude: row.latitude,
            longitude: row.longitude,
            radius_meters: row.radius_meters,
        })
    }
}

#[derive(FromRow)]
struct AttendanceRow {
    id: u64,
    user_id: u64,
    record_type: String,
    recorded_at: DateTime<Utc>,
    work_date: NaiveDate,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = AppError;

    fn try_from(row: AttendanceRow) -> AppResult<Self> {
        Ok(AttendanceRecord {
            id: row.id,
            user_id: row.user_id,
            punch_type: parse_column(&row.record_type, "attendance_records.record_type")?,
            timestamp: row.recorded_at,
            work_date: row.work_date,
            latitude: row.latitude,
            longitude: row.longitude,
        })
    }
}

// Hour columns are nullable in older rows; a missing value counts as zero.
#[derive(FromRow)]
struct SummaryRow {
    user_id: u64,
    target_date: NaiveDate,
    summary_type: String,
    total_hours: Option<Decimal>,
    overtime_hours: Option<Decimal>,
    late_night_hours: Option<Decimal>,
    holiday_hours: Option<Decimal>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SummaryRow> for AttendanceSummary {
    type Error = AppError;

    fn try_from(row: SummaryRow) -> AppResult<Self> {
        Ok(AttendanceSummary {
            user_id: row.user_id,
            target_date: row.target_date,
            total_hours: row.total_hours.unwrap_or_default(),
            overtime_hours: row.overtime_hours.unwrap_or_default(),
            late_night_hours: row.late_night_hours.unwrap_or_default(),
            holiday_hours: row.holiday_hours.unwrap_or_default(),
            summary_type: parse_column(&row.summary_type, "attendance_summaries.summary_type")?,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct CorrectionRow {
    id: u64,
    user_id: u64,
    attendance_id: u64,
    request_type: String,
    current_type: String,
    requested_time: Option<DateTime<Utc>>,
    requested_type: Option<String>,
    reason: String,
    status: String,
    approver_id: Option<u64>,
    approved_at: Option<DateTime<Utc>>,
    applied_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CorrectionRow> for TimeCorrection {
    type Error = AppError;

    fn try_from(row: CorrectionRow) -> AppResult<Self> {
        let requested_type = match row.requested_type.as_deref() {
            Some(value) => Some(parse_column(value, "time_corrections.requested_type")?),
            None => None,
        };

        Ok(TimeCorrection {
            id: row.id,
            user_id: row.user_id,
            attendance_id: row.attendance_id,
            request_type: parse_column(&row.request_type, "time_corrections.request_type")?,
            current_type: parse_column(&row.current_type, "time_corrections.current_type")?,
            requested_time: row.requested_time,
            requested_type,
            reason: row.reason,
            status: parse_column(&row.status, "time_corrections.status")?,
            approver_id: row.approver_id,
            approved_at: row.approved_at,
            applied_at: row.applied_at,
            created_at: row.created_at,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> AppResult<Vec<T>>
where
    T: TryFrom<R, Error = AppError>,
{
    rows.into_iter().map(T::try_from).collect()
}

const ATTENDANCE_COLUMNS: &str =
    "id, user_id, record_type, recorded_at, work_date, latitude, longitude";

const SUMMARY_COLUMNS: &str = "user_id, target_date, summary_type, total_hours, overtime_hours, \
     late_night_hours, holiday_hours, updated_at";

const CORRECTION_COLUMNS: &str = "id, user_id, attendance_id, request_type, current_type, \
     requested_time, requested_type, reason, status, approver_id, approved_at, applied_at, created_at";

#[async_trait]
impl UserDirectory for MySqlStore {
    async fn find_user(&self, user_id: u64) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, location_type, skip_location_check, hire_date, created_at, department_id
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl WorkLocationDirectory for MySqlStore {
    async fn find_by_type(&self, location_type: LocationType) -> AppResult<Vec<WorkLocation>> {
        let rows = sqlx::query_as::<_, WorkLocationRow>(
            r#"
            SELECT id, name, location_type, latitude, longitude, radius_meters
            FROM work_locations
            WHERE location_type = ?
            ORDER BY id
            "#,
        )
        .bind(location_type.to_string())
        .fetch_all(&self.pool)
        .await?;

        convert_all(rows)
    }
}

#[async_trait]
impl DepartmentDirectory for MySqlStore {
    async fn member_ids(&self, department_id: u64) -> AppResult<Vec<u64>> {
        let ids = sqlx::query_scalar::<_, u64>(
            "SELECT id FROM users WHERE department_id = ? ORDER BY id",
        )
        .bind(department_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn insert(&self, record: NewAttendanceRecord) -> AppResult<AttendanceRecord> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance_records
                (user_id, record_type, recorded_at, work_date, latitude, longitude)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.user_id)
        .bind(record.punch_type.to_string())
        .bind(record.timestamp)
        .bind(record.work_date)
        .bind(record.latitude)
        .bind(record.longitude)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_insert(e, DUPLICATE_PUNCH))?;

        Ok(AttendanceRecord {
            id: result.last_insert_id(),
            user_id: record.user_id,
            punch_type: record.punch_type,
            timestamp: record.timestamp,
            work_date: record.work_date,
            latitude: record.latitude,
            longitude: record.longitude,
        })
    }

    async fn find_by_id(&self, id: u64) -> AppResult<Option<AttendanceRecord>> {
        let sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance_records WHERE id = ?");
        let row = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(AttendanceRecord::try_from).transpose()
    }

    async fn find_by_user_between_dates(
        &self,
        user_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<AttendanceRecord>> {
        let sql = format!(
            r#"
            SELECT {ATTENDANCE_COLUMNS}
            FROM attendance_records
            WHERE user_id = ?
            AND work_date BETWEEN ? AND ?
            ORDER BY recorded_at, id
            "#
        );
        let rows = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(user_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        convert_all(rows)
    }

    async fn find_by_user_since(
        &self,
        user_id: u64,
        punch_type: PunchType,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<AttendanceRecord>> {
        let sql = format!(
            r#"
            SELECT {ATTENDANCE_COLUMNS}
            FROM attendance_records
            WHERE user_id = ?
            AND record_type = ?
            AND recorded_at >= ?
            ORDER BY recorded_at, id
            "#
        );
        let rows = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(user_id)
            .bind(punch_type.to_string())
            .bind(since)
            .fetch_all(&self.pool)
            .await?;

        convert_all(rows)
    }

    async fn amend(
        &self,
        id: u64,
        punch_type: PunchType,
        timestamp: DateTime<Utc>,
        work_date: NaiveDate,
    ) -> AppResult<AttendanceRecord> {
        let result = sqlx::query(
            r#"
            UPDATE attendance_records
            SET record_type = ?, recorded_at = ?, work_date = ?
            WHERE id = ?
            "#,
        )
        .bind(punch_type.to_string())
        .bind(timestamp)
        .bind(work_date)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_insert(e, DUPLICATE_PUNCH))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("attendance record not found"));
        }

        AttendanceStore::find_by_id(self, id)
            .await?
            .ok_or_else(|| AppError::not_found("attendance record not found"))
    }
}

#[async_trait]
impl SummaryStore for MySqlStore {
    async fn upsert(&self, summary: &AttendanceSummary) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO attendance_summaries
                (user_id, target_date, summary_type, total_hours, overtime_hours,
                 late_night_hours, holiday_hours, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                total_hours = VALUES(total_hours),
                overtime_hours = VALUES(overtime_hours),
                late_night_hours = VALUES(late_night_hours),
                holiday_hours = VALUES(holiday_hours),
                updated_at = VALUES(updated_at)
            "#,
        )
        .bind(summary.user_id)
        .bind(summary.target_date)
        .bind(summary.summary_type.to_string())
        .bind(summary.total_hours)
        .bind(summary.overtime_hours)
        .bind(summary.late_night_hours)
        .bind(summary.holiday_hours)
        .bind(summary.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(
        &self,
        user_id: u64,
        target_date: NaiveDate,
        summary_type: SummaryType,
    ) -> AppResult<Option<AttendanceSummary>> {
        let sql = format!(
            r#"
            SELECT {SUMMARY_COLUMNS}
            FROM attendance_summaries
            WHERE user_id = ? AND target_date = ? AND summary_type = ?
            "#
        );
        let row = sqlx::query_as::<_, SummaryRow>(&sql)
            .bind(user_id)
            .bind(target_date)
            .bind(summary_type.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(AttendanceSummary::try_from).transpose()
    }

    async fn find_between(
        &self,
        user_id: Option<u64>,
        summary_type: SummaryType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<AttendanceSummary>> {
        let mut sql = format!(
            r#"
            SELECT {SUMMARY_COLUMNS}
            FROM attendance_summaries
            WHERE summary_type = ?
            AND target_date BETWEEN ? AND ?
            "#
        );
        if user_id.is_some() {
            sql.push_str(" AND user_id = ?");
        }
        sql.push_str(" ORDER BY target_date, user_id");

        let mut query = sqlx::query_as::<_, SummaryRow>(&sql)
            .bind(summary_type.to_string())
            .bind(start)
            .bind(end);
        if let Some(user_id) = user_id {
            query = query.bind(user_id);
        }

        let rows = query.fetch_all(&self.pool).await?;
        convert_all(rows)
    }
}

#[async_trait]
impl CorrectionStore for MySqlStore {
    async fn insert(&self, correction: NewTimeCorrection) -> AppResult<TimeCorrection> {
        let result = sqlx::query(
            r#"
            INSERT INTO time_corrections
                (user_id, attendance_id, request_type, current_type, requested_time,
                 requested_type, reason, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, 'pending', ?)
            "#,
        )
        .bind(correction.user_id)
        .bind(correction.attendance_id)
        .bind(correction.request_type.to_string())
        .bind(correction.current_type.to_string())
        .bind(correction.requested_time)
        .bind(correction.requested_type.map(|t| t.to_string()))
        .bind(&correction.reason)
        .bind(correction.created_at)
        .execute(&self.pool)
        .await?;

        Ok(TimeCorrection {
            id: result.last_insert_id(),
            user_id: correction.user_id,
            attendance_id: correction.attendance_id,
            request_type: correction.request_type,
            current_type: correction.current_type,
            requested_time: correction.requested_time,
            requested_type: correction.requested_type,
            reason: correction.reason,
            status: CorrectionStatus::Pending,
            approver_id: None,
            approved_at: None,
            applied_at: None,
            created_at: correction.created_at,
        })
    }

    async fn find_by_id(&self, id: u64) -> AppResult<Option<TimeCorrection>> {
        let sql = format!("SELECT {CORRECTION_COLUMNS} FROM time_corrections WHERE id = ?");
        let row = sqlx::query_as::<_, CorrectionRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TimeCorrection::try_from).transpose()
    }

    async fn find_by_user(&self, user_id: u64) -> AppResult<Vec<TimeCorrection>> {
        let sql = format!(
            "SELECT {CORRECTION_COLUMNS} FROM time_corrections \
             WHERE user_id = ? ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, CorrectionRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        convert_all(rows)
    }

    async fn find_by_attendance(&self, attendance_id: u64) -> AppResult<Vec<TimeCorrection>> {
        let sql = format!(
            "SELECT {CORRECTION_COLUMNS} FROM time_corrections \
             WHERE attendance_id = ? ORDER BY created_at, id"
        );
        let rows = sqlx::query_as::<_, CorrectionRow>(&sql)
            .bind(attendance_id)
            .fetch_all(&self.pool)
            .await?;

        convert_all(rows)
    }

    async fn find_pending(&self) -> AppResult<Vec<TimeCorrection>> {
        let sql = format!(
            "SELECT {CORRECTION_COLUMNS} FROM time_corrections \
             WHERE status = 'pending' ORDER BY created_at, id"
        );
        let rows = sqlx::query_as::<_, CorrectionRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        convert_all(rows)
    }

    async fn count_pending(&self, user_id: Option<u64>) -> AppResult<u64> {
        let count = match user_id {
            Some(user_id) => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM time_corrections WHERE status = 'pending' AND user_id = ?",
                )
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM time_corrections WHERE status = 'pending'",
                )
                .fetch_one(&self.pool)
                .await?
            }
        };

        Ok(count.max(0) as u64)
    }

    async fn decide(
        &self,
        id: u64,
        status: CorrectionStatus,
        approver_id: u64,
        decided_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE time_corrections
            SET status = ?, approver_id = ?, approved_at = ?
            WHERE id = ?
            AND status = 'pending'
            "#,
        )
        .bind(status.to_string())
        .bind(approver_id)
        .bind(decided_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_applied(&self, id: u64, applied_at: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE time_corrections
            SET applied_at = ?
            WHERE id = ?
            AND status = 'approved'
            AND applied_at IS NULL
            "#,
        )
        .bind(applied_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear_applied(&self, id: u64) -> AppResult<()> {
        sqlx::query("UPDATE time_corrections SET applied_at = NULL WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
