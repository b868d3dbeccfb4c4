//! Collaborators the attendance core reads from and writes to.
//!
//! Each trait is implemented by [`mysql::MySqlStore`] for deployments and by
//! [`memory::MemoryStore`] for tests and database-less runs.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::AppResult;
use crate::model::attendance::{AttendanceRecord, NewAttendanceRecord, PunchType};
use crate::model::summary::{AttendanceSummary, SummaryType};
use crate::model::time_correction::{CorrectionStatus, NewTimeCorrection, TimeCorrection};
use crate::model::user::User;
use crate::model::work_location::{LocationType, WorkLocation};

pub mod memory;
pub mod mysql;

/// Message used when storage rejects a second punch of the same kind on one day.
pub const DUPLICATE_PUNCH: &str = "duplicate attendance record";

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, user_id: u64) -> AppResult<Option<User>>;
}

#[async_trait]
pub trait WorkLocationDirectory: Send + Sync {
    async fn find_by_type(&self, location_type: LocationType) -> AppResult<Vec<WorkLocation>>;
}

#[async_trait]
pub trait DepartmentDirectory: Send + Sync {
    async fn member_ids(&self, department_id: u64) -> AppResult<Vec<u64>>;
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Inserts a record. Fails with `Conflict` when the user already has a
    /// record of the same type on the same work date.
    async fn insert(&self, record: NewAttendanceRecord) -> AppResult<AttendanceRecord>;

    async fn find_by_id(&self, id: u64) -> AppResult<Option<AttendanceRecord>>;

    /// Records for a user whose work date lies in `start..=end`, oldest first.
    async fn find_by_user_between_dates(
        &self,
        user_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<AttendanceRecord>>;

    /// Records of one type for a user with `timestamp >= since`, oldest first.
    async fn find_by_user_since(
        &self,
        user_id: u64,
        punch_type: PunchType,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<AttendanceRecord>>;

    /// Rewrites time/type of an existing record. Only used to apply an
    /// approved correction.
    async fn amend(
        &self,
        id: u64,
        punch_type: PunchType,
        timestamp: DateTime<Utc>,
        work_date: NaiveDate,
    ) -> AppResult<AttendanceRecord>;
}

#[async_trait]
pub trait SummaryStore: Send + Sync {
    /// Inserts or replaces the row keyed by (user, target date, type).
    async fn upsert(&self, summary: &AttendanceSummary) -> AppResult<()>;

    async fn find(
        &self,
        user_id: u64,
        target_date: NaiveDate,
        summary_type: SummaryType,
    ) -> AppResult<Option<AttendanceSummary>>;

    /// Rows of one type with target date in `start..=end`, optionally
    /// restricted to one user.
    async fn find_between(
        &self,
        user_id: Option<u64>,
        summary_type: SummaryType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<AttendanceSummary>>;
}

#[async_trait]
pub trait CorrectionStore: Send + Sync {
    async fn insert(&self, correction: NewTimeCorrection) -> AppResult<TimeCorrection>;

    async fn find_by_id(&self, id: u64) -> AppResult<Option<TimeCorrection>>;

    /// Newest first.
    async fn find_by_user(&self, user_id: u64) -> AppResult<Vec<TimeCorrection>>;

    /// Every correction filed against one attendance record, oldest first.
    async fn find_by_attendance(&self, attendance_id: u64) -> AppResult<Vec<TimeCorrection>>;

    /// Oldest first.
    async fn find_pending(&self) -> AppResult<Vec<TimeCorrection>>;

    async fn count_pending(&self, user_id: Option<u64>) -> AppResult<u64>;

    /// Moves a pending correction to `status`. Returns `false` when the row is
    /// no longer pending, leaving it untouched.
    async fn decide(
        &self,
        id: u64,
        status: CorrectionStatus,
        approver_id: u64,
        decided_at: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Stamps an approved, not yet applied correction as applied. Returns
    /// `false` when it is not approved or was applied already.
    async fn mark_applied(&self, id: u64, applied_at: DateTime<Utc>) -> AppResult<bool>;

    /// Undoes `mark_applied` when writing the record back failed.
    async fn clear_applied(&self, id: u64) -> AppResult<()>;
}

/// Fire-and-forget notifications about correction requests.
pub trait Notifier: Send + Sync {
    fn correction_created(&self, correction: &TimeCorrection);
    fn correction_approved(&self, correction: &TimeCorrection);
    fn correction_rejected(&self, correction: &TimeCorrection);
}

/// Notifier that only writes to the application log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn correction_created(&self, correction: &TimeCorrection) {
        tracing::info!(
            correction_id = correction.id,
            user_id = correction.user_id,
            "Time correction submitted"
        );
    }

    fn correction_approved(&self, correction: &TimeCorrection) {
        tracing::info!(
            correction_id = correction.id,
            user_id = correction.user_id,
            approver_id = ?correction.approver_id,
            "Time correction approved"
        );
    }

    fn correction_rejected(&self, correction: &TimeCorrection) {
        tracing::info!(
            correction_id = correction.id,
            user_id = correction.user_id,
            approver_id = ?correction.approver_id,
            "Time correction rejected"
        );
    }
}
