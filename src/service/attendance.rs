use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, instrument, warn};

use crate::error::{AppError, AppResult};
use crate::model::attendance::{
    AttendanceRecord, AttendanceStatus, ClockRequest, ClockResponse, NewAttendanceRecord,
    PunchType,
};
use crate::model::time_correction::CorrectionStatus;
use crate::model::user::User;
use crate::service::clock::Clock;
use crate::service::geo::{GeoPoint, GeoValidator};
use crate::service::summary::SummaryCalculator;
use crate::service::work_rules::WorkRules;
use crate::store::{AttendanceStore, CorrectionStore, UserDirectory};

pub const ALREADY_CLOCKED_IN: &str = "already clocked in";
pub const ALREADY_CLOCKED_OUT: &str = "already clocked out";
pub const NO_CLOCK_IN: &str = "no clock-in";
pub const CORRECTION_ALREADY_APPLIED: &str = "correction already applied";
pub const CORRECTION_STALE: &str = "correction is stale";

/// Records punches and owns the attendance-record lifecycle.
pub struct AttendanceRecorder {
    users: Arc<dyn UserDirectory>,
    geo: GeoValidator,
    records: Arc<dyn AttendanceStore>,
    corrections: Arc<dyn CorrectionStore>,
    summaries: Arc<SummaryCalculator>,
    rules: Arc<WorkRules>,
    clock: Arc<dyn Clock>,
}

impl AttendanceRecorder {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        geo: GeoValidator,
        records: Arc<dyn AttendanceStore>,
        corrections: Arc<dyn CorrectionStore>,
        summaries: Arc<SummaryCalculator>,
        rules: Arc<WorkRules>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            geo,
            records,
            corrections,
            summaries,
            rules,
            clock,
        }
    }

    #[instrument(name = "clock_in", skip(self))]
    pub async fn clock_in(
        &self,
        user_id: u64,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> AppResult<AttendanceRecord> {
        let (user, point) = self.prepare_punch(user_id, latitude, longitude).await?;

        let now = self.clock.now();
        let today = self.rules.local_date(now);
        let todays = self
            .records
            .find_by_user_between_dates(user.id, today, today)
            .await?;

        if todays.iter().any(|r| r.punch_type == PunchType::In) {
            info!("Rejected: already clocked in today");
            return Err(AppError::conflict(ALREADY_CLOCKED_IN));
        }

        self.reject_recent_duplicate(user.id, PunchType::In, now)
            .await?;

        let record = self
            .persist(&user, PunchType::In, now, today, point, ALREADY_CLOCKED_IN)
            .await?;

        info!(record_id = record.id, "Clocked in");
        Ok(record)
    }

    #[instrument(name = "clock_out", skip(self))]
    pub async fn clock_out(
        &self,
        user_id: u64,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> AppResult<AttendanceRecord> {
        let (user, point) = self.prepare_punch(user_id, latitude, longitude).await?;

        let now = self.clock.now();
        let today = self.rules.local_date(now);
        let todays = self
            .records
            .find_by_user_between_dates(user.id, today, today)
            .await?;

        if !todays.iter().any(|r| r.punch_type == PunchType::In) {
            info!("Rejected: no clock-in today");
            return Err(AppError::conflict(NO_CLOCK_IN));
        }
        if todays.iter().any(|r| r.punch_type == PunchType::Out) {
            info!("Rejected: already clocked out today");
            return Err(AppError::conflict(ALREADY_CLOCKED_OUT));
        }

        self.reject_recent_duplicate(user.id, PunchType::Out, now)
            .await?;

        let record = self
            .persist(&user, PunchType::Out, now, today, point, ALREADY_CLOCKED_OUT)
            .await?;

        info!(record_id = record.id, "Clocked out");

        self.summaries
            .generate_daily_summary(user.id, today)
            .await?;

        Ok(record)
    }

    /// Punch variant that reports rule failures as a response value.
    /// Storage and other unexpected failures are still returned as errors.
    pub async fn handle(&self, request: ClockRequest) -> AppResult<ClockResponse> {
        let result = match request.punch_type {
            PunchType::In => {
                self.clock_in(request.user_id, request.latitude, request.longitude)
                    .await
            }
            PunchType::Out => {
                self.clock_out(request.user_id, request.latitude, request.longitude)
                    .await
            }
        };

        match result {
            Ok(record) => {
                let (message, status) = match record.punch_type {
                    PunchType::In => ("Clocked in", AttendanceStatus::In),
                    PunchType::Out => ("Clocked out", AttendanceStatus::Out),
                };
                Ok(ClockResponse::ok(message, record, status))
            }
            Err(e) if e.is_rule_violation() => Ok(ClockResponse::failed(e.to_string())),
            Err(e) => Err(e),
        }
    }

    /// Status for the user's current local day; the latest punch decides.
    pub async fn current_status(&self, user_id: u64) -> AppResult<AttendanceStatus> {
        let today = self.rules.local_date(self.clock.now());
        let todays = self
            .records
            .find_by_user_between_dates(user_id, today, today)
            .await?;

        Ok(match todays.last().map(|r| r.punch_type) {
            None => AttendanceStatus::None,
            Some(PunchType::In) => AttendanceStatus::In,
            Some(PunchType::Out) => AttendanceStatus::Out,
        })
    }

    pub async fn records_between(
        &self,
        user_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<AttendanceRecord>> {
        if start > end {
            return Err(AppError::validation("start date must not be after end date"));
        }
        self.records
            .find_by_user_between_dates(user_id, start, end)
            .await
    }

    /// Applies an approved correction to its attendance record and refreshes
    /// the daily summaries of the day(s) involved.
    #[instrument(name = "apply_correction", skip(self))]
    pub async fn apply_correction(&self, correction_id: u64) -> AppResult<AttendanceRecord> {
        let correction = self
            .corrections
            .find_by_id(correction_id)
            .await?
            .ok_or_else(|| AppError::not_found("time correction not found"))?;

        if correction.status != CorrectionStatus::Approved {
            return Err(AppError::conflict("correction is not approved"));
        }
        if correction.applied_at.is_some() {
            return Err(AppError::conflict(CORRECTION_ALREADY_APPLIED));
        }

        let record = self
            .records
            .find_by_id(correction.attendance_id)
            .await?
            .ok_or_else(|| AppError::not_found("target record not found"))?;

        // A correction describes the record as it was when filed; once the
        // record moved on, it must be refiled against the current state.
        let superseded = self
            .corrections
            .find_by_attendance(record.id)
            .await?
            .iter()
            .any(|other| {
                other.id != correction.id
                    && other.applied_at.is_some_and(|at| at >= correction.created_at)
            });
        if superseded || record.punch_type != correction.current_type {
            warn!(correction_id, record_id = record.id, "Refusing stale time correction");
            return Err(AppError::conflict(CORRECTION_STALE));
        }

        if !self
            .corrections
            .mark_applied(correction_id, self.clock.now())
            .await?
        {
            return Err(AppError::conflict(CORRECTION_ALREADY_APPLIED));
        }

        let punch_type = correction
            .requested_type
            .filter(|_| correction.request_type.changes_type())
            .unwrap_or(record.punch_type);
        let timestamp = correction
            .requested_time
            .filter(|_| correction.request_type.changes_time())
            .unwrap_or(record.timestamp);
        let work_date = self.rules.local_date(timestamp);

        let amended = match self
            .records
            .amend(record.id, punch_type, timestamp, work_date)
            .await
        {
            Ok(amended) => amended,
            Err(err) => {
                self.corrections.clear_applied(correction_id).await?;
                return Err(err);
            }
        };

        info!(
            record_id = amended.id,
            from = %record.timestamp,
            to = %amended.timestamp,
            "Applied time correction"
        );

        self.summaries
            .generate_daily_summary(record.user_id, work_date)
            .await?;
        if record.work_date != work_date {
            self.summaries
                .generate_daily_summary(record.user_id, record.work_date)
                .await?;
        }

        Ok(amended)
    }

    async fn prepare_punch(
        &self,
        user_id: u64,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> AppResult<(User, GeoPoint)> {
        let user = self
            .users
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))?;

        let point = GeoPoint::parse(latitude, longitude)?;
        self.geo.validate(&user, &point).await?;

        Ok((user, point))
    }

    async fn reject_recent_duplicate(
        &self,
        user_id: u64,
        punch_type: PunchType,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let window = self.rules.duplicate_window;
        let recent = self
            .records
            .find_by_user_since(user_id, punch_type, now - window)
            .await?;

        if let Some(previous) = recent.last() {
            warn!(previous_id = previous.id, %punch_type, "Duplicate punch inside window");
            return Err(AppError::conflict(format!(
                "duplicate clock-{} within {} minutes",
                punch_type,
                window.num_minutes()
            )));
        }
        Ok(())
    }

    async fn persist(
        &self,
        user: &User,
        punch_type: PunchType,
        now: DateTime<Utc>,
        work_date: NaiveDate,
        point: GeoPoint,
        conflict_message: &str,
    ) -> AppResult<AttendanceRecord> {
        let new_record = NewAttendanceRecord {
            user_id: user.id,
            punch_type,
            timestamp: now,
            work_date,
            latitude: Some(point.latitude),
            longitude: Some(point.longitude),
        };

        match self.records.insert(new_record).await {
            Ok(record) => Ok(record),
            // Storage caught a concurrent punch the pre-checks missed.
            Err(AppError::Conflict(_)) => {
                debug!("Unique key rejected punch");
                Err(AppError::conflict(conflict_message))
            }
            Err(e) => Err(e),
        }
    }
}
