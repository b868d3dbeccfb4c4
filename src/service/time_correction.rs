use std::sync::Arc;

use tracing::{info, instrument};

use crate::error::{AppError, AppResult};
use crate::model::attendance::PunchType;
use crate::model::time_correction::{
    CorrectionStatus, CreateTimeCorrection, NewTimeCorrection, RequestType, TimeCorrection,
};
use crate::service::clock::Clock;
use crate::store::{AttendanceStore, CorrectionStore, Notifier, UserDirectory};

pub const ALREADY_PROCESSED: &str = "already processed";

/// Correction requests move `pending → approved` or `pending → rejected`
/// exactly once. Deciding a request never touches the attendance record.
pub struct TimeCorrectionWorkflow {
    users: Arc<dyn UserDirectory>,
    records: Arc<dyn AttendanceStore>,
    corrections: Arc<dyn CorrectionStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

/// Request fields after parsing, before any lookup.
struct ValidatedRequest {
    request_type: RequestType,
    requested_time: Option<chrono::DateTime<chrono::Utc>>,
    requested_type: Option<PunchType>,
    reason: String,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn validate_request(request: &CreateTimeCorrection) -> AppResult<ValidatedRequest> {
    let request_type: RequestType = request
        .request_type
        .trim()
        .to_ascii_lowercase()
        .parse()
        .map_err(|_| AppError::validation("invalid request type"))?;

    let requested_time = if request_type.changes_time() {
        Some(
            request
                .requested_time
                .ok_or_else(|| AppError::validation("requested time required"))?,
        )
    } else {
        None
    };

    let requested_type = if request_type.changes_type() {
        let raw = non_blank(request.requested_type.as_deref())
            .ok_or_else(|| AppError::validation("requested type required"))?;
        Some(
            raw.to_ascii_lowercase()
                .parse::<PunchType>()
                .map_err(|_| AppError::validation("invalid requested type"))?,
        )
    } else {
        None
    };

    let reason = non_blank(request.reason.as_deref())
        .ok_or_else(|| AppError::validation("reason is required"))?
        .to_string();

    Ok(ValidatedRequest {
        request_type,
        requested_time,
        requested_type,
        reason,
    })
}

impl TimeCorrectionWorkflow {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        records: Arc<dyn AttendanceStore>,
        corrections: Arc<dyn CorrectionStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            records,
            corrections,
            notifier,
            clock,
        }
    }

    #[instrument(name = "create_time_correction", skip(self, request), fields(attendance_id = request.attendance_id))]
    pub async fn create(
        &self,
        request: CreateTimeCorrection,
        requesting_user_id: u64,
    ) -> AppResult<TimeCorrection> {
        let validated = validate_request(&request)?;

        self.users
            .find_user(requesting_user_id)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))?;

        let record = self
            .records
            .find_by_id(request.attendance_id)
            .await?
            .ok_or_else(|| AppError::not_found("target record not found"))?;

        if record.user_id != requesting_user_id {
            info!(owner_id = record.user_id, "Rejected correction of another user's record");
            return Err(AppError::forbidden("cannot correct another user's record"));
        }

        let correction = self
            .corrections
            .insert(NewTimeCorrection {
                user_id: requesting_user_id,
                attendance_id: record.id,
                request_type: validated.request_type,
                current_type: record.punch_type,
                requested_time: validated.requested_time,
                requested_type: validated.requested_type,
                reason: validated.reason,
                created_at: self.clock.now(),
            })
            .await?;

        info!(correction_id = correction.id, "Time correction created");
        self.notifier.correction_created(&correction);
        Ok(correction)
    }

    pub async fn approve(&self, correction_id: u64, approver_id: u64) -> AppResult<TimeCorrection> {
        self.decide(correction_id, approver_id, CorrectionStatus::Approved)
            .await
    }

    pub async fn reject(&self, correction_id: u64, approver_id: u64) -> AppResult<TimeCorrection> {
        self.decide(correction_id, approver_id, CorrectionStatus::Rejected)
            .await
    }

    #[instrument(name = "decide_time_correction", skip(self))]
    async fn decide(
        &self,
        correction_id: u64,
        approver_id: u64,
        status: CorrectionStatus,
    ) -> AppResult<TimeCorrection> {
        let current = self.get_by_id(correction_id).await?;
        if current.status.is_terminal() {
            return Err(AppError::conflict(ALREADY_PROCESSED));
        }

        self.users
            .find_user(approver_id)
            .await?
            .ok_or_else(|| AppError::not_found("approver not found"))?;

        // Conditional on the row still being pending; a concurrent decision loses here.
        let moved = self
            .corrections
            .decide(correction_id, status, approver_id, self.clock.now())
            .await?;
        if !moved {
            return Err(AppError::conflict(ALREADY_PROCESSED));
        }

        let decided = self.get_by_id(correction_id).await?;
        info!(%status, "Time correction decided");

        match status {
            CorrectionStatus::Approved => self.notifier.correction_approved(&decided),
            CorrectionStatus::Rejected => self.notifier.correction_rejected(&decided),
            CorrectionStatus::Pending => {}
        }
        Ok(decided)
    }

    pub async fn get_by_id(&self, correction_id: u64) -> AppResult<TimeCorrection> {
        self.corrections
            .find_by_id(correction_id)
            .await?
            .ok_or_else(|| AppError::not_found("time correction not found"))
    }

    pub async fn list_by_user(&self, user_id: u64) -> AppResult<Vec<TimeCorrection>> {
        self.corrections.find_by_user(user_id).await
    }

    pub async fn list_pending(&self) -> AppResult<Vec<TimeCorrection>> {
        self.corrections.find_pending().await
    }

    /// Pending requests overall, or for one user.
    pub async fn pending_count(&self, user_id: Option<u64>) -> AppResult<u64> {
        self.corrections.count_pending(user_id).await
    }
}
