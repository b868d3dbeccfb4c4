use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};

use crate::model::attendance::PunchType;

/// What a correction asks to change on the target record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RequestType {
    Time,
    Type,
    Both,
}

impl RequestType {
    pub fn changes_time(self) -> bool {
        matches!(self, RequestType::Time | RequestType::Both)
    }

    pub fn changes_type(self) -> bool {
        matches!(self, RequestType::Type | RequestType::Both)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CorrectionStatus {
    Pending,
    Approved,
    Rejected,
}

impl CorrectionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, CorrectionStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeCorrection {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1000)]
    pub user_id: u64,

    #[schema(example = 42)]
    pub attendance_id: u64,

    #[schema(example = "time")]
    pub request_type: RequestType,

    #[schema(example = "in")]
    pub current_type: PunchType,

    #[schema(example = "2026-01-05T00:00:00Z", format = "date-time", value_type = String, nullable = true)]
    pub requested_time: Option<DateTime<Utc>>,

    #[schema(example = "out", nullable = true)]
    pub requested_type: Option<PunchType>,

    #[schema(example = "Forgot to punch on arrival")]
    pub reason: String,

    #[schema(example = "pending")]
    pub status: CorrectionStatus,

    #[schema(example = 7, nullable = true)]
    pub approver_id: Option<u64>,

    #[schema(format = "date-time", value_type = String, nullable = true)]
    pub approved_at: Option<DateTime<Utc>>,

    /// Set once the correction has been written back to its record.
    #[schema(format = "date-time", value_type = String, nullable = true)]
    pub applied_at: Option<DateTime<Utc>>,

    #[schema(example = "2026-01-05T03:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

/// Correction as submitted by an employee. Enum-valued fields arrive as raw
/// strings so they can be rejected with a readable message.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTimeCorrection {
    #[schema(example = 42)]
    pub attendance_id: u64,

    #[schema(example = "time")]
    pub request_type: String,

    #[schema(example = "2026-01-05T00:00:00Z", format = "date-time", value_type = String, nullable = true)]
    pub requested_time: Option<DateTime<Utc>>,

    #[schema(example = "out", nullable = true)]
    pub requested_type: Option<String>,

    #[schema(example = "Forgot to punch on arrival", nullable = true)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTimeCorrection {
    pub user_id: u64,
    pub attendance_id: u64,
    pub request_type: RequestType,
    pub current_type: PunchType,
    pub requested_time: Option<DateTime<Utc>>,
    pub requested_type: Option<PunchType>,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionDecision {
    #[schema(example = 7)]
    pub approver_id: u64,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingCountQuery {
    /// Restrict the count to one user's requests
    #[schema(example = 1000)]
    pub user_id: Option<u64>,
}
