use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PunchType {
    In,
    Out,
}

/// A single clock-in or clock-out event.
///
/// `work_date` is the calendar date of `timestamp` in the organization's time
/// zone; storage keeps (user_id, work_date, punch_type) unique.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1000)]
    pub user_id: u64,

    #[serde(rename = "type")]
    #[schema(example = "in")]
    pub punch_type: PunchType,

    #[schema(example = "2026-01-05T00:02:11Z", format = "date-time", value_type = String)]
    pub timestamp: DateTime<Utc>,

    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub work_date: NaiveDate,

    #[schema(example = 35.681236, nullable = true)]
    pub latitude: Option<f64>,

    #[schema(example = 139.767125, nullable = true)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct NewAttendanceRecord {
    pub user_id: u64,
    pub punch_type: PunchType,
    pub timestamp: DateTime<Utc>,
    pub work_date: NaiveDate,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Where a user stands today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
    None,
    In,
    Out,
}

/// Request-object form of a punch, used by callers that want a response value
/// instead of an error.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClockRequest {
    #[schema(example = 1000)]
    pub user_id: u64,

    #[serde(rename = "type")]
    #[schema(example = "in")]
    pub punch_type: PunchType,

    #[schema(example = 35.681236, nullable = true)]
    pub latitude: Option<f64>,

    #[schema(example = 139.767125, nullable = true)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClockResponse {
    #[schema(example = true)]
    pub success: bool,

    #[schema(example = "Clocked in")]
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<AttendanceRecord>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AttendanceStatus>,
}

impl ClockResponse {
    pub fn ok(message: impl Into<String>, record: AttendanceRecord, status: AttendanceStatus) -> Self {
        Self {
            success: true,
            message: message.into(),
            record: Some(record),
            status: Some(status),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            record: None,
            status: None,
        }
    }
}

/// Body of the clock-in / clock-out endpoints.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct Coordinates {
    #[schema(example = 35.681236, nullable = true)]
    pub latitude: Option<f64>,

    #[schema(example = 139.767125, nullable = true)]
    pub longitude: Option<f64>,
}
