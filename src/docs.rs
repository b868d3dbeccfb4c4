use crate::api::paid_leave::PaidLeaveQuery;
use crate::model::attendance::{
    AttendanceRecord, AttendanceStatus, ClockRequest, ClockResponse, Coordinates, PunchType,
};
use crate::model::summary::{
    AttendanceSummary, DailyStatus, DailySummary, DateQuery, DateRangeQuery,
    DepartmentStatistics, MonthQuery, MonthlySummary, SummaryStatistics, SummaryType,
};
use crate::model::time_correction::{
    CorrectionDecision, CorrectionStatus, CreateTimeCorrection, PendingCountQuery, RequestType,
    TimeCorrection,
};
use crate::model::user::User;
use crate::model::work_location::{LocationType, WorkLocation};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Attendance API",
        version = "1.0.0",
        description = r#"
## Attendance Management

Backend for employee time tracking.

### Key Features
- **Punching**
  - Geofenced clock-in and clock-out with duplicate protection
- **Summaries**
  - Daily and monthly worked, overtime, late-night and holiday hours
  - Aggregate statistics per employee, department or company
- **Time corrections**
  - Request, approve or reject, then apply amendments to punches
- **Paid leave**
  - Statutory entitlement from years of service

### Response Format
- JSON bodies, hours as decimal strings rounded to two places
- Errors as `{"message": "..."}` with a 4xx status

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,
        crate::api::attendance::punch,
        crate::api::attendance::status,
        crate::api::attendance::records,
        crate::api::attendance::apply_correction,

        crate::api::summary::daily,
        crate::api::summary::monthly,
        crate::api::summary::statistics,
        crate::api::summary::personal_statistics,
        crate::api::summary::department_statistics,

        crate::api::time_correction::create_correction,
        crate::api::time_correction::approve_correction,
        crate::api::time_correction::reject_correction,
        crate::api::time_correction::get_correction,
        crate::api::time_correction::list_user_corrections,
        crate::api::time_correction::list_pending,
        crate::api::time_correction::pending_count,

        crate::api::paid_leave::entitlement
    ),
    components(
        schemas(
            User,
            LocationType,
            WorkLocation,
            PunchType,
            AttendanceRecord,
            AttendanceStatus,
            ClockRequest,
            ClockResponse,
            Coordinates,
            SummaryType,
            DailyStatus,
            AttendanceSummary,
            DailySummary,
            MonthlySummary,
            SummaryStatistics,
            DepartmentStatistics,
            DateRangeQuery,
            DateQuery,
            MonthQuery,
            RequestType,
            CorrectionStatus,
            TimeCorrection,
            CreateTimeCorrection,
            CorrectionDecision,
            PendingCountQuery,
            PaidLeaveQuery
        )
    ),
    tags(
        (name = "Attendance", description = "Clock-in, clock-out and attendance history APIs"),
        (name = "Summary", description = "Worked-hour summaries and statistics APIs"),
        (name = "Correction", description = "Time correction workflow APIs"),
        (name = "Paid leave", description = "Paid leave entitlement APIs"),
    )
)]
pub struct ApiDoc;
