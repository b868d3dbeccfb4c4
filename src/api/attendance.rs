use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

use crate::model::attendance::{ClockRequest, Coordinates};
use crate::model::summary::DateRangeQuery;
use crate::service::attendance::AttendanceRecorder;

/// Clock-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/{user_id}/clock-in",
    params(
        ("user_id" = u64, Path, description = "Employee clocking in")
    ),
    request_body(
        content = Coordinates,
        description = "Position of the device at punch time",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Clocked in", body = crate::model::attendance::AttendanceRecord),
        (status = 400, description = "Missing/out-of-range coordinates or outside geofence", body = Object, example = json!({
            "message": "more than 100m from office; punch rejected"
        })),
        (status = 404, description = "Unknown user"),
        (status = 409, description = "Already clocked in today", body = Object, example = json!({
            "message": "already clocked in"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn clock_in(
    recorder: web::Data<AttendanceRecorder>,
    path: web::Path<u64>,
    body: web::Json<Coordinates>,
) -> actix_web::Result<impl Responder> {
    let user_id = path.into_inner();
    let record = recorder
        .clock_in(user_id, body.latitude, body.longitude)
        .await?;

    Ok(HttpResponse::Created().json(record))
}

/// Clock-out endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/{user_id}/clock-out",
    params(
        ("user_id" = u64, Path, description = "Employee clocking out")
    ),
    request_body = Coordinates,
    responses(
        (status = 201, description = "Clocked out; daily summary refreshed", body = crate::model::attendance::AttendanceRecord),
        (status = 400, description = "Missing/out-of-range coordinates or outside geofence"),
        (status = 404, description = "Unknown user"),
        (status = 409, description = "No clock-in today or already clocked out", body = Object, example = json!({
            "message": "no clock-in"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn clock_out(
    recorder: web::Data<AttendanceRecorder>,
    path: web::Path<u64>,
    body: web::Json<Coordinates>,
) -> actix_web::Result<impl Responder> {
    let user_id = path.into_inner();
    let record = recorder
        .clock_out(user_id, body.latitude, body.longitude)
        .await?;

    Ok(HttpResponse::Created().json(record))
}

/// Punch endpoint answering rule failures with `success: false`
#[utoipa::path(
    post,
    path = "/api/v1/attendance/punch",
    request_body = ClockRequest,
    responses(
        (status = 200, description = "Outcome of the punch", body = crate::model::attendance::ClockResponse, example = json!({
            "success": false,
            "message": "already clocked in"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn punch(
    recorder: web::Data<AttendanceRecorder>,
    payload: web::Json<ClockRequest>,
) -> actix_web::Result<impl Responder> {
    let response = recorder.handle(payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Today's attendance status for a user
#[utoipa::path(
    get,
    path = "/api/v1/attendance/{user_id}/status",
    params(
        ("user_id" = u64, Path, description = "Employee id")
    ),
    responses(
        (status = 200, description = "none, in or out", body = Object, example = json!({
            "userId": 1000,
            "status": "in"
        }))
    ),
    tag = "Attendance"
)]
pub async fn status(
    recorder: web::Data<AttendanceRecorder>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let user_id = path.into_inner();
    let status = recorder.current_status(user_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "userId": user_id,
        "status": status
    })))
}

/// Attendance history for a date range
#[utoipa::path(
    get,
    path = "/api/v1/attendance/{user_id}/records",
    params(
        ("user_id" = u64, Path, description = "Employee id"),
        DateRangeQuery
    ),
    responses(
        (status = 200, description = "Records oldest first", body = [crate::model::attendance::AttendanceRecord]),
        (status = 400, description = "start is after end")
    ),
    tag = "Attendance"
)]
pub async fn records(
    recorder: web::Data<AttendanceRecorder>,
    path: web::Path<u64>,
    query: web::Query<DateRangeQuery>,
) -> actix_web::Result<impl Responder> {
    let records = recorder
        .records_between(path.into_inner(), query.start, query.end)
        .await?;

    Ok(HttpResponse::Ok().json(records))
}

/// Apply an approved time correction to its attendance record
#[utoipa::path(
    post,
    path = "/api/v1/corrections/{correction_id}/apply",
    params(
        ("correction_id" = u64, Path, description = "Approved correction to apply")
    ),
    responses(
        (status = 200, description = "Amended record", body = crate::model::attendance::AttendanceRecord),
        (status = 404, description = "Correction or record not found"),
        (status = 409, description = "Correction is not approved")
    ),
    tag = "Attendance"
)]
pub async fn apply_correction(
    recorder: web::Data<AttendanceRecorder>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let record = recorder.apply_correction(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}
