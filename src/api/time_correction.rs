use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

use crate::model::time_correction::{CorrectionDecision, CreateTimeCorrection, PendingCountQuery};
use crate::service::time_correction::TimeCorrectionWorkflow;

/* =========================
Create time correction
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/corrections/users/{user_id}",
    params(
        ("user_id" = u64, Path, description = "Employee requesting the correction")
    ),
    request_body(
        content = CreateTimeCorrection,
        description = "Correction request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Correction submitted", body = crate::model::time_correction::TimeCorrection),
        (status = 400, description = "Invalid request", body = Object, example = json!({
            "message": "requested time required"
        })),
        (status = 403, description = "Record belongs to another user", body = Object, example = json!({
            "message": "cannot correct another user's record"
        })),
        (status = 404, description = "User or target record not found")
    ),
    tag = "Correction"
)]
pub async fn create_correction(
    workflow: web::Data<TimeCorrectionWorkflow>,
    path: web::Path<u64>,
    payload: web::Json<CreateTimeCorrection>,
) -> actix_web::Result<impl Responder> {
    let correction = workflow
        .create(payload.into_inner(), path.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(correction))
}

/* =========================
Approve correction
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/corrections/{correction_id}/approve",
    params(
        ("correction_id" = u64, Path, description = "ID of the correction to approve")
    ),
    request_body = CorrectionDecision,
    responses(
        (status = 200, description = "Correction approved", body = crate::model::time_correction::TimeCorrection),
        (status = 404, description = "Correction or approver not found"),
        (status = 409, description = "Correction already processed", body = Object, example = json!({
            "message": "already processed"
        }))
    ),
    tag = "Correction"
)]
pub async fn approve_correction(
    workflow: web::Data<TimeCorrectionWorkflow>,
    path: web::Path<u64>,
    payload: web::Json<CorrectionDecision>,
) -> actix_web::Result<impl Responder> {
    let correction = workflow
        .approve(path.into_inner(), payload.approver_id)
        .await?;

    Ok(HttpResponse::Ok().json(correction))
}

/* =========================
Reject correction
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/corrections/{correction_id}/reject",
    params(
        ("correction_id" = u64, Path, description = "ID of the correction to reject")
    ),
    request_body = CorrectionDecision,
    responses(
        (status = 200, description = "Correction rejected", body = crate::model::time_correction::TimeCorrection),
        (status = 404, description = "Correction or approver not found"),
        (status = 409, description = "Correction already processed", body = Object, example = json!({
            "message": "already processed"
        }))
    ),
    tag = "Correction"
)]
pub async fn reject_correction(
    workflow: web::Data<TimeCorrectionWorkflow>,
    path: web::Path<u64>,
    payload: web::Json<CorrectionDecision>,
) -> actix_web::Result<impl Responder> {
    let correction = workflow
        .reject(path.into_inner(), payload.approver_id)
        .await?;

    Ok(HttpResponse::Ok().json(correction))
}

/// for getting a correction's details endpoint
#[utoipa::path(
    get,
    path = "/api/v1/corrections/{correction_id}",
    params(
        ("correction_id" = u64, Path, description = "ID of the correction to fetch")
    ),
    responses(
        (status = 200, description = "Correction found", body = crate::model::time_correction::TimeCorrection),
        (status = 404, description = "Correction not found", body = Object, example = json!({
            "message": "time correction not found"
        }))
    ),
    tag = "Correction"
)]
pub async fn get_correction(
    workflow: web::Data<TimeCorrectionWorkflow>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let correction = workflow.get_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(correction))
}

/// for listing one user's corrections endpoint
#[utoipa::path(
    get,
    path = "/api/v1/corrections/users/{user_id}",
    params(
        ("user_id" = u64, Path, description = "Employee id")
    ),
    responses(
        (status = 200, description = "Corrections newest first", body = [crate::model::time_correction::TimeCorrection])
    ),
    tag = "Correction"
)]
pub async fn list_user_corrections(
    workflow: web::Data<TimeCorrectionWorkflow>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let corrections = workflow.list_by_user(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(corrections))
}

/// for listing corrections awaiting a decision endpoint
#[utoipa::path(
    get,
    path = "/api/v1/corrections/pending",
    responses(
        (status = 200, description = "Pending corrections oldest first", body = [crate::model::time_correction::TimeCorrection])
    ),
    tag = "Correction"
)]
pub async fn list_pending(
    workflow: web::Data<TimeCorrectionWorkflow>,
) -> actix_web::Result<impl Responder> {
    let corrections = workflow.list_pending().await?;
    Ok(HttpResponse::Ok().json(corrections))
}

/// for counting corrections awaiting a decision endpoint
#[utoipa::path(
    get,
    path = "/api/v1/corrections/pending/count",
    params(PendingCountQuery),
    responses(
        (status = 200, description = "Pending count", body = Object, example = json!({
            "count": 3
        }))
    ),
    tag = "Correction"
)]
pub async fn pending_count(
    workflow: web::Data<TimeCorrectionWorkflow>,
    query: web::Query<PendingCountQuery>,
) -> actix_web::Result<impl Responder> {
    let count = workflow.pending_count(query.user_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "count": count })))
}
