use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::service::paid_leave::PaidLeaveCalculator;

#[derive(Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaidLeaveQuery {
    /// Date the entitlement is evaluated on
    #[schema(example = "2026-04-01", format = "date", value_type = String)]
    pub as_of: NaiveDate,
}

/// Paid-leave entitlement for a user
#[utoipa::path(
    get,
    path = "/api/v1/paid-leave/{user_id}",
    params(
        ("user_id" = u64, Path, description = "Employee id"),
        PaidLeaveQuery
    ),
    responses(
        (status = 200, description = "Entitled days", body = Object, example = json!({
            "userId": 1000,
            "asOf": "2026-04-01",
            "days": 11
        })),
        (status = 404, description = "User not found")
    ),
    tag = "Paid leave"
)]
pub async fn entitlement(
    calculator: web::Data<PaidLeaveCalculator>,
    path: web::Path<u64>,
    query: web::Query<PaidLeaveQuery>,
) -> actix_web::Result<impl Responder> {
    let user_id = path.into_inner();
    let days = calculator
        .calculate_paid_leave_days(user_id, query.as_of)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "userId": user_id,
        "asOf": query.as_of,
        "days": days
    })))
}
