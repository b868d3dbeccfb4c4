use actix_web::{HttpResponse, Responder, web};

use crate::model::summary::{DateQuery, DateRangeQuery, MonthQuery};
use crate::service::summary::SummaryCalculator;

/// Daily summary computed on demand
#[utoipa::path(
    get,
    path = "/api/v1/summary/{user_id}/daily",
    params(
        ("user_id" = u64, Path, description = "Employee id"),
        DateQuery
    ),
    responses(
        (status = 200, description = "Summary of the day", body = crate::model::summary::DailySummary)
    ),
    tag = "Summary"
)]
pub async fn daily(
    calculator: web::Data<SummaryCalculator>,
    path: web::Path<u64>,
    query: web::Query<DateQuery>,
) -> actix_web::Result<impl Responder> {
    let summary = calculator
        .get_daily_summary(path.into_inner(), query.date)
        .await?;

    Ok(HttpResponse::Ok().json(summary))
}

/// Regenerate a user's daily summaries for a month and store the monthly total
#[utoipa::path(
    post,
    path = "/api/v1/summary/{user_id}/monthly",
    params(
        ("user_id" = u64, Path, description = "Employee id"),
        MonthQuery
    ),
    responses(
        (status = 200, description = "Monthly totals", body = crate::model::summary::MonthlySummary),
        (status = 400, description = "Invalid year or month")
    ),
    tag = "Summary"
)]
pub async fn monthly(
    calculator: web::Data<SummaryCalculator>,
    path: web::Path<u64>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    let summary = calculator
        .generate_monthly_summary(path.into_inner(), query.year, query.month)
        .await?;

    Ok(HttpResponse::Ok().json(summary))
}

/// Totals across every employee
#[utoipa::path(
    get,
    path = "/api/v1/summary/statistics",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Aggregated hours", body = crate::model::summary::SummaryStatistics),
        (status = 400, description = "start is after end")
    ),
    tag = "Summary"
)]
pub async fn statistics(
    calculator: web::Data<SummaryCalculator>,
    query: web::Query<DateRangeQuery>,
) -> actix_web::Result<impl Responder> {
    let stats = calculator
        .get_summary_statistics(query.start, query.end)
        .await?;

    Ok(HttpResponse::Ok().json(stats))
}

/// Totals for one employee
#[utoipa::path(
    get,
    path = "/api/v1/summary/statistics/users/{user_id}",
    params(
        ("user_id" = u64, Path, description = "Employee id"),
        DateRangeQuery
    ),
    responses(
        (status = 200, description = "Aggregated hours", body = crate::model::summary::SummaryStatistics),
        (status = 400, description = "start is after end")
    ),
    tag = "Summary"
)]
pub async fn personal_statistics(
    calculator: web::Data<SummaryCalculator>,
    path: web::Path<u64>,
    query: web::Query<DateRangeQuery>,
) -> actix_web::Result<impl Responder> {
    let stats = calculator
        .get_personal_statistics(path.into_inner(), query.start, query.end)
        .await?;

    Ok(HttpResponse::Ok().json(stats))
}

/// Totals for a department, with the per-member average
#[utoipa::path(
    get,
    path = "/api/v1/summary/statistics/departments/{department_id}",
    params(
        ("department_id" = u64, Path, description = "Department id"),
        DateRangeQuery
    ),
    responses(
        (status = 200, description = "Aggregated hours", body = crate::model::summary::DepartmentStatistics),
        (status = 400, description = "start is after end")
    ),
    tag = "Summary"
)]
pub async fn department_statistics(
    calculator: web::Data<SummaryCalculator>,
    path: web::Path<u64>,
    query: web::Query<DateRangeQuery>,
) -> actix_web::Result<impl Responder> {
    let stats = calculator
        .get_department_statistics(path.into_inner(), query.start, query.end)
        .await?;

    Ok(HttpResponse::Ok().json(stats))
}
