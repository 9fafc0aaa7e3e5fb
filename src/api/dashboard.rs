use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::IntoParams;

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::service::{scope, summary};

#[derive(Deserialize, IntoParams)]
pub struct SummaryQuery {
    /// Reference date (defaults to today in the configured time zone)
    #[param(value_type = String, format = "date", example = "2024-06-15")]
    pub date: Option<NaiveDate>,
}

fn reference_date(query: &SummaryQuery, config: &Config) -> NaiveDate {
    query
        .date
        .unwrap_or_else(|| Utc::now().with_timezone(&config.time_zone).date_naive())
}

/// Admin dashboard summary
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/admin-summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "System-wide counts", body = crate::service::summary::AdminSummary),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn admin_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<SummaryQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let today = reference_date(&query, &config);
    let summary = summary::admin_summary(pool.get_ref(), today).await?;

    Ok(HttpResponse::Ok().json(summary))
}

/// Manager dashboard summary (scoped to the caller's supervised guards)
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/manager-summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Team counts for the supervisor", body = crate::service::summary::ManagerSummary),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn manager_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<SummaryQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_supervisor()?;

    let today = reference_date(&query, &config);
    let supervised = scope::visible_guards(pool.get_ref(), &auth).await?;
    let summary = summary::manager_summary(pool.get_ref(), &supervised, today).await?;

    Ok(HttpResponse::Ok().json(summary))
}

/// Guard dashboard summary (the caller's own shift and attendance)
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/guard-summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Today's shift and attendance", body = crate::service::summary::GuardSummary),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Guard profile not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn guard_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<SummaryQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_guard()?;

    let today = reference_date(&query, &config);
    let summary =
        summary::guard_summary(pool.get_ref(), auth.user_id, today, config.time_zone).await?;

    Ok(HttpResponse::Ok().json(summary))
}
