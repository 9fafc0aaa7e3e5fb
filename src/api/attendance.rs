use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::IntoParams;

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::ServiceError;
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::service::resolver::resolve_active;
use crate::service::scope;

/// Minutes a check-in lands past the shift start. On time (or early)
/// means zero.
fn late_minutes(shift_start: NaiveTime, arrived: NaiveTime) -> i32 {
    (arrived - shift_start).num_minutes().max(0) as i32
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in",
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully",
            "status": "LATE",
            "late_minutes": 5
        })),
        (status = 400, description = "Already checked in today", body = Object, example = json!({
            "message": "Already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let guard_id: u64 = auth
        .guard_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No guard profile"))?;

    let now = Utc::now();
    let local = now.with_timezone(&config.time_zone);
    let today = local.date_naive();

    // lateness is measured against the authoritative assignment's shift
    // start; an unassigned guard checks in on time by definition
    let active = resolve_active(pool.get_ref(), guard_id, today).await?;
    let late = active
        .first()
        .map(|a| late_minutes(a.shift_start, local.time()))
        .unwrap_or(0);

    let status = if late > 0 {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::Present
    };

    let result = sqlx::query(
        r#"
        INSERT INTO attendance (guard_id, attendance_date, check_in_time, late_minutes, status)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(guard_id)
    .bind(today)
    .bind(now)
    .bind(late)
    .bind(status.to_string())
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "Checked in successfully",
            "status": status.to_string(),
            "late_minutes": late
        }))),

        Err(e) => {
            // Duplicate check-in for same day
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                        "message": "Already checked in today"
                    })));
                }
            }

            tracing::error!(error = %e, guard_id, "Check-in failed");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-out",
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully"
        })),
        (status = 400, description = "No active check-in found for today", body = Object, example = json!({
            "message": "No active check-in found for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let guard_id: u64 = auth
        .guard_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No guard profile"))?;

    let now = Utc::now();
    let today = now.with_timezone(&config.time_zone).date_naive();

    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET check_out_time = ?
        WHERE guard_id = ?
        AND attendance_date = ?
        AND check_out_time IS NULL
        "#,
    )
    .bind(now)
    .bind(guard_id)
    .bind(today)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, guard_id, "Check-out failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "No active check-in found for today"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked out successfully"
    })))
}

#[derive(Deserialize, IntoParams)]
pub struct TodayQuery {
    /// Reference date (defaults to today in the configured time zone)
    #[param(value_type = String, format = "date", example = "2024-06-15")]
    pub date: Option<NaiveDate>,
}

/// Today's attendance for the caller's visible guards
#[utoipa::path(
    get,
    path = "/api/v1/attendance/today",
    params(TodayQuery),
    responses(
        (status = 200, description = "Attendance rows for the date", body = Vec<Attendance>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn today_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<TodayQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin_or_supervisor()?;

    let date = query
        .date
        .unwrap_or_else(|| Utc::now().with_timezone(&config.time_zone).date_naive());

    let visible = scope::visible_guards(pool.get_ref(), &auth).await?;
    if visible.is_empty() {
        return Ok(HttpResponse::Ok().json(Vec::<Attendance>::new()));
    }

    let placeholders = vec!["?"; visible.len()].join(", ");
    let sql = format!(
        "SELECT * FROM attendance WHERE attendance_date = ? AND guard_id IN ({}) ORDER BY guard_id",
        placeholders
    );

    let mut q = sqlx::query_as::<_, Attendance>(&sql).bind(date);
    for guard in &visible {
        q = q.bind(guard.id);
    }

    let rows = q
        .fetch_all(pool.get_ref())
        .await
        .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(rows))
}

/// Attendance history for one guard
#[utoipa::path(
    get,
    path = "/api/v1/attendance/guard/{guard_id}",
    params(
        ("guard_id", Path, description = "Guard ID")
    ),
    responses(
        (status = 200, description = "Attendance history, most recent first", body = Vec<Attendance>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Access denied to this guard"),
        (status = 404, description = "Guard not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn by_guard(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let guard_id = path.into_inner();

    crate::api::assignment::ensure_guard_access(pool.get_ref(), &auth, guard_id).await?;

    let rows = sqlx::query_as::<_, Attendance>(
        "SELECT * FROM attendance WHERE guard_id = ? ORDER BY attendance_date DESC, id DESC",
    )
    .bind(guard_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(s: &str) -> NaiveTime {
        s.parse().unwrap()
    }

    #[test]
    fn arriving_after_shift_start_is_late_by_the_minute_delta() {
        assert_eq!(late_minutes(time("09:00:00"), time("09:05:00")), 5);
        assert_eq!(late_minutes(time("09:00:00"), time("10:30:00")), 90);
    }

    #[test]
    fn arriving_on_time_or_early_is_not_late() {
        assert_eq!(late_minutes(time("09:00:00"), time("09:00:00")), 0);
        assert_eq!(late_minutes(time("09:00:00"), time("08:45:00")), 0);
    }

    #[test]
    fn sub_minute_delays_round_down_to_on_time() {
        assert_eq!(late_minutes(time("09:00:00"), time("09:00:59")), 0);
    }
}
