use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::ServiceError;
use crate::model::{assignment::Assignment, role::Role, shift_type::ShiftType};

#[derive(Deserialize, ToSchema)]
pub struct CreateAssignment {
    #[schema(example = 1)]
    pub guard_id: u64,
    #[schema(example = 1)]
    pub site_post_id: u64,
    #[schema(example = 1)]
    pub shift_type_id: u64,
    #[schema(example = "2024-01-01", format = "date", value_type = String)]
    pub effective_from: NaiveDate,
    /// Unset means the assignment is open-ended
    #[schema(example = "2024-12-31", format = "date", value_type = String)]
    pub effective_to: Option<NaiveDate>,
    #[schema(example = "Covers the morning gate rotation", value_type = String)]
    pub notes: Option<String>,
}

/// Create Assignment
#[utoipa::path(
    post,
    path = "/api/v1/assignments",
    request_body = CreateAssignment,
    responses(
        (status = 201, description = "Assignment created", body = Object, example = json!({
            "message": "Assignment created successfully",
            "id": 1
        })),
        (status = 400, description = "Invalid dates or entity reference"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Assignment"
)]
pub async fn create_assignment(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateAssignment>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    // date interval invariant
    if let Some(to) = payload.effective_to {
        if to < payload.effective_from {
            return Err(ServiceError::Validation(
                "effective_to cannot be before effective_from".into(),
            )
            .into());
        }
    }

    let guard_exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM guards WHERE id = ? AND deleted_at IS NULL LIMIT 1)",
    )
    .bind(payload.guard_id)
    .fetch_one(pool.get_ref())
    .await
    .map_err(ServiceError::from)?;

    if !guard_exists {
        return Err(ServiceError::Validation("Guard not found".into()).into());
    }

    let post_active = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM site_posts WHERE id = ? AND active = TRUE LIMIT 1)",
    )
    .bind(payload.site_post_id)
    .fetch_one(pool.get_ref())
    .await
    .map_err(ServiceError::from)?;

    if !post_active {
        return Err(ServiceError::Validation("Site post not found".into()).into());
    }

    let shift_exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM shift_types WHERE id = ? LIMIT 1)",
    )
    .bind(payload.shift_type_id)
    .fetch_one(pool.get_ref())
    .await
    .map_err(ServiceError::from)?;

    if !shift_exists {
        return Err(ServiceError::Validation("Shift type not found".into()).into());
    }

    let result = sqlx::query(
        r#"
        INSERT INTO guard_assignments
        (guard_id, site_post_id, shift_type_id, status, active, effective_from, effective_to, notes)
        VALUES (?, ?, ?, 'ACTIVE', TRUE, ?, ?, ?)
        "#,
    )
    .bind(payload.guard_id)
    .bind(payload.site_post_id)
    .bind(payload.shift_type_id)
    .bind(payload.effective_from)
    .bind(payload.effective_to)
    .bind(&payload.notes)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, guard_id = payload.guard_id, "Failed to create assignment");
        ServiceError::from(e)
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Assignment created successfully",
        "id": result.last_insert_id()
    })))
}

/// List assignments effective today
#[utoipa::path(
    get,
    path = "/api/v1/assignments",
    responses(
        (status = 200, description = "Assignments effective on the current date", body = Vec<Assignment>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Assignment"
)]
pub async fn list_assignments(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin_or_supervisor()?;

    let today = chrono::Utc::now()
        .with_timezone(&config.time_zone)
        .date_naive();

    let assignments = sqlx::query_as::<_, Assignment>(
        "SELECT * FROM guard_assignments WHERE active = TRUE ORDER BY effective_from DESC, id DESC",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(ServiceError::from)?;

    let effective: Vec<Assignment> = assignments
        .into_iter()
        .filter(|a| a.is_effective_on(today))
        .collect();

    Ok(HttpResponse::Ok().json(effective))
}

/// Assignment history for one guard
#[utoipa::path(
    get,
    path = "/api/v1/assignments/guard/{guard_id}",
    params(
        ("guard_id", Path, description = "Guard ID")
    ),
    responses(
        (status = 200, description = "All assignments of the guard, most recent first", body = Vec<Assignment>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Access denied to this guard"),
        (status = 404, description = "Guard not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Assignment"
)]
pub async fn list_by_guard(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let guard_id = path.into_inner();

    ensure_guard_access(pool.get_ref(), &auth, guard_id).await?;

    let assignments = sqlx::query_as::<_, Assignment>(
        "SELECT * FROM guard_assignments WHERE guard_id = ? ORDER BY effective_from DESC, id DESC",
    )
    .bind(guard_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(assignments))
}

/// Cancel Assignment (soft cancel, keeps the row)
#[utoipa::path(
    delete,
    path = "/api/v1/assignments/{assignment_id}",
    params(
        ("assignment_id", Path, description = "Assignment ID")
    ),
    responses(
        (status = 200, description = "Assignment cancelled", body = Object, example = json!({
            "message": "Assignment cancelled"
        })),
        (status = 404, description = "Assignment not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Assignment"
)]
pub async fn cancel_assignment(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let assignment_id = path.into_inner();

    let result = sqlx::query(
        "UPDATE guard_assignments SET active = FALSE, status = 'CANCELLED' WHERE id = ? AND active = TRUE",
    )
    .bind(assignment_id)
    .execute(pool.get_ref())
    .await
    .map_err(ServiceError::from)?;

    if result.rows_affected() == 0 {
        return Err(ServiceError::NotFound("Assignment not found".into()).into());
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Assignment cancelled"
    })))
}

/// List Shift Types
#[utoipa::path(
    get,
    path = "/api/v1/assignments/shift-types",
    responses(
        (status = 200, description = "All shift types", body = Vec<ShiftType>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Assignment"
)]
pub async fn list_shift_types(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let shift_types = sqlx::query_as::<_, ShiftType>("SELECT * FROM shift_types ORDER BY id")
        .fetch_all(pool.get_ref())
        .await
        .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(shift_types))
}

/// Admin may read any guard's records, a supervisor their own guards',
/// a guard only their own.
pub async fn ensure_guard_access(
    pool: &MySqlPool,
    auth: &AuthUser,
    guard_id: u64,
) -> Result<(), ServiceError> {
    let guard = sqlx::query_as::<_, crate::model::guard::Guard>(
        "SELECT * FROM guards WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(guard_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ServiceError::NotFound("Guard not found".into()))?;

    match auth.role {
        Role::Admin => Ok(()),
        Role::Supervisor if guard.supervisor_id == Some(auth.user_id) => Ok(()),
        Role::Guard if guard.user_id == auth.user_id => Ok(()),
        _ => Err(ServiceError::Forbidden(
            "Access denied to this guard".into(),
        )),
    }
}
