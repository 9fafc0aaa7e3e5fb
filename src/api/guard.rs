use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::auth::handlers::is_email_available;
use crate::auth::password::hash_password;
use crate::config::Config;
use crate::error::ServiceError;
use crate::model::{guard::Guard, role::Role};
use crate::service::resolver::{ResolvedAssignment, resolve_active};
use crate::service::scope;
use crate::utils::db_utils::{build_update_sql, execute_update};
use crate::utils::{email_cache, email_filter};

#[derive(Deserialize, ToSchema)]
pub struct CreateGuardRequest {
    #[schema(example = "guard@company.com", format = "email", value_type = String)]
    pub email: String,
    #[schema(example = "s3cret", value_type = String)]
    pub password: String,
    #[schema(example = "GRD-001", value_type = String)]
    pub employee_code: String,
    #[schema(example = "John", value_type = String)]
    pub first_name: String,
    #[schema(example = "Doe", value_type = String)]
    pub last_name: Option<String>,
    #[schema(example = "+8801712345678", value_type = String)]
    pub phone: Option<String>,
    /// Supervising user's id (must hold the SUPERVISOR role)
    #[schema(example = 4)]
    pub supervisor_id: Option<u64>,
    #[schema(example = "2024-01-01", format = "date", value_type = String)]
    pub hire_date: NaiveDate,
    #[schema(example = 30000.0)]
    pub base_salary: Option<f64>,
    #[schema(example = 1200.0)]
    pub per_day_rate: Option<f64>,
    #[schema(example = 250.0)]
    pub overtime_rate: Option<f64>,
}

/// Guard profile enriched with the current (authoritative) assignment.
#[derive(Serialize, ToSchema)]
pub struct GuardDetailResponse {
    pub id: u64,
    pub user_id: u64,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub status: String,
    pub active: bool,
    #[schema(value_type = String, format = "date")]
    pub hire_date: NaiveDate,
    pub supervisor_id: Option<u64>,
    pub supervisor_name: Option<String>,
    pub base_salary: Option<f64>,
    pub per_day_rate: Option<f64>,
    pub overtime_rate: Option<f64>,

    // Current assignment (unset when nothing resolves today)
    pub assignment_id: Option<u64>,
    pub site_post_id: Option<u64>,
    pub current_post: Option<String>,
    pub site_id: Option<u64>,
    pub current_site: Option<String>,
    pub shift_type_id: Option<u64>,
    pub shift_type: Option<String>,
    #[schema(value_type = String, format = "date", nullable = true)]
    pub assignment_effective_from: Option<NaiveDate>,
    #[schema(value_type = String, format = "date", nullable = true)]
    pub assignment_effective_to: Option<NaiveDate>,
    pub assignment_status: Option<String>,
}

/// Account fields joined in for the detail view
#[derive(sqlx::FromRow)]
struct AccountInfo {
    email: String,
    full_name: Option<String>,
}

async fn detail_for(
    pool: &MySqlPool,
    guard: Guard,
    today: NaiveDate,
) -> Result<GuardDetailResponse, ServiceError> {
    let account = sqlx::query_as::<_, AccountInfo>(
        "SELECT email, full_name FROM users WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(guard.user_id)
    .fetch_optional(pool)
    .await?;

    let supervisor_name = match guard.supervisor_id {
        Some(sid) => {
            sqlx::query_scalar::<_, Option<String>>(
                "SELECT full_name FROM users WHERE id = ? AND deleted_at IS NULL",
            )
            .bind(sid)
            .fetch_optional(pool)
            .await?
            .flatten()
        }
        None => None,
    };

    let current = resolve_active(pool, guard.id, today).await?.into_iter().next();

    Ok(assemble_detail(guard, account, supervisor_name, current))
}

fn assemble_detail(
    guard: Guard,
    account: Option<AccountInfo>,
    supervisor_name: Option<String>,
    current: Option<ResolvedAssignment>,
) -> GuardDetailResponse {
    GuardDetailResponse {
        id: guard.id,
        user_id: guard.user_id,
        email: account.as_ref().map(|a| a.email.clone()),
        full_name: account.and_then(|a| a.full_name),
        employee_code: guard.employee_code,
        first_name: guard.first_name,
        last_name: guard.last_name,
        phone: guard.phone,
        status: guard.status,
        active: guard.active,
        hire_date: guard.hire_date,
        supervisor_id: guard.supervisor_id,
        supervisor_name,
        base_salary: guard.base_salary,
        per_day_rate: guard.per_day_rate,
        overtime_rate: guard.overtime_rate,
        assignment_id: current.as_ref().map(|a| a.id),
        site_post_id: current.as_ref().map(|a| a.site_post_id),
        current_post: current.as_ref().map(|a| a.post_name.clone()),
        site_id: current.as_ref().map(|a| a.site_id),
        current_site: current.as_ref().map(|a| a.site_name.clone()),
        shift_type_id: current.as_ref().map(|a| a.shift_type_id),
        shift_type: current.as_ref().map(|a| a.shift_name.clone()),
        assignment_effective_from: current.as_ref().map(|a| a.effective_from),
        assignment_effective_to: current.as_ref().and_then(|a| a.effective_to),
        assignment_status: current.map(|a| a.status),
    }
}

/// Admin sees everyone; a supervisor only their own guards; a guard only
/// themselves.
fn ensure_can_view(auth: &AuthUser, guard: &Guard) -> Result<(), ServiceError> {
    match auth.role {
        Role::Admin => Ok(()),
        Role::Supervisor if guard.supervisor_id == Some(auth.user_id) => Ok(()),
        Role::Guard if guard.user_id == auth.user_id => Ok(()),
        _ => Err(ServiceError::Forbidden(
            "Access denied to this guard".into(),
        )),
    }
}

async fn fetch_guard(pool: &MySqlPool, id: u64) -> Result<Guard, ServiceError> {
    sqlx::query_as::<_, Guard>("SELECT * FROM guards WHERE id = ? AND deleted_at IS NULL")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Guard not found".into()))
}

/// Create Guard (account + profile)
#[utoipa::path(
    post,
    path = "/api/v1/guards",
    request_body = CreateGuardRequest,
    responses(
        (status = 201, description = "Guard created", body = Object, example = json!({
            "message": "Guard created successfully",
            "id": 1
        })),
        (status = 400, description = "Invalid supervisor reference"),
        (status = 409, description = "Email or employee code already exists"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Guard"
)]
pub async fn create_guard(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateGuardRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let email = payload.email.trim().to_lowercase();

    if !is_email_available(&email, pool.get_ref()).await {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": "Email already exists"
        })));
    }

    let code_taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM guards WHERE employee_code = ? AND deleted_at IS NULL LIMIT 1)",
    )
    .bind(&payload.employee_code)
    .fetch_one(pool.get_ref())
    .await
    .map_err(ServiceError::from)?;

    if code_taken {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": "Employee code already exists"
        })));
    }

    if let Some(supervisor_id) = payload.supervisor_id {
        validate_supervisor(pool.get_ref(), supervisor_id).await?;
    }

    let hashed = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "Password hashing failed");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let mut tx = pool.begin().await.map_err(ServiceError::from)?;

    let full_name = match &payload.last_name {
        Some(last) => format!("{} {}", payload.first_name, last),
        None => payload.first_name.clone(),
    };

    let user_result = sqlx::query(
        r#"INSERT INTO users (email, password, full_name, role_id) VALUES (?, ?, ?, ?)"#,
    )
    .bind(&email)
    .bind(&hashed)
    .bind(&full_name)
    .bind(Role::Guard as u8)
    .execute(&mut *tx)
    .await
    .map_err(ServiceError::from)?;

    let user_id = user_result.last_insert_id();

    let guard_result = sqlx::query(
        r#"
        INSERT INTO guards
        (user_id, supervisor_id, employee_code, first_name, last_name, phone,
         status, active, hire_date, base_salary, per_day_rate, overtime_rate)
        VALUES (?, ?, ?, ?, ?, ?, 'ACTIVE', TRUE, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(payload.supervisor_id)
    .bind(&payload.employee_code)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.phone)
    .bind(payload.hire_date)
    .bind(payload.base_salary)
    .bind(payload.per_day_rate)
    .bind(payload.overtime_rate)
    .execute(&mut *tx)
    .await
    .map_err(ServiceError::from)?;

    tx.commit().await.map_err(ServiceError::from)?;

    email_filter::insert(&email);
    email_cache::mark_taken(&email).await;

    Ok(HttpResponse::Created().json(json!({
        "message": "Guard created successfully",
        "id": guard_result.last_insert_id()
    })))
}

/// The referenced user must exist and hold the SUPERVISOR role.
async fn validate_supervisor(pool: &MySqlPool, supervisor_id: u64) -> Result<(), ServiceError> {
    let role_id =
        sqlx::query_scalar::<_, u8>("SELECT role_id FROM users WHERE id = ? AND deleted_at IS NULL")
            .bind(supervisor_id)
            .fetch_optional(pool)
            .await?;

    match role_id.and_then(Role::from_id) {
        None => Err(ServiceError::Validation("Supervisor not found".into())),
        Some(Role::Supervisor) => Ok(()),
        Some(_) => Err(ServiceError::Validation(
            "User is not a SUPERVISOR".into(),
        )),
    }
}

/// List Guards (role-scoped)
#[utoipa::path(
    get,
    path = "/api/v1/guards",
    responses(
        (status = 200, description = "Guards visible to the caller", body = Vec<Guard>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Guard profile not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Guard"
)]
pub async fn list_guards(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let guards = scope::visible_guards(pool.get_ref(), &auth).await?;
    Ok(HttpResponse::Ok().json(guards))
}

/// List Guards with current assignment details (role-scoped)
#[utoipa::path(
    get,
    path = "/api/v1/guards/detailed",
    responses(
        (status = 200, description = "Detailed guard list", body = Vec<GuardDetailResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Guard"
)]
pub async fn list_guards_detailed(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let today = chrono::Utc::now()
        .with_timezone(&config.time_zone)
        .date_naive();

    let guards = scope::visible_guards(pool.get_ref(), &auth).await?;

    let mut details = Vec::with_capacity(guards.len());
    for guard in guards {
        details.push(detail_for(pool.get_ref(), guard, today).await?);
    }

    Ok(HttpResponse::Ok().json(details))
}

/// Current guard's own detailed profile
#[utoipa::path(
    get,
    path = "/api/v1/guards/me",
    responses(
        (status = 200, description = "Caller's guard profile", body = GuardDetailResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Guard profile not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Guard"
)]
pub async fn my_profile(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let today = chrono::Utc::now()
        .with_timezone(&config.time_zone)
        .date_naive();

    let guard = scope::find_own_profile(pool.get_ref(), auth.user_id).await?;
    let detail = detail_for(pool.get_ref(), guard, today).await?;

    Ok(HttpResponse::Ok().json(detail))
}

/// Get Guard by ID
#[utoipa::path(
    get,
    path = "/api/v1/guards/{guard_id}",
    params(
        ("guard_id", Path, description = "Guard ID")
    ),
    responses(
        (status = 200, description = "Guard found", body = GuardDetailResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Access denied to this guard"),
        (status = 404, description = "Guard not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Guard"
)]
pub async fn get_guard(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let guard_id = path.into_inner();

    let guard = fetch_guard(pool.get_ref(), guard_id).await?;
    ensure_can_view(&auth, &guard)?;

    let today = chrono::Utc::now()
        .with_timezone(&config.time_zone)
        .date_naive();
    let detail = detail_for(pool.get_ref(), guard, today).await?;

    Ok(HttpResponse::Ok().json(detail))
}

const GUARD_UPDATE_COLUMNS: &[&str] = &[
    "employee_code",
    "first_name",
    "last_name",
    "phone",
    "status",
    "active",
    "supervisor_id",
    "hire_date",
    "base_salary",
    "per_day_rate",
    "overtime_rate",
];

/// Update Guard
#[utoipa::path(
    put,
    path = "/api/v1/guards/{guard_id}",
    params(
        ("guard_id", Path, description = "Guard ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Guard updated successfully"),
        (status = 400, description = "Unknown field or invalid supervisor reference"),
        (status = 404, description = "Guard not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Guard"
)]
pub async fn update_guard(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let guard_id = path.into_inner();

    // Re-validate a changed supervisor link before touching the row
    if let Some(sid) = body.get("supervisor_id").and_then(|v| v.as_u64()) {
        validate_supervisor(pool.get_ref(), sid).await?;
    }

    let update = build_update_sql("guards", &body, GUARD_UPDATE_COLUMNS, "id", guard_id)?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(ServiceError::from)?;

    if affected == 0 {
        return Err(ServiceError::NotFound("Guard not found".into()).into());
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Guard updated successfully"
    })))
}

/// Delete Guard (soft delete)
#[utoipa::path(
    delete,
    path = "/api/v1/guards/{guard_id}",
    params(
        ("guard_id", Path, description = "Guard ID")
    ),
    responses(
        (status = 200, description = "Guard deleted", body = Object, example = json!({
            "message": "Guard deleted successfully"
        })),
        (status = 404, description = "Guard not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Guard"
)]
pub async fn delete_guard(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let guard_id = path.into_inner();

    let email = sqlx::query_scalar::<_, String>(
        r#"
        SELECT u.email
        FROM guards g
        JOIN users u ON u.id = g.user_id
        WHERE g.id = ? AND g.deleted_at IS NULL
        "#,
    )
    .bind(guard_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(ServiceError::from)?
    .ok_or_else(|| ServiceError::NotFound("Guard not found".into()))?;

    let mut tx = pool.begin().await.map_err(ServiceError::from)?;

    // Tombstone the profile and the login account together
    sqlx::query("UPDATE guards SET deleted_at = NOW(), active = FALSE WHERE id = ?")
        .bind(guard_id)
        .execute(&mut *tx)
        .await
        .map_err(ServiceError::from)?;

    sqlx::query(
        r#"
        UPDATE users u
        JOIN guards g ON g.user_id = u.id
        SET u.deleted_at = NOW()
        WHERE g.id = ?
        "#,
    )
    .bind(guard_id)
    .execute(&mut *tx)
    .await
    .map_err(ServiceError::from)?;

    tx.commit().await.map_err(ServiceError::from)?;

    // the address may be registered again
    email_filter::remove(&email);
    email_cache::release(&email).await;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Guard deleted successfully"
    })))
}
