use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::ServiceError;
use crate::model::site::{Site, SitePost};

#[derive(Deserialize, ToSchema)]
pub struct CreateSite {
    #[schema(example = "HQ", value_type = String)]
    pub name: String,
    #[schema(example = "12 Main Road", value_type = String)]
    pub address: Option<String>,
    #[schema(example = "Dhaka", value_type = String)]
    pub city: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateSite {
    #[schema(example = "HQ", value_type = String)]
    pub name: Option<String>,
    #[schema(example = "12 Main Road", value_type = String)]
    pub address: Option<String>,
    #[schema(example = "Dhaka", value_type = String)]
    pub city: Option<String>,
    #[schema(example = true)]
    pub active: Option<bool>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateSitePost {
    #[schema(example = "Gate A", value_type = String)]
    pub post_name: String,
}

#[derive(Serialize, ToSchema)]
pub struct SiteResponse {
    pub site: Site,
    pub posts: Vec<SitePost>,
}

/// Create Site
#[utoipa::path(
    post,
    path = "/api/v1/sites",
    request_body = CreateSite,
    responses(
        (status = 201, description = "Site created", body = Object, example = json!({
            "message": "Site created successfully",
            "id": 1
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Site"
)]
pub async fn create_site(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateSite>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let result = sqlx::query(
        r#"INSERT INTO sites (name, address, city, active) VALUES (?, ?, ?, TRUE)"#,
    )
    .bind(&payload.name)
    .bind(&payload.address)
    .bind(&payload.city)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create site");
        ServiceError::from(e)
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Site created successfully",
        "id": result.last_insert_id()
    })))
}

/// List Sites
#[utoipa::path(
    get,
    path = "/api/v1/sites",
    responses(
        (status = 200, description = "All sites", body = Vec<Site>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Site"
)]
pub async fn list_sites(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let sites = sqlx::query_as::<_, Site>("SELECT * FROM sites ORDER BY name")
        .fetch_all(pool.get_ref())
        .await
        .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(sites))
}

/// Get Site by ID (with its posts)
#[utoipa::path(
    get,
    path = "/api/v1/sites/{site_id}",
    params(
        ("site_id", Path, description = "Site ID")
    ),
    responses(
        (status = 200, description = "Site found", body = SiteResponse),
        (status = 404, description = "Site not found"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Site"
)]
pub async fn get_site(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let site_id = path.into_inner();

    let site = sqlx::query_as::<_, Site>("SELECT * FROM sites WHERE id = ?")
        .bind(site_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| ServiceError::NotFound("Site not found".into()))?;

    let posts =
        sqlx::query_as::<_, SitePost>("SELECT * FROM site_posts WHERE site_id = ? ORDER BY id")
            .bind(site_id)
            .fetch_all(pool.get_ref())
            .await
            .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(SiteResponse { site, posts }))
}

/// Update Site
#[utoipa::path(
    put,
    path = "/api/v1/sites/{site_id}",
    params(
        ("site_id", Path, description = "Site ID")
    ),
    request_body = UpdateSite,
    responses(
        (status = 200, description = "Site updated successfully"),
        (status = 404, description = "Site not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Site"
)]
pub async fn update_site(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdateSite>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let site_id = path.into_inner();

    let current = sqlx::query_as::<_, Site>("SELECT * FROM sites WHERE id = ?")
        .bind(site_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| ServiceError::NotFound("Site not found".into()))?;

    let name = body.name.clone().unwrap_or(current.name);
    let address = body.address.clone().or(current.address);
    let city = body.city.clone().or(current.city);
    let active = body.active.unwrap_or(current.active);

    sqlx::query("UPDATE sites SET name = ?, address = ?, city = ?, active = ? WHERE id = ?")
        .bind(&name)
        .bind(&address)
        .bind(&city)
        .bind(active)
        .bind(site_id)
        .execute(pool.get_ref())
        .await
        .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Site updated successfully"
    })))
}

/// Create Site Post
#[utoipa::path(
    post,
    path = "/api/v1/sites/{site_id}/posts",
    params(
        ("site_id", Path, description = "Site ID")
    ),
    request_body = CreateSitePost,
    responses(
        (status = 201, description = "Site post created", body = Object, example = json!({
            "message": "Site post created successfully",
            "id": 1
        })),
        (status = 404, description = "Site not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Site"
)]
pub async fn create_site_post(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<CreateSitePost>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let site_id = path.into_inner();

    let site_exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM sites WHERE id = ? LIMIT 1)")
            .bind(site_id)
            .fetch_one(pool.get_ref())
            .await
            .map_err(ServiceError::from)?;

    if !site_exists {
        return Err(ServiceError::NotFound("Site not found".into()).into());
    }

    let result = sqlx::query(
        r#"INSERT INTO site_posts (site_id, post_name, active) VALUES (?, ?, TRUE)"#,
    )
    .bind(site_id)
    .bind(&payload.post_name)
    .execute(pool.get_ref())
    .await
    .map_err(ServiceError::from)?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Site post created successfully",
        "id": result.last_insert_id()
    })))
}

/// List Site Posts for a site
#[utoipa::path(
    get,
    path = "/api/v1/sites/{site_id}/posts",
    params(
        ("site_id", Path, description = "Site ID")
    ),
    responses(
        (status = 200, description = "Posts of the site", body = Vec<SitePost>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Site"
)]
pub async fn list_site_posts(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let site_id = path.into_inner();

    let posts =
        sqlx::query_as::<_, SitePost>("SELECT * FROM site_posts WHERE site_id = ? ORDER BY id")
            .bind(site_id)
            .fetch_all(pool.get_ref())
            .await
            .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(posts))
}
