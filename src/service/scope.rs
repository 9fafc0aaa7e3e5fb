//! Role-scoped guard visibility.
//!
//! The single dispatch point for "which guards may this caller see".
//! Evaluated fresh per request; holds no state across calls.

use sqlx::MySqlPool;

use crate::auth::auth::AuthUser;
use crate::error::ServiceError;
use crate::model::{guard::Guard, role::Role};

/// The guard set visible to `auth`:
/// - ADMIN      → every active, non-tombstoned guard
/// - SUPERVISOR → guards supervised by this user
/// - GUARD      → the caller's own profile (NotFound when none is linked)
/// - anything else → empty, never an error
pub async fn visible_guards(pool: &MySqlPool, auth: &AuthUser) -> Result<Vec<Guard>, ServiceError> {
    match auth.role {
        Role::Admin => {
            let guards = sqlx::query_as::<_, Guard>(
                "SELECT * FROM guards WHERE active = TRUE AND deleted_at IS NULL ORDER BY id",
            )
            .fetch_all(pool)
            .await?;
            Ok(guards)
        }
        Role::Supervisor => {
            let guards = sqlx::query_as::<_, Guard>(
                "SELECT * FROM guards WHERE supervisor_id = ? AND deleted_at IS NULL ORDER BY id",
            )
            .bind(auth.user_id)
            .fetch_all(pool)
            .await?;
            Ok(guards)
        }
        Role::Guard => {
            let guard = find_own_profile(pool, auth.user_id).await?;
            Ok(vec![guard])
        }
        Role::System => Ok(Vec::new()),
    }
}

/// The guard profile linked to a user account, or NotFound.
pub async fn find_own_profile(pool: &MySqlPool, user_id: u64) -> Result<Guard, ServiceError> {
    sqlx::query_as::<_, Guard>("SELECT * FROM guards WHERE user_id = ? AND deleted_at IS NULL")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Guard profile not found".into()))
}
