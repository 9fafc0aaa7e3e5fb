use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;
use tracing::error;

/// Error taxonomy for the read/report surface. Maps straight onto HTTP
/// status classes; handlers propagate with `?`.
#[derive(Debug, Display)]
pub enum ServiceError {
    /// Caller's own profile or a referenced entity is absent
    #[display(fmt = "{}", _0)]
    NotFound(String),

    /// Role/ownership check failed
    #[display(fmt = "{}", _0)]
    Forbidden(String),

    /// Malformed input or a bad entity reference on a write path
    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "Internal Server Error")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Database(e)
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ServiceError::Database(e) = self {
            error!(error = %e, "Database error");
        }
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}
