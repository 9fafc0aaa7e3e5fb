use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "user_id": 12,
        "supervisor_id": 4,
        "employee_code": "GRD-001",
        "first_name": "John",
        "last_name": "Doe",
        "phone": "+8801712345678",
        "status": "ACTIVE",
        "active": true,
        "hire_date": "2024-01-01"
    })
)]
pub struct Guard {
    #[schema(example = 1)]
    pub id: u64,

    /// Login account this guard profile belongs to
    #[schema(example = 12)]
    pub user_id: u64,

    /// Supervising user's id. Weak reference: lookup only, a supervisor
    /// being removed never cascades here.
    #[schema(example = 4, nullable = true)]
    pub supervisor_id: Option<u64>,

    #[schema(example = "GRD-001")]
    pub employee_code: String,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe", nullable = true)]
    pub last_name: Option<String>,

    #[schema(example = "+8801712345678", nullable = true)]
    pub phone: Option<String>,

    /// ACTIVE | INACTIVE
    #[schema(example = "ACTIVE")]
    pub status: String,

    #[schema(example = true)]
    pub active: bool,

    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub hire_date: NaiveDate,

    #[schema(example = 30000.0, nullable = true)]
    pub base_salary: Option<f64>,

    #[schema(example = 1200.0, nullable = true)]
    pub per_day_rate: Option<f64>,

    #[schema(example = 250.0, nullable = true)]
    pub overtime_rate: Option<f64>,

    /// Tombstone. Set instead of deleting the row; tombstoned guards are
    /// excluded from every active-guard query.
    #[serde(skip_serializing)]
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub deleted_at: Option<DateTime<Utc>>,
}
