use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Site {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "HQ")]
    pub name: String,
    #[schema(example = "12 Main Road", nullable = true)]
    pub address: Option<String>,
    #[schema(example = "Dhaka", nullable = true)]
    pub city: Option<String>,
    #[schema(example = true)]
    pub active: bool,
}

/// A duty station within a site. Referenced by assignments.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SitePost {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub site_id: u64,
    #[schema(example = "Gate A")]
    pub post_name: String,
    #[schema(example = true)]
    pub active: bool,
}
