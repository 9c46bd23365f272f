use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A real-estate agency. Owners that trade as an agency publish under it.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize, PartialEq)]
pub struct Agency {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub address: Option<String>,
    pub city_id: Option<i32>,
    pub phone: Option<String>,
    pub secondary_phone: Option<String>,
    pub website: Option<String>,
    pub social_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
