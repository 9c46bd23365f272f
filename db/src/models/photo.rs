use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Photo {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub image_key: String,
    pub created_at: DateTime<Utc>,
}
