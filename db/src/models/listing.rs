use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "listing_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    PendingApproval,
    Active,
    Expired,
    Rejected,
    Paused,
}

impl ListingStatus {
    /// Statuses that count against a plan's listing limit.
    pub const COUNTABLE: [ListingStatus; 2] = [ListingStatus::Active, ListingStatus::PendingApproval];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::PendingApproval => "PENDING_APPROVAL",
            ListingStatus::Active => "ACTIVE",
            ListingStatus::Expired => "EXPIRED",
            ListingStatus::Rejected => "REJECTED",
            ListingStatus::Paused => "PAUSED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "listing_purpose", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingPurpose {
    Sale,
    Rent,
}

/// A property advertisement.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub city_id: Option<i32>,
    pub neighborhood_id: Option<i32>,
    pub agency_id: Option<Uuid>,
    pub purpose: Option<ListingPurpose>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub contact_phone: Option<String>,
    pub price: Option<BigDecimal>,
    pub bedrooms: i32,
    pub suites: i32,
    pub bathrooms: i32,
    pub living_rooms: i32,
    pub kitchens: i32,
    pub closets: i32,
    pub area: i32,
    pub main_photo_key: Option<String>,
    pub status: ListingStatus,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Listing {
    /// Name shown to administrators in approval warnings.
    pub fn display_name(&self) -> String {
        match &self.title {
            Some(title) if !title.trim().is_empty() => title.clone(),
            _ => format!("Listing {}", self.id),
        }
    }
}
