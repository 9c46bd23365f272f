use bigdecimal::BigDecimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::listing::ListingPurpose;

/// Owner-editable fields of a listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingDraft {
    pub city_id: Option<i32>,
    pub neighborhood_id: Option<i32>,
    /// Agency the listing is published under. Must belong to the owner.
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
}

pub struct ListingCreateRequest {
    pub owner_id: Uuid,
    pub draft: ListingDraft,
}

/// Public catalog filters. Minimums apply with `>=`, `max_price` with `<=`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogFilter {
    pub purpose: Option<ListingPurpose>,
    pub city: Option<i32>,
    pub neighborhood: Option<i32>,
    pub agency: Option<Uuid>,
    pub bedrooms: Option<i32>,
    pub suites: Option<i32>,
    pub bathrooms: Option<i32>,
    pub living_rooms: Option<i32>,
    pub kitchens: Option<i32>,
    pub closets: Option<i32>,
    pub area: Option<i32>,
    pub max_price: Option<BigDecimal>,
}
