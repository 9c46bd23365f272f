use bigdecimal::BigDecimal;
use db::{
    dtos::listing::CatalogFilter,
    models::{
        agency::Agency,
        listing::{Listing, ListingPurpose},
        photo::Photo,
    },
};
use serde::{Deserialize, Serialize};
use storage::ObjectStorage;
use uuid::Uuid;

/// Query string of the public catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQuery {
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
    /// 1-based.
    pub page: Option<i64>,
}

impl CatalogQuery {
    pub fn filter(&self) -> CatalogFilter {
        CatalogFilter {
            purpose: self.purpose,
            city: self.city,
            neighborhood: self.neighborhood,
            agency: self.agency,
            bedrooms: self.bedrooms,
            suites: self.suites,
            bathrooms: self.bathrooms,
            living_rooms: self.living_rooms,
            kitchens: self.kitchens,
            closets: self.closets,
            area: self.area,
            max_price: self.max_price.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NeighborhoodsQuery {
    pub city_id: i32,
}

/// A listing with its main photo resolved to a fetchable URL.
#[derive(Debug, Serialize)]
pub struct ListingView {
    #[serde(flatten)]
    pub listing: Listing,
    pub main_photo_url: Option<String>,
}

impl ListingView {
    pub fn new(listing: Listing, storage: &dyn ObjectStorage) -> Self {
        let main_photo_url = listing.main_photo_key.as_deref().map(|k| storage.public_url(k));
        ListingView {
            listing,
            main_photo_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PhotoView {
    pub id: Uuid,
    pub url: String,
}

impl PhotoView {
    pub fn new(photo: &Photo, storage: &dyn ObjectStorage) -> Self {
        PhotoView {
            id: photo.id,
            url: storage.public_url(&photo.image_key),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListingDetail {
    #[serde(flatten)]
    pub view: ListingView,
    pub gallery: Vec<PhotoView>,
}

#[derive(Debug, Serialize)]
pub struct CatalogPage {
    pub listings: Vec<ListingView>,
    /// 1-based page actually served.
    pub page: i64,
    pub total_pages: i64,
    pub total: i64,
    /// The agency filtered on, when it exists.
    pub agency: Option<Agency>,
}

/// Outcome of a create or edit. `warnings` names gallery files that failed to upload.
#[derive(Debug, Serialize)]
pub struct ListingSaved {
    pub listing: ListingView,
    pub warnings: Vec<String>,
}
