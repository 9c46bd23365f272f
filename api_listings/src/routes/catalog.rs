use std::sync::Arc;

use actix_web::{HttpResponse, get, web};
use chrono::Utc;
use common::{error::Res, http::Success};
use sqlx::PgPool;
use storage::ObjectStorage;
use uuid::Uuid;

use crate::{dtos::listing::CatalogQuery, services};

/// Public catalog of published listings.
///
/// Expired subscriptions and listings are swept before the query runs.
///
/// # Input
/// - Query parameters (all optional): `purpose` (SALE | RENT), `city`,
///   `neighborhood`, `agency`, minimum `bedrooms`, `suites`, `bathrooms`, `living_rooms`,
///   `kitchens`, `closets`, `area`, maximum `max_price`, and the 1-based `page`
///
/// # Output
/// - Success: `{ listings, page, total_pages, total, agency }`, featured listings
///   first then newest, 50 per page. Pages out of range serve the nearest page.
///   `agency` is the filtered agency's profile, or null.
///
/// # Frontend Example
/// ```javascript
/// const params = new URLSearchParams({ purpose: 'RENT', city: 3, bedrooms: 2, page: 1 });
/// const response = await fetch(`/api/listings?${params}`);
/// const { listings, total_pages } = await response.json();
/// ```
#[get("")]
pub async fn get_catalog(
    query: web::Query<CatalogQuery>,
    pool: web::Data<Arc<PgPool>>,
    storage: web::Data<Arc<dyn ObjectStorage>>,
) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    sweeper::sweep_quietly(pg_pool).await;

    let page = services::catalog::browse(
        pg_pool,
        storage.get_ref().as_ref(),
        &query.filter(),
        query.page,
        Utc::now(),
    )
    .await?;
    Success::ok(page)
}

/// A published listing with its gallery.
///
/// # Output
/// - Success: the listing, `main_photo_url` and `gallery: [{ id, url }]`
/// - Error: 404 when the listing does not exist or is not currently published
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch(`/api/listings/${listingId}`);
/// ```
#[get("/{id}")]
pub async fn get_listing(
    path: web::Path<Uuid>,
    pool: web::Data<Arc<PgPool>>,
    storage: web::Data<Arc<dyn ObjectStorage>>,
) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    sweeper::sweep_quietly(pg_pool).await;

    let detail = services::catalog::detail(
        pg_pool,
        storage.get_ref().as_ref(),
        path.into_inner(),
        Utc::now(),
    )
    .await?;
    Success::ok(detail)
}
