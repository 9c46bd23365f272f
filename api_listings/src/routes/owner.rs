use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::Utc;
use common::{env_config::Config, error::Res, http::Success, jwt::JwtClaims};
use sqlx::PgPool;
use storage::ObjectStorage;
use uuid::Uuid;

use crate::{
    dtos::listing::{ListingSaved, ListingView},
    services::{self, owner::Saved},
};

fn saved_response(saved: Saved, storage: &dyn ObjectStorage) -> ListingSaved {
    ListingSaved {
        listing: ListingView::new(saved.listing, storage),
        warnings: saved.warnings,
    }
}

/// All listings of the authenticated user, newest first, whatever their status.
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/dashboard/listings', {
///   headers: { 'Authorization': `Bearer ${localStorage.getItem('authToken')}` }
/// });
/// ```
#[get("")]
pub async fn get_my_listings(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
    storage: web::Data<Arc<dyn ObjectStorage>>,
) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    sweeper::sweep_quietly(pg_pool).await;

    let store = storage.get_ref().as_ref();
    let listings: Vec<ListingView> = db::listing::list_listings_by_owner(pg_pool, claims.user_id)
        .await?
        .into_iter()
        .map(|l| ListingView::new(l, store))
        .collect();
    Success::ok(listings)
}

/// Creates a listing. It stays `PENDING_APPROVAL` until an administrator approves it.
///
/// # Input
/// `multipart/form-data` with the listing fields (`title`, `description`,
/// `purpose`, `city_id`, `neighborhood_id`, `agency_id`, `address`, `contact_phone`,
/// `price`, `bedrooms`, `suites`, `bathrooms`, `living_rooms`, `kitchens`, `closets`,
/// `area`), an optional `main_photo` file and any number of `gallery` files.
///
/// # Output
/// - Success: 201 with `{ listing, warnings }`. `warnings` names gallery files
///   that could not be stored; the listing is kept regardless.
/// - Error: 403 with `redirect_to` when the user has no usable plan, 400 when a
///   listing or photo limit is reached or an image exceeds the upload limits, 502 when the main photo cannot be stored
///   (nothing is created)
///
/// # Frontend Example
/// ```javascript
/// const form = new FormData();
/// form.append('title', 'Apartamento no centro');
/// form.append('purpose', 'RENT');
/// form.append('main_photo', fileInput.files[0]);
/// for (const f of galleryInput.files) form.append('gallery', f);
///
/// const response = await fetch('/api/dashboard/listings', {
///   method: 'POST',
///   headers: { 'Authorization': `Bearer ${localStorage.getItem('authToken')}` },
///   body: form
/// });
/// if (response.status === 403) {
///   const { redirect_to } = await response.json();
///   window.location.href = redirect_to;
/// }
/// ```
#[post("")]
pub async fn post_listing(
    claims: web::ReqData<JwtClaims>,
    payload: Multipart,
    config: web::Data<Arc<Config>>,
    pool: web::Data<Arc<PgPool>>,
    storage: web::Data<Arc<dyn ObjectStorage>>,
) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    let store = storage.get_ref().as_ref();
    let form = services::form::read_form(payload, &config.uploads).await?;

    let saved = services::owner::create_listing(
        pg_pool,
        store,
        &config.storage.key_prefix,
        claims.user_id,
        form,
        Utc::now(),
    )
    .await?;
    Success::created(saved_response(saved, store))
}

/// Edits one of the user's listings. Same form as creation; a `main_photo`
/// replaces the current one and `gallery` files are added to the gallery.
///
/// # Output
/// - Success: `{ listing, warnings }`
/// - Error: 403 when the listing belongs to someone else or the user has no
///   usable plan, 404 when it does not exist, 502 when the new main photo
///   cannot be stored (the listing is left unchanged)
#[put("/{id}")]
pub async fn put_listing(
    claims: web::ReqData<JwtClaims>,
    path: web::Path<Uuid>,
    payload: Multipart,
    config: web::Data<Arc<Config>>,
    pool: web::Data<Arc<PgPool>>,
    storage: web::Data<Arc<dyn ObjectStorage>>,
) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    let store = storage.get_ref().as_ref();
    let form = services::form::read_form(payload, &config.uploads).await?;

    let saved = services::owner::update_listing(
        pg_pool,
        store,
        &config.storage.key_prefix,
        claims.user_id,
        path.into_inner(),
        form,
        Utc::now(),
    )
    .await?;
    Success::ok(saved_response(saved, store))
}

/// Deletes one of the user's listings together with its photos.
///
/// # Frontend Example
/// ```javascript
/// await fetch(`/api/dashboard/listings/${listingId}`, {
///   method: 'DELETE',
///   headers: { 'Authorization': `Bearer ${localStorage.getItem('authToken')}` }
/// });
/// ```
#[delete("/{id}")]
pub async fn delete_listing(
    claims: web::ReqData<JwtClaims>,
    path: web::Path<Uuid>,
    pool: web::Data<Arc<PgPool>>,
    storage: web::Data<Arc<dyn ObjectStorage>>,
) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    services::owner::delete_listing(
        pg_pool,
        storage.get_ref().as_ref(),
        claims.user_id,
        path.into_inner(),
    )
    .await?;
    Success::no_content()
}

/// Deletes a gallery photo of one of the user's listings.
///
/// # Output
/// - Success: `{ listing_id }` of the listing the photo belonged to
/// - Error: 502 when storage refuses the delete; the photo is kept
#[delete("/photos/{id}")]
pub async fn delete_photo(
    claims: web::ReqData<JwtClaims>,
    path: web::Path<Uuid>,
    pool: web::Data<Arc<PgPool>>,
    storage: web::Data<Arc<dyn ObjectStorage>>,
) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    let listing_id = services::owner::delete_photo(
        pg_pool,
        storage.get_ref().as_ref(),
        claims.user_id,
        path.into_inner(),
    )
    .await?;
    Success::ok(serde_json::json!({ "listing_id": listing_id }))
}
