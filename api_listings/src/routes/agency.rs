use std::sync::Arc;

use actix_web::{HttpResponse, get, put, web};
use common::{error::Res, http::Success, jwt::JwtClaims};
use db::dtos::agency::AgencyDraft;
use sqlx::PgPool;

use crate::services;

/// Agencies by name. Used to fill the catalog's agency filter.
///
/// # Frontend Example
/// ```javascript
/// const agencies = await (await fetch('/api/agencies')).json();
/// const listings = await fetch(`/api/listings?agency=${agencies[0].id}`);
/// ```
#[get("")]
pub async fn get_agencies(pool: web::Data<Arc<PgPool>>) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    let agencies = db::agency::list_agencies(pg_pool).await?;
    Success::ok(agencies)
}

/// The authenticated user's agency profile.
///
/// # Output
/// - Error: 404 when the user has not created one
#[get("")]
pub async fn get_my_agency(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    let agency = services::agency::profile(pg_pool, claims.user_id).await?;
    Success::ok(agency)
}

/// Creates or replaces the authenticated user's agency profile.
///
/// # Input
/// `{ name, address?, city_id?, phone?, secondary_phone?, website?, social_url? }`.
/// `website` and `social_url` must be http(s) addresses.
///
/// # Frontend Example
/// ```javascript
/// await fetch('/api/dashboard/agency', {
///   method: 'PUT',
///   headers: {
///     'Content-Type': 'application/json',
///     'Authorization': `Bearer ${localStorage.getItem('authToken')}`
///   },
///   body: JSON.stringify({ name: 'Lar Imóveis', phone: '84 3200-0000' })
/// });
/// ```
#[put("")]
pub async fn put_my_agency(
    claims: web::ReqData<JwtClaims>,
    body: web::Json<AgencyDraft>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    let agency = services::agency::save_profile(pg_pool, claims.user_id, body.into_inner()).await?;
    Success::ok(agency)
}
