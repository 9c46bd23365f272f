use std::sync::Arc;

use actix_web::{HttpResponse, post, web};
use chrono::Utc;
use common::{error::Res, http::Success};
use sqlx::PgPool;

use crate::{
    dtos::admin::{BatchResponse, FeatureRequest, IdsRequest},
    services,
};

/// Publishes pending listings.
///
/// Each listing is handled on its own: it goes live for its owner's plan
/// duration, or is skipped with a warning naming it and the reason (not
/// pending, owner without an active subscription, unknown id).
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/admin/listings/approve', {
///   method: 'POST',
///   headers: {
///     'Content-Type': 'application/json',
///     'Authorization': `Bearer ${localStorage.getItem('authToken')}`
///   },
///   body: JSON.stringify({ ids: selectedIds })
/// });
/// const { applied, warnings } = await response.json();
/// warnings.forEach(w => console.warn(w));
/// ```
#[post("/listings/approve")]
pub async fn post_approve(
    req: web::Json<IdsRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    let outcome = services::listings::approve_listings(pg_pool, &req.ids, Utc::now()).await?;
    Success::ok(BatchResponse::from(outcome))
}

#[post("/listings/reject")]
pub async fn post_reject(
    req: web::Json<IdsRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    let outcome = services::listings::reject_listings(pg_pool, &req.ids).await?;
    Success::ok(BatchResponse::from(outcome))
}

/// Marks listings as featured, or clears the mark with `featured: false`.
#[post("/listings/feature")]
pub async fn post_feature(
    req: web::Json<FeatureRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    let outcome = services::listings::feature_listings(pg_pool, &req.ids, req.featured).await?;
    Success::ok(BatchResponse::from(outcome))
}
