use std::sync::Arc;

use actix_web::{HttpResponse, post, web};
use chrono::Utc;
use common::{error::Res, http::Success};
use sqlx::PgPool;

use crate::dtos::admin::{BatchResponse, ConfirmPaymentRequest, IdsRequest};

/// Activates subscriptions, typically after a payment was verified by hand.
///
/// Each subscription starts now and expires after its plan's duration.
/// Subscriptions already active or without a plan are skipped.
///
/// # Output
/// - Success: `{ applied: [ids], skipped: [{ id, reason }], warnings: [...] }`
///
/// # Frontend Example
/// ```javascript
/// await fetch('/api/admin/subscriptions/activate', {
///   method: 'POST',
///   headers: {
///     'Content-Type': 'application/json',
///     'Authorization': `Bearer ${localStorage.getItem('authToken')}`
///   },
///   body: JSON.stringify({ ids: [subscriptionId] })
/// });
/// ```
#[post("/subscriptions/activate")]
pub async fn post_activate(
    req: web::Json<IdsRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    let outcome =
        api_subs::services::sub::activate_subscriptions(pg_pool, &req.ids, Utc::now()).await?;
    Success::ok(BatchResponse::from(outcome))
}

/// Cancels subscriptions. Listings already published keep their own expiration.
#[post("/subscriptions/cancel")]
pub async fn post_cancel(
    req: web::Json<IdsRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    let outcome = api_subs::services::sub::cancel_subscriptions(pg_pool, &req.ids).await?;
    Success::ok(BatchResponse::from(outcome))
}

/// Records a payment received outside the gateway callback.
///
/// # Input
/// - `reference`: the checkout session id or the subscription id
///
/// # Output
/// - Success: the subscription, active
/// - Error: 404 when nothing matches the reference
#[post("/subscriptions/confirm")]
pub async fn post_confirm(
    req: web::Json<ConfirmPaymentRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    let subscription =
        api_subs::services::sub::confirm_payment(pg_pool, &req.reference, Utc::now()).await?;
    Success::ok(subscription)
}
