use std::sync::Arc;

use actix_web::{HttpResponse, get, post, web};
use chrono::Utc;
use common::{env_config::Config, error::Res, http::Success, jwt::JwtClaims, stripe};
use db::models::subscription::SubscriptionStatus;
use sqlx::PgPool;

use crate::{
    dtos::sub::{CurrentSubscriptionResponse, SelectPlanRequest, SelectPlanResponse},
    services,
};

/// Selects a plan for the authenticated user.
///
/// # Input
/// - `req`: JSON payload with the `plan_id` to enroll in
///
/// # Output
/// - Success: Returns the subscription. Free plans are active immediately;
///   paid plans stay `PENDING` and come with a `checkout_url` to pay at.
/// - Error: 404 for an unknown plan, 400 for a plan no longer offered
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/dashboard/sub/select', {
///   method: 'POST',
///   headers: {
///     'Content-Type': 'application/json',
///     'Authorization': `Bearer ${localStorage.getItem('authToken')}`
///   },
///   body: JSON.stringify({ plan_id: '5f1c...' })
/// });
///
/// const { subscription, checkout_url } = await response.json();
/// if (checkout_url) window.location.href = checkout_url;
/// ```
#[post("/select")]
pub async fn post_select(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<SelectPlanRequest>,
    config: web::Data<Arc<Config>>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    let (mut subscription, plan) =
        services::sub::select_plan(pg_pool, claims.user_id, req.plan_id, Utc::now()).await?;

    if subscription.status == SubscriptionStatus::Active {
        return Success::ok(SelectPlanResponse {
            subscription,
            checkout_url: None,
        });
    }

    let user = db::user::get_user_by_id(pg_pool, claims.user_id).await?;
    let client = stripe::create_client(&config.stripe.secret_key);
    let session = services::pay::create_checkout(
        &client,
        &config.stripe,
        &plan,
        &subscription,
        user.as_ref().map(|u| u.email.as_str()),
    )
    .await?;

    let reference = session.id.to_string();
    db::subscription::set_payment_reference(pg_pool, subscription.id, &reference).await?;
    subscription.payment_reference = Some(reference);

    Success::ok(SelectPlanResponse {
        subscription,
        checkout_url: session.url,
    })
}

/// Returns the user's subscription, its plan, and whether they may post.
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/dashboard/sub/current', {
///   headers: { 'Authorization': `Bearer ${localStorage.getItem('authToken')}` }
/// });
/// const { subscription, plan, postable } = await response.json();
/// ```
#[get("/current")]
pub async fn get_current(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    let standing = services::sub::current_standing(pg_pool, claims.user_id).await?;
    let postable = standing.is_postable(Utc::now());
    Success::ok(CurrentSubscriptionResponse {
        subscription: standing.subscription,
        plan: standing.plan,
        postable,
    })
}
