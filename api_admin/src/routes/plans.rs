use std::sync::Arc;

use actix_web::{HttpResponse, get, post, put, web};
use common::{error::Res, http::Success};
use db::dtos::plan::PlanDraft;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dtos::admin::{BatchResponse, IdsRequest},
    services,
};

/// Every plan, including the ones hidden from the storefront.
#[get("/plans")]
pub async fn get_plans(pool: web::Data<Arc<PgPool>>) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    Success::ok(db::plan::list_all_plans(pg_pool).await?)
}

/// Creates a plan.
///
/// # Input
/// - `name`, `price`, `duration_days` (required); `description`,
///   `photo_limit` (5), `listing_limit` (1), `is_active` (true)
///
/// # Output
/// - Success: 201 with the plan
/// - Error: 400 for a negative price or limit, or a non-positive duration
///
/// # Frontend Example
/// ```javascript
/// await fetch('/api/admin/plans', {
///   method: 'POST',
///   headers: {
///     'Content-Type': 'application/json',
///     'Authorization': `Bearer ${localStorage.getItem('authToken')}`
///   },
///   body: JSON.stringify({ name: 'Ouro', price: '149.90', duration_days: 90, listing_limit: 10, photo_limit: 20 })
/// });
/// ```
#[post("/plans")]
pub async fn post_plan(
    req: web::Json<PlanDraft>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    let plan = services::plans::create_plan(pg_pool, req.into_inner()).await?;
    Success::created(plan)
}

#[put("/plans/{id}")]
pub async fn put_plan(
    path: web::Path<Uuid>,
    req: web::Json<PlanDraft>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    let plan = services::plans::update_plan(pg_pool, path.into_inner(), req.into_inner()).await?;
    Success::ok(plan)
}

/// Puts plans back on the storefront.
#[post("/plans/activate")]
pub async fn post_activate_plans(
    req: web::Json<IdsRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    let outcome = services::plans::set_plans_active(pg_pool, &req.ids, true).await?;
    Success::ok(BatchResponse::from(outcome))
}

/// Hides plans from the storefront. Users already on them keep their limits.
#[post("/plans/deactivate")]
pub async fn post_deactivate_plans(
    req: web::Json<IdsRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    let outcome = services::plans::set_plans_active(pg_pool, &req.ids, false).await?;
    Success::ok(BatchResponse::from(outcome))
}
