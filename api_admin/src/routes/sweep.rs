use std::sync::Arc;

use actix_web::{HttpResponse, post, web};
use chrono::Utc;
use common::{error::Res, http::Success};
use sqlx::PgPool;

/// Runs the expiration sweep now and reports what it changed.
#[post("/sweep")]
pub async fn post_sweep(pool: web::Data<Arc<PgPool>>) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    let report = sweeper::sweep_expirations(pg_pool, Utc::now()).await?;
    Success::ok(report)
}
