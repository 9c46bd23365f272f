use std::sync::Arc;

use actix_web::{HttpResponse, get, web};
use common::{error::Res, http::Success};
use sqlx::PgPool;

use crate::{dtos::sub::PlansResponse, services};

/// Lists the plans currently offered, cheapest first.
///
/// # Output
/// - Success: Returns `{ plans: [...] }` with every active plan
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/plans');
/// const { plans } = await response.json();
/// ```
#[get("")]
pub async fn get_plans(pool: web::Data<Arc<PgPool>>) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    let plans = services::sub::list_active_plans(pg_pool).await?;
    Success::ok(PlansResponse { plans })
}
