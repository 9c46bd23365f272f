use std::sync::Arc;

use actix_web::{HttpResponse, get, web};
use common::{error::Res, http::Success};
use sqlx::PgPool;

use crate::dtos::listing::NeighborhoodsQuery;

/// Cities listings can be placed in, by name.
#[get("/cities")]
pub async fn get_cities(pool: web::Data<Arc<PgPool>>) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    let cities = db::location::list_cities(pg_pool).await?;
    Success::ok(cities)
}

/// Neighborhoods of a city, by name. Used to fill the neighborhood picker
/// once a city is chosen.
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch(`/api/locations/neighborhoods?city_id=${cityId}`);
/// const neighborhoods = await response.json(); // [{ id, city_id, name }]
/// ```
#[get("/neighborhoods")]
pub async fn get_neighborhoods(
    query: web::Query<NeighborhoodsQuery>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<HttpResponse> {
    let pg_pool: &PgPool = &pool;
    let neighborhoods = db::location::list_neighborhoods(pg_pool, query.city_id).await?;
    Success::ok(neighborhoods)
}
