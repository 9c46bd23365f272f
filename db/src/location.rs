use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};

use crate::models::location::{City, Neighborhood};

pub async fn list_cities<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
) -> Res<Vec<City>> {
    sqlx::query_as::<_, City>("SELECT * FROM cities ORDER BY name ASC")
        .fetch_all(executor)
        .await
        .map_err(AppError::from)
}

pub async fn list_neighborhoods<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    city_id: i32,
) -> Res<Vec<Neighborhood>> {
    sqlx::query_as::<_, Neighborhood>(
        "SELECT * FROM neighborhoods WHERE city_id = $1 ORDER BY name ASC",
    )
    .bind(city_id)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}

pub async fn insert_city<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    name: &str,
    state: &str,
) -> Res<City> {
    sqlx::query_as::<_, City>("INSERT INTO cities (name, state) VALUES ($1, $2) RETURNING *")
        .bind(name)
        .bind(state)
        .fetch_one(executor)
        .await
        .map_err(AppError::from)
}

pub async fn insert_neighborhood<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    city_id: i32,
    name: &str,
) -> Res<Neighborhood> {
    sqlx::query_as::<_, Neighborhood>(
        "INSERT INTO neighborhoods (city_id, name) VALUES ($1, $2) RETURNING *",
    )
    .bind(city_id)
    .bind(name)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn get_city_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    city_id: i32,
) -> Res<Option<City>> {
    sqlx::query_as::<_, City>("SELECT * FROM cities WHERE id = $1")
        .bind(city_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}
